//! Concurrent request dispatch
//!
//! Each playback request runs as its own tokio task, so a long read never
//! blocks the caller and several requests may overlap. Requests share the
//! immutable [`SpeechPipeline`] and nothing else: two overlapping reads
//! play over each other rather than queueing.

use super::{PipelineOutcome, SpeechPipeline};
use crate::capture::SelectionCapture;
use crate::config::NotificationConfig;
use crate::error::RequestError;
use crate::notification;
use crate::request::PlaybackRequest;
use crate::settings::Settings;
use crate::text::preview;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Receives request lifecycle events (notifications, console output, tests)
#[async_trait::async_trait]
pub trait OutcomeSink: Send + Sync {
    /// A request was accepted and is about to run
    async fn started(&self, _request: &PlaybackRequest) {}

    /// Captured text could not form a request
    async fn rejected(&self, _error: &RequestError) {}

    /// A request reached its terminal outcome
    async fn deliver(&self, request: &PlaybackRequest, outcome: &PipelineOutcome);
}

/// Spawns pipeline runs on a tokio runtime
#[derive(Clone)]
pub struct PipelineRunner {
    pipeline: Arc<SpeechPipeline>,
    sink: Arc<dyn OutcomeSink>,
    handle: Handle,
}

impl PipelineRunner {
    pub fn new(pipeline: SpeechPipeline, sink: Arc<dyn OutcomeSink>, handle: Handle) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            sink,
            handle,
        }
    }

    /// Start `request` in the background.
    ///
    /// Aborting the returned handle kills whichever external program is
    /// running and removes the request's temp directory.
    pub fn run(&self, request: PlaybackRequest) -> JoinHandle<PipelineOutcome> {
        let pipeline = Arc::clone(&self.pipeline);
        let sink = Arc::clone(&self.sink);
        self.handle.spawn(async move {
            let outcome = pipeline.synthesize(&request).await;
            sink.deliver(&request, &outcome).await;
            outcome
        })
    }

    /// Capture the current selection and read it with `settings`.
    ///
    /// Resolves to `None` when nothing usable was selected.
    pub fn read_selection(
        &self,
        capture: Arc<SelectionCapture>,
        settings: Settings,
    ) -> JoinHandle<Option<PipelineOutcome>> {
        let pipeline = Arc::clone(&self.pipeline);
        let sink = Arc::clone(&self.sink);
        self.handle.spawn(async move {
            let text = capture.capture().await;
            let request = match settings.request(text) {
                Ok(request) => request,
                Err(e) => {
                    tracing::info!("Nothing to read: {}", e);
                    sink.rejected(&e).await;
                    return None;
                }
            };

            sink.started(&request).await;
            let outcome = pipeline.synthesize(&request).await;
            sink.deliver(&request, &outcome).await;
            Some(outcome)
        })
    }
}

/// Reports outcomes as desktop notifications
pub struct NotificationSink {
    config: NotificationConfig,
}

impl NotificationSink {
    pub fn new(config: NotificationConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl OutcomeSink for NotificationSink {
    async fn started(&self, request: &PlaybackRequest) {
        if !self.config.on_start {
            return;
        }
        let subtitle = format!(
            "Speed: {} | Voice: {}",
            request.speed().label(),
            request.voice().label()
        );
        let body = preview(request.text(), self.config.preview_chars);
        notification::send("Reading...", &subtitle, &body).await;
    }

    async fn rejected(&self, _error: &RequestError) {
        notification::send("No Text Selected", "", "Please select some text first").await;
    }

    async fn deliver(&self, _request: &PlaybackRequest, outcome: &PipelineOutcome) {
        if outcome.is_played() || !self.config.on_error {
            return;
        }
        notification::send(outcome.title(), "", outcome.detail().unwrap_or_default()).await;
    }
}

/// Reports outcomes on the terminal
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait::async_trait]
impl OutcomeSink for LogSink {
    async fn rejected(&self, error: &RequestError) {
        eprintln!("{}", error);
    }

    async fn deliver(&self, _request: &PlaybackRequest, outcome: &PipelineOutcome) {
        if outcome.is_played() {
            tracing::debug!("Request finished");
        } else {
            eprintln!("{}", outcome);
        }
    }
}
