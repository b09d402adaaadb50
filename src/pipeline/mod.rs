//! Selection-to-speech pipeline
//!
//! One request runs strictly in order:
//!
//! ```text
//!   text ──▶ TTS engine ──▶ raw.wav ──▶ tempo tool ──▶ final.wav ──▶ player
//!                                       (skipped at 1.0x)
//! ```
//!
//! Every artifact lives in a temp directory owned by the request. The
//! directory is removed when [`SpeechPipeline::synthesize`] returns, on
//! every path, including task cancellation.

pub mod runner;
pub mod tool;

use crate::config::Config;
use crate::error::ToolError;
use crate::request::PlaybackRequest;
use crate::tempo;
use crate::text::{excerpt, DIAGNOSTIC_CHARS};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tool::{limit_from_secs, CommandTemplate};

pub use runner::{LogSink, NotificationSink, OutcomeSink, PipelineRunner};

/// Terminal result of one playback request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Audio played to completion
    Played,
    /// The TTS engine failed; nothing was played
    GenerationFailed(String),
    /// The tempo tool failed; nothing was played
    AdjustmentFailed(String),
    /// The player failed, or the request's temp storage could not be set up
    PlaybackFailed(String),
}

impl PipelineOutcome {
    pub fn is_played(&self) -> bool {
        matches!(self, PipelineOutcome::Played)
    }

    /// Short headline for notifications
    pub fn title(&self) -> &'static str {
        match self {
            PipelineOutcome::Played => "Finished reading",
            PipelineOutcome::GenerationFailed(_) => "TTS generation failed",
            PipelineOutcome::AdjustmentFailed(_) => "Speed adjustment failed",
            PipelineOutcome::PlaybackFailed(_) => "Playback failed",
        }
    }

    /// Truncated diagnostic, if this is a failure
    pub fn detail(&self) -> Option<&str> {
        match self {
            PipelineOutcome::Played => None,
            PipelineOutcome::GenerationFailed(d)
            | PipelineOutcome::AdjustmentFailed(d)
            | PipelineOutcome::PlaybackFailed(d) => Some(d),
        }
    }
}

impl fmt::Display for PipelineOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detail() {
            Some(detail) if !detail.is_empty() => write!(f, "{}: {}", self.title(), detail),
            _ => f.write_str(self.title()),
        }
    }
}

/// Short user-facing diagnostic for a tool failure
fn diagnostic(err: &ToolError) -> String {
    match err {
        // Engine stderr alone, the failing step is already in the title
        ToolError::NonZeroExit { stderr, .. } if !stderr.is_empty() => {
            excerpt(stderr, DIAGNOSTIC_CHARS)
        }
        other => excerpt(&other.to_string(), DIAGNOSTIC_CHARS),
    }
}

/// Runs TTS, tempo adjustment and playback for one request at a time.
///
/// Holds only immutable configuration, so a single instance can be shared
/// across concurrently running requests.
#[derive(Debug, Clone)]
pub struct SpeechPipeline {
    tts: CommandTemplate,
    tts_timeout: Option<Duration>,
    tempo: CommandTemplate,
    tempo_timeout: Option<Duration>,
    tempo_fallback: bool,
    player: CommandTemplate,
    player_timeout: Option<Duration>,
}

impl SpeechPipeline {
    /// Create a pipeline from configuration
    pub fn new(config: &Config) -> Self {
        Self {
            tts: config.tts.command.clone(),
            tts_timeout: limit_from_secs(config.tts.timeout_secs),
            tempo: config.tempo.command.clone(),
            tempo_timeout: limit_from_secs(config.tempo.timeout_secs),
            tempo_fallback: config.tempo.fallback_to_original,
            player: config.player.command.clone(),
            player_timeout: limit_from_secs(config.player.timeout_secs),
        }
    }

    /// Generate, adjust and play `request`, blocking this task until the
    /// player exits.
    pub async fn synthesize(&self, request: &PlaybackRequest) -> PipelineOutcome {
        let workdir = match tempfile::Builder::new()
            .prefix("dyslexia-reader-")
            .tempdir()
        {
            Ok(dir) => dir,
            Err(e) => {
                tracing::error!("Failed to create temp directory: {}", e);
                return PipelineOutcome::PlaybackFailed(excerpt(
                    &format!("temp storage: {}", e),
                    DIAGNOSTIC_CHARS,
                ));
            }
        };

        let outcome = self.run_steps(request, workdir.path()).await;

        if let Err(e) = workdir.close() {
            tracing::warn!("Failed to remove temp directory: {}", e);
        }
        outcome
    }

    async fn run_steps(&self, request: &PlaybackRequest, dir: &Path) -> PipelineOutcome {
        let raw_path = dir.join("raw.wav");
        let final_path = dir.join("final.wav");
        let raw = raw_path.to_string_lossy().into_owned();
        let adjusted = final_path.to_string_lossy().into_owned();

        tracing::info!(
            "Generating speech ({} chars, voice={}, speed={}x)",
            request.text().chars().count(),
            request.voice(),
            request.speed()
        );

        let generated = self
            .tts
            .run_checked(
                &[
                    ("text", request.text()),
                    ("voice", request.voice().id()),
                    ("output", raw.as_str()),
                ],
                self.tts_timeout,
            )
            .await;
        if let Err(e) = generated {
            tracing::error!("TTS generation failed: {}", e);
            return PipelineOutcome::GenerationFailed(diagnostic(&e));
        }

        let mut play_path = raw.as_str();

        if !request.speed().is_normal() {
            let chain = tempo::plan(request.speed());
            let filter = chain.atempo_filter();
            let stages = chain.to_string();
            tracing::debug!("Adjusting tempo with {}", filter);

            let result = self
                .tempo
                .run_checked(
                    &[
                        ("input", raw.as_str()),
                        ("output", adjusted.as_str()),
                        ("filter", filter.as_str()),
                        ("stages", stages.as_str()),
                    ],
                    self.tempo_timeout,
                )
                .await;

            match result {
                Ok(_) => play_path = adjusted.as_str(),
                Err(e) if self.tempo_fallback => {
                    tracing::warn!(
                        "Tempo adjustment failed: {}, playing at original speed",
                        e
                    );
                }
                Err(e) => {
                    tracing::error!("Tempo adjustment failed: {}", e);
                    return PipelineOutcome::AdjustmentFailed(diagnostic(&e));
                }
            }
        }

        tracing::info!("Playing...");
        let played = self
            .player
            .run_checked(&[("input", play_path)], self.player_timeout)
            .await;

        match played {
            Ok(_) => {
                tracing::info!("Playback finished");
                PipelineOutcome::Played
            }
            Err(e) => {
                tracing::error!("Playback failed: {}", e);
                PipelineOutcome::PlaybackFailed(diagnostic(&e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{Speed, Voice};

    fn pipeline(tts: &[&str], tempo: &[&str], player: &[&str]) -> SpeechPipeline {
        let mut config = Config::default();
        config.tts.command = CommandTemplate::new(tts.iter().copied());
        config.tempo.command = CommandTemplate::new(tempo.iter().copied());
        config.player.command = CommandTemplate::new(player.iter().copied());
        SpeechPipeline::new(&config)
    }

    fn request(speed: f64) -> PlaybackRequest {
        PlaybackRequest::new("Hello there", Voice::Alba, Speed::new(speed).unwrap()).unwrap()
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(PipelineOutcome::Played.to_string(), "Finished reading");
        assert_eq!(
            PipelineOutcome::GenerationFailed("bad voice".into()).to_string(),
            "TTS generation failed: bad voice"
        );
        assert!(PipelineOutcome::Played.is_played());
        assert_eq!(PipelineOutcome::Played.detail(), None);
    }

    #[test]
    fn test_diagnostic_is_truncated() {
        let err = ToolError::NonZeroExit {
            program: "tts".into(),
            code: Some(1),
            stderr: "e".repeat(400),
        };
        assert_eq!(diagnostic(&err).chars().count(), DIAGNOSTIC_CHARS);
    }

    #[tokio::test]
    async fn test_played_at_normal_speed() {
        let p = pipeline(
            &["sh", "-c", "printf audio > \"$1\"", "tts", "{output}"],
            &["false"],
            &["test", "-s", "{input}"],
        );
        assert_eq!(p.synthesize(&request(1.0)).await, PipelineOutcome::Played);
    }

    #[tokio::test]
    async fn test_generation_failure_carries_stderr() {
        let p = pipeline(
            &["sh", "-c", "echo 'voice not found' >&2; exit 2"],
            &["true"],
            &["true"],
        );
        assert_eq!(
            p.synthesize(&request(0.85)).await,
            PipelineOutcome::GenerationFailed("voice not found".into())
        );
    }

    #[tokio::test]
    async fn test_adjustment_failure() {
        let p = pipeline(
            &["sh", "-c", "printf audio > \"$1\"", "tts", "{output}"],
            &["sh", "-c", "echo 'Invalid filter' >&2; exit 1"],
            &["true"],
        );
        assert_eq!(
            p.synthesize(&request(0.85)).await,
            PipelineOutcome::AdjustmentFailed("Invalid filter".into())
        );
    }

    #[tokio::test]
    async fn test_adjustment_fallback_plays_raw() {
        let mut config = Config::default();
        config.tts.command =
            CommandTemplate::new(["sh", "-c", "printf audio > \"$1\"", "tts", "{output}"]);
        config.tempo.command = CommandTemplate::new(["false"]);
        config.tempo.fallback_to_original = true;
        config.player.command = CommandTemplate::new([
            "sh",
            "-c",
            "case \"$1\" in */raw.wav) exit 0;; *) exit 1;; esac",
            "play",
            "{input}",
        ]);
        let p = SpeechPipeline::new(&config);
        assert_eq!(p.synthesize(&request(1.5)).await, PipelineOutcome::Played);
    }

    #[tokio::test]
    async fn test_player_missing() {
        let p = pipeline(
            &["true"],
            &["true"],
            &["nonexistent_player_xyz_12345", "{input}"],
        );
        match p.synthesize(&request(1.0)).await {
            PipelineOutcome::PlaybackFailed(detail) => {
                assert!(detail.contains("nonexistent_player_xyz_12345"))
            }
            other => panic!("unexpected outcome: {other}"),
        }
    }
}
