//! Selected-text capture via the system clipboard
//!
//! There is no portable way to ask another application for its selection,
//! so capture goes through the clipboard:
//! 1. snapshot the current clipboard text
//! 2. simulate the platform "copy" keystroke
//! 3. wait a moment for the focused app to publish the copy
//! 4. read the clipboard
//!
//! The copy is asynchronous relative to the read, hence the settle delay.
//! The result may equal the snapshot when nothing was selected; callers
//! treat empty or unchanged text as "nothing usable was selected".
//!
//! The clipboard is shared with every other process on the desktop, so
//! nothing here assumes it stays untouched between steps.

pub mod macos;
pub mod wayland;
pub mod x11;

use crate::config::{CaptureBackend, CaptureConfig};
use crate::error::CaptureError;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Trait for clipboard backends
#[async_trait::async_trait]
pub trait Clipboard: Send + Sync {
    /// Current clipboard text (empty if the clipboard holds no text)
    async fn read_text(&self) -> Result<String, CaptureError>;

    /// Replace the clipboard text
    async fn write_text(&self, text: &str) -> Result<(), CaptureError>;

    /// Simulate the "copy selection" keystroke in the focused application
    async fn trigger_copy(&self) -> Result<(), CaptureError>;

    /// Check if the tools this backend needs are installed
    async fn is_available(&self) -> bool;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Pick a concrete backend for `auto`
pub fn resolve_backend(configured: CaptureBackend, wayland_session: bool) -> CaptureBackend {
    match configured {
        CaptureBackend::Auto if cfg!(target_os = "macos") => CaptureBackend::Macos,
        CaptureBackend::Auto if wayland_session => CaptureBackend::Wayland,
        CaptureBackend::Auto => CaptureBackend::X11,
        explicit => explicit,
    }
}

/// Factory function that returns the clipboard backend for this session
pub fn create_clipboard(backend: CaptureBackend) -> Box<dyn Clipboard> {
    let wayland_session = std::env::var_os("WAYLAND_DISPLAY").is_some();
    match resolve_backend(backend, wayland_session) {
        CaptureBackend::Macos => Box::new(macos::MacosClipboard::new()),
        CaptureBackend::Wayland => Box::new(wayland::WaylandClipboard::new()),
        CaptureBackend::X11 | CaptureBackend::Auto => Box::new(x11::X11Clipboard::new()),
    }
}

/// Captures the user's current selection
pub struct SelectionCapture {
    clipboard: Box<dyn Clipboard>,
    settle_delay: Duration,
    restore: bool,
}

impl SelectionCapture {
    pub fn new(clipboard: Box<dyn Clipboard>, config: &CaptureConfig) -> Self {
        Self {
            clipboard,
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            restore: config.restore_clipboard,
        }
    }

    /// Create a capture using the configured (or auto-detected) backend
    pub fn from_config(config: &CaptureConfig) -> Self {
        Self::new(create_clipboard(config.backend), config)
    }

    pub fn backend_name(&self) -> &'static str {
        self.clipboard.name()
    }

    /// Copy the current selection and return the clipboard text.
    ///
    /// Never fails: if the clipboard or keystroke tools are unavailable the
    /// result is empty, which callers treat as "no text selected".
    pub async fn capture(&self) -> String {
        match self.try_capture().await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Selection capture via {} failed: {}", self.clipboard.name(), e);
                String::new()
            }
        }
    }

    async fn try_capture(&self) -> Result<String, CaptureError> {
        let previous = self.clipboard.read_text().await.unwrap_or_else(|e| {
            tracing::debug!("Could not snapshot clipboard: {}", e);
            String::new()
        });

        self.clipboard.trigger_copy().await?;
        tokio::time::sleep(self.settle_delay).await;

        let text = self.clipboard.read_text().await?;
        if text == previous {
            tracing::debug!("Clipboard unchanged after copy, selection may be empty");
        }

        if self.restore && !previous.is_empty() && text != previous {
            if let Err(e) = self.clipboard.write_text(&previous).await {
                tracing::warn!("Failed to restore clipboard: {}", e);
            }
        }

        tracing::debug!("Captured {} chars", text.chars().count());
        Ok(text)
    }
}

/// Check whether a program is on PATH
pub(crate) fn in_path(program: &str) -> bool {
    which::which(program).is_ok()
}

fn spawn_error(tool: &'static str, e: std::io::Error) -> CaptureError {
    if e.kind() == std::io::ErrorKind::NotFound {
        CaptureError::ToolNotFound(tool)
    } else {
        CaptureError::ReadFailed(format!("{}: {}", tool, e))
    }
}

/// Run a clipboard-read command and collect its output
pub(crate) async fn read_command(
    tool: &'static str,
    args: &[&str],
) -> Result<std::process::Output, CaptureError> {
    Command::new(tool)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| spawn_error(tool, e))
}

/// Pipe `text` into a clipboard-write command
pub(crate) async fn write_command(
    tool: &'static str,
    args: &[&str],
    text: &str,
) -> Result<(), CaptureError> {
    let mut child = Command::new(tool)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| match spawn_error(tool, e) {
            CaptureError::ReadFailed(msg) => CaptureError::WriteFailed(msg),
            other => other,
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .await
            .map_err(|e| CaptureError::WriteFailed(e.to_string()))?;
        // Close stdin to signal EOF
        drop(stdin);
    }

    let status = child
        .wait()
        .await
        .map_err(|e| CaptureError::WriteFailed(e.to_string()))?;

    if !status.success() {
        return Err(CaptureError::WriteFailed(format!(
            "{} exited with error",
            tool
        )));
    }
    Ok(())
}

/// Run a keystroke-simulation command
pub(crate) async fn keystroke_command(tool: &'static str, args: &[&str]) -> Result<(), CaptureError> {
    let output = Command::new(tool)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| match spawn_error(tool, e) {
            CaptureError::ReadFailed(msg) => CaptureError::CopyFailed(msg),
            other => other,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CaptureError::CopyFailed(format!(
            "{} failed: {}",
            tool,
            stderr.trim()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// In-memory clipboard where "copy" publishes a fixed selection
    #[derive(Clone, Default)]
    struct FakeClipboard {
        contents: Arc<Mutex<String>>,
        selection: Option<String>,
        copy_fails: bool,
        writes: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait::async_trait]
    impl Clipboard for FakeClipboard {
        async fn read_text(&self) -> Result<String, CaptureError> {
            Ok(self.contents.lock().unwrap().clone())
        }

        async fn write_text(&self, text: &str) -> Result<(), CaptureError> {
            self.writes.lock().unwrap().push(text.to_string());
            *self.contents.lock().unwrap() = text.to_string();
            Ok(())
        }

        async fn trigger_copy(&self) -> Result<(), CaptureError> {
            if self.copy_fails {
                return Err(CaptureError::ToolNotFound("fake"));
            }
            if let Some(selection) = &self.selection {
                *self.contents.lock().unwrap() = selection.clone();
            }
            Ok(())
        }

        async fn is_available(&self) -> bool {
            true
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    fn config(restore: bool) -> CaptureConfig {
        CaptureConfig {
            backend: CaptureBackend::Auto,
            settle_delay_ms: 1,
            restore_clipboard: restore,
        }
    }

    fn fake(previous: &str, selection: Option<&str>) -> FakeClipboard {
        FakeClipboard {
            contents: Arc::new(Mutex::new(previous.to_string())),
            selection: selection.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_capture_returns_selection() {
        let clipboard = fake("old", Some("selected words"));
        let capture = SelectionCapture::new(Box::new(clipboard.clone()), &config(false));
        assert_eq!(capture.backend_name(), "fake");
        assert_eq!(capture.capture().await, "selected words");
        // Restoration disabled: clipboard keeps the copy
        assert_eq!(*clipboard.contents.lock().unwrap(), "selected words");
        assert!(clipboard.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_capture_restores_previous_clipboard() {
        let clipboard = fake("old", Some("selected words"));
        let capture = SelectionCapture::new(Box::new(clipboard.clone()), &config(true));
        assert_eq!(capture.capture().await, "selected words");
        assert_eq!(*clipboard.contents.lock().unwrap(), "old");
    }

    #[tokio::test]
    async fn test_capture_unchanged_clipboard_is_returned() {
        let clipboard = fake("still here", None);
        let capture = SelectionCapture::new(Box::new(clipboard.clone()), &config(true));
        assert_eq!(capture.capture().await, "still here");
        assert!(clipboard.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_capture_failure_is_empty() {
        let clipboard = FakeClipboard {
            copy_fails: true,
            ..fake("old", Some("new"))
        };
        let capture = SelectionCapture::new(Box::new(clipboard), &config(false));
        assert_eq!(capture.capture().await, "");
    }

    #[test]
    fn test_resolve_backend() {
        assert_eq!(
            resolve_backend(CaptureBackend::X11, true),
            CaptureBackend::X11
        );
        assert_eq!(
            resolve_backend(CaptureBackend::Macos, false),
            CaptureBackend::Macos
        );
        if cfg!(target_os = "macos") {
            assert_eq!(resolve_backend(CaptureBackend::Auto, true), CaptureBackend::Macos);
        } else {
            assert_eq!(resolve_backend(CaptureBackend::Auto, true), CaptureBackend::Wayland);
            assert_eq!(resolve_backend(CaptureBackend::Auto, false), CaptureBackend::X11);
        }
    }
}
