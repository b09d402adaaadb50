//! macOS clipboard via pbpaste/pbcopy and osascript
//!
//! The copy keystroke is sent through System Events, which requires
//! Accessibility permission for the app (or terminal) running the reader.

use super::{in_path, keystroke_command, read_command, write_command, Clipboard};
use crate::error::CaptureError;

/// AppleScript that presses Cmd+C in the frontmost application
const COPY_SCRIPT: &str = r#"tell application "System Events" to keystroke "c" using command down"#;

/// macOS clipboard backend
#[derive(Debug, Default)]
pub struct MacosClipboard;

impl MacosClipboard {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Clipboard for MacosClipboard {
    async fn read_text(&self) -> Result<String, CaptureError> {
        let output = read_command("pbpaste", &[]).await?;
        if !output.status.success() {
            return Err(CaptureError::ReadFailed(
                "pbpaste exited with error".to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn write_text(&self, text: &str) -> Result<(), CaptureError> {
        write_command("pbcopy", &[], text).await
    }

    async fn trigger_copy(&self) -> Result<(), CaptureError> {
        keystroke_command("osascript", &["-e", COPY_SCRIPT])
            .await
            .map_err(|e| match e {
                // Check for common permission error
                CaptureError::CopyFailed(msg)
                    if msg.contains("not allowed") || msg.contains("accessibility") =>
                {
                    CaptureError::CopyFailed(
                        "Accessibility permission required. Grant access in System Settings > Privacy & Security > Accessibility".to_string(),
                    )
                }
                other => other,
            })
    }

    async fn is_available(&self) -> bool {
        cfg!(target_os = "macos")
            && ["pbpaste", "pbcopy", "osascript"]
                .iter()
                .all(|tool| in_path(tool))
    }

    fn name(&self) -> &'static str {
        "macOS (pbpaste/osascript)"
    }
}
