//! Wayland clipboard via wl-clipboard and wtype
//!
//! Requires: wl-clipboard and wtype packages installed

use super::{in_path, keystroke_command, read_command, write_command, Clipboard};
use crate::error::CaptureError;

/// Wayland clipboard backend
#[derive(Debug, Default)]
pub struct WaylandClipboard;

impl WaylandClipboard {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Clipboard for WaylandClipboard {
    async fn read_text(&self) -> Result<String, CaptureError> {
        let output = read_command("wl-paste", &["--no-newline", "--type", "text"]).await?;
        if !output.status.success() {
            // wl-paste exits non-zero when the clipboard is empty
            tracing::debug!(
                "wl-paste: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(String::new());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn write_text(&self, text: &str) -> Result<(), CaptureError> {
        write_command("wl-copy", &[], text).await
    }

    async fn trigger_copy(&self) -> Result<(), CaptureError> {
        // Hold ctrl, tap c, release ctrl
        keystroke_command("wtype", &["-M", "ctrl", "c", "-m", "ctrl"]).await
    }

    async fn is_available(&self) -> bool {
        ["wl-paste", "wl-copy", "wtype"]
            .iter()
            .all(|tool| in_path(tool))
    }

    fn name(&self) -> &'static str {
        "Wayland (wl-paste/wtype)"
    }
}
