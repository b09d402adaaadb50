//! X11 clipboard via xclip and xdotool
//!
//! Uses the CLIPBOARD selection (the one Ctrl+C fills), not PRIMARY.
//!
//! Requires: xclip and xdotool packages installed

use super::{in_path, keystroke_command, read_command, write_command, Clipboard};
use crate::error::CaptureError;

/// X11 clipboard backend
#[derive(Debug, Default)]
pub struct X11Clipboard;

impl X11Clipboard {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Clipboard for X11Clipboard {
    async fn read_text(&self) -> Result<String, CaptureError> {
        let output = read_command("xclip", &["-selection", "clipboard", "-o"]).await?;
        if !output.status.success() {
            // xclip fails when nothing owns the selection
            return Ok(String::new());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn write_text(&self, text: &str) -> Result<(), CaptureError> {
        write_command("xclip", &["-selection", "clipboard"], text).await
    }

    async fn trigger_copy(&self) -> Result<(), CaptureError> {
        keystroke_command("xdotool", &["key", "--clearmodifiers", "ctrl+c"]).await
    }

    async fn is_available(&self) -> bool {
        ["xclip", "xdotool"].iter().all(|tool| in_path(tool))
    }

    fn name(&self) -> &'static str {
        "X11 (xclip/xdotool)"
    }
}
