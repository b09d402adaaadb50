//! Error types for dyslexia-reader
//!
//! Uses thiserror for ergonomic error definitions with clear messages
//! that guide users toward fixing common issues.

use thiserror::Error;

/// Top-level error type for the dyslexia-reader application
#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using ReaderError
pub type Result<T> = std::result::Result<T, ReaderError>;

/// A playback request that must never reach an external engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    #[error("no text to read (text is empty or whitespace only)")]
    BlankText,

    #[error("speed must be a positive number, got {0}")]
    InvalidSpeed(f64),

    #[error("speed '{0}' is not a number")]
    UnparsableSpeed(String),

    #[error("unknown voice '{0}'. Available: alba, marius, javert, jean, fantine, cosette, eponine, azelma")]
    UnknownVoice(String),
}

/// Errors from the clipboard / selection capture backends
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("{0} not found in PATH. Install it via your package manager.")]
    ToolNotFound(&'static str),

    #[error("Copy keystroke failed: {0}")]
    CopyFailed(String),

    #[error("Clipboard read failed: {0}")]
    ReadFailed(String),

    #[error("Clipboard write failed: {0}")]
    WriteFailed(String),
}

/// Errors from running an external command (TTS engine, tempo tool, player)
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("{program} not found in PATH")]
    NotFound { program: String },

    #[error("failed to run {program}: {message}")]
    SpawnFailed { program: String, message: String },

    #[error("{program} timed out after {secs}s")]
    Timeout { program: String, secs: u64 },

    #[error("{program} {}", exit_detail(.code, .stderr))]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("command template is empty")]
    EmptyCommand,
}

/// "exited with status 1: <stderr>" or "was killed by a signal"
fn exit_detail(code: &Option<i32>, stderr: &str) -> String {
    let status = match code {
        Some(code) => format!("exited with status {}", code),
        None => "was killed by a signal".to_string(),
    };
    if stderr.is_empty() {
        status
    } else {
        format!("{}: {}", status, stderr)
    }
}
