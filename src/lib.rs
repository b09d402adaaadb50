//! Dyslexia Reader: read selected text aloud at an adjustable speed
//!
//! This library provides the core functionality for:
//! - Capturing the current selection via the system clipboard
//! - Generating speech with an external TTS engine
//! - Time-stretching audio with a chain of ffmpeg `atempo` stages
//! - Playing the result and reporting failures as notifications
//!
//! # Architecture
//!
//! ```text
//!     ┌──────────────┐          ┌──────────────┐
//!     │  CLI speak   │          │   Menu bar   │
//!     │ (args/stdin) │          │    (tao)     │
//!     └──────────────┘          └──────────────┘
//!            │                          │ Read Selected Text
//!            │                          ▼
//!            │                 ┌──────────────────┐
//!            │                 │ SelectionCapture │
//!            │                 │ copy + clipboard │
//!            │                 └──────────────────┘
//!            │ text                     │ text
//!            ▼                          ▼
//!     ┌─────────────────────────────────────────────┐
//!     │   PlaybackRequest (text, voice, speed)      │
//!     │   blank text rejected here                  │
//!     └─────────────────────────────────────────────┘
//!                           │
//!                           ▼ one task per request
//!                  ┌──────────────────┐
//!                  │  PipelineRunner  │──▶ OutcomeSink
//!                  └──────────────────┘   (notifications / stderr)
//!                           │
//!                           ▼
//!     ┌─────────────────────────────────────────────┐
//!     │ SpeechPipeline (per-request temp directory) │
//!     │   TTS ──▶ raw.wav ──▶ atempo ──▶ final.wav  │
//!     │                   ──▶ player                │
//!     └─────────────────────────────────────────────┘
//! ```

pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
#[cfg(target_os = "macos")]
pub mod menubar;
pub mod notification;
pub mod pipeline;
pub mod request;
pub mod settings;
pub mod tempo;
pub mod text;

pub use config::Config;
pub use error::{ReaderError, Result};
pub use pipeline::{PipelineOutcome, SpeechPipeline};
pub use request::{PlaybackRequest, Speed, Voice};
