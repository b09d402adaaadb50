//! Playback request types
//!
//! A [`PlaybackRequest`] carries one piece of text, a voice and a speed
//! through the pipeline. Construction validates everything the external
//! engines would choke on, so an invalid request can never spawn a process.

use crate::error::RequestError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Speeds offered by the menu bar speed selector, ascending
pub const SPEED_OPTIONS: [f64; 19] = [
    0.5, 0.6, 0.7, 0.75, 0.8, 0.85, 0.9, 0.95, 1.0, 1.05, 1.1, 1.15, 1.2, 1.25, 1.3, 1.4, 1.5,
    1.75, 2.0,
];

/// Voices supported by the TTS engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    #[default]
    Alba,
    Marius,
    Javert,
    Jean,
    Fantine,
    Cosette,
    Eponine,
    Azelma,
}

impl Voice {
    /// All voices, default first
    pub const ALL: [Voice; 8] = [
        Voice::Alba,
        Voice::Marius,
        Voice::Javert,
        Voice::Jean,
        Voice::Fantine,
        Voice::Cosette,
        Voice::Eponine,
        Voice::Azelma,
    ];

    /// Identifier passed to the TTS engine (`alba`, `marius`, ...)
    pub fn id(&self) -> &'static str {
        match self {
            Voice::Alba => "alba",
            Voice::Marius => "marius",
            Voice::Javert => "javert",
            Voice::Jean => "jean",
            Voice::Fantine => "fantine",
            Voice::Cosette => "cosette",
            Voice::Eponine => "eponine",
            Voice::Azelma => "azelma",
        }
    }

    /// Capitalized name for menus and notifications
    pub fn label(&self) -> &'static str {
        match self {
            Voice::Alba => "Alba",
            Voice::Marius => "Marius",
            Voice::Javert => "Javert",
            Voice::Jean => "Jean",
            Voice::Fantine => "Fantine",
            Voice::Cosette => "Cosette",
            Voice::Eponine => "Eponine",
            Voice::Azelma => "Azelma",
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Voice {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Voice::ALL
            .into_iter()
            .find(|v| v.id() == wanted)
            .ok_or_else(|| RequestError::UnknownVoice(s.to_string()))
    }
}

/// Playback-rate multiplier, always finite and strictly positive
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Speed(f64);

impl Speed {
    /// Unmodified playback rate
    pub const NORMAL: Speed = Speed(1.0);

    pub fn new(value: f64) -> Result<Self, RequestError> {
        if value.is_finite() && value > 0.0 {
            Ok(Speed(value))
        } else {
            Err(RequestError::InvalidSpeed(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_normal(&self) -> bool {
        self.0 == 1.0
    }

    /// Menu label, e.g. `0.85x` or `1.0x`
    pub fn label(&self) -> String {
        format!("{}x", self)
    }
}

impl Default for Speed {
    fn default() -> Self {
        Speed::NORMAL
    }
}

impl fmt::Display for Speed {
    // Debug formatting keeps the trailing `.0` on whole numbers ("1.0", "2.0")
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl TryFrom<f64> for Speed {
    type Error = RequestError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Speed::new(value)
    }
}

impl From<Speed> for f64 {
    fn from(speed: Speed) -> f64 {
        speed.0
    }
}

impl FromStr for Speed {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .trim_end_matches(['x', 'X'])
            .parse()
            .map_err(|_| RequestError::UnparsableSpeed(s.to_string()))?;
        Speed::new(value)
    }
}

/// One unit of work: text to read with a voice at a speed
#[derive(Debug, Clone)]
pub struct PlaybackRequest {
    text: String,
    voice: Voice,
    speed: Speed,
}

impl PlaybackRequest {
    /// Build a request, rejecting blank text before anything is spawned
    pub fn new(text: impl Into<String>, voice: Voice, speed: Speed) -> Result<Self, RequestError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(RequestError::BlankText);
        }
        Ok(Self { text, voice, speed })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn voice(&self) -> Voice {
        self.voice
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }
}
