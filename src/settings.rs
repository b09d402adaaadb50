//! Current voice and speed selection
//!
//! The CLI resolves its settings once per invocation. The menu bar keeps a
//! mutable [`Settings`] that menu commands update; each read request takes a
//! copy, so changing speed mid-read only affects the next request.

use crate::config::Config;
use crate::error::RequestError;
use crate::request::{PlaybackRequest, Speed, Voice};

/// Default speed for `speak` and `read` when none is configured
pub const CLI_DEFAULT_SPEED: f64 = 0.85;

/// Voice and speed used for the next request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub voice: Voice,
    pub speed: Speed,
}

impl Settings {
    /// Settings for the command-line entry points (0.85x unless configured)
    pub fn for_cli(config: &Config) -> Self {
        Self {
            voice: config.reader.voice,
            speed: config
                .reader
                .speed
                .unwrap_or(Speed::new(CLI_DEFAULT_SPEED).unwrap_or(Speed::NORMAL)),
        }
    }

    /// Initial menu bar settings (1.0x unless configured)
    pub fn for_menubar(config: &Config) -> Self {
        Self {
            voice: config.reader.voice,
            speed: config.reader.speed.unwrap_or(Speed::NORMAL),
        }
    }

    /// Build a request for `text` with these settings
    pub fn request(&self, text: impl Into<String>) -> Result<PlaybackRequest, RequestError> {
        PlaybackRequest::new(text, self.voice, self.speed)
    }

    /// Apply a menu command, returning a description of what changed.
    ///
    /// Returns `None` for commands that don't touch settings and for
    /// selections equal to the current value.
    pub fn apply(&mut self, command: &MenuCommand) -> Option<SettingsChange> {
        match *command {
            MenuCommand::SetSpeed(speed) if speed != self.speed => {
                self.speed = speed;
                Some(SettingsChange {
                    title: "Speed Changed",
                    message: format!("Reading speed set to {}", speed.label()),
                })
            }
            MenuCommand::SetVoice(voice) if voice != self.voice => {
                self.voice = voice;
                Some(SettingsChange {
                    title: "Voice Changed",
                    message: format!("Voice set to {}", voice.label()),
                })
            }
            _ => None,
        }
    }

    /// Write these settings into `config` for persistence
    pub fn store(&self, config: &mut Config) {
        config.reader.voice = self.voice;
        config.reader.speed = Some(self.speed);
    }
}

/// Notification text for a settings change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsChange {
    pub title: &'static str,
    pub message: String,
}

/// Actions available from the menu bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuCommand {
    ReadSelection,
    SetSpeed(Speed),
    SetVoice(Voice),
    Quit,
}

impl MenuCommand {
    /// Stable menu item id
    pub fn id(&self) -> String {
        match self {
            MenuCommand::ReadSelection => "read".to_string(),
            MenuCommand::SetSpeed(speed) => format!("speed_{}", speed),
            MenuCommand::SetVoice(voice) => format!("voice_{}", voice.id()),
            MenuCommand::Quit => "quit".to_string(),
        }
    }

    /// Parse a menu item id back into a command
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "read" => Some(MenuCommand::ReadSelection),
            "quit" => Some(MenuCommand::Quit),
            _ => {
                if let Some(speed) = id.strip_prefix("speed_") {
                    speed.parse().ok().map(MenuCommand::SetSpeed)
                } else if let Some(voice) = id.strip_prefix("voice_") {
                    voice.parse().ok().map(MenuCommand::SetVoice)
                } else {
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::SPEED_OPTIONS;

    fn speed(value: f64) -> Speed {
        Speed::new(value).unwrap()
    }

    #[test]
    fn test_entry_point_defaults() {
        let config = Config::default();
        assert_eq!(Settings::for_cli(&config).speed, speed(0.85));
        assert_eq!(Settings::for_menubar(&config).speed, Speed::NORMAL);
        assert_eq!(Settings::for_cli(&config).voice, Voice::Alba);
    }

    #[test]
    fn test_configured_speed_wins() {
        let mut config = Config::default();
        config.reader.speed = Some(speed(1.25));
        config.reader.voice = Voice::Cosette;
        assert_eq!(Settings::for_cli(&config).speed, speed(1.25));
        assert_eq!(Settings::for_menubar(&config).speed, speed(1.25));
        assert_eq!(Settings::for_menubar(&config).voice, Voice::Cosette);
    }

    #[test]
    fn test_apply_speed_change() {
        let mut settings = Settings::for_menubar(&Config::default());
        let change = settings.apply(&MenuCommand::SetSpeed(speed(0.85))).unwrap();
        assert_eq!(change.title, "Speed Changed");
        assert_eq!(change.message, "Reading speed set to 0.85x");
        assert_eq!(settings.speed, speed(0.85));

        // Same value again is not a change
        assert_eq!(settings.apply(&MenuCommand::SetSpeed(speed(0.85))), None);
    }

    #[test]
    fn test_apply_voice_change() {
        let mut settings = Settings::for_menubar(&Config::default());
        let change = settings.apply(&MenuCommand::SetVoice(Voice::Javert)).unwrap();
        assert_eq!(change.title, "Voice Changed");
        assert_eq!(change.message, "Voice set to Javert");
        assert_eq!(settings.voice, Voice::Javert);
        assert_eq!(settings.apply(&MenuCommand::ReadSelection), None);
    }

    #[test]
    fn test_request_uses_snapshot() {
        let mut settings = Settings::for_cli(&Config::default());
        let request = settings.request("hello").unwrap();
        settings.apply(&MenuCommand::SetSpeed(speed(2.0)));
        assert_eq!(request.speed(), speed(0.85));
        assert!(matches!(
            settings.request("   "),
            Err(RequestError::BlankText)
        ));
    }

    #[test]
    fn test_menu_ids_round_trip() {
        assert_eq!(MenuCommand::ReadSelection.id(), "read");
        assert_eq!(MenuCommand::SetSpeed(speed(0.85)).id(), "speed_0.85");
        assert_eq!(MenuCommand::SetSpeed(Speed::NORMAL).id(), "speed_1.0");
        assert_eq!(MenuCommand::SetVoice(Voice::Alba).id(), "voice_alba");

        for value in SPEED_OPTIONS {
            let command = MenuCommand::SetSpeed(speed(value));
            assert_eq!(MenuCommand::from_id(&command.id()), Some(command));
        }
        for voice in Voice::ALL {
            let command = MenuCommand::SetVoice(voice);
            assert_eq!(MenuCommand::from_id(&command.id()), Some(command));
        }
        assert_eq!(MenuCommand::from_id("speed_fast"), None);
        assert_eq!(MenuCommand::from_id("bogus"), None);
    }

    #[test]
    fn test_store() {
        let mut config = Config::default();
        let settings = Settings {
            voice: Voice::Jean,
            speed: speed(1.5),
        };
        settings.store(&mut config);
        assert_eq!(config.reader.voice, Voice::Jean);
        assert_eq!(config.reader.speed, Some(speed(1.5)));
    }
}
