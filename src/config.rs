//! Configuration loading and types for dyslexia-reader
//!
//! Configuration is loaded in layers:
//! 1. Built-in defaults
//! 2. Config file (~/.config/dyslexia-reader/config.toml)
//! 3. Environment variables (SPEED, VOICE, DYSLEXIA_READER_*)
//! 4. CLI arguments (highest priority)

use crate::error::{ReaderError, Result};
use crate::pipeline::tool::CommandTemplate;
use crate::request::{Speed, Voice};
use crate::text::PREVIEW_CHARS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file content
pub const DEFAULT_CONFIG: &str = r#"# Dyslexia Reader Configuration
#
# Location: ~/.config/dyslexia-reader/config.toml
# All settings can be overridden via CLI flags

[reader]
# Voice used by the TTS engine
# Options: alba, marius, javert, jean, fantine, cosette, eponine, azelma
voice = "alba"

# Playback speed multiplier (any positive number, e.g. 0.85 or 1.25)
# When unset, `speak` uses 0.85 and the menu bar starts at 1.0
# Environment: SPEED=0.85
# speed = 0.85

[tts]
# Text-to-speech engine. Placeholders: {text}, {voice}, {output}
# Must write a WAV file to {output} and exit 0 on success.
command = ["uvx", "pocket-tts", "generate", "--text", "{text}", "--voice", "{voice}", "--output-path", "{output}"]

# Give up after this many seconds (0 = no limit). The first run may
# download the engine and its model, so keep this generous if set.
timeout_secs = 0

[tempo]
# Tempo (time-stretch) tool. Placeholders: {input}, {output},
# {filter} (e.g. "atempo=0.5,atempo=0.5") and {stages} (e.g. "0.5,0.5")
command = ["ffmpeg", "-y", "-loglevel", "error", "-i", "{input}", "-filter:a", "{filter}", "{output}"]
timeout_secs = 0

# Play the unadjusted audio if the tempo tool fails (default: report an error)
fallback_to_original = false

[player]
# Audio player. Placeholder: {input}
# Defaults to afplay on macOS and ffplay elsewhere.
# command = ["afplay", "{input}"]
timeout_secs = 0

[capture]
# Clipboard backend for reading the current selection
# Options: auto, macos, wayland, x11
backend = "auto"

# Wait between the copy keystroke and reading the clipboard
settle_delay_ms = 100

# Put the previous clipboard contents back after capturing
restore_clipboard = false

[notification]
# Show "Reading..." with a preview when a request starts
on_start = true

# Show a notification when a request fails
on_error = true

# Show a notification when speed or voice changes in the menu bar
on_settings_change = true

# Characters of selected text shown in the "Reading..." preview
preview_chars = 50

[menubar]
# Save speed/voice chosen in the menu bar back to this file
remember_selection = false
"#;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub reader: ReaderConfig,

    #[serde(default)]
    pub tts: TtsConfig,

    #[serde(default)]
    pub tempo: TempoConfig,

    #[serde(default)]
    pub player: PlayerConfig,

    #[serde(default)]
    pub capture: CaptureConfig,

    #[serde(default)]
    pub notification: NotificationConfig,

    #[serde(default)]
    pub menubar: MenubarConfig,
}

/// Voice and speed selection
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReaderConfig {
    #[serde(default)]
    pub voice: Voice,

    /// Playback speed; `None` lets each entry point pick its own default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<Speed>,
}

/// Text-to-speech engine command
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TtsConfig {
    #[serde(default = "default_tts_command")]
    pub command: CommandTemplate,

    /// 0 = wait for the engine however long the text is
    #[serde(default)]
    pub timeout_secs: u64,
}

/// Tempo adjustment command
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TempoConfig {
    #[serde(default = "default_tempo_command")]
    pub command: CommandTemplate,

    /// 0 = no limit
    #[serde(default)]
    pub timeout_secs: u64,

    /// Play unadjusted audio when the tempo tool fails
    #[serde(default)]
    pub fallback_to_original: bool,
}

/// Audio player command
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerConfig {
    #[serde(default = "default_player_command")]
    pub command: CommandTemplate,

    /// 0 = wait for the player however long the audio is
    #[serde(default)]
    pub timeout_secs: u64,
}

/// Clipboard backend selection
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CaptureBackend {
    /// macOS on macOS, Wayland when WAYLAND_DISPLAY is set, X11 otherwise
    #[default]
    Auto,
    /// pbpaste/pbcopy + osascript
    Macos,
    /// wl-paste/wl-copy + wtype
    Wayland,
    /// xclip + xdotool
    X11,
}

/// Selection capture settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaptureConfig {
    #[serde(default)]
    pub backend: CaptureBackend,

    /// Delay between the copy keystroke and the clipboard read (ms)
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,

    /// Restore the previous clipboard contents after capture
    #[serde(default)]
    pub restore_clipboard: bool,
}

/// Notification configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
    /// Notify with a text preview when reading starts
    #[serde(default = "default_true")]
    pub on_start: bool,

    /// Notify when generation, adjustment or playback fails
    #[serde(default = "default_true")]
    pub on_error: bool,

    /// Notify when the menu bar speed or voice changes
    #[serde(default = "default_true")]
    pub on_settings_change: bool,

    /// Preview length in characters
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

/// Menu bar behavior
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MenubarConfig {
    /// Persist menu selections to the config file
    #[serde(default)]
    pub remember_selection: bool,
}

fn default_true() -> bool {
    true
}

fn default_tts_command() -> CommandTemplate {
    CommandTemplate::new([
        "uvx",
        "pocket-tts",
        "generate",
        "--text",
        "{text}",
        "--voice",
        "{voice}",
        "--output-path",
        "{output}",
    ])
}

fn default_tempo_command() -> CommandTemplate {
    CommandTemplate::new([
        "ffmpeg",
        "-y",
        "-loglevel",
        "error",
        "-i",
        "{input}",
        "-filter:a",
        "{filter}",
        "{output}",
    ])
}

fn default_player_command() -> CommandTemplate {
    if cfg!(target_os = "macos") {
        CommandTemplate::new(["afplay", "{input}"])
    } else {
        CommandTemplate::new(["ffplay", "-nodisp", "-autoexit", "-loglevel", "error", "{input}"])
    }
}

fn default_settle_delay() -> u64 {
    100
}

fn default_preview_chars() -> usize {
    PREVIEW_CHARS
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            command: default_tts_command(),
            timeout_secs: 0,
        }
    }
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            command: default_tempo_command(),
            timeout_secs: 0,
            fallback_to_original: false,
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            command: default_player_command(),
            timeout_secs: 0,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            backend: CaptureBackend::Auto,
            settle_delay_ms: default_settle_delay(),
            restore_clipboard: false,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            on_start: true,
            on_error: true,
            on_settings_change: true,
            preview_chars: default_preview_chars(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "dyslexia-reader")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get the runtime directory for ephemeral files (locks)
    pub fn runtime_dir() -> PathBuf {
        // Use XDG_RUNTIME_DIR if available, otherwise fall back to the temp dir
        std::env::var("XDG_RUNTIME_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir())
            .join("dyslexia-reader")
    }

    /// Apply environment overrides on top of file/default values
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(speed) = lookup("SPEED") {
            let speed = speed
                .parse::<Speed>()
                .map_err(|e| ReaderError::Config(format!("SPEED: {}", e)))?;
            self.reader.speed = Some(speed);
        }
        if let Some(voice) = lookup("VOICE") {
            self.reader.voice = voice
                .parse::<Voice>()
                .map_err(|e| ReaderError::Config(format!("VOICE: {}", e)))?;
        }
        if let Some(backend) = lookup("DYSLEXIA_READER_CAPTURE_BACKEND") {
            self.capture.backend = match backend.to_lowercase().as_str() {
                "macos" => CaptureBackend::Macos,
                "wayland" => CaptureBackend::Wayland,
                "x11" => CaptureBackend::X11,
                _ => CaptureBackend::Auto,
            };
        }
        Ok(())
    }
}

/// Load configuration from file, with defaults for missing values
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    // Start with defaults
    let mut config = Config::default();

    // Determine config file path
    let config_path = path.map(PathBuf::from).or_else(Config::default_path);

    // Load from file if it exists
    if let Some(ref path) = config_path {
        if path.exists() {
            tracing::debug!("Loading config from {:?}", path);
            let contents = std::fs::read_to_string(path)
                .map_err(|e| ReaderError::Config(format!("Failed to read config: {}", e)))?;

            config = toml::from_str(&contents)
                .map_err(|e| ReaderError::Config(format!("Invalid config: {}", e)))?;
        } else {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
        }
    }

    // Override from environment variables
    config.apply_env(|key| std::env::var(key).ok())?;

    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ReaderError::Config(format!("Failed to create config dir: {}", e)))?;
    }

    let contents = toml::to_string_pretty(config)
        .map_err(|e| ReaderError::Config(format!("Failed to serialize config: {}", e)))?;

    std::fs::write(path, contents)
        .map_err(|e| ReaderError::Config(format!("Failed to write config: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.reader.voice, Voice::Alba);
        assert!(config.reader.speed.is_none());
        assert_eq!(config.tts.command.program(), Some("uvx"));
        assert_eq!(config.tempo.command.program(), Some("ffmpeg"));
        assert_eq!(config.capture.settle_delay_ms, 100);
        assert!(!config.capture.restore_clipboard);
        assert!(!config.tempo.fallback_to_original);
        assert_eq!(config.notification.preview_chars, 50);
    }

    #[test]
    fn test_default_tool_timeouts_are_unlimited() {
        let config = Config::default();
        assert_eq!(config.tts.timeout_secs, 0);
        assert_eq!(config.tempo.timeout_secs, 0);
        assert_eq!(config.player.timeout_secs, 0);

        let parsed: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed.tts.timeout_secs, 0);
        assert_eq!(parsed.tempo.timeout_secs, 0);
    }

    #[test]
    fn test_timeout_is_opt_in() {
        let config: Config = toml::from_str("[tts]\ntimeout_secs = 600\n").unwrap();
        assert_eq!(config.tts.timeout_secs, 600);
        assert_eq!(config.tempo.timeout_secs, 0);
    }

    #[test]
    fn test_default_config_text_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.reader.voice, Voice::Alba);
        assert_eq!(config.tts.command, Config::default().tts.command);
        assert_eq!(config.tempo.command, Config::default().tempo.command);
        assert_eq!(config.capture.backend, CaptureBackend::Auto);
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
            [reader]
            voice = "javert"
            speed = 1.25

            [tts]
            command = ["my-tts", "{text}", "{output}"]

            [tempo]
            fallback_to_original = true

            [capture]
            backend = "wayland"
            settle_delay_ms = 250
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.reader.voice, Voice::Javert);
        assert_eq!(config.reader.speed.unwrap().value(), 1.25);
        assert_eq!(config.tts.command.argv(), ["my-tts", "{text}", "{output}"]);
        assert_eq!(config.tts.timeout_secs, 0); // default
        assert!(config.tempo.fallback_to_original);
        assert_eq!(config.capture.backend, CaptureBackend::Wayland);
        assert_eq!(config.capture.settle_delay_ms, 250);
    }

    #[test]
    fn test_parse_rejects_bad_speed() {
        let toml_str = r#"
            [reader]
            speed = -1.0
        "#;
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_voice() {
        let toml_str = r#"
            [reader]
            voice = "gandalf"
        "#;
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("SPEED", "0.7"),
                ("VOICE", "Marius"),
                ("DYSLEXIA_READER_CAPTURE_BACKEND", "x11"),
            ]))
            .unwrap();
        assert_eq!(config.reader.speed.unwrap().value(), 0.7);
        assert_eq!(config.reader.voice, Voice::Marius);
        assert_eq!(config.capture.backend, CaptureBackend::X11);
    }

    #[test]
    fn test_env_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.apply_env(env(&[("SPEED", "fast")])).is_err());
        assert!(config.apply_env(env(&[("SPEED", "0")])).is_err());
        assert!(config.apply_env(env(&[("VOICE", "nobody")])).is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        let mut config = Config::default();
        config.reader.voice = Voice::Eponine;
        config.reader.speed = Some(Speed::new(1.4).unwrap());
        save_config(&config, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let reloaded: Config = toml::from_str(&contents).unwrap();
        assert_eq!(reloaded.reader.voice, Voice::Eponine);
        assert_eq!(reloaded.reader.speed.unwrap().value(), 1.4);
        assert_eq!(reloaded.player.command, config.player.command);
    }
}
