// Command-line interface definitions for dyslexia-reader
//
// This module is separate so it can be used by both the binary (main.rs)
// and build.rs for generating man pages.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dyslexia-reader")]
#[command(author, version, about = "Read selected text aloud at an adjustable speed")]
#[command(long_about = "
Dyslexia Reader speaks text aloud with a local text-to-speech engine,
slowed down or sped up to a comfortable pace.

REQUIREMENTS:
  - A TTS engine (default: uvx pocket-tts)
  - ffmpeg for speed adjustment
  - An audio player (afplay on macOS, ffplay elsewhere)
  - Clipboard tools for `read`: pbpaste/osascript (macOS),
    wl-clipboard + wtype (Wayland) or xclip + xdotool (X11)

USAGE:
  echo \"Hello world\" | dyslexia-reader speak
  dyslexia-reader --speed 0.75 --voice marius speak Hello world
  dyslexia-reader read        (reads the current selection)
  dyslexia-reader menubar     (macOS menu bar app)

Speed and voice can also be set with the SPEED and VOICE environment
variables or in the config file.
")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<std::path::PathBuf>,

    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Playback speed multiplier (e.g. 0.85, 1.25, 2x)
    #[arg(long, value_name = "SPEED")]
    pub speed: Option<String>,

    /// Voice (alba, marius, javert, jean, fantine, cosette, eponine, azelma)
    #[arg(long, value_name = "VOICE")]
    pub voice: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Speak text given as arguments or piped on stdin
    Speak {
        /// Text to speak (read from stdin when omitted)
        text: Vec<String>,
    },

    /// Copy the current selection and read it aloud
    Read,

    /// Run the menu bar app (macOS only)
    Menubar,

    /// Show the tempo filter chain used for a speed
    Plan {
        /// Speed multiplier, e.g. 0.25 or 3
        speed: String,
    },

    /// Check that the configured external tools are installed
    Check,

    /// Show current configuration
    Config,
}
