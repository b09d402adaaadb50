//! Dyslexia Reader - read selected text aloud at an adjustable speed
//!
//! Use `dyslexia-reader speak` to read piped or argument text.
//! Use `dyslexia-reader read` to read the current selection.
//! Use `dyslexia-reader menubar` to run the macOS menu bar app.

use clap::Parser;
use dyslexia_reader::capture::{self, SelectionCapture};
use dyslexia_reader::cli::{Cli, Commands};
use dyslexia_reader::config::{self, Config};
use dyslexia_reader::error::RequestError;
use dyslexia_reader::pipeline::{LogSink, NotificationSink, PipelineRunner, SpeechPipeline};
use dyslexia_reader::request::{Speed, Voice};
use dyslexia_reader::settings::Settings;
use dyslexia_reader::tempo;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::runtime::Handle;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new(format!("dyslexia_reader={},warn", log_level))
            }),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let mut config = config::load_config(cli.config.as_deref())?;

    // Apply CLI overrides
    if let Some(speed) = cli.speed {
        config.reader.speed = Some(speed.parse::<Speed>()?);
    }
    if let Some(voice) = cli.voice {
        config.reader.voice = voice.parse::<Voice>()?;
    }

    match cli.command {
        Commands::Speak { text } => {
            speak(&config, text).await?;
        }

        Commands::Read => {
            read_selection(&config).await?;
        }

        Commands::Menubar => {
            run_menubar(config, cli.config)?;
        }

        Commands::Plan { speed } => {
            show_plan(&speed)?;
        }

        Commands::Check => {
            run_check(&config).await;
        }

        Commands::Config => {
            show_config(&config)?;
        }
    }

    Ok(())
}

/// Speak argument or stdin text, waiting for playback to finish
async fn speak(config: &Config, args: Vec<String>) -> anyhow::Result<()> {
    let text = if !args.is_empty() {
        args.join(" ")
    } else if !std::io::stdin().is_terminal() {
        let mut input = String::new();
        tokio::io::stdin().read_to_string(&mut input).await?;
        input
    } else {
        eprintln!("Usage: dyslexia-reader speak <TEXT>...");
        eprintln!("   or: echo \"text\" | dyslexia-reader speak");
        std::process::exit(1);
    };

    let settings = Settings::for_cli(config);
    let request = match settings.request(text) {
        Ok(request) => request,
        Err(RequestError::BlankText) => {
            eprintln!("No text provided");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    eprintln!(
        "Generating speech... (voice={}, speed={})",
        request.voice(),
        request.speed().label()
    );

    let runner = PipelineRunner::new(
        SpeechPipeline::new(config),
        Arc::new(LogSink),
        Handle::current(),
    );
    // Failures were already reported by the sink
    runner.run(request).await?;
    Ok(())
}

/// Capture the current selection and read it once
async fn read_selection(config: &Config) -> anyhow::Result<()> {
    let capture = Arc::new(SelectionCapture::from_config(&config.capture));
    tracing::debug!("Using clipboard backend: {}", capture.backend_name());
    let runner = PipelineRunner::new(
        SpeechPipeline::new(config),
        Arc::new(NotificationSink::new(config.notification.clone())),
        Handle::current(),
    );

    match runner
        .read_selection(capture, Settings::for_cli(config))
        .await?
    {
        None => eprintln!("No text selected"),
        Some(outcome) if !outcome.is_played() => eprintln!("{}", outcome),
        Some(_) => {}
    }
    Ok(())
}

#[cfg(target_os = "macos")]
fn run_menubar(config: Config, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config_path = config_path.or_else(Config::default_path);
    dyslexia_reader::menubar::run(config, config_path, Handle::current())
}

#[cfg(not(target_os = "macos"))]
fn run_menubar(_config: Config, _config_path: Option<PathBuf>) -> anyhow::Result<()> {
    anyhow::bail!("The menu bar app is only available on macOS. Use `dyslexia-reader read` instead.")
}

/// Show the tempo filter chain for a speed
fn show_plan(speed: &str) -> anyhow::Result<()> {
    let speed: Speed = speed.parse()?;
    let chain = tempo::plan(speed);

    println!("Speed: {}", speed.label());
    if speed.is_normal() {
        println!("No tempo adjustment needed, the tempo tool is skipped");
        return Ok(());
    }
    println!("Stages: {} ({})", chain, chain.len());
    println!("Filter: {}", chain.atempo_filter());
    Ok(())
}

/// Print a success message
fn print_success(msg: &str) {
    println!("  \x1b[32m✓\x1b[0m {}", msg);
}

/// Print a failure message
fn print_failure(msg: &str) {
    println!("  \x1b[31m✗\x1b[0m {}", msg);
}

/// Check that every configured external program can be found
async fn run_check(config: &Config) {
    println!("Dyslexia Reader Setup Check\n");
    println!("===========================\n");

    let mut all_ok = true;

    println!("External tools:");
    let tools = [
        ("TTS engine", config.tts.command.program()),
        ("Tempo tool", config.tempo.command.program()),
        ("Player", config.player.command.program()),
    ];
    for (role, program) in tools {
        match program.map(|p| (p, which::which(p))) {
            Some((program, Ok(path))) => {
                print_success(&format!("{}: {} ({})", role, program, path.display()))
            }
            Some((program, Err(_))) => {
                print_failure(&format!("{}: {} not found in PATH", role, program));
                all_ok = false;
            }
            None => {
                print_failure(&format!("{}: command is empty", role));
                all_ok = false;
            }
        }
    }

    println!("\nSelection capture:");
    let clipboard = capture::create_clipboard(config.capture.backend);
    if clipboard.is_available().await {
        print_success(clipboard.name());
    } else {
        print_failure(&format!("{}: required tools not installed", clipboard.name()));
        all_ok = false;
    }

    println!();
    if all_ok {
        println!("\x1b[32m✓ All checks passed!\x1b[0m");
    } else {
        println!("\x1b[31m✗ Some checks failed.\x1b[0m Please fix the issues above.");
    }
}

/// Show current configuration
fn show_config(config: &Config) -> anyhow::Result<()> {
    println!("Current Configuration\n");
    println!("=====================\n");

    print!("{}", toml::to_string_pretty(config)?);

    println!("\n---");
    println!(
        "Config file: {:?}",
        Config::default_path().unwrap_or_else(|| PathBuf::from("(not found)"))
    );
    Ok(())
}
