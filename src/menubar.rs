//! macOS menu bar integration
//!
//! Provides a system tray icon with a context menu for reading the current
//! selection and choosing the reading speed and voice.

use crate::capture::SelectionCapture;
use crate::config::{save_config, Config};
use crate::notification;
use crate::pipeline::{NotificationSink, PipelineRunner, SpeechPipeline};
use crate::request::{Speed, Voice, SPEED_OPTIONS};
use crate::settings::{MenuCommand, Settings};
use pidlock::Pidlock;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tao::event_loop::{ControlFlow, EventLoopBuilder};
use tokio::runtime::Handle;
use tray_icon::{
    menu::{CheckMenuItem, Menu, MenuEvent, MenuItem, PredefinedMenuItem, Submenu},
    TrayIconBuilder,
};

const ICON: &str = "📖";

/// Menu plus the items that change while running
struct ReaderMenu {
    menu: Menu,
    status_item: MenuItem,
    speed_items: Vec<(Speed, CheckMenuItem)>,
    voice_items: Vec<(Voice, CheckMenuItem)>,
}

fn status_text(settings: &Settings) -> String {
    format!(
        "Speed: {} | Voice: {}",
        settings.speed.label(),
        settings.voice.label()
    )
}

impl ReaderMenu {
    fn build(settings: &Settings) -> anyhow::Result<Self> {
        let menu = Menu::new();

        let read_item = MenuItem::with_id(
            MenuCommand::ReadSelection.id(),
            "Read Selected Text",
            true,
            None,
        );
        menu.append(&read_item)?;
        menu.append(&PredefinedMenuItem::separator())?;

        // Speed submenu
        let speed_menu = Submenu::new("Speed", true);
        let mut speed_items = Vec::with_capacity(SPEED_OPTIONS.len());
        for value in SPEED_OPTIONS {
            let speed = Speed::new(value)?;
            let item = CheckMenuItem::with_id(
                MenuCommand::SetSpeed(speed).id(),
                speed.label(),
                true,
                speed == settings.speed,
                None,
            );
            speed_menu.append(&item)?;
            speed_items.push((speed, item));
        }
        menu.append(&speed_menu)?;

        // Voice submenu
        let voice_menu = Submenu::new("Voice", true);
        let mut voice_items = Vec::with_capacity(Voice::ALL.len());
        for voice in Voice::ALL {
            let item = CheckMenuItem::with_id(
                MenuCommand::SetVoice(voice).id(),
                voice.label(),
                true,
                voice == settings.voice,
                None,
            );
            voice_menu.append(&item)?;
            voice_items.push((voice, item));
        }
        menu.append(&voice_menu)?;

        menu.append(&PredefinedMenuItem::separator())?;

        // Status (disabled, just for display)
        let status_item = MenuItem::new(status_text(settings), false, None);
        menu.append(&status_item)?;

        menu.append(&PredefinedMenuItem::separator())?;

        let quit_item = MenuItem::with_id(MenuCommand::Quit.id(), "Quit", true, None);
        menu.append(&quit_item)?;

        Ok(Self {
            menu,
            status_item,
            speed_items,
            voice_items,
        })
    }

    /// Make the checkmarks match `settings` (a click toggles the item itself)
    fn sync(&self, settings: &Settings) {
        for (speed, item) in &self.speed_items {
            item.set_checked(*speed == settings.speed);
        }
        for (voice, item) in &self.voice_items {
            item.set_checked(*voice == settings.voice);
        }
        self.status_item.set_text(status_text(settings));
    }
}

/// Run the menu bar application.
///
/// Must be called from the main thread. Requests run on `handle`; this
/// function does not return while the menu bar is up.
pub fn run(config: Config, config_path: Option<PathBuf>, handle: Handle) -> anyhow::Result<()> {
    println!("Starting Dyslexia Reader menu bar...");

    // Single instance check
    let runtime_dir = Config::runtime_dir();
    std::fs::create_dir_all(&runtime_dir)?;
    let lock_path = runtime_dir.join("menubar.lock");
    let lock_path_str = lock_path.to_string_lossy().to_string();
    let mut pidlock = Pidlock::new(&lock_path_str);
    if pidlock.acquire().is_err() {
        anyhow::bail!("Another dyslexia-reader menubar instance is already running.");
    }
    tracing::debug!("Acquired menu bar lock at {:?}", lock_path);

    let mut config = config;
    let mut settings = Settings::for_menubar(&config);

    let capture = Arc::new(SelectionCapture::from_config(&config.capture));
    tracing::debug!("Using clipboard backend: {}", capture.backend_name());
    let runner = PipelineRunner::new(
        SpeechPipeline::new(&config),
        Arc::new(NotificationSink::new(config.notification.clone())),
        handle,
    );

    let reader_menu = ReaderMenu::build(&settings)?;
    let tray = TrayIconBuilder::new()
        .with_tooltip("Dyslexia Reader")
        .with_title(ICON)
        .with_menu(Box::new(reader_menu.menu.clone()))
        .build()?;

    println!("Menu bar is running. Look for {} in your menu bar.", ICON);
    println!("Press Ctrl+C to stop.\n");

    let menu_channel = MenuEvent::receiver();
    let event_loop = EventLoopBuilder::new().build();

    event_loop.run(move |_event, _, control_flow| {
        // Keep the tray icon and lock alive for the lifetime of the loop
        let _ = (&tray, &pidlock);

        *control_flow = ControlFlow::WaitUntil(Instant::now() + Duration::from_millis(100));

        // Check for menu events (non-blocking)
        let Ok(event) = menu_channel.try_recv() else {
            return;
        };
        let Some(command) = MenuCommand::from_id(event.id().0.as_str()) else {
            return;
        };

        match command {
            MenuCommand::ReadSelection => {
                // Each read is independent; earlier reads keep playing
                runner.read_selection(Arc::clone(&capture), settings);
            }
            MenuCommand::Quit => {
                *control_flow = ControlFlow::Exit;
            }
            MenuCommand::SetSpeed(_) | MenuCommand::SetVoice(_) => {
                let change = settings.apply(&command);
                reader_menu.sync(&settings);

                if let Some(change) = change {
                    tracing::info!("{}", change.message);
                    if config.notification.on_settings_change {
                        notification::send_sync(change.title, "", &change.message);
                    }
                    if config.menubar.remember_selection {
                        persist(&mut config, &settings, config_path.as_ref());
                    }
                }
            }
        }
    });
}

/// Save the current selection to the config file
fn persist(config: &mut Config, settings: &Settings, path: Option<&PathBuf>) {
    let Some(path) = path else {
        return;
    };
    settings.store(config);
    if let Err(e) = save_config(config, path) {
        tracing::warn!("Failed to save settings: {}", e);
    }
}
