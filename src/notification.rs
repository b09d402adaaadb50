//! Platform-specific desktop notifications
//!
//! Provides a unified interface for sending desktop notifications on
//! different platforms:
//! - Linux: Uses notify-send (libnotify)
//! - macOS: Uses terminal-notifier, falling back to osascript (AppleScript)

use std::process::Stdio;
use tokio::process::Command;

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
const APP_NAME: &str = "Dyslexia Reader";

/// Send a desktop notification with the given title, subtitle and body.
///
/// Notification failures are logged but don't propagate errors
/// (notifications are best-effort).
pub async fn send(title: &str, subtitle: &str, body: &str) {
    #[cfg(target_os = "linux")]
    send_linux(title, subtitle, body).await;

    #[cfg(target_os = "macos")]
    send_macos(title, subtitle, body).await;

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        tracing::debug!("Notifications not supported on this platform");
        let _ = (title, subtitle, body);
    }
}

/// Linux notifications have no subtitle line, so it is folded into the body
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn linux_body(subtitle: &str, body: &str) -> String {
    match (subtitle.is_empty(), body.is_empty()) {
        (true, _) => body.to_string(),
        (false, true) => subtitle.to_string(),
        (false, false) => format!("{}\n{}", subtitle, body),
    }
}

/// Escape a string for an AppleScript string literal
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn escape_applescript(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn applescript_notification(title: &str, subtitle: &str, body: &str) -> String {
    format!(
        r#"display notification "{}" with title "{}" subtitle "{}""#,
        escape_applescript(body),
        escape_applescript(title),
        escape_applescript(subtitle)
    )
}

/// Send a notification on Linux using notify-send
#[cfg(target_os = "linux")]
async fn send_linux(title: &str, subtitle: &str, body: &str) {
    let app_name = format!("--app-name={}", APP_NAME);
    let body = linux_body(subtitle, body);
    let result = Command::new("notify-send")
        .args([app_name.as_str(), "--expire-time=3000", title, body.as_str()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    if let Err(e) = result {
        tracing::debug!("Failed to send notification: {}", e);
    }
}

/// Send a notification on macOS
/// Prefers terminal-notifier with fallback to osascript
#[cfg(target_os = "macos")]
async fn send_macos(title: &str, subtitle: &str, body: &str) {
    let result = Command::new("terminal-notifier")
        .args([
            "-title", title, "-subtitle", subtitle, "-message", body, "-group",
            "dyslexia-reader",
        ])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    if matches!(result, Ok(status) if status.success()) {
        return;
    }

    let script = applescript_notification(title, subtitle, body);
    let result = Command::new("osascript")
        .args(["-e", &script])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    if let Err(e) = result {
        tracing::debug!("Failed to send notification: {}", e);
    }
}

/// Send a notification without waiting for it (for non-async contexts
/// like the menu bar event loop).
pub fn send_sync(title: &str, subtitle: &str, body: &str) {
    #[cfg(target_os = "linux")]
    {
        let app_name = format!("--app-name={}", APP_NAME);
        let body = linux_body(subtitle, body);
        let _ = std::process::Command::new("notify-send")
            .args([app_name.as_str(), "--expire-time=3000", title, body.as_str()])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
    }

    #[cfg(target_os = "macos")]
    {
        let script = applescript_notification(title, subtitle, body);
        let _ = std::process::Command::new("osascript")
            .args(["-e", &script])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        let _ = (title, subtitle, body);
    }
}
