//! Transient user-facing notifications ("toasts").
//!
//! Components never print; they hand a `Notification` to whatever
//! `Notifier` they were built with.

use std::sync::Mutex;
use std::time::Duration;

use inline_colorization::*;
use tracing::{info, warn};

/// How long a success toast stays up before dismissing itself.
pub const TOAST_DURATION: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub text: Option<String>,
    /// `None` means the notification stays until acknowledged.
    pub dismiss_after: Option<Duration>,
}

impl Notification {
    pub fn success(title: impl Into<String>) -> Self {
        Notification {
            level: NotificationLevel::Success,
            title: title.into(),
            text: None,
            dismiss_after: Some(TOAST_DURATION),
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Notification {
            level: NotificationLevel::Error,
            title: title.into(),
            text: None,
            dismiss_after: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// A notification with body text stays up until acknowledged.
    pub fn sticky(mut self) -> Self {
        self.dismiss_after = None;
        self
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Sends notifications to the log only.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, n: Notification) {
        match n.level {
            NotificationLevel::Success => info!(title = n.title.as_str(), text = ?n.text, "notification"),
            NotificationLevel::Error => warn!(title = n.title.as_str(), text = ?n.text, "notification"),
        }
    }
}

/// Prints notifications on the terminal.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, n: Notification) {
        let line = match n.level {
            NotificationLevel::Success => {
                format!("{style_bold}{color_green}✔ {}{style_reset}{color_reset}", n.title)
            }
            NotificationLevel::Error => {
                format!("{style_bold}{color_red}✘ {}{style_reset}{color_reset}", n.title)
            }
        };
        match n.level {
            NotificationLevel::Success => println!("{}", line),
            NotificationLevel::Error => eprintln!("{}", line),
        }
        if let Some(text) = n.text {
            println!("  {}", text);
        }
    }
}

/// Keeps every notification it receives, in order.
#[derive(Default)]
pub struct MemoryNotifier {
    received: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.received
            .lock()
            .map(|list| list.clone())
            .unwrap_or_default()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut list) = self.received.lock() {
            list.push(notification);
        }
    }
}
