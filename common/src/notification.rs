use std::time::Duration;

/// How long a notification stays on screen.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Info,
    Warning,
    Error,
}

/// A short-lived message for the visitor.
///
/// Only one is shown at a time; a newer one replaces the current one. The
/// `id` lets an expiring timer dismiss exactly the notification it was
/// started for and leave a newer one alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub tone: Tone,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct Notifier {
    current: Option<Notification>,
    next_id: u64,
}

impl Notifier {
    /// Show `text`, replacing whatever is visible. Returns the new id.
    pub fn show(&mut self, tone: Tone, text: impl Into<String>) -> u64 {
        self.next_id += 1;
        let notification = Notification {
            id: self.next_id,
            tone,
            text: text.into(),
        };
        match tone {
            Tone::Error | Tone::Warning => tracing::warn!("{}", notification.text),
            Tone::Success | Tone::Info => tracing::debug!("{}", notification.text),
        }
        self.current = Some(notification);
        self.next_id
    }

    /// Clear the notification if it is still the one with `id`.
    pub fn dismiss(&mut self, id: u64) -> bool {
        if self.current.as_ref().is_some_and(|n| n.id == id) {
            self.current = None;
            true
        } else {
            false
        }
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }
}
