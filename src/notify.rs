//! User-facing notifications.
//!
//! The engine raises short info/success/error messages ("Selected 12 items",
//! "Moved 3 of 5 items") through a `NotificationSink`. `NotificationCenter` is
//! the in-memory sink the UI drains each frame; messages expire after a ttl.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub raised_at: Instant,
}

/// Fire-and-forget notification target.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, level: NotificationLevel, message: String);

    fn info(&self, message: String) {
        self.notify(NotificationLevel::Info, message);
    }

    fn success(&self, message: String) {
        self.notify(NotificationLevel::Success, message);
    }

    fn error(&self, message: String) {
        self.notify(NotificationLevel::Error, message);
    }
}

/// Queue of notifications with expiry.
#[derive(Debug)]
pub struct NotificationCenter {
    queue: Mutex<VecDeque<Notification>>,
    ttl: Duration,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(Duration::from_secs(3))
    }
}

impl NotificationCenter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Notification>> {
        // A panic while holding the lock leaves the queue itself consistent
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Pushes a notification with an explicit timestamp.
    pub fn push_at(&self, level: NotificationLevel, message: String, now: Instant) {
        self.lock().push_back(Notification {
            level,
            message,
            raised_at: now,
        });
    }

    /// Removes and returns everything queued.
    pub fn drain(&self) -> Vec<Notification> {
        self.lock().drain(..).collect()
    }

    /// Returns notifications that have not expired yet, oldest first.
    pub fn active(&self, now: Instant) -> Vec<Notification> {
        self.lock()
            .iter()
            .filter(|n| now.saturating_duration_since(n.raised_at) < self.ttl)
            .cloned()
            .collect()
    }

    /// Drops expired notifications.
    pub fn clear_expired(&self, now: Instant) {
        let ttl = self.ttl;
        self.lock()
            .retain(|n| now.saturating_duration_since(n.raised_at) < ttl);
    }

    /// Messages currently queued, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(|n| n.message.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl NotificationSink for NotificationCenter {
    fn notify(&self, level: NotificationLevel, message: String) {
        match level {
            NotificationLevel::Error => tracing::warn!(%message, "notification"),
            _ => tracing::info!(?level, %message, "notification"),
        }
        self.push_at(level, message, Instant::now());
    }
}
