//! Notification channel seam.
//!
//! The engine decides *what* to notify and *when*; rendering (toast,
//! system tray, console) belongs to the embedder. `notify` is
//! fire-and-forget with no acknowledgment back to the core.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Normal,
    Destructive,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Normal => "normal",
            Severity::Destructive => "destructive",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(Severity::Normal),
            "destructive" => Some(Severity::Destructive),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub trait NotificationChannel: Send + Sync {
    fn notify(&self, title: &str, description: &str, severity: Severity);
}

/// Default channel: routes notifications to the log so the engine is
/// observable without a UI attached.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl NotificationChannel for LogNotifier {
    fn notify(&self, title: &str, description: &str, severity: Severity) {
        match severity {
            Severity::Normal => tracing::info!(title, "{description}"),
            Severity::Destructive => tracing::warn!(title, "{description}"),
        }
    }
}
