//! Admin notifications
//!
//! One-time messages stored in the session and removed when read, shown at
//! the top of the next rendered admin page.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::error::{Error, Result};

const NOTIFICATIONS_SESSION_KEY: &str = "_notifications";

/// Notification severity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotifyKind {
    /// Operation succeeded
    Success,
    /// Warning
    Warning,
    /// Operation failed
    Error,
}

impl NotifyKind {
    /// CSS class of the alert box
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Success => "alert-success",
            Self::Warning => "alert-warning",
            Self::Error => "alert-danger",
        }
    }
}

/// A single notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Severity
    pub kind: NotifyKind,
    /// Message text
    pub message: String,
}

impl Notification {
    /// Success notification
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotifyKind::Success,
            message: message.into(),
        }
    }

    /// Error notification
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotifyKind::Error,
            message: message.into(),
        }
    }
}

/// Session-backed notification queue
pub struct Notifications;

impl Notifications {
    /// Queue a notification
    pub async fn push(session: &Session, notification: Notification) -> Result<()> {
        let mut pending: Vec<Notification> = session
            .get(NOTIFICATIONS_SESSION_KEY)
            .await
            .map_err(|e| Error::Session(format!("Failed to read notifications: {e}")))?
            .unwrap_or_default();

        pending.push(notification);

        session
            .insert(NOTIFICATIONS_SESSION_KEY, &pending)
            .await
            .map_err(|e| Error::Session(format!("Failed to store notifications: {e}")))?;

        Ok(())
    }

    /// Remove and return every queued notification
    pub async fn take(session: &Session) -> Result<Vec<Notification>> {
        let pending: Option<Vec<Notification>> = session
            .remove(NOTIFICATIONS_SESSION_KEY)
            .await
            .map_err(|e| Error::Session(format!("Failed to read notifications: {e}")))?;

        Ok(pending.unwrap_or_default())
    }
}
