use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown notification level - {0}")]
pub struct UnknownLevel(String);

impl FromStr for NotificationLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "info" => Ok(NotificationLevel::Info),
            "success" => Ok(NotificationLevel::Success),
            "warning" => Ok(NotificationLevel::Warning),
            "error" => Ok(NotificationLevel::Error),
            other => Err(UnknownLevel(other.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    id: NotificationId,
    message: String,
    level: NotificationLevel,
}

impl Notification {
    pub fn id(&self) -> &NotificationId {
        &self.id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn level(&self) -> NotificationLevel {
        self.level
    }
}

/// Ephemeral UI state. Never written to storage.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UiState {
    /// Display order is insertion order
    notifications: Vec<Notification>,
    is_mobile_menu_open: bool,
}

impl UiState {
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn is_mobile_menu_open(&self) -> bool {
        self.is_mobile_menu_open
    }

    pub(crate) fn add_notification(
        &self,
        message: impl Into<String>,
        level: NotificationLevel,
    ) -> (Self, NotificationId) {
        let id = NotificationId::generate();
        let mut notifications = self.notifications.clone();
        notifications.push(Notification {
            id: id.clone(),
            message: message.into(),
            level,
        });

        (
            Self {
                notifications,
                ..self.clone()
            },
            id,
        )
    }

    pub(crate) fn dismiss_notification(&self, id: &NotificationId) -> Self {
        let mut notifications = self.notifications.clone();
        if let Some(index) = notifications.iter().position(|n| &n.id == id) {
            notifications.remove(index);
        }

        Self {
            notifications,
            ..self.clone()
        }
    }

    pub(crate) fn clear_notifications(&self) -> Self {
        Self {
            notifications: Vec::new(),
            ..self.clone()
        }
    }

    pub(crate) fn toggle_mobile_menu(&self) -> Self {
        Self {
            is_mobile_menu_open: !self.is_mobile_menu_open,
            ..self.clone()
        }
    }
}
