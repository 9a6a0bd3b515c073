use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque identifier issued by the messaging backend for this client instance
pub type RegistrationToken = String;

/// Display fields of a received notification
///
/// Every field is absent unless the backend populated it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Notification {
    pub title: Option<String>,
    pub body: Option<String>,
    pub icon: Option<String>,
    pub tag: Option<String>,
    pub color: Option<String>,
    pub sound: Option<String>,
    pub click_action: Option<String>,
}

impl Notification {
    /// Present fields in display order, paired with their names
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("title", &self.title),
            ("body", &self.body),
            ("icon", &self.icon),
            ("tag", &self.tag),
            ("color", &self.color),
            ("sound", &self.sound),
            ("click_action", &self.click_action),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }
}

/// A received push payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    /// Sender identifier
    pub from: Option<String>,
    /// Error description attached by the backend
    pub error: Option<String>,
    pub message_id: Option<String>,
    /// Application payload, kept in key order
    pub data: BTreeMap<String, String>,
    /// Whether the user opened the message from a notification
    pub notification_opened: Option<bool>,
    pub notification: Option<Notification>,
}

impl Message {
    /// Message carrying only an identifier
    pub fn with_id(message_id: impl Into<String>) -> Self {
        Self {
            message_id: Some(message_id.into()),
            ..Default::default()
        }
    }
}

/// Options used to create an application context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppOptions {
    pub app_id: String,
    pub project_id: String,
}

impl AppOptions {
    pub fn new(app_id: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            project_id: project_id.into(),
        }
    }
}
