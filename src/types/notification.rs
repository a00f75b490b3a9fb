// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Notification payload types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity attached to a notification.
///
/// # Examples
///
/// ```
/// use topic_notify::types::AlertType;
///
/// assert_eq!(AlertType::Red.to_string(), "CodeRed");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    /// Highest severity.
    Red,
    /// Medium severity.
    Yellow,
    /// Informational.
    Green,
}

impl AlertType {
    /// Returns the display label for this alert type.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Red => "CodeRed",
            Self::Yellow => "CodeYellow",
            Self::Green => "CodeGreen",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A notification pushed by the remote authority.
///
/// Both the alert type and the message body are optional. A notification
/// without a body is still a valid notification and is delivered as such;
/// listeners branch on [`message`](Self::message).
///
/// # Examples
///
/// ```
/// use topic_notify::types::{AlertType, Notification};
///
/// let n = Notification::alert(AlertType::Yellow, "Storm warning");
/// assert_eq!(n.message(), Some("Storm warning"));
/// assert_eq!(n.alert_type(), Some(AlertType::Yellow));
///
/// let empty = Notification::new();
/// assert!(!empty.has_message());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    alert_type: Option<AlertType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl Notification {
    /// Creates a notification with neither alert type nor body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a notification carrying an alert type and a body.
    #[must_use]
    pub fn alert(alert_type: AlertType, message: impl Into<String>) -> Self {
        Self {
            alert_type: Some(alert_type),
            message: Some(message.into()),
        }
    }

    /// Sets the message body.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the alert type.
    #[must_use]
    pub fn with_alert_type(mut self, alert_type: AlertType) -> Self {
        self.alert_type = Some(alert_type);
        self
    }

    /// Returns the alert type, if any.
    #[must_use]
    pub fn alert_type(&self) -> Option<AlertType> {
        self.alert_type
    }

    /// Returns the message body, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns `true` if the notification carries a body.
    #[must_use]
    pub fn has_message(&self) -> bool {
        self.message.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_labels() {
        assert_eq!(AlertType::Red.label(), "CodeRed");
        assert_eq!(AlertType::Yellow.label(), "CodeYellow");
        assert_eq!(AlertType::Green.label(), "CodeGreen");
    }

    #[test]
    fn empty_body_is_distinct_from_empty_string() {
        let absent = Notification::new();
        let blank = Notification::new().with_message("");

        assert!(!absent.has_message());
        assert!(blank.has_message());
        assert_ne!(absent, blank);
    }

    #[test]
    fn builder_sets_fields() {
        let n = Notification::new()
            .with_alert_type(AlertType::Green)
            .with_message("All clear");
        assert_eq!(n, Notification::alert(AlertType::Green, "All clear"));
    }

    #[test]
    fn deserializes_without_optional_fields() {
        let n: Notification = serde_json::from_str("{}").unwrap();
        assert_eq!(n, Notification::new());

        let n: Notification =
            serde_json::from_str(r#"{"alert_type":"RED","message":"Fire"}"#).unwrap();
        assert_eq!(n.alert_type(), Some(AlertType::Red));
        assert_eq!(n.message(), Some("Fire"));
    }

    #[test]
    fn serializes_absent_fields_as_missing() {
        let json = serde_json::to_string(&Notification::new()).unwrap();
        assert_eq!(json, "{}");
    }
}
