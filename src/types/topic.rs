// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topic types.
//!
//! A topic is a named channel on which the remote authority publishes
//! notifications. Topics arrive in topic-list pushes and are immutable
//! until the next push replaces them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a topic, unique within a topic-list snapshot.
///
/// # Examples
///
/// ```
/// use topic_notify::types::TopicId;
///
/// let id = TopicId::new(42);
/// assert_eq!(id.value(), 42);
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TopicId(u64);

impl TopicId {
    /// Creates a topic identifier from its raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TopicId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<TopicId> for u64 {
    fn from(id: TopicId) -> Self {
        id.0
    }
}

impl FromStr for TopicId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// How a client subscribes to a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionType {
    /// Every client is subscribed; no explicit action is possible.
    Mandatory,
    /// Clients subscribe and unsubscribe explicitly.
    Optional,
}

impl SubscriptionType {
    /// Returns the canonical upper-case name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mandatory => "MANDATORY",
            Self::Optional => "OPTIONAL",
        }
    }
}

impl fmt::Display for SubscriptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A topic as announced by the remote authority.
///
/// # Examples
///
/// ```
/// use topic_notify::types::{SubscriptionType, Topic};
///
/// let topic = Topic::optional(2, "Offers");
/// assert_eq!(topic.id().value(), 2);
/// assert_eq!(topic.name(), "Offers");
/// assert_eq!(topic.subscription_type(), SubscriptionType::Optional);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Topic {
    id: TopicId,
    name: String,
    subscription_type: SubscriptionType,
}

impl Topic {
    /// Creates a topic.
    #[must_use]
    pub fn new(
        id: impl Into<TopicId>,
        name: impl Into<String>,
        subscription_type: SubscriptionType,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            subscription_type,
        }
    }

    /// Creates a mandatory topic.
    #[must_use]
    pub fn mandatory(id: impl Into<TopicId>, name: impl Into<String>) -> Self {
        Self::new(id, name, SubscriptionType::Mandatory)
    }

    /// Creates an optional topic.
    #[must_use]
    pub fn optional(id: impl Into<TopicId>, name: impl Into<String>) -> Self {
        Self::new(id, name, SubscriptionType::Optional)
    }

    /// Returns the topic identifier.
    #[must_use]
    pub fn id(&self) -> TopicId {
        self.id
    }

    /// Returns the human-readable topic name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the subscription type.
    #[must_use]
    pub fn subscription_type(&self) -> SubscriptionType {
        self.subscription_type
    }

    /// Returns `true` if clients may subscribe and unsubscribe explicitly.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.subscription_type == SubscriptionType::Optional
    }

    /// Returns `true` if every client is always subscribed.
    #[must_use]
    pub fn is_mandatory(&self) -> bool {
        self.subscription_type == SubscriptionType::Mandatory
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Topic: id '{}', name: {}, type: {}",
            self.id, self.name, self.subscription_type
        )
    }
}
