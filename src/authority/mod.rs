// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The remote authority the client synchronizes with.
//!
//! The authority owns the topic list and the server-side subscriptions. It
//! talks to the client in two directions:
//!
//! - **Inbound**: topic-list and notification pushes, modelled as
//!   [`AuthorityEvent`] and fed to
//!   [`NotificationClient::spawn_event_loop`](crate::NotificationClient::spawn_event_loop)
//!   or to the client's `push_*` methods directly.
//! - **Outbound**: subscription changes, requested through the
//!   [`RemoteAuthority`] trait during synchronization.
//!
//! Transports implement [`RemoteAuthority`]; [`LoopbackAuthority`] is an
//! in-memory implementation for tests and demos.

mod loopback;

use std::future::Future;
use std::sync::Arc;

pub use loopback::{LoopbackAuthority, SubscriptionRequest};

use crate::error::RemoteError;
use crate::types::{Notification, Topic, TopicId};

/// Outbound side of the remote authority.
pub trait RemoteAuthority: Send + Sync + 'static {
    /// Asks the authority to subscribe to or unsubscribe from an optional topic.
    ///
    /// # Errors
    ///
    /// Returns a [`RemoteError`] if the request could not be delivered or
    /// was refused.
    fn request_subscription_change(
        &self,
        topic_id: TopicId,
        subscribe: bool,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;
}

impl<T: RemoteAuthority> RemoteAuthority for Arc<T> {
    fn request_subscription_change(
        &self,
        topic_id: TopicId,
        subscribe: bool,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send {
        (**self).request_subscription_change(topic_id, subscribe)
    }
}

/// An inbound push from the remote authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorityEvent {
    /// The complete, current topic list.
    TopicList(Vec<Topic>),
    /// A notification published on a topic.
    Notification {
        /// Topic the notification was published on.
        topic_id: TopicId,
        /// The notification itself.
        notification: Notification,
    },
}

impl AuthorityEvent {
    /// Creates a topic-list event.
    #[must_use]
    pub fn topic_list(topics: impl IntoIterator<Item = Topic>) -> Self {
        Self::TopicList(topics.into_iter().collect())
    }

    /// Creates a notification event.
    #[must_use]
    pub fn notification(topic_id: impl Into<TopicId>, notification: Notification) -> Self {
        Self::Notification {
            topic_id: topic_id.into(),
            notification,
        }
    }
}
