// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan-out of inbound authority pushes to listeners.
//!
//! ```text
//! authority push ─► NotificationDispatcher ─► ListenerRegistry.fan_out()
//!                                                 │
//!                       ┌─────────────────────────┼──────────────────┐
//!                       ▼                         ▼                  ▼
//!                 worker queue A            worker queue B     worker queue C
//!                       │                         │                  │
//!                 callback A (one at a time)  callback B          callback C
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

use crate::listener::{Delivery, ListenerRegistry};
use crate::topic::{TopicListSnapshot, TopicRegistry};
use crate::types::{Notification, Topic, TopicId};

/// Delivers notifications and topic-list snapshots to listeners.
///
/// Fan-outs are serialized, so all listeners observe deliveries in the same
/// relative order, and for one topic that order is the order of the
/// [`deliver`](Self::deliver) calls. The dispatcher only enqueues: listener
/// code runs on the listeners' own execution contexts.
#[derive(Debug)]
pub struct NotificationDispatcher {
    listeners: Arc<ListenerRegistry>,
    fan_out: Mutex<()>,
}

impl NotificationDispatcher {
    /// Creates a dispatcher over the given listener registry.
    #[must_use]
    pub fn new(listeners: Arc<ListenerRegistry>) -> Self {
        Self {
            listeners,
            fan_out: Mutex::new(()),
        }
    }

    /// Delivers a notification to every notification listener whose scope
    /// matches the topic, exactly once each.
    ///
    /// The topic does not need to be in the current snapshot. Returns the
    /// number of listeners the notification was handed to.
    pub fn deliver(&self, topic_id: TopicId, notification: Notification) -> usize {
        let delivery = Delivery::Notification {
            topic_id,
            notification: Arc::new(notification),
        };

        let _order = self.fan_out.lock();
        let delivered = self.listeners.fan_out(&delivery);
        tracing::trace!(%topic_id, listeners = delivered, "Dispatched notification");
        delivered
    }

    /// Replaces the topic snapshot and announces it to topic-list listeners.
    ///
    /// Replacement and announcement happen under the same fan-out lock, so
    /// listeners receive snapshots in replacement order.
    pub fn publish_topic_list(
        &self,
        topics: &TopicRegistry,
        list: impl IntoIterator<Item = Topic>,
    ) -> Arc<TopicListSnapshot> {
        let _order = self.fan_out.lock();
        let snapshot = topics.replace_snapshot(list);
        let delivered = self
            .listeners
            .fan_out(&Delivery::TopicList(Arc::clone(&snapshot)));
        tracing::debug!(
            version = snapshot.version(),
            listeners = delivered,
            "Announced topic list"
        );
        snapshot
    }
}
