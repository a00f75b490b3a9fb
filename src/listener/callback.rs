// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Listener capabilities.
//!
//! A listener is either a [`TopicListListener`] or a [`NotificationListener`].
//! Both traits are implemented for plain closures, so most applications
//! register closures directly:
//!
//! ```
//! use topic_notify::listener::{NotificationListener, TopicListListener};
//! use topic_notify::topic::TopicListSnapshot;
//! use topic_notify::types::{Notification, TopicId};
//!
//! fn assert_topic_list_listener<L: TopicListListener>(_: L) {}
//! fn assert_notification_listener<L: NotificationListener>(_: L) {}
//!
//! assert_topic_list_listener(|snapshot: &TopicListSnapshot| {
//!     println!("{} topics", snapshot.len());
//! });
//! assert_notification_listener(|topic_id: TopicId, n: &Notification| {
//!     println!("{topic_id}: {:?}", n.message());
//! });
//! ```

use std::fmt;
use std::sync::Arc;

use crate::topic::TopicListSnapshot;
use crate::types::{Notification, TopicId};

/// Receives every new topic-list snapshot.
pub trait TopicListListener: Send + Sync + 'static {
    /// Called once per topic-list push.
    fn on_topic_list(&self, snapshot: &TopicListSnapshot);
}

impl<F> TopicListListener for F
where
    F: Fn(&TopicListSnapshot) + Send + Sync + 'static,
{
    fn on_topic_list(&self, snapshot: &TopicListSnapshot) {
        self(snapshot);
    }
}

/// Receives notifications.
pub trait NotificationListener: Send + Sync + 'static {
    /// Called once per delivered notification.
    ///
    /// The body may be absent; that is a valid notification.
    fn on_notification(&self, topic_id: TopicId, notification: &Notification);
}

impl<F> NotificationListener for F
where
    F: Fn(TopicId, &Notification) + Send + Sync + 'static,
{
    fn on_notification(&self, topic_id: TopicId, notification: &Notification) {
        self(topic_id, notification);
    }
}

/// Which notifications a notification listener receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ListenerScope {
    /// Notifications for every topic.
    #[default]
    AllTopics,
    /// Notifications for one topic only.
    Topic(TopicId),
}

impl ListenerScope {
    /// Returns `true` if a notification for `topic_id` falls in this scope.
    #[must_use]
    pub fn matches(&self, topic_id: TopicId) -> bool {
        match self {
            Self::AllTopics => true,
            Self::Topic(id) => *id == topic_id,
        }
    }
}

/// What kind of events a registered listener receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// Topic-list snapshots.
    TopicList,
    /// Notifications within a scope.
    Notification(ListenerScope),
}

/// A registered callback, tagged with its capability.
#[derive(Clone)]
pub enum Listener {
    /// Topic-list listener.
    TopicList(Arc<dyn TopicListListener>),
    /// Notification listener with its scope.
    Notification {
        /// Topics this listener receives.
        scope: ListenerScope,
        /// The callback.
        listener: Arc<dyn NotificationListener>,
    },
}

impl Listener {
    /// Wraps a topic-list callback.
    #[must_use]
    pub fn topic_list<L: TopicListListener>(listener: L) -> Self {
        Self::TopicList(Arc::new(listener))
    }

    /// Wraps a notification callback that receives every topic.
    #[must_use]
    pub fn notification<L: NotificationListener>(listener: L) -> Self {
        Self::Notification {
            scope: ListenerScope::AllTopics,
            listener: Arc::new(listener),
        }
    }

    /// Wraps a notification callback that receives a single topic.
    #[must_use]
    pub fn topic_notification<L: NotificationListener>(topic_id: TopicId, listener: L) -> Self {
        Self::Notification {
            scope: ListenerScope::Topic(topic_id),
            listener: Arc::new(listener),
        }
    }

    /// Returns the kind of events this listener receives.
    #[must_use]
    pub fn kind(&self) -> ListenerKind {
        match self {
            Self::TopicList(_) => ListenerKind::TopicList,
            Self::Notification { scope, .. } => ListenerKind::Notification(*scope),
        }
    }

    /// Returns `true` if the delivery is meant for this listener.
    pub(crate) fn accepts(&self, delivery: &Delivery) -> bool {
        match (self, delivery) {
            (Self::TopicList(_), Delivery::TopicList(_)) => true,
            (Self::Notification { scope, .. }, Delivery::Notification { topic_id, .. }) => {
                scope.matches(*topic_id)
            }
            _ => false,
        }
    }

    /// Runs the callback for a delivery it accepts.
    pub(crate) fn invoke(&self, delivery: &Delivery) {
        match (self, delivery) {
            (Self::TopicList(listener), Delivery::TopicList(snapshot)) => {
                listener.on_topic_list(snapshot);
            }
            (
                Self::Notification { listener, .. },
                Delivery::Notification {
                    topic_id,
                    notification,
                },
            ) => listener.on_notification(*topic_id, notification),
            _ => {}
        }
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("kind", &self.kind())
            .finish_non_exhaustive()
    }
}

/// A unit of work handed to a listener's execution context.
#[derive(Debug, Clone)]
pub(crate) enum Delivery {
    TopicList(Arc<TopicListSnapshot>),
    Notification {
        topic_id: TopicId,
        notification: Arc<Notification>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn notification_delivery(id: u64) -> Delivery {
        Delivery::Notification {
            topic_id: TopicId::new(id),
            notification: Arc::new(Notification::new()),
        }
    }

    #[test]
    fn scope_matching() {
        assert!(ListenerScope::AllTopics.matches(TopicId::new(7)));
        assert!(ListenerScope::Topic(TopicId::new(7)).matches(TopicId::new(7)));
        assert!(!ListenerScope::Topic(TopicId::new(7)).matches(TopicId::new(8)));
    }

    #[test]
    fn topic_list_listener_accepts_only_snapshots() {
        let listener = Listener::topic_list(|_: &TopicListSnapshot| {});
        assert!(listener.accepts(&Delivery::TopicList(Arc::default())));
        assert!(!listener.accepts(&notification_delivery(1)));
        assert_eq!(listener.kind(), ListenerKind::TopicList);
    }

    #[test]
    fn scoped_listener_accepts_its_topic() {
        let listener = Listener::topic_notification(TopicId::new(2), |_: TopicId, _: &Notification| {});
        assert!(listener.accepts(&notification_delivery(2)));
        assert!(!listener.accepts(&notification_delivery(3)));
        assert!(!listener.accepts(&Delivery::TopicList(Arc::default())));
    }

    #[test]
    fn invoke_passes_payload_through() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let listener = Listener::notification(move |id: TopicId, n: &Notification| {
            sink.lock().push((id, n.message().map(str::to_string)));
        });

        listener.invoke(&Delivery::Notification {
            topic_id: TopicId::new(4),
            notification: Arc::new(Notification::new().with_message("hi")),
        });
        listener.invoke(&notification_delivery(5));

        assert_eq!(
            *seen.lock(),
            vec![
                (TopicId::new(4), Some("hi".to_string())),
                (TopicId::new(5), None),
            ]
        );
    }

    #[test]
    fn debug_shows_kind() {
        let listener = Listener::notification(|_: TopicId, _: &Notification| {});
        let debug = format!("{listener:?}");
        assert!(debug.contains("Notification(AllTopics)"));
    }
}
