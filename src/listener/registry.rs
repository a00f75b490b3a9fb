// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry of topic-list and notification listeners.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::runtime::Handle;

use crate::dispatch::ListenerWorker;
use crate::error::{Error, Result};
use crate::topic::TopicListSnapshot;
use crate::types::{Notification, TopicId};

use super::{Delivery, Listener, ListenerHandle, ListenerKind};

struct Registration {
    listener: Listener,
    worker: ListenerWorker,
}

/// Registry mapping listener handles to their callbacks.
///
/// Every registered listener gets its own execution context on the tokio
/// runtime the registry was created with. Fan-out walks the table under a
/// read lock and hands each matching listener its delivery; registration
/// and unregistration take the write lock. A listener unregistered before
/// the fan-out reaches it does not receive the delivery; one still
/// registered at that point does, even if it is unregistered right after.
///
/// # Thread Safety
///
/// The registry is fully thread-safe. Callbacks are shared behind `Arc`
/// and never run while a registry lock is held.
pub struct ListenerRegistry {
    /// Counter for generating unique handles.
    next_id: AtomicU64,
    /// Runtime hosting the listener workers.
    runtime: Handle,
    /// Registered listeners in registration order.
    registrations: RwLock<BTreeMap<ListenerHandle, Registration>>,
}

impl ListenerRegistry {
    /// Creates an empty registry whose listeners run on `runtime`.
    #[must_use]
    pub fn new(runtime: Handle) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            runtime,
            registrations: RwLock::new(BTreeMap::new()),
        }
    }

    /// Creates an empty registry on the ambient tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRuntime`] when called outside a tokio runtime.
    pub fn try_current() -> Result<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| Error::NoRuntime)
    }

    fn next_handle(&self) -> ListenerHandle {
        ListenerHandle::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Registers a listener of any kind.
    pub fn register(&self, listener: Listener) -> ListenerHandle {
        let handle = self.next_handle();
        let kind = listener.kind();
        let worker = ListenerWorker::spawn(&self.runtime, handle, listener.clone());

        self.registrations.write().insert(
            handle,
            Registration { listener, worker },
        );

        tracing::debug!(%handle, ?kind, "Registered listener");
        handle
    }

    /// Registers a callback for topic-list updates.
    pub fn register_topic_listener<F>(&self, callback: F) -> ListenerHandle
    where
        F: Fn(&TopicListSnapshot) + Send + Sync + 'static,
    {
        self.register(Listener::topic_list(callback))
    }

    /// Registers a callback for notifications on every topic.
    pub fn register_notification_listener<F>(&self, callback: F) -> ListenerHandle
    where
        F: Fn(TopicId, &Notification) + Send + Sync + 'static,
    {
        self.register(Listener::notification(callback))
    }

    /// Registers a callback for notifications on a single topic.
    pub fn register_topic_notification_listener<F>(
        &self,
        topic_id: TopicId,
        callback: F,
    ) -> ListenerHandle
    where
        F: Fn(TopicId, &Notification) + Send + Sync + 'static,
    {
        self.register(Listener::topic_notification(topic_id, callback))
    }

    /// Unregisters a listener.
    ///
    /// Deliveries already handed to the listener still run; no later
    /// delivery reaches it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownHandle`] if the handle was never issued or
    /// has already been unregistered.
    pub fn unregister(&self, handle: ListenerHandle) -> Result<()> {
        let removed = self.registrations.write().remove(&handle);
        let Some(registration) = removed else {
            return Err(Error::UnknownHandle(handle));
        };

        // Detached: the worker finishes its queue and exits on its own.
        drop(registration.worker.close());
        tracing::debug!(%handle, kind = ?registration.listener.kind(), "Unregistered listener");
        Ok(())
    }

    /// Removes every listener and waits for their queued deliveries to finish.
    pub async fn shutdown(&self) {
        let registrations = std::mem::take(&mut *self.registrations.write());
        let count = registrations.len();

        let tasks: Vec<_> = registrations
            .into_values()
            .map(|registration| registration.worker.close())
            .collect();
        for task in tasks {
            let _ = task.await;
        }

        tracing::debug!(count, "Listener registry shut down");
    }

    // =========================================================================
    // Fan-out
    // =========================================================================

    /// Hands a delivery to every matching listener, in registration order.
    ///
    /// Returns the number of listeners that received it.
    pub(crate) fn fan_out(&self, delivery: &Delivery) -> usize {
        let registrations = self.registrations.read();
        let mut delivered = 0;

        for (handle, registration) in registrations.iter() {
            if !registration.listener.accepts(delivery) {
                continue;
            }
            if registration.worker.hand_off(delivery.clone()) {
                delivered += 1;
                tracing::trace!(%handle, "Handed delivery to listener");
            }
        }

        delivered
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Returns the kind of a registered listener.
    #[must_use]
    pub fn kind(&self, handle: ListenerHandle) -> Option<ListenerKind> {
        self.registrations
            .read()
            .get(&handle)
            .map(|r| r.listener.kind())
    }

    /// Returns `true` if the handle is currently registered.
    #[must_use]
    pub fn contains(&self, handle: ListenerHandle) -> bool {
        self.registrations.read().contains_key(&handle)
    }

    /// Returns the total number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.registrations.read().len()
    }

    /// Returns `true` if there are no registered listeners.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listener_count() == 0
    }

    /// Returns the number of deliveries queued or running across all listeners.
    #[must_use]
    pub fn pending_deliveries(&self) -> usize {
        self.registrations
            .read()
            .values()
            .map(|r| r.worker.pending())
            .sum()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listener_count", &self.listener_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::ListenerScope;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn notification_delivery(id: u64, body: &str) -> Delivery {
        Delivery::Notification {
            topic_id: TopicId::new(id),
            notification: Arc::new(Notification::new().with_message(body)),
        }
    }

    #[tokio::test]
    async fn new_registry_is_empty() {
        let registry = ListenerRegistry::try_current().unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.listener_count(), 0);
    }

    #[test]
    fn try_current_outside_runtime_fails() {
        assert!(matches!(
            ListenerRegistry::try_current(),
            Err(Error::NoRuntime)
        ));
    }

    #[tokio::test]
    async fn handles_are_unique_across_kinds() {
        let registry = ListenerRegistry::try_current().unwrap();

        let a = registry.register_topic_listener(|_| {});
        let b = registry.register_notification_listener(|_, _| {});
        let c = registry.register_topic_notification_listener(TopicId::new(3), |_, _| {});

        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
        assert_eq!(registry.listener_count(), 3);
        assert_eq!(registry.kind(a), Some(ListenerKind::TopicList));
        assert_eq!(
            registry.kind(c),
            Some(ListenerKind::Notification(ListenerScope::Topic(TopicId::new(3))))
        );
    }

    #[tokio::test]
    async fn unregister_twice_fails_with_unknown_handle() {
        let registry = ListenerRegistry::try_current().unwrap();
        let handle = registry.register_notification_listener(|_, _| {});

        assert!(registry.unregister(handle).is_ok());
        assert!(!registry.contains(handle));
        assert!(matches!(
            registry.unregister(handle),
            Err(Error::UnknownHandle(h)) if h == handle
        ));
    }

    #[tokio::test]
    async fn unregister_never_issued_handle_fails() {
        let registry = ListenerRegistry::try_current().unwrap();
        assert!(matches!(
            registry.unregister(ListenerHandle::new(999)),
            Err(Error::UnknownHandle(_))
        ));
    }

    #[tokio::test]
    async fn fan_out_respects_kind_and_scope() {
        let registry = ListenerRegistry::try_current().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let all = tx.clone();
        registry.register_notification_listener(move |id, _| {
            let _ = all.send(("all", id.value()));
        });
        let scoped = tx.clone();
        registry.register_topic_notification_listener(TopicId::new(2), move |id, _| {
            let _ = scoped.send(("scoped", id.value()));
        });
        let lists = tx;
        registry.register_topic_listener(move |_| {
            let _ = lists.send(("list", 0));
        });

        assert_eq!(registry.fan_out(&notification_delivery(1, "a")), 1);
        assert_eq!(registry.fan_out(&notification_delivery(2, "b")), 2);
        assert_eq!(registry.fan_out(&Delivery::TopicList(Arc::default())), 1);

        registry.shutdown().await;

        let mut seen = Vec::new();
        while let Ok(event) = rx.try_recv() {
            seen.push(event);
        }
        seen.sort_unstable();
        assert_eq!(seen, vec![("all", 1), ("all", 2), ("list", 0), ("scoped", 2)]);
    }

    #[tokio::test]
    async fn unregistered_listener_misses_later_fan_out() {
        let registry = ListenerRegistry::try_current().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let handle = registry.register_notification_listener(move |id, _| {
            let _ = tx.send(id.value());
        });

        registry.fan_out(&notification_delivery(1, "before"));
        registry.unregister(handle).unwrap();
        assert_eq!(registry.fan_out(&notification_delivery(2, "after")), 0);

        assert_eq!(rx.recv().await, Some(1));
        // Channel closes once the worker drops the listener.
        assert_eq!(
            tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn shutdown_clears_registry() {
        let registry = ListenerRegistry::try_current().unwrap();
        registry.register_topic_listener(|_| {});
        registry.register_notification_listener(|_, _| {});

        registry.shutdown().await;
        assert!(registry.is_empty());
        assert_eq!(registry.pending_deliveries(), 0);
    }

    #[tokio::test]
    async fn debug_shows_count() {
        let registry = ListenerRegistry::try_current().unwrap();
        registry.register_topic_listener(|_| {});

        let debug = format!("{registry:?}");
        assert!(debug.contains("ListenerRegistry"));
        assert!(debug.contains("listener_count: 1"));
    }
}
