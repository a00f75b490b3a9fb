// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Notification client facade.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::authority::{AuthorityEvent, RemoteAuthority, SubscriptionRequest};
use crate::dispatch::NotificationDispatcher;
use crate::error::{Error, Result};
use crate::listener::{Listener, ListenerHandle, ListenerRegistry};
use crate::subscription::{SubscriptionReconciler, SyncReport};
use crate::topic::{TopicListSnapshot, TopicRegistry};
use crate::types::{Notification, Topic, TopicId};

use super::config::ClientConfig;

/// Client for topic-based notifications from a remote authority.
///
/// The `NotificationClient` owns the topic registry, the listener registry,
/// the dispatcher and the subscription reconciler. Inbound pushes from the
/// authority enter through [`push_topic_list`](Self::push_topic_list) and
/// [`push_notification`](Self::push_notification), or through an event
/// loop started with [`spawn_event_loop`](Self::spawn_event_loop).
///
/// # Examples
///
/// ```no_run
/// use topic_notify::{LoopbackAuthority, NotificationClient};
/// use topic_notify::types::{Notification, Topic, TopicId};
///
/// #[tokio::main]
/// async fn main() -> topic_notify::Result<()> {
///     let client = NotificationClient::new(LoopbackAuthority::new())?;
///
///     client.register_topic_listener(|snapshot| {
///         for topic in snapshot {
///             println!("{topic}");
///         }
///     });
///     client.register_notification_listener(|topic_id, notification| {
///         println!("{topic_id}: {:?}", notification.message());
///     });
///
///     client.push_topic_list(vec![
///         Topic::mandatory(1, "Weather"),
///         Topic::optional(2, "Offers"),
///     ]);
///
///     client.subscribe(TopicId::new(2))?;
///     client.synchronize().await?;
///
///     client.push_notification(TopicId::new(2), Notification::new().with_message("50% off"));
///     client.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct NotificationClient<R> {
    topics: Arc<TopicRegistry>,
    listeners: Arc<ListenerRegistry>,
    dispatcher: NotificationDispatcher,
    reconciler: SubscriptionReconciler<R>,
    runtime: Handle,
    sync_timeout: Duration,
}

impl<R: RemoteAuthority> NotificationClient<R> {
    /// Creates a client with the default configuration on the current runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRuntime`] when called outside a tokio runtime.
    pub fn new(authority: R) -> Result<Self> {
        Self::with_config(authority, ClientConfig::default())
    }

    /// Creates a client with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRuntime`] if no runtime is configured and the
    /// call is made outside a tokio runtime.
    pub fn with_config(authority: R, config: ClientConfig) -> Result<Self> {
        let runtime = match config.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|_| Error::NoRuntime)?,
        };

        let topics = Arc::new(TopicRegistry::new());
        let listeners = Arc::new(ListenerRegistry::new(runtime.clone()));

        tracing::debug!(sync_timeout = ?config.sync_timeout, "Created notification client");

        Ok(Self {
            dispatcher: NotificationDispatcher::new(Arc::clone(&listeners)),
            reconciler: SubscriptionReconciler::new(authority, Arc::clone(&topics)),
            topics,
            listeners,
            runtime,
            sync_timeout: config.sync_timeout,
        })
    }

    // =========================================================================
    // Inbound
    // =========================================================================

    /// Handles a complete topic list pushed by the authority.
    ///
    /// Replaces the snapshot, announces it to topic-list listeners, and drops
    /// subscription intent for topics that are no longer optional.
    pub fn push_topic_list(
        &self,
        topics: impl IntoIterator<Item = Topic>,
    ) -> Arc<TopicListSnapshot> {
        let snapshot = self.dispatcher.publish_topic_list(&self.topics, topics);
        self.reconciler.retain_known(&snapshot);
        snapshot
    }

    /// Handles a notification pushed by the authority.
    ///
    /// Returns the number of listeners it was handed to.
    pub fn push_notification(&self, topic_id: TopicId, notification: Notification) -> usize {
        self.dispatcher.deliver(topic_id, notification)
    }

    /// Handles any inbound event.
    pub fn handle_event(&self, event: AuthorityEvent) {
        match event {
            AuthorityEvent::TopicList(topics) => {
                self.push_topic_list(topics);
            }
            AuthorityEvent::Notification {
                topic_id,
                notification,
            } => {
                self.push_notification(topic_id, notification);
            }
        }
    }

    /// Consumes inbound events until every sender is dropped.
    pub fn spawn_event_loop(
        self: &Arc<Self>,
        mut events: mpsc::Receiver<AuthorityEvent>,
    ) -> JoinHandle<()> {
        let client = Arc::clone(self);
        self.runtime.spawn(async move {
            tracing::debug!("Authority event loop started");
            while let Some(event) = events.recv().await {
                client.handle_event(event);
            }
            tracing::debug!("Authority event loop stopped");
        })
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Registers a listener of any kind.
    pub fn register(&self, listener: Listener) -> ListenerHandle {
        self.listeners.register(listener)
    }

    /// Registers a callback for topic-list updates.
    pub fn register_topic_listener<F>(&self, callback: F) -> ListenerHandle
    where
        F: Fn(&TopicListSnapshot) + Send + Sync + 'static,
    {
        self.listeners.register_topic_listener(callback)
    }

    /// Registers a callback for notifications on every topic.
    pub fn register_notification_listener<F>(&self, callback: F) -> ListenerHandle
    where
        F: Fn(TopicId, &Notification) + Send + Sync + 'static,
    {
        self.listeners.register_notification_listener(callback)
    }

    /// Registers a callback for notifications on one topic.
    pub fn register_topic_notification_listener<F>(
        &self,
        topic_id: TopicId,
        callback: F,
    ) -> ListenerHandle
    where
        F: Fn(TopicId, &Notification) + Send + Sync + 'static,
    {
        self.listeners
            .register_topic_notification_listener(topic_id, callback)
    }

    /// Unregisters a listener.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownHandle`] if the handle is not registered.
    pub fn unregister(&self, handle: ListenerHandle) -> Result<()> {
        self.listeners.unregister(handle)
    }

    /// Returns the listener registry.
    #[must_use]
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// Returns the number of deliveries queued but not yet finished.
    #[must_use]
    pub fn pending_deliveries(&self) -> usize {
        self.listeners.pending_deliveries()
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Records the desired subscription state of an optional topic.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTopic`] if the topic is unknown or mandatory.
    pub fn set_desired(&self, topic_id: TopicId, subscribed: bool) -> Result<()> {
        self.reconciler.set_desired(topic_id, subscribed)
    }

    /// Shorthand for `set_desired(topic_id, true)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTopic`] if the topic is unknown or mandatory.
    pub fn subscribe(&self, topic_id: TopicId) -> Result<()> {
        self.set_desired(topic_id, true)
    }

    /// Shorthand for `set_desired(topic_id, false)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTopic`] if the topic is unknown or mandatory.
    pub fn unsubscribe(&self, topic_id: TopicId) -> Result<()> {
        self.set_desired(topic_id, false)
    }

    /// Synchronizes subscriptions with the configured timeout.
    ///
    /// # Errors
    ///
    /// See [`SubscriptionReconciler::synchronize`].
    pub async fn synchronize(&self) -> Result<SyncReport> {
        self.reconciler.synchronize(self.sync_timeout).await
    }

    /// Synchronizes subscriptions with an explicit timeout.
    ///
    /// # Errors
    ///
    /// See [`SubscriptionReconciler::synchronize`].
    pub async fn synchronize_with_timeout(&self, timeout: Duration) -> Result<SyncReport> {
        self.reconciler.synchronize(timeout).await
    }

    /// Returns the changes the next synchronization would send.
    #[must_use]
    pub fn pending_changes(&self) -> Vec<SubscriptionRequest> {
        self.reconciler.pending_changes()
    }

    /// Returns a copy of the subscription intent.
    #[must_use]
    pub fn intent(&self) -> BTreeMap<TopicId, bool> {
        self.reconciler.intent()
    }

    /// Returns the optional topics confirmed subscribed.
    #[must_use]
    pub fn baseline(&self) -> BTreeSet<TopicId> {
        self.reconciler.baseline()
    }

    /// Returns `true` if the client is subscribed to the topic.
    #[must_use]
    pub fn is_subscribed(&self, topic_id: TopicId) -> bool {
        self.reconciler.is_subscribed(topic_id)
    }

    /// Returns the remote authority.
    #[must_use]
    pub fn authority(&self) -> &R {
        self.reconciler.authority()
    }

    // =========================================================================
    // Topics
    // =========================================================================

    /// Returns the latest topic-list snapshot.
    #[must_use]
    pub fn current_snapshot(&self) -> Arc<TopicListSnapshot> {
        self.topics.current_snapshot()
    }

    /// Looks up a topic in the current snapshot.
    #[must_use]
    pub fn lookup(&self, topic_id: TopicId) -> Option<Topic> {
        self.topics.lookup(topic_id)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Unregisters every listener and waits for queued deliveries to finish.
    pub async fn shutdown(&self) {
        self.listeners.shutdown().await;
        tracing::debug!("Notification client shut down");
    }
}

impl<R> std::fmt::Debug for NotificationClient<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationClient")
            .field("topics", &self.topics.current_snapshot().len())
            .field("listeners", &self.listeners)
            .field("reconciler", &self.reconciler)
            .field("sync_timeout", &self.sync_timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::LoopbackAuthority;
    use crate::error::RemoteError;
    use crate::types::AlertType;

    const WAIT: Duration = Duration::from_secs(5);

    fn topics() -> Vec<Topic> {
        vec![Topic::mandatory(1, "Weather"), Topic::optional(2, "Offers")]
    }

    #[test]
    fn construction_outside_runtime_fails() {
        let result = NotificationClient::new(LoopbackAuthority::new());
        assert!(matches!(result, Err(Error::NoRuntime)));
    }

    #[test]
    fn construction_with_explicit_runtime() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let config = ClientConfig::default().with_runtime(runtime.handle().clone());

        let client = NotificationClient::with_config(LoopbackAuthority::new(), config).unwrap();
        let handle = client.register_notification_listener(|_, _| {});

        assert!(client.listeners().contains(handle));
    }

    #[tokio::test]
    async fn push_topic_list_reaches_listener_and_registry() {
        let client = NotificationClient::new(LoopbackAuthority::new()).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        client.register_topic_listener(move |snapshot| {
            let _ = tx.send(snapshot.len());
        });

        let snapshot = client.push_topic_list(topics());

        assert_eq!(snapshot.version(), 1);
        assert_eq!(client.lookup(TopicId::new(2)).unwrap().name(), "Offers");
        assert_eq!(tokio::time::timeout(WAIT, rx.recv()).await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn handle_event_routes_notifications() {
        let client = NotificationClient::new(LoopbackAuthority::new()).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        client.register_notification_listener(move |topic_id, notification| {
            let _ = tx.send((topic_id, notification.alert_type()));
        });

        client.handle_event(AuthorityEvent::notification(
            7,
            Notification::alert(AlertType::Yellow, "storm"),
        ));

        let received = tokio::time::timeout(WAIT, rx.recv()).await.unwrap();
        assert_eq!(received, Some((TopicId::new(7), Some(AlertType::Yellow))));
    }

    #[tokio::test]
    async fn synchronize_uses_authority() {
        let client = NotificationClient::new(Arc::new(LoopbackAuthority::new())).unwrap();
        client.push_topic_list(topics());

        client.subscribe(TopicId::new(2)).unwrap();
        assert_eq!(client.pending_changes(), vec![SubscriptionRequest::new(2, true)]);

        let report = client.synchronize().await.unwrap();

        assert_eq!(report.subscribed(), &[TopicId::new(2)]);
        assert!(client.authority().is_subscribed(TopicId::new(2)));
        assert!(client.is_subscribed(TopicId::new(2)));
        assert!(client.pending_changes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn configured_timeout_applies() {
        let authority = LoopbackAuthority::new().with_latency(Duration::from_secs(60));
        let config = ClientConfig::default().with_sync_timeout(Duration::from_millis(500));
        let client = NotificationClient::with_config(authority, config).unwrap();
        client.push_topic_list(topics());
        client.subscribe(TopicId::new(2)).unwrap();

        let err = client.synchronize().await.unwrap_err();

        assert!(matches!(
            err,
            Error::SyncFailed(RemoteError::Timeout(500))
        ));
        assert!(client.baseline().is_empty());
    }

    #[tokio::test]
    async fn shutdown_removes_listeners() {
        let client = NotificationClient::new(LoopbackAuthority::new()).unwrap();
        let handle = client.register_notification_listener(|_, _| {});

        client.shutdown().await;

        assert!(client.listeners().is_empty());
        assert!(matches!(
            client.unregister(handle),
            Err(Error::UnknownHandle(_))
        ));
    }
}
