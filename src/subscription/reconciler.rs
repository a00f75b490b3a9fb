// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconciliation of desired subscriptions with the remote authority.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};

use crate::authority::{RemoteAuthority, SubscriptionRequest};
use crate::error::{Error, RemoteError, Result};
use crate::topic::{TopicListSnapshot, TopicRegistry};
use crate::types::TopicId;

/// Outcome of a successful [`SubscriptionReconciler::synchronize`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    subscribed: Vec<TopicId>,
    unsubscribed: Vec<TopicId>,
}

impl SyncReport {
    fn from_changes(changes: &[SubscriptionRequest]) -> Self {
        let (subscribed, unsubscribed): (Vec<SubscriptionRequest>, Vec<_>) =
            changes.iter().copied().partition(|change| change.subscribe);
        Self {
            subscribed: subscribed.into_iter().map(|c| c.topic_id).collect(),
            unsubscribed: unsubscribed.into_iter().map(|c| c.topic_id).collect(),
        }
    }

    /// Topics newly subscribed, in ascending id order.
    #[must_use]
    pub fn subscribed(&self) -> &[TopicId] {
        &self.subscribed
    }

    /// Topics newly unsubscribed, in ascending id order.
    #[must_use]
    pub fn unsubscribed(&self) -> &[TopicId] {
        &self.unsubscribed
    }

    /// Number of changes sent to the authority.
    #[must_use]
    pub fn change_count(&self) -> usize {
        self.subscribed.len() + self.unsubscribed.len()
    }

    /// Returns `true` if nothing had to be sent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.change_count() == 0
    }
}

/// Marks a synchronization as in flight for as long as it is alive.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Keeps the desired subscription state of optional topics and pushes the
/// difference to the remote authority.
///
/// Two maps are maintained:
///
/// - the **intent**: what the application wants, per optional topic
/// - the **baseline**: the optional topics the authority last confirmed as
///   subscribed
///
/// [`synchronize`](Self::synchronize) sends one request per topic whose
/// intent differs from the baseline and commits the new baseline only when
/// every request succeeds. Retrying is left to the caller: a failed call
/// leaves the baseline untouched, so the next call sends the same diff.
pub struct SubscriptionReconciler<R> {
    authority: R,
    topics: Arc<TopicRegistry>,
    intent: Mutex<BTreeMap<TopicId, bool>>,
    /// Written only while `in_flight` is held.
    baseline: RwLock<BTreeSet<TopicId>>,
    in_flight: AtomicBool,
}

impl<R: RemoteAuthority> SubscriptionReconciler<R> {
    /// Creates a reconciler validating against `topics` and syncing with `authority`.
    #[must_use]
    pub fn new(authority: R, topics: Arc<TopicRegistry>) -> Self {
        Self {
            authority,
            topics,
            intent: Mutex::new(BTreeMap::new()),
            baseline: RwLock::new(BTreeSet::new()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Returns the remote authority.
    #[must_use]
    pub fn authority(&self) -> &R {
        &self.authority
    }

    /// Records whether the application wants to be subscribed to a topic.
    ///
    /// Nothing is sent until [`synchronize`](Self::synchronize).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTopic`] if the topic is missing from the
    /// current snapshot or is mandatory.
    pub fn set_desired(&self, topic_id: TopicId, subscribed: bool) -> Result<()> {
        // Validate under the intent lock so a concurrent prune cannot interleave.
        let mut intent = self.intent.lock();
        if !self.topics.current_snapshot().is_optional(topic_id) {
            return Err(Error::InvalidTopic(topic_id));
        }

        intent.insert(topic_id, subscribed);
        drop(intent);
        tracing::debug!(%topic_id, subscribed, "Updated subscription intent");
        Ok(())
    }

    /// Returns the desired state of a topic, if one was recorded.
    #[must_use]
    pub fn desired(&self, topic_id: TopicId) -> Option<bool> {
        self.intent.lock().get(&topic_id).copied()
    }

    /// Returns a copy of the whole intent.
    #[must_use]
    pub fn intent(&self) -> BTreeMap<TopicId, bool> {
        self.intent.lock().clone()
    }

    /// Returns the optional topics last confirmed subscribed by the authority.
    #[must_use]
    pub fn baseline(&self) -> BTreeSet<TopicId> {
        self.baseline.read().clone()
    }

    /// Returns `true` if the client is subscribed to the topic.
    ///
    /// Mandatory topics are always subscribed; optional topics are
    /// subscribed once a synchronization has confirmed it.
    #[must_use]
    pub fn is_subscribed(&self, topic_id: TopicId) -> bool {
        match self.topics.lookup(topic_id) {
            Some(topic) if topic.is_mandatory() => true,
            Some(_) => self.baseline.read().contains(&topic_id),
            None => false,
        }
    }

    /// Returns the changes the next [`synchronize`](Self::synchronize) would send.
    #[must_use]
    pub fn pending_changes(&self) -> Vec<SubscriptionRequest> {
        let snapshot = self.topics.current_snapshot();
        self.diff(&snapshot)
    }

    /// Drops intent for topics that are no longer optional.
    ///
    /// Prunes against `snapshot` or the registry's current snapshot,
    /// whichever is newer, so a push that lost a race with a later one
    /// cannot prune against a stale list.
    pub fn retain_known(&self, snapshot: &TopicListSnapshot) {
        let mut intent = self.intent.lock();
        let current = self.topics.current_snapshot();
        let snapshot = if current.version() > snapshot.version() {
            current.as_ref()
        } else {
            snapshot
        };

        let before = intent.len();
        intent.retain(|topic_id, _| snapshot.is_optional(*topic_id));

        let dropped = before - intent.len();
        if dropped > 0 {
            tracing::debug!(
                dropped,
                version = snapshot.version(),
                "Dropped intent for topics gone from topic list"
            );
        }
    }

    /// Sends the difference between intent and baseline to the authority.
    ///
    /// Requests go out one at a time in ascending topic id order. The whole
    /// round-trip is bounded by `timeout`. On success the baseline is
    /// updated with every change sent; on any failure it is left as it was.
    ///
    /// # Errors
    ///
    /// - [`Error::SyncInProgress`] if another call is in flight
    /// - [`Error::SyncFailed`] if a request failed or the timeout elapsed
    pub async fn synchronize(&self, timeout: Duration) -> Result<SyncReport> {
        let Some(_in_flight) = InFlight::acquire(&self.in_flight) else {
            tracing::debug!("Rejected concurrent subscription sync");
            return Err(Error::SyncInProgress);
        };

        let snapshot = self.topics.current_snapshot();
        let changes = self.diff(&snapshot);
        if changes.is_empty() {
            self.commit(&snapshot, &changes);
            tracing::debug!("Subscriptions already in sync");
            return Ok(SyncReport::default());
        }

        tracing::debug!(changes = changes.len(), "Synchronizing subscriptions");

        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        let outcome = tokio::time::timeout(timeout, self.send_changes(&changes))
            .await
            .unwrap_or(Err(RemoteError::Timeout(timeout_ms)));

        if let Err(e) = outcome {
            tracing::warn!(error = %e, "Subscription sync failed, baseline unchanged");
            return Err(Error::SyncFailed(e));
        }

        self.commit(&snapshot, &changes);

        let report = SyncReport::from_changes(&changes);
        tracing::info!(
            subscribed = report.subscribed().len(),
            unsubscribed = report.unsubscribed().len(),
            "Subscriptions synchronized"
        );
        Ok(report)
    }

    /// Applies a successful round-trip to the baseline.
    ///
    /// Topics no longer optional in `snapshot` are dropped in the same
    /// critical section, so a failed call never touches the baseline.
    fn commit(&self, snapshot: &TopicListSnapshot, changes: &[SubscriptionRequest]) {
        let mut baseline = self.baseline.write();
        baseline.retain(|topic_id| snapshot.is_optional(*topic_id));
        for change in changes {
            if change.subscribe {
                baseline.insert(change.topic_id);
            } else {
                baseline.remove(&change.topic_id);
            }
        }
    }

    async fn send_changes(
        &self,
        changes: &[SubscriptionRequest],
    ) -> std::result::Result<(), RemoteError> {
        for change in changes {
            tracing::trace!(
                topic_id = %change.topic_id,
                subscribe = change.subscribe,
                "Requesting subscription change"
            );
            self.authority
                .request_subscription_change(change.topic_id, change.subscribe)
                .await?;
        }
        Ok(())
    }

    fn diff(&self, snapshot: &TopicListSnapshot) -> Vec<SubscriptionRequest> {
        let intent = self.intent.lock();
        let baseline = self.baseline.read();

        intent
            .iter()
            .filter(|(topic_id, _)| snapshot.is_optional(**topic_id))
            .filter(|(topic_id, want)| baseline.contains(*topic_id) != **want)
            .map(|(topic_id, want)| SubscriptionRequest::new(*topic_id, *want))
            .collect()
    }
}

impl<R> std::fmt::Debug for SubscriptionReconciler<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionReconciler")
            .field("intent", &*self.intent.lock())
            .field("baseline", &*self.baseline.read())
            .field("in_flight", &self.in_flight.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}
