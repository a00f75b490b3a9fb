// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory remote authority.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::RemoteError;
use crate::types::TopicId;

use super::RemoteAuthority;

/// A subscription change as received by the authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionRequest {
    /// Topic the change applies to.
    pub topic_id: TopicId,
    /// `true` to subscribe, `false` to unsubscribe.
    pub subscribe: bool,
}

impl SubscriptionRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(topic_id: impl Into<TopicId>, subscribe: bool) -> Self {
        Self {
            topic_id: topic_id.into(),
            subscribe,
        }
    }
}

#[derive(Debug, Default)]
struct LoopbackState {
    requests: Vec<SubscriptionRequest>,
    subscriptions: BTreeSet<TopicId>,
    failure: Option<RemoteError>,
    rejected_topics: BTreeMap<TopicId, String>,
    latency: Option<Duration>,
}

/// A [`RemoteAuthority`] that answers from memory.
///
/// Records every request it receives and keeps the resulting server-side
/// subscription set. Failures and latency can be injected to exercise the
/// client's error paths.
///
/// # Examples
///
/// ```
/// use topic_notify::authority::{LoopbackAuthority, RemoteAuthority, SubscriptionRequest};
/// use topic_notify::types::TopicId;
///
/// # async fn example() {
/// let authority = LoopbackAuthority::new();
/// authority
///     .request_subscription_change(TopicId::new(2), true)
///     .await
///     .unwrap();
///
/// assert_eq!(authority.requests(), vec![SubscriptionRequest::new(2, true)]);
/// assert!(authority.is_subscribed(TopicId::new(2)));
/// # }
/// ```
#[derive(Debug, Default)]
pub struct LoopbackAuthority {
    state: Mutex<LoopbackState>,
}

impl LoopbackAuthority {
    /// Creates an authority that accepts every request immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every request by `latency` before answering.
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        self.state.lock().latency = Some(latency);
        self
    }

    /// Sets or clears the per-request latency.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.state.lock().latency = latency;
    }

    /// Fails every subsequent request with `error` until [`recover`](Self::recover).
    pub fn fail_with(&self, error: RemoteError) {
        self.state.lock().failure = Some(error);
    }

    /// Rejects subsequent requests for one topic.
    pub fn reject_topic(&self, topic_id: TopicId, reason: impl Into<String>) {
        self.state
            .lock()
            .rejected_topics
            .insert(topic_id, reason.into());
    }

    /// Clears all injected failures.
    pub fn recover(&self) {
        let mut state = self.state.lock();
        state.failure = None;
        state.rejected_topics.clear();
    }

    /// Returns every request received so far, including failed ones.
    #[must_use]
    pub fn requests(&self) -> Vec<SubscriptionRequest> {
        self.state.lock().requests.clone()
    }

    /// Forgets recorded requests.
    pub fn clear_requests(&self) {
        self.state.lock().requests.clear();
    }

    /// Returns the topics the authority currently considers subscribed.
    #[must_use]
    pub fn subscriptions(&self) -> BTreeSet<TopicId> {
        self.state.lock().subscriptions.clone()
    }

    /// Returns `true` if the authority considers the topic subscribed.
    #[must_use]
    pub fn is_subscribed(&self, topic_id: TopicId) -> bool {
        self.state.lock().subscriptions.contains(&topic_id)
    }
}

impl RemoteAuthority for LoopbackAuthority {
    async fn request_subscription_change(
        &self,
        topic_id: TopicId,
        subscribe: bool,
    ) -> Result<(), RemoteError> {
        let latency = self.state.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state.lock();
        state
            .requests
            .push(SubscriptionRequest::new(topic_id, subscribe));

        if let Some(error) = &state.failure {
            return Err(error.clone());
        }
        if let Some(reason) = state.rejected_topics.get(&topic_id) {
            return Err(RemoteError::Rejected {
                topic_id,
                reason: reason.clone(),
            });
        }

        if subscribe {
            state.subscriptions.insert(topic_id);
        } else {
            state.subscriptions.remove(&topic_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_requests_and_tracks_subscriptions() {
        let authority = LoopbackAuthority::new();

        authority
            .request_subscription_change(TopicId::new(1), true)
            .await
            .unwrap();
        authority
            .request_subscription_change(TopicId::new(2), true)
            .await
            .unwrap();
        authority
            .request_subscription_change(TopicId::new(1), false)
            .await
            .unwrap();

        assert_eq!(authority.requests().len(), 3);
        assert_eq!(
            authority.subscriptions(),
            BTreeSet::from([TopicId::new(2)])
        );
    }

    #[tokio::test]
    async fn injected_failure_until_recover() {
        let authority = LoopbackAuthority::new();
        authority.fail_with(RemoteError::ConnectionFailed("offline".into()));

        let err = authority
            .request_subscription_change(TopicId::new(1), true)
            .await
            .unwrap_err();
        assert_eq!(err, RemoteError::ConnectionFailed("offline".into()));
        assert!(!authority.is_subscribed(TopicId::new(1)));

        authority.recover();
        authority
            .request_subscription_change(TopicId::new(1), true)
            .await
            .unwrap();
        assert!(authority.is_subscribed(TopicId::new(1)));
        assert_eq!(authority.requests().len(), 2);
    }

    #[tokio::test]
    async fn rejects_only_the_configured_topic() {
        let authority = LoopbackAuthority::new();
        authority.reject_topic(TopicId::new(3), "not allowed");

        assert!(
            authority
                .request_subscription_change(TopicId::new(2), true)
                .await
                .is_ok()
        );
        assert!(matches!(
            authority
                .request_subscription_change(TopicId::new(3), true)
                .await,
            Err(RemoteError::Rejected { topic_id, .. }) if topic_id == TopicId::new(3)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn latency_delays_answer() {
        let authority = LoopbackAuthority::new().with_latency(Duration::from_secs(2));
        let start = tokio::time::Instant::now();

        authority
            .request_subscription_change(TopicId::new(1), true)
            .await
            .unwrap();

        assert!(start.elapsed() >= Duration::from_secs(2));
    }
}
