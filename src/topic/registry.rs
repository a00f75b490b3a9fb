// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Local cache of the authority's topic list.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::types::{Topic, TopicId};

use super::TopicListSnapshot;

/// Holds the latest complete topic-list snapshot.
///
/// Replacement swaps an `Arc` under a write lock, so readers always see
/// either the previous snapshot or the new one in full. Readers keep their
/// `Arc` for as long as they need it; the old snapshot is freed once the
/// last reader drops it.
///
/// # Examples
///
/// ```
/// use topic_notify::topic::TopicRegistry;
/// use topic_notify::types::{Topic, TopicId};
///
/// let registry = TopicRegistry::new();
/// assert!(registry.current_snapshot().is_empty());
///
/// registry.replace_snapshot(vec![Topic::optional(2, "Offers")]);
/// assert_eq!(registry.lookup(TopicId::new(2)).unwrap().name(), "Offers");
/// ```
#[derive(Debug, Default)]
pub struct TopicRegistry {
    current: RwLock<Arc<TopicListSnapshot>>,
}

impl TopicRegistry {
    /// Creates a registry holding the empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replaces the current snapshot and returns the new one.
    pub fn replace_snapshot(
        &self,
        topics: impl IntoIterator<Item = Topic>,
    ) -> Arc<TopicListSnapshot> {
        let mut current = self.current.write();
        let snapshot = Arc::new(TopicListSnapshot::new(current.version() + 1, topics));
        *current = Arc::clone(&snapshot);
        drop(current);

        tracing::debug!(
            version = snapshot.version(),
            topics = snapshot.len(),
            "Replaced topic list snapshot"
        );
        snapshot
    }

    /// Returns the latest complete snapshot.
    #[must_use]
    pub fn current_snapshot(&self) -> Arc<TopicListSnapshot> {
        Arc::clone(&*self.current.read())
    }

    /// Looks up a topic in the current snapshot.
    #[must_use]
    pub fn lookup(&self, id: TopicId) -> Option<Topic> {
        self.current.read().get(id).cloned()
    }
}
