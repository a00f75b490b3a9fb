// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Immutable topic-list snapshot.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::types::{Topic, TopicId};

/// A complete view of the known topics at one point in time.
///
/// Topics keep the order in which the authority sent them. Identifiers are
/// unique: when a push repeats an id, the first occurrence is kept.
///
/// # Examples
///
/// ```
/// use topic_notify::topic::TopicListSnapshot;
/// use topic_notify::types::{Topic, TopicId};
///
/// let snapshot = TopicListSnapshot::new(
///     1,
///     vec![Topic::mandatory(1, "Weather"), Topic::optional(2, "Offers")],
/// );
///
/// assert_eq!(snapshot.len(), 2);
/// assert_eq!(snapshot.get(TopicId::new(2)).unwrap().name(), "Offers");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicListSnapshot {
    version: u64,
    topics: Vec<Topic>,
    index: HashMap<TopicId, usize>,
}

impl TopicListSnapshot {
    /// Builds a snapshot from topics in arrival order.
    #[must_use]
    pub fn new(version: u64, topics: impl IntoIterator<Item = Topic>) -> Self {
        let mut kept = Vec::new();
        let mut index = HashMap::new();

        for topic in topics {
            match index.entry(topic.id()) {
                Entry::Occupied(_) => {
                    tracing::warn!(
                        topic_id = %topic.id(),
                        name = %topic.name(),
                        "Dropping duplicate topic id from topic list"
                    );
                }
                Entry::Vacant(slot) => {
                    slot.insert(kept.len());
                    kept.push(topic);
                }
            }
        }

        Self {
            version,
            topics: kept,
            index,
        }
    }

    /// Returns the version assigned by the registry; `0` is the initial empty snapshot.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns the topics in arrival order.
    #[must_use]
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// Iterates over the topics in arrival order.
    pub fn iter(&self) -> std::slice::Iter<'_, Topic> {
        self.topics.iter()
    }

    /// Returns the topic with the given id.
    #[must_use]
    pub fn get(&self, id: TopicId) -> Option<&Topic> {
        self.index.get(&id).map(|&pos| &self.topics[pos])
    }

    /// Returns `true` if the snapshot contains the topic.
    #[must_use]
    pub fn contains(&self, id: TopicId) -> bool {
        self.index.contains_key(&id)
    }

    /// Returns `true` if the topic exists and is optional.
    #[must_use]
    pub fn is_optional(&self, id: TopicId) -> bool {
        self.get(id).is_some_and(Topic::is_optional)
    }

    /// Iterates over the optional topics.
    pub fn optional_topics(&self) -> impl Iterator<Item = &Topic> {
        self.topics.iter().filter(|t| t.is_optional())
    }

    /// Iterates over the mandatory topics.
    pub fn mandatory_topics(&self) -> impl Iterator<Item = &Topic> {
        self.topics.iter().filter(|t| t.is_mandatory())
    }

    /// Returns the number of topics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    /// Returns `true` if no topics are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

impl<'a> IntoIterator for &'a TopicListSnapshot {
    type Item = &'a Topic;
    type IntoIter = std::slice::Iter<'a, Topic>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TopicListSnapshot {
        TopicListSnapshot::new(
            3,
            vec![
                Topic::optional(5, "Offers"),
                Topic::mandatory(1, "Weather"),
                Topic::optional(9, "News"),
            ],
        )
    }

    #[test]
    fn preserves_arrival_order() {
        let ids: Vec<u64> = sample().iter().map(|t| t.id().value()).collect();
        assert_eq!(ids, vec![5, 1, 9]);
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence() {
        let snapshot = TopicListSnapshot::new(
            1,
            vec![
                Topic::optional(1, "First"),
                Topic::mandatory(1, "Second"),
                Topic::optional(2, "Other"),
            ],
        );

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get(TopicId::new(1)).unwrap().name(), "First");
        assert_eq!(snapshot.get(TopicId::new(2)).unwrap().name(), "Other");
    }

    #[test]
    fn lookup_and_type_queries() {
        let snapshot = sample();
        assert!(snapshot.contains(TopicId::new(1)));
        assert!(!snapshot.contains(TopicId::new(2)));
        assert!(snapshot.is_optional(TopicId::new(5)));
        assert!(!snapshot.is_optional(TopicId::new(1)));
        assert!(!snapshot.is_optional(TopicId::new(42)));
        assert_eq!(snapshot.optional_topics().count(), 2);
        assert_eq!(snapshot.mandatory_topics().count(), 1);
    }

    #[test]
    fn default_is_empty() {
        let snapshot = TopicListSnapshot::default();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.version(), 0);
    }
}
