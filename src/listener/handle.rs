// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Listener handle type.

use std::fmt;

/// Opaque identifier of a registered listener.
///
/// Returned on registration and used to unregister. Handles are unique for
/// the lifetime of the registry that issued them and are never reused.
///
/// # Examples
///
/// ```ignore
/// let handle = client.register_notification_listener(|topic_id, n| { /* ... */ });
///
/// // Later
/// client.unregister(handle)?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerHandle(u64);

impl ListenerHandle {
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw handle value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({})", self.0)
    }
}
