// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client configuration.

use std::time::Duration;

use tokio::runtime::Handle;

/// Default timeout for a subscription synchronization round-trip.
pub const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for a [`NotificationClient`](super::NotificationClient).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use topic_notify::ClientConfig;
///
/// let config = ClientConfig::default().with_sync_timeout(Duration::from_secs(3));
/// assert_eq!(config.sync_timeout, Duration::from_secs(3));
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Upper bound on a `synchronize()` round-trip.
    pub sync_timeout: Duration,
    /// Runtime hosting listener execution contexts.
    ///
    /// When `None`, the runtime current at client construction is used.
    pub runtime: Option<Handle>,
}

impl ClientConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the synchronization timeout.
    #[must_use]
    pub fn with_sync_timeout(mut self, timeout: Duration) -> Self {
        self.sync_timeout = timeout;
        self
    }

    /// Runs listener callbacks on the given runtime.
    #[must_use]
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            sync_timeout: DEFAULT_SYNC_TIMEOUT,
            runtime: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.sync_timeout, Duration::from_secs(10));
        assert!(config.runtime.is_none());
    }

    #[tokio::test]
    async fn builder_methods() {
        let config = ClientConfig::new()
            .with_sync_timeout(Duration::from_millis(250))
            .with_runtime(Handle::current());

        assert_eq!(config.sync_timeout, Duration::from_millis(250));
        assert!(config.runtime.is_some());
    }
}
