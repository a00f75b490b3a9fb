// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the notification client.
//!
//! Every error is returned to the immediate caller. Nothing is raised across
//! the listener boundary: a failing listener is the application's concern.

use thiserror::Error;

use crate::listener::ListenerHandle;
use crate::types::TopicId;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// The topic does not exist in the current snapshot, or is not optional.
    #[error("topic {0} is not an optional topic in the current snapshot")]
    InvalidTopic(TopicId),

    /// Synchronizing subscriptions with the remote authority failed or timed out.
    ///
    /// The synchronized baseline is unchanged.
    #[error("subscription sync failed: {0}")]
    SyncFailed(#[from] RemoteError),

    /// Another synchronization is already in flight.
    #[error("subscription sync already in progress")]
    SyncInProgress,

    /// The listener handle was never issued or has already been unregistered.
    #[error("unknown listener handle: {0}")]
    UnknownHandle(ListenerHandle),

    /// No tokio runtime is available to run listener deliveries.
    #[error("no tokio runtime available for listener execution")]
    NoRuntime,
}

/// Errors reported by a [`RemoteAuthority`](crate::authority::RemoteAuthority).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The remote authority could not be reached.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The round-trip did not complete in time.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The remote authority refused a subscription change.
    #[error("change for topic {topic_id} rejected: {reason}")]
    Rejected {
        /// Topic whose change was refused.
        topic_id: TopicId,
        /// Reason given by the authority.
        reason: String,
    },

    /// Internal channel was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
