// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription management for optional topics.
//!
//! Mandatory topics need no action. Optional topics are subscribed in two
//! steps: the application records its intent, then synchronizes it with
//! the remote authority.
//!
//! ```no_run
//! use topic_notify::{LoopbackAuthority, NotificationClient};
//! use topic_notify::types::TopicId;
//!
//! # async fn example() -> topic_notify::Result<()> {
//! let client = NotificationClient::new(LoopbackAuthority::new())?;
//!
//! client.subscribe(TopicId::new(2))?;
//! client.unsubscribe(TopicId::new(3))?;
//!
//! let report = client.synchronize().await?;
//! println!("{} changes sent", report.change_count());
//! # Ok(())
//! # }
//! ```

mod reconciler;

pub use reconciler::{SubscriptionReconciler, SyncReport};
