// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `topic_notify` - client core for topic-based notifications.
//!
//! A remote authority publishes a list of topics and pushes notifications
//! on them. This library keeps the client side of that conversation:
//!
//! - **Topic registry**: the latest topic list, replaced atomically
//! - **Listeners**: application callbacks for topic lists and notifications
//! - **Dispatch**: ordered, non-blocking fan-out to listeners
//! - **Subscriptions**: desired state for optional topics, synchronized
//!   with the authority in all-or-nothing round-trips
//!
//! Mandatory topics are always delivered. Optional topics are delivered once
//! the client has subscribed to them.
//!
//! # Quick Start
//!
//! ```no_run
//! use topic_notify::{LoopbackAuthority, NotificationClient};
//! use topic_notify::types::{Notification, Topic, TopicId};
//!
//! #[tokio::main]
//! async fn main() -> topic_notify::Result<()> {
//!     let client = NotificationClient::new(LoopbackAuthority::new())?;
//!
//!     client.register_notification_listener(|topic_id, notification| {
//!         match notification.message() {
//!             Some(body) => println!("Topic {topic_id}: {body}"),
//!             None => println!("Topic {topic_id}: no body"),
//!         }
//!     });
//!
//!     // Normally driven by the transport
//!     client.push_topic_list(vec![
//!         Topic::mandatory(1, "Weather"),
//!         Topic::optional(2, "Offers"),
//!     ]);
//!
//!     client.subscribe(TopicId::new(2))?;
//!     client.synchronize().await?;
//!
//!     client.push_notification(TopicId::new(2), Notification::new().with_message("Sale"));
//!     client.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Driving the Client from a Transport
//!
//! Transports implement [`RemoteAuthority`] for outbound subscription
//! changes and feed inbound pushes as [`AuthorityEvent`]s:
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//! use topic_notify::{AuthorityEvent, LoopbackAuthority, NotificationClient};
//! use topic_notify::types::Topic;
//!
//! # async fn example() -> topic_notify::Result<()> {
//! let client = Arc::new(NotificationClient::new(LoopbackAuthority::new())?);
//! let (tx, rx) = mpsc::channel(64);
//! let event_loop = client.spawn_event_loop(rx);
//!
//! tx.send(AuthorityEvent::topic_list(vec![Topic::optional(2, "Offers")]))
//!     .await
//!     .ok();
//! drop(tx);
//! event_loop.await.ok();
//! # Ok(())
//! # }
//! ```

pub mod authority;
pub mod client;
pub mod dispatch;
pub mod error;
pub mod listener;
pub mod subscription;
pub mod topic;
pub mod types;

pub use authority::{AuthorityEvent, LoopbackAuthority, RemoteAuthority, SubscriptionRequest};
pub use client::{ClientConfig, NotificationClient};
pub use dispatch::NotificationDispatcher;
pub use error::{Error, RemoteError, Result};
pub use listener::{
    Listener, ListenerHandle, ListenerKind, ListenerRegistry, ListenerScope,
    NotificationListener, TopicListListener,
};
pub use subscription::{SubscriptionReconciler, SyncReport};
pub use topic::{TopicListSnapshot, TopicRegistry};
pub use types::{AlertType, Notification, SubscriptionType, Topic, TopicId};
