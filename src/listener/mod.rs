// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Listener registration.
//!
//! Applications observe the client through two kinds of listeners:
//!
//! - **Topic-list listeners** receive every new [`TopicListSnapshot`](crate::topic::TopicListSnapshot)
//! - **Notification listeners** receive notifications, either for every topic
//!   or for a single topic ([`ListenerScope`])
//!
//! Registration returns a [`ListenerHandle`] used to unregister later.
//!
//! ```no_run
//! use topic_notify::{LoopbackAuthority, NotificationClient};
//!
//! # async fn example() -> topic_notify::Result<()> {
//! let client = NotificationClient::new(LoopbackAuthority::new())?;
//!
//! let handle = client.register_notification_listener(|topic_id, notification| {
//!     match notification.message() {
//!         Some(body) => println!("{topic_id}: {body}"),
//!         None => println!("{topic_id}: notification without body"),
//!     }
//! });
//!
//! client.unregister(handle)?;
//! # Ok(())
//! # }
//! ```

mod callback;
mod handle;
mod registry;

pub(crate) use callback::Delivery;
pub use callback::{Listener, ListenerKind, ListenerScope, NotificationListener, TopicListListener};
pub use handle::ListenerHandle;
pub use registry::ListenerRegistry;
