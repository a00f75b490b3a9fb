// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types exchanged with the remote authority.
//!
//! # Types
//!
//! - [`TopicId`] - Identifier of a topic
//! - [`SubscriptionType`] - Mandatory or optional subscription
//! - [`Topic`] - A topic as announced in a topic-list push
//! - [`AlertType`] - Red/Yellow/Green notification severity
//! - [`Notification`] - A notification with optional alert type and body

mod notification;
mod topic;

pub use notification::{AlertType, Notification};
pub use topic::{SubscriptionType, Topic, TopicId};
