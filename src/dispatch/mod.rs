// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Notification dispatch.
//!
//! The [`NotificationDispatcher`] hands inbound pushes to listeners without
//! running listener code on the caller's thread. Guarantees:
//!
//! - each matching listener receives each delivery exactly once
//! - notifications for one topic arrive in `deliver` order
//! - at most one delivery per listener is in flight; others queue
//! - distinct listeners run concurrently

mod dispatcher;
mod worker;

pub use dispatcher::NotificationDispatcher;
pub(crate) use worker::ListenerWorker;
