// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topic registry.
//!
//! - [`TopicListSnapshot`] - An immutable, ordered view of the known topics
//! - [`TopicRegistry`] - Holds the current snapshot and swaps it atomically

mod registry;
mod snapshot;

pub use registry::TopicRegistry;
pub use snapshot::TopicListSnapshot;
