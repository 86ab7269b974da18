// SPDX-License-Identifier: Apache-2.0

//! The entity store: a single forward scan of a STEP physical file that
//! builds the id→instance, type→ids, id→referrers, and guid→id indices
//! (§4.D). Argument trees are parsed lazily from the offsets this module
//! records, by [`crate::core`].

mod index;
mod store;

pub use store::{EntityStore, Instance, InstanceId, StoreError};
