// SPDX-License-Identifier: Apache-2.0

//! The four in-memory indices the store maintains over a scanned file
//! (§4.D). The id→offset index is folded into [`super::store::Instance`]
//! itself rather than kept as a separate map — see DESIGN.md.

use indexmap::IndexMap;
use std::collections::HashMap;

use super::store::{Instance, InstanceId};

#[derive(Default)]
pub struct Indices {
    /// Declaration order is preserved; IndexMap over HashMap exists for
    /// exactly this reason.
    pub by_id: IndexMap<InstanceId, Instance>,
    pub by_type: IndexMap<String, Vec<InstanceId>>,
    pub referrers: HashMap<InstanceId, Vec<InstanceId>>,
    pub by_guid: HashMap<String, InstanceId>,
}

impl Indices {
    pub fn insert(&mut self, instance: Instance, refs: &[u64]) {
        let id = instance.id;
        self.by_type.entry(instance.type_name.clone()).or_default().push(id);
        for raw in refs {
            self.referrers.entry(InstanceId(*raw)).or_default().push(id);
        }
        self.by_id.insert(id, instance);
    }

    pub fn note_guid(&mut self, guid: String, id: InstanceId) { self.by_guid.insert(guid, id); }
}
