// SPDX-License-Identifier: Apache-2.0

//! Typed accessors over the raw argument tree (§4.E): a subtype table for
//! `is()`/`type()` queries, the two-variant SELECT wrapper, and a handful
//! of concrete IFC entity façades generated by [`entities::define_entity`].
//!
//! Everything here is a thin, zero-storage wrapper: a façade holds only the
//! instance id and a borrow of the store it came from, and every accessor
//! delegates straight back to [`crate::persistence::EntityStore::argument`].

mod casts;
mod entities;
mod select;

pub use entities::*;
pub use select::SelectValue;

use crate::core::{CastError, RandomAccessRead};
use crate::persistence::{InstanceId, StoreError};

pub type AccessResult<T> = std::result::Result<T, AccessError>;

#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum AccessError {
    #[display(inner)]
    #[from]
    Store(StoreError),

    #[display(inner)]
    #[from]
    Cast(CastError),
}

/// An exact IFC entity type name with subtype lookups over a static edge
/// table. `is_a` walks the chain to its root rather than requiring callers
/// to know the full hierarchy.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct TypeTag(pub &'static str);

impl TypeTag {
    pub fn name(&self) -> &'static str { self.0 }

    pub fn parent(&self) -> Option<TypeTag> {
        SUBTYPE_TABLE.iter().find(|(child, _)| *child == self.0).map(|(_, parent)| TypeTag(parent))
    }

    /// True if `self` names `ancestor` exactly, or is a declared subtype of
    /// it, walking parent links until the table runs out.
    pub fn is_a(&self, ancestor: &str) -> bool {
        let mut current = self.0;
        loop {
            if current == ancestor {
                return true;
            }
            match SUBTYPE_TABLE.iter().find(|(child, _)| *child == current) {
                Some((_, parent)) => current = parent,
                None => return false,
            }
        }
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

/// Implemented by every generated entity façade. `R` is the store's
/// underlying reader, threaded through so a façade never outlives its store.
pub trait EntityAccess<R: RandomAccessRead> {
    fn instance_id(&self) -> InstanceId;
    fn type_tag(&self) -> TypeTag;
}

/// IFC4 entity subtype edges, limited to the entities this crate has a
/// façade for. Extending coverage means adding rows here, not new code.
const SUBTYPE_TABLE: &[(&str, &str)] = &[
    ("IFCPROJECT", "IFCOBJECTDEFINITION"),
    ("IFCOBJECTDEFINITION", "IFCROOT"),
    ("IFCOBJECT", "IFCOBJECTDEFINITION"),
    ("IFCPRODUCT", "IFCOBJECT"),
    ("IFCELEMENT", "IFCPRODUCT"),
    ("IFCBUILDINGELEMENT", "IFCELEMENT"),
    ("IFCWALL", "IFCBUILDINGELEMENT"),
    ("IFCBUILDINGELEMENTPART", "IFCBUILDINGELEMENT"),
    ("IFCFEATUREELEMENT", "IFCELEMENT"),
    ("IFCFEATUREELEMENTSUBTRACTION", "IFCFEATUREELEMENT"),
    ("IFCOPENINGELEMENT", "IFCFEATUREELEMENTSUBTRACTION"),
    ("IFCNAMEDUNIT", "IFCROOT"),
    ("IFCSIUNIT", "IFCNAMEDUNIT"),
    ("IFCCONVERSIONBASEDUNIT", "IFCNAMEDUNIT"),
    ("IFCRELATIONSHIP", "IFCROOT"),
    ("IFCRELCONNECTS", "IFCRELATIONSHIP"),
    ("IFCRELVOIDSELEMENT", "IFCRELCONNECTS"),
    ("IFCRELFILLSVOIDS", "IFCRELCONNECTS"),
    ("IFCRELCONTAINEDINSPATIALSTRUCTURE", "IFCRELCONNECTS"),
    ("IFCRELDECOMPOSES", "IFCRELATIONSHIP"),
    ("IFCRELAGGREGATES", "IFCRELDECOMPOSES"),
    ("IFCREPRESENTATIONITEM", "IFCROOT"),
    ("IFCGEOMETRICREPRESENTATIONITEM", "IFCREPRESENTATIONITEM"),
    ("IFCPOINT", "IFCGEOMETRICREPRESENTATIONITEM"),
    ("IFCCARTESIANPOINT", "IFCPOINT"),
    ("IFCDIRECTION", "IFCGEOMETRICREPRESENTATIONITEM"),
    ("IFCPLACEMENT", "IFCGEOMETRICREPRESENTATIONITEM"),
    ("IFCAXIS2PLACEMENT3D", "IFCPLACEMENT"),
    ("IFCOBJECTPLACEMENT", "IFCROOT"),
    ("IFCLOCALPLACEMENT", "IFCOBJECTPLACEMENT"),
    ("IFCREPRESENTATION", "IFCROOT"),
    ("IFCSHAPEREPRESENTATION", "IFCREPRESENTATION"),
    ("IFCPRODUCTREPRESENTATION", "IFCROOT"),
    ("IFCPRODUCTDEFINITIONSHAPE", "IFCPRODUCTREPRESENTATION"),
    ("IFCMAPPEDITEM", "IFCREPRESENTATIONITEM"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_is_a_product_and_root() {
        let tag = TypeTag("IFCWALL");
        assert!(tag.is_a("IFCWALL"));
        assert!(tag.is_a("IFCPRODUCT"));
        assert!(tag.is_a("IFCROOT"));
        assert!(!tag.is_a("IFCRELATIONSHIP"));
    }
}
