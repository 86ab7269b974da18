// SPDX-License-Identifier: Apache-2.0

//! The SELECT wrapper (§3): an IFC `SELECT` attribute resolves to either an
//! entity reference or an inline, typed value. Concrete `SELECT`s in the
//! schema (`IfcMaterialSelect`, `IfcAxis2Placement`, ...) are unions over
//! entity types; this crate doesn't encode each union's member list, since
//! the store's type index already answers "what concrete type is this",
//! so `SelectValue` only needs to distinguish the two *argument shapes*.

use crate::core::{Argument, CastError, InlineEntity, Lexer, RandomAccessRead};
use crate::persistence::InstanceId;

#[derive(Clone, Debug, PartialEq)]
pub enum SelectValue {
    /// The attribute is `#n`: resolve through the store's type/id indices.
    Entity(InstanceId),
    /// The attribute is `KEYWORD(value)`: a typed, non-entity value.
    Inline(InlineEntity),
    /// A bare scalar or list with no entity reference and no type keyword.
    Simple(Argument),
}

impl SelectValue {
    pub fn from_argument<R: RandomAccessRead>(
        arg: &Argument,
        lexer: &mut Lexer<R>,
    ) -> Result<Self, CastError> {
        match arg {
            Argument::Inline(inline) => Ok(SelectValue::Inline(inline.clone())),
            Argument::List(_) => Ok(SelectValue::Simple(arg.clone())),
            Argument::Scalar(_) => match arg.as_reference(lexer) {
                Ok(id) => Ok(SelectValue::Entity(InstanceId(id))),
                Err(_) => Ok(SelectValue::Simple(arg.clone())),
            },
        }
    }

    pub fn as_entity(&self) -> Option<InstanceId> {
        match self {
            SelectValue::Entity(id) => Some(*id),
            _ => None,
        }
    }
}
