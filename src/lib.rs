// SPDX-License-Identifier: Apache-2.0

//! `ifcstep` parses STEP physical-file encoded IFC models into a typed,
//! lazily-materialized entity graph, and exposes an iterator that walks the
//! graph's shape representations to yield per-product geometry.
//!
//! The crate is organized around the two subsystems described by its data
//! flow: [`core`] and [`persistence`] build the byte-level parser and the
//! entity store; [`schema`] layers typed accessors and SELECT polymorphism on
//! top; [`units`] resolves the file's length/angle magnitudes once at open
//! time; [`geom`] drives the representation cursor that turns resolved shapes
//! into meshes or boundary-representation blobs via an abstract backend.

#[macro_use]
extern crate amplify;

pub mod core;
pub mod error;
pub mod geom;
pub mod persistence;
pub mod schema;
pub mod units;

pub mod prelude {
    pub use crate::core::{Argument, ArgumentRef, CastError, Lexer, Token, TokenKind};
    pub use crate::error::{Error, Result};
    pub use crate::geom::{
        Config, GeometryBackend, Material, MeshData, RepresentationCursor, StyleResolver,
    };
    pub use crate::persistence::{EntityStore, Instance, InstanceId};
    pub use crate::schema::{EntityAccess, SelectValue, TypeTag};
    pub use crate::units::UnitAssignment;
}

pub use prelude::*;
