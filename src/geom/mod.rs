// SPDX-License-Identifier: Apache-2.0

//! The geometry subsystem (§4.G–§4.M): turns resolved IFC products into
//! tessellated meshes via a pluggable, abstract backend.
//!
//! [`RepresentationCursor`] is the entry point: it drives
//! [`backend::GeometryBackend`] to build and combine shapes, [`openings`]
//! to bake placements and resolve opening voids, [`mesh`] to weld and
//! classify the resulting triangles, and [`style`] to resolve materials.
//! [`brep`] renders the result to an interchange format.

mod backend;
mod brep;
mod config;
mod cursor;
mod mesh;
mod openings;
mod style;

pub use backend::{BackendError, GeometryBackend, RawMesh};
pub use brep::to_obj;
pub use config::{Config, ConfigBuilder};
pub use cursor::{CursorError, ProductMesh, RepresentationCursor};
pub use mesh::{Edge, MeshData};
pub use openings::{bake_placement, filling_of, openings_of, parent_id, resolve_mapped_item};
pub use style::{default_for_type, Material, StyleResolver};
