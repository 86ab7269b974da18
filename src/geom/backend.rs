// SPDX-License-Identifier: Apache-2.0

//! The abstract geometry backend (§4.G). Everything an actual CAD kernel
//! would need to do — interpreting a representation item's parameters,
//! boolean subtraction for openings, sewing shells, and triangulation — is
//! behind this trait. This crate ships no implementation of it; tests use
//! a trivial stand-in that treats every item as a unit cube.

use nalgebra::Matrix4;

use crate::core::RandomAccessRead;
use crate::persistence::{EntityStore, InstanceId};

#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum BackendError {
    /// backend failed to build shape for instance #{0}: {1}
    Build(u64, String),

    /// backend failed to combine shapes: {0}
    Combine(String),

    /// backend failed to triangulate a shape: {0}
    Triangulate(String),
}

/// A triangle soup, in whatever coordinate space the backend call left it.
#[derive(Clone, Debug, PartialEq)]
pub struct RawMesh {
    pub vertices: Vec<[f64; 3]>,
    pub triangles: Vec<[u32; 3]>,
    /// The polygonal face each triangle in `triangles` was tessellated
    /// from, same length as `triangles`. Two triangles sharing an entry
    /// came from the same `IfcFace`; this is what lets edge-visibility
    /// classification apply its per-face use-count rule instead of
    /// counting across the whole shape.
    pub faces: Vec<u32>,
}

/// The seam between IFC-specific plumbing (this crate) and an actual
/// geometric modeling kernel (not this crate). `R` matches the store's
/// reader type so a backend can look up any entity it needs to interpret a
/// representation item.
pub trait GeometryBackend<R: RandomAccessRead> {
    type Shape: Clone;

    /// Interpret a single representation item (`IfcExtrudedAreaSolid`,
    /// `IfcFacetedBrep`, ...) into a backend-native shape.
    fn build_item(&self, store: &EntityStore<R>, item: InstanceId) -> Result<Self::Shape, BackendError>;

    /// `base` minus every shape in `tools`, in that order.
    fn boolean_subtract(
        &self,
        base: &Self::Shape,
        tools: &[Self::Shape],
    ) -> Result<Self::Shape, BackendError>;

    /// Combine several shells sharing a boundary into one solid.
    fn sew(&self, shells: &[Self::Shape]) -> Result<Self::Shape, BackendError>;

    /// Apply a 4x4 homogeneous transform, returning a new shape.
    fn transform(&self, shape: &Self::Shape, matrix: &Matrix4<f64>) -> Self::Shape;

    /// Tessellate within `deflection` chordal tolerance.
    fn triangulate(&self, shape: &Self::Shape, deflection: f64) -> Result<RawMesh, BackendError>;

    /// Render a shape as a textual boundary-representation blob (the
    /// backend's own format, e.g. STEP or BRep). Only called when a
    /// [`super::Config::use_brep_data`] asks for it.
    fn serialize_brep(&self, shape: &Self::Shape) -> Result<String, BackendError>;
}
