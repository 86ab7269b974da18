// SPDX-License-Identifier: Apache-2.0

//! The configuration registry (§4.M): knobs a caller can tune before
//! driving a [`super::RepresentationCursor`], mirroring the teacher's
//! builder-style config structs.

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Maximum chordal deviation allowed when a backend tessellates a
    /// curved surface, in the file's own length unit.
    pub deflection_tolerance: f64,
    /// Weld coincident vertices (within [`Config::weld_epsilon`]) before
    /// computing edge visibility.
    pub weld_vertices: bool,
    /// Absolute distance below which two vertices are considered the same
    /// point during welding.
    pub weld_epsilon: f64,
    /// Subtract `IfcOpeningElement` voids from their host element's shape.
    /// Disabling this yields the unmodified host shape, useful for callers
    /// that only need bounding geometry.
    pub apply_openings: bool,
    /// Bake placements into world coordinates rather than leaving shapes in
    /// object-local coordinates.
    pub use_world_coordinates: bool,
    /// Ask the backend for a textual boundary-representation blob alongside
    /// the tessellated mesh (see [`super::ProductMesh::brep`]). Off by
    /// default since most callers only need the mesh.
    pub use_brep_data: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            deflection_tolerance: 0.001,
            weld_vertices: true,
            weld_epsilon: 1e-5,
            apply_openings: true,
            use_world_coordinates: true,
            use_brep_data: false,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConfigBuilder(Config);

impl Config {
    pub fn builder() -> ConfigBuilder { ConfigBuilder(Config::default()) }
}

impl ConfigBuilder {
    pub fn deflection_tolerance(mut self, v: f64) -> Self {
        self.0.deflection_tolerance = v;
        self
    }

    pub fn weld_vertices(mut self, v: bool) -> Self {
        self.0.weld_vertices = v;
        self
    }

    pub fn weld_epsilon(mut self, v: f64) -> Self {
        self.0.weld_epsilon = v;
        self
    }

    pub fn apply_openings(mut self, v: bool) -> Self {
        self.0.apply_openings = v;
        self
    }

    pub fn use_world_coordinates(mut self, v: bool) -> Self {
        self.0.use_world_coordinates = v;
        self
    }

    pub fn use_brep_data(mut self, v: bool) -> Self {
        self.0.use_brep_data = v;
        self
    }

    pub fn build(self) -> Config { self.0 }
}
