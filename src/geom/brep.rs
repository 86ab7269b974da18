// SPDX-License-Identifier: Apache-2.0

//! Mesh-to-text export: render an already-tessellated [`MeshData`] as
//! Wavefront OBJ, the lowest-common-denominator interchange format for
//! triangle meshes. Visible edges are emitted as OBJ line (`l`) elements
//! alongside the faces, so a viewer can draw silhouette/crease lines
//! without recomputing them.
//!
//! This is distinct from the boundary-rep serializer named in §4.K
//! (`GeometryBackend::serialize_brep`), which asks the backend to render
//! its own, untessellated shape (a compound of moved items) as a textual
//! BRep blob — a kernel-native format, not a mesh format. `to_obj` only
//! ever sees the triangle soup this crate already produced.

use std::fmt::Write as _;

use super::mesh::MeshData;

pub fn to_obj(mesh: &MeshData, object_name: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "o {object_name}");
    for v in &mesh.vertices {
        let _ = writeln!(out, "v {:.9} {:.9} {:.9}", v[0], v[1], v[2]);
    }
    for tri in &mesh.triangles {
        let _ = writeln!(out, "f {} {} {}", tri[0] + 1, tri[1] + 1, tri[2] + 1);
    }
    for edge in mesh.edges.iter().filter(|e| e.visible) {
        let _ = writeln!(out, "l {} {}", edge.a + 1, edge.b + 1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Config;

    #[test]
    fn emits_one_indexed_faces_and_visible_edges_only() {
        let vertices = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]];
        let triangles = vec![[0, 1, 2], [0, 2, 3]];
        let faces = vec![0, 0];
        let mesh = crate::geom::mesh::build(&vertices, &triangles, &faces, &Config::default());
        let obj = to_obj(&mesh, "wall-1");
        assert!(obj.contains("o wall-1"));
        assert!(obj.contains("f 1 2 3"));
        assert!(!obj.contains("l 1 3") && !obj.contains("l 3 1"));
    }
}
