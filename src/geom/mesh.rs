// SPDX-License-Identifier: Apache-2.0

//! Mesh assembly (§4.J): vertex welding and edge-visibility classification
//! over a backend's raw triangle soup.
//!
//! Welding collapses vertices within [`Config::weld_epsilon`] of each other
//! so triangles sharing a boundary in the model actually share indices in
//! the mesh. Edge visibility follows the literal rule a tessellator applies
//! per polygonal face: within the set of triangles a single `IfcFace`
//! tessellated into, an edge used exactly once is a face boundary (visible);
//! an edge used twice is a diagonal the tessellator introduced to triangulate
//! a non-triangular face, and is invisible. The count is taken per face, not
//! across the whole mesh — two triangles from *different* faces that happen
//! to share a welded edge don't make that edge interior.

use std::collections::HashMap;

use crate::geom::Config;

#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<[f64; 3]>,
    pub triangles: Vec<[u32; 3]>,
    /// One entry per distinct undirected edge that appears in `triangles`,
    /// keyed by (edge, owning face).
    pub edges: Vec<Edge>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub a: u32,
    pub b: u32,
    pub visible: bool,
}

fn quantize(p: [f64; 3], epsilon: f64) -> (i64, i64, i64) {
    let scale = 1.0 / epsilon;
    ((p[0] * scale).round() as i64, (p[1] * scale).round() as i64, (p[2] * scale).round() as i64)
}

/// Weld coincident vertices (if `cfg.weld_vertices`) and classify every
/// edge's visibility from its per-face use count. `faces` assigns each
/// triangle in `triangles` to the polygonal face it was tessellated from
/// (same length as `triangles`); triangles sharing a `faces` entry are
/// treated as one face for edge counting.
pub fn build(vertices: &[[f64; 3]], triangles: &[[u32; 3]], faces: &[u32], cfg: &Config) -> MeshData {
    let (out_vertices, remap) = if cfg.weld_vertices {
        weld(vertices, cfg.weld_epsilon)
    } else {
        (vertices.to_vec(), (0..vertices.len() as u32).collect())
    };

    let out_triangles: Vec<[u32; 3]> =
        triangles.iter().map(|t| [remap[t[0] as usize], remap[t[1] as usize], remap[t[2] as usize]]).collect();

    let edges = classify_edges(&out_triangles, faces);
    MeshData { vertices: out_vertices, triangles: out_triangles, edges }
}

fn weld(vertices: &[[f64; 3]], epsilon: f64) -> (Vec<[f64; 3]>, Vec<u32>) {
    let mut table: HashMap<(i64, i64, i64), u32> = HashMap::new();
    let mut out = Vec::new();
    let mut remap = Vec::with_capacity(vertices.len());
    for &v in vertices {
        let key = quantize(v, epsilon);
        let id = *table.entry(key).or_insert_with(|| {
            out.push(v);
            (out.len() - 1) as u32
        });
        remap.push(id);
    }
    (out, remap)
}

fn classify_edges(triangles: &[[u32; 3]], faces: &[u32]) -> Vec<Edge> {
    // (face, edge (min, max)) -> use count within that face
    let mut counts: HashMap<(u32, u32, u32), u32> = HashMap::new();
    for (tri, &face) in triangles.iter().zip(faces) {
        for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            let (a, b) = if a < b { (a, b) } else { (b, a) };
            *counts.entry((face, a, b)).or_insert(0) += 1;
        }
    }

    // an edge can belong to more than one face once vertices are welded
    // across the mesh (e.g. two coplanar faces abutting); visible if any
    // face it's attached to uses it exactly once.
    let mut visibility: HashMap<(u32, u32), bool> = HashMap::new();
    for ((_, a, b), count) in counts {
        let visible = count == 1;
        visibility.entry((a, b)).and_modify(|v| *v = *v || visible).or_insert(visible);
    }

    let mut edges: Vec<Edge> =
        visibility.into_iter().map(|((a, b), visible)| Edge { a, b, visible }).collect();
    edges.sort_by_key(|e| (e.a, e.b));
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welding_merges_duplicate_vertices() {
        let vertices =
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, -1.0, 0.0]];
        let triangles = vec![[0, 1, 2], [3, 4, 5]];
        let faces = vec![0, 1];
        let cfg = Config::default();
        let mesh = build(&vertices, &triangles, &faces, &cfg);
        assert_eq!(mesh.vertices.len(), 4); // the shared edge's two points are deduped
    }

    #[test]
    fn coplanar_shared_edge_is_invisible_and_boundary_is_visible() {
        // two coplanar triangles tessellated from the same quad face, sharing
        // diagonal edge (0,2) in the z=0 plane
        let vertices = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]];
        let triangles = vec![[0, 1, 2], [0, 2, 3]];
        let faces = vec![0, 0];
        let cfg = Config::default();
        let mesh = build(&vertices, &triangles, &faces, &cfg);
        let shared = mesh.edges.iter().find(|e| (e.a, e.b) == (0, 2)).unwrap();
        assert!(!shared.visible);
        let boundary = mesh.edges.iter().find(|e| (e.a, e.b) == (0, 1)).unwrap();
        assert!(boundary.visible);
    }

    #[test]
    fn edge_shared_across_two_different_faces_stays_visible() {
        // two triangles, each its own face, sharing edge (0,1) — the kind of
        // boundary every edge of a welded watertight solid has once faces are
        // stitched together; must not collapse to invisible just because the
        // welded edge is globally used twice.
        let vertices = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 1.0]];
        let triangles = vec![[0, 1, 2], [0, 1, 3]];
        let faces = vec![0, 1];
        let cfg = Config::default();
        let mesh = build(&vertices, &triangles, &faces, &cfg);
        let shared = mesh.edges.iter().find(|e| (e.a, e.b) == (0, 1)).unwrap();
        assert!(shared.visible);
    }
}
