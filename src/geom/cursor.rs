// SPDX-License-Identifier: Apache-2.0

//! The representation cursor (§4.H): a two-level iterator that walks every
//! product with geometry, then every representation item within its
//! shape representation, applying opening subtraction and placement
//! baking before handing the result to a [`GeometryBackend`] for
//! tessellation.

use nalgebra::Matrix4;

use crate::core::RandomAccessRead;
use crate::geom::backend::{BackendError, GeometryBackend};
use crate::geom::config::Config;
use crate::geom::mesh::{self, MeshData};
use crate::geom::openings;
use crate::geom::style::StyleResolver;
use crate::persistence::{EntityStore, InstanceId};
use crate::schema::{AccessError, IfcProductDefinitionShape, IfcShapeRepresentation};

#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum CursorError {
    #[display(inner)]
    #[from]
    Access(AccessError),

    #[display(inner)]
    #[from]
    Backend(BackendError),

    /// product #{0} has a representation with no shape items.
    EmptyRepresentation(u64),
}

/// One product's resolved, tessellated geometry.
pub struct ProductMesh {
    pub product: InstanceId,
    pub mesh: MeshData,
    /// Cache-slot index into the cursor's [`StyleResolver`] for this
    /// product's representative material, or -1 if none could be resolved
    /// (unreachable in practice: an unstyled item still gets a type default).
    pub material_index: i32,
    /// The id used for hierarchical export: see [`openings::parent_id`].
    pub parent_id: Option<InstanceId>,
    /// A textual boundary-representation blob from the backend, present
    /// only when [`Config::use_brep_data`] is set.
    pub brep: Option<String>,
}

/// Walks `products` (typically every id returned by
/// [`EntityStore::by_type`] for a product type, or a caller-assembled
/// list spanning several types) and yields one [`ProductMesh`] per
/// product that actually carries a shape representation.
pub struct RepresentationCursor<'s, R, B: GeometryBackend<R>> {
    store: &'s EntityStore<R>,
    backend: &'s B,
    config: Config,
    products: std::vec::IntoIter<InstanceId>,
    style: StyleResolver<'s, R>,
    /// Accumulated non-fatal notes (skipped products, fallbacks taken).
    /// Populated regardless of the `diagnostics` feature; only the public
    /// accessor is gated, so enabling it costs nothing to turn on later.
    diagnostics: std::cell::RefCell<String>,
}

impl<'s, R: RandomAccessRead, B: GeometryBackend<R>> RepresentationCursor<'s, R, B> {
    pub fn new(store: &'s EntityStore<R>, backend: &'s B, config: Config, products: Vec<InstanceId>) -> Self {
        RepresentationCursor {
            store,
            backend,
            config,
            products: products.into_iter(),
            style: StyleResolver::new(store),
            diagnostics: std::cell::RefCell::new(String::new()),
        }
    }

    /// The material assigned to a [`ProductMesh::material_index`].
    pub fn material_for(&self, index: i32) -> Option<crate::geom::style::Material> {
        self.style.material_for_slot(index)
    }

    fn note(&self, message: std::fmt::Arguments<'_>) {
        use std::fmt::Write as _;
        let _ = writeln!(self.diagnostics.borrow_mut(), "{message}");
    }

    /// Every non-fatal note recorded so far, one per line, oldest first.
    #[cfg(feature = "diagnostics")]
    pub fn log(&self) -> String { self.diagnostics.borrow().clone() }

    fn product_shape_id(&self, product: InstanceId) -> Result<Option<InstanceId>, CursorError> {
        if self.store.by_id(product).is_none() {
            return Ok(None);
        }
        // IfcProduct.Representation is attribute 6 for every product
        // subtype this crate has a façade for (see entities.rs).
        let arg = self.store.argument(product, 6).map_err(AccessError::from)?;
        if arg.is_null() {
            return Ok(None);
        }
        let mut lexer = self.store.lexer_mut();
        let id = arg.as_reference(&mut lexer).map_err(AccessError::from)?;
        Ok(Some(InstanceId(id)))
    }

    fn shape_representations(&self, shape_id: InstanceId) -> Result<Vec<InstanceId>, CursorError> {
        let shape = IfcProductDefinitionShape::new(self.store, shape_id);
        Ok(shape.representations()?)
    }

    /// Items under `representation_id`, each paired with the transform to
    /// pre-multiply into its placement. A plain item carries no transform
    /// (`None`); an `IFCMAPPEDITEM` is expanded into its mapped
    /// representation's own items, each paired with the mapped item's
    /// translation (see [`openings::resolve_mapped_item`]).
    fn representation_items(
        &self,
        representation_id: InstanceId,
    ) -> Result<Vec<(InstanceId, Option<Matrix4<f64>>)>, CursorError> {
        let representation = IfcShapeRepresentation::new(self.store, representation_id);
        let mut out = Vec::new();
        for item_id in representation.items()? {
            if self.store.by_id(item_id).map(|i| i.type_name.as_str()) == Some("IFCMAPPEDITEM") {
                let (mapped_items, matrix) = openings::resolve_mapped_item(self.store, item_id)?;
                out.extend(mapped_items.into_iter().map(|id| (id, Some(matrix))));
            } else {
                out.push((item_id, None));
            }
        }
        Ok(out)
    }

    /// Build, subtract openings from, place, and tessellate one product.
    fn build_one(&self, product: InstanceId) -> Result<Option<ProductMesh>, CursorError> {
        let Some(shape_id) = self.product_shape_id(product)? else { return Ok(None) };
        let mut items = Vec::new();
        for representation_id in self.shape_representations(shape_id)? {
            items.extend(self.representation_items(representation_id)?);
        }
        if items.is_empty() {
            log::debug!("product #{} has a shape representation with no items", product.0);
            self.note(format_args!("product #{} skipped: shape representation has no items", product.0));
            return Err(CursorError::EmptyRepresentation(product.0));
        }

        let product_type = self.store.by_id(product).map(|i| i.type_name.clone()).unwrap_or_default();
        let material_index = self.style.resolve_slot(items[0].0, &product_type)?;

        let item_shapes: Vec<B::Shape> = items
            .iter()
            .map(|&(id, transform)| {
                let shape = self.backend.build_item(self.store, id)?;
                Ok(match transform {
                    Some(m) => self.backend.transform(&shape, &m),
                    None => shape,
                })
            })
            .collect::<Result<_, BackendError>>()?;
        let base = self.backend.sew(&item_shapes)?;

        let shaped = if self.config.apply_openings {
            let opening_shapes = self.opening_tool_shapes(product)?;
            if opening_shapes.is_empty() { base } else { self.backend.boolean_subtract(&base, &opening_shapes)? }
        } else {
            base
        };

        let placed = if self.config.use_world_coordinates {
            match self.object_placement(product)? {
                Some(matrix) => self.backend.transform(&shaped, &matrix),
                None => shaped,
            }
        } else {
            shaped
        };

        let brep = if self.config.use_brep_data {
            Some(self.backend.serialize_brep(&placed)?)
        } else {
            None
        };

        let raw = self.backend.triangulate(&placed, self.config.deflection_tolerance)?;
        let mesh = mesh::build(&raw.vertices, &raw.triangles, &raw.faces, &self.config);
        let parent_id = openings::parent_id(self.store, product)?;
        Ok(Some(ProductMesh { product, mesh, material_index, parent_id, brep }))
    }

    fn opening_tool_shapes(&self, product: InstanceId) -> Result<Vec<B::Shape>, CursorError> {
        let mut shapes = Vec::new();
        for opening_id in openings::openings_of(self.store, product)? {
            let Some(shape_id) = self.product_shape_id(opening_id)? else { continue };
            let mut items = Vec::new();
            for representation_id in self.shape_representations(shape_id)? {
                items.extend(self.representation_items(representation_id)?);
            }
            for (item_id, transform) in items {
                let shape = self.backend.build_item(self.store, item_id)?;
                shapes.push(match transform {
                    Some(m) => self.backend.transform(&shape, &m),
                    None => shape,
                });
            }
        }
        Ok(shapes)
    }

    fn object_placement(&self, product: InstanceId) -> Result<Option<nalgebra::Matrix4<f64>>, CursorError> {
        let arg = self.store.argument(product, 5).map_err(AccessError::from)?;
        if arg.is_null() {
            return Ok(None);
        }
        let mut lexer = self.store.lexer_mut();
        let placement_id = InstanceId(arg.as_reference(&mut lexer).map_err(AccessError::from)?);
        drop(lexer);
        Ok(Some(openings::bake_placement(self.store, placement_id)?))
    }
}

impl<'s, R: RandomAccessRead, B: GeometryBackend<R>> Iterator for RepresentationCursor<'s, R, B> {
    type Item = Result<ProductMesh, CursorError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let product = self.products.next()?;
            match self.build_one(product) {
                Ok(Some(mesh)) => return Some(Ok(mesh)),
                Ok(None) => continue, // no representation: not an error, just nothing to yield
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor as IoCursor;

    /// Every item becomes a unit cube centered at the origin; booleans and
    /// sewing are no-ops. Good enough to exercise the cursor's plumbing
    /// without a real modeling kernel.
    struct CubeBackend;

    impl GeometryBackend<IoCursor<Vec<u8>>> for CubeBackend {
        type Shape = Vec<[f64; 3]>;

        fn build_item(
            &self,
            _store: &EntityStore<IoCursor<Vec<u8>>>,
            _item: InstanceId,
        ) -> Result<Self::Shape, BackendError> {
            Ok(vec![[-0.5, -0.5, -0.5], [0.5, -0.5, -0.5], [0.5, 0.5, -0.5], [-0.5, 0.5, -0.5]])
        }

        fn boolean_subtract(&self, base: &Self::Shape, _tools: &[Self::Shape]) -> Result<Self::Shape, BackendError> {
            Ok(base.clone())
        }

        fn sew(&self, shells: &[Self::Shape]) -> Result<Self::Shape, BackendError> {
            Ok(shells.first().cloned().unwrap_or_default())
        }

        fn transform(&self, shape: &Self::Shape, matrix: &nalgebra::Matrix4<f64>) -> Self::Shape {
            shape
                .iter()
                .map(|p| {
                    let v = matrix * nalgebra::Vector4::new(p[0], p[1], p[2], 1.0);
                    [v.x, v.y, v.z]
                })
                .collect()
        }

        fn triangulate(&self, shape: &Self::Shape, _deflection: f64) -> Result<RawMesh, BackendError> {
            Ok(RawMesh { vertices: shape.clone(), triangles: vec![[0, 1, 2], [0, 2, 3]], faces: vec![0, 0] })
        }

        fn serialize_brep(&self, _shape: &Self::Shape) -> Result<String, BackendError> {
            Ok(String::from("brep"))
        }
    }

    fn sample_store() -> EntityStore<IoCursor<Vec<u8>>> {
        EntityStore::from_bytes(
            br#"ISO-10303-21;
HEADER;
ENDSEC;
DATA;
#1=IFCCARTESIANPOINT((0.,0.,0.));
#2=IFCDIRECTION((0.,0.,1.));
#3=IFCAXIS2PLACEMENT3D(#1,#2,$);
#4=IFCLOCALPLACEMENT($,#3);
#5=IFCSHAPEREPRESENTATION(#6,'Body','SweptSolid',(#7));
#6=IFCGEOMETRICREPRESENTATIONCONTEXT($,$,3,1.E-5,#3,$);
#7=IFCEXTRUDEDAREASOLID();
#8=IFCPRODUCTDEFINITIONSHAPE($,$,(#5));
#9=IFCWALL('2O2Fr$t4X7Zf8NOew3FNr2',$,'Wall-001',$,$,#4,#8,$,$);
ENDSEC;
END-ISO-10303-21;
"#
            .to_vec(),
        )
        .unwrap()
    }

    #[test]
    fn cursor_yields_one_mesh_per_represented_product() {
        let store = sample_store();
        let backend = CubeBackend;
        let cursor = RepresentationCursor::new(&store, &backend, Config::default(), vec![InstanceId(9)]);
        let results: Vec<_> = cursor.collect();
        assert_eq!(results.len(), 1);
        let product_mesh = results.into_iter().next().unwrap().unwrap();
        assert_eq!(product_mesh.product, InstanceId(9));
        assert_eq!(product_mesh.mesh.triangles.len(), 2);
    }
}
