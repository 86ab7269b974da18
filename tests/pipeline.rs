//! End-to-end coverage across parsing, indexing, and geometry iteration,
//! using a small hand-written STEP file rather than a real IFC export.

use ifcstep::geom::{BackendError, Config, GeometryBackend, RawMesh, RepresentationCursor};
use ifcstep::persistence::{EntityStore, InstanceId};
use ifcstep::units::UnitAssignment;

const SAMPLE: &[u8] = br#"ISO-10303-21;
HEADER;
FILE_DESCRIPTION((''),'2;1');
FILE_NAME('','',(''),(''),'','','');
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
#1=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);
#2=IFCSIUNIT(*,.PLANEANGLEUNIT.,$,.RADIAN.);
#3=IFCUNITASSIGNMENT((#1,#2));
#10=IFCCARTESIANPOINT((0.,0.,0.));
#11=IFCDIRECTION((0.,0.,1.));
#12=IFCAXIS2PLACEMENT3D(#10,#11,$);
#13=IFCLOCALPLACEMENT($,#12);
#20=IFCGEOMETRICREPRESENTATIONCONTEXT($,$,3,1.E-5,#12,$);
#21=IFCEXTRUDEDAREASOLID();
#22=IFCSHAPEREPRESENTATION(#20,'Body','SweptSolid',(#21));
#23=IFCPRODUCTDEFINITIONSHAPE($,$,(#22));
#30=IFCWALL('2O2Fr$t4X7Zf8NOew3FNr2',$,'Wall-001',$,$,#13,#23,$,$);
#40=IFCCARTESIANPOINT((1.,0.,0.));
#41=IFCAXIS2PLACEMENT3D(#40,$,$);
#42=IFCLOCALPLACEMENT(#13,#41);
#43=IFCEXTRUDEDAREASOLID();
#44=IFCSHAPEREPRESENTATION(#20,'Body','SweptSolid',(#43));
#45=IFCPRODUCTDEFINITIONSHAPE($,$,(#44));
#50=IFCOPENINGELEMENT('0O2Fr$t4X7Zf8NOew3FNr3',$,'Opening-001',$,$,#42,#45,$,$);
#51=IFCRELVOIDSELEMENT('1O2Fr$t4X7Zf8NOew3FNr4',$,$,$,#30,#50);
#60=IFCPROJECT('3O2Fr$t4X7Zf8NOew3FNr5',$,'Demo',$,$,$,$,(#20),#3);
ENDSEC;
END-ISO-10303-21;
"#;

struct CubeBackend;

impl GeometryBackend<std::io::Cursor<Vec<u8>>> for CubeBackend {
    type Shape = Vec<[f64; 3]>;

    fn build_item(
        &self,
        _store: &EntityStore<std::io::Cursor<Vec<u8>>>,
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

fn open() -> EntityStore<std::io::Cursor<Vec<u8>>> { EntityStore::from_bytes(SAMPLE.to_vec()).unwrap() }

#[test]
fn type_index_contains_only_exact_matches() {
    let store = open();
    let walls = store.by_type("IFCWALL");
    assert_eq!(walls, &[InstanceId(30)]);
    // IfcOpeningElement must not leak into IfcWall's bucket even though
    // both are IFCELEMENT subtypes.
    assert!(store.by_type("IFCELEMENT").is_empty());
}

#[test]
fn inverse_index_round_trips_every_reference() {
    let store = open();
    // #12 (the axis placement) is referenced by #13's local placement.
    assert!(store.referrers(InstanceId(12)).contains(&InstanceId(13)));
    // #30 (the wall) is referenced by the voids relationship.
    assert!(store.referrers(InstanceId(30)).contains(&InstanceId(51)));
}

#[test]
fn guid_index_resolves_the_wall_by_its_global_id() {
    let store = open();
    assert_eq!(store.by_guid("2O2Fr$t4X7Zf8NOew3FNr2"), Some(InstanceId(30)));
}

#[test]
fn unit_assignment_resolves_millimetres() {
    let store = open();
    let units = UnitAssignment::resolve(&store, Some(InstanceId(3)), &[InstanceId(20)]).unwrap();
    assert!((units.length_to_metre - 0.001).abs() < 1e-12);
    assert!(!units.length_was_assumed);
    assert_eq!(units.precision, Some(1e-5));
}

#[test]
fn cursor_subtracts_openings_and_yields_meshes_for_every_wall() {
    let store = open();
    let backend = CubeBackend;
    let walls = store.by_type("IFCWALL").to_vec();
    let cursor = RepresentationCursor::new(&store, &backend, Config::default(), walls);
    let meshes: Vec<_> = cursor.collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(meshes.len(), 1);
    assert_eq!(meshes[0].product, InstanceId(30));
    assert!(!meshes[0].mesh.vertices.is_empty());
    // every item resolves to a concrete material (the wall type default,
    // since no IFCSTYLEDITEM is present in this fixture).
    assert!(meshes[0].material_index >= 0);
}

#[test]
fn opening_parent_id_is_the_voided_wall() {
    let store = open();
    let parent = ifcstep::geom::parent_id(&store, InstanceId(50)).unwrap();
    assert_eq!(parent, Some(InstanceId(30)));
}

const MAPPED_ITEM_SAMPLE: &[u8] = br#"ISO-10303-21;
HEADER;
ENDSEC;
DATA;
#1=IFCCARTESIANPOINT((0.,0.,0.));
#2=IFCDIRECTION((0.,0.,1.));
#3=IFCAXIS2PLACEMENT3D(#1,#2,$);
#4=IFCLOCALPLACEMENT($,#3);
#5=IFCGEOMETRICREPRESENTATIONCONTEXT($,$,3,1.E-5,#3,$);
#6=IFCEXTRUDEDAREASOLID();
#7=IFCSHAPEREPRESENTATION(#5,'Body','SweptSolid',(#6));
#10=IFCCARTESIANPOINT((2.,0.,0.));
#11=IFCCARTESIANTRANSFORMATIONOPERATOR3D($,$,#10,$);
#12=IFCREPRESENTATIONMAP(#3,#7);
#13=IFCMAPPEDITEM(#12,#11);
#14=IFCSHAPEREPRESENTATION(#5,'Body','MappedRepresentation',(#13));
#15=IFCPRODUCTDEFINITIONSHAPE($,$,(#14));
#16=IFCSLAB('4O2Fr$t4X7Zf8NOew3FNr6',$,'Slab-001',$,$,#4,#15,$,$,$);
ENDSEC;
END-ISO-10303-21;
"#;

#[test]
fn cursor_applies_mapped_item_translation() {
    let store = EntityStore::from_bytes(MAPPED_ITEM_SAMPLE.to_vec()).unwrap();
    let backend = CubeBackend;
    let cursor = RepresentationCursor::new(&store, &backend, Config::default(), vec![InstanceId(16)]);
    let meshes: Vec<_> = cursor.collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(meshes.len(), 1);
    // the cube (x in [-0.5, 0.5]) is shifted by the mapped item's LocalOrigin
    // translation (2, 0, 0) before the (identity) object placement is baked in.
    assert!(meshes[0].mesh.vertices.iter().all(|v| v[0] > 1.0));
}
