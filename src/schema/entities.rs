// SPDX-License-Identifier: Apache-2.0

//! Concrete entity façades. Each is a thin `{store, id}` pair; every
//! accessor re-fetches its argument from the store and casts it on the
//! spot, so there is nothing here to keep in sync when a file is re-read.
//!
//! Attribute indices follow the IFC4 EXPRESS schema's declared attribute
//! order (inherited attributes first), 0-based.

use crate::core::RandomAccessRead;
use crate::persistence::{EntityStore, InstanceId};
use crate::schema::{casts, AccessResult, EntityAccess, TypeTag};

/// Declares an entity façade: a constructor, one accessor per named
/// attribute, and the `EntityAccess` impl. Mirrors the hand-written
/// accessors this macro replaces, attribute for attribute.
macro_rules! define_entity {
    ($name:ident, $type_name:literal, { $($field:ident : $idx:expr => $cast:path => $ret:ty),* $(,)? }) => {
        #[doc = concat!("Façade over `", $type_name, "` instances.")]
        pub struct $name<'s, R> {
            store: &'s EntityStore<R>,
            id: InstanceId,
        }

        impl<'s, R: RandomAccessRead> $name<'s, R> {
            pub const TYPE: &'static str = $type_name;

            pub fn new(store: &'s EntityStore<R>, id: InstanceId) -> Self { $name { store, id } }

            $(
                pub fn $field(&self) -> AccessResult<$ret> {
                    let arg = self.store.argument(self.id, $idx)?;
                    let mut lexer = self.store.lexer_mut();
                    Ok($cast(&arg, &mut lexer)?)
                }
            )*
        }

        impl<'s, R: RandomAccessRead> EntityAccess<R> for $name<'s, R> {
            fn instance_id(&self) -> InstanceId { self.id }
            fn type_tag(&self) -> TypeTag { TypeTag($type_name) }
        }
    };
}

define_entity!(IfcProject, "IFCPROJECT", {
    global_id: 0 => casts::string => String,
    owner_history: 1 => casts::opt_ref => Option<InstanceId>,
    name: 2 => casts::opt_string => Option<String>,
    description: 3 => casts::opt_string => Option<String>,
    object_type: 4 => casts::opt_string => Option<String>,
    long_name: 5 => casts::opt_string => Option<String>,
    phase: 6 => casts::opt_string => Option<String>,
    representation_contexts: 7 => casts::ref_list => Vec<InstanceId>,
    units_in_context: 8 => casts::opt_ref => Option<InstanceId>,
});

// Attribute 0 (`Dimensions`) is a DERIVE on `IfcNamedUnit`; STEP still
// writes a placeholder (`*`) for it, so the written attributes start at 1.
define_entity!(IfcSIUnit, "IFCSIUNIT", {
    unit_type: 1 => casts::enum_str => String,
    prefix: 2 => casts::opt_enum_str => Option<String>,
    name: 3 => casts::enum_str => String,
});

define_entity!(IfcConversionBasedUnit, "IFCCONVERSIONBASEDUNIT", {
    unit_type: 1 => casts::enum_str => String,
    name: 2 => casts::string => String,
    conversion_factor: 3 => casts::req_ref => InstanceId,
});

define_entity!(IfcWall, "IFCWALL", {
    global_id: 0 => casts::string => String,
    owner_history: 1 => casts::opt_ref => Option<InstanceId>,
    name: 2 => casts::opt_string => Option<String>,
    description: 3 => casts::opt_string => Option<String>,
    object_type: 4 => casts::opt_string => Option<String>,
    object_placement: 5 => casts::opt_ref => Option<InstanceId>,
    representation: 6 => casts::opt_ref => Option<InstanceId>,
    tag: 7 => casts::opt_string => Option<String>,
    predefined_type: 8 => casts::opt_enum_str => Option<String>,
});

define_entity!(IfcOpeningElement, "IFCOPENINGELEMENT", {
    global_id: 0 => casts::string => String,
    owner_history: 1 => casts::opt_ref => Option<InstanceId>,
    name: 2 => casts::opt_string => Option<String>,
    description: 3 => casts::opt_string => Option<String>,
    object_type: 4 => casts::opt_string => Option<String>,
    object_placement: 5 => casts::opt_ref => Option<InstanceId>,
    representation: 6 => casts::opt_ref => Option<InstanceId>,
    tag: 7 => casts::opt_string => Option<String>,
    predefined_type: 8 => casts::opt_enum_str => Option<String>,
});

define_entity!(IfcRelVoidsElement, "IFCRELVOIDSELEMENT", {
    global_id: 0 => casts::string => String,
    owner_history: 1 => casts::opt_ref => Option<InstanceId>,
    name: 2 => casts::opt_string => Option<String>,
    description: 3 => casts::opt_string => Option<String>,
    relating_building_element: 4 => casts::req_ref => InstanceId,
    related_opening_element: 5 => casts::req_ref => InstanceId,
});

define_entity!(IfcRelFillsVoids, "IFCRELFILLSVOIDS", {
    global_id: 0 => casts::string => String,
    owner_history: 1 => casts::opt_ref => Option<InstanceId>,
    name: 2 => casts::opt_string => Option<String>,
    description: 3 => casts::opt_string => Option<String>,
    relating_opening_element: 4 => casts::req_ref => InstanceId,
    related_building_element: 5 => casts::req_ref => InstanceId,
});

define_entity!(IfcRelAggregates, "IFCRELAGGREGATES", {
    global_id: 0 => casts::string => String,
    owner_history: 1 => casts::opt_ref => Option<InstanceId>,
    name: 2 => casts::opt_string => Option<String>,
    description: 3 => casts::opt_string => Option<String>,
    relating_object: 4 => casts::req_ref => InstanceId,
    related_objects: 5 => casts::ref_list => Vec<InstanceId>,
});

define_entity!(IfcRelContainedInSpatialStructure, "IFCRELCONTAINEDINSPATIALSTRUCTURE", {
    global_id: 0 => casts::string => String,
    owner_history: 1 => casts::opt_ref => Option<InstanceId>,
    name: 2 => casts::opt_string => Option<String>,
    description: 3 => casts::opt_string => Option<String>,
    related_elements: 4 => casts::ref_list => Vec<InstanceId>,
    relating_structure: 5 => casts::req_ref => InstanceId,
});

define_entity!(IfcShapeRepresentation, "IFCSHAPEREPRESENTATION", {
    context_of_items: 0 => casts::req_ref => InstanceId,
    representation_identifier: 1 => casts::opt_string => Option<String>,
    representation_type: 2 => casts::opt_string => Option<String>,
    items: 3 => casts::ref_list => Vec<InstanceId>,
});

define_entity!(IfcProductDefinitionShape, "IFCPRODUCTDEFINITIONSHAPE", {
    name: 0 => casts::opt_string => Option<String>,
    description: 1 => casts::opt_string => Option<String>,
    representations: 2 => casts::ref_list => Vec<InstanceId>,
});

define_entity!(IfcMappedItem, "IFCMAPPEDITEM", {
    mapping_source: 0 => casts::req_ref => InstanceId,
    mapping_target: 1 => casts::req_ref => InstanceId,
});

define_entity!(IfcRepresentationMap, "IFCREPRESENTATIONMAP", {
    mapping_origin: 0 => casts::req_ref => InstanceId,
    mapped_representation: 1 => casts::req_ref => InstanceId,
});

// Rotation (Axis1/Axis2/Axis3) and non-uniform Scale are read but not
// applied: this crate only bakes the LocalOrigin translation into a mapped
// item's placement (see geom::openings::resolve_mapped_item), matching the
// Open Question decision to surface IfcMappedItem's more general transform
// as a warning rather than implement it in full.
define_entity!(IfcCartesianTransformationOperator3D, "IFCCARTESIANTRANSFORMATIONOPERATOR3D", {
    axis1: 0 => casts::opt_ref => Option<InstanceId>,
    axis2: 1 => casts::opt_ref => Option<InstanceId>,
    local_origin: 2 => casts::req_ref => InstanceId,
    scale: 3 => casts::raw => crate::core::Argument,
});

define_entity!(IfcCartesianPoint, "IFCCARTESIANPOINT", {
    coordinates: 0 => casts::real_list => Vec<f64>,
});

define_entity!(IfcDirection, "IFCDIRECTION", {
    direction_ratios: 0 => casts::real_list => Vec<f64>,
});

define_entity!(IfcAxis2Placement3D, "IFCAXIS2PLACEMENT3D", {
    location: 0 => casts::req_ref => InstanceId,
    axis: 1 => casts::opt_ref => Option<InstanceId>,
    ref_direction: 2 => casts::opt_ref => Option<InstanceId>,
});

define_entity!(IfcLocalPlacement, "IFCLOCALPLACEMENT", {
    placement_rel_to: 0 => casts::opt_ref => Option<InstanceId>,
    relative_placement: 1 => casts::req_ref => InstanceId,
});

define_entity!(IfcUnitAssignmentEntity, "IFCUNITASSIGNMENT", {
    units: 0 => casts::ref_list => Vec<InstanceId>,
});

define_entity!(IfcMeasureWithUnit, "IFCMEASUREWITHUNIT", {
    value_component: 0 => casts::raw => crate::core::Argument,
    unit_component: 1 => casts::req_ref => InstanceId,
});

define_entity!(IfcStyledItem, "IFCSTYLEDITEM", {
    item: 0 => casts::opt_ref => Option<InstanceId>,
    styles: 1 => casts::ref_list => Vec<InstanceId>,
    name: 2 => casts::opt_string => Option<String>,
});

define_entity!(IfcSurfaceStyle, "IFCSURFACESTYLE", {
    name: 0 => casts::opt_string => Option<String>,
    side: 1 => casts::enum_str => String,
    styles: 2 => casts::ref_list => Vec<InstanceId>,
});

// Covers both IfcSurfaceStyleShading and its IfcSurfaceStyleRendering
// subtype: only the two attributes they share are modeled here.
define_entity!(IfcSurfaceStyleShading, "IFCSURFACESTYLESHADING", {
    surface_colour: 0 => casts::req_ref => InstanceId,
    transparency: 1 => casts::raw => crate::core::Argument,
});

define_entity!(IfcColourRgb, "IFCCOLOURRGB", {
    name: 0 => casts::opt_string => Option<String>,
    red: 1 => casts::real => f64,
    green: 2 => casts::real => f64,
    blue: 3 => casts::real => f64,
});

define_entity!(IfcExtrudedAreaSolid, "IFCEXTRUDEDAREASOLID", {
    swept_area: 0 => casts::req_ref => InstanceId,
    position: 1 => casts::opt_ref => Option<InstanceId>,
    extruded_direction: 2 => casts::req_ref => InstanceId,
    depth: 3 => casts::real => f64,
});

define_entity!(IfcGeometricRepresentationContext, "IFCGEOMETRICREPRESENTATIONCONTEXT", {
    context_identifier: 0 => casts::opt_string => Option<String>,
    context_type: 1 => casts::opt_string => Option<String>,
    coord_space_dimension: 2 => casts::int => i64,
    precision: 3 => casts::raw => crate::core::Argument,
    world_coord_system: 4 => casts::req_ref => InstanceId,
    true_north: 5 => casts::opt_ref => Option<InstanceId>,
});
