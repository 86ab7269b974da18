// SPDX-License-Identifier: Apache-2.0

//! Placement baking and opening/filling relationship resolution (§4.I).
//!
//! Placement: `IfcLocalPlacement.PlacementRelTo` chains toward the root;
//! baking composes the chain from the root down so a product's world
//! matrix is idempotent to compute twice. Openings: `IfcRelVoidsElement`
//! and `IfcRelFillsVoids` are looked up through the store's inverse index
//! rather than scanned, since both relationships point away from the
//! element whose openings we want.

use nalgebra::{Matrix4, Vector3};

use crate::core::RandomAccessRead;
use crate::persistence::{EntityStore, InstanceId};
use crate::schema::{
    IfcAxis2Placement3D, IfcCartesianPoint, IfcCartesianTransformationOperator3D, IfcDirection,
    IfcLocalPlacement, IfcMappedItem, IfcRepresentationMap,
};

use super::CursorError;

/// Compose the homogeneous transform for `placement_id`, walking
/// `PlacementRelTo` back to the file's root placement and multiplying
/// parent-then-local so the result is already in world space.
pub fn bake_placement<R: RandomAccessRead>(
    store: &EntityStore<R>,
    placement_id: InstanceId,
) -> Result<Matrix4<f64>, CursorError> {
    let placement = IfcLocalPlacement::new(store, placement_id);
    let local = axis_placement_matrix(store, placement.relative_placement()?)?;
    match placement.placement_rel_to()? {
        Some(parent_id) => {
            let parent = bake_placement(store, parent_id)?;
            Ok(parent * local)
        }
        None => Ok(local),
    }
}

fn axis_placement_matrix<R: RandomAccessRead>(
    store: &EntityStore<R>,
    axis_id: InstanceId,
) -> Result<Matrix4<f64>, CursorError> {
    let axis = IfcAxis2Placement3D::new(store, axis_id);
    let origin = point3(store, axis.location()?)?;

    let z = match axis.axis()? {
        Some(dir_id) => direction3(store, dir_id)?.normalize(),
        None => Vector3::z(),
    };
    let x_hint = match axis.ref_direction()? {
        Some(dir_id) => direction3(store, dir_id)?,
        None => Vector3::x(),
    };
    // Gram-Schmidt: re-orthogonalize the hint against z rather than trust
    // the file to have supplied an exactly perpendicular pair.
    let x = (x_hint - z * z.dot(&x_hint)).normalize();
    let y = z.cross(&x);

    let mut m = Matrix4::identity();
    m.fixed_view_mut::<3, 1>(0, 0).copy_from(&x);
    m.fixed_view_mut::<3, 1>(0, 1).copy_from(&y);
    m.fixed_view_mut::<3, 1>(0, 2).copy_from(&z);
    m.fixed_view_mut::<3, 1>(0, 3).copy_from(&origin);
    Ok(m)
}

fn point3<R: RandomAccessRead>(
    store: &EntityStore<R>,
    id: InstanceId,
) -> Result<Vector3<f64>, CursorError> {
    let coords = IfcCartesianPoint::new(store, id).coordinates()?;
    Ok(Vector3::new(
        coords.first().copied().unwrap_or(0.0),
        coords.get(1).copied().unwrap_or(0.0),
        coords.get(2).copied().unwrap_or(0.0),
    ))
}

fn direction3<R: RandomAccessRead>(
    store: &EntityStore<R>,
    id: InstanceId,
) -> Result<Vector3<f64>, CursorError> {
    let ratios = IfcDirection::new(store, id).direction_ratios()?;
    Ok(Vector3::new(
        ratios.first().copied().unwrap_or(0.0),
        ratios.get(1).copied().unwrap_or(0.0),
        ratios.get(2).copied().unwrap_or(1.0),
    ))
}

/// The `IfcOpeningElement`s voiding `element` directly, found by scanning
/// its referrers for `IFCRELVOIDSELEMENT` instances.
fn direct_openings<R: RandomAccessRead>(
    store: &EntityStore<R>,
    element: InstanceId,
) -> Result<Vec<InstanceId>, CursorError> {
    use crate::schema::IfcRelVoidsElement;
    let mut out = Vec::new();
    for &referrer in store.referrers(element) {
        let Some(instance) = store.by_id(referrer) else { continue };
        if instance.type_name != "IFCRELVOIDSELEMENT" {
            continue;
        }
        let rel = IfcRelVoidsElement::new(store, referrer);
        if rel.relating_building_element()? == element {
            out.push(rel.related_opening_element()?);
        }
    }
    Ok(out)
}

/// The object `element` decomposes into, via `IFCRELAGGREGATES.RelatedObjects`,
/// found by scanning its referrers (the inverse of an aggregation points from
/// the whole toward its parts, so this walks "whole"s that list `element`
/// among their parts).
fn decomposition_parent<R: RandomAccessRead>(
    store: &EntityStore<R>,
    element: InstanceId,
) -> Result<Option<InstanceId>, CursorError> {
    use crate::schema::IfcRelAggregates;
    for &referrer in store.referrers(element) {
        let Some(instance) = store.by_id(referrer) else { continue };
        if instance.type_name != "IFCRELAGGREGATES" {
            continue;
        }
        let rel = IfcRelAggregates::new(store, referrer);
        if rel.related_objects()?.contains(&element) {
            return Ok(Some(rel.relating_object()?));
        }
    }
    Ok(None)
}

/// The spatial structure directly containing `element`, via
/// `IFCRELCONTAINEDINSPATIALSTRUCTURE.RelatingStructure`.
fn spatial_container<R: RandomAccessRead>(
    store: &EntityStore<R>,
    element: InstanceId,
) -> Result<Option<InstanceId>, CursorError> {
    use crate::schema::IfcRelContainedInSpatialStructure;
    for &referrer in store.referrers(element) {
        let Some(instance) = store.by_id(referrer) else { continue };
        if instance.type_name != "IFCRELCONTAINEDINSPATIALSTRUCTURE" {
            continue;
        }
        let rel = IfcRelContainedInSpatialStructure::new(store, referrer);
        if rel.related_elements()?.contains(&element) {
            return Ok(Some(rel.relating_structure()?));
        }
    }
    Ok(None)
}

/// The `IfcOpeningElement`s voiding `element`, unioning in an
/// `IfcBuildingElementPart`'s decomposition parent's own direct openings —
/// a part inherits the openings cut into the whole element it composes.
pub fn openings_of<R: RandomAccessRead>(
    store: &EntityStore<R>,
    element: InstanceId,
) -> Result<Vec<InstanceId>, CursorError> {
    let mut out = direct_openings(store, element)?;
    let is_part = store.by_id(element).map(|i| i.type_name.as_str()) == Some("IFCBUILDINGELEMENTPART");
    if is_part {
        if let Some(parent) = decomposition_parent(store, element)? {
            for opening in direct_openings(store, parent)? {
                if !out.contains(&opening) {
                    out.push(opening);
                }
            }
        }
    }
    Ok(out)
}

/// The parent id used for hierarchical export: an opening's voided
/// element, a filler's opening, otherwise the element's spatial container,
/// otherwise the object it decomposes, in that priority order.
pub fn parent_id<R: RandomAccessRead>(
    store: &EntityStore<R>,
    element: InstanceId,
) -> Result<Option<InstanceId>, CursorError> {
    use crate::schema::{IfcRelFillsVoids, IfcRelVoidsElement};

    if store.by_id(element).map(|i| i.type_name.as_str()) == Some("IFCOPENINGELEMENT") {
        for &referrer in store.referrers(element) {
            let Some(instance) = store.by_id(referrer) else { continue };
            if instance.type_name != "IFCRELVOIDSELEMENT" {
                continue;
            }
            let rel = IfcRelVoidsElement::new(store, referrer);
            if rel.related_opening_element()? == element {
                return Ok(Some(rel.relating_building_element()?));
            }
        }
    }
    for &referrer in store.referrers(element) {
        let Some(instance) = store.by_id(referrer) else { continue };
        if instance.type_name != "IFCRELFILLSVOIDS" {
            continue;
        }
        let rel = IfcRelFillsVoids::new(store, referrer);
        if rel.related_building_element()? == element {
            return Ok(Some(rel.relating_opening_element()?));
        }
    }
    if let Some(container) = spatial_container(store, element)? {
        return Ok(Some(container));
    }
    decomposition_parent(store, element)
}

/// Expand an `IFCMAPPEDITEM` into its mapped representation's own items,
/// each paired with the translation-only transform baked from the
/// `IfcCartesianTransformationOperator3D`'s `LocalOrigin`. Rotation and
/// non-uniform scale on the operator, and the representation map's own
/// `MappingOrigin` placement, are not applied — see the module-level note
/// on [`IfcCartesianTransformationOperator3D`](crate::schema::IfcCartesianTransformationOperator3D).
pub fn resolve_mapped_item<R: RandomAccessRead>(
    store: &EntityStore<R>,
    mapped_item: InstanceId,
) -> Result<(Vec<InstanceId>, Matrix4<f64>), CursorError> {
    let item = IfcMappedItem::new(store, mapped_item);
    let map = IfcRepresentationMap::new(store, item.mapping_source()?);
    let representation = crate::schema::IfcShapeRepresentation::new(store, map.mapped_representation()?);
    let items = representation.items()?;

    let operator = IfcCartesianTransformationOperator3D::new(store, item.mapping_target()?);
    let origin = point3(store, operator.local_origin()?)?;
    let mut matrix = Matrix4::identity();
    matrix.fixed_view_mut::<3, 1>(0, 3).copy_from(&origin);
    Ok((items, matrix))
}

/// The element filling `opening`, via `IFCRELFILLSVOIDS`, if any (a door
/// or window occupying a wall's opening).
pub fn filling_of<R: RandomAccessRead>(
    store: &EntityStore<R>,
    opening: InstanceId,
) -> Result<Option<InstanceId>, CursorError> {
    use crate::schema::IfcRelFillsVoids;
    for &referrer in store.referrers(opening) {
        let Some(instance) = store.by_id(referrer) else { continue };
        if instance.type_name != "IFCRELFILLSVOIDS" {
            continue;
        }
        let rel = IfcRelFillsVoids::new(store, referrer);
        if rel.relating_opening_element()? == opening {
            return Ok(Some(rel.related_building_element()?));
        }
    }
    Ok(None)
}
