// SPDX-License-Identifier: Apache-2.0

//! Unit resolution (§4.F): walk `IfcProject`'s unit assignment once at
//! open time to find the length and plane-angle units in effect, chaining
//! through `IfcConversionBasedUnit` to its underlying SI unit.
//!
//! The millimetre fallback is deliberately narrow, matching
//! `examples/original_source/src/ifcgeom/IfcGeomObjects.cpp:631-651`: it
//! only fires when the file has **no unit assignment at all**, and even
//! then only if a scan of `IFCEXTRUDEDAREASOLID.Depth` turns up a value
//! over [`EXTRUSION_DEPTH_THRESHOLD`] model units (a building whose
//! extrusions run to "500" is almost certainly modeled in millimetres, not
//! half-kilometre metres). A unit assignment that's merely missing an
//! `IFCLENGTHUNIT` member is left at the SI default of 1.0 (metres) —
//! the original does not apply the heuristic in that case, and neither do
//! we.

use crate::core::Argument;
use crate::core::RandomAccessRead;
use crate::persistence::{EntityStore, InstanceId};
use crate::schema::{
    AccessResult, IfcConversionBasedUnit, IfcExtrudedAreaSolid, IfcGeometricRepresentationContext,
    IfcMeasureWithUnit, IfcSIUnit, IfcUnitAssignmentEntity,
};

/// Millimetre-per-metre fallback applied when a file has no unit
/// assignment at all and an extrusion-depth scan suggests millimetres.
pub const MILLIMETRE_FALLBACK: f64 = 0.001;

/// Extrusion depths, in raw model units, above which a file with no unit
/// assignment is assumed to be modeled in millimetres rather than metres.
pub const EXTRUSION_DEPTH_THRESHOLD: f64 = 100.0;

/// The length and angle scale factors in effect for a file, resolved once
/// when the model is opened.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitAssignment {
    /// Multiply a raw length value by this to get metres.
    pub length_to_metre: f64,
    /// Multiply a raw plane-angle value by this to get radians.
    pub angle_to_radian: f64,
    /// True when the file had no unit assignment at all and
    /// [`MILLIMETRE_FALLBACK`] was assumed from an extrusion-depth scan.
    pub length_was_assumed: bool,
    /// The tessellation precision declared by the file's geometric
    /// representation context, if any, in the file's own length unit.
    pub precision: Option<f64>,
}

fn si_prefix_factor(prefix: Option<&str>) -> f64 {
    match prefix {
        None => 1.0,
        Some("EXA") => 1e18,
        Some("PETA") => 1e15,
        Some("TERA") => 1e12,
        Some("GIGA") => 1e9,
        Some("MEGA") => 1e6,
        Some("KILO") => 1e3,
        Some("HECTO") => 1e2,
        Some("DECA") => 1e1,
        Some("DECI") => 1e-1,
        Some("CENTI") => 1e-2,
        Some("MILLI") => 1e-3,
        Some("MICRO") => 1e-6,
        Some("NANO") => 1e-9,
        Some("PICO") => 1e-12,
        Some("FEMTO") => 1e-15,
        Some("ATTO") => 1e-18,
        Some(_) => 1.0,
    }
}

fn resolve_conversion_factor<R: RandomAccessRead>(
    store: &EntityStore<R>,
    measure_id: InstanceId,
) -> AccessResult<f64> {
    let measure = IfcMeasureWithUnit::new(store, measure_id);
    let raw = measure.value_component()?;
    let value = match &raw {
        Argument::Inline(inline) => {
            let mut lexer = store.lexer_mut();
            inline.value.as_real(&mut lexer)?
        }
        other => {
            let mut lexer = store.lexer_mut();
            other.as_real(&mut lexer)?
        }
    };
    let unit_id = measure.unit_component()?;
    let type_name = store.by_id(unit_id).map(|i| i.type_name.clone());
    let base = match type_name.as_deref() {
        Some("IFCSIUNIT") => {
            let si = IfcSIUnit::new(store, unit_id);
            si_prefix_factor(si.prefix()?.as_deref())
        }
        Some("IFCCONVERSIONBASEDUNIT") => {
            let cbu = IfcConversionBasedUnit::new(store, unit_id);
            resolve_conversion_factor(store, cbu.conversion_factor()?)?
        }
        _ => 1.0,
    };
    Ok(value * base)
}

/// True if any `IFCEXTRUDEDAREASOLID` in the file has a depth over
/// [`EXTRUSION_DEPTH_THRESHOLD`] model units. Only consulted when a file
/// has no unit assignment at all — see the module docs.
fn has_large_extrusion<R: RandomAccessRead>(store: &EntityStore<R>) -> AccessResult<bool> {
    for &id in store.by_type("IFCEXTRUDEDAREASOLID") {
        let depth = IfcExtrudedAreaSolid::new(store, id).depth()?;
        if depth > EXTRUSION_DEPTH_THRESHOLD {
            return Ok(true);
        }
    }
    Ok(false)
}

impl UnitAssignment {
    /// Resolve length and angle scale, and precision.
    ///
    /// `units_in_context` is `IfcProject.UnitsInContext`, when the file has
    /// one; `representation_contexts` feeds the precision scan
    /// (`IfcProject.RepresentationContexts`). A unit assignment that omits
    /// `IFCLENGTHUNIT` leaves the length scale at its SI default of 1.0
    /// (metres); the millimetre heuristic only applies when there is no
    /// unit assignment to consult in the first place.
    pub fn resolve<R: RandomAccessRead>(
        store: &EntityStore<R>,
        units_in_context: Option<InstanceId>,
        representation_contexts: &[InstanceId],
    ) -> AccessResult<Self> {
        let (length_to_metre, angle_to_radian, length_was_assumed) = match units_in_context {
            Some(units_id) => {
                let assignment = IfcUnitAssignmentEntity::new(store, units_id);
                let mut length_scale = None;
                let mut angle_scale = None;
                for unit_id in assignment.units()? {
                    let Some(type_name) = store.by_id(unit_id).map(|i| i.type_name.clone()) else { continue };
                    match type_name.as_str() {
                        "IFCSIUNIT" => {
                            let si = IfcSIUnit::new(store, unit_id);
                            let unit_type = si.unit_type()?;
                            let factor = si_prefix_factor(si.prefix()?.as_deref());
                            match unit_type.as_str() {
                                "LENGTHUNIT" => length_scale = Some(factor),
                                "PLANEANGLEUNIT" => angle_scale = Some(factor),
                                _ => {}
                            }
                        }
                        "IFCCONVERSIONBASEDUNIT" => {
                            let cbu = IfcConversionBasedUnit::new(store, unit_id);
                            let unit_type = cbu.unit_type()?;
                            let factor = resolve_conversion_factor(store, cbu.conversion_factor()?)?;
                            match unit_type.as_str() {
                                "LENGTHUNIT" => length_scale = Some(factor),
                                "PLANEANGLEUNIT" => angle_scale = Some(factor),
                                _ => {}
                            }
                        }
                        _ => {}
                    }
                }
                (length_scale.unwrap_or(1.0), angle_scale.unwrap_or(1.0), false)
            }
            None => {
                if has_large_extrusion(store)? {
                    log::warn!(
                        "no unit assignment found, but extrusions over {EXTRUSION_DEPTH_THRESHOLD} model units exist; assuming millimetres"
                    );
                    (MILLIMETRE_FALLBACK, 1.0, true)
                } else {
                    (1.0, 1.0, false)
                }
            }
        };

        let mut precision = None;
        for &ctx_id in representation_contexts {
            if store.by_id(ctx_id).map(|i| i.type_name.as_str()) != Some("IFCGEOMETRICREPRESENTATIONCONTEXT") {
                continue;
            }
            let ctx = IfcGeometricRepresentationContext::new(store, ctx_id);
            let raw = ctx.precision()?;
            if !raw.is_null() {
                let mut lexer = store.lexer_mut();
                precision = Some(raw.as_real(&mut lexer)?);
                break;
            }
        }

        Ok(UnitAssignment { length_to_metre, angle_to_radian, length_was_assumed, precision })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_with_explicit_metres() -> EntityStore<std::io::Cursor<Vec<u8>>> {
        EntityStore::from_bytes(
            br#"ISO-10303-21;
HEADER;
ENDSEC;
DATA;
#1=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);
#2=IFCSIUNIT(*,.PLANEANGLEUNIT.,$,.RADIAN.);
#3=IFCUNITASSIGNMENT((#1,#2));
ENDSEC;
END-ISO-10303-21;
"#
            .to_vec(),
        )
        .unwrap()
    }

    #[test]
    fn millimetre_si_unit_scales_to_metres() {
        let store = sample_with_explicit_metres();
        let units = UnitAssignment::resolve(&store, Some(InstanceId(3)), &[]).unwrap();
        assert!((units.length_to_metre - 0.001).abs() < 1e-12);
        assert!((units.angle_to_radian - 1.0).abs() < 1e-12);
        assert!(!units.length_was_assumed);
    }

    fn sample_without_length_unit() -> EntityStore<std::io::Cursor<Vec<u8>>> {
        EntityStore::from_bytes(
            br#"ISO-10303-21;
HEADER;
ENDSEC;
DATA;
#1=IFCSIUNIT(*,.PLANEANGLEUNIT.,$,.RADIAN.);
#2=IFCUNITASSIGNMENT((#1));
ENDSEC;
END-ISO-10303-21;
"#
            .to_vec(),
        )
        .unwrap()
    }

    #[test]
    fn unit_assignment_without_length_unit_defaults_to_metres() {
        // A unit assignment that merely omits IFCLENGTHUNIT is left at the
        // SI default; the mm heuristic never fires here, matching the
        // original, which only consults it when there is no assignment at
        // all.
        let store = sample_without_length_unit();
        let units = UnitAssignment::resolve(&store, Some(InstanceId(2)), &[]).unwrap();
        assert!(!units.length_was_assumed);
        assert!((units.length_to_metre - 1.0).abs() < 1e-12);
    }

    fn sample_with_no_unit_assignment(depth: &str) -> EntityStore<std::io::Cursor<Vec<u8>>> {
        let src = format!(
            r#"ISO-10303-21;
HEADER;
ENDSEC;
DATA;
#1=IFCCARTESIANPOINT((0.,0.,0.));
#2=IFCDIRECTION((0.,0.,1.));
#3=IFCDIRECTION((1.,0.,0.));
#4=IFCAXIS2PLACEMENT3D(#1,#2,#3);
#5=IFCARBITRARYCLOSEDPROFILEDEF(.AREA.,$,$);
#6=IFCEXTRUDEDAREASOLID(#5,#4,#2,{depth});
ENDSEC;
END-ISO-10303-21;
"#
        );
        EntityStore::from_bytes(src.into_bytes()).unwrap()
    }

    #[test]
    fn no_unit_assignment_with_large_extrusion_assumes_millimetres() {
        let store = sample_with_no_unit_assignment("500.");
        let units = UnitAssignment::resolve(&store, None, &[]).unwrap();
        assert!(units.length_was_assumed);
        assert!((units.length_to_metre - MILLIMETRE_FALLBACK).abs() < 1e-12);
    }

    #[test]
    fn no_unit_assignment_with_small_extrusion_defaults_to_metres() {
        let store = sample_with_no_unit_assignment("2.5");
        let units = UnitAssignment::resolve(&store, None, &[]).unwrap();
        assert!(!units.length_was_assumed);
        assert!((units.length_to_metre - 1.0).abs() < 1e-12);
    }

    #[test]
    fn no_unit_assignment_and_no_extrusions_defaults_to_metres() {
        let store = EntityStore::from_bytes(
            br#"ISO-10303-21;
HEADER;
ENDSEC;
DATA;
ENDSEC;
END-ISO-10303-21;
"#
            .to_vec(),
        )
        .unwrap();
        let units = UnitAssignment::resolve(&store, None, &[]).unwrap();
        assert!(!units.length_was_assumed);
        assert!((units.length_to_metre - 1.0).abs() < 1e-12);
    }
}
