// SPDX-License-Identifier: Apache-2.0

//! Material/style resolution (§4.L): walk from a representation item to
//! its `IfcStyledItem`, through `IfcSurfaceStyle`, down to the RGB colour,
//! caching by item id since the same style is commonly shared across many
//! items. An item with no style chain falls back to a type-name-keyed
//! default table rather than one flat grey.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::core::RandomAccessRead;
use crate::persistence::{EntityStore, InstanceId};
use crate::schema::{AccessResult, IfcColourRgb, IfcStyledItem, IfcSurfaceStyle, IfcSurfaceStyleShading};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

impl Default for Material {
    fn default() -> Self { Material { red: 0.7, green: 0.7, blue: 0.7, alpha: 1.0 } }
}

/// Default colour for a product with no resolvable style, keyed by its
/// IFC type name (`IfcWall`, `IfcSlab`, ...). Falls back to a neutral grey
/// for any type not in the table.
pub fn default_for_type(type_name: &str) -> Material {
    match type_name.to_ascii_uppercase().as_str() {
        "IFCSITE" => Material { red: 0.75, green: 0.80, blue: 0.65, alpha: 1.0 },
        "IFCSLAB" => Material { red: 0.4, green: 0.4, blue: 0.4, alpha: 1.0 },
        "IFCWALL" | "IFCWALLSTANDARDCASE" => Material { red: 0.9, green: 0.9, blue: 0.9, alpha: 1.0 },
        "IFCWINDOW" => Material { red: 0.75, green: 0.8, blue: 0.75, alpha: 0.3 },
        "IFCDOOR" => Material { red: 0.55, green: 0.3, blue: 0.15, alpha: 1.0 },
        "IFCBEAM" => Material { red: 0.75, green: 0.7, blue: 0.7, alpha: 1.0 },
        "IFCRAILING" | "IFCMEMBER" => Material { red: 0.65, green: 0.6, blue: 0.6, alpha: 1.0 },
        "IFCPLATE" => Material { red: 0.8, green: 0.8, blue: 0.8, alpha: 1.0 },
        _ => Material::default(),
    }
}

/// A `StyleResolver` hands out small integer slot indices rather than
/// [`Material`] values directly, so a mesh can carry a per-triangle material
/// index (§4.J) instead of duplicating colour data per vertex.
pub struct StyleResolver<'s, R> {
    store: &'s EntityStore<R>,
    cache: RefCell<HashMap<InstanceId, i32>>,
    slots: RefCell<Vec<Material>>,
}

impl<'s, R: RandomAccessRead> StyleResolver<'s, R> {
    pub fn new(store: &'s EntityStore<R>) -> Self {
        StyleResolver { store, cache: RefCell::new(HashMap::new()), slots: RefCell::new(Vec::new()) }
    }

    /// The material assigned to cache slot `index`, or `None` if `index` is
    /// out of range (an index of -1, "no material", always resolves to
    /// `None`).
    pub fn material_for_slot(&self, index: i32) -> Option<Material> {
        usize::try_from(index).ok().and_then(|i| self.slots.borrow().get(i).copied())
    }

    fn slot_for(&self, material: Material) -> i32 {
        let mut slots = self.slots.borrow_mut();
        if let Some(pos) = slots.iter().position(|m| *m == material) {
            return pos as i32;
        }
        slots.push(material);
        (slots.len() - 1) as i32
    }

    /// Resolve the cache-slot index for representation item `item`, falling
    /// back to [`default_for_type`] keyed on `product_type` when no style
    /// chain is attached. Every item resolves to a concrete slot in this
    /// implementation — the "-1, no material" case named by the invariant
    /// is unreachable here since a type default always applies.
    pub fn resolve_slot(&self, item: InstanceId, product_type: &str) -> AccessResult<i32> {
        if let Some(&hit) = self.cache.borrow().get(&item) {
            return Ok(hit);
        }
        let material = self.resolve_uncached(item)?.unwrap_or_else(|| default_for_type(product_type));
        let slot = self.slot_for(material);
        self.cache.borrow_mut().insert(item, slot);
        Ok(slot)
    }

    /// Resolve the material for representation item `item`, falling back
    /// to [`Material::default`] when no style is attached.
    pub fn resolve(&self, item: InstanceId) -> AccessResult<Material> {
        Ok(self.resolve_uncached(item)?.unwrap_or_default())
    }

    fn resolve_uncached(&self, item: InstanceId) -> AccessResult<Option<Material>> {
        for &referrer in self.store.referrers(item) {
            let Some(instance) = self.store.by_id(referrer) else { continue };
            if instance.type_name != "IFCSTYLEDITEM" {
                continue;
            }
            let styled = IfcStyledItem::new(self.store, referrer);
            if styled.item()? != Some(item) {
                continue;
            }
            for style_id in styled.styles()? {
                if let Some(material) = self.material_from_style(style_id)? {
                    return Ok(Some(material));
                }
            }
        }
        Ok(None)
    }

    fn material_from_style(&self, style_id: InstanceId) -> AccessResult<Option<Material>> {
        let Some(instance) = self.store.by_id(style_id) else { return Ok(None) };
        match instance.type_name.as_str() {
            "IFCSURFACESTYLE" => {
                let surface = IfcSurfaceStyle::new(self.store, style_id);
                for shading_id in surface.styles()? {
                    if let Some(material) = self.material_from_shading(shading_id)? {
                        return Ok(Some(material));
                    }
                }
                Ok(None)
            }
            "IFCSURFACESTYLESHADING" | "IFCSURFACESTYLERENDERING" => self.material_from_shading(style_id),
            _ => Ok(None),
        }
    }

    fn material_from_shading(&self, shading_id: InstanceId) -> AccessResult<Option<Material>> {
        let Some(instance) = self.store.by_id(shading_id) else { return Ok(None) };
        if !matches!(instance.type_name.as_str(), "IFCSURFACESTYLESHADING" | "IFCSURFACESTYLERENDERING") {
            return Ok(None);
        }
        let shading = IfcSurfaceStyleShading::new(self.store, shading_id);
        let colour_id = shading.surface_colour()?;
        let colour = IfcColourRgb::new(self.store, colour_id);
        let transparency_arg = shading.transparency()?;
        let alpha = if transparency_arg.is_null() {
            1.0
        } else {
            let mut lexer = self.store.lexer_mut();
            1.0 - transparency_arg.as_real(&mut lexer)? as f32
        };
        Ok(Some(Material {
            red: colour.red()? as f32,
            green: colour.green()? as f32,
            blue: colour.blue()? as f32,
            alpha,
        }))
    }
}
