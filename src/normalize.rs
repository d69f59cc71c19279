use crate::shelf::fits_stock;
use crate::types::{
    BandEdges, Diagnostic, Grain, LayoutError, PartSpec, Rect, StockSheetSpec,
};

/// A single part instance after qty expansion, inheriting everything else
/// from its parent spec.
#[derive(Debug, Clone)]
pub struct PartUnit {
    pub part_id: String,
    pub rect: Rect,
    pub grain: Grain,
    pub band_edges: BandEdges,
    pub material_id: String,
    pub label: Option<String>,
    pub laminate: bool,
    pub thickness_mm: Option<u32>,
}

impl PartUnit {
    fn from_spec(spec: &PartSpec) -> Self {
        Self {
            part_id: spec.id.clone(),
            rect: spec.rect,
            grain: spec.grain,
            band_edges: spec.band_edges,
            material_id: spec.material_id.clone(),
            label: spec.label.clone(),
            laminate: spec.laminate,
            thickness_mm: spec.thickness_mm,
        }
    }
}

/// Parts sharing a material, with that material's stock entries in
/// catalogue order. Groups are allocated independently and sheets are
/// never shared across them.
#[derive(Debug, Clone)]
pub struct MaterialGroup {
    pub material_id: String,
    pub units: Vec<PartUnit>,
    pub stock: Vec<StockSheetSpec>,
}

/// Canonical working set: validated stock catalogue and qty-expanded unit
/// parts, grouped by material in first-appearance order.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub groups: Vec<MaterialGroup>,
    /// Units that fit no stock sheet of their material in any allowed
    /// orientation. Reported, never silently dropped.
    pub rejected: Vec<PartUnit>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Validates and expands raw part/stock input. Pure transform; fails only
/// on dimension errors, everything else is reported per part.
pub fn normalize(
    parts: &[PartSpec],
    stock: &[StockSheetSpec],
    allow_rotation: bool,
) -> Result<Normalized, LayoutError> {
    for entry in stock {
        if entry.rect.length == 0 || entry.rect.width == 0 {
            return Err(LayoutError::InvalidDimension {
                entity: "stock",
                id: entry.id.clone(),
                detail: format!("length and width must be positive, got {}", entry.rect),
            });
        }
    }

    for part in parts {
        if part.rect.length == 0 || part.rect.width == 0 {
            return Err(LayoutError::InvalidDimension {
                entity: "part",
                id: part.id.clone(),
                detail: format!("length and width must be positive, got {}", part.rect),
            });
        }
        if part.qty == 0 {
            return Err(LayoutError::InvalidDimension {
                entity: "part",
                id: part.id.clone(),
                detail: "quantity must be positive".to_string(),
            });
        }
    }

    let mut groups: Vec<MaterialGroup> = Vec::new();
    let mut rejected = Vec::new();
    let mut diagnostics = Vec::new();

    for part in parts {
        let entries: Vec<&StockSheetSpec> = stock
            .iter()
            .filter(|s| s.material_id == part.material_id)
            .collect();

        let placeable = entries
            .iter()
            .any(|s| fits_stock(part.rect, part.grain, allow_rotation, &s.rect));

        if !placeable {
            let reason = if entries.is_empty() {
                format!("no stock configured for material '{}'", part.material_id)
            } else {
                format!(
                    "{} exceeds every stock sheet of material '{}' in all allowed orientations",
                    part.rect, part.material_id
                )
            };
            diagnostics.push(Diagnostic::UnplaceablePart {
                part_id: part.id.clone(),
                reason,
            });
            for _ in 0..part.qty {
                rejected.push(PartUnit::from_spec(part));
            }
            continue;
        }

        let idx = match groups.iter().position(|g| g.material_id == part.material_id) {
            Some(i) => i,
            None => {
                groups.push(MaterialGroup {
                    material_id: part.material_id.clone(),
                    units: Vec::new(),
                    stock: entries.iter().map(|s| (*s).clone()).collect(),
                });
                groups.len() - 1
            }
        };
        for _ in 0..part.qty {
            groups[idx].units.push(PartUnit::from_spec(part));
        }
    }

    Ok(Normalized {
        groups,
        rejected,
        diagnostics,
    })
}
