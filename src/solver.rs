use std::collections::HashMap;

use crate::analyze;
use crate::banding;
use crate::billing;
use crate::normalize::{self, MaterialGroup, PartUnit};
use crate::shelf::{ShelfPacker, fits_stock};
use crate::types::{
    Diagnostic, LayoutError, LayoutOptions, LayoutResult, PartSpec, SheetLayout, StockSheetSpec,
};

/// One optimization run over an immutable input snapshot. Each material
/// group is allocated independently; sheets are never shared across
/// materials.
pub struct Solver {
    parts: Vec<PartSpec>,
    stock: Vec<StockSheetSpec>,
    options: LayoutOptions,
}

impl Solver {
    pub fn new(parts: Vec<PartSpec>, stock: Vec<StockSheetSpec>, options: LayoutOptions) -> Self {
        Self {
            parts,
            stock,
            options,
        }
    }

    pub fn solve(&self) -> Result<LayoutResult, LayoutError> {
        let normalized =
            normalize::normalize(&self.parts, &self.stock, self.options.allow_rotation)?;

        let mut sheets = Vec::new();
        let mut leftover = normalized.rejected;
        let mut diagnostics = normalized.diagnostics;

        for group in normalized.groups {
            let remaining = self.allocate_material(group, &mut sheets, &mut diagnostics);
            leftover.extend(remaining);
        }

        let unplaced = aggregate_unplaced(&self.parts, &leftover);
        let edge_banding = banding::aggregate(&sheets, &self.parts);
        let billing = billing::translate(&sheets, &self.options.billing);

        Ok(LayoutResult {
            sheets,
            unplaced,
            edge_banding,
            billing,
            diagnostics,
        })
    }

    /// Opens sheets from the group's stock entries in catalogue order until
    /// every unit is placed, supply runs out, or the single-sheet cap is
    /// hit. Returns the units left over.
    fn allocate_material(
        &self,
        group: MaterialGroup,
        sheets: &mut Vec<SheetLayout>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<PartUnit> {
        let mut remaining = group.units;
        // Descending area, longer side breaks ties; the sort is stable so
        // equal parts keep their input order and repeated runs reproduce
        // the exact same layout.
        remaining.sort_by(|a, b| {
            b.rect
                .area()
                .cmp(&a.rect.area())
                .then(b.rect.longer_side().cmp(&a.rect.longer_side()))
        });

        let mut ordinal = 0usize;
        'entries: for entry in &group.stock {
            let mut supply = entry.qty;
            let kerf = entry.kerf_mm.unwrap_or(self.options.kerf_mm);

            while !remaining.is_empty() && supply != Some(0) {
                let mut packer = ShelfPacker::new(entry.rect, kerf, self.options.allow_rotation);
                let mut overflow = Vec::new();
                for unit in remaining.drain(..) {
                    // Re-assert placeability against this entry so a unit
                    // that can never fit cannot open sheets forever.
                    if !fits_stock(unit.rect, unit.grain, self.options.allow_rotation, &entry.rect)
                        || !packer.try_place(&unit)
                    {
                        overflow.push(unit);
                    }
                }
                remaining = overflow;

                if packer.placements.is_empty() {
                    // Nothing left fits this entry size; let a later,
                    // larger catalogue entry take the remainder.
                    continue 'entries;
                }

                ordinal += 1;
                let mut layout = SheetLayout {
                    sheet_id: format!("{}-{}", group.material_id, ordinal),
                    stock: entry.rect,
                    material_id: group.material_id.clone(),
                    material_label: entry.label.clone(),
                    placements: std::mem::take(&mut packer.placements),
                    used_area_mm2: 0,
                    efficiency: 0.0,
                    cut_length_mm: 0,
                };
                analyze::annotate(&mut layout);
                tracing::debug!(
                    sheet = %layout.sheet_id,
                    placed = layout.placements.len(),
                    remaining = remaining.len(),
                    efficiency = layout.efficiency,
                    "sheet closed"
                );
                sheets.push(layout);

                if let Some(q) = supply {
                    supply = Some(q - 1);
                }
                if self.options.single_sheet_only {
                    break 'entries;
                }
            }

            if remaining.is_empty() {
                break;
            }
        }

        if !remaining.is_empty() && !self.options.single_sheet_only {
            tracing::debug!(
                material = %group.material_id,
                missing = remaining.len(),
                "stock exhausted"
            );
            diagnostics.push(Diagnostic::StockExhausted {
                material_id: group.material_id.clone(),
                missing_units: remaining.len() as u32,
            });
        }

        remaining
    }
}

/// Re-aggregates leftover units into part specs (qty = unit count), in the
/// original part order.
fn aggregate_unplaced(parts: &[PartSpec], leftover: &[PartUnit]) -> Vec<PartSpec> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for unit in leftover {
        *counts.entry(unit.part_id.as_str()).or_insert(0) += 1;
    }
    parts
        .iter()
        .filter_map(|p| {
            counts.get(p.id.as_str()).map(|&qty| {
                let mut spec = p.clone();
                spec.qty = qty;
                spec
            })
        })
        .collect()
}
