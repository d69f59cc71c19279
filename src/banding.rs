use std::collections::{BTreeMap, HashMap};

use crate::types::{BandingTotal, PartSpec, SheetLayout};

const LEGACY_SLOT_MM: u32 = 16;
const LEGACY_LAMINATED_SLOT_MM: u32 = 32;

/// Banding slot for a part. The explicit thickness is canonical; parts
/// without one fall back to the legacy fixed slots.
fn band_slot(part: &PartSpec) -> u32 {
    part.thickness_mm.unwrap_or(if part.laminate {
        LEGACY_LAMINATED_SLOT_MM
    } else {
        LEGACY_SLOT_MM
    })
}

/// Sums banding length per (material, thickness) over all placed parts.
/// Edge lengths come from the as-placed footprint: top/bottom edges
/// contribute `w`, left/right edges contribute `h`, so rotation swaps
/// which physical edge is long vs short.
pub fn aggregate(sheets: &[SheetLayout], parts: &[PartSpec]) -> Vec<BandingTotal> {
    let by_id: HashMap<&str, &PartSpec> = parts.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut totals: BTreeMap<(String, u32), u64> = BTreeMap::new();
    for sheet in sheets {
        for placement in &sheet.placements {
            let Some(part) = by_id.get(placement.part_id.as_str()) else {
                continue;
            };
            let edges = part.band_edges;
            if !edges.any() {
                continue;
            }
            let mut length = 0u64;
            if edges.top {
                length += placement.w as u64;
            }
            if edges.bottom {
                length += placement.w as u64;
            }
            if edges.left {
                length += placement.h as u64;
            }
            if edges.right {
                length += placement.h as u64;
            }
            *totals
                .entry((part.material_id.clone(), band_slot(part)))
                .or_insert(0) += length;
        }
    }

    totals
        .into_iter()
        .map(|((material_id, thickness_mm), length_mm)| BandingTotal {
            material_id,
            thickness_mm,
            length_mm,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BandEdges, Grain, Placement, Rect};

    fn part(id: &str, material: &str, edges: BandEdges) -> PartSpec {
        PartSpec {
            id: id.to_string(),
            rect: Rect::new(1000, 500),
            qty: 1,
            grain: Grain::Any,
            band_edges: edges,
            material_id: material.to_string(),
            label: None,
            laminate: false,
            thickness_mm: Some(18),
        }
    }

    fn placed(part_id: &str, w: u32, h: u32, rotated: bool) -> Placement {
        Placement {
            part_id: part_id.to_string(),
            x: 0,
            y: 0,
            w,
            h,
            rotated,
            grain: Grain::Any,
            original: Rect::new(1000, 500),
            label: None,
        }
    }

    fn sheet(placements: Vec<Placement>) -> SheetLayout {
        SheetLayout {
            sheet_id: "mdf-1".to_string(),
            stock: Rect::new(2750, 1830),
            material_id: "mdf".to_string(),
            material_label: None,
            placements,
            used_area_mm2: 0,
            efficiency: 0.0,
            cut_length_mm: 0,
        }
    }

    #[test]
    fn test_unbanded_parts_produce_nothing() {
        let parts = vec![part("a", "mdf", BandEdges::none())];
        let sheets = vec![sheet(vec![placed("a", 500, 1000, false)])];
        assert!(aggregate(&sheets, &parts).is_empty());
    }

    #[test]
    fn test_all_edges_sum_to_perimeter() {
        let parts = vec![part("a", "mdf", BandEdges::all())];
        let sheets = vec![sheet(vec![placed("a", 500, 1000, false)])];
        let totals = aggregate(&sheets, &parts);
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].material_id, "mdf");
        assert_eq!(totals[0].thickness_mm, 18);
        assert_eq!(totals[0].length_mm, 3000);
    }

    #[test]
    fn test_rotation_swaps_edge_lengths() {
        let edges = BandEdges {
            top: true,
            ..BandEdges::none()
        };
        let parts = vec![part("a", "mdf", edges)];
        // Upright: the top edge runs across the 500mm width.
        let upright = aggregate(&[sheet(vec![placed("a", 500, 1000, false)])], &parts);
        assert_eq!(upright[0].length_mm, 500);
        // Rotated: the top edge now runs across the 1000mm side.
        let rotated = aggregate(&[sheet(vec![placed("a", 1000, 500, true)])], &parts);
        assert_eq!(rotated[0].length_mm, 1000);
    }

    #[test]
    fn test_totals_keyed_by_material_and_thickness() {
        let mut thin = part("a", "mdf", BandEdges::all());
        thin.thickness_mm = Some(16);
        let mut thick = part("b", "mdf", BandEdges::all());
        thick.thickness_mm = Some(25);
        let mut oak = part("c", "oak", BandEdges::all());
        oak.thickness_mm = Some(16);

        let sheets = vec![sheet(vec![
            placed("a", 500, 1000, false),
            placed("b", 500, 1000, false),
            placed("c", 500, 1000, false),
        ])];
        let totals = aggregate(&sheets, &[thin, thick, oak]);
        let keys: Vec<(&str, u32)> = totals
            .iter()
            .map(|t| (t.material_id.as_str(), t.thickness_mm))
            .collect();
        assert_eq!(keys, vec![("mdf", 16), ("mdf", 25), ("oak", 16)]);
    }

    #[test]
    fn test_legacy_slots_when_thickness_missing() {
        let mut plain = part("a", "mdf", BandEdges::all());
        plain.thickness_mm = None;
        let mut laminated = part("b", "mdf", BandEdges::all());
        laminated.thickness_mm = None;
        laminated.laminate = true;

        let sheets = vec![sheet(vec![
            placed("a", 500, 1000, false),
            placed("b", 500, 1000, false),
        ])];
        let totals = aggregate(&sheets, &[plain, laminated]);
        let slots: Vec<u32> = totals.iter().map(|t| t.thickness_mm).collect();
        assert_eq!(slots, vec![16, 32]);
    }

    #[test]
    fn test_units_accumulate() {
        let parts = vec![part("a", "mdf", BandEdges::all())];
        let sheets = vec![sheet(vec![
            placed("a", 500, 1000, false),
            placed("a", 500, 1000, false),
        ])];
        assert_eq!(aggregate(&sheets, &parts)[0].length_mm, 6000);
    }
}
