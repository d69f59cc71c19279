use crate::normalize::PartUnit;
use crate::types::{Grain, Placement, Rect};

/// One candidate footprint on the sheet: `w` across the sheet width, `h`
/// along the sheet length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    pub w: u32,
    pub h: u32,
    pub rotated: bool,
}

/// Orientations a part may take. Grain locks pin one axis; `Any` parts may
/// also rotate when the run allows it. Squares never rotate.
pub fn allowed_footprints(rect: Rect, grain: Grain, allow_rotation: bool) -> Vec<Footprint> {
    let upright = Footprint {
        w: rect.width,
        h: rect.length,
        rotated: false,
    };
    let turned = Footprint {
        w: rect.length,
        h: rect.width,
        rotated: true,
    };
    match grain {
        Grain::Length => vec![upright],
        Grain::Width => vec![turned],
        Grain::Any => {
            if allow_rotation && rect.length != rect.width {
                vec![upright, turned]
            } else {
                vec![upright]
            }
        }
    }
}

/// Whether the part fits an empty sheet of this stock in any allowed
/// orientation.
pub fn fits_stock(rect: Rect, grain: Grain, allow_rotation: bool, stock: &Rect) -> bool {
    allowed_footprints(rect, grain, allow_rotation)
        .iter()
        .any(|fp| fp.w <= stock.width && fp.h <= stock.length)
}

/// A horizontal strip across the sheet width. Its height is fixed by the
/// first part placed on it; `fill_x` is the next free offset.
#[derive(Debug, Clone, Copy)]
struct Shelf {
    y: u32,
    height: u32,
    fill_x: u32,
}

/// Packs parts onto exactly one sheet. Owned and mutated only for the
/// duration of that sheet's packing, then read out and dropped.
#[derive(Debug, Clone)]
pub struct ShelfPacker {
    stock: Rect,
    kerf: u32,
    allow_rotation: bool,
    shelves: Vec<Shelf>,
    pub placements: Vec<Placement>,
}

impl ShelfPacker {
    pub fn new(stock: Rect, kerf: u32, allow_rotation: bool) -> Self {
        Self {
            stock,
            kerf,
            allow_rotation,
            shelves: Vec::new(),
            placements: Vec::new(),
        }
    }

    pub fn used_area(&self) -> u64 {
        self.placements.iter().map(|p| p.area()).sum()
    }

    /// y offset where the next shelf would open. Shelves are only ever
    /// appended, so the last one is the bottom-most.
    fn next_shelf_y(&self) -> u32 {
        match self.shelves.last() {
            None => 0,
            Some(s) => s.y + s.height + self.kerf,
        }
    }

    /// Greedy single placement: an existing shelf with the least wasted
    /// height wins; otherwise a new shelf opens at the next y offset with
    /// the shortest feasible height. Returns false on overflow, which is
    /// ordinary: the part simply waits for the next sheet.
    pub fn try_place(&mut self, unit: &PartUnit) -> bool {
        let footprints = allowed_footprints(unit.rect, unit.grain, self.allow_rotation);

        // Orientations are tried in declaration order, so on equal waste
        // the upright fit is kept.
        let mut best: Option<(usize, Footprint)> = None;
        for fp in &footprints {
            for (idx, shelf) in self.shelves.iter().enumerate() {
                if fp.h <= shelf.height && shelf.fill_x + fp.w <= self.stock.width {
                    let waste = shelf.height - fp.h;
                    let better = match best {
                        None => true,
                        Some((bi, bfp)) => waste < self.shelves[bi].height - bfp.h,
                    };
                    if better {
                        best = Some((idx, *fp));
                    }
                }
            }
        }

        if let Some((idx, fp)) = best {
            let shelf = &mut self.shelves[idx];
            let placement = placement_for(unit, shelf.fill_x, shelf.y, fp);
            shelf.fill_x += fp.w + self.kerf;
            self.placements.push(placement);
            return true;
        }

        let next_y = self.next_shelf_y();
        let mut best_new: Option<Footprint> = None;
        for fp in &footprints {
            if fp.w <= self.stock.width && next_y + fp.h <= self.stock.length {
                let better = match best_new {
                    None => true,
                    Some(b) => fp.h < b.h,
                };
                if better {
                    best_new = Some(*fp);
                }
            }
        }
        if let Some(fp) = best_new {
            self.placements.push(placement_for(unit, 0, next_y, fp));
            self.shelves.push(Shelf {
                y: next_y,
                height: fp.h,
                fill_x: fp.w + self.kerf,
            });
            return true;
        }

        false
    }
}

fn placement_for(unit: &PartUnit, x: u32, y: u32, fp: Footprint) -> Placement {
    Placement {
        part_id: unit.part_id.clone(),
        x,
        y,
        w: fp.w,
        h: fp.h,
        rotated: fp.rotated,
        grain: unit.grain,
        original: unit.rect,
        label: unit.label.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BandEdges;

    fn unit(id: &str, length: u32, width: u32, grain: Grain) -> PartUnit {
        PartUnit {
            part_id: id.to_string(),
            rect: Rect::new(length, width),
            grain,
            band_edges: BandEdges::none(),
            material_id: "mdf".to_string(),
            label: None,
            laminate: false,
            thickness_mm: None,
        }
    }

    #[test]
    fn test_place_single_part() {
        let mut packer = ShelfPacker::new(Rect::new(1000, 1000), 0, true);
        assert!(packer.try_place(&unit("a", 300, 500, Grain::Any)));
        let p = &packer.placements[0];
        assert_eq!((p.x, p.y), (0, 0));
        assert_eq!((p.w, p.h), (500, 300));
        assert!(!p.rotated);
    }

    #[test]
    fn test_part_too_large() {
        let mut packer = ShelfPacker::new(Rect::new(1000, 1000), 0, true);
        assert!(!packer.try_place(&unit("a", 2000, 500, Grain::Any)));
        assert!(packer.placements.is_empty());
    }

    #[test]
    fn test_rotation_fit() {
        // Upright the part is wider than the sheet; turned it fits.
        let mut packer = ShelfPacker::new(Rect::new(1000, 500), 0, true);
        assert!(packer.try_place(&unit("a", 400, 800, Grain::Any)));
        let p = &packer.placements[0];
        assert!(p.rotated);
        assert_eq!((p.w, p.h), (400, 800));
    }

    #[test]
    fn test_rotation_disabled() {
        let mut packer = ShelfPacker::new(Rect::new(1000, 500), 0, false);
        assert!(!packer.try_place(&unit("a", 400, 800, Grain::Any)));
    }

    #[test]
    fn test_grain_lock_blocks_rotation() {
        // Same geometry as test_rotation_fit, but the grain pins length to
        // the length axis so the turned footprint is forbidden.
        let mut packer = ShelfPacker::new(Rect::new(1000, 500), 0, true);
        assert!(!packer.try_place(&unit("a", 400, 800, Grain::Length)));
    }

    #[test]
    fn test_grain_width_forces_turned_footprint() {
        let mut packer = ShelfPacker::new(Rect::new(1000, 1000), 0, false);
        assert!(packer.try_place(&unit("a", 300, 500, Grain::Width)));
        let p = &packer.placements[0];
        assert!(p.rotated);
        assert_eq!((p.w, p.h), (300, 500));
    }

    #[test]
    fn test_kerf_between_parts_on_shelf() {
        let mut packer = ShelfPacker::new(Rect::new(1000, 1000), 5, false);
        for i in 0..3 {
            assert!(packer.try_place(&unit(&format!("p{i}"), 1000, 300, Grain::Length)));
        }
        let xs: Vec<u32> = packer.placements.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0, 305, 610]);
        // Fill offset is at 915; another 300-wide part would end at 1215.
        assert!(!packer.try_place(&unit("p3", 1000, 300, Grain::Length)));
    }

    #[test]
    fn test_kerf_between_shelves() {
        let mut packer = ShelfPacker::new(Rect::new(1000, 1000), 7, false);
        assert!(packer.try_place(&unit("a", 400, 1000, Grain::Length)));
        assert!(packer.try_place(&unit("b", 400, 1000, Grain::Length)));
        assert_eq!(packer.placements[0].y, 0);
        assert_eq!(packer.placements[1].y, 407);
    }

    #[test]
    fn test_no_kerf_at_perimeter() {
        // An exact-size part fills the sheet even with a kerf configured.
        let mut packer = ShelfPacker::new(Rect::new(1000, 1000), 5, false);
        assert!(packer.try_place(&unit("a", 1000, 1000, Grain::Length)));
        assert_eq!(packer.used_area(), 1_000_000);
    }

    #[test]
    fn test_least_wasted_height_shelf_wins() {
        let mut packer = ShelfPacker::new(Rect::new(2000, 1000), 0, false);
        // A 600-high shelf, then a 300-high one (600 wide each, so the
        // second part cannot share the first shelf).
        assert!(packer.try_place(&unit("tall", 600, 600, Grain::Length)));
        assert!(packer.try_place(&unit("short", 300, 600, Grain::Length)));
        assert_eq!(packer.placements[1].y, 600);
        // Both shelves have room; the 280-high part wastes 20 on the short
        // shelf vs 320 on the tall one.
        assert!(packer.try_place(&unit("pick", 280, 300, Grain::Length)));
        let p = &packer.placements[2];
        assert_eq!((p.x, p.y), (600, 600));
    }

    #[test]
    fn test_overflow_when_length_spent() {
        let mut packer = ShelfPacker::new(Rect::new(1000, 1000), 0, false);
        assert!(packer.try_place(&unit("a", 700, 1000, Grain::Length)));
        // Remaining length is 300; a 400-long part overflows to the next
        // sheet rather than erroring.
        assert!(!packer.try_place(&unit("b", 400, 1000, Grain::Length)));
        assert_eq!(packer.placements.len(), 1);
    }

    #[test]
    fn test_fits_stock_orientation_aware() {
        let stock = Rect::new(1000, 500);
        assert!(fits_stock(Rect::new(400, 800), Grain::Any, true, &stock));
        assert!(!fits_stock(Rect::new(400, 800), Grain::Any, false, &stock));
        assert!(!fits_stock(Rect::new(400, 800), Grain::Length, true, &stock));
        assert!(fits_stock(Rect::new(400, 800), Grain::Width, false, &stock));
    }
}
