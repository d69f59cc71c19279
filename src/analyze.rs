use crate::types::SheetLayout;

/// Fills the per-sheet annotations once packing has frozen the layout.
/// Used area excludes kerf; cut length is the placement perimeter sum, an
/// upper bound on actual saw travel that is adequate for cost estimation.
pub fn annotate(layout: &mut SheetLayout) {
    layout.used_area_mm2 = layout.placements.iter().map(|p| p.area()).sum();
    let stock_area = layout.stock.area();
    layout.efficiency = if stock_area == 0 {
        0.0
    } else {
        layout.used_area_mm2 as f64 / stock_area as f64
    };
    layout.cut_length_mm = layout.placements.iter().map(|p| p.perimeter()).sum();
}
