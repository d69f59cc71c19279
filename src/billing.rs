use std::collections::BTreeMap;

use crate::types::{BillingConfig, BillingMode, BillingOverride, SheetLayout};

/// Billable fraction of one physical sheet, always within [0, 1]. Pure
/// function of the frozen layout and the caller's policy; never touches
/// placements.
pub fn billable_qty(
    layout: &SheetLayout,
    override_: Option<&BillingOverride>,
    config: &BillingConfig,
) -> f64 {
    if config.global_full_board {
        return 1.0;
    }
    match override_.map(|o| o.mode).unwrap_or_default() {
        BillingMode::Full => 1.0,
        BillingMode::Manual => {
            let pct = override_.map(|o| o.manual_pct).unwrap_or(0.0);
            pct.clamp(0.0, 100.0) / 100.0
        }
        BillingMode::Auto => {
            let step = config.granularity_pct.max(1) as f64;
            let pct = (layout.efficiency.clamp(0.0, 1.0) * 100.0 / step).ceil() * step;
            pct.clamp(config.floor_pct.min(100) as f64, 100.0) / 100.0
        }
    }
}

/// Billable quantity per sheet id across a finished run.
pub fn translate(sheets: &[SheetLayout], config: &BillingConfig) -> BTreeMap<String, f64> {
    sheets
        .iter()
        .map(|s| {
            (
                s.sheet_id.clone(),
                billable_qty(s, config.overrides.get(&s.sheet_id), config),
            )
        })
        .collect()
}
