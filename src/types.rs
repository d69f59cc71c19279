use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Axis-aligned rectangle in whole millimetres, length x width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub length: u32,
    pub width: u32,
}

impl Rect {
    pub fn new(length: u32, width: u32) -> Self {
        Self { length, width }
    }

    pub fn area(&self) -> u64 {
        self.length as u64 * self.width as u64
    }

    pub fn rotated(&self) -> Self {
        Self {
            length: self.width,
            width: self.length,
        }
    }

    pub fn fits_in(&self, other: &Rect) -> bool {
        self.length <= other.length && self.width <= other.width
    }

    pub fn longer_side(&self) -> u32 {
        self.length.max(self.width)
    }

    pub fn shorter_side(&self) -> u32 {
        self.length.min(self.width)
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.length, self.width)
    }
}

/// Grain lock for a part. `Length` pins the part's length to the sheet's
/// length axis, `Width` to the width axis, `Any` leaves orientation free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grain {
    Length,
    Width,
    #[default]
    Any,
}

impl std::fmt::Display for Grain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Grain::Length => write!(f, "length"),
            Grain::Width => write!(f, "width"),
            Grain::Any => write!(f, "any"),
        }
    }
}

/// Which edges of a placed part receive banding. Edges are named in the
/// layout frame: top/bottom run across the placement's width, left/right
/// along its height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BandEdges {
    #[serde(default)]
    pub top: bool,
    #[serde(default)]
    pub right: bool,
    #[serde(default)]
    pub bottom: bool,
    #[serde(default)]
    pub left: bool,
}

impl BandEdges {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            top: true,
            right: true,
            bottom: true,
            left: true,
        }
    }

    pub fn any(&self) -> bool {
        self.top || self.right || self.bottom || self.left
    }
}

/// One requested cut, possibly with qty > 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartSpec {
    pub id: String,
    pub rect: Rect,
    #[serde(default = "default_qty", deserialize_with = "deserialize_u32_from_number")]
    pub qty: u32,
    #[serde(default)]
    pub grain: Grain,
    #[serde(default)]
    pub band_edges: BandEdges,
    pub material_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub laminate: bool,
    /// Board thickness, used as the banding slot. Parts without it fall
    /// back to the legacy fixed slots (16mm, 32mm laminated).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness_mm: Option<u32>,
}

fn default_qty() -> u32 {
    1
}

/// A stock catalogue entry. `qty: None` means unlimited supply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockSheetSpec {
    pub id: String,
    pub material_id: String,
    pub rect: Rect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<u32>,
    /// Overrides the run-level kerf for sheets cut from this entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kerf_mm: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// One part unit fitted onto a sheet. `x` runs across the sheet width,
/// `y` along the sheet length; `w`/`h` are the post-rotation footprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub part_id: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub rotated: bool,
    pub grain: Grain,
    /// Pre-rotation dimensions, for display.
    pub original: Rect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Placement {
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    pub fn perimeter(&self) -> u64 {
        2 * (self.w as u64 + self.h as u64)
    }
}

/// One physical sheet with its placements, frozen once packing returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetLayout {
    pub sheet_id: String,
    pub stock: Rect,
    pub material_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_label: Option<String>,
    pub placements: Vec<Placement>,
    pub used_area_mm2: u64,
    pub efficiency: f64,
    pub cut_length_mm: u64,
}

impl SheetLayout {
    pub fn stock_area(&self) -> u64 {
        self.stock.area()
    }

    pub fn waste_percent(&self) -> f64 {
        (1.0 - self.efficiency) * 100.0
    }
}

/// Aggregated banding demand for one material/thickness slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandingTotal {
    pub material_id: String,
    pub thickness_mm: u32,
    pub length_mm: u64,
}

/// Non-fatal per-run reports. The engine packs what it can and surfaces
/// the rest here rather than aborting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    UnplaceablePart { part_id: String, reason: String },
    StockExhausted { material_id: String, missing_units: u32 },
}

/// Aggregate output of one optimization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutResult {
    pub sheets: Vec<SheetLayout>,
    pub unplaced: Vec<PartSpec>,
    pub edge_banding: Vec<BandingTotal>,
    /// Billable sheet quantity per sheet id, each within [0, 1].
    pub billing: BTreeMap<String, f64>,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl LayoutResult {
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_complete(&self) -> bool {
        self.unplaced.is_empty()
    }

    pub fn total_waste_percent(&self) -> f64 {
        let total_stock_area: u64 = self.sheets.iter().map(|s| s.stock_area()).sum();
        let total_used: u64 = self.sheets.iter().map(|s| s.used_area_mm2).sum();
        if total_stock_area == 0 {
            return 0.0;
        }
        (total_stock_area - total_used) as f64 / total_stock_area as f64 * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingMode {
    #[default]
    Auto,
    Full,
    Manual,
}

/// Per-sheet billing policy, keyed by sheet id in `BillingConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BillingOverride {
    #[serde(default)]
    pub mode: BillingMode,
    /// Meaningful only in `manual` mode, as a percentage 0-100.
    #[serde(default)]
    pub manual_pct: f64,
}

impl Default for BillingOverride {
    fn default() -> Self {
        Self {
            mode: BillingMode::Auto,
            manual_pct: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    /// Bills every sheet as fully consumed regardless of utilization.
    pub global_full_board: bool,
    /// Auto-mode efficiency is rounded up to this percentage step.
    pub granularity_pct: u32,
    /// Auto-mode lower bound, so near-empty sheets are not under-billed.
    pub floor_pct: u32,
    pub overrides: BTreeMap<String, BillingOverride>,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            global_full_board: false,
            granularity_pct: 5,
            floor_pct: 10,
            overrides: BTreeMap::new(),
        }
    }
}

/// Run-level options, one immutable snapshot per invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    pub kerf_mm: u32,
    pub allow_rotation: bool,
    pub single_sheet_only: bool,
    pub billing: BillingConfig,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            kerf_mm: 0,
            allow_rotation: true,
            single_sheet_only: false,
            billing: BillingConfig::default(),
        }
    }
}

/// Hard validation failure. Everything else the engine reports in-band
/// via `Diagnostic`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    InvalidDimension {
        entity: &'static str,
        id: String,
        detail: String,
    },
}

impl std::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutError::InvalidDimension { entity, id, detail } => {
                write!(f, "invalid dimension on {} '{}': {}", entity, id, detail)
            }
        }
    }
}

impl std::error::Error for LayoutError {}

/// Accepts JSON numbers like `3` or `3.0` for integral millimetre fields.
pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(serde::de::Error::custom(format!(
            "expected a non-negative integer, got {value}"
        )));
    }
    Ok(value as u32)
}
