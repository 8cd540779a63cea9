use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::OptimizerConfig;

/// Accepts a JSON number only when it is a whole, non-negative number of
/// millimetres. Fractional values are rejected rather than rounded, so the
/// geometry the optimizer packs is exactly the geometry that was requested.
pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(D::Error::custom("expected a finite number"));
    }
    if value < 0.0 {
        return Err(D::Error::custom(format!(
            "expected a non-negative number, got {value}"
        )));
    }
    if value.fract() != 0.0 {
        return Err(D::Error::custom(format!(
            "expected whole millimetres, got {value}"
        )));
    }
    if value > u32::MAX as f64 {
        return Err(D::Error::custom(format!("number {value} is out of range")));
    }
    Ok(value as u32)
}

/// Width runs across the roll, length runs along it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub width: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub length: u32,
}

impl Rect {
    pub fn new(width: u32, length: u32) -> Self {
        Self { width, length }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.length as u64
    }

    pub fn longest_side(&self) -> u32 {
        self.width.max(self.length)
    }

    pub fn is_square(&self) -> bool {
        self.width == self.length
    }

    pub fn rotated(&self) -> Self {
        Self {
            width: self.length,
            length: self.width,
        }
    }

    /// Footprint including blade clearance on the trailing edges, or `None`
    /// when it cannot be represented (and so cannot fit any stock).
    pub fn with_kerf(&self, kerf: u32) -> Option<Self> {
        Some(Self {
            width: self.width.checked_add(kerf)?,
            length: self.length.checked_add(kerf)?,
        })
    }

    pub fn fits_in(&self, other: &Rect) -> bool {
        self.width <= other.width && self.length <= other.length
    }

    pub fn perimeter(&self) -> u64 {
        2 * (self.width as u64 + self.length as u64)
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.length)
    }
}

/// One line of an order's cut requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelRequest {
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub width: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub length: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl PanelRequest {
    pub fn new(width: u32, length: u32, quantity: u32) -> Self {
        Self {
            width,
            length,
            quantity,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.width, self.length)
    }

    pub fn display_label(&self) -> String {
        match &self.label {
            Some(label) if !label.is_empty() => label.clone(),
            _ => format!("{}×{}", self.width, self.length),
        }
    }
}

/// A single physical panel expanded from a [`PanelRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelInstance {
    pub id: String,
    pub source_index: usize,
    pub instance_index: u32,
    pub rect: Rect,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedPanel {
    pub id: String,
    pub label: String,
    pub x: u32,
    pub y: u32,
    /// Placed dimensions, already swapped when `rotated`.
    pub width: u32,
    pub length: u32,
    pub rotated: bool,
}

impl PlacedPanel {
    pub fn rect(&self) -> Rect {
        Rect::new(self.width, self.length)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub id: usize,
    pub width: u32,
    pub length: u32,
    pub panels: Vec<PlacedPanel>,
    pub used_area: u64,
    pub wasted_area: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub used_stock_sheets: usize,
    pub stock_dimensions: String,
    pub total_used_area: u64,
    pub total_wasted_area: u64,
    pub waste_percentage: u32,
    pub efficiency: u32,
    pub total_cuts: usize,
    pub total_cut_length: u64,
    pub total_panels: u64,
    pub wasted_panels: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CutRecord {
    pub cut_number: usize,
    pub sheet_number: usize,
    pub stock_dimensions: String,
    /// `x=<width>` for a panel cut as requested, `y=<width>` when rotated.
    pub cut: String,
    pub dimensions: String,
    pub rotated: bool,
    pub x: u32,
    pub y: u32,
    pub label: String,
}

/// A panel that does not fit an empty stock sheet in either orientation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedPanel {
    pub id: String,
    pub label: String,
    pub width: u32,
    pub length: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub sheets: Vec<Sheet>,
    pub statistics: Statistics,
    pub cuts: Vec<CutRecord>,
    pub dropped: Vec<DroppedPanel>,
}

impl OptimizationResult {
    pub fn placed_count(&self) -> usize {
        self.sheets.iter().map(|s| s.panels.len()).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.dropped.is_empty()
    }
}

/// Envelope used by the CLI input file and the HTTP body.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OptimizeRequest {
    #[serde(default)]
    pub config: OptimizerConfig,
    pub panels: Vec<PanelRequest>,
}
