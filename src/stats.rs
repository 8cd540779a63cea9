use crate::types::{Rect, Sheet, Statistics};

fn percent(part: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}

/// Aggregates the final sheet set. `total_panels` is the requested count,
/// so it still includes panels that could not be placed.
pub fn compute(sheets: &[Sheet], stock: Rect, total_panels: u64) -> Statistics {
    let total_area = stock.area().saturating_mul(sheets.len() as u64);
    let total_used_area = sheets.iter().fold(0u64, |acc, s| acc.saturating_add(s.used_area));
    let total_wasted_area = sheets
        .iter()
        .fold(0u64, |acc, s| acc.saturating_add(s.wasted_area));
    let placed = sheets.iter().flat_map(|s| &s.panels);

    Statistics {
        used_stock_sheets: sheets.len(),
        stock_dimensions: stock.to_string(),
        total_used_area,
        total_wasted_area,
        waste_percentage: percent(total_wasted_area, total_area),
        efficiency: percent(total_used_area, total_area),
        total_cuts: placed.clone().count(),
        total_cut_length: placed.map(|p| p.rect().perimeter()).sum(),
        total_panels,
        wasted_panels: sheets.iter().filter(|s| s.panels.is_empty()).count(),
    }
}
