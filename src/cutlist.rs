use crate::types::{CutRecord, Rect, Sheet};

/// Flattens sheet placements into a numbered cut list, sheet by sheet in
/// placement order.
pub fn generate(sheets: &[Sheet]) -> Vec<CutRecord> {
    sheets
        .iter()
        .flat_map(|sheet| {
            let stock = Rect::new(sheet.width, sheet.length).to_string();
            sheet.panels.iter().map(move |p| (sheet.id, stock.clone(), p))
        })
        .enumerate()
        .map(|(i, (sheet_number, stock_dimensions, p))| CutRecord {
            cut_number: i + 1,
            sheet_number,
            stock_dimensions,
            cut: format!("{}{}", if p.rotated { "y=" } else { "x=" }, p.width),
            dimensions: p.rect().to_string(),
            rotated: p.rotated,
            x: p.x,
            y: p.y,
            label: p.label.clone(),
        })
        .collect()
}
