use std::cmp::Ordering;

use crate::config::{OptimizationPriority, OptimizerConfig};
use crate::cutlist;
use crate::error::{OptimizerError, Result};
use crate::guillotine::GuillotineSheet;
use crate::stats;
use crate::types::{DroppedPanel, OptimizationResult, PanelInstance, PanelRequest};

/// Packs blind panels onto fixed-size stock rolls.
///
/// Holds only immutable configuration: every call to [`Optimizer::optimize`]
/// works on its own sheet list, so one optimizer can be shared between threads.
#[derive(Debug, Clone)]
pub struct Optimizer {
    config: OptimizerConfig,
}

impl Optimizer {
    pub fn new(config: OptimizerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn optimize(&self, panels: &[PanelRequest]) -> Result<OptimizationResult> {
        validate_panels(panels)?;

        let mut pieces = expand_panels(panels);
        sort_pieces(&mut pieces, self.config.optimization_priority);

        let (bins, dropped) = self.pack(&pieces);

        let sheets: Vec<_> = bins
            .into_iter()
            .enumerate()
            .map(|(i, bin)| bin.into_sheet(i + 1))
            .collect();
        let total_panels = panels.iter().map(|p| p.quantity as u64).sum();
        let statistics = stats::compute(&sheets, self.config.stock(), total_panels);
        let cuts = cutlist::generate(&sheets);

        tracing::debug!(
            sheets = statistics.used_stock_sheets,
            placed = statistics.total_cuts,
            dropped = dropped.len(),
            efficiency = statistics.efficiency,
            "optimization finished"
        );

        Ok(OptimizationResult {
            sheets,
            statistics,
            cuts,
            dropped,
        })
    }

    fn pack(&self, pieces: &[PanelInstance]) -> (Vec<GuillotineSheet>, Vec<DroppedPanel>) {
        let stock = self.config.stock();
        let kerf = self.config.kerf_thickness;
        let mut bins: Vec<GuillotineSheet> = Vec::new();
        let mut dropped = Vec::new();

        for piece in pieces {
            if bins.iter_mut().any(|bin| bin.try_place(piece).is_some()) {
                continue;
            }

            // Open a new sheet, but only keep it if the piece actually fits.
            let mut bin = GuillotineSheet::new(stock, kerf);
            if bin.try_place(piece).is_some() {
                tracing::debug!(sheet = bins.len() + 1, panel = %piece.id, "opened new stock sheet");
                bins.push(bin);
            } else {
                tracing::warn!(
                    panel = %piece.id,
                    label = %piece.label,
                    size = %piece.rect,
                    stock = %stock,
                    kerf,
                    "panel does not fit stock in either orientation, skipping"
                );
                dropped.push(DroppedPanel {
                    id: piece.id.clone(),
                    label: piece.label.clone(),
                    width: piece.rect.width,
                    length: piece.rect.length,
                });
            }
        }

        (bins, dropped)
    }
}

fn validate_panels(panels: &[PanelRequest]) -> Result<()> {
    for (index, panel) in panels.iter().enumerate() {
        let reason = if panel.width == 0 || panel.length == 0 {
            format!("dimensions must be non-zero, got {}", panel.rect())
        } else if panel.quantity == 0 {
            "quantity must be at least 1".to_string()
        } else {
            continue;
        };
        return Err(OptimizerError::InvalidPanel { index, reason });
    }
    Ok(())
}

/// Flattens requests into one instance per physical panel, in request order.
pub fn expand_panels(panels: &[PanelRequest]) -> Vec<PanelInstance> {
    let mut pieces = Vec::new();
    for (source_index, request) in panels.iter().enumerate() {
        let label = request.display_label();
        for instance_index in 0..request.quantity {
            pieces.push(PanelInstance {
                id: format!("{source_index}-{instance_index}"),
                source_index,
                instance_index,
                rect: request.rect(),
                label: label.clone(),
            });
        }
    }
    pieces
}

/// Orders pieces for packing. The sort is stable, so input order is the
/// final tie-break.
pub fn sort_pieces(pieces: &mut [PanelInstance], priority: OptimizationPriority) {
    match priority {
        OptimizationPriority::LargestAreaFirst => pieces.sort_by(largest_area_first),
    }
}

fn largest_area_first(a: &PanelInstance, b: &PanelInstance) -> Ordering {
    b.rect
        .area()
        .cmp(&a.rect.area())
        .then_with(|| b.rect.longest_side().cmp(&a.rect.longest_side()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PlacedPanel, Rect};

    fn optimizer(width: u32, length: u32, kerf: u32) -> Optimizer {
        Optimizer::new(OptimizerConfig {
            stock_width: width,
            stock_length: length,
            kerf_thickness: kerf,
            ..OptimizerConfig::default()
        })
        .unwrap()
    }

    /// Validates a complete result:
    /// 1. Every placement lies within the stock
    /// 2. No two kerf-inclusive footprints on the same sheet overlap
    /// 3. Areas are conserved per sheet
    /// 4. Placed plus dropped panels account for every requested panel
    fn assert_result_valid(result: &OptimizationResult, kerf: u32, requested: u64) {
        for sheet in &result.sheets {
            assert_eq!(
                sheet.used_area + sheet.wasted_area,
                sheet.width as u64 * sheet.length as u64,
                "sheet {} does not conserve area",
                sheet.id
            );
            let used: u64 = sheet.panels.iter().map(|p| p.rect().area()).sum();
            assert_eq!(used, sheet.used_area);
            assert!(!sheet.panels.is_empty(), "sheet {} is empty", sheet.id);

            for (pi, p) in sheet.panels.iter().enumerate() {
                assert!(
                    p.x + p.width <= sheet.width,
                    "sheet {}, panel {pi} ({}) exceeds stock width",
                    sheet.id,
                    p.rect()
                );
                assert!(
                    p.y + p.length <= sheet.length,
                    "sheet {}, panel {pi} ({}) exceeds stock length",
                    sheet.id,
                    p.rect()
                );
            }
            assert_no_overlaps(sheet.id, &sheet.panels, kerf);
        }

        assert_eq!(
            result.placed_count() as u64 + result.dropped.len() as u64,
            requested
        );
        assert_eq!(result.statistics.total_panels, requested);
    }

    fn assert_no_overlaps(sheet_id: usize, panels: &[PlacedPanel], kerf: u32) {
        for i in 0..panels.len() {
            for j in (i + 1)..panels.len() {
                let a = &panels[i];
                let b = &panels[j];
                let fa = a.rect().with_kerf(kerf).unwrap();
                let fb = b.rect().with_kerf(kerf).unwrap();

                let overlaps = a.x < b.x + fb.width
                    && b.x < a.x + fa.width
                    && a.y < b.y + fb.length
                    && b.y < a.y + fa.length;

                assert!(
                    !overlaps,
                    "sheet {sheet_id}: panel {i} ({} @ ({},{})) overlaps panel {j} ({} @ ({},{}))",
                    a.rect(),
                    a.x,
                    a.y,
                    b.rect(),
                    b.x,
                    b.y
                );
            }
        }
    }

    #[test]
    fn test_expand_ids_and_labels() {
        let pieces = expand_panels(&[
            PanelRequest::new(100, 200, 2).with_label("Lounge"),
            PanelRequest::new(300, 400, 1),
        ]);
        let ids: Vec<_> = pieces.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["0-0", "0-1", "1-0"]);
        assert_eq!(pieces[0].label, "Lounge");
        assert_eq!(pieces[2].label, "300×400");
        assert_eq!(pieces[1].source_index, 0);
        assert_eq!(pieces[1].instance_index, 1);
    }

    #[test]
    fn test_sort_order_with_equal_area() {
        let mut pieces = expand_panels(&[
            PanelRequest::new(200, 100, 1),
            PanelRequest::new(100, 200, 1),
            PanelRequest::new(150, 150, 1),
        ]);
        sort_pieces(&mut pieces, OptimizationPriority::LargestAreaFirst);
        let order: Vec<_> = pieces.iter().map(|p| p.rect).collect();
        assert_eq!(
            order,
            [
                Rect::new(150, 150),
                Rect::new(200, 100),
                Rect::new(100, 200)
            ]
        );
    }

    #[test]
    fn test_sort_breaks_area_ties_by_longest_side() {
        let mut pieces = expand_panels(&[
            PanelRequest::new(200, 200, 1),
            PanelRequest::new(100, 400, 1),
            PanelRequest::new(50, 800, 1),
        ]);
        sort_pieces(&mut pieces, OptimizationPriority::LargestAreaFirst);
        let ids: Vec<_> = pieces.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["2-0", "1-0", "0-0"]);
    }

    #[test]
    fn test_single_panel_fits_trivially() {
        let result = optimizer(3000, 10000, 0)
            .optimize(&[PanelRequest::new(1000, 2000, 1)])
            .unwrap();
        assert_result_valid(&result, 0, 1);
        assert_eq!(result.sheets.len(), 1);
        let sheet = &result.sheets[0];
        assert_eq!(sheet.panels.len(), 1);
        let p = &sheet.panels[0];
        assert_eq!((p.x, p.y), (0, 0));
        assert!(!p.rotated);
        assert_eq!(sheet.used_area, 2_000_000);
        assert_eq!(sheet.wasted_area, 28_000_000);
        assert_eq!(result.statistics.efficiency, 7);
        assert_eq!(result.statistics.waste_percentage, 93);
    }

    #[test]
    fn test_panel_requires_rotation() {
        let result = optimizer(3000, 10000, 0)
            .optimize(&[PanelRequest::new(3500, 1000, 1)])
            .unwrap();
        assert_result_valid(&result, 0, 1);
        let p = &result.sheets[0].panels[0];
        assert!(p.rotated);
        assert_eq!(p.width, 1000);
        assert_eq!(p.length, 3500);
        assert_eq!(result.cuts[0].cut, "y=1000");
    }

    #[test]
    fn test_unplaceable_panel_dropped() {
        let result = optimizer(3000, 10000, 0)
            .optimize(&[PanelRequest::new(3500, 11000, 1).with_label("Patio")])
            .unwrap();
        assert_result_valid(&result, 0, 1);
        assert!(result.sheets.is_empty());
        assert!(result.cuts.is_empty());
        assert!(!result.is_complete());
        assert_eq!(result.dropped.len(), 1);
        assert_eq!(result.dropped[0].id, "0-0");
        assert_eq!(result.dropped[0].label, "Patio");
        assert_eq!(result.statistics.total_panels, 1);
        assert_eq!(result.statistics.used_stock_sheets, 0);
        assert_eq!(result.statistics.efficiency, 0);
    }

    #[test]
    fn test_unplaceable_panel_does_not_disturb_others() {
        let result = optimizer(3000, 10000, 0)
            .optimize(&[
                PanelRequest::new(1000, 1000, 2),
                PanelRequest::new(4000, 12000, 1),
            ])
            .unwrap();
        assert_result_valid(&result, 0, 3);
        assert_eq!(result.sheets.len(), 1);
        assert_eq!(result.placed_count(), 2);
        assert_eq!(result.dropped[0].id, "1-0");
    }

    #[test]
    fn test_overflow_to_second_sheet() {
        let panels: Vec<_> = (0..5).map(|_| PanelRequest::new(3000, 2100, 1)).collect();
        let result = optimizer(3000, 10000, 0).optimize(&panels).unwrap();
        assert_result_valid(&result, 0, 5);
        assert_eq!(result.sheets.len(), 2);

        let first: Vec<_> = result.sheets[0].panels.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(first, [(0, 0), (0, 2100), (0, 4200), (0, 6300)]);

        let second = &result.sheets[1].panels;
        assert_eq!(second.len(), 1);
        assert_eq!((second[0].x, second[0].y), (0, 0));
        assert_eq!(second[0].id, "4-0");
    }

    #[test]
    fn test_kerf_increases_waste() {
        let panels = [PanelRequest::new(1500, 5000, 4)];
        let plain = optimizer(3000, 10000, 0).optimize(&panels).unwrap();
        let kerfed = optimizer(3000, 10000, 5).optimize(&panels).unwrap();
        assert_result_valid(&plain, 0, 4);
        assert_result_valid(&kerfed, 5, 4);

        assert_eq!(plain.sheets.len(), 1);
        assert!(kerfed.sheets.len() > plain.sheets.len());
        assert!(kerfed.statistics.total_wasted_area >= plain.statistics.total_wasted_area);
    }

    #[test]
    fn test_kerf_shifts_placements() {
        let panels = [PanelRequest::new(1000, 1000, 2)];
        let plain = optimizer(3000, 10000, 0).optimize(&panels).unwrap();
        let kerfed = optimizer(3000, 10000, 5).optimize(&panels).unwrap();
        assert_eq!(plain.sheets[0].panels[1].x, 1000);
        assert_eq!(kerfed.sheets[0].panels[1].x, 1005);
    }

    #[test]
    fn test_square_panel_not_rotated() {
        let result = optimizer(3000, 10000, 0)
            .optimize(&[PanelRequest::new(3000, 3000, 4)])
            .unwrap();
        assert_result_valid(&result, 0, 4);
        assert_eq!(result.sheets.len(), 2);
        assert!(result.sheets.iter().flat_map(|s| &s.panels).all(|p| !p.rotated));
    }

    #[test]
    fn test_fills_existing_sheet_before_opening_new() {
        let result = optimizer(3000, 10000, 0)
            .optimize(&[
                PanelRequest::new(3000, 9000, 2),
                PanelRequest::new(3000, 1000, 1),
            ])
            .unwrap();
        assert_result_valid(&result, 0, 3);
        assert_eq!(result.sheets.len(), 2);
        // The small panel back-fills the strip left on the first sheet.
        assert_eq!(result.sheets[0].panels.len(), 2);
        assert_eq!(result.sheets[0].panels[1].id, "1-0");
        assert_eq!(result.sheets[0].panels[1].y, 9000);
    }

    #[test]
    fn test_no_panels() {
        let result = optimizer(3000, 10000, 0).optimize(&[]).unwrap();
        assert_result_valid(&result, 0, 0);
        assert!(result.sheets.is_empty());
        assert_eq!(result.statistics.waste_percentage, 0);
    }

    #[test]
    fn test_deterministic() {
        let panels = vec![
            PanelRequest::new(1200, 1800, 3).with_label("Bedroom"),
            PanelRequest::new(1800, 1200, 2),
            PanelRequest::new(600, 2400, 4),
            PanelRequest::new(2400, 600, 4),
            PanelRequest::new(900, 900, 6),
            PanelRequest::new(2950, 3100, 2),
        ];
        let opt = optimizer(3000, 10000, 3);
        let a = opt.optimize(&panels).unwrap();
        let b = opt.optimize(&panels).unwrap();
        assert_result_valid(&a, 3, 21);
        assert_eq!(a, b);
    }

    #[test]
    fn test_concurrent_calls_are_independent() {
        let panels = vec![
            PanelRequest::new(1500, 2200, 5),
            PanelRequest::new(800, 1900, 7),
        ];
        let opt = optimizer(3000, 10000, 2);
        let expected = opt.optimize(&panels).unwrap();
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| opt.optimize(&panels).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    /// A realistic blind order: mixed widths and drops, kerf of 3mm.
    #[test]
    fn test_mixed_order_with_kerf() {
        let panels = vec![
            PanelRequest::new(2400, 2100, 2).with_label("Living"),
            PanelRequest::new(1200, 1500, 4).with_label("Bed 1"),
            PanelRequest::new(900, 1200, 6).with_label("Bath"),
            PanelRequest::new(1800, 2400, 3).with_label("Dining"),
            PanelRequest::new(600, 900, 8).with_label("Toilet"),
            PanelRequest::new(2950, 1000, 2).with_label("Sliding"),
        ];
        let requested: u64 = panels.iter().map(|p| p.quantity as u64).sum();
        let result = optimizer(3000, 10000, 3).optimize(&panels).unwrap();
        assert_result_valid(&result, 3, requested);
        assert!(result.is_complete());

        let min_sheets = result.statistics.total_used_area.div_ceil(3000 * 10000) as usize;
        assert!(result.sheets.len() >= min_sheets);
        assert_eq!(result.cuts.len(), requested as usize);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = Optimizer::new(OptimizerConfig {
            stock_length: 0,
            ..OptimizerConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, OptimizerError::InvalidConfig(_)));
    }

    #[test]
    fn test_invalid_panels_rejected() {
        let opt = optimizer(3000, 10000, 0);
        let err = opt
            .optimize(&[PanelRequest::new(100, 100, 1), PanelRequest::new(0, 100, 1)])
            .unwrap_err();
        assert!(matches!(err, OptimizerError::InvalidPanel { index: 1, .. }));

        let err = opt.optimize(&[PanelRequest::new(100, 100, 0)]).unwrap_err();
        assert!(matches!(err, OptimizerError::InvalidPanel { index: 0, .. }));
    }
}
