use crate::types::{PanelInstance, PlacedPanel, Rect, Sheet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeRect {
    pub x: u32,
    pub y: u32,
    pub rect: Rect,
}

impl FreeRect {
    pub fn contains(&self, other: &FreeRect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x as u64 + other.rect.width as u64 <= self.x as u64 + self.rect.width as u64
            && other.y as u64 + other.rect.length as u64 <= self.y as u64 + self.rect.length as u64
    }
}

/// One stock sheet being packed with first-fit guillotine splits.
#[derive(Debug, Clone)]
pub struct GuillotineSheet {
    stock: Rect,
    kerf: u32,
    used_area: u64,
    pub free_rects: Vec<FreeRect>,
    pub placements: Vec<PlacedPanel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fit {
    pub free_idx: usize,
    pub rotated: bool,
    /// Kerf-inclusive footprint in the chosen orientation.
    pub footprint: Rect,
}

impl GuillotineSheet {
    pub fn new(stock: Rect, kerf: u32) -> Self {
        Self {
            stock,
            kerf,
            used_area: 0,
            free_rects: vec![FreeRect {
                x: 0,
                y: 0,
                rect: stock,
            }],
            placements: Vec::new(),
        }
    }

    pub fn used_area(&self) -> u64 {
        self.used_area
    }

    pub fn wasted_area(&self) -> u64 {
        self.stock.area() - self.used_area
    }

    /// First free rectangle, in insertion order, that admits the piece.
    /// Normal orientation wins over rotated within the same rectangle.
    pub fn find_fit(&self, piece: Rect) -> Option<Fit> {
        // A footprint that overflows u32 fits nowhere.
        let normal = piece.with_kerf(self.kerf);
        let rotated = if piece.is_square() {
            None
        } else {
            piece.rotated().with_kerf(self.kerf)
        };

        for (idx, free) in self.free_rects.iter().enumerate() {
            if let Some(footprint) = normal.filter(|f| f.fits_in(&free.rect)) {
                return Some(Fit {
                    free_idx: idx,
                    rotated: false,
                    footprint,
                });
            }
            if let Some(footprint) = rotated.filter(|f| f.fits_in(&free.rect)) {
                return Some(Fit {
                    free_idx: idx,
                    rotated: true,
                    footprint,
                });
            }
        }

        None
    }

    fn place(&mut self, fit: Fit, panel: &PanelInstance) {
        let free = self.free_rects.remove(fit.free_idx);
        let placed = if fit.rotated {
            panel.rect.rotated()
        } else {
            panel.rect
        };

        self.placements.push(PlacedPanel {
            id: panel.id.clone(),
            label: panel.label.clone(),
            x: free.x,
            y: free.y,
            width: placed.width,
            length: placed.length,
            rotated: fit.rotated,
        });
        self.used_area += placed.area();

        self.split(free, fit.footprint);
        self.remove_contained();
    }

    /// Places the panel in the first rect that admits it.
    pub fn try_place(&mut self, panel: &PanelInstance) -> Option<&PlacedPanel> {
        let fit = self.find_fit(panel.rect)?;
        self.place(fit, panel);
        self.placements.last()
    }

    fn split(&mut self, free: FreeRect, footprint: Rect) {
        // Right remainder spans the full height of the consumed rect.
        if free.rect.width > footprint.width {
            self.free_rects.push(FreeRect {
                x: free.x + footprint.width,
                y: free.y,
                rect: Rect::new(free.rect.width - footprint.width, free.rect.length),
            });
        }
        // Top remainder is only as wide as the footprint.
        if free.rect.length > footprint.length {
            self.free_rects.push(FreeRect {
                x: free.x,
                y: free.y + footprint.length,
                rect: Rect::new(footprint.width, free.rect.length - footprint.length),
            });
        }
    }

    fn remove_contained(&mut self) {
        let mut i = 0;
        while i < self.free_rects.len() {
            let candidate = self.free_rects[i];
            let covered = self
                .free_rects
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && other.contains(&candidate));
            if covered {
                self.free_rects.remove(i);
            } else {
                i += 1;
            }
        }
    }

    pub fn into_sheet(self, id: usize) -> Sheet {
        let wasted_area = self.wasted_area();
        Sheet {
            id,
            width: self.stock.width,
            length: self.stock.length,
            panels: self.placements,
            used_area: self.used_area,
            wasted_area,
        }
    }
}
