use crate::types::{PlacedPanel, Rect};

const MAX_WIDTH: f64 = 80.0;
const MAX_HEIGHT: f64 = 24.0;

/// A panel's bounding box in grid cells.
#[derive(Debug, Clone, Copy)]
struct CellBox {
    col: usize,
    row: usize,
    cols: usize,
    rows: usize,
}

impl CellBox {
    /// Length maps to columns and width to rows, both scaled to the grid.
    fn for_panel(p: &PlacedPanel, scale: f64) -> Self {
        let cells = |mm: u32| (mm as f64 * scale).round() as usize;
        Self {
            col: cells(p.y),
            row: cells(p.x),
            cols: cells(p.length),
            rows: cells(p.width),
        }
    }
}

/// Writes the label centred on the box's middle row, clipped to its interior.
fn write_label(grid: &mut [Vec<char>], b: CellBox, label: &str) {
    if b.cols < 3 || b.rows < 2 {
        return;
    }
    let interior = b.cols - 1;
    let chars: Vec<char> = label.chars().take(interior).collect();
    let start = b.col + 1 + (interior - chars.len()) / 2;
    let Some(line) = grid.get_mut(b.row + b.rows / 2) else {
        return;
    };
    for (cell, ch) in line.iter_mut().skip(start).zip(chars) {
        *cell = ch;
    }
}

/// Draws a sheet as it unrolls: length runs left to right, width top to bottom.
pub fn render_sheet(stock: Rect, panels: &[PlacedPanel]) -> String {
    let scale = f64::min(
        MAX_WIDTH / stock.length as f64,
        MAX_HEIGHT / stock.width as f64,
    );
    let cols = (stock.length as f64 * scale).round() as usize;
    let rows = (stock.width as f64 * scale).round() as usize;
    if cols == 0 || rows == 0 {
        return String::new();
    }

    let mut grid = vec![vec![' '; cols + 1]; rows + 1];
    draw_rect(&mut grid, 0, 0, cols, rows);

    for p in panels {
        let b = CellBox::for_panel(p, scale);
        if b.cols == 0 || b.rows == 0 {
            continue;
        }
        draw_rect(&mut grid, b.col, b.row, b.cols, b.rows);
        write_label(&mut grid, b, &p.label);
    }

    grid.iter()
        .map(|line| {
            let mut text: String = line.iter().collect::<String>().trim_end().to_string();
            text.push('\n');
            text
        })
        .collect()
}

/// Sets one border cell, turning crossings of horizontal and vertical edges into '+'.
fn mark(grid: &mut [Vec<char>], row: usize, col: usize, edge: char) {
    let Some(cell) = grid.get_mut(row).and_then(|r| r.get_mut(col)) else {
        return;
    };
    *cell = match (*cell, edge) {
        ('+', _) => '+',
        ('|', '-') | ('-', '|') => '+',
        _ => edge,
    };
}

fn draw_rect(grid: &mut [Vec<char>], x: usize, y: usize, w: usize, h: usize) {
    for col in x..=x + w {
        mark(grid, y, col, '-');
        mark(grid, y + h, col, '-');
    }
    for row in y..=y + h {
        mark(grid, row, x, '|');
        mark(grid, row, x + w, '|');
    }
    for (row, col) in [(y, x), (y, x + w), (y + h, x), (y + h, x + w)] {
        mark(grid, row, col, '+');
    }
}
