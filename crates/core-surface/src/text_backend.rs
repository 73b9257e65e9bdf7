//! A headless `Surface` that renders the grid as plain text.
//!
//! Exists for manual smoke-testing (`kiosk-bin --demo`) and for integration
//! tests that want to assert on a human-readable dump rather than a
//! `SurfaceCall` log. Mirrors the teacher's `CrosstermBackend` in spirit —
//! a thin owned-buffer wrapper with an explicit `render` step — without
//! pulling in a real terminal/windowing dependency.

use crate::{Anchor, RingStyleView, Surface};
use std::io::{self, Write};

#[derive(Debug, Clone)]
struct TextCell {
    mode: &'static str,
    text: String,
    fg: String,
    bg: String,
    anchor: Anchor,
    bar_value: i64,
    ring_outer: i64,
    ring_inner: i64,
    ring_extra1: i64,
    ring_extra2: i64,
    ring_center: Option<String>,
}

impl Default for TextCell {
    fn default() -> Self {
        Self {
            mode: "text",
            text: String::new(),
            fg: String::new(),
            bg: String::new(),
            anchor: Anchor::Left,
            bar_value: 0,
            ring_outer: 0,
            ring_inner: 0,
            ring_extra1: 0,
            ring_extra2: 0,
            ring_center: None,
        }
    }
}

/// Plain-text `Surface`. Layout mirrors the compiled-in grid geometry the
/// caller supplies at construction time.
pub struct TextSurface {
    cells: Vec<Vec<TextCell>>,
}

impl TextSurface {
    pub fn new(cols_per_row: &[usize]) -> Self {
        let cells = cols_per_row
            .iter()
            .map(|&cols| vec![TextCell::default(); cols])
            .collect();
        Self { cells }
    }

    fn cell_mut(&mut self, row: usize, col: usize) -> &mut TextCell {
        &mut self.cells[row][col]
    }

    /// Render one line per row, cells separated by `|`, to `out`.
    pub fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        for row in &self.cells {
            let rendered: Vec<String> = row.iter().map(render_cell).collect();
            writeln!(out, "{}", rendered.join("|"))?;
        }
        Ok(())
    }
}

fn render_cell(cell: &TextCell) -> String {
    match cell.mode {
        "bar" => format!("[{:3}/127]", cell.bar_value),
        "ring" => {
            let center = cell
                .ring_center
                .clone()
                .unwrap_or_else(|| cell.ring_inner.max(1).to_string());
            format!(
                "(o{} i{} x{}/{} {})",
                cell.ring_outer, cell.ring_inner, cell.ring_extra1, cell.ring_extra2, center
            )
        }
        _ => format!("{:?}:{}", cell.anchor, cell.text),
    }
}

impl Surface for TextSurface {
    fn set_text(&mut self, row: usize, col: usize, text: &str) {
        let cell = self.cell_mut(row, col);
        cell.mode = "text";
        cell.text = text.to_string();
    }
    fn set_fg(&mut self, row: usize, col: usize, color: &str) {
        self.cell_mut(row, col).fg = color.to_string();
    }
    fn set_bg(&mut self, row: usize, col: usize, color: &str) {
        self.cell_mut(row, col).bg = color.to_string();
    }
    fn set_anchor(&mut self, row: usize, col: usize, anchor: Anchor) {
        self.cell_mut(row, col).anchor = anchor;
    }
    fn begin_bar(&mut self, row: usize, col: usize) {
        self.cell_mut(row, col).mode = "bar";
    }
    fn set_bar_value(&mut self, row: usize, col: usize, value: i64) {
        self.cell_mut(row, col).bar_value = value;
    }
    fn end_bar(&mut self, _row: usize, _col: usize) {}
    fn begin_ring(&mut self, row: usize, col: usize, style: RingStyleView<'_>) {
        let cell = self.cell_mut(row, col);
        cell.mode = "ring";
        cell.fg = style.fg_inner.to_string();
        cell.bg = style.bg.to_string();
    }
    fn set_ring_value(&mut self, row: usize, col: usize, outer: i64, inner: i64) {
        let cell = self.cell_mut(row, col);
        cell.ring_outer = outer;
        cell.ring_inner = inner;
    }
    fn set_ring_extras(&mut self, row: usize, col: usize, v1: i64, v2: i64) {
        let cell = self.cell_mut(row, col);
        cell.ring_extra1 = v1;
        cell.ring_extra2 = v2;
    }
    fn set_ring_center(&mut self, row: usize, col: usize, text: Option<&str>) {
        self.cell_mut(row, col).ring_center = text.map(str::to_string);
    }
    fn end_ring(&mut self, row: usize, col: usize) {
        let cell = self.cell_mut(row, col);
        cell.ring_outer = 0;
        cell.ring_inner = 0;
        cell.ring_extra1 = 0;
        cell.ring_extra2 = 0;
        cell.ring_center = None;
    }
}
