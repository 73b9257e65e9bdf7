//! The Cell Model (§4.5): owns all per-cell state and is the only thing
//! that invokes a `Surface`. Fed one `Command` at a time by the Coalescer;
//! never touches the network or the Command Queue directly.

mod cell;

pub use cell::{Cell, CellMode, LastApplied, RingState, RingStyle};

use core_config::GridConfig;
use core_proto::{Anchor, Command};
use core_surface::{RingStyleView, Surface};
use std::collections::HashSet;
use tracing::trace;

fn clamp127(value: i64) -> i64 {
    value.clamp(0, 127)
}

/// Validate and lowercase-normalize a color token (§4.2: "hex is treated
/// case-insensitively on parse and normalized to lowercase on store").
/// Returns `None` if the color fails validation, in which case the caller
/// must retain the cell's current value (invariant 5).
fn normalize_color(input: &str) -> Option<String> {
    if !core_surface::color::validate(input) {
        return None;
    }
    Some(if input.starts_with('#') {
        input.to_ascii_lowercase()
    } else {
        input.to_string()
    })
}

/// The full grid of cells plus the immutable geometry it was built from.
pub struct Grid {
    cells: Vec<Vec<Cell>>,
    cols_per_row: Vec<usize>,
    bar_rows: HashSet<usize>,
}

impl Grid {
    pub fn new(config: &GridConfig) -> Self {
        let cells = config
            .cols_per_row
            .iter()
            .map(|&cols| vec![Cell::default(); cols])
            .collect();
        Self {
            cells,
            cols_per_row: config.cols_per_row.clone(),
            bar_rows: config.bar_rows.iter().copied().collect(),
        }
    }

    pub fn rows(&self) -> usize {
        self.cols_per_row.len()
    }

    pub fn cols_in_row(&self, row: usize) -> usize {
        self.cols_per_row.get(row).copied().unwrap_or(0)
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        &self.cells[row][col]
    }

    /// P6: resolve `(row, col)` to valid indices, or `None` if out of
    /// range. Out-of-range addresses never reach a cell or the Surface.
    fn locate(&self, row: i64, col: i64) -> Option<(usize, usize)> {
        if row < 0 || col < 0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        if row >= self.cols_per_row.len() || col >= self.cols_per_row[row] {
            return None;
        }
        Some((row, col))
    }

    /// Apply one command to the grid, issuing whatever Surface calls it
    /// implies. Called by the Coalescer once per pending entry per tick.
    pub fn apply(&mut self, command: Command, surface: &mut dyn Surface) {
        match command {
            Command::Set { row, col, fg, bg, align, text } => {
                self.apply_set(row, col, &fg, &bg, align, &text, surface)
            }
            Command::SetBg { row, col, bg } => self.apply_bg(row, col, &bg, surface),
            Command::SetAlign { row, col, align } => self.apply_align(row, col, align, surface),
            Command::BarValue { row, col, value } => self.apply_bar_value(row, col, value, surface),
            Command::RingStyle { row, col, style } => {
                self.apply_ring_style(row, col, style, surface)
            }
            Command::RingValue { row, col, outer, inner, center_text } => {
                self.apply_ring_value(row, col, outer, inner, center_text, surface)
            }
            Command::RingAll { row, col, outer, inner, style } => {
                self.apply_ring_all(row, col, outer, inner, style, surface)
            }
            Command::RingExtraArcs { row, col, v1, v2 } => {
                self.apply_ring_extra_arcs(row, col, v1, v2, surface)
            }
        }
    }

    fn ensure_text_mode(&mut self, row: usize, col: usize, surface: &mut dyn Surface) {
        let cell = &mut self.cells[row][col];
        if cell.mode == CellMode::Text {
            return;
        }
        match cell.mode {
            CellMode::Bar => surface.end_bar(row, col),
            CellMode::Ring => surface.end_ring(row, col),
            CellMode::Text => unreachable!(),
        }
        cell.teardown_mode_state();
        cell.mode = CellMode::Text;
    }

    fn ensure_bar_mode(&mut self, row: usize, col: usize, surface: &mut dyn Surface) {
        let cell = &mut self.cells[row][col];
        if cell.mode == CellMode::Bar {
            return;
        }
        match cell.mode {
            CellMode::Text => {}
            CellMode::Ring => surface.end_ring(row, col),
            CellMode::Bar => unreachable!(),
        }
        cell.teardown_mode_state();
        cell.mode = CellMode::Bar;
        surface.begin_bar(row, col);
    }

    /// Switches to Ring mode if needed, initializing default style on a
    /// never-styled cell, and returns whether a `begin_ring` push to the
    /// Surface is owed this call (i.e. mode just changed, or style is
    /// dirty and the caller should push it).
    fn ensure_ring_mode(&mut self, row: usize, col: usize, surface: &mut dyn Surface) {
        let cell = &mut self.cells[row][col];
        if cell.mode == CellMode::Ring {
            return;
        }
        if cell.mode == CellMode::Bar {
            surface.end_bar(row, col);
        }
        cell.teardown_mode_state();
        cell.mode = CellMode::Ring;
        let style = cell.ring.style.clone();
        let styled = cell.ring.styled;
        if !styled {
            cell.ring.styled = true;
        }
        push_ring_style(surface, row, col, &style);
    }

    fn apply_bg(&mut self, row: i64, col: i64, bg: &str, surface: &mut dyn Surface) {
        let Some((row, col)) = self.locate(row, col) else {
            return;
        };
        let Some(bg) = normalize_color(bg) else {
            return;
        };
        let cell = &mut self.cells[row][col];
        cell.bg = bg.clone();
        if cell.last_applied.bg.as_deref() != Some(bg.as_str()) {
            surface.set_bg(row, col, &bg);
            cell.last_applied.bg = Some(bg);
        }
    }

    fn apply_align(&mut self, row: i64, col: i64, align: Anchor, surface: &mut dyn Surface) {
        let Some((row, col)) = self.locate(row, col) else {
            return;
        };
        let cell = &mut self.cells[row][col];
        cell.anchor = align;
        if cell.last_applied.anchor != Some(align) {
            surface.set_anchor(row, col, align);
            cell.last_applied.anchor = Some(align);
        }
    }

    fn apply_bar_value(&mut self, row: i64, col: i64, value: i64, surface: &mut dyn Surface) {
        let Some((row, col)) = self.locate(row, col) else {
            return;
        };
        if !self.bar_rows.contains(&row) {
            trace!(row, col, "bar command on non-bar row ignored");
            return;
        }
        self.ensure_bar_mode(row, col, surface);
        let value = clamp127(value);
        let cell = &mut self.cells[row][col];
        cell.bar_value = value;
        surface.set_bar_value(row, col, value);
    }

    fn apply_set(
        &mut self,
        row: i64,
        col: i64,
        fg: &str,
        bg: &str,
        align: Option<Anchor>,
        text: &str,
        surface: &mut dyn Surface,
    ) {
        let Some((row, col)) = self.locate(row, col) else {
            return;
        };
        self.ensure_text_mode(row, col, surface);

        let fg = normalize_color(fg);
        let bg = normalize_color(bg);

        let cell = &mut self.cells[row][col];
        if let Some(fg) = fg {
            cell.fg = fg;
        }
        if let Some(bg) = bg {
            cell.bg = bg;
        }
        if let Some(align) = align {
            cell.anchor = align;
        }
        cell.text = text.to_string();

        if cell.last_applied.fg.as_deref() != Some(cell.fg.as_str()) {
            surface.set_fg(row, col, &cell.fg);
            cell.last_applied.fg = Some(cell.fg.clone());
        }
        if cell.last_applied.bg.as_deref() != Some(cell.bg.as_str()) {
            surface.set_bg(row, col, &cell.bg);
            cell.last_applied.bg = Some(cell.bg.clone());
        }
        if cell.last_applied.anchor != Some(cell.anchor) {
            surface.set_anchor(row, col, cell.anchor);
            cell.last_applied.anchor = Some(cell.anchor);
        }
        if cell.last_applied.text.as_deref() != Some(cell.text.as_str()) {
            surface.set_text(row, col, &cell.text);
            cell.last_applied.text = Some(cell.text.clone());
        }
    }

    fn apply_ring_style(
        &mut self,
        row: i64,
        col: i64,
        style: core_proto::RingStyle,
        surface: &mut dyn Surface,
    ) {
        let Some((row, col)) = self.locate(row, col) else {
            return;
        };
        self.ensure_ring_mode(row, col, surface);
        self.merge_ring_style(row, col, style, surface);
    }

    fn apply_ring_value(
        &mut self,
        row: i64,
        col: i64,
        outer: i64,
        inner: i64,
        center_text: Option<String>,
        surface: &mut dyn Surface,
    ) {
        let Some((row, col)) = self.locate(row, col) else {
            return;
        };
        self.ensure_ring_mode(row, col, surface);
        let (outer, inner) = (clamp127(outer), clamp127(inner));
        let cell = &mut self.cells[row][col];
        cell.ring.outer_val = outer;
        cell.ring.inner_val = inner;
        cell.ring.center_text_override = center_text;
        surface.set_ring_value(row, col, outer, inner);
        let center = cell.ring.center_text();
        surface.set_ring_center(row, col, Some(&center));
    }

    fn apply_ring_all(
        &mut self,
        row: i64,
        col: i64,
        outer: i64,
        inner: i64,
        style: core_proto::RingStyle,
        surface: &mut dyn Surface,
    ) {
        let Some((row, col)) = self.locate(row, col) else {
            return;
        };
        self.ensure_ring_mode(row, col, surface);
        self.merge_ring_style(row, col, style, surface);
        let (outer, inner) = (clamp127(outer), clamp127(inner));
        let cell = &mut self.cells[row][col];
        cell.ring.outer_val = outer;
        cell.ring.inner_val = inner;
        surface.set_ring_value(row, col, outer, inner);
        let center = cell.ring.center_text();
        surface.set_ring_center(row, col, Some(&center));
    }

    fn apply_ring_extra_arcs(&mut self, row: i64, col: i64, v1: i64, v2: i64, surface: &mut dyn Surface) {
        let Some((row, col)) = self.locate(row, col) else {
            return;
        };
        self.ensure_ring_mode(row, col, surface);
        let (v1, v2) = (clamp127(v1), clamp127(v2));
        let cell = &mut self.cells[row][col];
        cell.ring.extra1_val = v1;
        cell.ring.extra2_val = v2;
        surface.set_ring_extras(row, col, v1, v2);
    }

    /// Merge an incoming style command into the cell's ring style,
    /// per-field: a field that fails color validation is ignored while the
    /// rest of the update still applies (§9 Open Question resolution).
    fn merge_ring_style(
        &mut self,
        row: usize,
        col: usize,
        incoming: core_proto::RingStyle,
        surface: &mut dyn Surface,
    ) {
        let cell = &mut self.cells[row][col];
        if let Some(fg_outer) = normalize_color(&incoming.fg_outer) {
            cell.ring.style.fg_outer = fg_outer;
        }
        if let Some(fg_inner) = normalize_color(&incoming.fg_inner) {
            cell.ring.style.fg_inner = fg_inner;
        }
        if let Some(bg) = normalize_color(&incoming.bg) {
            cell.ring.style.bg = bg;
        }
        cell.ring.style.size_px = incoming.size_px;
        cell.ring.style.width_outer = incoming.width_outer;
        cell.ring.style.width_inner = incoming.width_inner;
        cell.ring.styled = true;
        let style = cell.ring.style.clone();
        push_ring_style(surface, row, col, &style);
    }
}

fn push_ring_style(surface: &mut dyn Surface, row: usize, col: usize, style: &RingStyle) {
    surface.begin_ring(
        row,
        col,
        RingStyleView {
            fg_outer: &style.fg_outer,
            fg_inner: &style.fg_inner,
            bg: &style.bg,
            size_px: style.size_px,
            width_outer: style.width_outer,
            width_inner: style.width_inner,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_surface::{NullSurface, SurfaceCall};

    fn default_config() -> GridConfig {
        GridConfig {
            cols_per_row: vec![4, 4, 4, 8, 4, 4, 4, 8, 4, 8, 8],
            bar_rows: vec![3, 7],
        }
    }

    #[test]
    fn text_set_then_background_updates_same_cell() {
        let mut grid = Grid::new(&default_config());
        let mut surface = NullSurface::new();
        grid.apply(
            Command::Set {
                row: 0,
                col: 0,
                fg: "#ffffff".into(),
                bg: "#000000".into(),
                align: Some(Anchor::Left),
                text: "HELLO".into(),
            },
            &mut surface,
        );
        grid.apply(
            Command::SetBg { row: 0, col: 0, bg: "#123456".into() },
            &mut surface,
        );
        let cell = grid.cell(0, 0);
        assert_eq!(cell.mode, CellMode::Text);
        assert_eq!(cell.text, "HELLO");
        assert_eq!(cell.fg, "#ffffff");
        assert_eq!(cell.bg, "#123456");
        assert_eq!(cell.anchor, Anchor::Left);
    }

    #[test]
    fn ring_initializes_default_style_on_bare_value() {
        let mut grid = Grid::new(&default_config());
        let mut surface = NullSurface::new();
        grid.apply(
            Command::RingValue { row: 1, col: 0, outer: 64, inner: 32, center_text: None },
            &mut surface,
        );
        let cell = grid.cell(1, 0);
        assert_eq!(cell.mode, CellMode::Ring);
        assert_eq!(cell.ring.outer_val, 64);
        assert_eq!(cell.ring.inner_val, 32);
        assert_eq!(cell.ring.style, RingStyle::default());
        assert_eq!(cell.ring.center_text(), "32");
    }

    #[test]
    fn style_is_visible_before_value_in_same_tick() {
        let mut grid = Grid::new(&default_config());
        let mut surface = NullSurface::new();
        grid.apply(
            Command::RingStyle {
                row: 1,
                col: 2,
                style: core_proto::RingStyle {
                    fg_outer: "#aaaaaa".into(),
                    fg_inner: "#bbbbbb".into(),
                    bg: "#000000".into(),
                    size_px: 280,
                    width_outer: 10,
                    width_inner: 27,
                },
            },
            &mut surface,
        );
        grid.apply(
            Command::RingValue { row: 1, col: 2, outer: 10, inner: 20, center_text: None },
            &mut surface,
        );
        let style_index = surface
            .calls
            .iter()
            .position(|c| matches!(c, SurfaceCall::BeginRing { .. }))
            .unwrap();
        let value_index = surface
            .calls
            .iter()
            .position(|c| matches!(c, SurfaceCall::SetRingValue { .. }))
            .unwrap();
        assert!(style_index < value_index);
        let cell = grid.cell(1, 2);
        assert_eq!(cell.ring.style.fg_outer, "#aaaaaa");
        assert_eq!(cell.ring.outer_val, 10);
        assert_eq!(cell.ring.inner_val, 20);
    }

    #[test]
    fn bar_values_clamp_and_non_bar_row_is_ignored() {
        let mut grid = Grid::new(&default_config());
        let mut surface = NullSurface::new();
        grid.apply(Command::BarValue { row: 3, col: 0, value: 9999 }, &mut surface);
        assert_eq!(grid.cell(3, 0).bar_value, 127);
        grid.apply(Command::BarValue { row: 3, col: 0, value: -5 }, &mut surface);
        assert_eq!(grid.cell(3, 0).bar_value, 0);

        let before = surface.calls.len();
        grid.apply(Command::BarValue { row: 8, col: 0, value: 50 }, &mut surface);
        assert_eq!(surface.calls.len(), before, "non-bar row must never reach the Surface");
    }

    #[test]
    fn text_tears_down_ring_before_repainting() {
        let mut grid = Grid::new(&default_config());
        let mut surface = NullSurface::new();
        grid.apply(
            Command::RingValue { row: 1, col: 0, outer: 64, inner: 32, center_text: None },
            &mut surface,
        );
        grid.apply(
            Command::Set {
                row: 1,
                col: 0,
                fg: "#ffffff".into(),
                bg: "#000000".into(),
                align: Some(Anchor::Center),
                text: "ABC".into(),
            },
            &mut surface,
        );
        let end_ring_index = surface
            .calls
            .iter()
            .position(|c| matches!(c, SurfaceCall::EndRing { .. }))
            .unwrap();
        let text_index = surface
            .calls
            .iter()
            .position(|c| matches!(c, SurfaceCall::SetText { .. }))
            .unwrap();
        assert!(end_ring_index < text_index);
        assert_eq!(grid.cell(1, 0).mode, CellMode::Text);
    }

    #[test]
    fn address_guard_discards_out_of_range_commands() {
        let mut grid = Grid::new(&default_config());
        let mut surface = NullSurface::new();
        grid.apply(
            Command::Set {
                row: 999,
                col: 0,
                fg: "#fff".into(),
                bg: "#000".into(),
                align: None,
                text: "nope".into(),
            },
            &mut surface,
        );
        assert!(surface.calls.is_empty());
    }

    #[test]
    fn dedup_suppresses_repeated_identical_set() {
        let mut grid = Grid::new(&default_config());
        let mut surface = NullSurface::new();
        let cmd = || Command::Set {
            row: 0,
            col: 0,
            fg: "#ffffff".into(),
            bg: "#000000".into(),
            align: Some(Anchor::Left),
            text: "HELLO".into(),
        };
        grid.apply(cmd(), &mut surface);
        let after_first = surface.calls.len();
        grid.apply(cmd(), &mut surface);
        assert_eq!(surface.calls.len(), after_first, "second identical Set must be a no-op");
    }

    #[test]
    fn invalid_color_is_ignored_but_rest_of_style_applies() {
        let mut grid = Grid::new(&default_config());
        let mut surface = NullSurface::new();
        grid.apply(
            Command::RingStyle {
                row: 0,
                col: 0,
                style: core_proto::RingStyle {
                    fg_outer: "#zz".into(),
                    fg_inner: "#bbbbbb".into(),
                    bg: "#000000".into(),
                    size_px: 300,
                    width_outer: 5,
                    width_inner: 15,
                },
            },
            &mut surface,
        );
        let cell = grid.cell(0, 0);
        // invalid fg_outer falls back to the compiled-in default, not dropped entirely
        assert_eq!(cell.ring.style.fg_outer, RingStyle::default().fg_outer);
        assert_eq!(cell.ring.style.fg_inner, "#bbbbbb");
        assert_eq!(cell.ring.style.size_px, 300);
    }
}
