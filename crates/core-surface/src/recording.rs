//! A `Surface` that records every call instead of drawing anything.
//!
//! Used by `core-grid` and `core-coalesce` test suites to assert ordering
//! invariants (P4, P5) and dedup behavior that a real GUI backend would make
//! awkward to observe directly.

use crate::{Anchor, RingStyleView, Surface};

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    SetText { row: usize, col: usize, text: String },
    SetFg { row: usize, col: usize, color: String },
    SetBg { row: usize, col: usize, color: String },
    SetAnchor { row: usize, col: usize, anchor: Anchor },
    BeginBar { row: usize, col: usize },
    SetBarValue { row: usize, col: usize, value: i64 },
    EndBar { row: usize, col: usize },
    BeginRing { row: usize, col: usize, fg_outer: String, fg_inner: String, bg: String, size_px: i64, width_outer: i64, width_inner: i64 },
    SetRingValue { row: usize, col: usize, outer: i64, inner: i64 },
    SetRingExtras { row: usize, col: usize, v1: i64, v2: i64 },
    SetRingCenter { row: usize, col: usize, text: Option<String> },
    EndRing { row: usize, col: usize },
}

/// Records calls in arrival order; never errors, never drops pixels.
#[derive(Debug, Default)]
pub struct NullSurface {
    pub calls: Vec<SurfaceCall>,
}

impl NullSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls addressed to a specific cell, in the order they were made.
    pub fn calls_for(&self, row: usize, col: usize) -> Vec<&SurfaceCall> {
        self.calls
            .iter()
            .filter(|call| call_address(call) == Some((row, col)))
            .collect()
    }
}

fn call_address(call: &SurfaceCall) -> Option<(usize, usize)> {
    Some(match call {
        SurfaceCall::SetText { row, col, .. }
        | SurfaceCall::SetFg { row, col, .. }
        | SurfaceCall::SetBg { row, col, .. }
        | SurfaceCall::SetAnchor { row, col, .. }
        | SurfaceCall::BeginBar { row, col }
        | SurfaceCall::SetBarValue { row, col, .. }
        | SurfaceCall::EndBar { row, col }
        | SurfaceCall::BeginRing { row, col, .. }
        | SurfaceCall::SetRingValue { row, col, .. }
        | SurfaceCall::SetRingExtras { row, col, .. }
        | SurfaceCall::SetRingCenter { row, col, .. }
        | SurfaceCall::EndRing { row, col } => (*row, *col),
    })
}

impl Surface for NullSurface {
    fn set_text(&mut self, row: usize, col: usize, text: &str) {
        self.calls.push(SurfaceCall::SetText { row, col, text: text.to_string() });
    }
    fn set_fg(&mut self, row: usize, col: usize, color: &str) {
        self.calls.push(SurfaceCall::SetFg { row, col, color: color.to_string() });
    }
    fn set_bg(&mut self, row: usize, col: usize, color: &str) {
        self.calls.push(SurfaceCall::SetBg { row, col, color: color.to_string() });
    }
    fn set_anchor(&mut self, row: usize, col: usize, anchor: Anchor) {
        self.calls.push(SurfaceCall::SetAnchor { row, col, anchor });
    }
    fn begin_bar(&mut self, row: usize, col: usize) {
        self.calls.push(SurfaceCall::BeginBar { row, col });
    }
    fn set_bar_value(&mut self, row: usize, col: usize, value: i64) {
        self.calls.push(SurfaceCall::SetBarValue { row, col, value });
    }
    fn end_bar(&mut self, row: usize, col: usize) {
        self.calls.push(SurfaceCall::EndBar { row, col });
    }
    fn begin_ring(&mut self, row: usize, col: usize, style: RingStyleView<'_>) {
        self.calls.push(SurfaceCall::BeginRing {
            row,
            col,
            fg_outer: style.fg_outer.to_string(),
            fg_inner: style.fg_inner.to_string(),
            bg: style.bg.to_string(),
            size_px: style.size_px,
            width_outer: style.width_outer,
            width_inner: style.width_inner,
        });
    }
    fn set_ring_value(&mut self, row: usize, col: usize, outer: i64, inner: i64) {
        self.calls.push(SurfaceCall::SetRingValue { row, col, outer, inner });
    }
    fn set_ring_extras(&mut self, row: usize, col: usize, v1: i64, v2: i64) {
        self.calls.push(SurfaceCall::SetRingExtras { row, col, v1, v2 });
    }
    fn set_ring_center(&mut self, row: usize, col: usize, text: Option<&str>) {
        self.calls.push(SurfaceCall::SetRingCenter { row, col, text: text.map(str::to_string) });
    }
    fn end_ring(&mut self, row: usize, col: usize) {
        self.calls.push(SurfaceCall::EndRing { row, col });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_calls_in_order() {
        let mut surface = NullSurface::new();
        surface.set_text(0, 0, "hi");
        surface.set_fg(0, 0, "#fff");
        assert_eq!(surface.calls.len(), 2);
        assert_eq!(surface.calls_for(0, 0).len(), 2);
        assert!(surface.calls_for(1, 1).is_empty());
    }
}
