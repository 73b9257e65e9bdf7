//! Per-cell state (§3, §4.5): a single mutually-exclusive render mode plus
//! the mode-specific sub-state and the `last_applied` dedup cache.

use core_proto::Anchor;

pub const DEFAULT_RING_FG_OUTER: &str = "#606060";
pub const DEFAULT_RING_FG_INNER: &str = "#ffffff";
pub const DEFAULT_RING_BG: &str = "#000000";
pub const DEFAULT_RING_SIZE_PX: i64 = 280;
pub const DEFAULT_RING_WIDTH_OUTER: i64 = 10;
pub const DEFAULT_RING_WIDTH_INNER: i64 = 27;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellMode {
    Text,
    Bar,
    Ring,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RingStyle {
    pub fg_outer: String,
    pub fg_inner: String,
    pub bg: String,
    pub size_px: i64,
    pub width_outer: i64,
    pub width_inner: i64,
}

impl Default for RingStyle {
    fn default() -> Self {
        Self {
            fg_outer: DEFAULT_RING_FG_OUTER.to_string(),
            fg_inner: DEFAULT_RING_FG_INNER.to_string(),
            bg: DEFAULT_RING_BG.to_string(),
            size_px: DEFAULT_RING_SIZE_PX,
            width_outer: DEFAULT_RING_WIDTH_OUTER,
            width_inner: DEFAULT_RING_WIDTH_INNER,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RingState {
    pub outer_val: i64,
    pub inner_val: i64,
    pub extra1_val: i64,
    pub extra2_val: i64,
    pub center_text_override: Option<String>,
    pub style: RingStyle,
    /// Whether an explicit style has ever been pushed. Drives the
    /// default-style initialization on a bare first `RingValue`.
    pub styled: bool,
}

impl RingState {
    fn reset(&mut self) {
        *self = RingState::default();
    }

    /// Text shown at the ring's center: the override if set, else the inner
    /// value floored at 1 so the center never reads "0".
    pub fn center_text(&self) -> String {
        match &self.center_text_override {
            Some(text) => text.clone(),
            None => self.inner_val.max(1).to_string(),
        }
    }
}

/// Cache of the most recent values actually pushed to the Surface (§3). A
/// `None` field means "never written since the last mode transition",
/// which forces the next apply to push regardless of the stored value.
#[derive(Debug, Clone, Default)]
pub struct LastApplied {
    pub text: Option<String>,
    pub fg: Option<String>,
    pub bg: Option<String>,
    pub anchor: Option<Anchor>,
}

#[derive(Debug, Clone)]
pub struct Cell {
    pub mode: CellMode,
    pub text: String,
    pub fg: String,
    pub bg: String,
    pub anchor: Anchor,
    pub bar_value: i64,
    pub ring: RingState,
    pub last_applied: LastApplied,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            mode: CellMode::Text,
            text: String::new(),
            fg: String::new(),
            bg: String::new(),
            anchor: Anchor::Left,
            bar_value: 0,
            ring: RingState::default(),
            last_applied: LastApplied::default(),
        }
    }
}

impl Cell {
    /// Release bar/ring sub-state and reset the dedup cache so the next
    /// attribute apply always reaches the Surface, regardless of prior
    /// values (invariant 2: teardown happens before any new-mode surface
    /// call).
    pub fn teardown_mode_state(&mut self) {
        self.ring.reset();
        self.bar_value = 0;
        self.last_applied = LastApplied::default();
    }
}
