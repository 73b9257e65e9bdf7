//! The `Surface` boundary (§4.6): the only interface the Cell Model uses to
//! mutate visible pixels. Keeping this crate free of any real GUI toolkit
//! dependency is what lets `core-grid` be tested headlessly and lets a host
//! application plug in whatever windowing system it likes.

pub mod color;
pub mod geometry;
pub mod recording;
pub mod text_backend;

pub use core_proto::Anchor;
pub use recording::{NullSurface, SurfaceCall};
pub use text_backend::TextSurface;

/// Style fields for a ring's two main arcs, borrowed for the duration of a
/// `begin_ring` call so the Cell Model doesn't need to allocate just to
/// describe a style push.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingStyleView<'a> {
    pub fg_outer: &'a str,
    pub fg_inner: &'a str,
    pub bg: &'a str,
    pub size_px: i64,
    pub width_outer: i64,
    pub width_inner: i64,
}

/// Abstract rendering surface (§4.6). All coordinates are `(row, col)` cell
/// addresses, already range-checked by the caller — a `Surface` impl should
/// never receive an out-of-grid address.
///
/// `begin_*`/`end_*` are idempotent: `begin_ring` on an already-ring cell
/// just updates its style, and `end_ring` on a non-ring cell is a no-op.
/// This lets the Cell Model express mode transitions without tracking
/// Surface-side state itself.
pub trait Surface {
    fn set_text(&mut self, row: usize, col: usize, text: &str);
    fn set_fg(&mut self, row: usize, col: usize, color: &str);
    fn set_bg(&mut self, row: usize, col: usize, color: &str);
    fn set_anchor(&mut self, row: usize, col: usize, anchor: Anchor);

    fn begin_bar(&mut self, row: usize, col: usize);
    fn set_bar_value(&mut self, row: usize, col: usize, value: i64);
    fn end_bar(&mut self, row: usize, col: usize);

    fn begin_ring(&mut self, row: usize, col: usize, style: RingStyleView<'_>);
    fn set_ring_value(&mut self, row: usize, col: usize, outer: i64, inner: i64);
    fn set_ring_extras(&mut self, row: usize, col: usize, v1: i64, v2: i64);
    fn set_ring_center(&mut self, row: usize, col: usize, text: Option<&str>);
    fn end_ring(&mut self, row: usize, col: usize);
}
