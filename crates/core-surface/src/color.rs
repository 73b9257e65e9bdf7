//! Hex color validation and lightening, memoized per §4.9.
//!
//! Grounded on the original `validate_color` / `lighten_color` helpers: a
//! leading `#` must be followed by exactly 3, 6, or 8 hex digits; any other
//! non-empty string is accepted opaquely as a named color (tkish palettes,
//! X11 names, whatever the Surface backend understands).

use std::cell::RefCell;
use std::collections::HashMap;

/// `true` iff `hex` is an acceptable color token: a `#RGB`/`#RRGGBB`/
/// `#RRGGBBAA` hex literal, or any non-empty string not starting with `#`
/// (treated as an opaque named color). An empty string is never valid.
pub fn validate(hex: &str) -> bool {
    if hex.is_empty() {
        return false;
    }
    match hex.strip_prefix('#') {
        Some(digits) => {
            matches!(digits.len(), 3 | 6 | 8) && digits.bytes().all(|b| b.is_ascii_hexdigit())
        }
        None => true,
    }
}

/// Expand a `#rgb` short form to `#rrggbb`; anything else passes through.
fn expand_short_form(digits: &str) -> String {
    if digits.len() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect()
    } else {
        digits.to_string()
    }
}

fn lighten_uncached(hex: &str, factor: f64) -> String {
    let Some(digits) = hex.strip_prefix('#') else {
        return hex.to_string();
    };
    if !matches!(digits.len(), 3 | 6 | 8) || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return hex.to_string();
    }
    let expanded = expand_short_form(digits);
    let channel = |offset: usize| -> Option<u8> { u8::from_str_radix(&expanded[offset..offset + 2], 16).ok() };
    let (Some(r), Some(g), Some(b)) = (channel(0), channel(2), channel(4)) else {
        return hex.to_string();
    };
    let lighten = |c: u8| -> u8 {
        let lifted = c as f64 + (255.0 - c as f64) * factor;
        lifted.clamp(0.0, 255.0) as u8
    };
    format!("#{:02x}{:02x}{:02x}", lighten(r), lighten(g), lighten(b))
}

/// Memoizes [`lighten`] results keyed on `(hex, factor.to_bits())` so that
/// repeated ring redraws (which re-derive the same two peak-arc colors every
/// tick) don't re-parse and re-blend the same hex string. Not `Sync` by
/// design: the Cell Model that owns a cache is itself single-threaded
/// (§5 — owned exclusively by the render driver).
#[derive(Debug, Default)]
pub struct ColorCache {
    memo: RefCell<HashMap<(String, u64), String>>,
}

impl ColorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lighten `hex` toward white by `factor` (0.0 = unchanged, 1.0 = white),
    /// clamping each channel to `[0,255]`. Non-hex inputs are returned
    /// unchanged (and are not cached, since they're already O(1)).
    pub fn lighten(&self, hex: &str, factor: f64) -> String {
        let key = (hex.to_string(), factor.to_bits());
        if let Some(hit) = self.memo.borrow().get(&key) {
            return hit.clone();
        }
        let result = lighten_uncached(hex, factor);
        self.memo.borrow_mut().insert(key, result.clone());
        result
    }
}
