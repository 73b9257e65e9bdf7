//! Pure functions for the dual-ring gauge's angular geometry (§4.8). No
//! allocation, no I/O — callers (the Cell Model, or a `Surface` impl that
//! wants to compute pixel coordinates itself) plug in whatever radius and
//! cell-center units their backend uses.

/// Angular sweep in degrees for a clamped `[0,127]` value. `extent(0) == 0.0`,
/// `extent(127) == -240.0`, strictly decreasing in between (P8).
pub fn extent_degrees(value: i64) -> f64 {
    -SWEEP_MAX_DEGREES * (value.clamp(0, 127) as f64 / 127.0)
}

/// Start angle of every ring arc (7 o'clock position).
pub const START_ANGLE_DEGREES: f64 = 210.0;
/// Maximum angular sweep across the full `[0,127]` value range.
pub const SWEEP_MAX_DEGREES: f64 = 240.0;

/// Radii, in display units, for the ring's four arcs (§4.8).
pub const INNER_RADIUS: f64 = 70.0;
pub const OUTER_RADIUS: f64 = 103.0;
pub const EXTRA1_RADIUS: f64 = 120.0;
pub const EXTRA2_RADIUS: f64 = 127.0;
/// Diameter of the peak dot drawn at an extra arc's terminal angle.
pub const DOT_DIAMETER: f64 = 8.0;

/// Cartesian position of the "peak dot" at the terminal angle of an extra
/// arc carrying `value`, on a circle of `radius` centered at `(cx, cy)`.
/// Y is inverted relative to standard math convention since screen
/// coordinates grow downward (§4.8).
pub fn peak_dot_position(value: i64, radius: f64, cx: f64, cy: f64) -> (f64, f64) {
    let theta_deg = START_ANGLE_DEGREES + extent_degrees(value);
    let theta_rad = (-theta_deg).to_radians();
    (cx + radius * theta_rad.cos(), cy + radius * theta_rad.sin())
}
