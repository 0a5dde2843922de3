//! Fixed-point trigonometry.
//!
//! Angles are integers with `TRIG_MAX_ANGLE` units per full revolution and
//! sine/cosine results are scaled by `TRIG_MAX_RATIO`, so all rotation maths in
//! the renderer stays in `i32`. Positive angles turn clockwise on screen because
//! the y axis points down.

use core::f32::consts::TAU;

/// One full revolution. Must stay a power of two, `normalize` masks with it.
pub const TRIG_MAX_ANGLE: i32 = 0x10000;

/// Scale of `sin_lookup` / `cos_lookup` results, also the full-circle bitmask.
pub const TRIG_MAX_RATIO: i32 = 0xFFFF;

const _: () = assert!(TRIG_MAX_ANGLE & TRIG_MAX_RATIO == 0 && TRIG_MAX_RATIO + 1 == TRIG_MAX_ANGLE);

/// Reduce any angle into `[0, TRIG_MAX_ANGLE)`.
#[inline]
pub const fn normalize(angle: i32) -> i32 {
    angle & TRIG_MAX_RATIO
}

/// Sine of `angle`, scaled to `[-TRIG_MAX_RATIO, TRIG_MAX_RATIO]`.
pub fn sin_lookup(angle: i32) -> i32 {
    scaled(libm::sinf(to_radians(angle)))
}

/// Cosine of `angle`, scaled to `[-TRIG_MAX_RATIO, TRIG_MAX_RATIO]`.
pub fn cos_lookup(angle: i32) -> i32 {
    scaled(libm::cosf(to_radians(angle)))
}

#[inline]
fn to_radians(angle: i32) -> f32 {
    normalize(angle) as f32 * TAU / TRIG_MAX_ANGLE as f32
}

#[inline]
fn scaled(v: f32) -> i32 {
    (libm::roundf(v * TRIG_MAX_RATIO as f32) as i32).clamp(-TRIG_MAX_RATIO, TRIG_MAX_RATIO)
}
