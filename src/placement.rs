//! Map rotation angle and time-label placement.
//!
//! The map image has GMT noon at the bottom of the screen, so the world turns
//! "backwards" relative to the sun as the hour advances. Every value here is
//! recomputed from the supplied time on each tick.

use embedded_graphics::prelude::Point;

use crate::time::{format_hhmm, LabelText, TimezoneOffset, WallClockTime};
use crate::trig::{TRIG_MAX_ANGLE, TRIG_MAX_RATIO};

/// Number of equal sectors the circle is split into for label placement.
pub const SECTORS: i32 = 32;

const SECTORS_PER_CORNER: u8 = 8;

/// Signed rotation in `TRIG_MAX_ANGLE` units per revolution. Not normalized.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RotationAngle(pub i32);

impl RotationAngle {
    /// The angle actually applied to the map layer.
    pub const fn for_map_layer(self) -> i32 {
        -self.0
    }
}

/// One of 32 sectors of 11.25 degrees.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quadrant(u8);

impl Quadrant {
    pub const fn new(q: u8) -> Option<Self> {
        if (q as i32) < SECTORS {
            Some(Self(q))
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    pub fn corner(self) -> LabelCorner {
        match self.0 / SECTORS_PER_CORNER {
            0 => LabelCorner::UpperLeft,
            1 => LabelCorner::LowerLeft,
            2 => LabelCorner::LowerRight,
            3 => LabelCorner::UpperRight,
            band => unreachable!("quadrant {} gives band {band}, expected 0..=3", self.0),
        }
    }
}

/// Where the time label sits on the 144x168 screen.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LabelCorner {
    UpperLeft,
    LowerLeft,
    LowerRight,
    UpperRight,
}

impl LabelCorner {
    pub const ALL: [LabelCorner; 4] = [
        LabelCorner::UpperLeft,
        LabelCorner::LowerLeft,
        LabelCorner::LowerRight,
        LabelCorner::UpperRight,
    ];

    /// Label frame origin. Top corners start at -6, so only frame rows 6.. are visible there.
    pub const fn origin(self) -> Point {
        match self {
            LabelCorner::UpperLeft => Point::new(0, -6),
            LabelCorner::LowerLeft => Point::new(0, 150),
            LabelCorner::LowerRight => Point::new(90, 150),
            LabelCorner::UpperRight => Point::new(90, -6),
        }
    }
}

/// Rotation for `time` in the fixed zone `tz`.
///
/// The offset is counted twice: once on its own, which moves the noon
/// reference of the image, and once added to the hour. Each term truncates
/// separately.
pub fn compute_rotation_angle(time: &WallClockTime, tz: TimezoneOffset) -> RotationAngle {
    let hour = time.hour() as i32;
    let minute = time.minute() as i32;
    let tz = tz.get();

    let angle = (TRIG_MAX_ANGLE * tz) / 24
        + (TRIG_MAX_ANGLE * (hour + tz)) / 24
        + (TRIG_MAX_ANGLE * minute) / (60 * 24);

    RotationAngle(angle)
}

/// Sector of the circle `angle` falls in, after wrapping into one revolution.
pub fn compute_quadrant(angle: RotationAngle) -> Quadrant {
    let normalized = (angle.0 + TRIG_MAX_ANGLE) & TRIG_MAX_RATIO;
    let q = normalized * SECTORS / TRIG_MAX_ANGLE;
    debug_assert!((0..SECTORS).contains(&q));
    Quadrant(q as u8)
}

/// Label origin for a sector.
pub fn place_label(quadrant: Quadrant) -> Point {
    quadrant.corner().origin()
}

/// Everything one tick changes on screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickFrame {
    pub angle: RotationAngle,
    pub quadrant: Quadrant,
    pub label_origin: Point,
    pub label_text: LabelText,
}

pub fn compute_tick(time: &WallClockTime, tz: TimezoneOffset) -> TickFrame {
    let angle = compute_rotation_angle(time, tz);
    let quadrant = compute_quadrant(angle);
    TickFrame {
        angle,
        quadrant,
        label_origin: place_label(quadrant),
        label_text: format_hhmm(time),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u8, minute: u8) -> WallClockTime {
        WallClockTime::new(hour, minute).unwrap()
    }

    fn tz(h: i8) -> TimezoneOffset {
        TimezoneOffset::hours(h).unwrap()
    }

    #[test]
    fn plus_one_at_midnight_is_upper_left() {
        let angle = compute_rotation_angle(&at(0, 0), tz(1));
        // two truncated FULL/24 terms
        assert_eq!(angle, RotationAngle(2730 + 2730));
        let q = compute_quadrant(angle);
        assert_eq!(q.get(), 2);
        assert_eq!(place_label(q), Point::new(0, -6));
    }

    #[test]
    fn half_past_noon_utc_is_lower_right() {
        let angle = compute_rotation_angle(&at(12, 30), TimezoneOffset::UTC);
        assert_eq!(angle, RotationAngle(TRIG_MAX_ANGLE / 2 + 1365));
        let q = compute_quadrant(angle);
        assert_eq!(q.get(), 16);
        assert_eq!(q.corner(), LabelCorner::LowerRight);
        assert_eq!(place_label(q), Point::new(90, 150));
    }

    #[test]
    fn map_layer_turns_the_other_way() {
        let angle = compute_rotation_angle(&at(6, 0), TimezoneOffset::UTC);
        assert_eq!(angle.0, TRIG_MAX_ANGLE / 4);
        assert_eq!(angle.for_map_layer(), -TRIG_MAX_ANGLE / 4);
    }

    #[test]
    fn negative_offsets_keep_quadrant_in_range() {
        for h in -12..=14 {
            for hour in 0..24 {
                for minute in [0, 29, 59] {
                    let q = compute_quadrant(compute_rotation_angle(&at(hour, minute), tz(h)));
                    assert!(q.get() < 32, "tz {h} {hour}:{minute} gave {q:?}");
                }
            }
        }
    }

    #[test]
    fn quadrant_wraps_below_minus_one_revolution() {
        assert_eq!(compute_quadrant(RotationAngle(-TRIG_MAX_ANGLE)).get(), 0);
        assert_eq!(compute_quadrant(RotationAngle(-1)).get(), 31);
        assert_eq!(compute_quadrant(RotationAngle(-TRIG_MAX_ANGLE - 1)).get(), 31);
    }

    #[test]
    fn hourly_quadrant_never_runs_backwards() {
        let mut prev = compute_quadrant(compute_rotation_angle(&at(0, 0), TimezoneOffset::UTC));
        let mut seen = [false; 4];
        for hour in 0..24 {
            let q = compute_quadrant(compute_rotation_angle(&at(hour, 0), TimezoneOffset::UTC));
            assert!(q >= prev, "hour {hour}: {q:?} after {prev:?}");
            seen[(q.get() / 8) as usize] = true;
            prev = q;
        }
        assert_eq!(seen, [true; 4]);
    }

    #[test]
    fn minute_sampling_covers_every_sector() {
        let mut seen = [false; 32];
        for hour in 0..24 {
            for minute in 0..60 {
                let q = compute_quadrant(compute_rotation_angle(&at(hour, minute), TimezoneOffset::UTC));
                seen[q.get() as usize] = true;
            }
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn every_sector_has_exactly_one_origin() {
        let origins: [Point; 4] = LabelCorner::ALL.map(LabelCorner::origin);
        for q in 0..32u8 {
            let p = place_label(Quadrant::new(q).unwrap());
            assert_eq!(origins.iter().filter(|o| **o == p).count(), 1, "sector {q}");
        }
        assert_eq!(place_label(Quadrant::new(7).unwrap()), Point::new(0, -6));
        assert_eq!(place_label(Quadrant::new(8).unwrap()), Point::new(0, 150));
        assert_eq!(place_label(Quadrant::new(23).unwrap()), Point::new(90, 150));
        assert_eq!(place_label(Quadrant::new(24).unwrap()), Point::new(90, -6));
        assert!(Quadrant::new(32).is_none());
    }

    #[test]
    fn tick_is_repeatable() {
        let t = at(17, 42);
        let a = compute_tick(&t, tz(-5));
        let b = compute_tick(&t, tz(-5));
        assert_eq!(a, b);
        assert_eq!(a.label_text.as_str(), "17:42");
    }
}
