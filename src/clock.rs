//! Time sources and the tick service.
//!
//! - `Clock` is the injected source of "now". Tests and the `debug-ticks`
//!   build use `FixedClock`; the watch reads the PCF85063 and falls back to
//!   `UptimeClock` when the chip is missing or has lost time.
//! - `TickService` turns a polled time into ticks at a fixed cadence. Each tick
//!   also says which of second, minute and hour moved since the last one.

use core::fmt;

use crate::time::{TimeUnit, WallClockTime};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClockError {
    /// The underlying device could not be read.
    Unavailable,
    /// The device answered but its time cannot be trusted.
    Unreliable,
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockError::Unavailable => f.write_str("clock unavailable"),
            ClockError::Unreliable => f.write_str("clock time unreliable"),
        }
    }
}

impl core::error::Error for ClockError {}

pub trait Clock {
    fn now(&mut self) -> Result<WallClockTime, ClockError>;
}

/// Always reports the same time.
#[derive(Copy, Clone, Debug)]
pub struct FixedClock(pub WallClockTime);

impl Clock for FixedClock {
    fn now(&mut self) -> Result<WallClockTime, ClockError> {
        Ok(self.0)
    }
}

/// Time of day derived from a start time plus elapsed uptime.
#[derive(Copy, Clone, Debug)]
pub struct UptimeClock {
    start: WallClockTime,
    uptime_secs: u32,
}

impl UptimeClock {
    pub const fn new(start: WallClockTime) -> Self {
        Self { start, uptime_secs: 0 }
    }

    pub fn set_uptime_secs(&mut self, secs: u32) {
        self.uptime_secs = secs;
    }
}

impl Clock for UptimeClock {
    fn now(&mut self) -> Result<WallClockTime, ClockError> {
        let secs = (self.start.day_seconds() as u64 + self.uptime_secs as u64) % 86_400;
        Ok(WallClockTime::from_day_seconds(secs as u32))
    }
}

/// Which fields moved since the previous tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct UnitsChanged {
    pub second: bool,
    pub minute: bool,
    pub hour: bool,
}

impl UnitsChanged {
    const ALL: UnitsChanged = UnitsChanged { second: true, minute: true, hour: true };

    fn between(prev: &WallClockTime, now: &WallClockTime) -> Self {
        Self {
            second: prev.second() != now.second(),
            minute: prev.minute() != now.minute(),
            hour: prev.hour() != now.hour(),
        }
    }

    pub const fn contains(&self, unit: TimeUnit) -> bool {
        match unit {
            TimeUnit::Second => self.second,
            TimeUnit::Minute => self.minute,
            TimeUnit::Hour => self.hour,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Tick {
    pub time: WallClockTime,
    pub units_changed: UnitsChanged,
}

/// Delivers a tick on the first poll and whenever `unit` changes afterwards.
#[derive(Debug)]
pub struct TickService {
    unit: TimeUnit,
    last: Option<WallClockTime>,
    subscribed: bool,
}

impl TickService {
    pub const fn subscribe(unit: TimeUnit) -> Self {
        Self { unit, last: None, subscribed: true }
    }

    pub const fn unit(&self) -> TimeUnit {
        self.unit
    }

    pub fn poll(&mut self, now: WallClockTime) -> Option<Tick> {
        if !self.subscribed {
            return None;
        }

        let units_changed = match self.last {
            None => UnitsChanged::ALL,
            Some(prev) => {
                let changed = UnitsChanged::between(&prev, &now);
                // a change in a coarser unit counts too (e.g. 10:05:00 -> 11:05:00)
                let fires = match self.unit {
                    TimeUnit::Second => changed.second || changed.minute || changed.hour,
                    TimeUnit::Minute => changed.minute || changed.hour,
                    TimeUnit::Hour => changed.hour,
                };
                if !fires {
                    return None;
                }
                changed
            }
        };

        self.last = Some(now);
        Some(Tick { time: now, units_changed })
    }

    /// Stop delivering ticks. There is never in-flight work to cancel.
    pub fn unsubscribe(&mut self) {
        self.subscribed = false;
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hms(h: u8, m: u8, s: u8) -> WallClockTime {
        WallClockTime::with_seconds(h, m, s).unwrap()
    }

    #[test]
    fn minute_ticks_fire_once_per_minute() {
        let mut svc = TickService::subscribe(TimeUnit::Minute);

        let first = svc.poll(hms(10, 4, 59)).unwrap();
        assert_eq!(first.units_changed, UnitsChanged::ALL);

        assert!(svc.poll(hms(10, 4, 59)).is_none());
        let tick = svc.poll(hms(10, 5, 0)).unwrap();
        assert!(tick.units_changed.contains(TimeUnit::Minute));
        assert!(!tick.units_changed.contains(TimeUnit::Hour));
        assert!(svc.poll(hms(10, 5, 1)).is_none());
        assert!(svc.poll(hms(10, 5, 30)).is_none());

        let tick = svc.poll(hms(11, 0, 0)).unwrap();
        assert!(tick.units_changed.contains(TimeUnit::Hour));
    }

    #[test]
    fn hour_jump_with_same_minute_still_ticks() {
        let mut svc = TickService::subscribe(TimeUnit::Minute);
        svc.poll(hms(10, 5, 0));
        assert!(svc.poll(hms(11, 5, 0)).is_some());
    }

    #[test]
    fn second_ticks_for_debug_cadence() {
        let mut svc = TickService::subscribe(TimeUnit::Second);
        assert!(svc.poll(hms(0, 0, 0)).is_some());
        assert!(svc.poll(hms(0, 0, 0)).is_none());
        assert!(svc.poll(hms(0, 0, 1)).is_some());
    }

    #[test]
    fn nothing_after_unsubscribe() {
        let mut svc = TickService::subscribe(TimeUnit::Minute);
        assert!(svc.poll(hms(1, 0, 0)).is_some());
        svc.unsubscribe();
        assert!(svc.poll(hms(1, 1, 0)).is_none());
    }

    #[test]
    fn uptime_clock_wraps_at_midnight() {
        let mut clock = UptimeClock::new(hms(23, 59, 30));
        assert_eq!(clock.now(), Ok(hms(23, 59, 30)));
        clock.set_uptime_secs(45);
        assert_eq!(clock.now(), Ok(hms(0, 0, 15)));
    }

    #[test]
    fn fixed_clock_never_moves() {
        let mut clock = FixedClock(WallClockTime::MIDNIGHT);
        assert_eq!(clock.now(), clock.now());
    }
}
