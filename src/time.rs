//! Wall-clock time as delivered to the watchface, the build-time timezone
//! offset and the `HH:MM` label formatter.

use core::fmt::{self, Write as _};

/// Width of the `HH:MM` label text.
pub const LABEL_TEXT_LEN: usize = 5;

/// Fixed-capacity label text, never allocates.
pub type LabelText = heapless::String<LABEL_TEXT_LEN>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimeError {
    Hour(u8),
    Minute(u8),
    Second(u8),
    Offset(i8),
}

impl fmt::Display for TimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeError::Hour(h) => write!(f, "hour {h} out of range 0..=23"),
            TimeError::Minute(m) => write!(f, "minute {m} out of range 0..=59"),
            TimeError::Second(s) => write!(f, "second {s} out of range 0..=59"),
            TimeError::Offset(o) => write!(f, "timezone offset {o}h out of range -12..=14"),
        }
    }
}

impl core::error::Error for TimeError {}

/// Time-of-day snapshot handed to the tick handler.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct WallClockTime {
    hour: u8,   // 0-23
    minute: u8, // 0-59
    second: u8, // 0-59
}

impl WallClockTime {
    pub const MIDNIGHT: WallClockTime = WallClockTime { hour: 0, minute: 0, second: 0 };

    pub fn new(hour: u8, minute: u8) -> Result<Self, TimeError> {
        Self::with_seconds(hour, minute, 0)
    }

    pub fn with_seconds(hour: u8, minute: u8, second: u8) -> Result<Self, TimeError> {
        if hour > 23 {
            return Err(TimeError::Hour(hour));
        }
        if minute > 59 {
            return Err(TimeError::Minute(minute));
        }
        if second > 59 {
            return Err(TimeError::Second(second));
        }
        Ok(Self { hour, minute, second })
    }

    /// Time of day `secs` seconds after midnight, wrapping every 24 hours.
    pub const fn from_day_seconds(secs: u32) -> Self {
        let secs = secs % 86_400;
        Self {
            hour: (secs / 3600) as u8,
            minute: (secs % 3600 / 60) as u8,
            second: (secs % 60) as u8,
        }
    }

    pub const fn day_seconds(&self) -> u32 {
        self.hour as u32 * 3600 + self.minute as u32 * 60 + self.second as u32
    }

    pub const fn hour(&self) -> u8 {
        self.hour
    }

    pub const fn minute(&self) -> u8 {
        self.minute
    }

    pub const fn second(&self) -> u8 {
        self.second
    }
}

/// Whole hours from UTC. Constant for the lifetime of the process.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct TimezoneOffset(i8);

impl TimezoneOffset {
    pub const UTC: TimezoneOffset = TimezoneOffset(0);

    pub const fn hours(h: i8) -> Result<Self, TimeError> {
        if h < -12 || h > 14 {
            return Err(TimeError::Offset(h));
        }
        Ok(Self(h))
    }

    pub const fn get(self) -> i32 {
        self.0 as i32
    }
}

/// Tick cadence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
}

/// Zero-padded `HH:MM`.
pub fn format_hhmm(time: &WallClockTime) -> LabelText {
    let mut text = LabelText::new();
    // hour < 24 and minute < 60 always fit in five bytes
    let written = write!(text, "{:02}:{:02}", time.hour, time.minute);
    debug_assert!(written.is_ok(), "label overflow for {time:?}");
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_is_zero_padded() {
        let t = WallClockTime::new(3, 5).unwrap();
        assert_eq!(format_hhmm(&t).as_str(), "03:05");
        let t = WallClockTime::new(23, 59).unwrap();
        assert_eq!(format_hhmm(&t).as_str(), "23:59");
        assert_eq!(format_hhmm(&WallClockTime::MIDNIGHT).len(), LABEL_TEXT_LEN);
    }

    #[test]
    fn rejects_out_of_range_fields() {
        assert_eq!(WallClockTime::new(24, 0), Err(TimeError::Hour(24)));
        assert_eq!(WallClockTime::new(0, 60), Err(TimeError::Minute(60)));
        assert_eq!(WallClockTime::with_seconds(0, 0, 60), Err(TimeError::Second(60)));
        assert_eq!(TimezoneOffset::hours(15), Err(TimeError::Offset(15)));
        assert_eq!(TimezoneOffset::hours(-13), Err(TimeError::Offset(-13)));
        assert_eq!(TimezoneOffset::hours(-12).map(TimezoneOffset::get), Ok(-12));
    }

    #[test]
    fn day_seconds_wrap() {
        let t = WallClockTime::from_day_seconds(86_400 + 3 * 3600 + 5 * 60 + 7);
        assert_eq!((t.hour(), t.minute(), t.second()), (3, 5, 7));
        assert_eq!(t.day_seconds(), 3 * 3600 + 5 * 60 + 7);
    }
}
