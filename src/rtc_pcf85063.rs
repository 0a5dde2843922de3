// RTC driver for PCF85063A/PCF85063TP real-time clock chips.
// Datasheet: https://files.waveshare.com/wiki/common/Pcf85063atl1118-NdPQpTGE-loeW7GbZ7.pdf
//
// Only time-of-day is used by the watchface, the date registers are skipped.

use core::fmt;

use embedded_hal::i2c::I2c;

use crate::clock::{Clock, ClockError};
use crate::time::{TimeError, WallClockTime};

pub const PCF85063_ADDR: u8 = 0x51;

// Seconds register, start of the time block (sec, min, hour)
const REG_SECONDS: u8 = 0x04;
// Oscillator-stop flag in the seconds register
const VL_FLAG: u8 = 0x80;

#[derive(Debug, PartialEq, Eq)]
pub enum RtcError<E> {
    Bus(E),
    /// Oscillator stopped since the time was last set (power loss).
    Unreliable,
    Invalid(TimeError),
}

impl<E: fmt::Debug> fmt::Display for RtcError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RtcError::Bus(e) => write!(f, "rtc i2c error: {e:?}"),
            RtcError::Unreliable => f.write_str("rtc lost power, time unreliable"),
            RtcError::Invalid(e) => write!(f, "rtc returned bad time: {e}"),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for RtcError<E> {}

pub struct Pcf85063<I2C> {
    i2c: I2C,
}

impl<I2C, E> Pcf85063<I2C>
where
    I2C: I2c<Error = E>,
{
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    pub fn into_inner(self) -> I2C {
        self.i2c
    }

    /// Read the time of day.
    pub fn read_time(&mut self) -> Result<WallClockTime, RtcError<E>> {
        let mut buf = [0u8; 3];
        self.i2c
            .write_read(PCF85063_ADDR, &[REG_SECONDS], &mut buf)
            .map_err(RtcError::Bus)?;

        if buf[0] & VL_FLAG != 0 {
            return Err(RtcError::Unreliable);
        }

        let sec = bcd_decode(buf[0] & 0x7F);
        let min = bcd_decode(buf[1] & 0x7F);
        let hour = bcd_decode(buf[2] & 0x3F);
        WallClockTime::with_seconds(hour, min, sec).map_err(RtcError::Invalid)
    }

    /// Write the time of day. Writing the seconds register clears the VL flag.
    pub fn set_time(&mut self, t: &WallClockTime) -> Result<(), RtcError<E>> {
        let data = [
            REG_SECONDS,
            bcd_encode(t.second()),
            bcd_encode(t.minute()),
            bcd_encode(t.hour()),
        ];
        self.i2c.write(PCF85063_ADDR, &data).map_err(RtcError::Bus)
    }
}

impl<I2C, E> Clock for Pcf85063<I2C>
where
    I2C: I2c<Error = E>,
    E: fmt::Debug,
{
    fn now(&mut self) -> Result<WallClockTime, ClockError> {
        self.read_time().map_err(|e| {
            log::warn!("{e}");
            match e {
                RtcError::Unreliable => ClockError::Unreliable,
                RtcError::Bus(_) | RtcError::Invalid(_) => ClockError::Unavailable,
            }
        })
    }
}

// BCD encode/decode helpers
fn bcd_decode(v: u8) -> u8 {
    (v & 0x0F) + ((v >> 4) * 10)
}

fn bcd_encode(v: u8) -> u8 {
    ((v / 10) << 4) | (v % 10)
}
