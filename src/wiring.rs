// Board-specific pin mappings for the watch.
// Profiles are selected via Cargo features, like the panel backend.
//! The following wiring is assumed (ESP32-S3 devkit + GC9A01 round panel):
//! - LCD SCK  => GPIO10
//! - LCD MOSI => GPIO11
//! - LCD CS   => GPIO9
//! - LCD DC   => GPIO8
//! - LCD RST  => GPIO14
//! - LCD BL   => GPIO2
//! - PCF85063 SDA => GPIO4
//! - PCF85063 SCL => GPIO5
//! - GND => GND
//! - 3.3V => 3.3V
//! The RTC breakout carries its own I2C pull-ups.

use esp_backtrace as _;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::peripherals::{Peripherals, GPIO10, GPIO11, GPIO4, GPIO5, I2C0, SPI2};

pub struct DisplayPins<'a> {
    pub spi2: SPI2<'a>,
    pub spi_sck: GPIO10<'a>,
    pub spi_mosi: GPIO11<'a>,
    pub lcd_cs: Output<'a>,
    pub lcd_dc: Output<'a>,
    pub lcd_rst: Output<'a>,
    pub lcd_bl: Output<'a>,
}

pub struct RtcPins<'a> {
    pub i2c0: I2C0<'a>,
    pub sda: GPIO4<'a>,
    pub scl: GPIO5<'a>,
}

pub struct BoardPins<'a> {
    pub display_pins: DisplayPins<'a>,
    pub rtc_pins: RtcPins<'a>,
}

#[cfg(feature = "devkit-esp32s3-disp128")]
pub fn init_board_pins(p: Peripherals) -> BoardPins<'static> {
    // LCD control pins, GPIO10/11 stay raw for the SPI peripheral
    let lcd_cs = Output::new(p.GPIO9, Level::High, OutputConfig::default());
    let lcd_dc = Output::new(p.GPIO8, Level::Low, OutputConfig::default());
    let lcd_rst = Output::new(p.GPIO14, Level::High, OutputConfig::default());
    let lcd_bl = Output::new(p.GPIO2, Level::Low, OutputConfig::default());

    BoardPins {
        display_pins: DisplayPins {
            spi2: p.SPI2,
            spi_sck: p.GPIO10,
            spi_mosi: p.GPIO11,
            lcd_cs,
            lcd_dc,
            lcd_rst,
            lcd_bl,
        },
        rtc_pins: RtcPins {
            i2c0: p.I2C0,
            sda: p.GPIO4,
            scl: p.GPIO5,
        },
    }
}
