//! Panel setup and frame flushing.
//
// - `setup_display` brings up the GC9A01 (240x240, D/C) through mipidsi.
// - The 144x168 face is centred on the round panel; `flush` pushes the frame
//   buffer's dirty rectangle to the matching panel area.

use esp_backtrace as _;

use esp_hal::{
    gpio::Output,
    spi::master::{Config as SpiConfig, Spi},
    spi::Mode,
    time::Rate,
    Blocking,
};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
use mipidsi::interface::SpiInterface;
use mipidsi::{
    models::GC9A01,
    options::{ColorInversion, ColorOrder, Orientation, Rotation},
    Builder as DisplayBuilder,
};

use crate::face::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::framebuffer::FrameBuffer;
use crate::wiring::DisplayPins;

pub const PANEL_SIZE: u16 = 240;

/// Where the face's (0,0) lands on the panel.
pub const FACE_OFFSET: Point = Point::new(
    (PANEL_SIZE as i32 - SCREEN_WIDTH as i32) / 2,
    (PANEL_SIZE as i32 - SCREEN_HEIGHT as i32) / 2,
);

// A tiny busy-wait delay that satisfies embedded-hal 1.0 DelayNs.
struct SpinDelay;

impl embedded_hal::delay::DelayNs for SpinDelay {
    #[inline]
    fn delay_ns(&mut self, ns: u32) {
        let mut n = ns / 50 + 1;
        while n != 0 {
            core::hint::spin_loop();
            n -= 1;
        }
    }
}

pub type DisplayType<'a> = mipidsi::Display<
    SpiInterface<'a, ExclusiveDevice<Spi<'a, Blocking>, Output<'a>, NoDelay>, Output<'a>>,
    GC9A01,
    Output<'a>,
>;

pub fn setup_display<'a>(display_pins: DisplayPins<'a>, display_buf: &'a mut [u8]) -> DisplayType<'a> {
    let DisplayPins {
        spi2,
        spi_sck,
        spi_mosi,
        lcd_cs,
        lcd_dc,
        lcd_rst,
        mut lcd_bl,
    } = display_pins;

    // SPI @ 40 MHz, Mode 0
    let spi_cfg = SpiConfig::default()
        .with_frequency(Rate::from_mhz(40))
        .with_mode(Mode::_0);

    let spi = Spi::new(spi2, spi_cfg)
        .expect("SPI2 config rejected")
        .with_sck(spi_sck)
        .with_mosi(spi_mosi);

    // SPI device + DisplayInterface (needs D/C and a buffer)
    let spi_dev = ExclusiveDevice::new(spi, lcd_cs, NoDelay).expect("LCD CS setup failed");
    let di = SpiInterface::new(spi_dev, lcd_dc, display_buf);
    let mut delay = SpinDelay;

    let display = DisplayBuilder::new(GC9A01, di)
        .display_size(PANEL_SIZE, PANEL_SIZE)
        .display_offset(0, 0)
        .orientation(Orientation::new().rotate(Rotation::Deg180))
        .invert_colors(ColorInversion::Inverted)
        .color_order(ColorOrder::Bgr)
        .reset_pin(lcd_rst)
        .init(&mut delay)
        .expect("GC9A01 init failed");

    // backlight on only once the panel holds valid data
    lcd_bl.set_high();
    display
}

/// Push whatever changed in `fb` since the last flush.
pub fn flush<D>(panel: &mut D, fb: &mut FrameBuffer<'_>) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let Some(dirty) = fb.take_dirty() else {
        return Ok(());
    };
    panel.fill_contiguous(&dirty.translate(FACE_OFFSET), fb.colors_in(dirty))
}
