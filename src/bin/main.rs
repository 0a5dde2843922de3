//! PolarMap watch firmware
//! ========================================
//! needs to be run in WSL2 terminal
//! source ~/export-esp.sh
//! cargo run --release --features devkit-esp32s3-disp128
//! ========================================
//!
//! Rotating polar world map with the time in a free corner, updated once a
//! minute. Build with `debug-ticks` to update every second with the time
//! pinned to 00:00 while checking layout.

//% CHIPS: esp32s3
//% FEATURES: esp-hal/unstable

#![no_std]
#![no_main]

// Define the application description, which is placed in a special section of the binary.
// This is used by the bootloader to verify the application.
// The macro automatically fills in the fields.
esp_bootloader_esp_idf::esp_app_desc!();

use polarmap::{
    clock::{Clock, TickService, UptimeClock},
    display::{flush, setup_display},
    face::{PolarMapFace, SCREEN_HEIGHT, SCREEN_WIDTH},
    framebuffer::FrameBuffer,
    map::Graticule,
    rtc_pcf85063::Pcf85063,
    time::{TimeUnit, TimezoneOffset, WallClockTime},
    wiring::{init_board_pins, BoardPins, RtcPins},
};

#[cfg(feature = "debug-ticks")]
use polarmap::clock::FixedClock;

use esp_backtrace as _;

// ESP-HAL imports
use esp_hal::{
    delay::Delay,
    i2c::master::{Config as I2cConfig, I2c},
    main,
    time::Rate,
    timer::systimer::{SystemTimer, Unit},
    Config,
};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

// Allocator for the frame buffer and map
extern crate alloc;
use alloc::vec;

/// Hours from GMT, fixed for the lifetime of the firmware.
const GMT_OFFSET: i8 = 1;

#[cfg(not(feature = "debug-ticks"))]
const TICK_UNIT: TimeUnit = TimeUnit::Minute;
#[cfg(feature = "debug-ticks")]
const TICK_UNIT: TimeUnit = TimeUnit::Second;

const POLL_MS: u32 = 100;

fn uptime_secs() -> u32 {
    let t = SystemTimer::unit_value(Unit::Unit0);
    (t / SystemTimer::ticks_per_second()) as u32
}

/// Time of day at boot from the external RTC, midnight if it has none to give.
fn boot_time(rtc_pins: RtcPins<'static>) -> WallClockTime {
    let cfg = I2cConfig::default().with_frequency(Rate::from_khz(400));
    let i2c = match I2c::new(rtc_pins.i2c0, cfg) {
        Ok(i2c) => i2c.with_sda(rtc_pins.sda).with_scl(rtc_pins.scl),
        Err(e) => {
            log::warn!("I2C init failed: {:?}, clock starts at 00:00", e);
            return WallClockTime::MIDNIGHT;
        }
    };

    let mut rtc = Pcf85063::new(i2c);
    match rtc.now() {
        Ok(t) => {
            log::info!("RTC time {:02}:{:02}:{:02}", t.hour(), t.minute(), t.second());
            t
        }
        Err(e) => {
            log::warn!("RTC: {}, clock starts at 00:00", e);
            WallClockTime::MIDNIGHT
        }
    }
}

#[main]
fn main() -> ! {
    esp_println::logger::init_logger_from_env();

    // Initialize peripherals
    let peripherals = esp_hal::init(Config::default());

    esp_alloc::heap_allocator!(size: 96 * 1024);

    let BoardPins { display_pins, rtc_pins } = init_board_pins(peripherals);

    let mut display_buf = vec![0u8; 1024];
    let mut panel = setup_display(display_pins, &mut display_buf);
    panel.clear(Rgb565::BLACK).ok();

    let tz = TimezoneOffset::hours(GMT_OFFSET).expect("GMT_OFFSET out of range");

    // RTC seeds a software clock, the chip is not read again
    let mut clock = UptimeClock::new(boot_time(rtc_pins));
    let boot_secs = uptime_secs();

    #[cfg(feature = "debug-ticks")]
    let mut fake_clock = FixedClock(WallClockTime::MIDNIGHT);

    let mut fb_storage = vec![0u16; (SCREEN_WIDTH * SCREEN_HEIGHT) as usize];
    let mut fb = FrameBuffer::new(&mut fb_storage, SCREEN_WIDTH as u16, SCREEN_HEIGHT as u16)
        .expect("frame buffer size");

    let mut face = PolarMapFace::new(Graticule::default(), tz);
    let mut ticks = TickService::subscribe(TICK_UNIT);
    let delay = Delay::new();

    log::info!("polarmap up, GMT{:+} ticking every {:?}", face.timezone().get(), ticks.unit());

    // Main loop: poll the clock, redraw on tick, flush what changed
    loop {
        clock.set_uptime_secs(uptime_secs().saturating_sub(boot_secs));

        let tick = match clock.now() {
            Ok(now) => ticks.poll(now),
            Err(e) => {
                log::warn!("clock: {}", e);
                None
            }
        };

        if let Some(tick) = tick {
            #[cfg(feature = "debug-ticks")]
            let time = fake_clock.now().unwrap_or(tick.time);
            #[cfg(not(feature = "debug-ticks"))]
            let time = tick.time;

            face.handle_tick(&time);
            face.draw(&mut fb).ok();
            if let Err(e) = flush(&mut panel, &mut fb) {
                log::warn!("panel flush failed: {:?}", e);
            }
        }

        delay.delay_millis(POLL_MS);
    }
}
