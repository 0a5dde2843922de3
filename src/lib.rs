#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod clock;
pub mod face;
pub mod framebuffer;
pub mod layer;
pub mod map;
pub mod placement;
pub mod rtc_pcf85063;
pub mod time;
pub mod trig;

#[cfg(feature = "firmware")]
pub mod wiring;

#[cfg(all(feature = "firmware", feature = "disp_mipidsi"))]
pub mod display;
