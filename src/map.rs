//! Map images for the rotating layer.
//!
//! A `MapSource` answers "what colour is the source pixel at p", or `None` where
//! the image is transparent. The rotating layer samples it backwards from
//! screen pixels, so sources only need random access.

use alloc::vec::Vec;
use core::f32::consts::TAU;
use core::fmt;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::{Point, RgbColor, Size};

pub trait MapSource {
    fn size(&self) -> Size;
    fn pixel(&self, p: Point) -> Option<Rgb565>;
}

impl<M: MapSource + ?Sized> MapSource for &M {
    fn size(&self) -> Size {
        (**self).size()
    }

    fn pixel(&self, p: Point) -> Option<Rgb565> {
        (**self).pixel(p)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum MapError {
    /// Byte count does not match width x height at one bit per pixel.
    Size { expected: usize, actual: usize },
    /// Compressed asset could not be inflated.
    Inflate,
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Size { expected, actual } => {
                write!(f, "map bitmap has {actual} bytes, expected {expected}")
            }
            MapError::Inflate => f.write_str("map asset is not valid zlib data"),
        }
    }
}

impl core::error::Error for MapError {}

/// One bit per pixel, MSB first, rows padded to whole bytes. Set bits are land.
pub struct MapBitmap {
    width: u32,
    height: u32,
    stride: usize,
    bits: Vec<u8>,
}

impl MapBitmap {
    pub fn from_raw(width: u32, height: u32, bits: Vec<u8>) -> Result<Self, MapError> {
        let stride = (width as usize).div_ceil(8);
        let expected = stride * height as usize;
        if bits.len() != expected {
            return Err(MapError::Size { expected, actual: bits.len() });
        }
        Ok(Self { width, height, stride, bits })
    }

    /// Load a zlib-compressed 1-bpp asset.
    pub fn from_zlib(width: u32, height: u32, compressed: &[u8]) -> Result<Self, MapError> {
        let bits = miniz_oxide::inflate::decompress_to_vec_zlib(compressed).map_err(|_| MapError::Inflate)?;
        Self::from_raw(width, height, bits)
    }
}

impl MapSource for MapBitmap {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    fn pixel(&self, p: Point) -> Option<Rgb565> {
        if p.x < 0 || p.y < 0 || p.x as u32 >= self.width || p.y as u32 >= self.height {
            return None;
        }
        let (x, y) = (p.x as usize, p.y as usize);
        let byte = self.bits[y * self.stride + x / 8];
        let set = (byte >> (7 - (x % 8))) & 1 == 1;
        Some(if set { Rgb565::WHITE } else { Rgb565::BLACK })
    }
}

/// Procedural north-polar graticule, used when no map asset is bundled.
///
/// Equator at the rim, tropic of Cancer and arctic circle as rings, a meridian
/// every hour (15 degrees) with Greenwich drawn heavier and pointing down, so
/// angle 0 puts GMT noon at the bottom like the bitmap asset.
#[derive(Copy, Clone, Debug)]
pub struct Graticule {
    diameter: u32,
}

impl Graticule {
    pub const DEFAULT_DIAMETER: u32 = 200;

    pub const fn new(diameter: u32) -> Self {
        Self { diameter }
    }

    fn radius(&self) -> f32 {
        (self.diameter as f32 - 1.0) / 2.0
    }
}

impl Default for Graticule {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIAMETER)
    }
}

// colatitude / 90 for the tropic of Cancer and the arctic circle
const RINGS: [f32; 2] = [66.56 / 90.0, 23.44 / 90.0];
const MERIDIAN_STEP: f32 = TAU / 24.0;

impl MapSource for Graticule {
    fn size(&self) -> Size {
        Size::new(self.diameter, self.diameter)
    }

    fn pixel(&self, p: Point) -> Option<Rgb565> {
        let r_max = self.radius();
        let dx = p.x as f32 - r_max;
        let dy = p.y as f32 - r_max;
        let r = libm::sqrtf(dx * dx + dy * dy);
        if r > r_max + 0.5 {
            return None;
        }

        let on_rim = r >= r_max - 1.5;
        let on_ring = RINGS.iter().any(|k| libm::fabsf(r - k * r_max) < 0.6);

        // angle from straight down, clockwise on screen
        let theta = libm::atan2f(-dx, dy);
        let k = libm::roundf(theta / MERIDIAN_STEP);
        let off = libm::fabsf(r * libm::sinf(theta - k * MERIDIAN_STEP));
        let greenwich = k == 0.0 && libm::fabsf(theta) < MERIDIAN_STEP / 2.0;
        let on_meridian = r > 4.0 && off < if greenwich { 1.5 } else { 0.5 };

        Some(if on_rim || on_ring || on_meridian { Rgb565::WHITE } else { Rgb565::BLACK })
    }
}
