//! RGB565 frame buffer draw target.
//!
//! The face is drawn here first and only the dirty rectangle is pushed to the
//! panel, which keeps the rotating map from flickering on slow SPI links.

use core::convert::Infallible;
use core::fmt;

use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

#[derive(Debug, PartialEq, Eq)]
pub struct FrameBufferError {
    pub expected: usize,
    pub actual: usize,
}

impl fmt::Display for FrameBufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame buffer holds {} pixels, expected {}", self.actual, self.expected)
    }
}

impl core::error::Error for FrameBufferError {}

pub struct FrameBuffer<'fb> {
    w: u16,
    h: u16,
    fb: &'fb mut [u16], // raw RGB565, row major
    dirty: Option<Rectangle>,
}

impl<'fb> FrameBuffer<'fb> {
    pub fn new(fb: &'fb mut [u16], width: u16, height: u16) -> Result<Self, FrameBufferError> {
        // Validate FB size matches WxH (RGB565)
        let expected = (width as usize) * (height as usize);
        if fb.len() != expected {
            return Err(FrameBufferError { expected, actual: fb.len() });
        }
        Ok(Self { w: width, h: height, fb, dirty: None })
    }

    pub fn pixel(&self, p: Point) -> Option<Rgb565> {
        self.index(p).map(|i| RawU16::new(self.fb[i]).into())
    }

    /// Rectangle touched since the last call, if any.
    pub fn take_dirty(&mut self) -> Option<Rectangle> {
        self.dirty.take()
    }

    /// Colours inside `area` row by row, for `fill_contiguous` on the panel.
    pub fn colors_in(&self, area: Rectangle) -> impl Iterator<Item = Rgb565> + '_ {
        area.points().map(move |p| self.pixel(p).unwrap_or(Rgb565::BLACK))
    }

    fn index(&self, p: Point) -> Option<usize> {
        if p.x < 0 || p.y < 0 {
            return None;
        }
        let (x, y) = (p.x as usize, p.y as usize);
        if x >= self.w as usize || y >= self.h as usize {
            return None;
        }
        Some(y * self.w as usize + x)
    }

    fn mark(&mut self, p: Point) {
        let px = Rectangle::new(p, Size::new(1, 1));
        self.dirty = Some(match self.dirty {
            None => px,
            Some(d) => envelope(&d, &px),
        });
    }
}

fn envelope(a: &Rectangle, b: &Rectangle) -> Rectangle {
    // both rectangles are non-empty here
    let (a0, a1) = (a.top_left, a.top_left + a.size - Size::new(1, 1));
    let (b0, b1) = (b.top_left, b.top_left + b.size - Size::new(1, 1));
    Rectangle::with_corners(a0.component_min(b0), a1.component_max(b1))
}

impl OriginDimensions for FrameBuffer<'_> {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl DrawTarget for FrameBuffer<'_> {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Rgb565>>,
    {
        for Pixel(p, c) in pixels {
            let Some(i) = self.index(p) else { continue };
            let raw = c.into_storage();
            if self.fb[i] != raw {
                self.fb[i] = raw;
                self.mark(p);
            }
        }
        Ok(())
    }
}
