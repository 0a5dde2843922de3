//! Display layers the face is built from.
//!
//! Each layer owns a frame on the 144x168 screen and knows how to draw itself
//! to any `DrawTarget<Color = Rgb565>`. Drawing is clipped to the target.

use embedded_graphics::mono_font::{ascii::FONT_9X15, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};

use crate::map::MapSource;
use crate::time::LabelText;
use crate::trig::{cos_lookup, sin_lookup, TRIG_MAX_RATIO};

/// A bitmap drawn rotated about one of its own points.
///
/// The frame is a square as wide as the bitmap's diagonal so the image never
/// clips while turning; the source point `src_ic` lands on the frame centre.
pub struct RotBitmapLayer<M> {
    bitmap: M,
    frame: Rectangle,
    src_ic: Point,
    angle: i32,
}

impl<M: MapSource> RotBitmapLayer<M> {
    pub fn new(bitmap: M) -> Self {
        let Size { width, height } = bitmap.size();
        let side = (width * width + height * height).isqrt();
        let src_ic = Point::new((width / 2) as i32, (height / 2) as i32);
        Self {
            bitmap,
            frame: Rectangle::new(Point::zero(), Size::new(side, side)),
            src_ic,
            angle: 0,
        }
    }

    pub fn set_src_ic(&mut self, p: Point) {
        self.src_ic = p;
    }

    pub fn set_frame_origin(&mut self, origin: Point) {
        self.frame.top_left = origin;
    }

    /// Place the frame so its centre sits on `p`.
    pub fn center_on(&mut self, p: Point) {
        let half = self.frame.size / 2;
        self.frame.top_left = p - half;
    }

    /// Clockwise rotation in `TRIG_MAX_ANGLE` units.
    pub fn set_angle(&mut self, angle: i32) {
        self.angle = angle;
    }

    pub fn angle(&self) -> i32 {
        self.angle
    }

    pub fn frame(&self) -> Rectangle {
        self.frame
    }

    pub fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let area = self.frame.intersection(&target.bounding_box());
        if area.is_zero_sized() {
            return Ok(());
        }

        let center = self.frame.top_left + self.frame.size / 2;
        let (sin, cos) = (sin_lookup(self.angle), cos_lookup(self.angle));

        // Walk screen pixels and rotate back into the bitmap (inverse mapping),
        // so every covered pixel is written exactly once.
        let pixels = area.points().filter_map(|p| {
            let d = p - center;
            let sx = (d.x * cos + d.y * sin) / TRIG_MAX_RATIO;
            let sy = (d.y * cos - d.x * sin) / TRIG_MAX_RATIO;
            self.bitmap
                .pixel(self.src_ic + Point::new(sx, sy))
                .map(|c| Pixel(p, c))
        });
        target.draw_iter(pixels)
    }
}

/// Single line of text on a solid background.
///
/// Glyphs start `TEXT_INSET` below the frame top. FONT_9X15 digits stay within
/// cell rows 1..=12, so with the inset they land in frame rows 6..=17, the part of
/// a 20 px frame that is on screen at both y = -6 and y = 150.
pub struct TextLayer {
    frame: Rectangle,
    text: LabelText,
    text_color: Rgb565,
    background: Rgb565,
}

impl TextLayer {
    pub const TEXT_INSET: Point = Point::new(0, 5);

    pub fn new(frame: Rectangle, text_color: Rgb565, background: Rgb565) -> Self {
        Self {
            frame,
            text: LabelText::new(),
            text_color,
            background,
        }
    }

    pub fn set_origin(&mut self, origin: Point) {
        self.frame.top_left = origin;
    }

    pub fn set_text(&mut self, text: LabelText) {
        self.text = text;
    }

    pub fn frame(&self) -> Rectangle {
        self.frame
    }

    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    pub fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        target.fill_solid(&self.frame, self.background)?;

        let style = MonoTextStyleBuilder::new()
            .font(&FONT_9X15)
            .text_color(self.text_color)
            .background_color(self.background)
            .build();

        let mut clipped = target.clipped(&self.frame);
        let origin = self.frame.top_left + Self::TEXT_INSET;
        Text::with_baseline(self.text.as_str(), origin, style, Baseline::Top).draw(&mut clipped)?;
        Ok(())
    }
}

/// Dotted vertical line from the screen centre down to the bottom edge.
pub struct MarkerLayer {
    x: i32,
    from_y: i32,
    to_y: i32,
    color: Rgb565,
}

impl MarkerLayer {
    const DASH_SPACING: usize = 8;

    pub fn new(x: i32, from_y: i32, to_y: i32, color: Rgb565) -> Self {
        Self { x, from_y, to_y, color }
    }

    pub fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let style = PrimitiveStyle::with_stroke(self.color, 1);
        for y in (self.from_y..self.to_y).step_by(Self::DASH_SPACING) {
            Line::new(Point::new(self.x, y), Point::new(self.x, y + 1))
                .into_styled(style)
                .draw(target)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::FrameBuffer;
    use crate::trig::TRIG_MAX_ANGLE;

    /// 21x21 black square with one white dot six pixels above its centre.
    struct Dot;

    impl MapSource for Dot {
        fn size(&self) -> Size {
            Size::new(21, 21)
        }

        fn pixel(&self, p: Point) -> Option<Rgb565> {
            if p.x < 0 || p.y < 0 || p.x > 20 || p.y > 20 {
                return None;
            }
            Some(if p == Point::new(10, 4) { Rgb565::WHITE } else { Rgb565::BLACK })
        }
    }

    fn dot_layer(angle: i32) -> RotBitmapLayer<Dot> {
        let mut layer = RotBitmapLayer::new(Dot);
        layer.center_on(Point::new(20, 20));
        layer.set_angle(angle);
        layer
    }

    #[test]
    fn frame_is_the_diagonal() {
        let layer = dot_layer(0);
        assert_eq!(layer.frame().size, Size::new(29, 29));
        assert_eq!(layer.frame().top_left, Point::new(6, 6));
    }

    #[test]
    fn unrotated_bitmap_is_copied() {
        let mut buf = vec![0u16; 40 * 40];
        let mut fb = FrameBuffer::new(&mut buf, 40, 40).unwrap();
        dot_layer(0).draw(&mut fb).unwrap();
        assert_eq!(fb.pixel(Point::new(20, 14)), Some(Rgb565::WHITE));
        assert_eq!(fb.pixel(Point::new(26, 20)), Some(Rgb565::BLACK));
    }

    #[test]
    fn quarter_turn_is_clockwise() {
        let mut buf = vec![0u16; 40 * 40];
        let mut fb = FrameBuffer::new(&mut buf, 40, 40).unwrap();
        fb.clear(Rgb565::BLUE).unwrap();
        dot_layer(TRIG_MAX_ANGLE / 4).draw(&mut fb).unwrap();
        assert_eq!(fb.pixel(Point::new(26, 20)), Some(Rgb565::WHITE));
        assert_eq!(fb.pixel(Point::new(20, 14)), Some(Rgb565::BLACK));
        // corners of the frame fall outside the square and stay untouched
        assert_eq!(fb.pixel(Point::new(6, 6)), Some(Rgb565::BLUE));
    }

    #[test]
    fn layer_off_screen_draws_nothing() {
        let mut buf = vec![0u16; 40 * 40];
        let mut fb = FrameBuffer::new(&mut buf, 40, 40).unwrap();
        let mut layer = dot_layer(0);
        layer.set_frame_origin(Point::new(100, 100));
        layer.draw(&mut fb).unwrap();
        assert_eq!(fb.take_dirty(), None);
    }

    #[test]
    fn text_layer_fills_its_frame() {
        let mut buf = vec![0u16; 80 * 30];
        let mut fb = FrameBuffer::new(&mut buf, 80, 30).unwrap();
        let mut label = TextLayer::new(
            Rectangle::new(Point::new(10, 5), Size::new(50, 20)),
            Rgb565::WHITE,
            Rgb565::RED,
        );
        let mut text = LabelText::new();
        text.push_str("12:34").unwrap();
        label.set_text(text);
        label.draw(&mut fb).unwrap();

        assert_eq!(label.text(), "12:34");
        // right margin of the frame is background only
        assert_eq!(fb.pixel(Point::new(65, 10)), Some(Rgb565::RED));
        assert_eq!(fb.pixel(Point::new(9, 10)), Some(Rgb565::BLACK));
        let lit = Rectangle::new(Point::new(10, 5), Size::new(50, 20))
            .points()
            .filter(|p| fb.pixel(*p) == Some(Rgb565::WHITE))
            .count();
        assert!(lit > 0);
    }

    #[test]
    fn marker_dashes_every_eight_pixels() {
        let mut buf = vec![0u16; 144 * 168];
        let mut fb = FrameBuffer::new(&mut buf, 144, 168).unwrap();
        MarkerLayer::new(72, 84, 168, Rgb565::RED).draw(&mut fb).unwrap();
        for y in [84, 85, 92, 93, 164, 165] {
            assert_eq!(fb.pixel(Point::new(72, y)), Some(Rgb565::RED), "y {y}");
        }
        for y in [83, 86, 91, 166] {
            assert_eq!(fb.pixel(Point::new(72, y)), Some(Rgb565::BLACK), "y {y}");
        }
    }
}
