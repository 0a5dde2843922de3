//! The PolarMap watchface: a rotating polar world map with the time in
//! whichever screen corner the map leaves free.
//!
//! `PolarMapFace` is the display session. It is built once at startup, fed a
//! time on every tick, and drawn to any `DrawTarget<Color = Rgb565>`.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::layer::{MarkerLayer, RotBitmapLayer, TextLayer};
use crate::map::MapSource;
use crate::placement::{compute_tick, TickFrame};
use crate::time::{TimezoneOffset, WallClockTime};

// Face geometry, (0,0) is top-left corner
pub const SCREEN_WIDTH: u32 = 144;
pub const SCREEN_HEIGHT: u32 = 168;
pub const SCREEN_CENTER: Point = Point::new(SCREEN_WIDTH as i32 / 2, SCREEN_HEIGHT as i32 / 2);

/// Point of the map asset that sits on the screen centre (the pole).
pub const MAP_SRC_IC: Point = Point::new(100, 100);

const LABEL_SIZE: Size = Size::new(60, 20);
const LABEL_START: Point = Point::new(90, -6);

const BACKGROUND: Rgb565 = Rgb565::BLACK;
const LABEL_TEXT_COLOR: Rgb565 = Rgb565::WHITE;
const LABEL_BACKGROUND: Rgb565 = Rgb565::BLACK;
const MARKER_COLOR: Rgb565 = Rgb565::RED;

pub struct PolarMapFace<M> {
    tz: TimezoneOffset,
    map: RotBitmapLayer<M>,
    label: TextLayer,
    markers: MarkerLayer,
}

impl<M: MapSource> PolarMapFace<M> {
    pub fn new(map: M, tz: TimezoneOffset) -> Self {
        let mut map = RotBitmapLayer::new(map);
        map.set_src_ic(MAP_SRC_IC);
        map.center_on(SCREEN_CENTER);

        let label = TextLayer::new(
            Rectangle::new(LABEL_START, LABEL_SIZE),
            LABEL_TEXT_COLOR,
            LABEL_BACKGROUND,
        );

        let markers = MarkerLayer::new(
            SCREEN_CENTER.x,
            SCREEN_CENTER.y,
            SCREEN_HEIGHT as i32,
            MARKER_COLOR,
        );

        Self { tz, map, label, markers }
    }

    pub fn timezone(&self) -> TimezoneOffset {
        self.tz
    }

    /// Recompute everything for `time` and apply it to the layers.
    pub fn handle_tick(&mut self, time: &WallClockTime) -> TickFrame {
        let frame = compute_tick(time, self.tz);

        self.map.set_angle(frame.angle.for_map_layer());
        self.label.set_origin(frame.label_origin);
        self.label.set_text(frame.label_text.clone());

        log::debug!(
            "tick {} angle {} sector {} label at ({}, {})",
            frame.label_text,
            frame.angle.0,
            frame.quadrant.get(),
            frame.label_origin.x,
            frame.label_origin.y,
        );
        frame
    }

    /// Angle currently applied to the map layer.
    pub fn map_angle(&self) -> i32 {
        self.map.angle()
    }

    pub fn map_frame(&self) -> Rectangle {
        self.map.frame()
    }

    pub fn label_origin(&self) -> Point {
        self.label.frame().top_left
    }

    pub fn label_text(&self) -> &str {
        self.label.text()
    }

    /// Background, map, markers, then the label on top.
    pub fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        target.clear(BACKGROUND)?;
        self.map.draw(target)?;
        self.markers.draw(target)?;
        self.label.draw(target)
    }
}
