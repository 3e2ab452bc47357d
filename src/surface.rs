use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Line, PrimitiveStyle},
    text::{Baseline, Text},
};

use crate::bitmap::Bitmap;

/// Black on the panel.
pub const INK: BinaryColor = BinaryColor::On;
/// White on the panel.
pub const PAPER: BinaryColor = BinaryColor::Off;

pub const TEXT_FONT: &MonoFont<'static> = &profont::PROFONT_12_POINT;

/// Clockwise rotation of the logical drawing area relative to the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

/// A page-buffered monochrome display.
///
/// A frame is drawn as
/// `first_page(); loop { draw everything; if !next_page() { break } }`: a
/// surface that only buffers part of the panel asks for the draw sequence once
/// per band and flushes each band in `next_page`.
pub trait DisplaySurface {
    fn width(&self) -> i32;
    fn height(&self) -> i32;
    fn set_rotation(&mut self, rotation: Rotation);
    fn set_full_window(&mut self);
    fn first_page(&mut self);
    /// Flush the current page; `true` while more pages remain.
    fn next_page(&mut self) -> bool;
    fn fill_screen(&mut self, color: BinaryColor);
    fn draw_line(&mut self, from: Point, to: Point, color: BinaryColor);
    /// Draw the set bits of `bitmap` with `color`; clear bits are transparent.
    fn draw_bitmap(&mut self, origin: Point, bitmap: &Bitmap, color: BinaryColor);
    /// Baseline position of the next `print`.
    fn set_cursor(&mut self, cursor: Point);
    /// Draw `text` in ink at the cursor and advance the cursor past it.
    fn print(&mut self, text: &str);
    /// Put the display controller into its lowest power state.
    fn hibernate(&mut self);
}

/// Draw-call state shared by the concrete surfaces: any embedded-graphics
/// target whose colors can be made from [`BinaryColor`], plus a text cursor.
pub struct Canvas<D> {
    target: D,
    cursor: Point,
}

impl<D> Canvas<D>
where
    D: DrawTarget,
    D::Color: From<BinaryColor>,
{
    pub fn new(target: D) -> Self {
        Self {
            target,
            cursor: Point::zero(),
        }
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut D {
        &mut self.target
    }

    #[cfg(test)]
    pub fn cursor(&self) -> Point {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: Point) {
        self.cursor = cursor;
    }

    pub fn fill(&mut self, color: BinaryColor) {
        self.target.clear(color.into()).ok();
    }

    pub fn line(&mut self, from: Point, to: Point, color: BinaryColor) {
        Line::new(from, to)
            .into_styled(PrimitiveStyle::with_stroke(color.into(), 1))
            .draw(&mut self.target)
            .ok();
    }

    pub fn bitmap(&mut self, origin: Point, bitmap: &Bitmap, color: BinaryColor) {
        self.target
            .draw_iter(bitmap.pixels(origin, D::Color::from(color)))
            .ok();
    }

    pub fn print(&mut self, text: &str) {
        let style = MonoTextStyle::new(TEXT_FONT, D::Color::from(INK));
        if let Ok(next) =
            Text::with_baseline(text, self.cursor, style, Baseline::Alphabetic).draw(&mut self.target)
        {
            self.cursor = next;
        }
    }
}
