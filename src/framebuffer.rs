use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::Rectangle,
    Pixel,
};
use log::debug;

use crate::bitmap::Bitmap;
use crate::surface::{Canvas, DisplaySurface, Rotation};

/// 1-bpp framebuffer in native panel orientation (set bit = ink).
/// Drawing happens in logical coordinates and is rotated on write, with the
/// same quarter-turn mapping GFX-style panel drivers use.
pub struct Framebuffer {
    buf: Vec<u8>,
    width: u32,
    height: u32,
    rotation: Rotation,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let bytes = width.div_ceil(8) as usize * height as usize;
        Self {
            buf: vec![0; bytes],
            width,
            height,
            rotation: Rotation::Deg0,
        }
    }

    #[cfg(test)]
    pub fn native_size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    pub fn clear_color(&mut self, color: BinaryColor) {
        let fill = if color.is_on() { 0xFF } else { 0x00 };
        self.buf.fill(fill);
    }

    /// Map a logical point to a native one, or `None` when off-screen.
    fn to_native(&self, point: Point) -> Option<(u32, u32)> {
        let logical = self.size();
        if point.x < 0
            || point.y < 0
            || point.x as u32 >= logical.width
            || point.y as u32 >= logical.height
        {
            return None;
        }
        let (x, y) = (point.x as u32, point.y as u32);
        Some(match self.rotation {
            Rotation::Deg0 => (x, y),
            Rotation::Deg90 => (self.width - 1 - y, x),
            Rotation::Deg180 => (self.width - 1 - x, self.height - 1 - y),
            Rotation::Deg270 => (y, self.height - 1 - x),
        })
    }

    fn bit_index(&self, x: u32, y: u32) -> (usize, u8) {
        let stride = self.width.div_ceil(8) as usize;
        (y as usize * stride + x as usize / 8, 0x80 >> (x % 8))
    }

    fn set_native(&mut self, x: u32, y: u32, color: BinaryColor) {
        let (idx, mask) = self.bit_index(x, y);
        if color.is_on() {
            self.buf[idx] |= mask;
        } else {
            self.buf[idx] &= !mask;
        }
    }

    /// Logical pixel; off-screen reads as paper.
    pub fn pixel(&self, point: Point) -> BinaryColor {
        match self.to_native(point) {
            Some((x, y)) => {
                let (idx, mask) = self.bit_index(x, y);
                BinaryColor::from(self.buf[idx] & mask != 0)
            }
            None => BinaryColor::Off,
        }
    }

    pub fn ink_count(&self) -> usize {
        let size = self.size();
        (0..size.height as i32)
            .flat_map(|y| (0..size.width as i32).map(move |x| Point::new(x, y)))
            .filter(|&p| self.pixel(p).is_on())
            .count()
    }

    /// Binary PBM (P4) of the logical image; ink is black.
    pub fn to_pbm(&self) -> Vec<u8> {
        let size = self.size();
        let mut out = format!("P4\n{} {}\n", size.width, size.height).into_bytes();
        let row_bytes = size.width.div_ceil(8) as usize;
        for y in 0..size.height as i32 {
            let mut row = vec![0u8; row_bytes];
            for x in 0..size.width as i32 {
                if self.pixel(Point::new(x, y)).is_on() {
                    row[x as usize / 8] |= 0x80 >> (x % 8);
                }
            }
            out.extend_from_slice(&row);
        }
        out
    }
}

impl OriginDimensions for Framebuffer {
    /// Logical size: native size with the axes swapped for quarter turns.
    fn size(&self) -> Size {
        if self.rotation.swaps_axes() {
            Size::new(self.height, self.width)
        } else {
            Size::new(self.width, self.height)
        }
    }
}

impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let Some((x, y)) = self.to_native(point) {
                self.set_native(x, y, color);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.clear_color(color);
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        for point in area.points() {
            if let Some((x, y)) = self.to_native(point) {
                self.set_native(x, y, color);
            }
        }
        Ok(())
    }
}

// ── Surface ─────────────────────────────────────────────────────────

/// Whole-frame surface over a [`Framebuffer`]: one page per frame. Used by
/// the host simulator and tests.
pub struct FramebufferSurface {
    canvas: Canvas<Framebuffer>,
    full_window: bool,
    hibernated: bool,
    frames_committed: u32,
}

impl FramebufferSurface {
    pub fn new(native_width: u32, native_height: u32) -> Self {
        Self {
            canvas: Canvas::new(Framebuffer::new(native_width, native_height)),
            full_window: false,
            hibernated: false,
            frames_committed: 0,
        }
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        self.canvas.target()
    }

    pub fn is_hibernated(&self) -> bool {
        self.hibernated
    }

    pub fn is_full_window(&self) -> bool {
        self.full_window
    }

    pub fn frames_committed(&self) -> u32 {
        self.frames_committed
    }
}

impl DisplaySurface for FramebufferSurface {
    fn width(&self) -> i32 {
        self.framebuffer().size().width as i32
    }

    fn height(&self) -> i32 {
        self.framebuffer().size().height as i32
    }

    fn set_rotation(&mut self, rotation: Rotation) {
        self.canvas.target_mut().set_rotation(rotation);
    }

    fn set_full_window(&mut self) {
        self.full_window = true;
    }

    fn first_page(&mut self) {
        if self.hibernated {
            debug!("Framebuffer surface woken from hibernation");
            self.hibernated = false;
        }
    }

    fn next_page(&mut self) -> bool {
        self.frames_committed += 1;
        debug!("Frame {} committed", self.frames_committed);
        false
    }

    fn fill_screen(&mut self, color: BinaryColor) {
        self.canvas.fill(color);
    }

    fn draw_line(&mut self, from: Point, to: Point, color: BinaryColor) {
        self.canvas.line(from, to, color);
    }

    fn draw_bitmap(&mut self, origin: Point, bitmap: &Bitmap, color: BinaryColor) {
        self.canvas.bitmap(origin, bitmap, color);
    }

    fn set_cursor(&mut self, cursor: Point) {
        self.canvas.set_cursor(cursor);
    }

    fn print(&mut self, text: &str) {
        self.canvas.print(text);
    }

    fn hibernate(&mut self) {
        self.hibernated = true;
    }
}
