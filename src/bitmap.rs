use embedded_graphics::{pixelcolor::PixelColor, prelude::*, Pixel};

/// Packed 1-bpp image: rows MSB first, each row padded to a whole byte.
/// Only set bits are drawn; clear bits leave the target untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub data: &'static [u8],
}

impl Bitmap {
    pub const fn new(width: u32, height: u32, data: &'static [u8]) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    pub const fn bytes_per_row(&self) -> usize {
        (self.width as usize + 7) / 8
    }

    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Whether `data` holds exactly the bytes the dimensions call for.
    pub fn is_well_formed(&self) -> bool {
        self.data.len() == self.bytes_per_row() * self.height as usize
    }

    pub fn is_set(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = y as usize * self.bytes_per_row() + x as usize / 8;
        self.data
            .get(idx)
            .is_some_and(|byte| byte & (0x80 >> (x % 8)) != 0)
    }

    /// Set bits as pixels of `color`, offset by `origin`.
    pub fn pixels<'a, C: PixelColor + 'a>(
        &'a self,
        origin: Point,
        color: C,
    ) -> impl Iterator<Item = Pixel<C>> + 'a {
        (0..self.height).flat_map(move |y| {
            (0..self.width)
                .filter(move |&x| self.is_set(x, y))
                .map(move |x| Pixel(origin + Point::new(x as i32, y as i32), color))
        })
    }

    pub fn set_count(&self) -> usize {
        (0..self.height)
            .map(|y| (0..self.width).filter(|&x| self.is_set(x, y)).count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::BinaryColor;

    // 10 px wide: two bytes per row, the last 6 bits of each row are padding.
    static CHECKER: [u8; 6] = [
        0b1010_1010, 0b1011_1111, //
        0b0101_0101, 0b0100_0000, //
        0b0000_0000, 0b0000_0000, //
    ];

    #[test]
    fn rows_are_padded_to_bytes() {
        let bitmap = Bitmap::new(10, 3, &CHECKER);
        assert_eq!(bitmap.bytes_per_row(), 2);
        assert!(bitmap.is_well_formed());
        assert!(!Bitmap::new(10, 4, &CHECKER).is_well_formed());
    }

    #[test]
    fn bits_are_read_msb_first() {
        let bitmap = Bitmap::new(10, 3, &CHECKER);
        assert!(bitmap.is_set(0, 0));
        assert!(!bitmap.is_set(1, 0));
        assert!(bitmap.is_set(8, 0));
        assert!(!bitmap.is_set(9, 0));
        assert!(bitmap.is_set(9, 1));
        assert!(!bitmap.is_set(0, 2));
    }

    #[test]
    fn padding_bits_are_never_drawn() {
        let bitmap = Bitmap::new(10, 3, &CHECKER);
        assert!(!bitmap.is_set(10, 0));
        assert!(!bitmap.is_set(0, 3));
        assert_eq!(bitmap.set_count(), 10);
    }

    #[test]
    fn pixels_are_offset_by_origin() {
        let bitmap = Bitmap::new(10, 3, &CHECKER);
        let pixels: Vec<_> = bitmap
            .pixels(Point::new(100, 50), BinaryColor::On)
            .collect();
        assert_eq!(pixels.len(), 10);
        assert_eq!(pixels[0], Pixel(Point::new(100, 50), BinaryColor::On));
        assert!(pixels.contains(&Pixel(Point::new(109, 51), BinaryColor::On)));
        assert!(pixels.iter().all(|Pixel(p, _)| p.y < 52));
    }

    fn collect_in<C: PixelColor>(bitmap: &Bitmap, color: C) -> Vec<Pixel<C>> {
        bitmap.pixels(Point::zero(), color).collect()
    }

    #[test]
    fn pixels_take_any_color_type() {
        use embedded_graphics::pixelcolor::{Rgb565, RgbColor};

        let local = Bitmap::new(10, 3, &CHECKER);
        let pixels = collect_in(&local, Rgb565::RED);
        assert_eq!(pixels.len(), local.set_count());
        assert!(pixels.iter().all(|Pixel(_, c)| *c == Rgb565::RED));
    }
}
