use anyhow::{anyhow, Result};
use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};
use epd_waveshare::{
    epd2in9_v2::{Display2in9, Epd2in9},
    prelude::{DisplayRotation, WaveshareDisplay},
};
use esp_idf_hal::delay::Delay;
use esp_idf_hal::gpio::{AnyIOPin, AnyInputPin, AnyOutputPin, Input, Output, PinDriver};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::spi::{config::Config, SpiAnyPins, SpiDeviceDriver, SpiDriver, SpiDriverConfig};
use esp_idf_hal::units::FromValueType;
use log::{debug, info, warn};

use crate::bitmap::Bitmap;
use crate::config::DisplayPins;
use crate::surface::{Canvas, DisplaySurface, Rotation};

const SPI_BAUDRATE_MHZ: u32 = 4;

type EpdSpi = SpiDeviceDriver<'static, SpiDriver<'static>>;
type Panel = Epd2in9<
    EpdSpi,
    PinDriver<'static, AnyInputPin, Input>,
    PinDriver<'static, AnyOutputPin, Output>,
    PinDriver<'static, AnyOutputPin, Output>,
    Delay,
>;

/// Waveshare 2.9" (V2) panel. The whole frame is buffered in RAM, so every
/// frame is a single page pushed by `next_page`.
pub struct EpdSurface {
    spi: EpdSpi,
    epd: Panel,
    canvas: Canvas<Display2in9>,
    delay: Delay,
    asleep: bool,
}

impl EpdSurface {
    pub fn new<SPI: SpiAnyPins>(
        spi: impl Peripheral<P = SPI> + 'static,
        pins: &DisplayPins,
    ) -> Result<Self> {
        // SAFETY: the pin numbers come from the board wiring in `DisplayPins`
        // and are not claimed anywhere else.
        let (sclk, mosi, cs, dc, rst, busy) = unsafe {
            (
                AnyOutputPin::new(pins.sclk),
                AnyOutputPin::new(pins.mosi),
                AnyOutputPin::new(pins.cs),
                AnyOutputPin::new(pins.dc),
                AnyOutputPin::new(pins.rst),
                AnyInputPin::new(pins.busy),
            )
        };

        let spi_config = Config::new().baudrate(SPI_BAUDRATE_MHZ.MHz().into());
        let mut spi = SpiDeviceDriver::new_single(
            spi,
            sclk,
            mosi,
            Option::<AnyIOPin>::None,
            Some(cs),
            &SpiDriverConfig::new(),
            &spi_config,
        )?;

        let busy = PinDriver::input(busy)?;
        let dc = PinDriver::output(dc)?;
        let rst = PinDriver::output(rst)?;
        let mut delay = Delay::new_default();

        let epd = Epd2in9::new(&mut spi, busy, dc, rst, &mut delay, None)
            .map_err(|e| anyhow!("EPD init failed: {:?}", e))?;
        info!(
            "EPD 2.9\" initialized (cs={} dc={} rst={} busy={})",
            pins.cs, pins.dc, pins.rst, pins.busy
        );

        Ok(Self {
            spi,
            epd,
            canvas: Canvas::new(Display2in9::default()),
            delay,
            asleep: false,
        })
    }
}

impl DisplaySurface for EpdSurface {
    fn width(&self) -> i32 {
        self.canvas.target().size().width as i32
    }

    fn height(&self) -> i32 {
        self.canvas.target().size().height as i32
    }

    fn set_rotation(&mut self, rotation: Rotation) {
        self.canvas.target_mut().set_rotation(match rotation {
            Rotation::Deg0 => DisplayRotation::Rotate0,
            Rotation::Deg90 => DisplayRotation::Rotate90,
            Rotation::Deg180 => DisplayRotation::Rotate180,
            Rotation::Deg270 => DisplayRotation::Rotate270,
        });
    }

    fn set_full_window(&mut self) {
        // Full refresh is the driver default; the buffer always covers the panel.
        debug!("EPD full window");
    }

    fn first_page(&mut self) {
        if self.asleep {
            match self.epd.wake_up(&mut self.spi, &mut self.delay) {
                Ok(()) => self.asleep = false,
                Err(e) => warn!("EPD wake failed: {:?}", e),
            }
        }
    }

    fn next_page(&mut self) -> bool {
        if let Err(e) = self.epd.update_and_display_frame(
            &mut self.spi,
            self.canvas.target().buffer(),
            &mut self.delay,
        ) {
            warn!("EPD frame update failed: {:?}", e);
        }
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
        match self.epd.sleep(&mut self.spi, &mut self.delay) {
            Ok(()) => {
                self.asleep = true;
                info!("EPD hibernating");
            }
            Err(e) => warn!("EPD sleep failed: {:?}", e),
        }
    }
}
