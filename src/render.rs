use log::info;

use crate::layout::Layout;
use crate::surface::{DisplaySurface, Rotation, INK, PAPER};
use crate::weather::WeatherRecord;
use crate::weather_icons::{weather_bitmap, IconSize, THERMOMETER, UMBRELLA};

/// Landscape orientation, whole panel as the update window.
pub fn init_display<S: DisplaySurface + ?Sized>(surface: &mut S) {
    surface.set_rotation(Rotation::Deg90);
    surface.set_full_window();
    info!(
        "Display initialized ({}x{})",
        surface.width(),
        surface.height()
    );
}

pub fn clear_screen<S: DisplaySurface + ?Sized>(surface: &mut S) {
    surface.first_page();
    loop {
        surface.fill_screen(PAPER);
        if !surface.next_page() {
            break;
        }
    }
}

/// Render one weather frame and hibernate the panel.
pub fn draw_weather<S: DisplaySurface + ?Sized>(surface: &mut S, record: &WeatherRecord) {
    let layout = Layout::compute(surface.width(), surface.height());

    surface.first_page();
    loop {
        draw_frame(surface, &layout, record);
        if !surface.next_page() {
            break;
        }
    }
    surface.hibernate();
    info!("Weather frame drawn, display hibernated");
}

fn draw_frame<S: DisplaySurface + ?Sized>(surface: &mut S, layout: &Layout, record: &WeatherRecord) {
    surface.fill_screen(PAPER);

    // Current conditions
    let current = &record.current;
    surface.draw_bitmap(
        layout.large_icon,
        weather_bitmap(&current.icon, IconSize::Large),
        INK,
    );

    surface.draw_bitmap(layout.thermometer_icon, &THERMOMETER, INK);
    surface.set_cursor(layout.temperature_cursor);
    surface.print(&temperature_text(current.temperature));

    surface.draw_bitmap(layout.umbrella_icon, &UMBRELLA, INK);
    surface.set_cursor(layout.precipitation_cursor);
    surface.print(&precipitation_text(current.precip_probability));

    let (top, bottom) = layout.divider;
    surface.draw_line(top, bottom, INK);

    // Forecast column
    for (i, (row, reading)) in layout.rows.iter().zip(&record.hourly).enumerate() {
        surface.draw_bitmap(row.icon, weather_bitmap(&reading.icon, IconSize::Small), INK);

        surface.set_cursor(row.label_cursor);
        surface.print(&forecast_label(i));

        surface.set_cursor(row.temperature_cursor);
        surface.print(&forecast_temperature_text(reading.temperature));

        if let Some((from, to)) = row.separator {
            surface.draw_line(from, to, INK);
        }
    }
}

// ── Text ────────────────────────────────────────────────────────────

/// One decimal place: `12.3C`.
pub fn temperature_text(temperature: f32) -> String {
    format!("{:.1}C", temperature)
}

/// Probability in 0..1 as a rounded whole percent: `50%`.
pub fn precipitation_text(probability: f32) -> String {
    format!("{}%", (probability * 100.0).round() as i32)
}

/// `+3h`, `+6h`, `+9h`.
pub fn forecast_label(slot: usize) -> String {
    format!("+{}h", (slot + 1) * 3)
}

pub fn forecast_temperature_text(temperature: f32) -> String {
    format!("{}C", temperature.round() as i32)
}
