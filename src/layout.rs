use embedded_graphics::prelude::*;

use crate::weather::HOURLY_READINGS;

// ── Panel ───────────────────────────────────────────────────────────

/// Native panel dimensions (portrait, as the controller addresses it).
pub const PANEL_WIDTH: u32 = 128;
pub const PANEL_HEIGHT: u32 = 296;

/// Logical dimensions after the 90° rotation used for drawing.
pub const SCREEN_WIDTH: u32 = PANEL_HEIGHT;
pub const SCREEN_HEIGHT: u32 = PANEL_WIDTH;

// ── Layout constants ────────────────────────────────────────────────

pub const LARGE_ICON_SIZE: i32 = 100;
pub const SMALL_ICON_SIZE: i32 = 35;
pub const FORECAST_ICON_SIZE: i32 = 35;

pub const GAP_BETWEEN_PAIRS: i32 = 20;
pub const GAP_BELOW_LARGE: i32 = 10;
/// Room reserved for the text of an icon + text pair.
pub const PAIR_TEXT_WIDTH: i32 = 40;
/// Assumed advance of the temperature text before the precipitation pair.
pub const TEMPERATURE_TEXT_ADVANCE: i32 = 38;
const ICON_TEXT_GAP: i32 = 2;
/// Pull text and the umbrella left, towards the preceding icon.
const PAIR_NUDGE: i32 = 5;
/// Pair icons sit above the text baseline.
const PAIR_ICON_RISE: i32 = 15;
const PAIR_BASELINE_DROP: i32 = 5;
/// Large icon is lifted from mid-height by `small - LARGE_ICON_LIFT_SLACK`.
const LARGE_ICON_LIFT_SLACK: i32 = 15;

pub const ROW_HEIGHT: i32 = 40;
pub const ROW_TOP_OFFSET: i32 = 5;
const RIGHT_COLUMN_PADDING: i32 = 10;
const FORECAST_TEXT_GAP: i32 = 10;
const LABEL_BASELINE: i32 = 12;
const ROW_TEMPERATURE_BASELINE: i32 = 28;
const SEPARATOR_INSET: i32 = 5;

pub const fn left_column_width(width: i32) -> i32 {
    width * 2 / 3
}

/// Everything placed in one forecast row of the right column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLayout {
    pub icon: Point,
    pub label_cursor: Point,
    pub temperature_cursor: Point,
    /// Horizontal rule under the row; absent for the last row.
    pub separator: Option<(Point, Point)>,
}

/// Screen coordinates of every element of the weather frame. Text positions
/// are baseline cursors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub width: i32,
    pub height: i32,
    pub left_width: i32,
    pub divider: (Point, Point),
    pub large_icon: Point,
    pub thermometer_icon: Point,
    pub temperature_cursor: Point,
    pub umbrella_icon: Point,
    pub precipitation_cursor: Point,
    pub rows: [RowLayout; HOURLY_READINGS],
}

impl Layout {
    /// Pure function of the screen size.
    pub fn compute(width: i32, height: i32) -> Self {
        let left_width = left_column_width(width);
        let center_x = left_width / 2;

        let large_icon_y =
            height / 2 - LARGE_ICON_SIZE / 2 - SMALL_ICON_SIZE + LARGE_ICON_LIFT_SLACK;
        let pairs_y = large_icon_y + LARGE_ICON_SIZE + GAP_BELOW_LARGE;

        let pair_width = SMALL_ICON_SIZE + PAIR_TEXT_WIDTH;
        let total_pair_width = pair_width * 2 + GAP_BETWEEN_PAIRS;
        let start_x = center_x - total_pair_width / 2;

        let temp_icon_x = start_x;
        let temp_text_x = temp_icon_x + SMALL_ICON_SIZE + ICON_TEXT_GAP;
        let precip_icon_x = temp_text_x + TEMPERATURE_TEXT_ADVANCE + GAP_BETWEEN_PAIRS;
        let precip_text_x = precip_icon_x + SMALL_ICON_SIZE + ICON_TEXT_GAP;

        let pair_icon_y = pairs_y - PAIR_ICON_RISE;
        let pair_text_y = pairs_y + PAIR_BASELINE_DROP;

        let right_x = left_width + RIGHT_COLUMN_PADDING;
        let text_x = right_x + FORECAST_ICON_SIZE + FORECAST_TEXT_GAP;
        let rows = core::array::from_fn(|i| {
            let y = ROW_TOP_OFFSET + i as i32 * ROW_HEIGHT;
            let line_y = y + ROW_HEIGHT - SEPARATOR_INSET;
            RowLayout {
                icon: Point::new(right_x, y),
                label_cursor: Point::new(text_x, y + LABEL_BASELINE),
                temperature_cursor: Point::new(text_x, y + ROW_TEMPERATURE_BASELINE),
                separator: (i + 1 < HOURLY_READINGS).then(|| {
                    (
                        Point::new(left_width + SEPARATOR_INSET, line_y),
                        Point::new(width, line_y),
                    )
                }),
            }
        });

        Self {
            width,
            height,
            left_width,
            divider: (Point::new(left_width, 0), Point::new(left_width, height)),
            large_icon: Point::new(center_x - LARGE_ICON_SIZE / 2, large_icon_y),
            thermometer_icon: Point::new(temp_icon_x, pair_icon_y),
            temperature_cursor: Point::new(temp_text_x - PAIR_NUDGE, pair_text_y),
            umbrella_icon: Point::new(precip_icon_x - PAIR_NUDGE, pair_icon_y),
            precipitation_cursor: Point::new(precip_text_x - PAIR_NUDGE, pair_text_y),
            rows,
        }
    }

    pub fn for_size(size: Size) -> Self {
        Self::compute(size.width as i32, size.height as i32)
    }
}
