//! Continuous colour-bar legend for the map-style charts.

use anyhow::{Result, anyhow};
use num_format::Locale;
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::util::{format_count, ylgnbu};
use crate::chart::ValueDomain;

/// Height in pixels reserved below a map for [`draw_color_bar`].
pub const COLOR_BAR_BAND_PX: i32 = 56;

const STEPS: i32 = 64;

/// Draw a horizontal YlGnBu gradient for `domain` with min/max tick labels,
/// centered in `area`, captioned with the value column name.
pub fn draw_color_bar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    domain: ValueDomain,
    caption: &str,
    locale: &Locale,
) -> Result<()> {
    let (w, h) = area.dim_in_pixel();
    let (w, h) = (w as i32, h as i32);
    let bar_w = (w * 2 / 5).max(STEPS);
    let bar_h = 12;
    let x0 = (w - bar_w) / 2;
    let y0 = (h - bar_h) / 2;

    let step_w = bar_w as f64 / STEPS as f64;
    for i in 0..STEPS {
        let t = i as f64 / (STEPS - 1) as f64;
        let left = x0 + (i as f64 * step_w).floor() as i32;
        let right = x0 + ((i + 1) as f64 * step_w).ceil() as i32;
        area.draw(&Rectangle::new(
            [(left, y0), (right, y0 + bar_h)],
            ylgnbu(t).filled(),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    }
    area.draw(&Rectangle::new(
        [(x0, y0), (x0 + bar_w, y0 + bar_h)],
        BLACK.stroke_width(1),
    ))
    .map_err(|e| anyhow!("{:?}", e))?;

    let label = |anchor: HPos| {
        TextStyle::from((FontFamily::SansSerif, 12))
            .color(&BLACK)
            .pos(Pos::new(anchor, VPos::Center))
    };
    area.draw(&Text::new(
        format_count(domain.min, locale),
        (x0 - 8, y0 + bar_h / 2),
        label(HPos::Right),
    ))
    .map_err(|e| anyhow!("{:?}", e))?;
    area.draw(&Text::new(
        format_count(domain.max, locale),
        (x0 + bar_w + 8, y0 + bar_h / 2),
        label(HPos::Left),
    ))
    .map_err(|e| anyhow!("{:?}", e))?;
    area.draw(&Text::new(
        caption.to_string(),
        (w / 2, y0 - 4),
        TextStyle::from((FontFamily::SansSerif, 12))
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Bottom)),
    ))
    .map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}
