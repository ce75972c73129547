//! Visualization: render any [`ChartSpec`] to **SVG** or **PNG**.
//!
//! - Bar and lollipop charts on a categorical Y axis (largest value on top)
//! - Choropleth and faceted choropleth as geometry-free tile maps on the YlGnBu scale
//! - Bubble map as a grid of circles sized by area
//! - Locale-aware count labels (`30,000` vs `30.000`)

pub mod legend;
pub mod text;
pub mod util;

use crate::chart::{
    BarSpec, BubbleSpec, ChartSpec, ChoroplethSpec, CountryValue, FacetedChoroplethSpec,
    LollipopSpec, ValueDomain,
};
use anyhow::{Result, anyhow};
use log::debug;
use num_format::Locale;

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::path::Path;
use std::sync::Once;

use legend::{COLOR_BAR_BAND_PX, draw_color_bar};
use text::{fit_font_px, truncate_to_width};
use util::{contrast_text_color, format_count, grid_dims, map_locale, named_color, office_color, ylgnbu};

/// One-time registration for a fallback "sans-serif" font when using the `ab_glyph` text path.
/// Required because `ab_glyph` doesn't discover OS fonts.
static INIT_FONTS: Once = Once::new();

fn ensure_fonts_registered() {
    INIT_FONTS.call_once(|| {
        let _ = plotters::style::register_font(
            "sans-serif",
            plotters::style::FontStyle::Normal,
            include_bytes!("../../assets/DejaVuSans.ttf"),
        );
    });
}

const MARGIN: i32 = 16;
const TITLE_PX: u32 = 24;

/// Render `spec` to `out_path`: SVG when the extension is `.svg`, PNG otherwise.
///
/// `locale_tag` controls thousands separators on count labels (e.g. "en", "de").
pub fn render_chart<P: AsRef<Path>>(
    spec: &ChartSpec,
    out_path: P,
    width: u32,
    height: u32,
    locale_tag: &str,
) -> Result<()> {
    if spec.is_empty() {
        return Err(anyhow!("no data to plot"));
    }
    ensure_fonts_registered();
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();
    let locale = map_locale(locale_tag);
    debug!("render {} to {}", spec.kind(), out_path.display());

    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_spec(&root, spec, locale)?;
        root.present().map_err(|e| anyhow!("{:?}", e))?;
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_spec(&root, spec, locale)?;
        root.present().map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(())
}

fn draw_spec<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &ChartSpec,
    locale: &Locale,
) -> Result<()> {
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
    match spec {
        ChartSpec::Bar(s) => draw_bar(root, s, locale),
        ChartSpec::Lollipop(s) => draw_lollipop(root, s, locale),
        ChartSpec::Choropleth(s) => draw_choropleth(root, s, locale),
        ChartSpec::Bubble(s) => draw_bubbles(root, s, locale),
        ChartSpec::FacetedChoropleth(s) => draw_faceted(root, s, locale),
    }
}

/// Left label area wide enough for the longest country name, clamped.
fn category_label_area_px(items: &[CountryValue]) -> i32 {
    let longest = items
        .iter()
        .map(|cv| text::estimate_text_width_px(&cv.country, 12))
        .max()
        .unwrap_or(0);
    (longest + 18).clamp(60, 220) as i32
}

/// Upper bound of the value axis with some headroom; never below 1.
fn value_axis_max(items: &[CountryValue]) -> f64 {
    let max = items.iter().map(|cv| cv.value).max().unwrap_or(0) as f64;
    (max * 1.08).max(1.0)
}

/// Horizontal bars; the ascending list is drawn bottom-up so the largest bar is on top.
fn draw_bar<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &BarSpec,
    locale: &Locale,
) -> Result<()> {
    let n = spec.bars.len();
    let names: Vec<&str> = spec.bars.iter().map(|cv| cv.country.as_str()).collect();
    let mut chart = ChartBuilder::on(root)
        .margin(MARGIN)
        .caption(&spec.title, (FontFamily::SansSerif, TITLE_PX))
        .set_label_area_size(LabelAreaPosition::Left, category_label_area_px(&spec.bars))
        .set_label_area_size(LabelAreaPosition::Bottom, 44)
        .build_cartesian_2d(0f64..value_axis_max(&spec.bars), (0usize..n).into_segmented())
        .map_err(|e| anyhow!("{:?}", e))?;

    let x_fmt = |v: &f64| format_count(v.round().max(0.0) as usize, locale);
    let y_fmt = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) => names.get(*i).map(|s| s.to_string()).unwrap_or_default(),
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc(spec.value_column.as_str())
        .y_labels(n + 1)
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 14))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let color = office_color(0);
    chart
        .draw_series(spec.bars.iter().enumerate().map(|(i, cv)| {
            let mut bar = Rectangle::new(
                [
                    (0.0, SegmentValue::Exact(i)),
                    (cv.value as f64, SegmentValue::Exact(i + 1)),
                ],
                color.filled(),
            );
            bar.set_margin(3, 3, 0, 0);
            bar
        }))
        .map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// Gray zero-to-value stems with crimson heads, same ordering as the bar chart.
fn draw_lollipop<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &LollipopSpec,
    locale: &Locale,
) -> Result<()> {
    let n = spec.heads.len();
    let names: Vec<&str> = spec.heads.iter().map(|cv| cv.country.as_str()).collect();
    let mut chart = ChartBuilder::on(root)
        .margin(MARGIN)
        .caption(&spec.title, (FontFamily::SansSerif, TITLE_PX))
        .set_label_area_size(LabelAreaPosition::Left, category_label_area_px(&spec.heads))
        .set_label_area_size(LabelAreaPosition::Bottom, 44)
        .build_cartesian_2d(0f64..value_axis_max(&spec.heads), (0usize..n).into_segmented())
        .map_err(|e| anyhow!("{:?}", e))?;

    let x_fmt = |v: &f64| format_count(v.round().max(0.0) as usize, locale);
    let y_fmt = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) => names.get(*i).map(|s| s.to_string()).unwrap_or_default(),
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc(spec.x_axis_title.as_str())
        .y_labels(n + 1)
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 14))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let stem = named_color(&spec.stem_style.color).stroke_width(spec.stem_style.width);
    chart
        .draw_series(spec.stems.iter().enumerate().map(|(i, s)| {
            PathElement::new(
                vec![
                    (s.from as f64, SegmentValue::CenterOf(i)),
                    (s.to as f64, SegmentValue::CenterOf(i)),
                ],
                stem.clone(),
            )
        }))
        .map_err(|e| anyhow!("{:?}", e))?;

    let head = named_color(&spec.head_style.color).filled();
    let radius = (spec.head_style.size as i32 / 2).max(2);
    chart
        .draw_series(spec.heads.iter().enumerate().map(|(i, cv)| {
            Circle::new((cv.value as f64, SegmentValue::CenterOf(i)), radius, head.clone())
        }))
        .map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// Title band on top, colour bar band at the bottom, the rest for tiles.
fn split_map_layout<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
) -> Result<(DrawingArea<DB, Shift>, DrawingArea<DB, Shift>)> {
    let body = root
        .margin(MARGIN, MARGIN, MARGIN, MARGIN)
        .titled(title, (FontFamily::SansSerif, TITLE_PX))
        .map_err(|e| anyhow!("{:?}", e))?;
    let (_, h) = body.dim_in_pixel();
    let split_at = (h as i32 - COLOR_BAR_BAND_PX).max(40);
    let (tiles, bar) = body.split_vertically(split_at);
    Ok((tiles, bar))
}

/// Lay out one labelled tile per country, coloured by the value's position in `domain`.
fn draw_tile_grid<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    values: &[CountryValue],
    domain: ValueDomain,
    locale: &Locale,
) -> Result<()> {
    let (w, h) = area.dim_in_pixel();
    let (cols, rows) = grid_dims(values.len(), w, h);
    if cols == 0 {
        return Ok(());
    }
    let gap = 4i32;
    let tile_w = (w as i32 - gap * (cols as i32 + 1)) / cols as i32;
    let tile_h = (h as i32 - gap * (rows as i32 + 1)) / rows as i32;
    if tile_w <= 0 || tile_h <= 0 {
        return Err(anyhow!("canvas too small for {} tiles", values.len()));
    }

    for (idx, cv) in values.iter().enumerate() {
        let (c, r) = ((idx % cols) as i32, (idx / cols) as i32);
        let x0 = gap + c * (tile_w + gap);
        let y0 = gap + r * (tile_h + gap);
        let fill = ylgnbu(domain.normalize(cv.value));
        area.draw(&Rectangle::new(
            [(x0, y0), (x0 + tile_w, y0 + tile_h)],
            fill.filled(),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
        area.draw(&Rectangle::new(
            [(x0, y0), (x0 + tile_w, y0 + tile_h)],
            RGBColor(200, 200, 200).stroke_width(1),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;

        let ink = contrast_text_color(fill);
        let font_px = fit_font_px(&cv.country, 14, 9, (tile_w - 6).max(1) as u32);
        let name = truncate_to_width(&cv.country, font_px, (tile_w - 6).max(1) as u32);
        let cx = x0 + tile_w / 2;
        let cy = y0 + tile_h / 2;
        area.draw(&Text::new(
            name,
            (cx, cy - font_px as i32 / 2 - 1),
            TextStyle::from((FontFamily::SansSerif, font_px))
                .color(&ink)
                .pos(Pos::new(HPos::Center, VPos::Center)),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
        area.draw(&Text::new(
            format_count(cv.value, locale),
            (cx, cy + font_px as i32 / 2 + 3),
            TextStyle::from((FontFamily::SansSerif, font_px))
                .color(&ink)
                .pos(Pos::new(HPos::Center, VPos::Center)),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(())
}

fn draw_choropleth<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &ChoroplethSpec,
    locale: &Locale,
) -> Result<()> {
    let (tiles, bar) = split_map_layout(root, &spec.title)?;
    draw_tile_grid(&tiles, &spec.values, spec.domain, locale)?;
    draw_color_bar(&bar, spec.domain, &spec.value_column, locale)
}

/// Panels side by side, one colour bar for the shared domain.
fn draw_faceted<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &FacetedChoroplethSpec,
    locale: &Locale,
) -> Result<()> {
    let (body, bar) = split_map_layout(root, &spec.title)?;
    let panels = body.split_evenly((1, spec.panels.len().max(1)));
    for (area, panel) in panels.iter().zip(&spec.panels) {
        let caption = format!("{} = {}", spec.facet_column, panel.key);
        let inner = area
            .titled(&caption, (FontFamily::SansSerif, 16))
            .map_err(|e| anyhow!("{:?}", e))?;
        draw_tile_grid(&inner, &panel.values, spec.domain, locale)?;
    }
    draw_color_bar(&bar, spec.domain, &spec.value_column, locale)
}

/// Circles on a grid, radius proportional to sqrt(value / max) so area tracks the count.
fn draw_bubbles<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &BubbleSpec,
    locale: &Locale,
) -> Result<()> {
    let body = root
        .margin(MARGIN, MARGIN, MARGIN, MARGIN)
        .titled(&spec.title, (FontFamily::SansSerif, TITLE_PX))
        .map_err(|e| anyhow!("{:?}", e))?;
    let (w, h) = body.dim_in_pixel();
    let (cols, rows) = grid_dims(spec.values.len(), w, h);
    let cell_w = w as i32 / cols.max(1) as i32;
    let cell_h = h as i32 / rows.max(1) as i32;
    let label_band = 30;
    let max_r = ((cell_w.min(cell_h - label_band)) / 2 - 2).max(2);
    let max_value = spec.max_value.max(1) as f64;
    let fill = office_color(0).mix(0.65).filled();
    let border = office_color(6).stroke_width(1);

    for (idx, cv) in spec.values.iter().enumerate() {
        let (c, r) = ((idx % cols) as i32, (idx / cols) as i32);
        let cx = c * cell_w + cell_w / 2;
        let cy = r * cell_h + (cell_h - label_band) / 2;
        let radius = ((cv.value as f64 / max_value).sqrt() * max_r as f64).round().max(2.0) as i32;
        body.draw(&Circle::new((cx, cy), radius, fill.clone()))
            .map_err(|e| anyhow!("{:?}", e))?;
        body.draw(&Circle::new((cx, cy), radius, border.clone()))
            .map_err(|e| anyhow!("{:?}", e))?;

        let font_px = 12;
        let label = format!("{} ({})", cv.country, format_count(cv.value, locale));
        let label = truncate_to_width(&label, font_px, (cell_w - 4).max(1) as u32);
        body.draw(&Text::new(
            label,
            (cx, r * cell_h + cell_h - label_band / 2),
            TextStyle::from((FontFamily::SansSerif, font_px))
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Center)),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(())
}
