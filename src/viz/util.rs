//! Utility functions for visualization: colors, locale mapping, grid layout.

use num_format::{Locale, ToFormattedString};
use plotters::prelude::*;

/// Microsoft Office (2013+) chart series palette.
/// Order: Blue, Orange, Gray, Gold, Light Blue, Green, Dark Blue, Dark Orange, Dark Gray, Brownish Gold.
const OFFICE10: [RGBColor; 10] = [
    RGBColor(68, 114, 196),  // blue      (#4472C4)
    RGBColor(237, 125, 49),  // orange    (#ED7D31)
    RGBColor(165, 165, 165), // gray      (#A5A5A5)
    RGBColor(255, 192, 0),   // gold      (#FFC000)
    RGBColor(91, 155, 213),  // light blue(#5B9BD5)
    RGBColor(112, 173, 71),  // green     (#70AD47)
    RGBColor(38, 68, 120),   // dark blue (#264478)
    RGBColor(158, 72, 14),   // dark org. (#9E480E)
    RGBColor(99, 99, 99),    // dark gray (#636363)
    RGBColor(153, 115, 0),   // brownish  (#997300)
];

/// Get a color from the Office palette.
#[inline]
pub fn office_color(idx: usize) -> RGBAColor {
    OFFICE10[idx % OFFICE10.len()].to_rgba()
}

/// ColorBrewer YlGnBu, 9 classes, light to dark.
const YLGNBU: [(u8, u8, u8); 9] = [
    (255, 255, 217), // #FFFFD9
    (237, 248, 177), // #EDF8B1
    (199, 233, 180), // #C7E9B4
    (127, 205, 187), // #7FCDBB
    (65, 182, 196),  // #41B6C4
    (29, 145, 192),  // #1D91C0
    (34, 94, 168),   // #225EA8
    (37, 52, 148),   // #253494
    (8, 29, 88),     // #081D58
];

/// Continuous YlGnBu colour at `t` in `[0, 1]` (values outside are clamped).
pub fn ylgnbu(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let pos = t * (YLGNBU.len() - 1) as f64;
    let i = (pos.floor() as usize).min(YLGNBU.len() - 2);
    let f = pos - i as f64;
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
    let (a, b) = (YLGNBU[i], YLGNBU[i + 1]);
    RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

/// Black or white, whichever reads better on `bg`.
pub fn contrast_text_color(bg: RGBColor) -> RGBColor {
    let luma = 0.299 * bg.0 as f64 + 0.587 * bg.1 as f64 + 0.114 * bg.2 as f64;
    if luma < 140.0 { WHITE } else { BLACK }
}

/// Named colours used by chart specs ("gray", "crimson"); unknown names fall back to gray.
pub fn named_color(name: &str) -> RGBColor {
    match name.to_ascii_lowercase().as_str() {
        "crimson" => RGBColor(220, 20, 60),
        "black" => BLACK,
        "blue" => RGBColor(68, 114, 196),
        _ => RGBColor(128, 128, 128),
    }
}

/// Map a user-provided locale tag to a `num_format::Locale`.
///
/// Supported tags (case-insensitive): `en`, `us`, `en_US`, `de`, `de_DE`, `german`,
/// `fr`, `es`, `it`, `pt`, `nl`. Defaults to English.
pub fn map_locale(tag: &str) -> &'static Locale {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => &Locale::de,
        "fr" | "fr_fr" => &Locale::fr,
        "es" | "es_es" => &Locale::es,
        "it" | "it_it" => &Locale::it,
        "pt" | "pt_pt" | "pt_br" => &Locale::pt,
        "nl" | "nl_nl" => &Locale::nl,
        _ => &Locale::en, // default
    }
}

/// Count with locale thousands separators (`12,345` vs `12.345`).
pub fn format_count(v: usize, locale: &Locale) -> String {
    v.to_formatted_string(locale)
}

/// Columns/rows for laying out `n` equal tiles in a `w`×`h` pixel area so that tiles
/// stay roughly square.
pub fn grid_dims(n: usize, w: u32, h: u32) -> (usize, usize) {
    if n == 0 {
        return (0, 0);
    }
    let aspect = (w.max(1) as f64) / (h.max(1) as f64);
    let cols = ((n as f64 * aspect).sqrt().ceil() as usize).clamp(1, n);
    let rows = n.div_ceil(cols);
    (cols, rows)
}
