//! Text measurement and truncation for tile and axis labels.

/// Heuristic: estimate pixel width of text (Plotters has no built-in text measuring).
pub fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    ((text.chars().count() as f32) * (font_px as f32) * 0.60).ceil() as u32
}

/// Truncate to fit `max_px` and add a single ellipsis if needed.
pub fn truncate_to_width(text: &str, font_px: u32, max_px: u32) -> String {
    if estimate_text_width_px(text, font_px) <= max_px {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        let candidate = format!("{out}{ch}…");
        if estimate_text_width_px(&candidate, font_px) > max_px {
            break;
        }
        out.push(ch);
    }
    if out.is_empty() {
        return String::new();
    }
    out.push('…');
    out
}

/// Font size that lets `text` fit `max_px`, shrinking from `start_px` down to `min_px`.
pub fn fit_font_px(text: &str, start_px: u32, min_px: u32, max_px: u32) -> u32 {
    let mut px = start_px;
    while px > min_px && estimate_text_width_px(text, px) > max_px {
        px -= 1;
    }
    px
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_to_width("Oman", 12, 200), "Oman");
    }

    #[test]
    fn long_text_gets_one_ellipsis() {
        let s = truncate_to_width("United Arab Emirates", 12, 60);
        assert!(s.ends_with('…'));
        assert_eq!(s.matches('…').count(), 1);
        assert!(estimate_text_width_px(&s, 12) <= 60);
    }

    #[test]
    fn nothing_fits() {
        assert_eq!(truncate_to_width("Libya", 12, 4), "");
    }

    #[test]
    fn font_shrinks_to_fit() {
        let px = fit_font_px("Saudi Arabia", 16, 8, 60);
        assert!(px < 16);
        assert!(px >= 8);
    }
}
