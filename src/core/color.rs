//! Section palette and color fallback rules

/// Recommended brand colors, handed out to new sections in order.
pub const PALETTE: [&str; 5] = ["#74438d", "#f1b34a", "#4a6da7", "#509598", "#616161"];

/// Used in rendered output when a section has no color.
pub const NEUTRAL_GRAY: &str = "#6c757d";

/// Used by color swatches when the typed value is not a usable color.
pub const PREVIEW_FALLBACK: &str = "white";

/// Palette color for the section at `index`, cycling through the palette.
pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Section color as rendered: the typed value, or neutral gray when empty.
pub fn section_color(raw: &str) -> &str {
    if raw.is_empty() {
        NEUTRAL_GRAY
    } else {
        raw
    }
}

/// Color a content item is drawn with. An empty item color inherits the
/// section's rendered color.
pub fn effective_color<'a>(content: &'a str, section: &'a str) -> &'a str {
    if content.is_empty() {
        section_color(section)
    } else {
        content
    }
}

/// Whether `value` is a CSS hex color (`#rgb` or `#rrggbb`).
pub fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(digits) => {
            matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

/// Swatch color for a typed value. Malformed input never fails, it shows
/// the fallback instead.
pub fn preview_color(raw: &str) -> &str {
    if is_hex_color(raw) {
        raw
    } else {
        PREVIEW_FALLBACK
    }
}
