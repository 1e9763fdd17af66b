//! Mapping from OpenWeather icon codes to display glyphs.
//!
//! Icon codes look like `01d` / `10n`: a two-digit condition family followed
//! by a day (`d`) or night (`n`) suffix.

/// Glyph shown for a family code the table does not know.
pub const UNKNOWN_ICON: &str = "❓";

/// Glyph shown for the clear family at night.
pub const NIGHT_CLEAR_ICON: &str = "🌙";

const CLEAR_FAMILY: &str = "01";

const ICONS: &[(&str, &str)] = &[
    (CLEAR_FAMILY, "☀️"),
    ("02", "🌤️"),
    ("03", "🌥️"),
    ("04", "☁️"),
    ("09", "🌧️"),
    ("10", "☔"),
    ("11", "⛈️"),
    ("13", "❄️"),
    ("50", "🌫️"),
];

/// Resolve a condition family code to its glyph.
///
/// Never fails: unknown families map to [`UNKNOWN_ICON`].
pub fn resolve(family: &str, is_night: bool) -> &'static str {
    if family == CLEAR_FAMILY && is_night {
        return NIGHT_CLEAR_ICON;
    }

    ICONS
        .iter()
        .find(|(code, _)| *code == family)
        .map(|(_, glyph)| *glyph)
        .unwrap_or(UNKNOWN_ICON)
}

/// Resolve a full provider icon code such as `"01n"`.
pub fn resolve_code(icon_code: &str) -> &'static str {
    let family = icon_code.get(..2).unwrap_or(icon_code);
    resolve(family, icon_code.ends_with('n'))
}
