//! Built-in palettes and theme resolution from config.
//!
//! Both built-in schemes are Catppuccin flavours. A flavour is a handful of
//! named tones; `ThemeColors::from_palette` assigns those tones to UI roles, so
//! the dark and light themes differ only in their palette.

use ratatui::style::Color;

use crate::config::{ThemeColorsConfig, ThemeConfig};

/// Named tones of one Catppuccin flavour.
#[derive(Debug, Clone, Copy)]
struct Palette {
    text: Color,
    overlay0: Color,
    surface0: Color,
    surface1: Color,
    surface2: Color,
    base: Color,
    blue: Color,
    mauve: Color,
    red: Color,
    yellow: Color,
    green: Color,
}

const MOCHA: Palette = Palette {
    text: Color::Rgb(205, 214, 244),
    overlay0: Color::Rgb(108, 112, 134),
    surface0: Color::Rgb(49, 50, 68),
    surface1: Color::Rgb(69, 71, 90),
    surface2: Color::Rgb(88, 91, 112),
    base: Color::Rgb(30, 30, 46),
    blue: Color::Rgb(137, 180, 250),
    mauve: Color::Rgb(203, 166, 247),
    red: Color::Rgb(243, 139, 168),
    yellow: Color::Rgb(249, 226, 175),
    green: Color::Rgb(166, 227, 161),
};

const LATTE: Palette = Palette {
    text: Color::Rgb(76, 79, 105),
    overlay0: Color::Rgb(156, 160, 176),
    surface0: Color::Rgb(230, 233, 239),
    surface1: Color::Rgb(204, 208, 218),
    surface2: Color::Rgb(172, 176, 190),
    base: Color::Rgb(239, 241, 245),
    blue: Color::Rgb(30, 102, 245),
    mauve: Color::Rgb(136, 57, 239),
    red: Color::Rgb(210, 15, 57),
    yellow: Color::Rgb(223, 142, 29),
    green: Color::Rgb(64, 160, 43),
};

/// Every color the widgets draw with.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    pub list_bg: Color,
    pub list_fg: Color,
    pub list_selected_bg: Color,
    pub list_selected_fg: Color,
    pub list_hidden_fg: Color,

    pub preview_bg: Color,
    pub preview_fg: Color,
    /// Line numbers in both the text preview and the editor gutter.
    pub line_nr_fg: Color,
    pub page_bar_fg: Color,

    pub status_bg: Color,
    pub status_fg: Color,

    pub border_fg: Color,
    pub border_focused_fg: Color,
    pub dialog_bg: Color,
    pub dialog_border_fg: Color,

    // Semantic colors, not configurable
    pub error_fg: Color,
    pub warning_fg: Color,
    pub success_fg: Color,
    pub info_fg: Color,
    pub accent_fg: Color,
    pub dim_fg: Color,

    pub editor_line_nr_current: Color,
    pub editor_gutter_sep: Color,
    pub editor_cursor_fg: Color,
    pub editor_cursor_bg: Color,
    pub editor_current_line_bg: Color,
}

impl ThemeColors {
    fn from_palette(p: &Palette) -> Self {
        Self {
            list_bg: Color::Reset,
            list_fg: p.text,
            list_selected_bg: p.surface1,
            list_selected_fg: p.text,
            list_hidden_fg: p.overlay0,
            preview_bg: Color::Reset,
            preview_fg: p.text,
            line_nr_fg: p.overlay0,
            page_bar_fg: p.mauve,
            status_bg: p.base,
            status_fg: p.text,
            border_fg: p.surface2,
            border_focused_fg: p.blue,
            dialog_bg: p.surface0,
            dialog_border_fg: p.blue,
            error_fg: p.red,
            warning_fg: p.yellow,
            success_fg: p.green,
            info_fg: p.blue,
            accent_fg: p.mauve,
            dim_fg: p.overlay0,
            editor_line_nr_current: p.yellow,
            editor_gutter_sep: p.surface1,
            editor_cursor_fg: p.base,
            editor_cursor_bg: p.text,
            editor_current_line_bg: p.surface0,
        }
    }
}

pub fn dark_theme() -> ThemeColors {
    ThemeColors::from_palette(&MOCHA)
}

pub fn light_theme() -> ThemeColors {
    ThemeColors::from_palette(&LATTE)
}

/// Parse `"#aabbcc"` (the `#` is optional). `None` for anything else.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// Pick the palette named by `[theme].scheme`: `"light"`, `"custom"` (dark
/// plus per-slot overrides) or anything else for dark.
pub fn resolve_theme(config: &ThemeConfig) -> ThemeColors {
    match config.scheme.as_deref() {
        Some("light") => light_theme(),
        Some("custom") => {
            let mut theme = dark_theme();
            if let Some(custom) = &config.custom {
                apply_custom_colors(&mut theme, custom);
            }
            theme
        }
        _ => dark_theme(),
    }
}

/// Overwrite each slot whose override parses; malformed values keep the base color.
fn apply_custom_colors(theme: &mut ThemeColors, custom: &ThemeColorsConfig) {
    let overrides = [
        (&custom.list_bg, &mut theme.list_bg),
        (&custom.list_fg, &mut theme.list_fg),
        (&custom.list_selected_bg, &mut theme.list_selected_bg),
        (&custom.list_selected_fg, &mut theme.list_selected_fg),
        (&custom.list_hidden_fg, &mut theme.list_hidden_fg),
        (&custom.preview_bg, &mut theme.preview_bg),
        (&custom.preview_fg, &mut theme.preview_fg),
        (&custom.line_nr_fg, &mut theme.line_nr_fg),
        (&custom.page_bar_fg, &mut theme.page_bar_fg),
        (&custom.status_bg, &mut theme.status_bg),
        (&custom.status_fg, &mut theme.status_fg),
        (&custom.border_fg, &mut theme.border_fg),
        (&custom.dialog_bg, &mut theme.dialog_bg),
        (&custom.dialog_border_fg, &mut theme.dialog_border_fg),
    ];
    for (hex, slot) in overrides {
        if let Some(color) = hex.as_deref().and_then(parse_hex_color) {
            *slot = color;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(colors: ThemeColorsConfig) -> ThemeConfig {
        ThemeConfig {
            scheme: Some("custom".to_string()),
            custom: Some(colors),
        }
    }

    #[test]
    fn parses_hex_with_and_without_hash() {
        assert_eq!(parse_hex_color("#ff0000"), Some(Color::Rgb(255, 0, 0)));
        assert_eq!(parse_hex_color("1a1b26"), Some(Color::Rgb(26, 27, 38)));
    }

    #[test]
    fn rejects_malformed_hex() {
        for bad in ["#zzzzzz", "#fff", "", "#", "#ffé0f"] {
            assert_eq!(parse_hex_color(bad), None, "{bad:?}");
        }
    }

    #[test]
    fn scheme_selects_palette() {
        let named = |s: Option<&str>| {
            resolve_theme(&ThemeConfig {
                scheme: s.map(str::to_string),
                custom: None,
            })
        };
        assert_eq!(named(Some("light")).page_bar_fg, LATTE.mauve);
        assert_eq!(named(Some("dark")).page_bar_fg, MOCHA.mauve);
        assert_eq!(named(Some("neon")).page_bar_fg, MOCHA.mauve);
        assert_eq!(named(None).page_bar_fg, MOCHA.mauve);
    }

    #[test]
    fn custom_overrides_only_given_slots() {
        let theme = resolve_theme(&custom(ThemeColorsConfig {
            list_bg: Some("#1a1b26".to_string()),
            line_nr_fg: Some("#c0caf5".to_string()),
            ..Default::default()
        }));
        assert_eq!(theme.list_bg, Color::Rgb(26, 27, 38));
        assert_eq!(theme.line_nr_fg, Color::Rgb(192, 202, 245));
        assert_eq!(theme.page_bar_fg, MOCHA.mauve);
    }

    #[test]
    fn invalid_override_keeps_base_color() {
        let theme = resolve_theme(&custom(ThemeColorsConfig {
            list_bg: Some("#zzzzzz".to_string()),
            ..Default::default()
        }));
        assert_eq!(theme.list_bg, Color::Reset);
    }

    #[test]
    fn custom_without_colors_is_dark() {
        let theme = resolve_theme(&ThemeConfig {
            scheme: Some("custom".to_string()),
            custom: None,
        });
        assert_eq!(theme.error_fg, MOCHA.red);
    }

    #[test]
    fn dark_and_light_differ() {
        let (dark, light) = (dark_theme(), light_theme());
        assert_ne!(dark.list_fg, light.list_fg);
        assert_ne!(dark.list_selected_bg, light.list_selected_bg);
        assert_ne!(dark.editor_cursor_bg, light.editor_cursor_bg);
    }
}
