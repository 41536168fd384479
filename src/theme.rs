//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Puyo colours (earth, water, fire, wind) plus UI colours.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Puyo colours by index: yellow, blue, red, green.
    pub puyo: [Color; 4],
    pub wall: Color,
    /// Playfield background.
    pub bg: Color,
    /// Border lines.
    pub div_line: Color,
    /// Text (stats, help).
    pub main_fg: Color,
    pub title: Color,
    /// Secondary text.
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

impl Theme {
    /// One Dark colours.
    pub fn onedark_default() -> Self {
        Self {
            puyo: [
                Color::Rgb(0xE5, 0xC0, 0x7B), // yellow
                Color::Rgb(0x61, 0xAF, 0xEF), // blue
                Color::Rgb(0xE0, 0x6C, 0x75), // red
                Color::Rgb(0x98, 0xC3, 0x79), // green
            ],
            wall: Color::Rgb(0xAB, 0xB2, 0xBF),
            bg: Color::Rgb(0x31, 0x35, 0x3F),
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            title: Color::Rgb(0xE5, 0xC0, 0x7B),
            inactive_fg: Color::Rgb(0x5C, 0x63, 0x70),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or missing.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Override puyo colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                self.puyo = [
                    Color::Rgb(0xFF, 0xFF, 0x00),
                    Color::Rgb(0x00, 0x88, 0xFF),
                    Color::Rgb(0xFF, 0x00, 0x00),
                    Color::Rgb(0x00, 0xFF, 0x00),
                ];
            }
            crate::Palette::Colorblind => {
                // Blue/orange/teal/magenta; no red-green pair.
                self.puyo = [
                    Color::Rgb(0xEE, 0x77, 0x33),
                    Color::Rgb(0x00, 0x77, 0xBB),
                    Color::Rgb(0xEE, 0x33, 0x77),
                    Color::Rgb(0x00, 0x99, 0x88),
                ];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let d = Self::onedark_default();
        Self {
            puyo: [
                get("title").or_else(|| get("cpu_mid")).unwrap_or(d.puyo[0]),
                get("cpu_box").unwrap_or(d.puyo[1]),
                get("cpu_end").or_else(|| get("temp_end")).unwrap_or(d.puyo[2]),
                get("mem_box").or_else(|| get("cpu_start")).unwrap_or(d.puyo[3]),
            ],
            wall: get("main_fg").unwrap_or(d.wall),
            bg: get("meter_bg").unwrap_or(d.bg),
            div_line: get("div_line").unwrap_or(d.div_line),
            main_fg: get("main_fg").unwrap_or(d.main_fg),
            title: get("title").unwrap_or(d.title),
            inactive_fg: get("inactive_fg").unwrap_or(d.inactive_fg),
        }
    }

    /// Colour for puyo index.
    #[inline]
    pub fn puyo_color(&self, index: u8) -> Color {
        self.puyo[index as usize % self.puyo.len()]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(invalid)
    };
    let (r, g, b) = match s.len() {
        6 => (channel(0..2)?, channel(2..4)?, channel(4..6)?),
        3 => (channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17),
        _ => return Err(invalid()),
    };
    Ok(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#98C379").unwrap();
        assert!(matches!(c, Color::Rgb(0x98, 0xC3, 0x79)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_invalid() {
        assert!(matches!(parse_hex("#12"), Err(ThemeError::InvalidHex(_))));
        assert!(matches!(parse_hex("#GG0000"), Err(ThemeError::InvalidHex(_))));
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[meter_bg]="#31353F""##);
        assert_eq!(map.get("meter_bg"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_from_map_overrides_and_falls_back() {
        let map = parse_theme_file("theme[cpu_box]='#0000FF'\n# comment\ntheme[bogus]=\"zz\"");
        let theme = Theme::from_map(&map);
        assert_eq!(theme.puyo[1], Color::Rgb(0, 0, 0xFF));
        assert_eq!(theme.puyo[0], Theme::default().puyo[0]);
    }

    #[test]
    fn test_load_missing_file_uses_palette() {
        let theme = Theme::load(
            Some(Path::new("/nonexistent/puyotui.theme")),
            crate::Palette::HighContrast,
        )
        .unwrap();
        assert_eq!(theme.puyo[2], Color::Rgb(0xFF, 0, 0));
        assert_eq!(theme.puyo_color(6), theme.puyo[2]);
    }
}
