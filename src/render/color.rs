//! Hex color parsing.

use image::Rgba;

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
/// Highlight yellow used for second headlines and highlight words.
pub const ACCENT: Rgba<u8> = Rgba([0xFD, 0xE0, 0x47, 255]);
/// End color of the background gradient.
pub const GRADIENT_END: Rgba<u8> = Rgba([0x1E, 0x3A, 0x8A, 255]);
pub const PLACEHOLDER_GRAY: Rgba<u8> = Rgba([0xE5, 0xE7, 0xEB, 255]);

/// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA`.
pub fn parse_hex(s: &str) -> Option<Rgba<u8>> {
    let hex = s.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                rgb[i] = v * 17;
            }
            Some(Rgba([rgb[0], rgb[1], rgb[2], 255]))
        }
        6 => Some(Rgba([channel(0)?, channel(2)?, channel(4)?, 255])),
        8 => Some(Rgba([channel(0)?, channel(2)?, channel(4)?, channel(6)?])),
        _ => None,
    }
}

/// Parse `s`, or use `fallback` when it is blank or malformed.
pub fn color_or(s: Option<&str>, fallback: Rgba<u8>) -> Rgba<u8> {
    s.and_then(parse_hex).unwrap_or(fallback)
}

pub fn with_alpha(color: Rgba<u8>, alpha: u8) -> Rgba<u8> {
    Rgba([color[0], color[1], color[2], alpha])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#2A48A0"), Some(Rgba([0x2A, 0x48, 0xA0, 255])));
        assert_eq!(parse_hex("#fff"), Some(WHITE));
        assert_eq!(parse_hex(" #00000080 "), Some(Rgba([0, 0, 0, 0x80])));
        assert_eq!(parse_hex("2A48A0"), None);
        assert_eq!(parse_hex("#12345"), None);
        assert_eq!(parse_hex("#gggggg"), None);
        assert_eq!(parse_hex("#가나"), None);
    }

    #[test]
    fn test_color_or() {
        assert_eq!(color_or(Some(""), ACCENT), ACCENT);
        assert_eq!(color_or(None, BLACK), BLACK);
        assert_eq!(color_or(Some("#000"), WHITE), BLACK);
    }
}
