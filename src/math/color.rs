use serde::{Deserialize, Serialize};
use thiserror::Error;

/// RGB colour with components in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("expected 6 hex digits, got {0:?}")]
    Length(String),
    #[error("invalid hex digit in {0:?}")]
    Digit(String),
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed 0xRRGGBB value
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// Packed 0xRRGGBB, each channel clamped and rounded to 8 bits
    pub fn to_hex(&self) -> u32 {
        let [r, g, b] = self.to_rgb8();
        (r as u32) << 16 | (g as u32) << 8 | b as u32
    }

    /// Lowercase `#rrggbb`
    pub fn to_hex_string(&self) -> String {
        format!("#{:06x}", self.to_hex())
    }

    /// Accepts `#rrggbb` or `rrggbb`, any case
    pub fn parse_hex(input: &str) -> Result<Self, ColorParseError> {
        let digits = input.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);
        if digits.len() != 6 {
            return Err(ColorParseError::Length(input.to_string()));
        }
        // from_str_radix tolerates a leading sign
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorParseError::Digit(input.to_string()));
        }
        u32::from_str_radix(digits, 16)
            .map(Self::from_hex)
            .map_err(|_| ColorParseError::Digit(input.to_string()))
    }

    pub fn to_rgb8(&self) -> [u8; 3] {
        let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [quantize(self.r), quantize(self.g), quantize(self.b)]
    }

    pub fn from_rgb8(rgb: [u8; 3]) -> Self {
        Self::new(
            rgb[0] as f32 / 255.0,
            rgb[1] as f32 / 255.0,
            rgb[2] as f32 / 255.0,
        )
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Premultiply by a light intensity, padded to a vec4 for uniforms
    pub fn scaled(&self, intensity: f32) -> [f32; 4] {
        [self.r * intensity, self.g * intensity, self.b * intensity, 1.0]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_channels() {
        let c = Color::from_hex(0x8844aa);
        assert!((c.r - 0x88 as f32 / 255.0).abs() < 1e-6);
        assert!((c.g - 0x44 as f32 / 255.0).abs() < 1e-6);
        assert!((c.b - 0xaa as f32 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_hex_string_lowercase() {
        assert_eq!(Color::from_hex(0xAA8844).to_hex_string(), "#aa8844");
        assert_eq!(Color::BLACK.to_hex_string(), "#000000");
        assert_eq!(Color::WHITE.to_hex_string(), "#ffffff");
    }

    #[test]
    fn test_parse_accepts_prefix_and_case() {
        assert_eq!(Color::parse_hex("#FF0000").unwrap().to_hex(), 0xff0000);
        assert_eq!(Color::parse_hex("00ff00").unwrap().to_hex(), 0x00ff00);
        assert_eq!(Color::parse_hex("  #0000Ff ").unwrap().to_hex(), 0x0000ff);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(Color::parse_hex("#fff"), Err(ColorParseError::Length(_))));
        assert!(matches!(Color::parse_hex("#gg0000"), Err(ColorParseError::Digit(_))));
        assert!(matches!(Color::parse_hex("+12345"), Err(ColorParseError::Digit(_))));
    }

    #[test]
    fn test_out_of_range_components_clamp() {
        let c = Color::new(1.5, -0.2, 0.5);
        assert_eq!(c.to_rgb8(), [255, 0, 128]);
    }
}
