//! Color handling
//!
//! sRGB colors with hex parsing/formatting, the `rgba(...)` string form
//! used by pixel reads, and the Porter-Duff "over" helper the
//! compositor builds on.

use serde::{Deserialize, Serialize};

/// Color structure with RGBA values (0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red component (0.0 - 1.0)
    pub r: f32,
    /// Green component (0.0 - 1.0)
    pub g: f32,
    /// Blue component (0.0 - 1.0)
    pub b: f32,
    /// Alpha component (0.0 - 1.0)
    pub a: f32,
}

impl Color {
    /// Opaque black
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
    /// Opaque white
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    /// Fully transparent black
    pub const TRANSPARENT: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };

    /// Build a color from float channels, pinning each into `[0, 1]`
    pub fn from_rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        let [r, g, b, a] = [r, g, b, a].map(|v| v.clamp(0.0, 1.0));
        Self { r, g, b, a }
    }

    /// Opaque color from float channels
    pub fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self::from_rgba(r, g, b, 1.0)
    }

    /// Build a color from 8-bit channels
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        let [r, g, b, a] = [r, g, b, a].map(|v| v as f32 / 255.0);
        Self { r, g, b, a }
    }

    /// Opaque color from 8-bit channels
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba8(r, g, b, 255)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (the leading `#` is
    /// optional). Any other shape, or a non-hex digit, yields `None`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);

        // Expand the #rgb shorthand by doubling each digit, then parse
        // the whole string as one word and shift the channels out
        let expanded;
        let digits = if digits.len() == 3 {
            expanded = digits.chars().flat_map(|c| [c, c]).collect::<String>();
            expanded.as_str()
        } else {
            digits
        };

        let word = u32::from_str_radix(digits, 16).ok()?;
        match digits.len() {
            6 => {
                let [_, r, g, b] = word.to_be_bytes();
                Some(Self::from_rgb8(r, g, b))
            }
            8 => {
                let [r, g, b, a] = word.to_be_bytes();
                Some(Self::from_rgba8(r, g, b, a))
            }
            _ => None,
        }
    }

    /// Parse a background specification.
    ///
    /// Empty strings and `"transparent"` yield `None` (clear-to-transparent);
    /// anything else is parsed as hex.
    pub fn parse_background(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        if spec.is_empty() || spec.eq_ignore_ascii_case("transparent") {
            return None;
        }
        Self::from_hex(spec)
    }

    /// Quantize to 8-bit channels
    pub fn to_rgba8(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a].map(|v| (v * 255.0).round().clamp(0.0, 255.0) as u8)
    }

    /// Format as `#rrggbb`, dropping alpha
    pub fn to_hex(&self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    /// Copy of this color with its alpha replaced
    pub fn with_alpha(&self, alpha: f32) -> Self {
        Self {
            a: alpha.clamp(0.0, 1.0),
            ..*self
        }
    }

    /// Composite `src` over this color (straight-alpha "over").
    ///
    /// Channels are mixed premultiplied and the result alpha divided
    /// back out.
    pub fn over(&self, src: Color) -> Self {
        let out_a = src.a + self.a * (1.0 - src.a);
        if out_a <= 0.0 {
            return Self::TRANSPARENT;
        }
        let mix = |top: f32, bottom: f32| (top * src.a + bottom * self.a * (1.0 - src.a)) / out_a;
        Self {
            r: mix(src.r, self.r),
            g: mix(src.g, self.g),
            b: mix(src.b, self.b),
            a: out_a,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Result of a pixel read on the content plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PixelColor {
    /// Red component (0 - 255)
    pub r: u8,
    /// Green component (0 - 255)
    pub g: u8,
    /// Blue component (0 - 255)
    pub b: u8,
    /// Alpha component (0.0 - 1.0)
    pub a: f32,
    /// Hex form, e.g. "#ff0000"
    pub hex: String,
    /// CSS form, e.g. "rgba(255, 0, 0, 1.000)"
    pub rgba: String,
}

impl PixelColor {
    /// Build from raw RGBA8 channel values
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        let alpha = a as f32 / 255.0;
        Self {
            r,
            g,
            b,
            a: alpha,
            hex: format!("#{:02x}{:02x}{:02x}", r, g, b),
            rgba: format!("rgba({}, {}, {}, {:.3})", r, g, b, alpha),
        }
    }

    /// Fully transparent black, returned for out-of-range or denied reads
    pub fn transparent() -> Self {
        Self::from_rgba8(0, 0, 0, 0)
    }
}
