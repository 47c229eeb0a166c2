//! Blend modes for layer compositing
//!
//! The separable subset of the standard compositing modes; each mode
//! mixes source color against the backdrop channel-wise, alpha is
//! composited by the painter afterwards.

use serde::{Deserialize, Serialize};

/// Layer blend mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlendMode {
    /// Normal blending
    #[default]
    Normal,
    /// Darken - keeps darker channels
    Darken,
    /// Multiply
    Multiply,
    /// Color Burn
    ColorBurn,
    /// Linear Burn
    LinearBurn,
    /// Lighten - keeps lighter channels
    Lighten,
    /// Screen
    Screen,
    /// Color Dodge
    ColorDodge,
    /// Linear Dodge (Add)
    LinearDodge,
    /// Overlay
    Overlay,
    /// Soft Light
    SoftLight,
    /// Hard Light
    HardLight,
    /// Difference
    Difference,
    /// Exclusion
    Exclusion,
    /// Subtract
    Subtract,
    /// Divide
    Divide,
}

impl BlendMode {
    /// All supported modes, in palette order
    pub fn all() -> &'static [BlendMode] {
        &[
            BlendMode::Normal,
            BlendMode::Darken,
            BlendMode::Multiply,
            BlendMode::ColorBurn,
            BlendMode::LinearBurn,
            BlendMode::Lighten,
            BlendMode::Screen,
            BlendMode::ColorDodge,
            BlendMode::LinearDodge,
            BlendMode::Overlay,
            BlendMode::SoftLight,
            BlendMode::HardLight,
            BlendMode::Difference,
            BlendMode::Exclusion,
            BlendMode::Subtract,
            BlendMode::Divide,
        ]
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            BlendMode::Normal => "Normal",
            BlendMode::Darken => "Darken",
            BlendMode::Multiply => "Multiply",
            BlendMode::ColorBurn => "Color Burn",
            BlendMode::LinearBurn => "Linear Burn",
            BlendMode::Lighten => "Lighten",
            BlendMode::Screen => "Screen",
            BlendMode::ColorDodge => "Color Dodge",
            BlendMode::LinearDodge => "Linear Dodge (Add)",
            BlendMode::Overlay => "Overlay",
            BlendMode::SoftLight => "Soft Light",
            BlendMode::HardLight => "Hard Light",
            BlendMode::Difference => "Difference",
            BlendMode::Exclusion => "Exclusion",
            BlendMode::Subtract => "Subtract",
            BlendMode::Divide => "Divide",
        }
    }

    /// Mix one source channel against one backdrop channel.
    ///
    /// Inputs and output are non-premultiplied values in `[0, 1]`.
    pub fn mix_channel(&self, base: f32, top: f32) -> f32 {
        let out = match self {
            BlendMode::Normal => top,
            BlendMode::Darken => base.min(top),
            BlendMode::Multiply => base * top,
            BlendMode::ColorBurn => {
                if top <= 0.0 {
                    0.0
                } else {
                    1.0 - ((1.0 - base) / top).min(1.0)
                }
            }
            BlendMode::LinearBurn => base + top - 1.0,
            BlendMode::Lighten => base.max(top),
            BlendMode::Screen => 1.0 - (1.0 - base) * (1.0 - top),
            BlendMode::ColorDodge => {
                if top >= 1.0 {
                    1.0
                } else {
                    (base / (1.0 - top)).min(1.0)
                }
            }
            BlendMode::LinearDodge => base + top,
            BlendMode::Overlay => {
                if base <= 0.5 {
                    2.0 * base * top
                } else {
                    1.0 - 2.0 * (1.0 - base) * (1.0 - top)
                }
            }
            BlendMode::SoftLight => {
                if top <= 0.5 {
                    base - (1.0 - 2.0 * top) * base * (1.0 - base)
                } else {
                    let d = if base <= 0.25 {
                        ((16.0 * base - 12.0) * base + 4.0) * base
                    } else {
                        base.sqrt()
                    };
                    base + (2.0 * top - 1.0) * (d - base)
                }
            }
            BlendMode::HardLight => {
                if top <= 0.5 {
                    2.0 * base * top
                } else {
                    1.0 - 2.0 * (1.0 - base) * (1.0 - top)
                }
            }
            BlendMode::Difference => (base - top).abs(),
            BlendMode::Exclusion => base + top - 2.0 * base * top,
            BlendMode::Subtract => base - top,
            BlendMode::Divide => {
                if top <= 0.0 {
                    1.0
                } else {
                    base / top
                }
            }
        };
        out.clamp(0.0, 1.0)
    }

    /// Mix RGB triples (non-premultiplied)
    pub fn mix_rgb(&self, base: [f32; 3], top: [f32; 3]) -> [f32; 3] {
        match self {
            // Fast path, by far the common case
            BlendMode::Normal => top,
            _ => [
                self.mix_channel(base[0], top[0]),
                self.mix_channel(base[1], top[1]),
                self.mix_channel(base[2], top[2]),
            ],
        }
    }
}
