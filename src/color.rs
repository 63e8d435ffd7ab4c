//! Color types and the label color policies.

use serde::Deserialize;

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque_alpha")]
    pub a: u8,
}

fn opaque_alpha() -> u8 {
    255
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// 255 minus each color channel; alpha is preserved.
    pub const fn inverted(self) -> Self {
        Self {
            r: 255 - self.r,
            g: 255 - self.g,
            b: 255 - self.b,
            a: self.a,
        }
    }
}

/// How the label fill color is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextColorPolicy {
    /// A configured constant.
    Fixed(Rgba),
    /// 255 minus each channel of the object's own display color.
    Inverted,
    /// Exactly the object's own display color.
    FollowBox,
}

/// How the outline color is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlineColorPolicy {
    /// A configured constant.
    Fixed(Rgba),
    /// 255 minus each channel of the resolved text color.
    Inverted,
}

/// Resolves the fill color for a label on an object displayed in
/// `object_color`.
pub fn resolve_text_color(policy: TextColorPolicy, object_color: Rgba) -> Rgba {
    match policy {
        TextColorPolicy::Fixed(color) => color,
        TextColorPolicy::Inverted => object_color.inverted(),
        TextColorPolicy::FollowBox => object_color,
    }
}

/// Resolves the outline color against the already-resolved text color.
pub fn resolve_outline_color(policy: OutlineColorPolicy, text_color: Rgba) -> Rgba {
    match policy {
        OutlineColorPolicy::Fixed(color) => color,
        OutlineColorPolicy::Inverted => text_color.inverted(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inversion_flips_channels_and_keeps_alpha() {
        let color = Rgba::new(10, 200, 0, 128);
        assert_eq!(color.inverted(), Rgba::new(245, 55, 255, 128));
        assert_eq!(color.inverted().inverted(), color);
    }

    #[test]
    fn test_text_color_resolution() {
        let box_color = Rgba::opaque(40, 80, 120);
        assert_eq!(
            resolve_text_color(TextColorPolicy::Fixed(Rgba::WHITE), box_color),
            Rgba::WHITE
        );
        assert_eq!(
            resolve_text_color(TextColorPolicy::Inverted, box_color),
            Rgba::opaque(215, 175, 135)
        );
        assert_eq!(
            resolve_text_color(TextColorPolicy::FollowBox, box_color),
            box_color
        );
    }

    #[test]
    fn test_outline_color_resolution() {
        assert_eq!(
            resolve_outline_color(OutlineColorPolicy::Fixed(Rgba::BLACK), Rgba::WHITE),
            Rgba::BLACK
        );
        assert_eq!(
            resolve_outline_color(OutlineColorPolicy::Inverted, Rgba::WHITE),
            Rgba::BLACK
        );
    }
}
