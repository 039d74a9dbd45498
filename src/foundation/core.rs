pub use kurbo::{Affine, BezPath, Point, Rect, RoundedRect, Vec2};

/// Visible viewport measured by the host.
///
/// `offset_left`/`offset_top` are the visual viewport offsets inside the layout viewport (non-zero
/// when mobile browser chrome or an on-screen keyboard shifts the visible area).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewportMetrics {
    /// Visible width in px.
    pub width: f64,
    /// Visible height in px.
    pub height: f64,
    /// Visual viewport offset from the layout viewport's left edge.
    #[serde(default)]
    pub offset_left: f64,
    /// Visual viewport offset from the layout viewport's top edge.
    #[serde(default)]
    pub offset_top: f64,
}

impl ViewportMetrics {
    /// Viewport with no visual offset. Non-finite or negative sizes collapse to zero.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: sanitize_len(width),
            height: sanitize_len(height),
            offset_left: 0.0,
            offset_top: 0.0,
        }
    }

    /// Same viewport shifted by a visual offset.
    pub fn with_offset(mut self, left: f64, top: f64) -> Self {
        self.offset_left = if left.is_finite() { left } else { 0.0 };
        self.offset_top = if top.is_finite() { top } else { 0.0 };
        self
    }

    /// Copy with every field forced into a usable range.
    pub fn sanitized(self) -> Self {
        Self::new(self.width, self.height).with_offset(self.offset_left, self.offset_top)
    }

    /// `min(width, height)`.
    pub fn min_side(self) -> f64 {
        self.width.min(self.height)
    }

    /// Viewport rectangle in screen space, including the visual offset.
    pub fn rect(self) -> Rect {
        Rect::new(
            self.offset_left,
            self.offset_top,
            self.offset_left + self.width,
            self.offset_top + self.height,
        )
    }
}

fn sanitize_len(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

/// Unscaled card box size in px.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CardSize {
    /// Width in px.
    pub width: f64,
    /// Height in px.
    pub height: f64,
}

impl CardSize {
    /// Build a card size; non-finite or negative values collapse to zero.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: sanitize_len(width),
            height: sanitize_len(height),
        }
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque color from RGB channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with alpha multiplied by `f` (clamped to `[0, 1]`).
    pub fn with_alpha_mul(self, f: f64) -> Self {
        let f = if f.is_finite() { f.clamp(0.0, 1.0) } else { 0.0 };
        Self {
            a: (f64::from(self.a) * f).round() as u8,
            ..self
        }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    /// Convert to premultiplied RGBA8 bytes.
    pub fn to_premul(self) -> [u8; 4] {
        let a = u16::from(self.a);
        let premul = |c: u8| (((u16::from(c) * a) + 127) / 255) as u8;
        [premul(self.r), premul(self.g), premul(self.b), self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
