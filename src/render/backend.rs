use crate::{
    foundation::{core::Rgba8, error::ConvergeResult},
    render::scene::Scene,
};

/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha** by default. The `premultiplied` flag is included to make
/// this explicit at API boundaries.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Premultiplied pixel at `(x, y)`, if inside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha copy of the pixel data, as image encoders expect.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if !self.premultiplied {
            return out;
        }
        for px in out.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }
}

/// A renderer that rasterizes a [`Scene`] into a [`FrameRGBA`].
pub trait RenderBackend {
    /// Rasterize `scene`.
    fn render_scene(&mut self, scene: &Scene) -> ConvergeResult<FrameRGBA>;
}

/// Arithmetic used for coverage and compositing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RasterPrecision {
    /// f32 compositing. Antialiased edges over an opaque clear stay fully opaque.
    #[default]
    Exact,
    /// u8 compositing. Faster, but edge alpha can round down by one step.
    Fast,
}

/// Backend-agnostic settings.
#[derive(Clone, Debug, Default)]
pub struct RenderSettings {
    /// If set, overrides the scene's own clear color.
    pub clear_rgba: Option<Rgba8>,
    pub precision: RasterPrecision,
}
