use std::{collections::HashMap, sync::Arc};

use crate::{
    assets::{
        decode::cover_crop,
        store::{AssetId, PreparedImage},
    },
    foundation::{
        core::{Affine, Rect, Rgba8, RoundedRect},
        error::{ConvergeError, ConvergeResult},
    },
    render::{
        backend::{FrameRGBA, RasterPrecision, RenderBackend, RenderSettings},
        scene::{DrawOp, Paint, Scene, SceneText, Shape, TextAlign},
    },
};

/// CPU raster backend powered by `vello_cpu`.
///
/// Keeps decoded image paints and font handles across frames, so one backend per worker thread
/// is enough for a whole scroll-through render.
pub struct CpuBackend {
    settings: RenderSettings,
    ctx: Option<vello_cpu::RenderContext>,
    image_cache: HashMap<ImageKey, ImagePaint>,
    font_cache: HashMap<AssetId, vello_cpu::peniko::FontData>,
}

/// Image identity plus the aspect it was cover-cropped to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct ImageKey {
    asset: AssetId,
    aspect_bits: u64,
}

#[derive(Clone)]
struct ImagePaint {
    paint: vello_cpu::Image,
    w: u32,
    h: u32,
}

const IMAGE_CACHE_LIMIT: usize = 64;

impl CpuBackend {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            ctx: None,
            image_cache: HashMap::new(),
            font_cache: HashMap::new(),
        }
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> ConvergeResult<R>,
    ) -> ConvergeResult<R> {
        let settings = raster_settings(self.settings.precision);
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new_with(width, height, settings),
        };
        ctx.reset();
        let out = f(self, &mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }

    fn draw_op(&mut self, op: &DrawOp, ctx: &mut vello_cpu::RenderContext) -> ConvergeResult<()> {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        match op {
            DrawOp::Fill {
                shape,
                paint: Paint::Solid(color),
                transform,
            } => {
                ctx.set_transform(affine_to_cpu(*transform));
                ctx.set_paint(color_to_cpu(*color));
                fill_shape(ctx, shape);
                Ok(())
            }
            DrawOp::Fill {
                shape,
                paint: Paint::Image { id, image },
                transform,
            } => {
                let bounds = shape.bounds();
                if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
                    return Ok(());
                }
                let p = self.image_paint_for(*id, image, bounds.width() / bounds.height())?;
                // cover crop matched the aspect, so one uniform scale maps pixels onto bounds
                let s = bounds.width() / f64::from(p.w.max(1));
                let local = *transform
                    * Affine::translate((bounds.x0, bounds.y0))
                    * Affine::scale(s);
                ctx.set_transform(affine_to_cpu(local));
                ctx.set_paint(p.paint);
                let pixels = Rect::new(0.0, 0.0, f64::from(p.w), f64::from(p.h));
                let pixel_shape = match shape {
                    Shape::Rect(_) => Shape::Rect(pixels),
                    Shape::RoundedRect(r) => {
                        Shape::RoundedRect(RoundedRect::from_rect(pixels, r.radii().top_left / s))
                    }
                };
                fill_shape(ctx, &pixel_shape);
                Ok(())
            }
            DrawOp::Text { text, transform } => self.draw_text(text, *transform, ctx),
            DrawOp::Group { opacity, ops } => {
                let opacity = opacity.clamp(0.0, 1.0);
                if opacity <= 0.0 {
                    return Ok(());
                }
                if opacity < 1.0 {
                    ctx.push_opacity_layer(opacity);
                }
                for child in ops {
                    self.draw_op(child, ctx)?;
                }
                if opacity < 1.0 {
                    ctx.pop_layer();
                }
                Ok(())
            }
        }
    }

    fn draw_text(
        &mut self,
        text: &SceneText,
        transform: Affine,
        ctx: &mut vello_cpu::RenderContext,
    ) -> ConvergeResult<()> {
        let font = self.font_for(text);
        ctx.set_transform(affine_to_cpu(transform));
        for line in text.layout.lines() {
            let dx = match text.align {
                TextAlign::Start => 0.0,
                TextAlign::Center => ((text.box_width - line.metrics().advance) / 2.0).max(0.0),
            };
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x + dx,
                    y: g.y,
                });
                ctx.glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }

    fn image_paint_for(
        &mut self,
        id: AssetId,
        image: &PreparedImage,
        aspect: f64,
    ) -> ConvergeResult<ImagePaint> {
        // round the aspect so sub-pixel size jitter does not defeat the cache
        let aspect = (aspect * 1000.0).round() / 1000.0;
        let key = ImageKey {
            asset: id,
            aspect_bits: aspect.to_bits(),
        };
        if let Some(p) = self.image_cache.get(&key) {
            return Ok(p.clone());
        }

        let cropped = cover_crop(image, aspect);
        let pixmap =
            pixmap_from_premul_bytes(&cropped.rgba8_premul, cropped.width, cropped.height)?;
        let out = ImagePaint {
            paint: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
            w: cropped.width,
            h: cropped.height,
        };
        if self.image_cache.len() >= IMAGE_CACHE_LIMIT {
            self.image_cache.clear();
        }
        self.image_cache.insert(key, out.clone());
        Ok(out)
    }

    fn font_for(&mut self, text: &SceneText) -> vello_cpu::peniko::FontData {
        self.font_cache
            .entry(text.font.id)
            .or_insert_with(|| {
                let bytes = text.font.bytes.as_ref().clone();
                vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0)
            })
            .clone()
    }
}

impl RenderBackend for CpuBackend {
    fn render_scene(&mut self, scene: &Scene) -> ConvergeResult<FrameRGBA> {
        let width: u16 = scene
            .width
            .try_into()
            .map_err(|_| ConvergeError::render("frame width exceeds u16"))?;
        let height: u16 = scene
            .height
            .try_into()
            .map_err(|_| ConvergeError::render("frame height exceeds u16"))?;
        if width == 0 || height == 0 {
            return Err(ConvergeError::render("frame width/height must be non-zero"));
        }
        let clear = self.settings.clear_rgba.unwrap_or(scene.clear);

        self.with_ctx_mut(width, height, |this, ctx| {
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(color_to_cpu(clear));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(width),
                f64::from(height),
            ));
            for op in &scene.ops {
                this.draw_op(op, ctx)?;
            }
            ctx.flush();
            let mut pixmap = vello_cpu::Pixmap::new(width, height);
            ctx.render_to_pixmap(&mut pixmap);
            Ok(FrameRGBA {
                width: scene.width,
                height: scene.height,
                data: pixmap.data_as_u8_slice().to_vec(),
                premultiplied: true,
            })
        })
    }
}

fn raster_settings(precision: RasterPrecision) -> vello_cpu::RenderSettings {
    let render_mode = match precision {
        RasterPrecision::Exact => vello_cpu::RenderMode::OptimizeQuality,
        RasterPrecision::Fast => vello_cpu::RenderMode::OptimizeSpeed,
    };
    vello_cpu::RenderSettings {
        render_mode,
        ..vello_cpu::RenderSettings::default()
    }
}

fn fill_shape(ctx: &mut vello_cpu::RenderContext, shape: &Shape) {
    match shape {
        Shape::Rect(r) => ctx.fill_rect(&rect_to_cpu(*r)),
        Shape::RoundedRect(r) => {
            let path = bezpath_to_cpu(&kurbo::Shape::to_path(r, 0.1));
            ctx.fill_path(&path);
        }
    }
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &crate::foundation::core::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> ConvergeResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ConvergeError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ConvergeError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(ConvergeError::render("pixmap byte len mismatch"));
    }
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    let mut may_have_opacities = false;
    for px in bytes.chunks_exact(4) {
        may_have_opacities |= px[3] != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
