//! Page state to draw list.
//!
//! A [`Scene`] is a flat, backend-agnostic list of [`DrawOp`]s in paint order, in screen pixels.
//! Building one never touches the filesystem: images and the font come from a
//! [`PreparedAssetStore`], text is shaped with Parley and cached across frames.

use std::{collections::HashMap, sync::Arc};

use crate::{
    assets::store::{
        AssetId, PLACEHOLDER_COLOR, PreparedAssetStore, PreparedFont, PreparedImage,
        TextBrushRgba8, TextLayoutEngine,
    },
    converge::controller::{ConvergeController, OverlayPlacement},
    foundation::{
        core::{Affine, Rect, Rgba8, RoundedRect, Vec2},
        math::Fnv1a64,
    },
    layout::breakpoint::{Breakpoint, LayoutConstants, TextStyles},
    page::{
        model::{HeroSection, SectionSpec, StaticSection},
        runtime::PageRuntime,
    },
};

/// Page background behind converge sections.
pub const BACKGROUND: Rgba8 = Rgba8::rgb(0xff, 0xff, 0xff);
const HEADLINE: Rgba8 = Rgba8::rgb(0x17, 0x25, 0x54);
const PRIMARY: Rgba8 = Rgba8::rgb(0x25, 0x63, 0xeb);
const FOREGROUND: Rgba8 = Rgba8::rgb(0x0f, 0x17, 0x2a);
const MUTED: Rgba8 = Rgba8::rgb(0x64, 0x74, 0x8b);
const HERO_TEXT: Rgba8 = Rgba8::rgb(0xe5, 0xe7, 0xeb);
const GRID_LINE: Rgba8 = Rgba8::rgba(0x0f, 0x17, 0x2a, 0x0d);

const GRID_STEP_PX: f64 = 32.0;
const CARD_RADIUS_PX: f64 = 16.0;
const SHADOW_STEPS: usize = 4;
/// Section content column (`max-w-4xl`) and its side padding.
const COLUMN_MAX_PX: f64 = 896.0;
const COLUMN_PAD_PX: f64 = 24.0;
const KICKER_PAD_X: f64 = 22.0;
const KICKER_PAD_Y: f64 = 8.0;
const KICKER_GAP: f64 = 12.0;
const PARAGRAPH_GAP: f64 = 16.0;
const TEXT_CACHE_LIMIT: usize = 256;

/// Horizontal placement of each line inside a text box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Start,
    Center,
}

/// Shaped text ready to rasterize.
#[derive(Clone)]
pub struct SceneText {
    pub layout: Arc<parley::Layout<TextBrushRgba8>>,
    pub font: PreparedFont,
    /// Box width lines are aligned in.
    pub box_width: f32,
    pub align: TextAlign,
}

impl SceneText {
    pub fn width(&self) -> f64 {
        f64::from(self.layout.width())
    }

    pub fn height(&self) -> f64 {
        f64::from(self.layout.height())
    }
}

impl std::fmt::Debug for SceneText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneText")
            .field("lines", &self.layout.len())
            .field("width", &self.layout.width())
            .field("height", &self.layout.height())
            .field("align", &self.align)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub enum Shape {
    Rect(Rect),
    RoundedRect(RoundedRect),
}

impl Shape {
    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Rect(r) => *r,
            Shape::RoundedRect(r) => r.rect(),
        }
    }
}

#[derive(Clone, Debug)]
pub enum Paint {
    Solid(Rgba8),
    /// Image stretched over the shape's bounds after a cover crop to their aspect.
    Image { id: AssetId, image: PreparedImage },
}

#[derive(Clone, Debug)]
pub enum DrawOp {
    Fill {
        shape: Shape,
        paint: Paint,
        transform: Affine,
    },
    /// Text box whose top-left corner sits at the transform's origin.
    Text { text: SceneText, transform: Affine },
    /// Children composited together at `opacity`.
    Group { opacity: f32, ops: Vec<DrawOp> },
}

/// Draw list for one frame.
#[derive(Clone, Debug)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub clear: Rgba8,
    pub ops: Vec<DrawOp>,
}

impl Scene {
    /// Number of draw ops, counting group children.
    pub fn op_count(&self) -> usize {
        fn count(ops: &[DrawOp]) -> usize {
            ops.iter()
                .map(|op| match op {
                    DrawOp::Group { ops, .. } => 1 + count(ops),
                    _ => 1,
                })
                .sum()
        }
        count(&self.ops)
    }
}

/// Build a scene with a fresh builder (no text cache reuse).
pub fn build_scene(runtime: &PageRuntime, assets: &PreparedAssetStore) -> Scene {
    SceneBuilder::new().build(runtime, assets)
}

/// Scene builder that keeps shaped text between frames.
pub struct SceneBuilder {
    engine: TextLayoutEngine,
    text_cache: HashMap<u64, Arc<parley::Layout<TextBrushRgba8>>>,
    warned_no_font: bool,
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self {
            engine: TextLayoutEngine::new(),
            text_cache: HashMap::new(),
            warned_no_font: false,
        }
    }

    /// Paint every visible section at the runtime's scroll position.
    pub fn build(&mut self, runtime: &PageRuntime, assets: &PreparedAssetStore) -> Scene {
        let viewport = runtime.viewport();
        let width = viewport.width.ceil().max(1.0) as u32;
        let height = viewport.height.ceil().max(1.0) as u32;
        let bp = runtime.spec().converge.breakpoints.classify(viewport.width);
        let styles = TextStyles::for_breakpoint(bp);

        if assets.font().is_none() && !self.warned_no_font {
            tracing::warn!("no font available, page text is not drawn");
            self.warned_no_font = true;
        }

        let mut ops = Vec::new();
        for (index, top) in runtime.layout().visible_sections(runtime.scroll_y()) {
            let frame = Rect::new(0.0, top, viewport.width, top + viewport.height);
            match &runtime.spec().sections[index] {
                SectionSpec::Static(s) => self.static_section(&mut ops, s, frame, &styles, assets),
                SectionSpec::Hero(h) => self.hero_section(&mut ops, h, frame, &styles, assets),
                SectionSpec::Converge(_) => {
                    if let Some(c) = runtime.controller(index) {
                        self.converge_section(&mut ops, c, frame, bp, assets);
                    }
                }
            }
        }

        Scene {
            width,
            height,
            clear: BACKGROUND,
            ops,
        }
    }

    fn static_section(
        &mut self,
        ops: &mut Vec<DrawOp>,
        s: &StaticSection,
        frame: Rect,
        styles: &TextStyles,
        assets: &PreparedAssetStore,
    ) {
        fill_rect(ops, frame, s.background_color());

        let column = (frame.width() - 2.0 * COLUMN_PAD_PX).clamp(1.0, COLUMN_MAX_PX) as f32;
        let title = self.text(
            assets,
            &s.title,
            styles.heading_px,
            FOREGROUND,
            column,
            TextAlign::Start,
        );
        let body = self.text(
            assets,
            &s.description,
            styles.body_px,
            MUTED,
            column,
            TextAlign::Start,
        );
        // the column shrinks to its widest line and sits centered
        let width = title
            .iter()
            .chain(body.iter())
            .map(SceneText::width)
            .fold(0.0, f64::max);
        let x = frame.center().x - width / 2.0;
        stack_text(ops, frame, x, title, body);
    }

    fn hero_section(
        &mut self,
        ops: &mut Vec<DrawOp>,
        h: &HeroSection,
        frame: Rect,
        styles: &TextStyles,
        assets: &PreparedAssetStore,
    ) {
        fill_rect(ops, frame, Rgba8::rgb(0xe2, 0xe8, 0xf0));
        if let Some((id, image)) = assets.image(&h.image) {
            ops.push(DrawOp::Fill {
                shape: Shape::Rect(frame),
                paint: Paint::Image {
                    id,
                    image: image.clone(),
                },
                transform: Affine::IDENTITY,
            });
        }
        fill_rect(ops, frame, Rgba8::rgba(0, 0, 0, 128));

        let column = (frame.width() - 2.0 * COLUMN_PAD_PX).clamp(1.0, COLUMN_MAX_PX) as f32;
        let title = self.text(
            assets,
            &h.title,
            styles.hero_title_px,
            HERO_TEXT,
            column,
            TextAlign::Center,
        );
        let body = self.text(
            assets,
            &h.description,
            styles.caption_px,
            HERO_TEXT,
            column,
            TextAlign::Center,
        );
        let x = frame.center().x - f64::from(column) / 2.0;
        stack_text(ops, frame, x, title, body);
    }

    fn converge_section(
        &mut self,
        ops: &mut Vec<DrawOp>,
        controller: &ConvergeController,
        frame: Rect,
        bp: Breakpoint,
        assets: &PreparedAssetStore,
    ) {
        let frame = match controller.overlay() {
            OverlayPlacement::Fixed(rect) => rect,
            OverlayPlacement::InFlow => frame,
        };
        fill_rect(ops, frame, BACKGROUND);
        grid(ops, frame);

        let layout = controller.layout();
        let constants = layout.map(|l| l.constants).unwrap_or_else(|| {
            let c = controller.config();
            LayoutConstants::for_breakpoint(bp, c.final_scale, c.scroll_vh)
        });
        let bp = constants.breakpoint;
        let styles = TextStyles::for_breakpoint(bp);
        let content = controller.content();

        // headline block, scaled about the section center
        let max_w = TextStyles::headline_max_width(bp, frame.width(), styles.headline_px);
        let headline = self.text(
            assets,
            &content.title,
            styles.headline_px,
            HEADLINE,
            max_w,
            TextAlign::Center,
        );
        let kicker = content
            .kicker
            .as_deref()
            .filter(|k| constants.show_kicker && !k.trim().is_empty())
            .and_then(|k| {
                let upper = k.to_uppercase();
                self.text(
                    assets,
                    &upper,
                    styles.kicker_px,
                    PRIMARY,
                    max_w,
                    TextAlign::Start,
                )
            });

        let kicker_h = kicker
            .as_ref()
            .map_or(0.0, |k| k.height() + 2.0 * KICKER_PAD_Y + KICKER_GAP);
        let headline_h = headline.as_ref().map_or(0.0, SceneText::height);
        let block_h = kicker_h + headline_h;
        let center = frame.center().to_vec2();
        let block = Affine::translate(center)
            * Affine::scale(controller.text_scale())
            * Affine::translate(Vec2::new(0.0, -block_h / 2.0));

        let mut text_ops = Vec::new();
        if let Some(k) = kicker {
            let pill_w = k.width() + 2.0 * KICKER_PAD_X;
            let pill_h = k.height() + 2.0 * KICKER_PAD_Y;
            let pill = Rect::new(-pill_w / 2.0, 0.0, pill_w / 2.0, pill_h);
            text_ops.push(DrawOp::Fill {
                shape: Shape::RoundedRect(RoundedRect::from_rect(pill, pill_h / 2.0)),
                paint: Paint::Solid(PRIMARY.with_alpha_mul(0.1)),
                transform: block,
            });
            text_ops.push(DrawOp::Text {
                transform: block * Affine::translate(Vec2::new(-k.width() / 2.0, KICKER_PAD_Y)),
                text: k,
            });
        }
        if let Some(h) = headline {
            text_ops.push(DrawOp::Text {
                transform: block * Affine::translate(Vec2::new(-f64::from(max_w) / 2.0, kicker_h)),
                text: h,
            });
        }
        ops.extend(text_ops);

        let Some(layout) = layout else {
            return;
        };
        let cards = controller.cards();
        let mut order: Vec<usize> = (0..cards.len().min(layout.cards.len())).collect();
        order.sort_by_key(|&i| layout.cards[i].z_index);

        for i in order {
            let g = &cards[i];
            if g.opacity <= 0.0 {
                continue;
            }
            let size = layout.cards[i].size;
            let (w, h) = (size.width, size.height);
            let transform = Affine::translate(center + g.position())
                * Affine::rotate(g.rotation_deg.to_radians())
                * Affine::scale(g.scale)
                * Affine::translate(Vec2::new(-w / 2.0, -h / 2.0));
            let body = Rect::new(0.0, 0.0, w, h);

            let mut card = Vec::with_capacity(SHADOW_STEPS + 2);
            for k in 0..SHADOW_STEPS {
                // widest, faintest layer first
                let spread = g.shadow.blur * 0.5 * (SHADOW_STEPS - k) as f64 / SHADOW_STEPS as f64;
                let r = body.inflate(spread, spread) + Vec2::new(0.0, g.shadow.offset_y);
                card.push(DrawOp::Fill {
                    shape: Shape::RoundedRect(RoundedRect::from_rect(r, CARD_RADIUS_PX + spread)),
                    paint: Paint::Solid(
                        Rgba8::rgb(0, 0, 0).with_alpha_mul(g.shadow.alpha / SHADOW_STEPS as f64),
                    ),
                    transform,
                });
            }
            // ring-1 black/5
            card.push(DrawOp::Fill {
                shape: Shape::RoundedRect(RoundedRect::from_rect(
                    body.inflate(1.0, 1.0),
                    CARD_RADIUS_PX + 1.0,
                )),
                paint: Paint::Solid(Rgba8::rgba(0, 0, 0, 13)),
                transform,
            });
            let source = &content.images[i].source;
            let paint = match assets.image(source) {
                Some((id, image)) => Paint::Image {
                    id,
                    image: image.clone(),
                },
                None => Paint::Solid(PLACEHOLDER_COLOR),
            };
            card.push(DrawOp::Fill {
                shape: Shape::RoundedRect(RoundedRect::from_rect(body, CARD_RADIUS_PX)),
                paint,
                transform,
            });

            if g.opacity >= 1.0 {
                ops.extend(card);
            } else {
                ops.push(DrawOp::Group {
                    opacity: g.opacity as f32,
                    ops: card,
                });
            }
        }
    }

    /// Shape `text`, reusing a cached layout when the same inputs were seen before.
    fn text(
        &mut self,
        assets: &PreparedAssetStore,
        text: &str,
        size_px: f32,
        color: Rgba8,
        box_width: f32,
        align: TextAlign,
    ) -> Option<SceneText> {
        let font = assets.font()?;
        if text.trim().is_empty() {
            return None;
        }
        let brush = TextBrushRgba8::from(color);

        let mut hasher = Fnv1a64::new_default();
        hasher.write_u64(font.id.as_u64());
        hasher.write_bytes(text.as_bytes());
        hasher.write_u8(0);
        hasher.write_u64(u64::from(size_px.to_bits()));
        hasher.write_u64(u64::from(box_width.to_bits()));
        hasher.write_bytes(&[brush.r, brush.g, brush.b, brush.a]);
        let key = hasher.finish();

        let layout = match self.text_cache.get(&key) {
            Some(layout) => layout.clone(),
            None => {
                let layout = match self.engine.layout_plain(
                    text,
                    &font.bytes,
                    size_px,
                    brush,
                    Some(box_width),
                ) {
                    Ok(layout) => Arc::new(layout),
                    Err(e) => {
                        tracing::warn!(error = %e, "text layout failed, skipping text");
                        return None;
                    }
                };
                if self.text_cache.len() >= TEXT_CACHE_LIMIT {
                    self.text_cache.clear();
                }
                self.text_cache.insert(key, layout.clone());
                layout
            }
        };
        Some(SceneText {
            layout,
            font: font.clone(),
            box_width,
            align,
        })
    }
}

fn fill_rect(ops: &mut Vec<DrawOp>, rect: Rect, color: Rgba8) {
    ops.push(DrawOp::Fill {
        shape: Shape::Rect(rect),
        paint: Paint::Solid(color),
        transform: Affine::IDENTITY,
    });
}

/// Faint square grid covering `frame`, anchored to its top-left corner.
fn grid(ops: &mut Vec<DrawOp>, frame: Rect) {
    let mut x = frame.x0 + GRID_STEP_PX;
    while x < frame.x1 {
        fill_rect(ops, Rect::new(x, frame.y0, x + 1.0, frame.y1), GRID_LINE);
        x += GRID_STEP_PX;
    }
    let mut y = frame.y0 + GRID_STEP_PX;
    while y < frame.y1 {
        fill_rect(ops, Rect::new(frame.x0, y, frame.x1, y + 1.0), GRID_LINE);
        y += GRID_STEP_PX;
    }
}

/// Heading over paragraph, vertically centered in `frame`, left edge at `x`.
fn stack_text(
    ops: &mut Vec<DrawOp>,
    frame: Rect,
    x: f64,
    title: Option<SceneText>,
    body: Option<SceneText>,
) {
    let title_h = title.as_ref().map_or(0.0, SceneText::height);
    let body_h = body.as_ref().map_or(0.0, SceneText::height);
    let gap = if title.is_some() && body.is_some() {
        PARAGRAPH_GAP
    } else {
        0.0
    };
    let mut y = frame.center().y - (title_h + gap + body_h) / 2.0;
    if let Some(t) = title {
        ops.push(DrawOp::Text {
            text: t,
            transform: Affine::translate(Vec2::new(x, y)),
        });
        y += title_h + gap;
    }
    if let Some(b) = body {
        ops.push(DrawOp::Text {
            text: b,
            transform: Affine::translate(Vec2::new(x, y)),
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/scene.rs"]
mod tests;
