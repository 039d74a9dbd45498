use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;

use crate::{
    assets::decode as assets_decode,
    foundation::{
        core::Rgba8,
        error::{ConvergeError, ConvergeResult},
        math::Fnv1a64,
    },
    page::model::PageSpec,
};

#[derive(Clone, Debug)]
/// Prepared raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Width over height; 1 for empty images.
    pub fn aspect(&self) -> f64 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            f64::from(self.width) / f64::from(self.height)
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

#[derive(Clone)]
/// Font file bytes plus the family name Parley resolved from them.
pub struct PreparedFont {
    /// Stable identity of the font source.
    pub id: AssetId,
    /// Raw font file bytes.
    pub bytes: Arc<Vec<u8>>,
    /// Primary family name found in the font data.
    pub family: String,
}

impl std::fmt::Debug for PreparedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedFont")
            .field("id", &self.id)
            .field("bytes_len", &self.bytes.len())
            .field("family", &self.family)
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Stable hashed identifier used for prepared assets.
pub struct AssetId(pub(crate) u64);

impl AssetId {
    /// Construct an [`AssetId`] from raw 64-bit value.
    pub fn from_u64(raw: u64) -> Self {
        Self(raw)
    }

    /// Access raw 64-bit identifier.
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Identity of an asset of `kind` at normalized path `norm_path`.
    pub fn for_path(kind: u8, norm_path: &str) -> Self {
        let mut hasher = Fnv1a64::new_default();
        hasher.write_u8(kind);
        hasher.write_bytes(norm_path.as_bytes());
        Self(hasher.finish())
    }
}

/// Fill used for images that could not be loaded.
pub const PLACEHOLDER_COLOR: Rgba8 = Rgba8::rgb(0xcb, 0xd5, 0xe1);

const KIND_IMAGE: u8 = b'I';
const KIND_PLACEHOLDER: u8 = b'P';
const KIND_FONT: u8 = b'F';

#[derive(Clone, Debug, Default)]
/// Decoded images and font for one page, keyed by their source strings.
///
/// Preparation front-loads all IO so scene building and rasterization stay IO-free. Missing or
/// undecodable sources are recorded and logged, never fatal: the renderer draws placeholders and
/// skips text instead.
pub struct PreparedAssetStore {
    root: PathBuf,
    ids_by_source: HashMap<String, AssetId>,
    images: HashMap<AssetId, PreparedImage>,
    missing: Vec<String>,
    font: Option<PreparedFont>,
}

impl PreparedAssetStore {
    /// Store with no assets; every image renders as a placeholder and text is skipped.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load every image and the font referenced by `spec`, resolving paths under `root`.
    #[tracing::instrument(skip(spec, root), fields(images = spec.image_sources().count()))]
    pub fn prepare(spec: &PageSpec, root: impl Into<PathBuf>) -> ConvergeResult<Self> {
        let mut out = Self {
            root: root.into(),
            ..Self::default()
        };

        for source in spec.image_sources() {
            if out.ids_by_source.contains_key(source) {
                continue;
            }
            match out.load_image(source) {
                Ok((id, img)) => {
                    out.ids_by_source.insert(source.to_string(), id);
                    out.images.insert(id, img);
                }
                Err(e) => {
                    tracing::warn!(source, error = %e, "image unavailable, using placeholder");
                    let id = AssetId::for_path(KIND_PLACEHOLDER, source);
                    out.ids_by_source.insert(source.to_string(), id);
                    out.images.insert(
                        id,
                        assets_decode::placeholder_image(6, 5, PLACEHOLDER_COLOR),
                    );
                    out.missing.push(source.to_string());
                }
            }
        }

        let font_source = match spec.font.as_deref() {
            Some(f) => Some(f.to_string()),
            None => discover_font(&out.root),
        };
        match font_source {
            Some(source) => match out.load_font(&source) {
                Ok(font) => {
                    tracing::debug!(source, family = %font.family, "font loaded");
                    out.font = Some(font);
                }
                Err(e) => tracing::warn!(source, error = %e, "font unavailable, text is skipped"),
            },
            None => tracing::warn!("no font configured or found under fonts/, text is skipped"),
        }

        tracing::debug!(
            images = out.images.len(),
            missing = out.missing.len(),
            "assets prepared"
        );
        Ok(out)
    }

    /// Return root directory used when resolving relative asset paths.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Prepared image for a page source string. Sources that failed to load map to a placeholder;
    /// sources never seen by [`PreparedAssetStore::prepare`] give `None`.
    pub fn image(&self, source: &str) -> Option<(AssetId, &PreparedImage)> {
        let id = *self.ids_by_source.get(source)?;
        self.images.get(&id).map(|img| (id, img))
    }

    /// Sources that failed to load, in first-reference order.
    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    pub fn font(&self) -> Option<&PreparedFont> {
        self.font.as_ref()
    }

    /// Register an already decoded image under `source`.
    pub fn insert_image(&mut self, source: impl Into<String>, img: PreparedImage) -> AssetId {
        let source = source.into();
        let id = AssetId::for_path(KIND_IMAGE, &web_path(&source));
        self.missing.retain(|m| *m != source);
        self.ids_by_source.insert(source, id);
        self.images.insert(id, img);
        id
    }

    /// Use `bytes` as the page font. Fails when Parley finds no font family in them.
    pub fn set_font(&mut self, bytes: Vec<u8>) -> ConvergeResult<()> {
        let mut hasher = Fnv1a64::new_default();
        hasher.write_u8(KIND_FONT);
        hasher.write_u64(bytes.len() as u64);
        hasher.write_bytes(&bytes);
        self.font = Some(prepared_font(AssetId(hasher.finish()), bytes)?);
        Ok(())
    }

    fn load_image(&self, source: &str) -> ConvergeResult<(AssetId, PreparedImage)> {
        let norm = normalize_rel_path(&web_path(source))?;
        let bytes = self.read_bytes(&norm)?;
        let img = assets_decode::decode_image(&bytes)?;
        Ok((AssetId::for_path(KIND_IMAGE, &norm), img))
    }

    fn load_font(&self, source: &str) -> ConvergeResult<PreparedFont> {
        let norm = normalize_rel_path(&web_path(source))?;
        let bytes = self.read_bytes(&norm)?;
        prepared_font(AssetId::for_path(KIND_FONT, &norm), bytes)
    }

    fn read_bytes(&self, norm_path: &str) -> ConvergeResult<Vec<u8>> {
        let path = self.root.join(Path::new(norm_path));
        std::fs::read(&path)
            .with_context(|| format!("read asset bytes from '{}'", path.display()))
            .map_err(ConvergeError::from)
    }
}

fn prepared_font(id: AssetId, bytes: Vec<u8>) -> ConvergeResult<PreparedFont> {
    let mut engine = TextLayoutEngine::new();
    let family = engine.register_font(&bytes)?;
    Ok(PreparedFont {
        id,
        bytes: Arc::new(bytes),
        family,
    })
}

/// First `.ttf`/`.otf`/`.ttc` file under `root/fonts`, in name order.
fn discover_font(root: &Path) -> Option<String> {
    let rd = std::fs::read_dir(root.join("fonts")).ok()?;
    let mut names: Vec<String> = rd
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|s| s.to_str())
                .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc"))
                .unwrap_or(false)
        })
        .filter_map(|p| p.file_name()?.to_str().map(|n| format!("fonts/{n}")))
        .collect();
    names.sort();
    names.into_iter().next()
}

/// Site-absolute web paths (`/images/a.png`) resolve against the asset root.
fn web_path(source: &str) -> String {
    source.trim().trim_start_matches('/').to_string()
}

/// Normalize and validate root-relative asset paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> ConvergeResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(ConvergeError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(ConvergeError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(ConvergeError::validation(
                "asset paths must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(ConvergeError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

/// Stateful helper for building Parley text layouts from raw font bytes.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    registered: HashMap<u64, String>,
    last_family_name: Option<String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct a new layout engine with fresh Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            registered: HashMap::new(),
            last_family_name: None,
        }
    }

    /// Return last successfully resolved family name, if any.
    pub fn last_family_name(&self) -> Option<String> {
        self.last_family_name.clone()
    }

    /// Register font bytes with the collection and return their primary family name.
    ///
    /// Registration is remembered per font content, so repeated layouts with the same font do
    /// not grow the collection.
    pub fn register_font(&mut self, font_bytes: &[u8]) -> ConvergeResult<String> {
        let mut hasher = Fnv1a64::new_default();
        hasher.write_u64(font_bytes.len() as u64);
        hasher.write_bytes(font_bytes);
        let key = hasher.finish();
        if let Some(name) = self.registered.get(&key) {
            self.last_family_name = Some(name.clone());
            return Ok(name.clone());
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            ConvergeError::validation("no font families registered from font bytes")
        })?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| ConvergeError::validation("registered font family has no name"))?
            .to_string();
        self.registered.insert(key, family_name.clone());
        self.last_family_name = Some(family_name.clone());
        Ok(family_name)
    }

    /// Shape and lay out plain text using provided font bytes and styling.
    pub fn layout_plain(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
        brush: TextBrushRgba8,
        max_width_px: Option<f32>,
    ) -> ConvergeResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ConvergeError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let family_name = self.register_font(font_bytes)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        if let Some(w) = max_width_px {
            layout.break_all_lines(Some(w));
            layout.align(
                Some(w),
                parley::Alignment::Start,
                parley::AlignmentOptions::default(),
            );
        } else {
            layout.break_all_lines(None);
        }

        Ok(layout)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
