use std::sync::Arc;

use anyhow::Context;

use crate::{
    assets::store::PreparedImage,
    foundation::{core::Rgba8, error::ConvergeResult},
};

/// Largest edge kept after decoding. Bigger sources are downscaled on load.
pub const MAX_IMAGE_EDGE: u32 = 4096;

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> ConvergeResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    let img = PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    };
    Ok(downscale_to_fit(&img, MAX_IMAGE_EDGE, MAX_IMAGE_EDGE))
}

/// Center crop to `aspect` (width / height), like CSS `object-fit: cover`.
///
/// Returns a cheap clone when the image already has the requested aspect or `aspect` is unusable.
pub fn cover_crop(img: &PreparedImage, aspect: f64) -> PreparedImage {
    if img.width == 0 || img.height == 0 || !aspect.is_finite() || aspect <= 0.0 {
        return img.clone();
    }
    let (w, h) = (f64::from(img.width), f64::from(img.height));
    let (crop_w, crop_h) = if w / h > aspect {
        ((h * aspect).round().max(1.0) as u32, img.height)
    } else {
        (img.width, (w / aspect).round().max(1.0) as u32)
    };
    let crop_w = crop_w.min(img.width);
    let crop_h = crop_h.min(img.height);
    if crop_w == img.width && crop_h == img.height {
        return img.clone();
    }

    let x0 = ((img.width - crop_w) / 2) as usize;
    let y0 = ((img.height - crop_h) / 2) as usize;
    let stride = img.width as usize * 4;
    let row_len = crop_w as usize * 4;
    let mut out = Vec::with_capacity(row_len * crop_h as usize);
    for y in y0..y0 + crop_h as usize {
        let start = y * stride + x0 * 4;
        out.extend_from_slice(&img.rgba8_premul[start..start + row_len]);
    }
    PreparedImage {
        width: crop_w,
        height: crop_h,
        rgba8_premul: Arc::new(out),
    }
}

/// Shrink `img` so it fits inside `max_w` x `max_h`, preserving aspect. Never upscales.
pub fn downscale_to_fit(img: &PreparedImage, max_w: u32, max_h: u32) -> PreparedImage {
    if img.width <= max_w && img.height <= max_h {
        return img.clone();
    }
    let s = (f64::from(max_w) / f64::from(img.width)).min(f64::from(max_h) / f64::from(img.height));
    let nw = ((f64::from(img.width) * s).round() as u32).max(1);
    let nh = ((f64::from(img.height) * s).round() as u32).max(1);

    // Filtering premultiplied data keeps edges free of dark fringes.
    let Some(buf) =
        image::RgbaImage::from_raw(img.width, img.height, img.rgba8_premul.as_ref().clone())
    else {
        return img.clone();
    };
    let resized = image::imageops::resize(&buf, nw, nh, image::imageops::FilterType::Triangle);
    PreparedImage {
        width: nw,
        height: nh,
        rgba8_premul: Arc::new(resized.into_raw()),
    }
}

/// Solid image used in place of a missing or undecodable source.
pub fn placeholder_image(width: u32, height: u32, color: Rgba8) -> PreparedImage {
    let px = color.to_premul();
    let n = width as usize * height as usize;
    let mut data = Vec::with_capacity(n * 4);
    for _ in 0..n {
        data.extend_from_slice(&px);
    }
    PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(data),
    }
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
