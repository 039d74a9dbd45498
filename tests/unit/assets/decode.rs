use super::*;

fn png_bytes(img: &image::RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )
    .unwrap();
    bytes
}

fn striped(width: u32, height: u32) -> PreparedImage {
    // column index encoded in red, row index in green
    let mut data = Vec::new();
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&[x as u8, y as u8, 0, 255]);
        }
    }
    PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(data),
    }
}

#[test]
fn decode_premultiplies_alpha() {
    let mut img = image::RgbaImage::new(2, 1);
    img.put_pixel(0, 0, image::Rgba([200, 100, 50, 128]));
    img.put_pixel(1, 0, image::Rgba([255, 255, 255, 0]));
    let prepared = decode_image(&png_bytes(&img)).unwrap();
    assert_eq!((prepared.width, prepared.height), (2, 1));
    assert_eq!(&prepared.rgba8_premul[..4], &[100, 50, 25, 128]);
    assert_eq!(&prepared.rgba8_premul[4..], &[0, 0, 0, 0]);
}

#[test]
fn decode_rejects_garbage() {
    assert!(decode_image(b"not an image").is_err());
}

#[test]
fn cover_crop_keeps_the_center() {
    let wide = striped(12, 5);
    let cropped = cover_crop(&wide, 1.2);
    assert_eq!((cropped.width, cropped.height), (6, 5));
    assert_eq!(cropped.rgba8_premul.len(), 6 * 5 * 4);
    // first column of the crop is source column 3
    assert_eq!(cropped.rgba8_premul[0], 3);

    let tall = striped(6, 15);
    let cropped = cover_crop(&tall, 1.2);
    assert_eq!((cropped.width, cropped.height), (6, 5));
    // first row of the crop is source row 5
    assert_eq!(cropped.rgba8_premul[1], 5);
}

#[test]
fn cover_crop_is_a_no_op_at_matching_aspect() {
    let img = striped(6, 5);
    let same = cover_crop(&img, 1.2);
    assert!(Arc::ptr_eq(&img.rgba8_premul, &same.rgba8_premul));
    let bad = cover_crop(&img, f64::NAN);
    assert!(Arc::ptr_eq(&img.rgba8_premul, &bad.rgba8_premul));
}

#[test]
fn downscale_preserves_aspect_and_never_upscales() {
    let img = striped(40, 20);
    let small = downscale_to_fit(&img, 10, 10);
    assert_eq!((small.width, small.height), (10, 5));
    assert_eq!(small.rgba8_premul.len(), 10 * 5 * 4);

    let same = downscale_to_fit(&img, 100, 100);
    assert_eq!((same.width, same.height), (40, 20));
}

#[test]
fn placeholder_is_premultiplied_solid() {
    let img = placeholder_image(3, 2, Rgba8::rgba(200, 0, 0, 128));
    assert_eq!(img.rgba8_premul.len(), 3 * 2 * 4);
    assert!(
        img.rgba8_premul
            .chunks_exact(4)
            .all(|px| px == [100, 0, 0, 128])
    );
}
