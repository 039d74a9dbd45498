use std::io::Cursor;

use super::*;
use crate::page::model::PageSpec;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "converge_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn write_png(path: &Path, w: u32, h: u32) {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, &buf).unwrap();
}

const PAGE: &str = r#"{
  "sections": [
    { "kind": "hero", "id": "hero", "title": "ICPC", "description": "", "image": "/images/hero.png" },
    {
      "kind": "converge",
      "title": "t",
      "images": [
        { "source": "images/a.png" },
        { "source": "images/missing.png" },
        { "source": "images/a.png" },
        { "source": "../escape.png" }
      ]
    }
  ]
}"#;

#[test]
fn normalize_rel_path_rejects_escapes() {
    assert_eq!(normalize_rel_path("a/./b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("a/../b.png").is_err());
    assert!(normalize_rel_path("").is_err());
    assert!(normalize_rel_path("./").is_err());
}

#[test]
fn prepare_loads_present_images_and_records_missing_ones() {
    let tmp = temp_dir("store_prepare");
    write_png(&tmp.join("images/hero.png"), 4, 2);
    write_png(&tmp.join("images/a.png"), 3, 3);

    let spec = PageSpec::from_json_str(PAGE).unwrap();
    let store = PreparedAssetStore::prepare(&spec, &tmp).unwrap();

    let (hero_id, hero) = store.image("/images/hero.png").unwrap();
    assert_eq!((hero.width, hero.height), (4, 2));
    assert_eq!(hero.aspect(), 2.0);
    assert_eq!(hero_id, AssetId::for_path(b'I', "images/hero.png"));

    let (a_id, a) = store.image("images/a.png").unwrap();
    assert_eq!((a.width, a.height), (3, 3));
    assert_ne!(a_id, hero_id);

    let (missing_id, placeholder) = store.image("images/missing.png").unwrap();
    assert_eq!(missing_id, AssetId::for_path(b'P', "images/missing.png"));
    assert_eq!((placeholder.width, placeholder.height), (6, 5));
    assert_eq!(&placeholder.rgba8_premul[..4], &PLACEHOLDER_COLOR.to_premul());
    assert!(store.image("images/never-referenced.png").is_none());
    assert_eq!(
        store.missing(),
        &["images/missing.png".to_string(), "../escape.png".to_string()]
    );
    assert!(store.font().is_none());
    assert_eq!(store.root(), tmp.as_path());

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn inserted_images_are_addressable_by_source() {
    let mut store = PreparedAssetStore::empty();
    assert!(store.image("x.png").is_none());
    let img = crate::assets::decode::placeholder_image(2, 2, Rgba8::rgb(1, 2, 3));
    let id = store.insert_image("/x.png", img);
    assert_eq!(id, AssetId::for_path(b'I', "x.png"));
    assert_eq!(store.image("/x.png").map(|(i, _)| i), Some(id));
}

#[test]
fn garbage_font_bytes_are_rejected() {
    let mut store = PreparedAssetStore::empty();
    assert!(store.set_font(b"definitely not a font".to_vec()).is_err());
    assert!(store.font().is_none());
}

#[test]
fn asset_ids_are_stable_and_kind_scoped() {
    let a = AssetId::for_path(b'I', "images/a.png");
    assert_eq!(a, AssetId::for_path(b'I', "images/a.png"));
    assert_ne!(a, AssetId::for_path(b'F', "images/a.png"));
    assert_eq!(AssetId::from_u64(a.as_u64()), a);
}

#[test]
fn text_layout_rejects_bad_sizes() {
    let mut engine = TextLayoutEngine::new();
    let brush = TextBrushRgba8::from(Rgba8::rgb(255, 255, 255));
    assert!(engine.layout_plain("x", &[], 0.0, brush, None).is_err());
    assert!(engine.layout_plain("x", &[], f32::NAN, brush, None).is_err());
    assert!(engine.layout_plain("x", &[], 12.0, brush, None).is_err());
    assert!(engine.last_family_name().is_none());
}
