use super::*;
use crate::{assets::decode::placeholder_image, foundation::core::ViewportMetrics, page::model::PageSpec};

const PAGE: &str = r##"{
  "sections": [
    { "kind": "static", "id": "intro", "title": "HERO", "description": "imagen" },
    {
      "kind": "converge",
      "title": "El concurso de programación más antiguo",
      "kicker": "¿Qué es el ICPC?",
      "images": [ { "source": "a.png" }, { "source": "b.png" } ]
    }
  ]
}"##;

const SYSTEM_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

fn runtime() -> PageRuntime {
    PageRuntime::new(
        PageSpec::from_json_str(PAGE).unwrap(),
        ViewportMetrics::new(1280.0, 720.0),
    )
    .unwrap()
}

fn flatten(ops: &[DrawOp]) -> Vec<&DrawOp> {
    let mut out = Vec::new();
    for op in ops {
        match op {
            DrawOp::Group { ops, .. } => out.extend(flatten(ops)),
            other => out.push(other),
        }
    }
    out
}

fn pin_end(rt: &PageRuntime) -> f64 {
    rt.layout().section(1).unwrap().pin.unwrap().end()
}

#[test]
fn static_section_paints_its_background_first() {
    let rt = runtime();
    let scene = build_scene(&rt, &PreparedAssetStore::empty());
    assert_eq!((scene.width, scene.height), (1280, 720));
    assert_eq!(scene.clear, BACKGROUND);
    match &scene.ops[0] {
        DrawOp::Fill {
            shape: Shape::Rect(r),
            paint: Paint::Solid(c),
            ..
        } => {
            assert_eq!(*r, Rect::new(0.0, 0.0, 1280.0, 720.0));
            assert_eq!(*c, Rgba8::rgb(0xe2, 0xe8, 0xf0));
        }
        other => panic!("unexpected first op: {other:?}"),
    }
}

#[test]
fn converged_cards_use_prepared_images_and_placeholders() {
    let mut rt = runtime();
    let y = pin_end(&rt);
    rt.scroll_to(y);

    let mut assets = PreparedAssetStore::empty();
    let id = assets.insert_image("a.png", placeholder_image(12, 10, Rgba8::rgb(200, 0, 0)));
    let scene = build_scene(&rt, &assets);

    // only the converge section is on screen; its white backdrop leads
    assert!(matches!(
        &scene.ops[0],
        DrawOp::Fill { paint: Paint::Solid(c), .. } if *c == BACKGROUND
    ));
    let ops = flatten(&scene.ops);
    let images: Vec<AssetId> = ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Fill {
                paint: Paint::Image { id, .. },
                ..
            } => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(images, vec![id]);

    let placeholders = ops
        .iter()
        .filter(|op| {
            matches!(
                op,
                DrawOp::Fill {
                    shape: Shape::RoundedRect(_),
                    paint: Paint::Solid(c),
                    ..
                } if *c == PLACEHOLDER_COLOR
            )
        })
        .count();
    assert_eq!(placeholders, 1);
    assert!(!ops.iter().any(|op| matches!(op, DrawOp::Text { .. })));
}

#[test]
fn cards_paint_in_z_order() {
    let mut rt = runtime();
    let y = pin_end(&rt);
    rt.scroll_to(y);
    let mut assets = PreparedAssetStore::empty();
    let a = assets.insert_image("a.png", placeholder_image(6, 5, Rgba8::rgb(1, 2, 3)));
    let b = assets.insert_image("b.png", placeholder_image(6, 5, Rgba8::rgb(4, 5, 6)));

    let scene = build_scene(&rt, &assets);
    let order: Vec<AssetId> = flatten(&scene.ops)
        .iter()
        .filter_map(|op| match op {
            DrawOp::Fill {
                paint: Paint::Image { id, .. },
                ..
            } => Some(*id),
            _ => None,
        })
        .collect();
    // the first card stacks on top, so it paints last
    assert_eq!(order, vec![b, a]);
}

#[test]
fn op_count_includes_group_children() {
    let solid = |c| DrawOp::Fill {
        shape: Shape::Rect(Rect::new(0.0, 0.0, 1.0, 1.0)),
        paint: Paint::Solid(c),
        transform: Affine::IDENTITY,
    };
    let scene = Scene {
        width: 1,
        height: 1,
        clear: BACKGROUND,
        ops: vec![
            solid(BACKGROUND),
            DrawOp::Group {
                opacity: 0.5,
                ops: vec![solid(HEADLINE), solid(PRIMARY)],
            },
        ],
    };
    assert_eq!(scene.op_count(), 4);
}

#[test]
fn text_is_shaped_when_a_font_is_available() {
    let Ok(bytes) = std::fs::read(SYSTEM_FONT) else {
        return;
    };
    let mut assets = PreparedAssetStore::empty();
    assets.set_font(bytes).unwrap();

    let mut rt = runtime();
    let mut builder = SceneBuilder::new();
    let scene = builder.build(&rt, &assets);
    let texts = flatten(&scene.ops)
        .iter()
        .filter(|op| matches!(op, DrawOp::Text { .. }))
        .count();
    assert_eq!(texts, 2);

    let y = pin_end(&rt);
    rt.scroll_to(y);
    let scene = builder.build(&rt, &assets);
    let headline = flatten(&scene.ops).into_iter().find_map(|op| match op {
        DrawOp::Text { text, .. } if text.align == TextAlign::Center => Some(text.clone()),
        _ => None,
    });
    let headline = headline.expect("headline text");
    assert!(headline.height() > 0.0);
    assert!(headline.width() <= f64::from(headline.box_width) + 0.5);
}
