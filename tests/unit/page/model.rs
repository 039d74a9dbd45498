use super::*;

const PAGE: &str = r##"{
  "title": "ICPC",
  "font": "fonts/Nunito.ttf",
  "sections": [
    { "kind": "hero", "id": "hero", "title": "ICPC", "description": "2025", "image": "images/hero.jpg" },
    { "kind": "static", "id": "intro", "title": "HERO", "description": "texto" },
    {
      "kind": "converge",
      "title": "El concurso de programación más antiguo",
      "kicker": "¿Qué es el ICPC?",
      "images": [
        { "source": "images/a.png" },
        { "source": "images/b.png", "altText": "medallas" }
      ]
    },
    { "kind": "static", "id": "stats", "title": "DATA", "description": "", "background": "#cbd5e1" }
  ]
}"##;

#[test]
fn parses_all_section_kinds() {
    let spec = PageSpec::from_json_str(PAGE).unwrap();
    spec.validate().unwrap();
    assert_eq!(spec.sections.len(), 4);
    assert_eq!(spec.font.as_deref(), Some("fonts/Nunito.ttf"));
    assert_eq!(spec.converge, ConvergeConfig::default());

    let SectionSpec::Static(intro) = &spec.sections[1] else {
        panic!("expected static section");
    };
    assert_eq!(intro.background, "#e2e8f0");
    assert_eq!(intro.background_color(), Rgba8::rgb(0xe2, 0xe8, 0xf0));

    let SectionSpec::Converge(c) = &spec.sections[2] else {
        panic!("expected converge section");
    };
    assert_eq!(c.id, None);
    assert_eq!(c.content.kicker.as_deref(), Some("¿Qué es el ICPC?"));
    assert_eq!(c.content.images[0].alt(), "");
    assert_eq!(c.content.images[1].alt(), "medallas");
    assert!(spec.sections[2].is_pinned());
    assert_eq!(spec.sections[2].kind_name(), "converge");
}

#[test]
fn converge_overrides_merge_with_defaults() {
    let spec = PageSpec::from_json_str(
        r#"{ "converge": { "scroll_vh": 2.5 }, "sections": [ { "kind": "converge", "images": [] } ] }"#,
    )
    .unwrap();
    assert_eq!(spec.converge.scroll_vh, 2.5);
    assert_eq!(spec.converge.initial_scale, 1.8);
    spec.validate().unwrap();
}

#[test]
fn image_sources_follow_section_order() {
    let spec = PageSpec::from_json_str(PAGE).unwrap();
    let sources: Vec<&str> = spec.image_sources().collect();
    assert_eq!(
        sources,
        vec!["images/hero.jpg", "images/a.png", "images/b.png"]
    );
}

#[test]
fn validate_rejects_bad_pages() {
    let mut spec = PageSpec::from_json_str(PAGE).unwrap();
    if let SectionSpec::Static(s) = &mut spec.sections[3] {
        s.id = "intro".to_string();
    }
    assert!(spec.validate().is_err());

    let mut spec = PageSpec::from_json_str(PAGE).unwrap();
    if let SectionSpec::Static(s) = &mut spec.sections[1] {
        s.background = "slate".to_string();
    }
    assert!(spec.validate().is_err());

    let mut spec = PageSpec::from_json_str(PAGE).unwrap();
    if let SectionSpec::Hero(h) = &mut spec.sections[0] {
        h.image = " ".to_string();
    }
    assert!(spec.validate().is_err());

    let mut spec = PageSpec::from_json_str(PAGE).unwrap();
    spec.sections.clear();
    assert!(spec.validate().is_err());
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = PageSpec::from_json_str("{ \"sections\": [ { \"kind\": \"nope\" } ] }").unwrap_err();
    assert!(matches!(err, ConvergeError::Serde(_)));
}
