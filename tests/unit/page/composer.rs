use super::*;
use crate::{
    converge::model::{ImageDescriptor, SectionContent},
    page::model::{ConvergeSection, StaticSection},
};

fn static_section(id: &str) -> SectionSpec {
    SectionSpec::Static(StaticSection {
        id: id.to_string(),
        title: id.to_uppercase(),
        description: String::new(),
        background: "#e2e8f0".to_string(),
    })
}

fn page() -> PageSpec {
    PageSpec {
        title: "test".to_string(),
        font: None,
        converge: Default::default(),
        sections: vec![
            static_section("intro"),
            SectionSpec::Converge(ConvergeSection {
                id: None,
                content: SectionContent {
                    title: "t".to_string(),
                    kicker: None,
                    images: vec![ImageDescriptor::new("a.png"); 6],
                },
            }),
            static_section("stats"),
        ],
    }
}

fn desktop() -> ViewportMetrics {
    ViewportMetrics::new(1366.0, 768.0)
}

#[test]
fn pinned_section_reserves_scroll_length() {
    let layout = PageLayout::compose(&page(), desktop());
    let tops: Vec<f64> = layout.sections.iter().map(|s| s.top).collect();
    assert_eq!(tops, vec![0.0, 768.0, 4608.0]);
    assert_eq!(layout.document_height, 5376.0);
    assert_eq!(layout.max_scroll(), 4608.0);
    assert_eq!(
        layout.sections[1].pin,
        Some(PinRange {
            start: 768.0,
            distance: 3072.0
        })
    );
    assert_eq!(layout.anchor(1), Some(SectionAnchor::new(768.0)));
    assert_eq!(layout.anchor(0), None);
    assert_eq!(layout.anchor(9), None);
}

#[test]
fn snap_points_cover_starts_and_pin_ends() {
    let layout = PageLayout::compose(&page(), desktop());
    assert_eq!(layout.snap_points(), &[0.0, 768.0, 3840.0, 4608.0]);
    assert_eq!(layout.snap(2000.0), 768.0);
    assert_eq!(layout.snap(3000.0), 3840.0);
    assert_eq!(layout.snap(-50.0), 0.0);
    assert_eq!(layout.snap(1e9), 4608.0);
}

#[test]
fn pinned_section_holds_at_viewport_top() {
    let layout = PageLayout::compose(&page(), desktop());
    assert_eq!(layout.section_screen_top(1, 500.0), Some(268.0));
    assert_eq!(layout.section_screen_top(1, 768.0), Some(0.0));
    assert_eq!(layout.section_screen_top(1, 3000.0), Some(0.0));
    assert_eq!(layout.section_screen_top(1, 4000.0), Some(-160.0));
    assert_eq!(layout.section_screen_top(2, 4000.0), Some(608.0));
    assert_eq!(layout.section_screen_top(3, 0.0), None);

    assert_eq!(layout.visible_sections(1000.0), vec![(1, 0.0)]);
    assert_eq!(
        layout.visible_sections(4000.0),
        vec![(1, -160.0), (2, 608.0)]
    );
}

#[test]
fn narrow_viewport_shortens_pin_and_short_pages_do_not_scroll() {
    let layout = PageLayout::compose(&page(), ViewportMetrics::new(375.0, 667.0));
    assert_eq!(layout.sections[1].pin.map(|p| p.distance), Some(2001.0));

    let single = PageSpec {
        sections: vec![static_section("only")],
        ..page()
    };
    let layout = PageLayout::compose(&single, desktop());
    assert_eq!(layout.max_scroll(), 0.0);
    assert_eq!(layout.clamp_scroll(300.0), 0.0);
    assert_eq!(layout.snap_points(), &[0.0]);
}
