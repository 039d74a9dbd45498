use super::*;
use crate::converge::model::ImageDescriptor;

const TOP: f64 = 768.0;

fn content(n: usize) -> SectionContent {
    SectionContent {
        title: "Pregunta".to_string(),
        kicker: Some("ICPC".to_string()),
        images: (0..n)
            .map(|i| ImageDescriptor::new(format!("img/{i}.jpg")))
            .collect(),
    }
}

fn desktop() -> ViewportMetrics {
    ViewportMetrics::new(1366.0, 768.0)
}

fn mounted(n: usize, signals: &mut ViewportSignals) -> ConvergeController {
    let mut c = ConvergeController::new(1, content(n), ConvergeConfig::default()).unwrap();
    assert!(c.mount(Some(SectionAnchor::new(TOP)), desktop(), 0.0, signals));
    c
}

#[test]
fn mount_without_anchor_is_a_noop() {
    let mut signals = ViewportSignals::new();
    let mut c = ConvergeController::new(0, content(3), ConvergeConfig::default()).unwrap();
    assert!(!c.mount(None, desktop(), 0.0, &mut signals));
    assert!(!c.is_mounted());
    assert!(c.cards().is_empty());
    c.on_scroll(5000.0, desktop(), &mut signals);
    assert_eq!(signals.active_count(), 0);
    assert!(c.kill(&mut signals));
}

#[test]
fn invalid_config_is_rejected() {
    let config = ConvergeConfig {
        scroll_vh: 0.0,
        ..ConvergeConfig::default()
    };
    assert!(ConvergeController::new(0, content(1), config).is_err());
}

#[test]
fn mount_places_cards_at_spawn() {
    let mut signals = ViewportSignals::new();
    let c = mounted(6, &mut signals);
    let layout = c.layout().unwrap();
    assert_eq!(c.cards().len(), 6);
    assert_eq!(c.cards(), layout.sample_all(0.0).as_slice());
    assert_eq!(c.text_scale(), 1.8);
    assert!(!c.is_pinned());
    assert_eq!(c.overlay(), OverlayPlacement::InFlow);
    assert_eq!(c.listener(), None);
    assert_eq!(c.trigger().unwrap().distance(), 768.0 * 4.0);
}

#[test]
fn listener_is_attached_only_while_pinned() {
    let mut signals = ViewportSignals::new();
    let mut c = mounted(4, &mut signals);
    let len = c.trigger().unwrap().distance();

    c.on_scroll(TOP + 100.0, desktop(), &mut signals);
    assert!(c.is_pinned());
    assert_eq!(signals.active_count(), 1);
    assert_eq!(signals.subscribers().collect::<Vec<_>>(), vec![1]);
    assert_eq!(
        c.overlay(),
        OverlayPlacement::Fixed(Rect::new(0.0, 0.0, 1366.0, 768.0))
    );

    c.on_scroll(TOP + 200.0, desktop(), &mut signals);
    assert_eq!(signals.attached_total(), 1);

    c.on_scroll(TOP + len + 1.0, desktop(), &mut signals);
    assert!(!c.is_pinned());
    assert_eq!(signals.active_count(), 0);
    assert_eq!(c.overlay(), OverlayPlacement::InFlow);
    assert_eq!(c.progress(), 1.0);

    c.on_scroll(TOP + len - 1.0, desktop(), &mut signals);
    assert!(c.is_pinned());
    assert_eq!(signals.active_count(), 1);
    assert_eq!(signals.attached_total(), 2);

    c.on_scroll(0.0, desktop(), &mut signals);
    assert_eq!(signals.active_count(), 0);
    assert_eq!(c.progress(), 0.0);
}

#[test]
fn scroll_progress_drives_geometry() {
    let mut signals = ViewportSignals::new();
    let mut c = mounted(5, &mut signals);
    let len = c.trigger().unwrap().distance();
    c.on_scroll(TOP + len * 0.5, desktop(), &mut signals);
    assert!((c.progress() - 0.5).abs() < 1e-12);
    let expected = c.layout().unwrap().sample_all(c.progress());
    assert_eq!(c.cards(), expected.as_slice());
    assert!(c.text_scale() < 1.8);

    c.on_scroll(TOP + len, desktop(), &mut signals);
    assert!((c.text_scale() - 0.7).abs() < 1e-9);
}

#[test]
fn repeated_refresh_is_idempotent() {
    let mut signals = ViewportSignals::new();
    let mut c = mounted(6, &mut signals);
    c.on_scroll(TOP + 900.0, desktop(), &mut signals);

    let portrait = ViewportMetrics::new(800.0, 1280.0);
    c.refresh(SectionAnchor::new(1280.0), portrait, portrait, &mut signals);
    let first_cards = c.cards().to_vec();
    let first_targets = c.layout().unwrap().cards.clone();
    let first_progress = c.progress();

    c.refresh(SectionAnchor::new(1280.0), portrait, portrait, &mut signals);
    assert_eq!(c.cards(), first_cards.as_slice());
    assert_eq!(c.layout().unwrap().cards, first_targets);
    assert_eq!(c.progress(), first_progress);
    assert!(signals.active_count() <= 1);
}

#[test]
fn refresh_while_pinned_moves_overlay_and_rescales_range() {
    let mut signals = ViewportSignals::new();
    let mut c = mounted(3, &mut signals);
    let y = TOP + 1536.0;
    c.on_scroll(y, desktop(), &mut signals);
    assert!(c.is_pinned());

    let smaller = ViewportMetrics::new(1024.0, 700.0);
    c.refresh(SectionAnchor::new(TOP), smaller, smaller, &mut signals);
    assert_eq!(c.trigger().unwrap().distance(), 700.0 * 3.5);
    assert!(c.is_pinned());
    assert!((c.progress() - 1536.0 / 2450.0).abs() < 1e-12);
    assert_eq!(
        c.overlay(),
        OverlayPlacement::Fixed(Rect::new(0.0, 0.0, 1024.0, 700.0))
    );
    assert_eq!(signals.active_count(), 1);
}

#[test]
fn visual_viewport_changes_only_apply_while_pinned() {
    let mut signals = ViewportSignals::new();
    let mut c = mounted(2, &mut signals);
    let shifted = desktop().with_offset(0.0, 40.0);
    assert!(!c.on_visual_viewport(shifted));
    assert_eq!(c.overlay(), OverlayPlacement::InFlow);

    c.on_scroll(TOP + 10.0, desktop(), &mut signals);
    assert!(c.on_visual_viewport(shifted));
    assert_eq!(
        c.overlay(),
        OverlayPlacement::Fixed(Rect::new(0.0, 40.0, 1366.0, 808.0))
    );
}

#[test]
fn entering_places_overlay_on_current_visual_viewport() {
    let mut signals = ViewportSignals::new();
    let mut c = mounted(3, &mut signals);
    let keyboard_open = ViewportMetrics::new(1366.0, 500.0).with_offset(0.0, 120.0);
    c.on_scroll(TOP + 10.0, keyboard_open, &mut signals);
    assert_eq!(
        c.overlay(),
        OverlayPlacement::Fixed(Rect::new(0.0, 120.0, 1366.0, 620.0))
    );

    c.refresh(SectionAnchor::new(TOP), desktop(), keyboard_open, &mut signals);
    assert_eq!(
        c.overlay(),
        OverlayPlacement::Fixed(Rect::new(0.0, 120.0, 1366.0, 620.0))
    );
}

#[test]
fn kill_is_safe_to_repeat() {
    let mut signals = ViewportSignals::new();
    let mut c = mounted(4, &mut signals);
    c.on_scroll(TOP + 10.0, desktop(), &mut signals);
    assert_eq!(signals.active_count(), 1);

    assert!(c.kill(&mut signals));
    assert_eq!(signals.active_count(), 0);
    assert!(!c.is_mounted());
    assert!(c.is_killed());
    assert!(!c.kill(&mut signals));

    c.on_scroll(TOP + 20.0, desktop(), &mut signals);
    assert_eq!(signals.active_count(), 0);
    assert!(!c.mount(Some(SectionAnchor::new(TOP)), desktop(), 0.0, &mut signals));
}

#[test]
fn empty_section_still_shrinks_headline() {
    let mut signals = ViewportSignals::new();
    let mut c = mounted(0, &mut signals);
    assert!(c.cards().is_empty());
    let len = c.trigger().unwrap().distance();
    c.on_scroll(TOP + len, desktop(), &mut signals);
    assert!(c.cards().is_empty());
    assert!((c.text_scale() - 0.7).abs() < 1e-9);
}
