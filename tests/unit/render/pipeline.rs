use super::*;
use crate::encode::sink::InMemorySink;

const PAGE: &str = r##"{
  "sections": [
    { "kind": "static", "id": "intro", "title": "HERO", "description": "imagen" },
    {
      "kind": "converge",
      "title": "Equipos de tres",
      "images": [ { "source": "a.png" }, { "source": "b.png" }, { "source": "c.png" } ]
    },
    { "kind": "static", "id": "stats", "title": "DATA", "description": "", "background": "#cbd5e1" }
  ]
}"##;

fn spec() -> PageSpec {
    PageSpec::from_json_str(PAGE).unwrap()
}

fn small_opts(step_px: f64) -> ScrollRenderOpts {
    ScrollRenderOpts {
        viewport: ViewportMetrics::new(64.0, 48.0),
        step_px,
        hold_frames: 2,
        ..ScrollRenderOpts::default()
    }
}

#[test]
fn scroll_positions_walk_the_document_and_hold_on_snaps() {
    let layout = PageLayout::compose(&spec(), ViewportMetrics::new(640.0, 480.0));
    let positions = scroll_positions(&layout, 100.0, 3).unwrap();

    assert_eq!(positions.first(), Some(&0.0));
    assert_eq!(positions.last(), Some(&layout.max_scroll()));
    assert!(positions.windows(2).all(|w| w[0] <= w[1]));
    for snap in layout.snap_points() {
        let held = positions.iter().filter(|&&y| y == *snap).count();
        assert!(held >= 4, "snap {snap} held {held} times");
    }
}

#[test]
fn scroll_positions_reject_bad_steps() {
    let layout = PageLayout::compose(&spec(), ViewportMetrics::new(640.0, 480.0));
    assert!(scroll_positions(&layout, 0.0, 0).is_err());
    assert!(scroll_positions(&layout, f64::NAN, 0).is_err());
}

#[test]
fn held_frames_are_elided_not_rerendered() {
    let opts = small_opts(40.0);
    let (frames, stats) = render_scroll_frames(&spec(), &PreparedAssetStore::empty(), &opts).unwrap();

    let runtime = PageRuntime::new(spec(), opts.viewport).unwrap();
    let positions = scroll_positions(runtime.layout(), opts.step_px, opts.hold_frames).unwrap();
    let mut distinct = positions.clone();
    distinct.dedup();

    assert_eq!(frames.len(), positions.len());
    assert_eq!(stats.frames_total, positions.len() as u64);
    assert_eq!(stats.frames_elided, (positions.len() - distinct.len()) as u64);
    assert_eq!(stats.frames_rendered + stats.frames_elided, stats.frames_total);
    assert!(frames.iter().all(|f| (f.width, f.height) == (64, 48)));
}

#[test]
fn parallel_render_matches_sequential() {
    let mut seq = small_opts(60.0);
    seq.threading.chunk_size = 5;
    let mut par = seq.clone();
    par.threading.parallel = true;
    par.threading.threads = Some(2);

    let assets = PreparedAssetStore::empty();
    let (a, sa) = render_scroll_frames(&spec(), &assets, &seq).unwrap();
    let (b, sb) = render_scroll_frames(&spec(), &assets, &par).unwrap();
    assert_eq!(sa, sb);
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b.iter()) {
        assert_eq!(x.data, y.data);
    }
}

#[test]
fn sink_sees_ordered_indices_and_config() {
    let mut sink = InMemorySink::new();
    let stats = render_scroll_to_sink(
        &spec(),
        &PreparedAssetStore::empty(),
        &small_opts(80.0),
        24,
        &mut sink,
    )
    .unwrap();
    assert!(sink.is_finished());
    assert_eq!(sink.config().map(|c| (c.width, c.height, c.fps)), Some((64, 48, 24)));
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| *i).collect();
    assert_eq!(idx, (0..stats.frames_total).collect::<Vec<_>>());
}

#[test]
fn zero_threads_is_rejected() {
    let mut opts = small_opts(80.0);
    opts.threading.parallel = true;
    opts.threading.threads = Some(0);
    assert!(render_scroll_frames(&spec(), &PreparedAssetStore::empty(), &opts).is_err());
}

#[test]
fn zero_chunk_size_is_normalized() {
    assert_eq!(normalized_chunk_size(0), 1);
    assert_eq!(normalized_chunk_size(9), 9);
}

#[test]
fn single_frame_render_uses_the_runtime_viewport() {
    let rt = PageRuntime::new(spec(), ViewportMetrics::new(32.0, 24.0)).unwrap();
    let mut backend = CpuBackend::new(RenderSettings::default());
    let f = render_frame(&rt, &PreparedAssetStore::empty(), &mut backend).unwrap();
    assert_eq!((f.width, f.height), (32, 24));
    // intro section background
    assert_eq!(f.pixel(0, 0), Some([0xe2, 0xe8, 0xf0, 255]));
}

#[test]
fn mp4_rejects_zero_fps() {
    let opts = RenderToMp4Opts {
        fps: 0,
        ..RenderToMp4Opts::default()
    };
    let out = std::env::temp_dir().join("converge_zero_fps.mp4");
    assert!(render_to_mp4(&spec(), &PreparedAssetStore::empty(), out, &opts).is_err());
}
