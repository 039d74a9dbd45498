use super::*;

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_premul_alpha_255_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn flatten_half_alpha_mixes_with_white() {
    // 50% black over white
    let src = vec![0u8, 0, 0, 128];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [255, 255, 255, 255]).unwrap();
    assert_eq!(dst, vec![127, 127, 127, 255]);
}

#[test]
fn flatten_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &[0u8; 4], [0, 0, 0, 255]).is_err());
}

#[test]
fn begin_rejects_odd_dimensions_before_spawning() {
    let out = std::env::temp_dir().join("converge_odd_dims.mp4");
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&out));
    let err = sink
        .begin(SinkConfig {
            width: 3,
            height: 2,
            fps: 30,
        })
        .unwrap_err();
    assert!(err.to_string().contains("even"));
    assert!(sink.push_frame(0, &FrameRGBA {
        width: 3,
        height: 2,
        data: vec![0; 24],
        premultiplied: true,
    })
    .is_err());
}
