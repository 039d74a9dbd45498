use super::*;

#[test]
fn toward_zero_never_crosses() {
    assert_eq!(toward_zero(10.0, 4.0), 6.0);
    assert_eq!(toward_zero(3.0, 4.0), 0.0);
    assert_eq!(toward_zero(-10.0, 4.0), -6.0);
    assert_eq!(toward_zero(-2.0, 4.0), 0.0);
    assert_eq!(toward_zero(0.0, 4.0), 0.0);
}

#[test]
fn map_range_handles_zero_span() {
    assert_eq!(map_range(5.0, 0.0, 10.0, 100.0, 200.0), 150.0);
    assert_eq!(map_range(3.0, 1.0, 1.0, -7.0, 7.0), -7.0);
}

#[test]
fn axis_bounds_stay_ordered_for_tiny_spans() {
    for span in [0.0, 1.0, 10.0, 24.0, 200.0] {
        for extent in [0.0, 50.0, 500.0] {
            let (min, max) = axis_bounds(span, extent, 12.0);
            assert!(min < max, "span={span} extent={extent} min={min} max={max}");
            let v = clamp_axis(1e9, (min, max));
            assert_eq!(v, max);
        }
    }
}

#[test]
fn axis_bounds_keep_box_inside_margin() {
    let (min, max) = axis_bounds(1000.0, 200.0, 12.0);
    assert_eq!(min, -500.0 + 100.0 + 12.0);
    assert_eq!(max, 500.0 - 100.0 - 12.0);
    assert_eq!(lerp(min, max, 0.5), 0.0);
}

#[test]
fn fnv1a64_is_split_invariant() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"converge");
    let mut b = Fnv1a64::new_default();
    b.write_u8(b'c');
    b.write_bytes(b"onverge");
    assert_eq!(a.finish(), b.finish());

    let empty = Fnv1a64::new_default();
    assert_eq!(empty.finish(), Fnv1a64::OFFSET_BASIS);
}

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(255, 0), 0);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u16(255, 128), 128);
    assert_eq!(mul_div255_u16(1, 127), 0);
    assert_eq!(mul_div255_u16(1, 128), 1);
}
