pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Linear remap of `v` from `[in_min, in_max]` to `[out_min, out_max]`.
///
/// A zero-width input range maps everything to `out_min`.
pub(crate) fn map_range(v: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    let span = in_max - in_min;
    if span == 0.0 {
        return out_min;
    }
    out_min + (v - in_min) / span * (out_max - out_min)
}

/// Move `v` toward zero by `px`, stopping at zero.
pub(crate) fn toward_zero(v: f64, px: f64) -> f64 {
    if v > 0.0 {
        (v - px).max(0.0)
    } else {
        (v + px).min(0.0)
    }
}

/// Allowed center range on one axis for a box of `extent` inside a centered span of `span`.
///
/// The half-extent is capped at `span / 2 - margin - 1`, which keeps `min < max` for any span,
/// including zero-sized ones.
pub(crate) fn axis_bounds(span: f64, extent: f64, margin: f64) -> (f64, f64) {
    let half = (extent / 2.0).min(span / 2.0 - margin - 1.0);
    let min = -span / 2.0 + half + margin;
    let max = span / 2.0 - half - margin;
    (min, max)
}

/// `max(min, min(max, v))` without the panic `f64::clamp` has on inverted bounds.
pub(crate) fn clamp_axis(v: f64, (min, max): (f64, f64)) -> f64 {
    min.max(max.min(v))
}

/// 64-bit FNV-1a, used for stable asset identities and cache keys.
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    pub(crate) const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new_default() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    pub(crate) fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    pub(crate) fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

/// `x * y / 255` rounded to nearest, for 8-bit channel arithmetic.
pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
