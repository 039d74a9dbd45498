use crate::foundation::{
    core::{CardSize, ViewportMetrics},
    error::{ConvergeError, ConvergeResult},
};

/// Viewport width bucket used to select layout constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum Breakpoint {
    Narrow,
    Medium,
    Wide,
    ExtraWide,
    UltraWide,
}

/// Width thresholds (px), matching CSS media queries.
///
/// `narrow_max` and `medium_max` behave like `max-width` (inclusive upper bounds), the wide
/// minimums like `min-width`. Fractional widths just above a maximum fall into the next bucket.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Breakpoints {
    pub narrow_max: f64,
    pub medium_max: f64,
    pub extra_wide_min: f64,
    pub ultra_wide_min: f64,
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            narrow_max: 640.0,
            medium_max: 1024.0,
            extra_wide_min: 1280.0,
            ultra_wide_min: 2560.0,
        }
    }
}

impl Breakpoints {
    /// Thresholds with ultra-wide starting at 1536px.
    pub fn tailwind() -> Self {
        Self {
            ultra_wide_min: 1536.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ConvergeResult<()> {
        let ordered = [
            self.narrow_max,
            self.medium_max,
            self.extra_wide_min,
            self.ultra_wide_min,
        ];
        if ordered.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(ConvergeError::validation(
                "breakpoint thresholds must be finite and > 0",
            ));
        }
        if !ordered.windows(2).all(|w| w[0] < w[1]) {
            return Err(ConvergeError::validation(
                "breakpoint thresholds must be strictly increasing",
            ));
        }
        Ok(())
    }

    pub fn classify(&self, width: f64) -> Breakpoint {
        if width >= self.ultra_wide_min {
            Breakpoint::UltraWide
        } else if width >= self.extra_wide_min {
            Breakpoint::ExtraWide
        } else if width > self.medium_max {
            Breakpoint::Wide
        } else if width > self.narrow_max {
            Breakpoint::Medium
        } else {
            Breakpoint::Narrow
        }
    }
}

/// Breakpoint-dependent constants, resolved once per layout pass.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct LayoutConstants {
    pub breakpoint: Breakpoint,
    /// Ring radius as a fraction of `min(vw, vh)`.
    pub ring_fraction: f64,
    /// Gap kept between a card's box and the viewport edge.
    pub margin_px: f64,
    /// Factor applied to positions during the center squeeze.
    pub center_bias: f64,
    pub nudge_x_px: f64,
    pub nudge_y_px: f64,
    /// Headline scale at the end of the shrink phase.
    pub final_scale: f64,
    /// Pinned scroll length in viewport heights.
    pub scroll_vh: f64,
    /// Card width as a fraction of the viewport width.
    pub card_width_fraction: f64,
    pub card_min_width_px: f64,
    pub card_max_width_px: f64,
    pub show_kicker: bool,
}

/// Card height / width.
pub const CARD_ASPECT: f64 = 5.0 / 6.0;

impl LayoutConstants {
    /// Resolve the table row for `bp`, applying the per-breakpoint limits to the requested
    /// `final_scale` and `scroll_vh`.
    pub fn for_breakpoint(bp: Breakpoint, final_scale: f64, scroll_vh: f64) -> Self {
        let (ring_fraction, margin_px, center_bias) = match bp {
            Breakpoint::Narrow => (0.12, 10.0, 0.82),
            Breakpoint::Medium => (0.15, 14.0, 0.84),
            Breakpoint::Wide => (0.16, 12.0, 0.86),
            Breakpoint::ExtraWide => (0.20, 12.0, 0.88),
            Breakpoint::UltraWide => (0.22, 12.0, 0.90),
        };
        let (nudge_x_px, nudge_y_px) = match bp {
            Breakpoint::Narrow => (4.0, 3.0),
            Breakpoint::Medium => (6.0, 4.0),
            _ => (8.0, 6.0),
        };
        let (final_scale, scroll_vh) = match bp {
            Breakpoint::Narrow => (final_scale.max(0.85), scroll_vh.min(3.0)),
            Breakpoint::Medium => (final_scale.min(0.75), scroll_vh.min(3.5)),
            _ => (final_scale, scroll_vh),
        };
        let card_width_fraction = match bp {
            Breakpoint::Narrow => 0.55,
            Breakpoint::Medium => 0.38,
            Breakpoint::Wide => 0.28,
            Breakpoint::ExtraWide => 0.24,
            Breakpoint::UltraWide => 0.22,
        };

        Self {
            breakpoint: bp,
            ring_fraction,
            margin_px,
            center_bias,
            nudge_x_px,
            nudge_y_px,
            final_scale,
            scroll_vh,
            card_width_fraction,
            card_min_width_px: 120.0,
            card_max_width_px: if bp == Breakpoint::UltraWide { 480.0 } else { 420.0 },
            show_kicker: bp != Breakpoint::Narrow,
        }
    }

    /// Default card box for a viewport: width fraction clamped to `[min, max]`, 6:5 aspect.
    pub fn card_size(&self, viewport: ViewportMetrics) -> CardSize {
        let w = (viewport.width * self.card_width_fraction)
            .min(self.card_max_width_px)
            .max(self.card_min_width_px);
        CardSize::new(w, w * CARD_ASPECT)
    }
}

/// Font sizes (px) for the page's text roles at one breakpoint.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct TextStyles {
    pub headline_px: f32,
    pub kicker_px: f32,
    pub hero_title_px: f32,
    pub heading_px: f32,
    pub body_px: f32,
    pub caption_px: f32,
}

impl TextStyles {
    pub fn for_breakpoint(bp: Breakpoint) -> Self {
        let (headline_px, kicker_px) = match bp {
            Breakpoint::Narrow => (30.0, 16.0),
            Breakpoint::Medium => (48.0, 20.0),
            Breakpoint::Wide => (48.0, 24.0),
            Breakpoint::ExtraWide => (60.0, 24.0),
            Breakpoint::UltraWide => (72.0, 24.0),
        };
        let (hero_title_px, heading_px) = match bp {
            Breakpoint::Narrow => (36.0, 36.0),
            _ => (128.0, 48.0),
        };
        Self {
            headline_px,
            kicker_px,
            hero_title_px,
            heading_px,
            body_px: 18.0,
            caption_px: 14.0,
        }
    }

    /// Max line width for the converge headline block.
    pub fn headline_max_width(bp: Breakpoint, viewport_width: f64, headline_px: f32) -> f32 {
        // widths are min(N vw, M ch); one ch is roughly half an em
        let (vw_frac, ch) = match bp {
            Breakpoint::Narrow => (0.92, 40.0),
            Breakpoint::Medium => (0.86, 60.0),
            Breakpoint::Wide => (0.82, 72.0),
            Breakpoint::ExtraWide => (0.78, 84.0),
            Breakpoint::UltraWide => (0.74, 96.0),
        };
        let ch_px = f64::from(headline_px) * 0.5;
        (viewport_width * vw_frac).min(ch * ch_px).max(1.0) as f32
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/breakpoint.rs"]
mod tests;
