use crate::{
    foundation::error::{ConvergeError, ConvergeResult},
    layout::breakpoint::Breakpoints,
};

/// One card image. Order in [`SectionContent::images`] decides angle and entry side.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ImageDescriptor {
    /// Image path relative to the page's asset root.
    pub source: String,
    #[serde(default, alias = "altText", skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

impl ImageDescriptor {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            alt_text: None,
        }
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt_text = Some(alt.into());
        self
    }

    /// Alt text, empty when absent.
    pub fn alt(&self) -> &str {
        self.alt_text.as_deref().unwrap_or("")
    }
}

/// Content of one converge section. Immutable per instance; missing strings render empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SectionContent {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kicker: Option<String>,
    #[serde(default)]
    pub images: Vec<ImageDescriptor>,
}

/// Tunables of the converge choreography. Breakpoint limits are applied on top of these.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ConvergeConfig {
    /// Headline scale before any scroll.
    pub initial_scale: f64,
    /// Requested headline scale after the shrink phase.
    pub final_scale: f64,
    /// Requested pinned scroll length in viewport heights.
    pub scroll_vh: f64,
    /// Spread used for horizontal spawn jitter (capped at 480).
    pub start_spread_px: f64,
    /// Lower bound of the pinned scroll length.
    pub min_scroll_px: f64,
    /// Distance kept between the spawn band and the top/bottom viewport edges.
    pub edge_band_inset_px: f64,
    /// Gap between a spawned card and the viewport edge it enters from.
    pub edge_gap_px: f64,
    /// Card width used when a card reports zero width.
    pub fallback_card_width_px: f64,
    pub breakpoints: Breakpoints,
}

impl Default for ConvergeConfig {
    fn default() -> Self {
        Self {
            initial_scale: 1.8,
            final_scale: 0.7,
            scroll_vh: 4.0,
            start_spread_px: 480.0,
            min_scroll_px: 600.0,
            edge_band_inset_px: 80.0,
            edge_gap_px: 12.0,
            fallback_card_width_px: 300.0,
            breakpoints: Breakpoints::default(),
        }
    }
}

impl ConvergeConfig {
    pub fn validate(&self) -> ConvergeResult<()> {
        let positive = [
            ("initial_scale", self.initial_scale),
            ("final_scale", self.final_scale),
            ("scroll_vh", self.scroll_vh),
            ("fallback_card_width_px", self.fallback_card_width_px),
        ];
        for (name, v) in positive {
            if !v.is_finite() || v <= 0.0 {
                return Err(ConvergeError::validation(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        let non_negative = [
            ("start_spread_px", self.start_spread_px),
            ("min_scroll_px", self.min_scroll_px),
            ("edge_band_inset_px", self.edge_band_inset_px),
            ("edge_gap_px", self.edge_gap_px),
        ];
        for (name, v) in non_negative {
            if !v.is_finite() || v < 0.0 {
                return Err(ConvergeError::validation(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        self.breakpoints.validate()
    }
}
