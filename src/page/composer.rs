use crate::{
    converge::{controller::SectionAnchor, geometry::scroll_length_px},
    foundation::core::ViewportMetrics,
    page::model::{PageSpec, SectionSpec},
};

/// Scroll range during which a section stays fixed to the viewport.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PinRange {
    pub start: f64,
    pub distance: f64,
}

impl PinRange {
    pub fn end(&self) -> f64 {
        self.start + self.distance
    }
}

/// Document placement of one section.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SectionSlot {
    pub index: usize,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Document y of the section's top edge.
    pub top: f64,
    /// Visible height (one viewport).
    pub height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin: Option<PinRange>,
}

impl SectionSlot {
    /// Document space taken by the section, pin spacing included.
    pub fn footprint(&self) -> f64 {
        self.height + self.pin.map_or(0.0, |p| p.distance)
    }
}

/// Vertical document layout: slides stacked in order, pinned sections followed by their spacing.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PageLayout {
    pub viewport: ViewportMetrics,
    pub sections: Vec<SectionSlot>,
    pub document_height: f64,
    snap_points: Vec<f64>,
}

impl PageLayout {
    pub fn compose(spec: &PageSpec, viewport: ViewportMetrics) -> Self {
        let viewport = viewport.sanitized();
        let mut top = 0.0;
        let mut sections = Vec::with_capacity(spec.sections.len());
        for (index, section) in spec.sections.iter().enumerate() {
            let pin = match section {
                SectionSpec::Converge(_) => Some(PinRange {
                    start: top,
                    distance: scroll_length_px(viewport, &spec.converge),
                }),
                _ => None,
            };
            let slot = SectionSlot {
                index,
                kind: section.kind_name(),
                id: section.id().map(str::to_string),
                top,
                height: viewport.height,
                pin,
            };
            top += slot.footprint();
            sections.push(slot);
        }

        let document_height = top;
        let max_scroll = (document_height - viewport.height).max(0.0);
        let mut snap_points: Vec<f64> = sections
            .iter()
            .flat_map(|s| [Some(s.top), s.pin.map(|p| p.end())])
            .flatten()
            .map(|y| y.min(max_scroll))
            .collect();
        snap_points.sort_by(f64::total_cmp);
        snap_points.dedup();

        tracing::debug!(
            sections = sections.len(),
            document_height,
            snap_points = snap_points.len(),
            "page composed"
        );
        Self {
            viewport,
            sections,
            document_height,
            snap_points,
        }
    }

    /// Largest scroll offset that still fills the viewport.
    pub fn max_scroll(&self) -> f64 {
        (self.document_height - self.viewport.height).max(0.0)
    }

    /// Clamp a scroll offset into `[0, max_scroll]`.
    pub fn clamp_scroll(&self, y: f64) -> f64 {
        if y.is_finite() {
            y.clamp(0.0, self.max_scroll())
        } else {
            0.0
        }
    }

    /// Sorted scroll offsets the page snaps to: section starts and pinned-region ends.
    pub fn snap_points(&self) -> &[f64] {
        &self.snap_points
    }

    /// Nearest snap point to `y` (the lower one on ties).
    pub fn snap(&self, y: f64) -> f64 {
        let y = self.clamp_scroll(y);
        self.snap_points
            .iter()
            .copied()
            .min_by(|a, b| (a - y).abs().total_cmp(&(b - y).abs()))
            .unwrap_or(y)
    }

    pub fn section(&self, index: usize) -> Option<&SectionSlot> {
        self.sections.get(index)
    }

    /// Anchor of a pinned section, used to register its scroll trigger.
    pub fn anchor(&self, index: usize) -> Option<SectionAnchor> {
        self.sections
            .get(index)
            .filter(|s| s.pin.is_some())
            .map(|s| SectionAnchor::new(s.top))
    }

    /// Screen y of a section's top edge at `scroll_y`; pinned sections hold at zero inside
    /// their pin range.
    pub fn section_screen_top(&self, index: usize, scroll_y: f64) -> Option<f64> {
        let slot = self.sections.get(index)?;
        let y = if scroll_y.is_finite() { scroll_y } else { 0.0 };
        Some(match slot.pin {
            Some(pin) if y >= pin.start && y <= pin.end() => 0.0,
            Some(pin) if y > pin.end() => pin.end() - y,
            _ => slot.top - y,
        })
    }

    /// Sections intersecting the viewport at `scroll_y`, with their screen tops, in paint order.
    pub fn visible_sections(&self, scroll_y: f64) -> Vec<(usize, f64)> {
        let vh = self.viewport.height;
        (0..self.sections.len())
            .filter_map(|i| {
                let top = self.section_screen_top(i, scroll_y)?;
                (top < vh && top + vh > 0.0).then_some((i, top))
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/page/composer.rs"]
mod tests;
