use crate::{
    converge::{
        geometry::{CardGeometry, ConvergeLayout},
        model::{ConvergeConfig, SectionContent},
    },
    foundation::{
        core::{Rect, ViewportMetrics},
        error::ConvergeResult,
    },
    scroll::{
        signals::{SubscriptionId, ViewportSignals},
        trigger::{ScrollTrigger, TriggerEvent},
    },
};

/// Document position of the section a controller drives.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct SectionAnchor {
    /// Top of the section in document scroll coordinates.
    pub top_px: f64,
}

impl SectionAnchor {
    pub fn new(top_px: f64) -> Self {
        Self { top_px }
    }
}

/// Placement of the card overlay.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub enum OverlayPlacement {
    /// Laid out with the section.
    InFlow,
    /// Fixed to the visual viewport while the section is pinned.
    Fixed(Rect),
}

struct Mounted {
    trigger: ScrollTrigger,
    layout: ConvergeLayout,
    /// One slot per image, sized at mount.
    cards: Box<[CardGeometry]>,
    text_scale: f64,
    overlay: OverlayPlacement,
    visual: ViewportMetrics,
    listener: Option<SubscriptionId>,
}

impl Mounted {
    fn resample(&mut self) {
        let p = self.trigger.progress();
        for (i, slot) in self.cards.iter_mut().enumerate() {
            if let Some(g) = self.layout.sample(p, i) {
                *slot = g;
            }
        }
        self.text_scale = self.layout.text_scale(p);
    }

    fn apply(&mut self, owner: usize, events: &[TriggerEvent], signals: &mut ViewportSignals) {
        for &event in events {
            tracing::debug!(owner, ?event, progress = self.trigger.progress(), "converge trigger");
            match event {
                TriggerEvent::Enter | TriggerEvent::EnterBack => {
                    self.overlay = OverlayPlacement::Fixed(self.visual.rect());
                    if self.listener.is_none() {
                        self.listener = Some(signals.subscribe(owner));
                    }
                }
                TriggerEvent::Leave | TriggerEvent::LeaveBack | TriggerEvent::Kill => {
                    if let Some(id) = self.listener.take() {
                        signals.unsubscribe(id);
                    }
                    self.overlay = OverlayPlacement::InFlow;
                }
                TriggerEvent::RefreshInit => {}
                TriggerEvent::Refresh => {
                    if self.trigger.is_active() {
                        self.overlay = OverlayPlacement::Fixed(self.visual.rect());
                    }
                }
            }
        }
    }
}

/// Stateful driver of one converge section.
///
/// Owns the section's scroll trigger, its card arena and its viewport listener. All geometry is
/// re-derived from [`ConvergeLayout`] on every scroll or refresh; nothing is read back from a
/// rendered frame.
pub struct ConvergeController {
    owner: usize,
    content: SectionContent,
    config: ConvergeConfig,
    mounted: Option<Mounted>,
    killed: bool,
}

impl std::fmt::Debug for ConvergeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConvergeController")
            .field("owner", &self.owner)
            .field("cards", &self.content.images.len())
            .field("mounted", &self.mounted.is_some())
            .field("killed", &self.killed)
            .finish()
    }
}

impl ConvergeController {
    /// `owner` identifies the controller's section when it registers viewport listeners.
    pub fn new(
        owner: usize,
        content: SectionContent,
        config: ConvergeConfig,
    ) -> ConvergeResult<Self> {
        config.validate()?;
        Ok(Self {
            owner,
            content,
            config,
            mounted: None,
            killed: false,
        })
    }

    /// Register the pinned region and place the cards at their spawn positions.
    ///
    /// Without an anchor (section not laid out yet) this does nothing and returns `false`.
    pub fn mount(
        &mut self,
        anchor: Option<SectionAnchor>,
        viewport: ViewportMetrics,
        scroll_y: f64,
        signals: &mut ViewportSignals,
    ) -> bool {
        if self.killed || self.mounted.is_some() {
            return false;
        }
        let Some(anchor) = anchor else {
            tracing::debug!(owner = self.owner, "converge section has no anchor, skipping setup");
            return false;
        };

        let viewport = viewport.sanitized();
        let layout =
            ConvergeLayout::with_default_sizes(&self.config, viewport, self.content.images.len());
        let trigger = ScrollTrigger::new(anchor.top_px, layout.scroll_len_px);
        let cards = layout.sample_all(0.0).into_boxed_slice();
        tracing::debug!(
            owner = self.owner,
            cards = cards.len(),
            start = trigger.start(),
            scroll_len = trigger.distance(),
            breakpoint = ?layout.constants.breakpoint,
            "converge mounted"
        );

        self.mounted = Some(Mounted {
            trigger,
            text_scale: layout.initial_scale,
            layout,
            cards,
            overlay: OverlayPlacement::InFlow,
            visual: viewport,
            listener: None,
        });
        self.on_scroll(scroll_y, viewport, signals);
        true
    }

    /// Track a new document scroll position.
    ///
    /// `visual` is the current visual viewport; entering the pin places the overlay there.
    pub fn on_scroll(
        &mut self,
        scroll_y: f64,
        visual: ViewportMetrics,
        signals: &mut ViewportSignals,
    ) {
        let owner = self.owner;
        let Some(m) = self.mounted.as_mut() else {
            return;
        };
        m.visual = visual.sanitized();
        let events = m.trigger.update(scroll_y);
        m.apply(owner, &events, signals);
        m.resample();
    }

    /// Visual viewport resized or scrolled. Only honoured while a listener is attached; moves
    /// the pinned overlay without re-deriving card targets.
    pub fn on_visual_viewport(&mut self, viewport: ViewportMetrics) -> bool {
        let Some(m) = self.mounted.as_mut() else {
            return false;
        };
        if m.listener.is_none() {
            return false;
        }
        m.visual = viewport.sanitized();
        m.overlay = OverlayPlacement::Fixed(m.visual.rect());
        true
    }

    /// Re-measure after a resize, orientation change or document refresh.
    ///
    /// Recomputes the layout for `viewport`, moves the pinned region to `anchor` and resamples
    /// the current progress, so un-converged cards stay off-screen and converged ones keep
    /// consistent targets. A pinned overlay is re-placed on `visual`. Repeating with the same
    /// inputs yields the same geometry.
    pub fn refresh(
        &mut self,
        anchor: SectionAnchor,
        viewport: ViewportMetrics,
        visual: ViewportMetrics,
        signals: &mut ViewportSignals,
    ) {
        let owner = self.owner;
        let count = self.content.images.len();
        let Some(m) = self.mounted.as_mut() else {
            return;
        };
        let viewport = viewport.sanitized();
        m.layout = ConvergeLayout::with_default_sizes(&self.config, viewport, count);
        m.visual = visual.sanitized();
        let events = m.trigger.refresh(anchor.top_px, m.layout.scroll_len_px);
        m.apply(owner, &events, signals);
        m.resample();
    }

    /// Release the trigger, the timeline and any attached listener.
    ///
    /// Returns `true` only for the call that performed the teardown.
    pub fn kill(&mut self, signals: &mut ViewportSignals) -> bool {
        if self.killed {
            return false;
        }
        self.killed = true;
        if let Some(mut m) = self.mounted.take() {
            let events = m.trigger.kill();
            m.apply(self.owner, &events, signals);
        }
        tracing::debug!(owner = self.owner, "converge killed");
        true
    }

    pub fn owner(&self) -> usize {
        self.owner
    }

    pub fn content(&self) -> &SectionContent {
        &self.content
    }

    pub fn config(&self) -> &ConvergeConfig {
        &self.config
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn is_killed(&self) -> bool {
        self.killed
    }

    pub fn is_pinned(&self) -> bool {
        self.mounted
            .as_ref()
            .is_some_and(|m| m.trigger.is_active())
    }

    pub fn progress(&self) -> f64 {
        self.mounted.as_ref().map_or(0.0, |m| m.trigger.progress())
    }

    /// Current headline block scale.
    pub fn text_scale(&self) -> f64 {
        self.mounted
            .as_ref()
            .map_or(self.config.initial_scale, |m| m.text_scale)
    }

    /// Current card geometries, one per image; empty when not mounted.
    pub fn cards(&self) -> &[CardGeometry] {
        self.mounted.as_ref().map(|m| &*m.cards).unwrap_or(&[])
    }

    pub fn layout(&self) -> Option<&ConvergeLayout> {
        self.mounted.as_ref().map(|m| &m.layout)
    }

    pub fn trigger(&self) -> Option<&ScrollTrigger> {
        self.mounted.as_ref().map(|m| &m.trigger)
    }

    pub fn overlay(&self) -> OverlayPlacement {
        self.mounted
            .as_ref()
            .map_or(OverlayPlacement::InFlow, |m| m.overlay)
    }

    pub fn listener(&self) -> Option<SubscriptionId> {
        self.mounted.as_ref().and_then(|m| m.listener)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/converge/controller.rs"]
mod tests;
