use crate::{
    converge::controller::ConvergeController,
    foundation::{core::ViewportMetrics, error::ConvergeResult},
    page::{
        composer::PageLayout,
        model::{PageSpec, SectionSpec},
    },
    scroll::signals::ViewportSignals,
};

/// Input delivered by the host, in arrival order.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// Document scrolled to `y`.
    Scroll { y: f64 },
    /// Layout viewport resized (window resize, orientation change).
    Resize { viewport: ViewportMetrics },
    /// Visual viewport resized or scrolled (browser chrome, on-screen keyboard).
    VisualViewport { viewport: ViewportMetrics },
    /// Document layout changed; re-measure everything.
    Refresh,
}

/// Live page: document layout, one controller per converge section and the scroll state.
///
/// Resize and refresh are deferred until [`PageRuntime::flush`], which plays the role of the
/// after-paint callback; a burst of events collapses into one re-layout.
pub struct PageRuntime {
    spec: PageSpec,
    viewport: ViewportMetrics,
    /// Latest visual viewport reported by the host.
    visual: ViewportMetrics,
    scroll_y: f64,
    layout: PageLayout,
    /// `(section index, controller)`, fixed at construction.
    controllers: Box<[(usize, ConvergeController)]>,
    signals: ViewportSignals,
    pending_viewport: Option<ViewportMetrics>,
    refresh_pending: bool,
    mounted: bool,
}

impl std::fmt::Debug for PageRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRuntime")
            .field("viewport", &self.viewport)
            .field("scroll_y", &self.scroll_y)
            .field("controllers", &self.controllers.len())
            .field("mounted", &self.mounted)
            .finish()
    }
}

impl PageRuntime {
    /// Validate `spec`, lay it out for `viewport` and mount every converge section at scroll 0.
    pub fn new(spec: PageSpec, viewport: ViewportMetrics) -> ConvergeResult<Self> {
        spec.validate()?;
        let viewport = viewport.sanitized();
        let layout = PageLayout::compose(&spec, viewport);
        let mut signals = ViewportSignals::new();

        let mut controllers = Vec::new();
        for (index, section) in spec.sections.iter().enumerate() {
            let SectionSpec::Converge(c) = section else {
                continue;
            };
            let mut controller =
                ConvergeController::new(index, c.content.clone(), spec.converge.clone())?;
            controller.mount(layout.anchor(index), viewport, 0.0, &mut signals);
            controllers.push((index, controller));
        }

        tracing::debug!(
            sections = spec.sections.len(),
            controllers = controllers.len(),
            width = viewport.width,
            height = viewport.height,
            "page mounted"
        );
        Ok(Self {
            spec,
            viewport,
            visual: viewport,
            scroll_y: 0.0,
            layout,
            controllers: controllers.into_boxed_slice(),
            signals,
            pending_viewport: None,
            refresh_pending: false,
            mounted: true,
        })
    }

    /// Apply one host event. Events after [`PageRuntime::unmount`] are ignored.
    pub fn handle(&mut self, event: HostEvent) {
        if !self.mounted {
            return;
        }
        match event {
            HostEvent::Scroll { y } => self.scroll_to(y),
            HostEvent::Resize { viewport } => {
                let viewport = viewport.sanitized();
                self.pending_viewport = Some(viewport);
                self.visual = viewport;
            }
            HostEvent::VisualViewport { viewport } => {
                self.visual = viewport.sanitized();
                let owners: Vec<usize> = self.signals.subscribers().collect();
                for (index, controller) in self.controllers.iter_mut() {
                    if owners.contains(index) {
                        controller.on_visual_viewport(viewport);
                    }
                }
            }
            HostEvent::Refresh => self.refresh_pending = true,
        }
    }

    /// Move the document scroll position, clamped to the scrollable range.
    pub fn scroll_to(&mut self, y: f64) {
        if !self.mounted {
            return;
        }
        self.scroll_y = self.layout.clamp_scroll(y);
        for (_, controller) in self.controllers.iter_mut() {
            controller.on_scroll(self.scroll_y, self.visual, &mut self.signals);
        }
    }

    /// Scroll to the snap point nearest the current position.
    pub fn settle(&mut self) {
        let y = self.layout.snap(self.scroll_y);
        self.scroll_to(y);
    }

    /// Whether a deferred re-layout is waiting for [`PageRuntime::flush`].
    pub fn has_pending_layout(&self) -> bool {
        self.pending_viewport.is_some() || self.refresh_pending
    }

    /// Run the deferred re-layout, if any. Returns whether one ran.
    pub fn flush(&mut self) -> bool {
        if !self.mounted || !self.has_pending_layout() {
            return false;
        }
        if let Some(viewport) = self.pending_viewport.take() {
            self.viewport = viewport;
        }
        self.refresh_pending = false;

        self.layout = PageLayout::compose(&self.spec, self.viewport);
        self.scroll_y = self.layout.clamp_scroll(self.scroll_y);
        for (index, controller) in self.controllers.iter_mut() {
            if let Some(anchor) = self.layout.anchor(*index) {
                controller.refresh(anchor, self.viewport, self.visual, &mut self.signals);
                controller.on_scroll(self.scroll_y, self.visual, &mut self.signals);
            }
        }
        tracing::debug!(
            width = self.viewport.width,
            height = self.viewport.height,
            scroll_y = self.scroll_y,
            "page re-laid out"
        );
        true
    }

    /// Tear down every controller. Safe to call more than once.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.pending_viewport = None;
        self.refresh_pending = false;
        for (_, controller) in self.controllers.iter_mut() {
            controller.kill(&mut self.signals);
        }
        tracing::debug!("page unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn spec(&self) -> &PageSpec {
        &self.spec
    }

    pub fn viewport(&self) -> ViewportMetrics {
        self.viewport
    }

    pub fn visual_viewport(&self) -> ViewportMetrics {
        self.visual
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn signals(&self) -> &ViewportSignals {
        &self.signals
    }

    /// Controllers with the index of the section each drives.
    pub fn controllers(&self) -> impl Iterator<Item = (usize, &ConvergeController)> + '_ {
        self.controllers.iter().map(|(i, c)| (*i, c))
    }

    /// Controller of section `index`, if that section is a converge section.
    pub fn controller(&self, index: usize) -> Option<&ConvergeController> {
        self.controllers
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, c)| c)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/page/runtime.rs"]
mod tests;
