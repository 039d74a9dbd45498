/// Lifecycle callbacks of a pinned scroll region, in the order they fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum TriggerEvent {
    /// Scrolled forward past the start.
    Enter,
    /// Scrolled forward past the end.
    Leave,
    /// Scrolled backward past the end, back into the region.
    EnterBack,
    /// Scrolled backward past the start.
    LeaveBack,
    /// Emitted before region bounds are recomputed.
    RefreshInit,
    /// Emitted after region bounds were recomputed.
    Refresh,
    Kill,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Zone {
    Before,
    Active,
    After,
}

/// A pinned region `[start, start + distance]` in document scroll coordinates.
///
/// Feed scroll positions through [`ScrollTrigger::update`]; zone transitions come back as
/// [`TriggerEvent`]s and [`ScrollTrigger::progress`] tracks the normalized position.
#[derive(Clone, Debug)]
pub struct ScrollTrigger {
    start: f64,
    distance: f64,
    zone: Zone,
    progress: f64,
    last_scroll: Option<f64>,
    killed: bool,
}

impl ScrollTrigger {
    pub fn new(start_px: f64, end_distance_px: f64) -> Self {
        Self {
            start: finite_or_zero(start_px),
            distance: finite_or_zero(end_distance_px).max(0.0),
            zone: Zone::Before,
            progress: 0.0,
            last_scroll: None,
            killed: false,
        }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.start + self.distance
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Whether the scroll position is inside the region (the section is pinned).
    pub fn is_active(&self) -> bool {
        !self.killed && self.zone == Zone::Active
    }

    pub fn is_killed(&self) -> bool {
        self.killed
    }

    /// Progress for a scroll position without changing state.
    pub fn progress_at(&self, scroll_y: f64) -> f64 {
        let y = finite_or_zero(scroll_y);
        if self.distance <= 0.0 {
            return if y >= self.start { 1.0 } else { 0.0 };
        }
        ((y - self.start) / self.distance).clamp(0.0, 1.0)
    }

    /// Track a new scroll position. Returns the lifecycle events crossed on the way there; a jump
    /// over the whole region reports both the entry and the exit.
    pub fn update(&mut self, scroll_y: f64) -> Vec<TriggerEvent> {
        if self.killed {
            return Vec::new();
        }
        let y = finite_or_zero(scroll_y);
        self.last_scroll = Some(y);
        self.progress = self.progress_at(y);
        let next = self.zone_of(y);
        let events = transition(self.zone, next);
        self.zone = next;
        events
    }

    /// Recompute the region bounds and re-evaluate the last scroll position against them.
    ///
    /// Emits `RefreshInit`, any zone transitions the new bounds cause, then `Refresh`.
    pub fn refresh(&mut self, start_px: f64, end_distance_px: f64) -> Vec<TriggerEvent> {
        if self.killed {
            return Vec::new();
        }
        let mut events = vec![TriggerEvent::RefreshInit];
        self.start = finite_or_zero(start_px);
        self.distance = finite_or_zero(end_distance_px).max(0.0);
        if let Some(y) = self.last_scroll {
            events.extend(self.update(y));
        }
        events.push(TriggerEvent::Refresh);
        events
    }

    /// Release the region. The first call emits `Kill`; later calls emit nothing.
    pub fn kill(&mut self) -> Vec<TriggerEvent> {
        if self.killed {
            return Vec::new();
        }
        self.killed = true;
        vec![TriggerEvent::Kill]
    }

    fn zone_of(&self, y: f64) -> Zone {
        if y < self.start {
            Zone::Before
        } else if y > self.end() {
            Zone::After
        } else {
            Zone::Active
        }
    }
}

fn transition(from: Zone, to: Zone) -> Vec<TriggerEvent> {
    use TriggerEvent::*;
    match (from, to) {
        (Zone::Before, Zone::Active) => vec![Enter],
        (Zone::Before, Zone::After) => vec![Enter, Leave],
        (Zone::Active, Zone::After) => vec![Leave],
        (Zone::After, Zone::Active) => vec![EnterBack],
        (Zone::After, Zone::Before) => vec![EnterBack, LeaveBack],
        (Zone::Active, Zone::Before) => vec![LeaveBack],
        _ => Vec::new(),
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/trigger.rs"]
mod tests;
