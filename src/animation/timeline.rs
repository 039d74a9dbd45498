use crate::{
    animation::ease::Ease,
    foundation::error::{ConvergeError, ConvergeResult},
};

/// Named segments of the converge choreography, in insertion order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PhaseKind {
    ShrinkText,
    Converge,
    Float,
    ShadowSettle,
    CenterSqueeze,
    FinalNudge,
}

impl PhaseKind {
    pub const ALL: [PhaseKind; 6] = [
        PhaseKind::ShrinkText,
        PhaseKind::Converge,
        PhaseKind::Float,
        PhaseKind::ShadowSettle,
        PhaseKind::CenterSqueeze,
        PhaseKind::FinalNudge,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::ShrinkText => "shrink-text",
            Self::Converge => "converge-cards",
            Self::Float => "float",
            Self::ShadowSettle => "shadow-settle",
            Self::CenterSqueeze => "center-squeeze",
            Self::FinalNudge => "final-nudge",
        }
    }
}

/// Where a phase starts when it is appended to a [`Timeline`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Position {
    /// Absolute time in timeline units.
    At(f64),
    /// Relative to the end of the previously appended phase (negative overlaps it).
    AfterPrevious(f64),
}

/// One resolved timeline segment.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Phase {
    pub kind: PhaseKind,
    pub start: f64,
    pub duration: f64,
    pub ease: Ease,
}

impl Phase {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Whether the phase has begun at timeline time `t`.
    pub fn started(&self, t: f64) -> bool {
        t >= self.start
    }

    /// Eased local progress in `[0, 1]` at timeline time `t`.
    pub fn local(&self, t: f64) -> f64 {
        if self.duration <= 0.0 {
            return if t >= self.start { 1.0 } else { 0.0 };
        }
        self.ease.apply((t - self.start) / self.duration)
    }
}

/// Ordered phases scrubbed in lockstep by a single scroll progress value.
///
/// Scroll progress `p` maps to timeline time `p * duration()`, so each phase owns a fixed
/// fraction of the pinned scroll range.
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct Timeline {
    phases: Vec<Phase>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a phase. Durations must be finite and non-negative; start times clamp at zero.
    pub fn push(
        &mut self,
        kind: PhaseKind,
        position: Position,
        duration: f64,
        ease: Ease,
    ) -> ConvergeResult<&mut Self> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(ConvergeError::validation(format!(
                "phase '{}' duration must be finite and >= 0",
                kind.name()
            )));
        }
        if self.phase(kind).is_some() {
            return Err(ConvergeError::validation(format!(
                "phase '{}' is already on the timeline",
                kind.name()
            )));
        }

        if !self.resolve(position).is_finite() {
            return Err(ConvergeError::validation(format!(
                "phase '{}' start must be finite",
                kind.name()
            )));
        }

        self.insert(kind, position, duration, ease);
        Ok(self)
    }

    /// Builder form of [`Timeline::push`] for phase tables known to be valid.
    pub(crate) fn with(
        mut self,
        kind: PhaseKind,
        position: Position,
        duration: f64,
        ease: Ease,
    ) -> Self {
        self.insert(kind, position, duration, ease);
        self
    }

    fn resolve(&self, position: Position) -> f64 {
        match position {
            Position::At(t) => t,
            Position::AfterPrevious(offset) => {
                self.phases.last().map(Phase::end).unwrap_or(0.0) + offset
            }
        }
    }

    fn insert(&mut self, kind: PhaseKind, position: Position, duration: f64, ease: Ease) {
        let start = self.resolve(position).max(0.0);
        self.phases.push(Phase {
            kind,
            start,
            duration: duration.max(0.0),
            ease,
        });
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn phase(&self, kind: PhaseKind) -> Option<&Phase> {
        self.phases.iter().find(|p| p.kind == kind)
    }

    /// Total length in timeline units (latest phase end).
    pub fn duration(&self) -> f64 {
        self.phases.iter().map(Phase::end).fold(0.0, f64::max)
    }

    /// Timeline time for a scroll progress value. Progress is clamped to `[0, 1]`.
    pub fn time_at(&self, progress: f64) -> f64 {
        let p = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
        p * self.duration()
    }

    /// Eased local progress of `kind` at time `t`; `None` if the phase is not on the timeline.
    pub fn local(&self, kind: PhaseKind, t: f64) -> Option<f64> {
        self.phase(kind).map(|p| p.local(t))
    }
}

/// Sample a waypoint chain at time `t`.
///
/// `steps` pairs each phase with the waypoint it animates toward, in timeline order. The latest
/// phase that has started owns the value. It interpolates from the chain's own value at that
/// phase's start, so an overlapping phase picks up an in-flight value without a jump.
pub(crate) fn sample_chain<T: Copy>(
    timeline: &Timeline,
    origin: T,
    steps: &[(PhaseKind, T)],
    t: f64,
    lerp: impl Fn(T, T, f64) -> T,
) -> T {
    let mut current = origin;
    let mut owner: Option<(&Phase, T, T)> = None;
    for &(kind, to) in steps {
        let Some(phase) = timeline.phase(kind) else {
            continue;
        };
        if !phase.started(t) {
            break;
        }
        let from = match owner {
            Some((prev, a, b)) => lerp(a, b, prev.local(phase.start)),
            None => origin,
        };
        current = lerp(from, to, phase.local(t));
        owner = Some((phase, from, to));
    }
    current
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timeline.rs"]
mod tests;
