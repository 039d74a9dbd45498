//! Pure converge choreography.
//!
//! Everything here is a function of `(progress, card index, card sizes, viewport, config)`. A
//! [`ConvergeLayout`] caches the per-card waypoints for one layout pass; sampling it never
//! consults rendered state, so the same inputs always give the same [`CardGeometry`].

use std::f64::consts::TAU;

use crate::{
    animation::{
        ease::Ease,
        timeline::{PhaseKind, Position, Timeline, sample_chain},
    },
    converge::model::ConvergeConfig,
    foundation::{
        core::{CardSize, Vec2, ViewportMetrics},
        math::{axis_bounds, clamp_axis, lerp, map_range, toward_zero},
    },
    layout::breakpoint::LayoutConstants,
};

/// Drop shadow below a card: vertical offset, blur radius and black alpha.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct DropShadow {
    pub offset_y: f64,
    pub blur: f64,
    pub alpha: f64,
}

impl DropShadow {
    /// Shadow of a freshly spawned card.
    pub const SPAWN: Self = Self {
        offset_y: 6.0,
        blur: 14.0,
        alpha: 0.12,
    };
    /// Stronger shadow while cards fly in.
    pub const FLYING: Self = Self {
        offset_y: 18.0,
        blur: 40.0,
        alpha: 0.28,
    };
    /// Softer shadow once cards settle.
    pub const RESTING: Self = Self {
        offset_y: 12.0,
        blur: 28.0,
        alpha: 0.20,
    };

    fn lerp(a: Self, b: Self, t: f64) -> Self {
        Self {
            offset_y: lerp(a.offset_y, b.offset_y, t),
            blur: lerp(a.blur, b.blur, t),
            alpha: lerp(a.alpha, b.alpha, t),
        }
    }
}

/// Visual state of one card, relative to the viewport center.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct CardGeometry {
    pub x: f64,
    pub y: f64,
    pub rotation_deg: f64,
    pub opacity: f64,
    pub scale: f64,
    pub shadow: DropShadow,
}

impl CardGeometry {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Waypoints of one card through the timeline.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct CardPath {
    pub size: CardSize,
    /// Angle on the ring, `i / N * 2π`.
    pub angle: f64,
    pub spawn: Vec2,
    pub spawn_rotation_deg: f64,
    /// Clamped ring position at the end of the converge phase.
    pub target: Vec2,
    pub floated: Vec2,
    pub float_rotation_deg: f64,
    pub squeezed: Vec2,
    pub nudged: Vec2,
    /// Paint order; earlier cards sit on top.
    pub z_index: usize,
}

const SPAWN_OPACITY: f64 = 0.0;
const SPAWN_SCALE: f64 = 0.9;
const FLOAT_PX: f64 = 6.0;
const FLOAT_ROTATION_DEG: f64 = 2.0;
const MAX_SPREAD_PX: f64 = 480.0;

fn lerp_vec(a: Vec2, b: Vec2, t: f64) -> Vec2 {
    a.lerp(b, t)
}

/// The six-phase choreography in timeline units.
pub fn choreography() -> Timeline {
    Timeline::new()
        .with(PhaseKind::ShrinkText, Position::At(0.0), 0.5, Ease::Linear)
        .with(PhaseKind::Converge, Position::At(0.0), 1.0, Ease::OutCubic)
        .with(
            PhaseKind::Float,
            Position::AfterPrevious(-0.05),
            0.4,
            Ease::InOutSine,
        )
        .with(
            PhaseKind::ShadowSettle,
            Position::AfterPrevious(0.0),
            0.35,
            Ease::OutSine,
        )
        .with(
            PhaseKind::CenterSqueeze,
            Position::AfterPrevious(-0.05),
            0.10,
            Ease::InCubic,
        )
        .with(
            PhaseKind::FinalNudge,
            Position::AfterPrevious(-0.02),
            0.18,
            Ease::OutQuad,
        )
}

/// Angle of card `index` out of `count`, evenly spread around the circle.
pub fn ring_angle(index: usize, count: usize) -> f64 {
    (index as f64 / count.max(1) as f64) * TAU
}

/// Deterministic jitter in `[-0.5, 0.5)` derived from the card index alone.
pub fn spawn_jitter(index: usize) -> f64 {
    ((index.wrapping_mul(73) % 100) as f64) / 100.0 - 0.5
}

/// Pinned scroll length in px: `max(vh * scroll_vh, min_scroll_px)`.
pub fn scroll_length_px(viewport: ViewportMetrics, config: &ConvergeConfig) -> f64 {
    let viewport = viewport.sanitized();
    let bp = config.breakpoints.classify(viewport.width);
    let constants = LayoutConstants::for_breakpoint(bp, config.final_scale, config.scroll_vh);
    (viewport.height * constants.scroll_vh).max(config.min_scroll_px)
}

/// Resolved geometry for one layout pass.
#[derive(Clone, Debug, serde::Serialize)]
pub struct ConvergeLayout {
    pub viewport: ViewportMetrics,
    pub constants: LayoutConstants,
    pub ring_radius: f64,
    /// Negated average of the clamped ring positions.
    pub center_offset: Vec2,
    pub scroll_len_px: f64,
    pub initial_scale: f64,
    pub timeline: Timeline,
    pub cards: Vec<CardPath>,
}

impl ConvergeLayout {
    /// Compute every card's waypoints for `viewport` and the measured card sizes.
    pub fn compute(
        config: &ConvergeConfig,
        viewport: ViewportMetrics,
        sizes: &[CardSize],
    ) -> Self {
        let viewport = viewport.sanitized();
        let bp = config.breakpoints.classify(viewport.width);
        let constants = LayoutConstants::for_breakpoint(bp, config.final_scale, config.scroll_vh);
        let ring_radius = viewport.min_side() * constants.ring_fraction;
        let n = sizes.len();

        let x_bounds = |s: &CardSize| axis_bounds(viewport.width, s.width, constants.margin_px);
        let y_bounds = |s: &CardSize| axis_bounds(viewport.height, s.height, constants.margin_px);

        let center_offset = if n == 0 {
            Vec2::ZERO
        } else {
            let (sum_x, sum_y) = sizes.iter().enumerate().fold((0.0, 0.0), |(sx, sy), (i, s)| {
                let angle = ring_angle(i, n);
                (
                    sx + clamp_axis(angle.cos() * ring_radius, x_bounds(s)),
                    sy + clamp_axis(angle.sin() * ring_radius, y_bounds(s)),
                )
            });
            Vec2::new(-sum_x / n as f64, -sum_y / n as f64)
        };

        let band_top = -viewport.height / 2.0 + config.edge_band_inset_px;
        let band_bottom = viewport.height / 2.0 - config.edge_band_inset_px;
        let spread = config.start_spread_px.min(MAX_SPREAD_PX);
        let timeline = choreography();
        let start_of = |kind: PhaseKind| timeline.phase(kind).map_or(0.0, |p| p.start);

        let cards = sizes
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let angle = ring_angle(i, n);
                let target = Vec2::new(
                    clamp_axis(angle.cos() * ring_radius + center_offset.x, x_bounds(s)),
                    clamp_axis(angle.sin() * ring_radius + center_offset.y, y_bounds(s)),
                );

                let from_right = i % 2 == 1;
                let card_w = if s.width > 0.0 {
                    s.width
                } else {
                    config.fallback_card_width_px
                };
                let j = spawn_jitter(i);
                let x_edge = viewport.width / 2.0 + card_w / 2.0 + config.edge_gap_px;
                let spawn = Vec2::new(
                    if from_right { x_edge } else { -x_edge } + j * spread * 0.06,
                    map_range(
                        i as f64,
                        0.0,
                        n.saturating_sub(1).max(1) as f64,
                        band_top,
                        band_bottom,
                    ) + j * 12.0,
                );

                let (float_delta, float_rotation_deg) = if i % 2 == 0 {
                    (Vec2::new(FLOAT_PX, -FLOAT_PX), -FLOAT_ROTATION_DEG)
                } else {
                    (Vec2::new(-FLOAT_PX, FLOAT_PX), FLOAT_ROTATION_DEG)
                };
                // later waypoints derive from where the card is when their phase starts
                let live = |steps: &[(PhaseKind, Vec2)], kind: PhaseKind| {
                    sample_chain(&timeline, spawn, steps, start_of(kind), lerp_vec)
                };
                let mut steps = vec![(PhaseKind::Converge, target)];
                let floated = live(&steps, PhaseKind::Float) + float_delta;
                steps.push((PhaseKind::Float, floated));
                let squeezed = live(&steps, PhaseKind::CenterSqueeze) * constants.center_bias;
                steps.push((PhaseKind::CenterSqueeze, squeezed));
                let at_nudge = live(&steps, PhaseKind::FinalNudge);
                let nudged = Vec2::new(
                    toward_zero(at_nudge.x, constants.nudge_x_px),
                    toward_zero(at_nudge.y, constants.nudge_y_px),
                );

                CardPath {
                    size: *s,
                    angle,
                    spawn,
                    spawn_rotation_deg: j * 18.0,
                    target,
                    floated,
                    float_rotation_deg,
                    squeezed,
                    nudged,
                    z_index: n - i,
                }
            })
            .collect();

        Self {
            viewport,
            constants,
            ring_radius,
            center_offset,
            scroll_len_px: scroll_length_px(viewport, config),
            initial_scale: config.initial_scale,
            timeline,
            cards,
        }
    }

    /// Compute with every card at the breakpoint's default size.
    pub fn with_default_sizes(
        config: &ConvergeConfig,
        viewport: ViewportMetrics,
        count: usize,
    ) -> Self {
        let viewport = viewport.sanitized();
        let bp = config.breakpoints.classify(viewport.width);
        let constants = LayoutConstants::for_breakpoint(bp, config.final_scale, config.scroll_vh);
        let sizes = vec![constants.card_size(viewport); count];
        Self::compute(config, viewport, &sizes)
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    /// Scroll progress at which timeline time `t` is reached.
    pub fn progress_at_time(&self, t: f64) -> f64 {
        let total = self.timeline.duration();
        if total <= 0.0 {
            return 1.0;
        }
        (t / total).clamp(0.0, 1.0)
    }

    /// Geometry of card `index` at `progress`; `None` past the last card.
    pub fn sample(&self, progress: f64, index: usize) -> Option<CardGeometry> {
        let path = self.cards.get(index)?;
        let t = self.timeline.time_at(progress);
        let tl = &self.timeline;

        let pos = sample_chain(
            tl,
            path.spawn,
            &[
                (PhaseKind::Converge, path.target),
                (PhaseKind::Float, path.floated),
                (PhaseKind::CenterSqueeze, path.squeezed),
                (PhaseKind::FinalNudge, path.nudged),
            ],
            t,
            lerp_vec,
        );
        let rotation_deg = sample_chain(
            tl,
            path.spawn_rotation_deg,
            &[
                (PhaseKind::Converge, 0.0),
                (PhaseKind::Float, path.float_rotation_deg),
            ],
            t,
            lerp,
        );
        let opacity = sample_chain(tl, SPAWN_OPACITY, &[(PhaseKind::Converge, 1.0)], t, lerp);
        let scale = sample_chain(tl, SPAWN_SCALE, &[(PhaseKind::Converge, 1.0)], t, lerp);
        let shadow = sample_chain(
            tl,
            DropShadow::SPAWN,
            &[
                (PhaseKind::Converge, DropShadow::FLYING),
                (PhaseKind::ShadowSettle, DropShadow::RESTING),
            ],
            t,
            DropShadow::lerp,
        );

        Some(CardGeometry {
            x: pos.x,
            y: pos.y,
            rotation_deg,
            opacity: opacity.clamp(0.0, 1.0),
            scale,
            shadow,
        })
    }

    /// Geometry of every card at `progress`, in index order.
    pub fn sample_all(&self, progress: f64) -> Vec<CardGeometry> {
        (0..self.cards.len())
            .filter_map(|i| self.sample(progress, i))
            .collect()
    }

    /// Headline block scale at `progress`.
    pub fn text_scale(&self, progress: f64) -> f64 {
        let t = self.timeline.time_at(progress);
        sample_chain(
            &self.timeline,
            self.initial_scale,
            &[(PhaseKind::ShrinkText, self.constants.final_scale)],
            t,
            lerp,
        )
    }
}

/// One-shot geometry of card `index` at `progress`.
pub fn geometry(
    progress: f64,
    index: usize,
    sizes: &[CardSize],
    viewport: ViewportMetrics,
    config: &ConvergeConfig,
) -> Option<CardGeometry> {
    ConvergeLayout::compute(config, viewport, sizes).sample(progress, index)
}

#[cfg(test)]
#[path = "../../tests/unit/converge/geometry.rs"]
mod tests;
