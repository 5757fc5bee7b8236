//! Activation strategies.
//!
//! Exactly one strategy is bound per page, chosen once by
//! [`LazyLoader::initialize`](super::LazyLoader::initialize):
//!
//! | Strategy | Driven by | Decides with |
//! |---|---|---|
//! | [`ObserverStrategy`] | host intersection batches | `is_intersecting` per entry |
//! | [`FallbackStrategy`] | document scroll + throttle timer | [`in_view`](crate::viewport::in_view) sweep |
//!
//! Strategies only decide *which* tracked images to swap. The loader owns the
//! tracked set and performs the swaps, so an image leaves the set the moment
//! it is handed out and can never be selected twice.

use super::StrategyKind;
use crate::activity::Activity;
use crate::dom::{ElementId, IntersectionEntry};
use crate::page::Context;
use crate::schedule::Task;
use crate::viewport::{Frame, in_view};
use std::time::Duration;
use tracing::{debug, trace};

pub trait ActivationStrategy {
    fn kind(&self) -> StrategyKind;

    /// Bind to the full tracked set. Called once.
    fn attach(&mut self, ctx: &mut Context<'_>, images: &[ElementId]);

    /// Whether document scroll notifications still reach this strategy.
    fn listening(&self) -> bool {
        false
    }

    fn on_scroll(&mut self, _ctx: &mut Context<'_>) {}

    /// Targets to swap from an intersection batch, in batch order.
    fn on_intersections(
        &mut self,
        _ctx: &mut Context<'_>,
        _entries: &[IntersectionEntry],
        _tracked: &[ElementId],
    ) -> Vec<ElementId> {
        Vec::new()
    }

    /// Targets to swap when the sweep timer fires, in tracked order.
    fn on_sweep(&mut self, _ctx: &mut Context<'_>, _tracked: &[ElementId]) -> Vec<ElementId> {
        Vec::new()
    }

    /// The sweep's swaps have been performed; `remaining` images are still tracked.
    fn sweep_done(&mut self, _ctx: &mut Context<'_>, _remaining: usize) {}
}

/// Event-driven activation through the host intersection watcher.
#[derive(Debug, Default)]
pub struct ObserverStrategy;

impl ObserverStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl ActivationStrategy for ObserverStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Observer
    }

    fn attach(&mut self, ctx: &mut Context<'_>, images: &[ElementId]) {
        for image in images {
            ctx.doc.observe(*image);
        }
    }

    fn on_intersections(
        &mut self,
        ctx: &mut Context<'_>,
        entries: &[IntersectionEntry],
        tracked: &[ElementId],
    ) -> Vec<ElementId> {
        let mut selected: Vec<ElementId> = Vec::new();
        for entry in entries.iter().filter(|e| e.is_intersecting) {
            if !tracked.contains(&entry.target) || selected.contains(&entry.target) {
                trace!(target_id = %entry.target, "ignoring entry for untracked image");
                continue;
            }
            ctx.doc.unobserve(entry.target);
            selected.push(entry.target);
        }
        selected
    }
}

/// Scroll polling with a leading-edge throttle.
///
/// The first scroll in a quiet window schedules one sweep `throttle` later;
/// scrolls arriving while that sweep is pending are dropped. The in-flight
/// flag clears only after the sweep's swaps are done.
#[derive(Debug)]
pub struct FallbackStrategy {
    throttle: Duration,
    poll_in_flight: bool,
    subscribed: bool,
}

impl FallbackStrategy {
    pub fn new(throttle: Duration) -> Self {
        Self {
            throttle,
            poll_in_flight: false,
            subscribed: false,
        }
    }

    pub fn poll_in_flight(&self) -> bool {
        self.poll_in_flight
    }
}

impl ActivationStrategy for FallbackStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Fallback
    }

    fn attach(&mut self, _ctx: &mut Context<'_>, images: &[ElementId]) {
        self.subscribed = !images.is_empty();
    }

    fn listening(&self) -> bool {
        self.subscribed
    }

    fn on_scroll(&mut self, ctx: &mut Context<'_>) {
        if !self.subscribed || self.poll_in_flight {
            return;
        }
        self.poll_in_flight = true;
        ctx.scheduler.set_timeout(self.throttle, Task::LazySweep);
        ctx.record(Activity::SweepScheduled);
        trace!(delay = ?self.throttle, "sweep scheduled");
    }

    fn on_sweep(&mut self, ctx: &mut Context<'_>, tracked: &[ElementId]) -> Vec<ElementId> {
        let frame = Frame::visible(&ctx.doc.viewport_metrics());
        tracked
            .iter()
            .copied()
            .filter(|id| in_view(&ctx.doc.bounding_rect(*id), ctx.doc.is_displayed(*id), &frame))
            .collect()
    }

    fn sweep_done(&mut self, ctx: &mut Context<'_>, remaining: usize) {
        self.poll_in_flight = false;
        if remaining == 0 && self.subscribed {
            self.subscribed = false;
            ctx.record(Activity::ScrollUnsubscribed);
            debug!("all lazy images swapped, unsubscribed from scroll");
        }
    }
}
