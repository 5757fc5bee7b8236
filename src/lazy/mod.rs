//! Lazy image activation.
//!
//! Placeholder images (`img.lazy` with `data-src`, optional `data-srcset` and
//! `data-alt`) are tracked from page ready. As they approach the viewport the
//! bound [strategy](strategy) picks them and the [swapper](swap) replaces each
//! one with its full-resolution image.
//!
//! ## Tracked set
//!
//! The tracked set is captured once, in document order, and only ever
//! shrinks: an image is removed the moment it is selected for a swap, even
//! if the swap is skipped or its load later fails. Two consequences:
//!
//! - no image is swapped twice, however many notifications or sweeps see it;
//! - the fallback strategy stops listening to scroll once the set is empty.

pub mod strategy;
pub mod swap;

use crate::activity::Activity;
use crate::config::{ClassConfig, LazyConfig, ObserverMode};
use crate::dom::{ElementId, IntersectionEntry};
use crate::page::Context;
use serde::Serialize;
use std::fmt;
use strategy::{ActivationStrategy, FallbackStrategy, ObserverStrategy};
use swap::{ImageSwapper, PendingSwap};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    Observer,
    Fallback,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Observer => write!(f, "observer"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

pub struct LazyLoader {
    tracked: Vec<ElementId>,
    strategy: Box<dyn ActivationStrategy>,
    swapper: ImageSwapper,
}

impl LazyLoader {
    /// Capability-detect the host and bind exactly one strategy over `images`.
    pub fn initialize(
        ctx: &mut Context<'_>,
        images: Vec<ElementId>,
        config: &LazyConfig,
        classes: &ClassConfig,
    ) -> Self {
        let use_observer =
            config.observer == ObserverMode::Auto && ctx.doc.supports_intersection_observer();
        let mut strategy: Box<dyn ActivationStrategy> = if use_observer {
            Box::new(ObserverStrategy::new())
        } else {
            Box::new(FallbackStrategy::new(config.throttle))
        };
        strategy.attach(ctx, &images);

        debug!(strategy = %strategy.kind(), tracked = images.len(), "lazy loading initialized");
        ctx.record(Activity::StrategySelected {
            strategy: strategy.kind(),
            tracked: images.len(),
        });

        Self {
            tracked: images,
            strategy,
            swapper: ImageSwapper::new(classes),
        }
    }

    pub fn strategy(&self) -> StrategyKind {
        self.strategy.kind()
    }

    /// Whether document scroll events still matter to the loader.
    pub fn listening_to_scroll(&self) -> bool {
        self.strategy.listening()
    }

    /// Images not yet selected for a swap, in document order.
    pub fn tracked(&self) -> &[ElementId] {
        &self.tracked
    }

    pub fn pending_swaps(&self) -> &[PendingSwap] {
        self.swapper.pending()
    }

    pub fn replacement_for(&self, placeholder: ElementId) -> Option<ElementId> {
        self.swapper.replacement_for(placeholder)
    }

    pub fn on_scroll(&mut self, ctx: &mut Context<'_>) {
        if self.strategy.listening() {
            self.strategy.on_scroll(ctx);
        }
    }

    pub fn on_intersections(&mut self, ctx: &mut Context<'_>, entries: &[IntersectionEntry]) {
        let selected = self.strategy.on_intersections(ctx, entries, &self.tracked);
        self.swap_all(ctx, &selected);
    }

    /// The throttle timer fired.
    pub fn on_sweep(&mut self, ctx: &mut Context<'_>) {
        let selected = self.strategy.on_sweep(ctx, &self.tracked);
        self.swap_all(ctx, &selected);
        ctx.record(Activity::Sweep {
            swapped: selected.len(),
            remaining: self.tracked.len(),
        });
        self.strategy.sweep_done(ctx, self.tracked.len());
    }

    /// A host image finished loading. Returns `false` if it is not one of
    /// this loader's replacements.
    pub fn on_image_loaded(&mut self, ctx: &mut Context<'_>, image: ElementId) -> bool {
        match self.swapper.complete(ctx.doc, image) {
            Some(swap) => {
                debug!(placeholder = %swap.placeholder, replacement = %swap.replacement, "swap completed");
                ctx.record(Activity::SwapCompleted {
                    placeholder: swap.placeholder,
                    replacement: swap.replacement,
                });
                true
            }
            None => false,
        }
    }

    fn swap_all(&mut self, ctx: &mut Context<'_>, selected: &[ElementId]) {
        for placeholder in selected {
            self.tracked.retain(|id| id != placeholder);
            match self.swapper.begin(ctx.doc, *placeholder) {
                Ok(swap) => {
                    debug!(placeholder = %swap.placeholder, replacement = %swap.replacement, "swap started");
                    ctx.record(Activity::SwapStarted {
                        placeholder: swap.placeholder,
                        replacement: swap.replacement,
                    });
                }
                Err(e) => {
                    warn!(placeholder = %placeholder, "skipping lazy image: {e}");
                    ctx.record(Activity::SwapSkipped {
                        placeholder: *placeholder,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }
}
