//! Modal gallery navigation.
//!
//! The gallery is a horizontal strip of full-viewport-width images inside a
//! modal. Navigation moves the strip's `scrollLeft` one page (one captured
//! viewport width) at a time and wraps around at both ends; a "N / M"
//! indicator follows the scroll position.
//!
//! ## Timing
//!
//! The indicator refresh is a trailing-edge debounce: every strip scroll
//! cancels the pending refresh and schedules a new one, so a burst of scroll
//! events produces exactly one refresh, `debounce` after the last event.
//!
//! ## Index formula
//!
//! `index = max(1, ceil(scrollLeft / width))`. The first two pages both read
//! as `1` and the last page reads `count - 1`.

use crate::activity::Activity;
use crate::config::{ClassConfig, GalleryConfig};
use crate::dom::{Document, ElementId};
use crate::page::Context;
use crate::schedule::{Task, TimerId};
use crate::viewport::Viewport;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// The elements a gallery operates over.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryElements {
    /// Horizontally scrolling strip holding the images.
    pub container: ElementId,
    /// One entry per gallery image; only the count matters.
    pub items: Vec<ElementId>,
    /// Elements that open the modal when clicked.
    pub open_triggers: Vec<ElementId>,
    /// Receives the "N / M" text.
    pub index_display: ElementId,
    pub modal: ElementId,
    pub close: Option<ElementId>,
    pub prev: Option<ElementId>,
    pub next: Option<ElementId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

impl Direction {
    fn step(self) -> f64 {
        match self {
            Self::Prev => -1.0,
            Self::Next => 1.0,
        }
    }
}

/// Keys the gallery reacts to, from DOM `KeyboardEvent.key` names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Space,
    Escape,
    Other,
}

impl Key {
    /// Map a `KeyboardEvent.key` value, including legacy names.
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "ArrowRight" | "Right" => Self::ArrowRight,
            " " | "Space" | "Spacebar" => Self::Space,
            "Escape" | "Esc" => Self::Escape,
            _ => Self::Other,
        }
    }
}

#[derive(Debug)]
pub struct GalleryController {
    elements: GalleryElements,
    viewport: Viewport,
    debounce: Duration,
    active_class: String,
    timer: Option<TimerId>,
}

impl GalleryController {
    pub fn bind(
        elements: GalleryElements,
        viewport: Viewport,
        config: &GalleryConfig,
        classes: &ClassConfig,
    ) -> Self {
        debug!(
            images = elements.items.len(),
            page_width = viewport.width,
            "gallery bound"
        );
        if viewport.width <= 0.0 {
            warn!("viewport width is zero, gallery navigation disabled");
        }
        Self {
            elements,
            viewport,
            debounce: config.debounce,
            active_class: classes.modal_active.clone(),
            timer: None,
        }
    }

    pub fn elements(&self) -> &GalleryElements {
        &self.elements
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn image_count(&self) -> usize {
        self.elements.items.len()
    }

    /// Whether an indicator refresh is waiting for its quiet period.
    pub fn refresh_pending(&self) -> bool {
        self.timer.is_some()
    }

    pub fn is_modal_open(&self, doc: &dyn Document) -> bool {
        doc.has_class(self.elements.modal, &self.active_class)
    }

    pub fn open_modal(&self, ctx: &mut Context<'_>) {
        ctx.doc.add_class(self.elements.modal, &self.active_class);
        ctx.record(Activity::ModalOpened);
    }

    pub fn close_modal(&self, ctx: &mut Context<'_>) {
        ctx.doc.remove_class(self.elements.modal, &self.active_class);
        ctx.record(Activity::ModalClosed);
    }

    /// Offset of the last page.
    fn last_offset(&self) -> f64 {
        self.image_count().saturating_sub(1) as f64 * self.viewport.width
    }

    /// Move one page in `direction`, wrapping past either end. Returns the new offset.
    pub fn increment(&self, ctx: &mut Context<'_>, direction: Direction) -> f64 {
        let width = self.viewport.width;
        let from = ctx.doc.scroll_left(self.elements.container);
        if width <= 0.0 {
            return from;
        }
        let target = from + direction.step() * width;
        let last = self.last_offset();
        let to = if target > last {
            0.0
        } else if target < 0.0 {
            last
        } else {
            target
        };
        ctx.doc.set_scroll_left(self.elements.container, to);
        debug!(from, to, ?direction, "gallery moved");
        ctx.record(Activity::GalleryMoved { from, to });
        to
    }

    pub fn prev_image(&self, ctx: &mut Context<'_>) -> f64 {
        self.increment(ctx, Direction::Prev)
    }

    pub fn next_image(&self, ctx: &mut Context<'_>) -> f64 {
        self.increment(ctx, Direction::Next)
    }

    /// The strip scrolled: restart the indicator refresh timer.
    pub fn on_scroll(&mut self, ctx: &mut Context<'_>) {
        if let Some(timer) = self.timer.take() {
            ctx.scheduler.clear_timeout(timer);
        }
        self.timer = Some(ctx.scheduler.set_timeout(self.debounce, Task::GalleryIndex));
    }

    /// 1-based indicator value for a strip offset.
    pub fn index_at(&self, offset: f64) -> usize {
        if self.viewport.width <= 0.0 {
            return 1;
        }
        ((offset / self.viewport.width).ceil().max(1.0)) as usize
    }

    /// The refresh timer fired: rewrite the "N / M" indicator.
    pub fn on_refresh(&mut self, ctx: &mut Context<'_>) {
        self.timer = None;
        let index = self.index_at(ctx.doc.scroll_left(self.elements.container));
        let count = self.image_count();
        ctx.doc
            .set_text(self.elements.index_display, &format!("{index} / {count}"));
        ctx.record(Activity::IndexUpdated { index, count });
    }

    /// Handle a key press. Returns `true` when the default action must be
    /// prevented. Keys are ignored while the modal is closed.
    pub fn check_key(&self, ctx: &mut Context<'_>, key: Key) -> bool {
        if !self.is_modal_open(ctx.doc) {
            return false;
        }
        trace!(?key, "gallery key");
        match key {
            Key::ArrowLeft => {
                self.prev_image(ctx);
                true
            }
            Key::ArrowRight | Key::Space => {
                self.next_image(ctx);
                true
            }
            Key::Escape => {
                self.close_modal(ctx);
                false
            }
            Key::Other => false,
        }
    }

    /// Route a click to the bound control. Returns `false` when `target` is
    /// not a gallery control.
    pub fn handle_click(&self, ctx: &mut Context<'_>, target: ElementId) -> bool {
        let el = &self.elements;
        if el.open_triggers.contains(&target) {
            self.open_modal(ctx);
        } else if el.close == Some(target) {
            self.close_modal(ctx);
        } else if el.prev == Some(target) {
            self.prev_image(ctx);
        } else if el.next == Some(target) {
            self.next_image(ctx);
        } else {
            return false;
        }
        true
    }
}
