//! Viewport measurements and the in-view test.
//!
//! Two different reductions of [`ViewportMetrics`] exist:
//!
//! - [`Frame::visible`]: the frame the fallback strategy tests against,
//!   re-read on every sweep. Inner size wins, client size covers hosts that
//!   report zero.
//! - [`Viewport::capture`]: the page size the gallery paginates by, captured
//!   once at load. Width is the narrower of the two metrics (scrollbars
//!   excluded), height the taller.

use crate::dom::{Rect, ViewportMetrics};

/// Visible frame the fallback in-view test is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn visible(metrics: &ViewportMetrics) -> Self {
        Self {
            width: first_present(metrics.inner_width, metrics.client_width),
            height: first_present(metrics.inner_height, metrics.client_height),
        }
    }
}

/// Page dimensions captured once when the gallery binds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn capture(metrics: &ViewportMetrics) -> Self {
        let width = match (present(metrics.client_width), present(metrics.inner_width)) {
            (Some(c), Some(i)) => c.min(i),
            (Some(w), None) | (None, Some(w)) => w,
            (None, None) => 0.0,
        };
        Self {
            width,
            height: metrics.client_height.max(metrics.inner_height).max(0.0),
        }
    }
}

fn present(value: f64) -> Option<f64> {
    (value > 0.0).then_some(value)
}

fn first_present(primary: f64, fallback: f64) -> f64 {
    present(primary).unwrap_or(fallback.max(0.0))
}

/// Whether a displayed element's box overlaps the frame.
///
/// Edges are inclusive: a box touching the bottom edge of the frame counts
/// as in view.
pub fn in_view(rect: &Rect, displayed: bool, frame: &Frame) -> bool {
    rect.bottom >= 0.0
        && rect.right >= 0.0
        && rect.top <= frame.height
        && rect.left <= frame.width
        && displayed
}
