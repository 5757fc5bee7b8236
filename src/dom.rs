//! Host document abstraction.
//!
//! Everything the behavior layer needs from a page goes through the
//! [`Document`] trait: geometry, computed display, tree mutation, classes,
//! attributes, scroll offsets and the intersection watcher. The production
//! host is a browser binding; [`MemoryDocument`](crate::memory_dom::MemoryDocument)
//! implements the same trait in memory for tests and the `simulate` command.
//!
//! The trait is object safe so components can take `&mut dyn Document` and
//! stay independent of the concrete host.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to an element owned by the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u32);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Axis-aligned box in CSS pixels, relative to the current scroll frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            bottom: top + height,
            right: left + width,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// The same box shifted by `(-dx, -dy)`, i.e. seen from a frame scrolled by `(dx, dy)`.
    pub fn scrolled_by(&self, dx: f64, dy: f64) -> Self {
        Self {
            top: self.top - dy,
            left: self.left - dx,
            bottom: self.bottom - dy,
            right: self.right - dx,
        }
    }
}

/// Raw viewport measurements as reported by the host.
///
/// Hosts report `0` for a metric they cannot provide; consumers treat zero
/// as "absent" and fall back to the other metric.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewportMetrics {
    /// `document.documentElement.clientWidth`
    pub client_width: f64,
    /// `document.documentElement.clientHeight`
    pub client_height: f64,
    /// `window.innerWidth`
    pub inner_width: f64,
    /// `window.innerHeight`
    pub inner_height: f64,
}

/// One entry of an intersection watcher notification batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntersectionEntry {
    pub target: ElementId,
    pub is_intersecting: bool,
}

/// The operations the behavior layer performs on a host document.
pub trait Document {
    /// Lower-case tag name (`img`, `figure`, `a`, ...).
    fn tag_name(&self, id: ElementId) -> String;

    /// Bounding box relative to the current scroll frame.
    fn bounding_rect(&self, id: ElementId) -> Rect;

    /// Whether the computed `display` is anything other than `none`.
    fn is_displayed(&self, id: ElementId) -> bool;

    fn parent(&self, id: ElementId) -> Option<ElementId>;

    /// Create a detached element. Nothing is rendered until it is appended.
    fn create_element(&mut self, tag: &str) -> ElementId;

    fn append_child(&mut self, parent: ElementId, child: ElementId);

    fn remove_child(&mut self, parent: ElementId, child: ElementId);

    fn attribute(&self, id: ElementId, name: &str) -> Option<String>;

    /// Setting `src` on an image starts loading it; completion arrives as a
    /// host event.
    fn set_attribute(&mut self, id: ElementId, name: &str, value: &str);

    fn has_class(&self, id: ElementId, class: &str) -> bool;

    fn add_class(&mut self, id: ElementId, class: &str);

    fn remove_class(&mut self, id: ElementId, class: &str);

    fn scroll_left(&self, id: ElementId) -> f64;

    fn set_scroll_left(&mut self, id: ElementId, offset: f64);

    fn set_text(&mut self, id: ElementId, text: &str);

    fn viewport_metrics(&self) -> ViewportMetrics;

    /// Whether the host provides an intersection watcher.
    fn supports_intersection_observer(&self) -> bool;

    /// Start watching `id`; the host then reports [`IntersectionEntry`] batches.
    fn observe(&mut self, id: ElementId);

    fn unobserve(&mut self, id: ElementId);

    /// Elements carrying `class`, in document order.
    fn query_class(&self, class: &str) -> Vec<ElementId>;

    fn element_by_id(&self, id: &str) -> Option<ElementId>;
}
