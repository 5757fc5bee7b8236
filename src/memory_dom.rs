//! In-memory [`Document`] implementation.
//!
//! Models just enough of a browser page to drive the behavior layer without
//! one: a tree of elements with classes and attributes, a fixed layout box per
//! element, a scrollable window, horizontally scrollable elements, and the
//! host-side queues a real browser would turn into events:
//!
//! - **Scroll notifications**: every window scroll and every effective
//!   `scrollLeft` change is queued; [`take_scroll_notifications`](MemoryDocument::take_scroll_notifications)
//!   drains them.
//! - **Intersection changes**: observed elements report once right after
//!   `observe`, then whenever their intersecting state flips, mirroring
//!   `IntersectionObserver`.
//! - **Image loads**: setting `src` on an `img` queues a load that the driver
//!   later completes or fails.

use crate::dom::{Document, ElementId, IntersectionEntry, Rect, ViewportMetrics};
use crate::viewport::Frame;
use std::collections::BTreeMap;

/// What a queued scroll notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget {
    Window,
    Element(ElementId),
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    /// Layout box in document coordinates.
    layout: Rect,
    hidden: bool,
    scroll_left: f64,
    max_scroll_left: Option<f64>,
    text: String,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            parent: None,
            children: Vec::new(),
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            layout: Rect::default(),
            hidden: false,
            scroll_left: 0.0,
            max_scroll_left: None,
            text: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<Node>,
    metrics: ViewportMetrics,
    window_scroll: (f64, f64),
    observer_support: bool,
    observed: Vec<(ElementId, Option<bool>)>,
    scroll_queue: Vec<ScrollTarget>,
    load_queue: Vec<ElementId>,
}

impl MemoryDocument {
    /// An empty document (just `<body>`) with a viewport of the given size.
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_metrics(ViewportMetrics {
            client_width: width,
            client_height: height,
            inner_width: width,
            inner_height: height,
        })
    }

    pub fn with_metrics(metrics: ViewportMetrics) -> Self {
        Self {
            nodes: vec![Node::new("body")],
            metrics,
            window_scroll: (0.0, 0.0),
            observer_support: true,
            observed: Vec::new(),
            scroll_queue: Vec::new(),
            load_queue: Vec::new(),
        }
    }

    pub fn body(&self) -> ElementId {
        ElementId(0)
    }

    /// Toggle whether the host advertises an intersection watcher.
    pub fn set_observer_support(&mut self, supported: bool) {
        self.observer_support = supported;
    }

    /// Create an element and append it to `parent` in one step.
    pub fn append_new(&mut self, parent: ElementId, tag: &str) -> ElementId {
        let id = self.create_element(tag);
        self.append_child(parent, id);
        id
    }

    /// Place an element's layout box, in document coordinates.
    pub fn set_layout(&mut self, id: ElementId, rect: Rect) {
        self.node_mut(id).layout = rect;
    }

    /// Toggle `display: none` on an element.
    pub fn set_hidden(&mut self, id: ElementId, hidden: bool) {
        self.node_mut(id).hidden = hidden;
    }

    /// Bound `scrollLeft` for a scroll container, like `scrollWidth - clientWidth`.
    pub fn set_max_scroll_left(&mut self, id: ElementId, max: f64) {
        self.node_mut(id).max_scroll_left = Some(max.max(0.0));
    }

    pub fn text(&self, id: ElementId) -> &str {
        &self.node(id).text
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        &self.node(id).children
    }

    pub fn classes(&self, id: ElementId) -> &[String] {
        &self.node(id).classes
    }

    /// Whether the element is attached to the document tree.
    pub fn is_connected(&self, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(cur) = current {
            if cur == self.body() {
                return true;
            }
            current = self.node(cur).parent;
        }
        false
    }

    pub fn window_scroll(&self) -> (f64, f64) {
        self.window_scroll
    }

    /// Scroll the window and queue a scroll notification.
    pub fn scroll_window_to(&mut self, x: f64, y: f64) {
        self.window_scroll = (x.max(0.0), y.max(0.0));
        self.scroll_queue.push(ScrollTarget::Window);
    }

    pub fn take_scroll_notifications(&mut self) -> Vec<ScrollTarget> {
        std::mem::take(&mut self.scroll_queue)
    }

    /// Images whose `src` was set since the last call.
    pub fn take_started_loads(&mut self) -> Vec<ElementId> {
        std::mem::take(&mut self.load_queue)
    }

    pub fn is_observed(&self, id: ElementId) -> bool {
        self.observed.iter().any(|(target, _)| *target == id)
    }

    /// Intersection changes since the last call, in observation order.
    pub fn take_intersections(&mut self) -> Vec<IntersectionEntry> {
        let frame = Frame::visible(&self.metrics);
        let current: Vec<bool> = self
            .observed
            .iter()
            .map(|(id, _)| self.is_intersecting(*id, &frame))
            .collect();
        let mut entries = Vec::new();
        for ((target, last), now) in self.observed.iter_mut().zip(current) {
            if *last != Some(now) {
                *last = Some(now);
                entries.push(IntersectionEntry {
                    target: *target,
                    is_intersecting: now,
                });
            }
        }
        entries
    }

    fn is_intersecting(&self, id: ElementId, frame: &Frame) -> bool {
        if !self.is_connected(id) || !self.is_displayed(id) {
            return false;
        }
        let rect = self.bounding_rect(id);
        rect.bottom > 0.0 && rect.right > 0.0 && rect.top < frame.height && rect.left < frame.width
    }

    fn node(&self, id: ElementId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: ElementId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    fn walk(&self, from: ElementId, out: &mut Vec<ElementId>) {
        out.push(from);
        for child in &self.node(from).children {
            self.walk(*child, out);
        }
    }

    fn connected_in_order(&self) -> Vec<ElementId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        self.walk(self.body(), &mut out);
        out
    }
}

impl Document for MemoryDocument {
    fn tag_name(&self, id: ElementId) -> String {
        self.node(id).tag.clone()
    }

    fn bounding_rect(&self, id: ElementId) -> Rect {
        if !self.is_connected(id) {
            return Rect::default();
        }
        let (dx, dy) = self.window_scroll;
        self.node(id).layout.scrolled_by(dx, dy)
    }

    fn is_displayed(&self, id: ElementId) -> bool {
        !self.node(id).hidden
    }

    fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.node(id).parent
    }

    fn create_element(&mut self, tag: &str) -> ElementId {
        let id = ElementId(self.nodes.len() as u32);
        self.nodes.push(Node::new(tag));
        id
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) {
        if let Some(old) = self.node(child).parent {
            self.node_mut(old).children.retain(|c| *c != child);
        }
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    fn remove_child(&mut self, parent: ElementId, child: ElementId) {
        let node = self.node_mut(parent);
        let before = node.children.len();
        node.children.retain(|c| *c != child);
        if node.children.len() != before {
            self.node_mut(child).parent = None;
        }
    }

    fn attribute(&self, id: ElementId, name: &str) -> Option<String> {
        self.node(id).attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) {
        let node = self.node_mut(id);
        node.attributes.insert(name.to_string(), value.to_string());
        if name == "src" && node.tag == "img" {
            self.load_queue.push(id);
        }
    }

    fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.node(id).classes.iter().any(|c| c == class)
    }

    fn add_class(&mut self, id: ElementId, class: &str) {
        if !self.has_class(id, class) {
            self.node_mut(id).classes.push(class.to_string());
        }
    }

    fn remove_class(&mut self, id: ElementId, class: &str) {
        self.node_mut(id).classes.retain(|c| c != class);
    }

    fn scroll_left(&self, id: ElementId) -> f64 {
        self.node(id).scroll_left
    }

    fn set_scroll_left(&mut self, id: ElementId, offset: f64) {
        let node = self.node_mut(id);
        let mut clamped = offset.max(0.0);
        if let Some(max) = node.max_scroll_left {
            clamped = clamped.min(max);
        }
        if clamped != node.scroll_left {
            node.scroll_left = clamped;
            self.scroll_queue.push(ScrollTarget::Element(id));
        }
    }

    fn set_text(&mut self, id: ElementId, text: &str) {
        self.node_mut(id).text = text.to_string();
    }

    fn viewport_metrics(&self) -> ViewportMetrics {
        self.metrics
    }

    fn supports_intersection_observer(&self) -> bool {
        self.observer_support
    }

    fn observe(&mut self, id: ElementId) {
        if !self.is_observed(id) {
            self.observed.push((id, None));
        }
    }

    fn unobserve(&mut self, id: ElementId) {
        self.observed.retain(|(target, _)| *target != id);
    }

    fn query_class(&self, class: &str) -> Vec<ElementId> {
        self.connected_in_order()
            .into_iter()
            .filter(|id| self.has_class(*id, class))
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<ElementId> {
        self.connected_in_order()
            .into_iter()
            .find(|el| self.node(*el).attributes.get("id").is_some_and(|v| v == id))
    }
}
