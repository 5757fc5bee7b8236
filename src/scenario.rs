//! Scripted page simulations.
//!
//! A scenario describes a page (viewport, lazy images with their layout, an
//! optional gallery) and a timeline of user actions. [`Simulation`] builds the
//! page in a [`MemoryDocument`], binds a [`Page`] to it and plays the timeline
//! in virtual time, completing image loads after a fixed latency.
//!
//! ## Scenario File
//!
//! ```toml
//! [viewport]
//! width = 800
//! height = 600
//! intersection_observer = false   # force the scroll-polling fallback host
//!
//! [loads]
//! latency = "100ms"               # time from `src` set to load/error event
//!
//! [[images]]
//! src = "full/001-dawn.avif"
//! srcset = "full/001-dawn-800.avif 800w"   # optional
//! alt = "Dawn"                              # optional
//! top = 1200                                # layout, document coordinates
//! fails = false                             # deliver an error instead of load
//! parent = "figure"                         # or "a"
//!
//! [gallery]
//! images = 4
//!
//! [[events]]
//! at = "0ms"
//! action = { kind = "scroll", y = 1100 }
//!
//! [[events]]
//! at = "500ms"
//! action = { kind = "click", control = "open" }
//!
//! [[events]]
//! at = "600ms"
//! action = { kind = "key", key = "ArrowRight" }
//! ```

use crate::activity::Entry;
use crate::config::BehaviorConfig;
use crate::dom::{Document, ElementId, Rect};
use crate::gallery::Key;
use crate::lazy::swap::LazySource;
use crate::markup::{self, GalleryMarkup};
use crate::memory_dom::MemoryDocument;
use crate::page::{HostEvent, Page};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Scenario validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub viewport: ViewportSpec,
    #[serde(default)]
    pub loads: LoadSpec,
    #[serde(default)]
    pub images: Vec<ImageSpec>,
    pub gallery: Option<GallerySpec>,
    #[serde(default)]
    pub events: Vec<EventSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewportSpec {
    pub width: f64,
    pub height: f64,
    pub intersection_observer: bool,
}

impl Default for ViewportSpec {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            intersection_observer: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadSpec {
    #[serde(with = "humantime_serde")]
    pub latency: Duration,
}

impl Default for LoadSpec {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParentKind {
    #[default]
    Figure,
    A,
}

impl ParentKind {
    fn tag(self) -> &'static str {
        match self {
            Self::Figure => "figure",
            Self::A => "a",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageSpec {
    pub src: String,
    pub srcset: Option<String>,
    pub alt: Option<String>,
    pub top: f64,
    #[serde(default)]
    pub left: f64,
    #[serde(default = "default_image_width")]
    pub width: f64,
    #[serde(default = "default_image_height")]
    pub height: f64,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub fails: bool,
    #[serde(default)]
    pub parent: ParentKind,
}

fn default_image_width() -> f64 {
    400.0
}

fn default_image_height() -> f64 {
    300.0
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GallerySpec {
    pub images: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventSpec {
    #[serde(with = "humantime_serde")]
    pub at: Duration,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Action {
    Scroll {
        #[serde(default)]
        x: f64,
        y: f64,
    },
    GalleryScroll {
        offset: f64,
    },
    Click {
        control: Control,
    },
    Key {
        key: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Control {
    Open,
    Close,
    Prev,
    Next,
}

impl Scenario {
    pub fn from_toml(content: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = toml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        Self::from_toml(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.viewport.width <= 0.0 || self.viewport.height <= 0.0 {
            return Err(ScenarioError::Validation(
                "viewport width and height must be positive".into(),
            ));
        }
        if self.gallery.is_none() {
            let gallery_action = self.events.iter().find(|e| {
                matches!(e.action, Action::GalleryScroll { .. } | Action::Click { .. })
            });
            if let Some(event) = gallery_action {
                return Err(ScenarioError::Validation(format!(
                    "event at {:?} targets the gallery but the scenario has none",
                    event.at
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Simulation
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageStatus {
    /// Still tracked; never selected.
    Pending,
    /// Replacement appended, waiting for its load.
    Loading,
    /// Replacement loaded; placeholder gone.
    Loaded,
    /// Replacement failed to load; placeholder kept.
    Failed,
    /// Selected but could not be swapped.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageReport {
    pub src: String,
    pub status: ImageStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryReport {
    pub offset: f64,
    pub index_text: String,
    pub modal_open: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub strategy: String,
    pub journal: Vec<Entry>,
    pub images: Vec<ImageReport>,
    pub gallery: Option<GalleryReport>,
}

#[derive(Debug, Clone, Copy)]
struct InFlightLoad {
    at: Duration,
    replacement: ElementId,
    fails: bool,
}

pub struct Simulation {
    page: Page<MemoryDocument>,
    placeholders: Vec<(ElementId, ImageSpec)>,
    gallery: Option<GalleryMarkup>,
    latency: Duration,
    loads: Vec<InFlightLoad>,
    failed: Vec<ElementId>,
    events: Vec<EventSpec>,
}

impl Simulation {
    pub fn new(scenario: &Scenario, config: &BehaviorConfig) -> Result<Self, ScenarioError> {
        scenario.validate()?;
        let vp = &scenario.viewport;
        let mut doc = MemoryDocument::new(vp.width, vp.height);
        doc.set_observer_support(vp.intersection_observer);
        let body = doc.body();

        let mut placeholders = Vec::with_capacity(scenario.images.len());
        for spec in &scenario.images {
            let parent = doc.append_new(body, spec.parent.tag());
            let layout = Rect::new(spec.left, spec.top, spec.width, spec.height);
            doc.set_layout(parent, layout);
            let source = LazySource {
                src: spec.src.clone(),
                srcset: spec.srcset.clone(),
                alt: spec.alt.clone(),
            };
            let img = markup::add_lazy_image(&mut doc, parent, &config.selectors, &source, layout);
            doc.set_hidden(img, spec.hidden);
            placeholders.push((img, spec.clone()));
        }

        let gallery = scenario
            .gallery
            .as_ref()
            .map(|g| markup::add_gallery(&mut doc, g.images, &config.selectors));

        let mut page = Page::ready(doc, config);
        page.settle();
        info!(
            strategy = %page.lazy().strategy(),
            images = placeholders.len(),
            gallery = gallery.is_some(),
            "simulated page ready"
        );

        let mut events = scenario.events.clone();
        events.sort_by_key(|e| e.at);

        Ok(Self {
            page,
            placeholders,
            gallery,
            latency: scenario.loads.latency,
            loads: Vec::new(),
            failed: Vec::new(),
            events,
        })
    }

    pub fn page(&self) -> &Page<MemoryDocument> {
        &self.page
    }

    /// Play every event, then let all timers and loads run out.
    pub fn run(mut self) -> Report {
        let events = std::mem::take(&mut self.events);
        for event in events {
            self.advance_to(event.at);
            self.apply(&event.action);
        }
        self.drain();
        self.report()
    }

    fn apply(&mut self, action: &Action) {
        debug!(?action, at = ?self.page.now(), "scenario action");
        match action {
            Action::Scroll { x, y } => self.page.scroll_window_to(*x, *y),
            Action::GalleryScroll { offset } => self.page.scroll_gallery_to(*offset),
            Action::Click { control } => {
                if let Some(target) = self.control(*control) {
                    self.page.click(target);
                }
            }
            Action::Key { key } => {
                let outcome = self.page.press(Key::from_name(key));
                debug!(key = %key, default_prevented = outcome.default_prevented, "key handled");
            }
        }
        self.collect_loads();
    }

    fn control(&self, control: Control) -> Option<ElementId> {
        let g = self.gallery.as_ref()?;
        Some(match control {
            Control::Open => g.trigger,
            Control::Close => g.close,
            Control::Prev => g.prev,
            Control::Next => g.next,
        })
    }

    /// Turn newly started image loads into timed load/error deliveries.
    fn collect_loads(&mut self) {
        let now = self.page.now();
        for replacement in self.page.document_mut().take_started_loads() {
            let placeholder = self
                .page
                .lazy()
                .pending_swaps()
                .iter()
                .find(|p| p.replacement == replacement)
                .map(|p| p.placeholder);
            let fails = placeholder
                .and_then(|p| self.placeholders.iter().find(|(id, _)| *id == p))
                .is_some_and(|(_, spec)| spec.fails);
            self.loads.push(InFlightLoad {
                at: now + self.latency,
                replacement,
                fails,
            });
        }
    }

    fn next_load(&self) -> Option<Duration> {
        self.loads.iter().map(|l| l.at).min()
    }

    fn advance_to(&mut self, until: Duration) {
        loop {
            self.collect_loads();
            let timer = self.page.next_due().filter(|t| *t <= until);
            let load = self.next_load().filter(|t| *t <= until);
            match (timer, load) {
                (None, None) => break,
                (Some(t), Some(l)) if l < t => self.deliver_loads(l),
                (Some(t), _) => self.page.advance_to(t),
                (None, Some(l)) => self.deliver_loads(l),
            }
        }
        self.page.advance_to(until);
    }

    fn deliver_loads(&mut self, at: Duration) {
        self.page.advance_to(at);
        let (due, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.loads)
            .into_iter()
            .partition(|l| l.at <= at);
        self.loads = rest;
        for load in due {
            if load.fails {
                self.failed.push(load.replacement);
                self.page.dispatch(HostEvent::ImageError(load.replacement));
            } else {
                self.page.dispatch(HostEvent::ImageLoaded(load.replacement));
            }
        }
        self.page.settle();
    }

    fn drain(&mut self) {
        loop {
            self.collect_loads();
            let next = match (self.page.next_due(), self.next_load()) {
                (Some(t), Some(l)) => t.min(l),
                (Some(t), None) | (None, Some(t)) => t,
                (None, None) => break,
            };
            self.advance_to(next);
        }
    }

    fn status(&self, placeholder: ElementId) -> ImageStatus {
        let lazy = self.page.lazy();
        if lazy.tracked().contains(&placeholder) {
            return ImageStatus::Pending;
        }
        match lazy.replacement_for(placeholder) {
            Some(r) if self.failed.contains(&r) => ImageStatus::Failed,
            Some(_) => ImageStatus::Loading,
            None if !self.page.document().is_connected(placeholder) => ImageStatus::Loaded,
            None => ImageStatus::Skipped,
        }
    }

    pub fn report(&self) -> Report {
        let doc = self.page.document();
        let images = self
            .placeholders
            .iter()
            .map(|(id, spec)| ImageReport {
                src: spec.src.clone(),
                status: self.status(*id),
            })
            .collect();
        let gallery = self.gallery.as_ref().map(|g| GalleryReport {
            offset: doc.scroll_left(g.strip),
            index_text: doc.text(g.index).to_string(),
            modal_open: self
                .page
                .gallery()
                .is_some_and(|controller| controller.is_modal_open(doc)),
        });
        Report {
            strategy: self.page.lazy().strategy().to_string(),
            journal: self.page.journal().to_vec(),
            images,
            gallery,
        }
    }
}
