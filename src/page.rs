//! Per-page runtime.
//!
//! A [`Page`] is what runs on document ready: it owns the host document, the
//! timer queue, the activity journal, the lazy loader and (when the page has
//! one) the gallery controller. The host feeds it [`HostEvent`]s and moves
//! time forward; everything else follows.
//!
//! ```text
//! host event ──► Page::dispatch ──► LazyLoader / GalleryController
//!                                        │
//!                      Scheduler ◄───────┘ (throttle, debounce)
//!                          │
//! Page::advance_to ────────┘ fires due timers
//! ```
//!
//! The lazy loader and the gallery never see each other; they only share the
//! document, the clock and the journal through a [`Context`].

use crate::activity::{Activity, Entry, Journal};
use crate::config::BehaviorConfig;
use crate::discover::{PageElements, discover};
use crate::dom::{Document, ElementId, IntersectionEntry};
use crate::gallery::{GalleryController, Key};
use crate::lazy::LazyLoader;
use crate::memory_dom::{MemoryDocument, ScrollTarget};
use crate::schedule::{Scheduler, Task};
use crate::viewport::Viewport;
use std::time::Duration;

/// Borrowed page services handed to a component for one event.
pub struct Context<'a> {
    pub doc: &'a mut dyn Document,
    pub scheduler: &'a mut Scheduler,
    pub journal: &'a mut Journal,
}

impl Context<'_> {
    /// Journal `activity` at the current time.
    pub fn record(&mut self, activity: Activity) {
        let now = self.scheduler.now();
        self.journal.record(now, activity);
    }
}

/// Notifications a host delivers to the page.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// The document scrolled.
    Scroll,
    /// The gallery strip scrolled.
    GalleryScroll,
    /// A batch from the intersection watcher.
    Intersections(Vec<IntersectionEntry>),
    Click(ElementId),
    KeyDown(Key),
    ImageLoaded(ElementId),
    ImageError(ElementId),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventOutcome {
    /// The host must suppress the event's default action.
    pub default_prevented: bool,
}

pub struct Page<D: Document> {
    document: D,
    scheduler: Scheduler,
    journal: Journal,
    lazy: LazyLoader,
    gallery: Option<GalleryController>,
}

impl<D: Document> Page<D> {
    /// Bind to a document that follows the markup convention.
    ///
    /// A page whose gallery markup is incomplete still gets lazy loading.
    pub fn ready(document: D, config: &BehaviorConfig) -> Self {
        let elements = discover(&document, &config.selectors);
        Self::with_elements(document, elements, config)
    }

    /// Bind to explicitly provided elements.
    pub fn with_elements(mut document: D, elements: PageElements, config: &BehaviorConfig) -> Self {
        let mut scheduler = Scheduler::new();
        let mut journal = Journal::new();
        let mut ctx = Context {
            doc: &mut document,
            scheduler: &mut scheduler,
            journal: &mut journal,
        };
        let lazy = LazyLoader::initialize(
            &mut ctx,
            elements.lazy_images,
            &config.lazy,
            &config.classes,
        );
        let viewport = Viewport::capture(&ctx.doc.viewport_metrics());
        let gallery = elements
            .gallery
            .map(|el| GalleryController::bind(el, viewport, &config.gallery, &config.classes));
        Self {
            document,
            scheduler,
            journal,
            lazy,
            gallery,
        }
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn lazy(&self) -> &LazyLoader {
        &self.lazy
    }

    pub fn gallery(&self) -> Option<&GalleryController> {
        self.gallery.as_ref()
    }

    pub fn journal(&self) -> &[Entry] {
        self.journal.entries()
    }

    pub fn take_journal(&mut self) -> Vec<Entry> {
        self.journal.take()
    }

    /// Journal entries matching `pred`.
    pub fn count(&self, pred: impl Fn(&Activity) -> bool) -> usize {
        self.journal.count(pred)
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.scheduler.next_due()
    }

    fn parts(&mut self) -> (Context<'_>, &mut LazyLoader, Option<&mut GalleryController>) {
        (
            Context {
                doc: &mut self.document,
                scheduler: &mut self.scheduler,
                journal: &mut self.journal,
            },
            &mut self.lazy,
            self.gallery.as_mut(),
        )
    }

    pub fn dispatch(&mut self, event: HostEvent) -> EventOutcome {
        let (mut ctx, lazy, gallery) = self.parts();
        let mut outcome = EventOutcome::default();
        match event {
            HostEvent::Scroll => lazy.on_scroll(&mut ctx),
            HostEvent::Intersections(entries) => lazy.on_intersections(&mut ctx, &entries),
            HostEvent::GalleryScroll => {
                if let Some(gallery) = gallery {
                    gallery.on_scroll(&mut ctx);
                }
            }
            HostEvent::Click(target) => {
                if let Some(gallery) = gallery {
                    gallery.handle_click(&mut ctx, target);
                }
            }
            HostEvent::KeyDown(key) => {
                if let Some(gallery) = gallery {
                    outcome.default_prevented = gallery.check_key(&mut ctx, key);
                }
            }
            HostEvent::ImageLoaded(image) => {
                lazy.on_image_loaded(&mut ctx, image);
            }
            // A failed load never completes its swap; the placeholder stays.
            HostEvent::ImageError(_) => {}
        }
        outcome
    }

    /// Fire every timer due up to `at`, in order, then move the clock to `at`.
    pub fn advance_to(&mut self, at: Duration) {
        while let Some((_, task)) = self.scheduler.pop_due(at) {
            self.run(task);
        }
        self.scheduler.advance_to(at);
    }

    pub fn advance(&mut self, by: Duration) {
        self.advance_to(self.now() + by);
    }

    fn run(&mut self, task: Task) {
        let (mut ctx, lazy, gallery) = self.parts();
        match task {
            Task::LazySweep => lazy.on_sweep(&mut ctx),
            Task::GalleryIndex => {
                if let Some(gallery) = gallery {
                    gallery.on_refresh(&mut ctx);
                }
            }
        }
    }
}

impl Page<MemoryDocument> {
    /// Deliver every notification the in-memory host has queued: scrolls
    /// first, then intersection changes, until nothing is left.
    pub fn settle(&mut self) {
        loop {
            let scrolls = self.document.take_scroll_notifications();
            let entries = self.document.take_intersections();
            if scrolls.is_empty() && entries.is_empty() {
                break;
            }
            let strip = self.gallery.as_ref().map(|g| g.elements().container);
            for target in scrolls {
                match target {
                    ScrollTarget::Window => {
                        self.dispatch(HostEvent::Scroll);
                    }
                    ScrollTarget::Element(id) if Some(id) == strip => {
                        self.dispatch(HostEvent::GalleryScroll);
                    }
                    ScrollTarget::Element(_) => {}
                }
            }
            if !entries.is_empty() {
                self.dispatch(HostEvent::Intersections(entries));
            }
        }
    }

    pub fn scroll_window_to(&mut self, x: f64, y: f64) {
        self.document.scroll_window_to(x, y);
        self.settle();
    }

    pub fn scroll_gallery_to(&mut self, offset: f64) {
        if let Some(strip) = self.gallery.as_ref().map(|g| g.elements().container) {
            self.document.set_scroll_left(strip, offset);
            self.settle();
        }
    }

    pub fn click(&mut self, target: ElementId) {
        self.dispatch(HostEvent::Click(target));
        self.settle();
    }

    pub fn press(&mut self, key: Key) -> EventOutcome {
        let outcome = self.dispatch(HostEvent::KeyDown(key));
        self.settle();
        outcome
    }

    /// Complete the load of the replacement created for `placeholder`.
    pub fn finish_load(&mut self, placeholder: ElementId) -> bool {
        match self.lazy.replacement_for(placeholder) {
            Some(replacement) => {
                self.dispatch(HostEvent::ImageLoaded(replacement));
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ObserverMode;
    use crate::lazy::StrategyKind;
    use crate::test_helpers::{GalleryMarkup, add_gallery, add_lazy_image};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// Three placeholders at 1000, 2000 and 3000px, none visible at load.
    fn lazy_page(observer: bool) -> (Page<MemoryDocument>, Vec<ElementId>) {
        let mut doc = MemoryDocument::new(800.0, 600.0);
        doc.set_observer_support(observer);
        let body = doc.body();
        let images = (1..=3)
            .map(|i| {
                let figure = doc.append_new(body, "figure");
                add_lazy_image(&mut doc, figure, i as f64 * 1000.0, &format!("{i}.avif"))
            })
            .collect();
        let mut page = Page::ready(doc, &BehaviorConfig::default());
        page.settle();
        (page, images)
    }

    fn gallery_page(count: usize) -> (Page<MemoryDocument>, GalleryMarkup) {
        let mut doc = MemoryDocument::new(800.0, 600.0);
        let markup = add_gallery(&mut doc, count);
        let page = Page::ready(doc, &BehaviorConfig::default());
        (page, markup)
    }

    fn started(page: &Page<MemoryDocument>) -> Vec<ElementId> {
        page.journal()
            .iter()
            .filter_map(|e| match e.activity {
                Activity::SwapStarted { placeholder, .. } => Some(placeholder),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn observer_scroll_swaps_only_the_image_in_view() {
        let (mut page, images) = lazy_page(true);
        assert_eq!(page.lazy().strategy(), StrategyKind::Observer);
        assert!(started(&page).is_empty());

        page.scroll_window_to(0.0, 1800.0);
        assert_eq!(started(&page), vec![images[1]]);

        // Scrolling away and back does not swap it again.
        page.scroll_window_to(0.0, 0.0);
        page.scroll_window_to(0.0, 1800.0);
        assert_eq!(started(&page), vec![images[1]]);
    }

    #[test]
    fn fallback_scroll_swaps_only_the_image_in_view() {
        let (mut page, images) = lazy_page(false);
        assert_eq!(page.lazy().strategy(), StrategyKind::Fallback);

        page.scroll_window_to(0.0, 1800.0);
        assert!(started(&page).is_empty());
        page.advance(ms(200));
        assert_eq!(started(&page), vec![images[1]]);

        page.scroll_window_to(0.0, 1700.0);
        page.advance(ms(200));
        assert_eq!(started(&page), vec![images[1]]);
    }

    #[test]
    fn observer_swaps_images_visible_at_load() {
        let mut doc = MemoryDocument::new(800.0, 600.0);
        let body = doc.body();
        let visible = add_lazy_image(&mut doc, body, 100.0, "hero.avif");
        let mut page = Page::ready(doc, &BehaviorConfig::default());
        page.settle();
        assert_eq!(started(&page), vec![visible]);
    }

    #[test]
    fn fallback_waits_for_first_scroll() {
        let mut doc = MemoryDocument::new(800.0, 600.0);
        doc.set_observer_support(false);
        let body = doc.body();
        add_lazy_image(&mut doc, body, 100.0, "hero.avif");
        let mut page = Page::ready(doc, &BehaviorConfig::default());
        page.advance(ms(1000));
        assert!(started(&page).is_empty());
    }

    #[test]
    fn scroll_bursts_are_throttled_per_window() {
        let (mut page, _) = lazy_page(false);
        for t in [0, 30, 60, 90, 150, 199] {
            page.advance_to(ms(t));
            page.scroll_window_to(0.0, t as f64);
        }
        page.advance_to(ms(260));
        assert_eq!(page.count(|a| matches!(a, Activity::Sweep { .. })), 1);

        page.scroll_window_to(0.0, 500.0);
        page.advance_to(ms(500));
        assert_eq!(page.count(|a| matches!(a, Activity::Sweep { .. })), 2);
    }

    #[test]
    fn load_completes_swap_and_failure_keeps_placeholder() {
        let (mut page, images) = lazy_page(true);
        page.scroll_window_to(0.0, 900.0);
        page.scroll_window_to(0.0, 1900.0);
        assert_eq!(started(&page), vec![images[0], images[1]]);

        assert!(page.finish_load(images[1]));
        let failed = page.lazy().replacement_for(images[0]).unwrap();
        page.dispatch(HostEvent::ImageError(failed));

        let doc = page.document();
        assert!(doc.is_connected(images[0]));
        assert!(!doc.is_connected(images[1]));
        assert_eq!(page.count(|a| matches!(a, Activity::SwapCompleted { .. })), 1);
    }

    #[test]
    fn broken_gallery_markup_does_not_stop_lazy_loading() {
        let mut doc = MemoryDocument::new(800.0, 600.0);
        let body = doc.body();
        let visible = add_lazy_image(&mut doc, body, 100.0, "hero.avif");
        let strip = doc.append_new(body, "div");
        doc.add_class(strip, "gallery-images");

        let mut page = Page::ready(doc, &BehaviorConfig::default());
        page.settle();
        assert!(page.gallery().is_none());
        assert_eq!(started(&page), vec![visible]);
    }

    #[test]
    fn page_without_gallery_ignores_gallery_events() {
        let (mut page, _) = lazy_page(true);
        assert!(page.gallery().is_none());
        let outcome = page.dispatch(HostEvent::KeyDown(Key::ArrowRight));
        assert!(!outcome.default_prevented);
        page.dispatch(HostEvent::GalleryScroll);
        page.advance(ms(500));
        assert_eq!(page.count(|a| matches!(a, Activity::IndexUpdated { .. })), 0);
    }

    #[test]
    fn navigation_drives_indicator_through_scroll_events() {
        let (mut page, m) = gallery_page(4);
        page.click(m.trigger);
        assert!(page.document().has_class(m.modal, "is-active"));

        assert!(page.press(Key::ArrowRight).default_prevented);
        assert!(page.press(Key::Space).default_prevented);
        page.advance(ms(150));
        assert_eq!(page.document().text(m.index), "2 / 4");
        assert_eq!(page.count(|a| matches!(a, Activity::IndexUpdated { .. })), 1);
    }

    #[test]
    fn wraps_from_last_image_with_next_button() {
        let (mut page, m) = gallery_page(4);
        page.scroll_gallery_to(2400.0);
        page.click(m.next);
        assert_eq!(page.document().scroll_left(m.strip), 0.0);
    }

    #[test]
    fn escape_closes_and_later_keys_do_nothing() {
        let (mut page, m) = gallery_page(4);
        page.click(m.trigger);
        assert!(!page.press(Key::Escape).default_prevented);
        assert!(!page.document().has_class(m.modal, "is-active"));

        for key in [Key::ArrowLeft, Key::ArrowRight, Key::Space] {
            assert!(!page.press(key).default_prevented);
        }
        page.advance(ms(500));
        assert_eq!(page.document().scroll_left(m.strip), 0.0);
        assert_eq!(page.document().text(m.index), "");
    }

    #[test]
    fn explicit_elements_bypass_discovery() {
        let mut doc = MemoryDocument::new(800.0, 600.0);
        let body = doc.body();
        let img = doc.append_new(body, "img");
        doc.set_attribute(img, "data-src", "x.avif");
        doc.set_layout(img, crate::dom::Rect::new(0.0, 0.0, 10.0, 10.0));
        let elements = PageElements {
            lazy_images: vec![img],
            gallery: None,
        };
        let mut config = BehaviorConfig::default();
        config.lazy.observer = ObserverMode::Never;
        let mut page = Page::with_elements(doc, elements, &config);
        page.scroll_window_to(0.0, 0.0);
        page.advance(ms(200));
        assert_eq!(started(&page), vec![img]);
        assert!(!page.lazy().listening_to_scroll());
    }
}
