//! Conventional page markup for in-memory documents.
//!
//! Builds the structure generated album pages use, with the class names from
//! [`SelectorConfig`], into a [`MemoryDocument`]:
//!
//! ```text
//! <figure><img class="lazy" data-src=… data-srcset=… data-alt=…></figure>
//! <a class="open-gallery">
//! <div class="modal">
//!   <button class="modal-close"> <button id="btn-prev"> <button id="btn-next">
//!   <span class="gallery-index">
//!   <div class="gallery-images"> <figure class="gallery-image"> × N </div>
//! </div>
//! ```

use crate::config::SelectorConfig;
use crate::dom::{Document, ElementId, Rect};
use crate::lazy::swap::{DATA_ALT, DATA_SRC, DATA_SRCSET, LazySource};
use crate::memory_dom::MemoryDocument;

/// Append a lazy placeholder `<img>` under `parent`.
pub fn add_lazy_image(
    doc: &mut MemoryDocument,
    parent: ElementId,
    selectors: &SelectorConfig,
    source: &LazySource,
    layout: Rect,
) -> ElementId {
    let img = doc.append_new(parent, "img");
    doc.add_class(img, &selectors.lazy_image);
    doc.set_attribute(img, DATA_SRC, &source.src);
    if let Some(srcset) = &source.srcset {
        doc.set_attribute(img, DATA_SRCSET, srcset);
    }
    if let Some(alt) = &source.alt {
        doc.set_attribute(img, DATA_ALT, alt);
    }
    doc.set_layout(img, layout);
    img
}

/// Handles to the gallery markup created by [`add_gallery`].
#[derive(Debug, Clone)]
pub struct GalleryMarkup {
    pub strip: ElementId,
    pub items: Vec<ElementId>,
    pub trigger: ElementId,
    pub index: ElementId,
    pub modal: ElementId,
    pub close: ElementId,
    pub prev: ElementId,
    pub next: ElementId,
}

/// Append a gallery of `count` viewport-wide images plus its modal and controls.
pub fn add_gallery(doc: &mut MemoryDocument, count: usize, selectors: &SelectorConfig) -> GalleryMarkup {
    let width = doc.viewport_metrics().client_width;
    let body = doc.body();

    let trigger = doc.append_new(body, "a");
    doc.add_class(trigger, &selectors.open_trigger);

    let modal = doc.append_new(body, "div");
    doc.add_class(modal, &selectors.modal);
    let close = doc.append_new(modal, "button");
    doc.add_class(close, &selectors.close);
    let prev = doc.append_new(modal, "button");
    doc.set_attribute(prev, "id", &selectors.prev);
    let next = doc.append_new(modal, "button");
    doc.set_attribute(next, "id", &selectors.next);
    let index = doc.append_new(modal, "span");
    doc.add_class(index, &selectors.index_display);

    let strip = doc.append_new(modal, "div");
    doc.add_class(strip, &selectors.gallery);
    doc.set_max_scroll_left(strip, count.saturating_sub(1) as f64 * width);
    let items = (0..count)
        .map(|_| {
            let item = doc.append_new(strip, "figure");
            doc.add_class(item, &selectors.gallery_item);
            item
        })
        .collect();

    GalleryMarkup {
        strip,
        items,
        trigger,
        index,
        modal,
        close,
        prev,
        next,
    }
}
