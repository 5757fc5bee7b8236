//! Element lookup by markup convention.
//!
//! The components take their elements explicitly ([`PageElements`]); this
//! module produces that value from a document that follows the generated
//! site's markup, using the names in [`SelectorConfig`].
//!
//! Lazy images and the gallery are discovered independently. Incomplete
//! gallery markup disables the gallery only; lazy loading still runs.

use crate::config::SelectorConfig;
use crate::dom::{Document, ElementId};
use crate::gallery::GalleryElements;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiscoveryError {
    #[error("gallery .{gallery} found but no .{missing} element")]
    MissingGalleryPart { gallery: String, missing: String },
}

/// Every element the behavior layer binds to on one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageElements {
    /// Placeholder images, in document order.
    pub lazy_images: Vec<ElementId>,
    /// `None` on pages without a gallery.
    pub gallery: Option<GalleryElements>,
}

pub fn discover(doc: &dyn Document, selectors: &SelectorConfig) -> PageElements {
    let lazy_images = doc
        .query_class(&selectors.lazy_image)
        .into_iter()
        .filter(|id| doc.tag_name(*id) == "img")
        .collect();
    let gallery = discover_gallery(doc, selectors).unwrap_or_else(|e| {
        warn!("gallery disabled: {e}");
        None
    });
    PageElements {
        lazy_images,
        gallery,
    }
}

fn first(doc: &dyn Document, class: &str) -> Option<ElementId> {
    doc.query_class(class).into_iter().next()
}

/// The gallery's elements, `Ok(None)` when the page has no gallery container.
pub fn discover_gallery(
    doc: &dyn Document,
    selectors: &SelectorConfig,
) -> Result<Option<GalleryElements>, DiscoveryError> {
    let Some(container) = first(doc, &selectors.gallery) else {
        return Ok(None);
    };
    let required = |class: &String| {
        first(doc, class).ok_or_else(|| DiscoveryError::MissingGalleryPart {
            gallery: selectors.gallery.clone(),
            missing: class.clone(),
        })
    };
    Ok(Some(GalleryElements {
        container,
        items: doc.query_class(&selectors.gallery_item),
        open_triggers: doc.query_class(&selectors.open_trigger),
        index_display: required(&selectors.index_display)?,
        modal: required(&selectors.modal)?,
        close: first(doc, &selectors.close),
        prev: doc.element_by_id(&selectors.prev),
        next: doc.element_by_id(&selectors.next),
    }))
}
