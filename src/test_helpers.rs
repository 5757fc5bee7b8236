//! Shared test utilities for building in-memory pages with the default
//! markup convention.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut doc = MemoryDocument::new(800.0, 600.0);
//! let body = doc.body();
//! let img = add_lazy_image(&mut doc, body, 1200.0, "dawn.avif");
//! let gallery = add_gallery(&mut doc, 4);
//! ```

use crate::config::SelectorConfig;
use crate::dom::{ElementId, Rect};
use crate::lazy::swap::LazySource;
use crate::markup;
use crate::memory_dom::MemoryDocument;

pub use crate::markup::GalleryMarkup;

/// Append a 400×300 `img.lazy` placeholder at `top` (document coordinates).
pub fn add_lazy_image(doc: &mut MemoryDocument, parent: ElementId, top: f64, src: &str) -> ElementId {
    let source = LazySource {
        src: src.to_string(),
        srcset: None,
        alt: None,
    };
    markup::add_lazy_image(
        doc,
        parent,
        &SelectorConfig::default(),
        &source,
        Rect::new(0.0, top, 400.0, 300.0),
    )
}

/// Build the conventional gallery markup with `count` images.
pub fn add_gallery(doc: &mut MemoryDocument, count: usize) -> GalleryMarkup {
    markup::add_gallery(doc, count, &SelectorConfig::default())
}
