//! Placeholder → full-resolution image replacement.
//!
//! A swap has two halves separated by the network:
//!
//! 1. [`ImageSwapper::begin`] reads the placeholder's `data-*` attributes,
//!    creates a detached `<img>`, copies `src` and, only when present,
//!    `srcset` and `alt`, tags it with the fade class and appends it to the
//!    placeholder's parent. Setting `src` starts the host load.
//! 2. [`ImageSwapper::complete`] runs when the host reports the load finished:
//!    the replacement gains the loaded class (opacity transition) and the
//!    placeholder leaves the parent.
//!
//! Between the two, placeholder and replacement sit side by side in the same
//! parent, so the layout never collapses. A load that fails never completes
//! and the placeholder stays.

use crate::config::ClassConfig;
use crate::dom::{Document, ElementId};
use thiserror::Error;

pub const DATA_SRC: &str = "data-src";
pub const DATA_SRCSET: &str = "data-srcset";
pub const DATA_ALT: &str = "data-alt";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SwapError {
    #[error("placeholder {0} has no data-src attribute")]
    MissingSource(ElementId),
    #[error("placeholder {0} is not attached to a parent")]
    Detached(ElementId),
}

/// Full-resolution sources declared on a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LazySource {
    pub src: String,
    pub srcset: Option<String>,
    pub alt: Option<String>,
}

impl LazySource {
    pub fn read(doc: &dyn Document, placeholder: ElementId) -> Result<Self, SwapError> {
        let src = doc
            .attribute(placeholder, DATA_SRC)
            .ok_or(SwapError::MissingSource(placeholder))?;
        Ok(Self {
            src,
            srcset: doc.attribute(placeholder, DATA_SRCSET),
            alt: doc.attribute(placeholder, DATA_ALT),
        })
    }
}

/// A replacement that has been appended but has not finished loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingSwap {
    pub placeholder: ElementId,
    pub parent: ElementId,
    pub replacement: ElementId,
}

#[derive(Debug)]
pub struct ImageSwapper {
    fade_class: String,
    loaded_class: String,
    pending: Vec<PendingSwap>,
}

impl ImageSwapper {
    pub fn new(classes: &ClassConfig) -> Self {
        Self {
            fade_class: classes.fade.clone(),
            loaded_class: classes.loaded.clone(),
            pending: Vec::new(),
        }
    }

    pub fn begin(
        &mut self,
        doc: &mut dyn Document,
        placeholder: ElementId,
    ) -> Result<PendingSwap, SwapError> {
        let parent = doc
            .parent(placeholder)
            .ok_or(SwapError::Detached(placeholder))?;
        let source = LazySource::read(doc, placeholder)?;

        let replacement = doc.create_element("img");
        doc.set_attribute(replacement, "src", &source.src);
        if let Some(srcset) = &source.srcset {
            doc.set_attribute(replacement, "srcset", srcset);
        }
        if let Some(alt) = &source.alt {
            doc.set_attribute(replacement, "alt", alt);
        }
        doc.add_class(replacement, &self.fade_class);
        doc.append_child(parent, replacement);

        let swap = PendingSwap {
            placeholder,
            parent,
            replacement,
        };
        self.pending.push(swap);
        Ok(swap)
    }

    /// Finish the swap whose replacement just loaded.
    ///
    /// Returns `None` for images this swapper did not create.
    pub fn complete(&mut self, doc: &mut dyn Document, replacement: ElementId) -> Option<PendingSwap> {
        let pos = self
            .pending
            .iter()
            .position(|p| p.replacement == replacement)?;
        let swap = self.pending.remove(pos);
        doc.add_class(swap.replacement, &self.loaded_class);
        doc.remove_child(swap.parent, swap.placeholder);
        Some(swap)
    }

    pub fn pending(&self) -> &[PendingSwap] {
        &self.pending
    }

    pub fn replacement_for(&self, placeholder: ElementId) -> Option<ElementId> {
        self.pending
            .iter()
            .find(|p| p.placeholder == placeholder)
            .map(|p| p.replacement)
    }
}
