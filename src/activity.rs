//! Activity journal.
//!
//! Every observable decision the behavior layer makes is appended here with
//! the virtual time it happened at. The journal is what the `simulate`
//! command prints and what tests assert against, so entries describe
//! outcomes ("swap started", "index updated") rather than internal steps.

use crate::dom::ElementId;
use crate::lazy::StrategyKind;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Activity {
    StrategySelected {
        strategy: StrategyKind,
        tracked: usize,
    },
    SweepScheduled,
    Sweep {
        swapped: usize,
        remaining: usize,
    },
    SwapStarted {
        placeholder: ElementId,
        replacement: ElementId,
    },
    SwapCompleted {
        placeholder: ElementId,
        replacement: ElementId,
    },
    SwapSkipped {
        placeholder: ElementId,
        reason: String,
    },
    ScrollUnsubscribed,
    ModalOpened,
    ModalClosed,
    GalleryMoved {
        from: f64,
        to: f64,
    },
    IndexUpdated {
        index: usize,
        count: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    #[serde(with = "humantime_serde")]
    pub at: Duration,
    #[serde(flatten)]
    pub activity: Activity,
}

#[derive(Debug, Default)]
pub struct Journal {
    entries: Vec<Entry>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, at: Duration, activity: Activity) {
        self.entries.push(Entry { at, activity });
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn take(&mut self) -> Vec<Entry> {
        std::mem::take(&mut self.entries)
    }

    /// Number of entries matching `pred`.
    pub fn count(&self, pred: impl Fn(&Activity) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.activity)).count()
    }
}
