//! # Simple Gal Client
//!
//! Page behavior for simple-gal sites: lazy activation of full-resolution
//! images and the modal gallery. Generated pages ship placeholders and a
//! fixed markup convention; this crate is the logic that brings them to life.
//!
//! # Architecture: Host Trait, Virtual Time
//!
//! The behavior layer never talks to a browser directly. Everything it needs
//! from a page goes through the [`dom::Document`] trait, and every delay runs
//! on the [`schedule::Scheduler`], a timer queue in virtual time:
//!
//! ```text
//! host events ──► page::Page ──► lazy::LazyLoader    (observer | fallback)
//!                     │      └─► gallery::GalleryController
//!                     ▼
//!              schedule::Scheduler  (throttle, debounce)
//! ```
//!
//! [`memory_dom::MemoryDocument`] implements the host in memory, which is
//! what the tests and the `simulate` command run against.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`dom`] | Host document trait and geometry types |
//! | [`memory_dom`] | In-memory host with scroll, intersection and load queues |
//! | [`viewport`] | Viewport measurement and the in-view test |
//! | [`schedule`] | Virtual-time timer queue |
//! | [`lazy`] | Lazy image tracking, activation strategies and the image swap |
//! | [`gallery`] | Modal gallery: navigation, position indicator, keyboard |
//! | [`discover`] | Finds the page elements by markup convention |
//! | [`page`] | Per-page runtime dispatching host events to the components |
//! | [`activity`] | Journal of observable decisions |
//! | [`config`] | `client.toml` loading, validation and merging over stock defaults |
//! | [`markup`] | Builds conventional page markup in a memory document |
//! | [`scenario`] | Scripted page simulations |
//! | [`output`] | CLI output formatting of simulation reports |
//!
//! # Design Decisions
//!
//! ## Strategy Chosen Once
//!
//! Whether a page uses the host's intersection watcher or scroll polling is
//! decided at page ready and never revisited. Both live behind
//! [`lazy::strategy::ActivationStrategy`], so the loader itself has no
//! branches on the mode.
//!
//! ## Explicit Elements
//!
//! Components receive their elements as values ([`discover::PageElements`],
//! [`gallery::GalleryElements`]) instead of querying the page themselves.
//! The class names of the convention are configuration, not constants.

pub mod activity;
pub mod config;
pub mod discover;
pub mod dom;
pub mod gallery;
pub mod lazy;
pub mod markup;
pub mod memory_dom;
pub mod output;
pub mod page;
pub mod scenario;
pub mod schedule;
pub mod viewport;

#[cfg(test)]
pub(crate) mod test_helpers;
