//! Random-order image slideshow.
//!
//! The core is [`playlist::PlaylistController`]: it draws images from an immutable
//! [`catalog::ImageCatalog`] and keeps a bounded [`history::HistoryRing`] so the
//! viewer can step back. Everything under [`tasks`] is the async plumbing around it:
//! a timer-driven display loop, a decoder and a headless viewer.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod history;
pub mod layout;
pub mod playlist;
pub mod scan;
pub mod timer;
pub mod tasks {
    pub mod input;
    pub mod loader;
    pub mod slideshow;
    pub mod viewer;
}

pub use error::Error;
