//! Annotation Viewer
//!
//! Browses a set of images together with pre-computed vision-model
//! annotations. A manifest lists the images; each image has one annotation
//! bundle holding every model's responses to a fixed set of prompts.
//!
//! The [`app::Dashboard`] owns all state and is driven by [`message::Message`]s.
//! It returns [`message::Command`]s that a [`session::Backend`] carries out:
//! the desktop build reads the data directory on a worker thread, the browser
//! build fetches over HTTP. Both draw the same egui [`ui::ViewerApp`].

pub mod app;
pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod manifest;
pub mod message;
pub mod model;
pub mod navigation;
pub mod selection;
pub mod session;
pub mod source;
pub mod ui;
pub mod views;

#[cfg(not(target_arch = "wasm32"))]
pub mod native;
#[cfg(not(target_arch = "wasm32"))]
pub mod report;

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
