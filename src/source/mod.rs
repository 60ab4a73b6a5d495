//! Asset sources: where manifest, reference and bundle files are read from.
//!
//! The web build fetches over HTTP, the native build reads a data directory.
//! Both implement [`AssetSource`] so the loaders are shared.

use std::future::Future;

use crate::error::FetchError;

#[cfg(test)]
mod memory;
#[cfg(test)]
pub(crate) use memory::MemorySource;

#[cfg(not(target_arch = "wasm32"))]
mod fs;
#[cfg(not(target_arch = "wasm32"))]
pub use fs::FsSource;

#[cfg(target_arch = "wasm32")]
mod http;
#[cfg(target_arch = "wasm32")]
pub use http::HttpSource;

/// Something that can fetch a text file by path.
pub trait AssetSource {
    /// Fetch the whole file as UTF-8 text.
    fn fetch_text(&self, path: &str) -> impl Future<Output = Result<String, FetchError>>;
}
