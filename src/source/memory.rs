//! In-memory asset source for tests.

use std::collections::HashMap;
use std::future::Future;

use super::AssetSource;
use crate::error::FetchError;

/// Asset source backed by a map of path to canned result.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemorySource {
    files: HashMap<String, Result<String, FetchError>>,
}

impl MemorySource {
    /// Create an empty source; every path is "not found".
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Builder method to serve text at a path.
    pub(crate) fn with_file(mut self, path: impl Into<String>, contents: impl Into<String>) -> Self {
        self.files.insert(path.into(), Ok(contents.into()));
        self
    }

    /// Builder method to fail a path with an error.
    pub(crate) fn with_error(mut self, path: impl Into<String>, error: FetchError) -> Self {
        self.files.insert(path.into(), Err(error));
        self
    }

    /// Synchronous lookup.
    pub(crate) fn read_text(&self, path: &str) -> Result<String, FetchError> {
        self.files
            .get(path)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::not_found(path)))
    }
}

impl AssetSource for MemorySource {
    fn fetch_text(&self, path: &str) -> impl Future<Output = Result<String, FetchError>> {
        let result = self.read_text(path);
        async move { result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source() {
        let source = MemorySource::new()
            .with_file("a.json", "{}")
            .with_error("b.json", FetchError::http(500, "b.json"));

        assert_eq!(pollster::block_on(source.fetch_text("a.json")), Ok("{}".to_string()));
        assert_eq!(
            pollster::block_on(source.fetch_text("b.json")),
            Err(FetchError::http(500, "b.json"))
        );
        assert_eq!(
            pollster::block_on(source.fetch_text("c.json")),
            Err(FetchError::not_found("c.json"))
        );
    }
}
