//! Where encoded image files come from.

#[cfg(target_family = "wasm")]
mod fetch;

use std::{
    collections::HashMap,
    fmt::{self, Display},
    future::Future,
    path::PathBuf,
};

use tracing::debug;

#[cfg(target_family = "wasm")]
pub use fetch::FetchImageSource;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchError {
    pub url: String,
    pub reason: String,
}

impl FetchError {
    pub fn new(url: &str, reason: impl Display) -> Self {
        Self {
            url: url.to_owned(),
            reason: reason.to_string(),
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "failed to fetch `{}`: {}", self.url, self.reason)
    }
}

impl std::error::Error for FetchError {}

/// Provides the encoded bytes (PNG, JPEG, ...) of an image.
pub trait ImageSource {
    /// Retrieves the encoded image at `url`.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>>;
}

/// Reads images from a directory on the local file system.
#[derive(Clone, Debug)]
pub struct FileImageSource {
    root: PathBuf,
}

impl FileImageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageSource for FileImageSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let path = self.root.join(url);
        debug!("reading image from {}", path.display());
        std::fs::read(&path).map_err(|error| FetchError::new(url, error))
    }
}

/// Serves images from memory, e.g. assets embedded with `include_bytes!`.
#[derive(Clone, Debug, Default)]
pub struct MemoryImageSource {
    images: HashMap<String, Vec<u8>>,
}

impl MemoryImageSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: &str, bytes: impl Into<Vec<u8>>) {
        self.images.insert(url.to_owned(), bytes.into());
    }
}

impl ImageSource for MemoryImageSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.images
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::new(url, "not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_serves_inserted_images() {
        let mut source = MemoryImageSource::new();
        source.insert("metal.png", [1_u8, 2, 3]);

        assert_eq!(
            pollster::block_on(source.fetch("metal.png")),
            Ok(vec![1, 2, 3])
        );
        assert_eq!(
            pollster::block_on(source.fetch("missing.png")),
            Err(FetchError::new("missing.png", "not found"))
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let source = FileImageSource::new("/nonexistent");
        let error = pollster::block_on(source.fetch("head.png")).unwrap_err();
        assert_eq!(error.url, "head.png");
    }
}
