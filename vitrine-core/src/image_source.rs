//! Seams for fetching image data.
//!
//! The engine never decides how an image reference becomes bytes. Callers
//! inject an [`ImageLoader`] (and, for stored product images, an
//! [`ImageUrlResolver`]) so generators and renderers stay testable.

use async_trait::async_trait;
use thiserror::Error;

/// Raw image data as fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    /// Encoded image bytes (PNG, JPEG, ...).
    pub bytes: Vec<u8>,
    /// MIME type reported by the source, if any.
    pub mime: Option<String>,
}

/// An image reference could not be fetched or decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load image '{reference}': {reason}")]
pub struct ImageSourceError {
    /// The reference that failed.
    pub reference: String,
    /// Why it failed.
    pub reason: String,
}

impl ImageSourceError {
    /// Construct from a reference and a reason.
    pub fn new(reference: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            reference: reference.into(),
            reason: reason.to_string(),
        }
    }
}

/// Fetches image bytes for a source reference.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    /// Load the image behind `reference`.
    async fn load(&self, reference: &str) -> Result<LoadedImage, ImageSourceError>;
}

/// Maps a stored relative path to a retrievable URL.
pub trait ImageUrlResolver: Send + Sync {
    /// Resolve `path`.
    fn resolve(&self, path: &str) -> String;
}

/// Leaves every path unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl ImageUrlResolver for IdentityResolver {
    fn resolve(&self, path: &str) -> String {
        path.to_string()
    }
}

/// Joins relative paths onto a base URL; absolute URLs and data URIs pass through.
#[derive(Debug, Clone)]
pub struct PrefixUrlResolver {
    base: String,
}

impl PrefixUrlResolver {
    /// Create a resolver rooted at `base`.
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }
}

impl ImageUrlResolver for PrefixUrlResolver {
    fn resolve(&self, path: &str) -> String {
        if is_absolute_reference(path) {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Whether a reference already names a fetchable resource.
#[must_use]
pub fn is_absolute_reference(reference: &str) -> bool {
    reference.starts_with("http://")
        || reference.starts_with("https://")
        || reference.starts_with("data:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_resolver_joins_once() {
        let resolver = PrefixUrlResolver::new("https://cdn.example.com/media/");
        assert_eq!(
            resolver.resolve("/products/a.jpg"),
            "https://cdn.example.com/media/products/a.jpg"
        );
        assert_eq!(
            resolver.resolve("products/a.jpg"),
            "https://cdn.example.com/media/products/a.jpg"
        );
    }

    #[test]
    fn prefix_resolver_keeps_absolute_references() {
        let resolver = PrefixUrlResolver::new("https://cdn.example.com");
        assert_eq!(resolver.resolve("https://other/x.png"), "https://other/x.png");
        assert_eq!(resolver.resolve("data:image/png;base64,AA"), "data:image/png;base64,AA");
    }
}
