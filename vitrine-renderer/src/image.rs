//! Image loading.
//!
//! [`DefaultImageLoader`] fetches from base64 data URIs, local files and
//! HTTP(S) URLs, and rejects anything that does not decode as an image.

use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use vitrine_core::{ImageLoader, ImageSourceError, LoadedImage};

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// WebP (alpha support).
    WebP,
    /// GIF, first frame only.
    Gif,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpeg,
            "webp" => Self::WebP,
            "gif" => Self::Gif,
            _ => Self::Unknown,
        }
    }

    /// Detect format from MIME type.
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_lowercase().as_str() {
            "image/png" => Self::Png,
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/webp" => Self::WebP,
            "image/gif" => Self::Gif,
            _ => Self::Unknown,
        }
    }

    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.len() < 4 {
            return Self::Unknown;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Self::Png;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        if data.starts_with(b"GIF8") {
            return Self::Gif;
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Self::WebP;
        }

        Self::Unknown
    }

    /// MIME type used when embedding the image.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
            Self::Unknown => "application/octet-stream",
        }
    }
}

/// Format of loaded image bytes: the magic bytes win over the reported MIME type.
#[must_use]
pub fn detect_format(image: &LoadedImage) -> ImageFormat {
    match ImageFormat::from_magic_bytes(&image.bytes) {
        ImageFormat::Unknown => image
            .mime
            .as_deref()
            .map_or(ImageFormat::Unknown, ImageFormat::from_mime),
        known => known,
    }
}

/// Base64 data URI for loaded image bytes.
#[must_use]
pub fn to_data_uri(image: &LoadedImage) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(&image.bytes);
    format!("data:{};base64,{encoded}", detect_format(image).mime())
}

/// Decode a data URI (base64 or percent-encoded) into raw bytes.
///
/// Supports formats like: `data:image/png;base64,iVBORw0KGgo...`
///
/// # Errors
///
/// Returns an error if the data URI is malformed.
pub fn decode_data_uri(uri: &str) -> Result<LoadedImage, ImageSourceError> {
    let fail = |reason: &str| ImageSourceError::new(truncate(uri), reason);

    let Some(uri_data) = uri.strip_prefix("data:") else {
        return Err(fail("not a data URI"));
    };

    // Find the comma separating metadata from data
    let (metadata, encoded_data) = uri_data
        .split_once(',')
        .ok_or_else(|| fail("invalid data URI: missing comma"))?;

    let bytes = if metadata.contains(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(encoded_data)
            .map_err(|e| fail(&format!("failed to decode base64: {e}")))?
    } else {
        percent_decode(encoded_data).ok_or_else(|| fail("invalid URL encoding"))?
    };

    let mime = metadata.split(';').next().filter(|m| !m.is_empty());
    Ok(LoadedImage {
        bytes,
        mime: mime.map(str::to_string),
    })
}

fn percent_decode(input: &str) -> Option<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = input.get(i + 1..i + 3)?;
            result.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            result.push(bytes[i]);
            i += 1;
        }
    }
    Some(result)
}

/// Data URIs can be huge; keep error messages readable.
fn truncate(reference: &str) -> String {
    const MAX: usize = 64;
    match reference.char_indices().nth(MAX) {
        Some((end, _)) => format!("{}...", &reference[..end]),
        None => reference.to_string(),
    }
}

/// Check that bytes carry a decodable image header.
///
/// # Errors
///
/// Returns an error naming `reference` if the format is unknown or the header
/// is corrupt.
pub fn verify_decodable(reference: &str, image: &LoadedImage) -> Result<(), ImageSourceError> {
    let reader = image::ImageReader::new(Cursor::new(&image.bytes))
        .with_guessed_format()
        .map_err(|e| ImageSourceError::new(truncate(reference), e))?;
    reader
        .into_dimensions()
        .map(|_| ())
        .map_err(|e| ImageSourceError::new(truncate(reference), format!("failed to decode image: {e}")))
}

/// Loads data URIs, `http(s)` URLs and local file paths.
#[derive(Debug, Clone)]
pub struct DefaultImageLoader {
    client: reqwest::Client,
}

impl DefaultImageLoader {
    /// Create a loader whose HTTP requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Create a loader sharing an existing HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch(&self, url: &str) -> Result<LoadedImage, ImageSourceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| ImageSourceError::new(url, e))?;
        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageSourceError::new(url, e))?;
        Ok(LoadedImage {
            bytes: bytes.to_vec(),
            mime,
        })
    }

    async fn read_file(path: &str) -> Result<LoadedImage, ImageSourceError> {
        let local = path.strip_prefix("file://").unwrap_or(path);
        let bytes = tokio::fs::read(local)
            .await
            .map_err(|e| ImageSourceError::new(path, e))?;
        let mime = std::path::Path::new(local)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(ImageFormat::from_extension)
            .filter(|format| *format != ImageFormat::Unknown)
            .map(|format| format.mime().to_string());
        Ok(LoadedImage { bytes, mime })
    }
}

impl Default for DefaultImageLoader {
    fn default() -> Self {
        Self::with_client(reqwest::Client::new())
    }
}

#[async_trait]
impl ImageLoader for DefaultImageLoader {
    async fn load(&self, reference: &str) -> Result<LoadedImage, ImageSourceError> {
        let image = if reference.starts_with("data:") {
            decode_data_uri(reference)?
        } else if reference.starts_with("http://") || reference.starts_with("https://") {
            self.fetch(reference).await?
        } else {
            Self::read_file(reference).await?
        };
        verify_decodable(reference, &image)?;
        tracing::debug!(
            reference = %truncate(reference),
            bytes = image.bytes.len(),
            "Loaded image"
        );
        Ok(image)
    }
}
