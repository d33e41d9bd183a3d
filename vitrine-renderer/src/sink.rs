//! Destinations for exported artifacts.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use vitrine_core::{RecordId, TemplateRecord};

use crate::error::RenderResult;

/// One exported file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Record the artifact was produced from.
    pub record_id: RecordId,
    /// File name, already sanitized.
    pub name: String,
    /// MIME type of `bytes`.
    pub mime: &'static str,
    /// Encoded content.
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Artifact named after a template record.
    #[must_use]
    pub fn for_record(
        record: &TemplateRecord,
        extension: &str,
        mime: &'static str,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            record_id: record.id,
            name: format!(
                "{}-{}.{extension}",
                sanitize_filename(&record.name),
                record.id
            ),
            mime,
            bytes,
        }
    }
}

/// Receives artifacts one at a time.
#[async_trait]
pub trait ExportSink: Send {
    /// Store one artifact.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact cannot be stored.
    async fn deliver(&mut self, artifact: ExportArtifact) -> RenderResult<()>;
}

/// Writes artifacts as files into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    /// Sink writing into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, in delivery order.
    #[must_use]
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

#[async_trait]
impl ExportSink for DirectorySink {
    async fn deliver(&mut self, artifact: ExportArtifact) -> RenderResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(&artifact.name);
        tokio::fs::write(&path, &artifact.bytes).await?;
        tracing::debug!(path = %path.display(), bytes = artifact.bytes.len(), "Wrote export artifact");
        self.written.push(path);
        Ok(())
    }
}

/// Keeps artifacts in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    /// Delivered artifacts, in order.
    pub artifacts: Vec<ExportArtifact>,
}

#[async_trait]
impl ExportSink for MemorySink {
    async fn deliver(&mut self, artifact: ExportArtifact) -> RenderResult<()> {
        self.artifacts.push(artifact);
        Ok(())
    }
}

/// Sanitize a template name for use as a filename.
///
/// Replaces any character that is not alphanumeric, `-`, or `_` with `_`.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.is_empty() {
        "template".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Summer Sale / 2024"), "Summer_Sale___2024");
        assert_eq!(sanitize_filename("../../etc/passwd"), "______etc_passwd");
        assert_eq!(sanitize_filename("  "), "template");
    }

    #[tokio::test]
    async fn test_directory_sink_creates_directory() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let target = tmp.path().join("nested").join("out");
        let mut sink = DirectorySink::new(&target);

        sink.deliver(ExportArtifact {
            record_id: 1,
            name: "a.json".to_string(),
            mime: "application/json",
            bytes: b"{}".to_vec(),
        })
        .await
        .expect("deliver");

        assert_eq!(sink.written(), &[target.join("a.json")]);
        let content = std::fs::read(target.join("a.json")).expect("read back");
        assert_eq!(content, b"{}");
    }
}
