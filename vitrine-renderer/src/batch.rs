//! Multi-document rendering and batch export.
//!
//! Renders run concurrently up to the configured limit with settle-all
//! semantics: a failed item is recorded and logged, and every other item
//! still completes.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use vitrine_core::{codec, Document, RecordId, TemplateRecord};

use crate::error::{RenderError, RenderResult};
use crate::export::{DocumentRenderer, ExportFormat, RenderOptions};
use crate::sink::{ExportArtifact, ExportSink};

/// A successfully rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedItem {
    /// Position in the input slice.
    pub index: usize,
    /// Encoded image.
    pub bytes: Vec<u8>,
}

/// A document that failed to render.
#[derive(Debug)]
pub struct RenderFailure {
    /// Position in the input slice.
    pub index: usize,
    /// Why it failed.
    pub error: RenderError,
}

/// Settled results of a multi-document render, each in input order.
#[derive(Debug, Default)]
pub struct BatchRenderOutcome {
    /// Successful renders.
    pub rendered: Vec<RenderedItem>,
    /// Failed renders.
    pub failures: Vec<RenderFailure>,
}

impl BatchRenderOutcome {
    /// Whether every item rendered.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// What a batch export produces per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    /// The interchange document, re-encoded.
    Json,
    /// A PNG rendering.
    Png,
}

impl std::str::FromStr for BatchKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "png" => Ok(Self::Png),
            other => Err(format!("unsupported batch kind '{other}'")),
        }
    }
}

/// A record that could not be exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFailure {
    /// Record identifier.
    pub record_id: RecordId,
    /// Why it failed.
    pub reason: String,
}

/// Outcome of a batch export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchExportReport {
    /// Artifact names delivered to the sink, in delivery order.
    pub delivered: Vec<String>,
    /// Records that were skipped.
    pub failures: Vec<ExportFailure>,
}

/// Serialize records to interchange JSON artifacts.
///
/// Each stored document is decoded and re-encoded so legacy payloads come
/// out in the current shape. Records that do not decode are reported, not
/// fatal.
#[must_use]
pub fn export_json(records: &[TemplateRecord]) -> (Vec<ExportArtifact>, Vec<ExportFailure>) {
    let exported_at = Utc::now();
    let mut artifacts = Vec::with_capacity(records.len());
    let mut failures = Vec::new();

    for record in records {
        let encoded = record.document().and_then(|mut doc| {
            doc.metadata.exported_at = Some(exported_at);
            doc.metadata.format = Some("json".to_string());
            codec::encode_pretty(&doc)
        });
        match encoded {
            Ok(text) => artifacts.push(ExportArtifact::for_record(
                record,
                "json",
                "application/json",
                text.into_bytes(),
            )),
            Err(e) => {
                tracing::warn!(record = record.id, error = %e, "Skipping record in JSON export");
                failures.push(ExportFailure {
                    record_id: record.id,
                    reason: e.to_string(),
                });
            }
        }
    }

    (artifacts, failures)
}

impl DocumentRenderer {
    /// Render several documents concurrently.
    ///
    /// At most `max_concurrency` renders are in flight. One failure never
    /// cancels the others.
    pub async fn render_multiple_in_parallel(
        &self,
        docs: &[Document],
        options: &RenderOptions,
    ) -> BatchRenderOutcome {
        let limit = self.config().max_concurrency.max(1);
        let results: Vec<(usize, RenderResult<Vec<u8>>)> = stream::iter(docs.iter().enumerate())
            .map(|(index, doc)| async move { (index, self.render_document(doc, options).await) })
            .buffered(limit)
            .collect()
            .await;

        let mut outcome = BatchRenderOutcome::default();
        for (index, result) in results {
            match result {
                Ok(bytes) => outcome.rendered.push(RenderedItem { index, bytes }),
                Err(error) => {
                    tracing::warn!(index, error = %error, "Render failed in batch");
                    outcome.failures.push(RenderFailure { index, error });
                }
            }
        }

        tracing::info!(
            total = docs.len(),
            rendered = outcome.rendered.len(),
            failed = outcome.failures.len(),
            "Batch render settled"
        );
        outcome
    }

    /// Export records to a sink.
    ///
    /// JSON is produced synchronously. PNG renders settle concurrently first;
    /// artifacts are then delivered one at a time in record order. A record
    /// that fails to decode, render or deliver is listed in the report and
    /// the remaining artifacts are still delivered.
    pub async fn batch_export(
        &self,
        records: &[TemplateRecord],
        kind: BatchKind,
        sink: &mut dyn ExportSink,
    ) -> BatchExportReport {
        let (artifacts, failures) = match kind {
            BatchKind::Json => export_json(records),
            BatchKind::Png => self.render_records(records).await,
        };

        let mut report = BatchExportReport {
            delivered: Vec::with_capacity(artifacts.len()),
            failures,
        };
        for artifact in artifacts {
            let name = artifact.name.clone();
            let record_id = artifact.record_id;
            match sink.deliver(artifact).await {
                Ok(()) => report.delivered.push(name),
                Err(e) => {
                    tracing::warn!(
                        record_id,
                        artifact = %name,
                        error = %e,
                        "Artifact delivery failed"
                    );
                    report.failures.push(ExportFailure {
                        record_id,
                        reason: e.to_string(),
                    });
                }
            }
        }
        report
    }

    async fn render_records(
        &self,
        records: &[TemplateRecord],
    ) -> (Vec<ExportArtifact>, Vec<ExportFailure>) {
        let mut failures = Vec::new();
        let mut decoded = Vec::with_capacity(records.len());
        let mut docs = Vec::with_capacity(records.len());
        for record in records {
            match record.document() {
                Ok(doc) => {
                    decoded.push(record);
                    docs.push(doc);
                }
                Err(e) => failures.push(ExportFailure {
                    record_id: record.id,
                    reason: e.to_string(),
                }),
            }
        }

        let options = RenderOptions {
            format: ExportFormat::Png,
            ..RenderOptions::default()
        };
        let outcome = self.render_multiple_in_parallel(&docs, &options).await;

        for failure in outcome.failures {
            failures.push(ExportFailure {
                record_id: decoded[failure.index].id,
                reason: failure.error.to_string(),
            });
        }
        let artifacts = outcome
            .rendered
            .into_iter()
            .map(|item| {
                let record = decoded[item.index];
                ExportArtifact::for_record(
                    record,
                    ExportFormat::Png.extension(),
                    ExportFormat::Png.mime(),
                    item.bytes,
                )
            })
            .collect();

        (artifacts, failures)
    }
}
