//! Document validation for payloads headed to the persistence store.
//!
//! Validation is pure: it never touches the network. It runs structural
//! checks (the same ones the codec enforces) plus semantic checks on every
//! object. Empty text is reported as a warning, not a failure.

use serde_json::Value;
use thiserror::Error;

use crate::codec;
use crate::error::CodecError;
use crate::object::KNOWN_KINDS;
use crate::Document;

/// Maximum objects per document.
pub const MAX_OBJECTS_PER_DOCUMENT: usize = 10_000;
/// Maximum text content length per object.
pub const MAX_TEXT_CONTENT_LEN: usize = 1_048_576; // 1MB

/// A defect that blocks persistence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The document-level shape is malformed.
    #[error("invalid document structure at '{field}'")]
    Structure {
        /// Offending field.
        field: String,
        /// Object index, when the defect belongs to one object.
        index: Option<usize>,
    },
    /// The version is unreadable or unsupported.
    #[error("unsupported document version: {0}")]
    UnsupportedVersion(String),
    /// An object has no `type` tag.
    #[error("object {index} has no kind tag")]
    MissingKind {
        /// Object index.
        index: usize,
    },
    /// An object has a `type` tag the engine does not recognize.
    #[error("object {index} has unrecognized kind '{kind}'")]
    UnknownKind {
        /// Object index.
        index: usize,
        /// The unrecognized tag.
        kind: String,
    },
    /// An object position is missing or not finite.
    #[error("object {index} position is not a finite numeric pair")]
    InvalidPosition {
        /// Object index.
        index: usize,
    },
    /// An image object has no source reference.
    #[error("image object {index} has no source")]
    MissingImageSource {
        /// Object index.
        index: usize,
    },
    /// Text content exceeds the maximum length.
    #[error("object {index} text too long (max {MAX_TEXT_CONTENT_LEN} bytes)")]
    TextContentTooLong {
        /// Object index.
        index: usize,
    },
    /// The document has too many objects.
    #[error("too many objects (max {MAX_OBJECTS_PER_DOCUMENT})")]
    TooManyObjects,
}

impl ValidationError {
    /// Name of the offending field.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Structure { field, .. } => field,
            Self::UnsupportedVersion(_) => "version",
            Self::MissingKind { .. } | Self::UnknownKind { .. } => "type",
            Self::InvalidPosition { .. } => "left/top",
            Self::MissingImageSource { .. } => "src",
            Self::TextContentTooLong { .. } => "text",
            Self::TooManyObjects => "canvas.objects",
        }
    }

    /// Index of the offending object, if any.
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        match self {
            Self::Structure { index, .. } => *index,
            Self::MissingKind { index }
            | Self::UnknownKind { index, .. }
            | Self::InvalidPosition { index }
            | Self::MissingImageSource { index }
            | Self::TextContentTooLong { index } => Some(*index),
            Self::UnsupportedVersion(_) | Self::TooManyObjects => None,
        }
    }
}

impl From<CodecError> for ValidationError {
    fn from(error: CodecError) -> Self {
        match error {
            CodecError::Validation { field, index } => Self::Structure { field, index },
            CodecError::UnsupportedFormat(reason) => Self::UnsupportedVersion(reason),
            CodecError::Json(e) => Self::Structure {
                field: e.to_string(),
                index: None,
            },
        }
    }
}

/// A finding that does not block persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// A text object has empty content.
    EmptyText {
        /// Object index.
        index: usize,
    },
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText { index } => write!(f, "text object {index} is empty"),
        }
    }
}

/// Outcome of validating one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Blocking defects.
    pub errors: Vec<ValidationError>,
    /// Non-blocking findings.
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// Whether no blocking defect was found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate an in-memory document through its interchange form.
#[must_use]
pub fn validate_document(doc: &Document) -> ValidationReport {
    match codec::to_value(doc) {
        Ok(value) => validate_interchange(&value),
        Err(e) => ValidationReport {
            errors: vec![e.into()],
            warnings: Vec::new(),
        },
    }
}

/// Validate an interchange payload (current or legacy shape).
#[must_use]
pub fn validate_interchange(value: &Value) -> ValidationReport {
    let migrated;
    let value = if codec::is_legacy(value) {
        migrated = codec::migrate(value.clone());
        &migrated
    } else {
        value
    };

    let mut report = ValidationReport::default();

    let Some(objects) = value
        .get("canvas")
        .and_then(|c| c.get("objects"))
        .and_then(Value::as_array)
    else {
        // Let the codec name the exact structural defect.
        let error = codec::from_value(value.clone()).err().map_or_else(
            || ValidationError::Structure {
                field: "canvas.objects".to_string(),
                index: None,
            },
            ValidationError::from,
        );
        report.errors.push(error);
        return report;
    };

    if objects.len() > MAX_OBJECTS_PER_DOCUMENT {
        report.errors.push(ValidationError::TooManyObjects);
    }

    for (index, object) in objects.iter().enumerate() {
        check_object(object, index, &mut report);
    }

    if report.is_valid() {
        if let Err(e) = codec::from_value(value.clone()) {
            report.errors.push(e.into());
        }
    }

    report
}

fn check_object(object: &Value, index: usize, report: &mut ValidationReport) {
    let Some(map) = object.as_object() else {
        report.errors.push(ValidationError::Structure {
            field: "canvas.objects".to_string(),
            index: Some(index),
        });
        return;
    };

    let kind = match map.get("type").and_then(Value::as_str) {
        Some(kind) if KNOWN_KINDS.contains(&kind) => kind,
        Some(kind) => {
            report.errors.push(ValidationError::UnknownKind {
                index,
                kind: kind.to_string(),
            });
            return;
        }
        None => {
            report.errors.push(ValidationError::MissingKind { index });
            return;
        }
    };

    let finite = |key: &str| {
        map.get(key)
            .and_then(Value::as_f64)
            .is_some_and(f64::is_finite)
    };
    if !(finite("left") && finite("top")) {
        report.errors.push(ValidationError::InvalidPosition { index });
    }

    match kind {
        "image" => {
            let has_source = map
                .get("src")
                .and_then(Value::as_str)
                .is_some_and(|s| !s.trim().is_empty());
            if !has_source {
                report
                    .errors
                    .push(ValidationError::MissingImageSource { index });
            }
        }
        "text" => {
            let content = map.get("text").and_then(Value::as_str).unwrap_or_default();
            if content.len() > MAX_TEXT_CONTENT_LEN {
                report
                    .errors
                    .push(ValidationError::TextContentTooLong { index });
            } else if content.trim().is_empty() {
                report.warnings.push(ValidationWarning::EmptyText { index });
            }
        }
        _ => {}
    }
}
