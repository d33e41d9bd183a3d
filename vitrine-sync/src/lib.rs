//! # Vitrine Sync
//!
//! Reconciles template documents with the remote template store.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  Document / interchange JSON                 │
//! ├──────────────────────────────────────────────┤
//! │  validate (local, no network) ──► reject     │
//! ├──────────────────────────────────────────────┤
//! │  run_with_retry: timeout per attempt,        │
//! │  exponential backoff, bounded attempts       │
//! ├──────────────────────────────────────────────┤
//! │  TemplateApi (HttpTemplateApi over reqwest)  │
//! └──────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod error;
pub mod http;
pub mod retry;
pub mod service;

pub use api::{ApiError, NewTemplate, TemplateApi, TemplateUpdate};
pub use error::{SyncError, SyncResult};
pub use http::HttpTemplateApi;
pub use retry::{run_with_retry, RetryConfig};
pub use service::{ProductRef, PulledTemplate, SyncConfig, SyncService};

/// Sync crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
