//! Core review pipeline for registry pull requests.
//!
//! The pipeline walks a pull request's changed record files strictly in list
//! order, classifies each change, fetches the current and trunk revisions of
//! the record, decides whether the change is authorized, renders and uploads
//! a screenshot of the record's target, and emits one formatted report per
//! file. Screenshot rendering and report emission are reached through the
//! [`ScreenshotService`] and [`ReportEmitter`] seams so collaborator crates
//! supply the concrete providers.

/// Error kinds raised by the pipeline and its seams.
pub mod error;
/// Content fetcher with a bounded retry budget.
pub mod fetch;
/// Changed-file and record document model.
pub mod model;
/// Ownership-based authorization verdicts.
pub mod ownership;
/// Per-file pipeline driver.
pub mod pipeline;
/// Report body composition.
pub mod report;

use async_trait::async_trait;

pub use error::{
    CaptureError, EmitError, FetchFailure, PublishError, RetrievalError, ReviewError, ReviewResult,
};
pub use fetch::{ContentFetcher, GET_FILE_MAX_RETRIES};
pub use model::{AuthorizationVerdict, ChangeKind, ChangedFile, RecordDocument, Target};
pub use pipeline::{PACE_AFTER_REMOVAL, ReviewPipeline, RunSummary};

/// Renders a screenshot of a target URL and publishes it to an image host.
///
/// Both operations consume quota against third-party rate limits; the
/// pipeline driver owns any pacing between calls, implementations must not
/// retry or throttle internally.
#[async_trait]
pub trait ScreenshotService: Send + Sync {
    /// Request a fresh rendered capture of `url`, returning the image bytes.
    async fn capture(&self, url: &str) -> Result<Vec<u8>, CaptureError>;

    /// Upload image bytes to the hosting provider, returning the public URL.
    async fn publish(&self, image: &[u8]) -> Result<String, PublishError>;
}

/// Posts a composed report against a pull request.
#[async_trait]
pub trait ReportEmitter: Send + Sync {
    /// Post `body` as a comment on the identified issue/pull request.
    async fn emit(&self, issue_number: u64, body: &str) -> Result<(), EmitError>;
}
