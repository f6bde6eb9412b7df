//! Per-file pipeline driver.
//!
//! Files are processed strictly in list order, one at a time: classify,
//! fetch current (and trunk, when a prior revision is relevant), authorize,
//! capture and publish a screenshot, compose, emit. After emitting a removal
//! report the driver suspends for a fixed pacing interval: removals are the
//! branch most likely to run back-to-back, and pacing there throttles the
//! heavier capture/publish calls that tend to follow in the same pull
//! request. A failure in any step aborts the remainder of the run;
//! already-emitted reports stand.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{ReviewError, ReviewResult};
use crate::fetch::ContentFetcher;
use crate::model::{ChangeKind, ChangedFile};
use crate::{ReportEmitter, ScreenshotService, ownership, report};

/// Suspension after a removal report, sized for the screenshot provider's
/// rate limit (2 requests per minute).
pub const PACE_AFTER_REMOVAL: Duration = Duration::from_secs(30);

/// Counts of reports emitted and files skipped during one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Reports posted against the pull request.
    pub emitted: usize,
    /// Files skipped because their document declares no target form.
    pub skipped: usize,
}

/// Serial review pipeline over a pull request's changed-file list.
pub struct ReviewPipeline {
    fetcher: ContentFetcher,
    screenshots: Arc<dyn ScreenshotService>,
    emitter: Arc<dyn ReportEmitter>,
    pace_after_removal: Duration,
}

impl ReviewPipeline {
    /// Construct a pipeline with the default post-removal pacing interval.
    #[must_use]
    pub fn new(
        fetcher: ContentFetcher,
        screenshots: Arc<dyn ScreenshotService>,
        emitter: Arc<dyn ReportEmitter>,
    ) -> Self {
        Self {
            fetcher,
            screenshots,
            emitter,
            pace_after_removal: PACE_AFTER_REMOVAL,
        }
    }

    /// Override the post-removal pacing interval.
    #[must_use]
    pub const fn with_pacing(mut self, pace_after_removal: Duration) -> Self {
        self.pace_after_removal = pace_after_removal;
        self
    }

    /// Review every changed file and emit one report per eligible file.
    ///
    /// # Errors
    ///
    /// Returns the first unrecovered [`ReviewError`]; reports already
    /// emitted for earlier files are not rolled back.
    pub async fn run(
        &self,
        files: &[ChangedFile],
        author: &str,
        issue_number: u64,
    ) -> ReviewResult<RunSummary> {
        let mut summary = RunSummary::default();
        for file in files {
            info!(path = %file.path, kind = ?file.kind, "reviewing changed file");
            match file.kind {
                ChangeKind::ContentChange => {
                    self.review_content_change(file, author, issue_number, &mut summary)
                        .await?;
                }
                ChangeKind::Added => {
                    self.review_addition(file, issue_number, &mut summary).await?;
                }
                ChangeKind::Removed => {
                    self.review_removal(file, author, issue_number, &mut summary)
                        .await?;
                    tokio::time::sleep(self.pace_after_removal).await;
                }
            }
        }
        info!(
            emitted = summary.emitted,
            skipped = summary.skipped,
            "review run complete"
        );
        Ok(summary)
    }

    async fn review_content_change(
        &self,
        file: &ChangedFile,
        author: &str,
        issue_number: u64,
        summary: &mut RunSummary,
    ) -> ReviewResult<()> {
        let current = self
            .fetcher
            .fetch_record(&file.raw_url)
            .await
            .map_err(|err| ReviewError::retrieval("fetch.current", err))?;
        let Some(target) = current.target() else {
            debug!(path = %file.path, "record declares no target form; skipping");
            summary.skipped += 1;
            return Ok(());
        };

        let prior = self
            .fetcher
            .fetch_record(&file.trunk_url)
            .await
            .map_err(|err| ReviewError::retrieval("fetch.trunk", err))?;
        let verdict = ownership::resolve(
            prior.owner_username(),
            current.owner_username(),
            author,
        );

        let image_url = self.capture_and_publish(&file.path, &target.url()).await?;
        let body = report::content_change(
            file,
            &target.url(),
            current.description.as_deref(),
            current.repo.as_deref(),
            &verdict,
            &image_url,
        );
        self.emit(issue_number, &body).await?;
        summary.emitted += 1;
        Ok(())
    }

    async fn review_addition(
        &self,
        file: &ChangedFile,
        issue_number: u64,
        summary: &mut RunSummary,
    ) -> ReviewResult<()> {
        let current = self
            .fetcher
            .fetch_record(&file.raw_url)
            .await
            .map_err(|err| ReviewError::retrieval("fetch.current", err))?;
        let Some(target) = current.target() else {
            debug!(path = %file.path, "record declares no target form; skipping");
            summary.skipped += 1;
            return Ok(());
        };

        let image_url = self.capture_and_publish(&file.path, &target.url()).await?;
        let body = report::added(
            file,
            &target.url(),
            current.description.as_deref(),
            current.repo.as_deref(),
            &image_url,
        );
        self.emit(issue_number, &body).await?;
        summary.emitted += 1;
        Ok(())
    }

    async fn review_removal(
        &self,
        file: &ChangedFile,
        author: &str,
        issue_number: u64,
        summary: &mut RunSummary,
    ) -> ReviewResult<()> {
        let prior = self
            .fetcher
            .fetch_record(&file.trunk_url)
            .await
            .map_err(|err| ReviewError::retrieval("fetch.trunk", err))?;
        let verdict = ownership::resolve(prior.owner_username(), None, author);

        let body = report::removed(file, &verdict);
        self.emit(issue_number, &body).await?;
        summary.emitted += 1;
        Ok(())
    }

    async fn capture_and_publish(&self, path: &str, target_url: &str) -> ReviewResult<String> {
        let image = self
            .screenshots
            .capture(target_url)
            .await
            .map_err(|err| ReviewError::capture(path.to_string(), err))?;
        self.screenshots
            .publish(&image)
            .await
            .map_err(|err| ReviewError::publish(path.to_string(), err))
    }

    async fn emit(&self, issue_number: u64, body: &str) -> ReviewResult<()> {
        self.emitter
            .emit(issue_number, body)
            .await
            .map_err(|err| ReviewError::emit(issue_number, err))
    }
}
