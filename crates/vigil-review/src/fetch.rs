//! Content fetcher with a bounded retry budget.
//!
//! Each attempt is a plain GET; a non-success status, transport failure, or
//! undecodable body all count as a failed attempt. The fetcher suspends for
//! a fixed short delay between attempts and reports the last failure once
//! the budget is exhausted. Retrieval has no side effects, so retrying is
//! always safe.

use std::time::Duration;

use reqwest::Client;
use tracing::warn;

use crate::error::{FetchFailure, RetrievalError};
use crate::model::RecordDocument;

/// Total attempts per location: one initial request plus one retry.
pub const GET_FILE_MAX_RETRIES: u32 = 2;

/// Fixed suspension between a failed attempt and the next.
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Retrieves parsed record documents from content-addressed locations.
#[derive(Debug, Clone)]
pub struct ContentFetcher {
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl ContentFetcher {
    /// Construct a fetcher with the default retry budget.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_policy(client, GET_FILE_MAX_RETRIES, RETRY_DELAY)
    }

    /// Construct a fetcher with an explicit retry budget and backoff delay.
    #[must_use]
    pub const fn with_policy(client: Client, max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            client,
            max_retries,
            retry_delay,
        }
    }

    /// Fetch and parse the record document at `url`.
    ///
    /// # Errors
    ///
    /// Returns a [`RetrievalError`] carrying the last underlying failure and
    /// the number of attempts once the retry budget is exhausted.
    pub async fn fetch_record(&self, url: &str) -> Result<RecordDocument, RetrievalError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.attempt(url).await {
                Ok(document) => return Ok(document),
                Err(failure) => {
                    if attempts >= self.max_retries {
                        return Err(RetrievalError {
                            url: url.to_string(),
                            attempts,
                            source: failure,
                        });
                    }
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }

    /// Fetch each location independently, omitting the ones that fail.
    ///
    /// A failure on one location is logged and degrades to omission; the
    /// batch itself never fails.
    pub async fn fetch_all(&self, urls: &[String]) -> Vec<RecordDocument> {
        let mut documents = Vec::with_capacity(urls.len());
        for url in urls {
            match self.fetch_record(url).await {
                Ok(document) => documents.push(document),
                Err(err) => {
                    warn!(url = %err.url, attempts = err.attempts, error = %err, "omitting unreachable record from batch");
                }
            }
        }
        documents
    }

    async fn attempt(&self, url: &str) -> Result<RecordDocument, FetchFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchFailure::Transport { source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<RecordDocument>()
            .await
            .map_err(|source| FetchFailure::Decode { source })
    }
}
