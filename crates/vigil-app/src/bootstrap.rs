//! Application bootstrap and environment wiring.
//!
//! Settings load and validate before anything else: a missing provider key
//! stops the process here rather than surfacing mid-run. The shared HTTP
//! client carries the service user agent and a transport-level timeout for
//! every collaborator call.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::net::TcpListener;
use tracing::info;

use vigil_capture::{CaptureClient, CaptureConfig};
use vigil_config::Settings;
use vigil_github::{GithubClient, GithubConfig};
use vigil_review::ContentFetcher;
use vigil_telemetry::LoggingConfig;

use crate::error::{AppError, AppResult};
use crate::webhook::{AppState, router};

/// User agent presented to GitHub and the capture providers.
const USER_AGENT: &str = concat!("vigil/", env!("CARGO_PKG_VERSION"));

/// Transport-level timeout for all outbound calls.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Entry point for the reviewer boot sequence.
///
/// # Errors
///
/// Returns an error if settings validation, telemetry installation, or the
/// webhook listener fails.
pub async fn run_app() -> AppResult<()> {
    let settings =
        Settings::from_env().map_err(|err| AppError::config("settings.from_env", err))?;
    vigil_telemetry::init_logging(&LoggingConfig::default())
        .map_err(|err| AppError::telemetry("telemetry.init", err))?;

    info!("Vigil reviewer bootstrap starting");
    let state = AppState::from_settings(&settings)?;
    let addr = SocketAddr::new(settings.server.bind_addr, settings.server.http_port);
    info!(addr = %addr, "Launching webhook listener");

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| AppError::Bind { addr, source })?;
    axum::serve(listener, router(Arc::new(state)).into_make_service())
        .await
        .map_err(|source| AppError::Serve { source })?;
    info!("Webhook listener shutdown complete");
    Ok(())
}

impl AppState {
    /// Wire collaborator clients from validated settings.
    pub(crate) fn from_settings(settings: &Settings) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| AppError::http_client("client.build", err))?;

        let github = GithubClient::new(
            client.clone(),
            GithubConfig {
                api_base: settings.github.api_base.clone(),
                raw_base: settings.github.raw_base.clone(),
                trunk_branch: settings.github.trunk_branch.clone(),
                token: settings.github.token.clone(),
            },
        );
        let screenshots = Arc::new(CaptureClient::new(
            client.clone(),
            CaptureConfig {
                screenshot_endpoint: settings.capture.screenshot_endpoint.clone(),
                screenshot_key: settings.capture.screenshot_key.clone(),
                image_host_endpoint: settings.capture.image_host_endpoint.clone(),
                image_host_key: settings.capture.image_host_key.clone(),
            },
        ));

        Ok(Self {
            github,
            screenshots,
            fetcher: ContentFetcher::new(client.clone()),
            review: settings.review.clone(),
            hosting: settings.hosting.clone(),
            http: client,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_settings() -> Settings {
        Settings::from_lookup(|name| match name {
            "VIGIL_SCREENSHOT_KEY" => Some("shot-key".to_string()),
            "VIGIL_IMAGE_HOST_KEY" => Some("host-key".to_string()),
            _ => None,
        })
        .expect("settings load")
    }

    #[test]
    fn app_state_wires_from_validated_settings() {
        let state = AppState::from_settings(&minimal_settings()).expect("state builds");
        assert!(state.hosting.is_none());
        assert!(state.review.skip_labels.is_empty());
    }
}
