//! Merge-time hosting activation sweep.
//!
//! After a pull request merges, records that newly appeared on the trunk
//! branch and resolve to the designated hosting address are announced to the
//! activation endpoint, one call per record. The sweep degrades on partial
//! failure: an unreachable record or a rejected activation call is logged
//! and the sweep continues.

use serde::Serialize;
use tracing::{info, warn};

use vigil_config::HostingSettings;
use vigil_github::PullRequestEvent;
use vigil_review::RecordDocument;

use crate::webhook::AppState;

#[derive(Serialize)]
struct ActivationRequest<'a> {
    path: &'a str,
    address: String,
}

/// Announce newly-activated hosting records for a merged pull request.
pub(crate) async fn activate_hosted_records(state: &AppState, event: &PullRequestEvent) {
    let Some(hosting) = &state.hosting else {
        return;
    };

    let repo = event.repository.repo_ref();
    let files = match state.github.list_changed_files(&repo, event.number).await {
        Ok(files) => files,
        Err(err) => {
            warn!(error = %err, number = event.number, "activation sweep could not list changed files");
            return;
        }
    };

    for file in files.iter().filter(|file| file.newly_tracked) {
        let document = match state.fetcher.fetch_record(&file.trunk_url).await {
            Ok(document) => document,
            Err(err) => {
                warn!(error = %err, path = %file.path, "skipping unreachable record in activation sweep");
                continue;
            }
        };
        if !resolves_to_hosting(&document, hosting) {
            continue;
        }
        trigger_activation(state, hosting, &file.path).await;
    }
}

fn resolves_to_hosting(document: &RecordDocument, hosting: &HostingSettings) -> bool {
    document
        .record
        .addresses
        .iter()
        .any(|address| address.parse().is_ok_and(|ip: std::net::IpAddr| ip == hosting.hosting_ip))
}

async fn trigger_activation(state: &AppState, hosting: &HostingSettings, path: &str) {
    let request = ActivationRequest {
        path,
        address: hosting.hosting_ip.to_string(),
    };
    match state
        .http
        .post(hosting.activation_endpoint.clone())
        .json(&request)
        .send()
        .await
    {
        Ok(response) if response.status().is_success() => {
            info!(path, "hosting record activated");
        }
        Ok(response) => {
            warn!(
                path,
                status = response.status().as_u16(),
                "activation endpoint rejected record"
            );
        }
        Err(err) => {
            warn!(path, error = %err, "activation call failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::MockServer;
    use httpmock::prelude::*;
    use reqwest::Client;
    use std::sync::Arc;
    use vigil_capture::{CaptureClient, CaptureConfig};
    use vigil_config::ReviewSettings;
    use vigil_github::{GithubClient, GithubConfig};
    use vigil_review::ContentFetcher;

    fn hosting(server: &MockServer) -> HostingSettings {
        HostingSettings {
            hosting_ip: "203.0.113.10".parse().expect("valid address"),
            activation_endpoint: server.url("/activate").parse().expect("valid endpoint"),
        }
    }

    fn state(server: &MockServer, hosting: Option<HostingSettings>) -> AppState {
        let client = Client::new();
        AppState {
            github: GithubClient::new(
                client.clone(),
                GithubConfig {
                    api_base: server.url("/").parse().expect("valid api base"),
                    raw_base: server.url("/raw/").parse().expect("valid raw base"),
                    trunk_branch: "main".to_string(),
                    token: None,
                },
            ),
            screenshots: Arc::new(CaptureClient::new(
                client.clone(),
                CaptureConfig {
                    screenshot_endpoint: server
                        .url("/api/capture")
                        .parse()
                        .expect("valid endpoint"),
                    screenshot_key: "shot-key".to_string(),
                    image_host_endpoint: server.url("/1/upload").parse().expect("valid endpoint"),
                    image_host_key: "host-key".to_string(),
                },
            )),
            fetcher: ContentFetcher::new(client.clone()),
            review: ReviewSettings {
                skip_labels: Vec::new(),
                skip_title_marker: String::new(),
            },
            hosting,
            http: client,
        }
    }

    fn merged_event() -> PullRequestEvent {
        serde_json::from_value(serde_json::json!({
            "action": "closed",
            "number": 41,
            "pull_request": {
                "user": {"login": "alice"},
                "title": "register alice.example",
                "labels": [],
                "merged": true
            },
            "repository": {
                "name": "registry",
                "owner": {"login": "registry-org"},
                "default_branch": "main"
            }
        }))
        .expect("event parses")
    }

    fn document(json: serde_json::Value) -> RecordDocument {
        serde_json::from_value(json).expect("valid record document")
    }

    #[test]
    fn hosting_match_requires_the_designated_address() {
        let server_hosting = HostingSettings {
            hosting_ip: "203.0.113.10".parse().expect("valid address"),
            activation_endpoint: "https://hosting.example/activate"
                .parse()
                .expect("valid endpoint"),
        };
        let hosted = document(
            serde_json::json!({"owner":{"username":"alice"},"record":{"A":["198.51.100.7","203.0.113.10"]}}),
        );
        assert!(resolves_to_hosting(&hosted, &server_hosting));

        let unhosted = document(
            serde_json::json!({"owner":{"username":"alice"},"record":{"A":["198.51.100.7"]}}),
        );
        assert!(!resolves_to_hosting(&unhosted, &server_hosting));

        let no_addresses = document(
            serde_json::json!({"owner":{"username":"alice"},"record":{"URL":"http://example.com"}}),
        );
        assert!(!resolves_to_hosting(&no_addresses, &server_hosting));
    }

    #[tokio::test]
    async fn sweep_activates_newly_tracked_hosted_records_only() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET)
                .path("/repos/registry-org/registry/pulls/41/files");
            then.status(200).json_body(serde_json::json!([
                {
                    "filename": "domains/hosted.json",
                    "status": "added",
                    "raw_url": server.url("/head/domains/hosted.json"),
                    "blob_url": "http://diff.invalid/domains/hosted.json"
                },
                {
                    "filename": "domains/external.json",
                    "status": "added",
                    "raw_url": server.url("/head/domains/external.json"),
                    "blob_url": "http://diff.invalid/domains/external.json"
                },
                {
                    "filename": "domains/edited.json",
                    "status": "modified",
                    "raw_url": server.url("/head/domains/edited.json"),
                    "blob_url": "http://diff.invalid/domains/edited.json"
                }
            ]));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/raw/registry-org/registry/main/domains/hosted.json");
            then.status(200).json_body(
                serde_json::json!({"owner":{"username":"alice"},"record":{"A":["203.0.113.10"]}}),
            );
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/raw/registry-org/registry/main/domains/external.json");
            then.status(200).json_body(
                serde_json::json!({"owner":{"username":"bob"},"record":{"A":["198.51.100.7"]}}),
            );
        });
        let activation = server.mock(|when, then| {
            when.method(POST)
                .path("/activate")
                .json_body(serde_json::json!({"path": "domains/hosted.json", "address": "203.0.113.10"}));
            then.status(200);
        });

        let state = state(&server, Some(hosting(&server)));
        activate_hosted_records(&state, &merged_event()).await;

        activation.assert();
    }

    #[tokio::test]
    async fn sweep_is_skipped_without_hosting_settings() {
        let server = MockServer::start_async().await;
        let listing = server.mock(|when, then| {
            when.method(GET)
                .path("/repos/registry-org/registry/pulls/41/files");
            then.status(200).json_body(serde_json::json!([]));
        });

        let state = state(&server, None);
        activate_hosted_records(&state, &merged_event()).await;

        listing.assert_calls(0);
    }

    #[tokio::test]
    async fn unreachable_records_degrade_to_omission() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET)
                .path("/repos/registry-org/registry/pulls/41/files");
            then.status(200).json_body(serde_json::json!([
                {
                    "filename": "domains/missing.json",
                    "status": "added",
                    "raw_url": server.url("/head/domains/missing.json"),
                    "blob_url": "http://diff.invalid/domains/missing.json"
                },
                {
                    "filename": "domains/hosted.json",
                    "status": "added",
                    "raw_url": server.url("/head/domains/hosted.json"),
                    "blob_url": "http://diff.invalid/domains/hosted.json"
                }
            ]));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/raw/registry-org/registry/main/domains/missing.json");
            then.status(404);
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/raw/registry-org/registry/main/domains/hosted.json");
            then.status(200).json_body(
                serde_json::json!({"owner":{"username":"alice"},"record":{"A":["203.0.113.10"]}}),
            );
        });
        let activation = server.mock(|when, then| {
            when.method(POST).path("/activate");
            then.status(200);
        });

        let state = state(&server, Some(hosting(&server)));
        activate_hosted_records(&state, &merged_event()).await;

        // The unreachable record is skipped; the later record still activates.
        activation.assert();
    }
}
