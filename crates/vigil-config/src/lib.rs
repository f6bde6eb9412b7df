//! Environment-backed settings for the reviewer service.
//!
//! Settings are loaded once at process start and validated eagerly: a
//! missing provider key prevents the service from starting at all. The
//! loader reads through an injectable lookup so tests never mutate process
//! environment.

/// Configuration error type.
pub mod error;

use std::net::IpAddr;

use url::Url;

pub use error::{ConfigError, ConfigResult};

/// Screenshot provider endpoint used when none is configured.
pub const DEFAULT_SCREENSHOT_ENDPOINT: &str = "http://api.screenshotlayer.com/api/capture";

/// Image host endpoint used when none is configured.
pub const DEFAULT_IMAGE_HOST_ENDPOINT: &str = "https://api.imgbb.com/1/upload";

const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com/";
const DEFAULT_GITHUB_RAW_BASE: &str = "https://raw.githubusercontent.com/";
const DEFAULT_TRUNK_BRANCH: &str = "main";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_SKIP_TITLE_MARKER: &str = "[skip-review]";

/// Complete service settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Webhook listener settings.
    pub server: ServerSettings,
    /// GitHub collaborator endpoints and credentials.
    pub github: GithubSettings,
    /// Screenshot and image-host provider access.
    pub capture: CaptureSettings,
    /// Review run filtering.
    pub review: ReviewSettings,
    /// Merge-time hosting activation, when configured.
    pub hosting: Option<HostingSettings>,
}

/// Webhook listener settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Address the listener binds to.
    pub bind_addr: IpAddr,
    /// Port the listener binds to.
    pub http_port: u16,
}

/// GitHub endpoints and credentials.
#[derive(Debug, Clone)]
pub struct GithubSettings {
    /// REST API base URL.
    pub api_base: Url,
    /// Raw-content base URL.
    pub raw_base: Url,
    /// Trunk branch treated as ground truth for prior ownership.
    pub trunk_branch: String,
    /// Bearer token, when configured.
    pub token: Option<String>,
}

/// Screenshot and image-host provider access.
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    /// Screenshot provider endpoint.
    pub screenshot_endpoint: Url,
    /// Screenshot provider access key.
    pub screenshot_key: String,
    /// Image host endpoint.
    pub image_host_endpoint: Url,
    /// Image host access key.
    pub image_host_key: String,
}

/// Review run filtering.
#[derive(Debug, Clone)]
pub struct ReviewSettings {
    /// Labels that veto a review run.
    pub skip_labels: Vec<String>,
    /// Title marker that vetoes a review run.
    pub skip_title_marker: String,
}

/// Merge-time hosting activation.
#[derive(Debug, Clone)]
pub struct HostingSettings {
    /// Designated hosting address that marks a record as hosted.
    pub hosting_ip: IpAddr,
    /// Endpoint notified once per newly-activated hosting record.
    pub activation_endpoint: Url,
}

impl Settings {
    /// Load settings from process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a required key is missing or a value
    /// fails validation.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an explicit lookup.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a required key is missing or a value
    /// fails validation.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let screenshot_key = require(&lookup, "VIGIL_SCREENSHOT_KEY")?;
        let image_host_key = require(&lookup, "VIGIL_IMAGE_HOST_KEY")?;

        let capture = CaptureSettings {
            screenshot_endpoint: parse_url(
                "screenshot_endpoint",
                lookup("VIGIL_SCREENSHOT_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_SCREENSHOT_ENDPOINT.to_string()),
            )?,
            screenshot_key,
            image_host_endpoint: parse_url(
                "image_host_endpoint",
                lookup("VIGIL_IMAGE_HOST_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_IMAGE_HOST_ENDPOINT.to_string()),
            )?,
            image_host_key,
        };

        let github = GithubSettings {
            api_base: parse_url(
                "github_api_base",
                lookup("VIGIL_GITHUB_API_BASE")
                    .unwrap_or_else(|| DEFAULT_GITHUB_API_BASE.to_string()),
            )?,
            raw_base: parse_url(
                "github_raw_base",
                lookup("VIGIL_GITHUB_RAW_BASE")
                    .unwrap_or_else(|| DEFAULT_GITHUB_RAW_BASE.to_string()),
            )?,
            trunk_branch: lookup("VIGIL_TRUNK_BRANCH")
                .unwrap_or_else(|| DEFAULT_TRUNK_BRANCH.to_string()),
            token: lookup("VIGIL_GITHUB_TOKEN").filter(|token| !token.is_empty()),
        };

        let server = ServerSettings {
            bind_addr: parse_addr(
                "bind_addr",
                lookup("VIGIL_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            )?,
            http_port: match lookup("VIGIL_HTTP_PORT") {
                Some(raw) => parse_port(&raw)?,
                None => DEFAULT_HTTP_PORT,
            },
        };

        let review = ReviewSettings {
            skip_labels: lookup("VIGIL_SKIP_LABELS")
                .map(|raw| split_labels(&raw))
                .unwrap_or_default(),
            skip_title_marker: lookup("VIGIL_SKIP_TITLE_MARKER")
                .unwrap_or_else(|| DEFAULT_SKIP_TITLE_MARKER.to_string()),
        };

        let hosting = load_hosting(&lookup)?;

        Ok(Self {
            server,
            github,
            capture,
            review,
            hosting,
        })
    }
}

fn load_hosting(
    lookup: &impl Fn(&str) -> Option<String>,
) -> ConfigResult<Option<HostingSettings>> {
    let ip = lookup("VIGIL_HOSTING_IP");
    let endpoint = lookup("VIGIL_ACTIVATION_ENDPOINT");
    match (ip, endpoint) {
        (None, None) => Ok(None),
        (Some(ip), Some(endpoint)) => Ok(Some(HostingSettings {
            hosting_ip: parse_addr("hosting_ip", ip)?,
            activation_endpoint: parse_url("activation_endpoint", endpoint)?,
        })),
        (Some(_), None) => Err(ConfigError::MissingEnv {
            name: "VIGIL_ACTIVATION_ENDPOINT",
        }),
        (None, Some(_)) => Err(ConfigError::MissingEnv {
            name: "VIGIL_HOSTING_IP",
        }),
    }
}

fn require(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> ConfigResult<String> {
    lookup(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::MissingEnv { name })
}

fn parse_url(field: &'static str, raw: String) -> ConfigResult<Url> {
    raw.parse().map_err(|_| ConfigError::Invalid {
        field,
        reason: "not_a_url",
        value: Some(raw),
    })
}

fn parse_addr(field: &'static str, raw: String) -> ConfigResult<IpAddr> {
    raw.parse().map_err(|_| ConfigError::Invalid {
        field,
        reason: "not_an_ip_address",
        value: Some(raw),
    })
}

fn parse_port(raw: &str) -> ConfigResult<u16> {
    let port: u16 = raw.parse().map_err(|_| ConfigError::Invalid {
        field: "http_port",
        reason: "out_of_range",
        value: Some(raw.to_string()),
    })?;
    if port == 0 {
        return Err(ConfigError::Invalid {
            field: "http_port",
            reason: "zero",
            value: Some(raw.to_string()),
        });
    }
    Ok(port)
}

fn split_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("VIGIL_SCREENSHOT_KEY", "shot-key"),
            ("VIGIL_IMAGE_HOST_KEY", "host-key"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> ConfigResult<Settings> {
        Settings::from_lookup(|name| env.get(name).map(|value| (*value).to_string()))
    }

    #[test]
    fn minimal_environment_uses_defaults() {
        let settings = load(&base_env()).expect("settings load");
        assert_eq!(settings.server.http_port, DEFAULT_HTTP_PORT);
        assert_eq!(settings.github.trunk_branch, "main");
        assert_eq!(
            settings.capture.screenshot_endpoint.as_str(),
            DEFAULT_SCREENSHOT_ENDPOINT
        );
        assert!(settings.github.token.is_none());
        assert!(settings.hosting.is_none());
        assert!(settings.review.skip_labels.is_empty());
    }

    #[test]
    fn missing_screenshot_key_prevents_startup() {
        let mut env = base_env();
        env.remove("VIGIL_SCREENSHOT_KEY");
        let error = load(&env).expect_err("missing key is fatal");
        assert!(matches!(
            error,
            ConfigError::MissingEnv {
                name: "VIGIL_SCREENSHOT_KEY"
            }
        ));
    }

    #[test]
    fn blank_image_host_key_counts_as_missing() {
        let mut env = base_env();
        env.insert("VIGIL_IMAGE_HOST_KEY", "   ");
        let error = load(&env).expect_err("blank key is fatal");
        assert!(matches!(
            error,
            ConfigError::MissingEnv {
                name: "VIGIL_IMAGE_HOST_KEY"
            }
        ));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut env = base_env();
        env.insert("VIGIL_HTTP_PORT", "0");
        let error = load(&env).expect_err("port zero is invalid");
        assert!(matches!(
            error,
            ConfigError::Invalid {
                field: "http_port",
                reason: "zero",
                ..
            }
        ));
    }

    #[test]
    fn skip_labels_split_and_trim() {
        let mut env = base_env();
        env.insert("VIGIL_SKIP_LABELS", "no-review, hold ,,wip");
        let settings = load(&env).expect("settings load");
        assert_eq!(settings.review.skip_labels, vec!["no-review", "hold", "wip"]);
    }

    #[test]
    fn hosting_settings_require_both_values() {
        let mut env = base_env();
        env.insert("VIGIL_HOSTING_IP", "203.0.113.10");
        let error = load(&env).expect_err("half-configured hosting is fatal");
        assert!(matches!(
            error,
            ConfigError::MissingEnv {
                name: "VIGIL_ACTIVATION_ENDPOINT"
            }
        ));

        env.insert("VIGIL_ACTIVATION_ENDPOINT", "https://hosting.example/activate");
        let settings = load(&env).expect("settings load");
        let hosting = settings.hosting.expect("hosting configured");
        assert_eq!(hosting.hosting_ip.to_string(), "203.0.113.10");
    }
}
