//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const APP_NAME: &str = "portal-resolver";
const APP_QUALIFIER: &str = "org";
const APP_ORGANIZATION: &str = "sf311";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration from file and CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log file path. Logs go to stderr when unset.
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Resolver tuning.
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Vendor portal protocol constants.
    #[serde(default)]
    pub portal: PortalConfig,
}

/// Resolver tuning parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// How long an outcome stays cached, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Maximum distinct case ids kept in the cache.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Maximum resolutions in flight during a batch.
    #[serde(default = "default_max_concurrent_resolutions")]
    pub max_concurrent_resolutions: usize,

    /// Per-request timeout, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Connection timeout, in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl ResolverConfig {
    /// Cache time-to-live.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Connection timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_capacity: default_cache_capacity(),
            max_concurrent_resolutions: default_max_concurrent_resolutions(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Every vendor-specific string the handshake depends on.
///
/// The protocol was observed, not documented; a portal change should only
/// need edits here (or in the `[portal]` table of the config file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Substring identifying the vendor host in a wrapper URL.
    pub wrapper_host_marker: String,
    /// Query parameter carrying the case id.
    pub case_id_param: String,
    /// Key of the form reference token embedded in the bootstrap page.
    pub form_ref_key: String,
    /// Key of the CSRF token embedded in the bootstrap page.
    pub csrf_key: String,
    /// Path of the citizen-session bootstrap endpoint.
    pub session_path: String,
    /// Query string sent to the session endpoint.
    pub session_query: Vec<(String, String)>,
    /// Path of the custom-action endpoint.
    pub custom_action_path: String,
    /// Extra query parameters sent with every custom action.
    pub action_query: Vec<(String, String)>,
    /// Action listing attachment filenames.
    pub list_action: String,
    /// Action returning one attachment's content.
    pub download_action: String,
    /// `name` field of the custom-action body.
    pub request_name: String,
    /// JSON pointer to the semicolon-joined filename list.
    pub manifest_pointer: String,
    /// JSON pointer to the base64 payload.
    pub payload_pointer: String,
    /// Response header carrying the session credential.
    pub authorization_header: String,
    /// Request header carrying the CSRF token.
    pub csrf_header: String,
    /// Browser-like User-Agent presented to the portal.
    pub user_agent: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            wrapper_host_marker: "verintcloudservices.com".to_string(),
            case_id_param: "caseid".to_string(),
            form_ref_key: "formref".to_string(),
            csrf_key: "csrf_token".to_string(),
            session_path: "/api/citizen".to_string(),
            session_query: pairs(&[("archived", "Y"), ("preview", "false"), ("locale", "en")]),
            custom_action_path: "/api/custom".to_string(),
            action_query: pairs(&[
                ("actionedby", ""),
                ("loadform", "true"),
                ("access", "citizen"),
                ("locale", "en"),
            ]),
            list_action: "get_attachments_details".to_string(),
            download_action: "download_attachment".to_string(),
            request_name: "download_attachments".to_string(),
            manifest_pointer: "/data/formdata_filenames".to_string(),
            payload_pointer: "/data/txt_file".to_string(),
            authorization_header: "authorization".to_string(),
            csrf_header: "X-CSRF-Token".to_string(),
            user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }
}

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

fn default_cache_ttl_secs() -> u64 {
    30 * 60
}

fn default_cache_capacity() -> usize {
    1024
}

fn default_max_concurrent_resolutions() -> usize {
    16
}

fn default_request_timeout_secs() -> u64 {
    8
}

fn default_connect_timeout_secs() -> u64 {
    5
}

use super::args::CliArgs;

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(concurrency) = args.concurrency {
            self.resolver.max_concurrent_resolutions = concurrency.max(1);
        }
        if let Some(timeout) = args.timeout {
            self.resolver.request_timeout_secs = timeout;
        }
        if let Some(ttl) = args.cache_ttl {
            self.resolver.cache_ttl_secs = ttl;
        }
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default config file path.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        Self::default_config_dir().map(|dir| dir.join("config.toml"))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_path: None,
            log_level: LogLevel::Info,
            resolver: ResolverConfig::default(),
            portal: PortalConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_config() {
        let toml_content = r#"
            log_level = "debug"

            [resolver]
            cache_ttl_secs = 600

            [portal]
            form_ref_key = "form_ref"
        "#;

        let config: AppConfig = toml::from_str(toml_content).expect("Failed to parse config");

        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.resolver.cache_ttl(), Duration::from_secs(600));
        assert_eq!(config.resolver.max_concurrent_resolutions, 16);
        assert_eq!(config.portal.form_ref_key, "form_ref");
        assert_eq!(config.portal.case_id_param, "caseid");
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert!(config.log_path.is_none());
        assert_eq!(config.resolver.request_timeout(), Duration::from_secs(8));
        assert_eq!(config.portal.list_action, "get_attachments_details");
        assert_eq!(config.portal.download_action, "download_attachment");
    }

    #[test]
    fn test_default_round_trips_through_toml() {
        let config = AppConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();

        assert_eq!(parsed.portal, config.portal);
        assert_eq!(parsed.resolver, config.resolver);
    }
}
