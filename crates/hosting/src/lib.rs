//! GoFile hosting client for droplink.
//!
//! Two pieces: [`ServerSelector`] asks the discovery endpoint which upload
//! server is least loaded (falling back to a fixed server on any failure),
//! and [`Uploader`] streams a local file to the chosen server as multipart
//! form data, retrying with jittered backoff before giving up.

pub mod selector;
pub mod types;
pub mod upload;

#[cfg(test)]
mod mockhttp;

pub use selector::ServerSelector;
pub use upload::Uploader;

use std::time::Duration;

/// Tuning for discovery and uploads.
///
/// The retry count and backoff bounds are policy, not derived from any
/// SLA; the defaults match the service's observed behavior.
#[derive(Debug, Clone)]
pub struct HostingConfig {
    /// Discovery endpoint listing candidate upload servers.
    pub servers_url: String,
    /// Upload URL template; `{server}` is replaced by the chosen server.
    pub upload_url_pattern: String,
    /// Server used whenever discovery fails or returns nothing.
    pub fallback_server: String,
    /// Timeout for the discovery request.
    pub discovery_timeout: Duration,
    /// Total ceiling for one upload attempt, connection included.
    pub upload_timeout: Duration,
    /// Upload attempts before giving up.
    pub max_attempts: u32,
    /// Lower bound of the randomized inter-attempt backoff.
    pub backoff_min: Duration,
    /// Upper bound of the randomized inter-attempt backoff.
    pub backoff_max: Duration,
}

impl Default for HostingConfig {
    fn default() -> Self {
        Self {
            servers_url: "https://api.gofile.io/servers".into(),
            upload_url_pattern: "https://{server}.gofile.io/uploadFile".into(),
            fallback_server: "store1".into(),
            discovery_timeout: Duration::from_secs(10),
            upload_timeout: Duration::from_secs(900),
            max_attempts: 3,
            backoff_min: Duration::from_secs(2),
            backoff_max: Duration::from_secs(5),
        }
    }
}

impl HostingConfig {
    /// Builds the upload endpoint for a server name.
    pub fn upload_url(&self, server: &str) -> String {
        self.upload_url_pattern.replace("{server}", server)
    }
}

/// Errors produced by the hosting client.
#[derive(Debug, thiserror::Error)]
pub enum HostingError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upload rejected (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("malformed hosting response: {0}")]
    Malformed(String),

    #[error("upload failed after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<HostingError>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_url_substitutes_server() {
        let config = HostingConfig::default();
        assert_eq!(
            config.upload_url("store7"),
            "https://store7.gofile.io/uploadFile"
        );
    }

    #[test]
    fn default_policy_constants() {
        let config = HostingConfig::default();
        assert_eq!(config.fallback_server, "store1");
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.discovery_timeout, Duration::from_secs(10));
        assert_eq!(config.upload_timeout, Duration::from_secs(900));
        assert!(config.backoff_min <= config.backoff_max);
    }
}
