//! Upload server selection against the discovery endpoint.

use reqwest::Client;
use tracing::{info, warn};

use crate::types::{ServerCandidate, ServersResponse};
use crate::{HostingConfig, HostingError};

/// Picks the least-loaded upload server.
///
/// Selection never fails: any network error, timeout, or malformed
/// response substitutes the configured fallback server instead.
pub struct ServerSelector {
    http: Client,
    config: HostingConfig,
}

impl ServerSelector {
    /// Creates a selector using the given HTTP client.
    pub fn new(http: Client, config: HostingConfig) -> Self {
        Self { http, config }
    }

    /// Returns the name of the server to upload to.
    pub async fn select(&self) -> String {
        match self.fetch_candidates().await {
            Ok(servers) => match pick_best(&servers) {
                Some(best) => {
                    info!(server = %best.name, load = ?best.load, "selected upload server");
                    best.name.clone()
                }
                None => {
                    warn!(
                        fallback = %self.config.fallback_server,
                        "discovery returned no servers, using fallback"
                    );
                    self.config.fallback_server.clone()
                }
            },
            Err(e) => {
                warn!(
                    error = %e,
                    fallback = %self.config.fallback_server,
                    "server discovery failed, using fallback"
                );
                self.config.fallback_server.clone()
            }
        }
    }

    async fn fetch_candidates(&self) -> Result<Vec<ServerCandidate>, HostingError> {
        let response = self
            .http
            .get(&self.config.servers_url)
            .timeout(self.config.discovery_timeout)
            .send()
            .await?
            .error_for_status()?;

        let parsed: ServersResponse = response
            .json()
            .await
            .map_err(|e| HostingError::Malformed(e.to_string()))?;
        Ok(parsed.data.servers)
    }
}

/// Returns the candidate with the minimum load; ties go to the first in
/// input order. A missing load ranks as maximally loaded.
fn pick_best(servers: &[ServerCandidate]) -> Option<&ServerCandidate> {
    let mut best: Option<&ServerCandidate> = None;
    for candidate in servers {
        let load = candidate.load.unwrap_or(f64::INFINITY);
        match best {
            Some(current) if load >= current.load.unwrap_or(f64::INFINITY) => {}
            _ => best = Some(candidate),
        }
    }
    best
}
