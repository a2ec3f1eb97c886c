//! Streamed multipart upload with bounded retries.

use std::path::Path;
use std::time::Duration;

use rand::Rng;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use tokio_util::io::ReaderStream;
use tracing::{info, warn};

use crate::selector::ServerSelector;
use crate::types::UploadResponse;
use crate::{HostingConfig, HostingError};

/// Longest rejection body kept for diagnostics.
const BODY_SNIPPET_LEN: usize = 200;

/// Uploads local files to the hosting service, returning shareable links.
///
/// Files are streamed from disk, so memory use stays at buffer size no
/// matter how large the file is. Failed attempts back off a randomized
/// interval so a fleet of failing transfers does not hammer the service
/// in lockstep.
pub struct Uploader {
    http: Client,
    selector: ServerSelector,
    config: HostingConfig,
}

impl Uploader {
    /// Creates an uploader using the given HTTP client.
    pub fn new(http: Client, config: HostingConfig) -> Self {
        let selector = ServerSelector::new(http.clone(), config.clone());
        Self {
            http,
            selector,
            config,
        }
    }

    /// Uploads `path` and returns the download page URL.
    ///
    /// The target server is resolved once per call; retries go to the
    /// same server rather than re-querying discovery between attempts.
    pub async fn upload(&self, path: &Path) -> Result<String, HostingError> {
        let server = self.selector.select().await;
        let url = self.config.upload_url(&server);
        self.upload_to(&url, path).await
    }

    /// Uploads `path` to an explicit endpoint with the configured retry
    /// policy.
    pub async fn upload_to(&self, url: &str, path: &Path) -> Result<String, HostingError> {
        let file_name = basename(path);
        let attempts = self.config.max_attempts.max(1);
        let mut last: Option<HostingError> = None;

        for attempt in 1..=attempts {
            info!(file = %file_name, attempt, "uploading");
            match self.attempt(url, path, &file_name).await {
                Ok(link) => {
                    info!(file = %file_name, attempt, link = %link, "upload complete");
                    return Ok(link);
                }
                Err(e) => {
                    warn!(file = %file_name, attempt, error = %e, "upload attempt failed");
                    last = Some(e);
                }
            }

            if attempt < attempts {
                tokio::time::sleep(jittered(self.config.backoff_min, self.config.backoff_max))
                    .await;
            }
        }

        Err(HostingError::Exhausted {
            attempts,
            last: Box::new(
                last.unwrap_or_else(|| HostingError::Malformed("upload never attempted".into())),
            ),
        })
    }

    async fn attempt(
        &self,
        url: &str,
        path: &Path,
        file_name: &str,
    ) -> Result<String, HostingError> {
        let file = tokio::fs::File::open(path).await?;
        let length = file.metadata().await?.len();
        let part = Part::stream_with_length(Body::wrap_stream(ReaderStream::new(file)), length)
            .file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(url)
            .multipart(form)
            .timeout(self.config.upload_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HostingError::Rejected {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| HostingError::Malformed(e.to_string()))?;
        if !parsed.status.eq_ignore_ascii_case("ok") {
            return Err(HostingError::Malformed(format!(
                "service answered status {:?}",
                parsed.status
            )));
        }
        Ok(parsed.data.download_page)
    }
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".into())
}

/// Uniformly random duration in `[min, max]`.
fn jittered(min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    let secs = rand::thread_rng().gen_range(min.as_secs_f64()..=max.as_secs_f64());
    Duration::from_secs_f64(secs)
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= BODY_SNIPPET_LEN {
        return trimmed.to_string();
    }
    let mut cut = BODY_SNIPPET_LEN;
    while !trimmed.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…", &trimmed[..cut])
}
