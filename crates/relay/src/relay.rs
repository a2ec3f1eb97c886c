//! Relay orchestration for one transfer request.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use droplink_hosting::{HostingError, Uploader};
use droplink_transfer::StatusSink;
use tracing::{debug, error, warn};

use crate::{RelayError, TransferRequest, messages};

/// A boxed future returned by [`UploadService::upload`].
pub type UploadFuture<'a> = Pin<Box<dyn Future<Output = Result<String, HostingError>> + Send + 'a>>;

/// Uploads a local file to the hosting service, returning a shareable
/// link.
///
/// The seam exists so the relay can be exercised without a network: the
/// real implementation is [`droplink_hosting::Uploader`].
pub trait UploadService: Send + Sync {
    fn upload<'a>(&'a self, path: &'a Path) -> UploadFuture<'a>;
}

impl UploadService for Uploader {
    fn upload<'a>(&'a self, path: &'a Path) -> UploadFuture<'a> {
        Box::pin(Uploader::upload(self, path))
    }
}

/// How one request ended. Exactly one of these is shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The file is hosted; `link` points at its download page.
    Delivered { link: String },
    /// Policy rejected the request before any transfer work.
    Rejected { reason: String },
    /// Every upload attempt failed.
    Failed { reason: String },
}

/// Drives one transfer request from local file to terminal status.
pub struct Relay {
    uploader: Arc<dyn UploadService>,
    max_bytes: u64,
}

impl Relay {
    /// Creates a relay enforcing a `max_bytes` size ceiling.
    pub fn new(uploader: Arc<dyn UploadService>, max_bytes: u64) -> Self {
        Self { uploader, max_bytes }
    }

    /// Checks the size ceiling.
    ///
    /// Called by the inbound boundary before it spends any bandwidth on
    /// a file that would only be rejected here.
    pub fn admit(&self, total_bytes: u64) -> Result<(), RelayError> {
        if total_bytes > self.max_bytes {
            return Err(RelayError::TooLarge {
                actual: total_bytes,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }

    /// Rejection text for a file over the ceiling.
    pub fn rejection_message(&self) -> String {
        messages::too_large(self.max_bytes)
    }

    /// Processes a request whose file is already on local disk.
    ///
    /// Posts exactly one terminal status through `sink` and removes the
    /// local file unconditionally, also when the upload fails or the
    /// status update itself does.
    pub async fn process(&self, request: TransferRequest, sink: &dyn StatusSink) -> Outcome {
        let outcome = match self.admit(request.total_bytes) {
            Err(e) => {
                warn!(file = %request.display_name, error = %e, "request rejected");
                Outcome::Rejected {
                    reason: self.rejection_message(),
                }
            }
            Ok(()) => self.deliver(&request, sink).await,
        };

        remove_local(&request.local_path);

        let announced = match &outcome {
            Outcome::Delivered { link } => {
                let text =
                    messages::success(&request.display_name, request.total_bytes, link);
                sink.present_link(text, link.clone()).await
            }
            Outcome::Rejected { reason } => sink.update(reason.clone()).await,
            Outcome::Failed { reason } => sink.update(messages::failure(reason)).await,
        };
        if let Err(e) = announced {
            // The transfer outcome stands even when the chat edit fails.
            debug!(file = %request.display_name, error = %e, "terminal status update dropped");
        }

        outcome
    }

    async fn deliver(&self, request: &TransferRequest, sink: &dyn StatusSink) -> Outcome {
        if let Err(e) = sink.update(messages::uploading(&request.display_name)).await {
            debug!(file = %request.display_name, error = %e, "phase update dropped");
        }

        match self.uploader.upload(&request.local_path).await {
            Ok(link) => Outcome::Delivered { link },
            Err(e) => {
                error!(file = %request.display_name, error = %e, "upload failed");
                Outcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Removes the request's local file; a missing file is fine.
fn remove_local(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "removed local file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove local file"),
    }
}
