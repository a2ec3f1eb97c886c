//! Per-request relay orchestration for droplink.
//!
//! One [`TransferRequest`] is one user file sitting on local disk. The
//! [`Relay`] enforces the size ceiling, hands the file to an
//! [`UploadService`], posts exactly one terminal status per request, and
//! removes the local file no matter how the transfer ends.

pub mod messages;
mod relay;
mod request;

pub use relay::{Outcome, Relay, UploadFuture, UploadService};
pub use request::TransferRequest;

/// Errors surfaced by relay policy checks.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("file of {actual} bytes exceeds the {limit} byte ceiling")]
    TooLarge { actual: u64, limit: u64 },
}
