//! Transfer progress reporting for droplink.
//!
//! A transfer edits a single status message in chat while bytes move.
//! This crate owns the math (percentage, speed, ETA), the rendered text,
//! and the [`StatusSink`] seam the chat layer implements. Display errors
//! are logged and discarded so a flaky edit never aborts a transfer.

mod format;
mod progress;

pub use format::human_size;
pub use progress::{ProgressReporter, ProgressSample, SinkFuture, StatusSink, render_bar};

/// Error from a status display update.
///
/// Carries the display layer's message; callers log it and move on.
#[derive(Debug, thiserror::Error)]
#[error("status update failed: {0}")]
pub struct SinkError(pub String);
