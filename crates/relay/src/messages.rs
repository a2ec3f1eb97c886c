//! User-facing status texts.
//!
//! Markdown as the chat layer renders it: asterisk bold, backtick code.

use droplink_transfer::human_size;

/// Status posted while the file is handed to the hosting service.
pub fn uploading(name: &str) -> String {
    format!("📤 Uploading `{name}` to GoFile...")
}

/// Terminal success text; the link also backs the sink's affordance.
pub fn success(name: &str, total_bytes: u64, link: &str) -> String {
    format!(
        "✅ *Upload Complete*\n\n\
         📂 `{name}`\n\
         📦 `{size}`\n\n\
         🔗 [Download Link]({link})",
        size = human_size(total_bytes),
    )
}

/// Terminal failure text carrying the reason verbatim.
pub fn failure(reason: &str) -> String {
    format!("❌ Upload failed:\n`{reason}`")
}

/// Rejection for files over the configured ceiling.
pub fn too_large(limit: u64) -> String {
    format!("❌ File too large. Max {}.", human_size(limit))
}
