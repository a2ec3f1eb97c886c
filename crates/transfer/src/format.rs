//! Human-readable byte size formatting.

const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Formats a byte count as a human-readable size with two decimals.
///
/// Units step at 1024: `human_size(1536)` is `"1.50 KB"`,
/// `human_size(0)` is `"0.00 B"`.
pub fn human_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in &UNITS[..UNITS.len() - 1] {
        if size < 1024.0 {
            return format!("{size:.2} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.2} {}", UNITS[UNITS.len() - 1])
}
