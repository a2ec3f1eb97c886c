use std::path::PathBuf;

/// One user-submitted file awaiting upload.
///
/// Created once the inbound transfer has materialized the file on local
/// disk. The handling flow owns the file exclusively; [`crate::Relay`]
/// removes it when processing ends, success or failure.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    /// Where the inbound transfer parked the file.
    pub local_path: PathBuf,
    /// Name shown to the user and sent to the hosting service.
    pub display_name: String,
    /// Size advertised by the inbound transport, fixed at creation.
    pub total_bytes: u64,
}
