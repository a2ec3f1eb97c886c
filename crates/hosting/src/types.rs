//! GoFile API response types.

use serde::Deserialize;

/// Response from the server discovery endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ServersResponse {
    pub status: String,
    pub data: ServerList,
}

/// The candidate list inside a discovery response.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerList {
    pub servers: Vec<ServerCandidate>,
}

/// One upload server advertised by discovery.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerCandidate {
    pub name: String,
    /// Current load; lower is less busy. Servers that omit it rank last.
    #[serde(default)]
    pub load: Option<f64>,
    #[serde(default)]
    pub zone: Option<String>,
}

/// Response from a successful upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub status: String,
    pub data: UploadedFile,
}

/// Upload result payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    /// Shareable download page for the uploaded file.
    pub download_page: String,
    #[serde(default)]
    pub file_name: Option<String>,
}
