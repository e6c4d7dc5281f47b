// ─── Version Manifest ───
// Handles fetching and parsing the top-level version manifest.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::Fetcher;

/// Top-level version manifest.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VersionManifest {
    #[serde(default)]
    pub latest: Option<LatestVersions>,
    pub versions: Vec<VersionEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LatestVersions {
    pub release: String,
    pub snapshot: String,
}

/// A single entry in the manifest.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionEntry {
    pub id: String,
    #[serde(rename = "type", default)]
    pub version_type: String,
    pub url: String,
    pub sha1: String,
    #[serde(default)]
    pub release_time: Option<String>,
}

impl VersionManifest {
    /// Parse a manifest, failing with `NotArray` when `versions` is absent or
    /// not a list.
    pub fn from_slice(bytes: &[u8]) -> LauncherResult<Self> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        if !value.get("versions").is_some_and(|v| v.is_array()) {
            return Err(LauncherError::NotArray {
                path: "versions".into(),
            });
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Fetch the manifest at `url`. Returns the parsed manifest and raw bytes.
    pub async fn fetch(fetcher: &dyn Fetcher, url: &str) -> LauncherResult<(Self, Vec<u8>)> {
        info!("Fetching version manifest from {}", url);
        let raw = fetcher.fetch(url).await?;
        let manifest = Self::from_slice(&raw)?;
        info!("Loaded {} versions from manifest", manifest.versions.len());
        Ok((manifest, raw))
    }

    /// Find a specific version entry by ID (e.g. "1.20.4").
    pub fn find_version(&self, id: &str) -> LauncherResult<&VersionEntry> {
        self.versions
            .iter()
            .find(|v| v.id == id)
            .ok_or_else(|| LauncherError::VersionNotFound(id.to_string()))
    }

    /// List all official stable versions (release only).
    pub fn releases(&self) -> Vec<&VersionEntry> {
        self.versions
            .iter()
            .filter(|v| v.version_type == "release")
            .collect()
    }
}
