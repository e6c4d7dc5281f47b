// ─── Launcher Configuration ───
// Local JSON settings: Java runtimes, launch constants, mirrors, download pool.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::auth::DEFAULT_AUTH_SERVER;
use crate::core::downloader::{write_bytes, Downloader};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::Fetcher;
use crate::core::source::{MirrorSet, Source};

const APP_DIR_NAME: &str = "mcmirror";
pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 854,
            height: 480,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    pub concurrency: usize,
    /// Minimum spacing between request starts, in milliseconds.
    pub request_delay_ms: u64,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            concurrency: 8,
            request_delay_ms: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Java major version (as a string key) to executable path.
    pub javaversions: BTreeMap<String, PathBuf>,
    pub launcher_name: String,
    pub launcher_version: String,
    pub resolution: Resolution,
    pub client_id: String,
    pub auth_xuid: String,
    pub auth_server: String,
    pub download: DownloadSettings,
    pub mirrors: BTreeMap<Source, MirrorSet>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            javaversions: BTreeMap::new(),
            launcher_name: "newL".into(),
            launcher_version: "27".into(),
            resolution: Resolution::default(),
            client_id: "112321".into(),
            auth_xuid: "114514".into(),
            auth_server: DEFAULT_AUTH_SERVER.into(),
            download: DownloadSettings::default(),
            mirrors: MirrorSet::builtin_table(),
        }
    }
}

impl LauncherConfig {
    /// Read `path`; a missing file yields the defaults.
    pub async fn load(path: &Path) -> LauncherResult<Self> {
        match tokio::fs::read(path).await {
            Ok(raw) => {
                debug!("Loaded config from {:?}", path);
                Ok(serde_json::from_slice(&raw)?)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No config at {:?}, using defaults", path);
                Ok(Self::default())
            }
            Err(source) => Err(LauncherError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub async fn save(&self, path: &Path) -> LauncherResult<()> {
        let json = serde_json::to_vec_pretty(self)?;
        write_bytes(path, &json).await
    }

    /// Mirror table for `source`; sources missing from the file fall back to
    /// the built-in table.
    pub fn mirror(&self, source: Source) -> MirrorSet {
        self.mirrors
            .get(&source)
            .cloned()
            .unwrap_or_else(|| MirrorSet::builtin(source))
    }

    pub fn java_for(&self, major: u32) -> Option<&Path> {
        self.javaversions
            .get(&major.to_string())
            .map(PathBuf::as_path)
    }

    pub fn downloader(&self, fetcher: Arc<dyn Fetcher>) -> Downloader {
        Downloader::new(fetcher)
            .with_concurrency(self.download.concurrency)
            .with_request_delay(Duration::from_millis(self.download.request_delay_ms))
    }
}

fn default_base_dir() -> PathBuf {
    dirs::data_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// `<data dir>/mcmirror/config.json`.
pub fn default_config_path() -> PathBuf {
    default_base_dir().join(APP_DIR_NAME).join(CONFIG_FILE_NAME)
}

/// `<data dir>/mcmirror/.minecraft`.
pub fn default_mc_dir() -> PathBuf {
    default_base_dir().join(APP_DIR_NAME).join(".minecraft")
}
