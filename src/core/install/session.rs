// ─── Installation Session ───
// One install of one version from one source into one directory.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::assets::AssetManager;
use crate::core::downloader::{write_bytes, Downloader, HashAlgorithm};
use crate::core::error::{IoContext, LauncherResult};
use crate::core::launch::Classpath;
use crate::core::source::{ArtifactKind, MirrorSet, Source};
use crate::core::version::{resolve_version, ResolvedVersion, RuntimeContext, VersionJson};

use super::libraries::install_libraries;

const REPORT_FILE_NAME: &str = "install.json";

/// Result object persisted after a full install.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallReport {
    pub version_id: String,
    pub source: Source,
    pub mc_dir: PathBuf,
    pub classpath: Classpath,
    pub asset_objects: usize,
    pub installed_at: DateTime<Utc>,
}

impl InstallReport {
    pub async fn load(path: &Path) -> LauncherResult<Self> {
        let raw = tokio::fs::read(path).await.at_path(path)?;
        Ok(serde_json::from_slice(&raw)?)
    }

    pub async fn save(&self, path: &Path) -> LauncherResult<()> {
        let json = serde_json::to_vec_pretty(self)?;
        write_bytes(path, &json).await
    }
}

/// Owns the source, install root and descriptor for the length of an install.
/// The source and descriptor are fixed once the session exists.
pub struct InstallationSession<'a> {
    downloader: &'a Downloader,
    source: Source,
    mirror: MirrorSet,
    mc_dir: PathBuf,
    context: RuntimeContext,
    resolved: ResolvedVersion,
}

impl<'a> InstallationSession<'a> {
    /// Resolve `version_id` and open a session around its descriptor.
    pub async fn resolve(
        downloader: &'a Downloader,
        source: Source,
        mirror: MirrorSet,
        mc_dir: &Path,
        version_id: &str,
        context: RuntimeContext,
    ) -> LauncherResult<Self> {
        let mc_dir = absolute_dir(mc_dir)?;
        info!(
            "Resolving {} from {} into {:?}",
            version_id, source, mc_dir
        );
        let resolved = resolve_version(downloader, &mirror, &mc_dir, version_id).await?;

        Ok(Self {
            downloader,
            source,
            mirror,
            mc_dir,
            context,
            resolved,
        })
    }

    pub fn descriptor(&self) -> &VersionJson {
        &self.resolved.descriptor
    }

    /// Manifest id; every path under `versions/` is named after it.
    pub fn version_id(&self) -> &str {
        &self.resolved.entry.id
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn context(&self) -> &RuntimeContext {
        &self.context
    }

    // ── Layout ──────────────────────────────────────────

    pub fn mc_dir(&self) -> &Path {
        &self.mc_dir
    }

    pub fn version_dir(&self) -> PathBuf {
        self.mc_dir.join("versions").join(self.version_id())
    }

    pub fn libraries_dir(&self) -> PathBuf {
        self.mc_dir.join("libraries")
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.mc_dir.join("assets")
    }

    pub fn natives_dir(&self) -> PathBuf {
        self.version_dir().join("natives")
    }

    pub fn client_jar_path(&self) -> PathBuf {
        self.version_dir()
            .join(format!("{}.jar", self.version_id()))
    }

    pub fn report_path(&self) -> PathBuf {
        self.version_dir().join(REPORT_FILE_NAME)
    }

    // ── Steps ───────────────────────────────────────────

    pub async fn install_libraries(&self) -> LauncherResult<Classpath> {
        install_libraries(
            self.downloader,
            self.descriptor(),
            &self.mirror,
            &self.context,
            &self.libraries_dir(),
        )
        .await
    }

    /// Download the client jar to `versions/<id>/<id>.jar`.
    pub async fn install_client(&self) -> LauncherResult<PathBuf> {
        let client = self.descriptor().client_download()?;
        let url = self.mirror.rewrite(ArtifactKind::Client, &client.url);
        let dest = self.client_jar_path();

        info!("Installing client jar for {}", self.version_id());
        self.downloader
            .download_file(&url, HashAlgorithm::Sha1, &client.sha1, &dest)
            .await?;
        Ok(dest)
    }

    pub async fn fetch_asset_index(&self) -> LauncherResult<Vec<u8>> {
        let info = self.descriptor().asset_index()?;
        AssetManager::fetch_index(self.downloader, &self.mirror, info, &self.assets_dir()).await
    }

    /// Full resync of the asset objects; see [`AssetManager::install_objects`].
    pub async fn install_assets(&self, index_json: &[u8]) -> LauncherResult<usize> {
        AssetManager::install_objects(self.downloader, &self.mirror, index_json, &self.assets_dir())
            .await
    }

    /// Libraries, client jar and assets, then the install report.
    ///
    /// The returned classpath ends with the client jar. The first failing step
    /// aborts the install.
    pub async fn install_all(&self) -> LauncherResult<InstallReport> {
        let libraries = self.install_libraries().await?;
        let client_jar = self.install_client().await?;
        let index_json = self.fetch_asset_index().await?;
        let asset_objects = self.install_assets(&index_json).await?;

        let natives_dir = self.natives_dir();
        tokio::fs::create_dir_all(&natives_dir)
            .await
            .at_path(&natives_dir)?;

        let report = InstallReport {
            version_id: self.version_id().to_string(),
            source: self.source,
            mc_dir: self.mc_dir.clone(),
            classpath: libraries.with(client_jar),
            asset_objects,
            installed_at: Utc::now(),
        };
        report.save(&self.report_path()).await?;

        info!(
            "Installed {} ({} classpath entries, {} asset objects)",
            report.version_id,
            report.classpath.len(),
            report.asset_objects
        );
        Ok(report)
    }
}

fn absolute_dir(dir: &Path) -> LauncherResult<PathBuf> {
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }
    let cwd = std::env::current_dir().at_path(dir)?;
    Ok(cwd.join(dir))
}
