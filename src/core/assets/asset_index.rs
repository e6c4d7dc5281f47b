use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::core::downloader::{join_relative, DownloadEntry, Downloader, HashAlgorithm};
use crate::core::error::{IoContext, LauncherError, LauncherResult};
use crate::core::source::{asset_object_url, ArtifactKind, MirrorSet};
use crate::core::version::AssetIndexInfo;

/// Manages Minecraft asset downloads (sounds, textures referenced by asset index).
pub struct AssetManager;

/// Top-level asset index JSON structure.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetIndex {
    pub objects: BTreeMap<String, AssetObject>,
    /// Pre-1.7 layout: objects are also copied under `virtual/legacy`.
    #[serde(default)]
    pub map_to_resources: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetObject {
    pub hash: String,
    #[serde(default)]
    pub size: u64,
}

impl AssetObject {
    /// `<hash[0:2]>/<hash>` relative to the objects directory.
    pub fn relative_path(&self) -> PathBuf {
        let prefix = self.hash.get(..2).unwrap_or(&self.hash);
        Path::new(prefix).join(&self.hash)
    }
}

impl AssetIndex {
    pub fn from_slice(bytes: &[u8]) -> LauncherResult<Self> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        if !value.get("objects").is_some_and(|v| v.is_object()) {
            return Err(LauncherError::NotObject {
                path: "objects".into(),
            });
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn total_size(&self) -> u64 {
        self.objects.values().map(|o| o.size).sum()
    }
}

impl AssetManager {
    /// Download the asset index JSON to `assets/indexes/<id>.json`.
    ///
    /// Returns the raw verified document.
    pub async fn fetch_index(
        downloader: &Downloader,
        mirror: &MirrorSet,
        info: &AssetIndexInfo,
        assets_dir: &Path,
    ) -> LauncherResult<Vec<u8>> {
        let url = mirror.rewrite(ArtifactKind::AssetIndex, &info.url);
        let dest = assets_dir.join("indexes").join(format!("{}.json", info.id));
        info!("Fetching asset index {} from {}", info.id, url);

        downloader
            .download_json(&url, HashAlgorithm::Sha1, &info.sha1, &dest)
            .await
    }

    /// Download every object referenced by `index_json`.
    ///
    /// The objects directory is removed first, so this is a full resync: any
    /// object not in the index is gone afterwards and every object is fetched
    /// again. Returns the number of distinct objects written.
    pub async fn install_objects(
        downloader: &Downloader,
        mirror: &MirrorSet,
        index_json: &[u8],
        assets_dir: &Path,
    ) -> LauncherResult<usize> {
        let index = AssetIndex::from_slice(index_json)?;

        let objects_dir = assets_dir.join("objects");
        match tokio::fs::remove_dir_all(&objects_dir).await {
            Ok(()) => debug!("Cleared {:?}", objects_dir),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(LauncherError::Io {
                    path: objects_dir,
                    source,
                })
            }
        }

        let entries: Vec<DownloadEntry> = index
            .objects
            .values()
            .map(|obj| {
                DownloadEntry::sha1(
                    mirror.rewrite(ArtifactKind::AssetObject, &asset_object_url(&obj.hash)),
                    objects_dir.join(obj.relative_path()),
                    obj.hash.clone(),
                )
            })
            .collect();
        let distinct = entries
            .iter()
            .map(|e| &e.dest)
            .collect::<std::collections::HashSet<_>>()
            .len();

        info!(
            "Downloading {} asset objects ({} logical paths, {} bytes)",
            distinct,
            index.objects.len(),
            index.total_size()
        );
        downloader.download_batch(entries).await?;

        if index.map_to_resources {
            Self::copy_to_legacy(&index, &objects_dir, assets_dir).await?;
        }

        Ok(distinct)
    }

    /// Mirror objects under `virtual/legacy/<logical path>` for old clients.
    async fn copy_to_legacy(
        index: &AssetIndex,
        objects_dir: &Path,
        assets_dir: &Path,
    ) -> LauncherResult<()> {
        let legacy_dir = assets_dir.join("virtual").join("legacy");
        for (name, obj) in &index.objects {
            let source = objects_dir.join(obj.relative_path());
            let dest = join_relative(&legacy_dir, name)?;
            if let Some(parent) = dest.parent() {
                tokio::fs::create_dir_all(parent).await.at_path(parent)?;
            }
            tokio::fs::copy(&source, &dest).await.at_path(&dest)?;
        }
        info!("Mapped {} assets to {:?}", index.objects.len(), legacy_dir);
        Ok(())
    }
}
