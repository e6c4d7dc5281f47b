// ─── Resolver ───
// Manifest lookup followed by a hash-verified descriptor download.

use std::path::Path;

use tracing::info;

use crate::core::downloader::{pretty_json, write_bytes, Downloader, HashAlgorithm};
use crate::core::error::{IoContext, LauncherResult};
use crate::core::source::{ArtifactKind, MirrorSet};

use super::manifest::{VersionEntry, VersionManifest};
use super::version_file::VersionJson;

pub const MANIFEST_FILE_NAME: &str = "version_manifest_v2.json";

/// A descriptor together with the manifest entry it was resolved from.
#[derive(Debug, Clone)]
pub struct ResolvedVersion {
    pub entry: VersionEntry,
    pub descriptor: VersionJson,
}

/// Resolve `version_id` through `mirror` into `<mc_dir>/versions/<id>/<id>.json`.
///
/// Side effects: creates `mc_dir`, `versions/` and `versions/<id>/`, writes the
/// manifest to `versions/version_manifest_v2.json`. The descriptor is written
/// only after its SHA-1 matches the manifest entry.
pub async fn resolve_version(
    downloader: &Downloader,
    mirror: &MirrorSet,
    mc_dir: &Path,
    version_id: &str,
) -> LauncherResult<ResolvedVersion> {
    let versions_dir = mc_dir.join("versions");
    tokio::fs::create_dir_all(&versions_dir)
        .await
        .at_path(&versions_dir)?;

    let (manifest, raw_manifest) =
        VersionManifest::fetch(downloader.fetcher(), &mirror.manifest_url).await?;
    write_bytes(
        &versions_dir.join(MANIFEST_FILE_NAME),
        &pretty_json(&raw_manifest)?,
    )
    .await?;

    let entry = manifest.find_version(version_id)?.clone();
    info!("Found version {} ({})", entry.id, entry.version_type);

    let version_dir = versions_dir.join(&entry.id);
    tokio::fs::create_dir_all(&version_dir)
        .await
        .at_path(&version_dir)?;

    let url = mirror.rewrite(ArtifactKind::Version, &entry.url);
    let raw = downloader
        .download_json(
            &url,
            HashAlgorithm::Sha1,
            &entry.sha1,
            &version_dir.join(format!("{}.json", entry.id)),
        )
        .await?;
    let descriptor = VersionJson::from_slice(&raw)?;

    Ok(ResolvedVersion { entry, descriptor })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::error::LauncherError;
    use crate::core::source::{MirrorSet, Source};
    use crate::core::testing::{scratch_dir, sha1_hex, MemoryFetcher};

    const DESCRIPTOR: &str = r#"{"id":"1.20","type":"release","mainClass":"net.minecraft.client.main.Main"}"#;

    fn manifest_for(url: &str, sha1: &str) -> String {
        serde_json::json!({
            "latest": {"release": "1.20", "snapshot": "1.20"},
            "versions": [{"id": "1.20", "type": "release", "url": url, "sha1": sha1}]
        })
        .to_string()
    }

    #[tokio::test]
    async fn resolves_and_persists_descriptor() {
        let dir = scratch_dir("resolve-ok");
        let mirror = MirrorSet::official();
        let fetcher = Arc::new(MemoryFetcher::new());
        let url = "https://piston-meta.mojang.com/v1/packages/x/1.20.json";
        fetcher.serve(
            &mirror.manifest_url,
            manifest_for(url, &sha1_hex(DESCRIPTOR.as_bytes())),
        );
        fetcher.serve(url, DESCRIPTOR);

        let downloader = Downloader::new(fetcher);
        let resolved = resolve_version(&downloader, &mirror, &dir, "1.20")
            .await
            .unwrap();

        assert_eq!(resolved.descriptor.main_class, "net.minecraft.client.main.Main");
        assert!(dir.join("versions").join(MANIFEST_FILE_NAME).exists());
        let saved = std::fs::read_to_string(dir.join("versions/1.20/1.20.json")).unwrap();
        assert!(saved.contains("\n    \"mainClass\""));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn descriptor_url_goes_through_the_mirror() {
        let dir = scratch_dir("resolve-mirror");
        let mirror = MirrorSet::builtin(Source::Bmclapi);
        let fetcher = Arc::new(MemoryFetcher::new());
        fetcher.serve(
            &mirror.manifest_url,
            manifest_for(
                "https://piston-meta.mojang.com/v1/packages/x/1.20.json",
                &sha1_hex(DESCRIPTOR.as_bytes()),
            ),
        );
        fetcher.serve(
            "https://bmclapi2.bangbang93.com/v1/packages/x/1.20.json",
            DESCRIPTOR,
        );

        let downloader = Downloader::new(fetcher.clone());
        resolve_version(&downloader, &mirror, &dir, "1.20")
            .await
            .unwrap();

        assert_eq!(
            fetcher.requested(),
            vec![
                "https://bmclapi2.bangbang93.com/mc/game/version_manifest_v2.json".to_string(),
                "https://bmclapi2.bangbang93.com/v1/packages/x/1.20.json".to_string(),
            ]
        );
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn hash_mismatch_writes_no_descriptor() {
        let dir = scratch_dir("resolve-mismatch");
        let mirror = MirrorSet::official();
        let fetcher = Arc::new(MemoryFetcher::new());
        let url = "https://piston-meta.mojang.com/v1/packages/x/1.20.json";
        fetcher.serve(&mirror.manifest_url, manifest_for(url, &sha1_hex(b"other")));
        fetcher.serve(url, DESCRIPTOR);

        let downloader = Downloader::new(fetcher);
        let err = resolve_version(&downloader, &mirror, &dir, "1.20")
            .await
            .unwrap_err();

        assert!(matches!(err, LauncherError::HashMismatch { .. }));
        assert!(!dir.join("versions/1.20/1.20.json").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn missing_version_is_reported() {
        let dir = scratch_dir("resolve-missing");
        let mirror = MirrorSet::official();
        let fetcher = Arc::new(MemoryFetcher::new());
        fetcher.serve(&mirror.manifest_url, manifest_for("u", "h"));

        let downloader = Downloader::new(fetcher);
        let err = resolve_version(&downloader, &mirror, &dir, "1.7.10")
            .await
            .unwrap_err();

        assert!(matches!(err, LauncherError::VersionNotFound(id) if id == "1.7.10"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn manifest_without_version_list_is_rejected() {
        let dir = scratch_dir("resolve-notarray");
        let mirror = MirrorSet::official();
        let fetcher = Arc::new(MemoryFetcher::new());
        fetcher.serve(&mirror.manifest_url, r#"{"versions": "none"}"#);

        let downloader = Downloader::new(fetcher);
        let err = resolve_version(&downloader, &mirror, &dir, "1.20")
            .await
            .unwrap_err();

        assert!(matches!(err, LauncherError::NotArray { .. }));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
