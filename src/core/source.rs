// ─── Download Sources ───
// Maps canonical upstream hosts onto mirror hosts, per artifact kind.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::LauncherError;

/// Where artifacts are downloaded from. Fixed for the whole install session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Mojang,
    Bmclapi,
    Mcbbs,
}

impl Default for Source {
    fn default() -> Self {
        Source::Mojang
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Mojang => write!(f, "mojang"),
            Source::Bmclapi => write!(f, "bmclapi"),
            Source::Mcbbs => write!(f, "mcbbs"),
        }
    }
}

impl FromStr for Source {
    type Err = LauncherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mojang" => Ok(Source::Mojang),
            "bmclapi" => Ok(Source::Bmclapi),
            "mcbbs" => Ok(Source::Mcbbs),
            other => Err(LauncherError::InvalidSource(other.to_string())),
        }
    }
}

/// The kind of artifact a URL points at. Each kind has its own host table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Manifest,
    Version,
    Library,
    Client,
    AssetIndex,
    AssetObject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRewrite {
    pub from: String,
    pub to: String,
}

impl HostRewrite {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Entry point and host substitutions for one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorSet {
    pub manifest_url: String,
    #[serde(default)]
    pub rewrites: BTreeMap<ArtifactKind, Vec<HostRewrite>>,
}

pub const MOJANG_MANIFEST_URL: &str =
    "http://launchermeta.mojang.com/mc/game/version_manifest_v2.json";
pub const MOJANG_RESOURCES_URL: &str = "https://resources.download.minecraft.net";

const MOJANG_META_HOSTS: [&str; 3] = [
    "https://piston-meta.mojang.com",
    "https://launchermeta.mojang.com",
    "https://launcher.mojang.com",
];
const MOJANG_DATA_HOSTS: [&str; 3] = [
    "https://piston-data.mojang.com",
    "https://launchermeta.mojang.com",
    "https://launcher.mojang.com",
];
const MOJANG_LIBRARIES_HOST: &str = "https://libraries.minecraft.net";

impl MirrorSet {
    /// Upstream Mojang: no rewriting at all.
    pub fn official() -> Self {
        Self {
            manifest_url: MOJANG_MANIFEST_URL.into(),
            rewrites: BTreeMap::new(),
        }
    }

    /// A mirror that serves every metadata and data host from `root`, maven
    /// content from `<root>/maven` and asset objects from `<root>/assets`.
    pub fn mirror_of(root: &str) -> Self {
        let meta: Vec<HostRewrite> = MOJANG_META_HOSTS
            .iter()
            .map(|host| HostRewrite::new(host, root))
            .collect();
        let data: Vec<HostRewrite> = MOJANG_DATA_HOSTS
            .iter()
            .map(|host| HostRewrite::new(host, root))
            .collect();

        let mut rewrites = BTreeMap::new();
        rewrites.insert(ArtifactKind::Manifest, meta.clone());
        rewrites.insert(ArtifactKind::Version, meta.clone());
        rewrites.insert(ArtifactKind::AssetIndex, meta);
        rewrites.insert(ArtifactKind::Client, data);
        rewrites.insert(
            ArtifactKind::Library,
            vec![HostRewrite::new(
                MOJANG_LIBRARIES_HOST,
                &format!("{root}/maven"),
            )],
        );
        rewrites.insert(
            ArtifactKind::AssetObject,
            vec![HostRewrite::new(
                MOJANG_RESOURCES_URL,
                &format!("{root}/assets"),
            )],
        );

        Self {
            manifest_url: format!("{root}/mc/game/version_manifest_v2.json"),
            rewrites,
        }
    }

    pub fn builtin(source: Source) -> Self {
        match source {
            Source::Mojang => Self::official(),
            Source::Bmclapi => Self::mirror_of("https://bmclapi2.bangbang93.com"),
            Source::Mcbbs => Self::mirror_of("https://download.mcbbs.net"),
        }
    }

    pub fn builtin_table() -> BTreeMap<Source, MirrorSet> {
        [Source::Mojang, Source::Bmclapi, Source::Mcbbs]
            .into_iter()
            .map(|source| (source, Self::builtin(source)))
            .collect()
    }

    /// Replace the longest matching canonical host prefix of `url`.
    ///
    /// Only a prefix is replaced; the rest of the URL is kept verbatim. URLs
    /// that match no prefix (including already-mirrored ones) pass through.
    pub fn rewrite(&self, kind: ArtifactKind, url: &str) -> String {
        let Some(table) = self.rewrites.get(&kind) else {
            return url.to_string();
        };

        let best = table
            .iter()
            .filter(|rule| !rule.from.is_empty() && url.starts_with(rule.from.as_str()))
            .max_by_key(|rule| rule.from.len());

        match best {
            Some(rule) => format!("{}{}", rule.to, &url[rule.from.len()..]),
            None => url.to_string(),
        }
    }
}

/// Canonical URL of a content-addressed asset object.
pub fn asset_object_url(hash: &str) -> String {
    let prefix = hash.get(..2).unwrap_or(hash);
    format!("{MOJANG_RESOURCES_URL}/{prefix}/{hash}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_URLS: [(ArtifactKind, &str); 6] = [
        (
            ArtifactKind::Version,
            "https://piston-meta.mojang.com/v1/packages/abc/1.20.json",
        ),
        (
            ArtifactKind::Client,
            "https://piston-data.mojang.com/v1/objects/def/client.jar",
        ),
        (
            ArtifactKind::Library,
            "https://libraries.minecraft.net/com/mojang/brigadier/1.0.18/brigadier-1.0.18.jar",
        ),
        (
            ArtifactKind::AssetObject,
            "https://resources.download.minecraft.net/ab/abcd1234",
        ),
        (
            ArtifactKind::AssetIndex,
            "https://launchermeta.mojang.com/v1/packages/1/5.json",
        ),
        (ArtifactKind::Library, "https://maven.fabricmc.net/a/b.jar"),
    ];

    #[test]
    fn official_source_is_identity() {
        let official = MirrorSet::official();
        for (kind, url) in SAMPLE_URLS {
            assert_eq!(official.rewrite(kind, url), url);
        }
    }

    #[test]
    fn bmclapi_rewrites_each_kind() {
        let mirror = MirrorSet::builtin(Source::Bmclapi);
        assert_eq!(
            mirror.rewrite(ArtifactKind::Version, SAMPLE_URLS[0].1),
            "https://bmclapi2.bangbang93.com/v1/packages/abc/1.20.json"
        );
        assert_eq!(
            mirror.rewrite(ArtifactKind::Client, SAMPLE_URLS[1].1),
            "https://bmclapi2.bangbang93.com/v1/objects/def/client.jar"
        );
        assert_eq!(
            mirror.rewrite(ArtifactKind::Library, SAMPLE_URLS[2].1),
            "https://bmclapi2.bangbang93.com/maven/com/mojang/brigadier/1.0.18/brigadier-1.0.18.jar"
        );
        assert_eq!(
            mirror.rewrite(ArtifactKind::AssetObject, SAMPLE_URLS[3].1),
            "https://bmclapi2.bangbang93.com/assets/ab/abcd1234"
        );
    }

    #[test]
    fn rewrite_is_idempotent() {
        for source in [Source::Mojang, Source::Bmclapi, Source::Mcbbs] {
            let mirror = MirrorSet::builtin(source);
            for (kind, url) in SAMPLE_URLS {
                let once = mirror.rewrite(kind, url);
                assert_eq!(mirror.rewrite(kind, &once), once, "{source} {url}");
            }
        }
    }

    #[test]
    fn longest_prefix_wins() {
        let mut mirror = MirrorSet::official();
        mirror.rewrites.insert(
            ArtifactKind::Library,
            vec![
                HostRewrite::new("https://libs.example", "https://short"),
                HostRewrite::new("https://libs.example/special", "https://long"),
            ],
        );
        assert_eq!(
            mirror.rewrite(ArtifactKind::Library, "https://libs.example/special/a.jar"),
            "https://long/a.jar"
        );
        assert_eq!(
            mirror.rewrite(ArtifactKind::Library, "https://libs.example/other/a.jar"),
            "https://short/other/a.jar"
        );
    }

    #[test]
    fn host_in_the_middle_is_not_rewritten() {
        let mirror = MirrorSet::builtin(Source::Mcbbs);
        let url = "https://proxy.example/?u=https://libraries.minecraft.net/a.jar";
        assert_eq!(mirror.rewrite(ArtifactKind::Library, url), url);
    }

    #[test]
    fn source_parses_case_insensitively() {
        assert_eq!("BMCLAPI".parse::<Source>().unwrap(), Source::Bmclapi);
        assert_eq!("mcbbs".parse::<Source>().unwrap(), Source::Mcbbs);
        assert!(matches!(
            "nope".parse::<Source>(),
            Err(LauncherError::InvalidSource(_))
        ));
    }

    #[test]
    fn asset_object_url_uses_two_char_prefix() {
        assert_eq!(
            asset_object_url("abcd1234"),
            "https://resources.download.minecraft.net/ab/abcd1234"
        );
    }
}
