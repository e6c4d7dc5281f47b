// ─── Version File ───
// Typed view of a per-version descriptor document.

use serde::{Deserialize, Serialize};

use crate::core::error::{LauncherError, LauncherResult};

use super::rules::Rule;

/// Java runtime assumed by descriptors that predate the `javaVersion` field.
const LEGACY_JAVA_MAJOR: u32 = 8;

/// JVM arguments used when a descriptor only carries `minecraftArguments`.
const LEGACY_JVM_ARGS: [&str; 3] = [
    "-Djava.library.path=${natives_directory}",
    "-cp",
    "${classpath}",
];

/// A fully parsed version descriptor.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionJson {
    pub id: String,
    #[serde(rename = "type", default)]
    pub version_type: String,
    pub main_class: String,
    #[serde(default)]
    pub libraries: Vec<LibraryEntry>,
    #[serde(default)]
    pub downloads: Option<VersionDownloads>,
    #[serde(default)]
    pub asset_index: Option<AssetIndexInfo>,
    #[serde(default)]
    pub arguments: Option<Arguments>,
    /// Legacy `minecraftArguments` field (pre-1.13).
    #[serde(default)]
    pub minecraft_arguments: Option<String>,
    #[serde(default)]
    pub java_version: Option<JavaVersionInfo>,
    #[serde(default)]
    pub compliance_level: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaVersionInfo {
    pub major_version: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionDownloads {
    pub client: Option<DownloadArtifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadArtifact {
    pub sha1: String,
    #[serde(default)]
    pub size: Option<u64>,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetIndexInfo {
    pub id: String,
    pub url: String,
    pub sha1: String,
    #[serde(default)]
    pub total_size: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Arguments {
    #[serde(default)]
    pub game: Vec<ArgumentEntry>,
    #[serde(default)]
    pub jvm: Vec<ArgumentEntry>,
}

/// One element of `arguments.game` / `arguments.jvm`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgumentEntry {
    Literal(String),
    Conditional {
        #[serde(default)]
        rules: Vec<Rule>,
        value: ArgumentValue,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgumentValue {
    Single(String),
    Many(Vec<String>),
}

// ─── Library Entry ───

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub downloads: Option<LibraryDownloads>,
    #[serde(default)]
    pub rules: Option<Vec<Rule>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryDownloads {
    #[serde(default)]
    pub artifact: Option<LibDownloadArtifact>,
}

/// Every field is optional in the wild; an artifact missing any of
/// path, url or sha1 is not downloadable.
#[derive(Debug, Clone, Deserialize)]
pub struct LibDownloadArtifact {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
}

/// The downloadable part of a library: all three fields present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact<'a> {
    pub path: &'a str,
    pub url: &'a str,
    pub sha1: &'a str,
}

impl LibraryEntry {
    pub fn rules(&self) -> Option<&[Rule]> {
        self.rules.as_deref()
    }

    pub fn artifact(&self) -> Option<ResolvedArtifact<'_>> {
        let artifact = self.downloads.as_ref()?.artifact.as_ref()?;
        Some(ResolvedArtifact {
            path: artifact.path.as_deref()?,
            url: artifact.url.as_deref()?,
            sha1: artifact.sha1.as_deref()?,
        })
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

impl VersionJson {
    /// Parse a descriptor, reporting shape violations by JSON path.
    pub fn from_slice(bytes: &[u8]) -> LauncherResult<Self> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        Self::check_shape(&value)?;
        Ok(serde_json::from_value(value)?)
    }

    fn check_shape(value: &serde_json::Value) -> LauncherResult<()> {
        if !value.is_object() {
            return Err(LauncherError::NotObject { path: "$".into() });
        }
        expect_array_if_present(value, "libraries")?;
        expect_object_if_present(value, "downloads")?;
        expect_object_if_present(value, "assetIndex")?;

        for (i, library) in array_items(value, "libraries") {
            let path = format!("libraries[{i}]");
            if !library.is_object() {
                return Err(LauncherError::NotObject { path });
            }
            check_rules(library, &path)?;
        }

        if let Some(arguments) = value.get("arguments") {
            if !arguments.is_object() {
                return Err(LauncherError::NotObject {
                    path: "arguments".into(),
                });
            }
            for list in ["game", "jvm"] {
                if arguments.get(list).is_some_and(|v| !v.is_array()) {
                    return Err(LauncherError::NotArray {
                        path: format!("arguments.{list}"),
                    });
                }
                for (i, entry) in array_items(arguments, list) {
                    check_argument_entry(entry, &format!("arguments.{list}[{i}]"))?;
                }
            }
        }
        Ok(())
    }

    /// Get the required Java major version from the version JSON.
    pub fn required_java_major(&self) -> u32 {
        self.java_version
            .as_ref()
            .map(|j| j.major_version)
            .unwrap_or(LEGACY_JAVA_MAJOR)
    }

    pub fn client_download(&self) -> LauncherResult<&DownloadArtifact> {
        self.downloads
            .as_ref()
            .and_then(|d| d.client.as_ref())
            .ok_or_else(|| LauncherError::NotObject {
                path: "downloads.client".into(),
            })
    }

    pub fn asset_index(&self) -> LauncherResult<&AssetIndexInfo> {
        self.asset_index
            .as_ref()
            .ok_or_else(|| LauncherError::NotObject {
                path: "assetIndex".into(),
            })
    }

    /// Game argument entries, falling back to the legacy space-separated form.
    pub fn game_argument_entries(&self) -> Vec<ArgumentEntry> {
        match &self.arguments {
            Some(args) => args.game.clone(),
            None => self
                .minecraft_arguments
                .as_deref()
                .unwrap_or_default()
                .split_whitespace()
                .map(|s| ArgumentEntry::Literal(s.to_string()))
                .collect(),
        }
    }

    /// JVM argument entries; legacy descriptors get the minimal classpath set.
    pub fn jvm_argument_entries(&self) -> Vec<ArgumentEntry> {
        match &self.arguments {
            Some(args) => args.jvm.clone(),
            None => LEGACY_JVM_ARGS
                .iter()
                .map(|s| ArgumentEntry::Literal(s.to_string()))
                .collect(),
        }
    }
}

fn array_items<'a>(
    value: &'a serde_json::Value,
    key: &str,
) -> impl Iterator<Item = (usize, &'a serde_json::Value)> {
    value
        .get(key)
        .and_then(|v| v.as_array())
        .into_iter()
        .flatten()
        .enumerate()
}

/// A bare string, or an object whose `value` is a string or a list of strings.
fn check_argument_entry(entry: &serde_json::Value, path: &str) -> LauncherResult<()> {
    if entry.is_string() {
        return Ok(());
    }
    if !entry.is_object() {
        return Err(LauncherError::NotObject { path: path.into() });
    }
    check_rules(entry, path)?;

    let value_path = format!("{path}.value");
    match entry.get("value") {
        Some(serde_json::Value::String(_)) => Ok(()),
        Some(serde_json::Value::Array(items)) => {
            match items.iter().position(|item| !item.is_string()) {
                Some(j) => Err(LauncherError::NotArray {
                    path: format!("{value_path}[{j}]"),
                }),
                None => Ok(()),
            }
        }
        _ => Err(LauncherError::NotArray { path: value_path }),
    }
}

/// `rules`, when present, is a list of objects.
fn check_rules(owner: &serde_json::Value, path: &str) -> LauncherResult<()> {
    match owner.get("rules") {
        None => Ok(()),
        Some(serde_json::Value::Array(rules)) => {
            match rules.iter().position(|rule| !rule.is_object()) {
                Some(j) => Err(LauncherError::NotObject {
                    path: format!("{path}.rules[{j}]"),
                }),
                None => Ok(()),
            }
        }
        Some(_) => Err(LauncherError::NotArray {
            path: format!("{path}.rules"),
        }),
    }
}

fn expect_array_if_present(value: &serde_json::Value, key: &str) -> LauncherResult<()> {
    match value.get(key) {
        Some(v) if !v.is_array() => Err(LauncherError::NotArray { path: key.into() }),
        _ => Ok(()),
    }
}

fn expect_object_if_present(value: &serde_json::Value, key: &str) -> LauncherResult<()> {
    match value.get(key) {
        Some(v) if !v.is_object() => Err(LauncherError::NotObject { path: key.into() }),
        _ => Ok(()),
    }
}
