// ─── Classpath ───
// Ordered jar list accumulated by the installer and joined once at launch.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Platform-specific Java classpath separator.
pub fn get_classpath_separator() -> &'static str {
    if cfg!(target_os = "windows") {
        ";"
    } else {
        ":"
    }
}

/// Immutable, ordered classpath. Appending returns a new value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Classpath {
    entries: Vec<PathBuf>,
}

impl Classpath {
    /// Build from entries in iteration order; later duplicates are dropped.
    pub fn new(entries: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut entries: Vec<PathBuf> = entries.into_iter().collect();
        dedup_preserving_order(&mut entries);
        Self { entries }
    }

    pub fn with(&self, path: impl Into<PathBuf>) -> Self {
        Self::new(self.entries.iter().cloned().chain(Some(path.into())))
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Join with the platform separator.
    pub fn join(&self) -> String {
        self.join_with(get_classpath_separator())
    }

    pub fn join_with(&self, separator: &str) -> String {
        self.entries
            .iter()
            .map(|p| p.to_string_lossy())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

fn dedup_preserving_order(entries: &mut Vec<PathBuf>) {
    let mut seen = std::collections::HashSet::new();
    entries.retain(|entry| {
        let key = if cfg!(target_os = "windows") {
            entry.to_string_lossy().to_lowercase()
        } else {
            entry.to_string_lossy().into_owned()
        };
        seen.insert(key)
    });
}

/// Convert path to string, stripping the `\\?\` prefix on Windows.
pub fn safe_path_str(path: &Path) -> String {
    let text = path.to_string_lossy().to_string();

    #[cfg(target_os = "windows")]
    {
        // Java fails to load jars from extended-length paths.
        if let Some(stripped) = text.strip_prefix(r"\\?\") {
            return stripped.to_string();
        }
    }

    text
}
