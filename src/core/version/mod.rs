pub mod manifest;
pub mod resolver;
pub mod rules;
pub mod version_file;

pub use manifest::{VersionEntry, VersionManifest};
pub use resolver::{resolve_version, ResolvedVersion};
pub use rules::{include_argument, include_library, Rule, RuleAction, RuntimeContext};
pub use version_file::{
    ArgumentEntry, ArgumentValue, AssetIndexInfo, LibraryEntry, VersionJson,
};
