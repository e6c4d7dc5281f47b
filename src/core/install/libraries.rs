// ─── Library Installer ───
// Rule-gated library downloads feeding the classpath.

use std::path::Path;

use tracing::{debug, info};

use crate::core::downloader::{join_relative, DownloadEntry, Downloader};
use crate::core::error::LauncherResult;
use crate::core::launch::Classpath;
use crate::core::source::{ArtifactKind, MirrorSet};
use crate::core::version::{include_library, RuntimeContext, VersionJson};

/// Select the libraries that apply to `ctx`, in descriptor order.
///
/// Excluded libraries and libraries without a complete artifact contribute
/// nothing. URLs are rewritten through `mirror`.
pub fn plan_libraries(
    descriptor: &VersionJson,
    mirror: &MirrorSet,
    ctx: &RuntimeContext,
    libraries_dir: &Path,
) -> LauncherResult<Vec<DownloadEntry>> {
    let mut planned = Vec::new();

    for lib in &descriptor.libraries {
        if !include_library(lib.rules(), ctx) {
            debug!("Skipping library (rules): {}", lib.display_name());
            continue;
        }
        let Some(artifact) = lib.artifact() else {
            debug!("Skipping library (no artifact): {}", lib.display_name());
            continue;
        };

        planned.push(DownloadEntry::sha1(
            mirror.rewrite(ArtifactKind::Library, artifact.url),
            join_relative(libraries_dir, artifact.path)?,
            artifact.sha1,
        ));
    }

    Ok(planned)
}

/// Download the selected libraries and return them as a classpath.
///
/// Downloads may finish in any order; the classpath follows the plan.
pub async fn install_libraries(
    downloader: &Downloader,
    descriptor: &VersionJson,
    mirror: &MirrorSet,
    ctx: &RuntimeContext,
    libraries_dir: &Path,
) -> LauncherResult<Classpath> {
    let planned = plan_libraries(descriptor, mirror, ctx, libraries_dir)?;
    let classpath = Classpath::new(planned.iter().map(|entry| entry.dest.clone()));

    info!(
        "Installing {} of {} libraries for {}",
        planned.len(),
        descriptor.libraries.len(),
        descriptor.id
    );
    downloader.download_batch(planned).await?;

    Ok(classpath)
}
