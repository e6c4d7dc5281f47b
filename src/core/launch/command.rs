// ─── Launch Command ───
// Turns an installed version into a single java invocation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::core::auth::LaunchAccountProfile;
use crate::core::config::LauncherConfig;
use crate::core::downloader::write_bytes;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::version::{RuntimeContext, VersionJson};

use super::arguments::{collect_arguments, join_arguments, quoted, substitute};
use super::classpath::{safe_path_str, Classpath};

/// Asset index name used when a descriptor has none.
const LEGACY_ASSET_INDEX: &str = "legacy";

/// Everything synthesis reads besides configuration and the runtime context.
pub struct LaunchInputs<'a> {
    pub descriptor: &'a VersionJson,
    pub mc_dir: &'a Path,
    /// `versions/<id>/natives` as laid out by the installation session.
    pub natives_dir: &'a Path,
    /// Libraries followed by the client jar.
    pub classpath: &'a Classpath,
    pub account: &'a LaunchAccountProfile,
}

/// A ready-to-run invocation. Argument strings are already substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub java_path: PathBuf,
    pub jvm_args: String,
    pub main_class: String,
    pub game_args: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    Ready(LaunchCommand),
    /// No Java executable is configured for the required major version.
    /// Not an error: the caller decides how loudly to report it.
    MissingJava { major: u32 },
}

impl LaunchOutcome {
    /// Command line, or an empty string for the soft stop.
    pub fn command_line(&self) -> String {
        match self {
            LaunchOutcome::Ready(command) => command.command_line(),
            LaunchOutcome::MissingJava { .. } => String::new(),
        }
    }

    /// Turn the soft stop into `MissingJavaVersion` for callers that need a
    /// command.
    pub fn into_command(self) -> LauncherResult<LaunchCommand> {
        match self {
            LaunchOutcome::Ready(command) => Ok(command),
            LaunchOutcome::MissingJava { major } => Err(LauncherError::MissingJavaVersion(major)),
        }
    }
}

impl LaunchCommand {
    /// `"<java>" <jvm args> <main class> <game args>`
    pub fn command_line(&self) -> String {
        let java = quoted(&safe_path_str(&self.java_path));
        [
            java.as_str(),
            self.jvm_args.as_str(),
            self.main_class.as_str(),
            self.game_args.as_str(),
        ]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Batch file on Windows, POSIX shell script elsewhere.
    pub fn script_body(&self) -> String {
        if cfg!(target_os = "windows") {
            format!("@echo off\n{}\n", self.command_line())
        } else {
            format!("#!/bin/sh\n{}\n", self.command_line())
        }
    }

    pub async fn write_script(&self, path: &Path) -> LauncherResult<()> {
        write_bytes(path, self.script_body().as_bytes()).await?;

        #[cfg(unix)]
        {
            use crate::core::error::IoContext;
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
                .await
                .at_path(path)?;
        }

        info!("Wrote launch script to {:?}", path);
        Ok(())
    }
}

/// Build the launch command for an installed version.
///
/// Returns `MissingJava` without touching anything else when `config` has no
/// executable for the descriptor's Java major version.
pub fn synthesize(
    inputs: &LaunchInputs<'_>,
    config: &LauncherConfig,
    ctx: &RuntimeContext,
) -> LauncherResult<LaunchOutcome> {
    let descriptor = inputs.descriptor;
    let major = descriptor.required_java_major();
    let Some(java_path) = config.java_for(major) else {
        warn!("Required Java version {} not found in configuration", major);
        return Ok(LaunchOutcome::MissingJava { major });
    };

    if inputs.classpath.is_empty() {
        return Err(LauncherError::InvariantViolation(format!(
            "empty classpath for {}",
            descriptor.id
        )));
    }

    let game_tokens = collect_arguments(&descriptor.game_argument_entries(), ctx);
    let jvm_tokens = collect_arguments(&descriptor.jvm_argument_entries(), ctx);

    let game_args = substitute(
        &join_arguments(&game_tokens),
        &game_placeholders(inputs, config),
    );
    let jvm_args = substitute(
        &join_arguments(&jvm_tokens),
        &jvm_placeholders(inputs, config),
    );

    info!(
        "Synthesized launch for {} ({} jvm, {} game tokens, demo={})",
        descriptor.id,
        jvm_tokens.len(),
        game_tokens.len(),
        ctx.is_demo_user
    );

    Ok(LaunchOutcome::Ready(LaunchCommand {
        java_path: java_path.to_path_buf(),
        jvm_args,
        main_class: descriptor.main_class.clone(),
        game_args,
    }))
}

fn game_placeholders(inputs: &LaunchInputs<'_>, config: &LauncherConfig) -> BTreeMap<String, String> {
    let descriptor = inputs.descriptor;
    let account = inputs.account;
    let asset_index = descriptor
        .asset_index
        .as_ref()
        .map(|a| a.id.as_str())
        .unwrap_or(LEGACY_ASSET_INDEX);

    [
        ("${auth_player_name}", account.username.clone()),
        ("${version_name}", descriptor.id.clone()),
        ("${game_directory}", quoted(&safe_path_str(inputs.mc_dir))),
        (
            "${assets_root}",
            quoted(&safe_path_str(&inputs.mc_dir.join("assets"))),
        ),
        ("${assets_index_name}", asset_index.to_string()),
        ("${auth_uuid}", account.uuid.clone()),
        ("${auth_access_token}", account.access_token.clone()),
        ("${user_type}", account.user_type.clone()),
        ("${version_type}", descriptor.version_type.clone()),
        ("${resolution_width}", config.resolution.width.to_string()),
        ("${resolution_height}", config.resolution.height.to_string()),
        ("${clientid}", config.client_id.clone()),
        ("${auth_xuid}", config.auth_xuid.clone()),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value))
    .collect()
}

fn jvm_placeholders(inputs: &LaunchInputs<'_>, config: &LauncherConfig) -> BTreeMap<String, String> {
    [
        ("${natives_directory}", quoted(&safe_path_str(inputs.natives_dir))),
        ("${launcher_name}", config.launcher_name.clone()),
        ("${launcher_version}", config.launcher_version.clone()),
        ("${classpath}", quoted(&inputs.classpath.join())),
        ("-Dos.name=Windows 10", "-Dos.name=\"Windows 10\"".to_string()),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value))
    .collect()
}
