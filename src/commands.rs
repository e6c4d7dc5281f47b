use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::core::auth::{self, LaunchAccountProfile};
use crate::core::config::{default_config_path, default_mc_dir, LauncherConfig};
use crate::core::error::LauncherResult;
use crate::core::http::{Fetcher, HttpFetcher};
use crate::core::install::InstallationSession;
use crate::core::launch::{self, LaunchInputs, LaunchOutcome};
use crate::core::source::Source;
use crate::core::version::{RuntimeContext, VersionManifest};

/// Install and launch Minecraft versions through official or mirror sources.
#[derive(Parser, Debug)]
#[command(name = "mcmirror", version)]
pub struct Cli {
    /// Settings file (Java paths, mirrors, download pool)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List release versions from the manifest
    Versions(VersionsArgs),

    /// Download a version with its libraries, client jar and assets
    Install(InstallArgs),

    /// Install a version and print or write its launch script
    Launch(LaunchArgs),
}

#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Download source: mojang, bmclapi or mcbbs
    #[arg(long, default_value_t = Source::Mojang)]
    pub source: Source,
}

#[derive(Args, Debug)]
pub struct VersionsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Include snapshots and old versions
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Version id, e.g. 1.20.4
    pub version: String,

    /// Install root (the `.minecraft` directory)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Args, Debug)]
pub struct LaunchArgs {
    #[command(flatten)]
    pub install: InstallArgs,

    /// In-game player name
    #[arg(long)]
    pub player: String,

    /// Launch as a demo user
    #[arg(long)]
    pub demo: bool,

    /// Skip authentication
    #[arg(long, conflicts_with = "password")]
    pub offline: bool,

    /// Account login for the authentication server (defaults to the player name)
    #[arg(long, requires = "password")]
    pub username: Option<String>,

    #[arg(long)]
    pub password: Option<String>,

    /// Write the script here instead of printing it
    #[arg(long)]
    pub script: Option<PathBuf>,
}

pub async fn dispatch(cli: Cli) -> LauncherResult<()> {
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = LauncherConfig::load(&config_path).await?;
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new()?);

    match cli.command {
        Command::Versions(args) => list_versions(&config, fetcher, args).await,
        Command::Install(args) => install_version(&config, fetcher, args).await,
        Command::Launch(args) => launch_version(&config, fetcher, args).await,
    }
}

async fn list_versions(
    config: &LauncherConfig,
    fetcher: Arc<dyn Fetcher>,
    args: VersionsArgs,
) -> LauncherResult<()> {
    let mirror = config.mirror(args.source.source);
    let (manifest, _) = VersionManifest::fetch(fetcher.as_ref(), &mirror.manifest_url).await?;

    let ids: Vec<&str> = if args.all {
        manifest.versions.iter().map(|v| v.id.as_str()).collect()
    } else {
        manifest.releases().iter().map(|v| v.id.as_str()).collect()
    };
    for id in ids {
        println!("{id}");
    }
    Ok(())
}

async fn install_version(
    config: &LauncherConfig,
    fetcher: Arc<dyn Fetcher>,
    args: InstallArgs,
) -> LauncherResult<()> {
    let downloader = config.downloader(fetcher);
    let source = args.source.source;
    let mc_dir = args.dir.unwrap_or_else(default_mc_dir);

    let session = InstallationSession::resolve(
        &downloader,
        source,
        config.mirror(source),
        &mc_dir,
        &args.version,
        RuntimeContext::current(false),
    )
    .await?;
    let report = session.install_all().await?;

    println!(
        "Installed {} into {} ({} classpath entries)",
        report.version_id,
        report.mc_dir.display(),
        report.classpath.len()
    );
    Ok(())
}

async fn launch_version(
    config: &LauncherConfig,
    fetcher: Arc<dyn Fetcher>,
    args: LaunchArgs,
) -> LauncherResult<()> {
    let downloader = config.downloader(fetcher.clone());
    let source = args.install.source.source;
    let mc_dir = args.install.dir.unwrap_or_else(default_mc_dir);
    let context = RuntimeContext::current(args.demo);

    let session = InstallationSession::resolve(
        &downloader,
        source,
        config.mirror(source),
        &mc_dir,
        &args.install.version,
        context.clone(),
    )
    .await?;
    let report = session.install_all().await?;

    let account = match (&args.password, args.offline) {
        (Some(password), false) => {
            let login = args.username.as_deref().unwrap_or(&args.player);
            auth::authenticate(
                fetcher.as_ref(),
                &config.auth_server,
                login,
                password,
                &args.player,
                session.descriptor().compliance_level.unwrap_or(1),
            )
            .await?
        }
        _ => {
            info!("Launching {} offline", args.player);
            LaunchAccountProfile::offline(&args.player)
        }
    };

    let natives_dir = session.natives_dir();
    let inputs = LaunchInputs {
        descriptor: session.descriptor(),
        mc_dir: session.mc_dir(),
        natives_dir: &natives_dir,
        classpath: &report.classpath,
        account: &account,
    };

    match launch::synthesize(&inputs, config, &context)? {
        LaunchOutcome::Ready(command) => match &args.script {
            Some(path) => {
                command.write_script(path).await?;
                println!("Launch script written to {}", path.display());
            }
            None => println!("{}", command.script_body()),
        },
        LaunchOutcome::MissingJava { major } => {
            eprintln!("Required Java version {major} not found: add it to `javaversions`");
        }
    }
    Ok(())
}
