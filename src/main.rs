mod cli;
mod config;
mod error;
mod jvm;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::HumanBytes;

use cli::{Cli, Command};
use config::{Arch, InstallTarget, Platform, UpdaterConfig};
use jvm::marker::VersionMarker;
use jvm::{JdkUpdater, UpdateOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("jdk_updater=info".parse()?),
        )
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();

    let mut config = UpdaterConfig::new(cli.root.unwrap_or_else(UpdaterConfig::default_root));
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    config.timeout = Duration::from_secs(cli.timeout);

    match cli.command {
        Command::Update {
            major_version,
            vendor,
            platform,
            arch,
        } => {
            let arch = Arch::from_str(&arch)
                .context(format!("invalid arch: {arch}. Use: x64, aarch64"))?;
            let target = InstallTarget::new(parse_platform(platform.as_deref())?, &config.root)
                .with_arch(arch);
            run_update(target, &config, &major_version, &vendor).await?;
        }
        Command::Status { platform } => {
            let target = InstallTarget::new(parse_platform(platform.as_deref())?, &config.root);
            run_status(&target)?;
        }
        Command::Clean => {
            run_clean(&config)?;
        }
    }

    Ok(())
}

fn parse_platform(platform: Option<&str>) -> Result<Platform> {
    match platform {
        Some(p) => Platform::from_str(p)
            .context(format!("invalid platform: {p}. Use: linux, mac, windows")),
        None => Ok(Platform::current()),
    }
}

async fn run_update(
    target: InstallTarget,
    config: &UpdaterConfig,
    major_version: &str,
    vendor: &str,
) -> Result<()> {
    let updater = JdkUpdater::new(target, config).context("failed to prepare install directory")?;
    let outcome = updater
        .execute(major_version, vendor)
        .await
        .with_context(|| format!("failed to update Java {major_version}"))?;

    match outcome {
        UpdateOutcome::Updated {
            from,
            to,
            install_dir,
        } => {
            eprintln!("\n  Updated: build {from} -> {to}");
            eprintln!("  Path:    {}\n", install_dir.display());
        }
        UpdateOutcome::AlreadyCurrent { installed, .. } => {
            eprintln!("Java {major_version} is up to date (build {installed})");
        }
        UpdateOutcome::NoMatchingVersion { major_version } => {
            eprintln!("No release found for major version {major_version}");
        }
    }
    Ok(())
}

fn run_status(target: &InstallTarget) -> Result<()> {
    let install_dir = &target.install_dir;
    eprintln!("Install directory: {}", install_dir.display());

    if !install_dir.exists() {
        eprintln!("Nothing installed");
        return Ok(());
    }

    eprintln!("Install size:      {}", HumanBytes(dir_size(install_dir)));
    let java = jvm::install::jdk_bin(install_dir, "java");
    if java.exists() {
        eprintln!("Java binary:       {}", java.display());
    }

    let records = VersionMarker::new(install_dir).records()?;
    if records.is_empty() {
        eprintln!("No recorded builds");
    }
    for record in &records {
        eprintln!(
            "  {} {} (build {})",
            record.vendor, record.major_version, record.build_id
        );
    }
    Ok(())
}

fn run_clean(config: &UpdaterConfig) -> Result<()> {
    let downloads = config.downloads_dir();
    if downloads.exists() {
        let size = dir_size(&downloads);
        std::fs::remove_dir_all(&downloads)?;
        eprintln!("Cleaned {} of cached downloads", HumanBytes(size));
    } else {
        eprintln!("Download cache is already empty");
    }
    Ok(())
}

fn dir_size(path: &Path) -> u64 {
    let mut size = 0;
    if let Ok(entries) = std::fs::read_dir(path) {
        for entry in entries.flatten() {
            let p = entry.path();
            if p.is_dir() {
                size += dir_size(&p);
            } else if let Ok(meta) = p.metadata() {
                size += meta.len();
            }
        }
    }
    size
}
