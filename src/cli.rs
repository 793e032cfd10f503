use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_TIMEOUT_SECS;

#[derive(Debug, Parser)]
#[command(name = "jdk-updater", version, about = "Keep a cached Adoptium JDK up to date")]
pub struct Cli {
    /// Root directory holding the JDK installs and the download cache
    #[arg(long, global = true, env = "JDK_UPDATER_ROOT")]
    pub root: Option<PathBuf>,

    /// Adoptium API base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Connect and read timeout for HTTP requests, in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Install or update the latest GA build of a JDK major version
    Update {
        /// Major version, e.g. 17
        major_version: String,

        #[arg(long, default_value = "adoptium")]
        vendor: String,

        /// linux, mac or windows (defaults to the current platform)
        #[arg(long)]
        platform: Option<String>,

        /// x64 or aarch64
        #[arg(long, default_value = "x64")]
        arch: String,
    },
    /// Show the install directory and recorded build ids
    Status {
        #[arg(long)]
        platform: Option<String>,
    },
    /// Remove the download cache
    Clean,
}
