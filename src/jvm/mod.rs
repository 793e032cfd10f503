pub mod adoptium;
pub mod download;
pub mod install;
pub mod marker;

use std::path::{Path, PathBuf};

use crate::config::{InstallTarget, UpdaterConfig, Vendor};
use crate::error::UpdateError;

use adoptium::{AdoptiumClient, ReleaseDescriptor};
use marker::VersionMarker;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated {
        from: u64,
        to: u64,
        install_dir: PathBuf,
    },
    AlreadyCurrent {
        installed: u64,
        latest: u64,
    },
    NoMatchingVersion {
        major_version: String,
    },
}

/// Keeps one platform's JDK install in sync with the Adoptium catalog.
///
/// Only one updater may work on a given install root at a time; nothing here
/// locks the directories.
pub struct JdkUpdater {
    target: InstallTarget,
    downloads_dir: PathBuf,
    http: reqwest::Client,
    catalog: AdoptiumClient,
    marker: VersionMarker,
}

impl JdkUpdater {
    pub fn new(target: InstallTarget, config: &UpdaterConfig) -> Result<Self, UpdateError> {
        std::fs::create_dir_all(&target.install_dir)?;

        let http = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .read_timeout(config.timeout)
            .build()
            .map_err(|e| UpdateError::Network(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            downloads_dir: config.downloads_dir(),
            catalog: AdoptiumClient::new(http.clone(), &config.api_url),
            marker: VersionMarker::new(&target.install_dir),
            http,
            target,
        })
    }

    pub async fn execute(&self, major_version: &str, vendor: &str) -> Result<UpdateOutcome, UpdateError> {
        if major_version.is_empty() {
            return Err(UpdateError::InvalidRequest("major version is empty".into()));
        }
        if vendor.is_empty() {
            return Err(UpdateError::InvalidRequest("vendor is empty".into()));
        }
        let vendor = Vendor::parse(vendor)?;

        tracing::info!("checking Java {major_version} installation in {}", self.target.install_dir.display());
        let current = self.marker.build_id(major_version, vendor.as_str())?;

        let Some(latest) = self.catalog.latest_release(major_version, &self.target).await? else {
            tracing::error!("couldn't find a matching major version to '{major_version}'");
            return Ok(UpdateOutcome::NoMatchingVersion {
                major_version: major_version.to_string(),
            });
        };

        if latest.build <= current {
            tracing::info!("Java {major_version} is on the latest build ({current})");
            return Ok(UpdateOutcome::AlreadyCurrent {
                installed: current,
                latest: latest.build,
            });
        }

        let release = self.catalog.resolve(&latest, &self.target).await?;
        tracing::info!(
            "update found for Java {}: {current} -> {} ({}, {})",
            release.major_version,
            release.build_id,
            release.release_name,
            release.semver
        );

        let dest = self.download_path(&release);
        let result = self.download_and_install(&release, &dest).await;
        self.clean_downloads();
        result?;

        self.marker
            .set_build_id(release.build_id, major_version, vendor.as_str())?;

        tracing::info!(
            "Java update installed ({current} -> {}) at {}",
            release.build_id,
            self.target.install_dir.display()
        );
        Ok(UpdateOutcome::Updated {
            from: current,
            to: release.build_id,
            install_dir: self.target.install_dir.clone(),
        })
    }

    async fn download_and_install(
        &self,
        release: &ReleaseDescriptor,
        dest: &Path,
    ) -> Result<(), UpdateError> {
        let artifact = download::fetch(
            &self.http,
            &release.download_url,
            dest,
            self.target.platform,
            release.size,
        )
        .await?;
        let checksum = &release.checksum;

        tracing::info!("Java update downloaded, checking hash");
        if !artifact.matches_digest(checksum) {
            return Err(UpdateError::HashMismatch {
                expected: checksum.to_lowercase(),
                actual: artifact.sha256,
            });
        }

        tracing::info!("hash is valid, replacing installation");
        let install_dir = self.target.install_dir.clone();
        tokio::task::spawn_blocking(move || install::install(&artifact, &install_dir))
            .await
            .map_err(|e| UpdateError::Io(std::io::Error::other(format!("install task failed: {e}"))))?
    }

    /// Cache path for the release archive; only the last component of the
    /// catalog's package name is used so the file stays inside the cache.
    fn download_path(&self, release: &ReleaseDescriptor) -> PathBuf {
        let file_name = match Path::new(&release.package_name).file_name() {
            Some(name) => name.to_os_string(),
            None => format!(
                "{}-{}.file",
                self.target.image_type.adoptium_name(),
                release.semver
            )
            .into(),
        };
        self.downloads_dir.join(file_name)
    }

    fn clean_downloads(&self) {
        if let Err(e) = std::fs::remove_dir_all(&self.downloads_dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    "failed to remove download cache {}: {e}",
                    self.downloads_dir.display()
                );
            }
        }
    }
}
