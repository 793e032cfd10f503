use serde::Deserialize;

use crate::config::InstallTarget;
use crate::error::UpdateError;

const PAGE_SIZE: &str = "50";

#[derive(Debug, Deserialize)]
pub struct ReleaseVersions {
    pub versions: Vec<ReleaseVersion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseVersion {
    pub major: u32,
    pub build: u64,
    pub semver: String,
}

#[derive(Debug, Deserialize)]
pub struct ReleaseAsset {
    pub release_name: String,
    pub binaries: Vec<Binary>,
}

#[derive(Debug, Deserialize)]
pub struct Binary {
    pub package: Package,
}

#[derive(Debug, Deserialize)]
pub struct Package {
    pub checksum: String,
    pub size: u64,
    pub name: String,
}

/// A release resolved down to a single downloadable binary.
#[derive(Debug, Clone)]
pub struct ReleaseDescriptor {
    pub major_version: String,
    pub build_id: u64,
    pub semver: String,
    pub release_name: String,
    pub checksum: String,
    pub package_name: String,
    pub size: u64,
    pub download_url: String,
}

pub struct AdoptiumClient {
    http: reqwest::Client,
    base_url: String,
}

impl AdoptiumClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn filters(target: &InstallTarget) -> [(&'static str, &'static str); 11] {
        [
            ("architecture", target.arch.adoptium_arch()),
            ("heap_size", "normal"),
            ("image_type", target.image_type.adoptium_name()),
            ("os", target.platform.adoptium_os()),
            ("page", "0"),
            ("page_size", PAGE_SIZE),
            ("project", "jdk"),
            ("release_type", "ga"),
            ("sort_method", "DEFAULT"),
            ("sort_order", "DESC"),
            ("vendor", "eclipse"),
        ]
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, UpdateError> {
        tracing::debug!("fetching Adoptium release info: {url}");

        self.http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| UpdateError::Network(format!("API request failed: {e}")))?
            .error_for_status()
            .map_err(|e| UpdateError::Network(format!("API request failed: {e}")))?
            .json()
            .await
            .map_err(|e| UpdateError::Catalog(format!("failed to parse API response: {e}")))
    }

    pub async fn release_versions(
        &self,
        target: &InstallTarget,
    ) -> Result<Vec<ReleaseVersion>, UpdateError> {
        let url = format!("{}/info/release_versions", self.base_url);
        let releases: ReleaseVersions = self.get_json(&url, &Self::filters(target)).await?;
        Ok(releases.versions)
    }

    pub async fn version_assets(
        &self,
        semver: &str,
        target: &InstallTarget,
    ) -> Result<Vec<ReleaseAsset>, UpdateError> {
        let url = format!(
            "{}/assets/version/{}",
            self.base_url,
            semver.replace('+', "%2B")
        );
        self.get_json(&url, &Self::filters(target)).await
    }

    pub fn download_url(&self, release_name: &str, target: &InstallTarget) -> String {
        format!(
            "{}/binary/version/{}/{}/{}/{}/hotspot/normal/eclipse?project=jdk",
            self.base_url,
            release_name,
            target.platform.adoptium_os(),
            target.arch.adoptium_arch(),
            target.image_type.adoptium_name(),
        )
    }

    /// Latest GA build for `major_version`, or `None` when the catalog has none.
    pub async fn latest_release(
        &self,
        major_version: &str,
        target: &InstallTarget,
    ) -> Result<Option<ReleaseVersion>, UpdateError> {
        let versions = self.release_versions(target).await?;
        Ok(select_latest(&versions, major_version).cloned())
    }

    pub async fn resolve(
        &self,
        release: &ReleaseVersion,
        target: &InstallTarget,
    ) -> Result<ReleaseDescriptor, UpdateError> {
        let assets = self.version_assets(&release.semver, target).await?;
        let asset = assets.into_iter().next().ok_or_else(|| {
            UpdateError::Catalog(format!("no assets found for version {}", release.semver))
        })?;
        let package = asset
            .binaries
            .into_iter()
            .next()
            .map(|b| b.package)
            .ok_or_else(|| {
                UpdateError::Catalog(format!("no binaries found for {}", asset.release_name))
            })?;

        Ok(ReleaseDescriptor {
            major_version: release.major.to_string(),
            build_id: release.build,
            semver: release.semver.clone(),
            download_url: self.download_url(&asset.release_name, target),
            release_name: asset.release_name,
            checksum: package.checksum,
            package_name: package.name,
            size: package.size,
        })
    }
}

/// Highest build among releases of the requested major; earlier entries win ties.
pub fn select_latest<'a>(versions: &'a [ReleaseVersion], major_version: &str) -> Option<&'a ReleaseVersion> {
    let mut best: Option<&ReleaseVersion> = None;
    for v in versions.iter().filter(|v| v.major.to_string() == major_version) {
        if best.map_or(true, |b| v.build > b.build) {
            best = Some(v);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Arch, Platform};
    use std::path::Path;
    use wiremock::matchers::{method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn version(major: u32, build: u64, semver: &str) -> ReleaseVersion {
        ReleaseVersion {
            major,
            build,
            semver: semver.to_string(),
        }
    }

    fn target() -> InstallTarget {
        InstallTarget::new(Platform::Linux, Path::new("/unused"))
    }

    #[test]
    fn select_latest_picks_highest_build_of_major() {
        let versions = vec![
            version(21, 9, "21.0.0+9"),
            version(17, 8, "17.0.1+8"),
            version(17, 35, "17.0.0+35"),
            version(11, 40, "11.0.0+40"),
        ];
        let latest = select_latest(&versions, "17").unwrap();
        assert_eq!(latest.build, 35);
        assert_eq!(latest.semver, "17.0.0+35");
    }

    #[test]
    fn select_latest_none_for_unknown_major() {
        let versions = vec![version(21, 9, "21.0.0+9")];
        assert!(select_latest(&versions, "8").is_none());
        assert!(select_latest(&versions, "21.0").is_none());
    }

    #[test]
    fn select_latest_keeps_first_on_tie() {
        let versions = vec![version(17, 35, "17.0.0+35"), version(17, 35, "17.0.0+35.1")];
        assert_eq!(select_latest(&versions, "17").unwrap().semver, "17.0.0+35");
    }

    #[test]
    fn download_url_encodes_target() {
        let client = AdoptiumClient::new(reqwest::Client::new(), "https://api.adoptium.net/v3/");
        let url = client.download_url("jdk-17+35", &target().with_arch(Arch::Aarch64));
        assert_eq!(
            url,
            "https://api.adoptium.net/v3/binary/version/jdk-17+35/linux/aarch64/jdk/hotspot/normal/eclipse?project=jdk"
        );
    }

    #[tokio::test]
    async fn release_versions_sends_catalog_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/info/release_versions"))
            .and(query_param("architecture", "x64"))
            .and(query_param("image_type", "jdk"))
            .and(query_param("release_type", "ga"))
            .and(query_param("os", "linux"))
            .and(query_param("page_size", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "versions": [
                    { "major": 17, "build": 35, "semver": "17.0.0+35", "minor": 0 },
                    { "major": 11, "build": 28, "semver": "11.0.0+28", "minor": 0 }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AdoptiumClient::new(reqwest::Client::new(), &format!("{}/v3", server.uri()));
        let latest = client.latest_release("11", &target()).await.unwrap().unwrap();
        assert_eq!(latest.build, 28);
    }

    #[tokio::test]
    async fn resolve_reads_first_binary_package() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/v3/assets/version/17\.0\.0(\+|%2B)35$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "release_name": "jdk-17+35",
                    "binaries": [
                        { "package": {
                            "checksum": "ABC123",
                            "link": "https://example.invalid/jdk.tar.gz",
                            "name": "OpenJDK17-jdk_x64_linux_hotspot_17_35.tar.gz",
                            "size": 42
                        } }
                    ]
                }
            ])))
            .mount(&server)
            .await;

        let base = format!("{}/v3", server.uri());
        let client = AdoptiumClient::new(reqwest::Client::new(), &base);
        let release = client
            .resolve(&version(17, 35, "17.0.0+35"), &target())
            .await
            .unwrap();

        assert_eq!(release.release_name, "jdk-17+35");
        assert_eq!(release.checksum, "ABC123");
        assert_eq!(release.package_name, "OpenJDK17-jdk_x64_linux_hotspot_17_35.tar.gz");
        assert_eq!(release.major_version, "17");
        assert!(release.download_url.starts_with(&format!("{base}/binary/version/jdk-17+35/linux/x64/jdk/")));
    }

    #[tokio::test]
    async fn resolve_without_binaries_is_catalog_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/v3/assets/version/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "release_name": "jdk-17+35", "binaries": [] }
            ])))
            .mount(&server)
            .await;

        let client = AdoptiumClient::new(reqwest::Client::new(), &format!("{}/v3", server.uri()));
        let result = client.resolve(&version(17, 35, "17.0.0+35"), &target()).await;
        assert!(matches!(result, Err(UpdateError::Catalog(_))));
    }

    #[tokio::test]
    async fn server_error_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = AdoptiumClient::new(reqwest::Client::new(), &format!("{}/v3", server.uri()));
        let result = client.release_versions(&target()).await;
        assert!(matches!(result, Err(UpdateError::Network(_))));
    }
}
