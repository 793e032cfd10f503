use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;

use crate::config::Platform;
use crate::error::UpdateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    Zip,
}

impl ArchiveFormat {
    fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(ArchiveFormat::TarGz)
        } else if name.ends_with(".zip") {
            Some(ArchiveFormat::Zip)
        } else {
            None
        }
    }

    /// File name first, then the final response URL, then the platform convention.
    pub fn detect(file_name: &str, final_url_path: &str, platform: Platform) -> Self {
        Self::from_name(file_name)
            .or_else(|| Self::from_name(final_url_path))
            .unwrap_or(match platform {
                Platform::Windows => ArchiveFormat::Zip,
                Platform::Linux | Platform::Mac => ArchiveFormat::TarGz,
            })
    }
}

#[derive(Debug, Clone)]
pub struct DownloadedArtifact {
    pub path: PathBuf,
    pub format: ArchiveFormat,
    pub sha256: String,
}

impl DownloadedArtifact {
    pub fn matches_digest(&self, expected: &str) -> bool {
        self.sha256.eq_ignore_ascii_case(expected.trim())
    }
}

/// Streams `url` into `dest`, hashing each chunk as it is written.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    platform: Platform,
    size_hint: u64,
) -> Result<DownloadedArtifact, UpdateError> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!("downloading JDK from {url}");

    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|e| UpdateError::Network(format!("download failed: {e}")))?
        .error_for_status()
        .map_err(|e| UpdateError::Network(format!("download failed: {e}")))?;

    let file_name = dest
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let format = ArchiveFormat::detect(file_name, response.url().path(), platform);

    let total_size = response.content_length().unwrap_or(size_hint);

    let pb = ProgressBar::new(total_size);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb.set_message("Downloading JDK");

    let mut file = tokio::fs::File::create(dest).await?;
    let mut hasher = Sha256::new();

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| UpdateError::Network(format!("download stream failed: {e}")))?
    {
        hasher.update(&chunk);
        file.write_all(&chunk).await?;
        pb.inc(chunk.len() as u64);
    }
    file.flush().await?;
    drop(file);

    pb.finish_with_message("Download complete");

    Ok(DownloadedArtifact {
        path: dest.to_path_buf(),
        format,
        sha256: format!("{:x}", hasher.finalize()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // SHA256 of "hello world"
    const HELLO_SHA: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn detect_prefers_file_name() {
        assert_eq!(
            ArchiveFormat::detect("jdk.zip", "/binary/x.tar.gz", Platform::Linux),
            ArchiveFormat::Zip
        );
        assert_eq!(
            ArchiveFormat::detect("OpenJDK17.TAR.GZ", "", Platform::Windows),
            ArchiveFormat::TarGz
        );
    }

    #[test]
    fn detect_falls_back_to_url_then_platform() {
        assert_eq!(
            ArchiveFormat::detect("jdk-17.file", "/releases/jdk.zip", Platform::Linux),
            ArchiveFormat::Zip
        );
        assert_eq!(
            ArchiveFormat::detect("jdk-17.file", "/binary/version/jdk-17", Platform::Windows),
            ArchiveFormat::Zip
        );
        assert_eq!(
            ArchiveFormat::detect("jdk-17.file", "/binary/version/jdk-17", Platform::Mac),
            ArchiveFormat::TarGz
        );
    }

    #[test]
    fn digest_compare_ignores_case() {
        let artifact = DownloadedArtifact {
            path: PathBuf::from("/tmp/a"),
            format: ArchiveFormat::TarGz,
            sha256: HELLO_SHA.to_string(),
        };
        assert!(artifact.matches_digest(&HELLO_SHA.to_uppercase()));
        assert!(artifact.matches_digest(&format!("{HELLO_SHA}\n")));
        assert!(!artifact.matches_digest("deadbeef"));
    }

    #[tokio::test]
    async fn fetch_writes_file_and_hashes_stream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jdk.tgz"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello world".to_vec()))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let dest = dir.path().join("downloads").join("jdk-17.file");
        let artifact = fetch(
            &reqwest::Client::new(),
            &format!("{}/jdk.tgz", server.uri()),
            &dest,
            Platform::Windows,
            11,
        )
        .await
        .unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"hello world");
        assert_eq!(artifact.sha256, HELLO_SHA);
        assert_eq!(artifact.format, ArchiveFormat::TarGz);
        assert_eq!(artifact.path, dest);
    }

    #[tokio::test]
    async fn fetch_overwrites_existing_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello world".to_vec()))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let dest = dir.path().join("jdk.zip");
        std::fs::write(&dest, b"stale content that is longer than the new one").unwrap();

        let artifact = fetch(&reqwest::Client::new(), &server.uri(), &dest, Platform::Linux, 0)
            .await
            .unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"hello world");
        assert_eq!(artifact.format, ArchiveFormat::Zip);
    }

    #[tokio::test]
    async fn fetch_404_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let result = fetch(
            &reqwest::Client::new(),
            &server.uri(),
            &dir.path().join("jdk.tar.gz"),
            Platform::Linux,
            0,
        )
        .await;

        assert!(matches!(result, Err(UpdateError::Network(_))));
    }
}
