use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::UpdateError;

pub const MARKER_FILE: &str = "build-markers.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildMarker {
    pub major_version: String,
    pub vendor: String,
    pub build_id: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MarkerFile {
    markers: Vec<BuildMarker>,
}

/// Installed build ids, one record per (major version, vendor), stored in a
/// single JSON file inside the install directory.
#[derive(Debug, Clone)]
pub struct VersionMarker {
    dir: PathBuf,
}

impl VersionMarker {
    pub fn new(install_dir: &Path) -> Self {
        Self {
            dir: install_dir.to_path_buf(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(MARKER_FILE)
    }

    /// Returns the installed build id, writing a zero record when none exists.
    pub fn build_id(&self, major_version: &str, vendor: &str) -> Result<u64, UpdateError> {
        if let Some(id) = self.installed(major_version, vendor)? {
            return Ok(id);
        }
        self.set_build_id(0, major_version, vendor)?;
        Ok(0)
    }

    pub fn installed(&self, major_version: &str, vendor: &str) -> Result<Option<u64>, UpdateError> {
        Ok(self
            .load()?
            .markers
            .iter()
            .find(|m| m.major_version == major_version && m.vendor == vendor)
            .map(|m| m.build_id))
    }

    pub fn records(&self) -> Result<Vec<BuildMarker>, UpdateError> {
        Ok(self.load()?.markers)
    }

    pub fn set_build_id(&self, id: u64, major_version: &str, vendor: &str) -> Result<(), UpdateError> {
        let mut file = self.load()?;
        file.markers
            .retain(|m| !(m.major_version == major_version && m.vendor == vendor));
        file.markers.push(BuildMarker {
            major_version: major_version.to_string(),
            vendor: vendor.to_string(),
            build_id: id,
        });
        self.store(&file)?;
        tracing::debug!("build marker {major_version}/{vendor} set to {id}");
        Ok(())
    }

    fn load(&self) -> Result<MarkerFile, UpdateError> {
        let path = self.path();
        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(MarkerFile::default()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&data)
            .map_err(|e| UpdateError::Marker(format!("cannot parse {}: {e}", path.display())))
    }

    // Replaces the file via rename so a failed write never loses the old records.
    fn store(&self, file: &MarkerFile) -> Result<(), UpdateError> {
        std::fs::create_dir_all(&self.dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer_pretty(&mut tmp, file)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path()).map_err(|e| UpdateError::Io(e.error))?;
        Ok(())
    }
}
