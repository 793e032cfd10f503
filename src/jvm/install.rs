use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::UpdateError;

use super::download::{ArchiveFormat, DownloadedArtifact};

const FLATTEN_TEMP: &str = "__flatten_temp__";

fn sibling(dir: &Path, suffix: &str) -> Result<PathBuf, UpdateError> {
    let name = dir
        .file_name()
        .ok_or_else(|| UpdateError::Structure(format!("invalid install path: {}", dir.display())))?;
    let mut name = OsString::from(name);
    name.push(suffix);
    Ok(dir.with_file_name(name))
}

pub fn staging_dir(install_dir: &Path) -> Result<PathBuf, UpdateError> {
    sibling(install_dir, ".staging")
}

/// Extracts `artifact` next to `install_dir`, flattens it and swaps it in.
///
/// The install directory is only touched once the staged tree is complete.
pub fn install(artifact: &DownloadedArtifact, install_dir: &Path) -> Result<(), UpdateError> {
    let staging = staging_dir(install_dir)?;
    if staging.exists() {
        tracing::warn!("removing leftover staging directory {}", staging.display());
        std::fs::remove_dir_all(&staging)?;
    }
    std::fs::create_dir_all(&staging)?;

    tracing::info!("extracting {} into {}", artifact.path.display(), staging.display());
    match artifact.format {
        ArchiveFormat::TarGz => extract_tar_gz(&artifact.path, &staging)?,
        ArchiveFormat::Zip => extract_zip(&artifact.path, &staging)?,
    }

    // Adoptium archives have a top-level directory, flatten it
    flatten_wrapper(&staging)?;
    promote(&staging, install_dir)
}

fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<(), UpdateError> {
    let file = std::fs::File::open(archive)?;
    let decoder = flate2::read::GzDecoder::new(file);
    let mut tar = tar::Archive::new(decoder);
    tar.unpack(dest)?;
    Ok(())
}

fn extract_zip(archive: &Path, dest: &Path) -> Result<(), UpdateError> {
    let file = std::fs::File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file)?;
    zip.extract(dest)?;
    Ok(())
}

fn wrapper_dir(dir: &Path) -> Result<PathBuf, UpdateError> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }

    match dirs.len() {
        1 => Ok(dirs.remove(0)),
        0 => Err(UpdateError::Structure(format!(
            "no top-level directory in {}",
            dir.display()
        ))),
        n => Err(UpdateError::Structure(format!(
            "expected one top-level directory in {}, found {n}",
            dir.display()
        ))),
    }
}

/// Moves the children of the single wrapper directory up into `dir`.
fn flatten_wrapper(dir: &Path) -> Result<(), UpdateError> {
    let wrapper = wrapper_dir(dir)?;
    tracing::debug!("flattening {}", wrapper.display());

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path != wrapper {
            std::fs::remove_file(&path)?;
        }
    }

    // The wrapper may contain an entry with its own name.
    let temp = dir.join(FLATTEN_TEMP);
    std::fs::rename(&wrapper, &temp)?;

    let mut moves = Vec::new();
    for entry in std::fs::read_dir(&temp)? {
        let entry = entry?;
        moves.push((entry.path(), dir.join(entry.file_name())));
    }

    for (from, to) in &moves {
        std::fs::rename(from, to).map_err(|e| {
            UpdateError::Structure(format!(
                "failed to move {} to {}: {e}",
                from.display(),
                to.display()
            ))
        })?;
    }
    std::fs::remove_dir(&temp)?;

    Ok(())
}

/// Renames `staging` over `install_dir`, keeping the old tree until the swap succeeds.
fn promote(staging: &Path, install_dir: &Path) -> Result<(), UpdateError> {
    let previous = sibling(install_dir, ".previous")?;
    if previous.exists() {
        std::fs::remove_dir_all(&previous)?;
    }

    let had_previous = install_dir.exists();
    if had_previous {
        std::fs::rename(install_dir, &previous)?;
    }

    if let Err(e) = std::fs::rename(staging, install_dir) {
        if had_previous {
            std::fs::rename(&previous, install_dir)?;
        }
        return Err(e.into());
    }

    if had_previous {
        discard_previous(&previous);
    }
    Ok(())
}

// The new tree is already live; a leftover is removed by the next promote.
fn discard_previous(previous: &Path) {
    if let Err(e) = std::fs::remove_dir_all(previous) {
        tracing::warn!(
            "failed to remove previous installation {}: {e}",
            previous.display()
        );
    }
}

pub fn jdk_bin(jdk_path: &Path, tool: &str) -> PathBuf {
    // macOS JDK has Contents/Home structure
    let macos_bin = jdk_path
        .join("Contents")
        .join("Home")
        .join("bin")
        .join(tool);
    if macos_bin.exists() {
        return macos_bin;
    }
    jdk_path.join("bin").join(tool)
}
