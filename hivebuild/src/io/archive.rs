//! Bundling a directory's artifacts into one uncompressed tar archive.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, instrument};

/// Files directly under `dir` whose names end with `extension`, sorted.
///
/// Artifacts left over from an earlier run are picked up too; `dir` is expected to start clean.
pub fn collect_artifacts(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut artifacts = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let entry = entry.context("read entry")?;
        let path = entry.path();
        let is_artifact = entry.file_name().to_string_lossy().ends_with(extension);
        if is_artifact && path.is_file() {
            artifacts.push(path);
        }
    }
    artifacts.sort();
    Ok(artifacts)
}

/// Write every artifact in `output_dir` into the tar file at `archive_path`.
///
/// Members are stored under their base name. Returns the member count.
#[instrument(skip_all, fields(archive = %archive_path.display()))]
pub fn build_archive(output_dir: &Path, archive_path: &Path, extension: &str) -> Result<usize> {
    let artifacts = collect_artifacts(output_dir, extension)?;
    let file = File::create(archive_path)
        .with_context(|| format!("create archive {}", archive_path.display()))?;
    let mut builder = tar::Builder::new(file);

    for artifact in &artifacts {
        let name = artifact
            .file_name()
            .with_context(|| format!("artifact without file name {}", artifact.display()))?;
        builder
            .append_path_with_name(artifact, name)
            .with_context(|| format!("add {} to archive", artifact.display()))?;
    }

    builder
        .into_inner()
        .with_context(|| format!("finish archive {}", archive_path.display()))?;
    info!(members = artifacts.len(), "archive written");
    Ok(artifacts.len())
}
