//! Single-item pipeline: integrity check, test run, package, relocate.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::core::outcome::{FailureReason, ItemFailure, ItemOutcome, Stage, StageError};
use crate::io::toolchain::{ItemHandle, ItemToolchain};

/// Run one item through the pipeline and move its artifact into `output_dir`.
///
/// Never fails: every error is captured in the returned [`ItemOutcome`] so
/// one broken item cannot stop the rest of the batch.
#[instrument(skip_all, fields(item = %item_dir.display()))]
pub fn run_item<T: ItemToolchain + ?Sized>(
    toolchain: &T,
    item_dir: &Path,
    output_dir: &Path,
    samples: u32,
) -> ItemOutcome {
    let name = item_name(item_dir);
    println!("  build: {name}");

    let handle = toolchain.bind(item_dir);
    let artifact = match run_stages(handle.as_ref(), samples) {
        Ok(artifact) => artifact,
        Err(err) => {
            println!("  failed: {name}: {} ({} stage)", err.message, err.stage);
            return failure(name, FailureReason::Raised(err));
        }
    };

    if !artifact.is_file() {
        warn!(artifact = %artifact.display(), "packaging produced no artifact");
        println!("  failed: {name}: no artifact at {}", artifact.display());
        return failure(
            name,
            FailureReason::ArtifactMissing {
                extension: toolchain.artifact_extension().to_string(),
            },
        );
    }

    let file_name = artifact
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&name));
    let destination = output_dir.join(file_name);
    if let Err(err) = relocate(&artifact, &destination) {
        println!("  failed: {name}: {err:#}");
        return failure(
            name,
            FailureReason::Raised(StageError::new(Stage::Relocate, format!("{err:#}"))),
        );
    }

    info!(destination = %destination.display(), "item packaged");
    println!("  ok: {name}");
    ItemOutcome::Success(name)
}

fn run_stages(handle: &dyn ItemHandle, samples: u32) -> Result<PathBuf, StageError> {
    handle.check_integrity()?;
    debug!("integrity check passed");
    handle.run_tests(samples)?;
    debug!(samples, "tests passed");
    handle.package()
}

fn failure(item: String, reason: FailureReason) -> ItemOutcome {
    ItemOutcome::Failure(ItemFailure { item, reason })
}

pub fn item_name(item_dir: &Path) -> String {
    item_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| item_dir.display().to_string())
}

/// Move `src` to `dest`, falling back to copy + remove across filesystems.
pub fn relocate(src: &Path, dest: &Path) -> Result<()> {
    if let Err(err) = fs::rename(src, dest) {
        debug!(err = %err, "rename failed, copying instead");
        fs::copy(src, dest)
            .with_context(|| format!("move {} to {}", src.display(), dest.display()))?;
        fs::remove_file(src).with_context(|| format!("remove {}", src.display()))?;
    }
    Ok(())
}
