//! Run-level orchestration over all target directories.
//!
//! Each listed target is folded into a [`GlobalReport`]. Only failing to
//! create the output root aborts; everything else is recorded per directory.

use std::ffi::OsString;
use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use crate::core::report::{ArchiveStatus, DirectoryOutcome, DirectoryReport, GlobalReport};
use crate::io::archive::build_archive;
use crate::io::batch::process_directory;
use crate::io::toolchain::ItemToolchain;

const FALLBACK_LABEL: &str = "root";

/// Process every target in listed order and collect the run report.
#[instrument(skip_all, fields(targets = targets.len(), output_root = %output_root.display()))]
pub fn run_targets<T: ItemToolchain + ?Sized>(
    toolchain: &T,
    targets: &[String],
    output_root: &Path,
    samples: u32,
) -> Result<GlobalReport> {
    fs::create_dir_all(output_root)
        .with_context(|| format!("create output root {}", output_root.display()))?;

    println!("targets: {}", targets.join(", "));
    let report = targets.iter().fold(GlobalReport::default(), |report, target| {
        report.with(process_target(toolchain, target, output_root, samples))
    });
    info!(failed = report.has_failures(), "run complete");
    Ok(report)
}

/// Process one target directory: build its items, then archive the successes.
pub fn process_target<T: ItemToolchain + ?Sized>(
    toolchain: &T,
    target: &str,
    output_root: &Path,
    samples: u32,
) -> DirectoryReport {
    let report = |outcome: DirectoryOutcome| DirectoryReport {
        target: target.to_string(),
        outcome,
    };

    let target_dir = Path::new(target);
    if !target_dir.is_dir() {
        warn!(dir = target, "target directory does not exist");
        println!("missing: {target}");
        return report(DirectoryOutcome::NotFound);
    }
    println!("process: {target}");

    let segments = normalized_segments(target_dir);
    let output_dir = output_location(output_root, &segments);
    let batch = match process_directory(toolchain, target_dir, &output_dir, samples) {
        Ok(batch) => batch,
        Err(err) => {
            warn!(dir = target, err = %format!("{err:#}"), "target directory unusable");
            return report(DirectoryOutcome::Unreadable(format!("{err:#}")));
        }
    };

    let archive = if batch.successes.is_empty() {
        ArchiveStatus::Skipped
    } else {
        let archive_path = archive_path(output_root, &segments);
        match build_archive(&output_dir, &archive_path, toolchain.artifact_extension()) {
            Ok(members) => {
                println!("archive: {} ({members} artifacts)", archive_path.display());
                ArchiveStatus::Created(archive_path)
            }
            Err(err) => {
                println!("archive failed: {err:#}");
                ArchiveStatus::Failed(format!("{err:#}"))
            }
        }
    };

    report(DirectoryOutcome::Processed { batch, archive })
}

/// Path segments of `target` with root, `.` and `..` resolved lexically.
///
/// Falls back to the canonical directory name when nothing is left
/// (e.g. `.`), so every target gets a named output location.
fn normalized_segments(target: &Path) -> Vec<OsString> {
    let mut segments: Vec<OsString> = Vec::new();
    for component in target.components() {
        match component {
            Component::Normal(segment) => segments.push(segment.to_os_string()),
            Component::ParentDir => {
                segments.pop();
            }
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
        }
    }
    if segments.is_empty() {
        let label = fs::canonicalize(target)
            .ok()
            .and_then(|path| path.file_name().map(|name| name.to_os_string()))
            .unwrap_or_else(|| OsString::from(FALLBACK_LABEL));
        segments.push(label);
    }
    segments
}

/// `<output_root>/<target segments>`: where a target's artifacts are collected.
pub fn output_location(output_root: &Path, segments: &[OsString]) -> PathBuf {
    segments
        .iter()
        .fold(output_root.to_path_buf(), |path, segment| path.join(segment))
}

/// `<output_root>/<last target segment>.tar`.
pub fn archive_path(output_root: &Path, segments: &[OsString]) -> PathBuf {
    let mut file_name = segments
        .last()
        .cloned()
        .unwrap_or_else(|| OsString::from(FALLBACK_LABEL));
    file_name.push(".tar");
    output_root.join(file_name)
}
