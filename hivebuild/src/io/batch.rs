//! Processing every item of one target directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::core::report::BatchResult;
use crate::io::pipeline::run_item;
use crate::io::toolchain::ItemToolchain;

/// Immediate subdirectories of `dir`, sorted by name.
///
/// Plain files and other non-directories are not items and are skipped.
pub fn list_items(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut items = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let entry = entry.context("read entry")?;
        if entry.path().is_dir() {
            items.push(entry.path());
        }
    }
    items.sort();
    Ok(items)
}

/// Run every item under `target_dir` through the pipeline.
///
/// Artifacts land in `output_dir` (created if absent); the returned batch
/// holds one outcome per item.
#[instrument(skip_all, fields(target = %target_dir.display()))]
pub fn process_directory<T: ItemToolchain + ?Sized>(
    toolchain: &T,
    target_dir: &Path,
    output_dir: &Path,
    samples: u32,
) -> Result<BatchResult> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("create output dir {}", output_dir.display()))?;
    let items = list_items(target_dir)?;
    info!(items = items.len(), "processing items");

    let batch: BatchResult = items
        .iter()
        .map(|item| {
            let outcome = run_item(toolchain, item, output_dir, samples);
            debug!(item = outcome.item(), success = outcome.is_success(), "item finished");
            outcome
        })
        .collect();

    info!(
        successes = batch.successes.len(),
        failures = batch.failures.len(),
        "directory processed"
    );
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeToolchain, Script, make_items};

    #[test]
    fn skips_plain_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        make_items(temp.path(), &["b", "a"]);
        fs::write(temp.path().join("README.md"), "notes").expect("write file");

        let items = list_items(temp.path()).expect("list");
        assert_eq!(items, vec![temp.path().join("a"), temp.path().join("b")]);
    }

    #[test]
    fn partitions_every_item_exactly_once() {
        let temp = tempfile::tempdir().expect("tempdir");
        let target = temp.path().join("puzzles");
        let work = temp.path().join("work");
        let out = temp.path().join("out").join("puzzles");
        make_items(&target, &["a", "b", "c", "d"]);
        fs::create_dir_all(&work).expect("work");
        let toolchain = FakeToolchain::new(&work)
            .script("b", Script::FailIntegrity("bad layout".to_string()))
            .script("d", Script::NoArtifact);

        let batch = process_directory(&toolchain, &target, &out, 100).expect("process");

        assert_eq!(batch.successes, vec!["a", "c"]);
        let failed: Vec<&str> = batch.failures.iter().map(|f| f.item.as_str()).collect();
        assert_eq!(failed, vec!["b", "d"]);
        assert_eq!(batch.item_count(), 4);
        assert!(out.join("a.alghive").is_file());
        assert!(out.join("c.alghive").is_file());
        assert!(!out.join("b.alghive").exists());
    }

    #[test]
    fn empty_directory_yields_empty_batch() {
        let temp = tempfile::tempdir().expect("tempdir");
        let target = temp.path().join("empty");
        fs::create_dir_all(&target).expect("target");
        let toolchain = FakeToolchain::new(temp.path());

        let batch =
            process_directory(&toolchain, &target, &temp.path().join("out"), 100).expect("process");

        assert_eq!(batch, BatchResult::default());
        assert!(temp.path().join("out").is_dir());
    }

    #[test]
    fn package_error_does_not_stop_later_items() {
        let temp = tempfile::tempdir().expect("tempdir");
        let target = temp.path().join("puzzles");
        let out = temp.path().join("out");
        make_items(&target, &["a", "b"]);
        let toolchain =
            FakeToolchain::new(temp.path()).script("a", Script::FailPackage("boom".to_string()));

        let batch = process_directory(&toolchain, &target, &out, 100).expect("process");

        assert_eq!(batch.successes, vec!["b"]);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].item, "a");
        assert!(out.join("b.alghive").is_file());
        assert!(!out.join("a.alghive").exists());
    }
}
