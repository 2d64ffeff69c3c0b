//! Capability seam for the external validate/test/package library.
//!
//! The pipeline only sees [`ItemToolchain`] and [`ItemHandle`].
//! [`CommandToolchain`] is the production adapter: every stage is an
//! external command built from a template in [`ToolchainConfig`].

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::core::outcome::{Stage, StageError};
use crate::io::config::{HivebuildConfig, ToolchainConfig};
use crate::io::process::run_command_with_timeout;

/// Operations available on one item once bound.
pub trait ItemHandle {
    /// Validate structural constraints of the item.
    fn check_integrity(&self) -> Result<(), StageError>;

    /// Run the item's self-tests with `samples` iterations.
    fn run_tests(&self, samples: u32) -> Result<(), StageError>;

    /// Package the item and return the path the artifact is expected at.
    ///
    /// Returning `Ok` does not guarantee the file exists; packaging may
    /// silently produce nothing.
    fn package(&self) -> Result<PathBuf, StageError>;
}

/// Factory for item handles plus the artifact naming convention.
pub trait ItemToolchain {
    /// Artifact suffix including the leading dot (e.g. `.alghive`).
    fn artifact_extension(&self) -> &str;

    fn bind<'a>(&'a self, item_dir: &Path) -> Box<dyn ItemHandle + 'a>;
}

/// Artifact file name for an item: `<name><extension>`.
pub fn artifact_file_name(item_name: &str, extension: &str) -> String {
    format!("{item_name}{extension}")
}

/// Toolchain that shells out to configured commands.
#[derive(Debug, Clone)]
pub struct CommandToolchain {
    stages: ToolchainConfig,
    work_dir: PathBuf,
    timeout: Duration,
    output_limit_bytes: usize,
}

impl CommandToolchain {
    pub fn new(cfg: &HivebuildConfig) -> Self {
        Self {
            stages: cfg.toolchain.clone(),
            work_dir: cfg.work_dir.clone(),
            timeout: cfg.stage_timeout(),
            output_limit_bytes: cfg.output_limit_bytes,
        }
    }
}

impl ItemToolchain for CommandToolchain {
    fn artifact_extension(&self) -> &str {
        &self.stages.artifact_extension
    }

    fn bind<'a>(&'a self, item_dir: &Path) -> Box<dyn ItemHandle + 'a> {
        let name = item_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        // Stages run inside `work_dir`, so relative item paths must be anchored first.
        let item_dir = std::path::absolute(item_dir).unwrap_or_else(|_| item_dir.to_path_buf());
        Box::new(CommandItem {
            toolchain: self,
            item_dir,
            name,
        })
    }
}

struct CommandItem<'a> {
    toolchain: &'a CommandToolchain,
    item_dir: PathBuf,
    name: String,
}

impl CommandItem<'_> {
    fn expand(&self, template: &[String], samples: u32) -> Vec<String> {
        let item = self.item_dir.display().to_string();
        template
            .iter()
            .map(|arg| {
                arg.replace("{item}", &item)
                    .replace("{name}", &self.name)
                    .replace("{samples}", &samples.to_string())
            })
            .collect()
    }

    #[instrument(skip_all, fields(item = %self.name, %stage))]
    fn run_stage(&self, stage: Stage, template: &[String], samples: u32) -> Result<(), StageError> {
        let argv = self.expand(template, samples);
        let Some((program, args)) = argv.split_first() else {
            return Err(StageError::new(stage, "stage command is empty"));
        };
        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(&self.toolchain.work_dir);

        let output =
            run_command_with_timeout(cmd, self.toolchain.timeout, self.toolchain.output_limit_bytes)
                .map_err(|err| StageError::new(stage, format!("{err:#}")))?;

        if output.timed_out {
            return Err(StageError::new(
                stage,
                format!("{stage} timed out after {}s", self.toolchain.timeout.as_secs()),
            )
            .with_detail(output.transcript()));
        }
        if !output.success() {
            let message = output
                .last_stderr_line()
                .unwrap_or_else(|| format!("{stage} exited with {}", output.status));
            return Err(StageError::new(stage, message).with_detail(output.transcript()));
        }
        debug!("stage passed");
        Ok(())
    }
}

impl ItemHandle for CommandItem<'_> {
    fn check_integrity(&self) -> Result<(), StageError> {
        self.run_stage(Stage::Integrity, &self.toolchain.stages.check_integrity, 0)
    }

    fn run_tests(&self, samples: u32) -> Result<(), StageError> {
        self.run_stage(Stage::Tests, &self.toolchain.stages.run_tests, samples)
    }

    fn package(&self) -> Result<PathBuf, StageError> {
        self.run_stage(Stage::Package, &self.toolchain.stages.package, 0)?;
        Ok(self.toolchain.work_dir.join(artifact_file_name(
            &self.name,
            &self.toolchain.stages.artifact_extension,
        )))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec![
            "sh".to_string(),
            "-c".to_string(),
            script.to_string(),
            "sh".to_string(),
            "{item}".to_string(),
            "{name}".to_string(),
            "{samples}".to_string(),
        ]
    }

    fn toolchain(work_dir: &Path, stages: ToolchainConfig) -> CommandToolchain {
        let cfg = HivebuildConfig {
            work_dir: work_dir.to_path_buf(),
            toolchain: stages,
            stage_timeout_secs: 10,
            ..HivebuildConfig::default()
        };
        CommandToolchain::new(&cfg)
    }

    #[test]
    fn failing_stage_reports_last_stderr_line_and_transcript() {
        let temp = tempfile::tempdir().expect("tempdir");
        let stages = ToolchainConfig {
            check_integrity: sh(
                "echo 'Traceback (most recent call last):' >&2; echo \"ValueError: $2 is broken\" >&2; exit 1",
            ),
            ..ToolchainConfig::default()
        };
        let toolchain = toolchain(temp.path(), stages);
        let handle = toolchain.bind(&temp.path().join("maze"));

        let err = handle.check_integrity().expect_err("integrity fails");
        assert_eq!(err.stage, Stage::Integrity);
        assert_eq!(err.message, "ValueError: maze is broken");
        assert!(err.detail.starts_with("Traceback (most recent call last):"));
    }

    #[test]
    fn run_tests_receives_sample_count() {
        let temp = tempfile::tempdir().expect("tempdir");
        let stages = ToolchainConfig {
            run_tests: sh("test \"$3\" = 100"),
            ..ToolchainConfig::default()
        };
        let toolchain = toolchain(temp.path(), stages);
        let handle = toolchain.bind(&temp.path().join("maze"));
        handle.run_tests(100).expect("samples passed through");
        let err = handle.run_tests(7).expect_err("wrong sample count");
        assert_eq!(err.stage, Stage::Tests);
        assert!(err.message.contains("exited with"));
    }

    #[test]
    fn package_runs_in_work_dir_and_names_artifact() {
        let temp = tempfile::tempdir().expect("tempdir");
        let stages = ToolchainConfig {
            package: sh("touch \"$2.alghive\""),
            ..ToolchainConfig::default()
        };
        let toolchain = toolchain(temp.path(), stages);
        let handle = toolchain.bind(&temp.path().join("maze"));

        let artifact = handle.package().expect("package");
        assert_eq!(artifact, temp.path().join("maze.alghive"));
        assert!(artifact.is_file());
    }
}
