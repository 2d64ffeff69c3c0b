//! Build configuration loaded from `hivebuild.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

const INTEGRITY_SCRIPT: &str = "import sys
from hivecraft.alghive import Alghive
Alghive(sys.argv[1]).check_integrity()
";

const TESTS_SCRIPT: &str = "import sys
from hivecraft.alghive import Alghive
Alghive(sys.argv[1]).run_tests(int(sys.argv[2]))
";

const PACKAGE_SCRIPT: &str = "import sys
from hivecraft.alghive import Alghive
Alghive(sys.argv[1]).zip_folder()
";

/// hivebuild configuration (TOML).
///
/// Every field is optional in the file; missing fields take the defaults
/// that drive the `hivecraft` Python package.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HivebuildConfig {
    /// Sample count passed to each item's test run.
    pub test_samples: u32,

    /// Wall-clock budget for a single pipeline stage of one item.
    pub stage_timeout_secs: u64,

    /// Truncate captured stage stdout/stderr beyond this many bytes.
    pub output_limit_bytes: usize,

    /// Directory stage commands run in; packaging writes artifacts here.
    pub work_dir: PathBuf,

    pub provision: ProvisionConfig,

    pub toolchain: ToolchainConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProvisionConfig {
    /// Installer invocation; the package requirement is appended as the last argument.
    pub command: Vec<String>,
    pub package: String,
    pub timeout_secs: u64,
}

/// Stage command templates.
///
/// `{item}` expands to the item directory, `{name}` to its base name and
/// `{samples}` to the configured test sample count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolchainConfig {
    pub artifact_extension: String,
    pub check_integrity: Vec<String>,
    pub run_tests: Vec<String>,
    pub package: Vec<String>,
}

impl Default for HivebuildConfig {
    fn default() -> Self {
        Self {
            test_samples: 100,
            stage_timeout_secs: 30 * 60,
            output_limit_bytes: 100_000,
            work_dir: PathBuf::from("."),
            provision: ProvisionConfig::default(),
            toolchain: ToolchainConfig::default(),
        }
    }
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            command: vec!["pip".to_string(), "install".to_string()],
            package: "hivecraft".to_string(),
            timeout_secs: 10 * 60,
        }
    }
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            artifact_extension: ".alghive".to_string(),
            check_integrity: python_stage(INTEGRITY_SCRIPT, &["{item}"]),
            run_tests: python_stage(TESTS_SCRIPT, &["{item}", "{samples}"]),
            package: python_stage(PACKAGE_SCRIPT, &["{item}"]),
        }
    }
}

fn python_stage(script: &str, args: &[&str]) -> Vec<String> {
    let mut argv = vec!["python3".to_string(), "-c".to_string(), script.to_string()];
    argv.extend(args.iter().map(|arg| (*arg).to_string()));
    argv
}

impl HivebuildConfig {
    pub fn validate(&self) -> Result<()> {
        if self.test_samples == 0 {
            return Err(anyhow!("test_samples must be > 0"));
        }
        if self.stage_timeout_secs == 0 {
            return Err(anyhow!("stage_timeout_secs must be > 0"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        if self.provision.timeout_secs == 0 {
            return Err(anyhow!("provision.timeout_secs must be > 0"));
        }
        if self.provision.package.trim().is_empty() {
            return Err(anyhow!("provision.package must be non-empty"));
        }
        ensure_command("provision.command", &self.provision.command)?;
        ensure_command("toolchain.check_integrity", &self.toolchain.check_integrity)?;
        ensure_command("toolchain.run_tests", &self.toolchain.run_tests)?;
        ensure_command("toolchain.package", &self.toolchain.package)?;
        let ext = &self.toolchain.artifact_extension;
        if ext.len() < 2 || !ext.starts_with('.') || ext.contains(['/', '\\']) {
            return Err(anyhow!(
                "toolchain.artifact_extension must look like \".ext\", got {ext:?}"
            ));
        }
        Ok(())
    }

    pub fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.stage_timeout_secs)
    }

    pub fn provision_timeout(&self) -> Duration {
        Duration::from_secs(self.provision.timeout_secs)
    }
}

fn ensure_command(field: &str, command: &[String]) -> Result<()> {
    match command.first() {
        Some(program) if !program.trim().is_empty() => Ok(()),
        _ => Err(anyhow!("{field} must be a non-empty array")),
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `HivebuildConfig::default()`.
pub fn load_config(path: &Path) -> Result<HivebuildConfig> {
    if !path.exists() {
        let cfg = HivebuildConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: HivebuildConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, HivebuildConfig::default());
        assert_eq!(cfg.test_samples, 100);
        assert_eq!(cfg.toolchain.artifact_extension, ".alghive");
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("hivebuild.toml");
        fs::write(
            &path,
            "test_samples = 5\n\n[provision]\ncommand = [\"uv\", \"pip\", \"install\"]\n",
        )
        .expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.test_samples, 5);
        assert_eq!(cfg.provision.command, vec!["uv", "pip", "install"]);
        assert_eq!(cfg.provision.package, "hivecraft");
        assert_eq!(cfg.toolchain, ToolchainConfig::default());
    }

    #[test]
    fn rejects_zero_samples() {
        let cfg = HivebuildConfig {
            test_samples: 0,
            ..HivebuildConfig::default()
        };
        let err = cfg.validate().expect_err("zero samples");
        assert!(err.to_string().contains("test_samples"));
    }

    #[test]
    fn rejects_extension_without_dot() {
        let mut cfg = HivebuildConfig::default();
        cfg.toolchain.artifact_extension = "alghive".to_string();
        let err = cfg.validate().expect_err("bad extension");
        assert!(err.to_string().contains("artifact_extension"));
    }

    #[test]
    fn rejects_empty_stage_command() {
        let mut cfg = HivebuildConfig::default();
        cfg.toolchain.package = Vec::new();
        let err = cfg.validate().expect_err("empty command");
        assert!(err.to_string().contains("toolchain.package"));
    }

    #[test]
    fn default_stages_call_hivecraft() {
        let toolchain = ToolchainConfig::default();
        assert_eq!(toolchain.run_tests[0], "python3");
        assert!(toolchain.run_tests[2].contains("run_tests(int(sys.argv[2]))"));
        assert_eq!(&toolchain.run_tests[3..], ["{item}", "{samples}"]);
    }
}
