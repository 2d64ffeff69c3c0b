//! Installation of the external packaging library before any pipeline work.

use std::process::Command;

use anyhow::{Result, bail};
use tracing::{info, instrument};

use crate::core::version::VersionSelector;
use crate::io::config::HivebuildConfig;
use crate::io::process::run_command_with_timeout;

/// Build the installer invocation for `version`.
pub fn install_command(cfg: &HivebuildConfig, version: &VersionSelector) -> Command {
    let requirement = version.requirement(&cfg.provision.package);
    let (program, args) = cfg
        .provision
        .command
        .split_first()
        .map_or(("pip", &[][..]), |(program, args)| (program.as_str(), args));
    let mut cmd = Command::new(program);
    cmd.args(args).arg(requirement);
    cmd
}

/// Install the packaging library, failing hard if the installer does.
#[instrument(skip_all, fields(version = %version))]
pub fn provision(cfg: &HivebuildConfig, version: &VersionSelector) -> Result<()> {
    let requirement = version.requirement(&cfg.provision.package);
    println!("install: {requirement}");

    let output = run_command_with_timeout(
        install_command(cfg, version),
        cfg.provision_timeout(),
        cfg.output_limit_bytes,
    )?;
    if output.timed_out {
        bail!(
            "install {requirement} timed out after {}s",
            cfg.provision.timeout_secs
        );
    }
    if !output.status.success() {
        bail!(
            "install {requirement} failed ({}):\n{}",
            output.status,
            output.transcript().trim_end()
        );
    }

    info!(%requirement, "packaging library installed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_of(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn pinned_version_appends_exact_requirement() {
        let cfg = HivebuildConfig::default();
        let cmd = install_command(&cfg, &VersionSelector::Pinned("2.0.1".to_string()));
        assert_eq!(cmd.get_program(), "pip");
        assert_eq!(args_of(&cmd), vec!["install", "hivecraft==2.0.1"]);
    }

    #[test]
    fn latest_appends_bare_package() {
        let cfg = HivebuildConfig::default();
        let cmd = install_command(&cfg, &VersionSelector::Latest);
        assert_eq!(args_of(&cmd), vec!["install", "hivecraft"]);
    }

    #[cfg(unix)]
    #[test]
    fn failing_installer_is_fatal() {
        let mut cfg = HivebuildConfig::default();
        cfg.provision.command = vec![
            "sh".to_string(),
            "-c".to_string(),
            "echo \"no matching distribution for $1\" >&2; exit 1".to_string(),
            "sh".to_string(),
        ];
        let err = provision(&cfg, &VersionSelector::Latest).expect_err("install fails");
        let message = format!("{err:#}");
        assert!(message.contains("install hivecraft failed"));
        assert!(message.contains("no matching distribution for hivecraft"));
    }

    #[cfg(unix)]
    #[test]
    fn succeeding_installer_passes() {
        let mut cfg = HivebuildConfig::default();
        cfg.provision.command = vec!["true".to_string()];
        provision(&cfg, &VersionSelector::Latest).expect("install succeeds");
    }
}
