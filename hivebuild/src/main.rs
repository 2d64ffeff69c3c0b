//! hivebuild: validate, test and package puzzle directories in CI.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use hivebuild::core::report::render_summary;
use hivebuild::core::targets::parse_target_list;
use hivebuild::core::version::VersionSelector;
use hivebuild::exit_codes;
use hivebuild::io::config::load_config;
use hivebuild::io::provision::provision;
use hivebuild::io::toolchain::CommandToolchain;
use hivebuild::logging;
use hivebuild::orchestrate::run_targets;

#[derive(Parser)]
#[command(
    name = "hivebuild",
    version,
    about = "Validate, test and package puzzle directories into tar bundles"
)]
struct Cli {
    /// Comma-separated list of target directories.
    targets: String,

    /// Directory receiving per-target artifacts and archives.
    #[arg(default_value = "out")]
    output_root: PathBuf,

    /// hivecraft version to install (`latest` for the newest release).
    #[arg(id = "hivecraft_version", value_name = "VERSION", default_value = "latest")]
    version: VersionSelector,

    /// Build configuration; defaults apply when the file is missing.
    #[arg(long, default_value = "hivebuild.toml")]
    config: PathBuf,
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::FAILURE);
        }
    }
}

fn run() -> Result<i32> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() {
                exit_codes::FAILURE
            } else {
                exit_codes::OK
            };
            err.print().context("print usage")?;
            return Ok(code);
        }
    };

    let targets = parse_target_list(&cli.targets)?;
    let cfg = load_config(&cli.config)?;
    provision(&cfg, &cli.version).context("provision packaging library")?;

    let toolchain = CommandToolchain::new(&cfg);
    let report = run_targets(&toolchain, &targets, &cli.output_root, cfg.test_samples)?;
    print!("\n{}", render_summary(&report));
    Ok(report.exit_code())
}
