//! Test-only scripted toolchain.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::outcome::{Stage, StageError};
use crate::io::toolchain::{ItemHandle, ItemToolchain, artifact_file_name};

pub const FAKE_EXTENSION: &str = ".alghive";

/// How the fake toolchain treats a given item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Script {
    Pass,
    FailIntegrity(String),
    FailTests(String),
    FailPackage(String),
    /// Packaging reports success but writes nothing.
    NoArtifact,
}

/// Toolchain whose per-item behavior is scripted by item name.
///
/// Items without a script pass. Every stage call is recorded as
/// `"<item>:<stage>"` so tests can assert on sequencing.
#[derive(Debug)]
pub struct FakeToolchain {
    work_dir: PathBuf,
    scripts: BTreeMap<String, Script>,
    calls: RefCell<Vec<String>>,
}

impl FakeToolchain {
    pub fn new(work_dir: &Path) -> Self {
        Self {
            work_dir: work_dir.to_path_buf(),
            scripts: BTreeMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn script(mut self, item: &str, script: Script) -> Self {
        self.scripts.insert(item.to_string(), script);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl ItemToolchain for FakeToolchain {
    fn artifact_extension(&self) -> &str {
        FAKE_EXTENSION
    }

    fn bind<'a>(&'a self, item_dir: &Path) -> Box<dyn ItemHandle + 'a> {
        let name = item_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let script = self.scripts.get(&name).cloned().unwrap_or(Script::Pass);
        Box::new(FakeItem {
            toolchain: self,
            name,
            script,
        })
    }
}

struct FakeItem<'a> {
    toolchain: &'a FakeToolchain,
    name: String,
    script: Script,
}

impl FakeItem<'_> {
    fn record(&self, call: &str) {
        self.toolchain
            .calls
            .borrow_mut()
            .push(format!("{}:{call}", self.name));
    }
}

impl ItemHandle for FakeItem<'_> {
    fn check_integrity(&self) -> Result<(), StageError> {
        self.record("integrity");
        match &self.script {
            Script::FailIntegrity(message) => Err(StageError::new(Stage::Integrity, message.clone())
                .with_detail(format!("Traceback (most recent call last):\n{message}"))),
            _ => Ok(()),
        }
    }

    fn run_tests(&self, samples: u32) -> Result<(), StageError> {
        self.record(&format!("tests({samples})"));
        match &self.script {
            Script::FailTests(message) => Err(StageError::new(Stage::Tests, message.clone())),
            _ => Ok(()),
        }
    }

    fn package(&self) -> Result<PathBuf, StageError> {
        self.record("package");
        let artifact = self
            .toolchain
            .work_dir
            .join(artifact_file_name(&self.name, FAKE_EXTENSION));
        match &self.script {
            Script::FailPackage(message) => Err(StageError::new(Stage::Package, message.clone())),
            Script::NoArtifact => Ok(artifact),
            _ => {
                fs::write(&artifact, format!("packaged {}\n", self.name))
                    .map_err(|err| StageError::new(Stage::Package, err.to_string()))?;
                Ok(artifact)
            }
        }
    }
}

/// Create one directory per name under `root`.
pub fn make_items(root: &Path, names: &[&str]) {
    for name in names {
        fs::create_dir_all(root.join(name)).expect("create item dir");
    }
}
