//! Project directories for generated sources and build artifacts.
//!
//! One project = one directory holding `main.go` and, after a successful
//! build, an executable named after the project.

use crate::config::Config;
use crate::llm::parse::clean_generated_code;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const SOURCE_FILE: &str = "main.go";

#[derive(Debug, Clone)]
pub struct Project {
    pub name: String,
    pub dir: PathBuf,
}

impl Project {
    /// Create (or reuse) `<workspace>/<name>`. The name must be a single
    /// plain path component; anything that could escape the workspace is
    /// rejected.
    pub fn create(workspace: &Path, name: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Project name cannot be empty");
        }
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => bail!("Invalid project name: {}", name),
        }

        let dir = workspace.join(name);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create project directory {}", dir.display()))?;
        let dir = dir
            .canonicalize()
            .with_context(|| format!("Failed to resolve project directory {}", dir.display()))?;

        Ok(Self {
            name: name.to_string(),
            dir,
        })
    }

    pub fn source_path(&self) -> PathBuf {
        self.dir.join(SOURCE_FILE)
    }

    pub fn binary_path(&self) -> PathBuf {
        self.dir.join(&self.name)
    }

    pub fn write_source(&self, code: &str) -> Result<()> {
        let path = self.source_path();
        fs::write(&path, code)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn read_source(&self) -> Result<String> {
        let path = self.source_path();
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))
    }
}

/// Create the project and persist a model response as its source, fences
/// stripped. Nothing is written when cleaning yields an empty body.
pub fn materialize(workspace: &Path, name: &str, raw_output: &str) -> Result<Project> {
    let code = clean_generated_code(raw_output);
    if code.is_empty() {
        bail!("Model returned no code");
    }
    let project = Project::create(workspace, name)?;
    project.write_source(&code)?;
    Ok(project)
}

/// What `clean` did, for reporting.
#[derive(Debug, Default)]
pub struct CleanReport {
    pub removed: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

/// Remove every recorded project directory and reset the recorded list,
/// including entries that no longer exist on disk.
pub fn clean_projects(config: &mut Config) -> CleanReport {
    let mut report = CleanReport::default();

    for dir in std::mem::take(&mut config.project_dirs) {
        if !dir.exists() {
            report.missing.push(dir);
            continue;
        }
        match fs::remove_dir_all(&dir) {
            Ok(()) => report.removed.push(dir),
            Err(e) => report.failed.push((dir, e.to_string())),
        }
    }

    report
}
