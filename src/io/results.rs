use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, Context, bail};
use log::{debug, info};

use crate::diagnostics::Diagnostics;
use crate::error::PipelineError;

pub const TABLES_DIR: &str = "Tables";
pub const PLOTS_DIR: &str = "Plots";

/// The results directory and its two artifact subdirectories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsTree {
    pub root: PathBuf,
    pub tables: PathBuf,
    pub plots: PathBuf,
}

/// Create `{workdir}/{name}/Tables` and `{workdir}/{name}/Plots` if missing
pub fn setup_results_tree(workdir: &Path, name: &str) -> Result<ResultsTree, PipelineError> {
    let root = workdir.join(name);
    let tree = ResultsTree {
        tables: root.join(TABLES_DIR),
        plots: root.join(PLOTS_DIR),
        root,
    };

    for dir in [&tree.tables, &tree.plots] {
        fs::create_dir_all(dir).map_err(|source| PipelineError::Setup {
            path: dir.clone(),
            source,
        })?;
    }

    info!("Result directories ready under {}", tree.root.display());
    Ok(tree)
}

/// Move each staged artifact into `target_dir`, replacing any file already
/// there. A failed move is recorded and the remaining artifacts are still
/// attempted. Returns the final paths of the artifacts that were moved.
pub fn relocate(paths: &[PathBuf], target_dir: &Path, diagnostics: &mut Diagnostics) -> Vec<PathBuf> {
    let mut moved = Vec::with_capacity(paths.len());
    for path in paths {
        match move_file(path, target_dir) {
            Ok(final_path) => moved.push(final_path),
            Err(e) => diagnostics.error(format!("{:#}", e)),
        }
    }
    moved
}

fn move_file(path: &Path, target_dir: &Path) -> Result<PathBuf> {
    let Some(file_name) = path.file_name() else {
        bail!("Cannot move {}: no file name", path.display());
    };
    let final_path = target_dir.join(file_name);

    if !path.exists() {
        bail!("Source file not found for move operation: {}", path.display());
    }
    if final_path.exists() {
        fs::remove_file(&final_path)
            .with_context(|| format!("Failed to replace existing {}", final_path.display()))?;
    }

    if let Err(e) = fs::rename(path, &final_path) {
        // Rename cannot cross filesystems, fall back to copy and delete
        debug!("Rename of {} failed ({}), copying instead", path.display(), e);
        fs::copy(path, &final_path).with_context(|| {
            format!("Error moving {} to {}", path.display(), target_dir.display())
        })?;
        fs::remove_file(path)
            .with_context(|| format!("Failed to remove staged file {}", path.display()))?;
    }

    Ok(final_path)
}
