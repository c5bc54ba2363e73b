//! Output staging: delivery folders are created fresh and filled exactly once.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, WorkflowError};

/// Prepare `path` as the run's output directory.
///
/// Missing directories are created with their parents. An existing path is
/// only accepted if it is an empty directory, so a run can never mix its
/// output into, or clobber, an earlier delivery.
pub fn prepare_output_dir(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() || !is_empty_dir(path)? {
            return Err(WorkflowError::OutputDirConflict {
                path: path.to_path_buf(),
            });
        }
        return Ok(());
    }
    fs::create_dir_all(path)
        .map_err(|err| WorkflowError::io(format!("create {}", path.display()), err))
}

fn is_empty_dir(path: &Path) -> Result<bool> {
    let mut entries = fs::read_dir(path)
        .map_err(|err| WorkflowError::io(format!("read {}", path.display()), err))?;
    Ok(entries.next().is_none())
}

/// Copy one frame into `out_dir` under its source file name, carrying the
/// source's modified time across when the platform allows it.
pub fn copy_into(source: &Path, out_dir: &Path) -> Result<PathBuf> {
    let file_name = source.file_name().ok_or_else(|| {
        WorkflowError::io(
            format!("copy {}", source.display()),
            std::io::Error::other("source has no file name"),
        )
    })?;
    let dest = out_dir.join(file_name);
    fs::copy(source, &dest)
        .map_err(|err| WorkflowError::io(format!("copy {}", source.display()), err))?;
    if let Err(err) = copy_mtime(source, &dest) {
        tracing::debug!("could not carry mtime onto {}: {err}", dest.display());
    }
    Ok(dest)
}

fn copy_mtime(source: &Path, dest: &Path) -> std::io::Result<()> {
    let modified = fs::metadata(source)?.modified()?;
    let file = fs::File::options().write(true).open(dest)?;
    file.set_modified(modified)
}
