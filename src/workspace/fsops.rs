//! Filesystem primitives
//!
//! Copy-if-absent operations used during workspace materialization. Each
//! primitive reports whether it performed any work, so callers can log
//! what changed and tests can assert idempotence.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Materialization errors
///
/// A missing source fixture is fatal for the whole plan; a partial fixture
/// set cannot produce a trustworthy regression run.
#[derive(Error, Debug)]
pub enum MaterializationError {
    #[error("missing source fixture: {0}")]
    MissingSource(PathBuf),

    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to copy {path}: {source}")]
    Copy {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Create a directory (and its parents) unless it already exists.
pub fn ensure_dir(path: &Path) -> Result<bool, MaterializationError> {
    if path.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(path).map_err(|source| MaterializationError::CreateDir {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("created {}", path.display());
    Ok(true)
}

/// Copy a file to `target` unless the target already exists.
///
/// `target` may be a directory, in which case the source file name is kept.
pub fn copy_file_if_absent(source: &Path, target: &Path) -> Result<bool, MaterializationError> {
    if !source.is_file() {
        return Err(MaterializationError::MissingSource(source.to_path_buf()));
    }

    let target = if target.is_dir() {
        match source.file_name() {
            Some(name) => target.join(name),
            None => return Err(MaterializationError::MissingSource(source.to_path_buf())),
        }
    } else {
        target.to_path_buf()
    };

    if target.is_file() {
        return Ok(false);
    }

    if let Some(parent) = target.parent() {
        ensure_dir(parent)?;
    }
    fs::copy(source, &target).map_err(|source| MaterializationError::Copy {
        path: target.clone(),
        source,
    })?;
    debug!("copied {}", target.display());
    Ok(true)
}

/// Recursively copy a directory tree, skipping files that already exist at
/// the target and any directory whose name appears in `skip_dirs`.
///
/// Existing target files are never overwritten; re-running on an already
/// materialized tree is a no-op.
pub fn copy_tree_if_absent(
    source: &Path,
    target: &Path,
    skip_dirs: &[&str],
) -> Result<bool, MaterializationError> {
    if !source.is_dir() {
        return Err(MaterializationError::MissingSource(source.to_path_buf()));
    }

    let mut performed = ensure_dir(target)?;

    let entries = fs::read_dir(source).map_err(|e| MaterializationError::ReadDir {
        path: source.to_path_buf(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| MaterializationError::ReadDir {
            path: source.to_path_buf(),
            source: e,
        })?;
        let name = entry.file_name();
        let from = entry.path();
        let to = target.join(&name);

        if from.is_dir() {
            if skip_dirs.iter().any(|skip| name.to_str() == Some(*skip)) {
                continue;
            }
            performed |= copy_tree_if_absent(&from, &to, skip_dirs)?;
        } else {
            performed |= copy_file_if_absent(&from, &to)?;
        }
    }

    Ok(performed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn ensure_dir_reports_work_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a/b/c");

        assert!(ensure_dir(&path).unwrap());
        assert!(!ensure_dir(&path).unwrap());
        assert!(path.is_dir());
    }

    #[test]
    fn copy_file_if_absent_never_overwrites() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source.inp");
        let target = dir.path().join("target.inp");
        fs::write(&source, "original").unwrap();

        assert!(copy_file_if_absent(&source, &target).unwrap());
        fs::write(&target, "modified").unwrap();

        assert!(!copy_file_if_absent(&source, &target).unwrap());
        assert_eq!(fs::read_to_string(&target).unwrap(), "modified");
    }

    #[test]
    fn copy_file_into_directory_keeps_name() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("driver.inp");
        let target_dir = dir.path().join("build");
        fs::write(&source, "x").unwrap();
        fs::create_dir(&target_dir).unwrap();

        assert!(copy_file_if_absent(&source, &target_dir).unwrap());
        assert!(target_dir.join("driver.inp").is_file());
    }

    #[test]
    fn missing_source_file_is_fatal() {
        let dir = tempdir().unwrap();
        let result = copy_file_if_absent(&dir.path().join("absent"), dir.path());
        assert!(matches!(result, Err(MaterializationError::MissingSource(_))));
    }

    #[test]
    fn copy_tree_skips_named_directories() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("case");
        fs::create_dir_all(source.join("macos-gnu")).unwrap();
        fs::write(source.join("case.fst"), "input").unwrap();
        fs::write(source.join("macos-gnu/case.outb"), "baseline").unwrap();

        let target = dir.path().join("build");
        assert!(copy_tree_if_absent(&source, &target, &["macos-gnu"]).unwrap());

        assert!(target.join("case.fst").is_file());
        assert!(!target.join("macos-gnu").exists());
    }

    #[test]
    fn copy_tree_is_idempotent() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("case");
        fs::create_dir_all(source.join("sub")).unwrap();
        fs::write(source.join("a.dat"), "a").unwrap();
        fs::write(source.join("sub/b.dat"), "b").unwrap();

        let target = dir.path().join("build");
        assert!(copy_tree_if_absent(&source, &target, &[]).unwrap());
        assert!(!copy_tree_if_absent(&source, &target, &[]).unwrap());
        assert_eq!(fs::read_to_string(target.join("sub/b.dat")).unwrap(), "b");
    }

    #[test]
    fn copy_tree_fills_in_missing_files_only() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("case");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("a.dat"), "a").unwrap();
        fs::write(source.join("b.dat"), "b").unwrap();

        let target = dir.path().join("build");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("a.dat"), "local edit").unwrap();

        assert!(copy_tree_if_absent(&source, &target, &[]).unwrap());
        assert_eq!(fs::read_to_string(target.join("a.dat")).unwrap(), "local edit");
        assert_eq!(fs::read_to_string(target.join("b.dat")).unwrap(), "b");
    }
}
