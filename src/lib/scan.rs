//! Source tree scanning for environment variable references.
//!
//! The scanner walks a directory with an explicit worklist, reads source
//! files and collects every name referenced as `process.env.<NAME>`. An
//! injected [`TrackedFileProvider`] can restrict the walk to files tracked by
//! version control; when the provider cannot answer, the restriction is
//! dropped and everything is scanned.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace, warn};

/// Directories that are never descended into.
const IGNORED_DIRS: &[&str] = &[".git", "node_modules", "dist", "build", "coverage", ".next"];

/// Extensions of files that are read and matched.
const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx"];

static ENV_ACCESS: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"process\.env\.(\w+)").unwrap());

/// Source of the "which files are tracked" answer used to restrict a scan.
///
/// Returning `None` means no restriction: the scan reads every source file it
/// finds. Paths in the returned set are relative to the scan root.
pub trait TrackedFileProvider {
  fn tracked_files(&self, root: &Path) -> Option<HashSet<PathBuf>>;
}

/// Queries `git` for the tracked file set.
///
/// Both the working-tree probe and the file listing fail open: if either
/// cannot be answered the scan proceeds unrestricted.
pub struct GitTrackedFiles;

impl TrackedFileProvider for GitTrackedFiles {
  fn tracked_files(&self, root: &Path) -> Option<HashSet<PathBuf>> {
    let probe = Command::new("git")
      .args(["rev-parse", "--is-inside-work-tree"])
      .current_dir(root)
      .output();

    match probe {
      Ok(output) if output.status.success() => {}
      _ => {
        debug!("{:?} is not inside a git work tree, scanning all files", root);
        return None;
      }
    }

    let listing = Command::new("git")
      .args(["ls-files", "-z"])
      .current_dir(root)
      .output();

    match listing {
      Ok(output) if output.status.success() => {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let files: HashSet<PathBuf> = stdout
          .split('\0')
          .filter(|entry| !entry.is_empty())
          .map(PathBuf::from)
          .collect();
        debug!("git reports {} tracked files under {:?}", files.len(), root);
        Some(files)
      }
      _ => {
        warn!("git ls-files failed in {:?}, scanning all files", root);
        None
      }
    }
  }
}

/// Null provider: never restricts the scan.
pub struct AllowAllFiles;

impl TrackedFileProvider for AllowAllFiles {
  fn tracked_files(&self, _root: &Path) -> Option<HashSet<PathBuf>> {
    None
  }
}

/// Traversal predicates: which directories are skipped and which files are
/// read.
#[derive(Debug, Clone)]
pub struct ScanFilter {
  ignored_dirs: Vec<String>,
  source_extensions: Vec<String>,
}

impl Default for ScanFilter {
  fn default() -> Self {
    Self {
      ignored_dirs: IGNORED_DIRS.iter().map(|s| s.to_string()).collect(),
      source_extensions: SOURCE_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
    }
  }
}

impl ScanFilter {
  /// Whether `path` names a directory whose whole subtree is skipped.
  pub fn should_ignore(&self, path: &Path) -> bool {
    path
      .file_name()
      .and_then(|name| name.to_str())
      .is_some_and(|name| self.ignored_dirs.iter().any(|dir| dir == name))
  }

  /// Whether `path` has a recognized source file extension.
  pub fn is_source_file(&self, path: &Path) -> bool {
    path
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| self.source_extensions.iter().any(|e| e == ext))
  }
}

/// Collects every variable name referenced as `process.env.<NAME>` under
/// `root`.
///
/// Ignored directories are skipped entirely, only recognized source file
/// extensions are read, and file contents are decoded as UTF-8 with lossy
/// replacement. An empty result is valid.
pub fn scan_vars(
  root: &Path,
  provider: &dyn TrackedFileProvider,
) -> Result<BTreeSet<String>, ScanError> {
  scan_vars_with(root, &ScanFilter::default(), provider)
}

/// Like [`scan_vars`], with caller-supplied traversal predicates.
pub fn scan_vars_with(
  root: &Path,
  filter: &ScanFilter,
  provider: &dyn TrackedFileProvider,
) -> Result<BTreeSet<String>, ScanError> {
  let tracked = provider.tracked_files(root);
  let mut vars = BTreeSet::new();
  let mut worklist = vec![root.to_path_buf()];

  while let Some(dir) = worklist.pop() {
    let entries = std::fs::read_dir(&dir).map_err(|source| ScanError::Io {
      path: dir.clone(),
      source,
    })?;

    for entry in entries {
      let entry = entry.map_err(|source| ScanError::Io {
        path: dir.clone(),
        source,
      })?;
      let path = entry.path();
      let file_type = entry.file_type().map_err(|source| ScanError::Io {
        path: path.clone(),
        source,
      })?;

      if file_type.is_dir() {
        if filter.should_ignore(&path) {
          trace!("skipping ignored directory {:?}", path);
        } else {
          worklist.push(path);
        }
        continue;
      }

      if !filter.is_source_file(&path) {
        continue;
      }

      if let Some(tracked) = &tracked
        && let Ok(relative) = path.strip_prefix(root)
        && !tracked.contains(relative)
      {
        trace!("skipping untracked file {:?}", path);
        continue;
      }

      collect_refs(&path, &mut vars)?;
    }
  }

  debug!("scan of {:?} found {} variables", root, vars.len());
  Ok(vars)
}

fn collect_refs(path: &Path, vars: &mut BTreeSet<String>) -> Result<(), ScanError> {
  let bytes = std::fs::read(path).map_err(|source| ScanError::Io {
    path: path.to_path_buf(),
    source,
  })?;
  let content = String::from_utf8_lossy(&bytes);

  for capture in ENV_ACCESS.captures_iter(&content) {
    let name = &capture[1];
    trace!("found reference to {} in {:?}", name, path);
    vars.insert(name.to_string());
  }

  Ok(())
}

/// Errors raised while walking or reading the source tree.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
  #[error("Failed to read {path}: {source}")]
  Io {
    path: PathBuf,
    source: std::io::Error,
  },
}
