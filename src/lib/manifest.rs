//! Convenience-script injection into a project's `package.json`.
//!
//! `init` offers to wire the tool into the project's npm scripts. The patch
//! only adds missing entries, never overwrites existing ones, and the
//! manifest's other fields and key order survive the rewrite untouched.

use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tracing::{debug, info};

const MANIFEST_FILE: &str = "package.json";

/// Candidate source directories, probed in order.
const SOURCE_DIR_CANDIDATES: &[&str] = &["src", "app", "lib", "source"];

/// Returns the source directories that exist under `base`, or `["./"]` when
/// none of the usual candidates do.
pub fn find_source_dirs(base: &Path) -> Vec<String> {
  let found: Vec<String> = SOURCE_DIR_CANDIDATES
    .iter()
    .filter(|dir| base.join(dir).is_dir())
    .map(|dir| dir.to_string())
    .collect();

  if found.is_empty() {
    vec!["./".to_string()]
  } else {
    found
  }
}

/// Picks the most likely source directory under `base`, `/`-suffixed.
pub fn detect_source_dir(base: &Path) -> String {
  let dirs = find_source_dirs(base);
  ensure_trailing_slash(&dirs[0])
}

fn ensure_trailing_slash(dir: &str) -> String {
  if dir.ends_with('/') {
    dir.to_string()
  } else {
    format!("{dir}/")
  }
}

/// Adds the `env-tool` script entries to a parsed manifest, targeting
/// `source_dir` for init and audit. Existing entries are left alone.
pub fn update_scripts(manifest: &mut Value, source_dir: &str) -> Result<(), ManifestError> {
  let source_dir = ensure_trailing_slash(source_dir);

  let root = manifest
    .as_object_mut()
    .ok_or_else(|| ManifestError::Shape("top level is not an object".to_string()))?;

  let scripts = root
    .entry("scripts")
    .or_insert_with(|| json!({}))
    .as_object_mut()
    .ok_or_else(|| ManifestError::Shape("\"scripts\" is not an object".to_string()))?;

  let additions = [
    ("env-tool", "env-tool".to_string()),
    ("env:init", format!("env-tool init {source_dir}")),
    ("env:audit", format!("env-tool audit {source_dir}")),
    ("env:validate", "env-tool validate .env".to_string()),
    ("env:sync", "env-tool sync .env".to_string()),
  ];

  for (name, command) in additions {
    if !scripts.contains_key(name) {
      debug!("adding script {} = {:?}", name, command);
      scripts.insert(name.to_string(), Value::String(command));
    }
  }

  Ok(())
}

/// Patches the `package.json` under `project_dir` with the `env-tool`
/// scripts.
pub fn patch_file(project_dir: &Path, source_dir: &str) -> Result<(), ManifestError> {
  let path = project_dir.join(MANIFEST_FILE);

  let contents = std::fs::read_to_string(&path).map_err(|err| {
    if err.kind() == io::ErrorKind::NotFound {
      ManifestError::NotFound(path.clone())
    } else {
      ManifestError::Io(err)
    }
  })?;

  let mut manifest: Value = serde_json::from_str(&contents)?;
  update_scripts(&mut manifest, source_dir)?;

  let mut out = serde_json::to_string_pretty(&manifest)?;
  out.push('\n');
  std::fs::write(&path, out).map_err(ManifestError::Io)?;

  info!("added env-tool scripts to {:?}", path);
  Ok(())
}

/// Errors raised while patching the package manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
  #[error("No package.json found at {0}")]
  NotFound(PathBuf),
  #[error("package.json IO error: {0}")]
  Io(std::io::Error),
  #[error("package.json parse error: {0}")]
  Parse(#[from] serde_json::Error),
  #[error("package.json has an unexpected shape: {0}")]
  Shape(String),
}
