//! Env file generation from the schema.
//!
//! The output is fully schema-driven: variables are emitted in schema order,
//! each preceded by its `###` comment when one is declared, with one blank
//! line between blocks. A value already present in the env file wins over the
//! schema default, even when it is empty. Keys in the env file but absent
//! from the schema are dropped.

use std::io;
use std::path::Path;

use tracing::{debug, info};

use crate::parse::{EnvMap, ParseError};
use crate::schema::Schema;

/// Produces the full replacement text for an env file.
pub fn render(schema: &Schema, env: &EnvMap) -> String {
  let mut out = Vec::new();

  for (key, entry) in schema.iter() {
    if let Some(comment) = entry.comment_text() {
      out.push(format!("### {comment}"));
    }

    let value = env.get(key).unwrap_or(&entry.default);
    out.push(format!("{key}={value}\n"));
  }

  out.join("\n")
}

/// Regenerates the env file at `path` from the schema, preserving any values
/// the file already defines.
///
/// A missing env file is treated as empty, so sync can create the file from
/// scratch; any other read failure is an error.
pub fn sync_file(schema: &Schema, path: &Path) -> Result<(), SyncError> {
  let env = match std::fs::read_to_string(path) {
    Ok(contents) => EnvMap::try_from(contents.as_str())?,
    Err(err) if err.kind() == io::ErrorKind::NotFound => {
      debug!("{:?} does not exist, syncing from an empty env", path);
      EnvMap::default()
    }
    Err(err) => return Err(SyncError::EnvIo(err)),
  };

  let contents = render(schema, &env);
  std::fs::write(path, contents).map_err(SyncError::Write)?;

  info!("synced {} variables to {:?}", schema.len(), path);
  Ok(())
}

/// Writes a fresh env file at `path` from the schema defaults alone.
pub fn create_file(schema: &Schema, path: &Path) -> Result<(), SyncError> {
  let contents = render(schema, &EnvMap::default());
  std::fs::write(path, contents).map_err(SyncError::Write)?;

  info!("created {:?} with {} variables", path, schema.len());
  Ok(())
}

/// Errors raised while synchronizing an env file.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
  /// Error reading the existing env file
  #[error("Env file IO error: {0}")]
  EnvIo(std::io::Error),
  /// Error parsing the existing env file
  #[error("Env file parse error: {0}")]
  EnvParse(#[from] ParseError),
  /// Error writing the synchronized content
  #[error("Write error: {0}")]
  Write(std::io::Error),
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::schema::SchemaEntry;
  use tempfile::TempDir;

  fn entry(default: &str, comment: &str) -> SchemaEntry {
    SchemaEntry {
      required: true,
      default: default.to_string(),
      comment: (!comment.is_empty()).then(|| comment.to_string()),
    }
  }

  #[test]
  fn test_render_prefers_existing_values() {
    let mut schema = Schema::default();
    schema.insert("EXISTING_VAR", entry("", "This value already exists in the env"));
    schema.insert("NEW_VAR", entry("a_new_value", "This will be added to the env file"));

    let mut env = EnvMap::default();
    env.insert("EXISTING_VAR", "an_existing_value");

    let text = render(&schema, &env);
    assert!(text.contains("EXISTING_VAR=an_existing_value\n"));
    assert!(text.contains("NEW_VAR=a_new_value\n"));
  }

  #[test]
  fn test_render_empty_present_value_wins_over_default() {
    let mut schema = Schema::default();
    schema.insert("KEY", entry("fallback", ""));

    let mut env = EnvMap::default();
    env.insert("KEY", "");

    assert_eq!(render(&schema, &env), "KEY=\n");
  }

  #[test]
  fn test_render_block_layout() {
    let mut schema = Schema::default();
    schema.insert("E", entry("", "exists"));
    schema.insert("N", entry("nv", "new"));

    let mut env = EnvMap::default();
    env.insert("E", "ev");

    assert_eq!(render(&schema, &env), "### exists\nE=ev\n\n### new\nN=nv\n");
  }

  #[test]
  fn test_render_without_comment() {
    let mut schema = Schema::default();
    schema.insert("TEST", entry("a_default_value", "test comment"));
    schema.insert("BARE", entry("x", ""));

    let text = render(&schema, &EnvMap::default());
    assert_eq!(text, "### test comment\nTEST=a_default_value\n\nBARE=x\n");
  }

  #[test]
  fn test_render_drops_unknown_env_keys() {
    let mut schema = Schema::default();
    schema.insert("KNOWN", entry("", ""));

    let mut env = EnvMap::default();
    env.insert("KNOWN", "v");
    env.insert("STRAY", "gone");

    let text = render(&schema, &env);
    assert_eq!(text, "KNOWN=v\n");
  }

  #[test]
  fn test_render_empty_schema() {
    assert_eq!(render(&Schema::default(), &EnvMap::default()), "");
  }

  #[test]
  fn test_sync_file_missing_env_creates_it() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".env");

    let mut schema = Schema::default();
    schema.insert("KEY", entry("default_value", "Test variable"));

    sync_file(&schema, &path).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, "### Test variable\nKEY=default_value\n");
  }

  #[test]
  fn test_sync_file_overwrites_and_preserves_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".env");
    std::fs::write(&path, "KEY=kept\nSTRAY=dropped\n").unwrap();

    let mut schema = Schema::default();
    schema.insert("KEY", entry("default_value", ""));

    sync_file(&schema, &path).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, "KEY=kept\n");
  }

  #[test]
  fn test_sync_file_round_trips_through_its_own_output() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".env");

    let mut schema = Schema::default();
    schema.insert("A", entry("one", "first"));
    schema.insert("B", entry("two", ""));

    sync_file(&schema, &path).unwrap();
    let first = std::fs::read_to_string(&path).unwrap();

    // Running sync again over its own output must be a fixed point.
    sync_file(&schema, &path).unwrap();
    let second = std::fs::read_to_string(&path).unwrap();
    assert_eq!(first, second);
  }

  #[test]
  fn test_create_file_ignores_existing_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fresh.env");
    std::fs::write(&path, "KEY=old_value\n").unwrap();

    let mut schema = Schema::default();
    schema.insert("KEY", entry("default_value", ""));

    create_file(&schema, &path).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, "KEY=default_value\n");
  }
}
