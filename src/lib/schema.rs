//! Schema storage: loading, saving and building `envconfig.json`.
//!
//! The schema is a JSON object mapping each variable name to its entry. Key
//! order is significant: validate and sync iterate the schema in file order,
//! so the map preserves it through a load/save round trip.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

const INIT_COMMENT: &str = "This var does something useful";

/// Declaration of a single environment variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaEntry {
  pub required: bool,
  pub default: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub comment: Option<String>,
}

impl SchemaEntry {
  /// The entry's comment, if present and non-empty.
  pub fn comment_text(&self) -> Option<&str> {
    self.comment.as_deref().filter(|c| !c.is_empty())
  }
}

/// Ordered mapping from variable name to its declaration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
  entries: IndexMap<String, SchemaEntry>,
}

impl Schema {
  /// Builds a fresh schema from a set of scanned variable names.
  ///
  /// Every name becomes a required entry with an empty default and a
  /// placeholder comment. The result never merges with a prior schema.
  pub fn from_vars(vars: &BTreeSet<String>) -> Self {
    let entries = vars
      .iter()
      .map(|name| {
        (
          name.clone(),
          SchemaEntry {
            required: true,
            default: String::new(),
            comment: Some(INIT_COMMENT.to_string()),
          },
        )
      })
      .collect();

    Self { entries }
  }

  /// Loads and parses the schema file at `path`.
  pub fn load(path: &Path) -> Result<Self, SchemaError> {
    debug!("loading schema from {:?}", path);

    let contents = std::fs::read_to_string(path).map_err(|err| {
      if err.kind() == io::ErrorKind::NotFound {
        SchemaError::NotFound(path.to_path_buf())
      } else {
        SchemaError::Io(err)
      }
    })?;

    let schema = serde_json::from_str(&contents)?;
    Ok(schema)
  }

  /// Writes the schema to `path` as pretty-printed JSON.
  pub fn save(&self, path: &Path) -> Result<(), SchemaError> {
    debug!("writing schema with {} entries to {:?}", self.len(), path);

    let contents = serde_json::to_string_pretty(&self.entries)?;
    std::fs::write(path, contents).map_err(SchemaError::Io)?;
    Ok(())
  }

  pub fn get(&self, key: &str) -> Option<&SchemaEntry> {
    self.entries.get(key)
  }

  pub fn contains(&self, key: &str) -> bool {
    self.entries.contains_key(key)
  }

  /// Entries in schema (file) order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaEntry)> {
    self.entries.iter().map(|(k, v)| (k.as_str(), v))
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn insert(&mut self, key: impl Into<String>, entry: SchemaEntry) {
    self.entries.insert(key.into(), entry);
  }
}

/// Errors raised while loading or saving the schema file.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
  /// The schema file does not exist yet
  #[error("Schema file not found: {0}. Run `env-tool init <dir>` to create one")]
  NotFound(PathBuf),
  /// Error reading or writing the schema file
  #[error("Schema file IO error: {0}")]
  Io(std::io::Error),
  /// The schema file is not valid JSON
  #[error("Schema file parse error: {0}")]
  Parse(#[from] serde_json::Error),
}
