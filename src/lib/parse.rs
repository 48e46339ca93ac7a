//! Dotenv-style parsing of `KEY=VALUE` files.
//!
//! Produces the key/value view the validator and synchronizer consume. A key
//! that is present with an empty value is distinct from an absent key, so the
//! map is built only from lines that actually define a variable; comments and
//! blank lines are skipped.

use std::collections::HashMap;
use std::convert::TryFrom;

use tracing::trace;

const COMMENT_PREFIX: &str = "#";
const ASSIGNMENT_OPERATOR: &str = "=";
const EXPORT_PREFIX: &str = "export ";

/// Parsed contents of an env file: variable name to value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnvMap {
  values: HashMap<String, String>,
}

impl EnvMap {
  /// Returns the value for `key`, if the file defines it.
  pub fn get(&self, key: &str) -> Option<&str> {
    self.values.get(key).map(String::as_str)
  }

  /// Whether the file defines `key`, even with an empty value.
  pub fn contains(&self, key: &str) -> bool {
    self.values.contains_key(key)
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.values.insert(key.into(), value.into());
  }
}

impl TryFrom<&str> for EnvMap {
  type Error = ParseError;

  fn try_from(s: &str) -> Result<Self, Self::Error> {
    let mut values = HashMap::new();

    for line in s.lines() {
      trace!("parsing line: {:?}", line);

      match EnvLine::try_from(line)? {
        EnvLine::Definition { key, value } => {
          values.insert(key, value);
        }
        EnvLine::Comment | EnvLine::Blank => {}
      }
    }

    Ok(Self { values })
  }
}

/// A single classified line of an env file.
#[derive(Debug, Clone, PartialEq)]
enum EnvLine {
  Definition { key: String, value: String },
  Comment,
  Blank,
}

impl TryFrom<&str> for EnvLine {
  type Error = ParseError;

  fn try_from(s: &str) -> Result<Self, Self::Error> {
    let trimmed = s.trim();

    if trimmed.is_empty() {
      return Ok(EnvLine::Blank);
    }
    if trimmed.starts_with(COMMENT_PREFIX) {
      return Ok(EnvLine::Comment);
    }

    let trimmed = trimmed.strip_prefix(EXPORT_PREFIX).unwrap_or(trimmed);

    let Some((key, value_part)) = trimmed.split_once(ASSIGNMENT_OPERATOR) else {
      return Err(ParseError::InvalidLine(s.to_string()));
    };

    Ok(EnvLine::Definition {
      key: key.trim().to_string(),
      value: parse_value(value_part),
    })
  }
}

/// Applies dotenv value rules: surrounding quotes are stripped; inline
/// comments are only recognized on unquoted values.
fn parse_value(raw: &str) -> String {
  let trimmed = raw.trim();

  for quote in ['"', '\''] {
    if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
      return trimmed[1..trimmed.len() - 1].to_string();
    }
  }

  match trimmed.split_once(COMMENT_PREFIX) {
    Some((value, _)) => value.trim().to_string(),
    None => trimmed.to_string(),
  }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
  #[error("Invalid line: {0}")]
  InvalidLine(String),
}
