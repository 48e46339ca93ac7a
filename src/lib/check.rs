//! Reconciliation checks: audit (code vs schema) and validate (env vs schema).

use std::collections::BTreeSet;
use std::fmt;

use crate::parse::EnvMap;
use crate::schema::Schema;

/// What is wrong with a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
  /// Referenced in code but absent from the schema
  NotInSchema,
  /// Required by the schema but absent from the env file
  NotDefined,
  /// Required by the schema but empty in the env file
  NoValue,
}

impl fmt::Display for IssueKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      IssueKind::NotInSchema => write!(f, "is not defined in schema"),
      IssueKind::NotDefined => write!(f, "is required, but is not defined"),
      IssueKind::NoValue => write!(f, "is required, but has no value"),
    }
  }
}

/// A single finding from audit or validate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
  pub key: String,
  pub kind: IssueKind,
}

impl Issue {
  fn new(key: &str, kind: IssueKind) -> Self {
    Self {
      key: key.to_string(),
      kind,
    }
  }
}

impl fmt::Display for Issue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.key, self.kind)
  }
}

/// Reports scanned variable names that the schema does not declare.
///
/// The check is one-directional: schema entries never referenced in code are
/// not reported. Issues follow the iteration order of `vars`.
pub fn audit(vars: &BTreeSet<String>, schema: &Schema) -> Vec<Issue> {
  vars
    .iter()
    .filter(|name| !schema.contains(name))
    .map(|name| Issue::new(name, IssueKind::NotInSchema))
    .collect()
}

/// Reports required schema variables that are missing or empty in `env`.
///
/// Iterates the schema in file order; entries with `required: false` are
/// never checked. An empty result means the env file is valid.
pub fn validate(schema: &Schema, env: &EnvMap) -> Vec<Issue> {
  let mut issues = Vec::new();

  for (key, entry) in schema.iter() {
    if !entry.required {
      continue;
    }

    match env.get(key) {
      None => issues.push(Issue::new(key, IssueKind::NotDefined)),
      Some(value) if value.is_empty() => issues.push(Issue::new(key, IssueKind::NoValue)),
      Some(_) => {}
    }
  }

  issues
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::schema::SchemaEntry;

  fn entry(required: bool, default: &str, comment: &str) -> SchemaEntry {
    SchemaEntry {
      required,
      default: default.to_string(),
      comment: Some(comment.to_string()),
    }
  }

  fn vars(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn test_audit_documented_var_is_clean() {
    let mut schema = Schema::default();
    schema.insert("A", entry(true, "", "c"));

    assert!(audit(&vars(&["A"]), &schema).is_empty());
  }

  #[test]
  fn test_audit_reports_undocumented_var() {
    let schema = Schema::default();
    let issues = audit(&vars(&["B"]), &schema);

    assert_eq!(issues, vec![Issue::new("B", IssueKind::NotInSchema)]);
  }

  #[test]
  fn test_audit_is_one_directional() {
    // Schema entries unused in code are deliberately not reported.
    let mut schema = Schema::default();
    schema.insert("UNUSED", entry(true, "", ""));

    assert!(audit(&BTreeSet::new(), &schema).is_empty());
  }

  #[test]
  fn test_audit_empty_iff_all_documented() {
    let mut schema = Schema::default();
    schema.insert("A", entry(true, "", ""));
    schema.insert("B", entry(false, "", ""));

    assert!(audit(&vars(&["A", "B"]), &schema).is_empty());
    assert_eq!(audit(&vars(&["A", "B", "C"]), &schema).len(), 1);
  }

  #[test]
  fn test_validate_missing_required_var() {
    let mut schema = Schema::default();
    schema.insert("X", entry(true, "", ""));

    let issues = validate(&schema, &EnvMap::default());
    assert_eq!(issues, vec![Issue::new("X", IssueKind::NotDefined)]);
  }

  #[test]
  fn test_validate_empty_required_var() {
    let mut schema = Schema::default();
    schema.insert("X", entry(true, "", ""));

    let mut env = EnvMap::default();
    env.insert("X", "");

    let issues = validate(&schema, &env);
    assert_eq!(issues, vec![Issue::new("X", IssueKind::NoValue)]);
  }

  #[test]
  fn test_validate_full_matrix() {
    let mut schema = Schema::default();
    schema.insert("NO_PROBLEM", entry(true, "", ""));
    schema.insert("NOT_DEFINED", entry(true, "", ""));
    schema.insert("NOT_REQUIRED", entry(false, "", ""));
    schema.insert("NO_VALUE", entry(true, "", ""));

    let mut env = EnvMap::default();
    env.insert("NO_PROBLEM", "a_valid_value");
    env.insert("NO_VALUE", "");

    let issues = validate(&schema, &env);
    assert_eq!(
      issues,
      vec![
        Issue::new("NOT_DEFINED", IssueKind::NotDefined),
        Issue::new("NO_VALUE", IssueKind::NoValue),
      ]
    );
  }

  #[test]
  fn test_validate_ignores_optional_vars() {
    let mut schema = Schema::default();
    schema.insert("OPT", entry(false, "", ""));

    let mut env = EnvMap::default();
    assert!(validate(&schema, &env).is_empty());

    env.insert("OPT", "");
    assert!(validate(&schema, &env).is_empty());
  }

  #[test]
  fn test_validate_follows_schema_order() {
    let mut schema = Schema::default();
    schema.insert("Z", entry(true, "", ""));
    schema.insert("A", entry(true, "", ""));

    let keys: Vec<String> = validate(&schema, &EnvMap::default())
      .into_iter()
      .map(|iss| iss.key)
      .collect();
    assert_eq!(keys, vec!["Z", "A"]);
  }

  #[test]
  fn test_issue_display() {
    let issue = Issue::new("API_KEY", IssueKind::NoValue);
    assert_eq!(issue.to_string(), "API_KEY is required, but has no value");
  }
}
