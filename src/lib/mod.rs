//! Environment variable schema tooling.
//!
//! This library keeps a project's declared env var schema (`envconfig.json`)
//! consistent with the source code that references those variables and with
//! the `.env` files used at runtime.
//!
//! # Operations
//!
//! - **Scan**: collect `process.env.*` references from a source tree
//! - **Init**: build a fresh schema from a scan
//! - **Audit**: find referenced variables missing from the schema
//! - **Validate**: find required variables missing or empty in an env file
//! - **Sync**: regenerate an env file from the schema, keeping existing values
//!
//! # Example
//!
//! ```rust,no_run
//! use env_tool::check::audit;
//! use env_tool::scan::{AllowAllFiles, scan_vars};
//! use env_tool::schema::Schema;
//! use std::path::Path;
//!
//! let vars = scan_vars(Path::new("src"), &AllowAllFiles).unwrap();
//! let schema = Schema::load(Path::new("envconfig.json")).unwrap();
//! let issues = audit(&vars, &schema);
//! ```

pub mod check;
pub mod manifest;
pub mod parse;
pub mod scan;
pub mod schema;
pub mod sync;
