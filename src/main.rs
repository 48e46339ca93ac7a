use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, warn};

use env_tool::check;
use env_tool::manifest;
use env_tool::parse::EnvMap;
use env_tool::scan::{AllowAllFiles, GitTrackedFiles, TrackedFileProvider, scan_vars};
use env_tool::schema::Schema;
use env_tool::sync;

#[derive(Parser)]
#[command(
  name = "env-tool",
  about = "Keep a project's env var schema in sync with its code and .env files",
  version,
  author
)]
struct Cli {
  /// Path to the schema file
  #[arg(short, long, global = true, default_value = "./envconfig.json")]
  schema: PathBuf,

  /// Verbose output (-v for verbose, -vv for very verbose)
  #[arg(short, long, global = true, action = clap::ArgAction::Count)]
  verbose: u8,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Scan a source tree and write a fresh schema from what it references
  Init {
    /// Directory to scan
    dir: PathBuf,

    /// Overwrite an existing schema file
    #[arg(short, long)]
    force: bool,

    /// Scan all files instead of only git-tracked ones
    #[arg(long)]
    no_git: bool,

    /// Skip adding env-tool scripts to package.json
    #[arg(long)]
    no_scripts: bool,
  },

  /// Report variables referenced in code but missing from the schema
  Audit {
    /// Directory to scan
    dir: PathBuf,

    /// Scan all files instead of only git-tracked ones
    #[arg(long)]
    no_git: bool,
  },

  /// Check an env file against the schema's required variables
  Validate {
    /// Env file to check
    envfile: PathBuf,
  },

  /// Regenerate an env file from the schema, keeping its existing values
  Sync {
    /// Env file to rewrite
    envfile: PathBuf,
  },

  /// Write a fresh env file from the schema defaults alone
  Create {
    /// File to write
    outfile: PathBuf,
  },
}

fn setup_tracing(verbose: u8) {
  use tracing_subscriber::fmt;
  use tracing_subscriber::prelude::*;

  let log_level = match verbose {
    1 => "debug",
    2 => "trace",
    _ => "info",
  };

  tracing_subscriber::registry()
    .with(fmt::layer())
    .with(tracing_subscriber::EnvFilter::new(
      std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
    ))
    .init();
}

fn tracked_files_provider(no_git: bool) -> Box<dyn TrackedFileProvider> {
  if no_git {
    Box::new(AllowAllFiles)
  } else {
    Box::new(GitTrackedFiles)
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  setup_tracing(cli.verbose);

  match run(cli) {
    Ok(code) => code,
    Err(err) => {
      error!("{err}");
      ExitCode::FAILURE
    }
  }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
  match cli.command {
    Commands::Init {
      dir,
      force,
      no_git,
      no_scripts,
    } => {
      if cli.schema.exists() && !force {
        warn!(
          "{} already exists. Use --force to overwrite if you want to start over.",
          cli.schema.display()
        );
        return Ok(ExitCode::FAILURE);
      }

      let provider = tracked_files_provider(no_git);
      let vars = scan_vars(&dir, provider.as_ref())?;
      Schema::from_vars(&vars).save(&cli.schema)?;

      if !no_scripts
        && let Err(err) = manifest::patch_file(Path::new("."), &dir.to_string_lossy())
      {
        warn!("{err}");
        return Ok(ExitCode::FAILURE);
      }

      Ok(ExitCode::SUCCESS)
    }

    Commands::Audit { dir, no_git } => {
      let provider = tracked_files_provider(no_git);
      let vars = scan_vars(&dir, provider.as_ref())?;
      let schema = Schema::load(&cli.schema)?;

      let issues = check::audit(&vars, &schema);
      for issue in &issues {
        warn!("{issue}.");
      }

      Ok(exit_for(&issues))
    }

    Commands::Validate { envfile } => {
      let schema = Schema::load(&cli.schema)?;
      let contents = std::fs::read_to_string(&envfile)?;
      let env = EnvMap::try_from(contents.as_str())?;

      let issues = check::validate(&schema, &env);
      for issue in &issues {
        warn!("{issue} in {}", envfile.display());
      }

      Ok(exit_for(&issues))
    }

    Commands::Sync { envfile } => {
      let schema = Schema::load(&cli.schema)?;
      sync::sync_file(&schema, &envfile)?;
      Ok(ExitCode::SUCCESS)
    }

    Commands::Create { outfile } => {
      let schema = Schema::load(&cli.schema)?;
      sync::create_file(&schema, &outfile)?;
      Ok(ExitCode::SUCCESS)
    }
  }
}

fn exit_for(issues: &[check::Issue]) -> ExitCode {
  if issues.is_empty() {
    ExitCode::SUCCESS
  } else {
    ExitCode::FAILURE
  }
}
