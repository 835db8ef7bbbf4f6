// metabridge/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "metabridge")]
#[command(
    about = "Carries tags, glossary terms, domains and structured properties across metadata catalog environments",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🚚 Matches exported entities to a target environment and migrates their annotations
    Migrate {
        /// Export file (JSON) from the source environment
        #[arg(long)]
        input: PathBuf,

        /// Target environment, as named in the project configuration
        #[arg(long)]
        target_env: String,

        /// Where change proposals and reports go (default: config 'output-path')
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Write change proposals to files instead of submitting them
        #[arg(long)]
        dry_run: bool,

        /// Debug logging
        #[arg(long, short)]
        verbose: bool,

        /// Project configuration file (default: discovered in --project-dir)
        #[arg(long, env = "METABRIDGE_CONFIG")]
        config: Option<PathBuf>,

        /// Mutation rules file (YAML or JSON), overrides the configured rules
        #[arg(long)]
        mutations: Option<PathBuf>,

        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// 📤 Submits the change proposals of an earlier dry run
    Apply {
        /// Directory written by `migrate --dry-run`
        #[arg(long)]
        from: PathBuf,

        /// Target environment, as named in the project configuration
        #[arg(long)]
        target_env: String,

        /// Project configuration file (default: discovered in --project-dir)
        #[arg(long, env = "METABRIDGE_CONFIG")]
        config: Option<PathBuf>,

        /// Debug logging
        #[arg(long, short)]
        verbose: bool,

        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// 🔍 Summarizes an export file (shape, metadata, platforms, entity types)
    Inspect {
        /// Export file (JSON)
        #[arg(long)]
        input: PathBuf,

        /// Debug logging
        #[arg(long, short)]
        verbose: bool,
    },
}

impl Commands {
    pub fn verbose(&self) -> bool {
        match self {
            Commands::Migrate { verbose, .. }
            | Commands::Apply { verbose, .. }
            | Commands::Inspect { verbose, .. } => *verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use clap::Parser;

    #[test]
    fn test_cli_parse_migrate_defaults() -> Result<()> {
        let args = Cli::parse_from([
            "metabridge",
            "migrate",
            "--input",
            "export.json",
            "--target-env",
            "prod",
        ]);
        assert!(!args.command.verbose());
        match args.command {
            Commands::Migrate {
                input,
                target_env,
                output_dir,
                dry_run,
                config,
                mutations,
                project_dir,
                ..
            } => {
                assert_eq!(input.to_string_lossy(), "export.json");
                assert_eq!(target_env, "prod");
                assert_eq!(output_dir, None);
                assert!(!dry_run);
                assert_eq!(config, None);
                assert_eq!(mutations, None);
                assert_eq!(project_dir.to_string_lossy(), ".");
                Ok(())
            }
            _ => bail!("Expected Migrate command"),
        }
    }

    #[test]
    fn test_cli_parse_migrate_dry_run() -> Result<()> {
        let args = Cli::parse_from([
            "metabridge",
            "migrate",
            "--input",
            "export.json",
            "--target-env",
            "staging",
            "--output-dir",
            "/tmp/out",
            "--dry-run",
            "-v",
            "--mutations",
            "rules.yaml",
        ]);
        assert!(args.command.verbose());
        match args.command {
            Commands::Migrate {
                output_dir,
                dry_run,
                mutations,
                ..
            } => {
                assert_eq!(output_dir, Some(PathBuf::from("/tmp/out")));
                assert!(dry_run);
                assert_eq!(mutations, Some(PathBuf::from("rules.yaml")));
                Ok(())
            }
            _ => bail!("Expected Migrate command"),
        }
    }

    #[test]
    fn test_cli_parse_apply() -> Result<()> {
        let args = Cli::parse_from([
            "metabridge",
            "apply",
            "--from",
            "mcp_output",
            "--target-env",
            "prod",
        ]);
        match args.command {
            Commands::Apply {
                from, target_env, ..
            } => {
                assert_eq!(from.to_string_lossy(), "mcp_output");
                assert_eq!(target_env, "prod");
                Ok(())
            }
            _ => bail!("Expected Apply command"),
        }
    }

    #[test]
    fn test_cli_migrate_requires_target_env() {
        let args = Cli::try_parse_from(["metabridge", "migrate", "--input", "export.json"]);
        assert!(args.is_err());
    }
}
