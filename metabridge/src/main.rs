// metabridge/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use tracing::Level;

use cli::{Cli, Commands};
use commands::migrate::MigrateArgs;
use metabridge_core::MetabridgeError;
use metabridge_core::domain::DomainError;
use metabridge_core::infrastructure::error::InfrastructureError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // 1. Setup Logging (Tracing). Progress goes to stdout, logs to stderr.
    let level = if cli.command.verbose() {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = dispatch(cli.command).await {
        report(err);
        std::process::exit(1);
    }
}

async fn dispatch(command: Commands) -> anyhow::Result<()> {
    match command {
        // --- USE CASE: MIGRATE ---
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
            commands::migrate::execute(MigrateArgs {
                input,
                target_env,
                output_dir,
                dry_run,
                config,
                mutations,
                project_dir,
            })
            .await
        }

        // --- USE CASE: REPLAY A DRY RUN ---
        Commands::Apply {
            from,
            target_env,
            config,
            project_dir,
            ..
        } => commands::apply::execute(from, target_env, config, project_dir).await,

        // --- USE CASE: INSPECT AN EXPORT ---
        Commands::Inspect { input, .. } => commands::inspect::execute(input),
    }
}

/// Prints the outermost context, then the library diagnostic (code + help)
/// when there is one.
fn report(err: anyhow::Error) {
    eprintln!("\n💥 {}", err);
    let err = match err.downcast::<MetabridgeError>() {
        Ok(e) => return eprintln!("{:?}", miette::Report::new(e)),
        Err(err) => err,
    };
    let err = match err.downcast::<InfrastructureError>() {
        Ok(e) => return eprintln!("{:?}", miette::Report::new(e)),
        Err(err) => err,
    };
    let err = match err.downcast::<DomainError>() {
        Ok(e) => return eprintln!("{:?}", miette::Report::new(e)),
        Err(err) => err,
    };
    for cause in err.chain().skip(1) {
        eprintln!("   caused by: {}", cause);
    }
}
