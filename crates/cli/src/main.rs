//! LuxeJewel CLI: database migrations, catalog seeding and maintenance.
//!
//! # Usage
//!
//! ```bash
//! lj-cli migrate
//! lj-cli seed --file data/seed.yaml
//! lj-cli generate-embeddings [--force]
//! lj-cli cleanup
//! lj-cli check-env
//! lj-cli admin promote -e owner@luxejewel.example
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use luxe_jewel_core::UserRole;

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "lj-cli")]
#[command(author, version, about = "LuxeJewel CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Upsert categories and products from a YAML file
    Seed {
        #[arg(short, long, default_value = "data/seed.yaml")]
        file: PathBuf,
    },
    /// Embed product descriptions for AI search
    GenerateEmbeddings {
        /// Re-embed products that already have an embedding
        #[arg(long)]
        force: bool,
    },
    /// Remove products and categories outside the curated set
    Cleanup,
    /// Report required and optional environment variables
    CheckEnv,
    /// Manage back-office access
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Grant the admin role to a registered account
    Promote {
        #[arg(short, long)]
        email: String,
    },
    /// Return an admin to the customer role
    Demote {
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => {
            commands::seed::run(&file).await?;
        }
        Commands::GenerateEmbeddings { force } => {
            commands::embeddings::run(force).await?;
        }
        Commands::Cleanup => {
            commands::cleanup::run().await?;
        }
        Commands::CheckEnv => commands::check_env::run()?,
        Commands::Admin { action } => match action {
            AdminAction::Promote { email } => {
                commands::admin::set_role(&email, UserRole::Admin).await?;
            }
            AdminAction::Demote { email } => {
                commands::admin::set_role(&email, UserRole::Customer).await?;
            }
        },
    }
    Ok(())
}
