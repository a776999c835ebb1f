//! Subcommand implementations.

pub mod admin;
pub mod check_env;
pub mod cleanup;
pub mod embeddings;
pub mod migrate;
pub mod seed;

use luxe_jewel_storefront::db::{self, RepositoryError};
use luxe_jewel_storefront::services::ai::AiError;
use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors from CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingEnvVars(Vec<&'static str>),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("AI provider error: {0}")]
    Ai(#[from] AiError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// `STOREFRONT_DATABASE_URL`, falling back to `DATABASE_URL`.
fn database_url() -> Result<SecretString, CliError> {
    std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("STOREFRONT_DATABASE_URL"))
}

/// Load `.env` and connect to the storefront database.
pub async fn connect() -> Result<PgPool, CliError> {
    dotenvy::dotenv().ok();
    let url = database_url()?;
    tracing::info!("Connecting to storefront database...");
    Ok(db::create_pool(&url).await?)
}
