//! Popote Server — Application entry point.
//!
//! Loads configuration from the environment, connects to SurrealDB,
//! applies pending migrations, and bootstraps the initial admin
//! account.

use popote_auth::{AccountService, AuthConfig};
use popote_db::repository::SurrealUserRepository;
use popote_db::{DbConfig, DbManager};
use tracing_subscriber::EnvFilter;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("popote=info".parse()?))
        .json()
        .init();

    tracing::info!("Starting Popote server...");

    let db_config = DbConfig {
        url: env_or("POPOTE_DB_URL", "127.0.0.1:8000"),
        namespace: env_or("POPOTE_DB_NAMESPACE", "popote"),
        database: env_or("POPOTE_DB_DATABASE", "main"),
        username: env_or("POPOTE_DB_USER", "root"),
        password: env_or("POPOTE_DB_PASSWORD", "root"),
    };
    let manager = DbManager::connect(&db_config).await?;
    popote_db::run_migrations(manager.client()).await?;

    let auth_config = AuthConfig {
        jwt_private_key_pem: env_or("POPOTE_JWT_PRIVATE_KEY_PEM", ""),
        jwt_public_key_pem: env_or("POPOTE_JWT_PUBLIC_KEY_PEM", ""),
        pepper: std::env::var("POPOTE_PASSWORD_PEPPER").ok(),
        ..AuthConfig::default()
    };

    let accounts = AccountService::new(
        SurrealUserRepository::new(manager.client().clone()),
        auth_config,
    );

    // Initial admin bootstrap (idempotent; skipped unless configured).
    if let (Ok(email), Ok(password)) = (
        std::env::var("POPOTE_ADMIN_EMAIL"),
        std::env::var("POPOTE_ADMIN_PASSWORD"),
    ) {
        match accounts.bootstrap_admin(&email, &password).await {
            Ok(Some(admin)) => {
                tracing::info!(email = %admin.email, "Created initial admin account");
            }
            Ok(None) => {
                tracing::debug!("Admin account already present; bootstrap skipped");
            }
            Err(e) => {
                tracing::error!(error = %e, "Admin bootstrap failed");
            }
        }
    }

    // TODO: mount the REST façade for the public site and backoffice.

    tracing::info!("Popote server stopped.");
    Ok(())
}
