// rest_api/src/main.rs

use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tokio::sync::oneshot;
use tracing::info;
use tracing_subscriber::EnvFilter;

use notifications_service::Mailer;
use rest_api::{load_config, start_server, AppState};
use storage::{ClinicStore, PgStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_config()?;

    let store = PgStore::connect(&config.database_url, config.max_connections)
        .await
        .context("failed to connect to the clinic database")?;
    store
        .ensure_schema()
        .await
        .context("failed to apply the database schema")?;

    let mailer = match &config.mail_relay_url {
        Some(url) => Mailer::new(url.clone(), config.mail_from.clone())
            .context("failed to build the mail relay client")?,
        None => {
            info!("no mail relay configured, welcome mail disabled");
            Mailer::disabled()
        }
    };

    let store: Arc<dyn ClinicStore> = Arc::new(store);

    if let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) {
        let hashed = models::credentials::hash_password(password)
            .context("failed to hash the admin password")?;
        let id = store
            .upsert_admin(username, &hashed)
            .await
            .context("failed to seed the admin account")?;
        info!(id, username = %username, "admin account ready");
    }

    let state = AppState {
        store,
        mailer: Arc::new(mailer),
    };

    // Ctrl-C is handled inside start_server; the channel is the hook for a
    // programmatic stop and must outlive the server.
    let (_shutdown_tx, shutdown_rx) = oneshot::channel();
    start_server(config, state, shutdown_rx).await
}
