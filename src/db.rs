//! MongoDB connection setup.
//!
//! The bootstrap never relies on an ambient connection: `main.rs` opens one
//! [`Client`] here and passes the resulting [`Database`] handle down
//! explicitly.

use std::time::Duration;

use anyhow::{Context, Result};
use mongodb::{
    bson::doc,
    options::{ClientOptions, Credential},
    Client, Database,
};

use crate::config::{mask_uri, AdminCredentials};

/// Name reported to the server in the connection handshake.
const APP_NAME: &str = "rs485-bootstrap";

// ---

/// Connect using the credentials embedded in `uri` and ping `db_name`.
///
/// The ping is issued once; an unreachable server fails the run after the
/// driver's server selection timeout.
pub async fn connect(uri: &str, db_name: &str, timeout: Duration) -> Result<Client> {
    // ---
    let options = client_options(uri, timeout).await?;
    let client = Client::with_options(options)
        .with_context(|| format!("Failed to build MongoDB client for '{}'", mask_uri(uri)))?;

    ping(&client.database(db_name))
        .await
        .with_context(|| format!("MongoDB at '{}' is not reachable", mask_uri(uri)))?;

    tracing::info!("Connected to MongoDB database '{}'", db_name);
    Ok(client)
}

/// Connect as `creds`, authenticating against `db_name` itself.
///
/// Any credentials embedded in `uri` are replaced.
pub async fn connect_as(
    uri: &str,
    db_name: &str,
    creds: &AdminCredentials,
    timeout: Duration,
) -> Result<Client> {
    // ---
    let mut options = client_options(uri, timeout).await?;
    options.credential = Some(
        Credential::builder()
            .username(creds.username.clone())
            .password(creds.password.clone())
            .source(db_name.to_string())
            .build(),
    );

    let client = Client::with_options(options).context("Failed to build MongoDB client")?;
    ping(&client.database(db_name))
        .await
        .with_context(|| format!("Login as '{}' on '{}' failed", creds.username, db_name))?;

    Ok(client)
}

async fn client_options(uri: &str, timeout: Duration) -> Result<ClientOptions> {
    // ---
    let mut options = ClientOptions::parse(uri)
        .await
        .with_context(|| format!("Invalid MONGODB_URI '{}'", mask_uri(uri)))?;

    options.app_name = Some(APP_NAME.to_string());
    options.server_selection_timeout = Some(timeout);
    options.connect_timeout = Some(timeout);

    Ok(options)
}

async fn ping(db: &Database) -> Result<()> {
    // ---
    db.run_command(doc! { "ping": 1 }).await?;
    Ok(())
}
