//! Admin account provisioning.
//!
//! Creates the single service account with `readWrite` scoped to the target
//! database and, on request, proves the account works by logging in with it.

use anyhow::{bail, Context, Result};
use mongodb::{
    bson::{self, doc, Document},
    Database,
};
use serde::Deserialize;

use crate::{config::AdminCredentials, db, Config};

/// Role granted to the admin account on the target database.
pub const ADMIN_ROLE: &str = "readWrite";

// ---

/// Build the `createUser` command for `creds` on `db_name`.
pub fn create_user_command(creds: &AdminCredentials, db_name: &str) -> Document {
    // ---
    doc! {
        "createUser": creds.username.as_str(),
        "pwd": creds.password.as_str(),
        "roles": [
            { "role": ADMIN_ROLE, "db": db_name }
        ]
    }
}

/// Create the admin account in `db`.
///
/// Fails if the user already exists; there is no update path.
pub async fn create_admin_user(db: &Database, creds: &AdminCredentials) -> Result<()> {
    // ---
    db.run_command(create_user_command(creds, db.name()))
        .await
        .with_context(|| {
            format!(
                "Failed to create user '{}' on '{}'",
                creds.username,
                db.name()
            )
        })?;

    tracing::info!(
        "Created user '{}' with role {}@{}",
        creds.username,
        ADMIN_ROLE,
        db.name()
    );
    Ok(())
}

/// Log in as the admin account and confirm its role scope.
pub async fn verify_admin_login(cfg: &Config) -> Result<()> {
    // ---
    let client = db::connect_as(&cfg.mongodb_uri, &cfg.db_name, &cfg.admin, cfg.timeout).await?;

    let status = client
        .database(&cfg.db_name)
        .run_command(doc! { "connectionStatus": 1 })
        .await
        .context("connectionStatus failed")?;

    check_connection_status(&status, &cfg.admin, &cfg.db_name)?;
    tracing::info!("Verified login as '{}' on '{}'", cfg.admin.username, cfg.db_name);
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionStatus {
    auth_info: AuthInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthInfo {
    #[serde(default)]
    authenticated_users: Vec<UserRef>,
    #[serde(default)]
    authenticated_user_roles: Vec<RoleRef>,
}

#[derive(Debug, Deserialize)]
struct UserRef {
    user: String,
    db: String,
}

#[derive(Debug, Deserialize)]
struct RoleRef {
    role: String,
    db: String,
}

/// Require `creds` to be authenticated with exactly `readWrite@db_name`.
fn check_connection_status(
    status: &Document,
    creds: &AdminCredentials,
    db_name: &str,
) -> Result<()> {
    // ---
    let status: ConnectionStatus =
        bson::from_document(status.clone()).context("Unexpected connectionStatus reply")?;
    let auth = status.auth_info;

    if !auth
        .authenticated_users
        .iter()
        .any(|u| u.user == creds.username && u.db == db_name)
    {
        bail!("'{}' is not authenticated on '{}'", creds.username, db_name);
    }

    if let Some(foreign) = auth.authenticated_user_roles.iter().find(|r| r.db != db_name) {
        bail!(
            "'{}' holds role {}@{} outside '{}'",
            creds.username,
            foreign.role,
            foreign.db,
            db_name
        );
    }

    if !auth
        .authenticated_user_roles
        .iter()
        .any(|r| r.role == ADMIN_ROLE)
    {
        bail!("'{}' lacks {}@{}", creds.username, ADMIN_ROLE, db_name);
    }

    Ok(())
}
