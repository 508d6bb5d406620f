//! The linear bootstrap sequence.
//!
//! Steps run strictly in order and the first error aborts the run. Nothing is
//! rolled back: whatever earlier steps persisted stays in the database.

use anyhow::{bail, Result};
use mongodb::Database;

use crate::{accounts, report, schema, Config, SchemaReport};

/// Result of a completed run.
#[derive(Debug)]
pub struct BootstrapOutcome {
    pub report: SchemaReport,
}

/// Provision `db`: collections, indexes, admin account, then verification.
#[tracing::instrument(name = "bootstrap", skip_all, fields(db = %db.name()))]
pub async fn run(db: &Database, cfg: &Config) -> Result<BootstrapOutcome> {
    // ---
    tracing::info!("Step 1/4: schema");
    schema::create_schema(db).await?;

    tracing::info!("Step 2/4: admin account");
    accounts::create_admin_user(db, &cfg.admin).await?;

    tracing::info!("Step 3/4: verify schema");
    let report = report::inspect(db).await?;
    let missing = report.missing();
    if !missing.is_empty() {
        bail!("Bootstrap incomplete, missing {}", missing.join(", "));
    }

    if cfg.verify_login {
        tracing::info!("Step 4/4: verify admin login");
        accounts::verify_admin_login(cfg).await?;
    } else {
        tracing::info!("Step 4/4: admin login check skipped (BOOTSTRAP_VERIFY_LOGIN unset)");
    }

    Ok(BootstrapOutcome { report })
}
