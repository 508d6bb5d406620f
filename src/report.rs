//! Post-bootstrap inspection of the target database.
//!
//! Reads back the live collections and index names and compares them with
//! the declared plan in [`crate::schema`].

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use mongodb::{bson::Document, Database};
use serde::Serialize;

use crate::schema::{collection_names, index_plan};

/// Live indexes of one collection.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionReport {
    // ---
    pub name: String,
    pub indexes: Vec<String>,
}

/// Snapshot of the target database after the bootstrap ran.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaReport {
    // ---
    pub database: String,
    pub generated_at: DateTime<Utc>,
    pub collections: Vec<CollectionReport>,
}

/// List every collection in `db` with its index names, both sorted.
pub async fn inspect(db: &Database) -> Result<SchemaReport> {
    // ---
    let mut names = db
        .list_collection_names()
        .await
        .with_context(|| format!("Failed to list collections of '{}'", db.name()))?;
    names.sort();

    let mut collections = Vec::with_capacity(names.len());
    for name in names {
        let mut indexes = db
            .collection::<Document>(&name)
            .list_index_names()
            .await
            .with_context(|| format!("Failed to list indexes of '{}'", name))?;
        indexes.sort();

        collections.push(CollectionReport { name, indexes });
    }

    Ok(SchemaReport {
        database: db.name().to_string(),
        generated_at: Utc::now(),
        collections,
    })
}

impl SchemaReport {
    // ---
    pub fn collection(&self, name: &str) -> Option<&CollectionReport> {
        self.collections.iter().find(|c| c.name == name)
    }

    /// Declared collections and indexes absent from this snapshot.
    pub fn missing(&self) -> Vec<String> {
        // ---
        let mut missing: Vec<String> = collection_names()
            .iter()
            .filter(|name| self.collection(name).is_none())
            .map(|name| format!("collection '{}'", name))
            .collect();

        for spec in index_plan() {
            let index_name = spec.index_name();
            let present = self
                .collection(spec.collection)
                .is_some_and(|c| c.indexes.contains(&index_name));
            if !present {
                missing.push(format!("index '{}' on '{}'", index_name, spec.collection));
            }
        }

        missing
    }

    pub fn log_summary(&self) {
        // ---
        tracing::info!("Schema of '{}':", self.database);
        for c in &self.collections {
            tracing::info!("  {:<12} : {}", c.name, c.indexes.join(", "));
        }
    }
}
