//! Database schema management for `rs485-bootstrap`.
//!
//! Declares the collections and indexes the RS485 services expect and applies
//! them to the target database. The plan is static data; the apply functions
//! walk it in declaration order and stop at the first failure.

use anyhow::{Context, Result};
use mongodb::{
    bson::Document,
    error::{Error as MongoError, ErrorKind},
    options::IndexOptions,
    Database, IndexModel,
};

/// Server error code returned by `create` for an existing collection.
const NAMESPACE_EXISTS: i32 = 48;

pub const CLIENTS: &str = "clients";
pub const DEVICES: &str = "devices";
pub const DEVICE_DATA: &str = "device_data";

static COLLECTIONS: [&str; 3] = [CLIENTS, DEVICES, DEVICE_DATA];

/// Per-field index direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    /// Value used in a MongoDB key document.
    pub fn as_i32(self) -> i32 {
        match self {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }
}

use SortOrder::{Ascending, Descending};

/// One index declaration: collection, ordered key fields, uniqueness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpec {
    // ---
    pub collection: &'static str,
    pub keys: &'static [(&'static str, SortOrder)],
    pub unique: bool,
}

static INDEX_PLAN: [IndexSpec; 8] = [
    // API keys and emails identify a client
    IndexSpec {
        collection: CLIENTS,
        keys: &[("api_key", Ascending)],
        unique: true,
    },
    IndexSpec {
        collection: CLIENTS,
        keys: &[("email", Ascending)],
        unique: true,
    },
    // expiry scans
    IndexSpec {
        collection: CLIENTS,
        keys: &[("expires_at", Ascending)],
        unique: false,
    },
    IndexSpec {
        collection: DEVICES,
        keys: &[("device_id", Ascending)],
        unique: true,
    },
    // lookup by owning client
    IndexSpec {
        collection: DEVICES,
        keys: &[("api_key", Ascending)],
        unique: false,
    },
    IndexSpec {
        collection: DEVICES,
        keys: &[("created_at", Ascending)],
        unique: false,
    },
    // latest-first readings per device, then globally
    IndexSpec {
        collection: DEVICE_DATA,
        keys: &[("device_id", Ascending), ("timestamp", Descending)],
        unique: false,
    },
    IndexSpec {
        collection: DEVICE_DATA,
        keys: &[("timestamp", Descending)],
        unique: false,
    },
];

/// Collections created by the bootstrap, in creation order.
pub fn collection_names() -> &'static [&'static str] {
    &COLLECTIONS
}

/// Index declarations applied by the bootstrap, in creation order.
pub fn index_plan() -> &'static [IndexSpec] {
    &INDEX_PLAN
}

impl IndexSpec {
    /// Name the server assigns when none is given, e.g. `device_id_1_timestamp_-1`.
    pub fn index_name(&self) -> String {
        // ---
        self.keys
            .iter()
            .map(|(field, order)| format!("{}_{}", field, order.as_i32()))
            .collect::<Vec<_>>()
            .join("_")
    }

    /// Key document with fields in declaration order.
    pub fn keys_document(&self) -> Document {
        // ---
        let mut keys = Document::new();
        for (field, order) in self.keys {
            keys.insert(*field, order.as_i32());
        }
        keys
    }

    pub fn to_model(&self) -> IndexModel {
        // ---
        let options = self
            .unique
            .then(|| IndexOptions::builder().unique(true).build());

        IndexModel::builder()
            .keys(self.keys_document())
            .options(options)
            .build()
    }
}

// ---

/// Create the declared collections, then the declared indexes.
///
/// An already existing collection is tolerated. Index creation relies on the
/// server treating an identical existing index as a no-op; any conflicting
/// index or unique-key violation in existing documents is an error.
pub async fn create_schema(db: &Database) -> Result<()> {
    // ---
    tracing::info!("Creating {} collections in '{}'", COLLECTIONS.len(), db.name());
    create_collections(db).await?;

    tracing::info!("Creating {} indexes in '{}'", INDEX_PLAN.len(), db.name());
    create_indexes(db).await?;

    Ok(())
}

pub async fn create_collections(db: &Database) -> Result<()> {
    // ---
    for name in collection_names() {
        match db.create_collection(*name).await {
            Ok(()) => tracing::debug!("Created collection '{}'", name),
            Err(e) if is_namespace_exists(&e) => {
                tracing::warn!("Collection '{}' already exists, keeping it", name)
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to create collection '{}'", name))
            }
        }
    }
    Ok(())
}

pub async fn create_indexes(db: &Database) -> Result<()> {
    // ---
    for spec in index_plan() {
        let result = db
            .collection::<Document>(spec.collection)
            .create_index(spec.to_model())
            .await
            .with_context(|| {
                format!(
                    "Failed to create index '{}' on '{}'",
                    spec.index_name(),
                    spec.collection
                )
            })?;

        tracing::debug!(
            "Created index '{}' on '{}' (unique: {})",
            result.index_name,
            spec.collection,
            spec.unique
        );
    }
    Ok(())
}

fn is_namespace_exists(err: &MongoError) -> bool {
    matches!(*err.kind, ErrorKind::Command(ref c) if c.code == NAMESPACE_EXISTS)
}
