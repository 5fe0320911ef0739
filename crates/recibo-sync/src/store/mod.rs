//! Local receipt store.

mod database;
mod migrations;
mod queries;

pub use database::Database;

use chrono::Utc;
use recibo_core::ParsedReceipt;

use crate::error::StoreError;
use crate::models::{NewReceipt, ReceiptRecord};

/// The authoritative local store of ingested receipts.
///
/// Cheap to clone; all clones share one underlying connection whose
/// background thread serializes every write.
#[derive(Clone)]
pub struct ReceiptStore {
    db: Database,
}

impl ReceiptStore {
    /// Open (and migrate) the store at the given path.
    pub async fn open(path: &str) -> Result<Self, StoreError> {
        Ok(Self {
            db: Database::open(path).await?,
        })
    }

    /// Insert a new record.
    pub async fn insert(&self, new: NewReceipt) -> Result<ReceiptRecord, StoreError> {
        queries::insert(&self.db, new).await
    }

    /// Persist a freshly parsed receipt as a new pending record.
    ///
    /// Always inserts; the caller is responsible for not double-ingesting
    /// the same physical document. A duplicate business key trips the
    /// unique index and surfaces as a [`StoreError`].
    pub async fn insert_from_parse(
        &self,
        parsed: &ParsedReceipt,
        raw_document: Option<&[u8]>,
    ) -> Result<ReceiptRecord, StoreError> {
        self.insert(NewReceipt::from_parse(parsed, raw_document)).await
    }

    /// Look up a record by its business key.
    pub async fn find_by_number(
        &self,
        number: &str,
    ) -> Result<Option<ReceiptRecord>, StoreError> {
        queries::find_by_number(&self.db, number).await
    }

    /// List records, newest transaction date first (undated records last).
    ///
    /// A filter string matches case-insensitively against vendor name,
    /// receipt number, notes, store location, or any line-item name.
    pub async fn list(&self, filter: Option<&str>) -> Result<Vec<ReceiptRecord>, StoreError> {
        queries::list(&self.db, filter).await
    }

    /// Rewrite a record: parent fields and the full line-item set land in
    /// one transaction, or not at all. Bumps `updated_at` on the record.
    pub async fn update(&self, record: &mut ReceiptRecord) -> Result<(), StoreError> {
        record.updated_at = Utc::now();
        queries::update(&self.db, record).await
    }

    /// Bump a record's `updated_at` without touching any other field.
    pub async fn touch(&self, id: i64) -> Result<(), StoreError> {
        queries::touch(&self.db, id).await
    }

    /// Delete a record; owned line items cascade.
    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        queries::delete(&self.db, id).await
    }

    /// Delete every record.
    pub async fn delete_all(&self) -> Result<(), StoreError> {
        queries::delete_all(&self.db).await
    }
}
