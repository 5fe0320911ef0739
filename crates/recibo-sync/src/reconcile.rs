//! Reconciliation: merging remote receipt batches into the local store.
//!
//! The remote store may silently ignore field updates (validation, stale
//! writes, concurrent modification). Blindly applying a stale server echo
//! would destroy local edits, and there is no reliable timestamp ordering
//! across the two stores. The accepted-write signal is therefore: does the
//! server's subtotal match the value this client most recently sent for the
//! record, within one cent.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::api::types::{RemoteLineItem, RemoteReceipt};
use crate::error::StoreError;
use crate::models::{LineItem, NewReceipt, ReceiptRecord, ReceiptStatus};
use crate::store::ReceiptStore;

/// Maximum subtotal drift for a server echo to count as an accepted write.
/// The comparison is inclusive: a drift of exactly one cent still accepts.
const SUBTOTAL_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Outcome counters for one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Remote records inserted as new local records.
    pub inserted: usize,
    /// Local records overwritten from an accepted server echo.
    pub merged: usize,
    /// Local records kept untouched because the server ignored the update.
    pub kept: usize,
    /// Remote records skipped for lack of a business key.
    pub skipped: usize,
    /// Records whose persistence failed; the batch continued without them.
    pub failed: usize,
}

enum Outcome {
    Inserted,
    Merged,
    Kept,
}

/// Merges remote receipt batches into the local repository.
pub struct ReconcileEngine {
    store: ReceiptStore,
}

impl ReconcileEngine {
    pub fn new(store: ReceiptStore) -> Self {
        Self { store }
    }

    /// Apply a remote batch, best-effort: one record's failure never aborts
    /// the rest of the batch.
    pub async fn reconcile(&self, batch: &[RemoteReceipt]) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();

        for remote in batch {
            let Some(key) = remote.transaction_number.as_deref() else {
                warn!("Skipping remote receipt without a transaction number");
                summary.skipped += 1;
                continue;
            };

            match self.reconcile_one(key, remote).await {
                Ok(Outcome::Inserted) => summary.inserted += 1,
                Ok(Outcome::Merged) => summary.merged += 1,
                Ok(Outcome::Kept) => summary.kept += 1,
                Err(e) => {
                    warn!(key, error = %e, "Failed to reconcile remote receipt");
                    summary.failed += 1;
                }
            }
        }

        debug!(?summary, "Reconciliation pass complete");
        summary
    }

    async fn reconcile_one(&self, key: &str, remote: &RemoteReceipt) -> Result<Outcome, StoreError> {
        match self.store.find_by_number(key).await? {
            None => {
                self.store.insert(record_from_remote(remote)).await?;
                debug!(key, "Inserted unseen remote receipt");
                Ok(Outcome::Inserted)
            }
            Some(mut record) => {
                if merge_remote(&mut record, remote) {
                    self.store.update(&mut record).await?;
                    debug!(key, "Server accepted update, local record overwritten");
                    Ok(Outcome::Merged)
                } else {
                    self.store.touch(record.id).await?;
                    debug!(key, "Server echo is stale, keeping local record");
                    Ok(Outcome::Kept)
                }
            }
        }
    }
}

/// Whether a server echo counts as an accepted write for this record.
///
/// Compared against the subtotal most recently *sent*, not the record's
/// current value. A record with no sent snapshot has nothing pending to
/// protect, so the echo is accepted.
pub fn echo_accepted(record: &ReceiptRecord, remote: &RemoteReceipt) -> bool {
    match record.last_sent_subtotal {
        Some(sent) => (sent - remote.subtotal_amount()).abs() <= SUBTOTAL_TOLERANCE,
        None => true,
    }
}

/// The single merge policy shared by batch reconciliation and the upload
/// fold in the orchestrator.
///
/// Returns `true` when the remote payload was applied. On `false` the
/// record is untouched; the caller only re-commits its timestamp. Notes and
/// the retained raw document are never overwritten.
pub fn merge_remote(record: &mut ReceiptRecord, remote: &RemoteReceipt) -> bool {
    if !echo_accepted(record, remote) {
        return false;
    }

    if let Some(vendor) = &remote.vendor_name {
        record.vendor_name = vendor.clone();
    }
    if let Some(location) = &remote.store_location {
        record.store_location = location.clone();
    }
    record.transaction_date = remote.date();
    record.subtotal = remote.subtotal_amount();
    record.tax = remote.tax_amount();
    record.total = remote.total_amount();
    record.status = status_from_remote(remote);
    record.last_sent_subtotal = Some(remote.subtotal_amount());
    record.line_items = remote.items.iter().map(item_from_remote).collect();

    true
}

fn status_from_remote(remote: &RemoteReceipt) -> ReceiptStatus {
    if remote.parsed_successfully.unwrap_or(false) {
        ReceiptStatus::Completed
    } else {
        ReceiptStatus::Failed
    }
}

fn item_from_remote(item: &RemoteLineItem) -> LineItem {
    LineItem {
        name: item.description.clone(),
        unit_price: item.price_amount(),
        quantity: item.quantity_or_default(),
        item_code: item.item_code.clone(),
        // category is never populated from remote data
        category: None,
    }
}

/// Build a new local record from an unseen remote receipt.
///
/// Parsing is tolerant: a bad amount or date defaults rather than aborting
/// the insert. The sent-subtotal snapshot is primed with the remote value
/// so the record is born in sync.
fn record_from_remote(remote: &RemoteReceipt) -> NewReceipt {
    NewReceipt {
        receipt_number: remote.transaction_number.clone(),
        vendor_name: remote
            .vendor_name
            .clone()
            .unwrap_or_else(|| recibo_core::models::receipt::UNKNOWN_VENDOR.to_string()),
        store_location: remote.store_location.clone().unwrap_or_default(),
        transaction_date: remote.date(),
        subtotal: remote.subtotal_amount(),
        tax: remote.tax_amount(),
        total: remote.total_amount(),
        status: status_from_remote(remote),
        notes: String::new(),
        last_sent_subtotal: Some(remote.subtotal_amount()),
        raw_document: None,
        line_items: remote.items.iter().map(item_from_remote).collect(),
    }
}
