//! Sync orchestrator: acquisition → extraction → persistence → upload →
//! reconciliation as one pipeline.
//!
//! All collaborators are injected at construction; the orchestrator owns no
//! ambient global state.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use recibo_core::document::TextSource;
use recibo_core::models::receipt::RawDocument;
use recibo_core::ReceiptExtractor;

use crate::api::types::ReceiptPatch;
use crate::api::ReceiptApi;
use crate::error::{IngestError, SyncError};
use crate::models::ReceiptRecord;
use crate::reconcile::{merge_remote, ReconcileEngine, ReconcileSummary};
use crate::store::ReceiptStore;

/// Entry points consumed by the presentation layer.
pub struct SyncOrchestrator {
    source: Arc<dyn TextSource>,
    extractor: ReceiptExtractor,
    store: ReceiptStore,
    api: Arc<dyn ReceiptApi>,
    engine: ReconcileEngine,
    /// Business keys with an upload currently in flight.
    in_flight: Mutex<HashSet<String>>,
}

impl SyncOrchestrator {
    pub fn new(
        source: Arc<dyn TextSource>,
        extractor: ReceiptExtractor,
        store: ReceiptStore,
        api: Arc<dyn ReceiptApi>,
    ) -> Self {
        let engine = ReconcileEngine::new(store.clone());
        Self {
            source,
            extractor,
            store,
            api,
            engine,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Ingest one document.
    ///
    /// The locally persisted record is the durable outcome: it is returned
    /// even when the remote upload fails. A second ingestion attempt for
    /// the same business key while an upload is in flight is rejected.
    pub async fn ingest(&self, document: RawDocument) -> Result<ReceiptRecord, IngestError> {
        // Acquisition is CPU/IO-bound (OCR especially); keep it off the
        // async worker threads.
        let source = Arc::clone(&self.source);
        let doc = document.clone();
        let text = tokio::task::spawn_blocking(move || source.acquire(&doc))
            .await
            .map_err(|e| IngestError::Task(e.to_string()))??;

        let parsed = self.extractor.extract(&text);
        debug!(
            vendor = %parsed.vendor_name,
            number = parsed.receipt_number.as_deref().unwrap_or("-"),
            "Parsed receipt document"
        );

        let guard_key = parsed.receipt_number.clone();
        if let Some(key) = &guard_key {
            let mut in_flight = self.in_flight.lock().expect("in-flight lock poisoned");
            if !in_flight.insert(key.clone()) {
                return Err(IngestError::UploadInFlight(key.clone()));
            }
        }

        let result = self.ingest_guarded(&parsed, &document).await;

        if let Some(key) = &guard_key {
            self.in_flight
                .lock()
                .expect("in-flight lock poisoned")
                .remove(key);
        }

        result
    }

    async fn ingest_guarded(
        &self,
        parsed: &recibo_core::ParsedReceipt,
        document: &RawDocument,
    ) -> Result<ReceiptRecord, IngestError> {
        let mut record = self
            .store
            .insert_from_parse(parsed, Some(document.data()))
            .await?;
        info!(id = record.id, "Persisted local receipt record");

        // Snapshot what we are about to send; the reconcile threshold
        // compares the server echo against this value.
        record.last_sent_subtotal = Some(record.subtotal);
        self.store.update(&mut record).await?;

        match self.api.upload_receipt(document.data()).await {
            Ok(remote) => {
                // Adopt a server-assigned business key when the local parse
                // found none.
                let adopted = record.receipt_number.is_none()
                    && remote.transaction_number.is_some();
                if adopted {
                    record.receipt_number = remote.transaction_number.clone();
                }

                let merged = merge_remote(&mut record, &remote);
                if merged || adopted {
                    self.store.update(&mut record).await?;
                } else {
                    self.store.touch(record.id).await?;
                }
                if !merged {
                    debug!(id = record.id, "Upload echo rejected by threshold");
                }
                Ok(record)
            }
            Err(e) => {
                // Local-first durability: the scanned document is already
                // safe; remote mirroring stays best-effort.
                warn!(id = record.id, error = %e, "Upload failed, keeping local record");
                Ok(record)
            }
        }
    }

    /// Fetch the full remote list and reconcile it into the local store.
    ///
    /// An API failure leaves the repository untouched and is reported once.
    pub async fn pull(&self) -> Result<ReconcileSummary, SyncError> {
        let batch = self.api.list_receipts().await?;
        info!(count = batch.len(), "Pulled remote receipt batch");
        Ok(self.engine.reconcile(&batch).await)
    }

    /// Push a locally edited record to the remote store and fold the
    /// server's answer back through the merge policy.
    pub async fn push_update(&self, record: &mut ReceiptRecord) -> Result<(), SyncError> {
        let Some(key) = record.receipt_number.clone() else {
            // Nothing to address the remote record by; stay local-only.
            debug!(id = record.id, "Record has no business key, skipping push");
            return Ok(());
        };

        record.last_sent_subtotal = Some(record.subtotal);
        self.store.update(record).await?;

        let patch = ReceiptPatch {
            vendor_name: Some(record.vendor_name.clone()),
            store_location: Some(record.store_location.clone()),
            transaction_date: record.transaction_date.map(|d| d.to_string()),
            subtotal: Some(record.subtotal.to_string()),
            tax: Some(record.tax.to_string()),
            total: Some(record.total.to_string()),
            notes: Some(record.notes.clone()),
        };

        let remote = self.api.update_receipt(&key, &patch).await?;
        if merge_remote(record, &remote) {
            self.store.update(record).await?;
        } else {
            self.store.touch(record.id).await?;
        }
        Ok(())
    }

    /// Delete a record locally and propagate the delete to the remote
    /// store, best-effort.
    pub async fn delete(&self, record: &ReceiptRecord) -> Result<(), SyncError> {
        self.store.delete(record.id).await?;
        if let Some(key) = &record.receipt_number {
            if let Err(e) = self.api.delete_receipt(key).await {
                warn!(key, error = %e, "Remote delete failed; record removed locally");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{RemoteLineItem, RemoteReceipt};
    use crate::error::ApiError;
    use crate::models::ReceiptStatus;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use recibo_core::models::receipt::{DocumentHint, ExtractedText};
    use recibo_core::AcquireError;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    /// Canned text source: every document yields the same receipt lines.
    struct StubSource {
        lines: Vec<String>,
    }

    impl StubSource {
        fn costco() -> Self {
            Self {
                lines: [
                    "COSTCO WHOLESALE",
                    "07/10/2025",
                    "Receipt #123456",
                    "Kirkland Paper Towels   19.99",
                    "Subtotal  19.99",
                    "Tax  1.65",
                    "Total  21.64",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            }
        }
    }

    impl TextSource for StubSource {
        fn acquire(&self, _document: &RawDocument) -> Result<ExtractedText, AcquireError> {
            Ok(ExtractedText::from_lines(self.lines.clone()))
        }
    }

    /// Scripted API: canned upload/list responses plus call counters.
    #[derive(Default)]
    struct FakeApi {
        upload_response: Option<RemoteReceipt>,
        list_response: Vec<RemoteReceipt>,
        fail_uploads: bool,
        uploads: AtomicUsize,
        deletes: AtomicUsize,
        gate: Option<Arc<tokio::sync::Semaphore>>,
    }

    #[async_trait]
    impl ReceiptApi for FakeApi {
        async fn upload_receipt(&self, _raw: &[u8]) -> Result<RemoteReceipt, ApiError> {
            if let Some(gate) = &self.gate {
                let _permit = gate.acquire().await.unwrap();
            }
            self.uploads.fetch_add(1, Ordering::SeqCst);
            if self.fail_uploads {
                return Err(ApiError::Status {
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }
            Ok(self.upload_response.clone().unwrap_or_default())
        }

        async fn list_receipts(&self) -> Result<Vec<RemoteReceipt>, ApiError> {
            Ok(self.list_response.clone())
        }

        async fn update_receipt(
            &self,
            _key: &str,
            _patch: &ReceiptPatch,
        ) -> Result<RemoteReceipt, ApiError> {
            Ok(self.upload_response.clone().unwrap_or_default())
        }

        async fn delete_receipt(&self, _key: &str) -> Result<(), ApiError> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn server_echo() -> RemoteReceipt {
        RemoteReceipt {
            transaction_number: Some("123456".to_string()),
            vendor_name: Some("Costco Wholesale".to_string()),
            store_location: Some("Warehouse 12".to_string()),
            transaction_date: Some("2025-07-10".to_string()),
            subtotal: Some("19.99".to_string()),
            tax: Some("1.65".to_string()),
            total: Some("21.64".to_string()),
            parsed_successfully: Some(true),
            items: vec![RemoteLineItem {
                description: "Kirkland Paper Towels".to_string(),
                price: Some("19.99".to_string()),
                quantity: Some(1),
                item_code: None,
            }],
        }
    }

    async fn setup(
        api: FakeApi,
    ) -> (Arc<SyncOrchestrator>, ReceiptStore, Arc<FakeApi>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        let store = ReceiptStore::open(path.to_str().unwrap()).await.unwrap();
        let api = Arc::new(api);
        let orchestrator = Arc::new(SyncOrchestrator::new(
            Arc::new(StubSource::costco()),
            ReceiptExtractor::new(),
            store.clone(),
            api.clone(),
        ));
        (orchestrator, store, api, dir)
    }

    fn document() -> RawDocument {
        RawDocument::new(b"%PDF-stub".to_vec(), DocumentHint::Unknown)
    }

    #[tokio::test]
    async fn ingest_persists_and_folds_the_server_echo() {
        let api = FakeApi {
            upload_response: Some(server_echo()),
            ..Default::default()
        };
        let (orchestrator, store, api, _dir) = setup(api).await;

        let record = orchestrator.ingest(document()).await.unwrap();

        assert_eq!(api.uploads.load(Ordering::SeqCst), 1);
        assert_eq!(record.receipt_number.as_deref(), Some("123456"));
        assert_eq!(record.status, ReceiptStatus::Completed);
        assert_eq!(record.store_location, "Warehouse 12");
        assert_eq!(record.subtotal, dec("19.99"));

        let stored = store.find_by_number("123456").await.unwrap().unwrap();
        assert_eq!(stored.status, ReceiptStatus::Completed);
        assert_eq!(stored.raw_document.as_deref(), Some(b"%PDF-stub".as_slice()));
    }

    #[tokio::test]
    async fn ingest_keeps_local_record_when_upload_fails() {
        let api = FakeApi {
            fail_uploads: true,
            ..Default::default()
        };
        let (orchestrator, store, _api, _dir) = setup(api).await;

        let record = orchestrator.ingest(document()).await.unwrap();

        assert_eq!(record.status, ReceiptStatus::Pending);
        assert_eq!(record.vendor_name, "Costco Wholesale");
        assert!(store.find_by_number("123456").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn second_concurrent_ingest_for_same_key_is_rejected() {
        let gate = Arc::new(tokio::sync::Semaphore::new(0));
        let api = FakeApi {
            upload_response: Some(server_echo()),
            gate: Some(gate.clone()),
            ..Default::default()
        };
        let (orchestrator, _store, _api, _dir) = setup(api).await;

        let first = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.ingest(document()).await })
        };

        // Give the first ingest time to park inside the gated upload.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let second = orchestrator.ingest(document()).await;
        assert!(matches!(second, Err(IngestError::UploadInFlight(_))));

        gate.add_permits(1);
        first.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn pull_reconciles_the_remote_batch() {
        let api = FakeApi {
            list_response: vec![server_echo()],
            ..Default::default()
        };
        let (orchestrator, store, _api, _dir) = setup(api).await;

        let summary = orchestrator.pull().await.unwrap();
        assert_eq!(summary.inserted, 1);

        // Same batch again: same final state.
        let summary = orchestrator.pull().await.unwrap();
        assert_eq!(summary.inserted, 0);
        assert_eq!(store.list(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_locally_and_propagates() {
        let api = FakeApi {
            upload_response: Some(server_echo()),
            ..Default::default()
        };
        let (orchestrator, store, api, _dir) = setup(api).await;

        let record = orchestrator.ingest(document()).await.unwrap();
        orchestrator.delete(&record).await.unwrap();

        assert!(store.find_by_number("123456").await.unwrap().is_none());
        assert_eq!(api.deletes.load(Ordering::SeqCst), 1);
    }
}
