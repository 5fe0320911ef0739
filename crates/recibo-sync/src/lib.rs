//! Receipt persistence and remote synchronization.
//!
//! This crate provides:
//! - A WAL-mode SQLite receipt store with a single-writer concurrency model
//! - The remote receipt API client
//! - The reconciliation engine merging remote batches into the local store
//! - The sync orchestrator driving acquisition, extraction, persistence,
//!   upload, and reconciliation as one pipeline

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod reconcile;
pub mod store;

pub use api::{HttpReceiptApi, ReceiptApi, ReceiptPatch, RemoteLineItem, RemoteReceipt};
pub use config::{ApiConfig, SyncConfig};
pub use error::{ApiError, IngestError, StoreError, SyncError};
pub use models::{NewReceipt, ReceiptRecord, ReceiptStatus};
pub use orchestrator::SyncOrchestrator;
pub use reconcile::{ReconcileEngine, ReconcileSummary};
pub use store::ReceiptStore;
