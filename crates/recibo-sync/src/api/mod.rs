//! Remote receipt API.

pub mod client;
pub mod types;

pub use client::{HttpReceiptApi, ReceiptApi};
pub use types::{ReceiptPatch, RemoteLineItem, RemoteReceipt};
