//! CLI subcommands.

pub mod config;
pub mod delete;
pub mod edit;
pub mod ingest;
pub mod list;
pub mod pull;
pub mod show;

use std::sync::Arc;

use anyhow::Context as _;
use tracing::warn;

use recibo_core::{AcquireProgress, ReceiptExtractor, TextAcquirer};
use recibo_sync::{HttpReceiptApi, ReceiptStore, SyncOrchestrator};

use crate::settings::{load_config, AppConfig};

/// Shared wiring for every subcommand: config, store, orchestrator.
pub struct AppContext {
    pub config: AppConfig,
    pub store: ReceiptStore,
    pub orchestrator: SyncOrchestrator,
    pub progress: AcquireProgress,
}

/// Construct the pipeline from configuration; all components are built once
/// here and injected, nothing is process-global.
pub async fn build_context(config_path: Option<&str>) -> anyhow::Result<AppContext> {
    let config = load_config(config_path)?;

    let acquirer = build_acquirer(&config);
    let progress = acquirer.progress();
    let extractor = ReceiptExtractor::with_config(&config.core.extraction);

    let db_path = config
        .sync
        .database_path
        .to_str()
        .context("database path is not valid UTF-8")?;
    let store = ReceiptStore::open(db_path).await?;

    let api = HttpReceiptApi::new(
        config.sync.api.base_url.clone(),
        config.sync.api.api_key.as_deref(),
    )?;

    let orchestrator = SyncOrchestrator::new(
        Arc::new(acquirer),
        extractor,
        store.clone(),
        Arc::new(api),
    );

    Ok(AppContext {
        config,
        store,
        orchestrator,
        progress,
    })
}

fn build_acquirer(config: &AppConfig) -> TextAcquirer {
    let acquirer = TextAcquirer::new(config.core.pdf.clone());

    #[cfg(feature = "ocr")]
    {
        let det_model = config.core.model_path(&config.core.ocr.detection_model);
        if det_model.exists() {
            match recibo_core::PureOcrEngine::from_config(config.core.ocr.clone()) {
                Ok(engine) => return acquirer.with_ocr(engine),
                Err(e) => warn!("Failed to load OCR models: {}", e),
            }
        } else {
            warn!(
                "OCR models not found at {}; scanned documents will fail to ingest",
                config.core.ocr.model_dir.display()
            );
        }
    }

    acquirer
}
