// Background workers for analysis-service operations.
// Each worker runs one operation to completion and reports back through
// the event channel; the analyze loop is the only multi-request task and
// issues its calls strictly one at a time.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::api::{AnalysisBackend, Component, ReportFormat};
use crate::error::{Result, StriderError};
use crate::report;
use crate::state::{Ticket, WorkerEvent};

/// Read the diagram from disk and upload it.
pub async fn upload(
    backend: Arc<dyn AnalysisBackend>,
    tx: UnboundedSender<WorkerEvent>,
    ticket: Ticket,
    path: PathBuf,
) {
    let result = upload_inner(backend, &path).await;
    let _ = tx.send(WorkerEvent::UploadFinished { ticket, result });
}

async fn upload_inner(backend: Arc<dyn AnalysisBackend>, path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| StriderError::Upload(format!("could not read {}: {}", path.display(), e)))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("diagram.png")
        .to_string();
    backend
        .upload_diagram(&file_name, bytes)
        .await
        .map_err(|e| StriderError::Upload(e.to_string()))
}

/// Fetch the grouped component list for an analysis.
pub async fn identify(
    backend: Arc<dyn AnalysisBackend>,
    tx: UnboundedSender<WorkerEvent>,
    ticket: Ticket,
    analysis_id: String,
) {
    let result = backend
        .identify_components(&analysis_id)
        .await
        .map_err(|e| StriderError::Identification(e.to_string()));
    let _ = tx.send(WorkerEvent::IdentifyFinished { ticket, result });
}

/// Analyze each component in order, one outstanding request at a time.
/// A per-component failure is reported and the loop moves on; the batch
/// itself always runs to the end.
pub async fn analyze_batch(
    backend: Arc<dyn AnalysisBackend>,
    tx: UnboundedSender<WorkerEvent>,
    ticket: Ticket,
    analysis_id: String,
    components: Vec<Component>,
) {
    for component in components {
        let label = component.label.clone();
        let result = backend
            .analyze_component(&analysis_id, &component)
            .await
            .map_err(|e| StriderError::AnalysisItem {
                component: label.clone(),
                message: e.to_string(),
            });
        if tx
            .send(WorkerEvent::ComponentAnalyzed {
                ticket,
                label,
                result,
            })
            .is_err()
        {
            // Receiver gone, the app is shutting down.
            return;
        }
    }
    let _ = tx.send(WorkerEvent::BatchFinished { ticket });
}

/// Fetch the report JSON for in-app display.
pub async fn fetch_report(
    backend: Arc<dyn AnalysisBackend>,
    tx: UnboundedSender<WorkerEvent>,
    ticket: Ticket,
    analysis_id: String,
) {
    let result = backend
        .fetch_report(&analysis_id)
        .await
        .map_err(|e| StriderError::Export(e.to_string()));
    let _ = tx.send(WorkerEvent::ReportFetched { ticket, result });
}

/// Download the rendered report and save it to the download directory.
pub async fn download_report(
    backend: Arc<dyn AnalysisBackend>,
    tx: UnboundedSender<WorkerEvent>,
    ticket: Ticket,
    analysis_id: String,
    format: ReportFormat,
) {
    let result = download_inner(backend, &analysis_id, format).await;
    let _ = tx.send(WorkerEvent::ReportDownloaded { ticket, result });
}

async fn download_inner(
    backend: Arc<dyn AnalysisBackend>,
    analysis_id: &str,
    format: ReportFormat,
) -> Result<PathBuf> {
    let bytes = backend
        .download_report(analysis_id, format)
        .await
        .map_err(|e| StriderError::Export(e.to_string()))?;
    report::save_report(analysis_id, format, &bytes)
        .map_err(|e| StriderError::Export(e.to_string()))
}
