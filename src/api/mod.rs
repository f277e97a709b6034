// Analysis service module.
// Provides the client, wire types, and backend contract for the remote
// STRIDE analysis service.

pub mod client;
pub mod endpoints;
pub mod types;

use std::collections::BTreeMap;

use async_trait::async_trait;

pub use client::AnalysisClient;
pub use types::*;

use crate::error::Result;

/// The analysis service contract: upload a diagram, fetch its identified
/// components, request a threat assessment for one component at a time,
/// and retrieve the rendered report.
///
/// The service is an external collaborator; everything behind these five
/// calls (diagram parsing, threat generation, report rendering) is its
/// business. Tests substitute scripted implementations.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Upload a diagram and get back the analysis identifier.
    async fn upload_diagram(&self, file_name: &str, bytes: Vec<u8>) -> Result<String>;

    /// Fetch identified components, grouped by component type.
    async fn identify_components(
        &self,
        analysis_id: &str,
    ) -> Result<BTreeMap<String, Vec<Component>>>;

    /// Request a threat assessment for a single component.
    async fn analyze_component(
        &self,
        analysis_id: &str,
        component: &Component,
    ) -> Result<Vec<Threat>>;

    /// Fetch the report JSON for in-app display.
    async fn fetch_report(&self, analysis_id: &str) -> Result<serde_json::Value>;

    /// Download the rendered report in the requested format.
    async fn download_report(&self, analysis_id: &str, format: ReportFormat) -> Result<Vec<u8>>;
}
