// Analysis service endpoint functions.
// Typed calls implementing the upload/identify/analyze/report REST contract.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::AnalysisBackend;
use super::client::AnalysisClient;
use super::types::{Component, ReportFormat, Threat};

/// Response wrapper for the diagram upload.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    analysis_id: String,
}

/// Response wrapper for the component listing.
#[derive(Debug, Deserialize)]
struct ComponentsResponse {
    components: BTreeMap<String, Vec<Component>>,
}

/// Response wrapper for a single-component threat assessment.
#[derive(Debug, Deserialize)]
struct ThreatsResponse {
    threats: Vec<Threat>,
}

/// Request body for the incremental per-component analysis call.
#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    analysis_id: &'a str,
    component: &'a Component,
}

#[async_trait]
impl AnalysisBackend for AnalysisClient {
    async fn upload_diagram(&self, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("image/png")?;
        let form = Form::new().part("file", part);
        let response = self.post_multipart("/api/upload", form).await?;
        let wrapper: UploadResponse = response.json().await?;
        Ok(wrapper.analysis_id)
    }

    async fn identify_components(
        &self,
        analysis_id: &str,
    ) -> Result<BTreeMap<String, Vec<Component>>> {
        let response = self.get(&format!("/api/components/{}", analysis_id)).await?;
        let wrapper: ComponentsResponse = response.json().await?;
        Ok(wrapper.components)
    }

    async fn analyze_component(
        &self,
        analysis_id: &str,
        component: &Component,
    ) -> Result<Vec<Threat>> {
        let body = AnalyzeRequest {
            analysis_id,
            component,
        };
        let response = self.post_json("/api/stride_incremental", &body).await?;
        let wrapper: ThreatsResponse = response.json().await?;
        Ok(wrapper.threats)
    }

    async fn fetch_report(&self, analysis_id: &str) -> Result<serde_json::Value> {
        let response = self.get(&format!("/api/report/{}", analysis_id)).await?;
        let report: serde_json::Value = response.json().await?;
        Ok(report)
    }

    async fn download_report(&self, analysis_id: &str, format: ReportFormat) -> Result<Vec<u8>> {
        let params = [("format", format.as_str())];
        let response = self
            .get_with_params(&format!("/api/report/{}/download", analysis_id), &params)
            .await?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::ComponentId;

    #[test]
    fn test_analyze_request_shape() {
        let component = Component {
            id: ComponentId::Number(2),
            label: "API".to_string(),
            component_type: "process".to_string(),
        };
        let body = serde_json::to_value(AnalyzeRequest {
            analysis_id: "A1",
            component: &component,
        })
        .unwrap();

        assert_eq!(body["analysis_id"], "A1");
        assert_eq!(body["component"]["label"], "API");
        assert_eq!(body["component"]["type"], "process");
    }

    #[test]
    fn test_components_response_groups_by_type() {
        let json = r#"{
            "components": {
                "external": [{"id": 1, "label": "User", "type": "external"}],
                "process": [{"id": 2, "label": "API", "type": "process"}]
            }
        }"#;

        let wrapper: ComponentsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(wrapper.components.len(), 2);
        assert_eq!(wrapper.components["external"][0].label, "User");
        assert_eq!(wrapper.components["process"][0].label, "API");
    }
}
