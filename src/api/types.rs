// Analysis service wire types.
// Defines structs for the upload/identify/analyze/report REST contract.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Component identifier as produced by the diagram parser.
/// Some deployments emit numeric ids, others opaque strings ("c1").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComponentId {
    Number(u64),
    Text(String),
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentId::Number(n) => write!(f, "{}", n),
            ComponentId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A structural element identified in the uploaded diagram.
/// Immutable once received; grouped by `component_type` for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    pub label: String,
    #[serde(rename = "type", default)]
    pub component_type: String,
}

/// Severity assigned to a threat by the analysis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
    Low,
    #[serde(other)]
    Unknown,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
            Severity::Unknown => "Unrated",
        }
    }
}

/// STRIDE threat category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreatType {
    Spoofing,
    Tampering,
    Repudiation,
    #[serde(rename = "Information Disclosure")]
    InformationDisclosure,
    #[serde(rename = "Denial of Service")]
    DenialOfService,
    #[serde(rename = "Elevation of Privilege")]
    ElevationOfPrivilege,
    #[serde(other)]
    Unknown,
}

impl ThreatType {
    pub fn label(&self) -> &'static str {
        match self {
            ThreatType::Spoofing => "Spoofing",
            ThreatType::Tampering => "Tampering",
            ThreatType::Repudiation => "Repudiation",
            ThreatType::InformationDisclosure => "Information Disclosure",
            ThreatType::DenialOfService => "Denial of Service",
            ThreatType::ElevationOfPrivilege => "Elevation of Privilege",
            ThreatType::Unknown => "Other",
        }
    }
}

/// One threat produced by the per-component analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threat {
    pub title: String,
    pub component: String,
    pub threat_type: ThreatType,
    pub severity: Severity,
    pub description: String,
    pub mitigation: String,
}

/// Export format accepted by the report download endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Pdf,
    Json,
}

impl ReportFormat {
    /// Value of the `format` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Json => "json",
        }
    }

    /// File extension for the saved report.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}
