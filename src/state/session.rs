// Analysis session data.
// Holds everything derived from the backend for the current diagram.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::api::{Component, Threat};

/// All state derived from one uploaded diagram.
///
/// Created on a successful upload, filled in by the identification and
/// analysis steps, and discarded wholesale on a confirmed reset. Threat
/// entries are only ever keyed by labels of identified components.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisSession {
    /// Diagram file chosen in phase 1.
    pub diagram: Option<PathBuf>,
    /// Identifier returned by the upload endpoint.
    pub analysis_id: Option<String>,
    /// Identified components, grouped by component type.
    pub components: BTreeMap<String, Vec<Component>>,
    /// Threats recorded per component label. Failed components have no entry.
    pub threats_by_component: BTreeMap<String, Vec<Threat>>,
}

impl AnalysisSession {
    /// Components flattened in group-key order. This is the order the
    /// analyzer processes them in.
    pub fn flattened_components(&self) -> Vec<Component> {
        self.components.values().flatten().cloned().collect()
    }

    /// Total number of identified components across all groups.
    pub fn component_count(&self) -> usize {
        self.components.values().map(Vec::len).sum()
    }

    pub fn has_components(&self) -> bool {
        self.components.values().any(|group| !group.is_empty())
    }

    /// Total number of recorded threats across all components.
    pub fn threat_count(&self) -> usize {
        self.threats_by_component.values().map(Vec::len).sum()
    }

    /// Replace the component map, dropping threat entries whose label no
    /// longer belongs to any identified component.
    pub fn set_components(&mut self, components: BTreeMap<String, Vec<Component>>) {
        self.components = components;
        let labels: BTreeSet<String> = self
            .components
            .values()
            .flatten()
            .map(|c| c.label.clone())
            .collect();
        self.threats_by_component
            .retain(|label, _| labels.contains(label));
    }

    /// Record the assessment for one component. Returns false (and records
    /// nothing) if the label does not belong to an identified component.
    pub fn record_threats(&mut self, label: &str, threats: Vec<Threat>) -> bool {
        let known = self
            .components
            .values()
            .flatten()
            .any(|c| c.label == label);
        if !known {
            return false;
        }
        self.threats_by_component.insert(label.to_string(), threats);
        true
    }
}

/// Progress bookkeeping for one analysis batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchProgress {
    /// Components attempted so far, success or failure.
    pub processed: usize,
    /// Components in this batch.
    pub total: usize,
    /// True once every component in the batch has been attempted.
    pub complete: bool,
    /// Labels whose analysis call failed this batch.
    pub failed: Vec<String>,
}

impl BatchProgress {
    /// Start a new batch of `total` components. An empty batch is complete
    /// immediately.
    pub fn begin(&mut self, total: usize) {
        self.processed = 0;
        self.total = total;
        self.complete = total == 0;
        self.failed.clear();
    }

    /// Record one attempted component, failed or not.
    pub fn record_attempt(&mut self, failed_label: Option<String>) {
        self.processed += 1;
        if let Some(label) = failed_label {
            self.failed.push(label);
        }
    }

    /// Mark the batch finished.
    pub fn finish(&mut self) {
        self.complete = true;
    }

    /// Fraction of the batch attempted, in 0.0..=1.0.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            if self.complete { 1.0 } else { 0.0 }
        } else {
            self.processed as f64 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ComponentId, Severity, ThreatType};

    fn component(id: u64, label: &str, component_type: &str) -> Component {
        Component {
            id: ComponentId::Number(id),
            label: label.to_string(),
            component_type: component_type.to_string(),
        }
    }

    fn threat(component: &str) -> Threat {
        Threat {
            title: format!("Spoofing on {}", component),
            component: component.to_string(),
            threat_type: ThreatType::Spoofing,
            severity: Severity::High,
            description: String::new(),
            mitigation: String::new(),
        }
    }

    fn grouped() -> BTreeMap<String, Vec<Component>> {
        let mut map = BTreeMap::new();
        map.insert("external".to_string(), vec![component(1, "User", "external")]);
        map.insert("process".to_string(), vec![component(2, "API", "process")]);
        map
    }

    #[test]
    fn test_flatten_follows_group_key_order() {
        let mut session = AnalysisSession::default();
        session.set_components(grouped());

        let labels: Vec<String> = session
            .flattened_components()
            .into_iter()
            .map(|c| c.label)
            .collect();
        assert_eq!(labels, vec!["User", "API"]);
        assert_eq!(session.component_count(), 2);
    }

    #[test]
    fn test_record_threats_rejects_unknown_label() {
        let mut session = AnalysisSession::default();
        session.set_components(grouped());

        assert!(session.record_threats("User", vec![threat("User")]));
        assert!(!session.record_threats("Mainframe", vec![threat("Mainframe")]));
        assert_eq!(session.threats_by_component.len(), 1);
    }

    #[test]
    fn test_set_components_drops_orphaned_threats() {
        let mut session = AnalysisSession::default();
        session.set_components(grouped());
        session.record_threats("User", vec![threat("User")]);
        session.record_threats("API", vec![threat("API")]);

        let mut replacement = BTreeMap::new();
        replacement.insert("process".to_string(), vec![component(2, "API", "process")]);
        session.set_components(replacement);

        assert_eq!(session.threats_by_component.len(), 1);
        assert!(session.threats_by_component.contains_key("API"));
        assert!(!session.threats_by_component.contains_key("User"));
    }

    #[test]
    fn test_batch_fraction() {
        let mut batch = BatchProgress::default();
        assert_eq!(batch.fraction(), 0.0);

        batch.begin(2);
        assert!(!batch.complete);
        assert_eq!(batch.fraction(), 0.0);

        batch.record_attempt(None);
        assert_eq!(batch.fraction(), 0.5);

        batch.record_attempt(Some("API".to_string()));
        batch.finish();
        assert_eq!(batch.fraction(), 1.0);
        assert_eq!(batch.failed, vec!["API".to_string()]);
    }

    #[test]
    fn test_empty_batch_is_complete_immediately() {
        let mut batch = BatchProgress::default();
        batch.begin(0);
        assert!(batch.complete);
        assert_eq!(batch.fraction(), 1.0);
    }
}
