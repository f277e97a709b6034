// Workflow controller.
// The three-phase state machine: navigation rules, the destructive-reset
// confirmation gate, single-flight request tickets, and the transition
// function that applies worker events to the session.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::api::{Component, ReportFormat};
use crate::error::{Result, StriderError};

use super::console::Console;
use super::picker;
use super::session::{AnalysisSession, BatchProgress};

/// The three workflow phases, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    SelectDiagram,
    IdentifyComponents,
    AnalyzeThreats,
}

impl Phase {
    pub const ALL: [Phase; 3] = [
        Phase::SelectDiagram,
        Phase::IdentifyComponents,
        Phase::AnalyzeThreats,
    ];

    pub fn number(self) -> u8 {
        match self {
            Phase::SelectDiagram => 1,
            Phase::IdentifyComponents => 2,
            Phase::AnalyzeThreats => 3,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Phase::SelectDiagram => "Select Diagram",
            Phase::IdentifyComponents => "Identify Components",
            Phase::AnalyzeThreats => "Analyze Threats",
        }
    }

    /// The phase immediately after this one, if any.
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::SelectDiagram => Some(Phase::IdentifyComponents),
            Phase::IdentifyComponents => Some(Phase::AnalyzeThreats),
            Phase::AnalyzeThreats => None,
        }
    }
}

/// Identifies one issued background operation. Worker events carry the
/// ticket they were issued under; an event whose ticket no longer matches
/// the in-flight slot is stale and is discarded without touching state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// The kind of background operation a ticket was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Upload,
    Identify,
    Analyze,
    FetchReport,
    DownloadReport,
}

impl Operation {
    pub fn label(self) -> &'static str {
        match self {
            Operation::Upload => "Diagram upload",
            Operation::Identify => "Component identification",
            Operation::Analyze => "Threat analysis",
            Operation::FetchReport => "Report fetch",
            Operation::DownloadReport => "Report download",
        }
    }
}

/// The single in-flight operation slot. No two operations run at once
/// within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlight {
    op: Operation,
    ticket: Ticket,
}

/// Loading state for async data.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadingState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Error(String),
}

/// A background task for the app to spawn. Produced by the controller,
/// never executed by it.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Upload {
        ticket: Ticket,
        path: PathBuf,
    },
    Identify {
        ticket: Ticket,
        analysis_id: String,
    },
    Analyze {
        ticket: Ticket,
        analysis_id: String,
        components: Vec<Component>,
    },
    FetchReport {
        ticket: Ticket,
        analysis_id: String,
    },
    DownloadReport {
        ticket: Ticket,
        analysis_id: String,
        format: ReportFormat,
    },
}

/// Result of a finished (or partially finished) background operation.
#[derive(Debug)]
pub enum WorkerEvent {
    UploadFinished {
        ticket: Ticket,
        result: Result<String>,
    },
    IdentifyFinished {
        ticket: Ticket,
        result: Result<std::collections::BTreeMap<String, Vec<Component>>>,
    },
    ComponentAnalyzed {
        ticket: Ticket,
        label: String,
        result: Result<Vec<crate::api::Threat>>,
    },
    BatchFinished {
        ticket: Ticket,
    },
    ReportFetched {
        ticket: Ticket,
        result: Result<serde_json::Value>,
    },
    ReportDownloaded {
        ticket: Ticket,
        result: Result<PathBuf>,
    },
}

/// Outcome of a phase navigation request.
#[derive(Debug, PartialEq)]
pub enum NavOutcome {
    /// Navigation happened; spawn any returned commands.
    Moved(Vec<Command>),
    /// Going back would discard derived data; a confirmation is pending.
    NeedsConfirmation,
    /// The target phase is not reachable from here.
    Denied,
}

/// The workflow state machine. Owns the session and is its only mutator;
/// background results come back through `apply`.
#[derive(Debug)]
pub struct Workflow {
    /// Current phase.
    pub phase: Phase,
    /// Phase numbers completed so far.
    completed: BTreeSet<u8>,
    /// Data derived from the backend for the current diagram.
    pub session: AnalysisSession,
    /// Analyzer progress for the current batch.
    pub batch: BatchProgress,
    /// Report JSON fetched for in-app display.
    pub report: LoadingState<String>,
    /// True while the reset confirmation dialog is showing.
    pub pending_reset: bool,
    in_flight: Option<InFlight>,
    next_ticket: u64,
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new()
    }
}

impl Workflow {
    pub fn new() -> Self {
        Self {
            phase: Phase::SelectDiagram,
            completed: BTreeSet::new(),
            session: AnalysisSession::default(),
            batch: BatchProgress::default(),
            report: LoadingState::Idle,
            pending_reset: false,
            in_flight: None,
            next_ticket: 0,
        }
    }

    /// The operation currently in flight, if any.
    pub fn loading(&self) -> Option<Operation> {
        self.in_flight.map(|f| f.op)
    }

    pub fn is_completed(&self, phase: Phase) -> bool {
        self.completed.contains(&phase.number())
    }

    /// Mark a phase completed. Idempotent.
    pub fn mark_completed(&mut self, phase: Phase) {
        self.completed.insert(phase.number());
    }

    /// True when going back to phase 1 would discard work worth guarding.
    pub fn has_derived_data(&self) -> bool {
        self.session.has_components() || self.batch.complete
    }

    /// Navigate to a phase. Allowed targets are the current phase, any
    /// completed phase, and the phase immediately after the current one
    /// once the current one is completed. Going back to phase 1 with
    /// derived data present asks for confirmation instead of moving.
    pub fn go_to_phase(&mut self, target: Phase) -> NavOutcome {
        let allowed = target == self.phase
            || self.is_completed(target)
            || (Some(target) == self.phase.next() && self.is_completed(self.phase));
        if !allowed {
            return NavOutcome::Denied;
        }

        if target == Phase::SelectDiagram && self.phase != Phase::SelectDiagram {
            if self.has_derived_data() {
                self.pending_reset = true;
                return NavOutcome::NeedsConfirmation;
            }
            // Nothing worth guarding yet; a bare analysis id is recreated
            // by re-uploading.
            self.reset();
            return NavOutcome::Moved(Vec::new());
        }

        self.phase = target;
        let mut commands = Vec::new();
        if target == Phase::AnalyzeThreats
            && !self.is_completed(Phase::AnalyzeThreats)
            && !self.batch.complete
            && self.in_flight.is_none()
        {
            commands.extend(self.start_analyze(self.session.flattened_components()));
        }
        NavOutcome::Moved(commands)
    }

    /// Confirm the pending reset: full return to the initial state.
    pub fn confirm_reset(&mut self) {
        self.reset();
    }

    /// Decline the pending reset, leaving everything unchanged.
    pub fn decline_reset(&mut self) {
        self.pending_reset = false;
    }

    fn reset(&mut self) {
        self.phase = Phase::SelectDiagram;
        self.completed.clear();
        self.session = AnalysisSession::default();
        self.batch = BatchProgress::default();
        self.report = LoadingState::Idle;
        self.pending_reset = false;
        // Clearing the slot orphans any in-flight request; its eventual
        // response fails the ticket check and is discarded.
        self.in_flight = None;
    }

    /// Record the diagram chosen in phase 1.
    pub fn select_diagram(&mut self, path: PathBuf) {
        self.session.diagram = Some(path);
    }

    /// Begin uploading the selected diagram. Validates locally before any
    /// network call and rejects concurrent operations.
    pub fn start_upload(&mut self) -> Result<Command> {
        if let Some(flight) = self.in_flight {
            return Err(StriderError::Busy(flight.op.label()));
        }
        let path = self
            .session
            .diagram
            .clone()
            .ok_or_else(|| StriderError::Validation("no diagram selected".to_string()))?;
        if !picker::is_supported_diagram(&path) {
            return Err(StriderError::Validation(format!(
                "{} is not a .png diagram",
                path.display()
            )));
        }
        let ticket = self.issue(Operation::Upload);
        Ok(Command::Upload { ticket, path })
    }

    /// Re-run component identification after a failure.
    pub fn retry_identify(&mut self) -> Result<Command> {
        if let Some(flight) = self.in_flight {
            return Err(StriderError::Busy(flight.op.label()));
        }
        if self.session.analysis_id.is_none() {
            return Err(StriderError::Validation(
                "no uploaded diagram to identify".to_string(),
            ));
        }
        self.start_identify().ok_or_else(|| {
            StriderError::Validation("no uploaded diagram to identify".to_string())
        })
    }

    /// Re-run analysis for the components that have no recorded threats.
    pub fn retry_analysis(&mut self) -> Result<Command> {
        if let Some(flight) = self.in_flight {
            return Err(StriderError::Busy(flight.op.label()));
        }
        let analysis_id = self
            .session
            .analysis_id
            .clone()
            .ok_or_else(|| StriderError::Validation("no analysis in progress".to_string()))?;
        let remaining: Vec<Component> = self
            .session
            .flattened_components()
            .into_iter()
            .filter(|c| !self.session.threats_by_component.contains_key(&c.label))
            .collect();
        if remaining.is_empty() {
            return Err(StriderError::Validation(
                "every component already has recorded threats".to_string(),
            ));
        }
        self.batch.begin(remaining.len());
        let ticket = self.issue(Operation::Analyze);
        Ok(Command::Analyze {
            ticket,
            analysis_id,
            components: remaining,
        })
    }

    /// Fetch the report JSON for in-app display.
    pub fn start_fetch_report(&mut self) -> Result<Command> {
        if let Some(flight) = self.in_flight {
            return Err(StriderError::Busy(flight.op.label()));
        }
        let analysis_id = self
            .session
            .analysis_id
            .clone()
            .ok_or_else(|| StriderError::Validation("no analysis to report on".to_string()))?;
        self.report = LoadingState::Loading;
        let ticket = self.issue(Operation::FetchReport);
        Ok(Command::FetchReport { ticket, analysis_id })
    }

    /// Download the rendered report in the given format.
    pub fn start_download_report(&mut self, format: ReportFormat) -> Result<Command> {
        if let Some(flight) = self.in_flight {
            return Err(StriderError::Busy(flight.op.label()));
        }
        let analysis_id = self
            .session
            .analysis_id
            .clone()
            .ok_or_else(|| StriderError::Validation("no analysis to report on".to_string()))?;
        let ticket = self.issue(Operation::DownloadReport);
        Ok(Command::DownloadReport {
            ticket,
            analysis_id,
            format,
        })
    }

    fn issue(&mut self, op: Operation) -> Ticket {
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        self.in_flight = Some(InFlight { op, ticket });
        ticket
    }

    fn start_identify(&mut self) -> Option<Command> {
        let analysis_id = self.session.analysis_id.clone()?;
        let ticket = self.issue(Operation::Identify);
        Some(Command::Identify { ticket, analysis_id })
    }

    fn start_analyze(&mut self, components: Vec<Component>) -> Option<Command> {
        if components.is_empty() {
            self.batch.begin(0);
            self.mark_completed(Phase::AnalyzeThreats);
            return None;
        }
        let analysis_id = self.session.analysis_id.clone()?;
        self.batch.begin(components.len());
        let ticket = self.issue(Operation::Analyze);
        Some(Command::Analyze {
            ticket,
            analysis_id,
            components,
        })
    }

    fn is_current(&self, ticket: Ticket, op: Operation) -> bool {
        matches!(self.in_flight, Some(f) if f.ticket == ticket && f.op == op)
    }

    fn finish_if_current(&mut self, ticket: Ticket, op: Operation) -> bool {
        if self.is_current(ticket, op) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    fn log_stale(console: &mut Console) {
        console.log_info("Discarded a stale response from a previous session");
    }

    /// Apply one worker event, logging to the console and returning any
    /// follow-up commands to spawn. Events whose ticket does not match the
    /// in-flight slot are discarded without mutating state.
    pub fn apply(&mut self, event: WorkerEvent, console: &mut Console) -> Vec<Command> {
        match event {
            WorkerEvent::UploadFinished { ticket, result } => {
                if !self.finish_if_current(ticket, Operation::Upload) {
                    Self::log_stale(console);
                    return Vec::new();
                }
                match result {
                    Ok(analysis_id) => {
                        console.log_info(format!("Diagram uploaded, analysis {}", analysis_id));
                        self.session.analysis_id = Some(analysis_id);
                        self.session.components.clear();
                        self.session.threats_by_component.clear();
                        self.batch = BatchProgress::default();
                        self.report = LoadingState::Idle;
                        self.mark_completed(Phase::SelectDiagram);
                        self.phase = Phase::IdentifyComponents;
                        match self.start_identify() {
                            Some(command) => {
                                console.log_info("Identifying components");
                                vec![command]
                            }
                            None => Vec::new(),
                        }
                    }
                    Err(e) => {
                        console.log_error(e.to_string());
                        Vec::new()
                    }
                }
            }
            WorkerEvent::IdentifyFinished { ticket, result } => {
                if !self.finish_if_current(ticket, Operation::Identify) {
                    Self::log_stale(console);
                    return Vec::new();
                }
                match result {
                    Ok(components) => {
                        let groups = components.len();
                        self.session.set_components(components);
                        self.mark_completed(Phase::IdentifyComponents);
                        console.log_info(format!(
                            "Identified {} components in {} groups",
                            self.session.component_count(),
                            groups
                        ));
                    }
                    Err(e) => console.log_error(e.to_string()),
                }
                Vec::new()
            }
            WorkerEvent::ComponentAnalyzed {
                ticket,
                label,
                result,
            } => {
                if !self.is_current(ticket, Operation::Analyze) {
                    Self::log_stale(console);
                    return Vec::new();
                }
                match result {
                    Ok(threats) => {
                        console.log_info(format!("{}: {} threats", label, threats.len()));
                        self.session.record_threats(&label, threats);
                        self.batch.record_attempt(None);
                    }
                    Err(e) => {
                        console.log_warn(e.to_string());
                        self.batch.record_attempt(Some(label));
                    }
                }
                Vec::new()
            }
            WorkerEvent::BatchFinished { ticket } => {
                if !self.finish_if_current(ticket, Operation::Analyze) {
                    Self::log_stale(console);
                    return Vec::new();
                }
                self.batch.finish();
                self.mark_completed(Phase::AnalyzeThreats);
                if self.batch.failed.is_empty() {
                    console.log_info(format!(
                        "Threat analysis complete: {} components",
                        self.batch.total
                    ));
                } else {
                    console.log_warn(format!(
                        "Threat analysis complete: {} of {} components failed (r to retry)",
                        self.batch.failed.len(),
                        self.batch.total
                    ));
                }
                Vec::new()
            }
            WorkerEvent::ReportFetched { ticket, result } => {
                if !self.finish_if_current(ticket, Operation::FetchReport) {
                    Self::log_stale(console);
                    return Vec::new();
                }
                match result {
                    Ok(value) => {
                        let text = serde_json::to_string_pretty(&value)
                            .unwrap_or_else(|_| value.to_string());
                        self.report = LoadingState::Loaded(text);
                    }
                    Err(e) => {
                        self.report = LoadingState::Error(e.to_string());
                        console.log_error(e.to_string());
                    }
                }
                Vec::new()
            }
            WorkerEvent::ReportDownloaded { ticket, result } => {
                if !self.finish_if_current(ticket, Operation::DownloadReport) {
                    Self::log_stale(console);
                    return Vec::new();
                }
                match result {
                    Ok(path) => console.log_info(format!("Report saved to {}", path.display())),
                    Err(e) => console.log_error(e.to_string()),
                }
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::api::{ComponentId, Severity, Threat, ThreatType};

    fn component(id: u64, label: &str, component_type: &str) -> Component {
        Component {
            id: ComponentId::Number(id),
            label: label.to_string(),
            component_type: component_type.to_string(),
        }
    }

    fn threats(component: &str, count: usize) -> Vec<Threat> {
        (0..count)
            .map(|i| Threat {
                title: format!("Threat {} on {}", i, component),
                component: component.to_string(),
                threat_type: ThreatType::Spoofing,
                severity: Severity::Medium,
                description: String::new(),
                mitigation: String::new(),
            })
            .collect()
    }

    fn grouped() -> BTreeMap<String, Vec<Component>> {
        let mut map = BTreeMap::new();
        map.insert("external".to_string(), vec![component(1, "User", "external")]);
        map.insert("process".to_string(), vec![component(2, "API", "process")]);
        map
    }

    fn upload_ticket(command: &Command) -> Ticket {
        match command {
            Command::Upload { ticket, .. } => *ticket,
            other => panic!("expected upload command, got {:?}", other),
        }
    }

    fn identify_ticket(command: &Command) -> Ticket {
        match command {
            Command::Identify { ticket, .. } => *ticket,
            other => panic!("expected identify command, got {:?}", other),
        }
    }

    fn analyze_parts(command: &Command) -> (Ticket, Vec<Component>) {
        match command {
            Command::Analyze {
                ticket, components, ..
            } => (*ticket, components.clone()),
            other => panic!("expected analyze command, got {:?}", other),
        }
    }

    /// Drive a workflow through upload and identification.
    fn identified_workflow() -> (Workflow, Console) {
        let mut workflow = Workflow::new();
        let mut console = Console::new();

        workflow.select_diagram(PathBuf::from("diagram.png"));
        let upload = workflow.start_upload().unwrap();
        let followups = workflow.apply(
            WorkerEvent::UploadFinished {
                ticket: upload_ticket(&upload),
                result: Ok("A1".to_string()),
            },
            &mut console,
        );
        assert_eq!(followups.len(), 1);
        workflow.apply(
            WorkerEvent::IdentifyFinished {
                ticket: identify_ticket(&followups[0]),
                result: Ok(grouped()),
            },
            &mut console,
        );
        (workflow, console)
    }

    #[test]
    fn test_initial_state() {
        let workflow = Workflow::new();
        assert_eq!(workflow.phase, Phase::SelectDiagram);
        assert_eq!(workflow.session, AnalysisSession::default());
        assert_eq!(workflow.batch, BatchProgress::default());
        assert!(!workflow.is_completed(Phase::SelectDiagram));
        assert!(workflow.loading().is_none());
    }

    #[test]
    fn test_upload_success_advances_and_triggers_identify() {
        let (workflow, _) = identified_workflow();

        assert_eq!(workflow.phase, Phase::IdentifyComponents);
        assert!(workflow.is_completed(Phase::SelectDiagram));
        assert!(workflow.is_completed(Phase::IdentifyComponents));
        assert_eq!(workflow.session.analysis_id.as_deref(), Some("A1"));
        assert_eq!(workflow.session.component_count(), 2);
    }

    #[test]
    fn test_upload_failure_leaves_state_unchanged() {
        let mut workflow = Workflow::new();
        let mut console = Console::new();

        workflow.select_diagram(PathBuf::from("diagram.png"));
        let upload = workflow.start_upload().unwrap();
        let followups = workflow.apply(
            WorkerEvent::UploadFinished {
                ticket: upload_ticket(&upload),
                result: Err(StriderError::Upload("503".to_string())),
            },
            &mut console,
        );

        assert!(followups.is_empty());
        assert_eq!(workflow.phase, Phase::SelectDiagram);
        assert!(!workflow.is_completed(Phase::SelectDiagram));
        assert!(workflow.session.analysis_id.is_none());
        assert!(workflow.loading().is_none());
        assert_eq!(console.errors_total, 1);
    }

    #[test]
    fn test_upload_validation_before_any_call() {
        let mut workflow = Workflow::new();

        let err = workflow.start_upload().unwrap_err();
        assert!(matches!(err, StriderError::Validation(_)));

        workflow.select_diagram(PathBuf::from("diagram.svg"));
        let err = workflow.start_upload().unwrap_err();
        assert!(matches!(err, StriderError::Validation(_)));
        assert!(workflow.loading().is_none());
    }

    #[test]
    fn test_concurrent_upload_rejected() {
        let mut workflow = Workflow::new();
        workflow.select_diagram(PathBuf::from("diagram.png"));
        workflow.start_upload().unwrap();

        let err = workflow.start_upload().unwrap_err();
        assert!(matches!(err, StriderError::Busy(_)));
    }

    #[test]
    fn test_go_to_phase_denies_skipping_ahead() {
        let mut workflow = Workflow::new();
        assert_eq!(workflow.go_to_phase(Phase::IdentifyComponents), NavOutcome::Denied);
        assert_eq!(workflow.go_to_phase(Phase::AnalyzeThreats), NavOutcome::Denied);

        let (mut workflow, _) = identified_workflow();
        // Phase 3 is next-after-current with phase 2 completed, so it is
        // reachable, but jumping there again from phase 1 would not be.
        assert!(matches!(
            workflow.go_to_phase(Phase::AnalyzeThreats),
            NavOutcome::Moved(_)
        ));
    }

    #[test]
    fn test_navigation_to_completed_phase_allowed() {
        let (mut workflow, _) = identified_workflow();
        let outcome = workflow.go_to_phase(Phase::AnalyzeThreats);
        assert!(matches!(outcome, NavOutcome::Moved(_)));

        assert_eq!(
            workflow.go_to_phase(Phase::IdentifyComponents),
            NavOutcome::Moved(Vec::new())
        );
        assert_eq!(workflow.phase, Phase::IdentifyComponents);
    }

    #[test]
    fn test_reset_requires_confirmation_with_derived_data() {
        let (mut workflow, _) = identified_workflow();
        let components_before = workflow.session.components.clone();

        assert_eq!(
            workflow.go_to_phase(Phase::SelectDiagram),
            NavOutcome::NeedsConfirmation
        );
        assert!(workflow.pending_reset);

        workflow.decline_reset();
        assert!(!workflow.pending_reset);
        assert_eq!(workflow.phase, Phase::IdentifyComponents);
        assert_eq!(workflow.session.components, components_before);
        assert!(workflow.is_completed(Phase::IdentifyComponents));
    }

    #[test]
    fn test_confirmed_reset_matches_fresh_state() {
        let (mut workflow, mut console) = identified_workflow();
        let outcome = workflow.go_to_phase(Phase::AnalyzeThreats);
        let NavOutcome::Moved(commands) = outcome else {
            panic!("expected to enter phase 3");
        };
        let (ticket, _) = analyze_parts(&commands[0]);
        workflow.apply(
            WorkerEvent::ComponentAnalyzed {
                ticket,
                label: "User".to_string(),
                result: Ok(threats("User", 2)),
            },
            &mut console,
        );

        workflow.go_to_phase(Phase::SelectDiagram);
        workflow.confirm_reset();

        let fresh = Workflow::new();
        assert_eq!(workflow.phase, fresh.phase);
        assert_eq!(workflow.session, fresh.session);
        assert_eq!(workflow.batch, fresh.batch);
        assert_eq!(workflow.report, fresh.report);
        assert!(!workflow.pending_reset);
        for phase in Phase::ALL {
            assert!(!workflow.is_completed(phase));
        }
    }

    #[test]
    fn test_silent_reset_without_derived_data() {
        let mut workflow = Workflow::new();
        let mut console = Console::new();

        workflow.select_diagram(PathBuf::from("diagram.png"));
        let upload = workflow.start_upload().unwrap();
        let followups = workflow.apply(
            WorkerEvent::UploadFinished {
                ticket: upload_ticket(&upload),
                result: Ok("A1".to_string()),
            },
            &mut console,
        );
        // Identification never resolves; no components, nothing to guard.
        drop(followups);

        assert_eq!(
            workflow.go_to_phase(Phase::SelectDiagram),
            NavOutcome::Moved(Vec::new())
        );
        assert_eq!(workflow.phase, Phase::SelectDiagram);
        assert!(workflow.session.analysis_id.is_none());
    }

    #[test]
    fn test_partial_failure_batch_completes() {
        let (mut workflow, mut console) = identified_workflow();
        let NavOutcome::Moved(commands) = workflow.go_to_phase(Phase::AnalyzeThreats) else {
            panic!("expected to enter phase 3");
        };
        let (ticket, components) = analyze_parts(&commands[0]);
        let labels: Vec<&str> = components.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["User", "API"]);

        workflow.apply(
            WorkerEvent::ComponentAnalyzed {
                ticket,
                label: "User".to_string(),
                result: Ok(threats("User", 3)),
            },
            &mut console,
        );
        workflow.apply(
            WorkerEvent::ComponentAnalyzed {
                ticket,
                label: "API".to_string(),
                result: Err(StriderError::AnalysisItem {
                    component: "API".to_string(),
                    message: "timed out".to_string(),
                }),
            },
            &mut console,
        );
        workflow.apply(WorkerEvent::BatchFinished { ticket }, &mut console);

        assert_eq!(workflow.session.threats_by_component["User"].len(), 3);
        assert!(!workflow.session.threats_by_component.contains_key("API"));
        assert_eq!(workflow.batch.processed, 2);
        assert_eq!(workflow.batch.fraction(), 1.0);
        assert_eq!(workflow.batch.failed, vec!["API".to_string()]);
        assert!(workflow.is_completed(Phase::AnalyzeThreats));
    }

    #[test]
    fn test_completed_batch_is_not_restarted() {
        let (mut workflow, mut console) = identified_workflow();
        let NavOutcome::Moved(commands) = workflow.go_to_phase(Phase::AnalyzeThreats) else {
            panic!("expected to enter phase 3");
        };
        let (ticket, components) = analyze_parts(&commands[0]);
        for c in &components {
            workflow.apply(
                WorkerEvent::ComponentAnalyzed {
                    ticket,
                    label: c.label.clone(),
                    result: Ok(threats(&c.label, 1)),
                },
                &mut console,
            );
        }
        workflow.apply(WorkerEvent::BatchFinished { ticket }, &mut console);
        let threats_before = workflow.session.threats_by_component.clone();

        workflow.go_to_phase(Phase::IdentifyComponents);
        assert_eq!(
            workflow.go_to_phase(Phase::AnalyzeThreats),
            NavOutcome::Moved(Vec::new())
        );
        assert_eq!(workflow.session.threats_by_component, threats_before);
    }

    #[test]
    fn test_stale_event_after_reset_is_discarded() {
        let (mut workflow, mut console) = identified_workflow();
        let NavOutcome::Moved(commands) = workflow.go_to_phase(Phase::AnalyzeThreats) else {
            panic!("expected to enter phase 3");
        };
        let (stale_ticket, _) = analyze_parts(&commands[0]);

        workflow.go_to_phase(Phase::SelectDiagram);
        workflow.confirm_reset();

        workflow.apply(
            WorkerEvent::ComponentAnalyzed {
                ticket: stale_ticket,
                label: "User".to_string(),
                result: Ok(threats("User", 3)),
            },
            &mut console,
        );
        workflow.apply(WorkerEvent::BatchFinished { ticket: stale_ticket }, &mut console);

        assert_eq!(workflow.session, AnalysisSession::default());
        assert_eq!(workflow.batch, BatchProgress::default());
        assert!(!workflow.is_completed(Phase::AnalyzeThreats));
    }

    #[test]
    fn test_empty_component_map_completes_immediately() {
        let mut workflow = Workflow::new();
        let mut console = Console::new();

        workflow.select_diagram(PathBuf::from("diagram.png"));
        let upload = workflow.start_upload().unwrap();
        let followups = workflow.apply(
            WorkerEvent::UploadFinished {
                ticket: upload_ticket(&upload),
                result: Ok("A1".to_string()),
            },
            &mut console,
        );
        workflow.apply(
            WorkerEvent::IdentifyFinished {
                ticket: identify_ticket(&followups[0]),
                result: Ok(BTreeMap::new()),
            },
            &mut console,
        );

        assert_eq!(
            workflow.go_to_phase(Phase::AnalyzeThreats),
            NavOutcome::Moved(Vec::new())
        );
        assert!(workflow.batch.complete);
        assert_eq!(workflow.batch.fraction(), 1.0);
        assert!(workflow.is_completed(Phase::AnalyzeThreats));
    }

    #[test]
    fn test_retry_runs_only_components_without_threats() {
        let (mut workflow, mut console) = identified_workflow();
        let NavOutcome::Moved(commands) = workflow.go_to_phase(Phase::AnalyzeThreats) else {
            panic!("expected to enter phase 3");
        };
        let (ticket, _) = analyze_parts(&commands[0]);
        workflow.apply(
            WorkerEvent::ComponentAnalyzed {
                ticket,
                label: "User".to_string(),
                result: Ok(threats("User", 3)),
            },
            &mut console,
        );
        workflow.apply(
            WorkerEvent::ComponentAnalyzed {
                ticket,
                label: "API".to_string(),
                result: Err(StriderError::AnalysisItem {
                    component: "API".to_string(),
                    message: "boom".to_string(),
                }),
            },
            &mut console,
        );
        workflow.apply(WorkerEvent::BatchFinished { ticket }, &mut console);

        let retry = workflow.retry_analysis().unwrap();
        let (retry_ticket, components) = analyze_parts(&retry);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].label, "API");
        assert_eq!(workflow.batch.total, 1);
        assert!(!workflow.batch.complete);

        workflow.apply(
            WorkerEvent::ComponentAnalyzed {
                ticket: retry_ticket,
                label: "API".to_string(),
                result: Ok(threats("API", 2)),
            },
            &mut console,
        );
        workflow.apply(WorkerEvent::BatchFinished { ticket: retry_ticket }, &mut console);

        assert_eq!(workflow.session.threats_by_component["API"].len(), 2);
        assert_eq!(workflow.session.threats_by_component["User"].len(), 3);
        assert!(workflow.batch.complete);

        let err = workflow.retry_analysis().unwrap_err();
        assert!(matches!(err, StriderError::Validation(_)));
    }
}
