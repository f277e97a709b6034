// App state and main event loop.
// Owns the workflow controller, drains worker events, and dispatches
// keyboard input per tab and phase.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::prelude::*;
use ratatui::widgets::ListState;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::api::{AnalysisBackend, AnalysisClient, ReportFormat};
use crate::state::{
    Command, Console, DiagramPicker, NavOutcome, Phase, WorkerEvent, Workflow,
};
use crate::{ui, worker};

/// Active tab in the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Workflow,
    Console,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Workflow => "Workflow",
            Tab::Console => "Console",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Tab::Workflow => Tab::Console,
            Tab::Console => Tab::Workflow,
        }
    }

    pub fn prev(&self) -> Self {
        self.next()
    }
}

/// Main application state.
pub struct App {
    /// Currently active tab.
    pub active_tab: Tab,
    /// The workflow state machine.
    pub workflow: Workflow,
    /// Phase-1 diagram chooser.
    pub picker: DiagramPicker,
    /// Activity log.
    pub console: Console,
    /// Number of unread console errors (for badge).
    pub console_unread: usize,
    /// List state for the phase-2 component list.
    pub components_list: ListState,
    /// Vertical scroll offset for the phase-3 threat view.
    pub threats_scroll: u16,
    /// Vertical scroll offset for the report viewer.
    pub report_scroll: u16,
    /// Whether the report viewer replaces the threat view.
    pub show_report: bool,
    /// Whether the help overlay is visible.
    pub show_help: bool,
    /// Whether the app should exit.
    pub should_quit: bool,
    /// Base URL shown in the status bar.
    pub api_base: String,
    errors_seen: u64,
    backend: Arc<dyn AnalysisBackend>,
    events_tx: UnboundedSender<WorkerEvent>,
    events_rx: UnboundedReceiver<WorkerEvent>,
}

impl App {
    pub fn new(client: Arc<AnalysisClient>) -> Self {
        let api_base = client.base_url().to_string();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let mut console = Console::new();
        let mut picker = DiagramPicker::from_env();
        match picker.scan() {
            Ok(()) => console.log_info(format!(
                "Found {} diagrams in {}",
                picker.files.len(),
                picker.dir.display()
            )),
            Err(e) => console.log_error(format!(
                "Could not scan {}: {}",
                picker.dir.display(),
                e
            )),
        }

        Self {
            active_tab: Tab::default(),
            workflow: Workflow::new(),
            picker,
            console,
            console_unread: 0,
            components_list: ListState::default(),
            threats_scroll: 0,
            report_scroll: 0,
            show_report: false,
            show_help: false,
            should_quit: false,
            api_base,
            errors_seen: 0,
            backend: client,
            events_tx,
            events_rx,
        }
    }

    /// Main event loop.
    pub async fn run(&mut self, terminal: &mut Terminal<impl Backend>) -> io::Result<()> {
        while !self.should_quit {
            self.drain_worker_events();
            self.sync_console_badge();
            terminal.draw(|frame| ui::draw(frame, self))?;
            self.handle_events()?;
        }
        Ok(())
    }

    /// Apply all worker events that have arrived since the last tick.
    fn drain_worker_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            let commands = self.workflow.apply(event, &mut self.console);
            self.execute(commands);
        }
    }

    /// Keep the Console tab badge in sync with logged errors.
    fn sync_console_badge(&mut self) {
        if self.active_tab == Tab::Console {
            self.errors_seen = self.console.errors_total;
            self.console_unread = 0;
        } else {
            self.console_unread = (self.console.errors_total - self.errors_seen) as usize;
        }
    }

    /// Spawn a background worker for each command.
    fn execute(&mut self, commands: Vec<Command>) {
        for command in commands {
            let backend = self.backend.clone();
            let tx = self.events_tx.clone();
            match command {
                Command::Upload { ticket, path } => {
                    tokio::spawn(worker::upload(backend, tx, ticket, path));
                }
                Command::Identify { ticket, analysis_id } => {
                    tokio::spawn(worker::identify(backend, tx, ticket, analysis_id));
                }
                Command::Analyze {
                    ticket,
                    analysis_id,
                    components,
                } => {
                    tokio::spawn(worker::analyze_batch(
                        backend,
                        tx,
                        ticket,
                        analysis_id,
                        components,
                    ));
                }
                Command::FetchReport { ticket, analysis_id } => {
                    tokio::spawn(worker::fetch_report(backend, tx, ticket, analysis_id));
                }
                Command::DownloadReport {
                    ticket,
                    analysis_id,
                    format,
                } => {
                    tokio::spawn(worker::download_report(
                        backend,
                        tx,
                        ticket,
                        analysis_id,
                        format,
                    ));
                }
            }
        }
    }

    /// Handle keyboard and other events.
    #[allow(clippy::collapsible_if)]
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key.code);
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) {
        if self.show_help {
            if matches!(code, KeyCode::Char('?') | KeyCode::Esc) {
                self.show_help = false;
            }
            return;
        }

        // The reset confirmation gate captures all input while showing.
        if self.workflow.pending_reset {
            match code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.workflow.confirm_reset();
                    self.reset_view_state();
                    self.console.log_info("Workflow reset");
                }
                KeyCode::Char('n') | KeyCode::Esc => self.workflow.decline_reset(),
                _ => {}
            }
            return;
        }

        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Tab => self.active_tab = self.active_tab.next(),
            KeyCode::BackTab => self.active_tab = self.active_tab.prev(),
            _ => match self.active_tab {
                Tab::Workflow => self.handle_workflow_key(code),
                Tab::Console => self.handle_console_key(code),
            },
        }
    }

    fn handle_workflow_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('1') => self.navigate(Phase::SelectDiagram),
            KeyCode::Char('2') => self.navigate(Phase::IdentifyComponents),
            KeyCode::Char('3') => self.navigate(Phase::AnalyzeThreats),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_up(),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_down(),
            KeyCode::Enter => {
                if self.workflow.phase == Phase::SelectDiagram {
                    self.begin_upload();
                }
            }
            KeyCode::Char('r') => self.refresh_current_phase(),
            KeyCode::Char('p') => {
                if self.workflow.phase == Phase::AnalyzeThreats {
                    self.report_scroll = 0;
                    self.show_report = true;
                    if matches!(self.workflow.report, crate::state::LoadingState::Idle) {
                        self.run_or_log(|workflow| workflow.start_fetch_report());
                    }
                }
            }
            KeyCode::Char('d') => {
                if self.workflow.phase == Phase::AnalyzeThreats {
                    self.run_or_log(|workflow| workflow.start_download_report(ReportFormat::Pdf));
                }
            }
            KeyCode::Char('e') => {
                if self.workflow.phase == Phase::AnalyzeThreats {
                    self.run_or_log(|workflow| workflow.start_download_report(ReportFormat::Json));
                }
            }
            KeyCode::Esc => {
                if self.show_report {
                    self.show_report = false;
                }
            }
            _ => {}
        }
    }

    fn handle_console_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up | KeyCode::Char('k') => self.console.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.console.select_next(),
            _ => {}
        }
    }

    fn navigate(&mut self, target: Phase) {
        match self.workflow.go_to_phase(target) {
            NavOutcome::Moved(commands) => self.execute(commands),
            // The confirmation modal renders from pending_reset.
            NavOutcome::NeedsConfirmation => {}
            NavOutcome::Denied => self.console.log_warn(format!(
                "Phase {} ({}) is not reachable yet",
                target.number(),
                target.title()
            )),
        }
    }

    fn begin_upload(&mut self) {
        let Some(path) = self.picker.selected_path().cloned() else {
            self.console.log_warn("No diagram selected");
            return;
        };
        self.workflow.select_diagram(path.clone());
        match self.workflow.start_upload() {
            Ok(command) => {
                self.console
                    .log_info(format!("Uploading {}", path.display()));
                self.execute(vec![command]);
            }
            Err(e) => self.console.log_error(e.to_string()),
        }
    }

    fn refresh_current_phase(&mut self) {
        match self.workflow.phase {
            Phase::SelectDiagram => {
                if let Err(e) = self.picker.scan() {
                    self.console.log_error(format!("Rescan failed: {}", e));
                }
            }
            Phase::IdentifyComponents => {
                self.run_or_log(|workflow| workflow.retry_identify());
            }
            Phase::AnalyzeThreats => {
                self.run_or_log(|workflow| workflow.retry_analysis());
            }
        }
    }

    /// Run a controller operation, spawning its command or logging the
    /// rejection.
    fn run_or_log(
        &mut self,
        operation: impl FnOnce(&mut Workflow) -> crate::error::Result<Command>,
    ) {
        match operation(&mut self.workflow) {
            Ok(command) => self.execute(vec![command]),
            Err(e) => self.console.log_warn(e.to_string()),
        }
    }

    fn scroll_up(&mut self) {
        match self.workflow.phase {
            Phase::SelectDiagram => self.picker.select_prev(),
            Phase::IdentifyComponents => {
                let len = self.components_item_count();
                if len == 0 {
                    return;
                }
                let i = self.components_list.selected().unwrap_or(0).saturating_sub(1);
                self.components_list.select(Some(i));
            }
            Phase::AnalyzeThreats => {
                if self.show_report {
                    self.report_scroll = self.report_scroll.saturating_sub(1);
                } else {
                    self.threats_scroll = self.threats_scroll.saturating_sub(1);
                }
            }
        }
    }

    fn scroll_down(&mut self) {
        match self.workflow.phase {
            Phase::SelectDiagram => self.picker.select_next(),
            Phase::IdentifyComponents => {
                let len = self.components_item_count();
                if len == 0 {
                    return;
                }
                let i = match self.components_list.selected() {
                    Some(i) => (i + 1).min(len - 1),
                    None => 0,
                };
                self.components_list.select(Some(i));
            }
            Phase::AnalyzeThreats => {
                if self.show_report {
                    self.report_scroll = self.report_scroll.saturating_add(1);
                } else {
                    self.threats_scroll = self.threats_scroll.saturating_add(1);
                }
            }
        }
    }

    /// Rows in the phase-2 list: one header per group plus its components.
    fn components_item_count(&self) -> usize {
        self.workflow.session.components.len() + self.workflow.session.component_count()
    }

    /// Return view-only state to its initial values after a reset.
    fn reset_view_state(&mut self) {
        self.components_list.select(None);
        self.threats_scroll = 0;
        self.report_scroll = 0;
        self.show_report = false;
    }
}
