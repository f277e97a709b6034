// State management module.
// Session data, workflow control, and UI-facing state for tabs.

pub mod console;
pub mod picker;
pub mod session;
pub mod workflow;

pub use console::{Console, ConsoleLevel, ConsoleMessage};
pub use picker::DiagramPicker;
pub use session::{AnalysisSession, BatchProgress};
pub use workflow::{
    Command, LoadingState, NavOutcome, Operation, Phase, Ticket, WorkerEvent, Workflow,
};
