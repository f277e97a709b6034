// strider: terminal client for incremental STRIDE threat analysis.
// Sets up the terminal and runtime, then hands off to the app event loop.

mod api;
mod app;
mod error;
mod report;
mod state;
mod ui;
mod worker;

use std::io;
use std::sync::Arc;

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use crate::api::AnalysisClient;
use crate::app::App;

#[tokio::main]
async fn main() -> io::Result<()> {
    let client = match AnalysisClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to initialize analysis client: {}", e);
            std::process::exit(1);
        }
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let mut app = App::new(Arc::new(client));
    let result = app.run(&mut terminal).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
