// UI module for rendering the TUI.
// Contains widgets for tabs, the phase stepper, lists, and modals.

mod list;
mod modal;
mod stepper;
mod tabs;

use ratatui::{prelude::*, widgets::*};

use crate::app::{App, Tab};
use crate::state::{ConsoleLevel, LoadingState, Operation, Phase};

/// Main draw function that renders the entire UI.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Length(2), // Phase stepper
            Constraint::Min(1),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    // Tab bar
    tabs::draw_tabs(frame, app, chunks[0]);

    // Phase stepper (Workflow tab only)
    match app.active_tab {
        Tab::Workflow => stepper::draw_stepper(frame, &app.workflow, chunks[1]),
        Tab::Console => {
            let block = Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray));
            frame.render_widget(block, chunks[1]);
        }
    }

    // Main content area
    draw_content(frame, app, chunks[2]);

    // Status bar
    draw_status_bar(frame, app, chunks[3]);

    // Overlays (rendered last, on top of everything)
    if app.workflow.pending_reset {
        modal::draw_confirm_reset(frame);
    }
    if app.show_help {
        draw_help_overlay(frame);
    }
}

/// Draw the main content area based on active tab.
fn draw_content(frame: &mut Frame, app: &mut App, area: Rect) {
    match app.active_tab {
        Tab::Workflow => draw_workflow_tab(frame, app, area),
        Tab::Console => draw_console_tab(frame, app, area),
    }
}

/// Draw the Workflow tab for the current phase.
fn draw_workflow_tab(frame: &mut Frame, app: &mut App, area: Rect) {
    match app.workflow.phase {
        Phase::SelectDiagram => {
            if app.workflow.loading() == Some(Operation::Upload) {
                list::render_loading(frame, area, "Uploading diagram");
            } else {
                list::render_diagram_list(frame, &mut app.picker, area);
            }
        }
        Phase::IdentifyComponents => {
            if app.workflow.loading() == Some(Operation::Identify) {
                list::render_loading(frame, area, "Identifying components");
            } else if !app.workflow.session.has_components() {
                list::render_empty(frame, area, "No components identified yet (r to retry)");
            } else {
                list::render_component_list(
                    frame,
                    &app.workflow.session,
                    &mut app.components_list,
                    area,
                );
            }
        }
        Phase::AnalyzeThreats => {
            if app.show_report {
                draw_report_viewer(frame, app, area);
            } else {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(3), Constraint::Min(1)])
                    .split(area);
                draw_progress_gauge(frame, app, chunks[0]);
                list::render_threat_view(
                    frame,
                    &app.workflow.session,
                    &app.workflow.batch,
                    app.threats_scroll,
                    chunks[1],
                );
            }
        }
    }
}

/// Draw the analyzer progress gauge.
fn draw_progress_gauge(frame: &mut Frame, app: &App, area: Rect) {
    let batch = &app.workflow.batch;
    let label = format!("{}/{} components", batch.processed, batch.total);
    let gauge_color = if batch.complete {
        Color::Green
    } else {
        Color::Yellow
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Analysis Progress "),
        )
        .gauge_style(Style::default().fg(gauge_color))
        .ratio(batch.fraction())
        .label(label);
    frame.render_widget(gauge, area);
}

/// Draw the report viewer.
fn draw_report_viewer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Report ");
    match &app.workflow.report {
        LoadingState::Idle => {
            let text = Paragraph::new("Press p to fetch the report")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(text, area);
        }
        LoadingState::Loading => {
            let text = Paragraph::new("⏳ Fetching report...")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(text, area);
        }
        LoadingState::Error(e) => {
            let text = Paragraph::new(format!("❌ {}", e))
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Red))
                .block(block);
            frame.render_widget(text, area);
        }
        LoadingState::Loaded(report) => {
            let text = Paragraph::new(report.as_str())
                .block(block)
                .scroll((app.report_scroll, 0));
            frame.render_widget(text, area);
        }
    }
}

/// Draw the Console tab with the activity log.
fn draw_console_tab(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Console ");

    if app.console.messages.is_empty() {
        let text = Paragraph::new("No messages")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(text, area);
    } else {
        let items: Vec<ListItem> = app
            .console
            .messages
            .iter()
            .map(|msg| {
                let (icon, color) = match msg.level {
                    ConsoleLevel::Error => ("❌", Color::Red),
                    ConsoleLevel::Warn => ("⚠️", Color::Yellow),
                    ConsoleLevel::Info => ("ℹ️", Color::Cyan),
                };

                let time = list::format_relative_time(&msg.timestamp);

                ListItem::new(Line::from(vec![
                    Span::raw(format!("{} ", icon)),
                    Span::styled(time, Style::default().fg(Color::DarkGray)),
                    Span::raw(" "),
                    Span::styled(msg.message.clone(), Style::default().fg(color)),
                ]))
            })
            .collect();

        let list_widget = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        frame.render_stateful_widget(list_widget, area, &mut app.console.list_state);
    }
}

/// Draw the status bar with keybinding hints.
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut hints = match app.active_tab {
        Tab::Workflow => {
            let mut hints = vec![
                Span::raw(" 1-3 "),
                Span::styled("Phase", Style::default().fg(Color::DarkGray)),
                Span::raw("  ↑↓ "),
                Span::styled("Navigate", Style::default().fg(Color::DarkGray)),
            ];
            match app.workflow.phase {
                Phase::SelectDiagram => {
                    hints.push(Span::raw("  ↵ "));
                    hints.push(Span::styled("Upload", Style::default().fg(Color::DarkGray)));
                    hints.push(Span::raw("  r "));
                    hints.push(Span::styled("Rescan", Style::default().fg(Color::DarkGray)));
                }
                Phase::IdentifyComponents => {
                    hints.push(Span::raw("  r "));
                    hints.push(Span::styled("Retry", Style::default().fg(Color::DarkGray)));
                }
                Phase::AnalyzeThreats => {
                    hints.push(Span::raw("  r "));
                    hints.push(Span::styled("Retry", Style::default().fg(Color::DarkGray)));
                    hints.push(Span::raw("  p "));
                    hints.push(Span::styled("Report", Style::default().fg(Color::DarkGray)));
                    hints.push(Span::raw("  d "));
                    hints.push(Span::styled("PDF", Style::default().fg(Color::DarkGray)));
                    hints.push(Span::raw("  e "));
                    hints.push(Span::styled("JSON", Style::default().fg(Color::DarkGray)));
                }
            }
            hints
        }
        Tab::Console => vec![
            Span::raw(" ↑↓ "),
            Span::styled("Navigate", Style::default().fg(Color::DarkGray)),
        ],
    };

    hints.push(Span::raw("  Tab "));
    hints.push(Span::styled("Switch", Style::default().fg(Color::DarkGray)));
    hints.push(Span::raw("  ? "));
    hints.push(Span::styled("Help", Style::default().fg(Color::DarkGray)));
    hints.push(Span::raw("  q "));
    hints.push(Span::styled("Quit", Style::default().fg(Color::DarkGray)));

    hints.push(Span::styled(
        format!("  API: {}", app.api_base),
        Style::default().fg(Color::DarkGray),
    ));

    let status = Paragraph::new(Line::from(hints));
    frame.render_widget(status, area);
}

/// Draw the help overlay.
fn draw_help_overlay(frame: &mut Frame) {
    let area = frame.area();

    // Create a centered popup
    let popup_width = 55;
    let popup_height = 19;
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  1/2/3         ", Style::default().fg(Color::Cyan)),
            Span::raw("Go to workflow phase"),
        ]),
        Line::from(vec![
            Span::styled("  ↑/↓ or j/k    ", Style::default().fg(Color::Cyan)),
            Span::raw("Navigate list / scroll"),
        ]),
        Line::from(vec![
            Span::styled("  Enter         ", Style::default().fg(Color::Cyan)),
            Span::raw("Upload selected diagram (phase 1)"),
        ]),
        Line::from(vec![
            Span::styled("  r             ", Style::default().fg(Color::Cyan)),
            Span::raw("Rescan / retry current phase"),
        ]),
        Line::from(vec![
            Span::styled("  p             ", Style::default().fg(Color::Cyan)),
            Span::raw("View report (phase 3)"),
        ]),
        Line::from(vec![
            Span::styled("  d / e         ", Style::default().fg(Color::Cyan)),
            Span::raw("Download report as PDF / JSON"),
        ]),
        Line::from(vec![
            Span::styled("  Esc           ", Style::default().fg(Color::Cyan)),
            Span::raw("Close report viewer / help"),
        ]),
        Line::from(vec![
            Span::styled("  Tab           ", Style::default().fg(Color::Cyan)),
            Span::raw("Switch tabs"),
        ]),
        Line::from(vec![
            Span::styled("  ?             ", Style::default().fg(Color::Cyan)),
            Span::raw("Show/hide this help"),
        ]),
        Line::from(vec![
            Span::styled("  q             ", Style::default().fg(Color::Cyan)),
            Span::raw("Quit"),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::DarkGray)),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::styled(" or ", Style::default().fg(Color::DarkGray)),
            Span::styled("?", Style::default().fg(Color::Yellow)),
            Span::styled(" to close", Style::default().fg(Color::DarkGray)),
        ]),
    ];

    let help_paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help ")
                .title_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .alignment(Alignment::Left);

    frame.render_widget(help_paragraph, popup_area);
}
