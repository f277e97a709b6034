// List and detail rendering for workflow phases.
// Provides styled views with loading and empty states.

use chrono::{DateTime, Utc};
use ratatui::{prelude::*, widgets::*};

use crate::api::Severity;
use crate::state::{AnalysisSession, BatchProgress, DiagramPicker};

/// Format a timestamp as relative time (e.g., "2h ago").
pub fn format_relative_time(dt: &DateTime<Utc>) -> String {
    let now = Utc::now();
    let duration = now.signed_duration_since(*dt);

    if duration.num_days() > 0 {
        format!("{}d ago", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m ago", duration.num_minutes())
    } else {
        "just now".to_string()
    }
}

/// Get color for threat severity.
pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::High => Color::Red,
        Severity::Medium => Color::Yellow,
        Severity::Low => Color::Green,
        Severity::Unknown => Color::White,
    }
}

/// Render a loading indicator.
pub fn render_loading(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(format!("⏳ {}...", message))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(text, area);
}

/// Render an empty state message.
pub fn render_empty(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(text, area);
}

/// Render the phase-1 diagram list.
pub fn render_diagram_list(frame: &mut Frame, picker: &mut DiagramPicker, area: Rect) {
    if picker.files.is_empty() {
        render_empty(
            frame,
            area,
            &format!(
                "No .png diagrams in {} (r to rescan)",
                picker.dir.display()
            ),
        );
        return;
    }

    let items: Vec<ListItem> = picker
        .files
        .iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            ListItem::new(Line::from(Span::styled(
                name,
                Style::default().fg(Color::Cyan),
            )))
        })
        .collect();

    let title = format!(" Diagrams in {} ", picker.dir.display());
    let list_widget = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list_widget, area, &mut picker.list_state);
}

/// Render the phase-2 component list, grouped by component type.
pub fn render_component_list(
    frame: &mut Frame,
    session: &AnalysisSession,
    list_state: &mut ListState,
    area: Rect,
) {
    let mut items: Vec<ListItem> = Vec::new();
    for (group, components) in &session.components {
        items.push(ListItem::new(Line::from(Span::styled(
            group.clone(),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ))));
        for component in components {
            items.push(ListItem::new(Line::from(vec![
                Span::raw("  "),
                Span::styled(component.label.clone(), Style::default().fg(Color::Cyan)),
                Span::styled(
                    format!("  #{}", component.id),
                    Style::default().fg(Color::DarkGray),
                ),
            ])));
        }
    }

    let title = format!(" Components ({}) ", session.component_count());
    let list_widget = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list_widget, area, list_state);
}

/// Render the phase-3 per-component threat breakdown.
pub fn render_threat_view(
    frame: &mut Frame,
    session: &AnalysisSession,
    batch: &BatchProgress,
    scroll: u16,
    area: Rect,
) {
    let components = session.flattened_components();
    if components.is_empty() {
        render_empty(frame, area, "No components to analyze");
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for component in &components {
        let header = Span::styled(
            component.label.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
        match session.threats_by_component.get(&component.label) {
            Some(threats) if !threats.is_empty() => {
                lines.push(Line::from(vec![
                    header,
                    Span::styled(
                        format!("  {} threats", threats.len()),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]));
                for threat in threats {
                    lines.push(Line::from(vec![
                        Span::raw("  "),
                        Span::styled(
                            format!("[{}]", threat.severity.label()),
                            Style::default()
                                .fg(severity_color(threat.severity))
                                .add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(
                            format!(" {}: ", threat.threat_type.label()),
                            Style::default().fg(Color::Magenta),
                        ),
                        Span::raw(threat.title.clone()),
                    ]));
                    if !threat.mitigation.is_empty() {
                        lines.push(Line::from(Span::styled(
                            format!("      mitigation: {}", threat.mitigation),
                            Style::default().fg(Color::DarkGray),
                        )));
                    }
                }
            }
            Some(_) => {
                lines.push(Line::from(vec![
                    header,
                    Span::styled("  no threats found", Style::default().fg(Color::Green)),
                ]));
            }
            None => {
                let note = if batch.failed.contains(&component.label) {
                    Span::styled(
                        "  analysis failed (r to retry)",
                        Style::default().fg(Color::Red),
                    )
                } else {
                    Span::styled("  pending", Style::default().fg(Color::DarkGray))
                };
                lines.push(Line::from(vec![header, note]));
            }
        }
        lines.push(Line::from(""));
    }

    let title = format!(" Threats ({}) ", session.threat_count());
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}
