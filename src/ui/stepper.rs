// Phase stepper rendering.
// Shows the three workflow phases with completion and current markers.

use ratatui::{prelude::*, widgets::*};

use crate::state::{Phase, Workflow};

/// Render the phase trail below the tab bar.
pub fn draw_stepper(frame: &mut Frame, workflow: &Workflow, area: Rect) {
    let mut spans = Vec::new();

    for (i, phase) in Phase::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
        }

        let completed = workflow.is_completed(*phase);
        let label = if completed {
            format!("{} {} ✓", phase.number(), phase.title())
        } else {
            format!("{} {}", phase.number(), phase.title())
        };

        let style = if *phase == workflow.phase {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else if completed {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        spans.push(Span::styled(label, style));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}
