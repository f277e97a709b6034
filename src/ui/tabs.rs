// Tab bar rendering.
// The Workflow tab carries the phase position, the Console tab an unread
// error badge.

use ratatui::{prelude::*, widgets::*};

use crate::app::{App, Tab};
use crate::state::Phase;

const TABS: [Tab; 2] = [Tab::Workflow, Tab::Console];

/// Draw the tab bar at the top of the screen.
pub fn draw_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = TABS
        .iter()
        .map(|tab| Line::from(Span::styled(tab_title(app, *tab), tab_style(app, *tab))))
        .collect();

    let selected = TABS.iter().position(|t| *t == app.active_tab).unwrap_or(0);

    let tabs_widget = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" strider ")
                .title_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .select(selected)
        .highlight_style(Style::default().fg(Color::Yellow))
        .divider(Span::raw(" | "));

    frame.render_widget(tabs_widget, area);
}

fn tab_title(app: &App, tab: Tab) -> String {
    match tab {
        Tab::Workflow => format!(
            "{} [{}/{}]",
            tab.title(),
            app.workflow.phase.number(),
            Phase::ALL.len()
        ),
        Tab::Console if app.console_unread > 0 => {
            format!("{} ({})", tab.title(), app.console_unread)
        }
        Tab::Console => tab.title().to_string(),
    }
}

fn tab_style(app: &App, tab: Tab) -> Style {
    if tab == app.active_tab {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else if tab == Tab::Console && app.console_unread > 0 {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::White)
    }
}
