use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use crate::app::App;
use crate::ui::theme::{count_color, BORDER};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let header = Row::new(vec!["Shift", "Window", "Actions", "Top member"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = app
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let top = row
                .by_member
                .iter()
                .max_by_key(|(_, n)| *n)
                .map(|(name, n)| format!("{name} ({n})"))
                .unwrap_or_default();
            let style = if i == app.selected_row {
                Style::default()
                    .fg(ratatui::style::Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(row.shift.clone()),
                Cell::from(row.window.clone()),
                Cell::from(Span::styled(
                    row.actions.to_string(),
                    Style::default().fg(count_color(row.actions)),
                )),
                Cell::from(top),
            ])
            .style(style)
        })
        .collect();

    let title = if app.loading {
        format!(" {} · {} (loading...) ", app.date, app.view.as_str())
    } else {
        format!(
            " {} · {} · {} actions ",
            app.date,
            app.view.as_str(),
            app.total_actions()
        )
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(13),
            Constraint::Length(8),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(BORDER))
            .title(title),
    );

    f.render_widget(table, area);
}
