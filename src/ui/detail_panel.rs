use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::ui::theme::{movement_color, BORDER};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER))
        .title(" Details ");

    let Some(row) = app.rows.get(app.selected_row) else {
        f.render_widget(block, area);
        return;
    };

    let label = Style::default().fg(ratatui::style::Color::Gray);
    let mut lines: Vec<Line> = vec![Line::from(vec![
        Span::styled("Shift: ", label),
        Span::raw(format!("{} ({})", row.shift, row.window)),
    ])];

    if !row.by_member.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled("Members", label)));
        let mut members = row.by_member.clone();
        members.sort_by(|a, b| b.1.cmp(&a.1));
        for (name, n) in members {
            lines.push(Line::raw(format!("  {name}: {n}")));
        }
    }

    if !row.movements.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled("Movements", label)));
        for (movement, n) in &row.movements {
            lines.push(Line::from(Span::styled(
                format!("  {movement}: {n}"),
                Style::default().fg(movement_color(movement)),
            )));
        }
    }

    if app.truncated {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "Upstream cap reached: counts are a lower bound",
            Style::default().fg(ratatui::style::Color::Red),
        )));
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
