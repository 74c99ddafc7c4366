use incident_chat_core::render::{Alignment as Side, RenderedBody, RenderedEntry, TicketTable};
use incident_chat_core::{Delivery, Role};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::App;
use crate::theme::Theme;

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let theme = app.theme();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(Span::styled(
            format!(" Conversation ({}) ", app.rendered().len()),
            Style::default().fg(theme.accent),
        ));
    let inner = block.inner(area);

    if app.rendered().is_empty() {
        let hint = Paragraph::new(Line::from(Span::styled(
            "Ask about incident tickets, e.g. \"how many open tickets does Acme have?\"",
            Style::default().fg(theme.muted),
        )))
        .block(block)
        .wrap(Wrap { trim: true });
        f.render_widget(hint, area);
        return;
    }

    let lines = conversation_lines(app.rendered(), theme, inner.width as usize);
    let height = inner.height as usize;
    let bottom = lines.len().saturating_sub(height);
    let top = bottom.saturating_sub(app.scroll_back);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().fg(theme.fg))
        .scroll((top.min(u16::MAX as usize) as u16, 0));
    f.render_widget(paragraph, area);
}

/// Flattens rendered entries into display lines no wider than `width`.
pub fn conversation_lines(
    entries: &[RenderedEntry],
    theme: &Theme,
    width: usize,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for entry in entries {
        let align = match entry.alignment {
            Side::Left => Alignment::Left,
            Side::Right => Alignment::Right,
        };
        let color = match entry.role {
            Role::User => theme.user,
            Role::Bot => theme.bot,
        };

        lines.push(meta_line(entry, theme, color).alignment(align));

        match &entry.body {
            RenderedBody::Text(text) => {
                for row in wrap_text(text, width.max(1)) {
                    lines.push(Line::from(Span::raw(row)).alignment(align));
                }
            }
            RenderedBody::Table(table) => {
                for line in table_lines(table, theme) {
                    lines.push(line.alignment(align));
                }
            }
        }
        lines.push(Line::default());
    }
    lines
}

fn meta_line(entry: &RenderedEntry, theme: &Theme, color: Color) -> Line<'static> {
    let mut spans = vec![
        Span::styled(
            entry.role.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {}", entry.time), Style::default().fg(theme.muted)),
    ];
    match &entry.delivery {
        Delivery::Pending => spans.push(Span::styled(
            " sending...",
            Style::default().fg(theme.warning),
        )),
        Delivery::Failed(reason) => spans.push(Span::styled(
            format!(" failed: {}", reason),
            Style::default().fg(theme.error),
        )),
        Delivery::Delivered => {}
    }
    Line::from(spans)
}

fn table_lines(table: &TicketTable, theme: &Theme) -> Vec<Line<'static>> {
    let widths = table.column_widths();
    let format_row = |cells: [&str; 4]| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
            .collect::<Vec<_>>()
            .join(" │ ")
    };

    let mut lines = vec![Line::from(Span::styled(
        format_row(table.headers),
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
    ))];
    let rule = widths
        .iter()
        .map(|w| "─".repeat(*w))
        .collect::<Vec<_>>()
        .join("─┼─");
    lines.push(Line::from(Span::styled(rule, Style::default().fg(theme.border))));

    if table.is_empty() {
        lines.push(Line::from(Span::styled(
            "(no tickets)",
            Style::default().fg(theme.muted),
        )));
    }
    for row in &table.rows {
        let cells = [
            row[0].as_str(),
            row[1].as_str(),
            row[2].as_str(),
            row[3].as_str(),
        ];
        lines.push(Line::from(format_row(cells)));
    }
    lines
}

/// Greedy word wrap by character count; words longer than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0;
        for word in paragraph.split(' ') {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if current_len > 0 {
                    out.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(width);
                out.push(word.into_iter().collect());
                word = rest;
            }
            let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
            if needed > width && current_len > 0 {
                out.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(word.iter());
            current_len += word.len();
        }
        out.push(current);
    }
    out
}
