use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::App;

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let theme = app.theme();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
        .title(Span::styled(" Message ", Style::default().fg(theme.accent)));
    let inner = block.inner(area);

    // Keep the cursor in view by showing the tail of long input.
    let visible = inner.width.saturating_sub(1) as usize;
    let chars: Vec<char> = app.input.chars().collect();
    let start = chars.len().saturating_sub(visible);
    let shown: String = chars[start..].iter().collect();

    let paragraph = Paragraph::new(Line::from(Span::styled(
        shown.clone(),
        Style::default().fg(theme.fg),
    )))
    .style(Style::default().bg(theme.highlight))
    .block(block);
    f.render_widget(paragraph, area);

    f.set_cursor_position(Position::new(
        inner.x + shown.chars().count() as u16,
        inner.y,
    ));
}
