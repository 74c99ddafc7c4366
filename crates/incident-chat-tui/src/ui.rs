use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::App;
use crate::views;

fn layout(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area)
}

/// Text area of the bordered conversation pane for a terminal of `area`.
pub fn conversation_viewport(area: Rect) -> Rect {
    layout(area)[1].inner(Margin::new(1, 1))
}

pub fn render(f: &mut Frame, app: &App) {
    let chunks = layout(f.area());

    f.render_widget(
        Block::default().style(Style::default().bg(app.theme().bg)),
        f.area(),
    );

    render_header(f, app, chunks[0]);
    views::conversation::render(f, app, chunks[1]);
    views::input::render(f, app, chunks[2]);
    render_status_bar(f, app, chunks[3]);
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let theme = app.theme();
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " Incident Chat ",
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("│ {}", app.endpoint), Style::default().fg(theme.muted)),
    ]));
    f.render_widget(header, area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let theme = app.theme();

    let in_flight = match app.in_flight() {
        0 => Span::styled("● Idle", Style::default().fg(theme.success)),
        n => Span::styled(
            format!("◌ Waiting for {} repl{}", n, if n == 1 { "y" } else { "ies" }),
            Style::default().fg(theme.warning),
        ),
    };

    let theme_name = Span::styled(
        format!(" │ {} ", theme.name),
        Style::default().fg(theme.muted),
    );

    let help_hint = Span::styled(
        " │ Enter:Send ↑↓/PgUp/PgDn:Scroll Ctrl+T:Theme Esc:Quit",
        Style::default().fg(theme.muted),
    );

    let status = match app.status_message {
        Some(ref msg) => Span::styled(
            format!(" │ {}", truncate(msg, 40)),
            Style::default().fg(theme.warning),
        ),
        None => Span::raw(""),
    };

    let bar = Paragraph::new(Line::from(vec![in_flight, theme_name, help_hint, status]))
        .style(Style::default().bg(theme.bg));
    f.render_widget(bar, area);
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
