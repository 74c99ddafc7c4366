use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use incident_chat_core::render::{render_conversation, RenderedEntry};
use incident_chat_core::Conversation;

use crate::theme::{Theme, THEMES};
use crate::views::conversation::conversation_lines;

const PAGE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Send(String),
    Quit,
    None,
}

pub struct App {
    pub running: bool,
    pub theme_index: usize,
    pub input: String,
    /// Lines scrolled up from the newest entry; 0 follows the conversation.
    pub scroll_back: usize,
    pub status_message: Option<String>,
    pub endpoint: String,
    conversation: Conversation,
    rendered: Vec<RenderedEntry>,
    /// Width and height of the conversation pane, once drawn.
    viewport: Option<(usize, usize)>,
}

impl App {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            running: true,
            theme_index: 0,
            input: String::new(),
            scroll_back: 0,
            status_message: None,
            endpoint: endpoint.into(),
            conversation: Conversation::new(),
            rendered: Vec::new(),
            viewport: None,
        }
    }

    pub fn theme(&self) -> &Theme {
        &THEMES[self.theme_index % THEMES.len()]
    }

    pub fn set_theme(&mut self, index: usize) {
        if index < THEMES.len() {
            self.theme_index = index;
        }
    }

    pub fn next_theme(&mut self) {
        self.theme_index = (self.theme_index + 1) % THEMES.len();
        self.status_message = Some(format!("Theme: {}", self.theme().name));
    }

    pub fn set_viewport(&mut self, width: usize, height: usize) {
        self.viewport = Some((width, height));
        self.scroll_back = self.scroll_back.min(self.max_scroll());
    }

    /// Furthest `scroll_back` that still shows content; unbounded before the first draw.
    pub fn max_scroll(&self) -> usize {
        match self.viewport {
            Some((width, height)) => conversation_lines(&self.rendered, self.theme(), width)
                .len()
                .saturating_sub(height),
            None => usize::MAX,
        }
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_back = self.scroll_back.saturating_add(lines).min(self.max_scroll());
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(lines);
    }

    /// Replaces the displayed conversation with a newer snapshot.
    pub fn apply_snapshot(&mut self, conversation: Conversation) {
        let failed_before = self.conversation.iter().filter(|e| e.is_failed()).count();
        let failed_now = conversation.iter().filter(|e| e.is_failed()).count();
        if failed_now > failed_before {
            self.status_message = Some(format!(
                "{} message(s) failed to send",
                failed_now - failed_before
            ));
        }
        self.rendered = render_conversation(&conversation);
        self.conversation = conversation;
        self.scroll_back = 0;
    }

    pub fn rendered(&self) -> &[RenderedEntry] {
        &self.rendered
    }

    pub fn in_flight(&self) -> usize {
        self.conversation.pending_count()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => self.quit(),
            KeyCode::Char('c') if ctrl => self.quit(),
            KeyCode::Char('t') if ctrl => {
                self.next_theme();
                Action::None
            }
            KeyCode::Enter => {
                if self.input.is_empty() {
                    return Action::None;
                }
                self.status_message = None;
                Action::Send(std::mem::take(&mut self.input))
            }
            KeyCode::Backspace => {
                self.input.pop();
                Action::None
            }
            KeyCode::Up => {
                self.scroll_up(1);
                Action::None
            }
            KeyCode::Down => {
                self.scroll_down(1);
                Action::None
            }
            KeyCode::PageUp => {
                self.scroll_up(PAGE);
                Action::None
            }
            KeyCode::PageDown => {
                self.scroll_down(PAGE);
                Action::None
            }
            KeyCode::Char(c) if !ctrl => {
                self.input.push(c);
                Action::None
            }
            _ => Action::None,
        }
    }

    fn quit(&mut self) -> Action {
        self.running = false;
        Action::Quit
    }
}
