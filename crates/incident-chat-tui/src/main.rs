mod app;
mod event;
mod output;
mod theme;
mod ui;
mod views;

use std::fs::OpenOptions;
use std::io;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use app::{Action, App};
use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use event::{AppEvent, EventReader};
use incident_chat_core::{ChatSession, ChatTransport, ClientConfig, HttpTransport, LoggingConfig};
use output::OutputFormat;
use ratatui::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "incident-chat", version, about = "Chat about incident tickets")]
struct Args {
    #[arg(long, help = "Chat service endpoint")]
    endpoint: Option<String>,

    #[arg(short, long, help = "Send one message, print the reply and exit")]
    message: Option<String>,

    #[arg(short, long)]
    theme: Option<usize>,

    #[arg(long, help = "Write logs to this file")]
    log_file: Option<String>,

    #[arg(long, default_value = "table", value_enum)]
    format: OutputFormat,
}

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ClientConfig::load()?;
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(theme) = args.theme {
        config.theme = theme;
    }
    if let Some(path) = args.log_file {
        config.logging.file_path = path;
    }
    config.validate()?;

    setup_logging(&config.logging)?;
    let transport = HttpTransport::from_config(&config);

    if let Some(message) = args.message {
        return one_shot(&transport, &message, &args.format).await;
    }

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &config, transport).await;
    restore_terminal(&mut terminal)?;

    if let Err(e) = result {
        eprintln!("Application error: {e}");
        return Err(e);
    }
    Ok(())
}

/// The terminal belongs to the UI, so logs only go to a file when one is configured.
fn setup_logging(logging: &LoggingConfig) -> Result<()> {
    if logging.file_path.is_empty() {
        return Ok(());
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logging.file_path)
        .with_context(|| format!("opening log file {}", logging.file_path))?;

    let filter = if logging.level.contains('=') {
        EnvFilter::try_new(&logging.level)?
    } else {
        EnvFilter::try_new(format!(
            "incident_chat_tui={level},incident_chat_core={level}",
            level = logging.level
        ))?
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file));
    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

async fn one_shot(transport: &HttpTransport, message: &str, format: &OutputFormat) -> Result<()> {
    if message.is_empty() {
        return Ok(());
    }
    let reply = transport
        .send_message(message)
        .await
        .with_context(|| format!("sending to {}", transport.endpoint()))?;
    output::print_reply(&reply, format);
    Ok(())
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(terminal: &mut Tui, config: &ClientConfig, transport: HttpTransport) -> Result<()> {
    let mut app = App::new(transport.endpoint());
    app.set_theme(config.theme);

    let session = ChatSession::spawn(Arc::new(transport));
    let mut updates = session.subscribe();
    let mut events = EventReader::new(config.tick_rate_ms);
    info!(endpoint = %app.endpoint, "chat widget started");

    while app.running {
        let size = terminal.size()?;
        let viewport = ui::conversation_viewport(Rect::new(0, 0, size.width, size.height));
        app.set_viewport(viewport.width as usize, viewport.height as usize);
        terminal.draw(|f| ui::render(f, &app))?;

        tokio::select! {
            event = events.next() => match event? {
                AppEvent::Key(key) => match app.handle_key(key) {
                    Action::Send(text) => {
                        if let Err(e) = session.send(text) {
                            error!("send failed: {}", e);
                            app.status_message = Some(e.summary());
                        }
                    }
                    Action::Quit | Action::None => {}
                },
                AppEvent::Resize | AppEvent::Tick => {}
            },
            changed = updates.changed() => {
                if changed.is_err() {
                    app.status_message = Some("Chat session stopped".to_string());
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                app.apply_snapshot(snapshot);
            }
        }
    }

    session.shutdown();
    Ok(())
}
