use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use incident_chat_core::LoggingConfig;
use incident_chat_server::{
    router, serve, AppStateInner, IncidentStore, OpenAiPlanner, ServerConfig,
};

#[derive(Parser)]
#[command(
    name = "incident-chat-server",
    version,
    about = "Answer incident ticket questions over HTTP"
)]
struct Cli {
    #[arg(long, env = "INCIDENT_CHAT_BIND", help = "Address to listen on")]
    bind: Option<String>,

    #[arg(long, env = "INCIDENT_CHAT_INCIDENTS", help = "Path to the incidents CSV")]
    incidents: Option<String>,

    #[arg(long, env = "INCIDENT_CHAT_MODEL", help = "Chat completions model")]
    model: Option<String>,

    #[arg(long, env = "INCIDENT_CHAT_ALLOWED_ORIGIN", help = "Origin allowed by CORS")]
    allowed_origin: Option<String>,
}

fn setup_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = if logging.level.contains('=') {
        EnvFilter::try_new(&logging.level)?
    } else {
        EnvFilter::try_new(format!(
            "incident_chat_server={level},incident_chat_core={level},tower_http=info",
            level = logging.level
        ))?
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ServerConfig::load()?;
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    if let Some(incidents) = cli.incidents {
        config.incidents_path = incidents;
    }
    if let Some(model) = cli.model {
        config.openai.model = model;
    }
    if let Some(origin) = cli.allowed_origin {
        config.allowed_origin = origin;
    }
    config.validate()?;

    setup_logging(&config.logging)?;

    let store = IncidentStore::from_path(&config.incidents_path)
        .with_context(|| format!("loading incidents from {}", config.incidents_path))?;
    let planner = OpenAiPlanner::from_config(&config.openai)?;
    info!(model = planner.model(), "using model API at {}", config.openai.base_url);

    let state = AppStateInner::new(store, Arc::new(planner));
    let app = router(state, &config.allowed_origin)?;

    let listener = tokio::net::TcpListener::bind(config.socket_addr()?).await?;

    tokio::select! {
        result = serve(listener, app) => result?,
        _ = tokio::signal::ctrl_c() => info!("shutting down"),
    }
    Ok(())
}
