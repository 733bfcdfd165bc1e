use std::fs::{self, File};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use medicare_core::{Config, HttpBackend, Overrides, Settings};

mod app;
mod handler;
mod theme;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "medicare")]
#[command(version, about = "Terminal client for the MediCare AI medical assistant")]
struct Cli {
    /// Backend origin, e.g. http://localhost:8000
    #[arg(long)]
    backend_url: Option<String>,

    /// Response language (en or fr)
    #[arg(long)]
    language: Option<String>,

    /// Maximum number of research sources
    #[arg(long)]
    max_results: Option<u32>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            backend_url: self.backend_url.clone(),
            language: self.language.clone(),
            max_results: self.max_results,
        }
    }
}

/// Log to a file under the cache dir; the terminal belongs to the UI
fn init_logging() -> Result<()> {
    let log_dir = dirs::cache_dir()
        .context("could not determine cache directory")?
        .join("medicare");
    fs::create_dir_all(&log_dir)?;
    let log_file = File::create(log_dir.join("medicare.log"))?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("MEDICARE_LOG").unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = init_logging() {
        eprintln!("Logging disabled: {:#}", e);
    }
    info!("MediCare AI v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load().unwrap_or_else(|e| {
        warn!("Could not load config, using defaults: {}", e);
        Config::new()
    });
    let settings = Settings::resolve(&config, cli.overrides().or(Overrides::from_env()))?;
    info!(
        "Backend {} (language {}, max results {})",
        settings.backend_url, settings.language, settings.max_results
    );

    let backend = HttpBackend::new(&settings.backend_url);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(settings, Arc::new(backend), events.sender());

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }
    Ok(())
}
