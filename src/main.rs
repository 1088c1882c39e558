use std::fs::{self, File};
use std::io;

use anyhow::Result;
use clap::Parser;
use crossterm::tty::IsTty;

mod app;
mod chatbot;
mod config;
mod handler;
mod session;
mod tui;
mod ui;

use app::App;
use chatbot::ChatClient;
use config::Config;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "dragon-chat")]
#[command(version, about = "Terminal client for the Dragon Coders support chatbot")]
struct Cli {
    /// Chatbot server base URL (overrides the configured value)
    #[arg(long, value_name = "URL")]
    server: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = Config::load().unwrap_or_else(|err| {
        log::warn!("Failed to load config ({err}); using defaults");
        Config::new()
    });

    // Without a terminal there is no chat surface to attach to. Not an error;
    // skip activation entirely.
    if !io::stderr().is_tty() {
        log::info!("stderr is not a terminal; skipping chat view activation");
        return Ok(());
    }

    let server_url = cli
        .server
        .unwrap_or_else(|| config.server_url().to_string());
    let client = ChatClient::new(&server_url);
    let mut app = App::new(&config, client);

    log::info!("Chat view attached to {server_url}");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let tx = events.sender();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;
        if let Some(event) = events.next().await {
            handler::handle_event(&mut app, event, &tx).await?;
        } else {
            break;
        }
    }

    tui::restore()?;
    Ok(())
}

/// Route log output to a file; stderr hosts the TUI.
fn init_logging() {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    if let Ok(path) = Config::log_path() {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(file) = File::create(&path) {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
    }

    let _ = builder.try_init();
}
