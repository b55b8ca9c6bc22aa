mod app;
mod config;
mod constants;
mod display;
mod genres;
mod graphics;
mod history;
mod input;
mod movie;
mod recommend;
mod theme;
mod tmdb;
mod ui;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use app::App;
use config::Config;
use display::CliDisplayMode;
use history::{CatalogStore, HistoryStore};
use tmdb::CatalogClient;

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// Poster rendering: 'auto', 'direct', or 'ascii' (default: auto-detect)
  #[arg(short, long, default_value = "auto")]
  display_mode: CliDisplayMode,

  /// Catalog language override (e.g. 'en-US')
  #[arg(short, long)]
  language: Option<String>,

  /// Directory for the durable history and catalog slots
  #[arg(long)]
  data_dir: Option<PathBuf>,

  /// Generate shell completions and exit
  #[arg(long, value_enum)]
  completions: Option<clap_complete::Shell>,
}

// --- Logging ---

/// File logging only — the TUI owns the terminal, so nothing may write to
/// stdout. Returns the guard that flushes buffered lines on drop.
fn init_tracing(data_dir: &Path) -> tracing_appender::non_blocking::WorkerGuard {
  let appender = tracing_appender::rolling::daily(data_dir.join("logs"), "cine.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);
  let filter = tracing_subscriber::EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cine=info"));
  tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).with_ansi(false).init();
  guard
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(shell) = args.completions {
    let mut cmd = Args::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
    return Ok(());
  }

  let data_dir = args
    .data_dir
    .clone()
    .or_else(history::default_data_dir)
    .context("Could not determine a data directory; pass --data-dir")?;
  let _guard = init_tracing(&data_dir);
  info!(version = env!("CARGO_PKG_VERSION"), data_dir = %data_dir.display(), "starting cine");

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  let result = run(&mut terminal, args, &data_dir).await;
  ratatui::restore();
  result
}

async fn run(terminal: &mut DefaultTerminal, args: Args, data_dir: &Path) -> Result<()> {
  let display_mode = display::resolve_display_mode(args.display_mode);
  let config = Config::load();
  let language = args.language.unwrap_or_else(|| config.language());
  let client = CatalogClient::new(config.api_key(), language);

  let mut app = App::new(client, HistoryStore::open(data_dir), CatalogStore::open(data_dir), display_mode);
  app.trigger_init();

  loop {
    app.check_pending();
    app.expire_error();

    terminal.draw(|frame| ui::ui(frame, &mut app))?;

    if event::poll(Duration::from_millis(100))? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          input::handle_key_event(&mut app, key);
        }
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }
  Ok(())
}
