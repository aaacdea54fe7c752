mod action;
mod app;
mod backend;
mod command;
mod config;
mod header;
mod input;
mod pdf;
mod registry;
mod store;
mod tools;
mod ui;
mod ui_state;

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use app::App;
use backend::Backend;
use config::Config;
use ui::draw;

#[derive(Parser, Debug)]
#[command(name = "toolifast", version, about = "Handy everyday tools in your terminal")]
struct Args {
    /// Network tools report "offline" instead of calling out
    #[arg(short, long)]
    offline: bool,

    /// Where notes, config.json and the log file live
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Where generated PDFs and saved images are written
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let defaults = Config::default();
    let data_dir = args.data_dir.unwrap_or(defaults.data_dir);
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("cannot create data dir {}", data_dir.display()))?;

    // stdout belongs to the terminal UI, so logs go to a file
    let file_appender = tracing_appender::rolling::never(&data_dir, "toolifast.log");
    let (writer, _log_guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(writer)
        .with_ansi(false)
        .init();

    let mut config = Config::load(&data_dir);
    config.offline = args.offline;
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    tracing::info!(
        data_dir = %config.data_dir.display(),
        output_dir = %config.output_dir.display(),
        offline = config.offline,
        "starting toolifast"
    );

    let backend = Backend::new(&config).context("cannot start network runtime")?;
    let mut app = App::new(config, backend);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    // Run app
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "event loop failed");
    }
    result.context("terminal error")
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(app.config.tick_rate_ms);
    while !app.should_quit {
        app.tick();

        terminal.draw(|frame| {
            app.ui.viewport = frame.area();
            draw(frame, app);
        })?;

        // Poll for events with timeout (60 FPS for smooth animation)
        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Paste(text) => app.handle_paste(&text),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }
    }
    tracing::info!("shutting down");
    Ok(())
}
