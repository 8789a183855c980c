mod app;
mod input;
mod ui;

use allcounts::config::{load_config, save_config};
use allcounts::domain::{format_inline, millis_to_secs, Visibility};
use allcounts::persistence::{
    config_file, ensure_data_dir, init_local_data_dir, log_file, todos_file, JsonStore,
    TodoStore,
};
use allcounts::{ticker, Clock, Engine, SystemClock};
use anyhow::{Context, Result};
use app::AppState;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{
        self, DisableFocusChange, EnableFocusChange, Event, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "allcounts")]
#[command(about = "A terminal session timer that splits your day into used and wasted time", long_about = None)]
struct Cli {
    /// Data directory (defaults to a local .allcounts, then ~/.allcounts)
    #[arg(long, env = "ALLCOUNTS_DIR", global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .allcounts directory in the current directory
    Init,
    /// Print the saved tasks without starting the TUI
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init) => {
            let current_dir = std::env::current_dir().context("Could not determine current directory")?;
            let data_dir = init_local_data_dir(&current_dir)?;
            save_config(config_file(&data_dir), &Default::default())?;
            println!("Initialized allcounts directory: {}", data_dir.display());
            println!();
            println!("Run 'allcounts' from here to use it.");
            Ok(())
        }
        Some(Commands::Status) => print_status(cli.data_dir.as_deref()),
        None => run_tui(cli.data_dir.as_deref()),
    }
}

/// Log to a file in the data directory; the TUI owns the terminal
fn init_logging(data_dir: &Path) -> Result<()> {
    let path = log_file(data_dir);
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    let filter = EnvFilter::try_from_env("ALLCOUNTS_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();
    Ok(())
}

fn print_status(data_dir: Option<&Path>) -> Result<()> {
    let data_dir = ensure_data_dir(data_dir)?;
    let store = JsonStore::new(todos_file(&data_dir));
    let state = store.load_todos()?;
    let now = SystemClock.now_ms();

    println!("Data directory: {}", data_dir.display());
    if let Some(day) = state.day {
        println!("Day: {}", day);
    }
    println!();

    let tasks = state.recurring_tasks.iter().chain(state.one_time_tasks.iter());
    for task in tasks {
        let kind = if task.is_recurring() { "daily" } else { "once" };
        let running = if task.is_running { " (running)" } else { "" };
        println!(
            "{:>3}  [{}] {}{}  total {}  today {}",
            task.id,
            kind,
            task.name,
            running,
            format_inline(millis_to_secs(task.elapsed_ms(now))),
            format_inline(millis_to_secs(task.time_today(now))),
        );
    }

    if !state.completed_tasks.is_empty() {
        println!();
        println!("Completed:");
        for done in &state.completed_tasks {
            println!(
                "     {}  {}  ({})",
                done.task.name,
                format_inline(millis_to_secs(done.total_ms())),
                done.completed_at.format("%Y-%m-%d %H:%M"),
            );
        }
    }
    Ok(())
}

fn run_tui(data_dir: Option<&Path>) -> Result<()> {
    let data_dir = ensure_data_dir(data_dir)?;
    init_logging(&data_dir)?;

    let config = load_config(config_file(&data_dir))?;
    tracing::info!(data_dir = %data_dir.display(), "Starting allcounts");

    let store = JsonStore::new(todos_file(&data_dir));
    let engine = Engine::open(store, SystemClock, config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let hold_supported = supports_keyboard_enhancement().unwrap_or(false);
    if hold_supported {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = AppState::new(engine, hold_supported);

    // Run app
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    if hold_supported {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableFocusChange, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Persist where running tasks got to
    app.shutdown();

    if let Err(err) = result {
        tracing::error!(error = %err, "Event loop failed");
        eprintln!("Error: {}", err);
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> Result<()> {
    let poll_rate = ticker::poll_duration();

    loop {
        terminal.draw(|f| ui::render(f, app))?;

        // Handle events with timeout for ticking
        if event::poll(poll_rate)? {
            match event::read()? {
                Event::Key(key) => {
                    if input::handle_key(app, key) {
                        return Ok(());
                    }
                }
                Event::FocusLost => app.set_visibility(Visibility::Background),
                Event::FocusGained => app.set_visibility(Visibility::Foreground),
                _ => {}
            }
        }

        // Run whatever timers are due
        app.tick();
    }
}
