//! dagdeck - terminal console for data-orchestration asset graphs.

mod dispatch;
mod polling;
mod watcher;

use camino::Utf8Path;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dagdeck_cli::Args;
use dagdeck_monitor::{App, AppConfig, Theme};
use dagdeck_runs::LaunchStore;
use dispatch::StoreDispatcher;
use miette::{miette, IntoDiagnostic, Result};
use polling::{PollingConfig, PollingService, SnapshotFeed, SnapshotUpdate};
use ratatui::prelude::*;
use std::fs::{self, OpenOptions};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Mutex};
use tracing_subscriber::EnvFilter;
use watcher::{SnapshotWatcher, WatcherEvent};

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_path())?;
    tracing::info!("Starting dagdeck on {}", args.snapshot);

    // A broken snapshot at startup is fatal; later reload failures are not.
    let graph = polling::load_graph(&args.snapshot, args.job_name.as_deref()).into_diagnostic()?;

    let poll_interval = Duration::from_secs(args.poll_interval);
    let config = AppConfig {
        health_title: args.health_title.clone(),
        poll_interval,
        snapshot_path: args.snapshot.to_string(),
        theme: Theme::from_name(&args.theme),
    };
    let dispatcher = StoreDispatcher::new(LaunchStore::at(args.launch_log_path()));
    let mut app = App::new(graph, config, Box::new(dispatcher));

    // Start the poller
    let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;
    let feed = Arc::new(Mutex::new(SnapshotFeed::default()));
    let (reload_tx, reload_rx) = mpsc::unbounded_channel();
    let polling_config = PollingConfig {
        snapshot_path: args.snapshot.clone(),
        interval: poll_interval,
        job_name: args.job_name.clone(),
    };
    let _poller = {
        let _guard = runtime.enter();
        PollingService::new(feed.clone(), polling_config, reload_rx).start()
    };

    let watcher = match SnapshotWatcher::new(&args.snapshot) {
        Ok(watcher) => {
            app.set_watcher_active(true);
            Some(watcher)
        }
        Err(e) => {
            tracing::warn!("File watcher unavailable: {}", e);
            None
        }
    };

    // Setup terminal
    enable_raw_mode().into_diagnostic()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture).into_diagnostic()?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).into_diagnostic()?;

    // Run the main loop
    let res = run_app(&mut terminal, &mut app, &feed, &reload_tx, watcher.as_ref());

    // Restore terminal
    disable_raw_mode().into_diagnostic()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .into_diagnostic()?;
    terminal.show_cursor().into_diagnostic()?;

    drop(reload_tx);
    runtime.shutdown_timeout(Duration::from_secs(1));

    // Handle result
    if let Err(err) = res {
        tracing::error!("Main loop failed: {}", err);
        eprintln!("Error: {}", err);
    }

    Ok(())
}

/// Log to a file so output never lands on the alternate screen.
fn init_logging(path: &Utf8Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .into_diagnostic()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| miette!("Failed to install logger: {}", e))
}

/// Main application loop.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    feed: &Mutex<SnapshotFeed>,
    reload_tx: &mpsc::UnboundedSender<()>,
    watcher: Option<&SnapshotWatcher>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(100);

    loop {
        // Draw UI
        terminal.draw(|frame| app.render(frame))?;

        // Handle events
        app.poll_events(tick_rate)?;

        // Check if we should quit
        if app.should_quit {
            return Ok(());
        }

        app.on_tick(Instant::now());

        let mut reload = app.take_reload_request();
        if let Some(watcher) = watcher {
            while let Some(event) = watcher.try_recv_nonblocking() {
                match event {
                    WatcherEvent::SnapshotChanged => reload = true,
                    WatcherEvent::Error(e) => tracing::warn!("File watcher error: {}", e),
                }
            }
        }
        if reload && reload_tx.send(()).is_err() {
            tracing::warn!("Poller has stopped, reload request dropped");
        }

        // The poller holds the lock only while publishing; skip this tick if busy.
        if let Ok(mut feed) = feed.try_lock() {
            match feed.take() {
                Some(SnapshotUpdate::Loaded(graph)) => app.update_graph(graph),
                Some(SnapshotUpdate::Failed(error)) => app.record_reload_error(error),
                None => {}
            }
        }
    }
}
