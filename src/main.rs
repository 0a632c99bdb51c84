use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sensorwatch::app::{write_export, App};
use sensorwatch::data::HistoryBuffer;
use sensorwatch::provider::ConfigProvider;
use sensorwatch::settings::{Overrides, Settings};
use sensorwatch::source::{
    fetch_cycle, FeedOptions, HttpSource, SimulatedSource, TelemetryFeed, TelemetrySource,
};
use sensorwatch::updater::{DashboardUpdater, ViewUpdater};
use sensorwatch::{events, ui};

#[derive(Parser, Debug)]
#[command(name = "sensorwatch")]
#[command(about = "Live terminal dashboard for IoT sensor telemetry")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "SENSORWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Full API base URL (e.g. http://192.168.0.20:5001/api)
    #[arg(short, long)]
    url: Option<String>,

    /// API host, used when no URL is given
    #[arg(long)]
    host: Option<String>,

    /// API port, used when no URL is given
    #[arg(short, long)]
    port: Option<u16>,

    /// Poll interval (e.g. "3s", "500ms")
    #[arg(short, long)]
    interval: Option<String>,

    /// Readings requested per poll
    #[arg(long)]
    limit: Option<u32>,

    /// Log level for the sensorwatch target
    #[arg(long)]
    log_level: Option<String>,

    /// File that receives logs while the dashboard is running
    #[arg(long, default_value = "sensorwatch.log")]
    log_file: PathBuf,

    /// Use the built-in simulator instead of the HTTP backend
    #[arg(long)]
    simulate: bool,

    /// Fetch once, export the dashboard state to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = Overrides {
        url: args.url.clone(),
        host: args.host.clone(),
        port: args.port,
        interval: args.interval.clone(),
        limit: args.limit,
        log_level: args.log_level.clone(),
    };
    let settings = Settings::load(args.config.as_deref(), &overrides)?;

    if args.export.is_some() {
        init_stderr_logging(&settings.logger.level);
    } else {
        init_file_logging(&args.log_file, &settings.logger.level)?;
    }

    let rt = tokio::runtime::Runtime::new()?;

    let provider = ConfigProvider::new();
    let source: Arc<dyn TelemetrySource> = if args.simulate {
        Arc::new(SimulatedSource::new())
    } else {
        let api = settings.api_config();
        info!(base_url = api.base_url(), "resolved API address");
        provider.publish(api.clone());
        Arc::new(HttpSource::new(api))
    };

    if let Some(export_path) = args.export {
        return rt.block_on(export_once(source, &settings, &export_path));
    }

    // Feeds and threshold writes are spawned from the synchronous TUI loop.
    let _guard = rt.enter();

    let options = FeedOptions {
        interval: settings.poll_interval()?,
        limit: settings.poll.limit,
        ..FeedOptions::default()
    };

    let dashboard_feed = TelemetryFeed::spawn(source.clone(), options.clone());
    let overlay_feed = if args.simulate {
        TelemetryFeed::spawn(source.clone(), options)
    } else {
        TelemetryFeed::spawn_when_ready(provider.handle(), options, |config| {
            Arc::new(HttpSource::new(config)) as Arc<dyn TelemetrySource>
        })
    };

    let app = App::new(
        source,
        dashboard_feed,
        overlay_feed,
        HistoryBuffer::with_capacity(settings.history.capacity),
    );

    run_tui(app)
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sensorwatch={}", level)))
}

/// The terminal belongs to the TUI, so logs go to a file.
fn init_file_logging(path: &Path, level: &str) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn init_stderr_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(io::stderr)
        .init();
}

/// Run one cycle and write the resulting dashboard view.
async fn export_once(
    source: Arc<dyn TelemetrySource>,
    settings: &Settings,
    export_path: &Path,
) -> Result<()> {
    let update = fetch_cycle(source.as_ref(), settings.poll.limit, 1).await;
    if let Err(ref err) = update.reading {
        anyhow::bail!("failed to fetch a reading from {}: {}", source.description(), err);
    }

    let mut dashboard =
        DashboardUpdater::new(HistoryBuffer::with_capacity(settings.history.capacity));
    dashboard.apply(update);

    write_export(dashboard.view(), export_path)?;
    println!("Exported dashboard state to: {}", export_path.display());
    Ok(())
}

/// Run the TUI until the operator quits
fn run_tui(mut app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    info!(source = app.source_description(), "dashboard started");
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        app.tick();

        terminal.draw(|frame| ui::render(frame, app))?;

        // Poll for events with a short timeout
        if let Some(Event::Key(key)) = events::poll_event(Duration::from_millis(100))? {
            events::handle_key_event(app, key);
        }
    }

    Ok(())
}
