use clap::{Parser, ValueEnum};
use color_eyre::Result;
use crossterm::event::{Event as CEvent, EventStream};
use futures::StreamExt;
use pagedtable::config::Config;
use pagedtable::core::{ColumnDescriptor, DecorationRule};
use pagedtable::services::{MemoryPageSource, PageSource};
use pagedtable::tui::{App, PagedTable, TableOptions, terminal};
use ratatui::Terminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Browse a dataset through the paged table widget
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable file logging at the given level (overrides RUST_LOG)
    #[arg(long = "logging", value_enum)]
    logging: Option<LogLevel>,
    /// Path to a config file (overrides default config discovery)
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,
    /// CSV file to browse; the first row holds the headers
    #[arg(long = "csv", value_name = "PATH")]
    csv: Option<PathBuf>,
    /// Rows per page (overrides config)
    #[arg(long = "rows-per-page", value_name = "N")]
    rows_per_page: Option<usize>,
    /// Simulated fetch latency in milliseconds
    #[arg(long = "latency-ms", value_name = "MS", default_value_t = 150)]
    latency_ms: u64,
    /// Fail every Nth fetch to exercise error handling
    #[arg(long = "fail-every", value_name = "N")]
    fail_every: Option<usize>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

const TICK: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() -> Result<()> {
    terminal::install_hooks()?;
    let args = Args::parse();
    pagedtable::logging::init_with(None, args.logging.map(Into::into))?;

    let cfg = match Config::from_path(args.config.as_ref()) {
        Ok(cfg) => cfg,
        // Only an explicitly requested file is fatal
        Err(e) if args.config.is_none() => {
            warn!("Ignoring unreadable config: {e}");
            Config::embedded()?
        }
        Err(e) => return Err(e.into()),
    };
    info!("Loaded config: {:?}", cfg.table);

    let mut source = match &args.csv {
        Some(path) => MemoryPageSource::from_csv_path(path)?,
        None => sample_source(),
    };
    if args.latency_ms > 0 {
        source = source.with_latency(Duration::from_millis(args.latency_ms));
    }
    if let Some(n) = args.fail_every {
        source = source.with_failure_every(n);
    }

    let mut options = cfg.table.apply(TableOptions::new(source.columns().to_vec()));
    if let Some(rpp) = args.rows_per_page {
        options.rows_per_page = rpp;
    }
    options.title = Some(match &args.csv {
        Some(path) => path.display().to_string(),
        None => "People".to_string(),
    });
    options.decorations = demo_decorations(source.columns());

    let source: Arc<dyn PageSource> = Arc::new(source);
    let table = PagedTable::new(options, source)?;
    let mut app = App::new(table, cfg.keybindings(), cfg.theme());

    let mut tui = terminal::init()?;
    let res = run_app(&mut tui, &mut app).await;
    terminal::restore()?;
    tui.show_cursor()?;
    if let Err(e) = &res {
        error!("Error: {e:?}");
    }
    res
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(TICK);

    while !app.should_quit() {
        app.update()?;
        terminal.draw(|f| app.render(f))?;

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(CEvent::Key(key))) => app.handle_key_event(key)?,
                Some(Ok(CEvent::Mouse(mouse))) => app.handle_mouse_event(mouse)?,
                Some(Ok(_)) => {}
                Some(Err(e)) => error!("Event stream error: {e}"),
                None => break,
            },
            _ = tick.tick() => {}
        }
    }
    debug!("Leaving event loop");
    Ok(())
}

/// Link on the first column, copy button on the last
fn demo_decorations(columns: &[ColumnDescriptor]) -> Vec<DecorationRule> {
    let mut rules = Vec::new();
    if let Some(first) = columns.first() {
        let column = first.id.clone();
        rules.push(DecorationRule::link(first.id.as_str()).on_activate(move |text| {
            info!("Followed {column} link '{text}'");
        }));
    }
    if let Some(last) = columns.last().filter(|_| columns.len() > 1) {
        rules.push(DecorationRule::button(last.id.as_str()).on_activate(|text| {
            match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text.to_string())) {
                Ok(()) => info!("Copied '{text}' to clipboard"),
                Err(e) => warn!("Clipboard unavailable: {e}"),
            }
        }));
    }
    rules
}

fn sample_source() -> MemoryPageSource {
    const FIRST: [&str; 10] = [
        "Alice", "Bruno", "Chen", "Dana", "Emeka", "Fatima", "Gustav", "Hana", "Ivan", "Julia",
    ];
    const CITIES: [&str; 6] = ["Lisbon", "Osaka", "Nairobi", "Denver", "Tallinn", "Recife"];

    let columns = vec![
        ColumnDescriptor::new("name", "Name").sortable(),
        ColumnDescriptor::new("age", "Age").sortable(),
        ColumnDescriptor::new("city", "City").sortable(),
        ColumnDescriptor::new("email", "Email"),
    ];
    let rows = (0..137)
        .map(|i| {
            let name = format!("{} {:03}", FIRST[i % FIRST.len()], i);
            let email = format!("{}{}@example.com", FIRST[i % FIRST.len()].to_lowercase(), i);
            vec![
                name,
                (18 + (i * 7) % 60).to_string(),
                CITIES[(i / 3) % CITIES.len()].to_string(),
                email,
            ]
        })
        .collect();
    MemoryPageSource::new(columns, rows)
}
