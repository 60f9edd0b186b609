//! CLI entry point for the commute status tool.
//!
//! Each subcommand plays one UI trigger: it refreshes the matching widget
//! for the given selection, prints the rendered rows as JSON, and optionally
//! appends them to a CSV file.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use commute_status::catalog::Catalog;
use commute_status::config::Endpoints;
use commute_status::coordinator::{Coordinator, Selection, Widget};
use commute_status::fetch::auth::UrlParam;
use commute_status::fetch::{BasicClient, HttpClient};
use commute_status::output;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "commute_status")]
#[command(about = "Live London commute status: rail lines, bike docks, bus arrivals", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the status of the selected rail lines
    Lines {
        /// Line name to include (repeatable)
        #[arg(short, long = "select", value_name = "NAME")]
        select: Vec<String>,

        /// CSV file to append the rows to
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Show live inventory for the selected docks
    Docks {
        /// Dock id, e.g. BikePoints_109 or bare 109 (repeatable)
        #[arg(short, long = "id", value_name = "ID")]
        id: Vec<String>,

        /// CSV file to append the rows to
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Show arrival predictions for one bus stop
    Buses {
        /// Stop id, e.g. 490001180E
        #[arg(short, long, value_name = "STOP_ID")]
        stop: String,

        /// CSV file to append the rows to
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Show the fleet-wide e-bike total
    Fleet,
    /// List the docks and stops available for selection
    Catalog {
        /// CSV of known docks (id,name,lat,lon)
        #[arg(long, default_value = "docks.csv")]
        docks: PathBuf,

        /// CSV of known stops (id,name)
        #[arg(long, default_value = "stops.csv")]
        stops: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/commute_status.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("commute_status.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let endpoints = Endpoints::from_env();

    match cli.command {
        Commands::Lines { select, output } => {
            let mut coordinator = Coordinator::new(make_client(), endpoints);
            let widget = coordinator.refresh_lines(&selection_from(select)).await;
            report(output::line_rows(widget.rows()), widget, output.as_deref())?;
        }
        Commands::Docks { id, output } => {
            let mut coordinator = Coordinator::new(make_client(), endpoints);
            let widget = coordinator.refresh_docks(&selection_from(id)).await;
            report(output::dock_rows(widget.rows()), widget, output.as_deref())?;
        }
        Commands::Buses { stop, output } => {
            let mut coordinator = Coordinator::new(make_client(), endpoints);
            let widget = coordinator.refresh_buses(&Selection::One(stop)).await;
            report(output::bus_rows(widget.rows()), widget, output.as_deref())?;
        }
        Commands::Fleet => {
            let mut coordinator = Coordinator::new(make_client(), endpoints);
            match coordinator.init_fleet_total().await {
                Some(total) => println!("{total}"),
                None => bail!("fleet e-bike total unavailable"),
            }
        }
        Commands::Catalog { docks, stops } => {
            let catalog = Catalog::load(&docks, &stops)?;
            let listing = serde_json::json!({
                "docks": catalog
                    .docks()
                    .iter()
                    .map(|d| serde_json::json!({"label": d.name, "value": d.id}))
                    .collect::<Vec<_>>(),
                "stops": catalog
                    .stops()
                    .iter()
                    .map(|s| serde_json::json!({"label": s.name, "value": s.id}))
                    .collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
    }

    Ok(())
}

/// Wraps the transport with the TfL `app_key` query parameter when one is
/// configured; anonymous access otherwise.
fn make_client() -> Box<dyn HttpClient> {
    match std::env::var("TFL_APP_KEY") {
        Ok(key) if !key.is_empty() => Box::new(UrlParam::app_key(BasicClient::new(), key)),
        _ => Box::new(BasicClient::new()),
    }
}

/// No ids on the command line means an absent selection, which clears the
/// widget without a fetch.
fn selection_from(values: Vec<String>) -> Selection {
    if values.is_empty() {
        Selection::None
    } else {
        Selection::Many(values)
    }
}

/// Prints the rendered rows, appends them to the CSV file if requested, and
/// turns a failed refresh into a nonzero exit so "refresh failed" never
/// looks like "no data".
fn report<T: Serialize, W>(rows: Vec<T>, widget: &Widget<W>, csv_path: Option<&str>) -> Result<()> {
    if let Some(e) = widget.last_error() {
        error!(error = %e, "refresh failed");
        bail!(e.clone());
    }

    output::print_json(&rows)?;

    if let Some(path) = csv_path {
        output::append_records(path, &rows)?;
        info!(path, rows = rows.len(), "rows appended");
    }

    Ok(())
}
