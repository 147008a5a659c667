//! CLI entry point for the CTA arrivals board.
//!
//! Provides subcommands for printing bus predictions for a stop, train
//! arrivals for a station, or both side by side.

use anyhow::Result;
use clap::{Parser, Subcommand};
use cta_arrivals::{
    board::compose_board,
    bus::BusPredictor,
    config::Config,
    fetch::{BasicClient, auth::UrlParam},
    output::{board_lines, bus_lines, print_lines, to_json, train_lines},
    train::TrainPredictor,
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "cta_arrivals")]
#[command(about = "Real-time CTA bus and train arrivals", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show bus predictions for a stop
    Bus {
        /// Bus Tracker stop id (defaults to CTA_BUS_STOP_ID)
        #[arg(short, long)]
        stop_id: Option<String>,

        /// Print JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show train arrivals for a station
    Train {
        /// Train Tracker station (map) id (defaults to CTA_TRAIN_STATION_ID)
        #[arg(short, long)]
        station_id: Option<String>,

        /// Maximum number of arrivals to request (defaults to CTA_TRAIN_MAX_RESULTS)
        #[arg(short, long)]
        max: Option<u32>,

        /// Print JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show bus and train predictions together with the current time
    Board {
        /// Print JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/cta_arrivals.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("cta_arrivals.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    debug!(?config, "Configuration loaded");

    match cli.command {
        Commands::Bus { stop_id, json } => {
            let stop_id = stop_id.unwrap_or_else(|| config.bus_stop_id.clone());
            let predictor = bus_predictor(&config, stop_id)?;
            let predictions = predictor.predictions().await;

            if json {
                println!("{}", to_json(&predictions)?);
            } else {
                print_lines(&bus_lines(&predictions));
            }
        }
        Commands::Train {
            station_id,
            max,
            json,
        } => {
            let station_id = station_id.unwrap_or_else(|| config.train_station_id.clone());
            let max = max.unwrap_or(config.train_max_results);
            let predictor = train_predictor(&config, station_id, max)?;
            let predictions = predictor.predictions().await;

            if json {
                println!("{}", to_json(&predictions)?);
            } else {
                print_lines(&train_lines(&predictions));
            }
        }
        Commands::Board { json } => {
            let bus = bus_predictor(&config, config.bus_stop_id.clone())?;
            let train = train_predictor(
                &config,
                config.train_station_id.clone(),
                config.train_max_results,
            )?;
            let board = compose_board(
                &bus,
                &train,
                &config.bus_stop_name,
                &config.train_station_name,
            )
            .await;

            info!(
                bus = board.bus.len(),
                train = board.train.len(),
                "Board composed"
            );

            if json {
                println!("{}", to_json(&board)?);
            } else {
                print_lines(&board_lines(&board));
            }
        }
    }

    Ok(())
}

fn bus_predictor(config: &Config, stop_id: String) -> Result<BusPredictor<UrlParam<BasicClient>>> {
    let client = UrlParam::key(BasicClient::new(config.http_timeout)?, &config.bus_api_key);
    Ok(BusPredictor::new(client, &config.bus_endpoint, stop_id))
}

fn train_predictor(
    config: &Config,
    station_id: String,
    max: u32,
) -> Result<TrainPredictor<UrlParam<BasicClient>>> {
    let client = UrlParam::key(BasicClient::new(config.http_timeout)?, &config.train_api_key);
    Ok(TrainPredictor::new(client, &config.train_endpoint, station_id, max))
}
