//! pixframe CLI
//!
//! Clusters JSON-lines event files against a run header and writes the
//! accepted clusters as CSV, JSON lines or binary.
#![allow(clippy::uninlined_format_args, clippy::cast_precision_loss)]

use clap::{Args, Parser, Subcommand};
use log::{info, LevelFilter};
use pixframe_algorithms::{
    ClusterLimitPolicy, ClusteringConfig, EventClusteringEngine, EventOutcome,
};
use pixframe_io::{ClusterFileWriter, EventFileReader, RunHeader};
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    PixframeIo(#[from] pixframe_io::Error),

    #[error("Clustering error: {0}")]
    Core(#[from] pixframe_core::Error),
}

/// Fixed-window seed clustering for pixel sensor data.
#[derive(Parser)]
#[command(name = "pixframe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cluster every event of an event file
    Process {
        /// Run header (JSON)
        #[arg(long)]
        header: PathBuf,

        /// Event file (JSON lines)
        #[arg(long)]
        events: PathBuf,

        /// Output file path (.csv, .jsonl, anything else binary)
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        overrides: ConfigOverrides,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show information about a run header
    Info {
        /// Run header (JSON)
        #[arg(long)]
        header: PathBuf,
    },
}

/// Clustering parameters given on the command line.
#[derive(Args, Debug, Default)]
struct ConfigOverrides {
    /// Window width in pixels, overrides the header
    #[arg(long)]
    x_size: Option<usize>,

    /// Window height in pixels, overrides the header
    #[arg(long)]
    y_size: Option<usize>,

    /// Seed threshold in units of pixel noise, overrides the header
    #[arg(long)]
    seed_cut: Option<f64>,

    /// Cluster threshold in units of cluster noise, overrides the header
    #[arg(long)]
    cluster_cut: Option<f64>,

    /// Maximum clusters per sensor per event, overrides the header
    #[arg(long)]
    max_clusters: Option<usize>,

    /// Stop building clusters once the per-sensor limit is reached
    #[arg(long)]
    enforce_limit: bool,

    /// Cluster sensors one after another
    #[arg(long)]
    sequential: bool,
}

impl ConfigOverrides {
    fn apply(&self, mut config: ClusteringConfig) -> ClusteringConfig {
        if self.x_size.is_some() || self.y_size.is_some() {
            let x = self.x_size.unwrap_or(config.x_cluster_size);
            let y = self.y_size.unwrap_or(config.y_cluster_size);
            config = config.with_cluster_size(x, y);
        }
        if let Some(cut) = self.seed_cut {
            config = config.with_seed_cut(cut);
        }
        if let Some(cut) = self.cluster_cut {
            config = config.with_cluster_cut(cut);
        }
        if self.max_clusters.is_some() || self.enforce_limit {
            let policy = if self.enforce_limit {
                ClusterLimitPolicy::Enforced
            } else {
                config.limit_policy
            };
            let limit = self.max_clusters.unwrap_or(config.max_clusters_per_sensor);
            config = config.with_cluster_limit(limit, policy);
        }
        if self.sequential {
            config = config.with_parallel_sensors(false);
        }
        config
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            header,
            events,
            output,
            overrides,
            verbose,
        } => {
            init_logging(verbose);
            let run = RunHeader::from_file(&header)?;

            let config = overrides.apply(run.clustering.clone());

            info!(
                "window {}x{}, seed cut {}, cluster cut {}, {} sensor(s)",
                config.x_cluster_size,
                config.y_cluster_size,
                config.seed_cut,
                config.cluster_cut,
                run.sensors.len()
            );

            let mut engine = EventClusteringEngine::new(config, run.sensor_states()?)?;
            let reader = EventFileReader::open(&events)?;
            let mut writer = ClusterFileWriter::create(&output)?;
            info!(
                "writing {:?} output to {}",
                writer.format(),
                output.display()
            );

            let start = Instant::now();
            engine.start_run();
            for event in reader.events() {
                let event = event?;
                match engine.process_event(&event)? {
                    EventOutcome::Clusters(clusters) => writer.write_event(&clusters)?,
                    EventOutcome::NoClusters => {}
                    EventOutcome::EndOfRun => break,
                }
            }
            writer.flush()?;
            let stats = engine.finish_run();
            let elapsed = start.elapsed();

            println!(
                "Processed {} events in {:.2}s",
                stats.events_processed,
                elapsed.as_secs_f64()
            );
            println!("Data events: {}", stats.data_events);
            println!("Events without clusters: {}", stats.events_without_output);
            println!("Events over cluster limit: {}", stats.events_over_limit);
            for (sensor, total) in run.sensors.iter().zip(&stats.clusters_per_sensor) {
                println!("Sensor {}: {} clusters", sensor.id, total);
            }
            println!("Total clusters: {}", stats.total_clusters());
        }

        Commands::Info { header } => {
            init_logging(false);
            let run = RunHeader::from_file(&header)?;
            let config = &run.clustering;

            println!("Header: {}", header.display());
            println!(
                "Window: {}x{} ({} pixels)",
                config.x_cluster_size,
                config.y_cluster_size,
                config.window_len()
            );
            println!("Seed cut: {}", config.seed_cut);
            println!("Cluster cut: {}", config.cluster_cut);
            println!(
                "Cluster limit: {} ({:?})",
                config.max_clusters_per_sensor, config.limit_policy
            );
            println!("Sensors: {}", run.sensors.len());
            for sensor in &run.sensors {
                let frame = sensor.frame()?;
                println!(
                    "  sensor {}: x {}..={}, y {}..={}, {} pixels, {} bad ({:.3}%)",
                    sensor.id,
                    frame.min_x,
                    frame.max_x,
                    frame.min_y,
                    frame.max_y,
                    frame.pixel_count(),
                    sensor.bad_pixels.len(),
                    100.0 * sensor.bad_pixels.len() as f64 / frame.pixel_count() as f64
                );
            }
        }
    }

    Ok(())
}
