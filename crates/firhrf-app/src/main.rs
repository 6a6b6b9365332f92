//! firhrf
//!
//! Command-line front end for FIR hemodynamic response retrieval.
//!
//! # Usage
//!
//! ```bash
//! # Show the peristimulus grid for TR = 2 s, ER = 0.5 s
//! firhrf grid --tr 2 --er 0.5
//!
//! # Estimate responses and write a JSON report
//! firhrf estimate --timecourse bold.txt --events events.txt --tr 2 --metric FIR
//!
//! # Write a synthetic timecourse for an event file
//! firhrf simulate --events events.txt --tr 2 --ntps 200 --output bold.txt
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use firhrf_core::{PeristimulusGrid, RetrievalConfig};
use firhrf_native::io::{load_config, load_event_table, load_timecourse, write_timecourse};
use firhrf_native::{simulate_timecourse, HrfRetrieval, Metric, SimulationConfig};

/// FIR HRF retrieval
#[derive(Parser, Debug)]
#[command(name = "firhrf")]
#[command(author, version, about = "FIR hemodynamic response retrieval", long_about = None)]
struct Cli {
    /// Logging verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// Grid parameters shared by every subcommand
#[derive(Args, Debug)]
struct GridArgs {
    /// JSON config file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Repetition time (s)
    #[arg(long)]
    tr: Option<f64>,

    /// Estimation resolution (s), defaults to TR
    #[arg(long)]
    er: Option<f64>,

    /// Peristimulus window as "start,end" in seconds, e.g. "-4,24"
    #[arg(long, value_parser = parse_window, allow_hyphen_values = true)]
    window: Option<[f64; 2]>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the peristimulus grid
    Grid {
        #[command(flatten)]
        grid: GridArgs,
    },

    /// Estimate per-condition responses
    Estimate {
        #[command(flatten)]
        grid: GridArgs,

        /// Timecourse file (one voxel per line)
        #[arg(short, long)]
        timecourse: PathBuf,

        /// Event table file (onset, code, duration, label)
        #[arg(short, long)]
        events: PathBuf,

        /// Estimation metric: FIR or average
        #[arg(short, long, default_value = "FIR")]
        metric: String,

        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a synthetic timecourse using the canonical HRF
    Simulate {
        #[command(flatten)]
        grid: GridArgs,

        /// Event table file (onset, code, duration, label)
        #[arg(short, long)]
        events: PathBuf,

        /// Number of acquisitions
        #[arg(long, default_value = "200")]
        ntps: usize,

        /// Constant signal level
        #[arg(long, default_value = "100.0")]
        baseline: f64,

        /// Output timecourse file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("firhrf v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Grid { grid } => print_grid(&grid.resolve()?),
        Commands::Estimate {
            grid,
            timecourse,
            events,
            metric,
            output,
        } => run_estimate(&grid.resolve()?, &timecourse, &events, &metric, output.as_deref()),
        Commands::Simulate {
            grid,
            events,
            ntps,
            baseline,
            output,
        } => run_simulate(&grid.resolve()?, &events, ntps, baseline, &output),
    }
}

impl GridArgs {
    /// Merge the config file (if any) with command-line flags
    fn resolve(&self) -> anyhow::Result<RetrievalConfig> {
        let mut config = match (&self.config, self.tr) {
            (Some(path), _) => load_config(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            (None, Some(tr)) => RetrievalConfig::new(tr),
            (None, None) => bail!("--tr is required without --config"),
        };

        if let Some(tr) = self.tr {
            config.tr = tr;
        }
        if let Some(er) = self.er {
            config.er = Some(er);
        }
        if let Some(window) = self.window {
            config.window = window;
        }
        Ok(config)
    }
}

fn parse_window(text: &str) -> Result<[f64; 2], String> {
    let (start, end) = text
        .split_once(',')
        .ok_or_else(|| format!("expected 'start,end', got '{text}'"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid window bound '{s}': {e}"))
    };
    Ok([parse(start)?, parse(end)?])
}

fn print_grid(config: &RetrievalConfig) -> anyhow::Result<()> {
    let grid = PeristimulusGrid::new(config)?;
    println!("TR       {:.4} s", grid.tr());
    println!("ER       {:.4} s", grid.er());
    println!("window   [{}, {}] s", grid.t_start(), grid.t_end());
    println!("nPreStim {}", grid.n_pre_stim());
    println!("nHEst    {}", grid.n_h_est());
    let tscale: Vec<String> = grid.tscale().iter().map(|t| format!("{t:.4}")).collect();
    println!("tscale   {}", tscale.join(" "));
    Ok(())
}

fn run_estimate(
    config: &RetrievalConfig,
    timecourse: &Path,
    events: &Path,
    metric: &str,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let metric: Metric = metric.parse()?;
    let timecourse = load_timecourse(timecourse)?;
    let events = load_event_table(events)?;

    let mut retrieval = HrfRetrieval::new(timecourse, events, config)?;
    retrieval.estimate(metric)?;

    let json = retrieval.report().to_json_pretty()?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("writing report {}", path.display()))?;
            info!(path = %path.display(), "Report written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn run_simulate(
    config: &RetrievalConfig,
    events: &Path,
    ntps: usize,
    baseline: f64,
    output: &Path,
) -> anyhow::Result<()> {
    let grid = PeristimulusGrid::new(config)?;
    let events = load_event_table(events)?;
    let sim = SimulationConfig {
        n_timepoints: ntps,
        baseline,
        ..SimulationConfig::default()
    };

    let timecourse = simulate_timecourse(&events, &grid, &sim)?;
    write_timecourse(output, &timecourse)?;
    info!(path = %output.display(), n_timepoints = ntps, "Timecourse written");
    Ok(())
}
