//! trackinit: associate sensor measurements into tentative and firm tracks.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use thiserror::Error;

use trackinit_core::config::{self, Config};
use trackinit_core::{GatingParams, InitiationMode, Measurement, TrackError, Tracker};

mod reader;
mod report;

#[derive(Parser)]
#[command(
    name = "trackinit",
    version,
    about = "Gated track initiation from bearing/elevation/range/Doppler measurements"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the tracker over a CSV file of measurements
    Run {
        /// CSV with azimuth,elevation,range,timestamp[,doppler] columns (`-` for stdin)
        file: PathBuf,

        #[command(flatten)]
        gating: GatingArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Run the tracker over the built-in six-measurement scenario
    Demo {
        #[command(flatten)]
        gating: GatingArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show or initialise the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show {
        /// Config file to read instead of ~/.trackinit/config.yaml
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct GatingArgs {
    /// Config file to read instead of ~/.trackinit/config.yaml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initiation mode: 3-state, 5-state or 7-state
    #[arg(long, conflicts_with = "firm")]
    mode: Option<InitiationMode>,

    /// Consecutive hits needed to confirm a track
    #[arg(long, allow_negative_numbers = true)]
    firm: Option<i64>,

    /// Doppler gate threshold
    #[arg(long, allow_negative_numbers = true)]
    doppler: Option<f64>,

    /// Range gate threshold (cartesian distance)
    #[arg(long, allow_negative_numbers = true)]
    range: Option<f64>,

    /// Maximum time since a track's last measurement
    #[arg(long, allow_negative_numbers = true)]
    time: Option<f64>,
}

#[derive(Args)]
struct OutputArgs {
    /// Print a JSON document instead of tables
    #[arg(long)]
    json: bool,

    /// Include deleted tracks in the report
    #[arg(long)]
    keep_deleted: bool,

    /// Print every association event
    #[arg(long)]
    events: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Track(#[from] TrackError),
    #[error(transparent)]
    Read(#[from] reader::ReadError),
    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} already exists (use --force to overwrite)")]
    ConfigExists(String),
}

/// Reference scenario: three points forming one track, then a distant
/// object seen twice.
const DEMO_MEASUREMENTS: [(f64, f64, f64, f64, f64); 6] = [
    (10.0, 5.0, 100.0, 5.0, 0.0),
    (12.0, 6.0, 105.0, 6.0, 1.0),
    (9.0, 4.0, 98.0, 4.5, 2.0),
    (50.0, 20.0, 500.0, 50.0, 3.0),
    (52.0, 22.0, 505.0, 52.0, 5.0),
    (53.0, 23.0, 510.0, 53.0, 7.0),
];

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Run {
            file,
            gating,
            output,
        } => reader::read_measurements(&file)
            .map_err(CliError::from)
            .and_then(|ms| cmd_track(&ms, &gating, &output)),
        Commands::Demo { gating, output } => {
            let ms: Vec<Measurement> = DEMO_MEASUREMENTS.iter().map(|&t| t.into()).collect();
            cmd_track(&ms, &gating, &output)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { config } => cmd_config_show(config),
            ConfigAction::Init { force } => cmd_config_init(force),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Initialise env_logger from the verbosity flags.
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

fn load_base_config(path: Option<&PathBuf>) -> Result<Config, CliError> {
    match path {
        Some(p) => {
            log::info!("loading configuration from {}", p.display());
            Ok(config::load_config_from(p)?)
        }
        None => Ok(config::load_config()),
    }
}

/// Merge command-line overrides onto the config file and validate.
fn resolve_params(args: &GatingArgs) -> Result<(GatingParams, Config), CliError> {
    let config = load_base_config(args.config.as_ref())?;
    let base = config.gating;

    let firm = match (args.mode, args.firm) {
        (Some(mode), _) => mode.firm_threshold() as i64,
        (None, Some(n)) => n,
        (None, None) => base.firm_threshold() as i64,
    };

    let params = GatingParams::new(
        args.doppler.unwrap_or(base.doppler_threshold()),
        args.range.unwrap_or(base.range_threshold()),
        firm,
        args.time.unwrap_or(base.time_threshold()),
    )?;
    Ok((params, config))
}

fn cmd_track(
    measurements: &[Measurement],
    gating: &GatingArgs,
    output: &OutputArgs,
) -> Result<(), CliError> {
    let (params, config) = resolve_params(gating)?;
    let json = output.json || config.report.json;
    let keep_deleted = output.keep_deleted || config.report.keep_deleted;

    log::debug!("gating parameters: {params:?}");

    let mut tracker = Tracker::new(params);
    let events = tracker.run(measurements);

    if json {
        report::print_json(&report::JsonReport {
            snapshot: tracker.snapshot(keep_deleted),
            events: output.events.then_some(events.as_slice()),
        })?;
    } else {
        if output.events {
            report::print_events(&events);
        }
        report::print_summary(&tracker.snapshot(keep_deleted));
    }

    Ok(())
}

fn cmd_config_show(path: Option<PathBuf>) -> Result<(), CliError> {
    let config = load_base_config(path.as_ref())?;
    let g = &config.gating;

    println!();
    println!(
        "Config: {}",
        path.unwrap_or_else(config::config_file).display()
    );
    println!();
    println!("  Doppler threshold:  {}", g.doppler_threshold());
    println!("  Range threshold:    {}", g.range_threshold());
    println!("  Time threshold:     {}", g.time_threshold());
    println!("  Firm threshold:     {}", g.firm_threshold());
    println!(
        "  Modes:              {}",
        InitiationMode::ALL
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  Keep deleted:       {}", config.report.keep_deleted);
    println!("  JSON output:        {}", config.report.json);
    println!();
    Ok(())
}

fn cmd_config_init(force: bool) -> Result<(), CliError> {
    let path = config::config_file();
    if path.exists() && !force {
        return Err(CliError::ConfigExists(path.display().to_string()));
    }
    let path = config::save_config(&Config::default())?;
    println!("Wrote {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
