//! stevenson CLI - GHCN daily and monthly climate station-data downloader.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod display;

use display::Format;

#[derive(Parser)]
#[command(name = "stevenson")]
#[command(about = "GHCN daily and monthly climate station-data downloader", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Download daily observations
    Daily {
        /// Station identifiers (e.g. UKE00105915)
        stations: Vec<String>,

        /// Select stations whose ID or name matches a pattern
        #[arg(short, long)]
        name: Option<String>,

        /// Select the stations nearest to a point
        #[arg(long, value_name = "LON,LAT")]
        near: Option<String>,

        /// How many stations to take with --near
        #[arg(long, default_value = "1")]
        count: usize,

        /// Start date (YYYY-MM-DD). Omit to keep a station's full record.
        #[arg(short, long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today when --start is given.
        #[arg(short, long)]
        end: Option<String>,

        /// Element codes to keep (e.g. PRCP,TMAX). Defaults to all.
        #[arg(short = 'E', long, value_delimiter = ',')]
        elements: Vec<String>,

        /// Output file path. Defaults to <station>.<format>
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: Format,

        /// Drop the measurement, quality and source flag columns
        #[arg(long)]
        no_flags: bool,

        /// Concurrent station downloads. Defaults to 3/4 of the CPUs.
        #[arg(long)]
        workers: Option<usize>,

        /// Reuse cached results for repeated runs
        #[arg(long)]
        cache: bool,

        /// Cache directory (implies --cache)
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },

    /// Convert a GHCN-M v4 monthly archive
    Monthly {
        /// Path to the .dat data file
        data: PathBuf,

        /// Path to the matching .inv station metadata file
        #[arg(short, long)]
        metadata: Option<PathBuf>,

        /// Path to the country-codes file. Downloaded when omitted and
        /// --metadata is given.
        #[arg(long)]
        countries: Option<PathBuf>,

        /// Keep only these station identifiers
        #[arg(short, long, value_delimiter = ',')]
        stations: Vec<String>,

        /// Keep only stations in a country (name or two-letter prefix)
        #[arg(short, long)]
        country: Option<String>,

        /// Output file path. Defaults to <data>.<format>
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: Format,

        /// Drop the flag columns
        #[arg(long)]
        no_flags: bool,
    },

    /// List and search station metadata
    Stations {
        /// Search pattern matched against station ID and name
        #[arg(short, long)]
        search: Option<String>,

        /// Filter by country name or two-letter prefix
        #[arg(short, long)]
        country: Option<String>,

        /// List the stations nearest to a point
        #[arg(long, value_name = "LON,LAT")]
        near: Option<String>,

        /// Maximum stations to print
        #[arg(short, long, default_value = "25")]
        limit: usize,
    },

    /// Show details for one station
    Info {
        /// Station identifier
        station: String,
    },
}

/// Route log output to stderr so it never mixes into piped data.
fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("stevenson={level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Daily {
            stations,
            name,
            near,
            count,
            start,
            end,
            elements,
            output,
            format,
            no_flags,
            workers,
            cache,
            cache_dir,
        } => {
            commands::daily::daily(
                &stations,
                name.as_deref(),
                near.as_deref(),
                count,
                start.as_deref(),
                end.as_deref(),
                &elements,
                output,
                format,
                no_flags,
                workers,
                cache,
                cache_dir,
                cli.quiet,
            )
            .await
        }
        Commands::Monthly {
            data,
            metadata,
            countries,
            stations,
            country,
            output,
            format,
            no_flags,
        } => {
            commands::monthly::monthly(
                &data,
                metadata.as_deref(),
                countries.as_deref(),
                &stations,
                country.as_deref(),
                output,
                format,
                no_flags,
                cli.quiet,
            )
            .await
        }
        Commands::Stations {
            search,
            country,
            near,
            limit,
        } => {
            commands::stations::stations(
                search.as_deref(),
                country.as_deref(),
                near.as_deref(),
                limit,
                cli.quiet,
            )
            .await
        }
        Commands::Info { station } => commands::info::info(&station, cli.quiet).await,
    }
}
