use std::process::ExitCode;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use stremio_metafetcher::app::{App, SyncOptions, normalize_data_dir};
use stremio_metafetcher::cinemeta::CinemetaHttpClient;
use stremio_metafetcher::config::ConfigLoader;
use stremio_metafetcher::error::MetaError;
use stremio_metafetcher::fetch::ThreadSleep;
use stremio_metafetcher::output::JsonOutput;

#[derive(Parser)]
#[command(name = "stremio-metafetcher")]
#[command(about = "Fetch missing Stremio metas for the IMDb IDs listed in CSV files")]
#[command(version)]
struct Cli {
    /// Location of the data directory. It contains CSV files with IMDb IDs, and
    /// its "metas" subdirectory receives the metas as JSON files.
    #[arg(long, alias = "dataDir", default_value = ".")]
    data_dir: String,

    /// Optional JSON config file overriding service URL, column name and timings.
    #[arg(long)]
    config: Option<String>,

    /// Only report which metas are missing.
    #[arg(long)]
    dry_run: bool,

    /// Print a JSON report of the run to stdout.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<MetaError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &MetaError) -> u8 {
    match error {
        MetaError::DataDirRead { .. }
        | MetaError::CsvRead { .. }
        | MetaError::EmptyCsv
        | MetaError::MissingIdColumn { .. }
        | MetaError::ShortRow { .. } => 2,
        MetaError::CacheRead { .. } | MetaError::CacheWrite { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = ConfigLoader::resolve(cli.config.as_deref())?;
    let client = CinemetaHttpClient::new(&config)?;
    let app = App::new(config, client, ThreadSleep);

    let data_dir = normalize_data_dir(&cli.data_dir);
    let options = SyncOptions {
        dry_run: cli.dry_run,
    };
    let report = app.sync(&data_dir, options)?;

    if cli.json {
        JsonOutput::print_report(&report).into_diagnostic()?;
    }
    Ok(())
}
