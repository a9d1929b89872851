mod check;
mod convert;
mod nearby;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "chumsai-cli")]
#[command(about = "Chumsai finder operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Convert the first worksheet of an Excel file into an importable CSV
    Convert {
        /// Excel workbook (xlsx, xls, xlsb or ods)
        excel: PathBuf,
        /// CSV file to write
        #[arg(long, short, default_value = "output.csv")]
        output: PathBuf,
    },
    /// Fetch rows from the configured source and summarize them
    CheckSource {
        /// Number of sample rows to print
        #[arg(long, default_value = "5")]
        sample: usize,
    },
    /// Rank the sites near a coordinate using the configured source
    Nearby {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        /// Overrides CHUMSAI_SEARCH_RADIUS_KM
        #[arg(long)]
        radius_km: Option<f64>,
        /// Overrides CHUMSAI_MAX_RESULTS
        #[arg(long)]
        max_results: Option<usize>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Convert { excel, output }) => convert::run_convert(&excel, &output)?,
        Some(Commands::CheckSource { sample }) => {
            let config = chumsai_core::load_app_config()?;
            check::run_check_source(&config, sample).await?;
        }
        Some(Commands::Nearby {
            lat,
            lng,
            radius_km,
            max_results,
            json,
        }) => {
            let config = chumsai_core::load_app_config()?;
            let request = nearby::NearbyRequest {
                lat,
                lng,
                radius_km,
                max_results,
                json,
            };
            nearby::run_nearby(&config, &request).await?;
        }
        None => Cli::command().print_help()?,
    }

    Ok(())
}
