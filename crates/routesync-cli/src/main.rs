use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use routesync_cli::commands::locations::handle_locations_command;
use routesync_cli::commands::route::{handle_route_command, RouteCommandArgs};
use routesync_cli::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about = "RouteSync multi-modal shipment routing")]
struct Cli {
    /// Override the dataset directory or SQLite file path.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find ranked paths between two locations.
    Route(RouteCommandArgs),
    /// List known locations.
    Locations {
        /// Only locations in this ISO country code.
        #[arg(long)]
        country: Option<String>,
        /// Case-insensitive substring of the location name.
        #[arg(long)]
        search: Option<String>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match &cli.command {
        Command::Route(args) => handle_route_command(cli.data_dir.as_deref(), cli.format, args),
        Command::Locations { country, search } => handle_locations_command(
            cli.data_dir.as_deref(),
            cli.format,
            country.as_deref(),
            search.as_deref(),
        ),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
