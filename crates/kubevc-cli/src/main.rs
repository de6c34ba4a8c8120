//! KubeVC CLI
//!
//! Setup and launch wrapper around the snapshot server

use clap::{Parser, Subcommand};
use kubevc_core::logging_facility::{self, Profile};

mod commands;
mod settings;
mod wiring;

#[derive(Debug, Parser)]
#[command(name = "kubevc")]
#[command(about = "KubeVC - Kubernetes cluster snapshots per Git commit", long_about = None)]
struct Cli {
    /// Log output: pretty or json
    #[arg(long, global = true, default_value = "pretty")]
    log_format: Profile,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the webhook receiver and dashboard
    #[command(alias = "start")]
    Serve(commands::serve::ServeArgs),
    /// Write a configuration file
    Configure(commands::configure::ConfigureArgs),
    /// Validate configuration and reach the snapshot store
    Check(commands::check::CheckArgs),
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging_facility::init(cli.log_format);

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::execute(args).await,
        Commands::Configure(args) => commands::configure::execute(args),
        Commands::Check(args) => commands::check::execute(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
