use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use txagg::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for txagg::AppCommand {
    fn from(cmd: Commands) -> txagg::AppCommand {
        match cmd {
            Commands::Aggregate { account, json } => {
                txagg::AppCommand::Aggregate { account, json }
            }
            Commands::Ping => txagg::AppCommand::Ping,
            Commands::Serve { bind } => txagg::AppCommand::Serve { bind },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Merge the transactions of an account from both sources
    Aggregate {
        account: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Check that the upstream is alive
    Ping,
    /// Serve the aggregation endpoint over HTTP
    Serve {
        /// Address to listen on, overrides the configured one
        #[arg(short, long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => txagg::cli::setup::setup(),
        Some(cmd) => txagg::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
