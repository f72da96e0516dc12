use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxmate::cli::favorites::FavoritesAction;
use fxmate::cli::rates::RatesArgs;
use fxmate::core::log::init_logging;

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

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show latest rates with day-over-day change
    Rates {
        /// Base currency for this run (saved as the new default)
        #[arg(short, long)]
        base: Option<String>,
        /// Amount to convert into every listed currency
        #[arg(short, long, default_value_t = 1.0)]
        amount: f64,
        /// Currency the amount is in; defaults to the base
        #[arg(short, long)]
        from: Option<String>,
        /// Filter by code or name; favorites only when empty
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Show daily rates of one currency over a range of days
    History {
        /// Quoted currency, e.g. USD
        target: String,
        #[arg(short, long)]
        base: Option<String>,
        /// Days back from today; defaults to `history_days` from the config
        #[arg(short, long)]
        days: Option<u32>,
    },
    /// Manage favorite currencies
    Favorites {
        #[command(subcommand)]
        action: Option<FavoritesCommand>,
    },
    /// Set the default base currency
    Base { code: String },
    /// Reconcile settings with the shared copy
    Sync,
}

#[derive(Subcommand)]
enum FavoritesCommand {
    List,
    Add { code: String },
    Remove { code: String },
    /// Move a favorite to a 1-based position
    Move { code: String, position: usize },
}

impl From<FavoritesCommand> for FavoritesAction {
    fn from(cmd: FavoritesCommand) -> FavoritesAction {
        match cmd {
            FavoritesCommand::List => FavoritesAction::List,
            FavoritesCommand::Add { code } => FavoritesAction::Add(code),
            FavoritesCommand::Remove { code } => FavoritesAction::Remove(code),
            FavoritesCommand::Move { code, position } => FavoritesAction::Move { code, position },
        }
    }
}

impl From<Commands> for fxmate::AppCommand {
    fn from(cmd: Commands) -> fxmate::AppCommand {
        match cmd {
            Commands::Rates {
                base,
                amount,
                from,
                search,
            } => fxmate::AppCommand::Rates(RatesArgs {
                base,
                amount,
                from,
                search,
            }),
            Commands::History { target, base, days } => {
                fxmate::AppCommand::History { target, base, days }
            }
            Commands::Favorites { action } => fxmate::AppCommand::Favorites(
                action.map_or(FavoritesAction::List, FavoritesAction::from),
            ),
            Commands::Base { code } => fxmate::AppCommand::Base(code),
            Commands::Sync => fxmate::AppCommand::Sync,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxmate::cli::setup::setup(),
        Some(cmd) => fxmate::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
