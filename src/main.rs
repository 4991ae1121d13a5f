use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use spendwise::api::ApiResponse;
use spendwise::cli::{
    handle_audit_command, handle_budget_command, handle_category_command, handle_config_command,
    handle_report_command, handle_transaction_command, handle_user_command, Session,
};
use spendwise::config::{Settings, SpendwisePaths};
use spendwise::error::SpendwiseResult;
use spendwise::storage::{initialize_storage, Storage};

/// Environment variable holding the log filter, e.g. "spendwise=debug"
const LOG_ENV: &str = "SPENDWISE_LOG";

#[derive(Parser)]
#[command(
    name = "spendwise",
    version,
    about = "Track income and expenses against monthly category budgets",
    long_about = "Spendwise records income and expenses per user and checks every \
                  expense against the category's budget for its month. An expense \
                  that would overspend the budget is refused."
)]
struct Cli {
    /// User to act as
    #[arg(short, long, global = true, env = "SPENDWISE_USER")]
    user: Option<String>,

    /// Print results as a JSON envelope
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// User registration and passwords
    #[command(subcommand)]
    User(spendwise::cli::UserCommands),

    /// Category management commands
    #[command(subcommand)]
    Category(spendwise::cli::CategoryCommands),

    /// Budget management commands
    #[command(subcommand)]
    Budget(spendwise::cli::BudgetCommands),

    /// Transaction management commands
    #[command(subcommand, alias = "txn")]
    Transaction(spendwise::cli::TransactionCommands),

    /// Reports
    #[command(subcommand)]
    Report(spendwise::cli::ReportCommands),

    /// Show your recent changes
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Create the data directory and empty collections
    Init,

    /// Show configuration, or change a setting with KEY VALUE
    Config {
        key: Option<String>,
        value: Option<String>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli, session: &Session) -> SpendwiseResult<()> {
    let paths = SpendwisePaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;

    let command = match cli.command {
        Some(command) => command,
        None => {
            println!("Spendwise - budgets and expenses from the command line");
            println!();
            println!("Run 'spendwise --help' for usage information.");
            println!("Run 'spendwise init' to set up the data directory.");
            return Ok(());
        }
    };

    match command {
        Commands::Init => {
            println!("Initializing Spendwise at: {}", paths.base_dir().display());
            initialize_storage(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Next, register a user:  spendwise user register <name>");
            return Ok(());
        }
        Commands::Config { key, value } => {
            return handle_config_command(&paths, &mut settings, session, key, value);
        }
        _ => {}
    }

    let storage = Storage::with_audit(paths, settings.audit_enabled)?;
    storage.load_all()?;

    match command {
        Commands::User(cmd) => handle_user_command(&storage, &settings, session, cmd),
        Commands::Category(cmd) => handle_category_command(&storage, session, cmd),
        Commands::Budget(cmd) => handle_budget_command(&storage, &settings, session, cmd),
        Commands::Transaction(cmd) => {
            handle_transaction_command(&storage, &settings, session, cmd)
        }
        Commands::Report(cmd) => handle_report_command(&storage, &settings, session, cmd),
        Commands::Audit { limit } => handle_audit_command(&storage, session, limit),
        Commands::Init | Commands::Config { .. } => Ok(()),
    }
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let session = Session::new(cli.user.clone(), cli.json);

    match run(cli, &session) {
        Ok(()) => Ok(()),
        Err(err) if session.json => {
            println!("{}", ApiResponse::<()>::error(&err).to_json()?);
            std::process::exit(1);
        }
        Err(err) => Err(err.into()),
    }
}
