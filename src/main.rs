use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use cuadre::cli::{
    handle_audit_command, handle_correction_command, handle_entry_command, handle_key_command,
    handle_operation_command, handle_report_command, CorrectionCommands, EntryCommands,
    KeyCommands, OperationCommands, ReportCommands,
};
use cuadre::config::{CuadrePaths, Settings};
use cuadre::error::CuadreError;
use cuadre::logging;
use cuadre::storage::{initialize_storage, Storage};

#[derive(Parser)]
#[command(
    name = "cuadre",
    version,
    about = "Back-office reconciliation of currency-exchange operations",
    long_about = "cuadre registers USD and PEN settlement entries against trade \
                  operations, lists them by reconciliation status, and exports \
                  the reconciliation spreadsheet with per-row differences."
)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Operation import, listing and details
    #[command(subcommand, alias = "op")]
    Operation(OperationCommands),

    /// Register, edit and show reconciliation entries
    #[command(subcommand)]
    Entry(EntryCommands),

    /// Reconciliation report
    #[command(subcommand)]
    Report(ReportCommands),

    /// Batch data corrections
    #[command(subcommand)]
    Correction(CorrectionCommands),

    /// Scraper API key rotation
    #[command(subcommand)]
    Keys(KeyCommands),

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Create the data directory and empty data files
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.log_json {
        logging::init_json_logger(cli.verbose);
    } else {
        logging::init_cli_logger(cli.verbose);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let status = err
                .downcast_ref::<CuadreError>()
                .map(CuadreError::status_code)
                .unwrap_or(500);
            tracing::debug!(status, error = %err, "command failed");
            eprintln!("error [{}]: {}", status, err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    // Initialize paths and settings
    let paths = CuadrePaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    // Initialize storage
    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Some(Commands::Operation(cmd)) => handle_operation_command(&storage, &settings, cmd)?,
        Some(Commands::Entry(cmd)) => handle_entry_command(&storage, &settings, cmd)?,
        Some(Commands::Report(cmd)) => handle_report_command(&storage, &settings, cmd)?,
        Some(Commands::Correction(cmd)) => handle_correction_command(&storage, cmd)?,
        Some(Commands::Keys(cmd)) => handle_key_command(&storage, &settings, cmd)?,
        Some(Commands::Audit { limit }) => handle_audit_command(&storage, limit)?,
        Some(Commands::Init) => {
            println!("Initializing cuadre at: {}", paths.base_dir().display());
            let created = initialize_storage(&paths, &settings)?;
            for path in &created {
                println!("  created {}", path.display());
            }
            println!("Initialization complete!");
            println!();
            println!("Run 'cuadre operation import <file.csv>' to load operations.");
        }
        Some(Commands::Config) => {
            println!("cuadre Configuration");
            println!("====================");
            println!("Base directory:    {}", paths.base_dir().display());
            println!("Data directory:    {}", paths.data_dir().display());
            println!("Keys directory:    {}", paths.keys_dir().display());
            println!("Exports directory: {}", paths.exports_dir().display());
            println!("Audit log:         {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Page size:         {}", settings.default_page_size);
            println!("  Export file:       {}", settings.export_file_name);
            println!("  Entry date format: {}", settings.entry_date_format);
            println!("  Key usage limit:   {}", settings.key_policy.usage_limit);
            println!("  Credits API:       {}", settings.credits_api_url);
        }
        None => {
            println!("cuadre - reconciliation of currency-exchange operations");
            println!();
            println!("Run 'cuadre --help' for usage information.");
        }
    }

    Ok(())
}
