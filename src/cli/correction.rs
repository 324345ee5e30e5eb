//! Data correction CLI commands

use clap::Subcommand;

use crate::error::CuadreResult;
use crate::services::CorrectionService;
use crate::storage::Storage;

/// Correction subcommands
#[derive(Subcommand)]
pub enum CorrectionCommands {
    /// Fill missing entries and normalize amount signs
    FixSigns {
        /// Operation numbers to correct
        #[arg(required = true)]
        numbers: Vec<u64>,
    },
}

/// Handle a correction command
pub fn handle_correction_command(storage: &Storage, cmd: CorrectionCommands) -> CuadreResult<()> {
    match cmd {
        CorrectionCommands::FixSigns { numbers } => {
            let report = CorrectionService::new(storage).fix_signs(&numbers)?;

            println!("Processed {} operation(s)", report.processed.len());
            println!("  Entries created:   {}", report.entries_created);
            println!("  Entries rewritten: {}", report.entries_rewritten);
            println!("  Already correct:   {}", report.entries_unchanged);
            if !report.skipped.is_empty() {
                let skipped: Vec<String> = report.skipped.iter().map(u64::to_string).collect();
                println!("  Not found:         {}", skipped.join(", "));
            }
        }
    }

    Ok(())
}
