//! Report CLI commands

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};

use crate::config::Settings;
use crate::error::{CuadreError, CuadreResult};
use crate::reports::{DirectionFilter, ReconciliationReport};
use crate::services::OperationService;
use crate::storage::Storage;

/// Spreadsheet format of the export
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Excel workbook with numeric amount cells
    Xlsx,
    /// Plain CSV with the same columns
    Csv,
}

impl ReportFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }
}

/// Report subcommands
#[derive(Subcommand)]
pub enum ReportCommands {
    /// Export the reconciliation spreadsheet
    Export {
        /// Direction to include (todos, buy, sell)
        #[arg(short, long, default_value = "todos")]
        direction: String,
        /// Spreadsheet format
        #[arg(short, long, value_enum, default_value = "xlsx")]
        format: ReportFormat,
        /// Output file (defaults to the exports directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the report rows of a single operation
    Show {
        /// Operation number or ID
        operation: String,
    },
}

/// Handle a report command
pub fn handle_report_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ReportCommands,
) -> CuadreResult<()> {
    match cmd {
        ReportCommands::Export {
            direction,
            format,
            output,
        } => {
            let filter = DirectionFilter::parse(&direction)?;
            let report = ReconciliationReport::generate(storage, filter)?;

            let output = match output {
                Some(path) => path,
                None => {
                    let dir = storage.paths().exports_dir();
                    fs::create_dir_all(&dir)?;
                    dir.join(&settings.export_file_name)
                        .with_extension(format.extension())
                }
            };

            match format {
                ReportFormat::Xlsx => report.export_xlsx(&output)?,
                ReportFormat::Csv => {
                    let file = File::create(&output).map_err(|e| {
                        CuadreError::Export(format!(
                            "Failed to create file {}: {}",
                            output.display(),
                            e
                        ))
                    })?;
                    report.export_csv(BufWriter::new(file))?;
                }
            }

            println!(
                "Exported {} operation(s), {} row(s) to: {}",
                report.operation_count,
                report.rows.len(),
                output.display()
            );
        }

        ReportCommands::Show { operation } => {
            let op = OperationService::new(storage).require(&operation)?;
            let report = ReconciliationReport::for_operation(storage, &op)?;
            println!("{}", report.format_terminal());
        }
    }

    Ok(())
}
