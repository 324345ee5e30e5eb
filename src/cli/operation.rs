//! Operation CLI commands
//!
//! Import from the trade-entry extract, paginated listing, and details.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use chrono::Local;
use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_operation_details, format_operation_list};
use crate::error::{CuadreError, CuadreResult};
use crate::models::Direction;
use crate::services::{ImportService, OperationFilter, OperationService, ReconciliationService};
use crate::storage::Storage;

/// Operation subcommands
#[derive(Subcommand)]
pub enum OperationCommands {
    /// Import operations from a CSV extract
    Import {
        /// Path to the CSV file
        file: PathBuf,
    },
    /// List operations with their reconciliation status
    List {
        /// Substring of the customer's names, documents or email
        #[arg(short, long)]
        search: Option<String>,
        /// Customer type (persona, empresa, ...)
        #[arg(short = 't', long)]
        customer_type: Option<String>,
        /// Direction (buy/compra, sell/venta)
        #[arg(short, long)]
        direction: Option<String>,
        /// Month name within the current year (enero, february, ...)
        #[arg(short, long)]
        month: Option<String>,
        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: usize,
        /// Page size (defaults to the configured page size)
        #[arg(short, long)]
        limit: Option<usize>,
        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show an operation with its entries
    Show {
        /// Operation number or ID
        operation: String,
    },
}

/// Handle an operation command
pub fn handle_operation_command(
    storage: &Storage,
    settings: &Settings,
    cmd: OperationCommands,
) -> CuadreResult<()> {
    let service = OperationService::new(storage);

    match cmd {
        OperationCommands::Import { file } => {
            let handle = File::open(&file).map_err(|e| {
                CuadreError::Import(format!("Failed to open {}: {}", file.display(), e))
            })?;
            let result = ImportService::new(storage).import_csv(BufReader::new(handle))?;

            println!("Imported {} operation(s)", result.imported);
            if result.duplicates_skipped > 0 {
                println!("  Skipped {} already imported", result.duplicates_skipped);
            }
            if result.customers_created > 0 {
                println!("  Created {} customer(s)", result.customers_created);
            }
            if result.errors > 0 {
                println!("  {} row(s) with errors:", result.errors);
                for (line, message) in &result.error_messages {
                    println!("    line {}: {}", line, message);
                }
            }
        }

        OperationCommands::List {
            search,
            customer_type,
            direction,
            month,
            page,
            limit,
            json,
        } => {
            let direction = direction
                .map(|d| {
                    Direction::parse(&d).ok_or_else(|| {
                        CuadreError::Validation(format!(
                            "Invalid direction: '{}'. Use buy or sell",
                            d
                        ))
                    })
                })
                .transpose()?;

            let filter = OperationFilter {
                search,
                customer_type,
                direction,
                month,
            };
            let limit = limit.unwrap_or(settings.default_page_size);
            let result = service.list(&filter, page, limit, Local::now().date_naive())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!(
                    "{}",
                    format_operation_list(&result, &settings.display_date_format)
                );
            }
        }

        OperationCommands::Show { operation } => {
            let found = service.require(&operation)?;
            let details = match ReconciliationService::new(storage).fetch_by_operation(found.id) {
                Ok(details) => Some(details),
                Err(e) if e.is_not_found() => None,
                Err(e) => return Err(e),
            };
            let summary = service.summary(found)?;

            print!(
                "{}",
                format_operation_details(&summary, details.as_ref(), &settings.display_date_format)
            );
        }
    }

    Ok(())
}
