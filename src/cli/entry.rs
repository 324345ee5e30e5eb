//! Reconciliation entry CLI commands

use clap::{Args, Subcommand};

use crate::config::Settings;
use crate::display::format_operation_details;
use crate::error::{CuadreError, CuadreResult};
use crate::models::Currency;
use crate::services::{EntryInput, OperationService, ReconciliationService};
use crate::storage::Storage;

/// Fields shared by `add` and `edit`
#[derive(Args)]
pub struct EntryArgs {
    /// Settlement date (DD/MM/YYYY)
    #[arg(short, long)]
    pub date: String,
    /// Signed amount (e.g., "-2000.00")
    #[arg(short, long, allow_hyphen_values = true)]
    pub amount: String,
    /// Free-text description (bank, channel)
    #[arg(long, default_value = "")]
    pub description: String,
    /// Bank reference
    #[arg(short, long, default_value = "")]
    pub reference: String,
    /// Difference noted by the operator
    #[arg(long, allow_hyphen_values = true)]
    pub difference: Option<String>,
}

impl From<EntryArgs> for EntryInput {
    fn from(args: EntryArgs) -> Self {
        Self {
            date: args.date,
            description: args.description,
            amount: args.amount,
            reference: args.reference,
            difference: args.difference,
        }
    }
}

/// Entry subcommands
#[derive(Subcommand)]
pub enum EntryCommands {
    /// Register a USD or PEN entry for an operation
    Add {
        /// Currency (usd, pen)
        currency: String,
        /// Operation number or ID
        operation: String,
        #[command(flatten)]
        fields: EntryArgs,
    },
    /// Overwrite an existing entry
    Edit {
        /// Currency (usd, pen)
        currency: String,
        /// Entry ID, or a unique prefix together with --operation
        entry: String,
        /// Operation the entry belongs to, for prefix lookup
        #[arg(short, long)]
        operation: Option<String>,
        #[command(flatten)]
        fields: EntryArgs,
    },
    /// Show the entries of an operation
    Show {
        /// Operation number or ID
        operation: String,
    },
}

fn parse_currency(s: &str) -> CuadreResult<Currency> {
    Currency::parse(s).ok_or_else(|| {
        CuadreError::Validation(format!("Invalid currency: '{}'. Use usd or pen", s))
    })
}

/// Handle an entry command
pub fn handle_entry_command(
    storage: &Storage,
    settings: &Settings,
    cmd: EntryCommands,
) -> CuadreResult<()> {
    let operations = OperationService::new(storage);
    let service = ReconciliationService::new(storage);

    match cmd {
        EntryCommands::Add {
            currency,
            operation,
            fields,
        } => {
            let currency = parse_currency(&currency)?;
            let op = operations.require(&operation)?;
            let fields = EntryInput::from(fields).parse(&settings.entry_date_format)?;

            let entry = service.register(op.id, currency, fields)?;
            println!("Registered {} entry for operation {}", currency, op.label());
            println!("  Amount: {}", entry.amount);
            println!("  Date:   {}", entry.date.format(&settings.display_date_format));
            println!("  ID:     {}", entry.id);
        }

        EntryCommands::Edit {
            currency,
            entry,
            operation,
            fields,
        } => {
            let currency = parse_currency(&currency)?;
            let details = match operation {
                Some(op) => {
                    let op = operations.require(&op)?;
                    Some(service.fetch_by_operation(op.id)?)
                }
                None => None,
            };
            let entry_id = service
                .find_entry_id(details.as_ref(), &entry)
                .ok_or_else(|| CuadreError::entry_not_found(currency.entry_label(), &entry))?;
            let fields = EntryInput::from(fields).parse(&settings.entry_date_format)?;

            let updated = service.edit(entry_id, currency, fields)?;
            println!("Updated {} entry {}", currency, updated.id.short());
            println!("  Amount: {}", updated.amount);
        }

        EntryCommands::Show { operation } => {
            let op = operations.require(&operation)?;
            let details = service.fetch_by_operation(op.id)?;
            let summary = operations.summary(op)?;
            print!(
                "{}",
                format_operation_details(&summary, Some(&details), &settings.display_date_format)
            );
        }
    }

    Ok(())
}
