//! Output formatting utilities

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::OutputFormat;
use crate::core::entity::{Record, RecordId};

/// Print a list in the requested format
///
/// `to_row` builds the table/CSV row; JSON and YAML serialize the items
/// themselves so no field is lost.
pub fn print_list<T, R>(
    items: &[T],
    format: OutputFormat,
    noun: &str,
    id_of: impl Fn(&T) -> RecordId,
    to_row: impl Fn(&T) -> R,
) -> Result<()>
where
    T: Serialize,
    R: Tabled + Serialize,
{
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(items).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            for item in items {
                writer.serialize(to_row(item)).into_diagnostic()?;
            }
            writer.flush().into_diagnostic()?;
        }
        OutputFormat::Id => {
            for item in items {
                println!("{}", id_of(item));
            }
        }
        OutputFormat::Auto => {
            if items.is_empty() {
                println!("No {} found.", noun);
                return Ok(());
            }
            let mut table = Table::new(items.iter().map(&to_row));
            table.with(Style::rounded());
            println!("{}", table);
            println!("{} {}(s) found", style(items.len()).cyan(), noun);
        }
    }
    Ok(())
}

/// Print a list of stored records
pub fn print_records<T, R>(
    items: &[T],
    format: OutputFormat,
    to_row: impl Fn(&T) -> R,
) -> Result<()>
where
    T: Record,
    R: Tabled + Serialize,
{
    print_list(items, format, T::KIND, |item| item.id(), to_row)
}

/// Print one record; `pretty` renders the default human view
pub fn print_record<T: Record>(
    record: &T,
    format: OutputFormat,
    pretty: impl FnOnce(&T),
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(record).into_diagnostic()?);
        }
        OutputFormat::Yaml | OutputFormat::Csv => {
            print!("{}", serde_yml::to_string(record).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", record.id()),
        OutputFormat::Auto => pretty(record),
    }
    Ok(())
}

/// Print any serializable value; `pretty` renders the default human view
pub fn print_value<T: Serialize>(
    value: &T,
    format: OutputFormat,
    pretty: impl FnOnce(&T),
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
        }
        OutputFormat::Yaml | OutputFormat::Csv | OutputFormat::Id => {
            print!("{}", serde_yml::to_string(value).into_diagnostic()?);
        }
        OutputFormat::Auto => pretty(value),
    }
    Ok(())
}

/// Confirmation line after a mutation
pub fn print_done<T: Record>(verb: &str, record: &T, format: OutputFormat) -> Result<()> {
    print_record(record, format, |r| {
        println!(
            "{} {} {} {} {}",
            style("✓").green(),
            verb,
            T::KIND,
            style(format!("#{}", r.id())).cyan(),
            style(r.label()).yellow()
        );
    })
}

/// Heading rule used by the detail views
pub fn rule() {
    println!("{}", style("─".repeat(60)).dim());
}

/// One `Label: value` line of a detail view
pub fn field(label: &str, value: impl std::fmt::Display) {
    println!("{}: {}", style(label).bold(), value);
}
