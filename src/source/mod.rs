//! Source adapters: turn CSV files and Google Sheets ranges into validated
//! [`RawTable`]s. Everything that touches the outside world lives here.

pub mod csv_file;
pub mod sheets;

use crate::model::{RawTable, Schema};
use std::fmt;
use thiserror::Error;

pub use sheets::SheetsClient;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot read `{path}`: {source}")]
    Read {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("Google Sheets request failed: {0}")]
    Remote(#[from] reqwest::Error),
    #[error("Google Sheets rejected the request ({status}): check the access token or API key")]
    Unauthorized { status: u16 },
    #[error("invalid Google Sheets address: {0}")]
    Address(String),
    #[error("{table} table `{source_name}` is missing required columns: {}", .columns.join(", "))]
    MissingColumns {
        table: &'static str,
        source_name: String,
        columns: Vec<String>,
    },
}

/// Where a table comes from.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Source {
    Csv { path: String },
    Sheet { spreadsheet_id: String, range: String },
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Csv { path } => write!(f, "{path}"),
            Source::Sheet {
                spreadsheet_id,
                range,
            } => write!(f, "sheet {spreadsheet_id}!{range}"),
        }
    }
}

/// Outcome of a successful read: a table, or nothing to read.
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded {
    Table(RawTable),
    NoData,
}

impl Source {
    pub async fn load(
        &self,
        schema: &Schema,
        client: &SheetsClient,
    ) -> Result<Loaded, SourceError> {
        log::debug!("loading {} table from {}", schema.name, self);
        let table = match self {
            Source::Csv { path } => csv_file::read_table(path)?,
            Source::Sheet {
                spreadsheet_id,
                range,
            } => match client.read_range(spreadsheet_id, range).await? {
                Some(table) => table,
                None => {
                    log::warn!("no data found in {}", self);
                    return Ok(Loaded::NoData);
                }
            },
        };
        validate(table, schema, &self.to_string()).map(Loaded::Table)
    }
}

pub fn validate(
    table: RawTable,
    schema: &Schema,
    source_name: &str,
) -> Result<RawTable, SourceError> {
    let columns = schema.missing_columns(&table);
    if !columns.is_empty() {
        return Err(SourceError::MissingColumns {
            table: schema.name,
            source_name: source_name.to_string(),
            columns,
        });
    }
    log::info!(
        "loaded {} table from {} ({} rows)",
        schema.name,
        source_name,
        table.rows.len()
    );
    Ok(table)
}
