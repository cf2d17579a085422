use crate::error::Result;
use crate::results::ContactRecord;
use crate::utils::sibling_path;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
    Both,
}

/// Records as a pretty-printed JSON array
pub fn write_json<W: Write>(records: &[ContactRecord], writer: W) -> Result<()> {
    let mut writer = writer;
    serde_json::to_writer_pretty(&mut writer, records)?;
    writeln!(writer)?;
    Ok(())
}

/// Records as CSV with one column per key seen in any record, sorted by name.
///
/// Lists and objects become JSON text, null becomes an empty cell. Nothing is
/// written when there are no records. Returns whether anything was written.
pub fn write_csv<W: Write>(records: &[ContactRecord], writer: W) -> Result<bool> {
    if records.is_empty() {
        ::log::warn!("No records to write as CSV");
        return Ok(false);
    }

    let rows = records
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<Vec<Value>, _>>()?;

    let columns: BTreeSet<&str> = rows
        .iter()
        .filter_map(Value::as_object)
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(&columns)?;
    for row in &rows {
        csv.write_record(columns.iter().map(|column| cell(row.get(*column))))?;
    }
    csv.flush()?;
    Ok(true)
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Write records in the chosen format and return the files created.
///
/// JSON goes to `path`. CSV goes to `path` with a `.csv` extension, and
/// `Both` writes `.json` and `.csv` siblings.
pub fn write_output(
    records: &[ContactRecord],
    path: &Path,
    format: OutputFormat,
) -> Result<Vec<PathBuf>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut written = Vec::new();
    let (json_path, csv_path) = match format {
        OutputFormat::Json => (Some(path.to_path_buf()), None),
        OutputFormat::Csv => (None, Some(sibling_path(path, "csv"))),
        OutputFormat::Both => (
            Some(sibling_path(path, "json")),
            Some(sibling_path(path, "csv")),
        ),
    };

    if let Some(json_path) = json_path {
        write_json(records, BufWriter::new(File::create(&json_path)?))?;
        ::log::info!("Wrote {} record(s) to {}", records.len(), json_path.display());
        written.push(json_path);
    }

    if let Some(csv_path) = csv_path {
        if records.is_empty() {
            ::log::warn!("No records, skipping {}", csv_path.display());
        } else {
            write_csv(records, BufWriter::new(File::create(&csv_path)?))?;
            ::log::info!("Wrote {} record(s) to {}", records.len(), csv_path.display());
            written.push(csv_path);
        }
    }

    Ok(written)
}
