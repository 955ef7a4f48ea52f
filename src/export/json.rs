//! JSON serialization of word records.

use crate::error::{Error, Result};
use crate::model::ExportRecord;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

/// JSON output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Indented with 4 spaces
    #[default]
    Pretty,
    /// Single line
    Compact,
}

/// Serialize a record. Non-ASCII text is written as-is, not escaped.
pub fn to_json(record: &ExportRecord, format: JsonFormat) -> Result<String> {
    let bytes = match format {
        JsonFormat::Pretty => {
            let mut buf = Vec::new();
            let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
            let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
            record.serialize(&mut serializer)?;
            buf
        }
        JsonFormat::Compact => serde_json::to_vec(record)?,
    };

    String::from_utf8(bytes).map_err(|e| Error::Serialize(e.to_string()))
}

/// Write a record to `path`.
///
/// The JSON goes to a temporary file next to `path` first and is renamed
/// into place, so readers never observe a partial file.
pub fn write_record(record: &ExportRecord, path: &Path, format: JsonFormat) -> Result<()> {
    let json = to_json(record, format)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::Builder::new()
        .prefix(".wordocr-")
        .suffix(".json.tmp")
        .tempfile_in(dir)?;
    file.write_all(json.as_bytes())?;
    file.flush()?;
    file.persist(path).map_err(|e| e.error)?;

    log::info!("wrote {} word(s) to {}", record.len(), path.display());
    Ok(())
}

/// Read a record written by [`write_record`].
pub fn read_record(path: &Path) -> Result<ExportRecord> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
