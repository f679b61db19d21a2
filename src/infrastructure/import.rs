//! Load raw events from disk for batch ingestion.
//!
//! Accepts either a JSON array of event objects or newline-delimited JSON
//! (one object per line). Records that fail to deserialize are reported
//! per line/index and do not abort the file.

use std::path::Path;

use crate::domain::entities::event::RawEvent;
use crate::domain::error::DomainError;

#[derive(Debug, Default)]
pub struct ImportBatch {
    pub records: Vec<RawEvent>,
    pub errors: Vec<String>,
}

pub fn load_raw_events(path: &Path) -> Result<ImportBatch, DomainError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| DomainError::Io(format!("{}: {e}", path.display())))?;
    parse_raw_events(&content)
}

pub fn parse_raw_events(content: &str) -> Result<ImportBatch, DomainError> {
    let trimmed = content.trim_start();
    if trimmed.is_empty() {
        return Ok(ImportBatch::default());
    }

    if trimmed.starts_with('[') {
        let values: Vec<serde_json::Value> = serde_json::from_str(trimmed)?;
        let mut batch = ImportBatch::default();
        for (i, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<RawEvent>(value) {
                Ok(raw) => batch.records.push(raw),
                Err(e) => batch.errors.push(format!("record {i}: {e}")),
            }
        }
        return Ok(batch);
    }

    let mut batch = ImportBatch::default();
    for (n, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<RawEvent>(line) {
            Ok(raw) => batch.records.push(raw),
            Err(e) => batch.errors.push(format!("line {}: {e}", n + 1)),
        }
    }
    Ok(batch)
}
