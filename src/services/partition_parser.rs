//! Partition table scanning
//!
//! ESP32 partition tables are CSV with `name, type, subtype, offset, size`
//! columns. Only the line carrying the FatFS tag matters; every other line,
//! headers and comments included, is skipped.

use crate::config::AppConfig;
use crate::errors::{EspFatfsError, Result};
use crate::models::{PartitionEntry, ResolvedPartition};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct PartitionTableParser {
    tag: String,
    reservation: u64,
}

impl PartitionTableParser {
    pub fn new(tag: impl Into<String>, reservation: u64) -> Self {
        Self {
            tag: tag.into(),
            reservation,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.partition_tag.clone(), config.reservation)
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Scan every line and keep the last one containing the tag.
    ///
    /// A tagged line that is not a valid entry fails the scan immediately.
    pub fn find_entry(&self, text: &str) -> Result<Option<PartitionEntry>> {
        let mut found = None;
        for line in text.lines() {
            if line.contains(&self.tag) {
                let entry = parse_entry(line)?;
                log::trace!("Tagged partition line: {:?}", entry);
                found = Some(entry);
            }
        }
        Ok(found)
    }

    /// Locate the tagged entry and apply the reservation
    pub fn parse(&self, text: &str) -> Result<ResolvedPartition> {
        let resolved = self
            .find_entry(text)?
            .map(|entry| entry.resolve(self.reservation))
            .filter(|resolved| resolved.size > 0)
            .ok_or_else(|| EspFatfsError::PartitionNotFound(self.tag.clone()))?;

        log::debug!(
            "Resolved '{}' partition: offset 0x{:X}, size 0x{:X}",
            self.tag,
            resolved.offset,
            resolved.size
        );
        Ok(resolved)
    }

    pub fn parse_file(&self, path: &Path) -> Result<ResolvedPartition> {
        if !path.is_file() {
            return Err(EspFatfsError::PartitionsFileMissing(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        self.parse(&text)
    }
}

/// Read one `name, type, subtype, offset, size[, ...]` line
pub fn parse_entry(line: &str) -> Result<PartitionEntry> {
    let invalid = |reason: String| EspFatfsError::InvalidPartitionEntry {
        line: line.trim().to_string(),
        reason,
    };

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < 5 {
        return Err(invalid(format!(
            "expected at least 5 fields, found {}",
            fields.len()
        )));
    }

    let offset = parse_number(fields[3])
        .ok_or_else(|| invalid(format!("offset '{}' is not a number", fields[3])))?;
    let size = parse_number(fields[4])
        .ok_or_else(|| invalid(format!("size '{}' is not a number", fields[4])))?;

    Ok(PartitionEntry {
        name: fields[0].to_string(),
        ty: fields[1].to_string(),
        subtype: fields[2].to_string(),
        offset,
        size,
    })
}

/// Decimal, or hexadecimal with a `0x` prefix
pub fn parse_number(text: &str) -> Option<u64> {
    let text = text.trim();
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}
