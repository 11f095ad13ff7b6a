//! Partition table entries and the region an image is written to

use serde::Serialize;

/// Bytes at the start of a FatFS partition kept back for filesystem headers
pub const DEFAULT_RESERVATION: u64 = 4096;

/// One `name, type, subtype, offset, size` row of a partition table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionEntry {
    pub name: String,
    pub ty: String,
    pub subtype: String,
    /// Offset in bytes from the start of flash
    pub offset: u64,
    /// Size in bytes
    pub size: u64,
}

impl PartitionEntry {
    /// Shift the start and shrink the size by `reservation` bytes.
    ///
    /// A size not larger than the reservation resolves to zero, which callers
    /// treat as unusable.
    pub fn resolve(&self, reservation: u64) -> ResolvedPartition {
        ResolvedPartition {
            offset: self.offset.saturating_add(reservation),
            size: self.size.saturating_sub(reservation),
            reservation,
        }
    }
}

/// The flash region the image is built for and written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedPartition {
    pub offset: u64,
    pub size: u64,
    pub reservation: u64,
}
