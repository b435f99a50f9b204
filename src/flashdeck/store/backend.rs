use crate::error::Result;

/// Abstract interface for raw record I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while [`super::Persistence`] handles the "what" (records, encoding, failure policy).
pub trait StorageBackend {
    /// Read a record's raw text.
    /// Returns Ok(None) if the record does not exist.
    /// Returns Err only on actual I/O errors (permissions, disk failure).
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Write a record.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn write(&self, key: &str, contents: &str) -> Result<()>;

    /// Remove a record. Removing a missing record is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Human readable description of where records live, for diagnostics.
    fn location(&self) -> String;
}
