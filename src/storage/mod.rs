pub mod document;
pub mod json_backend;

use std::path::Path;

use crate::{errors::Result, ledger::Ledger};

/// Abstraction over persistence backends capable of storing ledgers and
/// their backups.
pub trait StorageBackend: Send + Sync {
    fn save(&self, ledger: &Ledger, name: &str) -> Result<()>;
    fn load(&self, name: &str) -> Result<Ledger>;
    fn list_backups(&self, name: &str) -> Result<Vec<String>>;
    fn restore(&self, name: &str, backup_name: &str) -> Result<Ledger>;

    /// Optional helpers for ad-hoc file operations. Default implementations
    /// forward to the JSON document format.
    fn save_to_path(&self, ledger: &Ledger, path: &Path) -> Result<()> {
        json_backend::save_ledger_to_path(ledger, path)
    }

    fn load_from_path(&self, path: &Path) -> Result<Ledger> {
        json_backend::load_ledger_from_path(path)
    }
}

pub use document::{LedgerDocument, DOCUMENT_SCHEMA_VERSION};
pub use json_backend::{ledger_warnings, JsonStorage};
