//! The address book: a per-network record of every deployed contract.
//!
//! The whole file is read once when the address book is opened and rewritten
//! on every [`AddressBook::set_entry`]. There is no locking: if two processes
//! hold the same file open, the last writer's document wins. The format
//! assumes a single writer per network per run.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::{
    errors::DeployError,
    types::{AddressBookJson, DeploymentRecord},
};

/// An address book opened for a single network
#[derive(Debug)]
pub struct AddressBook {
    /// The path of the address book file
    file: PathBuf,
    /// The network whose entries this address book reads and writes
    chain_id: String,
    /// The contents of the whole file, all networks included
    address_book: AddressBookJson,
}

impl AddressBook {
    /// Open the address book at `file` for the given network.
    ///
    /// The file must exist; an empty file is read as an empty address book.
    /// A network with no entries yet gets an empty in-memory entry list, which
    /// is only written out by the next [`AddressBook::set_entry`].
    pub fn open(file: impl AsRef<Path>, chain_id: impl ToString) -> Result<Self, DeployError> {
        let file = file.as_ref().to_path_buf();
        let contents = fs::read_to_string(&file)
            .map_err(|e| DeployError::ReadRegistry(format!("{}: {}", file.display(), e)))?;

        let mut address_book = parse_address_book(&contents)?;
        let chain_id = chain_id.to_string();
        address_book.entry(chain_id.clone()).or_default();

        debug!(
            "Opened address book {} for chain {}",
            file.display(),
            chain_id
        );
        Ok(Self {
            file,
            chain_id,
            address_book,
        })
    }

    /// The path of the address book file
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// The network this address book was opened for
    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// The names of every contract recorded for this network
    pub fn list_entries(&self) -> Vec<String> {
        self.entries()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Get the entry for a contract.
    ///
    /// A contract without an entry yields a record at the zero address, so a
    /// missing contract is never an error.
    pub fn get_entry(&self, name: &str) -> DeploymentRecord {
        self.entries()
            .and_then(|entries| entries.get(name))
            .cloned()
            .unwrap_or_else(DeploymentRecord::missing)
    }

    /// Replace the entry for a contract and write the address book to disk.
    ///
    /// A failed write is logged and otherwise ignored; the in-memory entry
    /// remains authoritative for the rest of the process.
    pub fn set_entry(&mut self, name: &str, entry: DeploymentRecord) {
        self.address_book
            .entry(self.chain_id.clone())
            .or_default()
            .insert(name.to_string(), entry);

        if let Err(e) = self.persist() {
            warn!("Error saving address book entry for {}: {}", name, e);
        }
    }

    /// The entries of this network
    fn entries(&self) -> Option<&BTreeMap<String, DeploymentRecord>> {
        self.address_book.get(&self.chain_id)
    }

    /// Write the whole address book back to its file
    fn persist(&self) -> Result<(), DeployError> {
        let contents = serde_json::to_string_pretty(&self.address_book)
            .map_err(|e| DeployError::WriteRegistry(e.to_string()))?;
        fs::write(&self.file, contents)
            .map_err(|e| DeployError::WriteRegistry(format!("{}: {}", self.file.display(), e)))
    }
}

/// Parse and validate the contents of an address book file
pub fn parse_address_book(contents: &str) -> Result<AddressBookJson, DeployError> {
    if contents.trim().is_empty() {
        return Ok(AddressBookJson::new());
    }

    serde_json::from_str(contents).map_err(|e| DeployError::MalformedRegistry(e.to_string()))
}
