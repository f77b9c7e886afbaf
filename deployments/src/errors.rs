//! Definitions of errors that can occur while deploying and tracking contracts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur while deploying, upgrading, or tracking contracts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployError {
    /// The address book file has an invalid shape
    MalformedRegistry(String),
    /// Error reading the address book file
    ReadRegistry(String),
    /// Error writing the address book file
    WriteRegistry(String),
    /// The sender is not connected to a network
    NoProvider(String),
    /// A contract the operation depends on has no address book entry
    MissingDeployment(String),
    /// No artifact exists for the requested contract
    ArtifactNotFound(String),
    /// Error parsing a compilation artifact
    ArtifactParsing(String),
    /// Error resolving library placeholders in bytecode
    Linking(String),
    /// Error constructing calldata for a contract method
    CalldataConstruction(String),
    /// A transaction was rejected or reverted
    ChainSubmission(String),
    /// Error reading state from the chain
    ChainQuery(String),
    /// Error initializing the RPC client
    ClientInitialization(String),
}

impl DeployError {
    /// Whether the condition must abort the invocation.
    ///
    /// A failed address book write is the only recoverable condition: the
    /// in-memory address book stays authoritative for the rest of the process.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, DeployError::WriteRegistry(_))
    }
}

impl Display for DeployError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DeployError::MalformedRegistry(s) => write!(f, "malformed address book: {}", s),
            DeployError::ReadRegistry(s) => write!(f, "error reading address book: {}", s),
            DeployError::WriteRegistry(s) => write!(f, "error writing address book: {}", s),
            DeployError::NoProvider(s) => write!(f, "sender has no provider: {}", s),
            DeployError::MissingDeployment(s) => write!(f, "contract not deployed: {}", s),
            DeployError::ArtifactNotFound(s) => write!(f, "artifact not found: {}", s),
            DeployError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            DeployError::Linking(s) => write!(f, "error linking libraries: {}", s),
            DeployError::CalldataConstruction(s) => write!(f, "error constructing calldata: {}", s),
            DeployError::ChainSubmission(s) => write!(f, "transaction failed: {}", s),
            DeployError::ChainQuery(s) => write!(f, "error querying chain: {}", s),
            DeployError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
        }
    }
}

impl Error for DeployError {}
