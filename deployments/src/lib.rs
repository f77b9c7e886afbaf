//! Deployment tooling for a multi-contract protocol: the per-network address
//! book, library-aware deployments, proxied deployments and their acceptance
//! by the proxy admin, and integrity checks of recorded deployments.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod address_book;
pub mod artifacts;
pub mod chain;
pub mod client;
pub mod constants;
pub mod contract;
pub mod deploy;
pub mod errors;
pub mod proxy;
mod solidity;
pub mod tx_logging;
pub mod types;
pub mod utils;
pub mod verify;

#[cfg(test)]
mod test_helpers;
