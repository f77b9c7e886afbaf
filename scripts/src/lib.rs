//! Scripts for deploying, upgrading, and auditing the protocol contracts.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod cli;
mod commands;
