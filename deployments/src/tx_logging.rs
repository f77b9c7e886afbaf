//! A [`Transact`] decorator logging every call it submits.
//!
//! Lines are emitted through `tracing` and, when a log directory is set,
//! appended to a daily `tx-YYYY-MM-DD.log` file in that directory.

use std::{fs::OpenOptions, io::Write, ops::Deref, path::PathBuf};

use chrono::{SecondsFormat, Utc};
use itertools::Itertools;
use tracing::{error, info, warn};

use crate::{
    client::{Sender, TxReceipt},
    constants::{TX_LOG_FILE_EXTENSION, TX_LOG_FILE_PREFIX},
    contract::{ContractCall, SubmittedCall, Transact},
    errors::DeployError,
};

/// Wraps a handle so that every call it submits is logged, awaited, and its
/// outcome logged
#[derive(Clone, Debug)]
pub struct CallLogger<T> {
    /// The wrapped handle
    inner: T,
    /// The directory of the transaction log files, if any
    log_dir: Option<PathBuf>,
}

impl<T: Transact> CallLogger<T> {
    /// Log the calls of `inner`, appending to files in `log_dir` if set
    pub fn new(inner: T, log_dir: Option<PathBuf>) -> Self {
        Self { inner, log_dir }
    }

    /// Log a submitted call
    fn log_call(&self, submitted: &SubmittedCall) {
        let contract = submitted
            .to
            .map(|to| format!("{:#x}", to))
            .unwrap_or_else(|| "<create>".to_string());

        self.log(&[
            format!("> Sent transaction {}.{}", self.inner.name(), submitted.function),
            format!("   sender: {:#x}", submitted.from),
            format!("   contract: {}", contract),
            format!("   params: [ {} ]", submitted.args.iter().join(", ")),
            format!("   txHash: {:#x}", submitted.tx_hash),
        ]);
    }

    /// Log the outcome of an included call
    fn log_receipt(&self, receipt: &TxReceipt) {
        let line = if receipt.status {
            format!("✔ Transaction succeeded: {:#x}", receipt.tx_hash)
        } else {
            error!("Transaction {:#x} reverted", receipt.tx_hash);
            format!("✖ Transaction failed: {:#x}", receipt.tx_hash)
        };
        self.log(&[line]);
    }

    /// Emit lines to the console and the day's log file
    fn log(&self, lines: &[String]) {
        let now = Utc::now();
        for line in lines {
            info!("{}", line);
        }

        let Some(log_dir) = &self.log_dir else {
            return;
        };
        let path = log_dir.join(format!(
            "{}{}.{}",
            TX_LOG_FILE_PREFIX,
            now.format("%Y-%m-%d"),
            TX_LOG_FILE_EXTENSION
        ));
        let timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);

        let res = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut file| {
                lines
                    .iter()
                    .try_for_each(|line| writeln!(file, "[{}] {}", timestamp, line))
            });
        if let Err(e) = res {
            warn!("Error appending to {}: {}", path.display(), e);
        }
    }
}

impl<T> Deref for CallLogger<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: Transact> Transact for CallLogger<T> {
    type Client = T::Client;

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn sender(&self) -> &Sender<Self::Client> {
        self.inner.sender()
    }

    async fn submit(&self, call: ContractCall) -> Result<SubmittedCall, DeployError> {
        let submitted = self.inner.submit(call).await?;
        self.log_call(&submitted);

        let receipt = self.inner.wait(&submitted).await?;
        self.log_receipt(&receipt);
        Ok(submitted)
    }

    async fn wait(&self, submitted: &SubmittedCall) -> Result<TxReceipt, DeployError> {
        self.inner.wait(submitted).await
    }

    fn connect(&self, sender: Sender<Self::Client>) -> Self {
        Self {
            inner: self.inner.connect(sender),
            log_dir: self.log_dir.clone(),
        }
    }
}
