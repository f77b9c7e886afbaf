//! The chain client used by the deployment tooling, and the sender identity
//! transactions are submitted from

use std::{str::FromStr, time::Duration};

use alloy::{
    network::EthereumWallet,
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{BlockNumberOrTag, TransactionRequest},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use alloy_primitives::{Address, Bytes, TxHash};
use tracing::debug;

use crate::{constants::RECEIPT_POLL_INTERVAL, errors::DeployError};

/// The receipt of an included transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxReceipt {
    /// The hash of the transaction
    pub tx_hash: TxHash,
    /// The sender of the transaction
    pub from: Address,
    /// The callee, `None` for a contract creation
    pub to: Option<Address>,
    /// The address of the created contract, if any
    pub contract_address: Option<Address>,
    /// Whether the transaction succeeded
    pub status: bool,
    /// The block the transaction was included in
    pub block_number: Option<u64>,
}

/// The chain operations the deployment tooling relies on.
///
/// Every method suspends until the node answers; there is no timeout beyond
/// whatever the underlying transport imposes.
#[allow(async_fn_in_trait)]
pub trait ChainClient: Clone {
    /// Submit a transaction, returning its hash once the node has accepted it
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, DeployError>;

    /// Fetch the receipt of a transaction, `None` while it is still pending
    async fn transaction_receipt(&self, tx_hash: TxHash)
        -> Result<Option<TxReceipt>, DeployError>;

    /// Fetch the code deployed at an address
    async fn code_at(&self, address: Address) -> Result<Bytes, DeployError>;

    /// Fetch the current block number
    async fn block_number(&self) -> Result<u64, DeployError>;

    /// Fetch the base fee of the latest block, if the chain has one
    async fn base_fee(&self) -> Result<Option<u128>, DeployError>;

    /// Fetch the chain id of the network
    async fn chain_id(&self) -> Result<u64, DeployError>;

    /// The interval at which pending transactions are polled
    fn poll_interval(&self) -> Duration {
        RECEIPT_POLL_INTERVAL
    }

    /// Block until the transaction is included, returning its receipt
    async fn wait_for_transaction(&self, tx_hash: TxHash) -> Result<TxReceipt, DeployError> {
        loop {
            if let Some(receipt) = self.transaction_receipt(tx_hash).await? {
                return Ok(receipt);
            }
            debug!("Waiting for transaction {:#x}", tx_hash);
            tokio::time::sleep(self.poll_interval()).await;
        }
    }
}

/// The account deployments and calls are sent from, optionally connected
/// to a network
#[derive(Clone, Debug)]
pub struct Sender<C> {
    /// The address of the account
    address: Address,
    /// The client connected to the account's network
    client: Option<C>,
}

impl<C: ChainClient> Sender<C> {
    /// A sender connected to a network through the given client
    pub fn new(address: Address, client: C) -> Self {
        Self {
            address,
            client: Some(client),
        }
    }

    /// A sender with no network connection
    pub fn disconnected(address: Address) -> Self {
        Self {
            address,
            client: None,
        }
    }

    /// The sender's address
    pub fn address(&self) -> Address {
        self.address
    }

    /// The client connected to the sender's network
    pub fn client(&self) -> Result<&C, DeployError> {
        self.client.as_ref().ok_or_else(|| {
            DeployError::NoProvider(format!(
                "sender {:#x} must be connected to a provider",
                self.address
            ))
        })
    }

    /// The same account, connected through a different client
    pub fn connect(self, client: C) -> Self {
        Self {
            client: Some(client),
            ..self
        }
    }
}

// ----------------
// | Alloy Client |
// ----------------

/// A [`ChainClient`] backed by an alloy provider with a local wallet
#[derive(Clone)]
pub struct AlloyClient {
    /// The underlying provider, signing with the sender's key
    provider: DynProvider,
}

impl AlloyClient {
    /// Wrap an alloy provider
    pub fn new(provider: DynProvider) -> Self {
        Self { provider }
    }

    /// The underlying provider
    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }
}

impl ChainClient for AlloyClient {
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, DeployError> {
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| DeployError::ChainSubmission(e.to_string()))?;
        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<TxReceipt>, DeployError> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| DeployError::ChainQuery(e.to_string()))?;

        Ok(receipt.map(|receipt| TxReceipt {
            tx_hash: receipt.transaction_hash,
            from: receipt.from,
            to: receipt.to,
            contract_address: receipt.contract_address,
            status: receipt.status(),
            block_number: receipt.block_number,
        }))
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, DeployError> {
        self.provider
            .get_code_at(address)
            .await
            .map_err(|e| DeployError::ChainQuery(e.to_string()))
    }

    async fn block_number(&self) -> Result<u64, DeployError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| DeployError::ChainQuery(e.to_string()))
    }

    async fn base_fee(&self) -> Result<Option<u128>, DeployError> {
        let history = self
            .provider
            .get_fee_history(1, BlockNumberOrTag::Latest, &[])
            .await
            .map_err(|e| DeployError::ChainQuery(e.to_string()))?;
        Ok(history.latest_block_base_fee())
    }

    async fn chain_id(&self) -> Result<u64, DeployError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| DeployError::ChainQuery(e.to_string()))
    }
}

/// Set up a sender for the given private key, connected to the RPC url
pub async fn setup_client(
    priv_key: &str,
    rpc_url: &str,
) -> Result<Sender<AlloyClient>, DeployError> {
    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| DeployError::ClientInitialization(e.to_string()))?;
    let address = signer.address();

    let url = Url::parse(rpc_url).map_err(|e| DeployError::ClientInitialization(e.to_string()))?;
    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .on_http(url);
    let client = AlloyClient::new(DynProvider::new(provider));

    // Fail early if the RPC is unreachable
    let chain_id = client
        .chain_id()
        .await
        .map_err(|e| DeployError::ClientInitialization(e.to_string()))?;
    debug!("Connected {:#x} to chain {}", address, chain_id);

    Ok(Sender::new(address, client))
}
