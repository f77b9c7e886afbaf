//! Fixtures shared by the unit tests: artifact builders and an in-memory chain

use std::{
    collections::HashMap,
    fs,
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use alloy::{json_abi::JsonAbi, rpc::types::TransactionRequest};
use alloy_primitives::{hex, keccak256, Address, Bytes, TxHash, TxKind};
use serde_json::{json, Value};

use crate::{
    artifacts::{Artifact, ArtifactProvider, LinkOffset, LinkReferences},
    client::{ChainClient, Sender, TxReceipt},
    errors::DeployError,
};

/// The placeholder the compiler leaves for an unlinked library
pub const LIB_PLACEHOLDER: &str = "__$0123456789abcdef0123456789abcdef01$__";

/// The chain id reported by [`MockChain`]
pub const MOCK_CHAIN_ID: u64 = 1337;

/// The base fee reported by [`MockChain`]
pub const MOCK_BASE_FEE: u128 = 7;

// -------------
// | Artifacts |
// -------------

/// A function ABI entry
fn function_abi(name: &str, inputs: &[(&str, &str)]) -> Value {
    json!({
        "type": "function",
        "name": name,
        "inputs": params_abi(inputs),
        "outputs": [],
        "stateMutability": "nonpayable",
    })
}

/// A constructor ABI entry
fn constructor_abi(inputs: &[(&str, &str)]) -> Value {
    json!({
        "type": "constructor",
        "inputs": params_abi(inputs),
        "stateMutability": "nonpayable",
    })
}

/// The ABI entries of a parameter list
fn params_abi(inputs: &[(&str, &str)]) -> Value {
    inputs
        .iter()
        .map(|(name, ty)| json!({ "name": name, "type": ty, "internalType": ty }))
        .collect()
}

/// Build an artifact from its ABI entries and hex bytecode
fn artifact(name: &str, abi: Vec<Value>, bytecode: String, links: LinkReferences) -> Artifact {
    Artifact {
        contract_name: name.to_string(),
        abi: serde_json::from_value::<JsonAbi>(Value::Array(abi)).unwrap(),
        bytecode,
        link_references: links,
    }
}

/// Bytecode unique to the contract name
fn name_code(name: &str) -> String {
    hex::encode(name.as_bytes())
}

/// An artifact without constructor or library references
pub fn simple_artifact(name: &str) -> Artifact {
    artifact(
        name,
        vec![function_abi("transfer", &[("to", "address"), ("amount", "uint256")])],
        format!("0x60806040{}", name_code(name)),
        LinkReferences::new(),
    )
}

/// An artifact referencing `library` at two places in its bytecode
pub fn linked_artifact(name: &str, library: &str) -> Artifact {
    let offsets = vec![
        LinkOffset { start: 2, length: 20 },
        LinkOffset { start: 24, length: 20 },
    ];
    let links = LinkReferences::from([(
        format!("contracts/{}.sol", library),
        [(library.to_string(), offsets)].into(),
    )]);

    artifact(
        name,
        vec![function_abi("transfer", &[("to", "address"), ("amount", "uint256")])],
        format!(
            "0x6001{}6002{}{}",
            LIB_PLACEHOLDER,
            LIB_PLACEHOLDER,
            name_code(name)
        ),
        links,
    )
}

/// A token taking its initial supply in the constructor
pub fn token_artifact() -> Artifact {
    artifact(
        "Token",
        vec![
            constructor_abi(&[("supply", "uint256")]),
            function_abi("transfer", &[("to", "address"), ("amount", "uint256")]),
        ],
        format!("0x60806041{}", name_code("Token")),
        LinkReferences::new(),
    )
}

/// An upgradeable contract initialized through the proxy
pub fn staking_artifact() -> Artifact {
    artifact(
        "Staking",
        vec![
            function_abi("initialize", &[("controller", "address"), ("minimumStake", "uint256")]),
            function_abi("stake", &[("amount", "uint256")]),
        ],
        format!("0x60806042{}", name_code("Staking")),
        LinkReferences::new(),
    )
}

/// The proxy contract, constructed with its implementation and admin
pub fn proxy_artifact() -> Artifact {
    artifact(
        "GraphProxy",
        vec![constructor_abi(&[("impl", "address"), ("admin", "address")])],
        format!("0x60806043{}", name_code("GraphProxy")),
        LinkReferences::new(),
    )
}

/// The proxy admin contract
pub fn proxy_admin_artifact() -> Artifact {
    artifact(
        "GraphProxyAdmin",
        vec![
            function_abi("acceptProxy", &[("impl", "address"), ("proxy", "address")]),
            function_abi(
                "acceptProxyAndCall",
                &[("impl", "address"), ("proxy", "address"), ("data", "bytes")],
            ),
        ],
        format!("0x60806044{}", name_code("GraphProxyAdmin")),
        LinkReferences::new(),
    )
}

/// Write an artifact in the `<Name>.sol/<Name>.json` build layout
pub fn write_artifact(dir: &Path, artifact: &Artifact) {
    let source_dir = dir.join(format!("{}.sol", artifact.contract_name));
    fs::create_dir_all(&source_dir).unwrap();
    fs::write(
        source_dir.join(format!("{}.json", artifact.contract_name)),
        serde_json::to_string_pretty(artifact).unwrap(),
    )
    .unwrap();
}

/// An in-memory artifact provider
#[derive(Clone, Debug, Default)]
pub struct MockArtifacts {
    /// The artifacts, keyed by contract name
    artifacts: HashMap<String, Artifact>,
}

impl MockArtifacts {
    /// A provider holding the given artifacts
    pub fn new(artifacts: impl IntoIterator<Item = Artifact>) -> Self {
        Self {
            artifacts: artifacts
                .into_iter()
                .map(|artifact| (artifact.contract_name.clone(), artifact))
                .collect(),
        }
    }
}

impl ArtifactProvider for MockArtifacts {
    fn load_artifact(&self, name: &str) -> Result<Artifact, DeployError> {
        self.artifacts
            .get(name)
            .cloned()
            .ok_or_else(|| DeployError::ArtifactNotFound(name.to_string()))
    }
}

// --------------
// | Mock Chain |
// --------------

/// The state of a [`MockChain`]
#[derive(Debug, Default)]
struct MockState {
    /// The next nonce of each sender
    nonces: HashMap<Address, u64>,
    /// The code at each address
    code: HashMap<Address, Bytes>,
    /// The receipt of every submitted transaction
    receipts: HashMap<TxHash, TxReceipt>,
    /// Every submitted transaction, in order
    transactions: Vec<TransactionRequest>,
    /// The index of the transaction to revert, if any
    revert_at: Option<usize>,
    /// The number of the latest block
    block_number: u64,
}

/// An in-memory chain including every transaction in its own block.
///
/// Contract creations store their creation input as the runtime code of the
/// new contract, at the address derived from the sender's nonce.
#[derive(Clone, Debug, Default)]
pub struct MockChain {
    /// The shared chain state
    state: Arc<Mutex<MockState>>,
}

impl MockChain {
    /// A fresh chain
    pub fn new() -> Self {
        Self::default()
    }

    /// A sender connected to this chain
    pub fn sender(&self, address: Address) -> Sender<Self> {
        Sender::new(address, self.clone())
    }

    /// Every transaction submitted so far
    pub fn transactions(&self) -> Vec<TransactionRequest> {
        self.state.lock().unwrap().transactions.clone()
    }

    /// The transactions calling into `address`
    pub fn calls_to(&self, address: Address) -> Vec<TransactionRequest> {
        self.transactions()
            .into_iter()
            .filter(|tx| tx.to == Some(TxKind::Call(address)))
            .collect()
    }

    /// Replace the code at an address
    pub fn set_code(&self, address: Address, code: Bytes) {
        self.state.lock().unwrap().code.insert(address, code);
    }

    /// Make the next submitted transaction revert
    pub fn revert_next_transaction(&self) {
        let mut state = self.state.lock().unwrap();
        state.revert_at = Some(state.transactions.len());
    }

    /// Make the transaction with the given index, counted from the first
    /// transaction of the chain, revert
    pub fn revert_transaction_at(&self, index: usize) {
        self.state.lock().unwrap().revert_at = Some(index);
    }
}

impl ChainClient for MockChain {
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, DeployError> {
        let mut state = self.state.lock().unwrap();
        let from = tx.from.unwrap_or_default();
        let nonce = {
            let nonce = state.nonces.entry(from).or_default();
            *nonce += 1;
            *nonce - 1
        };
        let tx_hash = keccak256([from.as_slice(), &nonce.to_be_bytes()].concat());

        let status = state.revert_at != Some(state.transactions.len());
        state.block_number += 1;

        let (to, contract_address) = match tx.to {
            Some(TxKind::Call(to)) => (Some(to), None),
            _ => {
                let address = from.create(nonce);
                if status {
                    let code = tx.input.input().cloned().unwrap_or_default();
                    state.code.insert(address, code);
                }
                (None, status.then_some(address))
            }
        };

        let receipt = TxReceipt {
            tx_hash,
            from,
            to,
            contract_address,
            status,
            block_number: Some(state.block_number),
        };
        state.receipts.insert(tx_hash, receipt);
        state.transactions.push(tx);
        Ok(tx_hash)
    }

    async fn transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<TxReceipt>, DeployError> {
        Ok(self.state.lock().unwrap().receipts.get(&tx_hash).cloned())
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, DeployError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .code
            .get(&address)
            .cloned()
            .unwrap_or_default())
    }

    async fn block_number(&self) -> Result<u64, DeployError> {
        Ok(self.state.lock().unwrap().block_number)
    }

    async fn base_fee(&self) -> Result<Option<u128>, DeployError> {
        Ok(Some(MOCK_BASE_FEE))
    }

    async fn chain_id(&self) -> Result<u64, DeployError> {
        Ok(MOCK_CHAIN_ID)
    }

    fn poll_interval(&self) -> Duration {
        Duration::ZERO
    }
}
