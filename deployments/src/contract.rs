//! Contract handles: encoding calls from string arguments and submitting them
//! from a [`Sender`]

use std::{collections::BTreeMap, path::PathBuf};

use alloy::{
    dyn_abi::{DynSolType, DynSolValue, JsonAbiExt, Specifier},
    json_abi::{JsonAbi, Param},
    network::TransactionBuilder,
    rpc::types::TransactionRequest,
};
use alloy_primitives::{Address, Bytes, TxHash};
use tracing::error;

use crate::{
    address_book::AddressBook,
    artifacts::ArtifactProvider,
    client::{ChainClient, Sender, TxReceipt},
    constants::CONSTRUCTOR,
    errors::DeployError,
    tx_logging::CallLogger,
};

/// A state-changing call, encoded and ready to submit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractCall {
    /// The name of the function called
    pub function: String,
    /// The stringified arguments of the call
    pub args: Vec<String>,
    /// The encoded transaction input
    pub input: Bytes,
}

/// A call the node has accepted but that may not be included yet
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmittedCall {
    /// The hash of the transaction
    pub tx_hash: TxHash,
    /// The sender of the transaction
    pub from: Address,
    /// The callee, `None` for a contract creation
    pub to: Option<Address>,
    /// The name of the function called
    pub function: String,
    /// The stringified arguments of the call
    pub args: Vec<String>,
}

/// A handle able to submit state-changing calls and await their inclusion
#[allow(async_fn_in_trait)]
pub trait Transact: Sized {
    /// The client the handle submits through
    type Client: ChainClient;

    /// The name of the contract
    fn name(&self) -> &str;

    /// The account calls are sent from
    fn sender(&self) -> &Sender<Self::Client>;

    /// Submit a call without waiting for its inclusion
    async fn submit(&self, call: ContractCall) -> Result<SubmittedCall, DeployError>;

    /// Wait for a submitted call to be included
    async fn wait(&self, submitted: &SubmittedCall) -> Result<TxReceipt, DeployError> {
        self.sender()
            .client()?
            .wait_for_transaction(submitted.tx_hash)
            .await
    }

    /// The same handle, sending from a different account
    fn connect(&self, sender: Sender<Self::Client>) -> Self;

    /// Submit a call and wait for it to succeed
    async fn send(&self, call: ContractCall) -> Result<TxReceipt, DeployError> {
        let submitted = self.submit(call).await?;
        let receipt = self.wait(&submitted).await?;
        if !receipt.status {
            return Err(DeployError::ChainSubmission(format!(
                "{}.{} reverted in {:#x}",
                self.name(),
                submitted.function,
                submitted.tx_hash
            )));
        }

        Ok(receipt)
    }
}

// ------------
// | Contract |
// ------------

/// A deployed contract
#[derive(Clone, Debug)]
pub struct Contract<C> {
    /// The name of the contract's artifact
    name: String,
    /// The address the contract is used at
    address: Address,
    /// The contract interface
    abi: JsonAbi,
    /// The account calls are sent from
    sender: Sender<C>,
}

impl<C: ChainClient> Contract<C> {
    /// A handle on the contract at `address`
    pub fn new(name: impl ToString, address: Address, abi: JsonAbi, sender: Sender<C>) -> Self {
        Self {
            name: name.to_string(),
            address,
            abi,
            sender,
        }
    }

    /// The address the contract is used at
    pub fn address(&self) -> Address {
        self.address
    }

    /// The contract interface
    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Encode a call to one of the contract's functions
    pub fn call(&self, function: &str, args: &[String]) -> Result<ContractCall, DeployError> {
        Ok(ContractCall {
            function: function.to_string(),
            args: args.to_vec(),
            input: encode_function_call(&self.abi, function, args)?,
        })
    }

    /// The same interface at a different address
    pub fn attach(&self, address: Address) -> Self {
        Self {
            address,
            ..self.clone()
        }
    }
}

impl<C: ChainClient> Transact for Contract<C> {
    type Client = C;

    fn name(&self) -> &str {
        &self.name
    }

    fn sender(&self) -> &Sender<C> {
        &self.sender
    }

    async fn submit(&self, call: ContractCall) -> Result<SubmittedCall, DeployError> {
        let client = self.sender.client()?;
        let tx = TransactionRequest::default()
            .with_from(self.sender.address())
            .with_to(self.address)
            .with_input(call.input);
        let tx_hash = client.send_transaction(tx).await?;

        Ok(SubmittedCall {
            tx_hash,
            from: self.sender.address(),
            to: Some(self.address),
            function: call.function,
            args: call.args,
        })
    }

    fn connect(&self, sender: Sender<C>) -> Self {
        Self {
            sender,
            ..self.clone()
        }
    }
}

// --------------------
// | Contract Factory |
// --------------------

/// A contract that has not been deployed yet. Its only call is its constructor
#[derive(Clone, Debug)]
pub struct ContractFactory<C> {
    /// The name of the contract's artifact
    name: String,
    /// The contract interface
    abi: JsonAbi,
    /// The linked creation bytecode
    bytecode: Bytes,
    /// The account the deployment is sent from
    sender: Sender<C>,
}

impl<C: ChainClient> ContractFactory<C> {
    /// A factory for the given linked bytecode
    pub fn new(name: impl ToString, abi: JsonAbi, bytecode: Bytes, sender: Sender<C>) -> Self {
        Self {
            name: name.to_string(),
            abi,
            bytecode,
            sender,
        }
    }

    /// The linked creation bytecode, without constructor arguments
    pub fn bytecode(&self) -> &Bytes {
        &self.bytecode
    }

    /// Encode the deployment with the given constructor arguments
    pub fn deploy_call(&self, args: &[String]) -> Result<ContractCall, DeployError> {
        let mut input = self.bytecode.to_vec();
        input.extend(encode_constructor_args(&self.abi, args)?);

        Ok(ContractCall {
            function: CONSTRUCTOR.to_string(),
            args: args.to_vec(),
            input: input.into(),
        })
    }
}

impl<C: ChainClient> Transact for ContractFactory<C> {
    type Client = C;

    fn name(&self) -> &str {
        &self.name
    }

    fn sender(&self) -> &Sender<C> {
        &self.sender
    }

    async fn submit(&self, call: ContractCall) -> Result<SubmittedCall, DeployError> {
        let client = self.sender.client()?;
        let tx = TransactionRequest::default()
            .with_from(self.sender.address())
            .with_deploy_code(call.input);
        let tx_hash = client.send_transaction(tx).await?;

        Ok(SubmittedCall {
            tx_hash,
            from: self.sender.address(),
            to: None,
            function: call.function,
            args: call.args,
        })
    }

    fn connect(&self, sender: Sender<C>) -> Self {
        Self {
            sender,
            ..self.clone()
        }
    }
}

// ------------
// | Encoding |
// ------------

/// ABI-encode constructor arguments, coercing each to its declared type
pub fn encode_constructor_args(abi: &JsonAbi, args: &[String]) -> Result<Vec<u8>, DeployError> {
    let Some(constructor) = &abi.constructor else {
        if args.is_empty() {
            return Ok(Vec::new());
        }
        return Err(DeployError::CalldataConstruction(format!(
            "constructor takes no arguments, got {}",
            args.len()
        )));
    };

    let values = coerce_args(CONSTRUCTOR, &constructor.inputs, args)?;
    constructor
        .abi_encode_input(&values)
        .map_err(|e| DeployError::CalldataConstruction(e.to_string()))
}

/// ABI-encode a function call, selector included.
///
/// Overloads are resolved by argument count.
pub fn encode_function_call(
    abi: &JsonAbi,
    function: &str,
    args: &[String],
) -> Result<Bytes, DeployError> {
    let overloads = abi.function(function).ok_or_else(|| {
        DeployError::CalldataConstruction(format!("no function named {}", function))
    })?;
    let func = overloads
        .iter()
        .find(|func| func.inputs.len() == args.len())
        .ok_or_else(|| {
            DeployError::CalldataConstruction(format!(
                "no overload of {} takes {} arguments",
                function,
                args.len()
            ))
        })?;

    let values = coerce_args(function, &func.inputs, args)?;
    func.abi_encode_input(&values)
        .map(Bytes::from)
        .map_err(|e| DeployError::CalldataConstruction(e.to_string()))
}

/// Parse string arguments as values of the parameters' types
fn coerce_args(
    function: &str,
    params: &[Param],
    args: &[String],
) -> Result<Vec<DynSolValue>, DeployError> {
    if params.len() != args.len() {
        return Err(DeployError::CalldataConstruction(format!(
            "{} takes {} arguments, got {}",
            function,
            params.len(),
            args.len()
        )));
    }

    params
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            let ty: DynSolType = param
                .resolve()
                .map_err(|e| DeployError::CalldataConstruction(e.to_string()))?;
            ty.coerce_str(arg).map_err(|e| {
                DeployError::CalldataConstruction(format!(
                    "argument {} of {}: {}",
                    param.name, function, e
                ))
            })
        })
        .collect()
}

// -----------
// | Loading |
// -----------

/// Load the named contract's interface at an arbitrary address
pub fn load_contract_at<C: ChainClient>(
    name: &str,
    address: Address,
    artifacts: &impl ArtifactProvider,
    sender: Sender<C>,
) -> Result<Contract<C>, DeployError> {
    let artifact = artifacts.load_artifact(name)?;
    Ok(Contract::new(name, address, artifact.abi, sender))
}

/// Load a contract at its address book address, logging every call
pub fn load_contract<C: ChainClient>(
    name: &str,
    address_book: &AddressBook,
    artifacts: &impl ArtifactProvider,
    sender: Sender<C>,
    tx_log_dir: Option<PathBuf>,
) -> Result<CallLogger<Contract<C>>, DeployError> {
    let entry = address_book.get_entry(name);
    let contract = load_contract_at(name, entry.address(), artifacts, sender).map_err(|e| {
        error!("Could not load contract {}: {}", name, e);
        e
    })?;

    Ok(CallLogger::new(contract, tx_log_dir))
}

/// Load every contract of the address book
pub fn load_contracts<C: ChainClient>(
    address_book: &AddressBook,
    artifacts: &impl ArtifactProvider,
    sender: Sender<C>,
    tx_log_dir: Option<PathBuf>,
) -> Result<BTreeMap<String, CallLogger<Contract<C>>>, DeployError> {
    address_book
        .list_entries()
        .into_iter()
        .map(|name| {
            let contract = load_contract(
                &name,
                address_book,
                artifacts,
                sender.clone(),
                tx_log_dir.clone(),
            )?;
            Ok((name, contract))
        })
        .collect()
}
