//! Implementations of the deploy script commands

use std::path::{Path, PathBuf};

use deployments::{
    address_book::AddressBook,
    artifacts::BuildDirArtifacts,
    chain::{chain_name, counterpart},
    client::{AlloyClient, ChainClient, Sender},
    contract::{load_contract, Transact},
    deploy::Deployer,
    proxy::{Acceptance, ProxyUpgrade},
    verify::IntegrityVerifier,
};
use eyre::{bail, Result};
use tracing::{info, warn};

use crate::cli::{CallArgs, DeployArgs, DeployProxyArgs, VerifyArgs};

/// The state shared by every command: the connected sender and the address
/// book of its network
pub struct Context {
    /// The account transactions are sent from
    sender: Sender<AlloyClient>,
    /// The address book, opened for the connected network
    address_book: AddressBook,
    /// The compiled contract artifacts
    artifacts: BuildDirArtifacts,
    /// The directory transaction logs are appended to
    tx_log_dir: PathBuf,
}

impl Context {
    /// Open the address book for the network `sender` is connected to
    pub async fn new(
        sender: Sender<AlloyClient>,
        address_book: &Path,
        artifacts: &Path,
        tx_log_dir: &Path,
    ) -> Result<Self> {
        let chain_id = sender.client()?.chain_id().await?;
        match (chain_name(chain_id), counterpart(chain_id)) {
            (Some(name), Some(pair)) => {
                info!("Connected to {} ({}), paired with chain {}", name, chain_id, pair)
            }
            _ => warn!("Connected to unknown chain {}", chain_id),
        }

        Ok(Self {
            sender,
            address_book: AddressBook::open(address_book, chain_id)?,
            artifacts: BuildDirArtifacts::new(artifacts),
            tx_log_dir: tx_log_dir.to_path_buf(),
        })
    }

    /// A deployer sending from the connected account
    fn deployer(&self) -> Deployer<AlloyClient, BuildDirArtifacts> {
        Deployer::new(self.sender.clone(), self.artifacts.clone())
            .with_tx_log_dir(&self.tx_log_dir)
    }
}

/// List the recorded contracts
pub fn list(ctx: &Context) -> Result<()> {
    let names = ctx.address_book.list_entries();
    info!(
        "{} contracts recorded for chain {} in {}",
        names.len(),
        ctx.address_book.chain_id(),
        ctx.address_book.file().display()
    );

    for name in names {
        let entry = ctx.address_book.get_entry(&name);
        match entry.implementation() {
            Some(implementation) => info!(
                "{}: {:#x} (proxy for {:#x})",
                name,
                entry.address(),
                implementation.address
            ),
            None => info!("{}: {:#x}", name, entry.address()),
        }
    }
    Ok(())
}

/// Deploy a contract and record it
pub async fn deploy(args: DeployArgs, ctx: &mut Context) -> Result<()> {
    let result = ctx
        .deployer()
        .deploy_contract_and_save(&args.contract, &args.args, &mut ctx.address_book)
        .await?;

    for (library, address) in &result.libraries {
        info!("Linked {} at {:#x}", library, address);
    }
    Ok(())
}

/// Deploy a contract behind a proxy and record it
pub async fn deploy_proxy(args: DeployProxyArgs, ctx: &mut Context) -> Result<()> {
    let upgrade = ProxyUpgrade::new(&args.contract, args.init_args)
        .with_proxy_name(&args.proxy_name)
        .with_manual_accept(args.build_accept_tx);

    let deployment = ctx
        .deployer()
        .deploy_contract_with_proxy_and_save(&upgrade, &mut ctx.address_book)
        .await?;

    match deployment.acceptance {
        Acceptance::Accepted(_) => info!(
            "{} is live behind {} at {:#x}",
            upgrade.name(),
            upgrade.proxy_name(),
            deployment.proxy.address
        ),
        Acceptance::PendingManualAccept(_) => warn!(
            "{} is deployed but the proxy at {:#x} has not accepted it yet",
            args.contract, deployment.proxy.address
        ),
    }
    Ok(())
}

/// Verify one or every recorded contract
pub async fn verify(args: VerifyArgs, ctx: &Context) -> Result<()> {
    let names = match args.contract {
        Some(name) => vec![name],
        None => ctx.address_book.list_entries(),
    };

    let verifier = IntegrityVerifier::new(ctx.artifacts.clone());
    let client = ctx.sender.client()?;
    let mut failed = Vec::new();
    for name in &names {
        let entry = ctx.address_book.get_entry(name);
        if !verifier
            .verify(name, &entry, client, !args.skip_creation_code)
            .await
        {
            failed.push(name.as_str());
        }
    }

    if !failed.is_empty() {
        bail!(
            "{} of {} contracts failed verification: {}",
            failed.len(),
            names.len(),
            failed.join(", ")
        );
    }
    info!("All {} contracts verified", names.len());
    Ok(())
}

/// Send a state-changing call to a recorded contract
pub async fn call(args: CallArgs, ctx: &Context) -> Result<()> {
    let contract = load_contract(
        &args.contract,
        &ctx.address_book,
        &ctx.artifacts,
        ctx.sender.clone(),
        Some(ctx.tx_log_dir.clone()),
    )?;
    if contract.address().is_zero() {
        bail!("{} is not in the address book", args.contract);
    }

    let call = contract.call(&args.function, &args.args)?;
    let receipt = contract.send(call).await?;
    if let Some(block_number) = receipt.block_number {
        info!("Included in block {}", block_number);
    }
    Ok(())
}

/// Print the current block number and base fee
pub async fn block(ctx: &Context) -> Result<()> {
    let client = ctx.sender.client()?;
    let block_number = client.block_number().await?;
    match client.base_fee().await? {
        Some(base_fee) => info!("Block {}, base fee {} wei", block_number, base_fee),
        None => info!("Block {}, no base fee", block_number),
    }
    Ok(())
}
