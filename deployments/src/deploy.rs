//! Deploying contracts, linking their libraries, and recording the results in
//! the address book

use std::path::PathBuf;

use tracing::info;

use crate::{
    address_book::AddressBook,
    artifacts::{Artifact, ArtifactProvider},
    client::{ChainClient, Sender},
    contract::{ContractFactory, Transact},
    errors::DeployError,
    tx_logging::CallLogger,
    types::{DeploymentRecord, DeploymentResult, Libraries},
    utils::hash_bytes,
};

/// Deploys contracts from a sender, reading their artifacts from a provider
#[derive(Clone, Debug)]
pub struct Deployer<C, A> {
    /// The account deployments are sent from
    sender: Sender<C>,
    /// The source of the contract artifacts
    artifacts: A,
    /// The directory of the transaction log files, if any
    tx_log_dir: Option<PathBuf>,
}

impl<C: ChainClient, A: ArtifactProvider> Deployer<C, A> {
    /// A deployer sending from `sender`
    pub fn new(sender: Sender<C>, artifacts: A) -> Self {
        Self {
            sender,
            artifacts,
            tx_log_dir: None,
        }
    }

    /// Append the transactions sent by this deployer to log files in `dir`
    pub fn with_tx_log_dir(self, dir: impl Into<PathBuf>) -> Self {
        Self {
            tx_log_dir: Some(dir.into()),
            ..self
        }
    }

    /// The account deployments are sent from
    pub fn sender(&self) -> &Sender<C> {
        &self.sender
    }

    /// The source of the contract artifacts
    pub fn artifacts(&self) -> &A {
        &self.artifacts
    }

    /// The directory of the transaction log files, if any
    pub fn tx_log_dir(&self) -> Option<&PathBuf> {
        self.tx_log_dir.as_ref()
    }

    /// The client connected to the sender's network
    pub(crate) fn client(&self) -> Result<&C, DeployError> {
        self.sender.client()
    }

    /// Deploy the named contract with the given constructor arguments.
    ///
    /// With `autolink`, every library the bytecode references is deployed
    /// first, without constructor arguments, and linked in. Libraries are
    /// themselves deployed without linking, so a library referencing another
    /// library fails with [`DeployError::Linking`].
    pub async fn deploy_contract(
        &self,
        name: &str,
        args: &[String],
        autolink: bool,
    ) -> Result<DeploymentResult, DeployError> {
        self.client()?;
        let artifact = self.artifacts.load_artifact(name)?;

        let libraries = if autolink {
            self.deploy_libraries(&artifact).await?
        } else {
            Libraries::new()
        };
        self.deploy_artifact(&artifact, args, libraries).await
    }

    /// Deploy the named contract and record it in the address book.
    ///
    /// The entry is only written once the deployment has been included.
    pub async fn deploy_contract_and_save(
        &self,
        name: &str,
        args: &[String],
        address_book: &mut AddressBook,
    ) -> Result<DeploymentResult, DeployError> {
        let result = self.deploy_contract(name, args, true /* autolink */).await?;

        address_book.set_entry(name, DeploymentRecord::Direct(result.to_fields(args)));
        info!("> Contract saved to address book");
        Ok(result)
    }

    /// Deploy every library the artifact references
    async fn deploy_libraries(&self, artifact: &Artifact) -> Result<Libraries, DeployError> {
        let mut libraries = Libraries::new();
        for lib_name in artifact.library_names() {
            info!("Deploying library {} for {}", lib_name, artifact.contract_name);
            let library = self.artifacts.load_artifact(&lib_name)?;
            let result = self
                .deploy_artifact(&library, &[], Libraries::new())
                .await?;
            libraries.insert(lib_name, result.address);
        }

        Ok(libraries)
    }

    /// Link and deploy an artifact, then read back the code it left on chain
    async fn deploy_artifact(
        &self,
        artifact: &Artifact,
        args: &[String],
        libraries: Libraries,
    ) -> Result<DeploymentResult, DeployError> {
        let client = self.client()?;
        let bytecode = artifact.linked_bytecode(&libraries)?;
        let creation_code_hash = hash_bytes(&bytecode);

        let factory = CallLogger::new(
            ContractFactory::new(
                &artifact.contract_name,
                artifact.abi.clone(),
                bytecode,
                self.sender.clone(),
            ),
            self.tx_log_dir.clone(),
        );
        let call = factory.deploy_call(args)?;
        let receipt = factory.send(call).await?;
        info!("> Deploy {}, txHash: {:#x}", artifact.contract_name, receipt.tx_hash);

        let address = receipt.contract_address.ok_or_else(|| {
            DeployError::ChainQuery(format!(
                "receipt of {:#x} has no contract address",
                receipt.tx_hash
            ))
        })?;
        let runtime_code_hash = hash_bytes(client.code_at(address).await?);

        info!("= CreationCodeHash: {:#x}", creation_code_hash);
        info!("= RuntimeCodeHash: {:#x}", runtime_code_hash);
        info!(
            "{} has been deployed to address: {:#x}",
            artifact.contract_name, address
        );

        Ok(DeploymentResult {
            address,
            creation_code_hash,
            runtime_code_hash,
            tx_hash: receipt.tx_hash,
            libraries,
        })
    }
}
