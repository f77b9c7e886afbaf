//! Deploying contracts behind a proxy.
//!
//! An upgrade runs through the states of [`UpgradeState`]: the implementation
//! is deployed, then a proxy pointing at it, then the proxy admin accepts the
//! implementation for the proxy. The accept step is either sent directly by
//! the deploying account or, when the admin is controlled by a multisig,
//! emitted as a payload for out-of-band execution. No step is rolled back if
//! a later one fails.

use alloy::json_abi::JsonAbi;
use alloy_primitives::{hex, Address, Bytes};
use alloy_sol_types::SolCall;
use tracing::info;

use crate::{
    address_book::AddressBook,
    artifacts::ArtifactProvider,
    client::{ChainClient, TxReceipt},
    constants::{
        ACCEPT_PROXY_AND_CALL_FUNCTION, ACCEPT_PROXY_FUNCTION, DEFAULT_PROXY_ADMIN_NAME,
        DEFAULT_PROXY_NAME, INITIALIZE_FUNCTION,
    },
    contract::{encode_function_call, Contract, ContractCall, Transact},
    deploy::Deployer,
    errors::DeployError,
    solidity::{acceptProxyAndCallCall, acceptProxyCall},
    tx_logging::CallLogger,
    types::{DeploymentRecord, DeploymentResult, Libraries, RecordFields},
    utils::non_empty_args,
};

/// The parameters of a proxied deployment
#[derive(Clone, Debug)]
pub struct ProxyUpgrade {
    /// The name of the implementation contract
    name: String,
    /// The arguments of the implementation's initializer, called on acceptance
    init_args: Vec<String>,
    /// The name of the proxy contract artifact
    proxy_name: String,
    /// Whether to emit the accept call for manual execution instead of sending it
    build_accept_tx: bool,
}

impl ProxyUpgrade {
    /// Deploy `name` behind the default proxy, initializing it with `init_args`
    pub fn new(name: impl ToString, init_args: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            init_args,
            proxy_name: DEFAULT_PROXY_NAME.to_string(),
            build_accept_tx: false,
        }
    }

    /// Use a different proxy contract
    pub fn with_proxy_name(self, proxy_name: impl ToString) -> Self {
        Self {
            proxy_name: proxy_name.to_string(),
            ..self
        }
    }

    /// Emit the accept call for manual execution rather than sending it
    pub fn with_manual_accept(self, build_accept_tx: bool) -> Self {
        Self {
            build_accept_tx,
            ..self
        }
    }

    /// The name of the implementation contract
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The arguments of the implementation's initializer
    pub fn init_args(&self) -> &[String] {
        &self.init_args
    }

    /// The name of the proxy contract artifact
    pub fn proxy_name(&self) -> &str {
        &self.proxy_name
    }
}

/// A proxied deployment with its artifacts loaded and its initializer call
/// encoded
#[derive(Clone, Debug)]
pub struct PreparedUpgrade {
    /// The parameters of the deployment
    upgrade: ProxyUpgrade,
    /// The implementation's interface
    implementation_abi: JsonAbi,
    /// The proxy admin's interface, unset when the accept call is emitted
    admin_abi: Option<JsonAbi>,
    /// The encoded `initialize` call, unset without initializer arguments
    init_calldata: Option<Bytes>,
}

impl PreparedUpgrade {
    /// Build the admin call accepting `implementation` for `proxy`.
    ///
    /// With initializer calldata the admin also calls `initialize` on the
    /// proxy, otherwise it only accepts.
    fn accept_payload(
        &self,
        admin: Address,
        implementation: Address,
        proxy: Address,
    ) -> AcceptPayload {
        let (function, calldata) = match &self.init_calldata {
            Some(init_calldata) => (
                ACCEPT_PROXY_AND_CALL_FUNCTION,
                acceptProxyAndCallCall {
                    _implementation: implementation,
                    _proxy: proxy,
                    _data: init_calldata.clone(),
                }
                .abi_encode(),
            ),
            None => (
                ACCEPT_PROXY_FUNCTION,
                acceptProxyCall {
                    _implementation: implementation,
                    _proxy: proxy,
                }
                .abi_encode(),
            ),
        };

        AcceptPayload {
            admin,
            implementation,
            proxy,
            function,
            init_calldata: self.init_calldata.clone(),
            calldata: calldata.into(),
        }
    }
}

/// An accept call, ready to be executed by the proxy admin's owner
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AcceptPayload {
    /// The proxy admin contract the call targets
    pub admin: Address,
    /// The implementation being accepted
    pub implementation: Address,
    /// The proxy accepting the implementation
    pub proxy: Address,
    /// The admin function called
    pub function: &'static str,
    /// The initializer call forwarded to the implementation, if any
    pub init_calldata: Option<Bytes>,
    /// The full calldata of the admin call
    pub calldata: Bytes,
}

impl AcceptPayload {
    /// Log the payload in the format expected by multisig interfaces
    pub fn log(&self) {
        let data = self
            .init_calldata
            .as_ref()
            .map(hex::encode_prefixed)
            .unwrap_or_default();

        info!(
            "Copy this data in the Gnosis Multisig UI, or a similar app and call {}",
            self.function
        );
        info!("--------------------------------------------------------------------------------------");
        info!("  > Contract Address:  {:#x}", self.admin);
        info!("  > Implementation:    {:#x}", self.implementation);
        info!("  > Proxy:             {:#x}", self.proxy);
        info!("  > Data:              {}", data);
        info!("  > Calldata:          {}", hex::encode_prefixed(&self.calldata));
    }

    /// The admin call as a submittable contract call
    fn to_call(&self) -> ContractCall {
        let mut args = vec![self.implementation.to_string(), self.proxy.to_string()];
        args.extend(self.init_calldata.as_ref().map(hex::encode_prefixed));

        ContractCall {
            function: self.function.to_string(),
            args,
            input: self.calldata.clone(),
        }
    }
}

/// The progress of a proxied deployment
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpgradeState {
    /// Nothing has been deployed
    Start,
    /// The implementation is deployed
    ImplementationDeployed {
        /// The implementation deployment
        implementation: DeploymentResult,
    },
    /// The proxy is deployed, pointing at the implementation
    ProxyDeployed {
        /// The implementation deployment
        implementation: DeploymentResult,
        /// The proxy deployment
        proxy: DeploymentResult,
    },
    /// The proxy admin accepted the implementation
    Accepted {
        /// The implementation deployment
        implementation: DeploymentResult,
        /// The proxy deployment
        proxy: DeploymentResult,
        /// The receipt of the accept call
        receipt: TxReceipt,
    },
    /// The accept call was emitted for manual execution. Completion has to be
    /// checked out of band
    PendingManualAccept {
        /// The implementation deployment
        implementation: DeploymentResult,
        /// The proxy deployment
        proxy: DeploymentResult,
        /// The accept call to execute
        payload: AcceptPayload,
    },
}

impl UpgradeState {
    /// Whether the upgrade cannot advance any further in this process
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UpgradeState::Accepted { .. } | UpgradeState::PendingManualAccept { .. }
        )
    }
}

/// How the implementation was accepted by the proxy admin
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Acceptance {
    /// The accept call was sent and succeeded
    Accepted(TxReceipt),
    /// The accept call awaits manual execution
    PendingManualAccept(AcceptPayload),
}

/// A contract deployed behind a proxy
#[derive(Clone, Debug)]
pub struct ProxyDeployment<C> {
    /// The implementation's interface at the proxy address
    pub contract: CallLogger<Contract<C>>,
    /// The implementation deployment
    pub implementation: DeploymentResult,
    /// The proxy deployment
    pub proxy: DeploymentResult,
    /// The outcome of the accept step
    pub acceptance: Acceptance,
}

impl<C: ChainClient, A: ArtifactProvider> Deployer<C, A> {
    /// Deploy a proxy for `implementation`, administered by `admin`
    pub async fn deploy_proxy(
        &self,
        proxy_name: &str,
        implementation: Address,
        admin: Address,
    ) -> Result<DeploymentResult, DeployError> {
        let args = [implementation.to_string(), admin.to_string()];
        self.deploy_contract(proxy_name, &args, false /* autolink */)
            .await
    }

    /// Load every artifact a proxied deployment needs and encode its
    /// initializer call, before anything is sent
    pub fn prepare_upgrade(&self, upgrade: &ProxyUpgrade) -> Result<PreparedUpgrade, DeployError> {
        let implementation = self.artifacts().load_artifact(&upgrade.name)?;
        // The proxy is deployed without autolinking
        self.artifacts()
            .load_artifact(&upgrade.proxy_name)?
            .linked_bytecode(&Libraries::new())?;

        let admin_abi = if upgrade.build_accept_tx {
            None
        } else {
            Some(self.artifacts().load_artifact(DEFAULT_PROXY_ADMIN_NAME)?.abi)
        };
        let init_calldata = if upgrade.init_args.is_empty() {
            None
        } else {
            Some(encode_function_call(
                &implementation.abi,
                INITIALIZE_FUNCTION,
                &upgrade.init_args,
            )?)
        };

        Ok(PreparedUpgrade {
            upgrade: upgrade.clone(),
            implementation_abi: implementation.abi,
            admin_abi,
            init_calldata,
        })
    }

    /// Run one step of a proxied deployment. Terminal states are returned as is
    pub async fn advance_upgrade(
        &self,
        prepared: &PreparedUpgrade,
        admin: Address,
        state: UpgradeState,
    ) -> Result<UpgradeState, DeployError> {
        let upgrade = &prepared.upgrade;
        match state {
            UpgradeState::Start => {
                let implementation = self.deploy_contract(&upgrade.name, &[], true).await?;
                Ok(UpgradeState::ImplementationDeployed { implementation })
            }
            UpgradeState::ImplementationDeployed { implementation } => {
                let proxy = self
                    .deploy_proxy(&upgrade.proxy_name, implementation.address, admin)
                    .await?;
                Ok(UpgradeState::ProxyDeployed {
                    implementation,
                    proxy,
                })
            }
            UpgradeState::ProxyDeployed {
                implementation,
                proxy,
            } => {
                let payload =
                    prepared.accept_payload(admin, implementation.address, proxy.address);
                if upgrade.build_accept_tx {
                    payload.log();
                    return Ok(UpgradeState::PendingManualAccept {
                        implementation,
                        proxy,
                        payload,
                    });
                }

                let receipt = self.accept_proxy(prepared, &payload).await?;
                Ok(UpgradeState::Accepted {
                    implementation,
                    proxy,
                    receipt,
                })
            }
            terminal => Ok(terminal),
        }
    }

    /// Deploy a contract behind a new proxy administered by `admin`
    pub async fn deploy_contract_with_proxy(
        &self,
        upgrade: &ProxyUpgrade,
        admin: Address,
    ) -> Result<ProxyDeployment<C>, DeployError> {
        self.client()?;
        let prepared = self.prepare_upgrade(upgrade)?;
        self.run_upgrade(&prepared, admin, UpgradeState::Start).await
    }

    /// Deploy a contract behind a new proxy and record both in the address book.
    ///
    /// The proxy is administered by the address book's proxy admin. The
    /// implementation is recorded as soon as it is deployed. Once the proxy has
    /// accepted it, the entry is rewritten to point at the proxy, keeping the
    /// implementation entry as its snapshot. A manual accept leaves the
    /// implementation entry in place.
    pub async fn deploy_contract_with_proxy_and_save(
        &self,
        upgrade: &ProxyUpgrade,
        address_book: &mut AddressBook,
    ) -> Result<ProxyDeployment<C>, DeployError> {
        self.client()?;
        let admin = address_book.get_entry(DEFAULT_PROXY_ADMIN_NAME);
        if !admin.is_deployed() {
            return Err(DeployError::MissingDeployment(format!(
                "{} not detected in the address book, must be deployed first",
                DEFAULT_PROXY_ADMIN_NAME
            )));
        }

        let prepared = self.prepare_upgrade(upgrade)?;
        let implementation = self
            .deploy_contract_and_save(&upgrade.name, &[], address_book)
            .await?;
        let deployment = self
            .run_upgrade(
                &prepared,
                admin.address(),
                UpgradeState::ImplementationDeployed { implementation },
            )
            .await?;

        if let Acceptance::Accepted(_) = deployment.acceptance {
            let proxy = &deployment.proxy;
            let record = DeploymentRecord::Proxied {
                proxy: RecordFields {
                    init_args: non_empty_args(&upgrade.init_args),
                    ..proxy.to_fields(&[])
                },
                implementation: Box::new(
                    address_book.get_entry(&upgrade.name).into_implementation(),
                ),
            };
            address_book.set_entry(&upgrade.name, record);
            info!("> Contract saved to address book");
        }

        Ok(deployment)
    }

    /// Advance an upgrade until it reaches a terminal state
    async fn run_upgrade(
        &self,
        prepared: &PreparedUpgrade,
        admin: Address,
        mut state: UpgradeState,
    ) -> Result<ProxyDeployment<C>, DeployError> {
        let (implementation, proxy, acceptance) = loop {
            state = match self.advance_upgrade(prepared, admin, state).await? {
                UpgradeState::Accepted {
                    implementation,
                    proxy,
                    receipt,
                } => break (implementation, proxy, Acceptance::Accepted(receipt)),
                UpgradeState::PendingManualAccept {
                    implementation,
                    proxy,
                    payload,
                } => break (implementation, proxy, Acceptance::PendingManualAccept(payload)),
                next => next,
            };
        };

        // Use the interface of the implementation at the proxy address
        let contract = Contract::new(
            prepared.upgrade.name(),
            proxy.address,
            prepared.implementation_abi.clone(),
            self.sender().clone(),
        );
        Ok(ProxyDeployment {
            contract: CallLogger::new(contract, self.tx_log_dir().cloned()),
            implementation,
            proxy,
            acceptance,
        })
    }

    /// Send the accept call from the deploying account
    async fn accept_proxy(
        &self,
        prepared: &PreparedUpgrade,
        payload: &AcceptPayload,
    ) -> Result<TxReceipt, DeployError> {
        let abi = prepared.admin_abi.clone().ok_or_else(|| {
            DeployError::ArtifactNotFound(format!(
                "{} was not loaded for a manual accept",
                DEFAULT_PROXY_ADMIN_NAME
            ))
        })?;
        let admin = Contract::new(
            DEFAULT_PROXY_ADMIN_NAME,
            payload.admin,
            abi,
            self.sender().clone(),
        );
        let admin = CallLogger::new(admin, self.tx_log_dir().cloned());
        admin.send(payload.to_call()).await
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use alloy_sol_types::SolValue;

    use super::*;
    use crate::{
        test_helpers::{
            proxy_admin_artifact, proxy_artifact, simple_artifact, staking_artifact,
            MockArtifacts, MockChain,
        },
        utils::hash_bytes,
    };

    const DEPLOYER: Address = Address::with_last_byte(0xd0);
    const ADMIN: Address = Address::with_last_byte(0xad);

    fn artifacts() -> MockArtifacts {
        MockArtifacts::new([
            staking_artifact(),
            simple_artifact("Curation"),
            proxy_artifact(),
            proxy_admin_artifact(),
        ])
    }

    /// An address book with the proxy admin deployed
    fn address_book(dir: &tempfile::TempDir) -> AddressBook {
        let path = dir.path().join("addresses.json");
        fs::write(&path, "{}").unwrap();
        let mut book = AddressBook::open(path, "1337").unwrap();
        book.set_entry(
            DEFAULT_PROXY_ADMIN_NAME,
            DeploymentRecord::Direct(RecordFields::at(ADMIN)),
        );
        book
    }

    fn staking_upgrade() -> ProxyUpgrade {
        ProxyUpgrade::new(
            "Staking",
            vec![Address::with_last_byte(0xc0).to_string(), "100".to_string()],
        )
    }

    /// The input of every transaction sent to the proxy admin
    fn admin_calls(chain: &MockChain) -> Vec<Bytes> {
        chain
            .calls_to(ADMIN)
            .into_iter()
            .map(|tx| tx.input.input().cloned().unwrap_or_default())
            .collect()
    }

    #[tokio::test]
    async fn test_accepted_upgrade_rewrites_entry() {
        let chain = MockChain::new();
        let deployer = Deployer::new(chain.sender(DEPLOYER), artifacts());
        let dir = tempfile::tempdir().unwrap();
        let mut book = address_book(&dir);

        let deployment = deployer
            .deploy_contract_with_proxy_and_save(&staking_upgrade(), &mut book)
            .await
            .unwrap();
        assert!(matches!(deployment.acceptance, Acceptance::Accepted(_)));

        let entry = book.get_entry("Staking");
        assert!(entry.is_proxy());
        assert_eq!(entry.address(), deployment.proxy.address);

        let implementation = entry.implementation().unwrap();
        assert_eq!(implementation.address, deployment.implementation.address);
        assert_ne!(implementation.address, deployment.proxy.address);
        assert_eq!(
            implementation.creation_code_hash,
            Some(deployment.implementation.creation_code_hash)
        );

        let fields = entry.fields();
        assert_eq!(fields.init_args.as_deref(), Some(staking_upgrade().init_args()));
        assert_eq!(fields.constructor_args, None);
        assert_eq!(fields.tx_hash, Some(deployment.proxy.tx_hash));
        let proxy_code = proxy_artifact().linked_bytecode(&Default::default()).unwrap();
        assert_eq!(fields.creation_code_hash, Some(hash_bytes(&proxy_code)));

        // The returned handle uses the implementation interface at the proxy
        assert_eq!(deployment.contract.address(), deployment.proxy.address);
        assert!(deployment.contract.abi().function("stake").is_some());
    }

    #[tokio::test]
    async fn test_accept_and_initialize() {
        let chain = MockChain::new();
        let deployer = Deployer::new(chain.sender(DEPLOYER), artifacts());

        let upgrade = staking_upgrade();
        let deployment = deployer
            .deploy_contract_with_proxy(&upgrade, ADMIN)
            .await
            .unwrap();

        let init = encode_function_call(
            &staking_artifact().abi,
            INITIALIZE_FUNCTION,
            upgrade.init_args(),
        )
        .unwrap();
        let expected = acceptProxyAndCallCall {
            _implementation: deployment.implementation.address,
            _proxy: deployment.proxy.address,
            _data: init,
        }
        .abi_encode();
        assert_eq!(admin_calls(&chain), vec![Bytes::from(expected)]);
    }

    #[tokio::test]
    async fn test_accept_without_initializer() {
        let chain = MockChain::new();
        let deployer = Deployer::new(chain.sender(DEPLOYER), artifacts());

        let deployment = deployer
            .deploy_contract_with_proxy(&ProxyUpgrade::new("Curation", vec![]), ADMIN)
            .await
            .unwrap();

        let expected = acceptProxyCall {
            _implementation: deployment.implementation.address,
            _proxy: deployment.proxy.address,
        }
        .abi_encode();
        assert_eq!(admin_calls(&chain), vec![Bytes::from(expected)]);
    }

    #[tokio::test]
    async fn test_manual_accept_is_not_sent() {
        let chain = MockChain::new();
        let deployer = Deployer::new(chain.sender(DEPLOYER), artifacts());
        let dir = tempfile::tempdir().unwrap();
        let mut book = address_book(&dir);

        let upgrade = staking_upgrade().with_manual_accept(true);
        let deployment = deployer
            .deploy_contract_with_proxy_and_save(&upgrade, &mut book)
            .await
            .unwrap();

        let Acceptance::PendingManualAccept(payload) = deployment.acceptance else {
            panic!("accept call was sent");
        };
        assert_eq!(payload.admin, ADMIN);
        assert_eq!(payload.implementation, deployment.implementation.address);
        assert_eq!(payload.proxy, deployment.proxy.address);
        assert_eq!(payload.function, ACCEPT_PROXY_AND_CALL_FUNCTION);
        assert!(payload.calldata.starts_with(&acceptProxyAndCallCall::SELECTOR));
        assert!(admin_calls(&chain).is_empty());

        // Only the implementation has been recorded
        let entry = book.get_entry("Staking");
        assert!(!entry.is_proxy());
        assert_eq!(entry.address(), deployment.implementation.address);
    }

    #[tokio::test]
    async fn test_upgrade_states() {
        let chain = MockChain::new();
        let deployer = Deployer::new(chain.sender(DEPLOYER), artifacts());
        let upgrade = deployer.prepare_upgrade(&staking_upgrade()).unwrap();

        let state = deployer
            .advance_upgrade(&upgrade, ADMIN, UpgradeState::Start)
            .await
            .unwrap();
        let UpgradeState::ImplementationDeployed { implementation } = &state else {
            panic!("unexpected state {state:?}");
        };
        assert_eq!(implementation.address, DEPLOYER.create(0));
        assert!(!state.is_terminal());

        let state = deployer.advance_upgrade(&upgrade, ADMIN, state).await.unwrap();
        let UpgradeState::ProxyDeployed { proxy, .. } = &state else {
            panic!("unexpected state {state:?}");
        };
        assert_eq!(proxy.address, DEPLOYER.create(1));

        // The proxy is constructed with the implementation and the admin
        let proxy_code = chain.code_at(proxy.address).await.unwrap();
        let constructor_args = (DEPLOYER.create(0), ADMIN).abi_encode_params();
        assert!(proxy_code.ends_with(&constructor_args));

        let state = deployer.advance_upgrade(&upgrade, ADMIN, state).await.unwrap();
        assert!(matches!(state, UpgradeState::Accepted { .. }));
        assert!(state.is_terminal());

        let terminal = deployer
            .advance_upgrade(&upgrade, ADMIN, state.clone())
            .await
            .unwrap();
        assert_eq!(terminal, state);
        assert_eq!(chain.transactions().len(), 3);
    }

    #[tokio::test]
    async fn test_missing_proxy_admin() {
        let chain = MockChain::new();
        let deployer = Deployer::new(chain.sender(DEPLOYER), artifacts());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("addresses.json");
        fs::write(&path, "{}").unwrap();
        let mut book = AddressBook::open(path, "1337").unwrap();

        let err = deployer
            .deploy_contract_with_proxy_and_save(&staking_upgrade(), &mut book)
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::MissingDeployment(_)));
        assert!(chain.transactions().is_empty());
    }

    #[tokio::test]
    async fn test_reverted_accept_keeps_implementation_entry() {
        let chain = MockChain::new();
        let deployer = Deployer::new(chain.sender(DEPLOYER), artifacts());
        let dir = tempfile::tempdir().unwrap();
        let mut book = address_book(&dir);

        // Implementation and proxy deploy, the accept call reverts
        chain.revert_transaction_at(2);
        let err = deployer
            .deploy_contract_with_proxy_and_save(&staking_upgrade(), &mut book)
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::ChainSubmission(_)));

        let entry = book.get_entry("Staking");
        assert!(!entry.is_proxy());
        assert_eq!(entry.address(), DEPLOYER.create(0));
        assert!(!chain.code_at(DEPLOYER.create(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_init_args_fail_before_deploying() {
        let chain = MockChain::new();
        let deployer = Deployer::new(chain.sender(DEPLOYER), artifacts());
        let dir = tempfile::tempdir().unwrap();
        let mut book = address_book(&dir);

        let malformed = ProxyUpgrade::new("Staking", vec!["notanaddress".into(), "100".into()]);
        let wrong_arity = ProxyUpgrade::new("Staking", vec!["100".into()]);
        let no_initializer = ProxyUpgrade::new("Curation", vec!["100".into()]);
        for upgrade in [malformed, wrong_arity, no_initializer] {
            let err = deployer
                .deploy_contract_with_proxy_and_save(&upgrade, &mut book)
                .await
                .unwrap_err();
            assert!(matches!(err, DeployError::CalldataConstruction(_)), "{err:?}");

            let err = deployer
                .deploy_contract_with_proxy(&upgrade, ADMIN)
                .await
                .unwrap_err();
            assert!(matches!(err, DeployError::CalldataConstruction(_)), "{err:?}");
        }

        assert!(chain.transactions().is_empty());
        assert!(!book.get_entry("Staking").is_deployed());
        assert!(!book.get_entry("Curation").is_deployed());
    }

    #[tokio::test]
    async fn test_missing_artifacts_fail_before_deploying() {
        let chain = MockChain::new();
        let dir = tempfile::tempdir().unwrap();
        let mut book = address_book(&dir);

        // No proxy admin artifact to send the accept call with
        let no_admin = MockArtifacts::new([staking_artifact(), proxy_artifact()]);
        let deployer = Deployer::new(chain.sender(DEPLOYER), no_admin);
        let err = deployer
            .deploy_contract_with_proxy_and_save(&staking_upgrade(), &mut book)
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::ArtifactNotFound(_)));

        // No proxy artifact
        let no_proxy = MockArtifacts::new([staking_artifact(), proxy_admin_artifact()]);
        let deployer = Deployer::new(chain.sender(DEPLOYER), no_proxy);
        let err = deployer
            .deploy_contract_with_proxy(&staking_upgrade(), ADMIN)
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::ArtifactNotFound(_)));

        assert!(chain.transactions().is_empty());
        assert!(!book.get_entry("Staking").is_deployed());
    }

    #[tokio::test]
    async fn test_manual_accept_without_admin_artifact() {
        let chain = MockChain::new();
        let no_admin = MockArtifacts::new([staking_artifact(), proxy_artifact()]);
        let deployer = Deployer::new(chain.sender(DEPLOYER), no_admin);

        let upgrade = staking_upgrade().with_manual_accept(true);
        let deployment = deployer
            .deploy_contract_with_proxy(&upgrade, ADMIN)
            .await
            .unwrap();
        assert!(matches!(deployment.acceptance, Acceptance::PendingManualAccept(_)));
        assert_eq!(chain.transactions().len(), 2);
    }
}
