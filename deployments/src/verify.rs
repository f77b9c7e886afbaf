//! Checking address book entries against the code deployed on chain

use std::fmt::{self, Display, Formatter};

use alloy_primitives::B256;
use tracing::{info, warn};

use crate::{
    artifacts::ArtifactProvider,
    client::ChainClient,
    constants::DEFAULT_PROXY_NAME,
    types::DeploymentRecord,
    utils::{hash_bytes, is_empty_code_hash},
};

/// The reason an address book entry does not match the chain
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntegrityMismatch {
    /// The entry has no address
    AddressMissing,
    /// The artifact to compare the creation code against could not be loaded
    ArtifactUnavailable(String),
    /// The recorded creation code hash differs from the artifact's
    CreationCodeMismatch {
        /// The hash in the address book
        recorded: Option<B256>,
        /// The hash of the artifact's bytecode
        artifact: B256,
    },
    /// The code at the address could not be read
    CodeUnavailable(String),
    /// There is no code at the address
    NoCode,
    /// The recorded runtime code hash differs from the code on chain
    RuntimeCodeMismatch {
        /// The hash in the address book
        recorded: Option<B256>,
        /// The hash of the code at the address
        observed: B256,
    },
}

impl Display for IntegrityMismatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityMismatch::AddressMissing => write!(f, "contract is not in the address book"),
            IntegrityMismatch::ArtifactUnavailable(s) => write!(f, "artifact unavailable: {}", s),
            IntegrityMismatch::CreationCodeMismatch { recorded, artifact } => write!(
                f,
                "creation code hash does not match the artifacts: {} !== {:#x}",
                fmt_hash(recorded),
                artifact
            ),
            IntegrityMismatch::CodeUnavailable(s) => write!(f, "error reading code: {}", s),
            IntegrityMismatch::NoCode => write!(f, "no runtime code exists at the address"),
            IntegrityMismatch::RuntimeCodeMismatch { recorded, observed } => write!(
                f,
                "runtime code hash does not match the code on chain: {} !== {:#x}",
                fmt_hash(recorded),
                observed
            ),
        }
    }
}

/// Format an optional hash
fn fmt_hash(hash: &Option<B256>) -> String {
    hash.map(|hash| format!("{:#x}", hash))
        .unwrap_or_else(|| "<none>".to_string())
}

/// Verifies address book entries against their artifacts and the chain
#[derive(Clone, Debug)]
pub struct IntegrityVerifier<A> {
    /// The source of the contract artifacts
    artifacts: A,
    /// The artifact proxied entries are compared against
    proxy_name: String,
}

impl<A: ArtifactProvider> IntegrityVerifier<A> {
    /// A verifier comparing proxied entries against the default proxy artifact
    pub fn new(artifacts: A) -> Self {
        Self {
            artifacts,
            proxy_name: DEFAULT_PROXY_NAME.to_string(),
        }
    }

    /// Compare proxied entries against a different proxy artifact
    pub fn with_proxy_name(self, proxy_name: impl ToString) -> Self {
        Self {
            proxy_name: proxy_name.to_string(),
            ..self
        }
    }

    /// Check an entry, returning the first mismatch found.
    ///
    /// The creation code hash is compared against the artifact of `name`, or
    /// of the proxy for a proxied entry, linked with the entry's libraries.
    /// The runtime code hash is compared against the code currently at the
    /// entry's address.
    pub async fn check<C: ChainClient>(
        &self,
        name: &str,
        record: &DeploymentRecord,
        client: &C,
        check_creation_code: bool,
    ) -> Result<(), IntegrityMismatch> {
        if !record.is_deployed() {
            return Err(IntegrityMismatch::AddressMissing);
        }
        let fields = record.fields();

        if check_creation_code {
            let artifact_name = if record.is_proxy() {
                self.proxy_name.as_str()
            } else {
                name
            };
            let bytecode = self
                .artifacts
                .load_artifact(artifact_name)
                .and_then(|artifact| {
                    artifact.linked_bytecode(&fields.libraries.clone().unwrap_or_default())
                })
                .map_err(|e| IntegrityMismatch::ArtifactUnavailable(e.to_string()))?;

            let artifact = hash_bytes(&bytecode);
            if fields.creation_code_hash != Some(artifact) {
                return Err(IntegrityMismatch::CreationCodeMismatch {
                    recorded: fields.creation_code_hash,
                    artifact,
                });
            }
        }

        let code = client
            .code_at(fields.address)
            .await
            .map_err(|e| IntegrityMismatch::CodeUnavailable(e.to_string()))?;
        let observed = hash_bytes(&code);
        if is_empty_code_hash(observed) {
            return Err(IntegrityMismatch::NoCode);
        }
        if fields.runtime_code_hash != Some(observed) {
            return Err(IntegrityMismatch::RuntimeCodeMismatch {
                recorded: fields.runtime_code_hash,
                observed,
            });
        }

        Ok(())
    }

    /// Whether an entry matches its artifact and the chain. Mismatches are
    /// logged as warnings
    pub async fn verify<C: ChainClient>(
        &self,
        name: &str,
        record: &DeploymentRecord,
        client: &C,
        check_creation_code: bool,
    ) -> bool {
        info!("Checking for valid {} contract...", name);
        match self.check(name, record, client, check_creation_code).await {
            Ok(()) => true,
            Err(mismatch) => {
                warn!("{} at {:#x}: {}", name, record.address(), mismatch);
                false
            }
        }
    }
}
