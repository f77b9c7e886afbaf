//! Type definitions for deployment records and results

use std::collections::BTreeMap;

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::non_empty_args;

/// The persisted contents of an address book file, keyed by network
/// identifier and then by contract name
pub type AddressBookJson = BTreeMap<String, BTreeMap<String, DeploymentRecord>>;

/// A mapping from library name to its deployed address
pub type Libraries = BTreeMap<String, Address>;

/// The fields recorded for a single deployed contract
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordFields {
    /// The address of the contract. The zero address stands for "not deployed"
    pub address: Address,
    /// The stringified constructor arguments, if any
    pub constructor_args: Option<Vec<String>>,
    /// The stringified initializer arguments, if any
    pub init_args: Option<Vec<String>>,
    /// The hash of the bytecode used to create the contract
    pub creation_code_hash: Option<B256>,
    /// The hash of the runtime code found at the address after deployment
    pub runtime_code_hash: Option<B256>,
    /// The hash of the deployment transaction
    pub tx_hash: Option<B256>,
    /// The libraries linked into the contract's bytecode, if any were needed
    pub libraries: Option<Libraries>,
}

impl RecordFields {
    /// Fields for a contract at the given address with no other metadata
    pub fn at(address: Address) -> Self {
        Self { address, ..Default::default() }
    }
}

/// The active address book entry for a contract on a network.
///
/// A proxied record keeps a snapshot of the implementation as it was when the
/// proxy accepted it. The snapshot is always a plain record, which bounds the
/// deployment history to one level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRecord", into = "RawRecord")]
pub enum DeploymentRecord {
    /// A contract deployed and used at its own address
    Direct(RecordFields),
    /// A contract used through a proxy
    Proxied {
        /// The proxy deployment. `address` is the proxy address
        proxy: RecordFields,
        /// The implementation behind the proxy
        implementation: Box<RecordFields>,
    },
}

impl DeploymentRecord {
    /// The record returned for a contract that has no entry
    pub fn missing() -> Self {
        DeploymentRecord::Direct(RecordFields::default())
    }

    /// The address callers should use to interact with the contract
    pub fn address(&self) -> Address {
        self.fields().address
    }

    /// Whether the record points at a real deployment
    pub fn is_deployed(&self) -> bool {
        !self.address().is_zero()
    }

    /// Whether the contract sits behind a proxy
    pub fn is_proxy(&self) -> bool {
        matches!(self, DeploymentRecord::Proxied { .. })
    }

    /// The top-level fields of the record, i.e. the proxy's for a proxied record
    pub fn fields(&self) -> &RecordFields {
        match self {
            DeploymentRecord::Direct(fields) => fields,
            DeploymentRecord::Proxied { proxy, .. } => proxy,
        }
    }

    /// The implementation snapshot of a proxied record
    pub fn implementation(&self) -> Option<&RecordFields> {
        match self {
            DeploymentRecord::Direct(_) => None,
            DeploymentRecord::Proxied { implementation, .. } => Some(implementation),
        }
    }

    /// The fields describing the contract code itself: the implementation for
    /// a proxied record, the record otherwise
    pub fn into_implementation(self) -> RecordFields {
        match self {
            DeploymentRecord::Direct(fields) => fields,
            DeploymentRecord::Proxied { implementation, .. } => *implementation,
        }
    }
}

/// The outcome of a single contract deployment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentResult {
    /// The deployed contract's address
    pub address: Address,
    /// The hash of the linked creation bytecode, excluding constructor arguments
    pub creation_code_hash: B256,
    /// The hash of the code observed at `address` once the deployment was included
    pub runtime_code_hash: B256,
    /// The hash of the deployment transaction
    pub tx_hash: B256,
    /// The libraries deployed and linked for this contract
    pub libraries: Libraries,
}

impl DeploymentResult {
    /// Build the address book fields for this deployment
    pub fn to_fields(&self, constructor_args: &[String]) -> RecordFields {
        RecordFields {
            address: self.address,
            constructor_args: non_empty_args(constructor_args),
            init_args: None,
            creation_code_hash: Some(self.creation_code_hash),
            runtime_code_hash: Some(self.runtime_code_hash),
            tx_hash: Some(self.tx_hash),
            libraries: (!self.libraries.is_empty()).then(|| self.libraries.clone()),
        }
    }
}

// -----------------
// | JSON Encoding |
// -----------------

/// The JSON shape of an address book entry
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    /// See [`RecordFields::address`]
    #[serde(deserialize_with = "deserialize_address")]
    address: Address,
    /// See [`RecordFields::constructor_args`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    constructor_args: Option<Vec<String>>,
    /// See [`RecordFields::init_args`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    init_args: Option<Vec<String>>,
    /// See [`RecordFields::creation_code_hash`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    creation_code_hash: Option<B256>,
    /// See [`RecordFields::runtime_code_hash`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    runtime_code_hash: Option<B256>,
    /// See [`RecordFields::tx_hash`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tx_hash: Option<B256>,
    /// See [`RecordFields::libraries`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    libraries: Option<Libraries>,
    /// Set on proxied records only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    proxy: Option<bool>,
    /// The implementation snapshot, set on proxied records only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    implementation: Option<Box<RawRecord>>,
}

impl RawRecord {
    /// The JSON shape of a plain record
    fn from_fields(fields: RecordFields) -> Self {
        RawRecord {
            address: fields.address,
            constructor_args: fields.constructor_args,
            init_args: fields.init_args,
            creation_code_hash: fields.creation_code_hash,
            runtime_code_hash: fields.runtime_code_hash,
            tx_hash: fields.tx_hash,
            libraries: fields.libraries,
            proxy: None,
            implementation: None,
        }
    }

    /// The record fields, discarding any proxy information
    fn into_fields(self) -> RecordFields {
        RecordFields {
            address: self.address,
            constructor_args: self.constructor_args,
            init_args: self.init_args,
            creation_code_hash: self.creation_code_hash,
            runtime_code_hash: self.runtime_code_hash,
            tx_hash: self.tx_hash,
            libraries: self.libraries,
        }
    }

    /// Whether the entry is flagged as a proxy
    fn is_proxy(&self) -> bool {
        self.proxy == Some(true)
    }
}

impl TryFrom<RawRecord> for DeploymentRecord {
    type Error = String;

    fn try_from(mut raw: RawRecord) -> Result<Self, Self::Error> {
        let implementation = raw.implementation.take();
        match (raw.is_proxy(), implementation) {
            (true, Some(implementation)) => {
                if implementation.is_proxy() || implementation.implementation.is_some() {
                    return Err("implementation of a proxy cannot itself be a proxy".to_string());
                }
                Ok(DeploymentRecord::Proxied {
                    proxy: raw.into_fields(),
                    implementation: Box::new(implementation.into_fields()),
                })
            }
            (true, None) => Err("proxy record has no implementation".to_string()),
            // The proxy flag decides, a leftover snapshot is dropped
            (false, _) => Ok(DeploymentRecord::Direct(raw.into_fields())),
        }
    }
}

/// Parse a recorded address, reading an empty string as "not deployed"
fn deserialize_address<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Address, D::Error> {
    let address = String::deserialize(deserializer)?;
    if address.is_empty() {
        return Ok(Address::ZERO);
    }
    address.parse().map_err(serde::de::Error::custom)
}

impl From<DeploymentRecord> for RawRecord {
    fn from(record: DeploymentRecord) -> Self {
        match record {
            DeploymentRecord::Direct(fields) => RawRecord::from_fields(fields),
            DeploymentRecord::Proxied { proxy, implementation } => RawRecord {
                proxy: Some(true),
                implementation: Some(Box::new(RawRecord::from_fields(*implementation))),
                ..RawRecord::from_fields(proxy)
            },
        }
    }
}
