//! Hashing and argument helpers shared by the deployment modules

use alloy_primitives::{keccak256, B256};

/// Hash a byte string the way code hashes are recorded in the address book
pub fn hash_bytes(bytes: impl AsRef<[u8]>) -> B256 {
    keccak256(bytes)
}

/// Whether a runtime code hash belongs to an address with no code.
///
/// Some nodes report a single zero byte rather than empty code for accounts
/// without code, so both are treated as empty.
pub fn is_empty_code_hash(hash: B256) -> bool {
    hash == hash_bytes([0u8; 0]) || hash == hash_bytes([0u8])
}

/// The stringified arguments to record, or `None` if there are none
pub fn non_empty_args(args: &[String]) -> Option<Vec<String>> {
    (!args.is_empty()).then(|| args.to_vec())
}
