//! Constants used across the deployment tooling

use std::time::Duration;

/// The name under which a contract's constructor is logged
pub const CONSTRUCTOR: &str = "constructor";

/// The name of the initializer invoked on an implementation when it is
/// accepted by the proxy admin
pub const INITIALIZE_FUNCTION: &str = "initialize";

/// The proxy admin method accepting an implementation without initialization
pub const ACCEPT_PROXY_FUNCTION: &str = "acceptProxy";

/// The proxy admin method accepting an implementation and calling into it
pub const ACCEPT_PROXY_AND_CALL_FUNCTION: &str = "acceptProxyAndCall";

/// The default name of the proxy contract artifact
pub const DEFAULT_PROXY_NAME: &str = "GraphProxy";

/// The default name of the proxy admin contract artifact
pub const DEFAULT_PROXY_ADMIN_NAME: &str = "GraphProxyAdmin";

/// The default directory holding compiled contract artifacts
pub const DEFAULT_BUILD_DIR: &str = "build/contracts";

/// The default location of the address book file
pub const DEFAULT_ADDRESS_BOOK: &str = "addresses.json";

/// The file extension of a compilation artifact
pub const ARTIFACT_EXTENSION: &str = "json";

/// The prefix of the daily transaction log files
pub const TX_LOG_FILE_PREFIX: &str = "tx-";

/// The extension of the daily transaction log files
pub const TX_LOG_FILE_EXTENSION: &str = "log";

/// The interval at which transaction receipts are polled
pub const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// The number of bytes in an Ethereum address
pub const NUM_BYTES_ADDRESS: usize = 20;

/// The prefix of a hex-encoded byte string
pub const HEX_PREFIX: &str = "0x";
