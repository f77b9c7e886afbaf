//! Definitions of CLI arguments and commands for the deploy scripts

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use deployments::{
    client::{AlloyClient, Sender},
    constants::{DEFAULT_ADDRESS_BOOK, DEFAULT_BUILD_DIR, DEFAULT_PROXY_NAME},
};
use eyre::Result;

use crate::commands::{block, call, deploy, deploy_proxy, list, verify, Context};

/// Deploy and track the protocol contracts on a network
#[derive(Parser)]
pub struct Cli {
    /// Private key of the deployer
    #[arg(short, long = "pkey", env = "PKEY")]
    pub priv_key: String,

    /// Network RPC URL
    #[arg(short, long, env = "RPC_URL")]
    pub rpc_url: String,

    /// Path of the address book file
    #[arg(short, long, env = "ADDRESS_BOOK", default_value = DEFAULT_ADDRESS_BOOK)]
    pub address_book: PathBuf,

    /// Directory of the compiled contract artifacts
    #[arg(long, env = "ARTIFACTS_DIR", default_value = DEFAULT_BUILD_DIR)]
    pub artifacts: PathBuf,

    /// Directory the transaction logs are appended to
    #[arg(long, env = "TX_LOG_DIR", default_value = ".")]
    pub tx_log_dir: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// The commands of the deploy scripts
#[derive(Subcommand)]
pub enum Command {
    /// List the contracts recorded for the connected network
    List,
    /// Deploy a contract, linking its libraries, and record it
    Deploy(DeployArgs),
    /// Deploy a contract behind a proxy and record it
    DeployProxy(DeployProxyArgs),
    /// Check recorded contracts against their artifacts and the chain
    Verify(VerifyArgs),
    /// Send a state-changing call to a recorded contract
    Call(CallArgs),
    /// Print the current block number and base fee
    Block,
}

impl Command {
    /// Run the command against the network `sender` is connected to
    pub async fn run(
        self,
        sender: Sender<AlloyClient>,
        address_book: &Path,
        artifacts: &Path,
        tx_log_dir: &Path,
    ) -> Result<()> {
        let mut ctx = Context::new(sender, address_book, artifacts, tx_log_dir).await?;
        match self {
            Command::List => list(&ctx),
            Command::Deploy(args) => deploy(args, &mut ctx).await,
            Command::DeployProxy(args) => deploy_proxy(args, &mut ctx).await,
            Command::Verify(args) => verify(args, &ctx).await,
            Command::Call(args) => call(args, &ctx).await,
            Command::Block => block(&ctx).await,
        }
    }
}

/// Deploy a contract
#[derive(Args)]
pub struct DeployArgs {
    /// Name of the contract artifact
    #[arg(short, long)]
    pub contract: String,

    /// Constructor arguments
    #[arg(short, long, num_args = 0..)]
    pub args: Vec<String>,
}

/// Deploy a contract behind a proxy administered by the address book's
/// proxy admin.
///
/// The implementation is deployed and recorded first, then the proxy, then
/// the proxy admin accepts the implementation, initializing it if arguments
/// are given.
#[derive(Args)]
pub struct DeployProxyArgs {
    /// Name of the implementation contract artifact
    #[arg(short, long)]
    pub contract: String,

    /// Arguments of the implementation's initializer
    #[arg(short, long, num_args = 0..)]
    pub init_args: Vec<String>,

    /// Name of the proxy contract artifact
    #[arg(long, default_value = DEFAULT_PROXY_NAME)]
    pub proxy_name: String,

    /// Print the accept call for execution by the proxy admin's owner
    /// instead of sending it
    #[arg(long)]
    pub build_accept_tx: bool,
}

/// Verify recorded contracts
#[derive(Args)]
pub struct VerifyArgs {
    /// Name of the contract to verify, every recorded contract if unset
    #[arg(short, long)]
    pub contract: Option<String>,

    /// Only compare the runtime code
    #[arg(long)]
    pub skip_creation_code: bool,
}

/// Call a recorded contract
#[derive(Args)]
pub struct CallArgs {
    /// Name of the contract
    #[arg(short, long)]
    pub contract: String,

    /// Name of the function to call
    #[arg(short, long)]
    pub function: String,

    /// Arguments of the call
    #[arg(short, long, num_args = 0..)]
    pub args: Vec<String>,
}
