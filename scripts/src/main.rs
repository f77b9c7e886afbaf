use clap::Parser;
use deployments::client::setup_client;
use eyre::Result;
use scripts::cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        priv_key,
        rpc_url,
        address_book,
        artifacts,
        tx_log_dir,
        command,
    } = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let sender = setup_client(&priv_key, &rpc_url).await?;

    command
        .run(sender, &address_book, &artifacts, &tx_log_dir)
        .await
}
