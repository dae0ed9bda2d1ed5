pub mod arguments;
pub mod chain;
pub mod config;
pub mod deployment;
pub mod error;
pub mod runner;
pub mod traits;

use {
    crate::{
        arguments::Arguments,
        chain::AlloyChain,
        config::Config,
        runner::Runner,
        traits::ArtifactDirectory,
    },
    std::process::ExitCode,
};

pub async fn start(args: Arguments) -> ExitCode {
    let runner = match bootstrap(args).await {
        Ok(runner) => runner,
        Err(err) => {
            tracing::error!("{:?}", err.context("invalid deployment configuration"));
            return ExitCode::FAILURE;
        }
    };
    runner.execute().await
}

async fn bootstrap(args: Arguments) -> anyhow::Result<Runner<ArtifactDirectory, AlloyChain>> {
    let config = Config::from_arguments(&args).await?;
    let signer = args.private_key;
    tracing::info!(
        deployer = %signer.address(),
        network = %config.network,
        "connecting to node"
    );

    let provider = ethrpc::provider_with_signer(&config.network.url, Box::new(signer));
    let chain = AlloyChain::new(provider, config.poll_interval);
    Ok(Runner::new(config, ArtifactDirectory(args.artifacts), chain))
}
