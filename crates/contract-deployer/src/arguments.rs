use {
    alloy::signers::local::PrivateKeySigner,
    clap::Parser,
    std::{path::PathBuf, time::Duration},
    tracing::level_filters::LevelFilter,
    url::Url,
};

#[derive(Parser)]
pub struct Arguments {
    #[clap(long, env, default_value = "warn,contract_deployer=info,ethrpc=info")]
    pub log_filter: String,

    #[clap(long, env, default_value = "error")]
    pub log_stderr_threshold: LevelFilter,

    /// Emit logs as JSON lines.
    #[clap(long, env, action = clap::ArgAction::Set, default_value = "false")]
    pub log_json: bool,

    /// Name of the contract to deploy. Use `path/To.sol:Name` when several
    /// sources define a contract with the same name.
    #[clap(long, env, default_value = "StudentReportCard")]
    pub contract: String,

    /// Network to deploy to, either a built-in preset or an entry of the
    /// `--config` file.
    #[clap(long, env, default_value = "core-testnet2")]
    pub network: String,

    /// TOML file with additional network definitions.
    #[clap(long, env)]
    pub config: Option<PathBuf>,

    /// Node url to use instead of the one configured for the network.
    #[clap(long, env)]
    pub node_url: Option<Url>,

    /// Hex encoded private key of the deployer account.
    #[clap(long, env)]
    pub private_key: PrivateKeySigner,

    /// Directory containing the compiled contract artifacts.
    #[clap(long, env, default_value = "artifacts")]
    pub artifacts: PathBuf,

    /// Number of blocks that have to be mined on top of the deployment
    /// block before the deployment counts as final.
    #[clap(long, env, default_value = "5")]
    pub confirmations: u64,

    /// Maximum time in seconds to wait for the deployment to be mined.
    #[clap(
        long,
        env,
        default_value = "300",
        value_parser = duration_from_seconds,
    )]
    pub deployment_timeout: Duration,

    /// Maximum time in seconds to wait for block confirmations.
    #[clap(
        long,
        env,
        default_value = "600",
        value_parser = duration_from_seconds,
    )]
    pub confirmation_timeout: Duration,

    /// How often in seconds the node is polled while waiting.
    #[clap(
        long,
        env,
        default_value = "2",
        value_parser = duration_from_seconds,
    )]
    pub poll_interval: Duration,
}

/// Parses a non-negative, finite number of seconds.
pub fn duration_from_seconds(s: &str) -> anyhow::Result<Duration> {
    Ok(Duration::try_from_secs_f32(s.parse()?)?)
}

impl std::fmt::Display for Arguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Self {
            log_filter,
            log_stderr_threshold,
            log_json,
            contract,
            network,
            config,
            node_url,
            private_key: _,
            artifacts,
            confirmations,
            deployment_timeout,
            confirmation_timeout,
            poll_interval,
        } = self;

        writeln!(f, "log_filter: {log_filter}")?;
        writeln!(f, "log_stderr_threshold: {log_stderr_threshold}")?;
        writeln!(f, "log_json: {log_json}")?;
        writeln!(f, "contract: {contract}")?;
        writeln!(f, "network: {network}")?;
        writeln!(f, "config: {config:?}")?;
        writeln!(f, "node_url: {node_url:?}")?;
        writeln!(f, "private_key: SECRET")?;
        writeln!(f, "artifacts: {}", artifacts.display())?;
        writeln!(f, "confirmations: {confirmations}")?;
        writeln!(f, "deployment_timeout: {deployment_timeout:?}")?;
        writeln!(f, "confirmation_timeout: {confirmation_timeout:?}")?;
        writeln!(f, "poll_interval: {poll_interval:?}")?;
        Ok(())
    }
}
