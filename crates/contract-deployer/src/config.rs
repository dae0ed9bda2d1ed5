use {
    crate::arguments::Arguments,
    anyhow::{Context, Result, bail},
    serde::Deserialize,
    std::{collections::BTreeMap, fmt, path::Path, time::Duration},
    url::Url,
};

/// The network a contract gets deployed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    pub name: String,
    pub url: Url,
    /// Chain id the node has to report before anything gets deployed. Not
    /// checked when unset.
    pub chain_id: Option<u64>,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct NetworksFile {
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct NetworkEntry {
    pub url: Url,
    pub chain_id: Option<u64>,
}

impl NetworksFile {
    pub async fn from_path(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read network config {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse network config {}", path.display()))
    }

    /// Resolves a network by name. Entries of this file take precedence over
    /// the built-in presets and `node_url` replaces whatever url was found.
    /// An unknown network is only accepted when `node_url` is given.
    pub fn resolve(&self, name: &str, node_url: Option<&Url>) -> Result<Network> {
        let (url, chain_id) = if let Some(entry) = self.networks.get(name) {
            (entry.url.clone(), entry.chain_id)
        } else if let Some(preset) = contracts::networks::preset(name) {
            let url = preset
                .url
                .parse()
                .with_context(|| format!("invalid url for network preset {name}"))?;
            (url, Some(preset.chain_id))
        } else if let Some(url) = node_url {
            (url.clone(), None)
        } else {
            bail!("unknown network {name}, configure it or pass a node url");
        };

        Ok(Network {
            name: name.to_owned(),
            url: node_url.cloned().unwrap_or(url),
            chain_id,
        })
    }
}

/// Everything a deployment run needs, resolved up front.
#[derive(Debug, Clone)]
pub struct Config {
    pub contract: String,
    pub network: Network,
    pub confirmations: u64,
    pub deployment_timeout: Duration,
    pub confirmation_timeout: Duration,
    pub poll_interval: Duration,
}

impl Config {
    pub async fn from_arguments(args: &Arguments) -> Result<Self> {
        let networks = match &args.config {
            Some(path) => NetworksFile::from_path(path).await?,
            None => NetworksFile::default(),
        };
        let network = networks.resolve(&args.network, args.node_url.as_ref())?;
        tracing::debug!(?network, "resolved network");

        Ok(Self {
            contract: args.contract.clone(),
            network,
            confirmations: args.confirmations,
            deployment_timeout: args.deployment_timeout,
            confirmation_timeout: args.confirmation_timeout,
            poll_interval: args.poll_interval,
        })
    }
}
