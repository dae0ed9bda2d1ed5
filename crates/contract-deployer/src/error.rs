use {
    alloy::{primitives::TxHash, transports::TransportError},
    contracts::ArtifactError,
    ethrpc::errors::RpcErrorExt,
    std::{fmt, time::Duration},
};

/// The two points at which a deployment waits on the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Deployment,
    Confirmations,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Deployment => f.write_str("the deployment to be mined"),
            Stage::Confirmations => f.write_str("block confirmations"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error("network {network} expects chain {expected} but the node is on chain {actual}")]
    ChainIdMismatch {
        network: String,
        expected: u64,
        actual: u64,
    },
    #[error("deployer account has insufficient funds")]
    InsufficientFunds(#[source] TransportError),
    #[error("node reports that the deployment reverts")]
    ExecutionReverted(#[source] TransportError),
    #[error("node request failed")]
    Network(#[source] TransportError),
    #[error("deployment transaction {tx} reverted")]
    TransactionReverted { tx: TxHash },
    #[error("receipt of deployment transaction {tx} has no contract address")]
    MissingContractAddress { tx: TxHash },
    #[error("receipt of deployment transaction {tx} has no block number")]
    MissingBlockNumber { tx: TxHash },
    #[error("deployment transaction {tx} is no longer part of the chain")]
    Reorganized { tx: TxHash },
    #[error("timed out after {after:?} waiting for {stage}")]
    Timeout { stage: Stage, after: Duration },
}

impl From<TransportError> for DeployError {
    fn from(err: TransportError) -> Self {
        if err.is_insufficient_funds() {
            Self::InsufficientFunds(err)
        } else if err.is_revert() {
            Self::ExecutionReverted(err)
        } else {
            Self::Network(err)
        }
    }
}
