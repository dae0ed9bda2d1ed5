//! Trait definitions for the external system boundaries of a deployment.
//!
//! These traits abstract artifact lookup and blockchain interactions to
//! enable unit testing with mocks.

use {
    crate::{deployment::DeploymentReceipt, error::DeployError},
    alloy::primitives::{Bytes, TxHash},
    contracts::{ArtifactError, Artifacts, ContractFactory},
    std::path::PathBuf,
};

/// Looks up compiled contracts by name.
#[cfg_attr(test, mockall::automock)]
pub trait ArtifactSource: Send + Sync {
    /// Returns a factory for the contract with the given bare or fully
    /// qualified name.
    fn contract_factory(&self, name: &str) -> Result<ContractFactory, ArtifactError>;
}

impl ArtifactSource for Artifacts {
    fn contract_factory(&self, name: &str) -> Result<ContractFactory, ArtifactError> {
        Artifacts::contract_factory(self, name)
    }
}

/// Artifacts directory that is only read once a factory is requested, so
/// that an uncompiled project fails the lookup like an unknown contract.
#[derive(Debug, Clone)]
pub struct ArtifactDirectory(pub PathBuf);

impl ArtifactSource for ArtifactDirectory {
    fn contract_factory(&self, name: &str) -> Result<ContractFactory, ArtifactError> {
        Artifacts::load(&self.0)?.contract_factory(name)
    }
}

/// Blockchain operations a deployment needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Chain: Send + Sync {
    /// Chain id reported by the node.
    async fn chain_id(&self) -> Result<u64, DeployError>;

    /// Submits a contract creation transaction and returns its hash as soon
    /// as the node accepted it.
    async fn submit_deployment(&self, creation_code: Bytes) -> Result<TxHash, DeployError>;

    /// Waits until the deployment transaction is mined.
    async fn wait_for_deployment(&self, tx: TxHash) -> Result<DeploymentReceipt, DeployError>;

    /// Waits until `confirmations` blocks were mined on top of the block that
    /// includes `tx`.
    async fn wait_for_confirmations(
        &self,
        tx: TxHash,
        confirmations: u64,
    ) -> Result<(), DeployError>;
}
