use alloy::primitives::{Address, TxHash};

/// A deployment transaction that was accepted by the node but not mined yet.
/// There is no address until the transaction is mined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDeployment {
    pub contract_name: String,
    pub tx: TxHash,
}

/// What the receipt of a mined deployment transaction reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeploymentReceipt {
    pub address: Address,
    pub block_number: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedContract {
    pub contract_name: String,
    pub address: Address,
    /// The transaction that created the contract.
    pub tx: TxHash,
    /// Block the deployment transaction was included in.
    pub block_number: u64,
}

impl PendingDeployment {
    pub fn mined(self, receipt: DeploymentReceipt) -> DeployedContract {
        DeployedContract {
            contract_name: self.contract_name,
            address: receipt.address,
            tx: self.tx,
            block_number: receipt.block_number,
        }
    }
}
