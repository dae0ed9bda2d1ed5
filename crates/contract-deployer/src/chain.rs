use {
    crate::{deployment::DeploymentReceipt, error::DeployError, traits::Chain},
    alloy::{
        network::{ReceiptResponse, TransactionBuilder},
        primitives::{Bytes, TxHash},
        providers::Provider,
        rpc::types::{TransactionReceipt, TransactionRequest},
    },
    ethrpc::AlloyProvider,
    std::time::Duration,
};

/// [`Chain`] backed by a JSON-RPC node. Waiting is done by polling the node
/// every `poll_interval`.
pub struct AlloyChain {
    provider: AlloyProvider,
    poll_interval: Duration,
}

impl AlloyChain {
    pub fn new(provider: AlloyProvider, poll_interval: Duration) -> Self {
        Self {
            provider,
            poll_interval,
        }
    }

    fn deployment_request(creation_code: Bytes) -> TransactionRequest {
        TransactionRequest::default().with_deploy_code(creation_code)
    }

    async fn receipt(&self, tx: TxHash) -> Result<Option<TransactionReceipt>, DeployError> {
        Ok(self.provider.get_transaction_receipt(tx).await?)
    }
}

#[async_trait::async_trait]
impl Chain for AlloyChain {
    async fn chain_id(&self) -> Result<u64, DeployError> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn submit_deployment(&self, creation_code: Bytes) -> Result<TxHash, DeployError> {
        let tx = Self::deployment_request(creation_code);
        let pending = self.provider.send_transaction(tx).await?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_deployment(&self, tx: TxHash) -> Result<DeploymentReceipt, DeployError> {
        let receipt = loop {
            if let Some(receipt) = self.receipt(tx).await? {
                break receipt;
            }
            tracing::debug!(%tx, "deployment transaction not mined yet");
            tokio::time::sleep(self.poll_interval).await;
        };

        if !receipt.status() {
            return Err(DeployError::TransactionReverted { tx });
        }
        Ok(DeploymentReceipt {
            address: receipt
                .contract_address()
                .ok_or(DeployError::MissingContractAddress { tx })?,
            block_number: receipt
                .block_number()
                .ok_or(DeployError::MissingBlockNumber { tx })?,
        })
    }

    async fn wait_for_confirmations(
        &self,
        tx: TxHash,
        confirmations: u64,
    ) -> Result<(), DeployError> {
        loop {
            // The receipt is read again on every iteration: it disappears
            // when a reorg drops the transaction and moves when the
            // transaction gets re-included in a different block.
            let included = self
                .receipt(tx)
                .await?
                .and_then(|receipt| receipt.block_number())
                .ok_or(DeployError::Reorganized { tx })?;
            let latest = self.provider.get_block_number().await?;
            let confirmed = latest.saturating_sub(included);
            if confirmed >= confirmations {
                tracing::debug!(%tx, included, latest, "deployment confirmed");
                return Ok(());
            }
            tracing::debug!(%tx, confirmed, confirmations, "waiting for more blocks");
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
