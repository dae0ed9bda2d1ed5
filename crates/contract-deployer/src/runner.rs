use {
    crate::{
        config::Config,
        deployment::{DeployedContract, PendingDeployment},
        error::{DeployError, Stage},
        traits::{ArtifactSource, Chain},
    },
    contracts::ContractFactory,
    std::{future::Future, process::ExitCode, time::Duration},
};

/// Deploys a single contract and waits until the deployment is final.
pub struct Runner<A, C> {
    config: Config,
    artifacts: A,
    chain: C,
}

impl<A: ArtifactSource, C: Chain> Runner<A, C> {
    pub fn new(config: Config, artifacts: A, chain: C) -> Self {
        Self {
            config,
            artifacts,
            chain,
        }
    }

    /// Runs the deployment and maps its outcome to the exit code of the
    /// process. Errors are logged here and nowhere else.
    pub async fn execute(&self) -> ExitCode {
        match self.run().await {
            Ok(_) => ExitCode::SUCCESS,
            Err(err) => {
                tracing::error!(
                    "{:?}",
                    anyhow::Error::from(err).context("contract deployment failed")
                );
                ExitCode::FAILURE
            }
        }
    }

    pub async fn run(&self) -> Result<DeployedContract, DeployError> {
        tracing::info!("Deploying {} contract...", self.config.contract);

        let factory = self.artifacts.contract_factory(&self.config.contract)?;
        self.ensure_chain_id().await?;
        let pending = self.deploy(factory).await?;

        let receipt = bounded(
            Stage::Deployment,
            self.config.deployment_timeout,
            self.chain.wait_for_deployment(pending.tx),
        )
        .await?;
        let deployed = pending.mined(receipt);
        tracing::info!(
            tx = %deployed.tx,
            block = deployed.block_number,
            "{} deployed to {} on {}",
            deployed.contract_name,
            deployed.address,
            self.config.network,
        );

        tracing::info!("Waiting for block confirmations...");
        bounded(
            Stage::Confirmations,
            self.config.confirmation_timeout,
            self.chain
                .wait_for_confirmations(deployed.tx, self.config.confirmations),
        )
        .await?;

        tracing::info!("Contract deployment completed successfully!");
        Ok(deployed)
    }

    async fn ensure_chain_id(&self) -> Result<(), DeployError> {
        let network = &self.config.network;
        let Some(expected) = network.chain_id else {
            return Ok(());
        };
        let actual = self.chain.chain_id().await?;
        if actual != expected {
            return Err(DeployError::ChainIdMismatch {
                network: network.name.clone(),
                expected,
                actual,
            });
        }
        Ok(())
    }

    async fn deploy(&self, factory: ContractFactory) -> Result<PendingDeployment, DeployError> {
        let contract_name = factory.contract_name().to_owned();
        tracing::debug!(
            contract = factory.fully_qualified_name(),
            abi_items = factory.abi().len(),
            "submitting deployment"
        );
        let tx = self
            .chain
            .submit_deployment(factory.into_creation_code())
            .await?;
        tracing::debug!(%tx, "deployment transaction accepted by the node");
        Ok(PendingDeployment { contract_name, tx })
    }
}

async fn bounded<T>(
    stage: Stage,
    after: Duration,
    future: impl Future<Output = Result<T, DeployError>>,
) -> Result<T, DeployError> {
    tokio::time::timeout(after, future)
        .await
        .map_err(|_| DeployError::Timeout { stage, after })?
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            config::Network,
            deployment::DeploymentReceipt,
            traits::{MockArtifactSource, MockChain},
        },
        alloy::primitives::{Address, Bytes, TxHash},
        contracts::{Artifact, ArtifactError, Artifacts},
        ethrpc::errors::testing_node_error,
        serde_json::json,
        std::{
            io::Write,
            sync::{Arc, Mutex},
        },
    };

    const TX: TxHash = TxHash::repeat_byte(0x42);
    const ADDRESS: Address = Address::repeat_byte(0xab);
    const BYTECODE: &str = "0x6080604052348015600f57600080fd5b50603f80601d6000396000f3fe";

    fn config(chain_id: Option<u64>) -> Config {
        Config {
            contract: "StudentReportCard".to_owned(),
            network: Network {
                name: "core-testnet2".to_owned(),
                url: "https://rpc.test2.btcs.network".parse().unwrap(),
                chain_id,
            },
            confirmations: 5,
            deployment_timeout: Duration::from_secs(300),
            confirmation_timeout: Duration::from_secs(600),
            poll_interval: Duration::from_secs(2),
        }
    }

    fn artifact() -> Artifact {
        serde_json::from_value(json!({
            "_format": "hh-sol-artifact-1",
            "contractName": "StudentReportCard",
            "sourceName": "contracts/StudentReportCard.sol",
            "abi": [],
            "bytecode": BYTECODE,
            "deployedBytecode": BYTECODE,
            "linkReferences": {},
            "deployedLinkReferences": {},
        }))
        .unwrap()
    }

    fn artifacts() -> MockArtifactSource {
        let mut artifacts = MockArtifactSource::new();
        artifacts
            .expect_contract_factory()
            .withf(|name| name == "StudentReportCard")
            .times(1)
            .returning(|_| ContractFactory::new(&artifact()));
        artifacts
    }

    /// Chain on which every step succeeds, each expected exactly once.
    fn healthy_chain() -> MockChain {
        let mut chain = MockChain::new();
        chain.expect_chain_id().times(1).returning(|| Ok(1114));
        chain
            .expect_submit_deployment()
            .withf(|code| *code == BYTECODE.parse::<Bytes>().unwrap())
            .times(1)
            .returning(|_| Ok(TX));
        chain
            .expect_wait_for_deployment()
            .withf(|tx| *tx == TX)
            .times(1)
            .returning(|_| {
                Ok(DeploymentReceipt {
                    address: ADDRESS,
                    block_number: 16,
                })
            });
        chain
            .expect_wait_for_confirmations()
            .withf(|tx, confirmations| *tx == TX && *confirmations == 5)
            .times(1)
            .returning(|_, _| Ok(()));
        chain
    }

    #[derive(Clone, Default)]
    struct Logs(Arc<Mutex<Vec<u8>>>);

    impl Logs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Logs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Runs the deployment with logs captured for the current thread.
    async fn execute(runner: &Runner<impl ArtifactSource, impl Chain>) -> (ExitCode, String) {
        let logs = Logs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);
        let code = runner.execute().await;
        (code, logs.contents())
    }

    #[tokio::test]
    async fn deploys_and_waits_for_confirmations() {
        let runner = Runner::new(config(Some(1114)), artifacts(), healthy_chain());

        let (code, logs) = execute(&runner).await;

        assert_eq!(code, ExitCode::SUCCESS);
        assert!(logs.contains("Deploying StudentReportCard contract..."));
        assert_eq!(logs.matches(&ADDRESS.to_string()).count(), 1);
        assert!(logs.contains(&format!(
            "StudentReportCard deployed to {ADDRESS} on core-testnet2"
        )));
        assert!(logs.contains("Waiting for block confirmations..."));
        assert!(logs.contains("Contract deployment completed successfully!"));
        assert!(!logs.contains("ERROR"));
    }

    #[tokio::test]
    async fn returns_deployed_contract() {
        let runner = Runner::new(config(Some(1114)), artifacts(), healthy_chain());

        let deployed = runner.run().await.unwrap();

        assert_eq!(
            deployed,
            DeployedContract {
                contract_name: "StudentReportCard".to_owned(),
                address: ADDRESS,
                tx: TX,
                block_number: 16,
            }
        );
    }

    #[tokio::test]
    async fn deploy_rejected_by_node() {
        let mut chain = MockChain::new();
        chain.expect_chain_id().times(1).returning(|| Ok(1114));
        chain.expect_submit_deployment().times(1).returning(|_| {
            Err(testing_node_error("insufficient funds for gas * price + value").into())
        });
        chain.expect_wait_for_deployment().never();
        chain.expect_wait_for_confirmations().never();
        let runner = Runner::new(config(Some(1114)), artifacts(), chain);

        let (code, logs) = execute(&runner).await;

        assert_eq!(code, ExitCode::FAILURE);
        assert!(logs.contains("ERROR"));
        assert!(logs.contains("insufficient funds"));
        assert!(!logs.contains("deployed to"));
        assert!(!logs.contains("completed successfully"));
    }

    #[tokio::test]
    async fn confirmation_wait_fails_after_reorg() {
        let mut chain = MockChain::new();
        chain.expect_chain_id().times(1).returning(|| Ok(1114));
        chain.expect_submit_deployment().times(1).returning(|_| Ok(TX));
        chain.expect_wait_for_deployment().times(1).returning(|_| {
            Ok(DeploymentReceipt {
                address: ADDRESS,
                block_number: 16,
            })
        });
        chain
            .expect_wait_for_confirmations()
            .withf(|tx, confirmations| *tx == TX && *confirmations == 5)
            .times(1)
            .returning(|tx, _| Err(DeployError::Reorganized { tx }));
        let runner = Runner::new(config(Some(1114)), artifacts(), chain);

        let (code, logs) = execute(&runner).await;

        assert_eq!(code, ExitCode::FAILURE);
        assert_eq!(logs.matches(&ADDRESS.to_string()).count(), 1);
        assert!(logs.contains("Waiting for block confirmations..."));
        assert!(logs.contains("is no longer part of the chain"));
        assert!(!logs.contains("completed successfully"));
    }

    #[tokio::test]
    async fn reverted_deployment() {
        let mut chain = MockChain::new();
        chain.expect_chain_id().times(1).returning(|| Ok(1114));
        chain.expect_submit_deployment().times(1).returning(|_| Ok(TX));
        chain
            .expect_wait_for_deployment()
            .times(1)
            .returning(|tx| Err(DeployError::TransactionReverted { tx }));
        chain.expect_wait_for_confirmations().never();
        let runner = Runner::new(config(Some(1114)), artifacts(), chain);

        let result = runner.run().await;

        assert!(matches!(result, Err(DeployError::TransactionReverted { tx }) if tx == TX));
    }

    #[tokio::test]
    async fn unknown_contract() {
        let mut artifacts = MockArtifactSource::new();
        artifacts.expect_contract_factory().times(1).returning(|name| {
            Err(ArtifactError::ContractNotFound {
                name: name.to_owned(),
            })
        });
        let mut chain = MockChain::new();
        chain.expect_chain_id().never();
        chain.expect_submit_deployment().never();
        let runner = Runner::new(config(Some(1114)), artifacts, chain);

        let (code, logs) = execute(&runner).await;

        assert_eq!(code, ExitCode::FAILURE);
        assert!(logs.contains("Deploying StudentReportCard contract..."));
        assert!(logs.contains("artifact for contract StudentReportCard not found"));
        assert!(!logs.contains("completed successfully"));
    }

    #[tokio::test]
    async fn wrong_chain() {
        let mut chain = MockChain::new();
        chain.expect_chain_id().times(1).returning(|| Ok(31337));
        chain.expect_submit_deployment().never();
        let runner = Runner::new(config(Some(1114)), artifacts(), chain);

        let result = runner.run().await;

        assert!(matches!(
            result,
            Err(DeployError::ChainIdMismatch {
                expected: 1114,
                actual: 31337,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn chain_id_is_not_checked_without_expectation() {
        let mut chain = MockChain::new();
        chain.expect_chain_id().never();
        chain.expect_submit_deployment().times(1).returning(|_| Ok(TX));
        chain.expect_wait_for_deployment().times(1).returning(|_| {
            Ok(DeploymentReceipt {
                address: ADDRESS,
                block_number: 16,
            })
        });
        chain
            .expect_wait_for_confirmations()
            .times(1)
            .returning(|_, _| Ok(()));
        let runner = Runner::new(config(None), artifacts(), chain);

        runner.run().await.unwrap();
    }

    /// Chain whose waits never finish.
    struct StalledChain {
        mined: bool,
    }

    #[async_trait::async_trait]
    impl Chain for StalledChain {
        async fn chain_id(&self) -> Result<u64, DeployError> {
            Ok(1114)
        }

        async fn submit_deployment(&self, _: Bytes) -> Result<TxHash, DeployError> {
            Ok(TX)
        }

        async fn wait_for_deployment(&self, _: TxHash) -> Result<DeploymentReceipt, DeployError> {
            if !self.mined {
                std::future::pending::<()>().await;
            }
            Ok(DeploymentReceipt {
                address: ADDRESS,
                block_number: 16,
            })
        }

        async fn wait_for_confirmations(&self, _: TxHash, _: u64) -> Result<(), DeployError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn deployment_times_out() {
        let runner = Runner::new(
            config(Some(1114)),
            Artifacts::new(vec![artifact()]),
            StalledChain { mined: false },
        );

        let result = runner.run().await;

        assert!(matches!(
            result,
            Err(DeployError::Timeout {
                stage: Stage::Deployment,
                after,
            }) if after == Duration::from_secs(300)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn confirmations_time_out() {
        let runner = Runner::new(
            config(Some(1114)),
            Artifacts::new(vec![artifact()]),
            StalledChain { mined: true },
        );

        let (code, logs) = execute(&runner).await;

        assert_eq!(code, ExitCode::FAILURE);
        assert!(logs.contains("timed out after 600s waiting for block confirmations"));
        assert!(!logs.contains("completed successfully"));
    }
}
