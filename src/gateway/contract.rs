use crate::{
    error::{BuilderError, SubmitError},
    gateway::network::Network,
    proposal::ProposalBuilder,
    transaction::{Proposal, SubmittedTransaction, TransactionContext},
};

/// Entry points for invoking one chaincode (or one contract within it) on a channel.
#[derive(Clone)]
pub struct Contract {
    network: Network,
    chaincode_name: String,
    contract_name: Option<String>,
}

impl Contract {
    pub(crate) fn new(
        network: Network,
        chaincode_name: String,
        contract_name: Option<String>,
    ) -> Contract {
        Contract {
            network,
            chaincode_name,
            contract_name,
        }
    }

    pub fn chaincode_name(&self) -> &str {
        &self.chaincode_name
    }

    pub fn contract_name(&self) -> Option<&str> {
        self.contract_name.as_deref()
    }

    /// A proposal builder already bound to this contract's channel, chaincode and contract.
    pub fn proposal_builder(
        &self,
        transaction_name: impl Into<String>,
    ) -> Result<ProposalBuilder, BuilderError> {
        let mut builder = ProposalBuilder::new()
            .with_channel_name(self.network.channel_name())?
            .with_chaincode_id(self.chaincode_name.as_str())?
            .with_function_name(transaction_name)?;
        if let Some(contract_name) = &self.contract_name {
            builder = builder.with_contract_id(contract_name.as_str())?;
        }
        Ok(builder)
    }

    /// Builds and signs the proposal. Nothing is sent to the network yet.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    ///  let builder = contract
    ///    .proposal_builder("TransferAsset")?
    ///    .with_function_args(["asset1", "Christopher"])?;
    ///  let transaction = contract.new_proposal(builder)?.endorse().await?;
    ///  println!("{}", String::from_utf8_lossy(transaction.result()));
    ///  let commit = transaction.submit().await?;
    ///  let status = commit.status().await?;
    /// ```
    pub fn new_proposal(&self, builder: ProposalBuilder) -> Result<Proposal, SubmitError> {
        let signing_identity = self.network.signing_identity()?;
        let prepared = builder.build(&signing_identity)?;
        Ok(Proposal::new(
            prepared,
            TransactionContext {
                signing_identity,
                connection: self.network.connection(),
                checkpointer: self.network.checkpointer(),
            },
        ))
    }

    /// Runs the transaction on a peer without recording it on the ledger.
    pub async fn evaluate_transaction(
        &self,
        transaction_name: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Vec<u8>, SubmitError> {
        let builder = self
            .proposal_builder(transaction_name)?
            .with_function_args(args)?;
        self.new_proposal(builder)?.evaluate().await
    }

    /// Endorses and submits the transaction, returning the chaincode result once
    /// the orderer has accepted it. Does not wait for commit.
    pub async fn submit_transaction(
        &self,
        transaction_name: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Vec<u8>, SubmitError> {
        let submitted = self.submit_async(transaction_name, args).await?;
        Ok(submitted.into_result())
    }

    /// Like [`Contract::submit_transaction`] but hands back the submitted
    /// transaction so its commit status can be queried.
    pub async fn submit_async(
        &self,
        transaction_name: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<SubmittedTransaction, SubmitError> {
        let builder = self
            .proposal_builder(transaction_name)?
            .with_function_args(args)?;
        self.new_proposal(builder)?.endorse().await?.submit().await
    }
}
