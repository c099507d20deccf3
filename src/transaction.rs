//! The life of one invocation, one type per phase:
//! [`Proposal`] (signed, not sent) → [`Transaction`] (endorsed, result known)
//! → [`SubmittedTransaction`] (accepted by the orderer).

use std::sync::Arc;

use prost::Message;

use crate::{
    checkpoint::Checkpointer,
    envelope::{DecodedResult, decode_result},
    error::SubmitError,
    fabric::{
        common::Envelope,
        gateway::{
            CommitStatusRequest, EndorseRequest, EvaluateRequest, SignedCommitStatusRequest,
            SubmitRequest,
        },
        protos::{SignedProposal, TxValidationCode},
    },
    gateway::connection::Connection,
    proposal::PreparedProposal,
    signer::SigningIdentity,
};

#[derive(Clone)]
pub(crate) struct TransactionContext {
    pub(crate) signing_identity: SigningIdentity,
    pub(crate) connection: Arc<dyn Connection>,
    pub(crate) checkpointer: Option<Arc<dyn Checkpointer>>,
}

/// A signed proposal ready to be evaluated or endorsed.
pub struct Proposal {
    prepared: PreparedProposal,
    context: TransactionContext,
}

impl Proposal {
    pub(crate) fn new(prepared: PreparedProposal, context: TransactionContext) -> Proposal {
        Proposal { prepared, context }
    }

    pub fn transaction_id(&self) -> &str {
        self.prepared.transaction_id()
    }

    /// Serialized proposal, exactly as signed.
    pub fn bytes(&self) -> &[u8] {
        self.prepared.proposal_bytes()
    }

    pub fn signed_proposal(&self) -> &SignedProposal {
        self.prepared.signed_proposal()
    }

    /// Single round trip to the gateway. Nothing is ordered or committed.
    pub async fn evaluate(self) -> Result<Vec<u8>, SubmitError> {
        tracing::debug!(
            transaction_id = %self.prepared.transaction_id(),
            channel = %self.prepared.channel_name(),
            "evaluating proposal"
        );
        let request = EvaluateRequest {
            transaction_id: self.prepared.transaction_id().to_string(),
            channel_id: self.prepared.channel_name().to_string(),
            proposal: Some(self.prepared.signed_proposal().clone()),
            target_organizations: vec![],
        };
        let response = self.context.connection.evaluate(request).await?;
        match response.result {
            Some(result) => Ok(result.payload),
            None => Err(SubmitError::EmptyResponse),
        }
    }

    /// Collects endorsements. The returned transaction already knows the chaincode result.
    pub async fn endorse(self) -> Result<Transaction, SubmitError> {
        let transaction_id = self.prepared.transaction_id().to_string();
        let channel_name = self.prepared.channel_name().to_string();
        tracing::debug!(
            transaction_id = %transaction_id,
            channel = %channel_name,
            "endorsing proposal"
        );
        let request = EndorseRequest {
            transaction_id: transaction_id.clone(),
            channel_id: channel_name.clone(),
            proposed_transaction: Some(self.prepared.signed_proposal().clone()),
            endorsing_organizations: vec![],
        };
        let response = self.context.connection.endorse(request).await?;
        let envelope = match response.prepared_transaction {
            Some(envelope) => envelope,
            None => return Err(SubmitError::EmptyResponse),
        };

        let decoded = decode_result(&envelope);
        if let DecodedResult::Malformed(reason) = &decoded {
            tracing::warn!(
                transaction_id = %transaction_id,
                reason = %reason,
                "endorsed envelope could not be decoded, result is empty"
            );
        }

        Ok(Transaction {
            transaction_id,
            channel_name,
            envelope,
            decoded,
            context: self.context,
        })
    }
}

/// An endorsed transaction whose envelope has not been signed or submitted yet.
pub struct Transaction {
    transaction_id: String,
    channel_name: String,
    envelope: Envelope,
    decoded: DecodedResult,
    context: TransactionContext,
}

impl Transaction {
    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    /// Chaincode return value; empty when the envelope carried none or could not be decoded.
    pub fn result(&self) -> &[u8] {
        match &self.decoded {
            DecodedResult::Decoded(response) => &response.payload,
            DecodedResult::Empty | DecodedResult::Malformed(_) => &[],
        }
    }

    pub fn decoded_result(&self) -> &DecodedResult {
        &self.decoded
    }

    /// The prepared envelope as returned by the gateway.
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Signs the envelope payload and sends it to the orderer.
    pub async fn submit(self) -> Result<SubmittedTransaction, SubmitError> {
        let mut envelope = self.envelope;
        envelope.signature = self.context.signing_identity.sign(&envelope.payload)?;

        tracing::debug!(
            transaction_id = %self.transaction_id,
            channel = %self.channel_name,
            "submitting transaction"
        );
        let request = SubmitRequest {
            transaction_id: self.transaction_id.clone(),
            channel_id: self.channel_name.clone(),
            prepared_transaction: Some(envelope),
        };
        self.context.connection.submit(request).await?;

        Ok(SubmittedTransaction {
            result: self.decoded.into_payload(),
            transaction_id: self.transaction_id,
            channel_name: self.channel_name,
            context: self.context,
        })
    }
}

/// A transaction accepted for ordering. Commit may still fail validation.
pub struct SubmittedTransaction {
    transaction_id: String,
    channel_name: String,
    result: Vec<u8>,
    context: TransactionContext,
}

impl SubmittedTransaction {
    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn result(&self) -> &[u8] {
        &self.result
    }

    pub fn into_result(self) -> Vec<u8> {
        self.result
    }

    /// Asks the gateway how the transaction was validated, waiting for it to be committed.
    pub async fn status(&self) -> Result<CommitStatus, SubmitError> {
        let request = CommitStatusRequest {
            transaction_id: self.transaction_id.clone(),
            channel_id: self.channel_name.clone(),
            identity: self.context.signing_identity.creator().to_vec(),
        }
        .encode_to_vec();
        let signature = self.context.signing_identity.sign(&request)?;

        tracing::debug!(
            transaction_id = %self.transaction_id,
            channel = %self.channel_name,
            "requesting commit status"
        );
        let response = self
            .context
            .connection
            .commit_status(SignedCommitStatusRequest { request, signature })
            .await?;

        let status = CommitStatus {
            transaction_id: self.transaction_id.clone(),
            code: TxValidationCode::try_from(response.result)
                .unwrap_or(TxValidationCode::InvalidOtherReason),
            block_number: response.block_number,
        };
        if status.is_successful()
            && let Some(checkpointer) = &self.context.checkpointer
        {
            checkpointer.checkpoint_transaction(status.block_number, &status.transaction_id)?;
        }
        Ok(status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitStatus {
    pub transaction_id: String,
    pub code: TxValidationCode,
    pub block_number: u64,
}

impl CommitStatus {
    pub fn is_successful(&self) -> bool {
        self.code == TxValidationCode::Valid
    }
}
