use std::collections::HashMap;

use prost::Message;
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

use crate::{
    error::{BuilderError, SubmitError},
    fabric::{
        common::{ChannelHeader, Header, HeaderType, SignatureHeader},
        protos::{
            ChaincodeHeaderExtension, ChaincodeId, ChaincodeInput, ChaincodeInvocationSpec,
            ChaincodeProposalPayload, ChaincodeSpec, Proposal, SignedProposal, chaincode_spec,
        },
    },
    signer::SigningIdentity,
};

pub(crate) const NONCE_LENGTH: usize = 24;
const CHANNEL_HEADER_VERSION: i32 = 1;

/// Collects the parameters of a chaincode invocation and turns them into a signed proposal.
///
/// # Example
/// ```rust,ignore
/// let prepared = ProposalBuilder::new()
///     .with_channel_name("mychannel")?
///     .with_chaincode_id("basic")?
///     .with_function_name("CreateAsset")?
///     .with_function_args(["asset1", "blue", "5"])?
///     .build(&signing_identity)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProposalBuilder {
    channel_name: Option<String>,
    chaincode_id: Option<String>,
    contract_id: Option<String>,
    function_name: Option<String>,
    function_args: Vec<String>,
    transient: HashMap<String, Vec<u8>>,
}

impl ProposalBuilder {
    pub fn new() -> ProposalBuilder {
        ProposalBuilder::default()
    }

    pub fn with_channel_name(
        mut self,
        name: impl Into<String>,
    ) -> Result<ProposalBuilder, BuilderError> {
        self.channel_name = Some(non_empty(name, "channel name")?);
        Ok(self)
    }

    pub fn with_chaincode_id(
        mut self,
        id: impl Into<String>,
    ) -> Result<ProposalBuilder, BuilderError> {
        self.chaincode_id = Some(non_empty(id, "chaincode id")?);
        Ok(self)
    }

    /// Contract inside the chaincode. Transaction names are sent as `contract:function`.
    pub fn with_contract_id(
        mut self,
        id: impl Into<String>,
    ) -> Result<ProposalBuilder, BuilderError> {
        self.contract_id = Some(non_empty(id, "contract id")?);
        Ok(self)
    }

    pub fn with_function_name(
        mut self,
        name: impl Into<String>,
    ) -> Result<ProposalBuilder, BuilderError> {
        self.function_name = Some(non_empty(name, "function name")?);
        Ok(self)
    }

    pub fn with_function_args(
        mut self,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<ProposalBuilder, BuilderError> {
        self.function_args = args.into_iter().map(Into::into).collect();
        Ok(self)
    }

    /// Private data passed to the chaincode. It is not part of the transaction id
    /// and is not recorded on the ledger.
    pub fn with_transient(
        mut self,
        key: impl Into<String>,
        value: impl Into<Vec<u8>>,
    ) -> Result<ProposalBuilder, BuilderError> {
        let key = non_empty(key, "transient key")?;
        self.transient.insert(key, value.into());
        Ok(self)
    }

    fn qualified_function_name(&self, function_name: &str) -> String {
        match &self.contract_id {
            Some(contract_id) => format!("{}:{}", contract_id, function_name),
            None => function_name.to_string(),
        }
    }

    pub fn build(self, signing_identity: &SigningIdentity) -> Result<PreparedProposal, SubmitError> {
        let channel_name = match &self.channel_name {
            Some(channel_name) => channel_name.clone(),
            None => return Err(BuilderError::MissingParameter("channel_name".into()).into()),
        };
        let chaincode_name = match &self.chaincode_id {
            Some(chaincode_id) => chaincode_id.clone(),
            None => return Err(BuilderError::MissingParameter("chaincode_id".into()).into()),
        };
        let function_name = match &self.function_name {
            Some(function_name) => self.qualified_function_name(function_name),
            None => return Err(BuilderError::MissingParameter("function_name".into()).into()),
        };

        let chaincode_id = ChaincodeId {
            name: chaincode_name.clone(),
            ..Default::default()
        };

        let args = std::iter::once(function_name.as_str())
            .chain(self.function_args.iter().map(String::as_str))
            .map(|arg| arg.as_bytes().to_vec())
            .collect();
        let invocation_spec = ChaincodeInvocationSpec {
            chaincode_spec: Some(ChaincodeSpec {
                r#type: chaincode_spec::Type::Golang.into(),
                chaincode_id: Some(chaincode_id.clone()),
                input: Some(ChaincodeInput {
                    args,
                    ..Default::default()
                }),
                timeout: 0,
            }),
        };
        let proposal_payload = ChaincodeProposalPayload {
            input: invocation_spec.encode_to_vec(),
            transient_map: self.transient,
        };

        let creator = signing_identity.creator();
        let nonce = generate_nonce();
        let transaction_id = generate_transaction_id(&nonce, creator);

        let channel_header = ChannelHeader {
            r#type: HeaderType::EndorserTransaction.into(),
            version: CHANNEL_HEADER_VERSION,
            timestamp: Some(std::time::SystemTime::now().into()),
            channel_id: channel_name.clone(),
            tx_id: transaction_id.clone(),
            epoch: 0,
            extension: ChaincodeHeaderExtension {
                chaincode_id: Some(chaincode_id),
            }
            .encode_to_vec(),
            tls_cert_hash: vec![],
        };
        let signature_header = SignatureHeader {
            creator: creator.to_vec(),
            nonce: nonce.to_vec(),
        };
        let header = Header {
            channel_header: channel_header.encode_to_vec(),
            signature_header: signature_header.encode_to_vec(),
        };
        let proposal_bytes = Proposal {
            header: header.encode_to_vec(),
            payload: proposal_payload.encode_to_vec(),
            extension: vec![],
        }
        .encode_to_vec();

        let signature = signing_identity.sign(&proposal_bytes)?;
        tracing::debug!(
            transaction_id = %transaction_id,
            channel = %channel_name,
            chaincode = %chaincode_name,
            function = %function_name,
            "proposal built"
        );

        Ok(PreparedProposal {
            transaction_id,
            channel_name,
            signed_proposal: SignedProposal {
                proposal_bytes,
                signature,
            },
        })
    }
}

fn non_empty(value: impl Into<String>, what: &str) -> Result<String, BuilderError> {
    let value = value.into().trim().to_string();
    if value.is_empty() {
        return Err(BuilderError::InvalidParameter(format!(
            "{} cannot be empty",
            what
        )));
    }
    Ok(value)
}

/// A signed proposal together with the identifiers needed to send it.
///
/// The proposal bytes are the exact bytes that were signed and are never re-encoded.
#[derive(Debug, Clone)]
pub struct PreparedProposal {
    transaction_id: String,
    channel_name: String,
    signed_proposal: SignedProposal,
}

impl PreparedProposal {
    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    pub fn signed_proposal(&self) -> &SignedProposal {
        &self.signed_proposal
    }

    pub fn proposal_bytes(&self) -> &[u8] {
        &self.signed_proposal.proposal_bytes
    }
}

/// Fresh random bytes for the signature header and the transaction id.
pub fn generate_nonce() -> [u8; NONCE_LENGTH] {
    let mut nonce = [0u8; NONCE_LENGTH];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Creates a unique transaction ID by concatenating a nonce with an identity and then hashing the result.
///
/// # Arguments
/// * `nonce` - A byte slice representing a random nonce.
/// * `creator` - A byte slice representing the identity of the creator in serialized format.
///
/// # Returns
/// A string representing the hashed transaction ID, encoded in lowercase hexadecimal format.
pub fn generate_transaction_id(nonce: &[u8], creator: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(nonce);
    hasher.update(creator);
    hex::encode(hasher.finalize())
}
