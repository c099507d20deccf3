//! Recovers the chaincode response from an endorsed transaction envelope.
//!
//! `Envelope.payload` → `Payload.data` → `Transaction.actions[0].payload`
//! → `ChaincodeActionPayload.action` → `ProposalResponsePayload.extension`
//! → `ChaincodeAction.response`.

use prost::Message;

use crate::fabric::{
    common::{Envelope, Payload},
    protos::{
        ChaincodeAction, ChaincodeActionPayload, ProposalResponsePayload, Response, Transaction,
    },
};

#[derive(Debug, Clone, PartialEq)]
pub enum DecodedResult {
    Decoded(Response),
    /// The envelope is well formed but carries no chaincode response.
    Empty,
    /// One of the nested layers could not be decoded.
    Malformed(String),
}

impl DecodedResult {
    /// Chaincode return value, empty unless decoded.
    pub fn into_payload(self) -> Vec<u8> {
        match self {
            DecodedResult::Decoded(response) => response.payload,
            DecodedResult::Empty | DecodedResult::Malformed(_) => vec![],
        }
    }
}

fn decode_layer<M: Message + Default>(bytes: &[u8], layer: &str) -> Result<M, DecodedResult> {
    M::decode(bytes).map_err(|err| DecodedResult::Malformed(format!("{}: {}", layer, err)))
}

fn decode_response(envelope: &Envelope) -> Result<Response, DecodedResult> {
    let payload: Payload = decode_layer(&envelope.payload, "Payload")?;
    let transaction: Transaction = decode_layer(&payload.data, "Transaction")?;
    let action = transaction.actions.first().ok_or(DecodedResult::Empty)?;
    let action_payload: ChaincodeActionPayload =
        decode_layer(&action.payload, "ChaincodeActionPayload")?;
    let endorsed_action = action_payload.action.ok_or(DecodedResult::Empty)?;
    let response_payload: ProposalResponsePayload = decode_layer(
        &endorsed_action.proposal_response_payload,
        "ProposalResponsePayload",
    )?;
    let chaincode_action: ChaincodeAction =
        decode_layer(&response_payload.extension, "ChaincodeAction")?;
    chaincode_action.response.ok_or(DecodedResult::Empty)
}

/// Decodes the chaincode response of the first transaction action.
pub fn decode_result(envelope: &Envelope) -> DecodedResult {
    match decode_response(envelope) {
        Ok(response) => DecodedResult::Decoded(response),
        Err(outcome) => outcome,
    }
}

/// Best-effort variant of [`decode_result`]: any failure yields an empty result.
pub fn extract_result(envelope: &Envelope) -> Vec<u8> {
    decode_result(envelope).into_payload()
}
