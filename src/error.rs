use prost::Message;
use thiserror::Error;

use crate::fabric::{gateway::ErrorDetail, rpc};

const ERROR_DETAIL_TYPE: &str = "gateway.ErrorDetail";

/// Configuration error raised by builders and by entry points missing a required capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Missing parameter: {0}")]
    MissingParameter(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    /// Key material could not be parsed.
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    #[error("Signing failed: {0}")]
    Signing(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Checkpoint failed: {0}")]
pub struct CheckpointError(pub String);

/// Failure reported by the gateway or the transport underneath it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{code:?}: {message}")]
pub struct RpcError {
    pub code: tonic::Code,
    pub message: String,
    /// Per-endorser records the gateway attached to the status, if any.
    pub details: Vec<ErrorDetail>,
}

impl RpcError {
    pub fn new(code: tonic::Code, message: impl Into<String>) -> Self {
        RpcError {
            code,
            message: message.into(),
            details: vec![],
        }
    }
}

impl From<tonic::Status> for RpcError {
    fn from(status: tonic::Status) -> Self {
        let details = match rpc::Status::decode(status.details()) {
            Ok(rpc_status) => rpc_status
                .details
                .iter()
                .filter(|any| any.type_url.ends_with(ERROR_DETAIL_TYPE))
                .filter_map(|any| ErrorDetail::decode(any.value.as_slice()).ok())
                .collect(),
            Err(_) => vec![],
        };
        RpcError {
            code: status.code(),
            message: status.message().to_string(),
            details,
        }
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] BuilderError),
    #[error(transparent)]
    Signer(#[from] SignerError),
    #[error("Request to node failed: {0}")]
    Rpc(#[from] RpcError),
    #[error("Trying to submit something to the network, while not being connected to it")]
    NotConnected,
    #[error("Received empty response from node")]
    EmptyResponse,
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
}
