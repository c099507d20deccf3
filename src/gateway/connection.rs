use async_trait::async_trait;
use tonic::transport::Channel;

use crate::{
    error::RpcError,
    fabric::gateway::{
        CommitStatusResponse, EndorseRequest, EndorseResponse, EvaluateRequest, EvaluateResponse,
        SignedCommitStatusRequest, SubmitRequest, SubmitResponse, gateway_client::GatewayClient,
    },
};

/// The gateway RPC boundary.
///
/// Implementations must allow concurrent in-flight calls. Failures are returned
/// as they are, nothing is retried.
#[async_trait]
pub trait Connection: Send + Sync {
    async fn evaluate(&self, request: EvaluateRequest) -> Result<EvaluateResponse, RpcError>;

    async fn endorse(&self, request: EndorseRequest) -> Result<EndorseResponse, RpcError>;

    /// Success means the orderer accepted the transaction, not that it was committed.
    async fn submit(&self, request: SubmitRequest) -> Result<SubmitResponse, RpcError>;

    async fn commit_status(
        &self,
        request: SignedCommitStatusRequest,
    ) -> Result<CommitStatusResponse, RpcError>;
}

/// [`Connection`] over a tonic channel to a gateway peer.
#[derive(Debug, Clone)]
pub struct GrpcConnection {
    client: GatewayClient<Channel>,
}

impl GrpcConnection {
    pub fn new(channel: Channel) -> Self {
        GrpcConnection {
            client: GatewayClient::new(channel),
        }
    }
}

#[async_trait]
impl Connection for GrpcConnection {
    async fn evaluate(&self, request: EvaluateRequest) -> Result<EvaluateResponse, RpcError> {
        let mut client = self.client.clone();
        let response = client.evaluate(request).await?;
        Ok(response.into_inner())
    }

    async fn endorse(&self, request: EndorseRequest) -> Result<EndorseResponse, RpcError> {
        let mut client = self.client.clone();
        let response = client.endorse(request).await?;
        Ok(response.into_inner())
    }

    async fn submit(&self, request: SubmitRequest) -> Result<SubmitResponse, RpcError> {
        let mut client = self.client.clone();
        let response = client.submit(request).await?;
        Ok(response.into_inner())
    }

    async fn commit_status(
        &self,
        request: SignedCommitStatusRequest,
    ) -> Result<CommitStatusResponse, RpcError> {
        let mut client = self.client.clone();
        let response = client.commit_status(request).await?;
        Ok(response.into_inner())
    }
}
