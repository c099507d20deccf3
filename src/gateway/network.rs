use std::sync::Arc;

use crate::{
    checkpoint::Checkpointer,
    error::BuilderError,
    gateway::{connection::Connection, contract::Contract},
    identity::Identity,
    signer::{Signer, SigningIdentity},
};

/// A channel seen through one client identity.
#[derive(Clone)]
pub struct Network {
    channel_name: String,
    identity: Identity,
    signer: Option<Arc<dyn Signer>>,
    connection: Arc<dyn Connection>,
    checkpointer: Option<Arc<dyn Checkpointer>>,
}

impl Network {
    pub(crate) fn new(
        channel_name: String,
        identity: Identity,
        signer: Option<Arc<dyn Signer>>,
        connection: Arc<dyn Connection>,
    ) -> Network {
        Network {
            channel_name,
            identity,
            signer,
            connection,
            checkpointer: None,
        }
    }

    /// Records the block and transaction id of every transaction reported as committed.
    pub fn with_checkpointer(mut self, checkpointer: Arc<dyn Checkpointer>) -> Network {
        self.checkpointer = Some(checkpointer);
        self
    }

    pub fn get_contract(&self, chaincode_name: impl Into<String>) -> Contract {
        Contract::new(self.clone(), chaincode_name.into(), None)
    }

    /// Contract `contract_name` inside a chaincode packaging several contracts.
    pub fn get_contract_with_name(
        &self,
        chaincode_name: impl Into<String>,
        contract_name: impl Into<String>,
    ) -> Contract {
        Contract::new(self.clone(), chaincode_name.into(), Some(contract_name.into()))
    }

    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub(crate) fn signing_identity(&self) -> Result<SigningIdentity, BuilderError> {
        match &self.signer {
            Some(signer) => Ok(SigningIdentity::new(self.identity.clone(), signer.clone())),
            None => Err(BuilderError::MissingParameter("signer".into())),
        }
    }

    pub(crate) fn connection(&self) -> Arc<dyn Connection> {
        self.connection.clone()
    }

    pub(crate) fn checkpointer(&self) -> Option<Arc<dyn Checkpointer>> {
        self.checkpointer.clone()
    }
}
