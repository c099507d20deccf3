use std::{env, fs};

use crate::{
    error::{BuilderError, SubmitError},
    gateway::client::ClientBuilder,
    identity::IdentityBuilder,
    signer::EcdsaSigner,
};

pub const MSP_ID: &str = "MSP_ID";
pub const CERT_PATH: &str = "CERT_PATH";
pub const KEY_PATH: &str = "KEY_PATH";
pub const TLS_CERT_PATH: &str = "TLS_CERT_PATH";
pub const PEER_ENDPOINT: &str = "PEER_ENDPOINT";
pub const PEER_SCHEME: &str = "PEER_SCHEME";

/// Client material and peer address, usually read from the environment.
#[derive(Clone)]
pub struct ClientConfig {
    pub msp_id: String,
    pub cert_pem: Vec<u8>,
    pub key_pem: Vec<u8>,
    pub tls_ca_pem: Vec<u8>,
    pub endpoint: Option<String>,
    pub scheme: Option<String>,
}

impl ClientConfig {
    /// Reads `MSP_ID`, `CERT_PATH`, `KEY_PATH` and `TLS_CERT_PATH`, plus the optional
    /// `PEER_ENDPOINT` and `PEER_SCHEME`. The paths are read immediately.
    pub fn from_env() -> Result<ClientConfig, BuilderError> {
        Ok(ClientConfig {
            msp_id: required_var(MSP_ID)?,
            cert_pem: read_file(&required_var(CERT_PATH)?)?,
            key_pem: read_file(&required_var(KEY_PATH)?)?,
            tls_ca_pem: read_file(&required_var(TLS_CERT_PATH)?)?,
            endpoint: env::var(PEER_ENDPOINT).ok(),
            scheme: env::var(PEER_SCHEME).ok(),
        })
    }

    pub fn client_builder(self) -> Result<ClientBuilder, SubmitError> {
        let identity = IdentityBuilder::from_pem(self.cert_pem)
            .with_msp(self.msp_id)?
            .build()?;
        let signer = EcdsaSigner::new(&self.key_pem)?;
        let mut builder = ClientBuilder::new()
            .with_identity(identity)?
            .with_signer(signer)?
            .with_tls(self.tls_ca_pem)?;
        if let Some(endpoint) = self.endpoint {
            builder = builder.with_authority(endpoint)?;
        }
        if let Some(scheme) = self.scheme {
            builder = builder.with_scheme(scheme)?;
        }
        Ok(builder)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("msp_id", &self.msp_id)
            .field("endpoint", &self.endpoint)
            .field("scheme", &self.scheme)
            .finish_non_exhaustive()
    }
}

fn required_var(name: &str) -> Result<String, BuilderError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(BuilderError::MissingParameter(name.into())),
    }
}

fn read_file(path: &str) -> Result<Vec<u8>, BuilderError> {
    fs::read(path).map_err(|err| BuilderError::InvalidParameter(format!("{}: {}", path, err)))
}
