use std::{str::FromStr, sync::Arc, sync::Once};

use lazy_static::lazy_static;

use crate::{
    error::{BuilderError, SubmitError},
    gateway::{
        connection::{Connection, GrpcConnection},
        network::Network,
    },
    identity::Identity,
    signer::Signer,
};

lazy_static! {
    static ref CRYPTO_PROVIDER: Once = Once::new();
}

fn install_crypto_provider() {
    // Errors when the application already installed a provider.
    let _ = rustls::crypto::ring::default_provider().install_default();
}

pub struct Client {
    identity: Identity,
    signer: Option<Arc<dyn Signer>>,
    tonic_connection: Option<TonicConnection>,
    connection: Option<Arc<dyn Connection>>,
}

struct TonicConnection {
    tls_config: tonic::transport::ClientTlsConfig,
    host: tonic::transport::Uri,
}

impl Client {
    /// Opens the gRPC channel to the gateway peer. Does nothing for clients built
    /// around an existing connection.
    pub async fn connect(&mut self) -> Result<(), tonic::transport::Error> {
        let Some(tonic_connection) = &self.tonic_connection else {
            return Ok(());
        };
        CRYPTO_PROVIDER.call_once(install_crypto_provider);
        let channel = tonic::transport::Channel::builder(tonic_connection.host.clone())
            .tls_config(tonic_connection.tls_config.clone())?
            .connect()
            .await?;
        tracing::debug!(host = %tonic_connection.host, "connected to gateway");
        self.connection = Some(Arc::new(GrpcConnection::new(channel)));
        Ok(())
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// A network scoped to one channel. Requires an established connection.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    ///  let contract = client.get_network("mychannel")?.get_contract("basic");
    ///  let result = contract
    ///    .submit_transaction("CreateAsset", ["assetCustom", "orange", "10", "Frank", "600"])
    ///    .await?;
    ///  println!("{}", String::from_utf8_lossy(result.as_slice()));
    /// ```
    pub fn get_network(&self, channel_name: impl Into<String>) -> Result<Network, SubmitError> {
        let channel_name = channel_name.into().trim().to_string();
        if channel_name.is_empty() {
            return Err(BuilderError::InvalidParameter("channel name cannot be empty".into()).into());
        }
        let connection = match &self.connection {
            Some(connection) => connection.clone(),
            None => return Err(SubmitError::NotConnected),
        };
        Ok(Network::new(
            channel_name,
            self.identity.clone(),
            self.signer.clone(),
            connection,
        ))
    }
}

/// The `ClientBuilder` struct is used to configure and build a `Client` instance. It provides methods to set various parameters required for creating a client, such as identity, signer, TLS configuration, scheme, and authority.
///
/// # Examples
///
/// ```rust,ignore
///  use fabric_gateway_client::{gateway::client::ClientBuilder, identity::IdentityBuilder, signer::EcdsaSigner};
///
///  let identity = IdentityBuilder::from_pem(std::fs::read(msp_signcert_path)?)
///    .with_msp("Org1MSP")?
///    .build()?;
///  let mut client = ClientBuilder::new()
///    .with_identity(identity)?
///    .with_tls(tlsca_bytes)?
///    .with_scheme("https")?
///    .with_authority("localhost:7051")?
///    .with_signer(EcdsaSigner::new(msp_key_bytes)?)?
///    .build()?;
///  client.connect().await?;
/// ```
#[derive(Default)]
pub struct ClientBuilder {
    identity: Option<Identity>,
    tls: Option<Vec<u8>>,
    signer: Option<Arc<dyn Signer>>,
    scheme: Option<String>,
    authority: Option<String>,
    connection: Option<Arc<dyn Connection>>,
}

impl ClientBuilder {
    pub fn new() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Identity from the IdentityBuilder
    pub fn with_identity(mut self, identity: Identity) -> Result<ClientBuilder, BuilderError> {
        self.identity = Some(identity);
        Ok(self)
    }

    /// Signer for proposals, transactions and commit status requests. Without it
    /// every network call fails with a configuration error.
    pub fn with_signer(
        mut self,
        signer: impl Signer + 'static,
    ) -> Result<ClientBuilder, BuilderError> {
        self.signer = Some(Arc::new(signer));
        Ok(self)
    }

    /// Chooses which scheme is being used. Default value is `https`
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Result<ClientBuilder, BuilderError> {
        let scheme = scheme.into().trim().to_string();
        if scheme.is_empty() {
            return Err(BuilderError::InvalidParameter(
                "scheme cannot be empty".into(),
            ));
        }
        self.scheme = Some(scheme);
        Ok(self)
    }

    /// Tls for the grpc connection to the node.
    /// The needed pem from the test network can be found here: `organizations/peerOrganizations/org1.example.com/tlsca/tlsca.org1.example.com-cert.pem`
    pub fn with_tls(mut self, bytes: impl Into<Vec<u8>>) -> Result<ClientBuilder, BuilderError> {
        self.tls = Some(bytes.into());
        Ok(self)
    }

    /// Authority for the grpc connection to the node. Default is `localhost:7051` which corresponds to the test network
    pub fn with_authority(
        mut self,
        authority: impl Into<String>,
    ) -> Result<ClientBuilder, BuilderError> {
        let authority = authority.into().trim().to_string();
        if authority.is_empty() {
            return Err(BuilderError::InvalidParameter(
                "authority cannot be empty".into(),
            ));
        }
        self.authority = Some(authority);
        Ok(self)
    }

    /// Uses an already established connection instead of opening one. TLS, scheme
    /// and authority are ignored in that case.
    pub fn with_connection(
        mut self,
        connection: Arc<dyn Connection>,
    ) -> Result<ClientBuilder, BuilderError> {
        self.connection = Some(connection);
        Ok(self)
    }

    pub fn with_grpc_channel(
        self,
        channel: tonic::transport::Channel,
    ) -> Result<ClientBuilder, BuilderError> {
        self.with_connection(Arc::new(GrpcConnection::new(channel)))
    }

    /// Collects and validates the values from the builder to build the client. Building does not start the connection to the node.
    pub fn build(self) -> Result<Client, BuilderError> {
        let identity = match self.identity {
            Some(identity) => identity,
            None => return Err(BuilderError::MissingParameter("identity".into())),
        };
        if let Some(connection) = self.connection {
            return Ok(Client {
                identity,
                signer: self.signer,
                tonic_connection: None,
                connection: Some(connection),
            });
        }
        let tls = match self.tls {
            Some(tls) => tls,
            None => return Err(BuilderError::MissingParameter("tls".into())),
        };
        let tls_config = tonic::transport::ClientTlsConfig::new()
            .ca_certificate(tonic::transport::Certificate::from_pem(tls.as_slice()));
        let scheme = match self.scheme {
            Some(scheme) => scheme,
            None => "https".to_string(),
        };
        let authority = match self.authority {
            Some(authority) => authority,
            None => "localhost:7051".to_string(),
        };
        let scheme = match tonic::codegen::http::uri::Scheme::from_str(scheme.as_str()) {
            Ok(scheme) => scheme,
            Err(err) => return Err(BuilderError::InvalidParameter(err.to_string())),
        };
        let uri_builder = tonic::transport::Uri::builder()
            .scheme(scheme)
            .authority(authority)
            .path_and_query("/");
        let uri = match uri_builder.build() {
            Ok(uri) => uri,
            Err(err) => return Err(BuilderError::InvalidParameter(err.to_string())),
        };
        Ok(Client {
            identity,
            signer: self.signer,
            tonic_connection: Some(TonicConnection {
                tls_config,
                host: uri,
            }),
            connection: None,
        })
    }
}
