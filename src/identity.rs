use prost::Message;

use crate::{error::BuilderError, fabric::msp::SerializedIdentity};

/// MSP identity of a client: organization id plus certificate.
///
/// The serialized form is computed once at construction and reused for every
/// proposal creator field and transaction id derivation.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    msp_id: String,
    credentials: Vec<u8>,
    serialized: Vec<u8>,
}

impl Identity {
    pub fn new(msp_id: impl Into<String>, credentials: impl Into<Vec<u8>>) -> Identity {
        let msp_id = msp_id.into();
        let credentials = credentials.into();
        let serialized = SerializedIdentity {
            mspid: msp_id.clone(),
            id_bytes: credentials.clone(),
        }
        .encode_to_vec();
        Identity {
            msp_id,
            credentials,
            serialized,
        }
    }

    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    pub fn credentials(&self) -> &[u8] {
        &self.credentials
    }

    /// Protobuf encoded `SerializedIdentity`.
    pub fn serialized(&self) -> &[u8] {
        &self.serialized
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("msp_id", &self.msp_id)
            .finish_non_exhaustive()
    }
}

/// Builds an [`Identity`] from a PEM certificate.
///
/// # Example
/// ```rust,no_run
/// use fabric_gateway_client::identity::IdentityBuilder;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let identity = IdentityBuilder::from_pem(std::fs::read("cert.pem")?)
///     .with_msp("Org1MSP")?
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct IdentityBuilder {
    msp: Option<String>,
    cert: Vec<u8>,
}

impl IdentityBuilder {
    pub fn from_pem(pem_bytes: impl Into<Vec<u8>>) -> IdentityBuilder {
        IdentityBuilder {
            msp: None,
            cert: pem_bytes.into(),
        }
    }

    pub fn with_msp(mut self, msp: impl Into<String>) -> Result<IdentityBuilder, BuilderError> {
        let msp = msp.into().trim().to_string();
        if msp.is_empty() {
            return Err(BuilderError::InvalidParameter("msp cannot be empty".into()));
        }
        self.msp = Some(msp);
        Ok(self)
    }

    pub fn build(self) -> Result<Identity, BuilderError> {
        let msp = match self.msp {
            Some(msp) => msp,
            None => return Err(BuilderError::MissingParameter("msp".into())),
        };
        if self.cert.is_empty() {
            return Err(BuilderError::MissingParameter("certificate".into()));
        }
        Ok(Identity::new(msp, self.cert))
    }
}
