//! Signing capabilities used for proposals, transaction envelopes and commit status requests.
//!
//! Every [`Signer`] receives the raw message bytes. Software keys hash them with
//! SHA-256 as part of signing, so callers never pass a digest.

use std::sync::Arc;

use ecdsa::signature::Signer as _;
use p256::{
    NistP256, SecretKey,
    ecdsa::{SigningKey, VerifyingKey},
    elliptic_curve::scalar::IsHigh,
    pkcs8::DecodePrivateKey,
};

use crate::{error::SignerError, identity::Identity};

pub type EcdsaSignature = ecdsa::Signature<NistP256>;

/// Anything able to sign on behalf of an [`Identity`].
///
/// Implementations must be safe to call from concurrent invocations.
pub trait Signer: Send + Sync {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError>;
}

impl<S: Signer + ?Sized> Signer for Arc<S> {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        (**self).sign(message)
    }
}

/// Software P-256 key producing low-S, DER encoded signatures.
///
/// The key in the test network can be found in `organizations/peerOrganizations/org1.example.com/users/User1@org1.example.com/msp/keystore/priv_sk`
///
/// # Example
/// ```rust,no_run
/// use fabric_gateway_client::signer::EcdsaSigner;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let signer = EcdsaSigner::new(std::fs::read("priv_sk")?)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct EcdsaSigner {
    key: SigningKey,
}

impl EcdsaSigner {
    /// Loads PEM or DER key material, PKCS#8 or SEC1.
    ///
    /// PEM is recognized after any leading whitespace or UTF-8 byte order mark.
    pub fn new(pkey: impl AsRef<[u8]>) -> Result<Self, SignerError> {
        let pkey = pkey.as_ref();
        let text = pem_text(pkey);
        if text.starts_with(b"-----BEGIN") {
            Self::from_pem(text)
        } else {
            Self::from_der(pkey)
        }
    }

    pub fn from_pem(pem_bytes: &[u8]) -> Result<Self, SignerError> {
        let pem = std::str::from_utf8(pem_bytes)
            .map_err(|err| SignerError::InvalidKey(format!("Invalid UTF-8: {}", err)))?;
        let key = match SigningKey::from_pkcs8_pem(pem) {
            Ok(key) => key,
            Err(pkcs8_err) => SecretKey::from_sec1_pem(pem)
                .map(SigningKey::from)
                .map_err(|_| SignerError::InvalidKey(format!("Invalid PEM key: {}", pkcs8_err)))?,
        };
        Ok(EcdsaSigner { key })
    }

    pub fn from_der(der_bytes: &[u8]) -> Result<Self, SignerError> {
        let key = match SigningKey::from_pkcs8_der(der_bytes) {
            Ok(key) => key,
            Err(pkcs8_err) => SecretKey::from_sec1_der(der_bytes)
                .map(SigningKey::from)
                .map_err(|_| SignerError::InvalidKey(format!("Invalid DER key: {}", pkcs8_err)))?,
        };
        Ok(EcdsaSigner { key })
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key().clone()
    }
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn pem_text(bytes: &[u8]) -> &[u8] {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    bytes.trim_ascii_start()
}

impl From<SigningKey> for EcdsaSigner {
    fn from(key: SigningKey) -> Self {
        EcdsaSigner { key }
    }
}

impl Signer for EcdsaSigner {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        let signature: EcdsaSignature = self
            .key
            .try_sign(message)
            .map_err(|err| SignerError::Signing(err.to_string()))?;
        Ok(normalize_s(signature).to_der().as_bytes().to_vec())
    }
}

impl std::fmt::Debug for EcdsaSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcdsaSigner").finish_non_exhaustive()
    }
}

/// Peers only accept signatures whose `s` lies in the lower half of the curve order.
pub fn normalize_s(signature: EcdsaSignature) -> EcdsaSignature {
    signature.normalize_s().unwrap_or(signature)
}

pub fn is_low_s(signature: &EcdsaSignature) -> bool {
    !bool::from(signature.s().is_high())
}

type SignFn = dyn Fn(&[u8]) -> Result<Vec<u8>, SignerError> + Send + Sync;

/// Adapter for keys held outside the process, e.g. an HSM or a remote signing service.
#[derive(Clone)]
pub struct ExternalSigner {
    sign_fn: Arc<SignFn>,
}

impl ExternalSigner {
    pub fn new<F>(sign_fn: F) -> Self
    where
        F: Fn(&[u8]) -> Result<Vec<u8>, SignerError> + Send + Sync + 'static,
    {
        ExternalSigner {
            sign_fn: Arc::new(sign_fn),
        }
    }
}

impl Signer for ExternalSigner {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        (self.sign_fn)(message)
    }
}

/// An identity paired with the capability to sign as it.
#[derive(Clone)]
pub struct SigningIdentity {
    identity: Identity,
    signer: Arc<dyn Signer>,
}

impl SigningIdentity {
    pub fn new(identity: Identity, signer: Arc<dyn Signer>) -> Self {
        SigningIdentity { identity, signer }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Serialized identity placed in the creator field of headers.
    pub fn creator(&self) -> &[u8] {
        self.identity.serialized()
    }

    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        self.signer.sign(message)
    }
}

impl std::fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}
