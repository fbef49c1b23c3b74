//! Request signing capability
//!
//! Every provider hands the executor a [`Signer`]. The executor calls it
//! whenever an operation requires authentication (and, for key-header
//! providers, whenever credentials are configured). Signers only add headers or
//! query parameters and never touch shared credential state.

use crate::{
    endpoint::EndpointDescriptor,
    error::ClientError,
    request::RequestSpec,
    types::Credentials,
};
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384};

/// Adds authentication material to an outgoing request
pub trait Signer: Send + Sync {
    /// Returns the request augmented with signing headers or parameters
    fn sign(
        &self,
        endpoint: &EndpointDescriptor,
        request: RequestSpec,
        credentials: &Credentials,
    ) -> Result<RequestSpec, ClientError>;

    /// True when signing this endpoint needs the API secret, not just the key
    fn requires_secret(&self, _endpoint: &EndpointDescriptor) -> bool {
        true
    }

    /// True when configured credentials should also be attached to public calls
    fn signs_public_requests(&self) -> bool {
        false
    }
}

/// Signer for providers without authentication
pub struct NoAuth;

impl Signer for NoAuth {
    fn sign(
        &self,
        _endpoint: &EndpointDescriptor,
        request: RequestSpec,
        _credentials: &Credentials,
    ) -> Result<RequestSpec, ClientError> {
        Ok(request)
    }

    fn requires_secret(&self, _endpoint: &EndpointDescriptor) -> bool {
        false
    }
}

/// Puts the API key in a single header, optionally prefixed
pub struct ApiKeyHeader {
    header: &'static str,
    prefix: &'static str,
}

impl ApiKeyHeader {
    pub const fn new(header: &'static str, prefix: &'static str) -> Self {
        Self { header, prefix }
    }
}

impl Signer for ApiKeyHeader {
    fn sign(
        &self,
        _endpoint: &EndpointDescriptor,
        mut request: RequestSpec,
        credentials: &Credentials,
    ) -> Result<RequestSpec, ClientError> {
        request.set_header(self.header, format!("{}{}", self.prefix, credentials.api_key));
        Ok(request)
    }

    fn requires_secret(&self, _endpoint: &EndpointDescriptor) -> bool {
        false
    }

    fn signs_public_requests(&self) -> bool {
        true
    }
}

/// Secret of the credentials, or `MissingCredentials` for this operation
pub fn require_secret<'a>(
    endpoint: &EndpointDescriptor,
    credentials: &'a Credentials,
) -> Result<&'a str, ClientError> {
    credentials
        .secret()
        .ok_or_else(|| ClientError::missing_credentials(endpoint.name))
}

/// Lower-case hex HMAC-SHA256 of `message`
pub fn hmac_sha256_hex(secret: &str, message: &str) -> Result<String, ClientError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|e| ClientError::config(format!("invalid HMAC key: {}", e)))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Lower-case hex HMAC-SHA384 of `message`
pub fn hmac_sha384_hex(secret: &str, message: &str) -> Result<String, ClientError> {
    let mut mac = Hmac::<Sha384>::new_from_slice(secret.as_bytes())
        .map_err(|e| ClientError::config(format!("invalid HMAC key: {}", e)))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}
