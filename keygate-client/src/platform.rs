//! The seam between the [`Client`] and the platform's credential management primitives, the
//! equivalent of `navigator.credentials` in a browser.
//!
//! The platform does the actual work of a ceremony: talking to authenticators, prompting the user
//! and producing signatures. This crate only prepares what goes in and reshapes what comes out.
//!
//! [`Client`]: crate::Client
use keygate_types::{
    webauthn::{
        AuthenticationExtensionsClientOutputs, AuthenticatorTransport,
        CredentialMediationRequirement, PublicKeyCredentialCreationOptions,
        PublicKeyCredentialRequestOptions, PublicKeyCredentialType,
    },
    Bytes,
};
use crate::abort::AbortSignal;

/// The options handed to [`CredentialContainer::create`].
///
/// <https://w3c.github.io/webappsec-credential-management/#dictdef-credentialcreationoptions>
#[derive(Debug, Clone, Default)]
pub struct CredentialCreationOptions {
    /// The WebAuthn part of the request.
    pub public_key: Option<PublicKeyCredentialCreationOptions>,

    /// Signal the platform observes to abandon the ceremony.
    pub signal: Option<AbortSignal>,
}

/// The options handed to [`CredentialContainer::get`].
///
/// <https://w3c.github.io/webappsec-credential-management/#dictdef-credentialrequestoptions>
#[derive(Debug, Clone, Default)]
pub struct CredentialRequestOptions {
    /// How much the user should be involved. [`CredentialMediationRequirement::Conditional`]
    /// is used for autofill ceremonies.
    pub mediation: Option<CredentialMediationRequirement>,

    /// The WebAuthn part of the request.
    pub public_key: Option<PublicKeyCredentialRequestOptions>,

    /// Signal the platform observes to abandon the ceremony.
    pub signal: Option<AbortSignal>,
}

/// The platform's credential management primitives.
///
/// Implementations are expected to observe the `signal` of the options they receive and fail
/// with an [`ErrorName::AbortError`] once it is aborted. Cancellation is cooperative, nothing
/// interrupts an implementation that ignores the signal.
#[cfg_attr(any(test, feature = "testable"), mockall::automock)]
#[async_trait::async_trait]
pub trait CredentialContainer: Send + Sync {
    /// Create a new credential, `navigator.credentials.create()`.
    ///
    /// `Ok(None)` means the platform finished without producing a credential.
    async fn create(
        &self,
        options: &CredentialCreationOptions,
    ) -> Result<Option<RegistrationCredential>, PlatformError>;

    /// Get an assertion from an existing credential, `navigator.credentials.get()`.
    ///
    /// `Ok(None)` means the platform finished without producing a credential.
    async fn get(
        &self,
        options: &CredentialRequestOptions,
    ) -> Result<Option<AuthenticationCredential>, PlatformError>;
}

/// The name of a platform failure, which is what failures are told apart by.
///
/// These are the `DOMException` names a WebAuthn ceremony is known to fail with. Any other name
/// is kept in [`ErrorName::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorName {
    /// The ceremony was aborted through its signal.
    AbortError,
    /// A requirement of the request could not be satisfied by any authenticator.
    ConstraintError,
    /// The authenticator already holds a credential from the exclude list.
    InvalidStateError,
    /// The user or the platform refused the request, or it timed out.
    NotAllowedError,
    /// None of the requested parameters is supported.
    NotSupportedError,
    /// The RP ID is not valid for the current origin.
    SecurityError,
    /// The request itself was malformed.
    TypeError,
    /// The authenticator failed for reasons of its own.
    UnknownError,
    /// Any other name.
    Other(String),
}

impl ErrorName {
    /// The name exactly as the platform reports it.
    pub fn as_str(&self) -> &str {
        match self {
            ErrorName::AbortError => "AbortError",
            ErrorName::ConstraintError => "ConstraintError",
            ErrorName::InvalidStateError => "InvalidStateError",
            ErrorName::NotAllowedError => "NotAllowedError",
            ErrorName::NotSupportedError => "NotSupportedError",
            ErrorName::SecurityError => "SecurityError",
            ErrorName::TypeError => "TypeError",
            ErrorName::UnknownError => "UnknownError",
            ErrorName::Other(name) => name,
        }
    }
}

impl std::fmt::Display for ErrorName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ErrorName {
    fn from(name: &str) -> Self {
        match name {
            "AbortError" => ErrorName::AbortError,
            "ConstraintError" => ErrorName::ConstraintError,
            "InvalidStateError" => ErrorName::InvalidStateError,
            "NotAllowedError" => ErrorName::NotAllowedError,
            "NotSupportedError" => ErrorName::NotSupportedError,
            "SecurityError" => ErrorName::SecurityError,
            "TypeError" => ErrorName::TypeError,
            "UnknownError" => ErrorName::UnknownError,
            other => ErrorName::Other(other.to_owned()),
        }
    }
}

/// A failure reported by the platform, the equivalent of a rejected promise carrying a
/// `DOMException`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{name}: {message}")]
pub struct PlatformError {
    /// What kind of failure this is.
    pub name: ErrorName,
    /// Human readable details from the platform.
    pub message: String,
}

impl PlatformError {
    /// Create an error from its name and message.
    pub fn new(name: impl Into<ErrorName>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// A credential as returned by the platform, with binary members as raw buffers.
///
/// <https://w3c.github.io/webauthn/#iface-pkcredential>
#[derive(Debug, Clone)]
pub struct PublicKeyCredential<R> {
    /// The credential id as text, usually the `base64url` form of [`Self::raw_id`].
    pub id: String,

    /// The raw credential id.
    pub raw_id: Bytes,

    /// The credential type.
    pub ty: PublicKeyCredentialType,

    /// The attachment modality exactly as the platform reported it. Browser extensions have been
    /// seen reporting values outside of the defined set, so this is not trusted as is.
    pub authenticator_attachment: Option<String>,

    /// The result of `getClientExtensionResults()`.
    pub client_extension_results: AuthenticationExtensionsClientOutputs,

    /// The ceremony specific response.
    pub response: R,
}

/// A credential produced by [`CredentialContainer::create`].
pub type RegistrationCredential = PublicKeyCredential<Box<dyn AttestationResponse>>;

/// A credential produced by [`CredentialContainer::get`].
pub type AuthenticationCredential = PublicKeyCredential<AssertionResponse>;

/// The platform's `AuthenticatorAttestationResponse`.
///
/// Only the client data and the attestation object are guaranteed. Everything else is read through
/// accessors that older platforms do not expose, which is what the default implementations
/// model, and that browser extensions intercepting the API sometimes implement incorrectly, which
/// is what an `Err` models. Either way the member is left out of the registration response.
///
/// <https://w3c.github.io/webauthn/#iface-authenticatorattestationresponse>
pub trait AttestationResponse: Send + Sync {
    /// `clientDataJSON`
    fn client_data_json(&self) -> Bytes;

    /// `attestationObject`
    fn attestation_object(&self) -> Bytes;

    /// `getTransports()`
    fn transports(&self) -> Result<Option<Vec<AuthenticatorTransport>>, PlatformError> {
        Ok(None)
    }

    /// `getPublicKey()`
    fn public_key(&self) -> Result<Option<Bytes>, PlatformError> {
        Ok(None)
    }

    /// `getPublicKeyAlgorithm()`
    fn public_key_algorithm(&self) -> Result<Option<i64>, PlatformError> {
        Ok(None)
    }

    /// `getAuthenticatorData()`
    fn authenticator_data(&self) -> Result<Option<Bytes>, PlatformError> {
        Ok(None)
    }
}

/// An [`AttestationResponse`] whose members are all known up front.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttestationResponseData {
    /// See [`AttestationResponse::client_data_json`].
    pub client_data_json: Bytes,
    /// See [`AttestationResponse::attestation_object`].
    pub attestation_object: Bytes,
    /// See [`AttestationResponse::transports`].
    pub transports: Option<Vec<AuthenticatorTransport>>,
    /// See [`AttestationResponse::public_key`].
    pub public_key: Option<Bytes>,
    /// See [`AttestationResponse::public_key_algorithm`].
    pub public_key_algorithm: Option<i64>,
    /// See [`AttestationResponse::authenticator_data`].
    pub authenticator_data: Option<Bytes>,
}

impl AttestationResponse for AttestationResponseData {
    fn client_data_json(&self) -> Bytes {
        self.client_data_json.clone()
    }

    fn attestation_object(&self) -> Bytes {
        self.attestation_object.clone()
    }

    fn transports(&self) -> Result<Option<Vec<AuthenticatorTransport>>, PlatformError> {
        Ok(self.transports.clone())
    }

    fn public_key(&self) -> Result<Option<Bytes>, PlatformError> {
        Ok(self.public_key.clone())
    }

    fn public_key_algorithm(&self) -> Result<Option<i64>, PlatformError> {
        Ok(self.public_key_algorithm)
    }

    fn authenticator_data(&self) -> Result<Option<Bytes>, PlatformError> {
        Ok(self.authenticator_data.clone())
    }
}

/// The platform's `AuthenticatorAssertionResponse`.
///
/// <https://w3c.github.io/webauthn/#iface-authenticatorassertionresponse>
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssertionResponse {
    /// `clientDataJSON`
    pub client_data_json: Bytes,
    /// `authenticatorData`
    pub authenticator_data: Bytes,
    /// `signature`
    pub signature: Bytes,
    /// `userHandle`, absent when the authenticator did not return one.
    pub user_handle: Option<Bytes>,
}
