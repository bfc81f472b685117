use keygate_types::encoding::DecodeError;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use typeshare::typeshare;

use crate::platform::{ErrorName, PlatformError};

#[cfg(doc)]
use crate::Client;

/// The closed set of diagnostic codes a failed ceremony is classified into.
#[typeshare]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The ceremony's abort signal was triggered.
    CeremonyAborted,
    /// The current hostname is not a valid domain.
    InvalidDomain,
    /// The RP ID is not valid for the current hostname.
    InvalidRpId,
    /// The user handle is not between 1 and 64 bytes long.
    InvalidUserIdLength,
    /// No requested algorithm is of the `public-key` type.
    MalformedPubkeycredparams,
    /// The authenticator failed without saying why.
    AuthenticatorGeneralError,
    /// A discoverable credential was required but no authenticator supports them.
    AuthenticatorMissingDiscoverableCredentialSupport,
    /// User verification was required but no authenticator supports it.
    AuthenticatorMissingUserVerificationSupport,
    /// The authenticator already holds a credential from the exclude list.
    AuthenticatorPreviouslyRegistered,
    /// No authenticator supports any of the requested algorithms.
    AuthenticatorNoSupportedPubkeycredparamsAlg,
    /// Nothing more specific is known, the cause carries the details.
    PassthroughSeeCauseProperty,
}

/// The two ceremonies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum CeremonyKind {
    /// Creation of a new credential.
    Registration,
    /// Assertion with an existing credential.
    Authentication,
}

/// A platform failure together with what it means for the ceremony.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ClassifiedError {
    /// What went wrong.
    pub code: ErrorCode,
    /// Human readable explanation.
    pub message: String,
    /// The name of the failure, the one of [`Self::cause`] unless overridden.
    pub name: ErrorName,
    /// The platform failure as reported.
    #[source]
    pub cause: PlatformError,
}

impl ClassifiedError {
    /// Classify `cause` under `code`, keeping its name.
    pub fn new(code: ErrorCode, message: impl Into<String>, cause: PlatformError) -> Self {
        Self {
            code,
            message: message.into(),
            name: cause.name.clone(),
            cause,
        }
    }

    /// Report under `name` instead of the name of the cause.
    pub fn with_name(mut self, name: ErrorName) -> Self {
        self.name = name;
        self
    }
}

/// Errors produced by the [`Client`] operations.
#[derive(Debug, thiserror::Error)]
pub enum WebauthnError {
    /// The environment has no WebAuthn support at all.
    #[error("WebAuthn is not supported in this browser")]
    Unsupported,

    /// Autofill was requested but conditional mediation is not available.
    #[error("Browser does not support WebAuthn autofill")]
    AutofillUnsupported,

    /// Autofill was requested but there is no input to attach it to.
    #[error("No <input> with \"webauthn\" as the only or last value in its `autocomplete` attribute was detected")]
    NoAutofillInput,

    /// A binary member of the request options is not `base64url` text.
    #[error("{field} is not valid base64url")]
    InvalidEncoding {
        /// Which member.
        field: &'static str,
        /// Why it could not be decoded.
        #[source]
        source: DecodeError,
    },

    /// The platform finished without producing a credential.
    #[error("{0} was not completed")]
    NotCompleted(CeremonyKind),

    /// The platform failed in a way that could be classified.
    #[error(transparent)]
    Ceremony(#[from] ClassifiedError),

    /// The platform failed in a way that could not be classified.
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl WebauthnError {
    /// The classification code, if the platform failure could be classified.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            WebauthnError::Ceremony(classified) => Some(classified.code),
            _ => None,
        }
    }

    /// The platform failure this error originates from, if any.
    pub fn platform_error(&self) -> Option<&PlatformError> {
        match self {
            WebauthnError::Ceremony(classified) => Some(&classified.cause),
            WebauthnError::Platform(error) => Some(error),
            _ => None,
        }
    }
}
