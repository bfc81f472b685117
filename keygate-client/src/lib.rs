//! # Keygate Client
//!
//! This crate defines a [`Client`] type that runs [WebAuthn] registration and authentication
//! ceremonies on behalf of a web application. The [`Client`] hands the cryptographic work to the
//! platform's credential primitives through a [`CredentialContainer`], while the Client itself
//! marshals data to and from the JSON dictionaries exchanged with the Relying Party.
//!
//! On top of that the Client:
//! * checks what the [`Environment`] supports before a ceremony starts,
//! * serializes ceremonies, a new one aborts the one still pending,
//! * classifies platform failures into an [`ErrorCode`].
//!
//! This crate does not provide any code to perform networking requests to and from Relying
//! Parties, and does not verify anything the authenticator returns.
//!
//! [WebAuthn]: https://w3c.github.io/webauthn/
use std::sync::Arc;

use keygate_types::webauthn::{
    AuthenticationResponseJson, CredentialMediationRequirement,
    PublicKeyCredentialCreationOptionsJson, PublicKeyCredentialRequestOptionsJson,
    RegistrationResponseJson,
};

mod abort;
mod capabilities;
mod domain;
mod error;
mod identify;
mod platform;
pub mod transcode;

#[cfg(test)]
mod tests;

#[cfg(any(test, feature = "testable"))]
pub use self::{capabilities::MockEnvironment, platform::MockCredentialContainer};
pub use self::{
    abort::{AbortController, AbortReason, AbortSignal, CeremonyAbort},
    capabilities::{
        platform_authenticator_is_available, supports_webauthn, supports_webauthn_autofill,
        Environment,
    },
    domain::is_valid_domain,
    error::{CeremonyKind, ClassifiedError, ErrorCode, WebauthnError},
    identify::{identify_authentication_error, identify_registration_error},
    platform::{
        AssertionResponse, AttestationResponse, AttestationResponseData,
        AuthenticationCredential, CredentialContainer, CredentialCreationOptions,
        CredentialRequestOptions, ErrorName, PlatformError, PublicKeyCredential,
        RegistrationCredential,
    },
};

/// A `Client` represents a WebAuthn client. Users of this struct should supply a
/// [`CredentialContainer`] giving access to the platform's credential primitives and an
/// [`Environment`] describing where the client runs.
///
/// Every `Client` owns a [`CeremonyAbort`] slot so that only one of its ceremonies is pending at
/// a time. Use [`Client::with_ceremony_abort`] to share a slot between several clients.
pub struct Client<P, E>
where
    P: CredentialContainer,
    E: Environment,
{
    platform: P,
    environment: E,
    ceremony_abort: Arc<CeremonyAbort>,
}

impl<P, E> Client<P, E>
where
    P: CredentialContainer,
    E: Environment,
{
    /// Create a `Client` with its own [`CeremonyAbort`] slot.
    pub fn new(platform: P, environment: E) -> Self {
        Self {
            platform,
            environment,
            ceremony_abort: Arc::new(CeremonyAbort::new()),
        }
    }

    /// Use the given slot instead of the one created in [`Client::new`].
    pub fn with_ceremony_abort(mut self, ceremony_abort: Arc<CeremonyAbort>) -> Self {
        self.ceremony_abort = ceremony_abort;
        self
    }

    /// Read access to the Client's `CredentialContainer`.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Read access to the Client's `Environment`.
    pub fn environment(&self) -> &E {
        &self.environment
    }

    /// The slot serializing this Client's ceremonies.
    pub fn ceremony_abort(&self) -> &Arc<CeremonyAbort> {
        &self.ceremony_abort
    }

    /// Whether WebAuthn ceremonies can run at all.
    pub fn supports_webauthn(&self) -> bool {
        supports_webauthn(&self.environment)
    }

    /// Whether credentials can be offered through form autofill.
    pub async fn supports_webauthn_autofill(&self) -> bool {
        supports_webauthn_autofill(&self.environment).await
    }

    /// Whether a user verifying platform authenticator can be used.
    pub async fn platform_authenticator_is_available(&self) -> bool {
        platform_authenticator_is_available(&self.environment).await
    }

    /// Abort the pending ceremony, if any. It fails with [`ErrorCode::CeremonyAborted`].
    pub fn cancel_ceremony(&self) {
        self.ceremony_abort.cancel_ceremony();
    }

    /// Register a new credential with the options issued by the Relying Party.
    ///
    /// Returns either a [`RegistrationResponseJson`] to send back to the Relying Party on success
    /// or some [`WebauthnError`].
    pub async fn register(
        &self,
        options: PublicKeyCredentialCreationOptionsJson,
    ) -> Result<RegistrationResponseJson, WebauthnError> {
        if !self.supports_webauthn() {
            return Err(WebauthnError::Unsupported);
        }

        let options = CredentialCreationOptions {
            public_key: Some(transcode::creation_options(options)?),
            signal: Some(self.ceremony_abort.create_abort_signal()),
        };

        let outcome = self.platform.create(&options).await;
        match settle(outcome, options.signal.as_ref()) {
            Ok(Some(credential)) => Ok(transcode::registration_response(credential)),
            Ok(None) => Err(WebauthnError::NotCompleted(CeremonyKind::Registration)),
            Err(error) => {
                log::debug!("WebAuthn registration failed: {error}");
                Err(identify_registration_error(
                    error,
                    &options,
                    &self.environment.hostname(),
                ))
            }
        }
    }

    /// Authenticate with an existing credential using the options issued by the Relying Party.
    ///
    /// With `use_browser_autofill` the platform offers the credentials through the autofill
    /// prompt of an input of the current document instead of a modal dialog.
    ///
    /// Returns either an [`AuthenticationResponseJson`] to send back to the Relying Party on
    /// success or some [`WebauthnError`].
    pub async fn authenticate(
        &self,
        options: PublicKeyCredentialRequestOptionsJson,
        use_browser_autofill: bool,
    ) -> Result<AuthenticationResponseJson, WebauthnError> {
        if !self.supports_webauthn() {
            return Err(WebauthnError::Unsupported);
        }

        let public_key = transcode::request_options(options, use_browser_autofill)?;

        let mut mediation = None;
        if use_browser_autofill {
            if !self.supports_webauthn_autofill().await {
                return Err(WebauthnError::AutofillUnsupported);
            }
            if self.environment.autofill_input_count() < 1 {
                return Err(WebauthnError::NoAutofillInput);
            }
            mediation = Some(CredentialMediationRequirement::Conditional);
        }

        let options = CredentialRequestOptions {
            mediation,
            public_key: Some(public_key),
            signal: Some(self.ceremony_abort.create_abort_signal()),
        };

        let outcome = self.platform.get(&options).await;
        match settle(outcome, options.signal.as_ref()) {
            Ok(Some(credential)) => Ok(transcode::authentication_response(credential)),
            Ok(None) => Err(WebauthnError::NotCompleted(CeremonyKind::Authentication)),
            Err(error) => {
                log::debug!("WebAuthn authentication failed: {error}");
                Err(identify_authentication_error(
                    error,
                    &options,
                    &self.environment.hostname(),
                ))
            }
        }
    }
}

/// A ceremony whose signal was aborted has failed with the abort reason, whatever the platform
/// answered after that.
fn settle<T>(
    outcome: Result<Option<T>, PlatformError>,
    signal: Option<&AbortSignal>,
) -> Result<Option<T>, PlatformError> {
    let Some(reason) = signal.and_then(AbortSignal::reason) else {
        return outcome;
    };
    match outcome {
        Err(error) if error.name == ErrorName::AbortError => {}
        Err(error) => log::debug!("Discarding the failure of an aborted WebAuthn ceremony: {error}"),
        Ok(_) => log::debug!("Discarding the result of an aborted WebAuthn ceremony: {reason}"),
    }
    Err(reason.into())
}
