//! Feature detection of the environment a [`Client`](crate::Client) runs in.
//!
//! None of these fail: a missing capability is reported as `false`.

/// What the client needs to know about its environment, the equivalent of the `window` and
/// `document` globals in a browser.
#[cfg_attr(any(test, feature = "testable"), mockall::automock)]
#[async_trait::async_trait]
pub trait Environment: Send + Sync {
    /// Whether the `PublicKeyCredential` interface is exposed.
    fn has_public_key_credential(&self) -> bool;

    /// Whether `PublicKeyCredential.isConditionalMediationAvailable` is exposed.
    fn has_conditional_mediation_check(&self) -> bool;

    /// The result of `PublicKeyCredential.isConditionalMediationAvailable()`.
    async fn is_conditional_mediation_available(&self) -> bool;

    /// The result of `PublicKeyCredential.isUserVerifyingPlatformAuthenticatorAvailable()`.
    async fn is_user_verifying_platform_authenticator_available(&self) -> bool;

    /// The hostname of the current location, which the platform derives the default RP ID from.
    fn hostname(&self) -> String;

    /// How many inputs of the current document can host a WebAuthn autofill prompt, meaning
    /// inputs with `webauthn` as the only or last token of their `autocomplete` attribute.
    fn autofill_input_count(&self) -> usize;
}

/// Whether WebAuthn ceremonies can run at all.
pub fn supports_webauthn<E: Environment + ?Sized>(environment: &E) -> bool {
    environment.has_public_key_credential()
}

/// Whether credentials can be offered through form autofill.
pub async fn supports_webauthn_autofill<E: Environment + ?Sized>(environment: &E) -> bool {
    if !environment.has_conditional_mediation_check() {
        return false;
    }
    environment.is_conditional_mediation_available().await
}

/// Whether a user verifying platform authenticator, such as Touch ID or Windows Hello, can be
/// used. This says nothing about which one.
pub async fn platform_authenticator_is_available<E: Environment + ?Sized>(environment: &E) -> bool {
    if !supports_webauthn(environment) {
        return false;
    }
    environment
        .is_user_verifying_platform_authenticator_available()
        .await
}
