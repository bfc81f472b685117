//! Classification of platform failures into [`ErrorCode`]s.
//!
//! The platform reports failures as a bare name and message. Together with the options the
//! ceremony was started with, and the hostname it runs on, the name narrows down what actually
//! went wrong.
use keygate_types::webauthn::{PublicKeyCredentialType, UserVerificationRequirement};

use crate::{
    domain::is_valid_domain,
    error::{ClassifiedError, ErrorCode, WebauthnError},
    platform::{CredentialCreationOptions, CredentialRequestOptions, ErrorName, PlatformError},
};


/// Classify a failure of [`CredentialContainer::create`].
///
/// Failures that match no rule are returned unclassified as [`WebauthnError::Platform`].
///
/// # Panics
///
/// When `options` has no `public_key` member, which means they were not options of a WebAuthn
/// ceremony in the first place.
///
/// [`CredentialContainer::create`]: crate::CredentialContainer::create
pub fn identify_registration_error(
    error: PlatformError,
    options: &CredentialCreationOptions,
    hostname: &str,
) -> WebauthnError {
    let Some(public_key) = options.public_key.as_ref() else {
        panic!("options was missing required publicKey property");
    };
    let selection = public_key.authenticator_selection.as_ref();

    let (code, message) = match error.name {
        ErrorName::AbortError if options.signal.is_some() => (
            ErrorCode::CeremonyAborted,
            "Registration ceremony was sent an abort signal".to_owned(),
        ),
        ErrorName::ConstraintError if selection.is_some_and(|s| s.requires_resident_key()) => (
            ErrorCode::AuthenticatorMissingDiscoverableCredentialSupport,
            "Discoverable credentials were required but no available authenticator supported it"
                .to_owned(),
        ),
        ErrorName::ConstraintError
            if selection
                .is_some_and(|s| s.user_verification == UserVerificationRequirement::Required) =>
        {
            (
                ErrorCode::AuthenticatorMissingUserVerificationSupport,
                "User verification was required but no available authenticator supported it"
                    .to_owned(),
            )
        }
        ErrorName::InvalidStateError => (
            ErrorCode::AuthenticatorPreviouslyRegistered,
            "The authenticator was previously registered".to_owned(),
        ),
        ErrorName::NotAllowedError => (ErrorCode::PassthroughSeeCauseProperty, error.message.clone()),
        ErrorName::NotSupportedError => {
            let any_public_key = public_key
                .pub_key_cred_params
                .iter()
                .any(|param| param.ty == PublicKeyCredentialType::PublicKey);
            if any_public_key {
                (
                    ErrorCode::AuthenticatorNoSupportedPubkeycredparamsAlg,
                    "No available authenticator supported any of the specified pubKeyCredParams algorithms"
                        .to_owned(),
                )
            } else {
                (
                    ErrorCode::MalformedPubkeycredparams,
                    "No entry in pubKeyCredParams was of type \"public-key\"".to_owned(),
                )
            }
        }
        ErrorName::SecurityError => match security_error(hostname, public_key.rp.id.as_deref()) {
            Some(classified) => classified,
            None => return WebauthnError::Platform(error),
        },
        ErrorName::TypeError if !(1..=64).contains(&public_key.user.id.len()) => (
            ErrorCode::InvalidUserIdLength,
            "User ID was not between 1 and 64 characters".to_owned(),
        ),
        ErrorName::UnknownError => (
            ErrorCode::AuthenticatorGeneralError,
            "The authenticator was unable to process the specified options, or could not create a new credential"
                .to_owned(),
        ),
        _ => return WebauthnError::Platform(error),
    };

    ClassifiedError::new(code, message, error).into()
}

/// Classify a failure of [`CredentialContainer::get`].
///
/// Failures that match no rule are classified as [`ErrorCode::AuthenticatorGeneralError`] under
/// the name [`ErrorName::UnknownError`].
///
/// # Panics
///
/// When `options` has no `public_key` member, which means they were not options of a WebAuthn
/// ceremony in the first place.
///
/// [`CredentialContainer::get`]: crate::CredentialContainer::get
pub fn identify_authentication_error(
    error: PlatformError,
    options: &CredentialRequestOptions,
    hostname: &str,
) -> WebauthnError {
    let Some(public_key) = options.public_key.as_ref() else {
        panic!("options was missing required publicKey property");
    };

    let classified = match error.name {
        ErrorName::AbortError if options.signal.is_some() => Some((
            ErrorCode::CeremonyAborted,
            "Authentication ceremony was sent an abort signal".to_owned(),
        )),
        ErrorName::NotAllowedError => Some((ErrorCode::PassthroughSeeCauseProperty, error.message.clone())),
        ErrorName::SecurityError => security_error(hostname, public_key.rp_id.as_deref()),
        ErrorName::UnknownError => Some((
            ErrorCode::AuthenticatorGeneralError,
            "The authenticator was unable to process the specified options, or could not create a new assertion signature"
                .to_owned(),
        )),
        _ => None,
    };

    match classified {
        Some((code, message)) => ClassifiedError::new(code, message, error).into(),
        None => ClassifiedError::new(ErrorCode::AuthenticatorGeneralError, "Unknown Error", error)
            .with_name(ErrorName::UnknownError)
            .into(),
    }
}

/// A `SecurityError` is either caused by the hostname itself or by an RP ID that does not match
/// it. `None` when neither applies.
fn security_error(hostname: &str, rp_id: Option<&str>) -> Option<(ErrorCode, String)> {
    if !is_valid_domain(hostname) {
        return Some((
            ErrorCode::InvalidDomain,
            format!("{hostname} is an invalid domain"),
        ));
    }
    if rp_id != Some(hostname) {
        return Some((
            ErrorCode::InvalidRpId,
            format!(
                "The RP ID \"{}\" is invalid for this domain",
                rp_id.unwrap_or_default()
            ),
        ));
    }
    None
}
