//! Conversion between the JSON dictionaries exchanged with the relying party, where binary members
//! are `base64url` text, and the dictionaries exchanged with the platform, where they are raw
//! buffers.
use std::str::FromStr;

use keygate_types::{
    encoding,
    webauthn::{
        AuthenticationResponseJson, AuthenticatorAssertionResponseJson, AuthenticatorAttachment,
        AuthenticatorAttestationResponseJson, PublicKeyCredentialCreationOptions,
        PublicKeyCredentialCreationOptionsJson, PublicKeyCredentialDescriptor,
        PublicKeyCredentialDescriptorJson, PublicKeyCredentialRequestOptions,
        PublicKeyCredentialRequestOptionsJson, PublicKeyCredentialUserEntity,
        RegistrationResponseJson,
    },
    Bytes,
};

use crate::{
    error::WebauthnError,
    platform::{AuthenticationCredential, PlatformError, PublicKeyCredential, RegistrationCredential},
};


fn decode(field: &'static str, value: &str) -> Result<Bytes, WebauthnError> {
    encoding::try_from_base64url(value)
        .map(Bytes::from)
        .map_err(|source| WebauthnError::InvalidEncoding { field, source })
}

fn descriptors(
    field: &'static str,
    list: Vec<PublicKeyCredentialDescriptorJson>,
) -> Result<Vec<PublicKeyCredentialDescriptor>, WebauthnError> {
    list.into_iter()
        .map(|descriptor| descriptor_with_field(field, descriptor))
        .collect()
}

fn descriptor_with_field(
    field: &'static str,
    descriptor: PublicKeyCredentialDescriptorJson,
) -> Result<PublicKeyCredentialDescriptor, WebauthnError> {
    Ok(PublicKeyCredentialDescriptor {
        ty: descriptor.ty,
        id: decode(field, &descriptor.id)?,
        transports: descriptor.transports,
    })
}

/// Decode the credential id of a descriptor, keeping its other members as they are.
pub fn descriptor(
    descriptor: PublicKeyCredentialDescriptorJson,
) -> Result<PublicKeyCredentialDescriptor, WebauthnError> {
    descriptor_with_field("id", descriptor)
}

/// Prepare registration options issued by a relying party for the platform.
///
/// The challenge and the excluded credential ids are `base64url` decoded. The user handle is
/// taken as UTF-8 text.
pub fn creation_options(
    options: PublicKeyCredentialCreationOptionsJson,
) -> Result<PublicKeyCredentialCreationOptions, WebauthnError> {
    let challenge = decode("challenge", &options.challenge)?;
    let exclude_credentials = options
        .exclude_credentials
        .map(|list| descriptors("excludeCredentials.id", list))
        .transpose()?;

    Ok(PublicKeyCredentialCreationOptions {
        rp: options.rp,
        user: PublicKeyCredentialUserEntity {
            id: encoding::utf8_encode(&options.user.id).into(),
            name: options.user.name,
            display_name: options.user.display_name,
        },
        challenge,
        pub_key_cred_params: options.pub_key_cred_params,
        timeout: options.timeout,
        exclude_credentials,
        authenticator_selection: options.authenticator_selection,
        hints: options.hints,
        attestation: options.attestation,
        extensions: options.extensions,
    })
}

/// Prepare authentication options issued by a relying party for the platform.
///
/// An empty allow list is dropped, since an empty list keeps some platforms from offering
/// discoverable credentials. With `use_browser_autofill` the allow list is not decoded at all and
/// is replaced by an empty one, which is what conditional mediation requires.
pub fn request_options(
    options: PublicKeyCredentialRequestOptionsJson,
    use_browser_autofill: bool,
) -> Result<PublicKeyCredentialRequestOptions, WebauthnError> {
    let challenge = decode("challenge", &options.challenge)?;
    let allow_credentials = match options.allow_credentials {
        _ if use_browser_autofill => Some(Vec::new()),
        Some(list) if list.is_empty() => None,
        Some(list) => Some(descriptors("allowCredentials.id", list)?),
        None => None,
    };

    Ok(PublicKeyCredentialRequestOptions {
        challenge,
        timeout: options.timeout,
        rp_id: options.rp_id,
        allow_credentials,
        user_verification: options.user_verification,
        hints: options.hints,
        extensions: options.extensions,
    })
}

/// Keep the attachment reported by the platform only if it is one of the defined values.
pub fn to_authenticator_attachment(attachment: Option<&str>) -> Option<AuthenticatorAttachment> {
    AuthenticatorAttachment::from_str(attachment?).ok()
}

/// Read an optional member through an accessor that may be broken. A failure is logged and the
/// member treated as absent.
fn optional_member<T>(
    accessor: &str,
    read: impl FnOnce() -> Result<Option<T>, PlatformError>,
) -> Option<T> {
    match read() {
        Ok(value) => value,
        Err(error) => {
            log::warn!(
                "The browser extension that intercepted this WebAuthn API call incorrectly implemented {accessor}(). You should report this error to them.\n{error}"
            );
            None
        }
    }
}

/// Reshape a newly created credential into the JSON sent back to the relying party.
pub fn registration_response(credential: RegistrationCredential) -> RegistrationResponseJson {
    let PublicKeyCredential {
        id,
        raw_id,
        ty,
        authenticator_attachment,
        client_extension_results,
        response,
    } = credential;

    RegistrationResponseJson {
        id,
        raw_id: raw_id.into(),
        response: AuthenticatorAttestationResponseJson {
            client_data_json: response.client_data_json().into(),
            attestation_object: response.attestation_object().into(),
            transports: optional_member("getTransports", || response.transports()),
            public_key: optional_member("getPublicKey", || response.public_key()).map(String::from),
            public_key_algorithm: optional_member("getPublicKeyAlgorithm", || {
                response.public_key_algorithm()
            }),
            authenticator_data: optional_member("getAuthenticatorData", || {
                response.authenticator_data()
            })
            .map(String::from),
        },
        authenticator_attachment: to_authenticator_attachment(authenticator_attachment.as_deref()),
        client_extension_results,
        ty,
    }
}

/// Reshape an assertion into the JSON sent back to the relying party.
///
/// The user handle is read back as UTF-8 text, the way it was written at registration.
pub fn authentication_response(credential: AuthenticationCredential) -> AuthenticationResponseJson {
    let PublicKeyCredential {
        id,
        raw_id,
        ty,
        authenticator_attachment,
        client_extension_results,
        response,
    } = credential;

    AuthenticationResponseJson {
        id,
        raw_id: raw_id.into(),
        response: AuthenticatorAssertionResponseJson {
            client_data_json: response.client_data_json.into(),
            authenticator_data: response.authenticator_data.into(),
            signature: response.signature.into(),
            user_handle: response
                .user_handle
                .map(|handle| encoding::utf8_decode(&handle)),
        },
        authenticator_attachment: to_authenticator_attachment(authenticator_attachment.as_deref()),
        client_extension_results,
        ty,
    }
}
