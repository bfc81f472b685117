//! Types used for public key authentication

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use typeshare::typeshare;

use crate::{
    utils::serde::{ignore_unknown, ignore_unknown_opt_vec, maybe_stringified},
    webauthn::{
        AuthenticationExtensionsClientInputs, AuthenticationExtensionsClientOutputs,
        AuthenticatorAttachment, CollectedClientData, InvalidClientData,
        PublicKeyCredentialDescriptor, PublicKeyCredentialDescriptorJson, PublicKeyCredentialHints,
        PublicKeyCredentialType, UserVerificationRequirement,
    },
    Bytes,
};

#[cfg(doc)]
use crate::webauthn::PublicKeyCredentialUserEntityJson;

/// Assertion request options as issued by a relying party, with every binary member still in its
/// text form. Only the challenge is mandatory.
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialrequestoptionsjson>
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct PublicKeyCredentialRequestOptionsJson {
    /// Server issued entropy the authenticator signs over, `base64url` encoded.
    pub challenge: String,

    /// How long, in milliseconds, the relying party is willing to wait. Accepts numbers as well
    /// as numeric strings.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "maybe_stringified"
    )]
    pub timeout: Option<u32>,

    /// The [RP ID] claimed by the relying party. When absent, the platform uses the effective
    /// domain of the current origin.
    ///
    /// [RP ID]: https://w3c.github.io/webauthn/#rp-id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rp_id: Option<String>,

    /// Credentials eligible for this ceremony.
    ///
    /// Absent and empty are different requests: an empty list asks the platform to search every
    /// discoverable credential available for the RP ID.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "ignore_unknown_opt_vec"
    )]
    pub allow_credentials: Option<Vec<PublicKeyCredentialDescriptorJson>>,

    /// User verification requirement. An unknown value is treated as absent.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "ignore_unknown"
    )]
    pub user_verification: Option<UserVerificationRequirement>,

    /// Hints on how the request may best be completed. Unknown hints are dropped.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "ignore_unknown_opt_vec"
    )]
    pub hints: Option<Vec<PublicKeyCredentialHints>>,

    /// Client extension inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<AuthenticationExtensionsClientInputs>,
}

/// Assertion request options in the form consumed by the platform.
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialrequestoptions>
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyCredentialRequestOptions {
    /// The raw challenge.
    pub challenge: Bytes,

    /// See [`PublicKeyCredentialRequestOptionsJson::timeout`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,

    /// See [`PublicKeyCredentialRequestOptionsJson::rp_id`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rp_id: Option<String>,

    /// See [`PublicKeyCredentialRequestOptionsJson::allow_credentials`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_credentials: Option<Vec<PublicKeyCredentialDescriptor>>,

    /// See [`PublicKeyCredentialRequestOptionsJson::user_verification`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_verification: Option<UserVerificationRequirement>,

    /// See [`PublicKeyCredentialRequestOptionsJson::hints`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints: Option<Vec<PublicKeyCredentialHints>>,

    /// See [`PublicKeyCredentialRequestOptionsJson::extensions`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<AuthenticationExtensionsClientInputs>,
}

/// How much the user should be involved in a credential request.
///
/// <https://w3c.github.io/webappsec-credential-management/#mediation-requirements>
#[derive(
    Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[typeshare(serialized_as = "String")]
pub enum CredentialMediationRequirement {
    /// Never show any user interface.
    Silent,

    /// Show user interface only when the platform requires it.
    #[default]
    Optional,

    /// Surface credentials through form autofill instead of a modal prompt.
    Conditional,

    /// Always ask the user.
    Required,
}

/// The outcome of a successful authentication, ready to be sent back to the relying party.
///
/// <https://w3c.github.io/webauthn/#dictdef-authenticationresponsejson>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationResponseJson {
    /// The id of the credential that produced the assertion.
    pub id: String,

    /// The raw credential id, `base64url` encoded.
    pub raw_id: String,

    /// The authenticator's assertion response.
    pub response: AuthenticatorAssertionResponseJson,

    /// Which attachment modality completed the ceremony, if the platform reported a known one.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "ignore_unknown"
    )]
    pub authenticator_attachment: Option<AuthenticatorAttachment>,

    /// Client extension outputs.
    #[serde(default)]
    pub client_extension_results: AuthenticationExtensionsClientOutputs,

    /// Always [`PublicKeyCredentialType::PublicKey`] in practice.
    #[serde(rename = "type", deserialize_with = "ignore_unknown")]
    pub ty: PublicKeyCredentialType,
}

impl AuthenticationResponseJson {
    /// Decode the client data the platform collected for this authentication.
    pub fn client_data(&self) -> Result<CollectedClientData, InvalidClientData> {
        self.response.client_data()
    }
}

/// The authenticator's response to an assertion request, with binary members `base64url` encoded.
///
/// <https://w3c.github.io/webauthn/#dictdef-authenticatorassertionresponsejson>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct AuthenticatorAssertionResponseJson {
    /// The exact JSON serialization of [`CollectedClientData`], `base64url` encoded.
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,

    /// The authenticator data, `base64url` encoded.
    pub authenticator_data: String,

    /// The assertion signature, `base64url` encoded.
    pub signature: String,

    /// The user handle the credential was registered with. Since user handles are created from
    /// the UTF-8 bytes of [`PublicKeyCredentialUserEntityJson::id`], this is that same text.
    /// Absent when the authenticator did not return one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_handle: Option<String>,
}

impl AuthenticatorAssertionResponseJson {
    /// Decode [`Self::client_data_json`].
    pub fn client_data(&self) -> Result<CollectedClientData, InvalidClientData> {
        CollectedClientData::from_base64url(&self.client_data_json)
    }
}
