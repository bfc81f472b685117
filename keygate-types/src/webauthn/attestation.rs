//! Types specific to public key credential creation
use coset::iana::{self, EnumI64};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use typeshare::typeshare;

use crate::{
    encoding,
    utils::serde::{ignore_unknown, ignore_unknown_opt_vec, ignore_unknown_vec, maybe_stringified},
    webauthn::{
        AuthenticationExtensionsClientInputs, AuthenticationExtensionsClientOutputs,
        AuthenticatorAttachment, AuthenticatorTransport, PublicKeyCredentialDescriptor,
        PublicKeyCredentialDescriptorJson, PublicKeyCredentialHints, PublicKeyCredentialType,
        UserVerificationRequirement,
    },
    Bytes,
};

#[cfg(doc)]
use crate::webauthn::AuthenticatorAssertionResponseJson;

/// Credential creation options as issued by a relying party, with every binary member still in
/// its text form.
///
/// This is what a server hands out at the start of a registration ceremony. See
/// [`PublicKeyCredentialCreationOptions`] for the form the platform consumes.
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialcreationoptionsjson>
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct PublicKeyCredentialCreationOptionsJson {
    /// The relying party responsible for the request.
    pub rp: PublicKeyCredentialRpEntity,

    /// The user account the credential is created for.
    pub user: PublicKeyCredentialUserEntityJson,

    /// Server issued entropy the authenticator signs over, `base64url` encoded.
    pub challenge: String,

    /// Key types and signature algorithms the relying party supports, most preferred first.
    ///
    /// Entries with an unknown `type` are kept as [`PublicKeyCredentialType::Unknown`] so the
    /// platform can report when none of them are usable. Entries that are not a valid dictionary
    /// at all are dropped.
    #[serde(deserialize_with = "ignore_unknown_vec")]
    pub pub_key_cred_params: Vec<PublicKeyCredentialParameters>,

    /// How long, in milliseconds, the relying party is willing to wait. Accepts numbers as well
    /// as numeric strings.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "maybe_stringified"
    )]
    pub timeout: Option<u32>,

    /// Credentials already registered for this user, so that the same authenticator is not
    /// registered twice.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "ignore_unknown_opt_vec"
    )]
    pub exclude_credentials: Option<Vec<PublicKeyCredentialDescriptorJson>>,

    /// Requirements the authenticator has to satisfy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_selection: Option<AuthenticatorSelectionCriteria>,

    /// Hints on how the request may best be completed. Unknown hints are dropped.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "ignore_unknown_opt_vec"
    )]
    pub hints: Option<Vec<PublicKeyCredentialHints>>,

    /// Attestation conveyance preference. An unknown value is treated as absent.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "ignore_unknown"
    )]
    pub attestation: Option<AttestationConveyancePreference>,

    /// Client extension inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<AuthenticationExtensionsClientInputs>,
}

/// Credential creation options in the form consumed by the platform, with every binary member
/// decoded.
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialcreationoptions>
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyCredentialCreationOptions {
    /// See [`PublicKeyCredentialCreationOptionsJson::rp`].
    pub rp: PublicKeyCredentialRpEntity,

    /// See [`PublicKeyCredentialCreationOptionsJson::user`].
    pub user: PublicKeyCredentialUserEntity,

    /// The raw challenge.
    pub challenge: Bytes,

    /// See [`PublicKeyCredentialCreationOptionsJson::pub_key_cred_params`].
    pub pub_key_cred_params: Vec<PublicKeyCredentialParameters>,

    /// See [`PublicKeyCredentialCreationOptionsJson::timeout`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,

    /// See [`PublicKeyCredentialCreationOptionsJson::exclude_credentials`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_credentials: Option<Vec<PublicKeyCredentialDescriptor>>,

    /// See [`PublicKeyCredentialCreationOptionsJson::authenticator_selection`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authenticator_selection: Option<AuthenticatorSelectionCriteria>,

    /// See [`PublicKeyCredentialCreationOptionsJson::hints`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints: Option<Vec<PublicKeyCredentialHints>>,

    /// See [`PublicKeyCredentialCreationOptionsJson::attestation`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attestation: Option<AttestationConveyancePreference>,

    /// See [`PublicKeyCredentialCreationOptionsJson::extensions`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<AuthenticationExtensionsClientInputs>,
}

/// The relying party a credential is created for.
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialrpentity>
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[typeshare]
pub struct PublicKeyCredentialRpEntity {
    /// The [RP ID]. When absent, the platform uses the effective domain of the current origin.
    ///
    /// [RP ID]: https://w3c.github.io/webauthn/#rp-id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Human palatable name, for display only.
    pub name: String,
}

/// The user account a credential is created for, as sent by the relying party.
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialuserentityjson>
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct PublicKeyCredentialUserEntityJson {
    /// The user handle as text. It is converted to its UTF-8 bytes before reaching the platform,
    /// which means it comes back from authentication as the same text.
    pub id: String,

    /// Human palatable account identifier, like `alex.mueller@example.com`.
    pub name: String,

    /// Human palatable name for the account, like `Alex Müller`.
    pub display_name: String,
}

/// The binary counterpart of [`PublicKeyCredentialUserEntityJson`].
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialuserentity>
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyCredentialUserEntity {
    /// The user handle, at most 64 bytes and never empty for a well formed request. It ends up as
    /// [`AuthenticatorAssertionResponseJson::user_handle`] in later authentications.
    pub id: Bytes,

    /// See [`PublicKeyCredentialUserEntityJson::name`].
    pub name: String,

    /// See [`PublicKeyCredentialUserEntityJson::display_name`].
    pub display_name: String,
}

/// A credential type and signature algorithm the relying party accepts.
///
/// The algorithm is kept as the raw [COSEAlgorithmIdentifier] so that identifiers unknown to
/// this library still reach the platform.
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialparameters>
///
/// [COSEAlgorithmIdentifier]: https://w3c.github.io/webauthn/#typedefdef-cosealgorithmidentifier
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[typeshare]
pub struct PublicKeyCredentialParameters {
    /// The credential type. Unknown values deserialize to [`PublicKeyCredentialType::Unknown`].
    #[serde(rename = "type", deserialize_with = "ignore_unknown")]
    pub ty: PublicKeyCredentialType,

    /// The COSE algorithm identifier.
    #[typeshare(serialized_as = "I54")] // because i64 fails for js
    pub alg: i64,
}

impl PublicKeyCredentialParameters {
    /// The algorithms relying parties are expected to offer at minimum:
    /// * [`iana::Algorithm::ES256`]
    /// * [`iana::Algorithm::RS256`]
    pub fn default_algorithms() -> Vec<Self> {
        [iana::Algorithm::ES256, iana::Algorithm::RS256]
            .into_iter()
            .map(|alg| Self {
                ty: PublicKeyCredentialType::PublicKey,
                alg: alg.to_i64(),
            })
            .collect()
    }

    /// The registered COSE algorithm for [`Self::alg`], if it is one.
    pub fn algorithm(&self) -> Option<iana::Algorithm> {
        iana::Algorithm::from_i64(self.alg)
    }
}

/// Requirements on the authenticator taking part in a registration.
///
/// <https://w3c.github.io/webauthn/#dictdef-authenticatorselectioncriteria>
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct AuthenticatorSelectionCriteria {
    /// Restrict eligible authenticators to this attachment modality. Unknown values are treated
    /// as absent.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "ignore_unknown"
    )]
    pub authenticator_attachment: Option<AuthenticatorAttachment>,

    /// Whether a client-side [discoverable credential] should be created. Unknown values are
    /// treated as absent.
    ///
    /// [discoverable credential]: https://w3c.github.io/webauthn/#client-side-discoverable-credential
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "ignore_unknown"
    )]
    pub resident_key: Option<ResidentKeyRequirement>,

    /// WebAuthn Level 1 flag, `true` if and only if [`Self::resident_key`] is
    /// [`ResidentKeyRequirement::Required`].
    #[serde(default)]
    pub require_resident_key: bool,

    /// User verification requirement for the `create()` operation.
    #[serde(default, deserialize_with = "ignore_unknown")]
    pub user_verification: UserVerificationRequirement,
}

impl AuthenticatorSelectionCriteria {
    /// Whether a discoverable credential is mandatory, through either of the two members that
    /// can express it.
    pub fn requires_resident_key(&self) -> bool {
        self.require_resident_key || self.resident_key == Some(ResidentKeyRequirement::Required)
    }
}

/// The relying party's requirement for client-side discoverable credentials.
///
/// <https://w3c.github.io/webauthn/#enumdef-residentkeyrequirement>
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[typeshare(serialized_as = "String")]
pub enum ResidentKeyRequirement {
    /// Prefer a server-side credential.
    Discouraged,

    /// Prefer a discoverable credential.
    Preferred,

    /// Fail unless a discoverable credential can be created.
    Required,
}

/// The relying party's preference regarding attestation conveyance.
///
/// <https://w3c.github.io/webauthn/#enumdef-attestationconveyancepreference>
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[typeshare(serialized_as = "String")]
pub enum AttestationConveyancePreference {
    /// No interest in attestation.
    #[default]
    None,

    /// A verifiable attestation, obtained however the client sees fit.
    Indirect,

    /// The attestation exactly as the authenticator generated it.
    Direct,

    /// An attestation that may uniquely identify the authenticator, for managed deployments.
    Enterprise,
}

/// The outcome of a successful registration, ready to be sent back to the relying party.
///
/// <https://w3c.github.io/webauthn/#dictdef-registrationresponsejson>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponseJson {
    /// The credential id chosen by the authenticator.
    pub id: String,

    /// The raw credential id, `base64url` encoded.
    pub raw_id: String,

    /// The authenticator's attestation response.
    pub response: AuthenticatorAttestationResponseJson,

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

impl RegistrationResponseJson {
    /// Decode the client data the platform collected for this registration.
    pub fn client_data(&self) -> Result<CollectedClientData, InvalidClientData> {
        self.response.client_data()
    }
}

/// The authenticator's response to a credential creation, with binary members `base64url`
/// encoded.
///
/// Apart from the client data and the attestation object, every member is read through an
/// accessor the platform may not implement. Those are absent when it did not provide them.
///
/// <https://w3c.github.io/webauthn/#dictdef-authenticatorattestationresponsejson>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct AuthenticatorAttestationResponseJson {
    /// The exact JSON serialization of [`CollectedClientData`], `base64url` encoded.
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,

    /// The opaque attestation object, `base64url` encoded.
    pub attestation_object: String,

    /// Transports the authenticator is believed to support.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "ignore_unknown_opt_vec"
    )]
    pub transports: Option<Vec<AuthenticatorTransport>>,

    /// The DER `SubjectPublicKeyInfo` of the new credential, `base64url` encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,

    /// The COSE algorithm identifier of the new credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[typeshare(serialized_as = "Option<I54>")] // because i64 fails for js
    pub public_key_algorithm: Option<i64>,

    /// The authenticator data contained in the attestation object, `base64url` encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_data: Option<String>,
}

impl AuthenticatorAttestationResponseJson {
    /// Decode [`Self::client_data_json`].
    pub fn client_data(&self) -> Result<CollectedClientData, InvalidClientData> {
        CollectedClientData::from_base64url(&self.client_data_json)
    }
}

/// The contextual bindings of the relying party and the client that the authenticator signed
/// over, as found in `clientDataJSON`.
///
/// Unknown keys are kept in [`Self::unknown_keys`] in their original order.
///
/// <https://w3c.github.io/webauthn/#dictionary-client-data>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedClientData {
    /// Which operation produced this client data.
    #[serde(rename = "type")]
    pub ty: ClientDataType,

    /// The relying party's challenge, `base64url` encoded.
    pub challenge: String,

    /// The fully qualified origin of the requester.
    pub origin: String,

    /// Whether the request was made from a cross-origin context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_origin: Option<bool>,

    /// The origin of the top level context when it differs from [`Self::origin`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_origin: Option<String>,

    /// Keys this library does not model.
    #[serde(flatten)]
    pub unknown_keys: IndexMap<String, serde_json::Value>,
}

impl CollectedClientData {
    /// Parse client data from its `base64url` encoded JSON serialization.
    pub fn from_base64url(encoded: &str) -> Result<Self, InvalidClientData> {
        let raw = encoding::try_from_base64url(encoded)?;
        Ok(serde_json::from_slice(&raw)?)
    }
}

/// `clientDataJSON` could not be read back.
#[derive(Debug, thiserror::Error)]
pub enum InvalidClientData {
    /// The field is not `base64url` text.
    #[error("clientDataJSON is not base64url encoded")]
    Encoding(#[from] encoding::DecodeError),
    /// The decoded bytes are not a client data dictionary.
    #[error("clientDataJSON is not valid client data")]
    Json(#[from] serde_json::Error),
}

/// The operation a [`CollectedClientData`] was produced for.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[typeshare]
pub enum ClientDataType {
    /// `webauthn.create`
    #[serde(rename = "webauthn.create")]
    #[strum(serialize = "webauthn.create")]
    Create,

    /// `webauthn.get`
    #[serde(rename = "webauthn.get")]
    #[strum(serialize = "webauthn.get")]
    Get,

    /// `payment.get`, from the Secure Payment Confirmation specification.
    ///
    /// <https://www.w3.org/TR/secure-payment-confirmation/#client-extension-processing-authentication>
    #[serde(rename = "payment.get")]
    #[strum(serialize = "payment.get")]
    PaymentGet,
}
