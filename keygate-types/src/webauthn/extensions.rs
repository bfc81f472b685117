use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

#[cfg(doc)]
use crate::webauthn::PublicKeyCredentialCreationOptionsJson;

/// Client extension inputs for zero or more [WebAuthn Extensions].
///
/// Only a few extensions are modeled. Every other key is carried through untouched in
/// [`Self::unknown_keys`], in the order the relying party sent them, so that the platform can act
/// on extensions this library does not know about.
///
/// <https://w3c.github.io/webauthn/#dictdef-authenticationextensionsclientinputs>
///
/// [WebAuthn Extensions]: https://w3c.github.io/webauthn/#webauthn-extensions
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationExtensionsClientInputs {
    /// The FIDO AppID of a credential registered with the legacy U2F JavaScript API.
    ///
    /// <https://w3c.github.io/webauthn/#sctn-appid-extension>
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appid: Option<String>,

    /// Request the [`CredentialPropertiesOutput`] of a newly created credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cred_props: Option<bool>,

    /// Ask for the `hmac-secret` CTAP extension to be enabled on the new credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hmac_create_secret: Option<bool>,

    /// Extension inputs that are not modeled above.
    #[serde(flatten)]
    pub unknown_keys: IndexMap<String, serde_json::Value>,
}

impl AuthenticationExtensionsClientInputs {
    /// Whether no extension input is present at all.
    pub fn is_empty(&self) -> bool {
        self.appid.is_none()
            && self.cred_props.is_none()
            && self.hmac_create_secret.is_none()
            && self.unknown_keys.is_empty()
    }
}

/// Client extension outputs for zero or more [WebAuthn Extensions], as reported by the platform
/// next to a created or asserted credential.
///
/// Like the inputs, outputs of unknown extensions pass through in [`Self::unknown_keys`].
///
/// <https://w3c.github.io/webauthn/#dictdef-authenticationextensionsclientoutputs>
///
/// [WebAuthn Extensions]: https://w3c.github.io/webauthn/#webauthn-extensions
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationExtensionsClientOutputs {
    /// Whether the AppID input was used to produce the assertion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appid: Option<bool>,

    /// Properties of the created credential, when they were requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cred_props: Option<CredentialPropertiesOutput>,

    /// Whether the `hmac-secret` extension was enabled on the new credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hmac_create_secret: Option<bool>,

    /// Extension outputs that are not modeled above.
    #[serde(flatten)]
    pub unknown_keys: IndexMap<String, serde_json::Value>,
}

/// Output of the credential properties extension requested through
/// [`AuthenticationExtensionsClientInputs::cred_props`] on
/// [`PublicKeyCredentialCreationOptionsJson::extensions`].
///
/// <https://w3c.github.io/webauthn/#sctn-authenticator-credential-properties-extension>
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
#[typeshare]
pub struct CredentialPropertiesOutput {
    /// Whether the new credential is discoverable. Absent when the platform cannot tell.
    #[serde(rename = "rk", default, skip_serializing_if = "Option::is_none")]
    pub discoverable: Option<bool>,
}
