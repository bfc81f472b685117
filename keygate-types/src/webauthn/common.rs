//! Types shared by registration and authentication ceremonies.
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use typeshare::typeshare;

use crate::{
    utils::serde::{ignore_unknown, ignore_unknown_opt_vec},
    Bytes,
};

#[cfg(doc)]
use crate::webauthn::{
    PublicKeyCredentialCreationOptions, PublicKeyCredentialCreationOptionsJson,
    PublicKeyCredentialRequestOptions, PublicKeyCredentialRequestOptionsJson,
};

/// The kind of credential a ceremony operates on.
///
/// `public-key` is the only type defined today, anything else deserializes to
/// [`PublicKeyCredentialType::Unknown`] so that it can be filtered out instead of failing the
/// whole request.
///
/// <https://w3c.github.io/webauthn/#enumdef-publickeycredentialtype>
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[typeshare(serialized_as = "String")]
pub enum PublicKeyCredentialType {
    /// An asymmetric key pair credential.
    PublicKey,
    /// Any type tag this library does not know about.
    #[default]
    Unknown,
}

/// A credential reference as it arrives from a relying party, with its id still in `base64url`
/// text form. Used in [`PublicKeyCredentialCreationOptionsJson::exclude_credentials`] and
/// [`PublicKeyCredentialRequestOptionsJson::allow_credentials`].
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialdescriptorjson>
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[typeshare]
pub struct PublicKeyCredentialDescriptorJson {
    /// The type of the referenced credential.
    #[serde(rename = "type", deserialize_with = "ignore_unknown")]
    pub ty: PublicKeyCredentialType,

    /// The credential id, `base64url` encoded.
    pub id: String,

    /// Hints as to how the client might reach the authenticator holding this credential. Unknown
    /// transports are dropped.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "ignore_unknown_opt_vec"
    )]
    pub transports: Option<Vec<AuthenticatorTransport>>,
}

/// The binary counterpart of [`PublicKeyCredentialDescriptorJson`], as handed to the platform in
/// [`PublicKeyCredentialCreationOptions::exclude_credentials`] and
/// [`PublicKeyCredentialRequestOptions::allow_credentials`].
///
/// <https://w3c.github.io/webauthn/#dictdef-publickeycredentialdescriptor>
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct PublicKeyCredentialDescriptor {
    /// The type of the referenced credential.
    #[serde(rename = "type")]
    pub ty: PublicKeyCredentialType,

    /// The raw credential id.
    pub id: Bytes,

    /// Hints as to how the client might reach the authenticator holding this credential.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transports: Option<Vec<AuthenticatorTransport>>,
}

impl PublicKeyCredentialDescriptor {
    /// Whether [`Self::ty`] is a type this library understands. Platforms ignore descriptors of
    /// an unknown type.
    pub fn is_known(&self) -> bool {
        match self.ty {
            PublicKeyCredentialType::PublicKey => true,
            PublicKeyCredentialType::Unknown => false,
        }
    }
}

/// The relying party's requirement for [user verification] during a ceremony.
///
/// <https://w3c.github.io/webauthn/#enumdef-userverificationrequirement>
///
/// [user verification]: https://w3c.github.io/webauthn/#user-verification
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[typeshare(serialized_as = "String")]
pub enum UserVerificationRequirement {
    /// The ceremony fails if the user cannot be verified.
    Required,

    /// Verify the user when possible, but do not fail without it.
    #[default]
    Preferred,

    /// The relying party does not want user verification.
    Discouraged,
}

/// Ways a client may communicate with an authenticator.
///
/// <https://w3c.github.io/webauthn/#enum-transport>
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[typeshare(serialized_as = "String")]
pub enum AuthenticatorTransport {
    /// Removable USB.
    Usb,

    /// Near Field Communication.
    Nfc,

    /// Bluetooth Low Energy.
    Ble,

    /// ISO/IEC 7816 smart card with contacts.
    #[serde(rename = "smart-card")]
    SmartCard,

    /// A combination of data transport and proximity mechanisms, such as signing in on a desktop
    /// with a phone.
    #[serde(alias = "cable")]
    Hybrid,

    /// A client device-specific transport, meaning a platform authenticator.
    Internal,
}

/// How an authenticator is attached to the client device.
///
/// Relying parties use it to express a preference when creating credentials, and platforms use it
/// to report which modality completed a ceremony. The platform reports it as a raw string, which
/// is parsed with [`std::str::FromStr`] and reduced to nothing when it is not one of these values.
///
/// <https://w3c.github.io/webauthn/#enumdef-authenticatorattachment>
#[derive(
    Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
#[typeshare(serialized_as = "String")]
pub enum AuthenticatorAttachment {
    /// Bound to the client device, usually not removable.
    Platform,

    /// Removable and able to roam between client devices, like a security key or a phone.
    CrossPlatform,
}

/// Hints from the relying party about how a request may best be completed. They are ordered by
/// decreasing preference and take precedence over transports and attachment when they conflict.
///
/// <https://w3c.github.io/webauthn/#enum-hints>
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[typeshare(serialized_as = "String")]
#[non_exhaustive]
pub enum PublicKeyCredentialHints {
    /// A physical security key is expected.
    SecurityKey,

    /// A platform authenticator attached to the client device is expected.
    ClientDevice,

    /// A general purpose authenticator such as a smartphone is expected.
    Hybrid,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn authenticator_attachment_parses_known_tags_only() {
        assert_eq!(
            AuthenticatorAttachment::from_str("platform"),
            Ok(AuthenticatorAttachment::Platform)
        );
        assert_eq!(
            AuthenticatorAttachment::from_str("cross-platform"),
            Ok(AuthenticatorAttachment::CrossPlatform)
        );
        assert!(AuthenticatorAttachment::from_str("").is_err());
        assert!(AuthenticatorAttachment::from_str("Platform").is_err());
        assert!(AuthenticatorAttachment::from_str("roaming").is_err());
        assert_eq!(
            AuthenticatorAttachment::CrossPlatform.to_string(),
            "cross-platform"
        );
    }

    #[test]
    fn descriptor_drops_unknown_transports_and_types() {
        let descriptor: PublicKeyCredentialDescriptorJson = serde_json::from_str(
            r#"{"type": "password", "id": "AAEC", "transports": ["usb", "carrier-pigeon", "smart-card", "cable"]}"#,
        )
        .unwrap();
        assert_eq!(descriptor.ty, PublicKeyCredentialType::Unknown);
        assert_eq!(
            descriptor.transports,
            Some(vec![
                AuthenticatorTransport::Usb,
                AuthenticatorTransport::SmartCard,
                AuthenticatorTransport::Hybrid
            ])
        );
    }

    #[test]
    fn descriptor_keeps_absent_transports_absent() {
        let descriptor: PublicKeyCredentialDescriptorJson =
            serde_json::from_str(r#"{"type": "public-key", "id": "AAEC"}"#).unwrap();
        assert_eq!(descriptor.ty, PublicKeyCredentialType::PublicKey);
        assert_eq!(descriptor.transports, None);

        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json, serde_json::json!({"type": "public-key", "id": "AAEC"}));
    }
}
