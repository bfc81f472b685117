//! # Keygate
//!
//! The `keygate` library is a collection of Rust libraries to run [WebAuthn][webauthn-3]
//! registration and authentication ceremonies from the client side, the way a web application
//! drives `navigator.credentials`. It is comprised of two sub-libraries:
//!
//! - `keygate-client` - a library, usable as [`client`], which orchestrates ceremonies, gates them
//!   on what the environment supports, serializes them and classifies their failures.
//! - `keygate-types` - type definitions, usable as [`types`], for the JSON dictionaries exchanged
//!   with the Relying Party and the binary dictionaries exchanged with the platform, along with the
//!   `base64url` codec translating between the two.
//!
//! Examples in this documentation show certain values being assumed to come from the website
//! (Relying Party). It is not within the scope of these libraries to manage the details of the
//! interaction with the Relying Party, nor to verify what the authenticator returns.
//!
//! ## Basic Concepts
//!
//! RelyingParty <-> [`Client`](client::Client) <-> [`CredentialContainer`](client::CredentialContainer) <-> Authenticator
//!
//! The [`Client`](client::Client) type turns options from the Relying Party into options the
//! platform understands and turns the platform's credentials back into JSON. It provides the
//! following API:
//!
//! - [`register()`](client::Client::register()) - Register a WebAuthn credential.
//! - [`authenticate()`](client::Client::authenticate()) - Authenticate with a WebAuthn credential,
//!   optionally through form autofill.
//! - [`cancel_ceremony()`](client::Client::cancel_ceremony()) - Abort the pending ceremony.
//!
//! The [`Client`](client::Client) does not talk to authenticators itself. It depends on a
//! [`CredentialContainer`](client::CredentialContainer) giving access to the platform's
//! credential primitives, and on an [`Environment`](client::Environment) reporting what the
//! platform supports.
//!
//! A runnable demonstration binary is provided in `keygate/examples/usage.rs`.
//!
//! [webauthn-3]: https://www.w3.org/TR/webauthn-3/
//!
//! ### Example: Registering a credential
//!
//! ```
//! use keygate::{
//!     client::{
//!         AttestationResponseData, Client, CredentialContainer, CredentialCreationOptions,
//!         CredentialRequestOptions, Environment, PlatformError, PublicKeyCredential,
//!         AuthenticationCredential, RegistrationCredential,
//!     },
//!     types::{webauthn::*, Bytes},
//! };
//! #
//! # // A platform that creates the same credential every time.
//! # struct MyPlatform;
//! # #[async_trait::async_trait]
//! # impl CredentialContainer for MyPlatform {
//! #     async fn create(
//! #         &self,
//! #         _options: &CredentialCreationOptions,
//! #     ) -> Result<Option<RegistrationCredential>, PlatformError> {
//! #         Ok(Some(PublicKeyCredential {
//! #             id: "AAECAw".into(),
//! #             raw_id: Bytes::from(vec![0, 1, 2, 3]),
//! #             ty: PublicKeyCredentialType::PublicKey,
//! #             authenticator_attachment: Some("platform".into()),
//! #             client_extension_results: Default::default(),
//! #             response: Box::new(AttestationResponseData::default()),
//! #         }))
//! #     }
//! #
//! #     async fn get(
//! #         &self,
//! #         _options: &CredentialRequestOptions,
//! #     ) -> Result<Option<AuthenticationCredential>, PlatformError> {
//! #         Ok(None)
//! #     }
//! # }
//! #
//! # struct MyEnvironment;
//! # #[async_trait::async_trait]
//! # impl Environment for MyEnvironment {
//! #     fn has_public_key_credential(&self) -> bool { true }
//! #     fn has_conditional_mediation_check(&self) -> bool { true }
//! #     async fn is_conditional_mediation_available(&self) -> bool { true }
//! #     async fn is_user_verifying_platform_authenticator_available(&self) -> bool { true }
//! #     fn hostname(&self) -> String { "example.com".into() }
//! #     fn autofill_input_count(&self) -> usize { 1 }
//! # }
//!
//! # tokio_test::block_on(async {
//! let client = Client::new(MyPlatform, MyEnvironment);
//!
//! // The options would usually be fetched from the Relying Party.
//! let options_from_rp: PublicKeyCredentialCreationOptionsJson = serde_json::from_str(
//!     r#"{
//!         "rp": { "id": "example.com", "name": "Example" },
//!         "user": { "id": "user-1234", "name": "jpasskey@example.org", "displayName": "Johnny Passkey" },
//!         "challenge": "Y2hhbGxlbmdl",
//!         "pubKeyCredParams": [{ "type": "public-key", "alg": -7 }]
//!     }"#,
//! )
//! .unwrap();
//!
//! let response = client.register(options_from_rp).await.unwrap();
//! assert_eq!(response.raw_id, "AAECAw");
//! assert_eq!(response.authenticator_attachment, Some(AuthenticatorAttachment::Platform));
//! # })
//! ```

pub use keygate_client as client;
pub use keygate_types as types;
