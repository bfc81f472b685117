//! Sample App for Keygate
use std::sync::Mutex;

use keygate::{
    client::{
        AssertionResponse, AttestationResponseData, AuthenticationCredential, Client,
        CredentialContainer, CredentialCreationOptions, CredentialRequestOptions, Environment,
        PlatformError, PublicKeyCredential, RegistrationCredential, WebauthnError,
    },
    types::{encoding, webauthn::*, Bytes},
};

// InMemoryPlatform stands in for the browser: it "creates" credentials by remembering them and
// "asserts" by handing back the one it remembers.
#[derive(Default)]
struct InMemoryPlatform {
    credential: Mutex<Option<(Bytes, Bytes)>>,
}

fn client_data(ty: &str, challenge: &[u8]) -> Bytes {
    let client_data = serde_json::json!({
        "type": ty,
        "challenge": encoding::base64url(challenge),
        "origin": "https://example.com",
        "crossOrigin": false,
    });
    // SAFETY: serializing a `serde_json::Value` cannot fail.
    serde_json::to_vec(&client_data).unwrap().into()
}

#[async_trait::async_trait]
impl CredentialContainer for InMemoryPlatform {
    async fn create(
        &self,
        options: &CredentialCreationOptions,
    ) -> Result<Option<RegistrationCredential>, PlatformError> {
        let Some(public_key) = options.public_key.as_ref() else {
            return Err(PlatformError::new("TypeError", "publicKey is required"));
        };
        let credential_id: Bytes = vec![0xcau8, 0xfe, 0xba, 0xbe].into();
        *self.credential.lock().unwrap() = Some((credential_id.clone(), public_key.user.id.clone()));

        Ok(Some(PublicKeyCredential {
            id: encoding::base64url(&credential_id),
            raw_id: credential_id,
            ty: PublicKeyCredentialType::PublicKey,
            authenticator_attachment: Some("platform".into()),
            client_extension_results: Default::default(),
            response: Box::new(AttestationResponseData {
                client_data_json: client_data("webauthn.create", &public_key.challenge),
                attestation_object: vec![0xa0u8].into(),
                transports: Some(vec![AuthenticatorTransport::Internal]),
                public_key_algorithm: Some(-7),
                ..Default::default()
            }),
        }))
    }

    async fn get(
        &self,
        options: &CredentialRequestOptions,
    ) -> Result<Option<AuthenticationCredential>, PlatformError> {
        let Some(public_key) = options.public_key.as_ref() else {
            return Err(PlatformError::new("TypeError", "publicKey is required"));
        };
        let Some((credential_id, user_handle)) = self.credential.lock().unwrap().clone() else {
            return Err(PlatformError::new(
                "NotAllowedError",
                "The operation either timed out or was not allowed.",
            ));
        };

        Ok(Some(PublicKeyCredential {
            id: encoding::base64url(&credential_id),
            raw_id: credential_id,
            ty: PublicKeyCredentialType::PublicKey,
            authenticator_attachment: Some("platform".into()),
            client_extension_results: Default::default(),
            response: AssertionResponse {
                client_data_json: client_data("webauthn.get", &public_key.challenge),
                authenticator_data: vec![0u8; 37].into(),
                signature: vec![0x30u8, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x01].into(),
                user_handle: Some(user_handle),
            },
        }))
    }
}

struct MyEnvironment;

#[async_trait::async_trait]
impl Environment for MyEnvironment {
    fn has_public_key_credential(&self) -> bool {
        true
    }

    fn has_conditional_mediation_check(&self) -> bool {
        true
    }

    async fn is_conditional_mediation_available(&self) -> bool {
        false
    }

    async fn is_user_verifying_platform_authenticator_available(&self) -> bool {
        true
    }

    fn hostname(&self) -> String {
        "example.com".into()
    }

    fn autofill_input_count(&self) -> usize {
        0
    }
}

#[tokio::main]
async fn main() -> Result<(), WebauthnError> {
    let client = Client::new(InMemoryPlatform::default(), MyEnvironment);

    println!(
        "Platform authenticator available: {}",
        client.platform_authenticator_is_available().await
    );

    // The following options would usually be retrieved from a Relying Party.
    let creation_options: PublicKeyCredentialCreationOptionsJson = serde_json::from_value(
        serde_json::json!({
            "rp": { "id": "example.com", "name": "Example" },
            "user": { "id": "johnny", "name": "jpasskey@example.org", "displayName": "Johnny Passkey" },
            "challenge": encoding::base64url(b"registration challenge"),
            "pubKeyCredParams": PublicKeyCredentialParameters::default_algorithms(),
            "authenticatorSelection": { "residentKey": "required", "userVerification": "required" },
        }),
    )
    .expect("Our example should parse.");

    let registration = client.register(creation_options).await?;
    println!(
        "Webauthn credential created:\n\n{}\n\n",
        serde_json::to_string_pretty(&registration).expect("Our example should serialize.")
    );
    if let Ok(client_data) = registration.client_data() {
        println!("Signed challenge: {}", client_data.challenge);
    }

    let request_options: PublicKeyCredentialRequestOptionsJson =
        serde_json::from_value(serde_json::json!({
            "challenge": encoding::base64url(b"authentication challenge"),
            "rpId": "example.com",
            "allowCredentials": [{ "type": "public-key", "id": registration.raw_id }],
        }))
        .expect("Our example should parse.");

    let authentication = client.authenticate(request_options.clone(), false).await?;
    println!(
        "Webauthn credential auth'ed:\n\n{}\n\n",
        serde_json::to_string_pretty(&authentication).expect("Our example should serialize.")
    );

    // This environment has no autofill support, so asking for it fails before the platform is
    // ever called.
    match client.authenticate(request_options, true).await {
        Err(error @ WebauthnError::AutofillUnsupported) => println!("Autofill: {error}"),
        other => println!("Unexpected autofill outcome: {other:?}"),
    }

    Ok(())
}
