use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex, Once,
    },
    time::Duration,
};

use keygate_types::{
    webauthn::{AuthenticationExtensionsClientOutputs, AuthenticatorTransport, PublicKeyCredentialType},
    Bytes,
};
use serde_json::json;

use super::*;

struct CapturingLogger {
    records: Mutex<Vec<String>>,
}

impl log::Log for CapturingLogger {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        self.records
            .lock()
            .unwrap()
            .push(format!("{} {}", record.level(), record.args()));
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger {
    records: Mutex::new(Vec::new()),
};

/// Install the capturing logger. Tests share it, so assertions must look for records unique to
/// the test.
pub(crate) fn init_logger() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(log::LevelFilter::Trace);
    });
}

pub(crate) fn captured_logs() -> Vec<String> {
    LOGGER.records.lock().unwrap().clone()
}

struct FakeEnvironment {
    webauthn: bool,
    autofill: bool,
    autofill_inputs: usize,
    hostname: &'static str,
}

impl Default for FakeEnvironment {
    fn default() -> Self {
        Self {
            webauthn: true,
            autofill: true,
            autofill_inputs: 1,
            hostname: "example.com",
        }
    }
}

#[async_trait::async_trait]
impl Environment for FakeEnvironment {
    fn has_public_key_credential(&self) -> bool {
        self.webauthn
    }

    fn has_conditional_mediation_check(&self) -> bool {
        self.webauthn
    }

    async fn is_conditional_mediation_available(&self) -> bool {
        self.autofill
    }

    async fn is_user_verifying_platform_authenticator_available(&self) -> bool {
        true
    }

    fn hostname(&self) -> String {
        self.hostname.to_owned()
    }

    fn autofill_input_count(&self) -> usize {
        self.autofill_inputs
    }
}

fn creation_json() -> PublicKeyCredentialCreationOptionsJson {
    serde_json::from_value(json!({
        "rp": { "name": "Example RP" },
        "user": { "id": "123", "name": "username", "displayName": "User Name" },
        "challenge": "Y2hhbGxlbmdl",
        "pubKeyCredParams": [{ "alg": -7, "type": "public-key" }],
    }))
    .unwrap()
}

fn request_json() -> PublicKeyCredentialRequestOptionsJson {
    serde_json::from_value(json!({
        "challenge": "AAECAw",
        "rpId": "example.com",
        "allowCredentials": [{ "id": "AAECAw", "type": "public-key" }],
    }))
    .unwrap()
}

fn registration_credential(response: Box<dyn AttestationResponse>) -> RegistrationCredential {
    PublicKeyCredential {
        id: "credential-id".into(),
        raw_id: Bytes::from(vec![0, 1, 2, 3]),
        ty: PublicKeyCredentialType::PublicKey,
        authenticator_attachment: Some("platform".into()),
        client_extension_results: AuthenticationExtensionsClientOutputs::default(),
        response,
    }
}

fn authentication_credential(user_handle: Option<&[u8]>) -> AuthenticationCredential {
    PublicKeyCredential {
        id: "credential-id".into(),
        raw_id: Bytes::from(vec![0, 1, 2, 3]),
        ty: PublicKeyCredentialType::PublicKey,
        authenticator_attachment: Some("cross-platform".into()),
        client_extension_results: AuthenticationExtensionsClientOutputs::default(),
        response: AssertionResponse {
            client_data_json: Bytes::from(vec![8, 9, 10, 11]),
            authenticator_data: Bytes::from(vec![16, 17, 18, 19]),
            signature: Bytes::from(vec![20, 21, 22]),
            user_handle: user_handle.map(Bytes::from),
        },
    }
}

fn complete_attestation() -> AttestationResponseData {
    AttestationResponseData {
        client_data_json: Bytes::from(vec![8, 9, 10, 11]),
        attestation_object: Bytes::from(vec![4, 5, 6, 7]),
        transports: Some(vec![AuthenticatorTransport::Usb]),
        public_key: Some(Bytes::from(vec![12, 13, 14, 15])),
        public_key_algorithm: Some(42),
        authenticator_data: Some(Bytes::from(vec![16, 17, 18, 19])),
    }
}

/// The first ceremony stays pending until its signal is aborted and then answers anyway, with
/// `late_failure` when set and with a credential otherwise. Every later ceremony answers right
/// away with a credential.
#[derive(Default)]
struct LateAnsweringPlatform {
    calls: AtomicUsize,
    signals: Mutex<Vec<AbortSignal>>,
    late_failure: Option<PlatformError>,
}

impl LateAnsweringPlatform {
    fn failing_late(name: &str, message: &str) -> Self {
        Self {
            late_failure: Some(PlatformError::new(name, message)),
            ..Default::default()
        }
    }

    async fn answer_late(&self, signal: Option<AbortSignal>) -> Result<(), PlatformError> {
        let Some(signal) = signal else {
            return Ok(());
        };
        signal.aborted().await;
        match &self.late_failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    /// Record the signal and check that every earlier ceremony was aborted before this one
    /// reached the platform. Returns the signal to wait on for the first call.
    fn enter(&self, signal: Option<&AbortSignal>) -> Option<AbortSignal> {
        let signal = signal.cloned().expect("ceremonies always carry a signal");
        let mut signals = self.signals.lock().unwrap();
        assert!(
            signals.iter().all(AbortSignal::is_aborted),
            "a previous ceremony was still live when a new one reached the platform"
        );
        signals.push(signal.clone());
        (self.calls.fetch_add(1, Ordering::SeqCst) == 0).then_some(signal)
    }
}

#[async_trait::async_trait]
impl CredentialContainer for LateAnsweringPlatform {
    async fn create(
        &self,
        options: &CredentialCreationOptions,
    ) -> Result<Option<RegistrationCredential>, PlatformError> {
        self.answer_late(self.enter(options.signal.as_ref())).await?;
        Ok(Some(registration_credential(Box::new(complete_attestation()))))
    }

    async fn get(
        &self,
        options: &CredentialRequestOptions,
    ) -> Result<Option<AuthenticationCredential>, PlatformError> {
        self.answer_late(self.enter(options.signal.as_ref())).await?;
        Ok(Some(authentication_credential(Some(b"user-1234".as_slice()))))
    }
}

async fn wait_for_pending_ceremony<P: CredentialContainer, E: Environment>(client: &Client<P, E>) {
    let pending = async {
        while !client.ceremony_abort().is_active() {
            tokio::task::yield_now().await;
        }
    };
    tokio::time::timeout(Duration::from_secs(5), pending)
        .await
        .expect("no ceremony became pending");
}

#[tokio::test]
async fn superseded_authentication_reports_the_abort() {
    let client = Client::new(LateAnsweringPlatform::default(), FakeEnvironment::default());

    let (first, second) = tokio::join!(client.authenticate(request_json(), false), async {
        wait_for_pending_ceremony(&client).await;
        client.authenticate(request_json(), false).await
    });

    let first = first.unwrap_err();
    assert_eq!(first.code(), Some(ErrorCode::CeremonyAborted));
    let cause = first.platform_error().unwrap();
    assert_eq!(cause.name, ErrorName::AbortError);
    assert_eq!(cause.message, "Cancelling existing WebAuthn operation for new one");

    let second = second.unwrap();
    assert_eq!(second.response.user_handle.as_deref(), Some("user-1234"));
    assert_eq!(client.platform().calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn superseded_registration_reports_the_abort() {
    let client = Client::new(LateAnsweringPlatform::default(), FakeEnvironment::default());

    let (first, second) = tokio::join!(client.register(creation_json()), async {
        wait_for_pending_ceremony(&client).await;
        client.register(creation_json()).await
    });

    assert_eq!(first.unwrap_err().code(), Some(ErrorCode::CeremonyAborted));
    assert!(second.is_ok());
}

#[tokio::test]
async fn superseded_ceremony_ignores_a_late_failure() {
    let client = Client::new(
        LateAnsweringPlatform::failing_late(
            "NotAllowedError",
            "The operation either timed out or was not allowed.",
        ),
        FakeEnvironment::default(),
    );

    let (first, second) = tokio::join!(client.authenticate(request_json(), false), async {
        wait_for_pending_ceremony(&client).await;
        client.authenticate(request_json(), false).await
    });

    let first = first.unwrap_err();
    assert_eq!(first.code(), Some(ErrorCode::CeremonyAborted));
    let cause = first.platform_error().unwrap();
    assert_eq!(cause.name, ErrorName::AbortError);
    assert_eq!(cause.message, "Cancelling existing WebAuthn operation for new one");
    assert!(second.is_ok());
}

#[tokio::test]
async fn cancelled_registration_ignores_a_late_failure() {
    let client = Client::new(
        LateAnsweringPlatform::failing_late("InvalidStateError", "already registered"),
        FakeEnvironment::default(),
    );

    let (result, ()) = tokio::join!(client.register(creation_json()), async {
        wait_for_pending_ceremony(&client).await;
        client.cancel_ceremony();
    });

    let error = result.unwrap_err();
    assert_eq!(error.code(), Some(ErrorCode::CeremonyAborted));
    assert_eq!(
        error.platform_error().unwrap().message,
        "Manually cancelling existing WebAuthn operation"
    );
}

#[tokio::test]
async fn cancelled_ceremony_reports_the_abort() {
    let client = Client::new(LateAnsweringPlatform::default(), FakeEnvironment::default());

    let (result, ()) = tokio::join!(client.authenticate(request_json(), false), async {
        wait_for_pending_ceremony(&client).await;
        client.cancel_ceremony();
    });

    let error = result.unwrap_err();
    assert_eq!(error.code(), Some(ErrorCode::CeremonyAborted));
    assert_eq!(
        error.platform_error().unwrap().message,
        "Manually cancelling existing WebAuthn operation"
    );
    assert!(!client.ceremony_abort().is_active());
}

#[tokio::test]
async fn shared_slot_serializes_clients() {
    let slot = Arc::new(CeremonyAbort::new());
    let first = Client::new(LateAnsweringPlatform::default(), FakeEnvironment::default())
        .with_ceremony_abort(slot.clone());
    let second = Client::new(LateAnsweringPlatform::default(), FakeEnvironment::default())
        .with_ceremony_abort(slot.clone());

    let (first_result, ()) = tokio::join!(first.authenticate(request_json(), false), async {
        wait_for_pending_ceremony(&first).await;
        let (result, ()) = tokio::join!(second.authenticate(request_json(), false), async {
            while second.platform().calls.load(Ordering::SeqCst) == 0 {
                tokio::task::yield_now().await;
            }
            slot.cancel_ceremony();
        });
        assert_eq!(result.unwrap_err().code(), Some(ErrorCode::CeremonyAborted));
    });

    assert_eq!(first_result.unwrap_err().code(), Some(ErrorCode::CeremonyAborted));
}

#[tokio::test]
async fn register_success() {
    let mut platform = MockCredentialContainer::new();
    platform.expect_create().times(1).returning(|options| {
        let public_key = options.public_key.as_ref().unwrap();
        assert_eq!(&*public_key.user.id, b"123");
        assert!(options.signal.as_ref().is_some_and(|signal| !signal.is_aborted()));
        Ok(Some(registration_credential(Box::new(complete_attestation()))))
    });
    let client = Client::new(platform, FakeEnvironment::default());

    let response = client.register(creation_json()).await.unwrap();

    assert_eq!(
        serde_json::to_value(response).unwrap(),
        json!({
            "id": "credential-id",
            "rawId": "AAECAw",
            "response": {
                "attestationObject": "BAUGBw",
                "clientDataJSON": "CAkKCw",
                "transports": ["usb"],
                "publicKey": "DA0ODw",
                "authenticatorData": "EBESEw",
                "publicKeyAlgorithm": 42,
            },
            "type": "public-key",
            "clientExtensionResults": {},
            "authenticatorAttachment": "platform",
        })
    );
    assert!(client.ceremony_abort().is_active());
}

struct BrokenPublicKey;

impl AttestationResponse for BrokenPublicKey {
    fn client_data_json(&self) -> Bytes {
        Bytes::from(vec![8, 9, 10, 11])
    }

    fn attestation_object(&self) -> Bytes {
        Bytes::from(vec![4, 5, 6, 7])
    }

    fn public_key(&self) -> Result<Option<Bytes>, PlatformError> {
        Err(PlatformError::new("TypeError", "client test: getPublicKey is not a function"))
    }

    fn public_key_algorithm(&self) -> Result<Option<i64>, PlatformError> {
        Ok(Some(-7))
    }
}

#[tokio::test]
async fn register_survives_a_broken_accessor() {
    init_logger();
    let mut platform = MockCredentialContainer::new();
    platform
        .expect_create()
        .times(1)
        .returning(|_| Ok(Some(registration_credential(Box::new(BrokenPublicKey)))));
    let client = Client::new(platform, FakeEnvironment::default());

    let response = client.register(creation_json()).await.unwrap();

    assert_eq!(response.response.public_key, None);
    assert_eq!(response.response.public_key_algorithm, Some(-7));
    assert_eq!(response.response.attestation_object, "BAUGBw");
    assert!(captured_logs().iter().any(|line| line.starts_with("WARN")
        && line.contains("incorrectly implemented getPublicKey()")
        && line.contains("client test: getPublicKey is not a function")));
}

#[tokio::test]
async fn register_failure_is_classified() {
    let mut platform = MockCredentialContainer::new();
    platform.expect_create().times(1).returning(|_| {
        Err(PlatformError::new(
            "InvalidStateError",
            "The user attempted to register an authenticator that contains one of the credentials already registered with the relying party.",
        ))
    });
    let client = Client::new(platform, FakeEnvironment::default());

    let error = client.register(creation_json()).await.unwrap_err();
    assert_eq!(error.code(), Some(ErrorCode::AuthenticatorPreviouslyRegistered));
    assert_eq!(error.to_string(), "The authenticator was previously registered");
}

#[tokio::test]
async fn register_security_error_uses_the_hostname() {
    let mut platform = MockCredentialContainer::new();
    platform
        .expect_create()
        .times(1)
        .returning(|_| Err(PlatformError::new("SecurityError", "The operation is insecure.")));
    let environment = FakeEnvironment {
        hostname: "invalid domain",
        ..Default::default()
    };
    let client = Client::new(platform, environment);

    let error = client.register(creation_json()).await.unwrap_err();
    assert_eq!(error.code(), Some(ErrorCode::InvalidDomain));
}

#[tokio::test]
async fn unsupported_environment_fails_before_the_platform() {
    let mut environment = MockEnvironment::new();
    environment.expect_has_public_key_credential().return_const(false);
    environment.expect_hostname().never();
    let mut platform = MockCredentialContainer::new();
    platform.expect_create().never();
    platform.expect_get().never();
    let client = Client::new(platform, environment);

    let error = client.register(creation_json()).await.unwrap_err();
    assert!(matches!(error, WebauthnError::Unsupported));
    assert_eq!(error.to_string(), "WebAuthn is not supported in this browser");

    let error = client.authenticate(request_json(), true).await.unwrap_err();
    assert!(matches!(error, WebauthnError::Unsupported));
    assert!(!client.ceremony_abort().is_active());
}

#[tokio::test]
async fn ceremony_without_credential_is_not_completed() {
    let mut platform = MockCredentialContainer::new();
    platform.expect_create().times(1).returning(|_| Ok(None));
    platform.expect_get().times(1).returning(|_| Ok(None));
    let client = Client::new(platform, FakeEnvironment::default());

    let error = client.register(creation_json()).await.unwrap_err();
    assert!(matches!(error, WebauthnError::NotCompleted(CeremonyKind::Registration)));
    assert_eq!(error.to_string(), "Registration was not completed");

    let error = client.authenticate(request_json(), false).await.unwrap_err();
    assert!(matches!(error, WebauthnError::NotCompleted(CeremonyKind::Authentication)));
    assert_eq!(error.to_string(), "Authentication was not completed");
}

#[tokio::test]
async fn invalid_registration_challenge_fails_before_the_platform() {
    let mut platform = MockCredentialContainer::new();
    platform.expect_create().never();
    let client = Client::new(platform, FakeEnvironment::default());

    let mut options = creation_json();
    options.challenge = "challenge".into();
    let error = client.register(options).await.unwrap_err();
    assert!(matches!(error, WebauthnError::InvalidEncoding { field: "challenge", .. }));
    assert!(!client.ceremony_abort().is_active());
}

#[tokio::test]
async fn invalid_challenge_fails_before_the_platform() {
    let mut platform = MockCredentialContainer::new();
    platform.expect_get().never();
    let client = Client::new(platform, FakeEnvironment::default());

    let mut options = request_json();
    options.challenge = "***".into();
    let error = client.authenticate(options, false).await.unwrap_err();
    assert!(matches!(error, WebauthnError::InvalidEncoding { field: "challenge", .. }));
    assert!(!client.ceremony_abort().is_active());
}

#[tokio::test]
async fn authenticate_success() {
    let mut platform = MockCredentialContainer::new();
    platform.expect_get().times(1).returning(|options| {
        assert_eq!(options.mediation, None);
        let public_key = options.public_key.as_ref().unwrap();
        assert_eq!(&*public_key.challenge, &[0, 1, 2, 3]);
        assert_eq!(public_key.allow_credentials.as_ref().map(Vec::len), Some(1));
        Ok(Some(authentication_credential(Some("ユーザー".as_bytes()))))
    });
    let client = Client::new(platform, FakeEnvironment::default());

    let response = client.authenticate(request_json(), false).await.unwrap();

    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({
            "id": "credential-id",
            "rawId": "AAECAw",
            "response": {
                "clientDataJSON": "CAkKCw",
                "authenticatorData": "EBESEw",
                "signature": "FBUW",
                "userHandle": "ユーザー",
            },
            "type": "public-key",
            "clientExtensionResults": {},
            "authenticatorAttachment": "cross-platform",
        })
    );
}

#[tokio::test]
async fn empty_and_absent_allow_lists_reach_the_platform() {
    let mut platform = MockCredentialContainer::new();
    platform
        .expect_get()
        .times(2)
        .returning(|options| {
            assert_eq!(options.public_key.as_ref().unwrap().allow_credentials, None);
            Ok(Some(authentication_credential(None)))
        });
    let client = Client::new(platform, FakeEnvironment::default());

    let mut options = request_json();
    options.allow_credentials = Some(Vec::new());
    let response = client.authenticate(options, false).await.unwrap();
    assert_eq!(response.response.user_handle, None);

    let mut options = request_json();
    options.allow_credentials = None;
    assert!(client.authenticate(options, false).await.is_ok());
}

#[tokio::test]
async fn autofill_uses_conditional_mediation() {
    let mut platform = MockCredentialContainer::new();
    platform.expect_get().times(1).returning(|options| {
        assert_eq!(options.mediation, Some(CredentialMediationRequirement::Conditional));
        assert_eq!(
            options.public_key.as_ref().unwrap().allow_credentials,
            Some(Vec::new())
        );
        Ok(Some(authentication_credential(Some(b"user-1234".as_slice()))))
    });
    let client = Client::new(platform, FakeEnvironment::default());

    assert!(client.authenticate(request_json(), true).await.is_ok());
}

#[tokio::test]
async fn autofill_preconditions() {
    let mut platform = MockCredentialContainer::new();
    platform.expect_get().never();

    let environment = FakeEnvironment {
        autofill: false,
        ..Default::default()
    };
    let client = Client::new(platform, environment);
    let error = client.authenticate(request_json(), true).await.unwrap_err();
    assert!(matches!(error, WebauthnError::AutofillUnsupported));
    assert_eq!(error.to_string(), "Browser does not support WebAuthn autofill");
    assert_eq!(error.code(), None);

    let mut platform = MockCredentialContainer::new();
    platform.expect_get().never();
    let environment = FakeEnvironment {
        autofill_inputs: 0,
        ..Default::default()
    };
    let client = Client::new(platform, environment);
    let error = client.authenticate(request_json(), true).await.unwrap_err();
    assert!(matches!(error, WebauthnError::NoAutofillInput));
    assert!(!client.ceremony_abort().is_active());
}

#[tokio::test]
async fn authenticate_failure_is_classified() {
    let mut platform = MockCredentialContainer::new();
    platform
        .expect_get()
        .times(1)
        .returning(|_| Err(PlatformError::new("DataError", "something odd")));
    let client = Client::new(platform, FakeEnvironment::default());

    let error = client.authenticate(request_json(), false).await.unwrap_err();
    assert_eq!(error.code(), Some(ErrorCode::AuthenticatorGeneralError));
    assert_eq!(error.to_string(), "Unknown Error");
}

#[tokio::test]
async fn capability_passthrough() {
    let client = Client::new(MockCredentialContainer::new(), FakeEnvironment::default());
    assert!(client.supports_webauthn());
    assert!(client.supports_webauthn_autofill().await);
    assert!(client.platform_authenticator_is_available().await);

    let environment = FakeEnvironment {
        webauthn: false,
        ..Default::default()
    };
    let client = Client::new(MockCredentialContainer::new(), environment);
    assert!(!client.supports_webauthn());
    assert!(!client.supports_webauthn_autofill().await);
    assert!(!client.platform_authenticator_is_available().await);
}
