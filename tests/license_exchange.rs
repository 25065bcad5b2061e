use std::sync::{LazyLock, Mutex};

use aes::cipher::{block_padding::NoPadding, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use prost::Message;
use rsa::pkcs1::EncodeRsaPublicKey;
use rsa::rand_core::{OsRng, RngCore};
use rsa::{Oaep, Pss, RsaPrivateKey, RsaPublicKey};
use sha1::{Digest, Sha1};

use wvlicense::cdm::{
    derive_context, derive_encryption_key, CdmOptions, SERVICE_CERTIFICATE_CHALLENGE,
};
use wvlicense::codec::{RawMessage, Value};
use wvlicense::license_protocol::license::key_container::KeyType;
use wvlicense::license_protocol::license::KeyContainer;
use wvlicense::license_protocol::signed_message::MessageType;
use wvlicense::license_protocol::{
    DrmCertificate, License, LicenseRequest, SignedDrmCertificate, SignedMessage,
    WidevineCencHeader,
};
use wvlicense::padding::{pad, unpad, UnpadPolicy};
use wvlicense::pssh::{build_pssh_box, WIDEVINE_SYSTEM_ID};
use wvlicense::recorder::{Direction, Exchange, ExchangeRecorder};
use wvlicense::{Cdm, DeviceIdentity, Error, LicenseEndpoint, Result, Transport};

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

static DEVICE_KEY: LazyLock<RsaPrivateKey> =
    LazyLock::new(|| RsaPrivateKey::new(&mut OsRng, 1024).expect("device key"));
static SERVICE_KEY: LazyLock<RsaPrivateKey> =
    LazyLock::new(|| RsaPrivateKey::new(&mut OsRng, 1024).expect("service key"));

const CONTENT_KEY: [u8; 16] = [0x3C; 16];

fn cbc_encrypt(key: &[u8; 16], iv: &[u8; 16], plain: &[u8]) -> Vec<u8> {
    let mut buffer = plain.to_vec();
    let len = buffer.len();
    Aes128CbcEnc::new(key.into(), iv.into())
        .encrypt_padded_mut::<NoPadding>(&mut buffer, len)
        .expect("encrypt")
        .to_vec()
}

fn cbc_decrypt(key: &[u8; 16], iv: &[u8; 16], cipher: &[u8]) -> Vec<u8> {
    let mut buffer = cipher.to_vec();
    Aes128CbcDec::new(key.into(), iv.into())
        .decrypt_padded_mut::<NoPadding>(&mut buffer)
        .expect("decrypt")
        .to_vec()
}

/// In-process license server.
///
/// Checks the request signature, wraps a fresh session key for the device,
/// and returns one content key per requested key id followed by a container
/// whose ciphertext is not block aligned.
struct FakeLicenseServer {
    device_key: RsaPublicKey,
    /// Client id recovered from the last request, clear or decrypted.
    seen_client_id: Mutex<Option<Vec<u8>>>,
}

impl FakeLicenseServer {
    fn new(device_key: RsaPublicKey) -> Self {
        Self {
            device_key,
            seen_client_id: Mutex::new(None),
        }
    }

    fn service_certificate() -> Vec<u8> {
        let cert = DrmCertificate {
            serial_number: Some(b"service-serial".to_vec()),
            public_key: Some(
                SERVICE_KEY
                    .to_public_key()
                    .to_pkcs1_der()
                    .expect("der")
                    .as_bytes()
                    .to_vec(),
            ),
            service_id: Some("license.test".to_string()),
            ..Default::default()
        };
        let signed = SignedDrmCertificate {
            drm_certificate: Some(cert.encode_to_vec()),
            signature: None,
        };
        SignedMessage {
            r#type: Some(MessageType::ServiceCertificate as i32),
            msg: Some(signed.encode_to_vec()),
            ..Default::default()
        }
        .encode_to_vec()
    }

    fn license(&self, body: &[u8]) -> Result<Vec<u8>> {
        let signed = SignedMessage::decode(body)?;
        assert_eq!(signed.r#type, Some(MessageType::LicenseRequest as i32));
        let msg = signed.msg.expect("request msg");
        let hash = Sha1::digest(&msg);
        self.device_key
            .verify(Pss::new::<Sha1>(), &hash, &signed.signature.expect("signature"))
            .map_err(|_| Error::Transport("403 Forbidden".to_string()))?;

        let request = LicenseRequest::decode(msg.as_slice())?;
        let client_id = match (request.client_id, request.encrypted_client_id) {
            (Some(clear), None) => clear,
            (None, Some(encrypted)) => {
                let privacy_key: [u8; 16] = SERVICE_KEY
                    .decrypt(Oaep::new::<Sha1>(), &encrypted.encrypted_privacy_key.expect("key"))
                    .expect("privacy key")
                    .try_into()
                    .expect("privacy key length");
                let iv: [u8; 16] = encrypted
                    .encrypted_client_id_iv
                    .expect("iv")
                    .try_into()
                    .expect("iv length");
                let padded =
                    cbc_decrypt(&privacy_key, &iv, &encrypted.encrypted_client_id.expect("ct"));
                unpad(&padded, UnpadPolicy::Strict).expect("padding").to_vec()
            }
            other => panic!("unexpected client id fields: {:?}", other),
        };
        *self.seen_client_id.lock().expect("lock") = Some(client_id);

        let key_ids = request
            .content_id
            .and_then(|c| c.cenc_id)
            .and_then(|c| c.pssh)
            .map(|p| p.key_id)
            .unwrap_or_default();

        let mut session_key = [0u8; 16];
        OsRng.fill_bytes(&mut session_key);
        let enc_key = derive_encryption_key(&session_key, &derive_context(&msg))?;

        let mut containers: Vec<KeyContainer> = key_ids
            .into_iter()
            .map(|id| {
                let mut iv = [0u8; 16];
                OsRng.fill_bytes(&mut iv);
                KeyContainer {
                    id: Some(id),
                    iv: Some(iv.to_vec()),
                    key: Some(cbc_encrypt(&enc_key, &iv, &pad(&CONTENT_KEY))),
                    r#type: Some(KeyType::Content as i32),
                }
            })
            .collect();
        containers.push(KeyContainer {
            id: Some(b"broken".to_vec()),
            iv: Some(vec![0u8; 16]),
            key: Some(vec![0u8; 15]),
            r#type: Some(KeyType::Content as i32),
        });

        let license = License {
            id: None,
            key: containers,
        };
        let wrapped = self
            .device_key
            .encrypt(&mut OsRng, Oaep::new::<Sha1>(), &session_key)
            .map_err(|_| Error::KeyUnwrapFailed)?;

        Ok(SignedMessage {
            r#type: Some(MessageType::License as i32),
            msg: Some(license.encode_to_vec()),
            signature: Some(vec![0u8; 32]),
            session_key: Some(wrapped),
        }
        .encode_to_vec())
    }
}

impl Transport for FakeLicenseServer {
    fn post(&self, _endpoint: &LicenseEndpoint, body: &[u8]) -> Result<Vec<u8>> {
        if body == SERVICE_CERTIFICATE_CHALLENGE {
            return Ok(Self::service_certificate());
        }
        self.license(body)
    }
}

#[derive(Default)]
struct Capture(Mutex<Vec<(Direction, usize)>>);

impl ExchangeRecorder for Capture {
    fn record(&self, exchange: &Exchange<'_>) {
        self.0
            .lock()
            .expect("lock")
            .push((exchange.direction, exchange.body.len()));
    }
}

fn client_id_blob() -> Vec<u8> {
    let mut msg = RawMessage::new();
    msg.push(1, Value::Varint(1))
        .push(2, Value::Bytes(b"device-token".to_vec()));
    msg.encode()
}

fn init_data(key_ids: &[&str]) -> Vec<u8> {
    let header = WidevineCencHeader {
        key_id: key_ids.iter().map(|k| k.as_bytes().to_vec()).collect(),
        content_id: Some(b"abc".to_vec()),
        ..Default::default()
    };
    build_pssh_box(WIDEVINE_SYSTEM_ID, &header.encode_to_vec())
}

#[test]
fn acquires_keys_in_clear_mode() {
    let identity = DeviceIdentity::from_key(DEVICE_KEY.clone(), client_id_blob());
    let server = FakeLicenseServer::new(identity.public_key());
    let capture = Capture::default();
    let endpoint = LicenseEndpoint::new("https://license.test/wv");

    let batch = Cdm::new(&identity)
        .with_recorder(&capture)
        .acquire_keys(&server, &endpoint, &init_data(&["k1", "k2"]))
        .expect("license exchange");

    assert_eq!(batch.keys.len(), 2);
    assert_eq!(batch.keys[0].id, b"k1");
    assert_eq!(batch.keys[1].id, b"k2");
    for key in &batch.keys {
        assert_eq!(key.key, CONTENT_KEY);
    }
    assert_eq!(batch.of_type(KeyType::Content).count(), 2);

    assert_eq!(batch.rejected.len(), 1);
    assert!(matches!(
        batch.rejected[0],
        Error::MalformedKeyContainer { index: 2, .. }
    ));

    assert_eq!(
        server.seen_client_id.lock().expect("lock").as_deref(),
        Some(client_id_blob().as_slice())
    );

    let recorded = capture.0.lock().expect("lock");
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[0].0, Direction::Request);
    assert_eq!(recorded[1].0, Direction::Response);
}

#[test]
fn acquires_keys_in_privacy_mode() {
    let identity = DeviceIdentity::from_key(DEVICE_KEY.clone(), client_id_blob());
    let server = FakeLicenseServer::new(identity.public_key());
    let endpoint = LicenseEndpoint::new("https://license.test/wv");

    let certificate = Cdm::new(&identity)
        .request_service_certificate(&server, &endpoint)
        .expect("service certificate");
    let identity = identity.with_certificate(certificate);

    let options = CdmOptions {
        privacy_mode: true,
        ..Default::default()
    };
    let batch = Cdm::new(&identity)
        .with_options(options)
        .acquire_keys(&server, &endpoint, &init_data(&["k1"]))
        .expect("license exchange");

    assert_eq!(batch.keys.len(), 1);
    assert_eq!(batch.keys[0].key, CONTENT_KEY);
    assert_eq!(
        server.seen_client_id.lock().expect("lock").as_deref(),
        Some(client_id_blob().as_slice())
    );
}

#[test]
fn response_for_another_request_yields_garbage_keys() {
    let identity = DeviceIdentity::from_key(DEVICE_KEY.clone(), client_id_blob());
    let server = FakeLicenseServer::new(identity.public_key());
    let endpoint = LicenseEndpoint::new("https://license.test/wv");
    let cdm = Cdm::new(&identity).with_options(CdmOptions {
        unpad: UnpadPolicy::Permissive,
        ..Default::default()
    });

    let first = cdm.challenge(&init_data(&["k1"])).expect("first");
    let second = cdm.challenge(&init_data(&["k1"])).expect("second");
    let response = server.post(&endpoint, &first.body).expect("license");

    // Requests built within the same second are identical apart from the
    // signature, and so derive the same key.
    let signed_msg = |body: &[u8]| SignedMessage::decode(body).expect("signed").msg;
    if signed_msg(&first.body) != signed_msg(&second.body) {
        let batch = cdm.parse_license(&second, &response).expect("parse");
        assert!(batch.keys.iter().all(|k| k.key != CONTENT_KEY));
    }
    let batch = cdm.parse_license(&first, &response).expect("parse");
    assert_eq!(batch.keys[0].key, CONTENT_KEY);
}

#[test]
fn rejected_signature_surfaces_as_transport_error() {
    let identity = DeviceIdentity::from_key(DEVICE_KEY.clone(), client_id_blob());
    let server = FakeLicenseServer::new(SERVICE_KEY.to_public_key());
    let err = Cdm::new(&identity)
        .acquire_keys(
            &server,
            &LicenseEndpoint::new("https://license.test/wv"),
            &init_data(&["k1"]),
        )
        .expect_err("signature rejected");
    assert!(matches!(err, Error::Transport(_)));
}
