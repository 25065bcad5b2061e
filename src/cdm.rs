//! License request construction and license response processing.
//!
//! One transaction runs
//! `build_request -> sign_request -> (transport) -> process_response`.
//! Every step either succeeds or ends the transaction with an error; nothing
//! is retried here. A caller retrying the whole cycle gets a fresh
//! [`SessionId`] because one is built per request.
//!
//! All functions are synchronous and keep no state between calls, so separate
//! transactions can run on different threads while sharing one
//! [`DeviceIdentity`].

use std::time::{SystemTime, UNIX_EPOCH};

use aes::Aes128;
use cbc::cipher::{block_padding::NoPadding, BlockEncryptMut, KeyIvInit};
use cmac::{Cmac, Mac};
use prost::Message;
use rsa::rand_core::{OsRng, RngCore};
use rsa::{Oaep, Pss, RsaPrivateKey};
use sha1::{Digest, Sha1};
use zeroize::Zeroizing;

use crate::codec::RawMessage;
use crate::device::{DeviceCertificate, DeviceIdentity};
use crate::error::{Error, Result};
use crate::key::{ContentKey, KeyBatch};
use crate::license_protocol::license_request::content_identification::Cenc;
use crate::license_protocol::license_request::{ContentIdentification, RequestType};
use crate::license_protocol::signed_message::MessageType;
use crate::license_protocol::{
    EncryptedClientIdentification, License, LicenseRequest, LicenseType, ProtocolVersion,
    SignedMessage, WidevineCencHeader,
};
use crate::padding::{self, UnpadPolicy};
use crate::pssh::InitData;
use crate::recorder::{Direction, Exchange, ExchangeRecorder, NullRecorder};
use crate::session::SessionId;
use crate::transport::{LicenseEndpoint, Transport};

type CmacAes128 = Cmac<Aes128>;
type Aes128CbcEnc = cbc::Encryptor<Aes128>;

/// Body that asks a license server for its service certificate.
pub const SERVICE_CERTIFICATE_CHALLENGE: &[u8] = b"\x08\x04";

/// Label mixed into the content-key encryption key derivation.
const ENCRYPTION_LABEL: &[u8] = b"ENCRYPTION";

/// Bit length of the derived key, as appended to the derivation context.
const DERIVED_KEY_BITS: u32 = 128;

/// Per-transaction behaviour switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CdmOptions {
    /// Encrypt the client identity under the service certificate.
    pub privacy_mode: bool,
    /// How to treat implausible padding in decrypted keys.
    pub unpad: UnpadPolicy,
}

/// Build the license request for `init_data`.
///
/// Fails with [`Error::InitDataTooShort`] for init data under 32 bytes,
/// [`Error::MalformedMessage`] if the CENC header or the client identity blob
/// does not decode, and [`Error::PrivacyModeUnavailable`] if `privacy_mode` is
/// set but the identity carries no certificate.
pub fn build_request(
    init_data: &[u8],
    identity: &DeviceIdentity,
    privacy_mode: bool,
) -> Result<(LicenseRequest, SessionId)> {
    let init_data = InitData::from_bytes(init_data)?;
    let cenc_header = init_data.cenc_header()?;
    let session_id = SessionId::new();

    let (client_id, encrypted_client_id) = if privacy_mode {
        let certificate = identity
            .certificate()
            .ok_or(Error::PrivacyModeUnavailable)?;
        let certificate = DeviceCertificate::parse(certificate)?;
        let encrypted = encrypt_client_id(identity.client_id(), &certificate)?;
        (None, Some(encrypted))
    } else {
        // The blob is sent verbatim; only check that it is a message.
        RawMessage::decode(identity.client_id())?;
        (Some(identity.client_id().to_vec()), None)
    };

    let content_id = ContentIdentification {
        cenc_id: Some(Cenc {
            pssh: Some(WidevineCencHeader {
                key_id: cenc_header.key_id,
                content_id: cenc_header.content_id,
                ..Default::default()
            }),
            license_type: Some(LicenseType::Default as i32),
            request_id: Some(session_id.to_vec()),
        }),
    };

    let request_time = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default();

    let request = LicenseRequest {
        client_id,
        content_id: Some(content_id),
        r#type: Some(RequestType::New as i32),
        request_time: Some(request_time),
        key_control_nonce_deprecated: None,
        protocol_version: Some(ProtocolVersion::Current as i32),
        key_control_nonce: Some(0),
        encrypted_client_id,
    };

    debug!(
        "Built license request (privacy: {}, key ids: {})",
        privacy_mode,
        request
            .content_id
            .as_ref()
            .and_then(|c| c.cenc_id.as_ref())
            .and_then(|c| c.pssh.as_ref())
            .map_or(0, |p| p.key_id.len())
    );
    Ok((request, session_id))
}

/// Encrypt the client identity blob for privacy mode.
///
/// A fresh random AES-128 key and IV are drawn for every call. The blob is
/// padded (always non-empty padding), AES-CBC encrypted, and the AES key is
/// RSA-OAEP-SHA1 wrapped under the certificate's public key.
pub fn encrypt_client_id(
    client_id: &[u8],
    certificate: &DeviceCertificate,
) -> Result<EncryptedClientIdentification> {
    let mut privacy_key = Zeroizing::new([0u8; 16]);
    let mut privacy_iv = [0u8; 16];
    OsRng.fill_bytes(privacy_key.as_mut());
    OsRng.fill_bytes(&mut privacy_iv);

    let mut buffer = padding::pad(client_id);
    let buffer_len = buffer.len();
    // Borrow the key in place so no unwiped copy of it is made.
    let encrypted_client_id = Aes128CbcEnc::new_from_slices(privacy_key.as_ref(), &privacy_iv)
        .map_err(|_| Error::InvalidKey("Privacy key must be 16 bytes".to_string()))?
        .encrypt_padded_mut::<NoPadding>(&mut buffer, buffer_len)
        .map_err(|_| Error::MalformedMessage("Padded client id is not block aligned".to_string()))?
        .to_vec();

    let encrypted_privacy_key = certificate
        .public_key
        .encrypt(&mut OsRng, Oaep::new::<Sha1>(), privacy_key.as_ref())
        .map_err(|_| {
            Error::InvalidKey("Service public key cannot wrap the privacy key".to_string())
        })?;

    Ok(EncryptedClientIdentification {
        service_id: Some(certificate.service_id.clone()),
        service_certificate_serial_number: Some(certificate.serial_number.clone()),
        encrypted_client_id: Some(encrypted_client_id),
        encrypted_client_id_iv: Some(privacy_iv.to_vec()),
        encrypted_privacy_key: Some(encrypted_privacy_key),
    })
}

/// Sign a message with RSA-PSS over its SHA-1 digest, salt length equal to
/// the digest length.
pub fn sign(message: &[u8], private_key: &RsaPrivateKey) -> Result<Vec<u8>> {
    let hash = Sha1::digest(message);
    private_key
        .sign_with_rng(&mut OsRng, Pss::new::<Sha1>(), &hash)
        .map_err(|_| Error::SigningFailed)
}

/// Serialize and sign a license request into its wire envelope.
///
/// The clear or encrypted client identity travels inside the signed message.
pub fn sign_request(request: &LicenseRequest, private_key: &RsaPrivateKey) -> Result<SignedMessage> {
    let msg = request.encode_to_vec();
    let signature = sign(&msg, private_key)?;
    Ok(SignedMessage {
        r#type: Some(MessageType::LicenseRequest as i32),
        msg: Some(msg),
        signature: Some(signature),
        session_key: None,
    })
}

/// Key derivation context for the content-key encryption key:
/// `0x01 || "ENCRYPTION" || 0x00 || request || be32(128)`.
pub fn derive_context(request_msg: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + ENCRYPTION_LABEL.len() + 1 + request_msg.len() + 4);
    out.push(1);
    out.extend_from_slice(ENCRYPTION_LABEL);
    out.push(0);
    out.extend_from_slice(request_msg);
    out.extend_from_slice(&DERIVED_KEY_BITS.to_be_bytes());
    out
}

/// AES-CMAC of `context` keyed with the session key.
///
/// A session key that is not 16 bytes is reported as
/// [`Error::KeyUnwrapFailed`].
pub fn derive_encryption_key(session_key: &[u8], context: &[u8]) -> Result<Zeroizing<[u8; 16]>> {
    let mut mac = CmacAes128::new_from_slice(session_key).map_err(|_| Error::KeyUnwrapFailed)?;
    mac.update(context);
    let mut key = Zeroizing::new([0u8; 16]);
    key.copy_from_slice(&mac.finalize().into_bytes());
    Ok(key)
}

/// Recover the content keys from a license response.
///
/// `signed_request` must be the exact envelope that was sent: its signed
/// message bytes feed the key derivation. Containers are decrypted
/// independently and in order; one that fails lands in
/// [`KeyBatch::rejected`] without affecting the others. The response signature
/// is not verified.
pub fn process_response(
    signed_request: &[u8],
    signed_response: &[u8],
    private_key: &RsaPrivateKey,
    unpad: UnpadPolicy,
) -> Result<KeyBatch> {
    let request = SignedMessage::decode(signed_request)?;
    let request_msg = request
        .msg
        .ok_or_else(|| Error::MalformedMessage("License request has no message".to_string()))?;
    LicenseRequest::decode(request_msg.as_slice())?;

    let response = SignedMessage::decode(signed_response)?;
    if response.r#type.is_some_and(|t| t != MessageType::License as i32) {
        warn!("License response has message type {:?}", response.r#type);
    }
    // Error responses carry no session key; check it before touching `msg`.
    let wrapped_session_key = response
        .session_key
        .filter(|k| !k.is_empty())
        .ok_or(Error::MissingSessionKey)?;
    let session_key = private_key
        .decrypt(Oaep::new::<Sha1>(), &wrapped_session_key)
        .map(Zeroizing::new)
        .map_err(|_| Error::KeyUnwrapFailed)?;

    let license = match response.msg.as_deref() {
        Some(msg) => License::decode(msg)?,
        None => {
            return Err(Error::MalformedMessage(
                "License response has no message".to_string(),
            ))
        }
    };

    let enc_key = derive_encryption_key(&session_key, &derive_context(&request_msg))?;

    let mut batch = KeyBatch::default();
    for (index, container) in license.key.iter().enumerate() {
        match ContentKey::from_key_container(index, container, &enc_key, unpad) {
            Ok(key) => batch.keys.push(key),
            Err(err) => {
                warn!("Skipping key container: {}", err.to_string());
                batch.rejected.push(err);
            }
        }
    }

    debug!(
        "Decrypted {} of {} key containers",
        batch.keys.len(),
        license.key.len()
    );
    Ok(batch)
}

/// A signed license request together with the session id it was built with.
#[derive(Debug, Clone)]
pub struct Challenge {
    pub session_id: SessionId,
    /// Serialized `SignedMessage`, the HTTP body.
    pub body: Vec<u8>,
}

/// Runs license transactions for one borrowed device identity.
#[derive(Debug)]
pub struct Cdm<'a, R = NullRecorder> {
    identity: &'a DeviceIdentity,
    options: CdmOptions,
    recorder: R,
}

impl<'a> Cdm<'a, NullRecorder> {
    pub fn new(identity: &'a DeviceIdentity) -> Self {
        Self {
            identity,
            options: CdmOptions::default(),
            recorder: NullRecorder,
        }
    }
}

impl<'a, R: ExchangeRecorder> Cdm<'a, R> {
    pub fn with_options(mut self, options: CdmOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the exchange recorder.
    pub fn with_recorder<R2: ExchangeRecorder>(self, recorder: R2) -> Cdm<'a, R2> {
        Cdm {
            identity: self.identity,
            options: self.options,
            recorder,
        }
    }

    pub fn options(&self) -> CdmOptions {
        self.options
    }

    /// Build and sign a license request.
    pub fn challenge(&self, init_data: &[u8]) -> Result<Challenge> {
        let (request, session_id) =
            build_request(init_data, self.identity, self.options.privacy_mode)?;
        let signed = sign_request(&request, self.identity.private_key())?;
        Ok(Challenge {
            session_id,
            body: signed.encode_to_vec(),
        })
    }

    /// Decrypt the keys of a license response to `challenge`.
    pub fn parse_license(&self, challenge: &Challenge, license: &[u8]) -> Result<KeyBatch> {
        process_response(
            &challenge.body,
            license,
            self.identity.private_key(),
            self.options.unpad,
        )
    }

    /// Run a complete transaction against a license server.
    pub fn acquire_keys<T: Transport>(
        &self,
        transport: &T,
        endpoint: &LicenseEndpoint,
        init_data: &[u8],
    ) -> Result<KeyBatch> {
        let challenge = self.challenge(init_data)?;
        info!("Created license request ({} bytes)", challenge.body.len());

        let response = self.exchange(transport, endpoint, &challenge.body)?;
        info!("Got license response ({} bytes)", response.len());

        let batch = self.parse_license(&challenge, &response)?;
        if !batch.is_complete() {
            warn!("{} key container(s) could not be decrypted", batch.rejected.len());
        }
        Ok(batch)
    }

    /// Ask the license server for its service certificate.
    ///
    /// The returned bytes are accepted by [`DeviceIdentity::with_certificate`].
    pub fn request_service_certificate<T: Transport>(
        &self,
        transport: &T,
        endpoint: &LicenseEndpoint,
    ) -> Result<Vec<u8>> {
        let response = self.exchange(transport, endpoint, SERVICE_CERTIFICATE_CHALLENGE)?;
        let certificate = DeviceCertificate::parse(&response)?;
        info!("Got service certificate for '{}'", certificate.service_id.as_str());
        Ok(response)
    }

    fn exchange<T: Transport>(
        &self,
        transport: &T,
        endpoint: &LicenseEndpoint,
        body: &[u8],
    ) -> Result<Vec<u8>> {
        self.recorder.record(&Exchange {
            direction: Direction::Request,
            url: &endpoint.url,
            body,
        });
        let response = transport.post(endpoint, body)?;
        self.recorder.record(&Exchange {
            direction: Direction::Response,
            url: &endpoint.url,
            body: &response,
        });
        Ok(response)
    }
}
