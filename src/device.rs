//! Device identity: the RSA private key and client identification blob that
//! authenticate license requests, plus an optional service certificate used
//! for privacy mode.
//!
//! The identity is long-lived and owned by the caller. License operations only
//! borrow it. `RsaPrivateKey` zeroizes its limbs when dropped, so dropping the
//! identity is how key material is disposed of; keep it alive (and unmodified)
//! for as long as any transaction using it is in flight.

use std::fmt;
use std::path::Path;

use prost::Message;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::DecodePrivateKey;
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::error::{Error, Result};
use crate::license_protocol::signed_message::MessageType;
use crate::license_protocol::{DrmCertificate, SignedDrmCertificate, SignedMessage};

/// Magic bytes for WVD containers.
const WVD_MAGIC: &[u8; 3] = b"WVD";

/// A device's cryptographic identity.
pub struct DeviceIdentity {
    private_key: RsaPrivateKey,
    client_id: Vec<u8>,
    certificate: Option<Vec<u8>>,
}

impl DeviceIdentity {
    /// Build an identity from raw inputs.
    ///
    /// The private key may be PEM or DER, in PKCS#1 or PKCS#8 form; PKCS#1 is
    /// tried first. The client id blob and certificate are kept opaque and
    /// only interpreted when a request needs them.
    pub fn parse(
        private_key: &[u8],
        client_id: &[u8],
        certificate: Option<&[u8]>,
    ) -> Result<Self> {
        let private_key = parse_private_key(private_key)?;
        debug!(
            "Loaded device key ({} bit), client id {} bytes",
            private_key.n().bits(),
            client_id.len()
        );
        Ok(Self {
            private_key,
            client_id: client_id.to_vec(),
            certificate: certificate.map(<[u8]>::to_vec),
        })
    }

    /// Build an identity from an already parsed key.
    pub fn from_key(private_key: RsaPrivateKey, client_id: Vec<u8>) -> Self {
        Self {
            private_key,
            client_id,
            certificate: None,
        }
    }

    /// Load the private key, client id blob and optional certificate from files.
    pub fn from_files<P: AsRef<Path>>(
        private_key_path: P,
        client_id_path: P,
        certificate_path: Option<P>,
    ) -> Result<Self> {
        let private_key = std::fs::read(private_key_path)?;
        let client_id = std::fs::read(client_id_path)?;
        let certificate = certificate_path.map(std::fs::read).transpose()?;
        Self::parse(&private_key, &client_id, certificate.as_deref())
    }

    /// Load an identity from a WVD (v1 or v2) device container.
    ///
    /// Layout: `WVD`, version, device type, security level, flags, then a
    /// big-endian u16 length-prefixed private key (DER) and client id. The VMP
    /// blob trailing v1 containers is ignored.
    pub fn from_wvd(data: &[u8]) -> Result<Self> {
        let mut reader = WvdReader { data, offset: 0 };
        if reader.take(3)? != WVD_MAGIC {
            return Err(Error::InvalidKey("Invalid WVD magic bytes".to_string()));
        }
        let version = reader.byte()?;
        if version != 1 && version != 2 {
            return Err(Error::InvalidKey(format!(
                "Unsupported WVD version: {}",
                version
            )));
        }
        let device_type = reader.byte()?;
        let security_level = reader.byte()?;
        let _flags = reader.byte()?;
        let private_key = reader.prefixed()?;
        let client_id = reader.prefixed()?;
        debug!(
            "Parsed WVD v{} container (type {}, L{})",
            version, device_type, security_level
        );
        Self::parse(private_key, client_id, None)
    }

    /// Attach (or replace) the service certificate used for privacy mode.
    pub fn with_certificate(mut self, certificate: Vec<u8>) -> Self {
        self.certificate = Some(certificate);
        self
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> RsaPublicKey {
        self.private_key.to_public_key()
    }

    /// The opaque, pre-signed client identification blob.
    pub fn client_id(&self) -> &[u8] {
        &self.client_id
    }

    /// Raw certificate bytes, if one was supplied.
    pub fn certificate(&self) -> Option<&[u8]> {
        self.certificate.as_deref()
    }
}

impl fmt::Debug for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceIdentity")
            .field("private_key", &"[REDACTED]")
            .field("key_bits", &self.private_key.n().bits())
            .field("client_id_len", &self.client_id.len())
            .field("has_certificate", &self.certificate.is_some())
            .finish()
    }
}

/// The parts of a service certificate needed to encrypt the client identity.
#[derive(Debug, Clone)]
pub struct DeviceCertificate {
    pub service_id: String,
    pub serial_number: Vec<u8>,
    pub public_key: RsaPublicKey,
    pub system_id: Option<u32>,
}

impl DeviceCertificate {
    /// Parse a service certificate.
    ///
    /// Accepts either a bare `SignedDrmCertificate` or the `SignedMessage`
    /// (type `SERVICE_CERTIFICATE`) a license server returns for a service
    /// certificate challenge. The issuer signature is not verified.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let signed = match SignedMessage::decode(data) {
            Ok(message) if message.r#type == Some(MessageType::ServiceCertificate as i32) => {
                let msg = message.msg.ok_or_else(|| {
                    Error::MalformedMessage("Service certificate message is empty".to_string())
                })?;
                SignedDrmCertificate::decode(msg.as_slice())?
            }
            _ => SignedDrmCertificate::decode(data)?,
        };

        let cert_bytes = signed
            .drm_certificate
            .ok_or_else(|| Error::MalformedMessage("Missing DRM certificate".to_string()))?;
        let cert = DrmCertificate::decode(cert_bytes.as_slice())?;

        let public_key_der = cert
            .public_key
            .ok_or_else(|| Error::MalformedMessage("Certificate has no public key".to_string()))?;
        let public_key = RsaPublicKey::from_pkcs1_der(&public_key_der).map_err(|_| {
            Error::InvalidKey("Certificate public key is not PKCS#1 RSA".to_string())
        })?;

        Ok(Self {
            service_id: cert.service_id.unwrap_or_default(),
            serial_number: cert.serial_number.unwrap_or_default(),
            public_key,
            system_id: cert.system_id,
        })
    }
}

fn parse_private_key(data: &[u8]) -> Result<RsaPrivateKey> {
    if let Ok(text) = std::str::from_utf8(data) {
        if text.contains("-----BEGIN") {
            return RsaPrivateKey::from_pkcs1_pem(text)
                .or_else(|_| RsaPrivateKey::from_pkcs8_pem(text))
                .map_err(|_| {
                    Error::InvalidKey("PEM key is neither PKCS#1 nor PKCS#8 RSA".to_string())
                });
        }
    }

    RsaPrivateKey::from_pkcs1_der(data)
        .or_else(|_| RsaPrivateKey::from_pkcs8_der(data))
        .map_err(|_| Error::InvalidKey("DER key is neither PKCS#1 nor PKCS#8 RSA".to_string()))
}

struct WvdReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> WvdReader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| Error::InvalidKey("WVD container is truncated".to_string()))?;
        let out = &self.data[self.offset..end];
        self.offset = end;
        Ok(out)
    }

    fn byte(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn prefixed(&mut self) -> Result<&'a [u8]> {
        let len = self.take(2)?;
        let len = u16::from_be_bytes([len[0], len[1]]) as usize;
        self.take(len)
    }
}
