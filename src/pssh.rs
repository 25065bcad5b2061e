//! Protected-content initialization data.
//!
//! Init data is a PSSH box as found in manifests: a fixed 32-byte header
//! (size, `pssh` tag, version/flags, system id, payload length) followed by a
//! Widevine CENC header message. Only the payload is interpreted; the header is
//! skipped without validation.
use std::str::FromStr;

use base64::Engine;
use byteorder::{BigEndian, ByteOrder};
use prost::Message;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::license_protocol::WidevineCencHeader;

/// Length of the fixed header preceding the CENC header message.
pub const INIT_DATA_HEADER_LEN: usize = 32;

/// Widevine DRM system id.
pub const WIDEVINE_SYSTEM_ID: Uuid = Uuid::from_u128(0xedef8ba979d64acea3c827dcd51d21ed);

/// Initialization data accompanying protected content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitData {
    raw: Vec<u8>,
}

impl InitData {
    /// Wrap raw init data, checking only the minimum length.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < INIT_DATA_HEADER_LEN {
            return Err(Error::InitDataTooShort { len: data.len() });
        }
        Ok(Self { raw: data.to_vec() })
    }

    /// Parse init data from standard base64, as embedded in DASH manifests.
    pub fn from_base64(data_b64: &str) -> Result<Self> {
        let data = base64::engine::general_purpose::STANDARD.decode(data_b64.trim())?;
        Self::from_bytes(&data)
    }

    /// The fixed-size header that precedes the payload.
    pub fn header(&self) -> &[u8] {
        &self.raw[..INIT_DATA_HEADER_LEN]
    }

    /// The CENC header message bytes.
    pub fn payload(&self) -> &[u8] {
        &self.raw[INIT_DATA_HEADER_LEN..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// System id read from the header of a version 0 PSSH box.
    pub fn system_id(&self) -> Uuid {
        Uuid::from_slice(&self.raw[12..28]).unwrap_or_else(|_| Uuid::nil())
    }

    /// Payload length as declared by the header. Informational only.
    pub fn declared_payload_len(&self) -> u32 {
        BigEndian::read_u32(&self.raw[28..32])
    }

    /// Decode the payload into its content id and key ids.
    pub fn cenc_header(&self) -> Result<WidevineCencHeader> {
        Ok(WidevineCencHeader::decode(self.payload())?)
    }
}

impl FromStr for InitData {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        InitData::from_base64(s)
    }
}

/// Build a version 0 PSSH box around a CENC header payload.
///
/// Mainly useful to produce test vectors and for tooling that only has the
/// payload at hand.
pub fn build_pssh_box(system_id: Uuid, payload: &[u8]) -> Vec<u8> {
    let size = (INIT_DATA_HEADER_LEN + payload.len()) as u32;
    let mut out = Vec::with_capacity(size as usize);
    out.extend_from_slice(&size.to_be_bytes());
    out.extend_from_slice(b"pssh");
    out.extend_from_slice(&[0, 0, 0, 0]);
    out.extend_from_slice(system_id.as_bytes());
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(payload);
    out
}
