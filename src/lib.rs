//! wvlicense - client side of the Widevine license exchange.
//!
//! This crate provides:
//! - Init data (PSSH) parsing and CENC header extraction.
//! - Device identity loading (RSA key, client id blob, WVD containers).
//! - Signed license request construction, with optional client id privacy.
//! - License response processing into decrypted content keys.
//! - A generic protobuf wire codec for inspecting opaque messages.
//!
//! Feature flags:
//! - `tracing`: emit log events through `tracing` (default).
//! - `http`: blocking HTTP transport built on reqwest.
//! - `cli`: the `wvlicense` binary.
#![allow(clippy::result_large_err)]

#[macro_use]
mod macros;

/// Request building, signing and response processing.
pub mod cdm;
/// Schema-less protobuf wire format codec.
pub mod codec;
/// Device identity and service certificates.
pub mod device;
/// Common error types and Result alias.
pub mod error;
/// Decrypted key representation.
pub mod key;
/// License protocol message definitions.
pub mod license_protocol;
/// Block padding used for keys and the encrypted client id.
pub mod padding;
/// Init data parsing.
pub mod pssh;
/// Request/response capture hooks.
pub mod recorder;
/// License request session id.
pub mod session;
/// License server transport.
pub mod transport;

// Protobuf-generated license protocol definitions (kept private).
mod wvlicense_license_protocol;

pub use cdm::{Cdm, CdmOptions, Challenge};
pub use device::DeviceIdentity;
pub use error::{Error, Result};
pub use key::{ContentKey, KeyBatch};
pub use pssh::InitData;
pub use transport::{LicenseEndpoint, Transport};
