//! Decrypted content keys.
//!
//! Keys are recovered from the key containers of a license response using
//! AES-128-CBC under the derived content-key encryption key.

use std::fmt;

use aes::cipher::{block_padding::NoPadding, BlockDecryptMut, KeyIvInit};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::license_protocol::license::key_container::KeyType;
use crate::license_protocol::license::KeyContainer;
use crate::padding::{self, UnpadPolicy, BLOCK_SIZE};

type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

/// A decrypted key from a license response.
#[derive(Clone, PartialEq, Eq)]
pub struct ContentKey {
    /// Key id as sent by the server.
    pub id: Vec<u8>,
    /// Raw key type value; see [`KeyType`].
    pub key_type: i32,
    /// Decrypted, unpadded key bytes.
    pub key: Vec<u8>,
}

impl ContentKey {
    /// Decrypt a single key container.
    ///
    /// The encrypted key must be a whole number of AES blocks and the IV one
    /// block long; anything else is a [`Error::MalformedKeyContainer`].
    pub fn from_key_container(
        index: usize,
        container: &KeyContainer,
        enc_key: &[u8; 16],
        unpad: UnpadPolicy,
    ) -> Result<Self> {
        let malformed = |reason: String| Error::MalformedKeyContainer { index, reason };

        let encrypted = container.key.as_deref().unwrap_or_default();
        if encrypted.len() % BLOCK_SIZE != 0 {
            return Err(malformed(format!(
                "encrypted key length {} is not a multiple of {}",
                encrypted.len(),
                BLOCK_SIZE
            )));
        }

        let iv: [u8; 16] = container
            .iv
            .as_deref()
            .unwrap_or_default()
            .try_into()
            .map_err(|_| malformed("IV must be 16 bytes".to_string()))?;

        let mut buffer = encrypted.to_vec();
        let decrypted = Aes128CbcDec::new_from_slices(enc_key, &iv)
            .map_err(|_| malformed("invalid key or IV length".to_string()))?
            .decrypt_padded_mut::<NoPadding>(&mut buffer)
            .map_err(|_| malformed("block decryption failed".to_string()))?;

        let key = padding::unpad(decrypted, unpad)
            .map_err(|p| {
                malformed(format!(
                    "padding count {} exceeds key length {}",
                    p.count, p.len
                ))
            })?
            .to_vec();

        Ok(Self {
            id: container.id.clone().unwrap_or_default(),
            key_type: container.r#type.unwrap_or_default(),
            key,
        })
    }

    /// The key type, if it is one this crate knows about.
    pub fn kind(&self) -> Option<KeyType> {
        KeyType::try_from(self.key_type).ok()
    }

    /// Key id viewed as a UUID.
    ///
    /// 16-byte ids map directly, 32-byte ASCII hex ids are parsed, shorter ids
    /// are zero padded on the right and longer ids truncated.
    pub fn kid(&self) -> Uuid {
        let id = self.id.as_slice();
        if id.len() == 32 {
            if let Some(uuid) = std::str::from_utf8(id)
                .ok()
                .and_then(|s| Uuid::parse_str(s).ok())
            {
                return uuid;
            }
        }
        let mut buf = [0u8; 16];
        let len = id.len().min(16);
        buf[..len].copy_from_slice(&id[..len]);
        Uuid::from_bytes(buf)
    }
}

impl fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentKey")
            .field("id", &hex::encode(&self.id))
            .field("key_type", &self.key_type)
            .field("key_len", &self.key.len())
            .finish()
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind().map_or("UNKNOWN", |k| k.as_str_name());
        write!(
            f,
            "[{}] {}:{}",
            kind,
            self.kid().as_simple(),
            hex::encode(&self.key)
        )
    }
}

/// Keys recovered from one license response.
///
/// Containers that fail to decrypt are reported in `rejected` (each an
/// [`Error::MalformedKeyContainer`]) instead of failing the whole response.
#[derive(Debug, Default)]
pub struct KeyBatch {
    pub keys: Vec<ContentKey>,
    pub rejected: Vec<Error>,
}

impl KeyBatch {
    /// Keys of the given type, in response order.
    pub fn of_type(&self, key_type: KeyType) -> impl Iterator<Item = &ContentKey> {
        self.keys
            .iter()
            .filter(move |k| k.key_type == key_type as i32)
    }

    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }
}
