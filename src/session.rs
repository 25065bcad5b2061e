//! License request session identifier.

use std::fmt;

/// Length of a session id in bytes.
pub const SESSION_ID_LEN: usize = 32;

/// Request id sent in the content identification of a license request.
///
/// The observed license servers accept a fixed pattern: ASCII `'0'` in every
/// position except index 17, which is ASCII `'1'`. Servers may check the exact
/// bytes, so the pattern is kept as-is rather than randomized. A new value is
/// built for every request and never stored across requests.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionId([u8; SESSION_ID_LEN]);

impl SessionId {
    /// Position of the single `'1'` byte.
    pub const MARKER_INDEX: usize = 17;

    pub fn new() -> Self {
        let mut id = [b'0'; SESSION_ID_LEN];
        id[Self::MARKER_INDEX] = b'1';
        Self(id)
    }

    pub fn as_bytes(&self) -> &[u8; SESSION_ID_LEN] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", String::from_utf8_lossy(&self.0))
    }
}
