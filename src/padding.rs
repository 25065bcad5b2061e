//! Trailing-byte block padding.
//!
//! Every padding byte holds the number of padding bytes. Padding is never
//! empty: an input that is already block aligned gains a full block.

/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// How [`unpad`] treats a trailing count byte larger than the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnpadPolicy {
    /// Return the buffer unchanged. Matches what deployed clients do.
    #[default]
    Permissive,
    /// Reject the buffer.
    Strict,
}

/// Returned by [`unpad`] under [`UnpadPolicy::Strict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImplausiblePadding {
    pub count: usize,
    pub len: usize,
}

/// Append padding so the result is a non-zero multiple of `BLOCK_SIZE` longer
/// than the input.
pub fn pad(data: &[u8]) -> Vec<u8> {
    let count = BLOCK_SIZE - data.len() % BLOCK_SIZE;
    let mut out = Vec::with_capacity(data.len() + count);
    out.extend_from_slice(data);
    out.resize(data.len() + count, count as u8);
    out
}

/// Strip padding by reading the last byte as a count and truncating that many
/// bytes. Only the count byte is consulted; the other padding bytes are not
/// checked.
pub fn unpad(data: &[u8], policy: UnpadPolicy) -> Result<&[u8], ImplausiblePadding> {
    let Some(&last) = data.last() else {
        return Ok(data);
    };
    let count = usize::from(last);
    if count > data.len() {
        return match policy {
            UnpadPolicy::Permissive => Ok(data),
            UnpadPolicy::Strict => Err(ImplausiblePadding {
                count,
                len: data.len(),
            }),
        };
    }
    Ok(&data[..data.len() - count])
}
