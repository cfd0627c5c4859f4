//! Fixed-capacity byte sequences
//!
//! Frame data and diagnostic payloads live inline in the message, so a
//! decoded message never owns a heap buffer sized by its input.

use std::fmt;

/// Inline byte sequence holding at most `N` bytes
#[derive(Clone, Copy)]
pub struct Payload<const N: usize> {
    bytes: [u8; N],
    len: usize,
}

impl<const N: usize> Payload<N> {
    /// Maximum number of bytes this payload can hold
    pub const CAPACITY: usize = N;

    /// Create an empty payload
    pub const fn new() -> Self {
        Self {
            bytes: [0; N],
            len: 0,
        }
    }

    /// Copy `data` into a new payload
    ///
    /// Returns `None` if `data` is longer than `N`.
    pub fn from_slice(data: &[u8]) -> Option<Self> {
        if data.len() > N {
            return None;
        }
        let mut payload = Self::new();
        payload.bytes[..data.len()].copy_from_slice(data);
        payload.len = data.len();
        Some(payload)
    }

    /// Fill the first `len` bytes through `fill`, keeping the rest zeroed
    ///
    /// Used by the hex decoder to write straight into the inline storage.
    pub(crate) fn fill_with<E>(
        len: usize,
        fill: impl FnOnce(&mut [u8]) -> Result<(), E>,
    ) -> Option<Result<Self, E>> {
        if len > N {
            return None;
        }
        let mut payload = Self::new();
        Some(fill(&mut payload.bytes[..len]).map(|()| {
            payload.len = len;
            payload
        }))
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<const N: usize> Default for Payload<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> AsRef<[u8]> for Payload<N> {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

// Bytes past `len` are not part of the value.
impl<const N: usize> PartialEq for Payload<N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<const N: usize> Eq for Payload<N> {}

impl<const N: usize> fmt::Debug for Payload<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}
