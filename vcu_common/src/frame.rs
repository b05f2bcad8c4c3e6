//! Fixed-size frames exchanged with the external controller.
//!
//! The payload is opaque to the link core: a request is whatever
//! `REQ_SIZE` bytes the controller sent, a response whatever `REP_SIZE`
//! bytes the application produced. Frames are `Copy` so queues move them
//! by value without allocation.

use crate::consts::{REP_SIZE, REQ_SIZE};
use static_assertions::const_assert_eq;

/// A fixed-width byte record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Frame<const N: usize> {
    bytes: [u8; N],
}

/// Command/query frame from the external controller.
pub type RequestFrame = Frame<REQ_SIZE>;

/// Reply/telemetry frame towards the external controller.
pub type ResponseFrame = Frame<REP_SIZE>;

const_assert_eq!(core::mem::size_of::<RequestFrame>(), REQ_SIZE);
const_assert_eq!(core::mem::size_of::<ResponseFrame>(), REP_SIZE);

impl<const N: usize> Frame<N> {
    /// Frame width in bytes.
    pub const SIZE: usize = N;

    /// Wrap raw bytes.
    #[inline]
    pub const fn new(bytes: [u8; N]) -> Self {
        Self { bytes }
    }

    /// All-zero frame.
    #[inline]
    pub const fn zeroed() -> Self {
        Self { bytes: [0u8; N] }
    }

    /// Build a frame from a slice. Returns `None` unless `slice.len() == N`.
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let bytes: [u8; N] = slice.try_into().ok()?;
        Some(Self { bytes })
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; N] {
        &self.bytes
    }

    #[inline]
    pub fn as_mut_bytes(&mut self) -> &mut [u8; N] {
        &mut self.bytes
    }

    #[inline]
    pub const fn into_bytes(self) -> [u8; N] {
        self.bytes
    }
}

impl<const N: usize> Default for Frame<N> {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl<const N: usize> From<[u8; N]> for Frame<N> {
    fn from(bytes: [u8; N]) -> Self {
        Self::new(bytes)
    }
}

impl<const N: usize> AsRef<[u8]> for Frame<N> {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_sizes_match_protocol() {
        assert_eq!(RequestFrame::SIZE, REQ_SIZE);
        assert_eq!(ResponseFrame::SIZE, REP_SIZE);
    }

    #[test]
    fn from_slice_rejects_wrong_width() {
        assert!(RequestFrame::from_slice(&[1, 2]).is_none());
        assert!(RequestFrame::from_slice(&[1, 2, 3, 4]).is_none());
        let frame = RequestFrame::from_slice(&[1, 2, 3]).unwrap();
        assert_eq!(frame.as_bytes(), &[1, 2, 3]);
    }

    #[test]
    fn default_is_zeroed() {
        assert_eq!(ResponseFrame::default().into_bytes(), [0u8; REP_SIZE]);
    }
}
