//! Validated MTU and alignment settings for the segmenter.

use static_assertions::const_assert;

use super::ChunkConfigError;

/// Default maximum chunk size: 1500 - 20 - 8 - 12 (Ethernet, IP, UDP, RTP).
pub const DEFAULT_MTU: u32 = 1460;
/// Default chunk alignment: two-channel packed s16 audio frames.
pub const DEFAULT_ALIGN: u32 = 4;

const_assert!(DEFAULT_ALIGN > 0 && DEFAULT_ALIGN < DEFAULT_MTU);

/// MTU and alignment pair with its derived chunk size.
///
/// Construction guarantees `mtu > 0`, `align > 0` and `align < mtu`, so the
/// chunk size is always a non-zero multiple of `align`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkConfig {
    mtu: u32,
    align: u32,
}

impl ChunkConfig {
    /// Validate `mtu` and `align`.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkConfigError::Invalid`] when either value is zero or
    /// `align >= mtu`.
    pub const fn new(mtu: u32, align: u32) -> Result<Self, ChunkConfigError> {
        if mtu == 0 || align == 0 || align >= mtu {
            return Err(ChunkConfigError::Invalid { mtu, align });
        }
        Ok(Self { mtu, align })
    }

    /// Maximum chunk size in bytes.
    #[must_use]
    pub const fn mtu(&self) -> u32 { self.mtu }

    /// Chunk alignment in bytes.
    #[must_use]
    pub const fn align(&self) -> u32 { self.align }

    /// Largest multiple of `align` not exceeding `mtu`.
    #[must_use]
    pub const fn chunk_size(&self) -> u32 { (self.mtu / self.align) * self.align }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            mtu: DEFAULT_MTU,
            align: DEFAULT_ALIGN,
        }
    }
}
