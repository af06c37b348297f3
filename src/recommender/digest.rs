use std::fmt::{self, Write};

use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::canonical::CanonicalEncoder;

/// Failure to turn a descriptor into a [`WorkloadDigest`].
///
/// Never reaches callers of the recommender; a lookup whose key cannot be
/// derived simply bypasses the cache.
#[derive(Debug, Error)]
#[error("failed to derive workload digest: {0}")]
pub struct DigestError(String);

impl serde::ser::Error for DigestError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self(msg.to_string())
    }
}

/// Content fingerprint of a workload descriptor, used as the cache key.
///
/// Two descriptors with the same structure and values always produce the same
/// digest, regardless of where they live in memory or the iteration order of
/// any maps inside them. Values that differ, including `None` vs `Some(())`
/// or NaN vs infinity, produce different digests.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkloadDigest([u8; 32]);

impl WorkloadDigest {
    /// Derives the digest of `descriptor`.
    ///
    /// The descriptor is lowered to a tagged byte encoding with map and
    /// struct entries sorted, then hashed with SHA-256.
    pub fn of<D>(descriptor: &D) -> Result<Self, DigestError>
    where
        D: Serialize + ?Sized,
    {
        let bytes = CanonicalEncoder::encode(descriptor)?;
        Ok(Self::from_bytes(&bytes))
    }

    fn from_bytes(bytes: &[u8]) -> Self {
        let hash = Sha256::digest(bytes);
        let mut out = [0u8; 32];
        out.copy_from_slice(&hash);
        Self(out)
    }

    /// The raw 32 digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for WorkloadDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            f.write_fmt(format_args!("{b:02x}"))?;
        }
        Ok(())
    }
}

impl fmt::Debug for WorkloadDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is enough to tell keys apart in logs
        let mut short = String::with_capacity(12);
        for b in &self.0[..6] {
            short.write_fmt(format_args!("{b:02x}"))?;
        }
        f.debug_tuple("WorkloadDigest").field(&short).finish()
    }
}
