use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Identifier of a commit in the loaded history.
///
/// A `CommitId` is the 20-byte object name reported by the repository
/// backend. Ids are parsed from hex output, never computed locally. The
/// all-zero id is reserved as the sentinel for the synthetic working-copy
/// record.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommitId([u8; 20]);

impl CommitId {
    /// The synthetic working-copy sentinel (all zeros).
    pub const WIP: Self = Self([0u8; 20]);

    /// Create a `CommitId` from a raw 20-byte object name.
    pub const fn from_raw(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Returns `true` if this is the working-copy sentinel.
    pub fn is_wip(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// The raw 20-byte object name.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Hex-encoded string representation (40 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a 40-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        if s.len() != 40 {
            return Err(TypeError::InvalidLength {
                expected: 40,
                actual: s.len(),
            });
        }
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommitId({})", self.short_hex())
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 20]> for CommitId {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl From<CommitId> for [u8; 20] {
    fn from(id: CommitId) -> Self {
        id.0
    }
}
