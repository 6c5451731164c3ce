use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Fixed protocol epoch, in Unix seconds.
pub const PROTOCOL_EPOCH: u64 = 1_549_458_383;

/// Anti-replay timestamp carried by index inserts.
///
/// Whole seconds elapsed since [`PROTOCOL_EPOCH`]. Signed into insert
/// buffers as 4 little-endian bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProtocolTimestamp(u32);

impl ProtocolTimestamp {
    /// Wrap a raw offset from the protocol epoch.
    pub const fn new(offset: u32) -> Self {
        Self(offset)
    }

    /// The timestamp for the current wall-clock time.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self::from_unix(secs).unwrap_or(Self(0))
    }

    /// Convert from Unix seconds.
    pub fn from_unix(secs: u64) -> Result<Self, TypeError> {
        let offset = secs
            .checked_sub(PROTOCOL_EPOCH)
            .ok_or(TypeError::BeforeEpoch(secs))?;
        Ok(Self(u32::try_from(offset).unwrap_or(u32::MAX)))
    }

    /// Offset in seconds from the protocol epoch.
    pub fn offset(&self) -> u32 {
        self.0
    }

    /// Unix seconds.
    pub fn to_unix(&self) -> u64 {
        PROTOCOL_EPOCH + u64::from(self.0)
    }

    /// Little-endian encoding used in signing buffers.
    pub fn to_le_bytes(&self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}

impl fmt::Debug for ProtocolTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProtocolTimestamp(+{}s)", self.0)
    }
}

impl fmt::Display for ProtocolTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
