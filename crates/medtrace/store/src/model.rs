use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Transaction identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxId(pub String);

impl TxId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position of a commit in the store's total commit order.
///
/// Every committed write set gets the next sequence number; a key's version is
/// the sequence of the commit that last wrote it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version(pub u64);

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Live value together with the version that wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedValue {
    pub value: Vec<u8>,
    pub version: Version,
}

/// One entry of a range scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

/// One committed change to a key. `value` is `None` for a delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyModification {
    pub tx_id: TxId,
    pub timestamp: DateTime<Utc>,
    pub value: Option<Vec<u8>>,
}

impl KeyModification {
    pub fn is_delete(&self) -> bool {
        self.value.is_none()
    }
}

/// Reads and buffered writes of one simulated transaction.
#[derive(Debug, Clone)]
pub struct ReadWriteSet {
    pub tx_id: TxId,
    pub timestamp: DateTime<Utc>,
    /// Version observed for each key read; `None` when the key was absent.
    pub reads: BTreeMap<String, Option<Version>>,
    /// Final write per key; `None` deletes the key.
    pub writes: BTreeMap<String, Option<Vec<u8>>>,
}

impl ReadWriteSet {
    pub fn new(tx_id: TxId, timestamp: DateTime<Utc>) -> Self {
        Self {
            tx_id,
            timestamp,
            reads: BTreeMap::new(),
            writes: BTreeMap::new(),
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.writes.is_empty()
    }
}

/// Result of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub tx_id: TxId,
    pub version: Version,
    pub keys_written: usize,
}
