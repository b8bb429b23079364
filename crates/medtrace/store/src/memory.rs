//! In-memory world state.
//!
//! Deterministic and test-friendly. Live values, per-key history and the
//! commit sequence sit behind one lock so that a commit is atomic with respect
//! to every reader.

use crate::model::{
    CommitReceipt, KeyModification, KeyValue, ReadWriteSet, Version, VersionedValue,
};
use crate::traits::WorldState;
use crate::{StoreError, StoreResult};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Ledger {
    live: BTreeMap<String, VersionedValue>,
    history: HashMap<String, Vec<KeyModification>>,
    last_commit: u64,
}

/// In-memory world state for development and testing.
#[derive(Debug, Default)]
pub struct InMemoryWorldState {
    ledger: RwLock<Ledger>,
}

impl InMemoryWorldState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys.
    pub async fn len(&self) -> usize {
        self.ledger.read().await.live.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Sequence number of the most recent commit, zero before the first.
    pub async fn last_commit(&self) -> u64 {
        self.ledger.read().await.last_commit
    }
}

#[async_trait]
impl WorldState for InMemoryWorldState {
    async fn get_state(&self, key: &str) -> StoreResult<Option<VersionedValue>> {
        let ledger = self.ledger.read().await;
        Ok(ledger.live.get(key).cloned())
    }

    fn scan_range<'a>(&'a self, start: &str, end: &str) -> BoxStream<'a, StoreResult<KeyValue>> {
        let start = start.to_string();
        let end = end.to_string();

        stream::once(async move {
            let ledger = self.ledger.read().await;
            let inverted = !start.is_empty() && !end.is_empty() && start >= end;
            let items: Vec<StoreResult<KeyValue>> = if inverted {
                Vec::new()
            } else {
                ledger
                    .live
                    .range::<str, _>((lower_bound(&start), upper_bound(&end)))
                    .map(|(key, versioned)| {
                        Ok(KeyValue {
                            key: key.clone(),
                            value: versioned.value.clone(),
                        })
                    })
                    .collect()
            };
            stream::iter(items)
        })
        .flatten()
        .boxed()
    }

    fn history_of<'a>(&'a self, key: &str) -> BoxStream<'a, StoreResult<KeyModification>> {
        let key = key.to_string();

        stream::once(async move {
            let ledger = self.ledger.read().await;
            let items: Vec<StoreResult<KeyModification>> = ledger
                .history
                .get(&key)
                .map(|entries| entries.iter().cloned().map(Ok).collect())
                .unwrap_or_default();
            stream::iter(items)
        })
        .flatten()
        .boxed()
    }

    async fn commit(&self, rwset: ReadWriteSet) -> StoreResult<CommitReceipt> {
        let mut guard = self.ledger.write().await;
        let Ledger {
            live,
            history,
            last_commit,
        } = &mut *guard;

        for (key, observed) in &rwset.reads {
            let current = live.get(key).map(|v| v.version);
            if current != *observed {
                tracing::debug!(
                    key = %key,
                    tx_id = %rwset.tx_id,
                    ?observed,
                    ?current,
                    "Rejecting commit on stale read"
                );
                return Err(StoreError::Conflict {
                    key: key.clone(),
                    tx_id: rwset.tx_id.to_string(),
                });
            }
        }

        *last_commit += 1;
        let version = Version(*last_commit);
        let keys_written = rwset.writes.len();

        for (key, write) in rwset.writes {
            match &write {
                Some(value) => {
                    live.insert(
                        key.clone(),
                        VersionedValue {
                            value: value.clone(),
                            version,
                        },
                    );
                }
                None => {
                    live.remove(&key);
                }
            }
            history.entry(key).or_default().push(KeyModification {
                tx_id: rwset.tx_id.clone(),
                timestamp: rwset.timestamp,
                value: write,
            });
        }

        Ok(CommitReceipt {
            tx_id: rwset.tx_id,
            version,
            keys_written,
        })
    }

    fn backend_label(&self) -> &'static str {
        "memory"
    }
}

fn lower_bound(start: &str) -> Bound<&str> {
    if start.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Included(start)
    }
}

fn upper_bound(end: &str) -> Bound<&str> {
    if end.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Excluded(end)
    }
}
