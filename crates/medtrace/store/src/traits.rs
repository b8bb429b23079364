use crate::model::{CommitReceipt, KeyModification, KeyValue, ReadWriteSet, VersionedValue};
use crate::StoreResult;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Key-value substrate with versioned live values and per-key history.
#[async_trait]
pub trait WorldState: Send + Sync {
    /// Read the live value of a key.
    async fn get_state(&self, key: &str) -> StoreResult<Option<VersionedValue>>;

    /// Stream live values with `start <= key < end` in byte-lexicographic key
    /// order. An empty bound is unbounded on that side.
    fn scan_range<'a>(&'a self, start: &str, end: &str) -> BoxStream<'a, StoreResult<KeyValue>>;

    /// Stream every committed change to a key, oldest first. Deletes appear as
    /// tombstones.
    fn history_of<'a>(&'a self, key: &str) -> BoxStream<'a, StoreResult<KeyModification>>;

    /// Validate the read set against current versions and apply every write
    /// atomically, or apply nothing.
    async fn commit(&self, rwset: ReadWriteSet) -> StoreResult<CommitReceipt>;

    /// Short backend name for diagnostics.
    fn backend_label(&self) -> &'static str;

    /// Release backend resources. The store must not be used afterwards.
    async fn close(&self) {}
}
