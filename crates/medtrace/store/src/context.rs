use crate::model::{KeyModification, KeyValue, ReadWriteSet, TxId};
use crate::traits::WorldState;
use crate::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use std::sync::Arc;

/// One invocation's view of the world state.
///
/// Point reads go to committed state, except that a key already written in
/// this transaction reads back the pending value. Every committed version
/// observed is recorded for validation at commit. Writes are buffered and only
/// reach the store through [`WorldState::commit`]; dropping the context
/// discards them.
///
/// Range and history scans read committed state only.
pub struct TransactionContext {
    state: Arc<dyn WorldState>,
    rwset: ReadWriteSet,
}

impl TransactionContext {
    /// Open a context with a fresh transaction ID stamped with the current time.
    pub fn new(state: Arc<dyn WorldState>) -> Self {
        Self::with_id(state, TxId::generate(), Utc::now())
    }

    pub fn with_id(state: Arc<dyn WorldState>, tx_id: TxId, timestamp: DateTime<Utc>) -> Self {
        Self {
            state,
            rwset: ReadWriteSet::new(tx_id, timestamp),
        }
    }

    pub fn tx_id(&self) -> &TxId {
        &self.rwset.tx_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.rwset.timestamp
    }

    pub async fn get_state(&mut self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        validate_key(key)?;

        if let Some(pending) = self.rwset.writes.get(key) {
            return Ok(pending.clone());
        }

        let current = self.state.get_state(key).await?;
        self.rwset
            .reads
            .entry(key.to_string())
            .or_insert_with(|| current.as_ref().map(|v| v.version));

        Ok(current.map(|v| v.value))
    }

    pub fn put_state(&mut self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        validate_key(key)?;
        self.rwset.writes.insert(key.to_string(), Some(value));
        Ok(())
    }

    pub fn del_state(&mut self, key: &str) -> StoreResult<()> {
        validate_key(key)?;
        self.rwset.writes.insert(key.to_string(), None);
        Ok(())
    }

    pub fn get_state_by_range(
        &self,
        start: &str,
        end: &str,
    ) -> BoxStream<'_, StoreResult<KeyValue>> {
        self.state.scan_range(start, end)
    }

    pub fn get_history_for_key(&self, key: &str) -> BoxStream<'_, StoreResult<KeyModification>> {
        self.state.history_of(key)
    }

    pub fn has_writes(&self) -> bool {
        !self.rwset.is_read_only()
    }

    pub fn into_read_write_set(self) -> ReadWriteSet {
        self.rwset
    }
}

fn validate_key(key: &str) -> StoreResult<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey("key must not be empty".to_string()));
    }
    if key.starts_with('\u{0}') {
        return Err(StoreError::InvalidKey(
            "keys starting with a NUL byte are reserved".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryWorldState;

    #[tokio::test]
    async fn test_reads_own_writes_without_recording_read() {
        let state: Arc<dyn WorldState> = Arc::new(InMemoryWorldState::new());
        let mut ctx = TransactionContext::new(state);

        ctx.put_state("a", b"1".to_vec()).unwrap();
        assert_eq!(ctx.get_state("a").await.unwrap(), Some(b"1".to_vec()));

        let rwset = ctx.into_read_write_set();
        assert!(rwset.reads.is_empty());
        assert_eq!(rwset.writes.len(), 1);
    }

    #[tokio::test]
    async fn test_records_absent_key_read() {
        let state: Arc<dyn WorldState> = Arc::new(InMemoryWorldState::new());
        let mut ctx = TransactionContext::new(state);

        assert_eq!(ctx.get_state("missing").await.unwrap(), None);
        assert!(!ctx.has_writes());

        let rwset = ctx.into_read_write_set();
        assert_eq!(rwset.reads.get("missing"), Some(&None));
    }

    #[tokio::test]
    async fn test_rejects_empty_key() {
        let state: Arc<dyn WorldState> = Arc::new(InMemoryWorldState::new());
        let mut ctx = TransactionContext::new(state);

        assert!(matches!(
            ctx.put_state("", vec![]),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(
            ctx.get_state("").await,
            Err(StoreError::InvalidKey(_))
        ));
    }
}
