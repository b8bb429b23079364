use crate::{ContractError, ContractResult};
use chrono::{DateTime, Utc};
use futures::future;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use medtrace_store::{KeyModification, TransactionContext, TxId};
use medtrace_types::{seed_catalogue, CustodyPair, Medicine};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One committed modification of a medicine, as reported by the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(rename = "TxId")]
    pub tx_id: TxId,
    #[serde(rename = "Timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "IsDelete")]
    pub is_delete: bool,
    /// Record written by the transaction; `None` for deletes.
    #[serde(rename = "Value")]
    pub value: Option<Medicine>,
}

/// Provenance rules for medicine records.
///
/// Stateless: every call receives the transaction context it reads from and
/// writes to, so one value can serve any number of concurrent invocations.
#[derive(Debug, Clone, Copy, Default)]
pub struct MedicineContract;

impl MedicineContract {
    pub fn new() -> Self {
        Self
    }

    /// Seed the ledger with the built-in catalogue.
    ///
    /// Fails with [`ContractError::AlreadyExists`] on the first ID that is
    /// already live, so running it twice is an error.
    pub async fn init_ledger(&self, ctx: &mut TransactionContext) -> ContractResult<()> {
        let catalogue = seed_catalogue();
        let count = catalogue.len();
        for medicine in catalogue {
            self.create_medicine(ctx, medicine).await?;
        }
        info!(count, tx_id = %ctx.tx_id(), "Seeded medicine catalogue");
        Ok(())
    }

    pub async fn create_medicine(
        &self,
        ctx: &mut TransactionContext,
        medicine: Medicine,
    ) -> ContractResult<()> {
        require_id(&medicine.id)?;
        if self.medicine_exists(ctx, &medicine.id).await? {
            return Err(ContractError::AlreadyExists(medicine.id));
        }

        put(ctx, &medicine)?;
        info!(medicine_id = %medicine.id, tx_id = %ctx.tx_id(), "Created medicine");
        Ok(())
    }

    pub async fn read_medicine(
        &self,
        ctx: &mut TransactionContext,
        id: &str,
    ) -> ContractResult<Medicine> {
        require_id(id)?;
        let bytes = ctx
            .get_state(id)
            .await?
            .ok_or_else(|| ContractError::NotFound(id.to_string()))?;
        decode(id, &bytes)
    }

    /// Replace the stored record wholesale. No field is merged.
    pub async fn update_medicine(
        &self,
        ctx: &mut TransactionContext,
        medicine: Medicine,
    ) -> ContractResult<()> {
        require_id(&medicine.id)?;
        if !self.medicine_exists(ctx, &medicine.id).await? {
            return Err(ContractError::NotFound(medicine.id));
        }

        put(ctx, &medicine)?;
        info!(medicine_id = %medicine.id, tx_id = %ctx.tx_id(), "Updated medicine");
        Ok(())
    }

    /// Remove the live record. Its history stays queryable.
    pub async fn delete_medicine(
        &self,
        ctx: &mut TransactionContext,
        id: &str,
    ) -> ContractResult<()> {
        require_id(id)?;
        if !self.medicine_exists(ctx, id).await? {
            return Err(ContractError::NotFound(id.to_string()));
        }

        ctx.del_state(id)?;
        info!(medicine_id = %id, tx_id = %ctx.tx_id(), "Deleted medicine");
        Ok(())
    }

    /// Whether a live record exists under `id`. An empty ID never exists.
    pub async fn medicine_exists(
        &self,
        ctx: &mut TransactionContext,
        id: &str,
    ) -> ContractResult<bool> {
        if id.is_empty() {
            return Ok(false);
        }
        require_id(id)?;
        Ok(ctx.get_state(id).await?.is_some())
    }

    /// Move custody to a new sender/receiver pair, returning the pair it replaced.
    pub async fn transfer_medicine(
        &self,
        ctx: &mut TransactionContext,
        id: &str,
        new_sender: &str,
        new_receiver: &str,
    ) -> ContractResult<CustodyPair> {
        let mut medicine = self.read_medicine(ctx, id).await?;
        let previous = medicine.transfer_custody(new_sender, new_receiver);

        put(ctx, &medicine)?;
        info!(
            medicine_id = %id,
            from = %previous,
            to = %medicine.custody(),
            tx_id = %ctx.tx_id(),
            "Transferred medicine custody"
        );
        Ok(previous)
    }

    /// Mark the journey complete and return the updated record.
    pub async fn medicine_journey(
        &self,
        ctx: &mut TransactionContext,
        id: &str,
    ) -> ContractResult<Medicine> {
        let mut medicine = self.read_medicine(ctx, id).await?;
        medicine.complete_journey();

        put(ctx, &medicine)?;
        info!(medicine_id = %id, tx_id = %ctx.tx_id(), "Completed medicine journey");
        Ok(medicine)
    }

    /// Every live medicine in key order.
    ///
    /// The stream ends after the first error, so a corrupt record truncates
    /// the listing instead of being skipped.
    pub fn all_medicines<'a>(
        &self,
        ctx: &'a TransactionContext,
    ) -> BoxStream<'a, ContractResult<Medicine>> {
        let listing = ctx
            .get_state_by_range("", "")
            .map(|item| -> ContractResult<Medicine> {
                let kv = item?;
                decode(&kv.key, &kv.value)
            })
            .boxed();
        fail_fast(listing)
    }

    pub async fn get_all_medicines(
        &self,
        ctx: &TransactionContext,
    ) -> ContractResult<Vec<Medicine>> {
        let medicines: Vec<Medicine> = self.all_medicines(ctx).try_collect().await?;
        debug!(count = medicines.len(), "Listed medicines");
        Ok(medicines)
    }

    /// Every committed version of `id`, oldest first. Deletes are skipped.
    pub fn medicine_history<'a>(
        &self,
        ctx: &'a TransactionContext,
        id: &str,
    ) -> BoxStream<'a, ContractResult<Medicine>> {
        if let Err(err) = require_id(id) {
            return stream::iter([Err(err)]).boxed();
        }

        let key = id.to_string();
        let versions = ctx
            .get_history_for_key(id)
            .filter_map(move |item| {
                let decoded = match item {
                    Ok(modification) => modification.value.map(|bytes| decode(&key, &bytes)),
                    Err(err) => Some(Err(err.into())),
                };
                future::ready(decoded)
            })
            .boxed();
        fail_fast(versions)
    }

    pub async fn get_medicine_history(
        &self,
        ctx: &TransactionContext,
        id: &str,
    ) -> ContractResult<Vec<Medicine>> {
        self.medicine_history(ctx, id).try_collect().await
    }

    /// Full audit trail of `id`: transaction, commit time and delete marker
    /// for every modification, tombstones included.
    pub async fn history_records(
        &self,
        ctx: &TransactionContext,
        id: &str,
    ) -> ContractResult<Vec<HistoryRecord>> {
        require_id(id)?;

        let modifications: Vec<KeyModification> =
            ctx.get_history_for_key(id).try_collect().await?;
        modifications
            .into_iter()
            .map(|modification| -> ContractResult<HistoryRecord> {
                let value = modification
                    .value
                    .as_deref()
                    .map(|bytes| decode(id, bytes))
                    .transpose()?;
                Ok(HistoryRecord {
                    is_delete: value.is_none(),
                    tx_id: modification.tx_id,
                    timestamp: modification.timestamp,
                    value,
                })
            })
            .collect()
    }
}

fn require_id(id: &str) -> ContractResult<()> {
    if id.is_empty() {
        return Err(ContractError::InvalidArgument(
            "medicine ID must not be empty".to_string(),
        ));
    }
    if id.starts_with('\u{0}') {
        return Err(ContractError::InvalidArgument(
            "medicine ID must not start with a NUL character".to_string(),
        ));
    }
    Ok(())
}

fn decode(key: &str, bytes: &[u8]) -> ContractResult<Medicine> {
    Medicine::from_slice(bytes).map_err(|source| ContractError::CorruptRecord {
        key: key.to_string(),
        source,
    })
}

fn put(ctx: &mut TransactionContext, medicine: &Medicine) -> ContractResult<()> {
    let bytes = medicine
        .to_vec()
        .map_err(|e| ContractError::Encoding(e.to_string()))?;
    ctx.put_state(&medicine.id, bytes)?;
    Ok(())
}

/// Pass items through up to and including the first error.
fn fail_fast<'a, T: Send + 'a>(
    inner: BoxStream<'a, ContractResult<T>>,
) -> BoxStream<'a, ContractResult<T>> {
    inner
        .scan(false, |failed, item| {
            if *failed {
                return future::ready(None);
            }
            *failed = item.is_err();
            future::ready(Some(item))
        })
        .boxed()
}
