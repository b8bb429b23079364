use crate::{ContractResult, Invocation, MedicineContract};
use medtrace_store::{TransactionContext, WorldState};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Runs contract invocations against a world state.
///
/// `submit` commits the invocation's writes after MVCC validation; a
/// conflicting commit is returned to the caller, never retried here.
/// `evaluate` runs the same simulation and throws the writes away.
#[derive(Clone)]
pub struct Gateway {
    state: Arc<dyn WorldState>,
    contract: MedicineContract,
}

impl Gateway {
    pub fn new(state: Arc<dyn WorldState>) -> Self {
        Self {
            state,
            contract: MedicineContract::new(),
        }
    }

    pub fn backend_label(&self) -> &'static str {
        self.state.backend_label()
    }

    pub async fn submit(&self, invocation: Invocation) -> ContractResult<Vec<u8>> {
        let function = invocation.function_name();
        let mut ctx = TransactionContext::new(self.state.clone());
        let tx_id = ctx.tx_id().clone();
        info!(function, tx_id = %tx_id, "--> Submit transaction");

        let payload = self.contract.invoke(&mut ctx, invocation).await?;
        let receipt = self.state.commit(ctx.into_read_write_set()).await?;

        info!(
            function,
            tx_id = %tx_id,
            version = %receipt.version,
            keys_written = receipt.keys_written,
            "*** Transaction committed"
        );
        Ok(payload)
    }

    pub async fn evaluate(&self, invocation: Invocation) -> ContractResult<Vec<u8>> {
        let function = invocation.function_name();
        if invocation.mutates_state() {
            warn!(function, "Evaluating a state-changing function; its writes are discarded");
        }

        let mut ctx = TransactionContext::new(self.state.clone());
        info!(function, tx_id = %ctx.tx_id(), "--> Evaluate transaction");

        let payload = self.contract.invoke(&mut ctx, invocation).await?;
        if ctx.has_writes() {
            debug!(function, "Discarding simulated writes");
        }
        Ok(payload)
    }

    /// Release the world state. Called once on shutdown.
    pub async fn close(&self) {
        self.state.close().await;
    }
}
