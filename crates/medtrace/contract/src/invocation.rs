use crate::{ContractError, ContractResult, MedicineContract};
use medtrace_store::TransactionContext;
use medtrace_types::Medicine;
use serde::Serialize;

/// A named contract function together with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    InitLedger,
    CreateMedicine(Medicine),
    ReadMedicine {
        id: String,
    },
    UpdateMedicine(Medicine),
    DeleteMedicine {
        id: String,
    },
    MedicineExists {
        id: String,
    },
    TransferMedicine {
        id: String,
        new_sender: String,
        new_receiver: String,
    },
    MedicineJourney {
        id: String,
    },
    GetAllMedicines,
    GetMedicineHistory {
        id: String,
    },
    GetMedicineAuditTrail {
        id: String,
    },
}

impl Invocation {
    /// Function name as it appears in logs.
    pub fn function_name(&self) -> &'static str {
        match self {
            Self::InitLedger => "InitLedger",
            Self::CreateMedicine(_) => "CreateMedicine",
            Self::ReadMedicine { .. } => "ReadMedicine",
            Self::UpdateMedicine(_) => "UpdateMedicine",
            Self::DeleteMedicine { .. } => "DeleteMedicine",
            Self::MedicineExists { .. } => "MedicineExists",
            Self::TransferMedicine { .. } => "TransferMedicine",
            Self::MedicineJourney { .. } => "MedicineJourney",
            Self::GetAllMedicines => "GetAllMedicines",
            Self::GetMedicineHistory { .. } => "GetMedicineHistory",
            Self::GetMedicineAuditTrail { .. } => "GetMedicineAuditTrail",
        }
    }

    /// Whether the function writes to the world state when it succeeds.
    pub fn mutates_state(&self) -> bool {
        matches!(
            self,
            Self::InitLedger
                | Self::CreateMedicine(_)
                | Self::UpdateMedicine(_)
                | Self::DeleteMedicine { .. }
                | Self::TransferMedicine { .. }
                | Self::MedicineJourney { .. }
        )
    }
}

impl MedicineContract {
    /// Dispatch an invocation and encode its result.
    ///
    /// Functions without a return value yield an empty payload; everything
    /// else is JSON.
    pub async fn invoke(
        &self,
        ctx: &mut TransactionContext,
        invocation: Invocation,
    ) -> ContractResult<Vec<u8>> {
        match invocation {
            Invocation::InitLedger => {
                self.init_ledger(ctx).await?;
                Ok(Vec::new())
            }
            Invocation::CreateMedicine(medicine) => {
                self.create_medicine(ctx, medicine).await?;
                Ok(Vec::new())
            }
            Invocation::ReadMedicine { id } => encode(&self.read_medicine(ctx, &id).await?),
            Invocation::UpdateMedicine(medicine) => {
                self.update_medicine(ctx, medicine).await?;
                Ok(Vec::new())
            }
            Invocation::DeleteMedicine { id } => {
                self.delete_medicine(ctx, &id).await?;
                Ok(Vec::new())
            }
            Invocation::MedicineExists { id } => encode(&self.medicine_exists(ctx, &id).await?),
            Invocation::TransferMedicine {
                id,
                new_sender,
                new_receiver,
            } => encode(
                &self
                    .transfer_medicine(ctx, &id, &new_sender, &new_receiver)
                    .await?,
            ),
            Invocation::MedicineJourney { id } => encode(&self.medicine_journey(ctx, &id).await?),
            Invocation::GetAllMedicines => encode(&self.get_all_medicines(ctx).await?),
            Invocation::GetMedicineHistory { id } => {
                encode(&self.get_medicine_history(ctx, &id).await?)
            }
            Invocation::GetMedicineAuditTrail { id } => {
                encode(&self.history_records(ctx, &id).await?)
            }
        }
    }
}

fn encode<T: Serialize>(value: &T) -> ContractResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| ContractError::Encoding(e.to_string()))
}
