//! Medicine ledger handlers.
//!
//! Bodies are read as raw bytes and decoded here so that any unparseable
//! payload, whatever its content type, gets the same 400 response. Results are
//! passed through exactly as the contract encoded them.

use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use crate::timestamp::ledger_timestamp;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use medtrace_contract::Invocation;
use medtrace_types::Medicine;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Body of the single-ID endpoints. A missing ID reaches the contract as
/// empty and is rejected there.
#[derive(Debug, Default, Deserialize)]
pub struct MedicineIdPayload {
    #[serde(rename = "ID", default)]
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TransferPayload {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "SenderId", default)]
    pub sender_id: String,
    #[serde(rename = "ReceiverId", default)]
    pub receiver_id: String,
}

/// Seed the ledger with the built-in catalogue.
pub async fn init_ledger(State(state): State<AppState>) -> ApiResult<Response> {
    let payload = state.gateway.submit(Invocation::InitLedger).await?;
    Ok(ledger_response(payload))
}

pub async fn list_medicines(State(state): State<AppState>) -> ApiResult<Response> {
    let payload = state.gateway.evaluate(Invocation::GetAllMedicines).await?;
    Ok(ledger_response(payload))
}

pub async fn get_medicine(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let MedicineIdPayload { id } = parse_body(&body)?;
    let payload = state
        .gateway
        .evaluate(Invocation::ReadMedicine { id })
        .await?;
    Ok(ledger_response(payload))
}

/// Mark a medicine's journey complete. Committed, unlike the other reads.
pub async fn complete_journey(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let MedicineIdPayload { id } = parse_body(&body)?;
    let payload = state
        .gateway
        .submit(Invocation::MedicineJourney { id })
        .await?;
    Ok(ledger_response(payload))
}

pub async fn medicine_history(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let MedicineIdPayload { id } = parse_body(&body)?;
    let payload = state
        .gateway
        .evaluate(Invocation::GetMedicineHistory { id })
        .await?;
    Ok(ledger_response(payload))
}

pub async fn medicine_audit_trail(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Response> {
    let MedicineIdPayload { id } = parse_body(&body)?;
    let payload = state
        .gateway
        .evaluate(Invocation::GetMedicineAuditTrail { id })
        .await?;
    Ok(ledger_response(payload))
}

/// Create a medicine. The client's `TimeStamp` is replaced with the current
/// time and the stamped record is echoed back.
pub async fn create_medicine(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<Medicine>> {
    let medicine = stamped(parse_body(&body)?);
    state
        .gateway
        .submit(Invocation::CreateMedicine(medicine.clone()))
        .await?;
    Ok(Json(medicine))
}

/// Replace a medicine wholesale, stamped like [`create_medicine`].
pub async fn update_medicine(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<Medicine>> {
    let medicine = stamped(parse_body(&body)?);
    state
        .gateway
        .submit(Invocation::UpdateMedicine(medicine.clone()))
        .await?;
    Ok(Json(medicine))
}

pub async fn transfer_medicine(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Response> {
    let request: TransferPayload = parse_body(&body)?;
    let payload = state
        .gateway
        .submit(Invocation::TransferMedicine {
            id: request.id,
            new_sender: request.sender_id,
            new_receiver: request.receiver_id,
        })
        .await?;
    Ok(ledger_response(payload))
}

pub async fn delete_medicine(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let MedicineIdPayload { id } = parse_body(&body)?;
    let payload = state
        .gateway
        .submit(Invocation::DeleteMedicine { id })
        .await?;
    Ok(ledger_response(payload))
}

pub async fn medicine_exists(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let MedicineIdPayload { id } = parse_body(&body)?;
    let payload = state
        .gateway
        .evaluate(Invocation::MedicineExists { id })
        .await?;
    Ok(ledger_response(payload))
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    serde_json::from_slice(body).map_err(|err| {
        tracing::debug!(error = %err, "Rejecting request body");
        ApiError::unparseable_body()
    })
}

fn stamped(mut medicine: Medicine) -> Medicine {
    medicine.time_stamp = ledger_timestamp(chrono::Utc::now());
    medicine
}

fn ledger_response(payload: Vec<u8>) -> Response {
    if payload.is_empty() {
        return StatusCode::OK.into_response();
    }
    ([(header::CONTENT_TYPE, "application/json")], payload).into_response()
}
