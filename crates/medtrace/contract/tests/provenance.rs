//! End-to-end provenance scenarios through the gateway and the in-memory store.

use futures::{StreamExt, TryStreamExt};
use medtrace_contract::{ContractError, Gateway, HistoryRecord, Invocation, MedicineContract};
use medtrace_store::{InMemoryWorldState, TransactionContext, WorldState};
use medtrace_types::{seed_catalogue, CustodyPair, Medicine};
use std::sync::Arc;

fn setup() -> (Arc<InMemoryWorldState>, Gateway) {
    let store = Arc::new(InMemoryWorldState::new());
    let gateway = Gateway::new(store.clone());
    (store, gateway)
}

fn sample(id: &str) -> Medicine {
    let mut medicine = Medicine::new(id);
    medicine.name = "Metformin".to_string();
    medicine.manufacturer = "Getz Pharma".to_string();
    medicine.manufacture_date = "2024-01-10".into();
    medicine.expiry_date = "2026-01-10".into();
    medicine.brand_name = "Glucophage".to_string();
    medicine.composition = "Metformin HCl 500mg".to_string();
    medicine.sender_id = "Factory".to_string();
    medicine.receiver_id = "Distributor".to_string();
    medicine.regulatory_no = "DRAP-0042".to_string();
    medicine.dosage_form = "Tablet".to_string();
    medicine.time_stamp = "2024-01-10 08:00:00 +0000 UTC".to_string();
    medicine.batch_no = "B-001".to_string();
    medicine
}

async fn read(gateway: &Gateway, id: &str) -> Result<Medicine, ContractError> {
    let payload = gateway
        .evaluate(Invocation::ReadMedicine { id: id.to_string() })
        .await?;
    Ok(serde_json::from_slice(&payload).unwrap())
}

async fn history(gateway: &Gateway, id: &str) -> Vec<Medicine> {
    let payload = gateway
        .evaluate(Invocation::GetMedicineHistory { id: id.to_string() })
        .await
        .unwrap();
    serde_json::from_slice(&payload).unwrap()
}

async fn list(gateway: &Gateway) -> Vec<Medicine> {
    let payload = gateway.evaluate(Invocation::GetAllMedicines).await.unwrap();
    serde_json::from_slice(&payload).unwrap()
}

#[tokio::test]
async fn create_then_read_returns_equal_record() {
    let (_, gateway) = setup();
    let medicine = sample("M-1");

    gateway
        .submit(Invocation::CreateMedicine(medicine.clone()))
        .await
        .unwrap();

    assert_eq!(read(&gateway, "M-1").await.unwrap(), medicine);
}

#[tokio::test]
async fn create_on_live_id_fails_and_keeps_value() {
    let (store, gateway) = setup();
    let original = sample("M-1");
    gateway
        .submit(Invocation::CreateMedicine(original.clone()))
        .await
        .unwrap();
    let commits = store.last_commit().await;

    let mut duplicate = sample("M-1");
    duplicate.name = "Something else".to_string();
    let err = gateway
        .submit(Invocation::CreateMedicine(duplicate))
        .await
        .unwrap_err();

    assert!(matches!(err, ContractError::AlreadyExists(id) if id == "M-1"));
    assert_eq!(read(&gateway, "M-1").await.unwrap(), original);
    assert_eq!(store.last_commit().await, commits);
}

#[tokio::test]
async fn mutations_on_missing_id_fail_without_writing() {
    let (store, gateway) = setup();

    let invocations = vec![
        Invocation::UpdateMedicine(sample("ghost")),
        Invocation::DeleteMedicine { id: "ghost".into() },
        Invocation::TransferMedicine {
            id: "ghost".into(),
            new_sender: "A".into(),
            new_receiver: "B".into(),
        },
        Invocation::MedicineJourney { id: "ghost".into() },
    ];

    for invocation in invocations {
        let name = invocation.function_name();
        let err = gateway.submit(invocation).await.unwrap_err();
        assert!(
            matches!(&err, ContractError::NotFound(id) if id == "ghost"),
            "{name} returned {err}"
        );
    }

    assert!(store.is_empty().await);
    assert_eq!(store.last_commit().await, 0);
}

#[tokio::test]
async fn delete_hides_record_but_keeps_history() {
    let (_, gateway) = setup();
    gateway
        .submit(Invocation::CreateMedicine(sample("M-9")))
        .await
        .unwrap();
    gateway
        .submit(Invocation::DeleteMedicine { id: "M-9".into() })
        .await
        .unwrap();

    let err = read(&gateway, "M-9").await.unwrap_err();
    assert!(matches!(err, ContractError::NotFound(_)));
    assert_eq!(err.to_string(), "the medicine M-9 does not exist");

    let versions = history(&gateway, "M-9").await;
    assert_eq!(versions, vec![sample("M-9")]);
}

#[tokio::test]
async fn transfer_returns_previous_custody() {
    let (_, gateway) = setup();
    gateway
        .submit(Invocation::CreateMedicine(sample("M-2")))
        .await
        .unwrap();

    let payload = gateway
        .submit(Invocation::TransferMedicine {
            id: "M-2".into(),
            new_sender: "Distributor".into(),
            new_receiver: "Pharmacy".into(),
        })
        .await
        .unwrap();
    let previous: CustodyPair = serde_json::from_slice(&payload).unwrap();

    assert_eq!(previous, CustodyPair::new("Factory", "Distributor"));
    let current = read(&gateway, "M-2").await.unwrap();
    assert_eq!(current.custody(), CustodyPair::new("Distributor", "Pharmacy"));
}

#[tokio::test]
async fn listing_returns_live_ids_in_key_order() {
    let (_, gateway) = setup();
    for id in ["c", "a", "b", "d"] {
        gateway
            .submit(Invocation::CreateMedicine(sample(id)))
            .await
            .unwrap();
    }
    gateway
        .submit(Invocation::DeleteMedicine { id: "b".into() })
        .await
        .unwrap();

    let ids: Vec<String> = list(&gateway).await.into_iter().map(|m| m.id).collect();
    assert_eq!(ids, vec!["a", "c", "d"]);
}

#[tokio::test]
async fn journey_completion_scenario() {
    let (_, gateway) = setup();
    let created = sample("42");
    assert!(!created.journey_completed);
    gateway
        .submit(Invocation::CreateMedicine(created.clone()))
        .await
        .unwrap();

    let payload = gateway
        .submit(Invocation::MedicineJourney { id: "42".into() })
        .await
        .unwrap();
    let returned: Medicine = serde_json::from_slice(&payload).unwrap();
    let stored = read(&gateway, "42").await.unwrap();

    let mut expected = created;
    expected.journey_completed = true;
    assert_eq!(returned, expected);
    assert_eq!(stored, expected);
}

#[tokio::test]
async fn update_history_scenario() {
    let (_, gateway) = setup();
    let first = sample("7");
    let mut second = sample("7");
    second.dosage_form = "Syrup".to_string();

    gateway
        .submit(Invocation::CreateMedicine(first.clone()))
        .await
        .unwrap();
    gateway
        .submit(Invocation::UpdateMedicine(second.clone()))
        .await
        .unwrap();

    assert_eq!(history(&gateway, "7").await, vec![first, second]);
}

#[tokio::test]
async fn audit_trail_reports_deletes() {
    let (_, gateway) = setup();
    gateway
        .submit(Invocation::CreateMedicine(sample("A-1")))
        .await
        .unwrap();
    gateway
        .submit(Invocation::DeleteMedicine { id: "A-1".into() })
        .await
        .unwrap();

    let payload = gateway
        .evaluate(Invocation::GetMedicineAuditTrail { id: "A-1".into() })
        .await
        .unwrap();
    let records: Vec<HistoryRecord> = serde_json::from_slice(&payload).unwrap();

    assert_eq!(records.len(), 2);
    assert!(!records[0].is_delete);
    assert_eq!(records[0].value, Some(sample("A-1")));
    assert!(records[1].is_delete);
    assert!(records[1].value.is_none());
    assert_ne!(records[0].tx_id, records[1].tx_id);
    assert!(records[0].timestamp <= records[1].timestamp);
}

#[tokio::test]
async fn concurrent_read_modify_write_conflicts() {
    let store = Arc::new(InMemoryWorldState::new());
    let state: Arc<dyn WorldState> = store.clone();
    let gateway = Gateway::new(state.clone());
    gateway
        .submit(Invocation::CreateMedicine(sample("M-3")))
        .await
        .unwrap();

    let contract = MedicineContract::new();
    let mut first = TransactionContext::new(state.clone());
    let mut second = TransactionContext::new(state.clone());
    contract
        .transfer_medicine(&mut first, "M-3", "A", "B")
        .await
        .unwrap();
    contract
        .transfer_medicine(&mut second, "M-3", "C", "D")
        .await
        .unwrap();

    state.commit(first.into_read_write_set()).await.unwrap();
    let err = ContractError::from(
        state
            .commit(second.into_read_write_set())
            .await
            .unwrap_err(),
    );

    assert!(err.is_retryable());
    let current = read(&gateway, "M-3").await.unwrap();
    assert_eq!(current.custody(), CustodyPair::new("A", "B"));
}

#[tokio::test]
async fn evaluate_leaves_no_durable_effect() {
    let (store, gateway) = setup();

    gateway
        .evaluate(Invocation::CreateMedicine(sample("E-1")))
        .await
        .unwrap();
    gateway.evaluate(Invocation::InitLedger).await.unwrap();

    assert!(store.is_empty().await);
    assert_eq!(store.last_commit().await, 0);
    let exists = gateway
        .evaluate(Invocation::MedicineExists { id: "E-1".into() })
        .await
        .unwrap();
    assert_eq!(exists, b"false".to_vec());
    assert!(history(&gateway, "E-1").await.is_empty());
}

#[tokio::test]
async fn init_ledger_seeds_once() {
    let (store, gateway) = setup();

    gateway.submit(Invocation::InitLedger).await.unwrap();
    assert_eq!(store.len().await, seed_catalogue().len());
    assert_eq!(list(&gateway).await, seed_catalogue());

    let err = gateway.submit(Invocation::InitLedger).await.unwrap_err();
    assert!(matches!(err, ContractError::AlreadyExists(_)));
}

#[tokio::test]
async fn history_stream_works_for_deleted_ids() {
    let store = Arc::new(InMemoryWorldState::new());
    let state: Arc<dyn WorldState> = store.clone();
    let gateway = Gateway::new(state.clone());
    gateway
        .submit(Invocation::CreateMedicine(sample("H-1")))
        .await
        .unwrap();
    gateway
        .submit(Invocation::DeleteMedicine { id: "H-1".into() })
        .await
        .unwrap();
    gateway
        .submit(Invocation::CreateMedicine(sample("H-1")))
        .await
        .unwrap();

    let ctx = TransactionContext::new(state);
    let versions: Vec<Medicine> = MedicineContract::new()
        .medicine_history(&ctx, "H-1")
        .try_collect()
        .await
        .unwrap();
    assert_eq!(versions.len(), 2);
}

async fn commit_raw(state: &Arc<dyn WorldState>, key: &str, bytes: &[u8]) {
    let mut ctx = TransactionContext::new(state.clone());
    ctx.put_state(key, bytes.to_vec()).unwrap();
    state.commit(ctx.into_read_write_set()).await.unwrap();
}

#[tokio::test]
async fn nul_led_id_is_invalid_argument() {
    let (store, gateway) = setup();

    let err = gateway
        .submit(Invocation::CreateMedicine(Medicine::new("\u{0}abc")))
        .await
        .unwrap_err();
    assert!(matches!(err, ContractError::InvalidArgument(_)), "{err}");

    let err = gateway
        .evaluate(Invocation::MedicineExists { id: "\u{0}abc".into() })
        .await
        .unwrap_err();
    assert!(matches!(err, ContractError::InvalidArgument(_)), "{err}");

    assert_eq!(store.last_commit().await, 0);
}

#[tokio::test]
async fn read_of_undecodable_record_is_corrupt() {
    let store = Arc::new(InMemoryWorldState::new());
    let state: Arc<dyn WorldState> = store.clone();
    let gateway = Gateway::new(state.clone());
    commit_raw(&state, "bad", b"not json").await;

    let err = read(&gateway, "bad").await.unwrap_err();
    assert!(
        matches!(&err, ContractError::CorruptRecord { key, .. } if key == "bad"),
        "{err}"
    );
}

#[tokio::test]
async fn history_stops_at_corrupt_version() {
    let store = Arc::new(InMemoryWorldState::new());
    let state: Arc<dyn WorldState> = store.clone();
    let good = sample("H-2");
    commit_raw(&state, "H-2", &good.to_vec().unwrap()).await;
    commit_raw(&state, "H-2", b"not json").await;
    commit_raw(&state, "H-2", &good.to_vec().unwrap()).await;

    let ctx = TransactionContext::new(state);
    let contract = MedicineContract::new();
    let items: Vec<_> = contract.medicine_history(&ctx, "H-2").collect().await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap(), &good);
    assert!(matches!(
        &items[1],
        Err(ContractError::CorruptRecord { key, .. }) if key == "H-2"
    ));

    let err = contract.get_medicine_history(&ctx, "H-2").await.unwrap_err();
    assert!(matches!(err, ContractError::CorruptRecord { .. }));
}

#[tokio::test]
async fn listing_tolerates_legacy_journey_text() {
    let store = Arc::new(InMemoryWorldState::new());
    let state: Arc<dyn WorldState> = store.clone();
    let gateway = Gateway::new(state.clone());
    commit_raw(&state, "1", br#"{"ID":"1","JourneyCompleted":"no"}"#).await;
    commit_raw(&state, "2", br#"{"ID":"2","JourneyCompleted":"true"}"#).await;

    let medicines = list(&gateway).await;
    assert_eq!(medicines.len(), 2);
    assert!(!medicines[0].journey_completed);
    assert!(medicines[1].journey_completed);
}
