//! Bootstrap catalogue written by ledger initialization

use crate::medicine::Medicine;

struct SeedRow {
    id: &'static str,
    name: &'static str,
    manufacturer: &'static str,
    manufacture_date: &'static str,
    expiry_date: &'static str,
    brand_name: &'static str,
    composition: &'static str,
    dosage_form: &'static str,
    // Deployed ledgers were seeded with the therapeutic class in TimeStamp.
    time_stamp: &'static str,
}

const SEED_ROWS: [SeedRow; 5] = [
    SeedRow {
        id: "1",
        name: "Aspirin",
        manufacturer: "ABC Pharmaceuticals",
        manufacture_date: "2022-01-01",
        expiry_date: "2024-01-01",
        brand_name: "PharmaCorp",
        composition: "Acetylsalicylic Acid",
        dosage_form: "Tablet",
        time_stamp: "Pain Reliever",
    },
    SeedRow {
        id: "2",
        name: "Paracetamol",
        manufacturer: "XYZ Pharmaceuticals",
        manufacture_date: "2022-02-01",
        expiry_date: "2024-02-01",
        brand_name: "HealthCare",
        composition: "Paracetamol",
        dosage_form: "Tablet",
        time_stamp: "Fever Reducer",
    },
    SeedRow {
        id: "3",
        name: "Ibuprofen",
        manufacturer: "PQR Pharmaceuticals",
        manufacture_date: "2022-03-01",
        expiry_date: "2024-03-01",
        brand_name: "MediLife",
        composition: "Ibuprofen",
        dosage_form: "Capsule",
        time_stamp: "Anti-inflammatory",
    },
    SeedRow {
        id: "4",
        name: "Amoxicillin",
        manufacturer: "LMN Pharmaceuticals",
        manufacture_date: "2022-04-01",
        expiry_date: "2024-04-01",
        brand_name: "PharmaMed",
        composition: "Amoxicillin",
        dosage_form: "Tablet",
        time_stamp: "Antibiotic",
    },
    SeedRow {
        id: "5",
        name: "Omeprazole",
        manufacturer: "EFG Pharmaceuticals",
        manufacture_date: "2022-05-01",
        expiry_date: "2024-05-01",
        brand_name: "PharmaCare",
        composition: "Omeprazole",
        dosage_form: "Capsule",
        time_stamp: "Acid Reducer",
    },
];

/// The fixed set of medicines written by ledger initialization.
///
/// Row `n` is held by `Sender{n}`/`Receiver{n}`, carries regulatory number `n`
/// and batch `BatchNo{n}`, and has not completed its journey.
pub fn seed_catalogue() -> Vec<Medicine> {
    SEED_ROWS
        .iter()
        .map(|row| Medicine {
            id: row.id.to_string(),
            name: row.name.to_string(),
            manufacturer: row.manufacturer.to_string(),
            manufacture_date: row.manufacture_date.into(),
            expiry_date: row.expiry_date.into(),
            brand_name: row.brand_name.to_string(),
            composition: row.composition.to_string(),
            sender_id: format!("Sender{}", row.id),
            receiver_id: format!("Receiver{}", row.id),
            regulatory_no: row.id.to_string(),
            dosage_form: row.dosage_form.to_string(),
            time_stamp: row.time_stamp.to_string(),
            batch_no: format!("BatchNo{}", row.id),
            journey_completed: false,
        })
        .collect()
}
