//! Medicine record

use crate::custody::CustodyPair;
use crate::date::CalendarDate;
use serde::{Deserialize, Serialize};

/// A pharmaceutical unit tracked on the ledger.
///
/// Serialized as one JSON object with the field names of existing ledger
/// records (`SenderId`, `DrapNo`, `Batch_No`, ...). Missing fields decode as
/// empty strings and an unfinished journey.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Medicine {
    /// Ledger key. Immutable once created.
    #[serde(rename = "ID")]
    pub id: String,

    pub name: String,

    pub manufacturer: String,

    pub manufacture_date: CalendarDate,

    pub expiry_date: CalendarDate,

    pub brand_name: String,

    pub composition: String,

    /// Current custody sender
    pub sender_id: String,

    /// Current custody receiver
    pub receiver_id: String,

    /// Regulatory registration number
    #[serde(rename = "DrapNo")]
    pub regulatory_no: String,

    pub dosage_form: String,

    /// Last-write timestamp. Stamped by the transaction facade, opaque here.
    pub time_stamp: String,

    #[serde(rename = "Batch_No")]
    pub batch_no: String,

    /// Whether the logistics journey has been marked complete
    #[serde(with = "journey_flag")]
    pub journey_completed: bool,
}

impl Medicine {
    /// Create an empty record for the given ID
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Current custody endpoints
    pub fn custody(&self) -> CustodyPair {
        CustodyPair::new(self.sender_id.clone(), self.receiver_id.clone())
    }

    /// Move custody to a new sender/receiver pair, returning the previous one.
    pub fn transfer_custody(
        &mut self,
        sender_id: impl Into<String>,
        receiver_id: impl Into<String>,
    ) -> CustodyPair {
        CustodyPair::new(
            std::mem::replace(&mut self.sender_id, sender_id.into()),
            std::mem::replace(&mut self.receiver_id, receiver_id.into()),
        )
    }

    /// Mark the logistics journey as completed
    pub fn complete_journey(&mut self) {
        self.journey_completed = true;
    }

    /// Encode to the ledger wire format
    pub fn to_vec(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Decode from the ledger wire format
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

/// Parse the textual journey flag used by ledger records.
///
/// `"true"`/`"false"` in any case are accepted; an empty string means the
/// journey has not completed.
pub fn parse_journey_flag(raw: &str) -> Option<bool> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else {
        None
    }
}

/// `JourneyCompleted` is a string on the wire; JSON booleans are accepted too.
///
/// Older writers stored whatever text they were given. Text that is neither
/// `"true"` nor `"false"` decodes as an unfinished journey.
mod journey_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(if *value { "true" } else { "false" })
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFlag {
        Bool(bool),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawFlag::deserialize(deserializer)? {
            RawFlag::Bool(value) => value,
            RawFlag::Text(text) => super::parse_journey_flag(&text).unwrap_or_else(|| {
                tracing::warn!(
                    flag = %text,
                    "Unrecognized JourneyCompleted value, reading as false"
                );
                false
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> Medicine {
        Medicine {
            id: "42".to_string(),
            name: "Aspirin".to_string(),
            manufacturer: "ABC Pharmaceuticals".to_string(),
            manufacture_date: CalendarDate::from("2022-01-01"),
            expiry_date: CalendarDate::from("2024-01-01"),
            brand_name: "PharmaCorp".to_string(),
            composition: "Acetylsalicylic Acid".to_string(),
            sender_id: "Sender1".to_string(),
            receiver_id: "Receiver1".to_string(),
            regulatory_no: "1".to_string(),
            dosage_form: "Tablet".to_string(),
            time_stamp: "2024-03-01 10:15:30 +0000 UTC".to_string(),
            batch_no: "BatchNo1".to_string(),
            journey_completed: false,
        }
    }

    #[test]
    fn test_wire_field_names() {
        let value = serde_json::to_value(sample()).unwrap();
        let object = value.as_object().unwrap();

        for key in [
            "ID",
            "Name",
            "Manufacturer",
            "ManufactureDate",
            "ExpiryDate",
            "BrandName",
            "Composition",
            "SenderId",
            "ReceiverId",
            "DrapNo",
            "DosageForm",
            "TimeStamp",
            "Batch_No",
            "JourneyCompleted",
        ] {
            assert!(object.contains_key(key), "missing wire field {key}");
        }
        assert_eq!(object.len(), 14);
        assert_eq!(object["JourneyCompleted"], "false");
    }

    #[test]
    fn test_decodes_legacy_record() {
        let raw = br#"{
            "ID": "1", "Name": "Aspirin", "SenderId": "Sender1", "ReceiverId": "Receiver1",
            "DrapNo": "1", "Batch_No": "BatchNo1", "JourneyCompleted": "true"
        }"#;
        let medicine = Medicine::from_slice(raw).unwrap();

        assert_eq!(medicine.id, "1");
        assert_eq!(medicine.regulatory_no, "1");
        assert_eq!(medicine.batch_no, "BatchNo1");
        assert!(medicine.journey_completed);
        assert_eq!(medicine.manufacturer, "");
    }

    #[test]
    fn test_journey_flag_variants() {
        let empty = Medicine::from_slice(br#"{"ID":"1","JourneyCompleted":""}"#).unwrap();
        assert!(!empty.journey_completed);

        let boolean = Medicine::from_slice(br#"{"ID":"1","JourneyCompleted":true}"#).unwrap();
        assert!(boolean.journey_completed);

        let unknown = Medicine::from_slice(br#"{"ID":"1","JourneyCompleted":"no"}"#).unwrap();
        assert!(!unknown.journey_completed);
        assert_eq!(unknown.id, "1");
    }

    #[test]
    fn test_rejects_wrongly_typed_journey_flag() {
        assert!(Medicine::from_slice(br#"{"ID":"1","JourneyCompleted":7}"#).is_err());
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(Medicine::from_slice(b"not json").is_err());
        assert!(Medicine::from_slice(b"[1,2,3]").is_err());
    }

    #[test]
    fn test_transfer_custody_returns_previous_pair() {
        let mut medicine = sample();
        let previous = medicine.transfer_custody("Sender2", "Receiver2");

        assert_eq!(previous, CustodyPair::new("Sender1", "Receiver1"));
        assert_eq!(medicine.custody(), CustodyPair::new("Sender2", "Receiver2"));
    }

    proptest! {
        #[test]
        fn prop_journey_flag_survives_encoding(flag in any::<bool>(), id in "[a-zA-Z0-9]{1,12}") {
            let mut medicine = Medicine::new(id);
            medicine.journey_completed = flag;
            let decoded = Medicine::from_slice(&medicine.to_vec().unwrap()).unwrap();
            prop_assert_eq!(decoded, medicine);
        }
    }
}
