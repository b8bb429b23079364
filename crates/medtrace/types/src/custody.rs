//! Custody endpoints

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sender/receiver pair holding custody of a medicine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustodyPair {
    #[serde(rename = "SenderId")]
    pub sender_id: String,

    #[serde(rename = "ReceiverId")]
    pub receiver_id: String,
}

impl CustodyPair {
    pub fn new(sender_id: impl Into<String>, receiver_id: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            receiver_id: receiver_id.into(),
        }
    }
}

impl fmt::Display for CustodyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SenderId: {}, ReceiverId: {}",
            self.sender_id, self.receiver_id
        )
    }
}
