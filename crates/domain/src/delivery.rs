use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryChannelKind {
    Email,
    InApp,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryOutcome {
    Success,
    Failure,
}

/// One row of delivery history: a single attempt on a single channel
/// for one occurrence of a reminder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub id: ID,
    pub reminder_id: ID,
    pub fired_at: i64,
    pub channel: DeliveryChannelKind,
    pub outcome: DeliveryOutcome,
    pub error: Option<String>,
}

impl DeliveryRecord {
    pub fn success(reminder_id: ID, channel: DeliveryChannelKind, fired_at: i64) -> Self {
        Self {
            id: Default::default(),
            reminder_id,
            fired_at,
            channel,
            outcome: DeliveryOutcome::Success,
            error: None,
        }
    }

    pub fn failure(
        reminder_id: ID,
        channel: DeliveryChannelKind,
        fired_at: i64,
        error: String,
    ) -> Self {
        Self {
            id: Default::default(),
            reminder_id,
            fired_at,
            channel,
            outcome: DeliveryOutcome::Failure,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == DeliveryOutcome::Success
    }
}

impl Entity for DeliveryRecord {
    fn id(&self) -> &ID {
        &self.id
    }
}
