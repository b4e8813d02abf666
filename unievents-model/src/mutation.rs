//! Writes queued while the remote event service is unreachable.

use crate::error::{ModelError, ModelResult};
use crate::event::{Event, EventId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of write a pending mutation replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationAction {
    Create,
    Update,
    Delete,
}

impl MutationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationAction::Create => "create",
            MutationAction::Update => "update",
            MutationAction::Delete => "delete",
        }
    }
}

impl fmt::Display for MutationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MutationAction {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(MutationAction::Create),
            "update" => Ok(MutationAction::Update),
            "delete" => Ok(MutationAction::Delete),
            other => Err(ModelError::UnknownAction(other.to_string())),
        }
    }
}

/// A write against the event collection.
///
/// Create and update carry the full record; delete carries only the id.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Create(Event),
    Update(Event),
    Delete { id: EventId },
}

#[derive(Serialize, Deserialize)]
struct DeleteStub {
    id: EventId,
}

impl Mutation {
    pub fn action(&self) -> MutationAction {
        match self {
            Mutation::Create(_) => MutationAction::Create,
            Mutation::Update(_) => MutationAction::Update,
            Mutation::Delete { .. } => MutationAction::Delete,
        }
    }

    /// Id of the event this mutation targets.
    pub fn target_id(&self) -> &EventId {
        match self {
            Mutation::Create(event) | Mutation::Update(event) => &event.id,
            Mutation::Delete { id } => id,
        }
    }

    /// Points the mutation at a different event id.
    pub fn retarget(&mut self, new_id: EventId) {
        match self {
            Mutation::Create(event) | Mutation::Update(event) => event.id = new_id,
            Mutation::Delete { id } => *id = new_id,
        }
    }

    /// Serializes the mutation's data column (record or id stub).
    pub fn data_json(&self) -> ModelResult<String> {
        let json = match self {
            Mutation::Create(event) | Mutation::Update(event) => serde_json::to_string(event)?,
            Mutation::Delete { id } => serde_json::to_string(&DeleteStub { id: id.clone() })?,
        };
        Ok(json)
    }

    /// Rebuilds a mutation from its stored action and data column.
    pub fn from_parts(action: MutationAction, data_json: &str) -> ModelResult<Self> {
        let mutation = match action {
            MutationAction::Create => Mutation::Create(serde_json::from_str(data_json)?),
            MutationAction::Update => Mutation::Update(serde_json::from_str(data_json)?),
            MutationAction::Delete => {
                let stub: DeleteStub = serde_json::from_str(data_json)?;
                Mutation::Delete { id: stub.id }
            }
        };
        Ok(mutation)
    }
}

/// Queue state of a pending mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationStatus {
    /// Replayed on the next drain.
    #[default]
    Pending,
    /// Failed terminally (e.g. target gone on the server). Kept for manual
    /// resolution and skipped by drains until requeued.
    Parked,
}

impl MutationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationStatus::Pending => "pending",
            MutationStatus::Parked => "parked",
        }
    }

    /// Unknown values read back from storage are treated as pending.
    pub fn parse_lossy(s: &str) -> Self {
        match s {
            "parked" => MutationStatus::Parked,
            _ => MutationStatus::Pending,
        }
    }
}

/// A queue entry awaiting confirmation from the remote service.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMutation {
    /// Local auto-increment id; insertion order.
    pub id: i64,
    pub mutation: Mutation,
    pub timestamp: DateTime<Utc>,
    pub status: MutationStatus,
    pub attempts: u32,
    pub last_error: Option<String>,
}

impl PendingMutation {
    pub fn action(&self) -> MutationAction {
        self.mutation.action()
    }

    pub fn is_parked(&self) -> bool {
        self.status == MutationStatus::Parked
    }
}
