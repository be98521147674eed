use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};

/// Minimal profile of a reminder owner. The email channel resolves its
/// destination address from here; everything else about users lives
/// outside this engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub id: ID,
    pub email: Option<String>,
}

impl Owner {
    pub fn new(email: Option<String>) -> Self {
        Self {
            id: Default::default(),
            email,
        }
    }
}

impl Entity for Owner {
    fn id(&self) -> &ID {
        &self.id
    }
}
