use super::IOwnerRepo;
use crate::repos::shared::inmemory_repo::*;
use tradebook_reminders_domain::{Owner, ID};

pub struct InMemoryOwnerRepo {
    owners: std::sync::Mutex<Vec<Owner>>,
}

impl InMemoryOwnerRepo {
    pub fn new() -> Self {
        Self {
            owners: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IOwnerRepo for InMemoryOwnerRepo {
    async fn insert(&self, owner: &Owner) -> anyhow::Result<()> {
        insert(owner, &self.owners);
        Ok(())
    }

    async fn find(&self, owner_id: &ID) -> Option<Owner> {
        find(owner_id, &self.owners)
    }
}
