mod inmemory;

pub use inmemory::InMemoryOwnerRepo;
use tradebook_reminders_domain::{Owner, ID};

#[async_trait::async_trait]
pub trait IOwnerRepo: Send + Sync {
    async fn insert(&self, owner: &Owner) -> anyhow::Result<()>;
    async fn find(&self, owner_id: &ID) -> Option<Owner>;
}
