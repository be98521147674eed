use serde::{Deserialize, Serialize};
use tradebook_reminders_domain::ID;

/// Opaque template-specific eligibility check (e.g. minimum account
/// age, minimum number of journal entries). The engine calls it but
/// does not own it; a transport failure counts as not eligible.
#[async_trait::async_trait]
pub trait IEligibilityPredicate: Send + Sync {
    async fn check(&self, owner_id: &ID, template_key: &str) -> anyhow::Result<bool>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PredicateRequest<'a> {
    owner_id: &'a ID,
    template_key: &'a str,
}

#[derive(Deserialize)]
struct PredicateResponse {
    eligible: bool,
}

pub struct HttpEligibilityPredicate {
    client: reqwest::Client,
    url: String,
}

impl HttpEligibilityPredicate {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait::async_trait]
impl IEligibilityPredicate for HttpEligibilityPredicate {
    async fn check(&self, owner_id: &ID, template_key: &str) -> anyhow::Result<bool> {
        let res: PredicateResponse = self
            .client
            .post(&self.url)
            .json(&PredicateRequest {
                owner_id,
                template_key,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(res.eligible)
    }
}

/// Fixed-answer predicate used when no endpoint is configured and in
/// tests.
pub struct StaticEligibilityPredicate {
    pub eligible: bool,
}

#[async_trait::async_trait]
impl IEligibilityPredicate for StaticEligibilityPredicate {
    async fn check(&self, _owner_id: &ID, _template_key: &str) -> anyhow::Result<bool> {
        Ok(self.eligible)
    }
}
