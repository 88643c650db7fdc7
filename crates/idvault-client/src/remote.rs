use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::json;

use crate::{EntityType, RemoteError, SyncQueueItem};

/// Where queued items are replayed.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn replay(&self, item: &SyncQueueItem) -> Result<(), RemoteError>;
}

/// Replays items against an idvault server over HTTP.
///
/// The underlying client keeps cookies, so a [`HttpRemote::login`] binds every
/// later replay to that user's session.
pub struct HttpRemote {
    client: Client,
    base_url: String,
}

impl HttpRemote {
    pub fn new(base_url: &str) -> Result<Self, RemoteError> {
        let client = Client::builder().cookie_store(true).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<(), RemoteError> {
        let response = self
            .client
            .post(format!("{}/api/login", self.base_url))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;

        check(response).await?;
        tracing::info!("logged in");
        Ok(())
    }

    const fn endpoint(entity_type: EntityType) -> &'static str {
        match entity_type {
            EntityType::User => "/api/users/sync",
            EntityType::Document => "/api/documents/sync",
        }
    }
}

#[async_trait]
impl RemoteApi for HttpRemote {
    #[tracing::instrument(skip(self, item), fields(item_id = %item.id))]
    async fn replay(&self, item: &SyncQueueItem) -> Result<(), RemoteError> {
        let response = self
            .client
            .post(format!(
                "{}{}",
                self.base_url,
                Self::endpoint(item.entity_type)
            ))
            .json(item)
            .send()
            .await?;

        let response = check(response).await?;
        let duplicate = response
            .headers()
            .get("x-sync-duplicate")
            .is_some_and(|v| v == "true");
        tracing::debug!(duplicate, "server accepted sync item");
        Ok(())
    }
}

async fn check(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(RemoteError::Rejected {
        status: status.as_u16(),
        body,
    })
}
