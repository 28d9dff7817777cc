pub mod trello;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::action::{Action, ActionType};
use crate::model::card::{Card, CardUpdate, Label, List};
use crate::model::member::Member;
use crate::model::webhook::{Webhook, WebhookUpdate};

/// Upstream cap on the number of actions a single call returns.
pub const ACTION_PAGE_LIMIT: usize = 1000;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing API credentials: set [trello] api_key and token in the config file")]
    MissingCredentials,
    #[error("request failed with {status}: {text}")]
    Status { status: u16, text: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to decode response: {0}")]
    Decode(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Clone, Default)]
pub struct ActionQuery {
    pub since: Option<DateTime<Utc>>,
    pub before: Option<DateTime<Utc>>,
    pub filter: Vec<ActionType>,
    pub limit: Option<usize>,
}

impl ActionQuery {
    pub fn between(since: DateTime<Utc>, before: DateTime<Utc>) -> Self {
        Self {
            since: Some(since),
            before: Some(before),
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: Vec<ActionType>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(since) = &self.since {
            params.push(("since", since.to_rfc3339()));
        }
        if let Some(before) = &self.before {
            params.push(("before", before.to_rfc3339()));
        }
        if !self.filter.is_empty() {
            let filter: Vec<&str> = self.filter.iter().map(|t| t.as_str()).collect();
            params.push(("filter", filter.join(",")));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, Default)]
pub struct CardQuery {
    pub since: Option<DateTime<Utc>>,
    pub before: Option<DateTime<Utc>>,
    pub fields: Option<String>,
}

impl CardQuery {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(since) = &self.since {
            params.push(("since", since.to_rfc3339()));
        }
        if let Some(before) = &self.before {
            params.push(("before", before.to_rfc3339()));
        }
        if let Some(fields) = &self.fields {
            params.push(("fields", fields.clone()));
        }
        params
    }
}

#[derive(Debug, Clone)]
pub struct NewWebhook {
    pub description: String,
    pub callback_url: String,
    pub id_model: String,
}

#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    async fn list_cards(&self, list_id: &str) -> ApiResult<Vec<Card>>;
    async fn board_cards(&self, board_id: &str, query: &CardQuery) -> ApiResult<Vec<Card>>;
    async fn board_lists(&self, board_id: &str) -> ApiResult<Vec<List>>;
    async fn card_actions(&self, card_id: &str, query: &ActionQuery) -> ApiResult<Vec<Action>>;
    async fn board_actions(&self, board_id: &str, query: &ActionQuery)
        -> ApiResult<Vec<Action>>;
    async fn board_members(&self, board_id: &str) -> ApiResult<Vec<Member>>;
    async fn board_labels(&self, board_id: &str) -> ApiResult<Vec<Label>>;
    async fn search_cards(&self, query: &str) -> ApiResult<Vec<Card>>;

    async fn update_card(&self, card_id: &str, update: &CardUpdate) -> ApiResult<Card>;
    async fn add_member(&self, card_id: &str, member_id: &str) -> ApiResult<()>;
    async fn remove_member(&self, card_id: &str, member_id: &str) -> ApiResult<()>;
    async fn add_label(&self, card_id: &str, label_id: &str) -> ApiResult<()>;
    async fn remove_label(&self, card_id: &str, label_id: &str) -> ApiResult<()>;
    async fn add_comment(&self, card_id: &str, text: &str) -> ApiResult<Action>;

    async fn list_webhooks(&self) -> ApiResult<Vec<Webhook>>;
    async fn get_webhook(&self, webhook_id: &str) -> ApiResult<Webhook>;
    async fn create_webhook(&self, hook: &NewWebhook) -> ApiResult<Webhook>;
    async fn update_webhook(&self, webhook_id: &str, update: &WebhookUpdate)
        -> ApiResult<Webhook>;
    async fn delete_webhook(&self, webhook_id: &str) -> ApiResult<()>;

    async fn move_card(&self, card_id: &str, list_id: &str) -> ApiResult<Card> {
        self.update_card(card_id, &CardUpdate::move_to(list_id)).await
    }

    async fn mark_complete(&self, card_id: &str) -> ApiResult<Card> {
        self.update_card(card_id, &CardUpdate::complete()).await
    }
}

#[cfg(test)]
pub mod mock;

#[cfg(test)]
pub mod tests;
