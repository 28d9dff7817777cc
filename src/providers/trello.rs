use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{
    ActionQuery, ApiError, ApiResult, CardQuery, NewWebhook, Provider, ACTION_PAGE_LIMIT,
};
use crate::config::TrelloConfig;
use crate::model::action::Action;
use crate::model::card::{Card, CardUpdate, Label, List};
use crate::model::member::Member;
use crate::model::webhook::{Webhook, WebhookUpdate};

pub const DEFAULT_BASE_URL: &str = "https://api.trello.com/1";

const CARD_FIELDS: &str =
    "id,name,desc,idList,idBoard,idMembers,labels,due,dueComplete,shortUrl,dateLastActivity";

pub struct TrelloProvider {
    base_url: String,
    api_key: String,
    token: String,
    client: reqwest::Client,
}

impl TrelloProvider {
    pub fn new(base_url: impl Into<String>, api_key: String, token: String) -> ApiResult<Self> {
        if api_key.trim().is_empty() || token.trim().is_empty() {
            return Err(ApiError::MissingCredentials);
        }
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            token,
            client: reqwest::Client::new(),
        })
    }

    pub fn from_config(config: Option<&TrelloConfig>) -> ApiResult<Self> {
        let cfg = config.ok_or(ApiError::MissingCredentials)?;
        let base = cfg.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Self::new(base, cfg.api_key.clone(), cfg.token.clone())
    }

    fn auth_params(&self) -> [(&str, &str); 2] {
        [("key", self.api_key.as_str()), ("token", self.token.as_str())]
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(%method, path, "trello request");
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .query(&self.auth_params())
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> ApiResult<T> {
        let resp = check_status(req.send().await?)?;
        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn send_empty(&self, req: RequestBuilder) -> ApiResult<()> {
        check_status(req.send().await?)?;
        Ok(())
    }
}

fn check_status(resp: Response) -> ApiResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    Err(ApiError::Status {
        status: status.as_u16(),
        text: status.canonical_reason().unwrap_or("unknown").to_string(),
    })
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    cards: Vec<Card>,
}

#[async_trait]
impl Provider for TrelloProvider {
    fn name(&self) -> &str {
        "Trello"
    }

    async fn list_cards(&self, list_id: &str) -> ApiResult<Vec<Card>> {
        let req = self
            .request(Method::GET, &format!("/lists/{list_id}/cards"))
            .query(&[("fields", CARD_FIELDS)]);
        self.send(req).await
    }

    async fn board_cards(&self, board_id: &str, query: &CardQuery) -> ApiResult<Vec<Card>> {
        let mut params = query.to_query();
        if query.fields.is_none() {
            params.push(("fields", CARD_FIELDS.to_string()));
        }
        let req = self
            .request(Method::GET, &format!("/boards/{board_id}/cards"))
            .query(&params);
        self.send(req).await
    }

    async fn board_lists(&self, board_id: &str) -> ApiResult<Vec<List>> {
        let req = self
            .request(Method::GET, &format!("/boards/{board_id}/lists"))
            .query(&[("fields", "id,name,closed")]);
        self.send(req).await
    }

    async fn card_actions(&self, card_id: &str, query: &ActionQuery) -> ApiResult<Vec<Action>> {
        let req = self
            .request(Method::GET, &format!("/cards/{card_id}/actions"))
            .query(&query.to_query());
        self.send(req).await
    }

    async fn board_actions(
        &self,
        board_id: &str,
        query: &ActionQuery,
    ) -> ApiResult<Vec<Action>> {
        let mut params = query.to_query();
        if query.limit.is_none() {
            params.push(("limit", ACTION_PAGE_LIMIT.to_string()));
        }
        let req = self
            .request(Method::GET, &format!("/boards/{board_id}/actions"))
            .query(&params);
        self.send(req).await
    }

    async fn board_members(&self, board_id: &str) -> ApiResult<Vec<Member>> {
        let req = self
            .request(Method::GET, &format!("/boards/{board_id}/members"))
            .query(&[("fields", "id,fullName,username")]);
        self.send(req).await
    }

    async fn board_labels(&self, board_id: &str) -> ApiResult<Vec<Label>> {
        let req = self.request(Method::GET, &format!("/boards/{board_id}/labels"));
        self.send(req).await
    }

    async fn search_cards(&self, query: &str) -> ApiResult<Vec<Card>> {
        let req = self.request(Method::GET, "/search").query(&[
            ("query", query),
            ("modelTypes", "cards"),
            ("card_fields", CARD_FIELDS),
            ("cards_limit", "100"),
        ]);
        let resp: SearchResponse = self.send(req).await?;
        Ok(resp.cards)
    }

    async fn update_card(&self, card_id: &str, update: &CardUpdate) -> ApiResult<Card> {
        let req = self
            .request(Method::PUT, &format!("/cards/{card_id}"))
            .query(&update.to_query());
        self.send(req).await
    }

    async fn add_member(&self, card_id: &str, member_id: &str) -> ApiResult<()> {
        let req = self
            .request(Method::POST, &format!("/cards/{card_id}/idMembers"))
            .query(&[("value", member_id)]);
        self.send_empty(req).await
    }

    async fn remove_member(&self, card_id: &str, member_id: &str) -> ApiResult<()> {
        let req = self.request(
            Method::DELETE,
            &format!("/cards/{card_id}/idMembers/{member_id}"),
        );
        self.send_empty(req).await
    }

    async fn add_label(&self, card_id: &str, label_id: &str) -> ApiResult<()> {
        let req = self
            .request(Method::POST, &format!("/cards/{card_id}/idLabels"))
            .query(&[("value", label_id)]);
        self.send_empty(req).await
    }

    async fn remove_label(&self, card_id: &str, label_id: &str) -> ApiResult<()> {
        let req = self.request(
            Method::DELETE,
            &format!("/cards/{card_id}/idLabels/{label_id}"),
        );
        self.send_empty(req).await
    }

    async fn add_comment(&self, card_id: &str, text: &str) -> ApiResult<Action> {
        let req = self
            .request(Method::POST, &format!("/cards/{card_id}/actions/comments"))
            .query(&[("text", text)]);
        self.send(req).await
    }

    async fn list_webhooks(&self) -> ApiResult<Vec<Webhook>> {
        let req = self.request(Method::GET, &format!("/tokens/{}/webhooks", self.token));
        self.send(req).await
    }

    async fn get_webhook(&self, webhook_id: &str) -> ApiResult<Webhook> {
        let req = self.request(Method::GET, &format!("/webhooks/{webhook_id}"));
        self.send(req).await
    }

    async fn create_webhook(&self, hook: &NewWebhook) -> ApiResult<Webhook> {
        let req = self.request(Method::POST, "/webhooks").query(&[
            ("description", hook.description.as_str()),
            ("callbackURL", hook.callback_url.as_str()),
            ("idModel", hook.id_model.as_str()),
        ]);
        self.send(req).await
    }

    async fn update_webhook(
        &self,
        webhook_id: &str,
        update: &WebhookUpdate,
    ) -> ApiResult<Webhook> {
        let req = self
            .request(Method::PUT, &format!("/webhooks/{webhook_id}"))
            .query(&update.to_query());
        self.send(req).await
    }

    async fn delete_webhook(&self, webhook_id: &str) -> ApiResult<()> {
        let req = self.request(Method::DELETE, &format!("/webhooks/{webhook_id}"));
        self.send_empty(req).await
    }
}
