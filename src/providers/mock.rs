use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{ActionQuery, ApiError, ApiResult, CardQuery, NewWebhook, Provider};
use crate::model::action::{Action, ActionData, ActionType};
use crate::model::card::{Card, CardUpdate, Label, List};
use crate::model::member::Member;
use crate::model::webhook::{Webhook, WebhookUpdate};

/// In-memory board that answers action queries by date range and records
/// every query and mutation it receives.
#[derive(Default)]
pub struct MockProvider {
    actions: Vec<Action>,
    cards: Vec<Card>,
    inclusive: bool,
    fail_since: Option<DateTime<Utc>>,
    calls: Arc<Mutex<Vec<ActionQuery>>>,
    updates: Arc<Mutex<Vec<(String, CardUpdate)>>>,
    comments: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = actions;
        self
    }

    pub fn with_cards(mut self, cards: Vec<Card>) -> Self {
        self.cards = cards;
        self
    }

    /// Match both ends of the range like an upstream with inclusive filters.
    pub fn inclusive_bounds(mut self) -> Self {
        self.inclusive = true;
        self
    }

    /// Fail every action query whose range starts at or after `since`.
    pub fn failing_after(mut self, since: DateTime<Utc>) -> Self {
        self.fail_since = Some(since);
        self
    }

    pub fn calls(&self) -> Vec<ActionQuery> {
        self.calls.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<(String, CardUpdate)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn comments(&self) -> Vec<(String, String)> {
        self.comments.lock().unwrap().clone()
    }

    fn in_range(&self, at: DateTime<Utc>, query: &ActionQuery) -> bool {
        let after_since = query.since.map_or(true, |s| at >= s);
        let before_end = query
            .before
            .map_or(true, |b| if self.inclusive { at <= b } else { at < b });
        after_since && before_end
    }
}

pub fn action_at(id: &str, at: DateTime<Utc>) -> Action {
    Action {
        id: id.to_string(),
        kind: ActionType::CommentCard,
        date: at,
        id_member_creator: "m1".into(),
        member_creator: None,
        data: ActionData::default(),
    }
}

fn unsupported<T>() -> ApiResult<T> {
    Err(ApiError::Status {
        status: 501,
        text: "Not Implemented".into(),
    })
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "Mock"
    }

    async fn list_cards(&self, list_id: &str) -> ApiResult<Vec<Card>> {
        Ok(self
            .cards
            .iter()
            .filter(|c| c.id_list.as_deref() == Some(list_id))
            .cloned()
            .collect())
    }

    async fn board_cards(&self, _board_id: &str, _query: &CardQuery) -> ApiResult<Vec<Card>> {
        Ok(self.cards.clone())
    }

    async fn board_lists(&self, _board_id: &str) -> ApiResult<Vec<List>> {
        Ok(vec![])
    }

    async fn card_actions(&self, card_id: &str, query: &ActionQuery) -> ApiResult<Vec<Action>> {
        Ok(self
            .actions
            .iter()
            .filter(|a| a.card_id() == Some(card_id) && self.in_range(a.date, query))
            .cloned()
            .collect())
    }

    async fn board_actions(
        &self,
        _board_id: &str,
        query: &ActionQuery,
    ) -> ApiResult<Vec<Action>> {
        self.calls.lock().unwrap().push(query.clone());
        if let (Some(fail), Some(since)) = (self.fail_since, query.since) {
            if since >= fail {
                return Err(ApiError::Status {
                    status: 500,
                    text: "Internal Server Error".into(),
                });
            }
        }
        let mut matched: Vec<Action> = self
            .actions
            .iter()
            .filter(|a| self.in_range(a.date, query))
            .filter(|a| query.filter.is_empty() || query.filter.contains(&a.kind))
            .cloned()
            .collect();
        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }
        Ok(matched)
    }

    async fn board_members(&self, _board_id: &str) -> ApiResult<Vec<Member>> {
        Ok(vec![])
    }

    async fn board_labels(&self, _board_id: &str) -> ApiResult<Vec<Label>> {
        Ok(vec![])
    }

    async fn search_cards(&self, query: &str) -> ApiResult<Vec<Card>> {
        let needle = query.to_lowercase();
        Ok(self
            .cards
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn update_card(&self, card_id: &str, update: &CardUpdate) -> ApiResult<Card> {
        self.updates
            .lock()
            .unwrap()
            .push((card_id.to_string(), update.clone()));
        let mut card = self
            .cards
            .iter()
            .find(|c| c.id == card_id)
            .cloned()
            .ok_or(ApiError::Status {
                status: 404,
                text: "Not Found".into(),
            })?;
        if let Some(list) = &update.id_list {
            card.id_list = Some(list.clone());
        }
        if let Some(done) = update.due_complete {
            card.due_complete = done;
        }
        Ok(card)
    }

    async fn add_member(&self, _card_id: &str, _member_id: &str) -> ApiResult<()> {
        Ok(())
    }

    async fn remove_member(&self, _card_id: &str, _member_id: &str) -> ApiResult<()> {
        Ok(())
    }

    async fn add_label(&self, _card_id: &str, _label_id: &str) -> ApiResult<()> {
        Ok(())
    }

    async fn remove_label(&self, _card_id: &str, _label_id: &str) -> ApiResult<()> {
        Ok(())
    }

    async fn add_comment(&self, card_id: &str, text: &str) -> ApiResult<Action> {
        self.comments
            .lock()
            .unwrap()
            .push((card_id.to_string(), text.to_string()));
        Ok(action_at("comment", Utc::now()))
    }

    async fn list_webhooks(&self) -> ApiResult<Vec<Webhook>> {
        Ok(vec![])
    }

    async fn get_webhook(&self, _webhook_id: &str) -> ApiResult<Webhook> {
        unsupported()
    }

    async fn create_webhook(&self, _hook: &NewWebhook) -> ApiResult<Webhook> {
        unsupported()
    }

    async fn update_webhook(
        &self,
        _webhook_id: &str,
        _update: &WebhookUpdate,
    ) -> ApiResult<Webhook> {
        unsupported()
    }

    async fn delete_webhook(&self, _webhook_id: &str) -> ApiResult<()> {
        unsupported()
    }
}
