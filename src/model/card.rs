use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_list: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_board: Option<String>,
    #[serde(default)]
    pub id_members: Vec<String>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_last_activity: Option<DateTime<Utc>>,
}

impl Card {
    pub fn label_names(&self) -> impl Iterator<Item = &str> {
        self.labels
            .iter()
            .map(|l| l.name.as_str())
            .filter(|n| !n.is_empty())
    }

    pub fn has_member(&self, member_id: &str) -> bool {
        self.id_members.iter().any(|m| m == member_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct List {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub closed: bool,
}

/// Partial card update; only the fields that are `Some` are sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardUpdate {
    pub name: Option<String>,
    pub desc: Option<String>,
    pub due: Option<DateTime<Utc>>,
    pub due_complete: Option<bool>,
    pub id_list: Option<String>,
}

impl CardUpdate {
    pub fn move_to(list_id: impl Into<String>) -> Self {
        Self {
            id_list: Some(list_id.into()),
            ..Self::default()
        }
    }

    pub fn complete() -> Self {
        Self {
            due_complete: Some(true),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(name) = &self.name {
            params.push(("name", name.clone()));
        }
        if let Some(desc) = &self.desc {
            params.push(("desc", desc.clone()));
        }
        if let Some(due) = &self.due {
            params.push(("due", due.to_rfc3339()));
        }
        if let Some(done) = self.due_complete {
            params.push(("dueComplete", done.to_string()));
        }
        if let Some(list) = &self.id_list {
            params.push(("idList", list.clone()));
        }
        params
    }
}
