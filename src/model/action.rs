use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionType {
    CreateCard,
    UpdateCard,
    AddMemberToCard,
    RemoveMemberFromCard,
    CommentCard,
    AddLabelToCard,
    RemoveLabelFromCard,
    DeleteCard,
    CopyCard,
    MoveCardToBoard,
    #[serde(other)]
    Other,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::CreateCard => "createCard",
            ActionType::UpdateCard => "updateCard",
            ActionType::AddMemberToCard => "addMemberToCard",
            ActionType::RemoveMemberFromCard => "removeMemberFromCard",
            ActionType::CommentCard => "commentCard",
            ActionType::AddLabelToCard => "addLabelToCard",
            ActionType::RemoveLabelFromCard => "removeLabelFromCard",
            ActionType::DeleteCard => "deleteCard",
            ActionType::CopyCard => "copyCard",
            ActionType::MoveCardToBoard => "moveCardToBoard",
            ActionType::Other => "other",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ref {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<Ref>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<Ref>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_before: Option<Ref>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_after: Option<Ref>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<Ref>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_member: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberCreator {
    pub id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActionType,
    pub date: DateTime<Utc>,
    pub id_member_creator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_creator: Option<MemberCreator>,
    #[serde(default)]
    pub data: ActionData,
}

impl Action {
    pub fn card_id(&self) -> Option<&str> {
        self.data.card.as_ref().map(|c| c.id.as_str())
    }

    /// Member the action was about, for member add/remove events.
    pub fn affected_member(&self) -> Option<&str> {
        self.data
            .id_member
            .as_deref()
            .or_else(|| self.data.member.as_ref().map(|m| m.id.as_str()))
    }

    pub fn is_list_move(&self) -> bool {
        self.kind == ActionType::UpdateCard
            && self.data.list_before.is_some()
            && self.data.list_after.is_some()
    }
}
