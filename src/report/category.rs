use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::model::action::{Action, ActionType};

/// Workflow stage a list stands for, configured per list id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Todo,
    Doing,
    WaitingToFix,
    Review,
    Done,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Todo => "todo",
            Category::Doing => "doing",
            Category::WaitingToFix => "waiting to fix",
            Category::Review => "review",
            Category::Done => "done",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "category", rename_all = "snake_case")]
pub enum Movement {
    Created(Category),
    MovedInto(Category),
    LeftFrom(Category),
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Movement::Created(c) => write!(f, "created in {c}"),
            Movement::MovedInto(c) => write!(f, "moved to {c}"),
            Movement::LeftFrom(c) => write!(f, "left {c}"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListCategories {
    by_list: HashMap<String, Category>,
}

impl ListCategories {
    pub fn new(entries: impl IntoIterator<Item = (String, Category)>) -> Self {
        Self {
            by_list: entries.into_iter().collect(),
        }
    }

    pub fn category_of(&self, list_id: &str) -> Option<Category> {
        self.by_list.get(list_id).copied()
    }

    #[cfg(test)]
    pub fn lists_in(&self, category: Category) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .by_list
            .iter()
            .filter(|(_, c)| **c == category)
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort();
        ids
    }

    /// Unmapped lists never produce a movement. The destination wins when
    /// both ends of a move are mapped.
    pub fn classify_action(&self, action: &Action) -> Option<Movement> {
        if action.is_list_move() {
            let after = action.data.list_after.as_ref()?;
            let before = action.data.list_before.as_ref()?;
            return self
                .category_of(&after.id)
                .map(Movement::MovedInto)
                .or_else(|| self.category_of(&before.id).map(Movement::LeftFrom));
        }
        if action.kind == ActionType::CreateCard {
            let list = action.data.list.as_ref()?;
            return self.category_of(&list.id).map(Movement::Created);
        }
        None
    }

    pub fn tally<'a>(
        &self,
        actions: impl IntoIterator<Item = &'a Action>,
    ) -> BTreeMap<Movement, usize> {
        let mut counts = BTreeMap::new();
        for action in actions {
            if let Some(movement) = self.classify_action(action) {
                *counts.entry(movement).or_insert(0) += 1;
            }
        }
        counts
    }

    pub fn is_empty(&self) -> bool {
        self.by_list.is_empty()
    }
}
