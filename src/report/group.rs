use chrono::{FixedOffset, NaiveDate};
use std::collections::{BTreeMap, HashSet};

use super::shift::ShiftTable;
use crate::model::action::{Action, ActionType};
use crate::model::card::Card;
use crate::model::member::MemberDirectory;

/// Ordered mapping from key to the records that matched it. Keys with no
/// records are absent unless explicitly seeded.
#[derive(Debug, Clone)]
pub struct Grouping<K: Ord, T> {
    buckets: BTreeMap<K, Vec<T>>,
}

impl<K: Ord, T> Default for Grouping<K, T> {
    fn default() -> Self {
        Self {
            buckets: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone, T> Grouping<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: K, record: T) {
        self.buckets.entry(key).or_default().push(record);
    }

    /// Guarantees a (possibly empty) bucket for each key.
    pub fn seed(&mut self, keys: impl IntoIterator<Item = K>) {
        for key in keys {
            self.buckets.entry(key).or_default();
        }
    }

    pub fn get(&self, key: &K) -> &[T] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, key: &K) -> usize {
        self.get(key).len()
    }

    pub fn counts(&self) -> Vec<(K, usize)> {
        self.buckets
            .iter()
            .map(|(k, v)| (k.clone(), v.len()))
            .collect()
    }

    /// Number of records across all buckets, with multiplicity.
    pub fn total(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    #[cfg(test)]
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.buckets.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &Vec<T>)> {
        self.buckets.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut Vec<T>)> {
        self.buckets.iter_mut()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn into_inner(self) -> BTreeMap<K, Vec<T>> {
        self.buckets
    }
}

/// Groups records under every key `key_fn` yields. Records without a key are
/// dropped; a record yielding the same key twice lands in that bucket once.
pub fn group_by<T, K, I, F>(records: &[T], key_fn: F) -> Grouping<K, T>
where
    T: Clone,
    K: Ord + Clone,
    I: IntoIterator<Item = K>,
    F: Fn(&T) -> I,
{
    let mut grouping = Grouping::new();
    for record in records {
        let mut keys: Vec<K> = key_fn(record).into_iter().collect();
        keys.sort();
        keys.dedup();
        for key in keys {
            grouping.push(key, record.clone());
        }
    }
    grouping
}

pub fn by_actor(actions: &[Action]) -> Grouping<String, Action> {
    group_by(actions, |a| Some(a.id_member_creator.clone()))
}

pub fn by_card(actions: &[Action]) -> Grouping<String, Action> {
    group_by(actions, |a| a.card_id().map(String::from))
}

pub fn by_day(actions: &[Action], offset: &FixedOffset) -> Grouping<NaiveDate, Action> {
    group_by(actions, |a| Some(a.date.with_timezone(offset).date_naive()))
}

/// Keyed by shift index so buckets sort in table order.
pub fn by_shift(
    actions: &[Action],
    table: &ShiftTable,
    offset: &FixedOffset,
) -> Grouping<usize, Action> {
    group_by(actions, |a| Some(table.classify(a.date, offset).index))
}

/// Members an action is attributed to: always the actor, plus the affected
/// member of an `addMemberToCard` when that is someone else.
pub fn attributed_members(action: &Action) -> Vec<String> {
    let mut members = vec![action.id_member_creator.clone()];
    if action.kind == ActionType::AddMemberToCard {
        if let Some(affected) = action.affected_member() {
            if affected != action.id_member_creator {
                members.push(affected.to_string());
            }
        }
    }
    members
}

/// Like `group_by(actions, attributed_members)`, but also de-duplicates by
/// action id so a repeated record never counts twice for one member.
pub fn by_member(actions: &[Action]) -> Grouping<String, Action> {
    let mut grouping = Grouping::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();
    for action in actions {
        for member in attributed_members(action) {
            if seen.insert((member.clone(), action.id.clone())) {
                grouping.push(member, action.clone());
            }
        }
    }
    grouping
}

/// Groups by the actor's team; actors missing from the directory are dropped.
pub fn by_team(
    actions: &[Action],
    directory: &MemberDirectory,
    teams: &[String],
) -> Grouping<String, Action> {
    let mut grouping = group_by(actions, |a| {
        directory.group_of(&a.id_member_creator).map(String::from)
    });
    grouping.seed(teams.iter().cloned());
    grouping
}

pub fn cards_by_list(cards: &[Card]) -> Grouping<String, Card> {
    group_by(cards, |c| c.id_list.clone())
}

pub fn cards_by_label(cards: &[Card]) -> Grouping<String, Card> {
    group_by(cards, |c| c.label_names().map(String::from).collect::<Vec<_>>())
}

pub fn cards_by_member(cards: &[Card]) -> Grouping<String, Card> {
    group_by(cards, |c| c.id_members.clone())
}

pub fn sort_by_date(actions: &mut [Action]) {
    actions.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
}
