use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::model::card::Card;
use crate::model::member::MemberDirectory;

#[derive(Debug, Clone, Default)]
pub struct LabelPoints {
    points: HashMap<String, f64>,
}

impl LabelPoints {
    pub fn new(entries: impl IntoIterator<Item = (String, f64)>) -> Self {
        Self {
            points: entries.into_iter().collect(),
        }
    }

    pub fn points_for(&self, label: &str) -> Option<f64> {
        self.points.get(label).copied()
    }

    /// Sum over the card's labels that carry a point value.
    pub fn card_points(&self, card: &Card) -> f64 {
        card.label_names().filter_map(|l| self.points_for(l)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardRef {
    pub id: String,
    pub name: String,
    pub points: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
}

impl CardRef {
    fn new(card: &Card, points: f64, assignees: Vec<String>) -> Self {
        Self {
            id: card.id.clone(),
            name: card.name.clone(),
            points,
            assignees,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct KpiReport {
    /// Points credited per member id.
    pub totals: BTreeMap<String, f64>,
    /// Cards credited to each member id, with the share they received.
    pub credits: BTreeMap<String, Vec<CardRef>>,
    pub multi_assignee: Vec<CardRef>,
    pub unassigned: Vec<CardRef>,
}

impl KpiReport {
    #[cfg(test)]
    pub fn total_for(&self, member_id: &str) -> f64 {
        self.totals.get(member_id).copied().unwrap_or(0.0)
    }

    pub fn credit(&mut self, member_id: &str, card: &Card, share: f64) {
        *self.totals.entry(member_id.to_string()).or_insert(0.0) += share;
        self.credits
            .entry(member_id.to_string())
            .or_default()
            .push(CardRef::new(card, share, Vec::new()));
    }
}

/// Credits card points to directory members assigned to the card. One
/// qualifying assignee gets the full value, two split it, and cards with
/// three or more go to `multi_assignee` instead of the totals.
pub fn compute_kpi(
    cards: &[Card],
    points: &LabelPoints,
    directory: &MemberDirectory,
    role: Option<&str>,
) -> KpiReport {
    let qualifies = |id: &str| match role {
        Some(role) => directory.has_role(id, role),
        None => directory.contains(id),
    };

    let mut report = KpiReport::default();
    for profile in directory.profiles().filter(|p| qualifies(p.id.as_str())) {
        report.totals.insert(profile.id.clone(), 0.0);
    }

    for card in cards {
        let value = points.card_points(card);
        if value <= 0.0 {
            continue;
        }
        let mut assignees: Vec<String> = directory
            .profiles()
            .filter(|p| card.has_member(&p.id) && qualifies(p.id.as_str()))
            .map(|p| p.id.clone())
            .collect();
        assignees.sort();

        match assignees.as_slice() {
            [] => report.unassigned.push(CardRef::new(card, value, Vec::new())),
            [only] => report.credit(only, card, value),
            [first, second] => {
                report.credit(first, card, value / 2.0);
                report.credit(second, card, value / 2.0);
            }
            many => report
                .multi_assignee
                .push(CardRef::new(card, value, many.to_vec())),
        }
    }
    report
}
