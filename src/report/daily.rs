use chrono::{FixedOffset, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use super::category::{ListCategories, Movement};
use super::group::{by_day, by_member, by_shift, sort_by_date, Grouping};
use super::shift::{Shift, ShiftTable};
use crate::model::action::{Action, ActionType};
use crate::model::member::MemberDirectory;

/// Actions bucketed by local day, then by shift. Every shift of a day that
/// has any action gets a row, empty or not.
#[derive(Debug, Clone)]
pub struct DayShiftReport {
    pub table: ShiftTable,
    pub days: BTreeMap<NaiveDate, Grouping<usize, Action>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShiftSummary {
    pub date: NaiveDate,
    pub shift: String,
    pub window: String,
    pub actions: usize,
    pub by_member: Vec<(String, usize)>,
    pub movements: Vec<(Movement, usize)>,
}

pub fn day_shift_report(
    actions: &[Action],
    table: &ShiftTable,
    offset: &FixedOffset,
) -> DayShiftReport {
    let days = by_day(actions, offset)
        .into_inner()
        .into_iter()
        .map(|(date, day_actions)| {
            let mut shifts = by_shift(&day_actions, table, offset);
            shifts.seed(0..table.len());
            for (_, bucket) in shifts.iter_mut() {
                sort_by_date(bucket);
            }
            (date, shifts)
        })
        .collect();
    DayShiftReport {
        table: table.clone(),
        days,
    }
}

impl DayShiftReport {
    pub fn shift(&self, index: usize) -> Option<&Shift> {
        self.table.shifts().get(index)
    }

    #[cfg(test)]
    pub fn actions_in(&self, date: NaiveDate, shift: usize) -> &[Action] {
        self.days.get(&date).map(|g| g.get(&shift)).unwrap_or(&[])
    }

    pub fn total(&self) -> usize {
        self.days.values().map(Grouping::total).sum()
    }

    pub fn summarize(
        &self,
        directory: &MemberDirectory,
        categories: &ListCategories,
    ) -> Vec<ShiftSummary> {
        let mut rows = Vec::new();
        for (date, shifts) in &self.days {
            for (index, actions) in shifts.iter() {
                let Some(shift) = self.shift(*index) else {
                    continue;
                };
                let by_member = by_member(actions)
                    .counts()
                    .into_iter()
                    .map(|(id, n)| (directory.display_name(&id).to_string(), n))
                    .collect();
                let movements = categories.tally(actions.iter()).into_iter().collect();
                rows.push(ShiftSummary {
                    date: *date,
                    shift: shift.label.clone(),
                    window: shift.window(),
                    actions: shifts.count(index),
                    by_member,
                    movements,
                });
            }
        }
        rows
    }

    /// One row per shift of `date`, zero rows included.
    pub fn summarize_day(
        &self,
        date: NaiveDate,
        directory: &MemberDirectory,
        categories: &ListCategories,
    ) -> Vec<ShiftSummary> {
        let rows: Vec<ShiftSummary> = self
            .summarize(directory, categories)
            .into_iter()
            .filter(|r| r.date == date)
            .collect();
        if !rows.is_empty() {
            return rows;
        }
        self.table
            .shifts()
            .iter()
            .map(|s| ShiftSummary::empty(date, s))
            .collect()
    }
}

impl ShiftSummary {
    pub fn empty(date: NaiveDate, shift: &Shift) -> Self {
        Self {
            date,
            shift: shift.label.clone(),
            window: shift.window(),
            actions: 0,
            by_member: Vec::new(),
            movements: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberActivity {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub total: usize,
    pub created: usize,
    pub comments: usize,
    pub assigned: usize,
    pub movements: Vec<(Movement, usize)>,
}

/// Per-member activity, busiest first.
pub fn member_activity(
    actions: &[Action],
    directory: &MemberDirectory,
    categories: &ListCategories,
) -> Vec<MemberActivity> {
    let count = |bucket: &[Action], kind: ActionType| bucket.iter().filter(|a| a.kind == kind).count();

    let mut rows: Vec<MemberActivity> = by_member(actions)
        .into_inner()
        .into_iter()
        .map(|(id, bucket)| MemberActivity {
            name: directory.display_name(&id).to_string(),
            group: directory.group_of(&id).map(String::from),
            total: bucket.len(),
            created: count(bucket.as_slice(), ActionType::CreateCard),
            comments: count(bucket.as_slice(), ActionType::CommentCard),
            assigned: count(bucket.as_slice(), ActionType::AddMemberToCard),
            movements: categories.tally(bucket.iter()).into_iter().collect(),
            id,
        })
        .collect();
    rows.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
    rows
}
