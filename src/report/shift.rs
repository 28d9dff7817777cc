use chrono::{DateTime, FixedOffset, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Granularity of the built-in shift tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ShiftView {
    /// Six shifts of four hours.
    #[default]
    Coarse,
    /// Eight shifts of three hours.
    Fine,
}

impl ShiftView {
    pub fn toggle(self) -> Self {
        match self {
            ShiftView::Coarse => ShiftView::Fine,
            ShiftView::Fine => ShiftView::Coarse,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftView::Coarse => "coarse",
            ShiftView::Fine => "fine",
        }
    }

    fn hours_per_shift(self) -> u32 {
        match self {
            ShiftView::Coarse => 4,
            ShiftView::Fine => 3,
        }
    }
}

/// Shift as written in the config file, with `HH:MM` bounds.
#[derive(Debug, Clone, Deserialize)]
pub struct ShiftDef {
    pub label: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shift {
    pub index: usize,
    pub label: String,
    /// Minute of day, inclusive.
    pub start: u32,
    /// Minute of day, exclusive.
    pub end: u32,
}

impl Shift {
    pub fn contains(&self, minute: u32) -> bool {
        self.start <= minute && minute < self.end
    }

    pub fn window(&self) -> String {
        format!("{}-{}", format_minute(self.start), format_minute(self.end))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShiftTableError {
    #[error("shift table is empty")]
    Empty,
    #[error("invalid time {0:?}, expected HH:MM between 00:00 and 24:00")]
    BadTime(String),
    #[error("shift {label} is empty or reversed")]
    EmptyInterval { label: String },
    #[error("shift {label} starts at {found}, expected {expected}")]
    NotContiguous {
        label: String,
        expected: String,
        found: String,
    },
    #[error("shift table ends at {0}, expected 24:00")]
    NotExhaustive(String),
}

/// Ordered partition of the day into shifts. Every minute of the day falls
/// into exactly one shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftTable {
    shifts: Vec<Shift>,
}

impl ShiftTable {
    pub fn builtin(view: ShiftView) -> Self {
        let step = view.hours_per_shift() * 60;
        let shifts = (0..MINUTES_PER_DAY / step)
            .map(|i| Shift {
                index: i as usize,
                label: format!("Ca {}", i + 1),
                start: i * step,
                end: (i + 1) * step,
            })
            .collect();
        Self { shifts }
    }

    pub fn new(
        entries: impl IntoIterator<Item = (String, u32, u32)>,
    ) -> Result<Self, ShiftTableError> {
        let mut shifts = Vec::new();
        let mut expected = 0;
        for (index, (label, start, end)) in entries.into_iter().enumerate() {
            if start >= end {
                return Err(ShiftTableError::EmptyInterval { label });
            }
            if start != expected {
                return Err(ShiftTableError::NotContiguous {
                    label,
                    expected: format_minute(expected),
                    found: format_minute(start),
                });
            }
            expected = end;
            shifts.push(Shift {
                index,
                label,
                start,
                end,
            });
        }
        if shifts.is_empty() {
            return Err(ShiftTableError::Empty);
        }
        if expected != MINUTES_PER_DAY {
            return Err(ShiftTableError::NotExhaustive(format_minute(expected)));
        }
        Ok(Self { shifts })
    }

    pub fn from_defs(defs: &[ShiftDef]) -> Result<Self, ShiftTableError> {
        let entries = defs
            .iter()
            .map(|d| Ok((d.label.clone(), parse_minute(&d.start)?, parse_minute(&d.end)?)))
            .collect::<Result<Vec<_>, ShiftTableError>>()?;
        Self::new(entries)
    }

    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    pub fn len(&self) -> usize {
        self.shifts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }

    /// Total over all minute values; values past the end of the day wrap.
    pub fn classify_minute(&self, minute: u32) -> &Shift {
        let minute = minute % MINUTES_PER_DAY;
        let idx = self.shifts.partition_point(|s| s.end <= minute);
        &self.shifts[idx.min(self.shifts.len() - 1)]
    }

    pub fn classify(&self, at: DateTime<Utc>, offset: &FixedOffset) -> &Shift {
        let local = at.with_timezone(offset);
        self.classify_minute(local.hour() * 60 + local.minute())
    }
}

pub fn parse_minute(s: &str) -> Result<u32, ShiftTableError> {
    let bad = || ShiftTableError::BadTime(s.to_string());
    let (h, m) = s.trim().split_once(':').ok_or_else(bad)?;
    let h: u32 = h.parse().map_err(|_| bad())?;
    let m: u32 = m.parse().map_err(|_| bad())?;
    if m >= 60 || h > 24 {
        return Err(bad());
    }
    let minute = h * 60 + m;
    if minute > MINUTES_PER_DAY {
        return Err(bad());
    }
    Ok(minute)
}

pub fn format_minute(minute: u32) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}
