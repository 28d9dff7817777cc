use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use futures::future::{try_join_all, BoxFuture, FutureExt};
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::model::action::{Action, ActionType};
use crate::providers::{ActionQuery, ApiResult, Provider, ACTION_PAGE_LIMIT};

pub const SPLIT_PARTS: u32 = 4;

/// Spans shorter than this are never split further.
const MIN_SPLIT_MS: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub since: DateTime<Utc>,
    pub before: DateTime<Utc>,
}

impl Interval {
    pub fn duration(&self) -> Duration {
        self.before - self.since
    }
}

/// Splits `[since, before]` into `parts` contiguous sub-intervals of equal
/// width (to the millisecond). Neighbours share their boundary instant and the
/// last one ends exactly at `before`.
pub fn split_interval(
    since: DateTime<Utc>,
    before: DateTime<Utc>,
    parts: u32,
) -> Option<Vec<Interval>> {
    if parts == 0 || since >= before {
        return None;
    }
    let total = (before - since).num_milliseconds();
    let boundary = |i: u32| {
        if i == parts {
            before
        } else {
            since + Duration::milliseconds(total * i64::from(i) / i64::from(parts))
        }
    };
    Some(
        (0..parts)
            .map(|i| Interval {
                since: boundary(i),
                before: boundary(i + 1),
            })
            .collect(),
    )
}

/// Local calendar day `[00:00, 24:00)` at `offset`, in UTC.
pub fn day_bounds(date: NaiveDate, offset: &FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
    let midnight = date.and_time(NaiveTime::default());
    let start = midnight.and_utc() - Duration::seconds(i64::from(offset.local_minus_utc()));
    (start, start + Duration::days(1))
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub parts: u32,
    /// How many extra rounds of splitting a capped sub-interval may get.
    pub max_depth: u32,
    pub cap: usize,
    pub filter: Vec<ActionType>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            parts: SPLIT_PARTS,
            max_depth: 3,
            cap: ACTION_PAGE_LIMIT,
            filter: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ActionWindow {
    pub actions: Vec<Action>,
    /// Set when some sub-interval still hit the cap at the maximum depth.
    pub truncated: bool,
    pub requests: usize,
}

/// Fetches every board action in `[since, before)` by splitting the range into
/// concurrent sub-fetches. Any failed sub-fetch fails the whole call.
pub async fn fetch_actions_between(
    provider: &dyn Provider,
    board_id: &str,
    since: DateTime<Utc>,
    before: DateTime<Utc>,
    opts: &FetchOptions,
) -> ApiResult<ActionWindow> {
    let span = Interval { since, before };
    if span.duration() <= Duration::zero() {
        return Ok(ActionWindow::default());
    }

    debug!(provider = provider.name(), board_id, %since, %before, "fetching actions");
    let mut window = fetch_span(provider, board_id, span, 0, opts).await?;

    let before_dedup = window.actions.len();
    let mut seen = HashSet::new();
    window.actions.retain(|a| seen.insert(a.id.clone()));
    if window.actions.len() != before_dedup {
        debug!(
            dropped = before_dedup - window.actions.len(),
            "dropped boundary duplicates"
        );
    }
    if window.truncated {
        warn!(
            board_id,
            %since,
            %before,
            "action window truncated at the upstream cap; results are incomplete"
        );
    }
    Ok(window)
}

/// Soft variant: logs the failure and hands back an empty window.
pub async fn fetch_actions_or_empty(
    provider: &dyn Provider,
    board_id: &str,
    since: DateTime<Utc>,
    before: DateTime<Utc>,
    opts: &FetchOptions,
) -> ActionWindow {
    match fetch_actions_between(provider, board_id, since, before, opts).await {
        Ok(window) => window,
        Err(e) => {
            warn!(error = %e, board_id, "action fetch failed, showing empty window");
            ActionWindow::default()
        }
    }
}

fn fetch_span<'a>(
    provider: &'a dyn Provider,
    board_id: &'a str,
    span: Interval,
    depth: u32,
    opts: &'a FetchOptions,
) -> BoxFuture<'a, ApiResult<ActionWindow>> {
    async move {
        let parts = split_interval(span.since, span.before, opts.parts).unwrap_or_else(|| vec![span]);
        let windows = try_join_all(
            parts
                .into_iter()
                .map(|part| fetch_part(provider, board_id, part, depth, opts)),
        )
        .await?;

        let mut merged = ActionWindow::default();
        for w in windows {
            merged.actions.extend(w.actions);
            merged.truncated |= w.truncated;
            merged.requests += w.requests;
        }
        Ok(merged)
    }
    .boxed()
}

fn fetch_part<'a>(
    provider: &'a dyn Provider,
    board_id: &'a str,
    part: Interval,
    depth: u32,
    opts: &'a FetchOptions,
) -> BoxFuture<'a, ApiResult<ActionWindow>> {
    async move {
        let query = ActionQuery::between(part.since, part.before)
            .with_filter(opts.filter.clone())
            .with_limit(opts.cap);
        let actions = provider.board_actions(board_id, &query).await?;

        if actions.len() < opts.cap {
            return Ok(ActionWindow {
                actions,
                truncated: false,
                requests: 1,
            });
        }
        if depth >= opts.max_depth || part.duration().num_milliseconds() < MIN_SPLIT_MS {
            return Ok(ActionWindow {
                actions,
                truncated: true,
                requests: 1,
            });
        }

        debug!(depth, since = %part.since, before = %part.before, "cap reached, splitting again");
        let mut inner = fetch_span(provider, board_id, part, depth + 1, opts).await?;
        inner.requests += 1;
        Ok(inner)
    }
    .boxed()
}
