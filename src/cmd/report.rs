use anyhow::{bail, Context as _, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::ValueEnum;
use serde::Serialize;
use tracing::warn;

use crate::cli::Context;
use crate::model::action::Action;
use crate::model::card::Card;
use crate::model::member::MemberDirectory;
use crate::output::{format_points, print_json, print_table};
use crate::providers::CardQuery;
use crate::report::category::Movement;
use crate::report::daily::{day_shift_report, member_activity};
use crate::report::group::{
    by_actor, by_card, by_member, by_team, cards_by_label, cards_by_list, cards_by_member,
};
use crate::report::interval::{day_bounds, fetch_actions_or_empty, ActionWindow};
use crate::report::kpi::compute_kpi;
use crate::report::shift::ShiftView;

const UNGROUPED: &str = "(none)";

pub async fn shifts(ctx: &Context, date: Option<NaiveDate>, view: Option<ShiftView>) -> Result<()> {
    let config = &ctx.config;
    let offset = config.offset()?;
    let table = config.shift_table(view)?;
    let date = date.unwrap_or_else(|| Utc::now().with_timezone(&offset).date_naive());
    let (since, before) = day_bounds(date, &offset);

    let categories = config.list_categories();
    if categories.is_empty() {
        warn!("no [lists] configured, list movements are not tallied");
    }

    let window = fetch_window(ctx, since, before).await?;
    let report = day_shift_report(&window.actions, &table, &offset);
    let rows = report.summarize_day(date, &config.directory(), &categories);

    if ctx.json {
        return print_json(&serde_json::json!({
            "date": date,
            "truncated": window.truncated,
            "shifts": rows,
        }));
    }

    println!("{date} (UTC{offset})");
    print_table(
        &["Shift", "Window", "Actions", "Top member", "Movements"],
        rows.iter()
            .map(|r| {
                vec![
                    r.shift.clone(),
                    r.window.clone(),
                    r.actions.to_string(),
                    r.by_member
                        .iter()
                        .max_by_key(|(_, n)| *n)
                        .map(|(name, n)| format!("{name} ({n})"))
                        .unwrap_or_default(),
                    join_counts(&r.movements),
                ]
            })
            .collect(),
    );
    truncation_note(&window);
    Ok(())
}

/// Key for `members` aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActivityKey {
    /// Per-member breakdown with the attribution rule
    Member,
    /// Whoever performed the action
    Actor,
    Card,
    Team,
}

#[derive(Serialize)]
struct CountRow {
    key: String,
    name: String,
    actions: usize,
}

pub async fn members(
    ctx: &Context,
    since: Option<DateTime<Utc>>,
    before: Option<DateTime<Utc>>,
    by: ActivityKey,
) -> Result<()> {
    let before = before.unwrap_or_else(Utc::now);
    let since = since.unwrap_or(before - Duration::hours(24));
    if since >= before {
        bail!("--since ({since}) must be earlier than --before ({before})");
    }

    let config = &ctx.config;
    let window = fetch_window(ctx, since, before).await?;
    let directory = config.directory();

    if by != ActivityKey::Member {
        let rows = count_rows(&window.actions, by, &directory, &config.teams);
        if ctx.json {
            return print_json(&rows);
        }
        print_table(
            &["Key", "Name", "Actions"],
            rows.into_iter()
                .map(|r| vec![r.key, r.name, r.actions.to_string()])
                .collect(),
        );
        truncation_note(&window);
        return Ok(());
    }

    let rows = member_activity(&window.actions, &directory, &config.list_categories());
    if ctx.json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("No activity between {since} and {before}.");
        return Ok(());
    }
    print_table(
        &["Member", "Team", "Actions", "Created", "Comments", "Assigned", "Movements"],
        rows.iter()
            .map(|r| {
                vec![
                    r.name.clone(),
                    r.group.clone().unwrap_or_default(),
                    r.total.to_string(),
                    r.created.to_string(),
                    r.comments.to_string(),
                    r.assigned.to_string(),
                    join_counts(&r.movements),
                ]
            })
            .collect(),
    );
    truncation_note(&window);
    Ok(())
}

fn count_rows(
    actions: &[Action],
    by: ActivityKey,
    directory: &MemberDirectory,
    teams: &[String],
) -> Vec<CountRow> {
    let grouping = match by {
        ActivityKey::Member => by_member(actions),
        ActivityKey::Actor => by_actor(actions),
        ActivityKey::Card => by_card(actions),
        ActivityKey::Team => by_team(actions, directory, teams),
    };
    let mut rows: Vec<CountRow> = grouping
        .iter()
        .map(|(key, bucket)| {
            let name = match by {
                ActivityKey::Member | ActivityKey::Actor => directory.display_name(key).to_string(),
                ActivityKey::Card => bucket
                    .first()
                    .and_then(|a| a.data.card.as_ref())
                    .map(|c| c.name.clone())
                    .unwrap_or_default(),
                ActivityKey::Team => key.clone(),
            };
            CountRow {
                key: key.clone(),
                name,
                actions: bucket.len(),
            }
        })
        .collect();
    if by == ActivityKey::Team {
        // Configured teams in config order, then other directory groups by name
        rows.sort_by_key(|r| teams.iter().position(|t| *t == r.key).unwrap_or(teams.len()));
    } else {
        rows.sort_by(|a, b| b.actions.cmp(&a.actions).then_with(|| a.key.cmp(&b.key)));
    }
    rows
}

pub async fn kpi(ctx: &Context, list: &str, role: Option<&str>) -> Result<()> {
    let config = &ctx.config;
    let points = config.label_points();
    if points.is_empty() {
        warn!("no [points] configured, every card scores zero");
    }
    let cards = ctx
        .provider
        .list_cards(list)
        .await
        .with_context(|| format!("failed to load cards of list '{list}'"))?;

    let directory = config.directory();
    if directory.is_empty() {
        warn!("no [[members]] configured, every card is unassigned");
    }
    let report = compute_kpi(&cards, &points, &directory, role);

    if ctx.json {
        return print_json(&report);
    }

    let mut totals: Vec<(&String, &f64)> = report.totals.iter().collect();
    totals.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));
    print_table(
        &["Member", "Points", "Cards"],
        totals
            .into_iter()
            .map(|(id, pts)| {
                let cards = report.credits.get(id).map_or(0, Vec::len);
                vec![
                    directory.display_name(id).to_string(),
                    format_points(*pts),
                    cards.to_string(),
                ]
            })
            .collect(),
    );

    if !report.multi_assignee.is_empty() {
        println!("\nSkipped, three or more assignees:");
        for card in &report.multi_assignee {
            let names: Vec<&str> = card
                .assignees
                .iter()
                .map(|id| directory.display_name(id))
                .collect();
            println!("  {} [{}] {}", card.name, format_points(card.points), names.join(", "));
        }
    }
    if !report.unassigned.is_empty() {
        println!("\nNo qualifying assignee:");
        for card in &report.unassigned {
            println!("  {} [{}]", card.name, format_points(card.points));
        }
    }
    Ok(())
}

/// Key for `triage` grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CardKey {
    Label,
    List,
    Member,
}

#[derive(Serialize)]
struct TriageRow {
    key: String,
    open: usize,
    overdue: usize,
    cards: Vec<String>,
}

pub async fn triage(ctx: &Context, list: Option<&str>, by: CardKey) -> Result<()> {
    let cards = match list {
        Some(list) => ctx
            .provider
            .list_cards(list)
            .await
            .with_context(|| format!("failed to load cards of list '{list}'"))?,
        None => {
            let board_id = ctx.board_id()?;
            ctx.provider
                .board_cards(&board_id, &CardQuery::default())
                .await
                .context("failed to load board cards")?
        }
    };

    let rows = triage_rows(&cards, by, &ctx.config.directory(), Utc::now());
    if ctx.json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("No open cards.");
        return Ok(());
    }
    print_table(
        &["Group", "Open", "Overdue"],
        rows.iter()
            .map(|r| vec![r.key.clone(), r.open.to_string(), r.overdue.to_string()])
            .collect(),
    );
    Ok(())
}

/// Open cards grouped by `by`; cards without any key land in one extra row.
fn triage_rows(
    cards: &[Card],
    by: CardKey,
    directory: &MemberDirectory,
    now: DateTime<Utc>,
) -> Vec<TriageRow> {
    let open: Vec<Card> = cards.iter().filter(|c| !c.due_complete).cloned().collect();
    let overdue = |c: &&Card| c.due.is_some_and(|due| due < now);
    let row = |key: String, cards: &[Card]| TriageRow {
        key,
        open: cards.len(),
        overdue: cards.iter().filter(overdue).count(),
        cards: cards.iter().map(|c| c.name.clone()).collect(),
    };

    let grouping = match by {
        CardKey::Label => cards_by_label(&open),
        CardKey::List => cards_by_list(&open),
        CardKey::Member => cards_by_member(&open),
    };
    let mut rows: Vec<TriageRow> = grouping
        .iter()
        .map(|(key, cards)| {
            let key = match by {
                CardKey::Member => directory.display_name(key).to_string(),
                CardKey::Label | CardKey::List => key.clone(),
            };
            row(key, cards)
        })
        .collect();

    let ungrouped: Vec<Card> = open
        .iter()
        .filter(|c| match by {
            CardKey::Label => c.label_names().next().is_none(),
            CardKey::List => c.id_list.is_none(),
            CardKey::Member => c.id_members.is_empty(),
        })
        .cloned()
        .collect();
    if !ungrouped.is_empty() {
        rows.push(row(UNGROUPED.to_string(), &ungrouped));
    }
    rows.sort_by(|a, b| b.open.cmp(&a.open).then_with(|| a.key.cmp(&b.key)));
    rows
}

/// Read failures are logged and reported as an empty window.
async fn fetch_window(
    ctx: &Context,
    since: DateTime<Utc>,
    before: DateTime<Utc>,
) -> Result<ActionWindow> {
    let board_id = ctx.board_id()?;
    Ok(fetch_actions_or_empty(
        ctx.provider.as_ref(),
        &board_id,
        since,
        before,
        &ctx.config.fetch_options(),
    )
    .await)
}

fn truncation_note(window: &ActionWindow) {
    if window.truncated {
        eprintln!("warning: the upstream action cap was reached, counts are incomplete");
    }
}

fn join_counts(counts: &[(Movement, usize)]) -> String {
    counts
        .iter()
        .map(|(what, n)| format!("{what} {n}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::action::{ActionData, ActionType, Ref};
    use crate::model::card::Label;
    use crate::model::member::MemberProfile;
    use crate::report::category::Category;
    use chrono::TimeZone;

    fn card(id: &str, labels: &[&str], due: Option<DateTime<Utc>>, done: bool) -> Card {
        Card {
            id: id.into(),
            name: format!("card {id}"),
            desc: String::new(),
            id_list: Some("l1".into()),
            id_board: None,
            id_members: Vec::new(),
            labels: labels
                .iter()
                .map(|name| Label {
                    id: format!("lb-{name}"),
                    name: name.to_string(),
                    color: None,
                })
                .collect(),
            due,
            due_complete: done,
            short_url: None,
            date_last_activity: None,
        }
    }

    fn action(id: &str, actor: &str, card: &str) -> Action {
        Action {
            id: id.into(),
            kind: ActionType::CommentCard,
            date: Utc.with_ymd_and_hms(2024, 5, 2, 3, 0, 0).unwrap(),
            id_member_creator: actor.into(),
            member_creator: None,
            data: ActionData {
                card: Some(Ref {
                    id: card.into(),
                    name: format!("Card {card}"),
                }),
                ..ActionData::default()
            },
        }
    }

    fn directory() -> MemberDirectory {
        MemberDirectory::new([MemberProfile {
            id: "m1".into(),
            name: "An".into(),
            role: None,
            group: Some("Team A".into()),
        }])
    }

    #[test]
    fn triage_counts_open_and_overdue_per_label() {
        let now = Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap();
        let yesterday = Some(now - Duration::days(1));
        let tomorrow = Some(now + Duration::days(1));
        let cards = vec![
            card("c1", &["bug"], yesterday, false),
            card("c2", &["bug"], tomorrow, false),
            card("c3", &["bug"], yesterday, true),
            card("c4", &["feature", "bug"], None, false),
            card("c5", &[], yesterday, false),
        ];

        let rows = triage_rows(&cards, CardKey::Label, &directory(), now);
        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["bug", UNGROUPED, "feature"]);

        assert_eq!(rows[0].open, 3);
        assert_eq!(rows[0].overdue, 1);
        assert_eq!(rows[1].open, 1);
        assert_eq!(rows[1].overdue, 1);
        assert_eq!(rows[2].cards, vec!["card c4"]);
    }

    #[test]
    fn triage_by_member_uses_directory_names() {
        let now = Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap();
        let mut assigned = card("c1", &[], None, false);
        assigned.id_members = vec!["m1".into(), "m9".into()];
        let cards = vec![assigned, card("c2", &[], None, false)];

        let rows = triage_rows(&cards, CardKey::Member, &directory(), now);
        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec![UNGROUPED, "An", "m9"]);
        assert!(rows.iter().all(|r| r.open == 1));
    }

    #[test]
    fn counts_by_actor_and_card() {
        let actions = vec![
            action("a1", "m1", "c1"),
            action("a2", "m1", "c2"),
            action("a3", "m2", "c1"),
        ];
        let teams = vec!["Team A".to_string(), "Team B".to_string()];

        let by_actor = count_rows(&actions, ActivityKey::Actor, &directory(), &teams);
        assert_eq!(by_actor[0].name, "An");
        assert_eq!(by_actor[0].actions, 2);
        assert_eq!(by_actor[1].key, "m2");

        let by_card = count_rows(&actions, ActivityKey::Card, &directory(), &teams);
        assert_eq!(by_card[0].key, "c1");
        assert_eq!(by_card[0].name, "Card c1");
        assert_eq!(by_card[0].actions, 2);

        let by_team = count_rows(&actions, ActivityKey::Team, &directory(), &teams);
        let teams: Vec<(&str, usize)> =
            by_team.iter().map(|r| (r.key.as_str(), r.actions)).collect();
        assert_eq!(teams, vec![("Team A", 2), ("Team B", 0)]);
    }

    #[test]
    fn team_rows_follow_configured_order() {
        let directory = MemberDirectory::new([
            MemberProfile {
                id: "m1".into(),
                name: "An".into(),
                role: None,
                group: Some("Web".into()),
            },
            MemberProfile {
                id: "m2".into(),
                name: "Binh".into(),
                role: None,
                group: Some("Backend".into()),
            },
        ]);
        let actions = vec![action("a1", "m1", "c1"), action("a2", "m2", "c1")];
        let teams = vec!["Web".to_string(), "Mobile".to_string()];

        let rows = count_rows(&actions, ActivityKey::Team, &directory, &teams);
        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["Web", "Mobile", "Backend"]);
        assert_eq!(rows[1].actions, 0);
    }

    #[test]
    fn counts_join_in_order() {
        let counts = vec![
            (Movement::MovedInto(Category::Done), 2),
            (Movement::LeftFrom(Category::Doing), 1),
        ];
        assert_eq!(join_counts(&counts), "moved to done 2, left doing 1");
        assert_eq!(join_counts(&[]), "");
    }
}
