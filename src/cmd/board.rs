use anyhow::{Context as _, Result};
use serde::Serialize;

use crate::cli::Context;
use crate::model::card::{Label, List};
use crate::model::member::{Member, MemberDirectory};
use crate::output::{format_points, print_json, print_table};
use crate::report::category::ListCategories;
use crate::report::kpi::LabelPoints;

#[derive(Serialize)]
struct ListRow {
    id: String,
    name: String,
    category: Option<String>,
}

pub async fn lists(ctx: &Context) -> Result<()> {
    let board_id = ctx.board_id()?;
    let lists = ctx
        .provider
        .board_lists(&board_id)
        .await
        .context("failed to load board lists")?;

    let rows = list_rows(&lists, &ctx.config.list_categories());
    if ctx.json {
        return print_json(&rows);
    }
    print_table(
        &["ID", "Name", "Category"],
        rows.into_iter()
            .map(|r| vec![r.id, r.name, r.category.unwrap_or_default()])
            .collect(),
    );
    Ok(())
}

fn list_rows(lists: &[List], categories: &ListCategories) -> Vec<ListRow> {
    lists
        .iter()
        .filter(|l| !l.closed)
        .map(|l| ListRow {
            id: l.id.clone(),
            name: l.name.clone(),
            category: categories.category_of(&l.id).map(|c| c.to_string()),
        })
        .collect()
}

#[derive(Serialize)]
struct LabelRow {
    id: String,
    name: String,
    color: Option<String>,
    points: Option<f64>,
}

pub async fn labels(ctx: &Context) -> Result<()> {
    let board_id = ctx.board_id()?;
    let labels = ctx
        .provider
        .board_labels(&board_id)
        .await
        .context("failed to load board labels")?;

    let rows = label_rows(&labels, &ctx.config.label_points());
    if ctx.json {
        return print_json(&rows);
    }
    print_table(
        &["ID", "Name", "Color", "Points"],
        rows.into_iter()
            .map(|r| {
                vec![
                    r.id,
                    r.name,
                    r.color.unwrap_or_default(),
                    r.points.map(format_points).unwrap_or_default(),
                ]
            })
            .collect(),
    );
    Ok(())
}

fn label_rows(labels: &[Label], points: &LabelPoints) -> Vec<LabelRow> {
    labels
        .iter()
        .map(|l| LabelRow {
            id: l.id.clone(),
            name: l.name.clone(),
            color: l.color.clone(),
            points: points.points_for(&l.name),
        })
        .collect()
}

#[derive(Serialize)]
struct RosterRow {
    id: String,
    username: String,
    name: String,
    role: Option<String>,
    team: Option<String>,
    on_board: bool,
}

pub async fn roster(ctx: &Context) -> Result<()> {
    let board_id = ctx.board_id()?;
    let members = ctx
        .provider
        .board_members(&board_id)
        .await
        .context("failed to load board members")?;

    let rows = roster_rows(&members, &ctx.config.directory());
    if ctx.json {
        return print_json(&rows);
    }
    print_table(
        &["ID", "Username", "Name", "Role", "Team", "On board"],
        rows.into_iter()
            .map(|r| {
                vec![
                    r.id,
                    r.username,
                    r.name,
                    r.role.unwrap_or_default(),
                    r.team.unwrap_or_default(),
                    if r.on_board { "yes" } else { "no" }.to_string(),
                ]
            })
            .collect(),
    );
    Ok(())
}

/// Board members first, then directory entries the board no longer has.
fn roster_rows(members: &[Member], directory: &MemberDirectory) -> Vec<RosterRow> {
    let mut rows: Vec<RosterRow> = members
        .iter()
        .map(|m| {
            let profile = directory.get(&m.id);
            RosterRow {
                id: m.id.clone(),
                username: m.username.clone(),
                name: profile
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| m.full_name.clone()),
                role: profile.and_then(|p| p.role.clone()),
                team: profile.and_then(|p| p.group.clone()),
                on_board: true,
            }
        })
        .collect();

    let mut missing: Vec<RosterRow> = directory
        .profiles()
        .filter(|p| !members.iter().any(|m| m.id == p.id))
        .map(|p| RosterRow {
            id: p.id.clone(),
            username: String::new(),
            name: p.name.clone(),
            role: p.role.clone(),
            team: p.group.clone(),
            on_board: false,
        })
        .collect();
    missing.sort_by(|a, b| a.name.cmp(&b.name));
    rows.extend(missing);
    rows
}
