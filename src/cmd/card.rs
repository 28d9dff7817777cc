use anyhow::{bail, Context as _, Result};
use chrono::{DateTime, Utc};
use clap::{Subcommand, ValueEnum};

use crate::cli::Context;
use crate::model::action::{Action, ActionType};
use crate::model::card::CardUpdate;
use crate::model::member::MemberDirectory;
use crate::output::{print_json, print_table};
use crate::providers::ActionQuery;

#[derive(Subcommand, Debug)]
pub enum CardSubcommand {
    /// Move a card to another list
    Move { card: String, list: String },
    /// Comment on a card
    Comment { card: String, text: String },
    /// Mark a card's due date complete
    Complete { card: String },
    /// Add or remove a member on a card
    Member {
        #[arg(value_enum)]
        edit: Edit,
        card: String,
        member: String,
    },
    /// Add or remove a label on a card (label id or name)
    Label {
        #[arg(value_enum)]
        edit: Edit,
        card: String,
        label: String,
    },
    /// Change a card's name, description or due date
    Update {
        card: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        /// RFC 3339 due date
        #[arg(long)]
        due: Option<DateTime<Utc>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Edit {
    Add,
    Remove,
}

pub async fn run(ctx: &Context, subcmd: CardSubcommand) -> Result<()> {
    let provider = ctx.provider.as_ref();
    match subcmd {
        CardSubcommand::Move { card, list } => {
            let moved = provider
                .move_card(&card, &list)
                .await
                .with_context(|| format!("failed to move card '{card}' to list '{list}'"))?;
            report(ctx, &moved, &format!("Moved '{}' to list {list}", moved.name))
        }
        CardSubcommand::Comment { card, text } => {
            let action = provider
                .add_comment(&card, &text)
                .await
                .with_context(|| format!("failed to comment on card '{card}'"))?;
            report(ctx, &action, &format!("Commented on {card}"))
        }
        CardSubcommand::Complete { card } => {
            let done = provider
                .mark_complete(&card)
                .await
                .with_context(|| format!("failed to complete card '{card}'"))?;
            report(ctx, &done, &format!("Marked '{}' complete", done.name))
        }
        CardSubcommand::Member { edit, card, member } => {
            let result = match edit {
                Edit::Add => provider.add_member(&card, &member).await,
                Edit::Remove => provider.remove_member(&card, &member).await,
            };
            result.with_context(|| format!("failed to update members of card '{card}'"))?;
            let verb = if edit == Edit::Add { "Added" } else { "Removed" };
            let summary = serde_json::json!({ "card": card, "member": member, "edit": verb });
            report(ctx, &summary, &format!("{verb} member {member} on {card}"))
        }
        CardSubcommand::Label { edit, card, label } => {
            let label_id = resolve_label(ctx, &label).await?;
            let result = match edit {
                Edit::Add => provider.add_label(&card, &label_id).await,
                Edit::Remove => provider.remove_label(&card, &label_id).await,
            };
            result.with_context(|| format!("failed to update labels of card '{card}'"))?;
            let verb = if edit == Edit::Add { "Added" } else { "Removed" };
            let summary = serde_json::json!({ "card": card, "label": label_id, "edit": verb });
            report(ctx, &summary, &format!("{verb} label {label} on {card}"))
        }
        CardSubcommand::Update {
            card,
            name,
            desc,
            due,
        } => {
            let update = CardUpdate {
                name,
                desc,
                due,
                ..CardUpdate::default()
            };
            if update.is_empty() {
                bail!("nothing to update, pass --name, --desc or --due");
            }
            let updated = provider
                .update_card(&card, &update)
                .await
                .with_context(|| format!("failed to update card '{card}'"))?;
            report(ctx, &updated, &format!("Updated '{}'", updated.name))
        }
    }
}

/// Accepts a label id, or a label name looked up on the configured board.
async fn resolve_label(ctx: &Context, label: &str) -> Result<String> {
    let Ok(board_id) = ctx.board_id() else {
        return Ok(label.to_string());
    };
    let labels = ctx
        .provider
        .board_labels(&board_id)
        .await
        .context("failed to load board labels")?;
    Ok(labels
        .into_iter()
        .find(|l| l.name.eq_ignore_ascii_case(label))
        .map(|l| l.id)
        .unwrap_or_else(|| label.to_string()))
}

fn report<T: serde::Serialize>(ctx: &Context, value: &T, message: &str) -> Result<()> {
    if ctx.json {
        return print_json(value);
    }
    println!("{message}");
    Ok(())
}

pub async fn search(ctx: &Context, query: &str) -> Result<()> {
    let cards = ctx
        .provider
        .search_cards(query)
        .await
        .with_context(|| format!("search for '{query}' failed"))?;

    if ctx.json {
        return print_json(&cards);
    }
    if cards.is_empty() {
        println!("No cards match '{query}'.");
        return Ok(());
    }
    let directory = ctx.config.directory();
    print_table(
        &["ID", "Name", "Labels", "Members", "URL"],
        cards
            .iter()
            .map(|c| {
                let members: Vec<&str> = c
                    .id_members
                    .iter()
                    .map(|id| directory.display_name(id))
                    .collect();
                vec![
                    c.id.clone(),
                    c.name.clone(),
                    c.label_names().collect::<Vec<_>>().join(", "),
                    members.join(", "),
                    c.short_url.clone().unwrap_or_default(),
                ]
            })
            .collect(),
    );
    Ok(())
}

pub async fn history(ctx: &Context, card: &str) -> Result<()> {
    let mut actions = ctx
        .provider
        .card_actions(card, &ActionQuery::default())
        .await
        .with_context(|| format!("failed to load history of card '{card}'"))?;
    actions.sort_by_key(|a| a.date);

    if ctx.json {
        return print_json(&actions);
    }
    let offset = ctx.config.offset()?;
    let directory = ctx.config.directory();
    print_table(
        &["When", "Type", "By", "Detail"],
        actions
            .iter()
            .map(|a| {
                vec![
                    a.date.with_timezone(&offset).format("%Y-%m-%d %H:%M").to_string(),
                    a.kind.to_string(),
                    directory.display_name(&a.id_member_creator).to_string(),
                    describe(a, &directory),
                ]
            })
            .collect(),
    );
    Ok(())
}

fn describe(action: &Action, directory: &MemberDirectory) -> String {
    let data = &action.data;
    if action.is_list_move() {
        let from = data.list_before.as_ref().map_or("", |l| l.name.as_str());
        let to = data.list_after.as_ref().map_or("", |l| l.name.as_str());
        return format!("{from} -> {to}");
    }
    match action.kind {
        ActionType::CommentCard => data.text.clone().unwrap_or_default(),
        ActionType::CreateCard => data
            .list
            .as_ref()
            .map(|l| format!("in {}", l.name))
            .unwrap_or_default(),
        ActionType::AddMemberToCard | ActionType::RemoveMemberFromCard => action
            .affected_member()
            .map(|id| directory.display_name(id).to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}
