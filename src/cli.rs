use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};

use crate::cmd;
use crate::cmd::report::{ActivityKey, CardKey};
use crate::config::{self, AppConfig};
use crate::providers::trello::TrelloProvider;
use crate::providers::Provider;
use crate::report::shift::ShiftView;

#[derive(Parser, Debug)]
#[command(
    name = "shiftboard",
    about = "Shift-based activity reports and light card triage for a Trello board",
    version
)]
pub struct Cli {
    /// Config file (default: ~/.shiftboard/config.toml)
    #[arg(long, global = true, env = "SHIFTBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the terminal dashboard (default)
    Dash,

    /// Actions of one local day, bucketed by shift
    Shifts {
        /// Local date, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Built-in shift granularity; overrides a custom table
        #[arg(long, value_enum)]
        view: Option<ShiftView>,
    },

    /// Per-member activity over a time range
    Members {
        /// RFC 3339 start (default: 24h before --before)
        #[arg(long)]
        since: Option<DateTime<Utc>>,
        /// RFC 3339 end (default: now)
        #[arg(long)]
        before: Option<DateTime<Utc>>,
        /// Aggregate by member, actor, card or team
        #[arg(long, value_enum, default_value_t = ActivityKey::Member)]
        by: ActivityKey,
    },

    /// KPI points for the cards of a list
    Kpi {
        /// List id whose cards are scored
        #[arg(long)]
        list: String,
        /// Only credit members with this role
        #[arg(long)]
        role: Option<String>,
    },

    /// Open cards grouped by label, list or member
    Triage {
        /// Restrict to one list (default: whole board)
        #[arg(long)]
        list: Option<String>,
        #[arg(long, value_enum, default_value_t = CardKey::Label)]
        by: CardKey,
    },

    /// Board lists with their configured category
    Lists,

    /// Board labels with their configured points
    Labels,

    /// Board members joined with the local directory
    Roster,

    /// Search cards by text
    Search { query: String },

    /// Action history of a card
    History { card: String },

    /// Change a card
    Card {
        #[command(subcommand)]
        subcommand: cmd::card::CardSubcommand,
    },

    /// Manage webhooks
    Webhook {
        #[command(subcommand)]
        subcommand: cmd::webhook::WebhookSubcommand,
    },
}

/// Loaded configuration plus the client built from it.
pub struct Context {
    pub config: AppConfig,
    pub provider: Arc<dyn Provider>,
    pub json: bool,
}

impl Context {
    pub fn load(cli: &Cli) -> Result<Self> {
        let config = match &cli.config {
            Some(path) => config::load_config_from(path)?,
            None => config::load_config()?,
        };
        let provider = TrelloProvider::from_config(config.trello.as_ref())?;
        Ok(Self {
            config,
            provider: Arc::new(provider),
            json: cli.json,
        })
    }

    pub fn board_id(&self) -> Result<String> {
        Ok(self.config.board_id()?.to_string())
    }
}

pub async fn run(ctx: &Context, command: Commands) -> Result<()> {
    match command {
        Commands::Dash => crate::dash::run(ctx).await,
        Commands::Shifts { date, view } => cmd::report::shifts(ctx, date, view).await,
        Commands::Members { since, before, by } => {
            cmd::report::members(ctx, since, before, by).await
        }
        Commands::Kpi { list, role } => cmd::report::kpi(ctx, &list, role.as_deref()).await,
        Commands::Triage { list, by } => cmd::report::triage(ctx, list.as_deref(), by).await,
        Commands::Lists => cmd::board::lists(ctx).await,
        Commands::Labels => cmd::board::labels(ctx).await,
        Commands::Roster => cmd::board::roster(ctx).await,
        Commands::Search { query } => cmd::card::search(ctx, &query).await,
        Commands::History { card } => cmd::card::history(ctx, &card).await,
        Commands::Card { subcommand } => cmd::card::run(ctx, subcommand).await,
        Commands::Webhook { subcommand } => cmd::webhook::run(ctx, subcommand).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("shiftboard").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn no_subcommand_means_dashboard() {
        assert!(parse(&[]).command.is_none());
    }

    #[test]
    fn parses_shift_options() {
        let cli = parse(&["shifts", "--date", "2024-05-02", "--view", "fine", "--json"]);
        assert!(cli.json);
        match cli.command {
            Some(Commands::Shifts { date, view }) => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 2));
                assert_eq!(view, Some(ShiftView::Fine));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_rfc3339_ranges() {
        let cli = parse(&[
            "members",
            "--since",
            "2024-05-01T00:00:00Z",
            "--before",
            "2024-05-02T00:00:00+07:00",
        ]);
        match cli.command {
            Some(Commands::Members { since, before, by }) => {
                assert!(since.unwrap() < before.unwrap());
                assert_eq!(by, ActivityKey::Member);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn card_move_requires_both_ids() {
        let args = ["shiftboard", "card", "move", "c1"];
        assert!(Cli::try_parse_from(args).is_err());
        let cli = parse(&["card", "move", "c1", "l2"]);
        assert!(matches!(cli.command, Some(Commands::Card { .. })));
    }

    #[test]
    fn triage_groups_by_member() {
        match parse(&["triage", "--by", "member"]).command {
            Some(Commands::Triage { list, by }) => {
                assert!(list.is_none());
                assert_eq!(by, CardKey::Member);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_view() {
        let args = ["shiftboard", "shifts", "--view", "hourly"];
        assert!(Cli::try_parse_from(args).is_err());
    }
}
