use anyhow::{Context, Result};
use chrono::FixedOffset;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::model::member::{MemberDirectory, MemberProfile};
use crate::report::category::{Category, ListCategories};
use crate::report::interval::FetchOptions;
use crate::report::kpi::LabelPoints;
use crate::report::shift::{ShiftDef, ShiftTable, ShiftView};

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub trello: Option<TrelloConfig>,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub members: Vec<MemberProfile>,
    #[serde(default)]
    pub teams: Vec<String>,
    #[serde(default)]
    pub lists: HashMap<String, Category>,
    #[serde(default)]
    pub points: HashMap<String, f64>,
}

#[derive(Debug, Deserialize)]
pub struct TrelloConfig {
    pub api_key: String,
    pub token: String,
    pub board_id: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_offset")]
    pub utc_offset_minutes: i32,
    #[serde(default)]
    pub shift_view: ShiftView,
    #[serde(default)]
    pub shifts: Vec<ShiftDef>,
    #[serde(default = "default_split_depth")]
    pub max_split_depth: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: default_offset(),
            shift_view: ShiftView::default(),
            shifts: Vec::new(),
            max_split_depth: default_split_depth(),
        }
    }
}

fn default_offset() -> i32 {
    7 * 60
}

fn default_split_depth() -> u32 {
    3
}

impl AppConfig {
    pub fn board_id(&self) -> Result<&str> {
        self.trello
            .as_ref()
            .and_then(|t| t.board_id.as_deref())
            .context("No board configured. Set [trello] board_id in ~/.shiftboard/config.toml")
    }

    pub fn offset(&self) -> Result<FixedOffset> {
        let minutes = self.report.utc_offset_minutes;
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .with_context(|| {
                format!("utc_offset_minutes out of range: {minutes}")
            })
    }

    /// Custom shifts take precedence over the built-in view when configured.
    pub fn shift_table(&self, view: Option<ShiftView>) -> Result<ShiftTable> {
        if self.report.shifts.is_empty() || view.is_some() {
            return Ok(ShiftTable::builtin(view.unwrap_or(self.report.shift_view)));
        }
        ShiftTable::from_defs(&self.report.shifts).context("Invalid [[report.shifts]] table")
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            max_depth: self.report.max_split_depth,
            ..FetchOptions::default()
        }
    }

    pub fn directory(&self) -> MemberDirectory {
        MemberDirectory::new(self.members.iter().cloned())
    }

    pub fn list_categories(&self) -> ListCategories {
        ListCategories::new(self.lists.iter().map(|(id, cat)| (id.clone(), *cat)))
    }

    pub fn label_points(&self) -> LabelPoints {
        LabelPoints::new(self.points.iter().map(|(name, pts)| (name.clone(), *pts)))
    }
}

pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".shiftboard")
}

fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}

pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: AppConfig =
        toml::from_str(&contents).with_context(|| "Failed to parse config.toml")?;
    Ok(config)
}
