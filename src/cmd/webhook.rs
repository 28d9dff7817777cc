use anyhow::{bail, Context as _, Result};
use clap::Subcommand;

use crate::cli::Context;
use crate::model::webhook::{Webhook, WebhookUpdate};
use crate::output::{print_json, print_table};
use crate::providers::NewWebhook;

#[derive(Subcommand, Debug)]
pub enum WebhookSubcommand {
    /// List webhooks registered for the token
    List,
    /// Show one webhook
    Show { id: String },
    /// Register a webhook (default model: the configured board)
    Create {
        #[arg(long)]
        callback: String,
        #[arg(long)]
        model: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Change a webhook
    Update {
        id: String,
        #[arg(long)]
        callback: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Delete a webhook
    Delete { id: String },
}

pub async fn run(ctx: &Context, subcmd: WebhookSubcommand) -> Result<()> {
    let provider = ctx.provider.as_ref();
    match subcmd {
        WebhookSubcommand::List => {
            let hooks = provider
                .list_webhooks()
                .await
                .context("failed to list webhooks")?;
            if ctx.json {
                return print_json(&hooks);
            }
            if hooks.is_empty() {
                println!("No webhooks.");
                return Ok(());
            }
            print_table(
                &["ID", "Model", "Active", "Callback", "Description"],
                hooks.iter().map(row).collect(),
            );
            Ok(())
        }
        WebhookSubcommand::Show { id } => {
            let hook = provider
                .get_webhook(&id)
                .await
                .with_context(|| format!("webhook '{id}' not found"))?;
            show(ctx, &hook)
        }
        WebhookSubcommand::Create {
            callback,
            model,
            description,
        } => {
            let id_model = match model {
                Some(model) => model,
                None => ctx.board_id()?,
            };
            let hook = provider
                .create_webhook(&NewWebhook {
                    description,
                    callback_url: callback,
                    id_model,
                })
                .await
                .context("failed to create webhook")?;
            show(ctx, &hook)
        }
        WebhookSubcommand::Update {
            id,
            callback,
            description,
            model,
            active,
        } => {
            let update = WebhookUpdate {
                description,
                callback_url: callback,
                id_model: model,
                active,
            };
            if update.to_query().is_empty() {
                bail!("nothing to update, pass --callback, --description, --model or --active");
            }
            let hook = provider
                .update_webhook(&id, &update)
                .await
                .with_context(|| format!("failed to update webhook '{id}'"))?;
            show(ctx, &hook)
        }
        WebhookSubcommand::Delete { id } => {
            provider
                .delete_webhook(&id)
                .await
                .with_context(|| format!("failed to delete webhook '{id}'"))?;
            if ctx.json {
                return print_json(&serde_json::json!({ "deleted": id }));
            }
            println!("Deleted webhook {id}");
            Ok(())
        }
    }
}

fn show(ctx: &Context, hook: &Webhook) -> Result<()> {
    if ctx.json {
        return print_json(hook);
    }
    print_table(
        &["ID", "Model", "Active", "Callback", "Description"],
        vec![row(hook)],
    );
    Ok(())
}

fn row(hook: &Webhook) -> Vec<String> {
    vec![
        hook.id.clone(),
        hook.id_model.clone(),
        if hook.active { "yes" } else { "no" }.to_string(),
        hook.callback_url.clone(),
        hook.description.clone(),
    ]
}
