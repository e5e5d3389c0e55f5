use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use dialoguer::Confirm;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use portal_core::approvals::{
    build_inbox, find_action, project_for_display, request_plan, ActionExecutor, Decision,
    InboxTab, PendingAction, PendingActionResponse, PortalClient,
};
use portal_core::config::{load_config, Config};
use portal_core::error::ResolveError;

#[derive(Args)]
pub struct ListArgs {
    /// Read pending actions from a JSON file instead of the backend
    #[arg(long)]
    pub file: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = InboxTab::All)]
    pub tab: InboxTab,

    /// Print inbox items as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct DecideArgs {
    /// Id of the pending request
    pub id: String,

    /// Read pending actions from a JSON file instead of the backend
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Print the resolved call and HTTP request without executing it
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ActionsFile {
    Envelope(PendingActionResponse),
    List(Vec<PendingAction>),
}

/// List pending requests for a tab
pub async fn list(args: ListArgs) -> Result<()> {
    let config = load_config()?;
    let actions = load_actions(args.file.as_deref(), &config).await?;
    let inbox = build_inbox(&actions, args.tab);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&inbox)?);
        return Ok(());
    }

    if inbox.is_empty() {
        println!("[portal] No pending requests.");
        return Ok(());
    }

    println!(
        "\n{}",
        format!("  Pending Requests ({})", inbox.len())
            .bold()
            .bright_yellow()
    );
    println!("{}", "  ─────────────────────────────".dimmed());

    for item in &inbox {
        let view = &item.display;
        println!(
            "\n  {} {}",
            format!("[{}]", view.requester_initials).bold(),
            view.description.render()
        );
        println!("    {} {}", view.tag.render().cyan(), view.navigation_target.dimmed());
        if let Some(justification) = &view.justification {
            println!("    {} {}", "Justification:".dimmed(), justification);
        }
        println!(
            "    {} {}  {} {}",
            "id".dimmed(),
            item.id,
            "requested".dimmed(),
            view.requested_on.as_deref().unwrap_or("-")
        );
    }
    println!();
    Ok(())
}

/// Accept or reject one pending request
pub async fn decide(args: DecideArgs, decision: Decision) -> Result<()> {
    let config = load_config()?;
    let actions = load_actions(args.file.as_deref(), &config).await?;
    let action =
        find_action(&actions, &args.id).ok_or_else(|| ResolveError::NotFound(args.id.clone()))?;
    let call = portal_core::approvals::decide(action, decision)?;

    if args.dry_run {
        let preview = serde_json::json!({
            "call": call,
            "request": request_plan(&call),
        });
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    if !args.yes {
        let view = project_for_display(action);
        println!("{}", view.description.render());
        println!("{}", view.tooltip.render().dimmed());
        let verb = match decision {
            Decision::Accept => "Accept",
            Decision::Reject => "Reject",
        };
        let confirmed = Confirm::new()
            .with_prompt(format!("{} this request?", verb))
            .default(false)
            .interact()?;
        if !confirmed {
            eprintln!("[portal] Cancelled.");
            return Ok(());
        }
    }

    let client = PortalClient::new(&config.api)?;
    match client.execute(&call).await {
        Ok(()) => {
            println!("{} {}", "\u{2713}".green(), call.success_message());
            Ok(())
        }
        Err(e) => {
            tracing::warn!(operation = call.operation(), error = %e, "decision failed");
            eprintln!("[portal] {}", call.failure_message().red());
            Err(e.into())
        }
    }
}

async fn load_actions(file: Option<&Path>, config: &Config) -> Result<Vec<PendingAction>> {
    if let Some(path) = file {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let parsed: ActionsFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse pending actions in {}", path.display()))?;
        return Ok(match parsed {
            ActionsFile::Envelope(response) => response.pending_actions,
            ActionsFile::List(actions) => actions,
        });
    }

    eprintln!("[portal] Fetching pending actions from {}", config.api.base_url);
    let client = PortalClient::new(&config.api)?;
    let actions = client
        .fetch_pending_actions()
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "failed to fetch pending actions"))?;
    Ok(actions)
}
