//! `idsync org`: organizations

use clap::{Args, Subcommand};
use idsync_core::prelude::*;
use serde_json::Value;

use super::Context;
use crate::error::CliResult;
use crate::output::{print_info, table::print_table};
use crate::progress::Spinner;

/// Organization commands
#[derive(Args, Debug)]
pub struct OrgArgs {
    #[command(subcommand)]
    pub command: OrgCommands,
}

#[derive(Subcommand, Debug)]
pub enum OrgCommands {
    /// List organizations with their parent and children
    List,
}

/// Execute org commands
pub async fn execute(args: OrgArgs, ctx: &Context) -> CliResult<()> {
    match args.command {
        OrgCommands::List => execute_list(ctx).await,
    }
}

async fn execute_list(ctx: &Context) -> CliResult<()> {
    let object_type = organization_type(&ctx.config.realm, ctx.config.deployment.is_cloud());
    let sync = OrganizationSync::new(ctx.client()?, object_type);

    let spinner = Spinner::start("Fetching organizations...", ctx.quiet);
    let orgs = sync.list_organizations().await;
    spinner.finish();
    let orgs = orgs?;

    if orgs.is_empty() {
        print_info("No organizations found.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = orgs.iter().map(org_row).collect();
    print_table(&["NAME", "PARENT", "CHILDREN"], &rows);
    Ok(())
}

fn name_of(value: &Value) -> Option<&str> {
    value.get("name").and_then(Value::as_str)
}

fn org_row(org: &Value) -> Vec<String> {
    let parent = org.get("parent").and_then(name_of).unwrap_or("-");
    let children: Vec<&str> = org
        .get("children")
        .and_then(Value::as_array)
        .map(|c| c.iter().filter_map(name_of).collect())
        .unwrap_or_default();
    vec![
        name_of(org).unwrap_or("-").to_string(),
        parent.to_string(),
        if children.is_empty() {
            "-".to_string()
        } else {
            children.join(", ")
        },
    ]
}
