//! `idsync idp`: social identity providers

use std::path::PathBuf;

use clap::{Args, Subcommand};
use idsync_core::prelude::*;

use super::{finish_batch, require_one, Context};
use crate::error::{CliError, CliResult};
use crate::output::{print_info, print_success, table::print_table};
use crate::progress::Spinner;

/// Social identity provider commands
#[derive(Args, Debug)]
pub struct IdpArgs {
    #[command(subcommand)]
    pub command: IdpCommands,
}

#[derive(Subcommand, Debug)]
pub enum IdpCommands {
    /// List providers
    List,

    /// Export providers with their transform scripts
    ///
    /// Examples:
    ///   idsync idp export --id google
    ///   idsync idp export --all --file providers.idp.json
    ///   idsync idp export --all-separate --dir ./idp
    Export(ExportArgs),

    /// Import providers with their transform scripts
    ///
    /// Examples:
    ///   idsync idp import --id google --file google.idp.json
    ///   idsync idp import --file google.idp.json
    ///   idsync idp import --all --file providers.idp.json
    ///   idsync idp import --all-separate --dir ./idp
    Import(ImportArgs),
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Export a single provider
    #[arg(long)]
    pub id: Option<String>,

    /// Output file for --id or --all
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// Export every provider to one bundle file
    #[arg(long)]
    pub all: bool,

    /// Export every provider to its own file
    #[arg(long)]
    pub all_separate: bool,

    /// Target directory for --all-separate
    #[arg(long, short = 'D')]
    pub dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Import only this provider from --file
    #[arg(long)]
    pub id: Option<String>,

    /// Bundle file; without --id or --all the first provider is imported
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// Import every provider in --file
    #[arg(long)]
    pub all: bool,

    /// Import every `*.idp.json` file in --dir
    #[arg(long)]
    pub all_separate: bool,

    /// Source directory for --all-separate
    #[arg(long, short = 'D')]
    pub dir: Option<PathBuf>,
}

/// Execute idp commands
pub async fn execute(args: IdpArgs, ctx: &Context) -> CliResult<()> {
    let client = ctx.client()?;
    let sync = IdpSync::new(client.clone(), ctx.bundle_context(&client));
    match args.command {
        IdpCommands::List => execute_list(&sync, ctx).await,
        IdpCommands::Export(args) => execute_export(&sync, args, ctx).await,
        IdpCommands::Import(args) => execute_import(&sync, args, ctx).await,
    }
}

async fn execute_list<R: IdpRemote + ScriptRemote>(sync: &IdpSync<R>, ctx: &Context) -> CliResult<()> {
    let spinner = Spinner::start("Fetching providers...", ctx.quiet);
    let providers = sync.list_providers().await;
    spinner.finish();
    let providers = providers?;

    if providers.is_empty() {
        print_info("No providers found.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = providers
        .iter()
        .map(|p| {
            vec![
                p.id.clone(),
                p.type_id.clone(),
                p.transform.clone().unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();
    print_table(&["ID", "TYPE", "TRANSFORM"], &rows);
    Ok(())
}

async fn execute_export<R: IdpRemote + ScriptRemote>(
    sync: &IdpSync<R>,
    args: ExportArgs,
    ctx: &Context,
) -> CliResult<()> {
    require_one(&[
        ("--id", args.id.is_some()),
        ("--all", args.all),
        ("--all-separate", args.all_separate),
    ])?;

    let spinner = Spinner::start("Exporting providers...", ctx.quiet);
    if let Some(id) = &args.id {
        let path = sync.export_provider(id, args.file.as_deref()).await;
        spinner.finish();
        print_success(&format!("Exported {} to {}", id, path?.display()));
        return Ok(());
    }
    if args.all {
        let export = sync.export_providers_to_file(args.file.as_deref()).await;
        spinner.finish();
        let export = export?;
        finish_batch(&export.batch, ctx.quiet)?;
        print_success(&format!("Wrote {}", export.path.display()));
        return Ok(());
    }

    let dir = args.dir.unwrap_or_else(|| PathBuf::from("."));
    let batch = sync.export_providers_to_files(&dir).await;
    spinner.finish();
    finish_batch(&batch?, ctx.quiet)
}

async fn execute_import<R: IdpRemote + ScriptRemote>(
    sync: &IdpSync<R>,
    args: ImportArgs,
    ctx: &Context,
) -> CliResult<()> {
    if args.all_separate {
        require_one(&[("--all-separate", true), ("--id", args.id.is_some()), ("--all", args.all)])?;
        let dir = args.dir.unwrap_or_else(|| PathBuf::from("."));
        let spinner = Spinner::start("Importing providers...", ctx.quiet);
        let batch = sync.import_providers_from_files(&dir).await;
        spinner.finish();
        return finish_batch(&batch?, ctx.quiet);
    }

    let Some(file) = &args.file else {
        return Err(CliError::Validation("--file is required".to_string()));
    };
    if args.id.is_some() && args.all {
        return Err(CliError::Validation("--id and --all cannot be combined".to_string()));
    }

    let spinner = Spinner::start("Importing providers...", ctx.quiet);
    if args.all {
        let batch = sync.import_providers_from_file(file).await;
        spinner.finish();
        return finish_batch(&batch?, ctx.quiet);
    }
    let imported = match &args.id {
        Some(id) => sync.import_provider_by_id(id, file).await.map(|()| id.clone()),
        None => sync.import_first_provider(file).await,
    };
    spinner.finish();
    print_success(&format!("Imported {}", imported?));
    Ok(())
}
