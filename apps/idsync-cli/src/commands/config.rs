//! `idsync config`: IDM configuration entities

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use idsync_core::prelude::*;

use super::{finish_batch, require_one, Context};
use crate::error::{CliError, CliResult};
use crate::output::{print_info, print_success, table::print_table};
use crate::progress::Spinner;

/// IDM configuration commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// List config entity ids
    List,

    /// Export config entities
    ///
    /// Examples:
    ///   idsync config export --id managed
    ///   idsync config export --all --file allAlphaConfigEntities.idm.json
    ///   idsync config export --all-separate --dir ./idm
    ///   idsync config export --entities entities.json --env prod.env --dir ./idm
    Export(ExportArgs),

    /// Import config entities
    ///
    /// Examples:
    ///   idsync config import --id managed --file managed.idm.json
    ///   idsync config import --all --file allAlphaConfigEntities.idm.json
    ///   idsync config import --dir ./idm --validate
    Import(ImportArgs),

    /// Count managed objects of one type
    Count(CountArgs),
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Export a single entity
    #[arg(long)]
    pub id: Option<String>,

    /// Output file for --id or --all
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// Export every entity to one bundle file
    #[arg(long)]
    pub all: bool,

    /// Export every entity to its own file under --dir
    #[arg(long)]
    pub all_separate: bool,

    /// JSON file selecting the entities to export: {"idm": [..]}
    #[arg(long)]
    pub entities: Option<PathBuf>,

    /// KEY=VALUE file; values are replaced by ${KEY} placeholders
    #[arg(long)]
    pub env: Option<PathBuf>,

    /// Target directory
    #[arg(long, short = 'D')]
    pub dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Import a single entity
    #[arg(long)]
    pub id: Option<String>,

    /// Source file for --id or --all
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// Import every entity from one bundle file
    #[arg(long)]
    pub all: bool,

    /// Import every `*.json` file under this directory
    #[arg(long, short = 'D')]
    pub dir: Option<PathBuf>,

    /// JSON file selecting the entities to import: {"idm": [..]}
    #[arg(long)]
    pub entities: Option<PathBuf>,

    /// KEY=VALUE file; ${KEY} placeholders are replaced by values
    #[arg(long)]
    pub env: Option<PathBuf>,

    /// Refuse to import when any script hook fails the syntax check
    #[arg(long)]
    pub validate: bool,
}

#[derive(Args, Debug)]
pub struct CountArgs {
    /// Managed object type, e.g. alpha_user
    #[arg(long = "type", short = 't')]
    pub object_type: String,
}

/// Execute config commands
pub async fn execute(args: ConfigArgs, ctx: &Context) -> CliResult<()> {
    let client = ctx.client()?;
    let sync = ConfigSync::new(client.clone(), ctx.bundle_context(&client));
    match args.command {
        ConfigCommands::List => execute_list(&sync).await,
        ConfigCommands::Export(args) => execute_export(&sync, args, ctx).await,
        ConfigCommands::Import(args) => execute_import(&sync, args, ctx).await,
        ConfigCommands::Count(args) => execute_count(&sync, args, ctx).await,
    }
}

async fn execute_list<R: ConfigRemote>(sync: &ConfigSync<R>) -> CliResult<()> {
    let mut ids = sync.list_config_entities().await?;
    ids.sort();
    if ids.is_empty() {
        print_info("No config entities found.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = ids.into_iter().map(|id| vec![id]).collect();
    print_table(&["ID"], &rows);
    Ok(())
}

fn dir_or_current(dir: Option<PathBuf>) -> PathBuf {
    dir.unwrap_or_else(|| PathBuf::from("."))
}

fn load_env(path: Option<&Path>) -> CliResult<EnvironmentMap> {
    Ok(match path {
        Some(path) => EnvironmentMap::load(path)?,
        None => EnvironmentMap::new(),
    })
}

async fn execute_export<R: ConfigRemote>(
    sync: &ConfigSync<R>,
    args: ExportArgs,
    ctx: &Context,
) -> CliResult<()> {
    require_one(&[
        ("--id", args.id.is_some()),
        ("--all", args.all),
        ("--all-separate", args.all_separate),
        ("--entities", args.entities.is_some()),
    ])?;

    let spinner = Spinner::start("Exporting config entities...", ctx.quiet);
    if let Some(id) = &args.id {
        let path = sync.export_config_entity(id, args.file.as_deref()).await;
        spinner.finish();
        print_success(&format!("Exported {} to {}", id, path?.display()));
        return Ok(());
    }
    if args.all {
        let export = sync.export_all_to_file(args.file.as_deref()).await;
        spinner.finish();
        let export = export?;
        finish_batch(&export.batch, ctx.quiet)?;
        print_success(&format!("Wrote {}", export.path.display()));
        return Ok(());
    }

    let dir = dir_or_current(args.dir);
    let batch = match &args.entities {
        Some(entities) => {
            let selection = EntitySelection::load(entities)?;
            let env = load_env(args.env.as_deref())?;
            sync.export_selected(&dir, &selection, &env).await
        }
        None => sync.export_all_raw(&dir).await,
    };
    spinner.finish();
    finish_batch(&batch?, ctx.quiet)
}

async fn execute_import<R: ConfigRemote>(
    sync: &ConfigSync<R>,
    args: ImportArgs,
    ctx: &Context,
) -> CliResult<()> {
    require_one(&[
        ("--id", args.id.is_some()),
        ("--all", args.all),
        ("--dir", args.dir.is_some() && args.entities.is_none()),
        ("--entities", args.entities.is_some()),
    ])?;
    if args.all && args.file.is_none() {
        return Err(CliError::Validation("--all requires --file".to_string()));
    }

    let spinner = Spinner::start("Importing config entities...", ctx.quiet);
    if let Some(id) = &args.id {
        let result = sync
            .import_config_entity(id, args.file.as_deref(), args.validate)
            .await;
        spinner.finish();
        result?;
        print_success(&format!("Imported {}", id));
        return Ok(());
    }

    let batch = if let (true, Some(file)) = (args.all, &args.file) {
        sync.import_all_from_file(file, args.validate).await
    } else {
        let dir = dir_or_current(args.dir);
        match &args.entities {
            Some(entities) => {
                let selection = EntitySelection::load(entities)?;
                let env = load_env(args.env.as_deref())?;
                sync.import_selected(&dir, &selection, &env, args.validate).await
            }
            None => sync.import_all_raw(&dir, args.validate).await,
        }
    };
    spinner.finish();
    finish_batch(&batch?, ctx.quiet)
}

async fn execute_count<R: ConfigRemote>(
    sync: &ConfigSync<R>,
    args: CountArgs,
    ctx: &Context,
) -> CliResult<()> {
    let spinner = Spinner::start(&format!("Counting {}...", args.object_type), ctx.quiet);
    let count = sync.count_managed_objects(&args.object_type).await;
    spinner.finish();
    println!("{}: {}", args.object_type, count?);
    Ok(())
}
