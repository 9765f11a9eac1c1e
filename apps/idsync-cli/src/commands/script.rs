//! `idsync script`: authentication scripts

use std::path::PathBuf;

use clap::{Args, Subcommand};
use idsync_core::prelude::*;

use super::{finish_batch, require_one, Context};
use crate::error::{CliError, CliResult};
use crate::output::{print_info, print_success, table::print_table, truncate};
use crate::progress::Spinner;

/// Script commands
#[derive(Args, Debug)]
pub struct ScriptArgs {
    #[command(subcommand)]
    pub command: ScriptCommands,
}

#[derive(Subcommand, Debug)]
pub enum ScriptCommands {
    /// List scripts
    List(ListArgs),

    /// Export scripts
    ///
    /// Examples:
    ///   idsync script export --name "Google Profile Normalization"
    ///   idsync script export --all
    ///   idsync script export --all-separate --dir ./scripts
    ///   idsync script export --extract --dir ./scripts
    Export(ExportArgs),

    /// Import scripts
    ///
    /// Examples:
    ///   idsync script import --file allAlphaScripts.script.json
    ///   idsync script import --file one.script.json --name "Copy" --re-uuid
    ///   idsync script import --extract --dir ./scripts --validate
    Import(ImportArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Show id, language, context and description
    #[arg(long, short = 'l')]
    pub long: bool,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Export the scripts with this name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Output file for --name or --all
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// Export every script to one bundle file
    #[arg(long)]
    pub all: bool,

    /// Export every script to its own file
    #[arg(long)]
    pub all_separate: bool,

    /// Export every script as a source file plus a meta file
    #[arg(long)]
    pub extract: bool,

    /// Target directory for --all-separate or --extract
    #[arg(long, short = 'D')]
    pub dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Bundle file to import
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// Import only the first script, under this name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Give every imported script a new id
    #[arg(long)]
    pub re_uuid: bool,

    /// Import extracted scripts from --dir
    #[arg(long)]
    pub extract: bool,

    /// Source directory for --extract
    #[arg(long, short = 'D')]
    pub dir: Option<PathBuf>,

    /// Reject JavaScript that fails the syntax check
    #[arg(long)]
    pub validate: bool,
}

/// Execute script commands
pub async fn execute(args: ScriptArgs, ctx: &Context) -> CliResult<()> {
    let client = ctx.client()?;
    let sync = ScriptSync::new(client.clone(), ctx.bundle_context(&client));
    match args.command {
        ScriptCommands::List(args) => execute_list(&sync, args, ctx).await,
        ScriptCommands::Export(args) => execute_export(&sync, args, ctx).await,
        ScriptCommands::Import(args) => execute_import(&sync, args, ctx).await,
    }
}

async fn execute_list<R: ScriptRemote>(
    sync: &ScriptSync<R>,
    args: ListArgs,
    ctx: &Context,
) -> CliResult<()> {
    let spinner = Spinner::start("Fetching scripts...", ctx.quiet);
    let scripts = sync.list_scripts().await;
    spinner.finish();
    let scripts = scripts?;

    if scripts.is_empty() {
        print_info("No scripts found.");
        return Ok(());
    }
    if !args.long {
        for script in &scripts {
            println!("{}", script.name);
        }
        return Ok(());
    }

    let rows: Vec<Vec<String>> = scripts.iter().map(long_row).collect();
    print_table(&["NAME", "ID", "LANGUAGE", "CONTEXT", "DESCRIPTION"], &rows);
    Ok(())
}

fn long_row(script: &Script) -> Vec<String> {
    vec![
        truncate(&script.name, 40),
        script.id.clone(),
        script.language.label().to_string(),
        script.context.clone().unwrap_or_else(|| "-".to_string()),
        truncate(script.description.as_deref().unwrap_or("-"), 40),
    ]
}

async fn execute_export<R: ScriptRemote>(
    sync: &ScriptSync<R>,
    args: ExportArgs,
    ctx: &Context,
) -> CliResult<()> {
    require_one(&[
        ("--name", args.name.is_some()),
        ("--all", args.all),
        ("--all-separate", args.all_separate),
        ("--extract", args.extract),
    ])?;

    let spinner = Spinner::start("Exporting scripts...", ctx.quiet);
    if let Some(name) = &args.name {
        let path = sync.export_script_by_name(name, args.file.as_deref()).await;
        spinner.finish();
        print_success(&format!("Exported '{}' to {}", name, path?.display()));
        return Ok(());
    }
    if args.all {
        let export = sync.export_scripts_to_file(args.file.as_deref()).await;
        spinner.finish();
        let export = export?;
        finish_batch(&export.batch, ctx.quiet)?;
        print_success(&format!("Wrote {}", export.path.display()));
        return Ok(());
    }

    let dir = args.dir.unwrap_or_else(|| PathBuf::from("."));
    let batch = if args.extract {
        sync.export_scripts_extract(&dir).await
    } else {
        sync.export_scripts_to_files(&dir).await
    };
    spinner.finish();
    finish_batch(&batch?, ctx.quiet)
}

async fn execute_import<R: ScriptRemote>(
    sync: &ScriptSync<R>,
    args: ImportArgs,
    ctx: &Context,
) -> CliResult<()> {
    require_one(&[("--file", args.file.is_some()), ("--extract", args.extract)])?;
    if args.extract && args.dir.is_none() {
        return Err(CliError::Validation("--extract requires --dir".to_string()));
    }

    let spinner = Spinner::start("Importing scripts...", ctx.quiet);
    let batch = match (&args.file, &args.dir) {
        (Some(file), _) => {
            let options = ScriptImportOptions {
                name: args.name.clone(),
                re_uuid: args.re_uuid,
                validate: args.validate,
            };
            sync.import_scripts_from_file(file, &options).await
        }
        (None, Some(dir)) => sync.import_extracted_scripts(dir, args.validate).await,
        (None, None) => Ok(BatchResult::new("import scripts", 0)),
    };
    spinner.finish();
    finish_batch(&batch?, ctx.quiet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_row_columns() {
        let script: Script = serde_json::from_value(serde_json::json!({
            "_id": "5e1f",
            "name": "Google Profile Normalization",
            "script": "",
            "language": "GROOVY",
            "context": "SOCIAL_IDP_PROFILE_TRANSFORMATION"
        }))
        .unwrap();
        assert_eq!(
            long_row(&script),
            vec![
                "Google Profile Normalization",
                "5e1f",
                "Groovy",
                "SOCIAL_IDP_PROFILE_TRANSFORMATION",
                "-"
            ]
        );
    }
}
