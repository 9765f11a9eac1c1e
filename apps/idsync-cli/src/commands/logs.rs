//! `idsync logs`: tail and fetch the platform log stream

use std::path::PathBuf;

use chrono::DateTime;
use clap::{Args, Subcommand};
use idsync_core::logs::{fetch_logs, tail_logs, TAIL_INTERVAL};
use idsync_core::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::Context;
use crate::error::{CliError, CliResult};
use crate::output::print_json_line;

/// Log commands
#[derive(Args, Debug)]
pub struct LogsArgs {
    #[command(subcommand)]
    pub command: LogsCommands,
}

#[derive(Subcommand, Debug)]
pub enum LogsCommands {
    /// List log sources
    Sources,

    /// Follow a log source until interrupted
    ///
    /// Examples:
    ///   idsync logs tail --source am-core
    ///   idsync logs tail --source am-everything --level WARN --txid 7f3a
    Tail(TailArgs),

    /// Fetch a log source between two timestamps
    ///
    /// Examples:
    ///   idsync logs fetch --source am-core --begin 2024-05-01T00:00:00Z --end 2024-05-01T12:00:00Z
    Fetch(FetchArgs),
}

/// Filter options shared by tail and fetch
#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Log source, e.g. am-core or idm-everything
    #[arg(long, short = 's')]
    pub source: String,

    /// Minimum level: ALL, a name (ERROR, WARN, INFO, DEBUG) or 0-4
    #[arg(long, short = 'l', default_value = "ERROR")]
    pub level: String,

    /// Only entries whose transaction id contains this text
    #[arg(long)]
    pub txid: Option<String>,

    /// JSON array of logger names replacing the default noise list
    #[arg(long)]
    pub noise: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct TailArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Start of the window (RFC 3339)
    #[arg(long)]
    pub begin: String,

    /// End of the window (RFC 3339)
    #[arg(long)]
    pub end: String,

    /// Only entries whose rendering contains this text
    #[arg(long)]
    pub search: Option<String>,
}

/// Prints tail entries as compact JSON and fetched entries pretty.
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn on_tail(&mut self, entry: &LogEntry) {
        print_json_line(&entry.payload);
    }

    fn on_fetch(&mut self, _entry: &LogEntry, pretty: &str) {
        println!("{}", pretty);
    }
}

/// Execute log commands
pub async fn execute(args: LogsArgs, ctx: &Context) -> CliResult<()> {
    require_log_credentials(ctx)?;
    let client = ctx.client()?;
    match args.command {
        LogsCommands::Sources => {
            for source in client.list_sources().await? {
                println!("{}", source);
            }
            Ok(())
        }
        LogsCommands::Tail(args) => {
            let filter = build_filter(&args.filter)?;
            let cancel = cancel_on_ctrl_c();
            let stats = tail_logs(
                client.as_ref(),
                &args.filter.source,
                &filter,
                None,
                TAIL_INTERVAL,
                &mut ConsoleSink,
                &cancel,
            )
            .await?;
            info!(polls = stats.polls, emitted = stats.emitted, "tail finished");
            Ok(())
        }
        LogsCommands::Fetch(args) => {
            check_window(&args.begin, &args.end)?;
            let filter = build_filter(&args.filter)?;
            let cancel = cancel_on_ctrl_c();
            let stats = fetch_logs(
                client.as_ref(),
                &args.filter.source,
                &args.begin,
                &args.end,
                &filter,
                args.search.as_deref(),
                &mut ConsoleSink,
                &cancel,
            )
            .await?;
            info!(received = stats.received, emitted = stats.emitted, "fetch finished");
            Ok(())
        }
    }
}

fn require_log_credentials(ctx: &Context) -> CliResult<()> {
    if ctx.config.log_api_key.is_none() || ctx.config.log_api_secret.is_none() {
        return Err(CliError::AuthenticationFailed(
            "log API key and secret are required (IDSYNC_LOG_API_KEY, IDSYNC_LOG_API_SECRET)"
                .to_string(),
        ));
    }
    Ok(())
}

fn build_filter(args: &FilterArgs) -> CliResult<LogFilter> {
    let levels = LevelTable::standard().resolve(&args.level)?;
    let mut filter = LogFilter::new(levels);
    if let Some(path) = &args.noise {
        filter = filter.with_noise(NoiseFilter::load(path)?);
    }
    if let Some(txid) = &args.txid {
        filter = filter.with_transaction(txid.clone());
    }
    Ok(filter)
}

/// Both bounds must be RFC 3339 and in order
fn check_window(begin: &str, end: &str) -> CliResult<()> {
    let parse = |label: &str, value: &str| {
        DateTime::parse_from_rfc3339(value).map_err(|_| {
            CliError::Validation(format!("--{label} '{value}' is not an RFC 3339 timestamp"))
        })
    };
    if parse("begin", begin)? > parse("end", end)? {
        return Err(CliError::Validation("--begin is after --end".to_string()));
    }
    Ok(())
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });
    cancel
}
