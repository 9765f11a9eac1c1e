//! idsync - export, import and log tooling for identity platform tenants
//!
//! This CLI enables operators to:
//! - Export and import IDM config entities, scripts and social providers
//! - Parameterize exports per environment
//! - Tail and fetch the platform log stream
//! - List organizations

use clap::{Parser, Subcommand};
use idsync_cli::commands::{self, Context};
use idsync_cli::config::{Config, ConfigPaths};
use idsync_cli::error::CliResult;
use idsync_cli::logging;

/// idsync - identity platform configuration sync
#[derive(Parser)]
#[command(name = "idsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Platform base URL, e.g. https://tenant.example.com/am
    #[arg(long, global = true, env = "IDSYNC_HOST")]
    host: Option<String>,

    /// Realm to operate on
    #[arg(long, global = true, env = "IDSYNC_REALM")]
    realm: Option<String>,

    /// More diagnostics on stderr (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// IDM configuration entities
    Config(commands::config::ConfigArgs),

    /// Authentication scripts
    Script(commands::script::ScriptArgs),

    /// Social identity providers
    Idp(commands::idp::IdpArgs),

    /// Platform log stream
    Logs(commands::logs::LogsArgs),

    /// Organizations
    Org(commands::org::OrgArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let paths = ConfigPaths::new()?;
    let mut config = Config::load(&paths)?;
    if let Some(host) = cli.host.filter(|h| !h.trim().is_empty()) {
        config.host = Some(host);
    }
    if let Some(realm) = cli.realm.filter(|r| !r.trim().is_empty()) {
        config.realm = realm;
    }
    let ctx = Context::new(config, cli.quiet);

    match cli.command {
        Commands::Config(args) => commands::config::execute(args, &ctx).await,
        Commands::Script(args) => commands::script::execute(args, &ctx).await,
        Commands::Idp(args) => commands::idp::execute(args, &ctx).await,
        Commands::Logs(args) => commands::logs::execute(args, &ctx).await,
        Commands::Org(args) => commands::org::execute(args, &ctx).await,
    }
}
