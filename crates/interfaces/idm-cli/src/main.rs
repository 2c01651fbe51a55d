use anyhow::Context;
use clap::{Parser, Subcommand};
use idm_app_core::PollerConfig;
use idm_cli::commands::{self, RegisterOptions};
use idm_cli::{CliSortColumn, ConsoleConfig, Toggle, DEFAULT_BASE_URL};
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Manage identity domains registered with the hybrid cloud console"
)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Base URL of the idmsvc API
    #[arg(long, global = true, env = "IDMSVC_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
    /// Base URL of the RBAC API; every permission is assumed when unset
    #[arg(long, global = true, env = "IDMSVC_RBAC_URL")]
    rbac_url: Option<String>,
    /// Bearer token sent with every request
    #[arg(long, global = true, env = "IDMSVC_AUTH_TOKEN", hide_env_values = true)]
    token: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered identity domains
    List {
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
        #[arg(long)]
        per_page: Option<u32>,
        #[arg(long, value_enum)]
        sort: Option<CliSortColumn>,
        #[arg(long, requires = "sort")]
        desc: bool,
    },
    /// Show one identity domain
    Show { id: String },
    #[command(name = "set-title")]
    SetTitle { id: String, title: String },
    #[command(name = "set-description")]
    SetDescription { id: String, description: String },
    #[command(name = "auto-join")]
    AutoJoin {
        id: String,
        #[arg(value_enum)]
        state: Toggle,
    },
    Delete { id: String },
    /// Register a new identity domain
    Register {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, help = "Leave automatic enrollment disabled")]
        no_auto_join: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("default subscriber")?;

    let cfg = ConsoleConfig {
        base_url: cli.base_url,
        rbac_url: cli.rbac_url,
        token: cli.token,
        poller: PollerConfig::default(),
    };

    match cli.command {
        Commands::List {
            page,
            per_page,
            sort,
            desc,
        } => {
            commands::cmd_list(&cfg, page, per_page, sort.map(Into::into), desc).await?;
        }
        Commands::Show { id } => {
            commands::cmd_show(&cfg, id).await?;
        }
        Commands::SetTitle { id, title } => {
            commands::cmd_set_title(&cfg, id, title).await?;
        }
        Commands::SetDescription { id, description } => {
            commands::cmd_set_description(&cfg, id, description).await?;
        }
        Commands::AutoJoin { id, state } => {
            commands::cmd_auto_join(&cfg, id, state.into()).await?;
        }
        Commands::Delete { id } => {
            commands::cmd_delete(&cfg, id).await?;
        }
        Commands::Register {
            title,
            description,
            no_auto_join,
        } => {
            let opts = RegisterOptions {
                title,
                description,
                no_auto_join,
            };
            commands::cmd_register(&cfg, opts).await?;
        }
    }

    Ok(())
}
