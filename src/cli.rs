use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "synq-monitors")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Manage custom monitors and SQL tests as code", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Client ID (overrides the config file)
    #[arg(long, env = "SYNQ_CLIENT_ID", global = true, hide_env_values = true)]
    pub client_id: Option<String>,

    /// Client secret (overrides the config file)
    #[arg(long, env = "SYNQ_CLIENT_SECRET", global = true, hide_env_values = true)]
    pub client_secret: Option<String>,

    /// API URL, e.g. https://developer.synq.io (overrides the config file)
    #[arg(long, env = "SYNQ_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Config file [default: ~/.config/synq-monitors/config.toml]
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Deploy monitors and SQL tests from YAML files
    ///
    /// Prints the changes for each namespace and asks for confirmation before
    /// applying them. With no files, searches the working directory for YAML.
    Deploy(DeployArgs),

    /// Export existing monitors to a YAML file
    Export(ExportArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Deploy
// ============================================================================

#[derive(Parser)]
pub struct DeployArgs {
    /// YAML files to deploy
    pub files: Vec<PathBuf>,

    /// Skip interactive confirmations
    #[arg(long)]
    pub auto_confirm: bool,

    /// Only change these namespaces (repeatable)
    #[arg(long = "namespace", value_name = "NAMESPACE")]
    pub namespaces: Vec<String>,

    /// Print the definitions that would be sent, as JSON
    #[arg(short, long)]
    pub print_payload: bool,

    /// Show changes without applying them
    #[arg(long)]
    pub dry_run: bool,
}

// ============================================================================
// Export
// ============================================================================

#[derive(Parser)]
pub struct ExportArgs {
    /// File to write; must not exist
    pub output: PathBuf,

    /// Namespace written into the exported file and used to filter monitors
    #[arg(long)]
    pub namespace: Option<String>,

    /// Only monitors of these integrations (repeatable)
    #[arg(long = "integration", value_name = "ID")]
    pub integrations: Vec<String>,

    /// Only monitors on these entities (repeatable)
    #[arg(long = "monitored", value_name = "PATH")]
    pub monitored: Vec<String>,

    /// Only these monitors (repeatable)
    #[arg(long = "monitor", value_name = "ID")]
    pub monitors: Vec<String>,

    /// Which monitors to include, by who manages them
    #[arg(long, value_enum, default_value = "api")]
    pub source: SourceArg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    App,
    Api,
    All,
}

impl From<SourceArg> for synq_client::SourceFilter {
    fn from(source: SourceArg) -> Self {
        match source {
            SourceArg::App => Self::App,
            SourceArg::Api => Self::Api,
            SourceArg::All => Self::All,
        }
    }
}
