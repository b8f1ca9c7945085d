//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docchat")]
#[command(
    author,
    version,
    about = "Ask questions about a PDF, or leave your details for a call back"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, env = "DOCCHAT_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive chat about a document
    Chat(ChatArgs),

    /// Ask a single question about a document
    Ask(AskArgs),

    /// Build a retrieval index for a document
    Index(IndexArgs),

    /// Show how a message would be routed
    Route(RouteArgs),

    /// Collect contact details for a call back
    Schedule,

    /// Show the effective configuration
    Config,
}

#[derive(Args)]
pub struct ChatArgs {
    /// PDF to load before the conversation starts
    pub pdf: Option<PathBuf>,

    /// Reuse an index directory built by `docchat index`
    #[arg(long, conflicts_with = "pdf")]
    pub index: Option<PathBuf>,
}

#[derive(Args)]
pub struct AskArgs {
    /// PDF to answer from
    pub pdf: PathBuf,

    /// Question
    #[arg(required = true)]
    pub question: Vec<String>,

    /// Print the chunks the answer was based on
    #[arg(long)]
    pub sources: bool,
}

#[derive(Args)]
pub struct IndexArgs {
    /// PDF to index
    pub pdf: PathBuf,
}

#[derive(Args)]
pub struct RouteArgs {
    /// Message to classify
    #[arg(required = true)]
    pub query: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Cli,
    Json,
}
