use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tenet",
    version,
    about = "Compliance artifact graph: validate, cross-check, report, and generate documents"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Path to configuration file (defaults to ./tenet.yaml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Path to the artifact data directory (overrides config)
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List all loaded artifacts
    #[command(alias = "ls")]
    List,
    /// Validate all artifacts against their schemas
    Validate(ValidateArgs),
    /// Referential integrity check
    Refcheck(RefcheckArgs),
    /// Run a report, or list available reports
    Report(ReportArgs),
    /// Generate a document
    Document(DocumentArgs),
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Args)]
pub struct ValidateArgs {
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct RefcheckArgs {
    /// Also warn about controls with no satisfying component
    #[arg(long)]
    pub unsatisfied: bool,
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct ReportArgs {
    /// Report id; omit to list available reports
    pub id: Option<String>,
    /// Report parameters as NAME=VALUE
    pub params: Vec<String>,
}

#[derive(Args)]
pub struct DocumentArgs {
    /// Document id from the configuration
    pub id: String,
    /// Write rendered output here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
