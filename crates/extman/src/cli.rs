//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// extman - fetch, verify, and install CLI extensions
#[derive(Parser, Debug)]
#[command(name = "extman")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration directory (overrides EXTMAN_HOME)
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List catalogued extensions
    List(ListArgs),

    /// Show releases and artifacts of one extension
    Info(InfoArgs),

    /// Re-download the extension catalog
    Refresh(RefreshArgs),

    /// Install an extension from the catalog or a distribution archive
    Install(InstallArgs),

    /// Run an installed extension
    Exec(ExecArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Show installed extensions only
    #[arg(long)]
    pub installed: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Extension name
    pub name: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RefreshArgs {}

#[derive(Args, Debug)]
#[command(disable_version_flag = true)]
pub struct InstallArgs {
    /// Extension name to install from the catalog
    #[arg(required_unless_present_any = ["archive", "url"])]
    pub name: Option<String>,

    /// Release to install (default: most recently published)
    #[arg(long, requires = "name")]
    pub version: Option<String>,

    /// Install from a local .tar.gz distribution archive
    #[arg(long, value_name = "PATH", conflicts_with_all = ["name", "url"])]
    pub archive: Option<Utf8PathBuf>,

    /// Install from a .tar.gz distribution archive URL
    #[arg(long, conflicts_with_all = ["name", "archive"])]
    pub url: Option<String>,
}

#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Extension name
    pub name: String,

    /// Arguments passed through to the extension
    #[arg(last = true)]
    pub args: Vec<String>,
}
