use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "verso",
    about = "Verso: local file versioning and line diffs",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding stored versions [default: ~/.verso/versions]
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Snapshot the current content of a file
    Create(CreateArgs),
    /// List the versions of a file, newest first
    List(FileArgs),
    /// Show one version
    Show(ShowArgs),
    /// Restore a version (the current content is backed up first)
    Restore(VersionArgs),
    /// Delete one version
    Delete(VersionArgs),
    /// Delete every version of a file
    Clear(FileArgs),
    /// Diff two versions of a file
    Compare(CompareArgs),
    /// Diff two files
    Diff(DiffArgs),
    /// Report whether a file can be versioned and compared
    Check(FileArgs),
}

#[derive(Args, Debug)]
pub struct FileArgs {
    pub path: PathBuf,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    pub path: PathBuf,
    /// Note stored with the version
    #[arg(short, long, default_value = "")]
    pub message: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    pub path: PathBuf,
    pub id: String,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    pub path: PathBuf,
    pub id: String,
    /// Print the stored content
    #[arg(long)]
    pub content: bool,
    /// Re-hash the stored content and check it against the record
    #[arg(long)]
    pub verify: bool,
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    pub path: PathBuf,
    pub left: String,
    pub right: String,
}

#[derive(Args, Debug)]
pub struct DiffArgs {
    pub left: PathBuf,
    pub right: PathBuf,
}
