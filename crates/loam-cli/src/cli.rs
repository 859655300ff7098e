use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "loam",
    about = "loam - content-addressed object store and staging index",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an empty repository or reinitialize an existing one
    Init(InitArgs),
    /// Compute an object id, optionally storing the object
    HashObject(HashObjectArgs),
    /// Show the kind, size or content of a stored object
    CatFile(CatFileArgs),
    /// Stage files in the index
    Add(AddArgs),
    /// List staged files
    LsFiles(LsFilesArgs),
    /// Compare the index with the working tree
    Status(StatusArgs),
}

#[derive(Args)]
pub struct InitArgs {
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct HashObjectArgs {
    /// Also write the object into the store
    #[arg(short = 'w')]
    pub write: bool,
    /// Object kind: blob, tree or commit
    #[arg(short = 't', default_value = "blob")]
    pub kind: String,
    pub file: PathBuf,
}

#[derive(Args)]
#[command(group(ArgGroup::new("mode").required(true).args(["show_type", "show_size", "print"])))]
pub struct CatFileArgs {
    /// Print the object kind
    #[arg(short = 't')]
    pub show_type: bool,
    /// Print the payload size
    #[arg(short = 's')]
    pub show_size: bool,
    /// Print the payload
    #[arg(short = 'p')]
    pub print: bool,
    /// Object id or unique prefix (at least 2 hex characters)
    pub object: String,
}

#[derive(Args)]
pub struct AddArgs {
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Args)]
pub struct LsFilesArgs {
    /// Show mode, object id and flags for each entry
    #[arg(short, long)]
    pub stage: bool,
}

#[derive(Args)]
pub struct StatusArgs {}
