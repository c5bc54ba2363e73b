//! CLI argument parsing for the takeout workflow.
//!
//! The CLI is intentionally thin: it maps flags onto pipeline configs and
//! picks the delivery/confirmation implementations, so the same core logic
//! can be reused elsewhere.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default delivery folder for organized raw frames.
pub const DEFAULT_EXPORT_DIR: &str = "export";
/// Default folder for serialized `.eml` messages in dry runs.
pub const DEFAULT_OUTBOX_DIR: &str = "outbox";

/// Root CLI entrypoint for the takeout workflow.
#[derive(Parser, Debug)]
#[command(
    name = "takeout",
    version,
    about = "Photoshoot delivery workflow: stage selected raw frames, then mail out edited picks",
    after_help = "Commands:\n  organize --input <dir> --output <dir>   Copy the raw frames clients selected into a fresh folder\n  dispatch --input <dir> --sender <addr>  Email each client their edited picks (.eml dry run by default)\n\nExamples:\n  takeout organize --input ./shoot --output ./export\n  takeout organize --input ./shoot --output ./export --picks \"IMG_0001,IMG_0002\"\n  takeout dispatch --input ./edited --sender me@gmail.com\n  takeout dispatch --input ./edited --sender me@gmail.com --send\n  takeout dispatch --input ./edited --sender me@gmail.com --roster ./selects.csv --json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level workflow commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    Organize(OrganizeArgs),
    Dispatch(DispatchArgs),
}

/// Organize command inputs for staging a delivery folder.
#[derive(Parser, Debug)]
#[command(about = "Copy selected raw frames into a fresh delivery folder")]
pub struct OrganizeArgs {
    /// Directory holding the raw frames (and the roster, unless --roster)
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub input: PathBuf,

    /// Delivery directory; must not exist or must be empty
    #[arg(long, value_name = "DIR", default_value = DEFAULT_EXPORT_DIR)]
    pub output: PathBuf,

    /// Selection roster; defaults to the unique .csv in the input directory
    #[arg(long, value_name = "CSV", conflicts_with = "picks")]
    pub roster: Option<PathBuf>,

    /// Comma-separated frame stems to copy instead of reading a roster
    #[arg(long, value_name = "LIST", conflicts_with = "roster")]
    pub picks: Option<String>,

    /// Match frame names against files on disk ignoring ASCII case
    #[arg(long)]
    pub any_case: bool,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

/// Dispatch command inputs for mailing edited picks.
#[derive(Parser, Debug)]
#[command(about = "Email each client their edited picks (dry run unless --send)")]
pub struct DispatchArgs {
    /// Directory holding the edited frames (and the roster, unless --roster)
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub input: PathBuf,

    /// Directory for .eml files in dry runs; must not exist or must be empty
    #[arg(long, value_name = "DIR", default_value = DEFAULT_OUTBOX_DIR)]
    pub output: PathBuf,

    /// Selection roster; defaults to the unique .csv in the input directory
    #[arg(long, value_name = "CSV")]
    pub roster: Option<PathBuf>,

    /// Sender address; also the SMTP login for live sends
    #[arg(long, value_name = "ADDR")]
    pub sender: String,

    /// Actually transmit over SMTP instead of writing .eml files
    #[arg(long)]
    pub send: bool,

    /// Skip the confirmation prompt before a live send
    #[arg(long, requires = "send")]
    pub yes: bool,

    /// Require frame names on disk to match case exactly
    #[arg(long)]
    pub exact_case: bool,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}
