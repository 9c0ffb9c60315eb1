use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

pub const CIRRUS_BEFORE_HELP: &str = concat!(
    "cirrus ",
    env!("CARGO_PKG_VERSION"),
    " – published cloud artifact resolution\n\n",
    "\x1b[1;36mImage metadata\x1b[0m\n",
    "  metadata refresh   Fetch image records from every source and save them to the catalog.\n",
    "  metadata list      Show stored image records grouped by source.\n",
    "  metadata search    Show what a refresh would fetch, without saving.\n",
    "  metadata save      Save custom image records from a JSON file.\n\n",
    "\x1b[1;36mAgent tools\x1b[0m\n",
    "  tools ensure       Select published tools for a bootstrap, building them if allowed.\n",
);

#[derive(Parser, Debug)]
#[command(
    name = "cirrus",
    author,
    version,
    disable_help_subcommand = true,
    before_help = CIRRUS_BEFORE_HELP
)]
pub struct CirrusCli {
    #[arg(
        short,
        long,
        help = "Suppress human output (errors still print to stderr)",
        global = true
    )]
    pub quiet: bool,
    #[arg(short, long, action = ArgAction::Count, help = "Increase logging (-vv reaches trace)", global = true)]
    pub verbose: u8,
    #[arg(long, help = "Force trace logging regardless of -v/-q", global = true)]
    pub trace: bool,
    #[arg(
        long,
        help = "Emit {status,message,details} JSON envelopes",
        global = true
    )]
    pub json: bool,
    #[arg(long, help = "Disable colored human output", global = true)]
    pub no_color: bool,
    #[command(subcommand)]
    pub command: CommandGroupCli,
}

#[derive(Subcommand, Debug)]
pub enum CommandGroupCli {
    #[command(subcommand, about = "Refresh, inspect and extend the image metadata catalog.")]
    Metadata(MetadataCommand),
    #[command(subcommand, about = "Resolve agent tools for a bootstrap.")]
    Tools(ToolsCommand),
}

#[derive(Subcommand, Debug)]
pub enum MetadataCommand {
    #[command(about = "Fetch image records from every source and save them to the catalog.")]
    Refresh,
    #[command(about = "Show stored image records grouped by source.")]
    List(FilterArgs),
    #[command(about = "Show what a refresh would fetch, without saving.")]
    Search(FilterArgs),
    #[command(about = "Save custom image records from a JSON file.")]
    Save(SaveArgs),
}

#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    #[arg(long, value_name = "REGION")]
    pub region: Option<String>,
    #[arg(long = "series", value_name = "SERIES")]
    pub series: Vec<String>,
    #[arg(long = "arch", value_name = "ARCH")]
    pub arches: Vec<String>,
    #[arg(long, value_name = "STREAM")]
    pub stream: Option<String>,
}

#[derive(Args, Debug)]
pub struct SaveArgs {
    #[arg(value_name = "RECORDS", help = "JSON array of image records")]
    pub path: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum ToolsCommand {
    #[command(about = "Select published tools for a bootstrap, building them if allowed.")]
    Ensure(EnsureArgs),
}

#[derive(Args, Debug)]
pub struct EnsureArgs {
    #[arg(long, value_name = "SERIES", help = "Target series (defaults to the environment's)")]
    pub series: Option<String>,
    #[arg(long, value_name = "ARCH")]
    pub arch: Option<String>,
}
