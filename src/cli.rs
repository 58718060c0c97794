use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "notifybox")]
#[command(about = "Fan a notification out to many services", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a notification to configured and listed destinations
    Send(SendArgs),
    /// Print how a destination URL decomposes
    Parse(ParseArgs),
    /// List registered providers and their schemes
    Providers,
}

#[derive(clap::Args, Debug)]
pub struct SendArgs {
    /// Extra destination URLs (untagged)
    pub urls: Vec<String>,

    /// Message body; read from stdin when omitted
    #[arg(short, long)]
    pub body: Option<String>,

    #[arg(short, long)]
    pub title: Option<String>,

    /// Only send to destinations carrying one of these tags
    #[arg(short = 'g', long = "tag")]
    pub tags: Vec<String>,

    /// Placeholder value as key=value
    #[arg(short, long = "param", value_parser = parse_key_val)]
    pub params: Vec<(String, String)>,

    /// Configuration file (YAML or TOML)
    #[arg(short, long)]
    pub config: Vec<PathBuf>,

    /// Tags to notify when a destination fails
    #[arg(long = "fallback-tag")]
    pub fallback_tags: Vec<String>,

    /// Do not register the built-in providers
    #[arg(long)]
    pub no_builtins: bool,

    /// Ignore NOTIFYBOX_* variables and default config files
    #[arg(long)]
    pub no_env: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct ParseArgs {
    pub url: String,
}

fn parse_key_val(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(key, val)| (key.trim().to_string(), val.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{value}'"))
}
