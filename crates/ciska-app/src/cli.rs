use std::path::PathBuf;

use clap::Parser;

/// Ciska host process: answers window-content calls as JSON lines on
/// stdin/stdout.
#[derive(Parser, Debug)]
#[command(name = "ciska", version, about)]
pub struct Args {
    /// Environment name; selects `~/.config/ciska/<env>/config.json`.
    #[arg(long, env = "CISKA_ENV", default_value = ciska_config::DEFAULT_ENVIRONMENT)]
    pub env: String,

    /// Directory holding `config.json`, instead of the per-environment default.
    #[arg(long)]
    pub config_dir: Option<PathBuf>,

    /// Log filter override (debug, info, warn, error, or a tracing directive).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}
