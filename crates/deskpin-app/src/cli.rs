use std::path::PathBuf;

use clap::Parser;

/// deskpin: keeps browser tabs on the virtual desktop and activity you are looking at.
#[derive(Parser, Debug)]
#[command(name = "deskpin", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Native bridge executable, overriding `native.command`.
    #[arg(long)]
    pub native_command: Option<String>,

    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    pub print_config: bool,
}

pub fn parse() -> Args {
    Args::parse()
}
