use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
pub struct Cli {
    /// Command script executed before the interactive prompt
    #[arg(long, short)]
    pub file: Option<PathBuf>,
}
