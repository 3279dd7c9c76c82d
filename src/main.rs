//! repodigest - Turn a directory into a text digest for LLM prompts
//!
//! repodigest provides:
//! - A sorted ASCII tree of the directory
//! - The content of every text file, with encoding fallback
//! - A summary with an estimated token count
//! - Text or JSON output

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::run(cli)
}
