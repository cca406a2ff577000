use anyhow::Result;
use clap::Parser;

use cartpole::cli::{self, Args};
use ql::util::log::init_logging;

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    cli::run(&args)
}
