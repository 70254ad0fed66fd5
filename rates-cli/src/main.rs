use std::io;

use clap::Parser;
use tracing::debug;

use rates_cli::{Cli, logging, run};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_file.as_deref())?;

    debug!(?cli, "starting");
    run(&cli, io::stdout().lock())
}
