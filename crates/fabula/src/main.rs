//! Fabula CLI binary.
//!
//! Drives a book through its lifecycle from the command line: submit,
//! preview, pay, complete, and targeted cover/page regeneration.

use clap::Parser;
use fabula::cli::{run, Cli};
use fabula::observability;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    observability::init_tracing(cli.verbose);

    run(cli.command).await?;
    Ok(())
}
