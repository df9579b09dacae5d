use anyhow::Result;
use clap::Parser;

use handover_desk::cli::{run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    run(Cli::parse()).await
}
