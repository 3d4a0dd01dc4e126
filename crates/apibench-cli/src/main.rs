//! `apibench`: fetch the same payload over REST, GraphQL or gRPC-Web and print
//! the timing/size report.

mod commands;

use anyhow::Result;
use apibench_core::observability::{self, LogSettings};
use clap::Parser;

use crate::commands::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log = LogSettings::from_env();
    if let Some(filter) = &cli.log_level {
        log = log.with_filter(filter.clone());
    }
    observability::init_with(log);

    commands::run(cli).await
}
