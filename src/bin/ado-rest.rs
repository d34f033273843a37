use anyhow::Result;
use clap::Parser;

use ado_rest::cli::{Args, run};
use ado_rest::logging::{init_logging, parse_early_log_config};

#[tokio::main]
async fn main() -> Result<()> {
    // Logging first so config resolution is traced too
    let raw_args: Vec<String> = std::env::args().collect();
    let _log_guard = init_logging(parse_early_log_config(&raw_args));

    let args = Args::parse();
    run(args).await
}
