use clap::Parser;
use colored::*;
use std::process;

use userreg_cli::{init_logging, run, Cli};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            process::exit(1);
        }
    }
}
