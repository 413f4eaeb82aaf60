mod cli;

use clap::Parser;
use cli::Cli;
use colored::Colorize;
use std::process::ExitCode;

fn main() -> ExitCode {
    stagehand::logger::init_logger();

    let cli = Cli::parse();
    match cli::run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::from(2)
        }
    }
}
