use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Table};
use stagehand::config::{HostConfig, Options, OptionsLoader, RandomSetting};
use stagehand::{StagehandError, Suite};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the suite
    Run(RunArgs),
    /// Print the execution order without running anything
    List(RunArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Suite name, used for log and report file names
    #[arg(long, default_value = "acceptance")]
    pub name: String,

    /// Test file or directory; repeatable
    #[arg(short, long = "tests", value_name = "PATH")]
    pub tests: Vec<PathBuf>,

    /// Host configuration file (YAML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Options file, instead of searching for stagehand.toml
    #[arg(long, value_name = "FILE")]
    pub options: Option<PathBuf>,

    /// Shuffle the test order with a fresh seed
    #[arg(long)]
    pub random: bool,

    /// Shuffle the test order with the given seed
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Write a JUnit XML report
    #[arg(long)]
    pub xml: bool,

    #[arg(short, long)]
    pub quiet: bool,

    /// Do not write the per-run log file
    #[arg(long)]
    pub stdout_only: bool,

    /// Stop at the first failed or errored test
    #[arg(long)]
    pub fail_fast: bool,

    /// Show skipped tests on stdout
    #[arg(short, long)]
    pub verbose: bool,

    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    #[arg(long, value_name = "DIR")]
    pub junit_dir: Option<PathBuf>,

    /// Command used to launch each test file, e.g. "sh"
    #[arg(long, value_name = "CMD")]
    pub runner: Option<String>,
}

impl RunArgs {
    /// CLI flags take precedence over the options file.
    pub fn apply(&self, options: &mut Options) {
        if !self.tests.is_empty() {
            options.tests = self.tests.clone();
        }

        if let Some(seed) = self.seed {
            options.random = RandomSetting::Seed(seed);
        } else if self.random {
            options.random = RandomSetting::Enabled(true);
        }

        options.xml |= self.xml;
        options.quiet |= self.quiet;
        options.stdout_only |= self.stdout_only;
        options.verbose |= self.verbose;

        if let Some(config) = &self.config {
            options.config = Some(config.clone());
        }
        if let Some(log_dir) = &self.log_dir {
            options.log_dir = log_dir.clone();
        }
        if let Some(junit_dir) = &self.junit_dir {
            options.junit_dir = junit_dir.clone();
        }
        if let Some(runner) = &self.runner {
            options.runner = Some(runner.clone());
        }
    }

    fn load_options(&self) -> stagehand::Result<Options> {
        let mut options = match &self.options {
            Some(path) => OptionsLoader::load_from_path(path)?,
            None => OptionsLoader::find_and_load()?.unwrap_or_default(),
        };
        self.apply(&mut options);
        Ok(options)
    }

    fn build_suite(&self) -> stagehand::Result<Suite> {
        let options = self.load_options()?;
        let config = match &options.config {
            Some(path) => HostConfig::load_from_path(path)?,
            None => HostConfig::default(),
        };
        let hosts = config.hosts();
        Suite::new(&self.name, hosts, options, config, self.fail_fast)
    }
}

pub fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Run(args) => {
            let mut suite = args.build_suite()?;
            match suite.run_and_check() {
                Ok(_) => Ok(ExitCode::SUCCESS),
                Err(StagehandError::SuiteFailed { .. }) => Ok(ExitCode::from(1)),
                Err(e) => Err(e.into()),
            }
        }
        Commands::List(args) => {
            let suite = args.build_suite()?;
            print_order(&suite);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_order(suite: &Suite) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["#", "Test file"]);

    for (index, path) in suite.test_files().iter().enumerate() {
        table.add_row(vec![
            Cell::new(index + 1).add_attribute(Attribute::Dim),
            Cell::new(path.display()),
        ]);
    }

    println!("{}", table);
    println!("{}", order_footer(suite));
}

/// Everything the run would use besides the file order.
fn order_footer(suite: &Suite) -> String {
    let mut lines = vec![match suite.random_seed() {
        Some(seed) => format!("{} test files, random seed {}", suite.test_files().len(), seed),
        None => format!("{} test files", suite.test_files().len()),
    }];

    if !suite.hosts().is_empty() {
        let names: Vec<&str> = suite.hosts().iter().map(|h| h.name.as_str()).collect();
        let source = match &suite.config().source {
            Some(path) => format!(" (from {})", path.display()),
            None => String::new(),
        };
        lines.push(format!("hosts: {}{}", names.join(", "), source));
    }
    if let Some(runner) = &suite.options().runner {
        lines.push(format!("runner: {}", runner));
    }
    if suite.stop_on_error() {
        lines.push("stops at the first failure".to_string());
    }
    lines.join("\n")
}
