use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use mosaic::actor::reactor::Command;
use mosaic::actor::reactor::replay::{self, Driver, Record, Scenario};
use mosaic::common::config::{Config, config_file};
use mosaic::common::log;
use strum::VariantNames;

#[derive(Parser)]
struct Cli {
    /// Path to configuration file to use (overrides default).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario against the headless window system and print the
    /// resulting window geometry.
    Run {
        scenario: PathBuf,

        /// Record every step to the specified file path. Overwrites the file
        /// if it exists.
        #[arg(long)]
        record: Option<PathBuf>,

        /// Print the layout tree after the run.
        #[arg(long)]
        tree: bool,

        /// Print geometry as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Replay a recording made with `run --record`.
    Replay {
        recording: PathBuf,

        #[arg(long)]
        tree: bool,
    },
    /// Check the configuration file for problems.
    Validate,
    /// List the commands a scenario may issue.
    Commands,
}

fn main() {
    let opt = Cli::parse();
    log::init_logging();

    if let Err(e) = run(opt) {
        eprintln!("{e:#}");
        process::exit(1);
    }
}

fn run(opt: Cli) -> anyhow::Result<()> {
    let config_path = opt.config.clone().unwrap_or_else(config_file);

    match opt.command {
        Commands::Validate => {
            let config = Config::read(&config_path)?;
            let issues = config.validate();
            if issues.is_empty() {
                println!("Config validation passed");
                return Ok(());
            }
            for issue in issues {
                eprintln!("{issue}");
            }
            process::exit(1);
        }
        Commands::Commands => {
            for name in Command::VARIANTS {
                println!("{name}");
            }
            Ok(())
        }
        Commands::Run { scenario, record, tree, json } => {
            let config = if config_path.exists() { Config::read(&config_path)? } else { Config::default() };
            let scenario = Scenario::read(&scenario)?;
            let mut driver = Driver::new(&config, Record::new(record.as_deref())?)?;
            driver.run(scenario.steps)?;
            print_result(&driver, tree, json)
        }
        Commands::Replay { recording, tree } => {
            let driver = replay::replay(&recording)?;
            print_result(&driver, tree, false)
        }
    }
}

fn print_result(driver: &Driver, tree: bool, json: bool) -> anyhow::Result<()> {
    if tree {
        println!("{}", driver.reactor().draw_tree());
    }
    let rects = driver.rects();
    if json {
        println!("{}", serde_json::to_string_pretty(&rects)?);
        return Ok(());
    }
    for (name, rect) in rects {
        println!("{name}: {}x{}+{}+{}", rect.width, rect.height, rect.x, rect.y);
    }
    Ok(())
}
