//! drcov-dump: print the modules and block coverage recorded in a drcov log.
//!
//! ```bash
//! drcov-dump -i drcov.target.exe.01234.0000.proc.log
//! drcov-dump -i drcov.log --verbose      # list every block
//! drcov-dump -i drcov.log --json         # full parse result as JSON
//! drcov-dump -i drcov.log -m libc        # a single module
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use drcov_log::logging::{init_tracing, init_tracing_json};
use drcov_log::{CoverageParser, DrcovError, DrcovParser, LookupMode, ParserConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "drcov-dump", version, about = "DrCov log parser test harness")]
struct Cli {
    /// Path to the drcov file to parse
    #[arg(short, long)]
    input: PathBuf,

    /// Print every basic block of every module
    #[arg(short, long)]
    verbose: bool,

    /// Emit the parsed log as JSON instead of a summary
    #[arg(long)]
    json: bool,

    /// Only report the module matching this name
    #[arg(short, long)]
    module: Option<String>,

    /// Match --module names exactly instead of fuzzily
    #[arg(long)]
    strict: bool,

    /// Parser configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.log_json {
        init_tracing_json();
    } else {
        init_tracing();
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<ParserConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            ParserConfig::from_json(&json)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => ParserConfig::default(),
    };
    if cli.strict {
        config.lookup = LookupMode::Strict;
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let mut parser = DrcovParser::from_path(&cli.input).with_config(config);
    parser
        .parse()
        .with_context(|| format!("parsing {}", cli.input.display()))?;

    let log = parser.log().context("parser reported success without a log")?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(log)?);
        return Ok(());
    }

    let modules = match &cli.module {
        Some(name) => {
            let module = log
                .module(name, parser.config().lookup)
                .ok_or_else(|| DrcovError::ModuleNotFound(name.clone()))?;
            std::slice::from_ref(module)
        }
        None => log.modules(),
    };

    for module in modules {
        println!("{module}");
        let blocks = log.blocks_by_module_id(module.id);
        println!("  Basic Blocks: {}", blocks.len());
        if cli.verbose {
            for block in &blocks {
                println!("    Block @ {:#x} of size {}", block.offset, block.size);
            }
        }
    }

    Ok(())
}
