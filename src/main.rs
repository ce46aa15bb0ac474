//! vibeeval - evaluate SQL scalar expressions from the command line

use anyhow::Result;
use clap::Parser as ClapParser;
use std::path::PathBuf;
use vibeeval::demo::{Runner, Source};

/// Evaluate SQL scalar expressions and print the result
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Files holding one expression each; `-` or no path reads standard input
    paths: Vec<PathBuf>,

    /// Bind a column to a constant expression, e.g. `--bind R.A=100`
    #[arg(short, long = "bind", value_name = "NAME=EXPR")]
    bind: Vec<String>,

    /// Fail on unbound columns instead of reading them as 0
    #[arg(long)]
    strict: bool,

    /// Enable info logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let runner = Runner::new(&args.bind, args.strict)?;

    for source in Source::from_paths(&args.paths) {
        println!("{}", runner.run_source(&source)?);
    }

    Ok(())
}
