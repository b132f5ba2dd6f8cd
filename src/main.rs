use anyhow::Result;
use clap::Parser;
use tracing::error;

use knockmap::territory::{print_analysis_results, print_json};
use knockmap::{analyze_territory, sqlite, utils, Args, Config};

fn run(args: &Args) -> Result<()> {
    let config = Config::from_env()?;

    if args.init {
        let path = sqlite::resolve_database_path(args.database.as_deref(), config.database.as_deref())?;
        sqlite::init_database(&path)?;
        println!("Created empty contact store at {}", path.display());
        return Ok(());
    }

    let result = analyze_territory(args, &config)?;
    if args.json {
        print_json(&result, args)?;
    } else {
        print_analysis_results(&result, args);
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    utils::setup_logging(args.verbose);

    utils::validate_args(&args)?;

    match run(&args) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
