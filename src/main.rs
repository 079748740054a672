use imgclass::batch::run_batch;
use imgclass::cli::CliArgs;
use imgclass::config::BatchConfig;
use imgclass::scan::ScanError;
use imgclass::util::logging::{self, parse_level, LoggingConfig};
use imgclass::VERSION;

use clap::error::ErrorKind;
use clap::Parser;
use std::env;
use tracing::{debug, error, Level};

/// Argument parsing or configuration problems
const EXIT_USAGE: i32 = 1;
/// Input directory missing or unusable
const EXIT_NO_DIRECTORY: i32 = 2;

#[tokio::main]
async fn main() {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // --help and --version surface as errors from try_parse but are
            // not usage failures
            let informational = matches!(
                err.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            );
            let _ = err.print();
            std::process::exit(if informational { 0 } else { EXIT_USAGE });
        }
    };

    init_logging_from_args(&args);

    debug!("imgclass v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = run(&args).await;
    std::process::exit(exit_code);
}

async fn run(args: &CliArgs) -> i32 {
    let config = BatchConfig::from_args(args);
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return EXIT_USAGE;
    }
    debug!("{}", config);

    match run_batch(&config).await {
        Ok(records) => {
            debug!(records, "Batch finished");
            0
        }
        Err(e) => {
            error!(error = %e, "Batch failed");
            eprintln!("Error: {:#}", e);
            if e.downcast_ref::<ScanError>().is_some() {
                EXIT_NO_DIRECTORY
            } else {
                EXIT_USAGE
            }
        }
    }
}

fn init_logging_from_args(args: &CliArgs) {
    let level = if let Some(level_str) = &args.log_level {
        parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        let level_str = env::var("IMGCLASS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        parse_level(&level_str)
    };

    logging::init_logging(LoggingConfig::with_level(level));
}
