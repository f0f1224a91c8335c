use clap::Parser;
use log::warn;
use snafu::ErrorCompat;

mod args;
mod report;

fn main() {
    let parsed = args::Args::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if parsed.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    if let Err(e) = report::run_report(&parsed) {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
