use clap::Parser;
use log::LevelFilter;
use snafu::ErrorCompat;

mod args;
mod report;

fn main() {
    let args = args::Args::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if args.verbose && std::env::var_os("RUST_LOG").is_none() {
        logger.filter_level(LevelFilter::Info);
    }
    logger.init();

    let res = report::settings_from_args(&args).and_then(|settings| report::run_report(&settings));

    match res {
        Ok(index) => println!("Successfully generated {}", index.display()),
        Err(e) => {
            eprintln!("An error occurred: {}", e);
            for cause in ErrorCompat::iter_chain(&e).skip(1) {
                eprintln!("  caused by: {}", cause);
            }
            std::process::exit(1);
        }
    }
}
