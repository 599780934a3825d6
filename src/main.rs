// src/main.rs

use watchrun::errors::WatchrunError;
use watchrun::{cli, logging, run};

#[tokio::main]
async fn main() {
    let args = cli::parse();

    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("watchrun error: {err:?}");
        std::process::exit(1);
    }

    match run(args).await {
        Ok(()) => {}
        Err(err @ WatchrunError::StartupConfig(_)) => {
            eprintln!("watchrun: {err}\n");
            eprintln!("{}", cli::usage());
            std::process::exit(1);
        }
        Err(err) => {
            tracing::error!(error = %err, "fatal error");
            eprintln!("watchrun error: {err:?}");
            std::process::exit(1);
        }
    }
}
