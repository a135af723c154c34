use std::process::ExitCode;
use suite_runner::cli;

#[tokio::main]
async fn main() -> ExitCode {
    // Locale detection; the CLI may override it via --lang.
    suite_runner::init();

    match cli::run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
