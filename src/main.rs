use restcov::cli::run_cli;

#[tokio::main]
async fn main() {
    // Load .env file if it exists (optional - won't fail if missing)
    // This must happen before any config is read from environment
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    match run_cli().await {
        Ok(outcome) => std::process::exit(outcome.exit_code()),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            let code = err.downcast_ref::<restcov::Error>().map_or(1, restcov::Error::exit_code);
            std::process::exit(code);
        }
    }
}
