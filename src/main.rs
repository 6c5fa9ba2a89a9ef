use canelink::app::App;
use canelink::cli::Args;
use canelink::config::Config;
use canelink::logging::setup_logging;
use clap::Parser;
use std::process::ExitCode;
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load config and setup logging before App::new() so startup logs are
    // never silently dropped.
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e:?}");
            return ExitCode::FAILURE;
        }
    };
    setup_logging(&config, args.tracing);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = if cfg!(debug_assertions) {
            "development"
        } else {
            "production"
        },
        "starting canelink"
    );

    let app = match App::new(config, &args).await {
        Ok(app) => app,
        Err(e) => {
            tracing::error!(error = ?e, "failed to initialize application");
            return ExitCode::FAILURE;
        }
    };
    app.run().await
}
