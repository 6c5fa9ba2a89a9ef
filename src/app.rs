use crate::cli::Args;
use crate::config::Config;
use crate::scraper::Runner;
use anyhow::Context;
use sqlx::ConnectOptions;
use sqlx::postgres::PgPoolOptions;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing::{error, info};

/// Main application struct containing all necessary components
pub struct App {
    runner: Runner,
}

impl App {
    /// Create a new App instance with all necessary components initialized
    pub async fn new(mut config: Config, args: &Args) -> Result<Self, anyhow::Error> {
        if let Some(path) = &args.csv_path {
            config.csv_path = path.clone();
        }
        let pool = match &config.database_url {
            Some(database_url) => {
                let connect_options = sqlx::postgres::PgConnectOptions::from_str(database_url)
                    .context("Failed to parse database URL")?
                    .log_statements(tracing::log::LevelFilter::Debug)
                    .log_slow_statements(tracing::log::LevelFilter::Warn, Duration::from_secs(1));

                let pool = PgPoolOptions::new()
                    .min_connections(0)
                    .max_connections(2)
                    .acquire_timeout(Duration::from_secs(4))
                    .connect_with(connect_options)
                    .await
                    .context("Failed to create database pool")?;
                info!(max_connections = 2, "database pool established");

                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .context("Failed to run database migrations")?;
                Some(pool)
            }
            None => {
                info!("no database configured, writing to CSV");
                None
            }
        };

        let runner = Runner::new(config, pool, args.scope(), args.wants_csv(), args.force);
        Ok(App { runner })
    }

    /// Run the scrape and translate the outcome into a process exit code.
    pub async fn run(self) -> ExitCode {
        match self.runner.run().await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!(error = ?e, "scrape failed");
                ExitCode::FAILURE
            }
        }
    }
}
