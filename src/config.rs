//! Environment-driven configuration.

use std::time::Duration;

use anyhow::Context;
use figment::{Figment, providers::Env};
use serde::Deserialize;

use crate::portal::WaitConfig;

/// Application configuration, loaded from `CANELINK_`-prefixed environment
/// variables. Every field has a working default except `database_url`, whose
/// absence selects the CSV sink.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Class-search entry point of the portal.
    #[serde(default = "default_portal_url")]
    pub portal_url: String,
    /// Address of a running WebDriver server (geckodriver).
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    /// Postgres connection string. When unset, results go to `csv_path`.
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_csv_path")]
    pub csv_path: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_headless")]
    pub headless: bool,
    #[serde(default = "default_element_timeout_secs")]
    pub element_timeout_secs: u64,
    #[serde(default = "default_submit_timeout_secs")]
    pub submit_timeout_secs: u64,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

fn default_portal_url() -> String {
    "https://canelink.miami.edu/psp/UMIACP1D/EMPLOYEE/SA/s/\
     WEBLIB_HCX_CM.H_CLASS_SEARCH.FieldFormula.IScript_Main"
        .to_string()
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_csv_path() -> String {
    "sections.csv".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_element_timeout_secs() -> u64 {
    20
}

fn default_submit_timeout_secs() -> u64 {
    20
}

fn default_settle_delay_ms() -> u64 {
    1000
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Figment::new()
            .merge(Env::prefixed("CANELINK_"))
            .extract()
            .context("Failed to load config")
    }

    pub fn wait_config(&self) -> WaitConfig {
        WaitConfig {
            element_timeout: Duration::from_secs(self.element_timeout_secs),
            submit_timeout: Duration::from_secs(self.submit_timeout_secs),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            ..WaitConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_field_except_database() {
        // Deserialize from an empty document so host CANELINK_* variables
        // can't leak into the assertions.
        let config: Config = serde_json::from_str("{}").unwrap();
        assert!(config.portal_url.contains("canelink.miami.edu"));
        assert_eq!(config.webdriver_url, "http://localhost:4444");
        assert_eq!(config.database_url, None);
        assert_eq!(config.csv_path, "sections.csv");
        assert!(config.headless);
        assert_eq!(config.wait_config().element_timeout.as_secs(), 20);
    }

    #[test]
    fn environment_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("CANELINK_WEBDRIVER_URL", "http://driver:9515");
            jail.set_env("CANELINK_HEADLESS", "false");
            jail.set_env("CANELINK_SETTLE_DELAY_MS", "250");
            let config: Config = Figment::new()
                .merge(Env::prefixed("CANELINK_"))
                .extract()
                .unwrap();
            assert_eq!(config.webdriver_url, "http://driver:9515");
            assert!(!config.headless);
            assert_eq!(config.wait_config().settle_delay.as_millis(), 250);
            Ok(())
        });
    }
}
