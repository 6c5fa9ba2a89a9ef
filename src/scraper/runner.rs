//! Top-level run control: freshness gating, session lifecycle, one restart.
//!
//! A run owns exactly one browser session. The session is torn down whether
//! the harvest succeeds or fails, so an aborted run never leaks a driver
//! process. A failed run is retried once from scratch with a fresh session;
//! the second failure is final.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::data::course::CourseSection;
use crate::data::sections;
use crate::driver::{UiDriver, WebDriverClient};
use crate::export;
use crate::portal::FormNavigator;
use crate::scraper::harvester::{Harvester, Scope};
use crate::utils::fmt_duration;

pub struct Runner {
    config: Config,
    pool: Option<PgPool>,
    scope: Scope,
    use_csv: bool,
    force: bool,
}

impl Runner {
    pub fn new(
        config: Config,
        pool: Option<PgPool>,
        scope: Scope,
        use_csv: bool,
        force: bool,
    ) -> Self {
        Self {
            config,
            pool,
            scope,
            use_csv,
            force,
        }
    }

    fn writes_to_csv(&self) -> bool {
        self.use_csv || self.pool.is_none()
    }

    /// Whether the active sink already holds data captured today.
    async fn collected_today(&self) -> Result<bool> {
        if self.writes_to_csv() {
            export::was_written_today(Path::new(&self.config.csv_path))
        } else {
            let pool = self.pool.as_ref().context("database pool missing")?;
            sections::was_collected_today(pool).await
        }
    }

    /// Run to completion, retrying a failed harvest once with a fresh session.
    pub async fn run(&self) -> Result<()> {
        if !self.force && self.collected_today().await? {
            info!("data already collected today, nothing to do (use --force to override)");
            return Ok(());
        }

        match self.run_once().await {
            Ok(()) => Ok(()),
            Err(first) => {
                warn!(error = ?first, "run failed, restarting once with a fresh session");
                self.run_once()
                    .await
                    .map_err(|second| second.context("run failed again after restart"))
            }
        }
    }

    /// One full scrape with one browser session. The session is always quit,
    /// on success and on failure alike.
    async fn run_once(&self) -> Result<()> {
        let start = Instant::now();
        let driver = Arc::new(
            WebDriverClient::start(&self.config.webdriver_url, self.config.headless)
                .await
                .context("starting browser session")?,
        );

        let result = self.harvest(driver.clone()).await;

        if let Err(e) = driver.quit().await {
            warn!(error = ?e, "failed to quit browser session");
        }

        let sections = result?;
        self.persist(&sections).await?;
        info!(
            sections = sections.len(),
            duration = fmt_duration(start.elapsed()),
            "run complete"
        );
        Ok(())
    }

    async fn harvest(&self, driver: Arc<dyn UiDriver>) -> Result<Vec<CourseSection>> {
        let navigator = FormNavigator::new(driver, self.config.wait_config());
        navigator
            .open_portal(&self.config.portal_url)
            .await
            .context("opening the portal")?;
        let harvester = Harvester::new(&navigator, self.scope.clone());
        harvester.run().await.map_err(|e| {
            error!(error = %e, "harvest aborted");
            anyhow::Error::new(e)
        })
    }

    async fn persist(&self, sections: &[CourseSection]) -> Result<()> {
        // A harvest takes hours; another run may have written the sink in the
        // meantime. Re-check right before saving so one day never gets two
        // captures.
        if !self.force && self.collected_today().await? {
            info!(
                sections = sections.len(),
                "sink already written today by another run, discarding this capture"
            );
            return Ok(());
        }
        if self.writes_to_csv() {
            export::append_sections(Path::new(&self.config.csv_path), sections)
                .context("writing CSV export")?;
        }
        if let Some(pool) = &self.pool {
            sections::upsert_sections(pool, sections)
                .await
                .context("upserting sections")?;
            sections::insert_snapshots(pool, sections)
                .await
                .context("appending snapshots")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::course::{
        DEFAULT_WAITLIST, Day, Meeting, Schedule, SeatCounts, SectionIdentity, Status,
    };
    use chrono::{NaiveDate, NaiveTime, Utc};

    fn csv_config(path: &Path) -> Config {
        Config {
            portal_url: "https://example.invalid/search".into(),
            webdriver_url: "http://localhost:4444".into(),
            database_url: None,
            csv_path: path.to_string_lossy().into_owned(),
            log_level: "info".into(),
            headless: true,
            element_timeout_secs: 1,
            submit_timeout_secs: 1,
            settle_delay_ms: 1,
        }
    }

    fn sample_section() -> CourseSection {
        CourseSection {
            identity: SectionIdentity {
                name: "Managerial Accounting".into(),
                subject_name: "Accounting Bus Admin".into(),
                subject_code: "ACC".into(),
                catalog_number: "212".into(),
                academic_career: "Undergraduate".into(),
                semester: "Spring".into(),
                year: 2025,
                section_type: "LEC".into(),
                section_code: "2U".into(),
                class_number: 8431,
                session: "Regular Academic".into(),
            },
            seats: SeatCounts {
                status: Status::Open,
                seats_available: 12,
                capacity: 45,
                waitlist_available: DEFAULT_WAITLIST,
                waitlist_capacity: DEFAULT_WAITLIST,
                reserved: None,
            },
            schedule: Schedule::Single(Meeting {
                days: vec![Day::Tuesday],
                time_start: NaiveTime::from_hms_opt(9, 30, 0),
                time_end: NaiveTime::from_hms_opt(10, 45, 0),
                classroom: "Stubblefield 301".into(),
                instructors: vec!["Maria Diaz".into()],
                start_date: NaiveDate::from_ymd_opt(2025, 1, 13),
                end_date: NaiveDate::from_ymd_opt(2025, 4, 28),
                topic: None,
            }),
            retrieved_at: Utc::now(),
        }
    }

    fn temp_csv(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("canelink-runner-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let _ = std::fs::remove_file(&path);
        path
    }

    fn line_count(path: &Path) -> usize {
        std::fs::read_to_string(path).unwrap().lines().count()
    }

    #[tokio::test]
    async fn persist_discards_when_sink_already_written_today() {
        let path = temp_csv("already_written.csv");
        // another run's capture, file mtime is now
        crate::export::append_sections(&path, &[sample_section()]).unwrap();
        assert_eq!(line_count(&path), 2);

        let runner = Runner::new(csv_config(&path), None, Scope::AllTerms, true, false);
        runner.persist(&[sample_section()]).await.unwrap();

        assert_eq!(line_count(&path), 2, "second capture must be discarded");
        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn force_persists_despite_fresh_sink() {
        let path = temp_csv("forced.csv");
        crate::export::append_sections(&path, &[sample_section()]).unwrap();
        assert_eq!(line_count(&path), 2);

        let runner = Runner::new(csv_config(&path), None, Scope::AllTerms, true, true);
        runner.persist(&[sample_section()]).await.unwrap();

        assert_eq!(line_count(&path), 3);
        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn persist_writes_when_sink_is_stale() {
        let path = temp_csv("fresh_run.csv");
        let runner = Runner::new(csv_config(&path), None, Scope::AllTerms, true, false);
        runner.persist(&[sample_section()]).await.unwrap();

        // header plus one record on a sink that held nothing today
        assert_eq!(line_count(&path), 2);
        std::fs::remove_file(&path).unwrap();
    }
}
