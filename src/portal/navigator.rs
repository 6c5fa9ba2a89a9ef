//! Drives the portal's stateful search form.
//!
//! The form is a single shared mutable resource: every dropdown renders its
//! options into the same live list, and navigation invalidates previously read
//! option elements. The navigator therefore never caches element handles
//! across steps — option lists are re-opened and re-read immediately before
//! each click — and it keeps no state of its own beyond the live UI. The
//! enumeration driver owns the (term, career, subject) position.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, trace, warn};

use crate::driver::{DriverError, ElementHandle, Locator, UiDriver};
use crate::portal::context::SearchContext;
use crate::portal::errors::ScrapeError;
use crate::portal::selectors;

/// Wait and delay tuning for the navigator.
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// Polled wait bound for elements that reliably signal readiness.
    pub element_timeout: Duration,
    /// Polled wait bound for the search results marker.
    pub submit_timeout: Duration,
    /// Fixed blocking delay after opening the career dropdown, which has no
    /// reliable render signal to poll for.
    pub settle_delay: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            element_timeout: Duration::from_secs(20),
            submit_timeout: Duration::from_secs(20),
            settle_delay: Duration::from_secs(1),
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// One course card: its header plus the flat token list (leading decorative
/// token already stripped), and the live card element for detail expansion.
#[derive(Debug, Clone)]
pub struct CourseCard {
    pub element: ElementHandle,
    pub header: String,
    pub tokens: Vec<String>,
}

pub struct FormNavigator {
    driver: Arc<dyn UiDriver>,
    waits: WaitConfig,
}

impl FormNavigator {
    pub fn new(driver: Arc<dyn UiDriver>, waits: WaitConfig) -> Self {
        Self { driver, waits }
    }

    /// Load the portal page and enter the frame the form renders in.
    pub async fn open_portal(&self, url: &str) -> Result<(), ScrapeError> {
        self.driver.goto(url).await?;
        self.wait_for(&selectors::content_frame(), self.waits.element_timeout)
            .await?;
        self.driver.enter_frame(&selectors::content_frame()).await?;
        self.wait_for(&selectors::form_root(), self.waits.element_timeout)
            .await?;
        Ok(())
    }

    /// Poll until `locator` resolves, bounded by `timeout`.
    async fn wait_for(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<ElementHandle, ScrapeError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.driver.find_one(locator).await {
                Ok(element) => return Ok(element),
                Err(DriverError::NoSuchElement(_)) | Err(DriverError::StaleElement(_)) => {
                    if Instant::now() >= deadline {
                        return Err(ScrapeError::WaitTimeout {
                            locator: locator.to_string(),
                            timeout,
                        });
                    }
                    sleep(self.waits.poll_interval).await;
                }
                Err(other) => return Err(other.into()),
            }
        }
    }

    /// Open the term dropdown and return the option elements.
    async fn open_term_options(&self) -> Result<Vec<ElementHandle>, ScrapeError> {
        let dropdown = self.driver.find_one(&selectors::term_dropdown()).await?;
        self.driver.scroll_into_view(&dropdown).await?;
        self.driver.click(&dropdown).await?;
        let list = self
            .wait_for(&selectors::term_option_list(), self.waits.element_timeout)
            .await?;
        Ok(self
            .driver
            .find_all_in(&list, &selectors::option_items())
            .await?)
    }

    /// All term labels, in display order. Closes the dropdown by interacting
    /// with a different control so later indexed access stays valid.
    pub async fn list_terms(&self) -> Result<Vec<String>, ScrapeError> {
        let items = self.open_term_options().await?;
        let mut labels = Vec::with_capacity(items.len());
        for item in &items {
            labels.push(self.driver.read_text(item).await?);
        }
        self.click_career_dropdown().await?;
        Ok(labels)
    }

    /// Select a term by exact visible label and wait for the form to rebuild.
    pub async fn select_term(&self, term: &str) -> Result<(), ScrapeError> {
        let items = self.open_term_options().await?;
        for item in &items {
            if self.driver.read_text(item).await? == term {
                self.driver.scroll_into_view(item).await?;
                self.driver.click(item).await?;
                // Term selection restructures the whole page; wait for a
                // fresh form root rather than sleeping.
                self.wait_for(&selectors::form_root(), self.waits.element_timeout)
                    .await?;
                debug!(term, "term selected");
                return Ok(());
            }
        }
        Err(ScrapeError::OptionNotFound {
            control: "term",
            label: term.to_string(),
        })
    }

    /// Toggle the "open sections only" checkbox once. The portal re-checks it
    /// on every term change; toggling twice would revert it, so idempotency is
    /// the caller's responsibility.
    pub async fn set_open_only_filter(&self) -> Result<(), ScrapeError> {
        let checkbox = self
            .driver
            .find_one(&selectors::open_only_checkbox())
            .await?;
        self.driver.click(&checkbox).await?;
        Ok(())
    }

    async fn popup_indicator(&self, index: usize) -> Result<ElementHandle, ScrapeError> {
        let buttons = self
            .driver
            .find_all(&selectors::popup_indicators())
            .await?;
        buttons.into_iter().nth(index).ok_or_else(|| {
            DriverError::NoSuchElement(format!("popup indicator #{index} missing")).into()
        })
    }

    async fn click_career_dropdown(&self) -> Result<(), ScrapeError> {
        let button = self.popup_indicator(selectors::CAREER_POPUP_INDEX).await?;
        self.driver.click(&button).await?;
        Ok(())
    }

    /// Select an academic career by exact label.
    ///
    /// This control only augments the visible dropdown set, so there is no
    /// render signal to poll for; empirically it is the least reliable step
    /// and needs a fixed settle delay before the option list is trustworthy.
    pub async fn select_academic_career(&self, career: &str) -> Result<(), ScrapeError> {
        self.click_career_dropdown().await?;
        sleep(self.waits.settle_delay).await;

        let list = self.driver.find_one(&selectors::open_option_list()).await?;
        let items = self
            .driver
            .find_all_in(&list, &selectors::option_items())
            .await?;
        for item in &items {
            if self.driver.read_text(item).await? == career {
                self.driver.click(item).await?;
                debug!(career, "academic career selected");
                return Ok(());
            }
        }
        Err(ScrapeError::OptionNotFound {
            control: "academic career",
            label: career.to_string(),
        })
    }

    /// Open the subject dropdown and return its option elements.
    async fn open_subject_options(&self) -> Result<Vec<ElementHandle>, ScrapeError> {
        let dropdown = self.popup_indicator(selectors::SUBJECT_POPUP_INDEX).await?;
        self.driver.click(&dropdown).await?;
        let list = self
            .wait_for(&selectors::open_option_list(), self.waits.element_timeout)
            .await?;
        Ok(self
            .driver
            .find_all_in(&list, &selectors::option_items())
            .await?)
    }

    /// Capture all subject labels in display order, then close the dropdown
    /// via a different control (selecting would corrupt later indexed access).
    ///
    /// The returned list is only valid as a label snapshot: the underlying
    /// options are invalidated by any navigation, so callers re-resolve
    /// through [`select_subject_by_index`](Self::select_subject_by_index)
    /// rather than holding element references.
    pub async fn enumerate_subjects(&self) -> Result<Vec<String>, ScrapeError> {
        let items = self.open_subject_options().await?;
        let mut labels = Vec::with_capacity(items.len());
        for item in &items {
            labels.push(self.driver.read_text(item).await?);
        }
        self.click_career_dropdown().await?;
        debug!(count = labels.len(), "subjects enumerated");
        Ok(labels)
    }

    /// Re-open the subject list, select the option at `index`, and submit.
    ///
    /// Returns the full navigation context for the selected subject. A stale
    /// click is retried once by re-opening the control before giving up.
    pub async fn select_subject_by_index(
        &self,
        index: usize,
        term: &str,
        career: &str,
    ) -> Result<SearchContext, ScrapeError> {
        let label = match self.click_subject_at(index).await {
            Ok(label) => label,
            Err(ScrapeError::Driver(e @ DriverError::StaleElement(_))) => {
                warn!(index, error = %e, "subject option went stale, re-reading list");
                self.click_subject_at(index).await.map_err(|err| match err {
                    ScrapeError::Driver(source @ DriverError::StaleElement(_)) => {
                        ScrapeError::StaleUiReference {
                            action: "selecting a subject",
                            source,
                        }
                    }
                    other => other,
                })?
            }
            Err(other) => return Err(other),
        };

        let ctx = SearchContext::new(term, career, &label).map_err(|e| {
            ScrapeError::OptionNotFound {
                control: "term",
                label: format!("{term} ({e})"),
            }
        })?;
        self.submit_search(&ctx).await?;
        Ok(ctx)
    }

    async fn click_subject_at(&self, index: usize) -> Result<String, ScrapeError> {
        let items = self.open_subject_options().await?;
        let total = items.len();
        let item = items
            .into_iter()
            .nth(index)
            .ok_or(ScrapeError::OptionNotFound {
                control: "subject",
                label: format!("index {index} of {total}"),
            })?;
        let label = self.driver.read_text(&item).await?;
        self.driver.scroll_into_view(&item).await?;
        self.driver.click(&item).await?;
        Ok(label)
    }

    /// Re-open the subject list, select the exact label, and submit.
    ///
    /// A stale click is retried once by re-opening the control, the same
    /// contract as [`select_subject_by_index`](Self::select_subject_by_index).
    pub async fn select_subject_by_label(
        &self,
        subject: &str,
        term: &str,
        career: &str,
    ) -> Result<SearchContext, ScrapeError> {
        match self.click_subject_labeled(subject).await {
            Ok(()) => {}
            Err(ScrapeError::Driver(e @ DriverError::StaleElement(_))) => {
                warn!(subject, error = %e, "subject option went stale, re-reading list");
                self.click_subject_labeled(subject)
                    .await
                    .map_err(|err| match err {
                        ScrapeError::Driver(source @ DriverError::StaleElement(_)) => {
                            ScrapeError::StaleUiReference {
                                action: "selecting a subject",
                                source,
                            }
                        }
                        other => other,
                    })?;
            }
            Err(other) => return Err(other),
        }

        let ctx = SearchContext::new(term, career, subject).map_err(|e| {
            ScrapeError::OptionNotFound {
                control: "term",
                label: format!("{term} ({e})"),
            }
        })?;
        self.submit_search(&ctx).await?;
        Ok(ctx)
    }

    async fn click_subject_labeled(&self, subject: &str) -> Result<(), ScrapeError> {
        let items = self.open_subject_options().await?;
        for item in &items {
            if self.driver.read_text(item).await? == subject {
                self.driver.scroll_into_view(item).await?;
                self.driver.click(item).await?;
                return Ok(());
            }
        }
        Err(ScrapeError::OptionNotFound {
            control: "subject",
            label: subject.to_string(),
        })
    }

    /// Click the search button and wait for the results marker.
    ///
    /// A timeout is not fatal: it is logged with the full navigation context
    /// and the caller must treat the results as possibly stale or empty.
    pub async fn submit_search(&self, ctx: &SearchContext) -> Result<(), ScrapeError> {
        let button = self.driver.find_one(&selectors::search_button()).await?;
        self.driver.click(&button).await?;
        match self
            .wait_for(&selectors::results_marker(), self.waits.submit_timeout)
            .await
        {
            Ok(_) => Ok(()),
            Err(ScrapeError::WaitTimeout { .. }) => {
                warn!(
                    term = %ctx.term,
                    career = %ctx.career,
                    subject = %ctx.subject,
                    "search results marker never appeared; results may be stale or empty"
                );
                Ok(())
            }
            Err(other) => Err(other),
        }
    }

    /// Read every course card currently rendered: header plus token list,
    /// with the leading decorative token stripped.
    pub async fn collect_cards(&self) -> Result<Vec<CourseCard>, ScrapeError> {
        let containers = self
            .driver
            .find_all(&selectors::results_containers())
            .await?;
        let Some(results_area) = containers.into_iter().nth(selectors::RESULTS_CONTAINER_INDEX)
        else {
            trace!("results area absent, treating as zero results");
            return Ok(Vec::new());
        };

        let mut cards = Vec::new();
        let groups = self
            .driver
            .find_all_in(&results_area, &selectors::card_groups())
            .await?;
        for group in &groups {
            let mut group_cards = self
                .driver
                .find_all_in(group, &selectors::cards_in_group())
                .await?;
            if group_cards.is_empty() {
                continue;
            }
            // First entry is the group header row, not a card.
            group_cards.remove(0);

            for card in group_cards {
                let title = self
                    .driver
                    .find_one_in(&card, &selectors::card_title())
                    .await?;
                let header = self.driver.read_text(&title).await?;

                let mut spans = self
                    .driver
                    .find_all_in(&card, &selectors::card_tokens())
                    .await?;
                if !spans.is_empty() {
                    spans.remove(0);
                }
                let mut tokens = Vec::with_capacity(spans.len());
                for span in &spans {
                    tokens.push(self.driver.read_property(span, "textContent").await?);
                }
                cards.push(CourseCard {
                    element: card,
                    header,
                    tokens,
                });
            }
        }
        Ok(cards)
    }

    /// Expand the detail control for the card's `section_index`-th section,
    /// read the meeting-patterns table as a flat token list, and collapse the
    /// control again so later sections in the same card keep their layout.
    pub async fn read_meeting_patterns(
        &self,
        card: &ElementHandle,
        section_index: usize,
        ctx: &SearchContext,
    ) -> Result<Vec<String>, ScrapeError> {
        let table = self
            .driver
            .find_one_in(card, &selectors::card_section_table())
            .await?;
        let buttons = self
            .driver
            .find_all_in(&table, &selectors::section_detail_buttons())
            .await?;
        let button = buttons.get(section_index).ok_or_else(|| {
            ScrapeError::Driver(DriverError::NoSuchElement(format!(
                "no detail button for section {section_index}"
            )))
        })?;

        self.driver.scroll_into_view(button).await?;
        self.driver.click(button).await?;
        if let Err(ScrapeError::WaitTimeout { .. }) = self
            .wait_for(
                &selectors::meeting_patterns_table(),
                self.waits.element_timeout,
            )
            .await
        {
            // Observed flake: the first click sometimes lands on a collapsing
            // control. Re-toggle and wait once more before giving up.
            warn!(
                term = %ctx.term,
                career = %ctx.career,
                subject = %ctx.subject,
                section_index,
                "meeting patterns table did not render, re-toggling detail control"
            );
            self.driver.click(button).await?;
            self.driver.click(button).await?;
            self.wait_for(
                &selectors::meeting_patterns_table(),
                self.waits.element_timeout,
            )
            .await?;
        }

        let patterns = self
            .driver
            .find_one(&selectors::meeting_patterns_table())
            .await?;
        let cells = self
            .driver
            .find_all_in(&patterns, &selectors::meeting_patterns_cells())
            .await?;
        let mut tokens = Vec::with_capacity(cells.len());
        for cell in &cells {
            tokens.push(self.driver.read_property(cell, "textContent").await?);
        }

        // Collapse the table.
        self.driver.click(button).await?;
        Ok(tokens)
    }
}
