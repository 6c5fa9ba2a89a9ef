//! Walks the (term, career, subject) search space and parses every rendered
//! course card.
//!
//! The walk is strictly sequential: the portal renders into one stateful form,
//! so there is exactly one navigator and one cursor position at a time. Each
//! narrowing level re-enumerates its options live, because the option set
//! depends on the selections above it (subjects vary by career, careers by
//! term).

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::data::course::{CourseSection, SectionKey};
use crate::parse::{SectionOutcome, parse_section};
use crate::portal::{CourseCard, FormNavigator, ScrapeError, SearchContext};

/// Academic careers worth scraping, in walk order.
const CAREERS: &[&str] = &["Undergraduate", "Graduate"];

/// Term labels containing this marker carry no scrapeable sections.
const SKIPPED_TERM_MARKER: &str = "Non-credit";

/// How much of the search space one run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Every listed term, every career, every subject.
    AllTerms,
    /// One term, every career, every subject.
    Term { term: String },
    /// One term and career, every subject.
    TermCareer { term: String, career: String },
    /// A single (term, career, subject) cell.
    TermCareerSubject {
        term: String,
        career: String,
        subject: String,
    },
}

impl Scope {
    fn term(&self) -> Option<&str> {
        match self {
            Scope::AllTerms => None,
            Scope::Term { term }
            | Scope::TermCareer { term, .. }
            | Scope::TermCareerSubject { term, .. } => Some(term),
        }
    }

    fn career(&self) -> Option<&str> {
        match self {
            Scope::TermCareer { career, .. } | Scope::TermCareerSubject { career, .. } => {
                Some(career)
            }
            _ => None,
        }
    }

    fn subject(&self) -> Option<&str> {
        match self {
            Scope::TermCareerSubject { subject, .. } => Some(subject),
            _ => None,
        }
    }
}

/// Drives a [`FormNavigator`] across the scoped search space, accumulating
/// parsed sections.
pub struct Harvester<'a> {
    navigator: &'a FormNavigator,
    scope: Scope,
}

impl<'a> Harvester<'a> {
    pub fn new(navigator: &'a FormNavigator, scope: Scope) -> Self {
        Self { navigator, scope }
    }

    /// Run the full walk. The portal must already be open.
    pub async fn run(&self) -> Result<Vec<CourseSection>, ScrapeError> {
        let terms = match self.scope.term() {
            Some(term) => vec![term.to_string()],
            None => self
                .navigator
                .list_terms()
                .await?
                .into_iter()
                .filter(|t| !t.contains(SKIPPED_TERM_MARKER))
                .collect(),
        };

        let mut sections = Vec::new();
        let mut seen: HashSet<SectionKey> = HashSet::new();
        for term in &terms {
            self.harvest_term(term, &mut sections, &mut seen).await?;
        }

        info!(
            terms = terms.len(),
            sections = sections.len(),
            "harvest complete"
        );
        Ok(sections)
    }

    async fn harvest_term(
        &self,
        term: &str,
        sections: &mut Vec<CourseSection>,
        seen: &mut HashSet<SectionKey>,
    ) -> Result<(), ScrapeError> {
        info!(term, "harvesting term");
        self.navigator.select_term(term).await?;
        // Term selection rebuilds the form with the filter unchecked, so one
        // toggle per term is correct and a second would revert it.
        self.navigator.set_open_only_filter().await?;

        let careers: Vec<String> = match self.scope.career() {
            Some(career) => vec![career.to_string()],
            None => CAREERS.iter().map(|c| c.to_string()).collect(),
        };
        for career in &careers {
            self.harvest_career(term, career, sections, seen).await?;
        }
        Ok(())
    }

    async fn harvest_career(
        &self,
        term: &str,
        career: &str,
        sections: &mut Vec<CourseSection>,
        seen: &mut HashSet<SectionKey>,
    ) -> Result<(), ScrapeError> {
        self.navigator.select_academic_career(career).await?;

        if let Some(subject) = self.scope.subject() {
            let ctx = self
                .navigator
                .select_subject_by_label(subject, term, career)
                .await?;
            return self.harvest_results(&ctx, sections, seen).await;
        }

        let subjects = self.navigator.enumerate_subjects().await?;
        debug!(term, career, subjects = subjects.len(), "walking subjects");
        for index in 0..subjects.len() {
            let ctx = self
                .navigator
                .select_subject_by_index(index, term, career)
                .await?;
            self.harvest_results(&ctx, sections, seen).await?;
        }
        Ok(())
    }

    /// Parse every card in the current result set.
    async fn harvest_results(
        &self,
        ctx: &SearchContext,
        sections: &mut Vec<CourseSection>,
        seen: &mut HashSet<SectionKey>,
    ) -> Result<(), ScrapeError> {
        let cards = self.navigator.collect_cards().await?;
        let before = sections.len();
        for card in &cards {
            self.harvest_card(card, ctx, sections, seen).await?;
        }
        info!(
            term = %ctx.term,
            career = %ctx.career,
            subject = %ctx.subject,
            cards = cards.len(),
            sections = sections.len() - before,
            "subject harvested"
        );
        Ok(())
    }

    /// Walk one card's token list with a consumed-count cursor. The ordinal
    /// position of each section within the card indexes its detail control for
    /// meeting-table expansion.
    async fn harvest_card(
        &self,
        card: &CourseCard,
        ctx: &SearchContext,
        sections: &mut Vec<CourseSection>,
        seen: &mut HashSet<SectionKey>,
    ) -> Result<(), ScrapeError> {
        let retrieved_at = chrono::Utc::now();
        let mut cursor = 0;
        let mut section_index = 0;
        while cursor < card.tokens.len() {
            let outcome =
                parse_section(&card.tokens[cursor..], &card.header, ctx, retrieved_at)?;
            let (section, consumed) = match outcome {
                SectionOutcome::Complete { section, consumed } => (section, consumed),
                SectionOutcome::NeedsMeetingTable { pending, consumed } => {
                    let rows = self
                        .navigator
                        .read_meeting_patterns(&card.element, section_index, ctx)
                        .await?;
                    (pending.with_meetings(&rows)?, consumed)
                }
            };

            if seen.insert(section.key()) {
                sections.push(section);
            } else {
                warn!(
                    header = %card.header,
                    class_number = section.identity.class_number,
                    "duplicate section key in results, keeping first occurrence"
                );
            }
            cursor += consumed;
            section_index += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_narrowing_accessors() {
        let scope = Scope::TermCareerSubject {
            term: "Spring 2025".into(),
            career: "Undergraduate".into(),
            subject: "Accounting Bus Admin".into(),
        };
        assert_eq!(scope.term(), Some("Spring 2025"));
        assert_eq!(scope.career(), Some("Undergraduate"));
        assert_eq!(scope.subject(), Some("Accounting Bus Admin"));

        assert_eq!(Scope::AllTerms.term(), None);
        let term_only = Scope::Term {
            term: "Fall 2025".into(),
        };
        assert_eq!(term_only.career(), None);
        assert_eq!(term_only.subject(), None);
    }

    #[test]
    fn non_credit_terms_filtered() {
        let labels = ["Spring 2025", "Non-credit Term 2025", "Fall 2025"];
        let kept: Vec<&str> = labels
            .iter()
            .copied()
            .filter(|t| !t.contains(SKIPPED_TERM_MARKER))
            .collect();
        assert_eq!(kept, vec!["Spring 2025", "Fall 2025"]);
    }
}
