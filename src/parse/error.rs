//! Parse failure diagnostics.

use crate::portal::SearchContext;

/// A token shape the parser cannot interpret.
///
/// Carries the full raw token list, the card header, the failing offset, and
/// the navigation context at the time of the failure. The run is aborted when
/// one of these surfaces; the run controller's restart-once policy applies.
#[derive(Debug, Clone, thiserror::Error)]
#[error(
    "malformed section '{header}' at token {offset} \
     (term: {term}, career: {career}, subject: {subject}): {reason}"
)]
pub struct MalformedSection {
    pub header: String,
    pub tokens: Vec<String>,
    pub offset: usize,
    pub term: String,
    pub career: String,
    pub subject: String,
    pub reason: String,
}

impl MalformedSection {
    pub fn new(
        header: &str,
        tokens: &[String],
        offset: usize,
        ctx: &SearchContext,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            header: header.to_string(),
            tokens: tokens.to_vec(),
            offset,
            term: ctx.term.clone(),
            career: ctx.career.clone(),
            subject: ctx.subject.clone(),
            reason: reason.into(),
        }
    }
}
