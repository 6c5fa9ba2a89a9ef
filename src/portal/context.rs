//! Immutable navigation context threaded through navigator and parser calls.

use anyhow::{Context, Result, bail};

/// The (term, career, subject) triple the form is currently configured for.
///
/// Constructed fresh for each leaf of the enumeration and passed by reference;
/// there is no ambient "current term" state anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchContext {
    pub term: String,
    pub career: String,
    pub subject: String,
    /// First word of the term label ("Spring", "Fall", ...).
    pub semester: String,
    /// Year parsed out of the term label, applied to date tokens that omit it.
    pub year: i32,
}

impl SearchContext {
    /// Split a term label like `"Spring 2025"` into semester and year.
    pub fn new(term: &str, career: &str, subject: &str) -> Result<Self> {
        let Some((semester, year)) = term.split_once(' ') else {
            bail!("term label '{term}' has no year component");
        };
        let year: i32 = year
            .trim()
            .parse()
            .with_context(|| format!("term label '{term}' has a non-numeric year"))?;
        Ok(Self {
            term: term.to_string(),
            career: career.to_string(),
            subject: subject.to_string(),
            semester: semester.to_string(),
            year,
        })
    }
}
