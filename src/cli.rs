use clap::{Parser, ValueEnum};

use crate::scraper::harvester::Scope;

/// Output format for tracing logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TracingFormat {
    /// Human-readable output for development.
    Pretty,
    /// Structured JSON output for production.
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "canelink", about = "Scrapes course offerings from the CaneLink portal")]
pub struct Args {
    /// Restrict the run to one term, by exact visible label (e.g. "Spring 2025").
    #[arg(long)]
    pub term: Option<String>,

    /// Restrict the run to one academic career within --term.
    #[arg(long, requires = "term")]
    pub career: Option<String>,

    /// Restrict the run to one subject within --term and --career.
    #[arg(long, requires = "career")]
    pub subject: Option<String>,

    /// Write results to the CSV file even when a database is configured.
    #[arg(long)]
    pub csv: bool,

    /// Override the configured CSV file path (implies --csv).
    #[arg(long, value_name = "PATH")]
    pub csv_path: Option<String>,

    /// Scrape even if data was already collected today.
    #[arg(long)]
    pub force: bool,

    /// Tracing output format.
    #[arg(long, value_enum, default_value_t = TracingFormat::Pretty)]
    pub tracing: TracingFormat,
}

impl Args {
    /// Translate the narrowing flags into a harvest scope. Clap's `requires`
    /// constraints guarantee each level implies the ones above it.
    pub fn scope(&self) -> Scope {
        match (&self.term, &self.career, &self.subject) {
            (Some(term), Some(career), Some(subject)) => Scope::TermCareerSubject {
                term: term.clone(),
                career: career.clone(),
                subject: subject.clone(),
            },
            (Some(term), Some(career), None) => Scope::TermCareer {
                term: term.clone(),
                career: career.clone(),
            },
            (Some(term), None, None) => Scope::Term { term: term.clone() },
            _ => Scope::AllTerms,
        }
    }

    /// Whether any flag asked for the CSV sink.
    pub fn wants_csv(&self) -> bool {
        self.csv || self.csv_path.is_some()
    }
}
