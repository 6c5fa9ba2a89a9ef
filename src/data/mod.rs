//! Scraped-data model and persistence sinks.

pub mod course;
pub mod sections;

pub use course::{CourseSection, Day, Meeting, Schedule, SeatCounts, SectionIdentity, Status};
