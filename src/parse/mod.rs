//! Record extraction: turns card headers and flat accessibility-label token
//! lists into typed [`CourseSection`](crate::data::course::CourseSection)
//! records.
//!
//! Everything here is pure. Multi-meeting sections that need the rendered
//! meeting-patterns table come back as
//! [`SectionOutcome::NeedsMeetingTable`]; the enumeration driver fetches the
//! table tokens through the navigator and completes the record.

pub mod days;
pub mod error;
pub mod section;
pub mod status;
pub mod timedate;

pub use error::MalformedSection;
pub use section::{PendingSection, SectionOutcome, parse_section};
