//! Structured types for scraped course sections.
//!
//! The portal publishes sections in three shapes (one meeting pattern, several
//! meeting patterns, almost no detail at all). These are modeled as a closed
//! set of schedule variants sharing the same identity and capacity structure,
//! instead of one record with conditionally-present fields.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Waitlist numbers default to the portal-wide pool size when the status line
/// doesn't carry them.
pub const DEFAULT_WAITLIST: u32 = 300;

/// A weekday as published by the portal, including the "to be announced"
/// placeholder used for sections without a fixed meeting day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
    Tba,
}

impl Day {
    /// Full day name as it appears in single-meeting day tokens.
    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
            Day::Tba => "TBA",
        }
    }

    /// Parse a full day name ("Monday", ..., "TBA").
    pub fn from_full(s: &str) -> Option<Self> {
        Some(match s {
            "Monday" => Day::Monday,
            "Tuesday" => Day::Tuesday,
            "Wednesday" => Day::Wednesday,
            "Thursday" => Day::Thursday,
            "Friday" => Day::Friday,
            "Saturday" => Day::Saturday,
            "Sunday" => Day::Sunday,
            "TBA" => Day::Tba,
            _ => return None,
        })
    }

    /// Parse a two-letter code from the meeting patterns table ("Mo", "We", ...).
    pub fn from_abbrev(s: &str) -> Option<Self> {
        Some(match s {
            "Mo" => Day::Monday,
            "Tu" => Day::Tuesday,
            "We" => Day::Wednesday,
            "Th" => Day::Thursday,
            "Fr" => Day::Friday,
            "Sa" => Day::Saturday,
            "Su" => Day::Sunday,
            _ => return None,
        })
    }
}

/// Enrollment status keyword from the status/capacity line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Open,
    Closed,
    Waitlist,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "Open",
            Status::Closed => "Closed",
            Status::Waitlist => "Waitlist",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        Some(match s {
            "Open" => Status::Open,
            "Closed" => Status::Closed,
            "Waitlist" => Status::Waitlist,
            _ => return None,
        })
    }
}

/// Fields identifying one section of a course within one term.
///
/// `(semester, year, class_number)` is the natural key; class numbers are
/// unique within a term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionIdentity {
    pub name: String,
    pub subject_name: String,
    pub subject_code: String,
    pub catalog_number: String,
    pub academic_career: String,
    pub semester: String,
    pub year: i32,
    pub section_type: String,
    pub section_code: String,
    pub class_number: u32,
    pub session: String,
}

/// Natural key of a section record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SectionKey {
    pub semester: String,
    pub year: i32,
    pub class_number: u32,
}

/// A reserved-seat pool, present only when the portal publishes one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedSeats {
    pub available: u32,
    pub capacity: u32,
}

/// Seat and waitlist counts with the invariant that available never exceeds
/// capacity for any pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatCounts {
    pub status: Status,
    pub seats_available: u32,
    pub capacity: u32,
    pub waitlist_available: u32,
    pub waitlist_capacity: u32,
    pub reserved: Option<ReservedSeats>,
}

impl SeatCounts {
    /// Checks the `available <= capacity` invariant for every pool.
    pub fn validate(&self) -> Result<(), String> {
        if self.seats_available > self.capacity {
            return Err(format!(
                "seats available ({}) exceeds capacity ({})",
                self.seats_available, self.capacity
            ));
        }
        if self.waitlist_available > self.waitlist_capacity {
            return Err(format!(
                "waitlist available ({}) exceeds waitlist capacity ({})",
                self.waitlist_available, self.waitlist_capacity
            ));
        }
        if let Some(r) = &self.reserved
            && r.available > r.capacity
        {
            return Err(format!(
                "reserved seats available ({}) exceeds reserved capacity ({})",
                r.available, r.capacity
            ));
        }
        Ok(())
    }
}

/// One meeting pattern: where and when a section meets, and who teaches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub days: Vec<Day>,
    pub time_start: Option<NaiveTime>,
    pub time_end: Option<NaiveTime>,
    pub classroom: String,
    pub instructors: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub topic: Option<String>,
}

/// How a section meets. `Unknown` covers sections the portal publishes with
/// no scheduling detail at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Schedule {
    Single(Meeting),
    Multiple(Vec<Meeting>),
    Unknown,
}

impl Schedule {
    pub fn is_multiple(&self) -> bool {
        matches!(self, Schedule::Multiple(_))
    }
}

/// One concrete offering of a course in one semester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSection {
    pub identity: SectionIdentity,
    pub seats: SeatCounts,
    pub schedule: Schedule,
    pub retrieved_at: DateTime<Utc>,
}

impl CourseSection {
    pub fn key(&self) -> SectionKey {
        SectionKey {
            semester: self.identity.semester.clone(),
            year: self.identity.year,
            class_number: self.identity.class_number,
        }
    }
}

fn fmt_time(t: Option<NaiveTime>) -> String {
    t.map(|t| t.format("%I:%M %p").to_string()).unwrap_or_default()
}

fn fmt_date(d: Option<NaiveDate>) -> String {
    d.map(|d| d.format("%m/%d/%Y").to_string()).unwrap_or_default()
}

fn fmt_days(days: &[Day]) -> String {
    days.iter()
        .map(Day::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Column names of the flattened export schema, in order.
pub const EXPORT_COLUMNS: &[&str] = &[
    "name",
    "subject_name",
    "subject_code",
    "catalog_number",
    "academic_career",
    "semester",
    "year",
    "section_type",
    "section_code",
    "class_number",
    "session",
    "days",
    "time_start",
    "time_end",
    "classroom",
    "instructor",
    "start_date",
    "end_date",
    "status",
    "seats_available",
    "capacity",
    "waitlist_available",
    "waitlist_capacity",
    "reserved_available",
    "reserved_capacity",
    "multiple_meetings",
    "topic",
    "retrieved_at",
];

/// Join per-meeting values with `"; "` so the multi-meeting parallel lists
/// survive flattening (index i across every scheduling column describes
/// meeting pattern i).
const MEETING_SEPARATOR: &str = "; ";

/// Flattened scheduling columns: days, time_start, time_end, classroom,
/// instructor, start_date, end_date, topic.
pub struct ScheduleStrings {
    pub days: String,
    pub time_start: String,
    pub time_end: String,
    pub classroom: String,
    pub instructor: String,
    pub start_date: String,
    pub end_date: String,
    pub topic: String,
}

impl CourseSection {
    /// Flatten the schedule into its string columns. Scalar for
    /// single-meeting sections, `"; "`-joined parallel lists for
    /// multi-meeting ones, empty for minimal-info ones.
    pub fn schedule_strings(&self) -> ScheduleStrings {
        let (days, time_start, time_end, classroom, instructor, start_date, end_date, topic) =
            match &self.schedule {
                Schedule::Single(m) => (
                    fmt_days(&m.days),
                    fmt_time(m.time_start),
                    fmt_time(m.time_end),
                    m.classroom.clone(),
                    m.instructors.join(", "),
                    fmt_date(m.start_date),
                    fmt_date(m.end_date),
                    m.topic.clone().unwrap_or_default(),
                ),
                Schedule::Multiple(meetings) => {
                    let join = |f: &dyn Fn(&Meeting) -> String| {
                        meetings.iter().map(f).collect::<Vec<_>>().join(MEETING_SEPARATOR)
                    };
                    (
                        join(&|m| fmt_days(&m.days)),
                        join(&|m| fmt_time(m.time_start)),
                        join(&|m| fmt_time(m.time_end)),
                        join(&|m| m.classroom.clone()),
                        join(&|m| m.instructors.join(", ")),
                        join(&|m| fmt_date(m.start_date)),
                        join(&|m| fmt_date(m.end_date)),
                        join(&|m| m.topic.clone().unwrap_or_default()),
                    )
                }
                Schedule::Unknown => Default::default(),
            };
        ScheduleStrings {
            days,
            time_start,
            time_end,
            classroom,
            instructor,
            start_date,
            end_date,
            topic,
        }
    }

    /// Flatten into the fixed export schema (one string per `EXPORT_COLUMNS`
    /// entry).
    pub fn flatten(&self) -> Vec<String> {
        let id = &self.identity;
        let seats = &self.seats;
        let sched = self.schedule_strings();

        vec![
            id.name.clone(),
            id.subject_name.clone(),
            id.subject_code.clone(),
            id.catalog_number.clone(),
            id.academic_career.clone(),
            id.semester.clone(),
            id.year.to_string(),
            id.section_type.clone(),
            id.section_code.clone(),
            id.class_number.to_string(),
            id.session.clone(),
            sched.days,
            sched.time_start,
            sched.time_end,
            sched.classroom,
            sched.instructor,
            sched.start_date,
            sched.end_date,
            seats.status.as_str().to_string(),
            seats.seats_available.to_string(),
            seats.capacity.to_string(),
            seats.waitlist_available.to_string(),
            seats.waitlist_capacity.to_string(),
            seats.reserved.map(|r| r.available.to_string()).unwrap_or_default(),
            seats.reserved.map(|r| r.capacity.to_string()).unwrap_or_default(),
            self.schedule.is_multiple().to_string(),
            sched.topic,
            self.retrieved_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]
    }
}
