//! CSV export sink.
//!
//! Appends flattened section rows to a single file, writing the header line
//! only when the file is created. Freshness is judged by the file's
//! modification time, mirroring the database sink's snapshot check.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tracing::info;

use crate::data::course::{CourseSection, EXPORT_COLUMNS};

/// Quote a field if it contains a comma, quote, or newline.
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_row<W: Write>(out: &mut W, fields: &[String]) -> Result<()> {
    let line = fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(out, "{line}")?;
    Ok(())
}

/// Append sections to the CSV file at `path`, creating it (with a header
/// line) if absent.
pub fn append_sections(path: &Path, sections: &[CourseSection]) -> Result<()> {
    if sections.is_empty() {
        return Ok(());
    }

    let is_new = !path.exists();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening export file {}", path.display()))?;
    let mut out = BufWriter::new(file);

    if is_new {
        let header: Vec<String> = EXPORT_COLUMNS.iter().map(|c| c.to_string()).collect();
        write_row(&mut out, &header)?;
    }
    for section in sections {
        write_row(&mut out, &section.flatten())?;
    }
    out.flush()?;

    info!(count = sections.len(), path = %path.display(), "sections exported");
    Ok(())
}

/// Whether the export file was last written today (local date). A missing
/// file yields false, so a first run always proceeds.
pub fn was_written_today(path: &Path) -> Result<bool> {
    let metadata = match path.metadata() {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => {
            return Err(e).with_context(|| format!("reading metadata of {}", path.display()));
        }
    };
    let modified: DateTime<Local> = metadata.modified()?.into();
    Ok(modified.date_naive() == Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::course::{
        Day, Meeting, Schedule, SeatCounts, SectionIdentity, Status, DEFAULT_WAITLIST,
    };
    use chrono::{NaiveDate, NaiveTime, Utc};

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
                days: vec![Day::Tuesday, Day::Thursday],
                time_start: NaiveTime::from_hms_opt(9, 30, 0),
                time_end: NaiveTime::from_hms_opt(10, 45, 0),
                classroom: "Stubblefield 301".into(),
                instructors: vec!["Diaz, Maria".into()],
                start_date: NaiveDate::from_ymd_opt(2025, 1, 13),
                end_date: NaiveDate::from_ymd_opt(2025, 4, 28),
                topic: None,
            }),
            retrieved_at: Utc::now(),
        }
    }

    /// Minimal CSV line splitter for round-trip checks.
    fn split_csv_line(line: &str) -> Vec<String> {
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut chars = line.chars().peekable();
        let mut quoted = false;
        while let Some(c) = chars.next() {
            match c {
                '"' if quoted => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        quoted = false;
                    }
                }
                '"' => quoted = true,
                ',' if !quoted => fields.push(std::mem::take(&mut field)),
                _ => field.push(c),
            }
        }
        fields.push(field);
        fields
    }

    #[test]
    fn escapes_commas_and_quotes() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("Diaz, Maria"), "\"Diaz, Maria\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn header_written_once() {
        let dir = std::env::temp_dir().join(format!("canelink-export-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("header_once.csv");
        let _ = std::fs::remove_file(&path);

        append_sections(&path, &[sample_section()]).unwrap();
        append_sections(&path, &[sample_section()]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("name,subject_name,"));
        assert!(!lines[1].starts_with("name,"));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn row_round_trips_through_quoting() {
        let section = sample_section();
        let row = section.flatten();
        let mut buf = Vec::new();
        write_row(&mut buf, &row).unwrap();
        let line = String::from_utf8(buf).unwrap();
        let parsed = split_csv_line(line.trim_end());
        assert_eq!(parsed, row);
        // the instructor field carried an embedded comma
        assert_eq!(parsed[15], "Diaz, Maria");
    }

    #[test]
    fn missing_file_is_not_fresh() {
        let path = Path::new("/nonexistent/canelink.csv");
        assert!(!was_written_today(path).unwrap());
    }
}
