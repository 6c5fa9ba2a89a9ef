//! Course-card section grammar.
//!
//! Each card carries a header string plus a flat, ordered list of
//! accessibility-label tokens covering one or more sections. Token groups are
//! consumed in strides whose width branches on content: the days token decides
//! between the fixed single-meeting layout, the condensed multi-meeting
//! preview, and the minimal-info shape. Every parse reports how many tokens it
//! consumed, and the caller advances its cursor by exactly that amount — no
//! placeholder insertion or in-stream deletion.

use chrono::{DateTime, Utc};

use crate::data::course::{
    CourseSection, Meeting, Schedule, SeatCounts, SectionIdentity,
};
use crate::parse::days::{expand_abbrev_days, parse_day_sequence};
use crate::parse::error::MalformedSection;
use crate::parse::status::parse_status_line;
use crate::parse::timedate::{
    parse_date_range_full, parse_date_range_in_year, parse_time_single, parse_time_table,
};
use crate::portal::SearchContext;

/// Tokens in a full single-meeting section group.
const SINGLE_MEETING_STRIDE: usize = 9;
/// Tokens in a multi-meeting group where the card shows days but no times:
/// identity, session, days, status.
const MULTI_SHORT_STRIDE: usize = 4;
/// Tokens in a multi-meeting group with the condensed preview: identity,
/// session, six "Meeting N:" aggregates, a six-token duplicate of the last
/// meeting, then the status line.
const MULTI_PREVIEW_STRIDE: usize = 15;
/// Tokens in a minimal-info group: identity, session, status.
const MINIMAL_STRIDE: usize = 3;

/// Columns per meeting-patterns table row, without and with the topic column.
const TABLE_ROW_WIDTH: usize = 6;
const TABLE_ROW_WIDTH_WITH_TOPIC: usize = 7;

/// Outcome of parsing one section group.
#[derive(Debug, Clone)]
pub enum SectionOutcome {
    /// The group was self-contained; `consumed` tokens were used.
    Complete {
        section: CourseSection,
        consumed: usize,
    },
    /// The group describes a multi-meeting section whose scheduling rows live
    /// in the card's embedded meeting-patterns table. The caller must fetch
    /// the rendered table and finish the record with
    /// [`PendingSection::with_meetings`].
    NeedsMeetingTable {
        pending: PendingSection,
        consumed: usize,
    },
}

/// A multi-meeting section with identity and capacity resolved but scheduling
/// rows still outstanding.
#[derive(Debug, Clone)]
pub struct PendingSection {
    identity: SectionIdentity,
    seats: SeatCounts,
    retrieved_at: DateTime<Utc>,
    ctx: SearchContext,
    header: String,
}

impl PendingSection {
    /// Complete the section from the meeting-patterns table's flat token list.
    ///
    /// Row stride is six tokens, or seven when a topic column is present —
    /// detected by whether the token count divides evenly by six. Identity,
    /// capacity and timestamp are shared across rows, not recomputed.
    pub fn with_meetings(self, rows: &[String]) -> Result<CourseSection, MalformedSection> {
        let fail = |offset: usize, reason: String| {
            MalformedSection::new(&self.header, rows, offset, &self.ctx, reason)
        };

        if rows.is_empty() {
            return Err(fail(0, "meeting patterns table is empty".into()));
        }
        let width = if rows.len() % TABLE_ROW_WIDTH == 0 {
            TABLE_ROW_WIDTH
        } else {
            TABLE_ROW_WIDTH_WITH_TOPIC
        };
        if rows.len() % width != 0 {
            return Err(fail(
                0,
                format!("table token count {} fits neither row width", rows.len()),
            ));
        }

        let mut meetings = Vec::with_capacity(rows.len() / width);
        for row in rows.chunks(width) {
            let base = meetings.len() * width;
            let (start_date, end_date) =
                parse_date_range_full(&row[0]).map_err(|e| fail(base, e))?;
            let instructors: Vec<String> = row[1]
                .replace("\n\r", " ")
                .split(", ")
                .map(str::to_string)
                .collect();
            let days = expand_abbrev_days(&row[2]).map_err(|e| fail(base + 2, e))?;
            let time_start = parse_time_table(&row[3]).map_err(|e| fail(base + 3, e))?;
            let time_end = parse_time_table(&row[4]).map_err(|e| fail(base + 4, e))?;
            meetings.push(Meeting {
                days,
                time_start,
                time_end,
                classroom: row[5].clone(),
                instructors,
                start_date: Some(start_date),
                end_date: Some(end_date),
                topic: (width == TABLE_ROW_WIDTH_WITH_TOPIC).then(|| row[6].clone()),
            });
        }

        if meetings.len() < 2 {
            return Err(fail(
                0,
                "multi-meeting section has fewer than two meeting patterns".into(),
            ));
        }

        Ok(CourseSection {
            identity: self.identity,
            seats: self.seats,
            schedule: Schedule::Multiple(meetings),
            retrieved_at: self.retrieved_at,
        })
    }
}

/// Split a card header `"<name> | <subjectCode> <catalogNumber>"`.
pub fn split_header(header: &str) -> Result<(String, String, String), String> {
    let (name, course) = header
        .split_once(" | ")
        .ok_or_else(|| format!("header '{header}' has no ' | ' separator"))?;
    let (subject_code, catalog_number) = course
        .rsplit_once(' ')
        .ok_or_else(|| format!("header course part '{course}' has no catalog number"))?;
    Ok((
        name.to_string(),
        subject_code.to_string(),
        catalog_number.to_string(),
    ))
}

/// Parse the section-identity token
/// `"<sectionType> Section <sectionCode>, Class Number<digits>"`.
fn parse_identity_token(token: &str) -> Result<(String, String, u32), String> {
    let (section_part, class_part) = token
        .split_once(", ")
        .ok_or_else(|| format!("identity token '{token}' has no class number part"))?;
    let mut words = section_part.split(' ');
    let section_type = words
        .next()
        .filter(|w| !w.is_empty())
        .ok_or_else(|| format!("identity token '{token}' has no section type"))?;
    if words.next() != Some("Section") {
        return Err(format!("identity token '{token}' missing 'Section' keyword"));
    }
    let section_code = words
        .next()
        .ok_or_else(|| format!("identity token '{token}' has no section code"))?;

    let class_number = class_part
        .split(' ')
        .nth(1)
        .and_then(|w| w.strip_prefix("Number"))
        .ok_or_else(|| format!("identity token '{token}' has no class number"))?
        .parse::<u32>()
        .map_err(|_| format!("identity token '{token}' has a non-numeric class number"))?;

    Ok((section_type.to_string(), section_code.to_string(), class_number))
}

/// Whether the days slot actually holds the status line, which happens when a
/// section is published with almost no detail. The portal glues the keyword to
/// the rest of the line with a comma.
fn is_status_keyword(token: &str) -> bool {
    let first = token.split_whitespace().next().unwrap_or_default();
    let trimmed = first.strip_suffix(',').unwrap_or(first);
    crate::data::course::Status::from_keyword(trimmed).is_some()
}

/// Parse one section group starting at `tokens[0]`.
///
/// `tokens` is the remainder of the card's token list; `retrieved_at` is the
/// capture timestamp stamped onto the record so parsing itself stays
/// deterministic.
pub fn parse_section(
    tokens: &[String],
    header: &str,
    ctx: &SearchContext,
    retrieved_at: DateTime<Utc>,
) -> Result<SectionOutcome, MalformedSection> {
    let fail =
        |offset: usize, reason: String| MalformedSection::new(header, tokens, offset, ctx, reason);
    let tok = |idx: usize| {
        tokens
            .get(idx)
            .map(String::as_str)
            .ok_or_else(|| fail(idx, format!("section group ends early (wanted token {idx})")))
    };

    let (name, subject_code, catalog_number) =
        split_header(header).map_err(|e| fail(0, e))?;
    let (section_type, section_code, class_number) =
        parse_identity_token(tok(0)?).map_err(|e| fail(0, e))?;
    let session = tok(1)?.to_string();

    let identity = SectionIdentity {
        name,
        subject_name: ctx.subject.clone(),
        subject_code,
        catalog_number,
        academic_career: ctx.career.clone(),
        semester: ctx.semester.clone(),
        year: ctx.year,
        section_type,
        section_code,
        class_number,
        session,
    };

    let days_token = tok(2)?;
    let Some(days) = parse_day_sequence(days_token) else {
        if is_status_keyword(days_token) {
            // Minimal-info shape: identity + session + status, nothing else.
            let line = parse_status_line(tokens, 2).map_err(|e| fail(2, e))?;
            return Ok(SectionOutcome::Complete {
                section: CourseSection {
                    identity,
                    seats: line.counts,
                    schedule: Schedule::Unknown,
                    retrieved_at,
                },
                consumed: MINIMAL_STRIDE + line.extra_consumed,
            });
        }

        // Condensed multi-meeting preview: six "Meeting N:" aggregates and a
        // six-token duplicate of the last meeting precede the status line.
        // None of it is interpreted; the real rows come from the table.
        let status_idx = MULTI_PREVIEW_STRIDE - 1;
        tok(status_idx)?;
        let line = parse_status_line(tokens, status_idx).map_err(|e| fail(status_idx, e))?;
        return Ok(SectionOutcome::NeedsMeetingTable {
            pending: PendingSection {
                identity,
                seats: line.counts,
                retrieved_at,
                ctx: ctx.clone(),
                header: header.to_string(),
            },
            consumed: MULTI_PREVIEW_STRIDE + line.extra_consumed,
        });
    };

    let start_token = tok(3)?;
    let times = match parse_time_single(start_token) {
        Some(start) => match parse_time_single(tok(4)?) {
            Some(end) => Some((Some(start), Some(end))),
            // Start looked like a time but the end slot doesn't: this is the
            // multi-meeting layout without a preview.
            None => None,
        },
        None if start_token == "-" => Some((None, None)),
        None => None,
    };

    let Some((time_start, time_end)) = times else {
        let line = parse_status_line(tokens, 3).map_err(|e| fail(3, e))?;
        return Ok(SectionOutcome::NeedsMeetingTable {
            pending: PendingSection {
                identity,
                seats: line.counts,
                retrieved_at,
                ctx: ctx.clone(),
                header: header.to_string(),
            },
            consumed: MULTI_SHORT_STRIDE + line.extra_consumed,
        });
    };

    // Fixed single-meeting layout.
    let classroom = tok(5)?.to_string();
    let instructors: Vec<String> = tok(6)?
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    let (start_date, end_date) =
        parse_date_range_in_year(tok(7)?, ctx.year).map_err(|e| fail(7, e))?;
    tok(8)?;
    let line = parse_status_line(tokens, 8).map_err(|e| fail(8, e))?;

    Ok(SectionOutcome::Complete {
        section: CourseSection {
            identity,
            seats: line.counts,
            schedule: Schedule::Single(Meeting {
                days,
                time_start,
                time_end,
                classroom,
                instructors,
                start_date: Some(start_date),
                end_date: Some(end_date),
                topic: None,
            }),
            retrieved_at,
        },
        consumed: SINGLE_MEETING_STRIDE + line.extra_consumed,
    })
}
