//! End-to-end walks over whole course cards: several section groups of mixed
//! shapes in one flat token list, consumed with a cursor.

use canelink::data::course::{Day, ReservedSeats, Schedule, Status};
use canelink::parse::{SectionOutcome, parse_section};
use canelink::portal::SearchContext;
use chrono::Utc;

fn ctx() -> SearchContext {
    SearchContext::new("Spring 2025", "Undergraduate", "Accounting Bus Admin").unwrap()
}

fn toks(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

/// Parse every section group in a card, advancing by the reported consumption.
/// Deferred multi-meeting groups are completed from `tables` in card order.
fn walk_card(
    tokens: &[String],
    header: &str,
    tables: &[Vec<String>],
) -> Vec<canelink::data::course::CourseSection> {
    let retrieved_at = Utc::now();
    let context = ctx();
    let mut sections = Vec::new();
    let mut table_iter = tables.iter();
    let mut cursor = 0;
    while cursor < tokens.len() {
        let outcome = parse_section(&tokens[cursor..], header, &context, retrieved_at)
            .expect("card should parse");
        let consumed = match outcome {
            SectionOutcome::Complete { section, consumed } => {
                sections.push(section);
                consumed
            }
            SectionOutcome::NeedsMeetingTable { pending, consumed } => {
                let rows = table_iter.next().expect("table for deferred section");
                sections.push(pending.with_meetings(rows).expect("table should parse"));
                consumed
            }
        };
        assert!(consumed > 0, "cursor must advance");
        cursor += consumed;
    }
    assert_eq!(cursor, tokens.len(), "card must be consumed exactly");
    sections
}

#[test]
fn card_with_three_mixed_sections() {
    let tokens = toks(&[
        // single-meeting
        "LEC Section 1U, Class Number8429",
        "Regular Academic",
        "Monday Wednesday Friday",
        "6:35 pm",
        "9:20 pm",
        "Whitten LC 182",
        "William Green",
        "01/13 - 04/28",
        "Open, 45 of 45 seats available",
        // minimal-info
        "Lecture Section 01, Class Number7616",
        "Regular Academic",
        "Open, 10 of 10 seats available",
        // single-meeting with a labeled reserved pool
        "LEC Section 2U, Class Number8430",
        "Regular Academic",
        "Tuesday Thursday",
        "9:30 am",
        "10:45 am",
        "Stubblefield 301",
        "Maria Diaz",
        "01/13 - 04/28",
        "Open, 10 of 10 seats available, 2 reserved",
        "2 of 2",
    ]);

    let sections = walk_card(
        &tokens,
        "Principles of Financial Accounting | ACC 211",
        &[],
    );
    assert_eq!(sections.len(), 3);

    assert_eq!(sections[0].identity.class_number, 8429);
    assert!(matches!(sections[0].schedule, Schedule::Single(_)));

    assert_eq!(sections[1].identity.class_number, 7616);
    assert_eq!(sections[1].schedule, Schedule::Unknown);

    assert_eq!(sections[2].identity.class_number, 8430);
    assert_eq!(
        sections[2].seats.reserved,
        Some(ReservedSeats {
            available: 2,
            capacity: 2
        })
    );
}

#[test]
fn card_with_waitlist_then_open_section() {
    let tokens = toks(&[
        "ENS Section CCE, Class Number5386",
        "Regular Academic",
        "Tuesday Thursday",
        "6:35 pm",
        "7:50 pm",
        "Frost North Studio 330",
        "Brian Russell",
        "01/13 - 04/28",
        "Waitlist, 300 of 300 waitlist seats available. 40 of 40 seats available.",
        "ENS Section AMS, Class Number5385",
        "Regular Academic",
        "Friday",
        "10:10 am",
        "1:10 pm",
        "Frost North Studio 330",
        "Roxana Amed, Reynaldo Sanchez",
        "01/13 - 04/28",
        "Open, 10 of 10 seats available",
    ]);

    let sections = walk_card(&tokens, "Small Contemporary Ensemble | MDE 139", &[]);
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].seats.status, Status::Waitlist);
    assert_eq!(sections[0].seats.waitlist_available, 300);
    assert_eq!(sections[0].seats.seats_available, 40);
    assert_eq!(sections[1].seats.status, Status::Open);
    assert_eq!(
        sections[1].identity.name,
        "Small Contemporary Ensemble"
    );
    assert_eq!(sections[1].identity.subject_code, "MDE");
    assert_eq!(sections[1].identity.catalog_number, "139");
}

#[test]
fn card_mixing_deferred_and_complete_sections() {
    let tokens = toks(&[
        // short multi-meeting shape: days but no time tokens
        "LEC Section QR, Class Number9001",
        "Regular Academic",
        "Wednesday",
        "Open, 30 of 30 seats available",
        // ordinary single-meeting
        "LEC Section 1U, Class Number9002",
        "Regular Academic",
        "Monday",
        "10:10 am",
        "11:00 am",
        "Whitten LC 170",
        "Charles Mallery",
        "01/13 - 04/28",
        "Open, 170 of 170 seats available",
    ]);
    let table = toks(&[
        "01/15/2025 - 03/05/2025",
        "Charles Mallery",
        "We",
        "5:05PM",
        "6:20PM",
        "Cox Science 126",
        "03/18/2025 - 04/22/2025",
        "Charles Mallery",
        "MoWeFr",
        "10:10AM",
        "11:00AM",
        "Whitten LC 170",
    ]);

    let sections = walk_card(&tokens, "General Biology | BIL 150", &[table]);
    assert_eq!(sections.len(), 2);

    let Schedule::Multiple(meetings) = &sections[0].schedule else {
        panic!("expected multi-meeting schedule");
    };
    assert_eq!(meetings.len(), 2);
    assert_eq!(meetings[0].days, vec![Day::Wednesday]);
    assert_eq!(
        meetings[1].days,
        vec![Day::Monday, Day::Wednesday, Day::Friday]
    );

    let Schedule::Single(meeting) = &sections[1].schedule else {
        panic!("expected single-meeting schedule");
    };
    assert_eq!(meeting.classroom, "Whitten LC 170");
}

#[test]
fn malformed_group_reports_position_within_card() {
    let tokens = toks(&[
        "LEC Section 1U, Class Number8429",
        "Regular Academic",
        "Monday",
        "6:35 pm",
        "9:20 pm",
        "Whitten LC 182",
        "William Green",
        "not a date range",
        "Open, 45 of 45 seats available",
    ]);
    let err = parse_section(
        &tokens,
        "Principles of Financial Accounting | ACC 211",
        &ctx(),
        Utc::now(),
    )
    .unwrap_err();
    assert_eq!(err.offset, 7);
    assert_eq!(err.term, "Spring 2025");
    assert_eq!(err.career, "Undergraduate");
    assert!(err.tokens[err.offset].contains("not a date range"));
}
