//! Status/capacity line parsing, shared by every section layout.
//!
//! The base line is `"<Status>, <A> of <B> seats available"`. Waitlisted
//! sections fold the waitlist pool into the same line. A reserved-seat pool
//! may appear either as an extra clause containing "reserved" or, unlabeled,
//! as a bare `"<n> of <m>"` token trailing the line; either way it forces one
//! extra token to be consumed.

use crate::data::course::{DEFAULT_WAITLIST, ReservedSeats, SeatCounts, Status};

/// Result of parsing the status line at `status_idx`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub counts: SeatCounts,
    /// Tokens consumed beyond the status token itself (reserved-seat pool,
    /// discarded waitlist echo).
    pub extra_consumed: usize,
}

/// Parse `"<A> of <B> ..."` into `(A, B)`.
fn n_of_m(s: &str) -> Result<(u32, u32), String> {
    let mut words = s.split(' ');
    let a = words.next().unwrap_or_default();
    let of = words.next().unwrap_or_default();
    let b = words.next().unwrap_or_default();
    if of != "of" {
        return Err(format!("expected '<n> of <m>' in '{s}'"));
    }
    let a = a.parse().map_err(|_| format!("bad count in '{s}'"))?;
    let b = b.parse().map_err(|_| format!("bad count in '{s}'"))?;
    Ok((a, b))
}

/// Detect a reserved-seat pool around the status line.
///
/// Labeled pools carry a clause containing "reserved", which is removed from
/// the clause list before the Open/Waitlist branch. Unlabeled pools are
/// detected by probing whether the token after the expected line (two ahead
/// for waitlisted sections, whose echo token sits in between) still matches
/// the `"<n> of <m>"` shape. The probe can misfire if the portal ever adds
/// another numeric clause; that fragility is inherited from the observed UI.
fn check_reserved(tokens: &[String], status_idx: usize) -> (bool, Vec<String>) {
    let mut clauses: Vec<String> = tokens[status_idx]
        .split(", ")
        .map(str::to_string)
        .collect();

    let mut has_reserved = false;
    if let Some(pos) = clauses.iter().position(|c| c.contains("reserved")) {
        clauses.remove(pos);
        has_reserved = true;
    }

    let mut probe_offset = if clauses[0] != "Waitlist" { 1 } else { 2 };
    if tokens.len() <= status_idx + 2 {
        probe_offset = 0;
    }
    if !has_reserved
        && probe_offset > 0
        && let Some(tok) = tokens.get(status_idx + probe_offset)
        && tok.split(' ').nth(1) == Some("of")
    {
        has_reserved = true;
    }

    (has_reserved, clauses)
}

/// Whether a token is the waitlist echo the portal sometimes appends after a
/// waitlisted status line (three words, large trailing number). It carries no
/// information and is discarded.
fn is_waitlist_echo(token: &str) -> bool {
    let words: Vec<&str> = token.split(' ').collect();
    words.len() == 3 && words[2].parse::<u32>().is_ok_and(|n| n > 50)
}

/// Parse the status/capacity line found at `tokens[status_idx]`.
///
/// `tokens` is the slice starting at the current section's first token so the
/// reserved-seat probe can look past the line.
pub fn parse_status_line(tokens: &[String], status_idx: usize) -> Result<StatusLine, String> {
    let (has_reserved, clauses) = check_reserved(tokens, status_idx);

    let status = Status::from_keyword(&clauses[0])
        .ok_or_else(|| format!("unknown status keyword '{}'", clauses[0]))?;
    let detail = clauses
        .get(1)
        .ok_or_else(|| format!("status line '{}' has no seat counts", tokens[status_idx]))?;

    let mut extra_consumed = 0;
    let counts = if status == Status::Waitlist {
        // "<Wa> of <Wb> waitlist seats available. <A> of <B> seats available."
        let (waitlist_part, seats_part) = detail
            .split_once(". ")
            .ok_or_else(|| format!("waitlist line '{detail}' has no seat clause"))?;
        let (waitlist_available, waitlist_capacity) = n_of_m(waitlist_part)?;
        let (seats_available, capacity) = n_of_m(seats_part)?;

        if tokens
            .get(status_idx + 1)
            .is_some_and(|t| is_waitlist_echo(t))
        {
            extra_consumed += 1;
        }

        SeatCounts {
            status,
            seats_available,
            capacity,
            waitlist_available,
            waitlist_capacity,
            reserved: None,
        }
    } else {
        let (seats_available, capacity) = n_of_m(detail)?;
        SeatCounts {
            status,
            seats_available,
            capacity,
            waitlist_available: DEFAULT_WAITLIST,
            waitlist_capacity: DEFAULT_WAITLIST,
            reserved: None,
        }
    };

    let mut counts = counts;
    if has_reserved {
        let idx = status_idx + extra_consumed + 1;
        let tok = tokens
            .get(idx)
            .ok_or_else(|| "reserved seats detected but no pool token follows".to_string())?;
        let (available, capacity) = n_of_m(tok)?;
        counts.reserved = Some(ReservedSeats { available, capacity });
        extra_consumed += 1;
    }

    counts.validate()?;
    Ok(StatusLine {
        counts,
        extra_consumed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn open_line() {
        let tokens = toks(&["Open, 45 of 45 seats available"]);
        let line = parse_status_line(&tokens, 0).unwrap();
        assert_eq!(line.counts.status, Status::Open);
        assert_eq!(line.counts.seats_available, 45);
        assert_eq!(line.counts.capacity, 45);
        assert_eq!(line.counts.waitlist_available, DEFAULT_WAITLIST);
        assert_eq!(line.extra_consumed, 0);
    }

    #[test]
    fn waitlist_line_carries_both_pools() {
        let tokens = toks(&[
            "Waitlist, 300 of 300 waitlist seats available. 40 of 40 seats available.",
        ]);
        let line = parse_status_line(&tokens, 0).unwrap();
        assert_eq!(line.counts.status, Status::Waitlist);
        assert_eq!(line.counts.waitlist_available, 300);
        assert_eq!(line.counts.waitlist_capacity, 300);
        assert_eq!(line.counts.seats_available, 40);
        assert_eq!(line.counts.capacity, 40);
    }

    #[test]
    fn labeled_reserved_clause_consumes_pool_token() {
        let tokens = toks(&["Open, 10 of 10 seats available, 2 reserved", "2 of 2"]);
        let line = parse_status_line(&tokens, 0).unwrap();
        assert_eq!(line.counts.status, Status::Open);
        assert_eq!(line.counts.seats_available, 10);
        assert_eq!(
            line.counts.reserved,
            Some(ReservedSeats {
                available: 2,
                capacity: 2
            })
        );
        assert_eq!(line.extra_consumed, 1);
    }

    #[test]
    fn unlabeled_reserved_continuation_detected_by_shape() {
        // No "reserved" keyword, but the trailing token still matches "n of m".
        let tokens = toks(&[
            "Open, 45 of 45 seats available",
            "3 of 10",
            "next section token",
        ]);
        let line = parse_status_line(&tokens, 0).unwrap();
        assert_eq!(
            line.counts.reserved,
            Some(ReservedSeats {
                available: 3,
                capacity: 10
            })
        );
        assert_eq!(line.extra_consumed, 1);
    }

    #[test]
    fn identity_token_after_line_is_not_reserved() {
        let tokens = toks(&[
            "Open, 45 of 45 seats available",
            "ENS Section AMS, Class Number5385",
            "Regular Academic",
        ]);
        let line = parse_status_line(&tokens, 0).unwrap();
        assert_eq!(line.counts.reserved, None);
        assert_eq!(line.extra_consumed, 0);
    }

    #[test]
    fn waitlist_echo_is_discarded() {
        let tokens = toks(&[
            "Waitlist, 5 of 300 waitlist seats available. 0 of 40 seats available.",
            "Waitlist total 300",
            "LEC Section 1U, Class Number8429",
        ]);
        let line = parse_status_line(&tokens, 0).unwrap();
        assert_eq!(line.counts.reserved, None);
        assert_eq!(line.extra_consumed, 1);
    }

    #[test]
    fn unknown_keyword_is_an_error() {
        let tokens = toks(&["Pending, 5 of 5 seats available"]);
        assert!(parse_status_line(&tokens, 0).is_err());
    }

    #[test]
    fn overfull_counts_are_rejected() {
        let tokens = toks(&["Open, 46 of 45 seats available"]);
        assert!(parse_status_line(&tokens, 0).is_err());
    }
}
