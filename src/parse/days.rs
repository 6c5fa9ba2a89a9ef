//! Weekday token parsing for both day formats the portal emits.
//!
//! Single-meeting cards spell days out ("Monday Wednesday Friday"); the
//! meeting patterns table packs two-letter codes together ("MoWeFr").

use crate::data::course::Day;

/// Parse a space-separated full-name day token.
///
/// Returns `None` unless every word is a recognized day name — this is the
/// decisive branch point between the single-meeting layout and everything
/// else, so a non-day token must not be an error here.
pub fn parse_day_sequence(token: &str) -> Option<Vec<Day>> {
    let words: Vec<&str> = token.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }
    words.iter().map(|w| Day::from_full(w)).collect()
}

/// Expand a packed abbreviation like `"MoWeFr"` into full days.
///
/// `"TBA"` maps to a single TBA entry. An unrecognized two-letter code is a
/// hard parse error.
pub fn expand_abbrev_days(token: &str) -> Result<Vec<Day>, String> {
    if token == "TBA" {
        return Ok(vec![Day::Tba]);
    }
    let chars: Vec<char> = token.chars().collect();
    let mut days = Vec::with_capacity(chars.len() / 2);
    for pair in chars.chunks(2) {
        let code: String = pair.iter().collect();
        let day = Day::from_abbrev(&code)
            .ok_or_else(|| format!("unrecognized day abbreviation '{code}' in '{token}'"))?;
        days.push(day);
    }
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_day_sequence() {
        assert_eq!(
            parse_day_sequence("Monday Wednesday Friday"),
            Some(vec![Day::Monday, Day::Wednesday, Day::Friday])
        );
    }

    #[test]
    fn tba_is_a_valid_sequence() {
        assert_eq!(parse_day_sequence("TBA"), Some(vec![Day::Tba]));
    }

    #[test]
    fn status_line_is_not_a_day_sequence() {
        assert_eq!(parse_day_sequence("Open, 10 of 10 seats available"), None);
    }

    #[test]
    fn meeting_preview_is_not_a_day_sequence() {
        assert_eq!(
            parse_day_sequence("Meeting 1: Wednesday . Meeting 2: Monday"),
            None
        );
    }

    #[test]
    fn expand_packed_codes() {
        assert_eq!(
            expand_abbrev_days("MoWeFr").unwrap(),
            vec![Day::Monday, Day::Wednesday, Day::Friday]
        );
    }

    #[test]
    fn expand_tba() {
        assert_eq!(expand_abbrev_days("TBA").unwrap(), vec![Day::Tba]);
    }

    #[test]
    fn expand_rejects_unknown_code() {
        assert!(expand_abbrev_days("Xx").is_err());
        assert!(expand_abbrev_days("MoXx").is_err());
    }
}
