//! Text heuristics for the loosely formatted fields of a listing.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::models::{QueuePoints, DIRECT_ALLOCATION, QUEUE_RANKS};

/// Digits with interior single spaces, preceded by a space, e.g. `" 1 234"`.
static QUEUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" ([0-9]+(?: [0-9]+)*)").unwrap());
static DEADLINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{4}-[0-9]{2}-[0-9]{2}").unwrap());
/// Floor encoded in the address, e.g. `"Storgatan 4.3"`.
static FLOOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.([0-9])").unwrap());

/// Length of the listing id at the end of a detail URL.
const REFID_LEN: usize = 64;

/// Applicant count and top five queue points from the interest status text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStatus {
    pub applicants: i64,
    pub points: QueuePoints,
}

/// Slice the JSON object out of a JSONP envelope such as `cb({...});`.
pub fn unwrap_envelope(body: &str) -> Result<&str> {
    let start = body
        .find('{')
        .ok_or_else(|| Error::MalformedResponse("no opening brace in body".into()))?;
    let end = body
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| Error::MalformedResponse("no closing brace in body".into()))?;
    Ok(&body[start..=end])
}

/// The listing id: the last 64 characters of its detail URL.
pub fn refid_from_url(url: &str) -> &str {
    match url.char_indices().rev().nth(REFID_LEN - 1) {
        Some((start, _)) => &url[start..],
        None => url,
    }
}

/// Rent with whitespace thousands separators, e.g. `"7 250"`.
pub fn parse_rent(raw: &str) -> Result<i64> {
    strip_whitespace(raw)
        .parse()
        .map_err(|_| Error::field("rent", raw))
}

pub fn parse_size(raw: &str) -> Result<f64> {
    raw.trim().parse().map_err(|_| Error::field("size", raw))
}

/// The floor as given, or else the digit after the first `.` in the address.
pub fn parse_floor(raw: &str, address: &str) -> Result<i64> {
    if let Ok(floor) = raw.trim().parse() {
        return Ok(floor);
    }

    FLOOR_RE
        .captures(address)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| Error::field("floor", format!("{raw} / {address}")))
}

/// Parse the interest status text.
///
/// The first number is the applicant count; the following (up to five) are
/// the queue points for ranks 1-5. Ranks without a number are zero.
pub fn parse_queue(status: &str) -> Result<QueueStatus> {
    let matches: Vec<&str> = QUEUE_RE
        .captures_iter(status)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect();

    let applicants = match matches.first() {
        Some(first) => parse_number("applicants", first)?,
        None => 0,
    };

    let visible = matches.len().saturating_sub(1);
    let mut points = [0; QUEUE_RANKS];
    for (i, slot) in points.iter_mut().enumerate() {
        if i < visible {
            *slot = parse_number("queue points", matches[i + 1])?;
        }
    }

    Ok(QueueStatus {
        applicants,
        points: QueuePoints::new(points),
    })
}

/// First `YYYY-MM-DD` in the text, or [`DIRECT_ALLOCATION`] when there is none.
pub fn parse_deadline(text: &str) -> String {
    DEADLINE_RE
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| DIRECT_ALLOCATION.to_string())
}

fn parse_number(field: &'static str, raw: &str) -> Result<i64> {
    strip_whitespace(raw)
        .parse()
        .map_err(|_| Error::field(field, raw))
}

fn strip_whitespace(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_callback_envelopes() {
        assert_eq!(
            unwrap_envelope(r#"jQuery1710_1492({"data":{"a":1}});"#).unwrap(),
            r#"{"data":{"a":1}}"#
        );
        assert_eq!(
            unwrap_envelope(r#"({"html":{}});"#).unwrap(),
            r#"{"html":{}}"#
        );
        assert!(matches!(
            unwrap_envelope("<html>502 Bad Gateway</html>"),
            Err(Error::MalformedResponse(_))
        ));
        assert!(matches!(
            unwrap_envelope("} oops {"),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[test]
    fn refid_is_url_suffix() {
        let id = "a".repeat(64);
        let url = format!("https://marknad.studentbostader.se/objekt/{id}");
        assert_eq!(refid_from_url(&url), id);
        assert_eq!(refid_from_url("short"), "short");
    }

    #[test]
    fn rent_drops_thousands_separators() {
        assert_eq!(parse_rent("7 250").unwrap(), 7250);
        assert_eq!(parse_rent("12\u{a0}400").unwrap(), 12400);
        assert_eq!(parse_rent("3100").unwrap(), 3100);
        assert!(matches!(parse_rent("n/a"), Err(Error::FieldParse { field: "rent", .. })));
    }

    #[test]
    fn size_parses_as_float() {
        assert_eq!(parse_size("25.5").unwrap(), 25.5);
        assert_eq!(parse_size(" 18 ").unwrap(), 18.0);
        assert!(parse_size("stor").is_err());
    }

    #[test]
    fn floor_prefers_raw_value() {
        assert_eq!(parse_floor("2", "Storgatan 4.3").unwrap(), 2);
    }

    #[test]
    fn floor_falls_back_to_address() {
        assert_eq!(parse_floor("N/A", "Storgatan 4.3").unwrap(), 3);
    }

    #[test]
    fn floor_fails_without_any_source() {
        assert!(matches!(
            parse_floor("N/A", "Storgatan 4"),
            Err(Error::FieldParse { field: "floor", .. })
        ));
    }

    #[test]
    fn queue_pads_visible_points() {
        // Matches: "12", "3 4", "0", "7"
        let status = parse_queue("Sökande 12st, poäng 3 4p, 0p och 7p").unwrap();
        assert_eq!(status.applicants, 12);
        assert_eq!(status.points.as_array(), &[34, 0, 7, 0, 0]);
    }

    #[test]
    fn queue_ignores_runs_of_spaces() {
        let status = parse_queue("Antal sökande:  12  st, poäng  300 p").unwrap();
        assert_eq!(status.applicants, 12);
        assert_eq!(status.points.as_array(), &[300, 0, 0, 0, 0]);
    }

    #[test]
    fn queue_in_indented_markup() {
        let html = "<div>\n    <span>Sökande 12 st</span> 3 4p 0p 7p\n  </div>";
        let status = parse_queue(html).unwrap();
        assert_eq!(status.applicants, 12);
        assert_eq!(status.points.as_array(), &[34, 0, 7, 0, 0]);
    }

    #[test]
    fn queue_uses_at_most_five_points() {
        let status = parse_queue("n 9x 1x 2x 3x 4x 5x 6x").unwrap();
        assert_eq!(status.applicants, 9);
        assert_eq!(status.points.as_array(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn queue_without_numbers_is_empty() {
        let status = parse_queue("Inga intresseanmälningar").unwrap();
        assert_eq!(status.applicants, 0);
        assert_eq!(status.points, QueuePoints::default());
    }

    #[test]
    fn queue_with_only_applicants() {
        let status = parse_queue("Antal 4st").unwrap();
        assert_eq!(status.applicants, 4);
        assert_eq!(status.points.as_array(), &[0; 5]);
    }

    #[test]
    fn deadline_finds_first_date() {
        assert_eq!(
            parse_deadline("Sista anmälningsdag 2021-05-17, inflytt 2021-06-01"),
            "2021-05-17"
        );
    }

    #[test]
    fn deadline_defaults_to_direct_allocation() {
        assert_eq!(parse_deadline("Direkt tilldelning"), DIRECT_ALLOCATION);
    }
}
