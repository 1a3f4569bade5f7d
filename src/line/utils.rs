//! Shared parsing helpers used by more than one record type: name
//! validation, CIGAR/trace alignments, and GFA2 interval positions.

use crate::error::GfaError;
use crate::optional_field::TagMap;
use crate::orientation::Orientation;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntervalPosition {
    pub position: i64,
    pub is_last: bool,
}

impl std::fmt::Display for IntervalPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_last {
            write!(f, "{}$", self.position)
        } else {
            write!(f, "{}", self.position)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Interval {
    pub begin: IntervalPosition,
    pub end: IntervalPosition,
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.begin, self.end)
    }
}

/// A name must be non-empty printable ASCII, contain no whitespace, and
/// not be confusable with `*`/`=` placeholders or a `+`/`-` orientation
/// suffix.
pub fn is_valid_name(name: &str) -> bool {
    name.chars().all(|c| c.is_ascii_graphic())
        && !name.is_empty()
        && !name.contains(' ')
        && !name.starts_with('*')
        && !name.starts_with('=')
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alignment {
    Cigar(String),
    Trace(String),
}

impl std::fmt::Display for Alignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Alignment::Cigar(c) => write!(f, "{c}"),
            Alignment::Trace(t) => write!(f, "{t}"),
        }
    }
}

/// Parses a `*`, CIGAR, or GFA2 trace alignment column.
pub fn deduce_alignment(raw: &str, line: usize) -> Result<Option<Alignment>, GfaError> {
    if raw == "*" {
        Ok(None)
    } else if is_valid_cigar(raw) {
        Ok(Some(Alignment::Cigar(raw.to_string())))
    } else if is_valid_trace(raw) {
        Ok(Some(Alignment::Trace(raw.to_string())))
    } else {
        Err(GfaError::format(line, raw, "not a valid CIGAR or trace alignment"))
    }
}

/// A single CIGAR `M` op spanning the full overlap, e.g. `150M`: the
/// shape that makes two segments collapsible into one during linear
/// path merging.
pub fn single_m_cigar_length(alignment: &Alignment) -> Option<i64> {
    match alignment {
        Alignment::Cigar(c) => {
            let digits: String = c.chars().take_while(|ch| ch.is_ascii_digit()).collect();
            if c.len() == digits.len() + 1 && c.ends_with('M') {
                digits.parse().ok()
            } else {
                None
            }
        }
        Alignment::Trace(_) => None,
    }
}

pub fn is_valid_trace(trace: &str) -> bool {
    if trace.is_empty() {
        return false;
    }
    trace.split(',').all(|part| !part.is_empty() && part.parse::<i64>().is_ok())
}

pub fn is_valid_cigar(cigar: &str) -> bool {
    if cigar.is_empty() {
        return false;
    }
    let bytes = cigar.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            return false;
        }
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        match bytes.get(i) {
            Some(b'M' | b'I' | b'D' | b'N' | b'S' | b'H' | b'P' | b'X' | b'=') => i += 1,
            _ => return false,
        }
    }
    true
}

/// Parses a GFA2 interval position: a non-negative integer optionally
/// followed by a trailing `$` marking the end of the segment.
pub fn parse_position(raw: &str, line: usize) -> Result<IntervalPosition, GfaError> {
    if raw.is_empty() {
        return Err(GfaError::format(line, raw, "empty interval position"));
    }
    let is_last = raw.ends_with('$');
    let digits = if is_last { &raw[..raw.len() - 1] } else { raw };
    let position = digits
        .parse::<i64>()
        .map_err(|_| GfaError::format(line, raw, "interval position must be an integer"))?;
    Ok(IntervalPosition { position, is_last })
}

pub fn parse_interval(begin: &str, end: &str, line: usize) -> Result<Interval, GfaError> {
    Ok(Interval {
        begin: parse_position(begin, line)?,
        end: parse_position(end, line)?,
    })
}

/// Validates a parsed interval against the referenced segment's length,
/// returning `Err` only for the sentinel-placement rule; length-range
/// mismatches are the caller's concern since virtual segments may not
/// know their length yet.
pub fn check_interval_sentinels(interval: &Interval, length: i64) -> Result<(), GfaError> {
    if interval.begin.is_last && interval.begin.position != length {
        return Err(GfaError::inconsistency(format!(
            "interval begin {} carries the $ sentinel but segment length is {length}",
            interval.begin
        )));
    }
    if interval.end.is_last && interval.end.position != length {
        return Err(GfaError::inconsistency(format!(
            "interval end {} carries the $ sentinel but segment length is {length}",
            interval.end
        )));
    }
    if !interval.begin.is_last && interval.begin.position == length {
        return Err(GfaError::inconsistency(format!(
            "interval begin {} reaches segment length {length} but is missing the $ sentinel",
            interval.begin
        )));
    }
    if !interval.end.is_last && interval.end.position == length {
        return Err(GfaError::inconsistency(format!(
            "interval end {} reaches segment length {length} but is missing the $ sentinel",
            interval.end
        )));
    }
    Ok(())
}

/// Parses a trailing `+`/`-` orientation off a reference name, as used
/// by GFA1 step/link columns (`utg1+`).
pub fn parse_directed_reference(raw: &str, line: usize) -> Result<(String, Orientation), GfaError> {
    let last = raw
        .chars()
        .last()
        .ok_or_else(|| GfaError::format(line, raw, "empty directed reference"))?;
    let orientation = Orientation::from_sign(last)
        .ok_or_else(|| GfaError::format(line, raw, "directed reference must end in + or -"))?;
    let name = &raw[..raw.len() - last.len_utf8()];
    if !is_valid_name(name) {
        return Err(GfaError::format(line, raw, "invalid segment name in directed reference"));
    }
    Ok((name.to_string(), orientation))
}

/// Re-assembles a record's tab-separated columns and tags, in the order
/// tags were first parsed, into one GFA line.
pub fn build_gfa_line(record_type: char, columns: &[&str], tags: &TagMap) -> String {
    let mut line = String::new();
    line.push(record_type);
    for col in columns {
        line.push('\t');
        line.push_str(col);
    }
    for column in tags.to_columns() {
        line.push('\t');
        line.push_str(&column);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names() {
        assert!(is_valid_name("utg1"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("has space"));
        assert!(!is_valid_name("*weird"));
    }

    #[test]
    fn cigar_and_trace_alignments() {
        assert_eq!(deduce_alignment("*", 1).unwrap(), None);
        assert!(matches!(deduce_alignment("10M2I", 1).unwrap(), Some(Alignment::Cigar(_))));
        assert!(matches!(deduce_alignment("1,2,3", 1).unwrap(), Some(Alignment::Trace(_))));
        assert!(deduce_alignment("bogus", 1).is_err());
    }

    #[test]
    fn single_m_cigar_extracts_length() {
        let a = Alignment::Cigar("150M".to_string());
        assert_eq!(single_m_cigar_length(&a), Some(150));
        let b = Alignment::Cigar("10M5I".to_string());
        assert_eq!(single_m_cigar_length(&b), None);
    }

    #[test]
    fn interval_sentinel_rules() {
        let good = Interval {
            begin: IntervalPosition { position: 0, is_last: false },
            end: IntervalPosition { position: 10, is_last: true },
        };
        assert!(check_interval_sentinels(&good, 10).is_ok());

        let missing_sentinel = Interval {
            begin: IntervalPosition { position: 0, is_last: false },
            end: IntervalPosition { position: 10, is_last: false },
        };
        assert!(check_interval_sentinels(&missing_sentinel, 10).is_err());
    }

    #[test]
    fn directed_reference_parses_orientation() {
        let (name, o) = parse_directed_reference("utg1+", 1).unwrap();
        assert_eq!(name, "utg1");
        assert_eq!(o, Orientation::Forward);
    }
}
