use crate::error::GfaError;
use crate::gfa::GFAVersion;
use crate::line::utils::{build_gfa_line, is_valid_name};
use crate::optional_field::{OptionalFieldValue, TagMap};

/// A segment record.
///
/// Segments can exist in two states: a `Virtual` segment is a stand-in
/// created when a link, containment, path step, edge, fragment or gap
/// names a segment that hasn't been defined yet; it carries no sequence
/// or tags of its own. Once the real `S` line for that name is parsed,
/// the virtual segment is promoted in place ([`Segment::promote`]) so
/// every index and reference built against its position stays valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentState {
    Real,
    Virtual,
}

#[derive(Debug, Clone)]
pub struct Segment {
    pub line_no: usize,
    pub raw: String,
    pub tags: TagMap,

    pub name: String,
    pub sequence: String,
    pub length: Option<i64>,

    pub state: SegmentState,
}

impl Segment {
    /// Creates the virtual placeholder referenced before its real
    /// definition is seen.
    pub fn virtual_with_name(name: impl Into<String>) -> Self {
        Self {
            line_no: 0,
            raw: String::new(),
            tags: TagMap::new(),
            name: name.into(),
            sequence: "*".to_string(),
            length: None,
            state: SegmentState::Virtual,
        }
    }

    pub fn is_virtual(&self) -> bool {
        self.state == SegmentState::Virtual
    }

    /// Fills in a virtual segment's fields from its real definition,
    /// without touching anything that already referenced it by line
    /// number or name.
    pub fn promote(&mut self, real: Segment) {
        debug_assert_eq!(self.name, real.name);
        self.line_no = real.line_no;
        self.raw = real.raw;
        self.tags = real.tags;
        self.sequence = real.sequence;
        self.length = real.length;
        self.state = SegmentState::Real;
    }

    pub fn parse_line(
        parts: &[&str],
        raw: &str,
        n: usize,
        map: &mut TagMap,
        version: GFAVersion,
        skip_invalid_sequence_test: bool,
        store_sequences: bool,
    ) -> Result<Self, GfaError> {
        if !is_valid_name(parts[1]) {
            return Err(GfaError::format(n, raw, "invalid segment name"));
        }
        let name = parts[1].to_string();
        let ln_tag = map.get::<i32>("LN");

        let (sequence, length) = if version == GFAVersion::V2 {
            let sequence = parts[3].to_string();
            let length = parts[2]
                .parse::<i64>()
                .map_err(|_| GfaError::format(n, raw, "invalid segment length column"))?;
            if let Some(ln) = ln_tag {
                if ln as i64 != length {
                    return Err(GfaError::inconsistency(format!(
                        "segment {name}: LN tag {ln} does not match length column {length}"
                    )));
                }
            }
            (sequence, Some(length))
        } else {
            let sequence = parts[2].to_string();
            if let Some(ln) = ln_tag {
                if sequence != "*" && ln as usize != sequence.len() {
                    return Err(GfaError::inconsistency(format!(
                        "segment {name}: LN tag {ln} does not match sequence length {}",
                        sequence.len()
                    )));
                }
            }
            (sequence, None)
        };

        if !skip_invalid_sequence_test {
            let bytes = sequence.as_bytes();
            if !(bytes.len() == 1 && bytes[0] == b'*')
                && bytes.iter().any(|&b| !(b'!'..=b'~').contains(&b))
            {
                return Err(GfaError::format(n, raw, "sequence contains non-printable characters"));
            }
        }

        if ln_tag.is_none() && version != GFAVersion::V2 && sequence != "*" {
            map.insert("LN".to_string(), OptionalFieldValue::Int(sequence.len() as i32));
        }

        Ok(Self {
            line_no: n,
            raw: raw.to_string(),
            tags: map.clone(),
            name,
            sequence: if store_sequences { sequence } else { "*".to_string() },
            length,
            state: SegmentState::Real,
        })
    }

    /// Priority: GFA2 length column, then `LN` tag, then sequence
    /// length (when not `*`), otherwise 0.
    pub fn get_length(&self) -> i64 {
        if let Some(len) = self.length {
            len
        } else if let Some(ln) = self.tags.get::<i32>("LN") {
            ln as i64
        } else if self.sequence != "*" && !self.sequence.is_empty() {
            self.sequence.len() as i64
        } else {
            0
        }
    }

    pub fn to_raw_line(&self, version: GFAVersion) -> String {
        match version {
            GFAVersion::V2 => build_gfa_line(
                'S',
                &[self.name.as_str(), &self.get_length().to_string(), self.sequence.as_str()],
                &self.tags,
            ),
            _ => build_gfa_line('S', &[self.name.as_str(), self.sequence.as_str()], &self.tags),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_segment_promotes_in_place() {
        let mut seg = Segment::virtual_with_name("s1");
        assert!(seg.is_virtual());
        let mut map = TagMap::new();
        let real = Segment::parse_line(
            &["S", "s1", "ACGT"],
            "S\ts1\tACGT",
            3,
            &mut map,
            GFAVersion::V1,
            false,
            true,
        )
        .unwrap();
        seg.promote(real);
        assert!(!seg.is_virtual());
        assert_eq!(seg.sequence, "ACGT");
        assert_eq!(seg.get_length(), 4);
    }

    #[test]
    fn rejects_invalid_name() {
        let mut map = TagMap::new();
        let err = Segment::parse_line(
            &["S", "has space", "ACGT"],
            "S\thas space\tACGT",
            1,
            &mut map,
            GFAVersion::V1,
            false,
            true,
        );
        assert!(err.is_err());
    }

    #[test]
    fn length_mismatch_between_tag_and_sequence_errors() {
        let mut map = TagMap::new();
        map.insert("LN".to_string(), OptionalFieldValue::Int(10));
        let err = Segment::parse_line(
            &["S", "s1", "ACGT"],
            "S\ts1\tACGT\tLN:i:10",
            1,
            &mut map,
            GFAVersion::V1,
            false,
            true,
        );
        assert!(err.is_err());
    }
}
