use crate::error::GfaError;
use crate::gfa::GFAVersion;
use crate::line::utils::{build_gfa_line, deduce_alignment, parse_directed_reference, parse_interval, Alignment, Interval};
use crate::optional_field::TagMap;
use crate::orientation::Orientation;

pub const REQ_COLUMNS_FRAGMENT: usize = 8;

#[derive(Debug, Clone)]
pub struct Fragment {
    pub line_no: usize,
    pub raw: String,
    pub tags: TagMap,

    pub segment: String,
    pub external: String,
    pub external_orientation: Orientation,
    pub segment_interval: Interval,
    pub fragment_interval: Interval,
    pub alignment: Option<Alignment>,
}

impl Fragment {
    pub fn parse_line(parts: &[&str], raw: &str, n: usize, map: &TagMap) -> Result<Self, GfaError> {
        let segment = parts[1].to_string();
        let (external, external_orientation) = parse_directed_reference(parts[2], n)?;
        let segment_interval = parse_interval(parts[3], parts[4], n)?;
        let fragment_interval = parse_interval(parts[5], parts[6], n)?;
        let alignment = deduce_alignment(parts[7], n)?;

        Ok(Self {
            line_no: n,
            raw: raw.to_string(),
            tags: map.clone(),
            segment,
            external,
            external_orientation,
            segment_interval,
            fragment_interval,
            alignment,
        })
    }

    /// Fragments are a GFA2-only concept: an external read has no place
    /// in a GFA1 line, so this is never called for a v1 output file.
    pub fn to_raw_line(&self, _version: GFAVersion) -> String {
        build_gfa_line(
            'F',
            &[
                self.segment.as_str(),
                &format!("{}{}", self.external, self.external_orientation),
                &self.segment_interval.begin.to_string(),
                &self.segment_interval.end.to_string(),
                &self.fragment_interval.begin.to_string(),
                &self.fragment_interval.end.to_string(),
                &self.alignment.as_ref().map_or("*".to_string(), |a| a.to_string()),
            ],
            &self.tags,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_fragment() {
        let map = TagMap::new();
        let f = Fragment::parse_line(
            &["F", "s1", "read1-", "0", "10", "0", "10", "*"],
            "",
            1,
            &map,
        )
        .unwrap();
        assert_eq!(f.external, "read1");
        assert_eq!(f.external_orientation, Orientation::Reverse);
    }
}
