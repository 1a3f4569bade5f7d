use crate::error::GfaError;
use crate::gfa::GFAVersion;
use crate::line::utils::build_gfa_line;
use crate::optional_field::TagMap;
use crate::orientation::Orientation;

pub const REQ_COLUMNS_LINK: usize = 6;

#[derive(Debug, Clone)]
pub struct Link {
    pub line_no: usize,
    pub raw: String,
    pub tags: TagMap,

    pub from_segment: String,
    pub from_orientation: Orientation,
    pub to_segment: String,
    pub to_orientation: Orientation,
    pub overlap: String,
}

impl Link {
    pub fn parse_line(parts: &[&str], raw: &str, n: usize, map: &TagMap) -> Result<Self, GfaError> {
        let from_segment = parts[1].to_string();
        let from_orientation = Orientation::from_sign(parts[2].chars().next().unwrap_or('?'))
            .ok_or_else(|| GfaError::format(n, raw, "link orientation must be + or -"))?;
        let to_segment = parts[3].to_string();
        let to_orientation = Orientation::from_sign(parts[4].chars().next().unwrap_or('?'))
            .ok_or_else(|| GfaError::format(n, raw, "link orientation must be + or -"))?;
        let overlap = parts[5].to_string();

        if overlap != "*" && !crate::line::utils::is_valid_cigar(&overlap) {
            return Err(GfaError::format(n, raw, "link overlap must be * or a CIGAR string"));
        }

        Ok(Self {
            line_no: n,
            raw: raw.to_string(),
            tags: map.clone(),
            from_segment,
            from_orientation,
            to_segment,
            to_orientation,
            overlap,
        })
    }

    pub fn to_raw_line(&self, _version: GFAVersion) -> String {
        build_gfa_line(
            'L',
            &[
                self.from_segment.as_str(),
                &self.from_orientation.to_string(),
                self.to_segment.as_str(),
                &self.to_orientation.to_string(),
                &self.overlap,
            ],
            &self.tags,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_basic_link() {
        let map = TagMap::new();
        let link = Link::parse_line(
            &["L", "a", "+", "b", "-", "10M"],
            "L\ta\t+\tb\t-\t10M",
            1,
            &map,
        )
        .unwrap();
        assert_eq!(link.from_orientation, Orientation::Forward);
        assert_eq!(link.to_orientation, Orientation::Reverse);
    }

    #[test]
    fn rejects_bad_orientation() {
        let map = TagMap::new();
        assert!(Link::parse_line(&["L", "a", "x", "b", "-", "*"], "", 1, &map).is_err());
    }
}
