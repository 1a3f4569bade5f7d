use crate::error::GfaError;
use crate::gfa::GFAVersion;
use crate::line::utils::build_gfa_line;
use crate::optional_field::TagMap;
use crate::orientation::Orientation;

pub const REQ_COLUMNS_CONTAIN: usize = 7;

#[derive(Debug, Clone)]
pub struct Containment {
    pub line_no: usize,
    pub raw: String,
    pub tags: TagMap,

    pub container: String,
    pub container_orientation: Orientation,
    pub contained: String,
    pub contained_orientation: Orientation,
    pub position: i64,
    pub overlap: String,
}

impl Containment {
    pub fn parse_line(parts: &[&str], raw: &str, n: usize, map: &TagMap) -> Result<Self, GfaError> {
        let container = parts[1].to_string();
        let container_orientation = Orientation::from_sign(parts[2].chars().next().unwrap_or('?'))
            .ok_or_else(|| GfaError::format(n, raw, "containment orientation must be + or -"))?;
        let contained = parts[3].to_string();
        let contained_orientation = Orientation::from_sign(parts[4].chars().next().unwrap_or('?'))
            .ok_or_else(|| GfaError::format(n, raw, "containment orientation must be + or -"))?;
        let position = parts[5]
            .parse::<i64>()
            .map_err(|_| GfaError::format(n, raw, "containment position must be a non-negative integer"))?;
        if position < 0 {
            return Err(GfaError::format(n, raw, "containment position must be non-negative"));
        }
        let overlap = parts[6].to_string();
        if overlap != "*" && !crate::line::utils::is_valid_cigar(&overlap) {
            return Err(GfaError::format(n, raw, "containment overlap must be * or a CIGAR string"));
        }

        Ok(Self {
            line_no: n,
            raw: raw.to_string(),
            tags: map.clone(),
            container,
            container_orientation,
            contained,
            contained_orientation,
            position,
            overlap,
        })
    }

    pub fn to_raw_line(&self, _version: GFAVersion) -> String {
        build_gfa_line(
            'C',
            &[
                self.container.as_str(),
                &self.container_orientation.to_string(),
                self.contained.as_str(),
                &self.contained_orientation.to_string(),
                &self.position.to_string(),
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
    fn parses_a_containment() {
        let map = TagMap::new();
        let c = Containment::parse_line(
            &["C", "a", "+", "b", "-", "5", "10M"],
            "C\ta\t+\tb\t-\t5\t10M",
            1,
            &map,
        )
        .unwrap();
        assert_eq!(c.position, 5);
    }

    #[test]
    fn rejects_negative_position() {
        let map = TagMap::new();
        assert!(Containment::parse_line(&["C", "a", "+", "b", "-", "-1", "*"], "", 1, &map).is_err());
    }
}
