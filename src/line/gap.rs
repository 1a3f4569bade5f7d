use crate::error::GfaError;
use crate::gfa::GFAVersion;
use crate::line::utils::{build_gfa_line, is_valid_name, parse_directed_reference};
use crate::optional_field::{OptionalFieldValue, TagMap};
use crate::orientation::Orientation;

pub const REQ_COLUMNS_GAP: usize = 6;

#[derive(Debug, Clone)]
pub struct Gap {
    pub line_no: usize,
    pub raw: String,
    pub tags: TagMap,

    pub id: Option<String>,
    pub from: String,
    pub from_orientation: Orientation,
    pub to: String,
    pub to_orientation: Orientation,
    pub distance: i64,
    pub variance: Option<i64>,
}

impl Gap {
    pub fn parse_line(parts: &[&str], raw: &str, n: usize, map: &TagMap) -> Result<Self, GfaError> {
        let id = if parts[1] == "*" {
            None
        } else {
            if !is_valid_name(parts[1]) {
                return Err(GfaError::format(n, raw, "invalid gap ID"));
            }
            Some(parts[1].to_string())
        };

        let (from, from_orientation) = parse_directed_reference(parts[2], n)?;
        let (to, to_orientation) = parse_directed_reference(parts[3], n)?;
        let distance = parts[4]
            .parse::<i64>()
            .map_err(|_| GfaError::format(n, raw, "gap distance must be an integer"))?;
        let variance = match parts[5] {
            "*" => None,
            s => Some(
                s.parse::<i64>()
                    .map_err(|_| GfaError::format(n, raw, "gap variance must be an integer or *"))?,
            ),
        };

        Ok(Self {
            line_no: n,
            raw: raw.to_string(),
            tags: map.clone(),
            id,
            from,
            from_orientation,
            to,
            to_orientation,
            distance,
            variance,
        })
    }

    pub fn to_raw_line(&self, version: GFAVersion) -> String {
        match version {
            GFAVersion::V2 => self.to_raw_line_v2(),
            _ => self.to_raw_line_v1(),
        }
    }

    /// No direct GFA1 equivalent; round-tripped as a flagged link with
    /// the distance preserved in a `DI` tag.
    fn to_raw_line_v1(&self) -> String {
        let mut tags = self.tags.clone();
        if let Some(id) = &self.id {
            tags.insert("ID".to_string(), OptionalFieldValue::String(id.clone()));
        }
        tags.insert("DI".to_string(), OptionalFieldValue::Int(self.distance as i32));
        if let Some(v) = self.variance {
            tags.insert("VA".to_string(), OptionalFieldValue::Int(v as i32));
        }
        tags.add_flag("PF", "gap");

        build_gfa_line(
            'L',
            &[
                self.from.as_str(),
                &self.from_orientation.to_string(),
                self.to.as_str(),
                &self.to_orientation.to_string(),
                "*",
            ],
            &tags,
        )
    }

    fn to_raw_line_v2(&self) -> String {
        build_gfa_line(
            'G',
            &[
                self.id.as_deref().unwrap_or("*"),
                &format!("{}{}", self.from, self.from_orientation),
                &format!("{}{}", self.to, self.to_orientation),
                &self.distance.to_string(),
                &self.variance.map_or("*".to_string(), |v| v.to_string()),
            ],
            &self.tags,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_gap() {
        let map = TagMap::new();
        let g = Gap::parse_line(&["G", "*", "a+", "b-", "100", "10"], "", 1, &map).unwrap();
        assert_eq!(g.distance, 100);
        assert_eq!(g.variance, Some(10));
    }

    #[test]
    fn star_variance_is_none() {
        let map = TagMap::new();
        let g = Gap::parse_line(&["G", "*", "a+", "b-", "100", "*"], "", 1, &map).unwrap();
        assert_eq!(g.variance, None);
    }
}
