use crate::error::GfaError;
use crate::gfa::GFAVersion;
use crate::line::utils::{
    build_gfa_line, deduce_alignment, is_valid_name, parse_directed_reference, parse_interval, Alignment,
    Interval,
};
use crate::optional_field::{OptionalFieldValue, TagMap};
use crate::orientation::Orientation;

pub const REQ_COLUMNS_EDGE: usize = 9;

#[derive(Debug, Clone)]
pub struct Edge {
    pub line_no: usize,
    pub raw: String,
    pub tags: TagMap,

    pub id: Option<String>,
    pub from: String,
    pub from_orientation: Orientation,
    pub to: String,
    pub to_orientation: Orientation,
    pub from_interval: Interval,
    pub to_interval: Interval,
    pub alignment: Option<Alignment>,
}

impl Edge {
    pub fn parse_line(parts: &[&str], raw: &str, n: usize, map: &TagMap) -> Result<Self, GfaError> {
        let (from, from_orientation) = parse_directed_reference(parts[2], n)?;
        let (to, to_orientation) = parse_directed_reference(parts[3], n)?;

        let id = if parts[1] == "*" {
            None
        } else {
            if !is_valid_name(parts[1]) {
                return Err(GfaError::format(n, raw, "invalid edge ID"));
            }
            Some(parts[1].to_string())
        };

        let from_interval = parse_interval(parts[4], parts[5], n)?;
        let to_interval = parse_interval(parts[6], parts[7], n)?;
        let alignment = deduce_alignment(parts[8], n)?;

        Ok(Self {
            line_no: n,
            raw: raw.to_string(),
            tags: map.clone(),
            id,
            from,
            from_orientation,
            to,
            to_orientation,
            from_interval,
            to_interval,
            alignment,
        })
    }

    pub fn to_raw_line(&self, version: GFAVersion) -> String {
        match version {
            GFAVersion::V2 => self.to_raw_line_v2(),
            _ => self.to_raw_line_v1(),
        }
    }

    /// Converting to a `L` line loses positional/alignment information;
    /// a trace alignment is preserved as a `TS` tag, a CIGAR is kept as
    /// the overlap column.
    fn to_raw_line_v1(&self) -> String {
        let mut tags = self.tags.clone();
        if let Some(id) = &self.id {
            tags.insert("ID".to_string(), OptionalFieldValue::String(id.clone()));
        }
        let overlap = match &self.alignment {
            Some(Alignment::Cigar(c)) => c.clone(),
            Some(Alignment::Trace(t)) => {
                tags.insert("TS".to_string(), OptionalFieldValue::String(t.clone()));
                "*".to_string()
            }
            None => "*".to_string(),
        };
        tags.add_flag("PF", "edge");

        build_gfa_line(
            'L',
            &[
                self.from.as_str(),
                &self.from_orientation.to_string(),
                self.to.as_str(),
                &self.to_orientation.to_string(),
                &overlap,
            ],
            &tags,
        )
    }

    fn to_raw_line_v2(&self) -> String {
        build_gfa_line(
            'E',
            &[
                self.id.as_deref().unwrap_or("*"),
                &format!("{}{}", self.from, self.from_orientation),
                &format!("{}{}", self.to, self.to_orientation),
                &self.from_interval.begin.to_string(),
                &self.from_interval.end.to_string(),
                &self.to_interval.begin.to_string(),
                &self.to_interval.end.to_string(),
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
    fn parses_an_edge() {
        let map = TagMap::new();
        let edge = Edge::parse_line(
            &["E", "*", "a+", "b-", "0", "10", "5", "15", "10M"],
            "",
            1,
            &map,
        )
        .unwrap();
        assert_eq!(edge.from, "a");
        assert_eq!(edge.to_orientation, Orientation::Reverse);
    }
}
