use crate::error::GfaError;
use crate::gfa::GFAVersion;
use crate::line::utils::{build_gfa_line, is_valid_cigar, is_valid_name};
use crate::optional_field::TagMap;
use crate::orientation::Orientation;

pub const REQ_COLUMNS_PATH: usize = 4;

#[derive(Debug, Clone)]
pub struct Step {
    pub segment: String,
    pub orientation: Orientation,
}

#[derive(Debug, Clone)]
pub struct Path {
    pub line_no: usize,
    pub raw: String,
    pub tags: TagMap,

    pub name: String,
    pub steps: Vec<Step>,
    pub overlaps: Vec<String>,
}

impl Path {
    /// Parses the syntactic shape of a path line only: step segment
    /// names/orientations and the overlap list. Whether consecutive
    /// steps are actually connected by a link is the graph builder's
    /// concern, since it needs the full link index to check.
    pub fn parse_line(parts: &[&str], raw: &str, n: usize, map: &TagMap) -> Result<Self, GfaError> {
        if !is_valid_name(parts[1]) {
            return Err(GfaError::format(n, raw, "invalid path name"));
        }
        let name = parts[1].to_string();

        let step_tokens: Vec<&str> = parts[2].split(',').collect();
        let mut steps = Vec::with_capacity(step_tokens.len());
        for token in &step_tokens {
            if token.len() < 2 {
                return Err(GfaError::format(n, raw, "path step must be a name followed by + or -"));
            }
            let last = token.chars().last().unwrap();
            let orientation = Orientation::from_sign(last)
                .ok_or_else(|| GfaError::format(n, raw, "path step orientation must be + or -"))?;
            let segment = token[..token.len() - 1].to_string();
            steps.push(Step { segment, orientation });
        }

        let overlaps = if parts[3] == "*" {
            Vec::new()
        } else {
            let overlaps: Vec<&str> = parts[3].split(',').collect();
            if !overlaps.is_empty() && overlaps.len() != steps.len().saturating_sub(1) {
                return Err(GfaError::format(
                    n,
                    raw,
                    "path overlap count must be one less than the step count",
                ));
            }
            for o in &overlaps {
                if *o != "*" && !is_valid_cigar(o) {
                    return Err(GfaError::format(n, raw, "path overlap must be * or a CIGAR string"));
                }
            }
            overlaps.into_iter().map(String::from).collect()
        };

        Ok(Self {
            line_no: n,
            raw: raw.to_string(),
            tags: map.clone(),
            name,
            steps,
            overlaps,
        })
    }

    pub fn to_raw_line(&self, _version: GFAVersion) -> String {
        let steps = self
            .steps
            .iter()
            .map(|s| format!("{}{}", s.segment, s.orientation))
            .collect::<Vec<String>>()
            .join(",");
        let overlaps = if self.overlaps.is_empty() {
            "*".to_string()
        } else {
            self.overlaps.join(",")
        };
        build_gfa_line('P', &[self.name.as_str(), &steps, &overlaps], &self.tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_steps_and_overlaps() {
        let map = TagMap::new();
        let path = Path::parse_line(
            &["P", "p1", "a+,b-,c+", "10M,20M"],
            "P\tp1\ta+,b-,c+\t10M,20M",
            1,
            &map,
        )
        .unwrap();
        assert_eq!(path.steps.len(), 3);
        assert_eq!(path.overlaps, vec!["10M".to_string(), "20M".to_string()]);
    }

    #[test]
    fn star_overlap_means_no_overlaps() {
        let map = TagMap::new();
        let path = Path::parse_line(&["P", "p1", "a+,b-", "*"], "", 1, &map).unwrap();
        assert!(path.overlaps.is_empty());
    }

    #[test]
    fn mismatched_overlap_count_errors() {
        let map = TagMap::new();
        assert!(Path::parse_line(&["P", "p1", "a+,b-,c+", "10M"], "", 1, &map).is_err());
    }
}
