use crate::error::GfaError;
use crate::gfa::GFAVersion;
use crate::line::utils::{build_gfa_line, parse_directed_reference};
use crate::optional_field::TagMap;
use crate::orientation::Orientation;

pub const REQ_COLUMNS_ORDERED: usize = 3;
pub const REQ_COLUMNS_UNORDERED: usize = 3;

/// A GFA2 `O` line: an ordered, directed sequence of segment/edge
/// references describing one walk through the graph.
#[derive(Debug, Clone)]
pub struct OrderedGroup {
    pub line_no: usize,
    pub raw: String,
    pub tags: TagMap,

    pub name: String,
    pub members: Vec<(String, Orientation)>,
}

impl OrderedGroup {
    pub fn parse_line(parts: &[&str], raw: &str, n: usize, map: &TagMap) -> Result<Self, GfaError> {
        let name = group_name(parts[1], 'O', n);
        let members = parts[2]
            .split(' ')
            .filter(|m| !m.is_empty())
            .map(|m| parse_directed_reference(m, n))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            line_no: n,
            raw: raw.to_string(),
            tags: map.clone(),
            name,
            members,
        })
    }

    pub fn to_raw_line(&self, _version: GFAVersion) -> String {
        let members = self
            .members
            .iter()
            .map(|(name, o)| format!("{name}{o}"))
            .collect::<Vec<_>>()
            .join(" ");
        build_gfa_line('O', &[self.name.as_str(), &members], &self.tags)
    }
}

/// A GFA2 `U` line: an unordered set of segment/group references with
/// no implied direction or connectivity between them.
#[derive(Debug, Clone)]
pub struct UnorderedGroup {
    pub line_no: usize,
    pub raw: String,
    pub tags: TagMap,

    pub name: String,
    pub members: Vec<String>,
}

impl UnorderedGroup {
    pub fn parse_line(parts: &[&str], raw: &str, n: usize, map: &TagMap) -> Result<Self, GfaError> {
        let name = group_name(parts[1], 'U', n);
        let members = parts[2]
            .split(' ')
            .filter(|m| !m.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            line_no: n,
            raw: raw.to_string(),
            tags: map.clone(),
            name,
            members,
        })
    }

    pub fn to_raw_line(&self, _version: GFAVersion) -> String {
        let members = self.members.join(" ");
        build_gfa_line('U', &[self.name.as_str(), &members], &self.tags)
    }
}

fn group_name(raw_name: &str, type_char: char, n: usize) -> String {
    if raw_name == "*" {
        format!("anon_{type_char}_{n}")
    } else {
        raw_name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_group_parses_directed_members() {
        let map = TagMap::new();
        let g = OrderedGroup::parse_line(&["O", "o1", "a+ b-"], "", 1, &map).unwrap();
        assert_eq!(g.members.len(), 2);
        assert_eq!(g.members[1].1, Orientation::Reverse);
    }

    #[test]
    fn anon_group_gets_synthesized_name() {
        let map = TagMap::new();
        let g = UnorderedGroup::parse_line(&["U", "*", "a b c"], "", 7, &map).unwrap();
        assert_eq!(g.name, "anon_U_7");
        assert_eq!(g.members.len(), 3);
    }
}
