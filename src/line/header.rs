use crate::error::GfaError;
use crate::gfa::GFAVersion;
use crate::line::utils::build_gfa_line;
use crate::optional_field::{OptionalFieldValue, TagMap};

pub const REQ_COLUMNS_HEADER: usize = 1;

#[derive(Debug, Clone)]
pub struct Header {
    pub line_no: usize,
    pub raw: String,
    pub tags: TagMap,

    pub version: String,
}

const VALID_VERSIONS: [&str; 6] = ["1", "1.0", "1.1", "1.2", "2", "2.0"];

impl Header {
    pub fn parse_line(raw: &str, n: usize, map: &mut TagMap) -> Result<Self, GfaError> {
        if let Some(vn) = map.get::<String>("VN") {
            if !VALID_VERSIONS.contains(&vn.as_str()) {
                return Err(GfaError::format(n, raw, "unknown VN version tag"));
            }
        } else {
            map.insert("VN".to_string(), OptionalFieldValue::String("1.0".to_string()));
        }

        Ok(Self {
            line_no: n,
            raw: raw.to_string(),
            tags: map.clone(),
            version: map.get::<String>("VN").expect("VN always set above"),
        })
    }

    pub fn to_raw_line(&self, version: GFAVersion) -> String {
        let mut tags = self.tags.clone();
        tags.insert("VN".to_string(), OptionalFieldValue::String(version.to_string()));
        build_gfa_line('H', &[], &tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_version_when_missing() {
        let mut map = TagMap::new();
        let h = Header::parse_line("H", 1, &mut map).unwrap();
        assert_eq!(h.version, "1.0");
    }

    #[test]
    fn rejects_unknown_version() {
        let mut map = TagMap::new();
        map.insert("VN".to_string(), OptionalFieldValue::String("9.9".to_string()));
        assert!(Header::parse_line("H\tVN:Z:9.9", 1, &mut map).is_err());
    }
}
