//! The GFA format version, as declared by a header's `VN` tag.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GFAVersion {
    V1,
    V1_1,
    V1_2,
    V2,
    #[default]
    Unknown,
}

impl From<&str> for GFAVersion {
    fn from(value: &str) -> Self {
        match value {
            "1" | "1.0" => GFAVersion::V1,
            "1.1" => GFAVersion::V1_1,
            "1.2" => GFAVersion::V1_2,
            "2" | "2.0" => GFAVersion::V2,
            _ => GFAVersion::Unknown,
        }
    }
}

impl std::fmt::Display for GFAVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GFAVersion::V1 => "1.0",
            GFAVersion::V1_1 => "1.1",
            GFAVersion::V1_2 => "1.2",
            GFAVersion::V2 => "2.0",
            GFAVersion::Unknown => "1.0",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_version_strings() {
        assert_eq!(GFAVersion::from("1.0"), GFAVersion::V1);
        assert_eq!(GFAVersion::from("2"), GFAVersion::V2);
        assert_eq!(GFAVersion::from("nonsense"), GFAVersion::Unknown);
    }
}
