//! The closed set of optional-field datatypes (`A i f Z J H B`) and the
//! predefined tags that the format reserves meaning for.

use crate::error::GfaError;

/// One of the seven `tag:TYPE:value` type characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Char,
    Int,
    Float,
    String,
    Json,
    ByteArray,
    NumberArray,
}

impl FieldType {
    pub fn get_char(&self) -> char {
        match self {
            FieldType::Char => 'A',
            FieldType::Int => 'i',
            FieldType::Float => 'f',
            FieldType::String => 'Z',
            FieldType::Json => 'J',
            FieldType::ByteArray => 'H',
            FieldType::NumberArray => 'B',
        }
    }
}

impl TryFrom<char> for FieldType {
    type Error = GfaError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            'A' => Ok(FieldType::Char),
            'i' => Ok(FieldType::Int),
            'f' => Ok(FieldType::Float),
            'Z' => Ok(FieldType::String),
            'J' => Ok(FieldType::Json),
            'H' => Ok(FieldType::ByteArray),
            'B' => Ok(FieldType::NumberArray),
            other => Err(GfaError::TypeError {
                record_type: '?',
                tag: String::new(),
                expected: "one of A i f Z J H B".to_string(),
                actual: other.to_string(),
            }),
        }
    }
}

/// A tag the format gives reserved meaning to, restricted to certain
/// record types.
pub struct ReservedField {
    pub type_: FieldType,
    pub allowed_records: &'static [char],
}

/// Looks up a predefined tag's expected type and the record types it is
/// valid on. Returns `None` for tags with no reserved meaning.
pub fn get_reserved_field(tag: &str) -> Option<ReservedField> {
    match tag {
        "VN" => Some(ReservedField {
            type_: FieldType::String,
            allowed_records: &['H'],
        }),
        "TS" => Some(ReservedField {
            type_: FieldType::Int,
            allowed_records: &['H'],
        }),
        "LN" => Some(ReservedField {
            type_: FieldType::Int,
            allowed_records: &['S'],
        }),
        "RC" => Some(ReservedField {
            type_: FieldType::Int,
            allowed_records: &['S', 'L', 'C'],
        }),
        "FC" => Some(ReservedField {
            type_: FieldType::Int,
            allowed_records: &['S', 'L', 'C'],
        }),
        "KC" => Some(ReservedField {
            type_: FieldType::Int,
            allowed_records: &['S'],
        }),
        "SH" => Some(ReservedField {
            type_: FieldType::ByteArray,
            allowed_records: &['S'],
        }),
        "UR" => Some(ReservedField {
            type_: FieldType::String,
            allowed_records: &['S'],
        }),
        "MQ" => Some(ReservedField {
            type_: FieldType::Int,
            allowed_records: &['L'],
        }),
        "NM" => Some(ReservedField {
            type_: FieldType::Int,
            allowed_records: &['L', 'C'],
        }),
        "ID" => Some(ReservedField {
            type_: FieldType::String,
            allowed_records: &['E'],
        }),
        "SC" => Some(ReservedField {
            type_: FieldType::Int,
            allowed_records: &['L', 'C'],
        }),
        "DP" => Some(ReservedField {
            type_: FieldType::Float,
            allowed_records: &['S'],
        }),
        _ => None,
    }
}

/// Checks whether a tag is being used on a record type it is restricted
/// to, returning `Err` when a reserved tag appears where it shouldn't.
///
/// Only tags that start with an uppercase letter carry reserved meaning;
/// lowercase-first tags are always free for application use.
pub fn check_reserved_field_context(tag: &str, record_type: char) -> Result<(), GfaError> {
    if !tag.starts_with(|c: char| c.is_ascii_uppercase()) {
        return Ok(());
    }
    if let Some(reserved) = get_reserved_field(tag) {
        if !reserved.allowed_records.contains(&record_type) {
            return Err(GfaError::TypeError {
                record_type,
                tag: tag.to_string(),
                expected: format!("one of {:?}", reserved.allowed_records),
                actual: record_type.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_roundtrips_through_char() {
        for c in ['A', 'i', 'f', 'Z', 'J', 'H', 'B'] {
            let ft = FieldType::try_from(c).unwrap();
            assert_eq!(ft.get_char(), c);
        }
    }

    #[test]
    fn unknown_type_char_errors() {
        assert!(FieldType::try_from('Q').is_err());
    }

    #[test]
    fn reserved_field_context_is_checked() {
        assert!(check_reserved_field_context("LN", 'S').is_ok());
        assert!(check_reserved_field_context("LN", 'L').is_err());
        assert!(check_reserved_field_context("ln", 'L').is_ok());
    }
}
