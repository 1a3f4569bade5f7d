//! Optional field (tag) parsing and the order-preserving `TagMap` that
//! every record type stores its tags in.

use crate::datatype::{check_reserved_field_context, get_reserved_field, FieldType};
use crate::error::GfaError;

#[derive(Debug, Clone, PartialEq)]
pub enum OptionalFieldNumber {
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Float32(f32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptionalFieldValue {
    Char(char),
    Int(i32),
    Float(f32),
    String(String),
    Json(String),
    ByteArray(Vec<u8>),
    NumberArray(Vec<OptionalFieldNumber>),
}

impl OptionalFieldValue {
    pub fn type_(&self) -> FieldType {
        match self {
            OptionalFieldValue::Char(_) => FieldType::Char,
            OptionalFieldValue::Int(_) => FieldType::Int,
            OptionalFieldValue::Float(_) => FieldType::Float,
            OptionalFieldValue::String(_) => FieldType::String,
            OptionalFieldValue::Json(_) => FieldType::Json,
            OptionalFieldValue::ByteArray(_) => FieldType::ByteArray,
            OptionalFieldValue::NumberArray(_) => FieldType::NumberArray,
        }
    }

    fn encode(&self) -> String {
        match self {
            OptionalFieldValue::Char(c) => c.to_string(),
            OptionalFieldValue::Int(i) => i.to_string(),
            OptionalFieldValue::Float(f) => f.to_string(),
            OptionalFieldValue::String(s) => s.clone(),
            OptionalFieldValue::Json(j) => j.clone(),
            OptionalFieldValue::ByteArray(b) => b.iter().map(|x| format!("{x:02X}")).collect(),
            OptionalFieldValue::NumberArray(nums) => {
                if nums.is_empty() {
                    return String::new();
                }
                let subtype = number_array_subtype_char(&nums[0]);
                let values: Vec<String> = nums.iter().map(number_to_string).collect();
                format!("{subtype}{}", values.join(","))
            }
        }
    }
}

fn number_array_subtype_char(n: &OptionalFieldNumber) -> char {
    match n {
        OptionalFieldNumber::Int8(_) => 'c',
        OptionalFieldNumber::UInt8(_) => 'C',
        OptionalFieldNumber::Int16(_) => 's',
        OptionalFieldNumber::UInt16(_) => 'S',
        OptionalFieldNumber::Int32(_) => 'i',
        OptionalFieldNumber::UInt32(_) => 'I',
        OptionalFieldNumber::Float32(_) => 'f',
    }
}

fn number_to_string(n: &OptionalFieldNumber) -> String {
    match n {
        OptionalFieldNumber::Int8(v) => v.to_string(),
        OptionalFieldNumber::UInt8(v) => v.to_string(),
        OptionalFieldNumber::Int16(v) => v.to_string(),
        OptionalFieldNumber::UInt16(v) => v.to_string(),
        OptionalFieldNumber::Int32(v) => v.to_string(),
        OptionalFieldNumber::UInt32(v) => v.to_string(),
        OptionalFieldNumber::Float32(v) => v.to_string(),
    }
}

impl TryFrom<&OptionalFieldValue> for char {
    type Error = GfaError;
    fn try_from(v: &OptionalFieldValue) -> Result<Self, Self::Error> {
        match v {
            OptionalFieldValue::Char(c) => Ok(*c),
            other => Err(type_mismatch("A", other)),
        }
    }
}

impl TryFrom<&OptionalFieldValue> for i32 {
    type Error = GfaError;
    fn try_from(v: &OptionalFieldValue) -> Result<Self, Self::Error> {
        match v {
            OptionalFieldValue::Int(i) => Ok(*i),
            other => Err(type_mismatch("i", other)),
        }
    }
}

impl TryFrom<&OptionalFieldValue> for f32 {
    type Error = GfaError;
    fn try_from(v: &OptionalFieldValue) -> Result<Self, Self::Error> {
        match v {
            OptionalFieldValue::Float(f) => Ok(*f),
            other => Err(type_mismatch("f", other)),
        }
    }
}

impl TryFrom<&OptionalFieldValue> for String {
    type Error = GfaError;
    fn try_from(v: &OptionalFieldValue) -> Result<Self, Self::Error> {
        match v {
            OptionalFieldValue::String(s) | OptionalFieldValue::Json(s) => Ok(s.clone()),
            other => Err(type_mismatch("Z/J", other)),
        }
    }
}

impl TryFrom<&OptionalFieldValue> for Vec<u8> {
    type Error = GfaError;
    fn try_from(v: &OptionalFieldValue) -> Result<Self, Self::Error> {
        match v {
            OptionalFieldValue::ByteArray(b) => Ok(b.clone()),
            other => Err(type_mismatch("H", other)),
        }
    }
}

impl TryFrom<&OptionalFieldValue> for Vec<OptionalFieldNumber> {
    type Error = GfaError;
    fn try_from(v: &OptionalFieldValue) -> Result<Self, Self::Error> {
        match v {
            OptionalFieldValue::NumberArray(n) => Ok(n.clone()),
            other => Err(type_mismatch("B", other)),
        }
    }
}

fn type_mismatch(expected: &str, actual: &OptionalFieldValue) -> GfaError {
    GfaError::TypeError {
        record_type: '?',
        tag: String::new(),
        expected: expected.to_string(),
        actual: actual.type_().get_char().to_string(),
    }
}

/// A single parsed `tag:TYPE:value` field.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionalField {
    pub tag: String,
    pub value: OptionalFieldValue,
}

/// Splits a raw `tag:TYPE:value` column into its field, validating the
/// tag shape and falling back to `String` when the type character isn't
/// one of the seven recognized ones.
pub fn parse_optional_field(
    raw: &str,
    record_type: char,
    line: usize,
) -> Result<OptionalField, GfaError> {
    let mut parts = raw.splitn(3, ':');
    let tag = parts
        .next()
        .ok_or_else(|| GfaError::format(line, raw, "missing tag"))?;
    let type_char = parts
        .next()
        .ok_or_else(|| GfaError::format(line, raw, "missing type character"))?;
    let value_str = parts
        .next()
        .ok_or_else(|| GfaError::format(line, raw, "missing value"))?;

    validate_tag_shape(tag, line, raw)?;

    let field_type = match type_char.chars().next() {
        Some(c) if type_char.len() == 1 => FieldType::try_from(c).unwrap_or(FieldType::String),
        _ => FieldType::String,
    };

    if tag.starts_with(|c: char| c.is_ascii_uppercase()) {
        check_reserved_field_context(tag, record_type)?;
        if let Some(reserved) = get_reserved_field(tag) {
            if reserved.type_.get_char() != field_type.get_char() {
                return Err(GfaError::TypeError {
                    record_type,
                    tag: tag.to_string(),
                    expected: reserved.type_.get_char().to_string(),
                    actual: field_type.get_char().to_string(),
                });
            }
        }
    }

    let value = decode_value(field_type, value_str, line, raw)?;
    Ok(OptionalField {
        tag: tag.to_string(),
        value,
    })
}

fn validate_tag_shape(tag: &str, line: usize, raw: &str) -> Result<(), GfaError> {
    let chars: Vec<char> = tag.chars().collect();
    if chars.len() != 2 || !chars.iter().all(|c| c.is_ascii_alphanumeric()) {
        return Err(GfaError::format(
            line,
            raw,
            "tag must be exactly two alphanumeric characters",
        ));
    }
    let same_case = chars[0].is_ascii_uppercase() == chars[1].is_ascii_uppercase();
    if !same_case {
        return Err(GfaError::format(
            line,
            raw,
            "tag characters must share case",
        ));
    }
    Ok(())
}

fn decode_value(
    field_type: FieldType,
    raw: &str,
    line: usize,
    full_line: &str,
) -> Result<OptionalFieldValue, GfaError> {
    match field_type {
        FieldType::Char => raw
            .chars()
            .next()
            .filter(|_| raw.chars().count() == 1)
            .map(OptionalFieldValue::Char)
            .ok_or_else(|| GfaError::format(line, full_line, "A value must be one character")),
        FieldType::Int => raw
            .parse::<i32>()
            .map(OptionalFieldValue::Int)
            .map_err(|_| GfaError::format(line, full_line, "i value must be a signed integer")),
        FieldType::Float => raw
            .parse::<f32>()
            .map(OptionalFieldValue::Float)
            .map_err(|_| GfaError::format(line, full_line, "f value must be a float")),
        FieldType::String => Ok(OptionalFieldValue::String(raw.to_string())),
        FieldType::Json => Ok(OptionalFieldValue::Json(raw.to_string())),
        FieldType::ByteArray => decode_byte_array(raw)
            .ok_or_else(|| GfaError::format(line, full_line, "H value must be hex-encoded bytes")),
        FieldType::NumberArray => decode_number_array(raw)
            .ok_or_else(|| GfaError::format(line, full_line, "B value must be SUBTYPE,n1,n2,...")),
    }
}

fn decode_byte_array(raw: &str) -> Option<OptionalFieldValue> {
    if raw.len() % 2 != 0 {
        return None;
    }
    let mut bytes = Vec::with_capacity(raw.len() / 2);
    let chars: Vec<char> = raw.chars().collect();
    for pair in chars.chunks(2) {
        let s: String = pair.iter().collect();
        bytes.push(u8::from_str_radix(&s, 16).ok()?);
    }
    Some(OptionalFieldValue::ByteArray(bytes))
}

fn decode_number_array(raw: &str) -> Option<OptionalFieldValue> {
    let mut parts = raw.split(',');
    let subtype = parts.next()?.chars().next()?;
    let mut nums = Vec::new();
    for p in parts {
        nums.push(match subtype {
            'c' => OptionalFieldNumber::Int8(p.parse().ok()?),
            'C' => OptionalFieldNumber::UInt8(p.parse().ok()?),
            's' => OptionalFieldNumber::Int16(p.parse().ok()?),
            'S' => OptionalFieldNumber::UInt16(p.parse().ok()?),
            'i' => OptionalFieldNumber::Int32(p.parse().ok()?),
            'I' => OptionalFieldNumber::UInt32(p.parse().ok()?),
            'f' => OptionalFieldNumber::Float32(p.parse().ok()?),
            _ => return None,
        });
    }
    Some(OptionalFieldValue::NumberArray(nums))
}

/// An insertion-ordered map of tags to values.
///
/// GFA round-tripping requires tags to reappear in their original order,
/// so this keeps a plain `Vec` rather than a `HashMap`: tag counts per
/// record are small (rarely more than a handful) and linear lookup on
/// that scale is cheaper than paying for hashing plus a side
/// order-tracking vector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagMap(Vec<(String, OptionalFieldValue)>);

impl TagMap {
    pub fn new() -> Self {
        TagMap(Vec::new())
    }

    pub fn from_fields(fields: Vec<OptionalField>) -> Self {
        let mut map = TagMap::new();
        for f in fields {
            map.insert(f.tag, f.value);
        }
        map
    }

    /// Inserts a tag, overwriting any existing value but keeping the
    /// position of the first occurrence.
    pub fn insert(&mut self, tag: String, value: OptionalFieldValue) {
        if let Some(slot) = self.0.iter_mut().find(|(t, _)| *t == tag) {
            slot.1 = value;
        } else {
            self.0.push((tag, value));
        }
    }

    pub fn get_raw(&self, tag: &str) -> Option<&OptionalFieldValue> {
        self.0.iter().find(|(t, _)| t == tag).map(|(_, v)| v)
    }

    pub fn get<'a, T>(&'a self, tag: &str) -> Option<T>
    where
        T: TryFrom<&'a OptionalFieldValue>,
    {
        self.get_raw(tag).and_then(|v| T::try_from(v).ok())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|(t, _)| t == tag)
    }

    pub fn remove(&mut self, tag: &str) -> Option<OptionalFieldValue> {
        let idx = self.0.iter().position(|(t, _)| t == tag)?;
        Some(self.0.remove(idx).1)
    }

    /// Sets or extends a space-delimited flag tag (the `PF` convention
    /// used to mark promoted/virtual records).
    pub fn add_flag(&mut self, tag: &str, flag: &str) {
        let existing = self.get::<String>(tag).unwrap_or_default();
        let mut flags: Vec<&str> = existing.split(' ').filter(|s| !s.is_empty()).collect();
        if !flags.contains(&flag) {
            flags.push(flag);
        }
        self.insert(tag.to_string(), OptionalFieldValue::String(flags.join(" ")));
    }

    pub fn has_flag(&self, tag: &str, flag: &str) -> bool {
        self.get::<String>(tag)
            .map(|v| v.split(' ').any(|f| f == flag))
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionalFieldValue)> {
        self.0.iter().map(|(t, v)| (t.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Renders the tags back into `tag:TYPE:value` columns, in the order
    /// they were first inserted.
    pub fn to_columns(&self) -> Vec<String> {
        self.0
            .iter()
            .map(|(tag, value)| format!("{tag}:{}:{}", value.type_().get_char(), value.encode()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_seven_type_chars() {
        for raw in ["ab:A:x", "ab:i:42", "ab:f:1.5", "ab:Z:hi", "ab:J:{}", "ab:H:FF", "ab:B:i,1,2,3"] {
            assert!(parse_optional_field(raw, 'S', 1).is_ok(), "{raw}");
        }
    }

    #[test]
    fn unknown_type_char_falls_back_to_string() {
        let field = parse_optional_field("ab:Q:hello", 'S', 1).unwrap();
        assert_eq!(field.value, OptionalFieldValue::String("hello".to_string()));
    }

    #[test]
    fn tag_must_be_two_alnum_same_case() {
        assert!(parse_optional_field("a:Z:x", 'S', 1).is_err());
        assert!(parse_optional_field("Ab:Z:x", 'S', 1).is_err());
        assert!(parse_optional_field("A1:Z:x", 'S', 1).is_err());
        assert!(parse_optional_field("a1:Z:x", 'S', 1).is_ok());
    }

    #[test]
    fn reserved_tag_rejects_wrong_record_type() {
        assert!(parse_optional_field("LN:i:4", 'L', 1).is_err());
        assert!(parse_optional_field("LN:i:4", 'S', 1).is_ok());
    }

    #[test]
    fn tag_map_preserves_insertion_order_on_roundtrip() {
        let mut map = TagMap::new();
        map.insert("ZZ".into(), OptionalFieldValue::Int(1));
        map.insert("AA".into(), OptionalFieldValue::Int(2));
        map.insert("ZZ".into(), OptionalFieldValue::Int(3));
        assert_eq!(map.to_columns(), vec!["ZZ:i:3".to_string(), "AA:i:2".to_string()]);
    }

    #[test]
    fn flags_are_space_delimited_and_deduped() {
        let mut map = TagMap::new();
        map.add_flag("PF", "virtual");
        map.add_flag("PF", "virtual");
        map.add_flag("PF", "ghost");
        assert!(map.has_flag("PF", "virtual"));
        assert!(map.has_flag("PF", "ghost"));
        assert_eq!(map.get::<String>("PF").unwrap(), "virtual ghost");
    }
}
