use crate::error::GfaError;
use crate::gfa::GFAVersion;
use crate::line::containment::{Containment, REQ_COLUMNS_CONTAIN};
use crate::line::edge::{Edge, REQ_COLUMNS_EDGE};
use crate::line::fragment::{Fragment, REQ_COLUMNS_FRAGMENT};
use crate::line::gap::{Gap, REQ_COLUMNS_GAP};
use crate::line::group::{OrderedGroup, UnorderedGroup, REQ_COLUMNS_ORDERED, REQ_COLUMNS_UNORDERED};
use crate::line::header::{Header, REQ_COLUMNS_HEADER};
use crate::line::link::{Link, REQ_COLUMNS_LINK};
use crate::line::path::{Path, REQ_COLUMNS_PATH};
use crate::line::segment::Segment;
use crate::optional_field::{parse_optional_field, TagMap};
use crate::record_accessors;

/// Every record type the format defines, carrying the record's parsed
/// value. `Segment` additionally distinguishes virtual placeholders from
/// segments seen on a real `S` line; see [`crate::line::segment::SegmentState`].
#[derive(Debug, Clone)]
pub enum GfaRecord {
    Header(Header),
    Segment(Segment),
    Link(Link),
    Containment(Containment),
    Path(Path),
    Fragment(Fragment),
    Edge(Edge),
    Gap(Gap),
    OrderedGroup(OrderedGroup),
    UnorderedGroup(UnorderedGroup),
}

record_accessors! {
    impl GfaRecord {
        Header(Header) => (as_header, as_mut_header);
        Segment(Segment) => (as_segment, as_mut_segment);
        Link(Link) => (as_link, as_mut_link);
        Containment(Containment) => (as_containment, as_mut_containment);
        Path(Path) => (as_path, as_mut_path);
        Fragment(Fragment) => (as_fragment, as_mut_fragment);
        Edge(Edge) => (as_edge, as_mut_edge);
        Gap(Gap) => (as_gap, as_mut_gap);
        OrderedGroup(OrderedGroup) => (as_ordered_group, as_mut_ordered_group);
        UnorderedGroup(UnorderedGroup) => (as_unordered_group, as_mut_unordered_group);
    }
}

impl GfaRecord {
    /// Splits a raw line into columns, parses its optional fields, and
    /// dispatches to the record type's own `parse_line`. Returns `Err`
    /// for anything that can't be turned into a record at all, which the
    /// caller demotes to a skip-this-line diagnostic rather than
    /// aborting the whole parse.
    pub fn parse_line(line: &str, n: usize, version: GFAVersion, skip_invalid_sequence_test: bool) -> Result<Self, GfaError> {
        let parts: Vec<&str> = line.split('\t').collect();
        let record_type = *parts.first().ok_or_else(|| GfaError::format(n, line, "empty line"))?;
        let type_char = record_type
            .chars()
            .next()
            .ok_or_else(|| GfaError::format(n, line, "empty record type"))?;

        let required_columns = match type_char {
            'H' => REQ_COLUMNS_HEADER,
            'S' => {
                if version == GFAVersion::V2 {
                    4
                } else {
                    3
                }
            }
            'L' => REQ_COLUMNS_LINK,
            'C' => REQ_COLUMNS_CONTAIN,
            'P' => REQ_COLUMNS_PATH,
            'F' => REQ_COLUMNS_FRAGMENT,
            'E' => REQ_COLUMNS_EDGE,
            'G' => REQ_COLUMNS_GAP,
            'O' => REQ_COLUMNS_ORDERED,
            'U' => REQ_COLUMNS_UNORDERED,
            other => return Err(GfaError::format(n, line, format!("unrecognized record type '{other}'"))),
        };

        if parts.len() < required_columns {
            return Err(GfaError::format(n, line, "not enough columns for this record type"));
        }

        let mut tags = TagMap::new();
        for raw_tag in &parts[required_columns..] {
            let field = parse_optional_field(raw_tag, type_char, n)?;
            tags.insert(field.tag, field.value);
        }

        match type_char {
            'H' => Header::parse_line(line, n, &mut tags).map(GfaRecord::Header),
            'S' => Segment::parse_line(&parts, line, n, &mut tags, version, skip_invalid_sequence_test, true).map(GfaRecord::Segment),
            'L' => Link::parse_line(&parts, line, n, &tags).map(GfaRecord::Link),
            'C' => Containment::parse_line(&parts, line, n, &tags).map(GfaRecord::Containment),
            'P' => Path::parse_line(&parts, line, n, &tags).map(GfaRecord::Path),
            'F' => Fragment::parse_line(&parts, line, n, &tags).map(GfaRecord::Fragment),
            'E' => Edge::parse_line(&parts, line, n, &tags).map(GfaRecord::Edge),
            'G' => Gap::parse_line(&parts, line, n, &tags).map(GfaRecord::Gap),
            'O' => OrderedGroup::parse_line(&parts, line, n, &tags).map(GfaRecord::OrderedGroup),
            'U' => UnorderedGroup::parse_line(&parts, line, n, &tags).map(GfaRecord::UnorderedGroup),
            other => Err(GfaError::format(n, line, format!("unrecognized record type '{other}'"))),
        }
    }

    pub fn line_no(&self) -> usize {
        match self {
            GfaRecord::Header(r) => r.line_no,
            GfaRecord::Segment(r) => r.line_no,
            GfaRecord::Link(r) => r.line_no,
            GfaRecord::Containment(r) => r.line_no,
            GfaRecord::Path(r) => r.line_no,
            GfaRecord::Fragment(r) => r.line_no,
            GfaRecord::Edge(r) => r.line_no,
            GfaRecord::Gap(r) => r.line_no,
            GfaRecord::OrderedGroup(r) => r.line_no,
            GfaRecord::UnorderedGroup(r) => r.line_no,
        }
    }

    pub fn to_raw_line(&self, version: GFAVersion) -> String {
        match self {
            GfaRecord::Header(r) => r.to_raw_line(version),
            GfaRecord::Segment(r) => r.to_raw_line(version),
            GfaRecord::Link(r) => r.to_raw_line(version),
            GfaRecord::Containment(r) => r.to_raw_line(version),
            GfaRecord::Path(r) => r.to_raw_line(version),
            GfaRecord::Fragment(r) => r.to_raw_line(version),
            GfaRecord::Edge(r) => r.to_raw_line(version),
            GfaRecord::Gap(r) => r.to_raw_line(version),
            GfaRecord::OrderedGroup(r) => r.to_raw_line(version),
            GfaRecord::UnorderedGroup(r) => r.to_raw_line(version),
        }
    }
}
