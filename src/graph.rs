//! The in-memory graph: an arena of records plus the indexes needed to
//! resolve names, walk incident links, and follow path/group membership
//! without a linear scan.
//!
//! Deleting a record leaves a tombstone (`None`) in the arena rather
//! than shifting indices, so that every `usize` handed out by `add_*`
//! stays valid for the life of the graph.

use std::collections::HashMap;

use crate::error::GfaError;
use crate::gfa::GFAVersion;
use crate::line::containment::Containment;
use crate::line::edge::Edge;
use crate::line::fragment::Fragment;
use crate::line::gap::Gap;
use crate::line::group::{OrderedGroup, UnorderedGroup};
use crate::line::header::Header;
use crate::line::link::Link;
use crate::line::path::Path;
use crate::line::record::GfaRecord;
use crate::line::segment::Segment;
use crate::orientation::{End, Orientation};

#[derive(Debug, Default, Clone)]
pub struct Graph {
    records: Vec<Option<GfaRecord>>,
    segment_index: HashMap<String, usize>,
    path_index: HashMap<String, usize>,
    group_index: HashMap<String, usize>,
    header_idx: Option<usize>,

    /// Every link/edge/gap/containment incident to a segment end, keyed
    /// by (segment name, which end).
    end_index: HashMap<(String, End), Vec<usize>>,
    /// Segment name -> indices of containments where it is the container.
    contains_index: HashMap<String, Vec<usize>>,
    /// Segment name -> indices of containments where it is contained.
    contained_by_index: HashMap<String, Vec<usize>>,
    /// Segment name -> indices of paths that step through it.
    path_membership: HashMap<String, Vec<usize>>,
    /// Segment name -> indices of fragments attached to it.
    fragment_index: HashMap<String, Vec<usize>>,

    pub version: GFAVersion,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, record: GfaRecord) -> usize {
        let idx = self.records.len();
        self.records.push(Some(record));
        idx
    }

    pub fn record(&self, idx: usize) -> Option<&GfaRecord> {
        self.records.get(idx).and_then(|r| r.as_ref())
    }

    pub fn record_mut(&mut self, idx: usize) -> Option<&mut GfaRecord> {
        self.records.get_mut(idx).and_then(|r| r.as_mut())
    }

    pub fn segment_idx(&self, name: &str) -> Option<usize> {
        self.segment_index.get(name).copied()
    }

    pub fn segment(&self, name: &str) -> Option<&Segment> {
        self.segment_idx(name).and_then(|i| self.record(i)).and_then(GfaRecord::as_segment)
    }

    pub fn segment_mut(&mut self, name: &str) -> Option<&mut Segment> {
        let idx = self.segment_idx(name)?;
        self.record_mut(idx).and_then(GfaRecord::as_mut_segment)
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.records.iter().filter_map(|r| r.as_ref()).filter_map(GfaRecord::as_segment)
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.records.iter().filter_map(|r| r.as_ref()).filter_map(GfaRecord::as_link)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.records.iter().filter_map(|r| r.as_ref()).filter_map(GfaRecord::as_path)
    }

    pub fn path(&self, name: &str) -> Option<&Path> {
        self.path_index.get(name).and_then(|i| self.record(*i)).and_then(GfaRecord::as_path)
    }

    pub fn containments(&self) -> impl Iterator<Item = &Containment> {
        self.records.iter().filter_map(|r| r.as_ref()).filter_map(GfaRecord::as_containment)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.records.iter().filter_map(|r| r.as_ref()).filter_map(GfaRecord::as_edge)
    }

    pub fn fragments(&self) -> impl Iterator<Item = &Fragment> {
        self.records.iter().filter_map(|r| r.as_ref()).filter_map(GfaRecord::as_fragment)
    }

    pub fn gaps(&self) -> impl Iterator<Item = &Gap> {
        self.records.iter().filter_map(|r| r.as_ref()).filter_map(GfaRecord::as_gap)
    }

    pub fn ordered_groups(&self) -> impl Iterator<Item = &OrderedGroup> {
        self.records.iter().filter_map(|r| r.as_ref()).filter_map(GfaRecord::as_ordered_group)
    }

    pub fn unordered_groups(&self) -> impl Iterator<Item = &UnorderedGroup> {
        self.records.iter().filter_map(|r| r.as_ref()).filter_map(GfaRecord::as_unordered_group)
    }

    pub fn header(&self) -> Option<&Header> {
        self.header_idx.and_then(|i| self.record(i)).and_then(GfaRecord::as_header)
    }

    /// Links, edges, gaps and containments incident to the given
    /// segment end, in the order they were added.
    pub fn incident(&self, segment: &str, end: End) -> &[usize] {
        self.end_index
            .get(&(segment.to_string(), end))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, segment: &str) -> &[usize] {
        self.contains_index.get(segment).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn contained_by(&self, segment: &str) -> &[usize] {
        self.contained_by_index.get(segment).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn paths_through(&self, segment: &str) -> &[usize] {
        self.path_membership.get(segment).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Ensures a segment with this name exists, creating a virtual
    /// placeholder if it doesn't. Returns its arena index.
    pub fn ensure_segment(&mut self, name: &str) -> usize {
        if let Some(idx) = self.segment_index.get(name) {
            return *idx;
        }
        let idx = self.push(GfaRecord::Segment(Segment::virtual_with_name(name)));
        self.segment_index.insert(name.to_string(), idx);
        idx
    }

    /// Adds a real segment, promoting a virtual placeholder with the
    /// same name in place if one already exists.
    pub fn add_segment(&mut self, segment: Segment) -> Result<usize, GfaError> {
        let name = segment.name.clone();
        if let Some(&idx) = self.segment_index.get(&name) {
            let existing = self.record_mut(idx).and_then(GfaRecord::as_mut_segment).expect("segment index is consistent");
            if existing.is_virtual() {
                existing.promote(segment);
                return Ok(idx);
            }
            return Err(GfaError::not_unique(format!("segment {name}")));
        }
        let idx = self.push(GfaRecord::Segment(segment));
        self.segment_index.insert(name, idx);
        Ok(idx)
    }

    pub fn add_header(&mut self, header: Header) -> Result<usize, GfaError> {
        if self.header_idx.is_some() {
            return Err(GfaError::not_unique("header"));
        }
        self.version = GFAVersion::from(header.version.as_str());
        let idx = self.push(GfaRecord::Header(header));
        self.header_idx = Some(idx);
        Ok(idx)
    }

    pub fn add_link(&mut self, link: Link) -> usize {
        self.ensure_segment(&link.from_segment);
        self.ensure_segment(&link.to_segment);
        let from = link.from_segment.clone();
        let from_end = End::leaving(link.from_orientation);
        let to = link.to_segment.clone();
        let to_end = End::arriving(link.to_orientation);
        let idx = self.push(GfaRecord::Link(link));
        self.end_index.entry((from, from_end)).or_default().push(idx);
        self.end_index.entry((to, to_end)).or_default().push(idx);
        idx
    }

    pub fn add_containment(&mut self, containment: Containment) -> usize {
        self.ensure_segment(&containment.container);
        self.ensure_segment(&containment.contained);
        let container = containment.container.clone();
        let contained = containment.contained.clone();
        let idx = self.push(GfaRecord::Containment(containment));
        self.contains_index.entry(container).or_default().push(idx);
        self.contained_by_index.entry(contained).or_default().push(idx);
        idx
    }

    pub fn add_path(&mut self, path: Path) -> Result<usize, GfaError> {
        if self.path_index.contains_key(&path.name) {
            return Err(GfaError::not_unique(format!("path {}", path.name)));
        }
        for step in &path.steps {
            self.ensure_segment(&step.segment);
        }
        let members: Vec<String> = path.steps.iter().map(|s| s.segment.clone()).collect();
        let name = path.name.clone();
        let idx = self.push(GfaRecord::Path(path));
        self.path_index.insert(name, idx);
        for segment in members {
            self.path_membership.entry(segment).or_default().push(idx);
        }
        Ok(idx)
    }

    pub fn add_edge(&mut self, edge: Edge) -> usize {
        self.ensure_segment(&edge.from);
        self.ensure_segment(&edge.to);
        let from = edge.from.clone();
        let from_end = End::leaving(edge.from_orientation);
        let to = edge.to.clone();
        let to_end = End::arriving(edge.to_orientation);
        let idx = self.push(GfaRecord::Edge(edge));
        self.end_index.entry((from, from_end)).or_default().push(idx);
        self.end_index.entry((to, to_end)).or_default().push(idx);
        idx
    }

    pub fn add_gap(&mut self, gap: Gap) -> usize {
        self.ensure_segment(&gap.from);
        self.ensure_segment(&gap.to);
        let from = gap.from.clone();
        let from_end = End::leaving(gap.from_orientation);
        let to = gap.to.clone();
        let to_end = End::arriving(gap.to_orientation);
        let idx = self.push(GfaRecord::Gap(gap));
        self.end_index.entry((from, from_end)).or_default().push(idx);
        self.end_index.entry((to, to_end)).or_default().push(idx);
        idx
    }

    pub fn add_fragment(&mut self, fragment: Fragment) -> usize {
        self.ensure_segment(&fragment.segment);
        let segment = fragment.segment.clone();
        let idx = self.push(GfaRecord::Fragment(fragment));
        self.fragment_index.entry(segment).or_default().push(idx);
        idx
    }

    pub fn add_ordered_group(&mut self, group: OrderedGroup) -> Result<usize, GfaError> {
        if self.group_index.contains_key(&group.name) {
            return Err(GfaError::not_unique(format!("group {}", group.name)));
        }
        for (member, _) in &group.members {
            self.ensure_segment(member);
        }
        let name = group.name.clone();
        let idx = self.push(GfaRecord::OrderedGroup(group));
        self.group_index.insert(name, idx);
        Ok(idx)
    }

    pub fn add_unordered_group(&mut self, group: UnorderedGroup) -> Result<usize, GfaError> {
        if self.group_index.contains_key(&group.name) {
            return Err(GfaError::not_unique(format!("group {}", group.name)));
        }
        for member in &group.members {
            self.ensure_segment(member);
        }
        let name = group.name.clone();
        let idx = self.push(GfaRecord::UnorderedGroup(group));
        self.group_index.insert(name, idx);
        Ok(idx)
    }

    /// Renames a segment and rewrites every link, containment, path
    /// step, edge, fragment and gap that refers to it by name.
    pub fn rename_segment(&mut self, old_name: &str, new_name: &str) -> Result<(), GfaError> {
        if old_name == new_name {
            return Ok(());
        }
        if self.segment_index.contains_key(new_name) || self.path_index.contains_key(new_name) || self.group_index.contains_key(new_name) {
            return Err(GfaError::not_unique(new_name.to_string()));
        }
        let idx = self
            .segment_index
            .remove(old_name)
            .ok_or_else(|| GfaError::not_found(format!("segment {old_name}")))?;

        if self.record(idx).and_then(GfaRecord::as_segment).is_some_and(Segment::is_virtual) {
            self.segment_index.insert(old_name.to_string(), idx);
            return Err(GfaError::runtime(format!("cannot rename virtual segment {old_name}")));
        }

        if let Some(seg) = self.record_mut(idx).and_then(GfaRecord::as_mut_segment) {
            seg.name = new_name.to_string();
        }
        self.segment_index.insert(new_name.to_string(), idx);

        for link in self.records.iter_mut().filter_map(|r| r.as_mut()).filter_map(GfaRecord::as_mut_link) {
            if link.from_segment == old_name {
                link.from_segment = new_name.to_string();
            }
            if link.to_segment == old_name {
                link.to_segment = new_name.to_string();
            }
        }
        for c in self.records.iter_mut().filter_map(|r| r.as_mut()).filter_map(GfaRecord::as_mut_containment) {
            if c.container == old_name {
                c.container = new_name.to_string();
            }
            if c.contained == old_name {
                c.contained = new_name.to_string();
            }
        }
        for e in self.records.iter_mut().filter_map(|r| r.as_mut()).filter_map(GfaRecord::as_mut_edge) {
            if e.from == old_name {
                e.from = new_name.to_string();
            }
            if e.to == old_name {
                e.to = new_name.to_string();
            }
        }
        for g in self.records.iter_mut().filter_map(|r| r.as_mut()).filter_map(GfaRecord::as_mut_gap) {
            if g.from == old_name {
                g.from = new_name.to_string();
            }
            if g.to == old_name {
                g.to = new_name.to_string();
            }
        }
        for f in self.records.iter_mut().filter_map(|r| r.as_mut()).filter_map(GfaRecord::as_mut_fragment) {
            if f.segment == old_name {
                f.segment = new_name.to_string();
            }
        }
        for p in self.records.iter_mut().filter_map(|r| r.as_mut()).filter_map(GfaRecord::as_mut_path) {
            for step in &mut p.steps {
                if step.segment == old_name {
                    step.segment = new_name.to_string();
                }
            }
        }
        for og in self.records.iter_mut().filter_map(|r| r.as_mut()).filter_map(GfaRecord::as_mut_ordered_group) {
            for (member, _) in &mut og.members {
                if member == old_name {
                    *member = new_name.to_string();
                }
            }
        }
        for ug in self.records.iter_mut().filter_map(|r| r.as_mut()).filter_map(GfaRecord::as_mut_unordered_group) {
            for member in &mut ug.members {
                if member == old_name {
                    *member = new_name.to_string();
                }
            }
        }

        self.reindex_segment(old_name, new_name);
        Ok(())
    }

    fn reindex_segment(&mut self, old_name: &str, new_name: &str) {
        for end in [End::B, End::E] {
            if let Some(v) = self.end_index.remove(&(old_name.to_string(), end)) {
                self.end_index.insert((new_name.to_string(), end), v);
            }
        }
        if let Some(v) = self.contains_index.remove(old_name) {
            self.contains_index.insert(new_name.to_string(), v);
        }
        if let Some(v) = self.contained_by_index.remove(old_name) {
            self.contained_by_index.insert(new_name.to_string(), v);
        }
        if let Some(v) = self.path_membership.remove(old_name) {
            self.path_membership.insert(new_name.to_string(), v);
        }
        if let Some(v) = self.fragment_index.remove(old_name) {
            self.fragment_index.insert(new_name.to_string(), v);
        }
    }

    /// Removes a segment and every link/containment/edge/gap touching
    /// it, leaving tombstones in the arena. Paths that step through it
    /// are left untouched; the caller decides whether a dangling path
    /// is acceptable.
    pub fn delete_segment(&mut self, name: &str) -> Result<(), GfaError> {
        let idx = self
            .segment_index
            .remove(name)
            .ok_or_else(|| GfaError::not_found(format!("segment {name}")))?;
        self.records[idx] = None;

        for end in [End::B, End::E] {
            if let Some(incident) = self.end_index.remove(&(name.to_string(), end)) {
                for bridge_idx in incident {
                    self.delete_record(bridge_idx);
                }
            }
        }
        if let Some(containments) = self.contains_index.remove(name) {
            for c in containments {
                self.delete_record(c);
            }
        }
        if let Some(containments) = self.contained_by_index.remove(name) {
            for c in containments {
                self.delete_record(c);
            }
        }
        self.path_membership.remove(name);
        self.fragment_index.remove(name);
        Ok(())
    }

    fn delete_record(&mut self, idx: usize) {
        if let Some(Some(_)) = self.records.get(idx) {
            self.records[idx] = None;
        }
    }

    pub fn delete_link(&mut self, idx: usize) -> Result<(), GfaError> {
        let link = self
            .record(idx)
            .and_then(GfaRecord::as_link)
            .ok_or_else(|| GfaError::not_found(format!("link at index {idx}")))?
            .clone();
        self.records[idx] = None;
        if let Some(v) = self.end_index.get_mut(&(link.from_segment.clone(), End::leaving(link.from_orientation))) {
            v.retain(|&i| i != idx);
        }
        if let Some(v) = self.end_index.get_mut(&(link.to_segment.clone(), End::arriving(link.to_orientation))) {
            v.retain(|&i| i != idx);
        }
        Ok(())
    }

    pub fn segment_names(&self) -> Vec<String> {
        self.segment_index.keys().cloned().collect()
    }

    /// The other end of a segment reached by following `link_idx` from `from`.
    pub fn other_end_of_link(&self, link_idx: usize, from: &str, from_end: End) -> Option<(String, End)> {
        let link = self.record(link_idx).and_then(GfaRecord::as_link)?;
        if link.from_segment == from && End::leaving(link.from_orientation) == from_end {
            Some((link.to_segment.clone(), End::arriving(link.to_orientation)))
        } else if link.to_segment == from && End::arriving(link.to_orientation) == from_end {
            Some((link.from_segment.clone(), End::leaving(link.from_orientation)))
        } else {
            None
        }
    }

    /// Re-renders the graph as GFA text in the given version, header
    /// first, then segments, links, containments, and paths in the
    /// order they were added.
    pub fn to_string(&self, version: GFAVersion) -> String {
        let mut lines = Vec::new();
        if let Some(h) = self.header() {
            lines.push(h.to_raw_line(version));
        }
        for record in self.records.iter().flatten() {
            if matches!(record, GfaRecord::Header(_)) {
                continue;
            }
            if let GfaRecord::Segment(s) = record {
                if s.is_virtual() {
                    continue;
                }
            }
            lines.push(record.to_raw_line(version));
        }
        lines.join("\n")
    }

    pub fn segment_count(&self) -> usize {
        self.segments().filter(|s| !s.is_virtual()).count()
    }

    pub fn link_orientation_between(&self, a: &str, a_end: End, b: &str, b_end: End) -> Option<Orientation> {
        self.link_between(a, a_end, b, b_end).map(|l| l.from_orientation)
    }

    /// The link record, if any, connecting `(a, a_end)` to `(b, b_end)`.
    pub fn link_between(&self, a: &str, a_end: End, b: &str, b_end: End) -> Option<&Link> {
        for &idx in self.incident(a, a_end) {
            if let Some((other, other_end)) = self.other_end_of_link(idx, a, a_end) {
                if other == b && other_end == b_end {
                    return self.record(idx).and_then(GfaRecord::as_link);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optional_field::TagMap;

    fn link(from: &str, fo: Orientation, to: &str, to_o: Orientation) -> Link {
        Link {
            line_no: 0,
            raw: String::new(),
            tags: TagMap::new(),
            from_segment: from.to_string(),
            from_orientation: fo,
            to_segment: to.to_string(),
            to_orientation: to_o,
            overlap: "*".to_string(),
        }
    }

    #[test]
    fn link_creates_virtual_segments() {
        let mut g = Graph::new();
        g.add_link(link("a", Orientation::Forward, "b", Orientation::Forward));
        assert!(g.segment("a").unwrap().is_virtual());
        assert!(g.segment("b").unwrap().is_virtual());
    }

    #[test]
    fn real_segment_promotes_virtual_in_place() {
        let mut g = Graph::new();
        g.add_link(link("a", Orientation::Forward, "b", Orientation::Forward));
        let mut tags = TagMap::new();
        let real = Segment::parse_line(&["S", "a", "ACGT"], "S\ta\tACGT", 2, &mut tags, GFAVersion::V1, false, true).unwrap();
        g.add_segment(real).unwrap();
        assert!(!g.segment("a").unwrap().is_virtual());
        assert_eq!(g.segment("a").unwrap().sequence, "ACGT");
    }

    #[test]
    fn rename_rewrites_incident_link() {
        let mut g = Graph::new();
        g.add_link(link("a", Orientation::Forward, "b", Orientation::Forward));
        g.rename_segment("a", "a2").unwrap();
        assert!(g.segment("a").is_none());
        assert!(g.segment("a2").is_some());
        let l = g.links().next().unwrap();
        assert_eq!(l.from_segment, "a2");
    }

    #[test]
    fn delete_segment_removes_incident_links() {
        let mut g = Graph::new();
        g.add_link(link("a", Orientation::Forward, "b", Orientation::Forward));
        g.delete_segment("a").unwrap();
        assert_eq!(g.links().count(), 0);
        assert!(g.segment("b").is_some());
    }

    #[test]
    fn add_path_rejects_duplicate_name() {
        let mut g = Graph::new();
        let path = crate::line::path::Path {
            line_no: 1,
            raw: String::new(),
            tags: TagMap::new(),
            name: "p1".to_string(),
            steps: vec![],
            overlaps: vec![],
        };
        g.add_path(path.clone()).unwrap();
        assert!(g.add_path(path).is_err());
    }

    #[test]
    fn rename_segment_rejects_collision_with_path_name() {
        let mut g = Graph::new();
        g.add_link(link("a", Orientation::Forward, "b", Orientation::Forward));
        let path = crate::line::path::Path {
            line_no: 1,
            raw: String::new(),
            tags: TagMap::new(),
            name: "p1".to_string(),
            steps: vec![],
            overlaps: vec![],
        };
        g.add_path(path).unwrap();
        assert!(g.rename_segment("a", "p1").is_err());
    }
}
