//! Graph-editing algorithms: rename (see [`Graph::rename_segment`]),
//! segment multiplication, low-coverage pruning, and copy-number
//! compute/apply.

use std::collections::HashSet;

use crate::error::GfaError;
use crate::graph::Graph;
use crate::line::link::Link;
use crate::line::segment::Segment;
use crate::optional_field::OptionalFieldValue;
use crate::orientation::End;

const COUNT_TAGS: [&str; 3] = ["KC", "RC", "FC"];

fn divide_count_tags(segment: &mut Segment, factor: i64) {
    for tag in COUNT_TAGS {
        if let Some(v) = segment.tags.get::<i32>(tag) {
            segment.tags.insert(tag.to_string(), OptionalFieldValue::Int((v as i64 / factor) as i32));
        }
    }
}

fn divide_link_count_tags(link: &mut Link, factor: i64) {
    for tag in COUNT_TAGS {
        if let Some(v) = link.tags.get::<i32>(tag) {
            link.tags.insert(tag.to_string(), OptionalFieldValue::Int((v as i64 / factor) as i32));
        }
    }
}

/// Ruby-`String#succ`-style bump used to mint the next candidate copy
/// name: increments the last alphanumeric character, carrying into
/// earlier characters, appending a new leading character when every
/// position carries over.
fn lexicographic_successor(s: &str) -> String {
    let mut chars: Vec<char> = s.chars().collect();
    for i in (0..chars.len()).rev() {
        let c = chars[i];
        if c.is_ascii_lowercase() {
            if c == 'z' {
                chars[i] = 'a';
                if i == 0 {
                    chars.insert(0, 'a');
                    return chars.into_iter().collect();
                }
                continue;
            }
            chars[i] = ((c as u8) + 1) as char;
            return chars.into_iter().collect();
        } else if c.is_ascii_digit() {
            if c == '9' {
                chars[i] = '0';
                if i == 0 {
                    chars.insert(0, '1');
                    return chars.into_iter().collect();
                }
                continue;
            }
            chars[i] = ((c as u8) + 1) as char;
            return chars.into_iter().collect();
        } else {
            break;
        }
    }
    let carried: String = chars.into_iter().collect();
    format!("{carried}a")
}

fn generate_copy_names(graph: &Graph, base: &str, count: usize) -> Vec<String> {
    let mut chosen = Vec::with_capacity(count);
    let mut candidate = format!("{base}a");
    while chosen.len() < count {
        let taken = graph.segment_idx(&candidate).is_some() || chosen.contains(&candidate);
        if taken {
            candidate = lexicographic_successor(&candidate);
        } else {
            chosen.push(candidate.clone());
            candidate = lexicographic_successor(&candidate);
        }
    }
    chosen
}

fn link_signature(other: &str, other_end: End) -> String {
    format!("{other}{}", other_end.as_str())
}

/// Heuristic choice of which end to run link distribution on, from the
/// table in the multiply-segment design: prefer an end whose degree
/// exactly matches the copy number, otherwise prefer the lower-degree
/// end so the ambiguous side keeps fewer redundant links.
pub fn select_distribute_end(graph: &Graph, name: &str, cn: i64, distribute_equal_only: bool) -> Option<End> {
    let deg_e = graph.incident(name, End::E).len() as i64;
    let deg_b = graph.incident(name, End::B).len() as i64;

    if deg_e == cn {
        return Some(End::E);
    }
    if deg_b == cn {
        return Some(End::B);
    }
    if distribute_equal_only {
        return None;
    }
    if deg_e < 2 && deg_b < 2 {
        return None;
    }
    if deg_e < 2 {
        return Some(End::B);
    }
    if deg_b < 2 {
        return Some(End::E);
    }
    if deg_e < cn && deg_b <= deg_e {
        return Some(End::E);
    }
    Some(End::B)
}

fn distribute_links_at_end(graph: &mut Graph, siblings: &[String], end: End) -> Result<(), GfaError> {
    let original = &siblings[0];
    let l: Vec<usize> = graph.incident(original, end).to_vec();
    let signatures: Vec<String> = l
        .iter()
        .filter_map(|&idx| graph.other_end_of_link(idx, original, end))
        .map(|(other, other_end)| link_signature(&other, other_end))
        .collect();

    let f = siblings.len() as i64;
    let diff = (l.len() as i64 - f).max(0) as usize;

    for (i, sibling) in siblings.iter().enumerate() {
        let lo = i.min(signatures.len());
        let hi = (i + diff + 1).min(signatures.len());
        let window: HashSet<&String> = signatures[lo..hi].iter().collect();

        let incident: Vec<usize> = graph.incident(sibling, end).to_vec();
        for idx in incident {
            let Some((other, other_end)) = graph.other_end_of_link(idx, sibling, end) else {
                continue;
            };
            let sig = link_signature(&other, other_end);
            if !window.contains(&sig) {
                graph.delete_link(idx)?;
            }
        }
    }
    Ok(())
}

/// `f == 0` deletes the segment; `f == 1` is a no-op; `f >= 2` creates
/// `f - 1` copies, distributes count tags across originals and copies,
/// and optionally redistributes incident links at the requested ends
/// so each copy keeps a distinct share of the original's neighbors.
pub fn multiply_segment(
    graph: &mut Graph,
    name: &str,
    factor: i64,
    copy_names: Option<Vec<String>>,
    distribute_links: &[End],
) -> Result<Vec<String>, GfaError> {
    if factor < 0 {
        return Err(GfaError::argument("multiplication factor must be non-negative"));
    }
    if factor == 0 {
        graph.delete_segment(name)?;
        return Ok(vec![]);
    }
    if factor == 1 {
        return Ok(vec![name.to_string()]);
    }

    let target = graph.segment(name).ok_or_else(|| GfaError::not_found(format!("segment {name}")))?.clone();
    if target.is_virtual() {
        return Err(GfaError::runtime(format!("cannot multiply virtual segment {name}")));
    }

    let mut touched_links: HashSet<usize> = HashSet::new();
    for end in [End::B, End::E] {
        touched_links.extend(graph.incident(name, end).iter().copied());
    }
    for idx in &touched_links {
        if let Some(link) = graph.record_mut(*idx).and_then(|r| r.as_mut_link()) {
            divide_link_count_tags(link, factor);
        }
    }
    if let Some(seg) = graph.segment_mut(name) {
        divide_count_tags(seg, factor);
    }

    let copies = copy_names.unwrap_or_else(|| generate_copy_names(graph, name, (factor - 1) as usize));
    if copies.len() as i64 != factor - 1 {
        return Err(GfaError::argument(format!("expected {} copy names, got {}", factor - 1, copies.len())));
    }

    let original_links: Vec<Link> = touched_links
        .iter()
        .filter_map(|&idx| graph.record(idx).and_then(|r| r.as_link()).cloned())
        .collect();

    let mut siblings = vec![name.to_string()];
    for copy_name in &copies {
        let mut clone = target.clone();
        clone.name = copy_name.clone();
        clone.line_no = 0;
        clone.raw = String::new();
        if clone.tags.get::<String>("or").is_none() {
            clone.tags.insert("or".to_string(), OptionalFieldValue::String(name.to_string()));
        }
        graph.add_segment(clone)?;

        for link in &original_links {
            let mut new_link = link.clone();
            new_link.line_no = 0;
            new_link.raw = String::new();
            if new_link.from_segment == name {
                new_link.from_segment = copy_name.clone();
            }
            if new_link.to_segment == name {
                new_link.to_segment = copy_name.clone();
            }
            graph.add_link(new_link);
        }
        siblings.push(copy_name.clone());
    }

    for end in distribute_links {
        distribute_links_at_end(graph, &siblings, *end)?;
    }

    Ok(siblings)
}

/// Deletes every segment whose `count_tag / length` coverage falls
/// below `threshold`. Returns the names removed.
pub fn prune_low_coverage(graph: &mut Graph, count_tag: &str, threshold: f64) -> Result<Vec<String>, GfaError> {
    let mut to_delete = Vec::new();
    for segment in graph.segments() {
        if segment.is_virtual() {
            continue;
        }
        let length = segment.get_length();
        if length == 0 {
            continue;
        }
        let count = segment.tags.get::<i32>(count_tag).unwrap_or(0) as f64;
        let coverage = count / length as f64;
        if coverage < threshold {
            to_delete.push(segment.name.clone());
        }
    }
    for name in &to_delete {
        graph.delete_segment(name)?;
    }
    Ok(to_delete)
}

/// Sets each segment's `cn` tag to `round(coverage / single_copy_coverage)`.
pub fn compute_copy_numbers(graph: &mut Graph, count_tag: &str, single_copy_coverage: f64) -> Result<(), GfaError> {
    if single_copy_coverage <= 0.0 {
        return Err(GfaError::argument("single_copy_coverage must be positive"));
    }
    let names = graph.segment_names();
    for name in names {
        let Some(segment) = graph.segment(&name) else { continue };
        if segment.is_virtual() {
            continue;
        }
        let length = segment.get_length();
        if length == 0 {
            continue;
        }
        let count = segment.tags.get::<i32>(count_tag).unwrap_or(0) as f64;
        let cn = (count / length as f64 / single_copy_coverage).round() as i32;
        if let Some(seg) = graph.segment_mut(&name) {
            seg.tags.insert("cn".to_string(), OptionalFieldValue::Int(cn));
        }
    }
    Ok(())
}

/// Applies each segment's `cn` tag via [`multiply_segment`], visiting
/// segments in ascending `cn` order. The end to redistribute links on,
/// if any, is chosen per segment by [`select_distribute_end`] rather
/// than fixed in advance.
pub fn apply_copy_numbers(graph: &mut Graph, distribute_equal_only: bool) -> Result<(), GfaError> {
    let mut plan: Vec<(String, i64)> = graph
        .segments()
        .filter(|s| !s.is_virtual())
        .filter_map(|s| s.tags.get::<i32>("cn").map(|cn| (s.name.clone(), cn as i64)))
        .collect();
    plan.sort_by_key(|(_, cn)| *cn);

    for (name, cn) in plan {
        if graph.segment(&name).is_none() {
            continue;
        }
        let distribute: Vec<End> = select_distribute_end(graph, &name, cn, distribute_equal_only).into_iter().collect();
        multiply_segment(graph, &name, cn, None, &distribute)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optional_field::TagMap;
    use crate::orientation::Orientation;

    fn graph_with_x_and_two_links() -> Graph {
        let mut g = Graph::new();
        let mut tags = TagMap::new();
        tags.insert("RC".to_string(), OptionalFieldValue::Int(50));
        let x = Segment {
            line_no: 1,
            raw: String::new(),
            tags,
            name: "X".to_string(),
            sequence: "*".to_string(),
            length: Some(100),
            state: crate::line::segment::SegmentState::Real,
        };
        g.add_segment(x).unwrap();
        g.add_link(Link {
            line_no: 2,
            raw: String::new(),
            tags: TagMap::new(),
            from_segment: "X".to_string(),
            from_orientation: Orientation::Forward,
            to_segment: "n1".to_string(),
            to_orientation: Orientation::Forward,
            overlap: "*".to_string(),
        });
        g.add_link(Link {
            line_no: 3,
            raw: String::new(),
            tags: TagMap::new(),
            from_segment: "X".to_string(),
            from_orientation: Orientation::Forward,
            to_segment: "n2".to_string(),
            to_orientation: Orientation::Forward,
            overlap: "*".to_string(),
        });
        g
    }

    #[test]
    fn multiply_by_two_creates_one_copy_with_halved_counts() {
        let mut g = graph_with_x_and_two_links();
        let names = multiply_segment(&mut g, "X", 2, None, &[]).unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(g.segment("X").unwrap().tags.get::<i32>("RC"), Some(25));
        let copy_name = &names[1];
        assert_eq!(g.segment(copy_name).unwrap().tags.get::<i32>("RC"), Some(25));
        assert_eq!(g.links().count(), 4);
    }

    #[test]
    fn multiply_by_zero_deletes() {
        let mut g = graph_with_x_and_two_links();
        multiply_segment(&mut g, "X", 0, None, &[]).unwrap();
        assert!(g.segment("X").is_none());
    }

    #[test]
    fn multiply_by_one_is_noop() {
        let mut g = graph_with_x_and_two_links();
        let names = multiply_segment(&mut g, "X", 1, None, &[]).unwrap();
        assert_eq!(names, vec!["X".to_string()]);
        assert_eq!(g.links().count(), 2);
    }

    #[test]
    fn successor_carries_over_z() {
        assert_eq!(lexicographic_successor("Xa"), "Xb");
        assert_eq!(lexicographic_successor("Xz"), "Xaa");
    }

    #[test]
    fn prune_removes_low_coverage_segments() {
        let mut g = graph_with_x_and_two_links();
        let removed = prune_low_coverage(&mut g, "RC", 1.0).unwrap();
        assert_eq!(removed, vec!["X".to_string()]);
    }

    #[test]
    fn compute_copy_numbers_sets_cn_tag() {
        let mut g = graph_with_x_and_two_links();
        compute_copy_numbers(&mut g, "RC", 0.25).unwrap();
        assert_eq!(g.segment("X").unwrap().tags.get::<i32>("cn"), Some(2));
    }

    #[test]
    fn select_distribute_end_prefers_end_matching_copy_number() {
        let g = graph_with_x_and_two_links();
        assert_eq!(select_distribute_end(&g, "X", 2, false), Some(End::E));
    }

    #[test]
    fn apply_copy_numbers_splits_links_across_copies_instead_of_dropping_them() {
        let mut g = graph_with_x_and_two_links();
        g.segment_mut("X").unwrap().tags.insert("cn".to_string(), OptionalFieldValue::Int(2));
        apply_copy_numbers(&mut g, false).unwrap();
        assert_eq!(g.segment_count(), 2);
        assert_eq!(g.links().count(), 2);
    }
}
