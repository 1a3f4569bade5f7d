//! Traversal algorithms: connectivity classification, linear-path
//! detection/merging, cut-link/cut-segment detection, connected
//! components, and the two auxiliary simplifications (random-orientation
//! selection, internal-link enforcement) the higher-level tools rely on.

use std::collections::HashSet;

use crate::error::GfaError;
use crate::graph::Graph;
use crate::line::link::Link;
use crate::line::segment::{Segment, SegmentState};
use crate::line::utils::{is_valid_cigar, single_m_cigar_length, Alignment};
use crate::optional_field::{OptionalFieldValue, TagMap};
use crate::orientation::{reverse_complement, End, Orientation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivitySymbol {
    Degree(usize),
    Multi,
}

pub fn connectivity_symbol(graph: &Graph, name: &str, end: End) -> ConnectivitySymbol {
    let degree = graph.incident(name, end).len();
    if degree <= 1 {
        ConnectivitySymbol::Degree(degree)
    } else {
        ConnectivitySymbol::Multi
    }
}

/// One oriented segment-end visited while walking a linear chain: `end`
/// is the end through which the chain enters this segment from the
/// center of the walk.
pub type OrientedEnd = (String, End);

fn chain_from(graph: &Graph, start: &str, exit_end: End) -> Vec<OrientedEnd> {
    let mut visited = HashSet::new();
    visited.insert(start.to_string());
    let mut out = Vec::new();
    let mut current = start.to_string();
    let mut exit_end = exit_end;
    loop {
        let incident = graph.incident(&current, exit_end);
        if incident.len() != 1 {
            break;
        }
        let idx = incident[0];
        let Some((next_name, next_entry_end)) = graph.other_end_of_link(idx, &current, exit_end) else {
            break;
        };
        if visited.contains(&next_name) {
            break;
        }
        out.push((next_name.clone(), next_entry_end));
        visited.insert(next_name.clone());
        let next_exit_end = next_entry_end.other();
        if graph.incident(&next_name, next_exit_end).len() != 1 {
            break;
        }
        current = next_name;
        exit_end = next_exit_end;
    }
    out
}

/// The maximal linear chain containing `seed`, walking outward from both
/// of its ends while every intermediate segment has connectivity (1,1).
/// Empty if `seed` isn't part of a chain of at least two segments.
pub fn linear_path(graph: &Graph, seed: &str) -> Vec<OrientedEnd> {
    let mut backward = chain_from(graph, seed, End::B);
    backward.reverse();
    let forward = chain_from(graph, seed, End::E);

    let mut full = backward;
    full.push((seed.to_string(), End::E));
    full.extend(forward);

    if full.len() < 2 {
        Vec::new()
    } else {
        full
    }
}

/// Every maximal linear chain in the graph, each segment appearing in
/// at most one chain.
pub fn linear_paths(graph: &Graph) -> Vec<Vec<OrientedEnd>> {
    let mut names: Vec<String> = graph.segments().filter(|s| !s.is_virtual()).map(|s| s.name.clone()).collect();
    names.sort();

    let mut excluded: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for name in names {
        if excluded.contains(&name) {
            continue;
        }
        let path = linear_path(graph, &name);
        if path.len() < 2 {
            continue;
        }
        for (seg_name, _) in &path {
            excluded.insert(seg_name.clone());
        }
        out.push(path);
    }
    out
}

/// How to name the segment produced by [`merge_linear_path`].
pub enum MergedName {
    /// First unused `merged1`, `merged2`, ... name.
    Short,
    Named(String),
    /// Concatenate the original segment names with `_`.
    Concat,
}

fn resolve_merge_name(graph: &Graph, names: &[String], merged_name: &MergedName) -> String {
    match merged_name {
        MergedName::Named(n) => n.clone(),
        MergedName::Concat => names.join("_"),
        MergedName::Short => {
            let mut i = 1u64;
            loop {
                let candidate = format!("merged{i}");
                if graph.segment_idx(&candidate).is_none() {
                    return candidate;
                }
                i += 1;
            }
        }
    }
}

/// The link connecting `a` and `b` directly, checking both ends of `a`
/// rather than relying on which end a caller thinks is relevant —
/// avoids entangling this with the entry-end bookkeeping in
/// [`OrientedEnd`], which only records which end faces the *center* of
/// a walk, not which end faces a particular neighbor.
fn find_link_between(graph: &Graph, a: &str, b: &str) -> Option<usize> {
    for end in [End::B, End::E] {
        for &idx in graph.incident(a, end) {
            if let Some((other, _)) = graph.other_end_of_link(idx, a, end) {
                if other == b {
                    return Some(idx);
                }
            }
        }
    }
    None
}

/// The end of `name` that does *not* connect to `neighbor` — used to
/// find the externally-facing end of a chain's boundary segment
/// without relying on entry-end direction, which is ambiguous at the
/// seed position.
fn external_end(graph: &Graph, name: &str, neighbor: &str) -> End {
    for end in [End::B, End::E] {
        let connects_to_neighbor = graph
            .incident(name, end)
            .iter()
            .any(|&idx| graph.other_end_of_link(idx, name, end).map(|(o, _)| o == neighbor).unwrap_or(false));
        if !connects_to_neighbor {
            return end;
        }
    }
    End::B
}

fn overlap_cut(graph: &Graph, prev_name: &str, name: &str) -> Result<i64, GfaError> {
    let link_idx =
        find_link_between(graph, prev_name, name).ok_or_else(|| GfaError::inconsistency("missing link between linear-path neighbors"))?;
    let overlap = graph
        .record(link_idx)
        .and_then(|r| r.as_link())
        .map(|l| l.overlap.clone())
        .unwrap_or_else(|| "*".to_string());

    if overlap == "*" {
        return Ok(0);
    }
    if !is_valid_cigar(&overlap) {
        return Err(GfaError::runtime("non-M overlaps unsupported"));
    }
    single_m_cigar_length(&Alignment::Cigar(overlap)).ok_or_else(|| GfaError::runtime("non-M overlaps unsupported"))
}

fn rewire_boundary_link(old_link: &Link, old_name: &str, old_end: End, merged_name: &str, merged_end: End) -> Link {
    let mut l = old_link.clone();
    l.line_no = 0;
    l.raw = String::new();
    if l.from_segment == old_name && End::leaving(l.from_orientation) == old_end {
        l.from_segment = merged_name.to_string();
        l.from_orientation = if merged_end == End::E { Orientation::Forward } else { Orientation::Reverse };
    } else if l.to_segment == old_name && End::arriving(l.to_orientation) == old_end {
        l.to_segment = merged_name.to_string();
        l.to_orientation = if merged_end == End::B { Orientation::Forward } else { Orientation::Reverse };
    }
    l
}

/// Collapses a linear chain (as returned by [`linear_path`]) into a
/// single segment: sequences are concatenated with each CIGAR overlap's
/// `M` length trimmed from the start of the next piece, count tags are
/// summed (optionally scaled down for the trimmed bases), and the two
/// boundary links are recreated pointing at the merged segment. Every
/// original segment on the chain is deleted.
pub fn merge_linear_path(graph: &mut Graph, path: &[OrientedEnd], merged_name: MergedName, cut_counts: bool) -> Result<String, GfaError> {
    if path.len() < 2 {
        return Err(GfaError::argument("path too short to merge"));
    }

    let mut names = Vec::with_capacity(path.len());
    let mut sequence_parts: Vec<String> = Vec::new();
    let mut any_star = false;
    let mut lengths: Vec<i64> = Vec::new();
    let mut all_lengths_known = true;
    let mut total_cut: i64 = 0;
    let (mut kc, mut rc, mut fc) = (0i64, 0i64, 0i64);
    let (mut have_kc, mut have_rc, mut have_fc) = (false, false, false);

    for (i, (name, end)) in path.iter().enumerate() {
        let seg = graph.segment(name).ok_or_else(|| GfaError::not_found(format!("segment {name}")))?.clone();
        names.push(name.clone());

        let cut = if i == 0 { 0 } else { overlap_cut(graph, &path[i - 1].0, name)? };
        total_cut += cut;

        if seg.sequence == "*" {
            any_star = true;
        } else {
            // Only the first element's orientation flips the sequence;
            // later elements are read as stored and merely have the
            // overlap trimmed off their front.
            let oriented = if i == 0 && *end == End::B { reverse_complement(&seg.sequence) } else { seg.sequence.clone() };
            let trimmed: String = oriented.chars().skip(cut as usize).collect();
            sequence_parts.push(trimmed);
        }

        match seg.length.or_else(|| seg.tags.get::<i32>("LN").map(i64::from)) {
            Some(len) => lengths.push(len - cut),
            None => all_lengths_known = false,
        }

        if let Some(v) = seg.tags.get::<i32>("KC") {
            kc += v as i64;
            have_kc = true;
        }
        if let Some(v) = seg.tags.get::<i32>("RC") {
            rc += v as i64;
            have_rc = true;
        }
        if let Some(v) = seg.tags.get::<i32>("FC") {
            fc += v as i64;
            have_fc = true;
        }
    }

    let merged_sequence = if any_star { "*".to_string() } else { sequence_parts.concat() };
    let merged_len = if all_lengths_known { Some(lengths.iter().sum::<i64>()) } else { None };
    let merged_name = resolve_merge_name(graph, &names, &merged_name);

    let mut tags = TagMap::new();
    if let Some(len) = merged_len {
        let original_total = len + total_cut;
        let scale = if cut_counts && original_total > 0 { len as f64 / original_total as f64 } else { 1.0 };
        if have_kc {
            tags.insert("KC".to_string(), OptionalFieldValue::Int((kc as f64 * scale) as i32));
        }
        if have_rc {
            tags.insert("RC".to_string(), OptionalFieldValue::Int((rc as f64 * scale) as i32));
        }
        if have_fc {
            tags.insert("FC".to_string(), OptionalFieldValue::Int((fc as f64 * scale) as i32));
        }
        tags.insert("LN".to_string(), OptionalFieldValue::Int(len as i32));
    }

    let left_ext = external_end(graph, &path[0].0, &path[1].0);
    let right_ext = external_end(graph, &path[path.len() - 1].0, &path[path.len() - 2].0);
    let left_links: Vec<Link> = graph
        .incident(&path[0].0, left_ext)
        .iter()
        .filter_map(|&idx| graph.record(idx).and_then(|r| r.as_link()).cloned())
        .map(|l| rewire_boundary_link(&l, &path[0].0, left_ext, &merged_name, End::B))
        .collect();
    let right_links: Vec<Link> = graph
        .incident(&path[path.len() - 1].0, right_ext)
        .iter()
        .filter_map(|&idx| graph.record(idx).and_then(|r| r.as_link()).cloned())
        .map(|l| rewire_boundary_link(&l, &path[path.len() - 1].0, right_ext, &merged_name, End::E))
        .collect();

    for name in &names {
        graph.delete_segment(name)?;
    }

    graph.add_segment(Segment {
        line_no: 0,
        raw: String::new(),
        tags,
        name: merged_name.clone(),
        sequence: merged_sequence,
        length: None,
        state: SegmentState::Real,
    })?;

    for link in left_links.into_iter().chain(right_links) {
        graph.add_link(link);
    }

    Ok(merged_name)
}

pub fn merge_linear_paths(graph: &mut Graph, cut_counts: bool) -> Result<Vec<String>, GfaError> {
    let mut merged = Vec::new();
    loop {
        let paths = linear_paths(graph);
        if paths.is_empty() {
            break;
        }
        for path in paths {
            let name = merge_linear_path(graph, &path, MergedName::Short, cut_counts)?;
            merged.push(name);
        }
    }
    Ok(merged)
}

fn neighbors(graph: &Graph, name: &str) -> Vec<String> {
    let mut out = Vec::new();
    for end in [End::B, End::E] {
        for &idx in graph.incident(name, end) {
            if let Some((other, _)) = graph.other_end_of_link(idx, name, end) {
                out.push(other);
            }
        }
    }
    for &idx in graph.contains(name) {
        if let Some(c) = graph.record(idx).and_then(|r| r.as_containment()) {
            out.push(c.contained.clone());
        }
    }
    for &idx in graph.contained_by(name) {
        if let Some(c) = graph.record(idx).and_then(|r| r.as_containment()) {
            out.push(c.container.clone());
        }
    }
    out
}

/// Undirected DFS over the segment-adjacency graph induced by links,
/// containments, edges and gaps.
pub fn connected_components(graph: &Graph) -> Vec<Vec<String>> {
    let mut names: Vec<String> = graph.segments().filter(|s| !s.is_virtual()).map(|s| s.name.clone()).collect();
    names.sort();

    let mut visited = HashSet::new();
    let mut components = Vec::new();
    for start in names {
        if visited.contains(&start) {
            continue;
        }
        let mut stack = vec![start.clone()];
        visited.insert(start);
        let mut component = Vec::new();
        while let Some(n) = stack.pop() {
            for neighbor in neighbors(graph, &n) {
                if !visited.contains(&neighbor) {
                    visited.insert(neighbor.clone());
                    stack.push(neighbor);
                }
            }
            component.push(n);
        }
        component.sort();
        components.push(component);
    }
    components
}

pub fn is_cut_link(graph: &Graph, link_idx: usize) -> Result<bool, GfaError> {
    let before = connected_components(graph).len();
    let mut clone = graph.clone();
    clone.delete_link(link_idx)?;
    Ok(connected_components(&clone).len() > before)
}

pub fn is_cut_segment(graph: &Graph, name: &str) -> Result<bool, GfaError> {
    let before = connected_components(graph).len();
    let mut clone = graph.clone();
    clone.delete_segment(name)?;
    Ok(connected_components(&clone).len() > before)
}

fn partitions_by_neighbor(graph: &Graph, name: &str, end: End) -> Vec<(String, Vec<usize>)> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: std::collections::HashMap<String, Vec<usize>> = std::collections::HashMap::new();
    for &idx in graph.incident(name, end) {
        if let Some((other, _)) = graph.other_end_of_link(idx, name, end) {
            if !groups.contains_key(&other) {
                order.push(other.clone());
            }
            groups.entry(other).or_default().push(idx);
        }
    }
    order.into_iter().map(|k| (k.clone(), groups.remove(&k).unwrap())).collect()
}

/// Preserves a documented quirk of the source routine: when a segment's
/// links don't partition into exactly two neighbor groups per end, this
/// silently does nothing rather than guessing at a pairing.
pub fn select_random_orientation(graph: &mut Graph, name: &str) -> Result<(), GfaError> {
    let b_partitions = partitions_by_neighbor(graph, name, End::B);
    let mut e_partitions = partitions_by_neighbor(graph, name, End::E);
    if b_partitions.len() != 2 || e_partitions.len() != 2 {
        return Ok(());
    }
    if b_partitions[0].0 != e_partitions[0].0 {
        e_partitions.reverse();
    }
    for (b_group, e_group) in b_partitions.iter().zip(e_partitions.iter()) {
        for &idx in &b_group.1[1..] {
            graph.delete_link(idx)?;
        }
        for &idx in &e_group.1[1..] {
            graph.delete_link(idx)?;
        }
    }
    Ok(())
}

/// For a segment with connectivity (1,1), removes any other link at
/// either neighbor's connected end that doesn't point back through
/// this segment, since internal (1,1) junctions admit only one path.
pub fn enforce_internal_link(graph: &mut Graph, name: &str) -> Result<(), GfaError> {
    if graph.incident(name, End::B).len() != 1 || graph.incident(name, End::E).len() != 1 {
        return Ok(());
    }
    for end in [End::B, End::E] {
        let idx = graph.incident(name, end)[0];
        let Some((neighbor, neighbor_end)) = graph.other_end_of_link(idx, name, end) else {
            continue;
        };
        let to_remove: Vec<usize> = graph
            .incident(&neighbor, neighbor_end)
            .iter()
            .copied()
            .filter(|&other_idx| other_idx != idx)
            .filter(|&other_idx| {
                graph
                    .other_end_of_link(other_idx, &neighbor, neighbor_end)
                    .map(|(other_name, other_end)| other_name != name || other_end != end)
                    .unwrap_or(false)
            })
            .collect();
        for idx in to_remove {
            graph.delete_link(idx)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optional_field::TagMap;

    fn seg(name: &str, sequence: &str) -> Segment {
        let mut tags = TagMap::new();
        tags.insert("LN".to_string(), OptionalFieldValue::Int(sequence.len() as i32));
        Segment {
            line_no: 0,
            raw: String::new(),
            tags,
            name: name.to_string(),
            sequence: sequence.to_string(),
            length: None,
            state: SegmentState::Real,
        }
    }

    fn link(from: &str, fo: Orientation, to: &str, to_o: Orientation, overlap: &str) -> Link {
        Link {
            line_no: 0,
            raw: String::new(),
            tags: TagMap::new(),
            from_segment: from.to_string(),
            from_orientation: fo,
            to_segment: to.to_string(),
            to_orientation: to_o,
            overlap: overlap.to_string(),
        }
    }

    fn chain_graph() -> Graph {
        let mut g = Graph::new();
        g.add_segment(seg("A", "ACGTAC")).unwrap();
        g.add_segment(seg("B", "GTACGG")).unwrap();
        g.add_segment(seg("C", "CGGAAA")).unwrap();
        g.add_link(link("A", Orientation::Forward, "B", Orientation::Forward, "2M"));
        g.add_link(link("B", Orientation::Forward, "C", Orientation::Forward, "2M"));
        g
    }

    #[test]
    fn linear_path_covers_whole_chain() {
        let g = chain_graph();
        let path = linear_path(&g, "B");
        let names: Vec<String> = path.iter().map(|(n, _)| n.clone()).collect();
        assert_eq!(names, vec!["A".to_string(), "B".to_string(), "C".to_string()]);
    }

    #[test]
    fn merge_linear_path_concatenates_with_overlap_trimmed() {
        let mut g = chain_graph();
        let path = linear_path(&g, "B");
        let name = merge_linear_path(&mut g, &path, MergedName::Short, false).unwrap();
        let merged = g.segment(&name).unwrap();
        // A(ACGTAC) + B(GTACGG) minus its leading 2M overlap ("ACGG")
        // + C(CGGAAA) minus its leading 2M overlap ("GAAA").
        assert_eq!(merged.sequence, "ACGTACACGGGAAA");
        assert_eq!(merged.get_length(), 14);
        assert_eq!(g.segment_count(), 1);
    }

    #[test]
    fn connected_components_splits_disjoint_segments() {
        let mut g = chain_graph();
        g.add_segment(seg("Z", "TTTT")).unwrap();
        let components = connected_components(&g);
        assert_eq!(components.len(), 2);
    }

    #[test]
    fn bridge_link_between_two_triangles_is_a_cut_link() {
        let mut g = Graph::new();
        for name in ["a1", "a2", "a3", "b1", "b2", "b3"] {
            g.add_segment(seg(name, "ACGT")).unwrap();
        }
        let triangle = |g: &mut Graph, x: &str, y: &str, z: &str| -> usize {
            let first = g.add_link(link(x, Orientation::Forward, y, Orientation::Forward, "*"));
            g.add_link(link(y, Orientation::Forward, z, Orientation::Forward, "*"));
            g.add_link(link(z, Orientation::Forward, x, Orientation::Forward, "*"));
            first
        };
        let a_edge_idx = triangle(&mut g, "a1", "a2", "a3");
        triangle(&mut g, "b1", "b2", "b3");
        let bridge_idx = g.add_link(link("a1", Orientation::Forward, "b1", Orientation::Forward, "*"));

        assert!(is_cut_link(&g, bridge_idx).unwrap());
        assert!(!is_cut_link(&g, a_edge_idx).unwrap());
    }
}
