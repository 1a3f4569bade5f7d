//! Single-pass parsing of GFA text into a [`Graph`], plus the options
//! that control how strict that pass is.

use std::fs;
use std::path::Path as FsPath;

use crate::error::{DiagnosticCode, GfaError, ParseDiagnostic};
use crate::gfa::GFAVersion;
use crate::graph::Graph;
use crate::line::record::GfaRecord;

/// Tuning knobs for [`parse_string`] / [`parse_file`].
///
/// Mirrors the handful of escape hatches real-world GFA producers need:
/// tolerating non-printable sequence characters, and skipping sequence
/// storage entirely when only the graph topology matters.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Don't reject segments whose sequence has non-printable bytes.
    pub skip_invalid_sequence_test: bool,
    /// Keep segment sequences in memory. Disable for topology-only
    /// work on files too large to hold sequence data comfortably.
    pub store_sequences: bool,
    /// Abort the whole parse on the first unrecoverable line instead of
    /// skipping it and continuing.
    pub stop_on_error: bool,
    /// When a path's overlap column is `*`, look up the overlap of the
    /// link between each pair of consecutive steps instead. This is
    /// only used to flag the derivation (`DerivedPathOverlap`); the
    /// path's own overlap column is left as `*` on re-serialization.
    pub substitute_path_overlaps: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            skip_invalid_sequence_test: false,
            store_sequences: true,
            stop_on_error: false,
            substitute_path_overlaps: false,
        }
    }
}

/// Parses GFA text into a graph plus the non-fatal diagnostics observed
/// along the way. Lines that can't be parsed at all are skipped (unless
/// `options.stop_on_error`), surfacing as an `Error`-severity diagnostic
/// rather than aborting the whole file.
pub fn parse_string(text: &str, options: ParseOptions) -> Result<(Graph, Vec<ParseDiagnostic>), GfaError> {
    let mut graph = Graph::new();
    let mut diagnostics = Vec::new();
    let version = detect_version(text);

    for (i, raw_line) in text.lines().enumerate() {
        let n = i + 1;
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let record = match GfaRecord::parse_line(line, n, version, options.skip_invalid_sequence_test) {
            Ok(r) => r,
            Err(e) => {
                if options.stop_on_error {
                    return Err(e);
                }
                diagnostics.push(ParseDiagnostic::new(n, DiagnosticCode::UnknownRecordType, line));
                continue;
            }
        };

        add_record(&mut graph, record, options, &mut diagnostics)?;
    }

    run_post_parse_checks(&graph, &mut diagnostics);
    Ok((graph, diagnostics))
}

pub fn parse_file(path: impl AsRef<FsPath>, options: ParseOptions) -> Result<(Graph, Vec<ParseDiagnostic>), GfaError> {
    let text = fs::read_to_string(path)?;
    parse_string(&text, options)
}

pub fn write_file(graph: &Graph, path: impl AsRef<FsPath>, version: GFAVersion) -> Result<(), GfaError> {
    fs::write(path, graph.to_string(version))?;
    Ok(())
}

/// Looks at the first header line (if any) to fix the version before
/// the rest of the file is parsed; segment column counts depend on it.
fn detect_version(text: &str) -> GFAVersion {
    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(rest) = line.strip_prefix("H\t") {
            for field in rest.split('\t') {
                if let Some(vn) = field.strip_prefix("VN:Z:") {
                    return GFAVersion::from(vn);
                }
            }
        }
        break;
    }
    GFAVersion::Unknown
}

fn add_record(
    graph: &mut Graph,
    record: GfaRecord,
    options: ParseOptions,
    diagnostics: &mut Vec<ParseDiagnostic>,
) -> Result<(), GfaError> {
    match record {
        GfaRecord::Header(h) => {
            let line_no = h.line_no;
            if graph.header().is_some() {
                diagnostics.push(ParseDiagnostic::new(line_no, DiagnosticCode::DuplicateHeader, h.raw.clone()));
            } else {
                graph.add_header(h)?;
            }
        }
        GfaRecord::Segment(mut s) => {
            if !options.store_sequences {
                s.sequence = "*".to_string();
            }
            if let Some(existing) = graph.segment(&s.name) {
                if !existing.is_virtual() {
                    diagnostics.push(ParseDiagnostic::new(s.line_no, DiagnosticCode::DuplicateSegment, s.name.clone()));
                    return Ok(());
                }
            }
            graph.add_segment(s)?;
        }
        GfaRecord::Link(l) => {
            if l.from_segment == l.to_segment {
                diagnostics.push(ParseDiagnostic::new(l.line_no, DiagnosticCode::SelfLink, l.from_segment.clone()));
            }
            graph.add_link(l);
        }
        GfaRecord::Containment(c) => {
            if c.container == c.contained {
                diagnostics.push(ParseDiagnostic::new(c.line_no, DiagnosticCode::SelfContainment, c.container.clone()));
            }
            graph.add_containment(c);
        }
        GfaRecord::Path(p) => {
            check_path_links(graph, &p, options.substitute_path_overlaps, diagnostics);
            graph.add_path(p)?;
        }
        GfaRecord::Fragment(f) => {
            graph.add_fragment(f);
        }
        GfaRecord::Edge(e) => {
            graph.add_edge(e);
        }
        GfaRecord::Gap(g) => {
            graph.add_gap(g);
        }
        GfaRecord::OrderedGroup(g) => {
            graph.add_ordered_group(g)?;
        }
        GfaRecord::UnorderedGroup(g) => {
            graph.add_unordered_group(g)?;
        }
    }
    Ok(())
}

/// Flags path steps with no backing link rather than rejecting them:
/// a `P` line is allowed to describe a walk that isn't reflected by any
/// `L` line in the same file, so this is advisory, not an error. When
/// `substitute_path_overlaps` is set and the path's own overlap column
/// was `*`, also flags steps whose overlap could be derived from the
/// connecting link (see `ParseOptions::substitute_path_overlaps`).
fn check_path_links(
    graph: &Graph,
    path: &crate::line::path::Path,
    substitute_path_overlaps: bool,
    diagnostics: &mut Vec<ParseDiagnostic>,
) {
    use crate::orientation::End;
    let overlaps_are_wildcard = path.overlaps.is_empty();
    for window in path.steps.windows(2) {
        let (a, b) = (&window[0], &window[1]);
        let a_end = End::leaving(a.orientation);
        let b_end = End::arriving(b.orientation);
        match graph.link_between(&a.segment, a_end, &b.segment, b_end) {
            None => diagnostics.push(ParseDiagnostic::new(
                path.line_no,
                DiagnosticCode::ImplicitLinkUsed,
                format!("{} -> {} in path {}", a.segment, b.segment, path.name),
            )),
            Some(link) if overlaps_are_wildcard && substitute_path_overlaps && link.overlap != "*" => {
                diagnostics.push(ParseDiagnostic::new(
                    path.line_no,
                    DiagnosticCode::DerivedPathOverlap,
                    format!("{} -> {} in path {}", a.segment, b.segment, path.name),
                ));
            }
            _ => {}
        }
    }
}

/// Checks GFA2 interval endpoints against the segment lengths they
/// reference. Deferred to the post-parse pass, like the path-link check,
/// because a segment's length may not be known until its (possibly
/// later) `S` line has been parsed.
fn check_interval_sentinels_for(graph: &Graph, diagnostics: &mut Vec<ParseDiagnostic>) {
    use crate::line::utils::check_interval_sentinels;
    for edge in graph.edges() {
        if let Some(seg) = graph.segment(&edge.from) {
            if !seg.is_virtual() {
                if let Err(e) = check_interval_sentinels(&edge.from_interval, seg.get_length()) {
                    diagnostics.push(ParseDiagnostic::new(edge.line_no, DiagnosticCode::IntervalSentinelMismatch, e.to_string()));
                }
            }
        }
        if let Some(seg) = graph.segment(&edge.to) {
            if !seg.is_virtual() {
                if let Err(e) = check_interval_sentinels(&edge.to_interval, seg.get_length()) {
                    diagnostics.push(ParseDiagnostic::new(edge.line_no, DiagnosticCode::IntervalSentinelMismatch, e.to_string()));
                }
            }
        }
    }
    for fragment in graph.fragments() {
        if let Some(seg) = graph.segment(&fragment.segment) {
            if !seg.is_virtual() {
                if let Err(e) = check_interval_sentinels(&fragment.segment_interval, seg.get_length()) {
                    diagnostics.push(ParseDiagnostic::new(fragment.line_no, DiagnosticCode::IntervalSentinelMismatch, e.to_string()));
                }
            }
        }
    }
}

fn run_post_parse_checks(graph: &Graph, diagnostics: &mut Vec<ParseDiagnostic>) {
    use crate::orientation::End;
    check_interval_sentinels_for(graph, diagnostics);
    for segment in graph.segments() {
        if segment.is_virtual() {
            continue;
        }
        let incoming = graph.incident(&segment.name, End::B);
        let outgoing = graph.incident(&segment.name, End::E);
        let contained = !graph.contains(&segment.name).is_empty() || !graph.contained_by(&segment.name).is_empty();
        let in_path = !graph.paths_through(&segment.name).is_empty();
        if incoming.is_empty() && outgoing.is_empty() && !contained && !in_path {
            diagnostics.push(ParseDiagnostic::new(segment.line_no, DiagnosticCode::IsolatedSegment, segment.name.clone()));
        } else if incoming.is_empty() || outgoing.is_empty() {
            diagnostics.push(ParseDiagnostic::new(segment.line_no, DiagnosticCode::DeadEndTip, segment.name.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "H\tVN:Z:1.0\nS\ta\tACGT\nS\tb\tTTTT\nL\ta\t+\tb\t+\t*\n";

    #[test]
    fn parses_a_small_graph() {
        let (graph, diagnostics) = parse_string(SAMPLE, ParseOptions::default()).unwrap();
        assert_eq!(graph.segment_count(), 2);
        assert_eq!(graph.links().count(), 1);
        // both ends of this two-segment chain are dead-end tips: "a" has no
        // incoming bridge, "b" has no outgoing one.
        assert!(diagnostics.iter().all(|d| d.code == DiagnosticCode::DeadEndTip));
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn forward_reference_becomes_virtual_then_promoted() {
        let text = "L\ta\t+\tb\t+\t*\nS\ta\tACGT\nS\tb\tTTTT\n";
        let (graph, _) = parse_string(text, ParseOptions::default()).unwrap();
        assert!(!graph.segment("a").unwrap().is_virtual());
        assert!(!graph.segment("b").unwrap().is_virtual());
    }

    #[test]
    fn isolated_segment_is_flagged() {
        let text = "S\tlonely\tACGT\n";
        let (_, diagnostics) = parse_string(text, ParseOptions::default()).unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::IsolatedSegment);
    }

    #[test]
    fn duplicate_segment_is_flagged_and_first_wins() {
        let text = "S\ta\tACGT\nS\ta\tTTTT\n";
        let (graph, diagnostics) = parse_string(text, ParseOptions::default()).unwrap();
        assert!(diagnostics.iter().any(|d| d.code == DiagnosticCode::DuplicateSegment));
        assert_eq!(graph.segment("a").unwrap().sequence, "ACGT");
    }

    #[test]
    fn self_link_is_flagged() {
        let text = "S\ta\tACGT\nL\ta\t+\ta\t-\t*\n";
        let (_, diagnostics) = parse_string(text, ParseOptions::default()).unwrap();
        assert!(diagnostics.iter().any(|d| d.code == DiagnosticCode::SelfLink));
    }

    #[test]
    fn round_trips_through_to_string() {
        let (graph, _) = parse_string(SAMPLE, ParseOptions::default()).unwrap();
        let rendered = graph.to_string(GFAVersion::V1);
        assert!(rendered.contains("S\ta\tACGT"));
        assert!(rendered.contains("L\ta\t+\tb\t+\t*"));
    }

    #[test]
    fn path_step_without_backing_link_is_flagged() {
        let text = "S\ta\tACGT\nS\tb\tTTTT\nP\tp1\ta+,b+\t*\n";
        let (_, diagnostics) = parse_string(text, ParseOptions::default()).unwrap();
        assert!(diagnostics.iter().any(|d| d.code == DiagnosticCode::ImplicitLinkUsed));
    }

    #[test]
    fn path_step_with_backing_link_is_not_flagged() {
        let text = "S\ta\tACGT\nS\tb\tTTTT\nL\ta\t+\tb\t+\t*\nP\tp1\ta+,b+\t*\n";
        let (_, diagnostics) = parse_string(text, ParseOptions::default()).unwrap();
        assert!(!diagnostics.iter().any(|d| d.code == DiagnosticCode::ImplicitLinkUsed));
    }

    #[test]
    fn edge_interval_missing_sentinel_is_flagged() {
        let text = "H\tVN:Z:2.0\nS\ta\t4\tACGT\nS\tb\t4\tTTTT\nE\t*\ta+\tb+\t0\t4\t0\t4\t*\n";
        let (_, diagnostics) = parse_string(text, ParseOptions::default()).unwrap();
        assert!(diagnostics.iter().any(|d| d.code == DiagnosticCode::IntervalSentinelMismatch));
    }

    #[test]
    fn edge_interval_with_correct_sentinel_is_not_flagged() {
        let text = "H\tVN:Z:2.0\nS\ta\t4\tACGT\nS\tb\t4\tTTTT\nE\t*\ta+\tb+\t0\t4$\t0\t4$\t*\n";
        let (_, diagnostics) = parse_string(text, ParseOptions::default()).unwrap();
        assert!(!diagnostics.iter().any(|d| d.code == DiagnosticCode::IntervalSentinelMismatch));
    }

    #[test]
    fn wildcard_path_overlap_is_derived_when_enabled() {
        let text = "S\ta\tACGT\nS\tb\tTTTT\nL\ta\t+\tb\t+\t4M\nP\tp1\ta+,b+\t*\n";
        let options = ParseOptions {
            substitute_path_overlaps: true,
            ..ParseOptions::default()
        };
        let (_, diagnostics) = parse_string(text, options).unwrap();
        assert!(diagnostics.iter().any(|d| d.code == DiagnosticCode::DerivedPathOverlap));
    }

    #[test]
    fn wildcard_path_overlap_is_not_derived_by_default() {
        let text = "S\ta\tACGT\nS\tb\tTTTT\nL\ta\t+\tb\t+\t4M\nP\tp1\ta+,b+\t*\n";
        let (_, diagnostics) = parse_string(text, ParseOptions::default()).unwrap();
        assert!(!diagnostics.iter().any(|d| d.code == DiagnosticCode::DerivedPathOverlap));
    }
}
