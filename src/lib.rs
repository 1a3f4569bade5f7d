#![doc = include_str!("../README.md")]

pub mod datatype;
pub mod edit;
pub mod error;
pub mod gfa;
pub mod graph;
pub mod line;
mod macros;
pub mod optional_field;
pub mod orientation;
pub mod parser;
pub mod traverse;

#[cfg(test)]
mod scenarios {
    use crate::edit::multiply_segment;
    use crate::gfa::GFAVersion;
    use crate::orientation::End;
    use crate::parser::{parse_string, ParseOptions};
    use crate::traverse::{is_cut_link, merge_linear_paths};

    #[test]
    fn trivial_round_trip() {
        let text = "H\tVN:Z:1.0\nS\tA\tACGT\tLN:i:4\nS\tB\tTT\nL\tA\t+\tB\t+\t2M\n";
        let (graph, _) = parse_string(text, ParseOptions::default()).unwrap();
        assert_eq!(graph.segment("A").unwrap().get_length(), 4);
        assert_eq!(graph.incident("A", End::E).len(), 1);
        let rendered = graph.to_string(GFAVersion::V1);
        assert!(rendered.contains("S\tA\tACGT\tLN:i:4"));
        assert!(rendered.contains("S\tB\tTT\tLN:i:2"));
        assert!(rendered.contains("L\tA\t+\tB\t+\t2M"));
    }

    #[test]
    fn delete_cascade() {
        let text = "H\tVN:Z:1.0\nS\tA\tACGT\tLN:i:4\nS\tB\tTT\nL\tA\t+\tB\t+\t2M\n";
        let (mut graph, _) = parse_string(text, ParseOptions::default()).unwrap();
        graph.delete_segment("A").unwrap();
        assert_eq!(graph.segment_count(), 1);
        assert_eq!(graph.links().count(), 0);
    }

    #[test]
    fn multiply_doubles_segment_and_distributes_links() {
        let text = "H\tVN:Z:1.0\nS\tX\tACGT\tLN:i:100\tRC:i:50\nS\tN1\t*\nS\tN2\t*\nL\tX\t+\tN1\t+\t*\nL\tX\t+\tN2\t+\t*\n";
        let (mut graph, _) = parse_string(text, ParseOptions::default()).unwrap();
        let copies = multiply_segment(&mut graph, "X", 2, None, &[]).unwrap();
        assert_eq!(copies, vec!["Xa".to_string()]);
        assert!(graph.segment("X").is_some());
        assert!(graph.segment("Xa").is_some());
        assert_eq!(graph.segment("X").unwrap().tags.get::<i32>("RC"), Some(25));
        assert_eq!(graph.segment("Xa").unwrap().tags.get::<i32>("RC"), Some(25));
        assert_eq!(graph.links().count(), 4);
        let neighbors: std::collections::HashSet<String> = graph
            .links()
            .flat_map(|l| [l.from_segment.clone(), l.to_segment.clone()])
            .filter(|n| n != "X" && n != "Xa")
            .collect();
        assert_eq!(neighbors, ["N1", "N2"].into_iter().map(String::from).collect());
    }

    #[test]
    fn linear_merge_concatenates_chain() {
        let text = concat!(
            "H\tVN:Z:1.0\n",
            "S\tA\tACGTAC\tLN:i:6\n",
            "S\tB\tGTACGG\tLN:i:6\n",
            "S\tC\tCGGAAA\tLN:i:6\n",
            "L\tA\t+\tB\t+\t2M\n",
            "L\tB\t+\tC\t+\t2M\n",
        );
        let (mut graph, _) = parse_string(text, ParseOptions::default()).unwrap();
        let merged = merge_linear_paths(&mut graph, false).unwrap();
        assert_eq!(merged.len(), 1);
        assert!(graph.segment("A").is_none());
        assert!(graph.segment("B").is_none());
        assert!(graph.segment("C").is_none());
        let only = graph.segment(&merged[0]).unwrap();
        // Per-step overlap trimming of 2 characters from the front of each
        // non-first element, concatenated: "ACGTAC" + "ACGG" + "GAAA".
        assert_eq!(only.sequence, "ACGTACACGGGAAA");
        assert_eq!(only.get_length(), only.sequence.len() as i64);
    }

    #[test]
    fn cut_link_between_two_triangles() {
        let text = concat!(
            "H\tVN:Z:1.0\n",
            "L\ta1\t+\ta2\t+\t*\n",
            "L\ta2\t+\ta3\t+\t*\n",
            "L\ta3\t+\ta1\t+\t*\n",
            "L\ta1\t+\tb1\t+\t*\n",
            "L\tb1\t+\tb2\t+\t*\n",
            "L\tb2\t+\tb3\t+\t*\n",
            "L\tb3\t+\tb1\t+\t*\n",
        );
        let (graph, _) = parse_string(text, ParseOptions::default()).unwrap();
        use crate::line::record::GfaRecord;
        let link_to = |from: &str, to: &str| -> usize {
            graph
                .incident(from, End::E)
                .iter()
                .copied()
                .find(|&i| graph.record(i).and_then(GfaRecord::as_link).unwrap().to_segment == to)
                .unwrap()
        };
        assert!(is_cut_link(&graph, link_to("a1", "b1")).unwrap());
        assert!(!is_cut_link(&graph, link_to("a1", "a2")).unwrap());
    }

    #[test]
    fn forward_reference_resolves_both_directions() {
        let text = "L\ta\t+\tb\t+\t*\nS\ta\tACGT\nS\tb\tTTTT\n";
        let (graph, _) = parse_string(text, ParseOptions::default()).unwrap();
        assert!(!graph.segment("a").unwrap().is_virtual());
        assert!(!graph.segment("b").unwrap().is_virtual());
        assert_eq!(graph.incident("a", End::E).len(), 1);
        assert_eq!(graph.incident("b", End::B).len(), 1);
        assert_eq!(graph.incident("a", End::E), graph.incident("b", End::B));
    }
}
