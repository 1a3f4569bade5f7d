use std::process::ExitCode;

use clap::Parser;
use gfa_core::error::DiagnosticSeverity;
use gfa_core::parser::{parse_file, ParseOptions};
use owo_colors::OwoColorize;

/// A thin command-line front end for the gfa-core library: parses a GFA
/// file, reports diagnostics, and prints basic graph statistics.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// path to the GFA file
    #[arg(required = true, index = 1)]
    path: String,

    /// don't reject segments whose sequence has non-printable characters
    #[arg(long, default_value_t = false)]
    skip_invalid_sequence_test: bool,

    /// don't keep segment sequences in memory, only topology
    #[arg(long, default_value_t = false)]
    discard_sequences: bool,

    /// abort on the first unparseable line instead of skipping it
    #[arg(long, default_value_t = false)]
    stop_on_error: bool,

    /// when a path's overlap column is omitted, don't attempt to derive it
    /// from the link between each pair of steps
    #[arg(long, default_value_t = false)]
    never_derive_path_overlaps: bool,

    /// filter diagnostics by severity (i: info, w: warn, s: severe, e: error, f: fatal)
    ///
    /// example: `-f iw` suppresses info and warning diagnostics
    #[arg(short, long, default_value_t = String::from(""))]
    filter_severity: String,

    /// don't print diagnostics, only the final summary
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
}

fn print_record_count(name: &str, count: usize) {
    if count > 0 {
        println!("{name}: {count}");
    }
}

use si_scale::scale_fn;
scale_fn!(base_pairs,
    base: B1000,
    constraint: UnitAndAbove,
    mantissa_fmt: "{:.2}",
    groupings: '_',
    unit: "bp",
    doc: "si base pairs"
);

fn main() -> ExitCode {
    let args = Args::parse();

    let options = ParseOptions {
        skip_invalid_sequence_test: args.skip_invalid_sequence_test,
        store_sequences: !args.discard_sequences,
        stop_on_error: args.stop_on_error,
        substitute_path_overlaps: !args.never_derive_path_overlaps,
    };

    let (graph, diagnostics) = match parse_file(&args.path, options) {
        Ok(result) => result,
        Err(e) => {
            println!("{}", format!("[!] [gfa-core] failed to parse GFA file: {e}").on_red().bold());
            return ExitCode::FAILURE;
        }
    };

    if !args.quiet {
        for diagnostic in &diagnostics {
            if args.filter_severity.contains(diagnostic.severity().to_char()) {
                continue;
            }
            diagnostic.print();
        }
    }

    println!("{}", "[*] [gfa-core] successfully parsed GFA file".to_string().on_green().bold());

    let counts = diagnostics.iter().fold((0, 0, 0, 0, 0), |(fatal, error, severe, warning, info), d| match d.severity() {
        DiagnosticSeverity::Fatal => (fatal + 1, error, severe, warning, info),
        DiagnosticSeverity::Error => (fatal, error + 1, severe, warning, info),
        DiagnosticSeverity::Severe => (fatal, error, severe + 1, warning, info),
        DiagnosticSeverity::Warn => (fatal, error, severe, warning + 1, info),
        DiagnosticSeverity::Info => (fatal, error, severe, warning, info + 1),
    });

    println!("{}", format!("[X] fatal: {}", counts.0).magenta());
    println!("{}", format!("[!] error: {}", counts.1).bright_red());
    println!("{}", format!("[#] severe: {}", counts.2).red());
    println!("{}", format!("[?] warning: {}", counts.3).yellow());
    println!("{}", format!("[*] info: {}", counts.4).blue());

    println!();

    print_record_count("segments", graph.segment_count());
    print_record_count("links", graph.links().count());
    print_record_count("containments", graph.containments().count());
    print_record_count("paths", graph.paths().count());
    print_record_count("edges", graph.edges().count());
    print_record_count("fragments", graph.fragments().count());
    print_record_count("gaps", graph.gaps().count());
    print_record_count("groups", graph.ordered_groups().count() + graph.unordered_groups().count());

    println!();

    let total_length: i64 = graph.segments().filter(|s| !s.is_virtual()).map(|s| s.get_length()).sum();
    println!("length: {total_length} bp ({})", base_pairs(total_length as f64));

    ExitCode::SUCCESS
}
