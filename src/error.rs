//! The closed error taxonomy used across the crate, plus the non-fatal
//! parse diagnostic log that sits alongside it.

use owo_colors::{AnsiColors, OwoColorize};
use std::fmt::Write as _;
use thiserror::Error;

/// Hard failures returned by fallible library entry points.
///
/// This is a closed set: every fallible operation in the crate fails with
/// one of these variants, never a bespoke ad-hoc error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GfaError {
    #[error("format error at line {line}: {offender} ({detail})")]
    FormatError {
        line: usize,
        offender: String,
        detail: String,
    },

    #[error("type error: tag {tag} on record {record_type} expected type {expected}, got {actual}")]
    TypeError {
        record_type: char,
        tag: String,
        expected: String,
        actual: String,
    },

    #[error("not found: {what}")]
    NotFoundError { what: String },

    #[error("not unique: {identifier} already exists")]
    NotUniqueError { identifier: String },

    #[error("inconsistency: {detail}")]
    InconsistencyError { detail: String },

    #[error("version error: {field} is only valid in GFA{version}")]
    VersionError { field: String, version: String },

    #[error("argument error: {detail}")]
    ArgumentError { detail: String },

    #[error("runtime error: {detail}")]
    RuntimeError { detail: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl GfaError {
    pub fn not_found(what: impl Into<String>) -> Self {
        GfaError::NotFoundError { what: what.into() }
    }

    pub fn not_unique(identifier: impl Into<String>) -> Self {
        GfaError::NotUniqueError {
            identifier: identifier.into(),
        }
    }

    pub fn argument(detail: impl Into<String>) -> Self {
        GfaError::ArgumentError {
            detail: detail.into(),
        }
    }

    pub fn runtime(detail: impl Into<String>) -> Self {
        GfaError::RuntimeError {
            detail: detail.into(),
        }
    }

    pub fn inconsistency(detail: impl Into<String>) -> Self {
        GfaError::InconsistencyError {
            detail: detail.into(),
        }
    }

    pub fn format(line: usize, offender: impl Into<String>, detail: impl Into<String>) -> Self {
        GfaError::FormatError {
            line,
            offender: offender.into(),
            detail: detail.into(),
        }
    }
}

impl From<std::io::Error> for GfaError {
    fn from(e: std::io::Error) -> Self {
        GfaError::Io(e.to_string())
    }
}

/// Severity ladder for non-fatal parse-time observations.
///
/// - Info: something to consider
/// - Warn: something that's not ideal
/// - Severe: something that could break other tools, but can still be parsed
/// - Error: something that cannot be parsed; the offending line is skipped
/// - Fatal: the whole file is unparseable; escalated into a [`GfaError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    Info,
    Warn,
    Severe,
    Error,
    Fatal,
}

impl DiagnosticSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticSeverity::Info => "*",
            DiagnosticSeverity::Warn => "?",
            DiagnosticSeverity::Severe => "#",
            DiagnosticSeverity::Error => "!",
            DiagnosticSeverity::Fatal => "X",
        }
    }

    pub fn to_char(&self) -> char {
        match self {
            DiagnosticSeverity::Info => 'i',
            DiagnosticSeverity::Warn => 'w',
            DiagnosticSeverity::Severe => 's',
            DiagnosticSeverity::Error => 'e',
            DiagnosticSeverity::Fatal => 'f',
        }
    }

    fn colours(&self) -> (AnsiColors, AnsiColors) {
        use DiagnosticSeverity::*;
        match self {
            Info => (AnsiColors::Blue, AnsiColors::BrightBlue),
            Warn => (AnsiColors::Yellow, AnsiColors::BrightYellow),
            Severe => (AnsiColors::Red, AnsiColors::BrightRed),
            Error => (AnsiColors::BrightRed, AnsiColors::Red),
            Fatal => (AnsiColors::Magenta, AnsiColors::BrightMagenta),
        }
    }

    fn header(&self) -> String {
        let (fg, bg) = self.colours();
        format!("[{}]", self.as_str()).color(fg).on_color(bg).to_string()
    }

    fn body<T: AsRef<str>>(&self, text: T) -> String {
        let (fg, _) = self.colours();
        text.as_ref().color(fg).to_string()
    }
}

/// Closed set of non-fatal conditions observed while parsing a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCode {
    DuplicateHeader,
    HeaderNotFirstLine,
    SegmentLengthMismatch,
    RedundantSegmentLengthTag,
    DuplicateOptionalField,
    DuplicateSegment,
    IsolatedSegment,
    DeadEndTip,
    SelfLink,
    SelfContainment,
    UnknownRecordType,
    DerivedPathOverlap,
    ImplicitLinkUsed,
    IntervalSentinelMismatch,
}

impl DiagnosticCode {
    fn severity(&self) -> DiagnosticSeverity {
        use DiagnosticCode::*;
        match self {
            DuplicateHeader => DiagnosticSeverity::Warn,
            HeaderNotFirstLine => DiagnosticSeverity::Warn,
            SegmentLengthMismatch => DiagnosticSeverity::Severe,
            RedundantSegmentLengthTag => DiagnosticSeverity::Warn,
            DuplicateOptionalField => DiagnosticSeverity::Severe,
            DuplicateSegment => DiagnosticSeverity::Severe,
            IsolatedSegment => DiagnosticSeverity::Info,
            DeadEndTip => DiagnosticSeverity::Info,
            SelfLink => DiagnosticSeverity::Warn,
            SelfContainment => DiagnosticSeverity::Warn,
            UnknownRecordType => DiagnosticSeverity::Info,
            DerivedPathOverlap => DiagnosticSeverity::Info,
            ImplicitLinkUsed => DiagnosticSeverity::Warn,
            IntervalSentinelMismatch => DiagnosticSeverity::Severe,
        }
    }

    fn message(&self) -> &'static str {
        use DiagnosticCode::*;
        match self {
            DuplicateHeader => "duplicate header line; only the first is authoritative",
            HeaderNotFirstLine => "header should ideally be on the first line",
            SegmentLengthMismatch => "LN tag does not match the length of the sequence",
            RedundantSegmentLengthTag => "LN tag is redundant alongside the GFA2 length column",
            DuplicateOptionalField => "duplicate tag on the same record; last occurrence wins",
            DuplicateSegment => "segment name already used by an earlier S line; this record is dropped, the first wins",
            IsolatedSegment => "segment is not referenced by any link, containment, edge or gap",
            DeadEndTip => "segment is missing an incoming or outgoing bridge (or both)",
            SelfLink => "link connects a segment to itself",
            SelfContainment => "a segment cannot contain itself",
            UnknownRecordType => "unrecognized record type; line was skipped",
            DerivedPathOverlap => "path overlap column was * and was derived from a parallel link",
            ImplicitLinkUsed => "consecutive path steps have no matching link; the path implies connectivity no L line states",
            IntervalSentinelMismatch => "edge or fragment interval's $ sentinel doesn't match the referenced segment's length",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParseDiagnostic {
    pub line: usize,
    pub code: DiagnosticCode,
    pub offender: String,
}

impl ParseDiagnostic {
    pub fn new(line: usize, code: DiagnosticCode, offender: impl Into<String>) -> Self {
        Self {
            line,
            code,
            offender: offender.into(),
        }
    }

    pub fn severity(&self) -> DiagnosticSeverity {
        self.code.severity()
    }

    pub fn formatted(&self) -> String {
        let severity = self.severity();
        let header = severity.header();
        let code = severity.body(format!("[gfa-core] {:?}", self.code));
        let context = severity.body(format!(
            "while processing {}{} on line {}",
            self.offender.chars().take(256).collect::<String>(),
            if self.offender.len() > 256 { "..." } else { "" },
            self.line
        ));
        let msg = severity.body(severity.message_owned(self.code));

        let mut out = String::new();
        writeln!(&mut out, "{} {}", header.bold(), code.bold()).unwrap();
        writeln!(&mut out, "{msg}").unwrap();
        writeln!(&mut out, "{}", context.italic()).unwrap();
        writeln!(&mut out).unwrap();
        out
    }

    pub fn print(&self) {
        print!("{}", self.formatted());
    }
}

impl DiagnosticSeverity {
    fn message_owned(&self, code: DiagnosticCode) -> String {
        code.message().to_string()
    }
}

impl std::fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.formatted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_symbols() {
        assert_eq!(DiagnosticSeverity::Info.as_str(), "*");
        assert_eq!(DiagnosticSeverity::Fatal.as_str(), "X");
    }

    #[test]
    fn diagnostic_formats_with_context() {
        let d = ParseDiagnostic::new(4, DiagnosticCode::DeadEndTip, "s1");
        let out = d.formatted();
        assert!(out.contains("[gfa-core]"));
        assert!(out.contains("line 4"));
    }

    #[test]
    fn gfa_error_display() {
        let e = GfaError::not_found("segment s1");
        assert_eq!(e.to_string(), "not found: segment s1");
    }
}
