//! This module holds functionality specific to parsing cppcheck's text output
//! and mapping each finding onto a source browser URL.
//!
//! Input lines follow one of two shapes:
//!
//! ```text
//! [local_path:line_number]: (level) finding
//! [first_path:first_line] -> [last_path:last_line]: (level) finding
//! ```
//!
//! Anything else (other than blank lines) is kept verbatim for a trailing
//! warnings block instead of being dropped.

use std::collections::VecDeque;

/// The fixed base URL of the source browser all links point at.
pub const BASE_URL: &str = "https://bitbucket.example.com/";

/// Folder memo sentinel that no real path starts with.
const NOWHERE_LAND: &str = "NOWHERE_LAND";

/// An enum to describe the severity categories cppcheck attaches to findings.
///
/// Levels outside the known vocabulary fall back to [`Severity::Unknown`],
/// which renders with the `sp-nn` badge but keeps the original level text as
/// the visible label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Severity {
    Error,
    Information,
    Style,
    Performance,
    Portability,
    Warning,
    PerformanceInconclusive,
    StyleInconclusive,
    Unknown(String),
}

impl Severity {
    fn from_level(level: &str) -> Severity {
        match level {
            "error" => Severity::Error,
            "information" => Severity::Information,
            "style" => Severity::Style,
            "performance" => Severity::Performance,
            "portability" => Severity::Portability,
            "warning" => Severity::Warning,
            "performance, inconclusive" => Severity::PerformanceInconclusive,
            "style, inconclusive" => Severity::StyleInconclusive,
            other => Severity::Unknown(other.to_string()),
        }
    }

    /// The CSS class of the severity badge (see the page shell's stylesheet).
    fn css_class(&self) -> &'static str {
        match self {
            Severity::Error => "sp-err",
            Severity::Information => "sp-info",
            Severity::Style => "sp-style",
            Severity::Performance => "sp-perf",
            Severity::Portability => "sp-port",
            Severity::Warning => "sp-warn",
            Severity::PerformanceInconclusive => "sp-perf-unsure",
            Severity::StyleInconclusive => "sp-style-unsure",
            Severity::Unknown(_) => "sp-nn",
        }
    }

    /// The visible label of the badge.
    fn label(&self) -> &str {
        match self {
            Severity::Error => "error",
            Severity::Information => "information",
            Severity::Style => "style",
            Severity::Performance => "performance",
            Severity::Portability => "portability",
            Severity::Warning => "warning",
            Severity::PerformanceInconclusive => "performance, inconclusive",
            Severity::StyleInconclusive => "style, inconclusive",
            Severity::Unknown(level) => level,
        }
    }

    fn badge(&self) -> String {
        format!(
            "<span class=\"{}\">{}</span>",
            self.css_class(),
            self.label()
        )
    }
}

/// One source location as addressed by a finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// The file's path as printed by cppcheck (relative to the repository root).
    pub path: String,

    /// The line number, kept as text.
    ///
    /// It is only ever interpolated into a URL anchor, so there is no reason
    /// to parse it as an integer.
    pub line: String,
}

/// A structure that represents a single record parsed from cppcheck's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// A finding anchored at one location.
    Single {
        location: Location,
        severity: Severity,
        message: String,
    },

    /// A finding relating two locations, joined by `->` in the input.
    Relation {
        left: Location,
        right: Location,
        severity: Severity,
        message: String,
    },
}

/// Error that occurs when a line follows neither record shape.
///
/// These never escape [`MappedFindings`]; the offending raw line is kept for
/// the trailing warnings block instead.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("no `]: (` delimiter between address and level")]
    MissingAddress,
    #[error("no `:` between path and line number")]
    MissingLineNumber,
    #[error("no `] -> [` join inside a relation address")]
    MissingRelationJoin,
    #[error("no `) ` delimiter between level and finding text")]
    MissingLevel,
}

/// Parse one non-blank record into a [`Record`].
///
/// Every step is a hard split on the first occurrence of a fixed delimiter.
/// The exact split points are load-bearing: the level is whatever precedes
/// the first `") "` of the rest, so a level text containing `") "` truncates
/// there and shifts the remainder into the message.
pub fn parse_record(record: &str) -> Result<Record, RecordError> {
    // Most records follow the single line pattern:
    // [local_path:line_number]: (level) finding
    let (address_part, rest) = record
        .split_once("]: (")
        .ok_or(RecordError::MissingAddress)?;
    let address = address_part.trim_start_matches('[');
    let (local_path, line_number) = address
        .split_once(':')
        .ok_or(RecordError::MissingLineNumber)?;

    if line_number.contains('[') {
        // We have a range, back off:
        // [first_path:first_line] -> [last_path:last_line]: (level) finding
        let (left, right) = address
            .split_once("] -> [")
            .ok_or(RecordError::MissingRelationJoin)?;
        let (left_path, left_number) =
            left.split_once(':').ok_or(RecordError::MissingLineNumber)?;
        let (right_path, right_number) = right
            .split_once(':')
            .ok_or(RecordError::MissingLineNumber)?;
        let (level, finding) = rest.split_once(") ").ok_or(RecordError::MissingLevel)?;
        return Ok(Record::Relation {
            left: Location {
                path: left_path.to_string(),
                line: left_number.to_string(),
            },
            right: Location {
                path: right_path.to_string(),
                line: right_number.to_string(),
            },
            severity: Severity::from_level(level),
            message: finding.to_string(),
        });
    }

    let (level, finding) = rest.split_once(") ").ok_or(RecordError::MissingLevel)?;
    Ok(Record::Single {
        location: Location {
            path: local_path.to_string(),
            line: line_number.to_string(),
        },
        severity: Severity::from_level(level),
        message: finding.to_string(),
    })
}

/// The addressing parameters every link is built from.
#[derive(Debug, Clone)]
pub struct SourceTarget {
    /// The project key in the source browser.
    pub project: String,

    /// The repository slug within the project.
    pub repo: String,

    /// The `at=` query value; expected pre-encoded, eg. `refs%2Fheads%2Fmain`.
    pub commit: String,
}

impl SourceTarget {
    /// Build the browse URL addressing `location`.
    fn browse_url(&self, location: &Location) -> String {
        format!(
            "{BASE_URL}projects/{}/repos/{}/browse/{}?at={}#{}",
            self.project, self.repo, location.path, self.commit, location.line
        )
    }

    /// Wrap the browse URL as a bracketed anchor labelled `display`.
    fn bracket_link(&self, location: &Location, display: &str) -> String {
        format!(
            "[<a href=\"{}\" class=\"no-decor\">{}</a>]",
            self.browse_url(location),
            display
        )
    }
}

/// A lazy, single-pass stream of HTML fragments mapped from cppcheck records.
///
/// Yields a `<h2>` heading whenever a record enters a new source folder, one
/// `<p class="finding">` per well-formed record, and (once the input is
/// exhausted) at most one trailing block holding every line that did not
/// parse. A record that fails mid-parse produces no output at all.
pub struct MappedFindings<I> {
    lines: I,
    target: SourceTarget,
    folder_memo: String,
    job_warnings: Vec<String>,
    queued: VecDeque<String>,
    drained: bool,
}

/// Transform the findings read from `lines` into HTML fragments.
pub fn map_findings<I>(lines: I, target: SourceTarget) -> MappedFindings<I::IntoIter>
where
    I: IntoIterator<Item = String>,
{
    MappedFindings {
        lines: lines.into_iter(),
        target,
        folder_memo: NOWHERE_LAND.to_string(),
        job_warnings: Vec::new(),
        queued: VecDeque::new(),
        drained: false,
    }
}

impl<I> MappedFindings<I> {
    /// Produce a section heading when `path` leaves the memoized folder.
    ///
    /// The check is a plain prefix test on the raw path text and the memo
    /// keeps its trailing slash. A path without any directory component
    /// memoizes `/`, so such records re-trigger the heading every time.
    fn folder_heading(&mut self, path: &str) -> Option<String> {
        if path.starts_with(&self.folder_memo) {
            return None;
        }
        let mut segments: Vec<&str> = path.split('/').collect();
        segments.pop();
        self.folder_memo = format!("{}/", segments.join("/"));
        Some(format!("<h2>{}</h2>", self.folder_memo))
    }

    /// Display form of a location: the path with the folder memo removed,
    /// glued to the line number.
    fn display(&self, location: &Location) -> String {
        format!(
            "{}:{}",
            location.path.replace(&self.folder_memo, ""),
            location.line
        )
    }

    fn queue_record(&mut self, record: Record) {
        match record {
            Record::Single {
                location,
                severity,
                message,
            } => {
                if let Some(heading) = self.folder_heading(&location.path) {
                    self.queued.push_back(heading);
                }
                let link = self.target.bracket_link(&location, &self.display(&location));
                self.queued.push_back(format!(
                    "<p class=\"finding\"><span class=\"ff-075\">{}: </span>{}<span class=\"ff-075\"> {}</span></p>",
                    link,
                    severity.badge(),
                    message
                ));
            }
            Record::Relation {
                left,
                right,
                severity,
                message,
            } => {
                if let Some(heading) = self.folder_heading(&left.path) {
                    self.queued.push_back(heading);
                }
                let left_link = self.target.bracket_link(&left, &self.display(&left));
                let right_link = self.target.bracket_link(&right, &self.display(&right));
                self.queued.push_back(format!(
                    "<p class=\"finding\"><span class=\"ff-075\">{} -&gt; {}: </span>{}<span class=\"ff-075\"> {}</span></p>",
                    left_link,
                    right_link,
                    severity.badge(),
                    message
                ));
            }
        }
    }
}

impl<I> Iterator for MappedFindings<I>
where
    I: Iterator<Item = String>,
{
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if let Some(fragment) = self.queued.pop_front() {
                return Some(fragment);
            }
            let Some(line) = self.lines.next() else {
                break;
            };
            let record = line.trim();
            if record.is_empty() {
                continue;
            }
            match parse_record(record) {
                Ok(parsed) => self.queue_record(parsed),
                Err(err) => {
                    log::debug!("not a finding record ({err}): {record}");
                    self.job_warnings.push(record.to_string());
                }
            }
        }
        if !self.drained {
            self.drained = true;
            if !self.job_warnings.is_empty() {
                return Some(format!(
                    "<h2>Warnings from Job Execution</h2><pre>{}</pre>",
                    self.job_warnings.join("\n")
                ));
            }
        }
        None
    }
}

#[cfg(test)]
mod test {
    use super::{map_findings, parse_record, Record, RecordError, Severity, SourceTarget};

    fn target() -> SourceTarget {
        SourceTarget {
            project: "P".to_string(),
            repo: "R".to_string(),
            commit: "C".to_string(),
        }
    }

    fn collect(lines: &[&str]) -> Vec<String> {
        map_findings(lines.iter().map(|line| line.to_string()), target()).collect()
    }

    #[test]
    fn single_record_fragments() {
        let fragments = collect(&["[src/a.c:10]: (error) null pointer dereference"]);
        assert_eq!(
            fragments,
            vec![
                "<h2>src/</h2>".to_string(),
                concat!(
                    "<p class=\"finding\"><span class=\"ff-075\">",
                    "[<a href=\"https://bitbucket.example.com/projects/P/repos/R/browse/src/a.c?at=C#10\" class=\"no-decor\">a.c:10</a>]: ",
                    "</span><span class=\"sp-err\">error</span>",
                    "<span class=\"ff-075\"> null pointer dereference</span></p>"
                )
                .to_string(),
            ]
        );
    }

    #[test]
    fn relation_record_fragments() {
        let fragments = collect(&["[src/a.c:5] -> [src/b.c:8]: (warning) possible leak"]);
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0], "<h2>src/</h2>");
        let paragraph = &fragments[1];
        assert!(paragraph.contains(
            "href=\"https://bitbucket.example.com/projects/P/repos/R/browse/src/a.c?at=C#5\""
        ));
        assert!(paragraph.contains(
            "href=\"https://bitbucket.example.com/projects/P/repos/R/browse/src/b.c?at=C#8\""
        ));
        assert!(paragraph.contains(">a.c:5</a>] -&gt; [<a href="));
        assert!(paragraph.contains(">b.c:8</a>]: </span>"));
        assert!(paragraph.contains("<span class=\"sp-warn\">warning</span>"));
        assert!(paragraph.ends_with("<span class=\"ff-075\"> possible leak</span></p>"));
    }

    #[test]
    fn folder_heading_once_per_folder() {
        let fragments = collect(&[
            "[a/b/x.c:1]: (style) one",
            "[a/b/y.c:2]: (style) two",
            "[a/c/z.c:3]: (style) three",
        ]);
        let headings: Vec<&String> = fragments
            .iter()
            .filter(|fragment| fragment.starts_with("<h2>"))
            .collect();
        assert_eq!(headings, vec!["<h2>a/b/</h2>", "<h2>a/c/</h2>"]);
        assert_eq!(fragments.len(), 5);
    }

    #[test]
    fn bare_filename_restarts_heading() {
        let fragments = collect(&["[a.c:3]: (style) x", "[b.c:4]: (style) y"]);
        assert_eq!(fragments[0], "<h2>/</h2>");
        assert_eq!(fragments[2], "<h2>/</h2>");
        assert!(fragments[1].contains(">a.c:3</a>"));
        assert!(fragments[3].contains(">b.c:4</a>"));
    }

    #[test]
    fn deeper_path_in_same_folder_keeps_heading() {
        let fragments = collect(&["[a/x.c:1]: (style) one", "[a/b/y.c:2]: (style) two"]);
        // `a/b/y.c` still starts with the memo `a/`, so no second heading;
        // the display keeps the remainder below the memoized folder.
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[0], "<h2>a/</h2>");
        assert!(fragments[2].contains(">b/y.c:2</a>"));
    }

    #[test]
    fn inconclusive_levels_have_their_own_badges() {
        let fragments = collect(&[
            "[a/x.c:1]: (performance, inconclusive) slow",
            "[a/y.c:2]: (style, inconclusive) odd",
        ]);
        assert!(fragments[1]
            .contains("<span class=\"sp-perf-unsure\">performance, inconclusive</span>"));
        assert!(fragments[2].contains("<span class=\"sp-style-unsure\">style, inconclusive</span>"));
    }

    #[test]
    fn unknown_level_keeps_text_with_fallback_badge() {
        let fragments = collect(&["[a/x.c:1]: (debug) whatever"]);
        assert!(fragments[1].contains("<span class=\"sp-nn\">debug</span>"));
    }

    #[test]
    fn blank_lines_produce_nothing() {
        assert!(collect(&["", "   ", "\t"]).is_empty());
    }

    #[test]
    fn noise_collected_in_order() {
        let fragments = collect(&[
            "Checking src/a.c ...",
            "[src/a.c:10]: (error) null pointer dereference",
            "cppcheck: out of memory",
        ]);
        assert_eq!(
            fragments.last().map(String::as_str),
            Some(concat!(
                "<h2>Warnings from Job Execution</h2>",
                "<pre>Checking src/a.c ...\ncppcheck: out of memory</pre>"
            ))
        );
        assert_eq!(fragments.len(), 3);
    }

    #[test]
    fn no_warnings_block_when_all_lines_parse() {
        let fragments = collect(&["[src/a.c:10]: (error) boom"]);
        assert!(!fragments
            .iter()
            .any(|fragment| fragment.contains("Warnings from Job Execution")));
    }

    #[test]
    fn failed_level_split_emits_no_partial_output() {
        // The level delimiter is missing, so the whole line lands in the
        // bucket and no folder heading leaks out for it.
        let fragments = collect(&["[src/a.c:10]: (error)boom", "[src/b.c:2]: (style) fine"]);
        assert_eq!(fragments[0], "<h2>src/</h2>");
        assert!(fragments[1].contains(">b.c:2</a>"));
        assert_eq!(
            fragments[2],
            "<h2>Warnings from Job Execution</h2><pre>[src/a.c:10]: (error)boom</pre>"
        );
    }

    #[test]
    fn message_keeps_text_after_first_level_delimiter() {
        let fragments = collect(&["[a/x.c:1]: (style) cast to (int) is fine"]);
        assert!(fragments[1].contains("<span class=\"ff-075\"> cast to (int) is fine</span>"));
    }

    #[test]
    fn parse_record_classifies_failures() {
        assert!(matches!(
            parse_record("no delimiters at all"),
            Err(RecordError::MissingAddress)
        ));
        assert!(matches!(
            parse_record("[pathonly]: (error) msg"),
            Err(RecordError::MissingLineNumber)
        ));
        assert!(matches!(
            parse_record("[a:1[b]: (error) msg"),
            Err(RecordError::MissingRelationJoin)
        ));
        assert!(matches!(
            parse_record("[a:1]: (error)msg"),
            Err(RecordError::MissingLevel)
        ));
    }

    #[test]
    fn parse_record_relation_shape() {
        let record = parse_record("[src/a.c:5] -> [src/b.c:8]: (warning) possible leak")
            .expect("relation should parse");
        match record {
            Record::Relation {
                left,
                right,
                severity,
                message,
            } => {
                assert_eq!(left.path, "src/a.c");
                assert_eq!(left.line, "5");
                assert_eq!(right.path, "src/b.c");
                assert_eq!(right.line, "8");
                assert_eq!(severity, Severity::Warning);
                assert_eq!(message, "possible leak");
            }
            Record::Single { .. } => panic!("parsed as a single-location record"),
        }
    }

    #[test]
    fn line_number_stays_text() {
        let record = parse_record("[src/a.c:10ffe]: (error) odd anchor").expect("should parse");
        match record {
            Record::Single { location, .. } => assert_eq!(location.line, "10ffe"),
            Record::Relation { .. } => panic!("parsed as a relation record"),
        }
    }
}
