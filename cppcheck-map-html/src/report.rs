//! This module holds the HTML page shell wrapped around the mapped findings.

use std::io::Write;

// non-std crates
use chrono::Utc;

// project specific modules/crates
use crate::cli::Cli;
use crate::findings::{map_findings, SourceTarget};

/// Everything of the page up to (and including) the report's main heading.
///
/// The stylesheet carries one `sp-*` class per severity badge and the
/// `ff-*` fixed-font classes the finding paragraphs use.
pub const PAGE_PREFIX: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Static Analysis</title>
  <meta name="description" content="Static code analysis.">
  <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>
      html {font-family: Verdana, Arial, sans-serif;}
      a {color: #0c2d82;}
      b {font-weight: 600;}
      h1 {font-weight: 300; text-transform: capitalize;}
      h2 {font-weight: 200;}
      li {line-height: 1.5;}
      table {table-layout: fixed; width: 150%; background-color: #ffffff; margin: 20px; border-collapse: collapse;}
      td, th {word-wrap: break-word; border: solid 1px #666666;}
      th {background-color: #0c2d82; color: #ffffff; font-size: 75%; font-weight: 300;}
      td {vertical-align: top; font-size: 67%; padding: 2px;}
      table caption {font-size: 120%; margin-bottom: 20px;}
      tbody tr:nth-child(odd) {background-color: #dddddd;}
      tbody tr:nth-child(even) {background-color: #ffffff;}
      .no-decor {text-decoration: none;}
      .ta-center {text-align: center;}
      .ta-right {text-align: right;}
      .sp-err {color: white; background-color: darkred; font-size:75%;}
      .sp-info {color: white; background-color: blue; font-size:75%;}
      .sp-perf {color: white; background-color: magenta; font-size:75%;}
      .sp-perf-unsure {color: white; background-color: plum; font-size:75%;}
      .sp-port {color: black; background-color: cyan; font-size:75%;}
      .sp-style {color: white; background-color: forestgreen; font-size:75%;}
      .sp-style-unsure {color: gray; background-color: springgreen; font-size:75%;}
      .sp-warn {color: white; background-color: orangered; font-size:75%;}
      .sp-nn {color: purple; background-color: yellow; font-size:75%;}
      .ff-067 {font-family: Courier, fixed; font-size:67%;}
      .ff-075 {font-family: Courier, fixed; font-size:75%;}
      .finding {line-height: 1.0;}
    </style>
</head>
<body>
<header>
  <h1><a href="/static_analysis/" class="no-decor" target="_blank">Static Analysis</a></h1>
</header>
<main>
  <h2>Warnings &amp; Errors from Static Code Analysis</h2>
"#;

/// Everything of the page below the last finding fragment.
pub const PAGE_POSTFIX: &str = r#"</main>
<footer>
  <address><b>Contact</b>: Given Family &lt;<a href="mailto:given.family@example.com">given.family@example.com</a>&gt;</address>
</footer>
</body>
</html>
"#;

/// The paragraph recording what the report was generated for, and when.
///
/// This is the only place the branch argument surfaces; links pin the
/// commit ref instead.
fn generation_stamp(args: &Cli) -> String {
    format!(
        "<p>Report generated for {}.{}[{}].at({}) {} UTC</p>",
        args.project,
        args.repo,
        args.branch,
        args.commit,
        Utc::now().format("%Y-%m-%d %H:%M:%S")
    )
}

/// Write the complete report page: prefix, stamp, mapped findings, postfix.
pub fn write_report<W, I>(out: &mut W, lines: I, args: &Cli) -> std::io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = String>,
{
    writeln!(out, "{PAGE_PREFIX}")?;
    writeln!(out, "{}", generation_stamp(args))?;
    for fragment in map_findings(lines, SourceTarget::from(args)) {
        writeln!(out, "{fragment}")?;
    }
    writeln!(out, "{PAGE_POSTFIX}")
}
