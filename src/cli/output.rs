//! Output formatting for CLI results.

use anyhow::Result;
use serde::Serialize;

use crate::cli::args::{HighlightArgs, OutputFormat};
use crate::highlighter::HighlightedSnippet;

/// The outcome of a highlight command.
#[derive(Debug, Clone, Serialize)]
pub struct HighlightReport {
    /// Number of field values highlighted.
    pub values: usize,
    /// The rendered snippets.
    pub snippets: Vec<HighlightedSnippet>,
    /// Time spent highlighting.
    pub duration_ms: u64,
}

/// Print a highlight report in the requested format.
pub fn output_report(report: &HighlightReport, args: &HighlightArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            print!("{}", format_report_human(report, args.verbosity()));
            Ok(())
        }
        OutputFormat::Json => output_json(report, args),
    }
}

/// Print a result in the requested format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &HighlightArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 0 {
                println!("{message}");
                println!();
            }
            println!("{}", serde_json::to_string_pretty(result)?);
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

fn output_json<T: Serialize>(result: &T, args: &HighlightArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}

/// Render a report for people. Quiet mode prints only the snippet texts.
pub fn format_report_human(report: &HighlightReport, verbosity: u8) -> String {
    let mut out = String::new();
    if verbosity == 0 {
        for snippet in &report.snippets {
            out.push_str(&snippet.text);
            out.push('\n');
        }
        return out;
    }

    if report.snippets.is_empty() {
        out.push_str("No snippets found.\n");
    } else {
        out.push_str("Snippets:\n");
        out.push_str("═════════\n");
        for (i, snippet) in report.snippets.iter().enumerate() {
            out.push('\n');
            out.push_str(&format!(
                "{}. [{}..{}] score {:.3}\n",
                i + 1,
                snippet.start_offset,
                snippet.end_offset,
                snippet.score
            ));
            out.push_str(&snippet.text);
            out.push('\n');
        }
    }
    if verbosity > 1 {
        out.push('\n');
        out.push_str(&format!(
            "Values: {}, time: {}ms\n",
            report.values, report.duration_ms
        ));
    }
    out
}
