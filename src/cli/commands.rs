//! Command implementations for the highlighter CLI.

use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use log::{debug, info};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::HighlightConfig;
use crate::highlighter::Highlighter;
use crate::matcher::Pattern;

/// Execute a CLI command.
pub fn execute_command(args: HighlightArgs) -> Result<()> {
    match &args.command {
        Command::Highlight(highlight_args) => highlight(highlight_args, &args),
        Command::ShowConfig(config_args) => show_config(config_args, &args),
    }
}

/// Highlight the input and print the snippets.
fn highlight(args: &HighlightCommandArgs, cli_args: &HighlightArgs) -> Result<()> {
    let config = build_config(&args.config)?;
    let text = read_input(args.input.as_deref())?;
    let values = split_values(&text, args.lines);
    info!("Highlighting {} value(s)", values.len());

    let report = run_highlight(args, &values, config)?;
    output_report(&report, cli_args)
}

/// Print the configuration the flags and config file resolve to.
fn show_config(args: &ConfigArgs, cli_args: &HighlightArgs) -> Result<()> {
    let config = build_config(args)?;
    output_result("Effective configuration:", &config, cli_args)
}

/// Run the highlighter over `values` with the terms or patterns in `args`.
pub fn run_highlight(
    args: &HighlightCommandArgs,
    values: &[&str],
    config: HighlightConfig,
) -> Result<HighlightReport> {
    let highlighter = Highlighter::new(config);
    let start = Instant::now();

    let snippets = if !args.terms.is_empty() {
        let terms = args
            .terms
            .iter()
            .map(|term| parse_term(term))
            .collect::<Result<Vec<_>>>()?;
        highlighter.highlight_terms(values, &terms)?
    } else {
        let patterns = compile_patterns(args)?;
        if patterns.is_empty() {
            bail!("Nothing to highlight. Pass --term, --regex or --wildcard.");
        }
        highlighter.highlight_patterns(values, &patterns)?
    };

    let duration_ms = start.elapsed().as_millis() as u64;
    debug!("Found {} snippet(s) in {duration_ms}ms", snippets.len());
    Ok(HighlightReport {
        values: values.len(),
        snippets,
        duration_ms,
    })
}

/// Build the configuration from the optional config file and the flags.
pub fn build_config(args: &ConfigArgs) -> Result<HighlightConfig> {
    let mut config = match &args.config {
        Some(path) => load_config_from_file(path)?,
        None => HighlightConfig::default(),
    };

    if let Some(max_snippets) = args.max_snippets {
        config.max_snippets = max_snippets;
    }
    if let Some(fragment_chars) = args.fragment_chars {
        config.fragment_chars = fragment_chars;
    }
    if let Some(max_scan) = args.max_scan {
        config.max_scan = max_scan;
    }
    if let Some(order) = args.order {
        config.order = order.into();
    }
    if let Some(segmenter) = args.segmenter {
        config.segmenter = segmenter.into();
    }
    if let Some(strategy) = args.strategy {
        config.match_strategy = strategy.into();
    }
    if let Some(pre_tag) = &args.pre_tag {
        config.pre_tag = pre_tag.clone();
    }
    if let Some(post_tag) = &args.post_tag {
        config.post_tag = post_tag.clone();
    }
    if let Some(no_match_size) = args.no_match_size {
        config.no_match_size = no_match_size;
    }

    config.validate()?;
    Ok(config)
}

/// Parse `TERM` or `TERM:WEIGHT`. A bare term weighs 1.
pub fn parse_term(spec: &str) -> Result<(String, f32)> {
    let (term, weight) = match spec.rsplit_once(':') {
        Some((term, weight)) if !term.is_empty() => {
            let weight: f32 = weight
                .parse()
                .with_context(|| format!("Invalid weight in term {spec:?}"))?;
            (term, weight)
        }
        _ => (spec, 1.0),
    };
    if term.is_empty() {
        bail!("Empty term");
    }
    if !weight.is_finite() || weight < 0.0 {
        bail!("Term weight must be a non-negative number, got {weight}");
    }
    Ok((term.to_string(), weight))
}

fn compile_patterns(args: &HighlightCommandArgs) -> Result<Vec<(Pattern, f32)>> {
    let mut patterns = Vec::with_capacity(args.regexes.len() + args.wildcards.len());
    for regex in &args.regexes {
        let pattern = if args.ignore_case {
            Pattern::regex_case_insensitive(regex)
        } else {
            Pattern::regex(regex)
        };
        let pattern = pattern.with_context(|| format!("Invalid regex {regex:?}"))?;
        patterns.push((pattern, 1.0));
    }
    for wildcard in &args.wildcards {
        let pattern = Pattern::wildcard(wildcard)
            .with_context(|| format!("Invalid wildcard {wildcard:?}"))?;
        patterns.push((pattern, 1.0));
    }
    Ok(patterns)
}

fn load_config_from_file(path: &Path) -> Result<HighlightConfig> {
    debug!("Loading configuration from: {}", path.display());
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config = HighlightConfig::from_json(&json)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(config)
}

/// Read the input file, or standard input when `path` is absent or `-`.
fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path.display())),
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read standard input")?;
            Ok(text)
        }
    }
}

/// Split the input into field values: one per line, or the whole text.
pub fn split_values(text: &str, lines: bool) -> Vec<&str> {
    if lines {
        text.lines().collect()
    } else {
        vec![text.strip_suffix('\n').unwrap_or(text)]
    }
}
