//! Convert command - rewrite a fixed-format member in free form.

use std::ops::RangeInclusive;
use std::path::PathBuf;

use miette::{IntoDiagnostic, Result, WrapErr};
use open_mainframe_rpg::{
    apply_edits, ConversionResult, Converter, NoSymbols, Severity, SourceSymbols,
};

use crate::config::Config;

/// Arguments of `rpgfree convert`.
#[derive(Debug)]
pub struct ConvertArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    /// 1-based, inclusive.
    pub lines: Option<RangeInclusive<usize>>,
    pub config: Option<PathBuf>,
    pub left_margin: Option<usize>,
    pub add_inz: bool,
    pub no_symbols: bool,
}

/// Parse `FROM:TO` (1-based, inclusive). A single number selects one line.
pub fn parse_line_range(s: &str) -> std::result::Result<RangeInclusive<usize>, String> {
    let (from, to) = s.split_once(':').unwrap_or((s, s));
    let parse = |part: &str| {
        part.trim()
            .parse::<usize>()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| format!("'{part}' is not a line number"))
    };
    let (from, to) = (parse(from)?, parse(to)?);
    if from > to {
        return Err(format!("range {from}:{to} ends before it starts"));
    }
    Ok(from..=to)
}

/// Run the convert command.
pub async fn run(args: ConvertArgs) -> Result<()> {
    let source = std::fs::read_to_string(&args.input)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read source file: {}", args.input.display()))?;

    let mut config = Config::load(args.config.as_deref())
        .into_diagnostic()
        .wrap_err("Failed to load configuration")?;
    if let Some(margin) = args.left_margin {
        config.convert.left_margin = margin;
    }
    if args.add_inz {
        config.convert.add_inz = true;
    }

    tracing::info!("Converting {}", args.input.display());

    let lines: Vec<String> = source.lines().map(str::to_string).collect();
    let selection = args
        .lines
        .map(|range| range.start().saturating_sub(1)..=range.end().saturating_sub(1));
    let converter = Converter::new(config.convert);

    let result = if args.no_symbols {
        converter.convert(&lines, selection, &NoSymbols).await
    } else {
        let symbols = SourceSymbols::from_source(&lines);
        converter.convert(&lines, selection, &symbols).await
    };
    let converted = apply_edits(&lines, &result);

    let mut text = converted.join("\n");
    if source.ends_with('\n') {
        text.push('\n');
    }
    match &args.output {
        Some(path) => std::fs::write(path, text)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to write output file: {}", path.display()))?,
        None => print!("{text}"),
    }

    report(&args.input, &result);
    if result.has_errors() {
        let count = result
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count();
        return Err(miette::miette!(
            "{count} statement(s) in {} could not be converted",
            args.input.display()
        ));
    }
    Ok(())
}

/// Print every diagnostic to stderr.
fn report(input: &std::path::Path, result: &ConversionResult) {
    for diag in &result.diagnostics {
        eprintln!("{}: {diag}", input.display());
    }
}
