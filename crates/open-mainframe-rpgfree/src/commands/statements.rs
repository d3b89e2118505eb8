//! Statements command - show how a member splits into logical statements.

use std::path::PathBuf;

use miette::{IntoDiagnostic, Result, WrapErr};
use open_mainframe_rpg::collect::Detail;
use open_mainframe_rpg::{collect_all, CollectedStmt, SourceFormat};

/// Run the statements command.
pub fn run(input: PathBuf) -> Result<()> {
    let source = std::fs::read_to_string(&input)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read source file: {}", input.display()))?;

    tracing::info!("Collecting {}", input.display());

    let lines: Vec<String> = source.lines().map(str::to_string).collect();
    println!("Source format: {:?}", SourceFormat::detect(&lines));
    println!();

    let statements = collect_all(&lines);
    println!("Statements ({} total):", statements.len());
    println!("───────────────────────────────────────────────────────────────");
    for stmt in &statements {
        println!("{}", describe(stmt));
    }
    Ok(())
}

/// One summary line: the 1-based span, the kind and what was recognized.
fn describe(stmt: &CollectedStmt) -> String {
    let span = format!("{}-{}", stmt.first_index() + 1, stmt.last_index() + 1);
    let detail = match &stmt.detail {
        Detail::None => stmt.entity_name.clone().unwrap_or_default(),
        Detail::Calc(spec) => spec.opcode.to_string(),
        Detail::Boolean(block) => format!("{} ({} clauses)", block.keyword, block.clauses.len()),
        Detail::Case(chain) => format!("CASxx ({} arms)", chain.arms.len()),
    };
    format!("{span:>11}  {:<16} {detail}", format!("{:?}", stmt.kind))
        .trim_end()
        .to_string()
}
