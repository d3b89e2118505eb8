//! Column-exact source line builders shared by the integration tests.

#![allow(dead_code)]

/// Calculation line: factor 1, opcode, factor 2, result.
pub fn calc(f1: &str, op: &str, f2: &str, result: &str) -> String {
    format!("     C{:5}{:<14}{:<10}{:<14}{:<14}", "", f1, op, f2, result)
}

/// Calculation line with a conditioning indicator in columns 9-11.
pub fn calc_if(ind: &str, f1: &str, op: &str, f2: &str, result: &str) -> String {
    format!("     C  {:<3}{:<14}{:<10}{:<14}{:<14}", ind, f1, op, f2, result)
}

/// Calculation line with result length, decimals and the three resulting
/// indicators.
pub fn calc_full(
    f1: &str,
    op: &str,
    f2: &str,
    result: &str,
    len: &str,
    dec: &str,
    inds: [&str; 3],
) -> String {
    format!(
        "     C{:5}{:<14}{:<10}{:<14}{:<14}{:>5}{:>2}{:<2}{:<2}{:<2}",
        "", f1, op, f2, result, len, dec, inds[0], inds[1], inds[2]
    )
}

/// Definition line.
pub fn dspec(name: &str, decl: &str, to: &str, data_type: &str, dec: &str, kws: &str) -> String {
    format!(
        "     D{:<15}  {:<2}{:>7}{:>7}{:1}{:>2} {}",
        name, decl, "", to, data_type, dec, kws
    )
}

/// File description line for an externally described file.
pub fn fspec(name: &str, file_type: &str, keyed: bool, device: &str) -> String {
    format!(
        "     F{:<10}{:1}F   E{:>5} {:>5}{:1} {:<7}",
        name,
        file_type,
        "",
        "",
        if keyed { "K" } else { "" },
        device
    )
}

/// Control spec line.
pub fn hspec(text: &str) -> String {
    format!("     H{text}")
}

/// Full-line comment.
pub fn comment(text: &str) -> String {
    format!("     C*{text}")
}

pub fn owned(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}
