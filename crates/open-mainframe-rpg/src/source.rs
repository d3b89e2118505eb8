//! Column access for fixed-format RPG IV source.
//!
//! Fixed-format RPG positions every field by column:
//! - **Columns 1-5**: sequence area (ignored)
//! - **Column 6**: specification type (`H`, `F`, `D`, `I`, `C`, `O`, `P`)
//! - **Column 7**: `*` marks a comment line, `/` a compiler directive
//! - **Columns 7-80**: specification body, laid out per spec type
//! - **Columns 81-100**: comment area
//!
//! Every range in this crate is 1-based and inclusive, matching the
//! language reference manuals, so `col(line, 12, 25)` is factor 1 of a
//! calculation spec.

/// Last column of the specification body.
pub const BODY_END: usize = 80;

/// Last column of the trailing comment area.
pub const COMMENT_END: usize = 100;

/// Source member format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceFormat {
    /// Column-positional source (optionally mixed with free-form calcs).
    #[default]
    Fixed,
    /// Fully free member (`**FREE` on line 1); nothing left to convert.
    Free,
}

impl SourceFormat {
    /// Detect the member format from its first line.
    pub fn detect<S: AsRef<str>>(lines: &[S]) -> Self {
        match lines.first() {
            Some(first) if first.as_ref().trim_end().eq_ignore_ascii_case("**FREE") => {
                SourceFormat::Free
            }
            _ => SourceFormat::Fixed,
        }
    }
}

/// Specification type taken from column 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecType {
    /// `H`: control options.
    Control,
    /// `F`: file description.
    File,
    /// `D`: definition.
    Definition,
    /// `I`: input.
    Input,
    /// `C`: calculation.
    Calc,
    /// `O`: output.
    Output,
    /// `P`: procedure boundary.
    Procedure,
}

impl SpecType {
    /// Parse a column-6 letter (either case).
    pub fn from_char(ch: char) -> Option<Self> {
        match ch.to_ascii_lowercase() {
            'h' => Some(SpecType::Control),
            'f' => Some(SpecType::File),
            'd' => Some(SpecType::Definition),
            'i' => Some(SpecType::Input),
            'c' => Some(SpecType::Calc),
            'o' => Some(SpecType::Output),
            'p' => Some(SpecType::Procedure),
            _ => None,
        }
    }

    /// The lower-case spec letter.
    pub fn letter(self) -> char {
        match self {
            SpecType::Control => 'h',
            SpecType::File => 'f',
            SpecType::Definition => 'd',
            SpecType::Input => 'i',
            SpecType::Calc => 'c',
            SpecType::Output => 'o',
            SpecType::Procedure => 'p',
        }
    }
}

/// Return columns `from..=to`, right-padded with blanks, untrimmed.
pub fn raw_col(line: &str, from: usize, to: usize) -> String {
    debug_assert!(from >= 1 && from <= to);
    let width = to + 1 - from;
    let mut out: String = line.chars().skip(from - 1).take(width).collect();
    let have = out.chars().count();
    if have < width {
        out.extend(std::iter::repeat(' ').take(width - have));
    }
    out
}

/// Return columns `from..=to`, trimmed on both sides.
pub fn col(line: &str, from: usize, to: usize) -> String {
    raw_col(line, from, to).trim().to_string()
}

/// The character at a 1-based column, blank when the line is short.
pub fn col_char(line: &str, column: usize) -> char {
    line.chars().nth(column - 1).unwrap_or(' ')
}

/// Columns `from..=to` are entirely blank.
pub fn is_blank(line: &str, from: usize, to: usize) -> bool {
    line.chars()
        .skip(from - 1)
        .take(to + 1 - from)
        .all(|c| c == ' ')
}

/// Spec type of a line, or `None` for comments, directives and lines with
/// no recognizable letter in column 6.
pub fn spec_type(line: &str) -> Option<SpecType> {
    match col_char(line, 7) {
        '*' | '/' => None,
        _ => SpecType::from_char(col_char(line, 6)),
    }
}

/// Full-line comment: `*` in column 7, or a free-form `//` comment.
pub fn is_comment(line: &str) -> bool {
    if col_char(line, 7) == '*' {
        return true;
    }
    if col_char(line, 7) == '/' && col_char(line, 8) == '/' {
        return true;
    }
    col_char(line, 6) == ' ' && raw_col(line, 7, BODY_END).trim_start().starts_with("//")
}

/// Compiler directive (`/COPY`, `/FREE`, `/IF`, ...) in column 7.
pub fn is_directive(line: &str) -> bool {
    col_char(line, 7) == '/'
        && col_char(line, 8).is_ascii_alphabetic()
        && !is_sql_start(line)
        && !is_sql_end(line)
}

/// No content in the statement body.
pub fn is_empty_stmt(line: &str, format: SourceFormat) -> bool {
    match format {
        SourceFormat::Fixed => is_blank(line, 8, BODY_END) && !is_comment(line),
        SourceFormat::Free => line.trim().is_empty(),
    }
}

/// Lines the collectors step over: comments, directives and empty lines.
pub fn is_skip_stmt(line: &str, format: SourceFormat) -> bool {
    is_comment(line) || is_directive(line) || is_empty_stmt(line, format)
}

/// Text of a full-line comment without its `*` or `//` marker.
pub fn comment_text(line: &str) -> String {
    if col_char(line, 7) == '*' {
        return raw_col(line, 8, BODY_END).trim_end().to_string();
    }
    let body = raw_col(line, 7, BODY_END);
    let body = body.trim_start();
    body.strip_prefix("//")
        .unwrap_or(body)
        .trim_end()
        .to_string()
}

/// Text in the columns 81-100 comment area, if any.
pub fn inline_comment(line: &str) -> Option<String> {
    if line.chars().count() <= BODY_END {
        return None;
    }
    let text = col(line, BODY_END + 1, COMMENT_END);
    (!text.is_empty()).then_some(text)
}

/// A statement that is already free-form: blank columns 6-7 with code in
/// columns 8-80 (inside or outside a `/FREE` block).
pub fn is_free_form(line: &str) -> bool {
    col_char(line, 6) == ' '
        && col_char(line, 7) == ' '
        && !is_blank(line, 8, BODY_END)
        && !is_comment(line)
}

/// `C/EXEC SQL` opening an embedded SQL block.
pub fn is_sql_start(line: &str) -> bool {
    col_char(line, 6).eq_ignore_ascii_case(&'c')
        && col_char(line, 7) == '/'
        && col(line, 8, BODY_END)
            .to_ascii_uppercase()
            .starts_with("EXEC SQL")
}

/// `C+` continuation of an embedded SQL block.
pub fn is_sql_continuation(line: &str) -> bool {
    col_char(line, 6).eq_ignore_ascii_case(&'c') && col_char(line, 7) == '+'
}

/// `C/END-EXEC` closing an embedded SQL block.
pub fn is_sql_end(line: &str) -> bool {
    col_char(line, 6).eq_ignore_ascii_case(&'c')
        && col_char(line, 7) == '/'
        && col(line, 8, BODY_END)
            .to_ascii_uppercase()
            .starts_with("END-EXEC")
}

/// The member contains embedded SQL (an `SQLRPGLE` member).
pub fn has_embedded_sql<S: AsRef<str>>(lines: &[S]) -> bool {
    lines.iter().any(|l| is_sql_start(l.as_ref()))
}
