//! Output layout: margins, terminators and wrapping.
//!
//! Statements start at `left_margin` and end with `;`. A statement that
//! would pass `right_margin` is broken at blanks outside quoted literals
//! and continued at `left_margin_continued`. A single word longer than the
//! room left is placed on its own line rather than split.

use crate::config::ConvertOptions;
use crate::continuation::in_quote;
use crate::convert::FreeLine;

fn margin(column: usize) -> String {
    " ".repeat(column.saturating_sub(1))
}

/// Break `text` into words at blanks outside quotes. Runs of blanks inside
/// a literal stay in their word.
fn words(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = None;
    let mut quoted = false;
    for (i, ch) in text.char_indices() {
        if ch == '\'' {
            quoted = !quoted;
        }
        if ch == ' ' && !quoted {
            if let Some(s) = start.take() {
                out.push(&text[s..i]);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        out.push(&text[s..]);
    }
    out
}

/// Lay out one statement.
pub fn statement(text: &str, options: &ConvertOptions) -> Vec<String> {
    let indent = text.len() - text.trim_start().len();
    let first = format!("{}{}", margin(options.left_margin), " ".repeat(indent));
    let rest = format!(
        "{}{}",
        margin(options.left_margin_continued),
        " ".repeat(indent)
    );
    let mut body = text.trim().to_string();
    if !body.ends_with(';') {
        body.push(';');
    }

    let single = format!("{first}{body}");
    if single.chars().count() <= options.right_margin || in_quote(&body) {
        return vec![single];
    }

    let mut out = Vec::new();
    let mut current = first;
    let mut empty = true;
    for word in words(&body) {
        let fits = current.chars().count() + usize::from(!empty) + word.chars().count()
            <= options.right_margin;
        if !empty && !fits {
            out.push(std::mem::replace(&mut current, rest.clone()));
            empty = true;
        }
        if !empty {
            current.push(' ');
        }
        current.push_str(word);
        empty = false;
    }
    out.push(current);
    out
}

/// `// text` at the left margin.
pub fn comment(text: &str, options: &ConvertOptions) -> String {
    format!("{}//{}", margin(options.left_margin), text.trim_end())
}

/// The note placed above a statement left in fixed form.
pub fn annotation(note: &str, options: &ConvertOptions) -> String {
    comment(&format!(" rpgfree: {note}"), options)
}

/// Physical lines for converted output.
pub fn render(lines: &[FreeLine], options: &ConvertOptions) -> Vec<String> {
    let mut out = Vec::new();
    for line in lines {
        match line {
            FreeLine::Code(text) => out.extend(statement(text, options)),
            FreeLine::Comment(text) => out.push(comment(text, options)),
            FreeLine::Raw(text) => out.push(text.clone()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_margin_and_terminator() {
        let opts = ConvertOptions::default();
        assert_eq!(statement("X = 1", &opts), vec!["       X = 1;"]);
        assert_eq!(statement("  X = 1", &opts), vec!["         X = 1;"]);
        assert_eq!(statement("ENDIF;", &opts), vec!["       ENDIF;"]);
    }

    #[test]
    fn test_wrapping_keeps_literals_whole() {
        let opts = ConvertOptions {
            right_margin: 30,
            ..ConvertOptions::default()
        };
        let out = statement("MSG = 'A  B' + NAME + OTHERNAME", &opts);
        assert_eq!(
            out,
            vec!["       MSG = 'A  B' + NAME +", "         OTHERNAME;"]
        );
        assert!(out.iter().all(|l| l.len() <= 30));
    }

    #[test]
    fn test_long_word_on_own_line() {
        let opts = ConvertOptions {
            right_margin: 20,
            ..ConvertOptions::default()
        };
        let out = statement("X = AVERYLONGFIELDNAMEHERE", &opts);
        assert_eq!(out, vec!["       X =", "         AVERYLONGFIELDNAMEHERE;"]);
    }

    #[test]
    fn test_comments_and_annotations() {
        let opts = ConvertOptions::default();
        assert_eq!(comment(" Read next", &opts), "       // Read next");
        assert_eq!(comment("", &opts), "       //");
        assert_eq!(
            annotation("CALL has no free-form equivalent", &opts),
            "       // rpgfree: CALL has no free-form equivalent"
        );
    }

    #[test]
    fn test_render_mixed() {
        let opts = ConvertOptions::default();
        let lines = vec![
            FreeLine::code("READ F"),
            FreeLine::comment(" eof"),
            FreeLine::Raw("      /INCLUDE X".to_string()),
        ];
        assert_eq!(
            render(&lines, &opts),
            vec!["       READ F;", "       // eof", "      /INCLUDE X"]
        );
    }
}
