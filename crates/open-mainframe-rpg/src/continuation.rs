//! Quote-aware joining of continued statement text.
//!
//! Fixed-format RPG continues long text three ways:
//!
//! | Ends with | Context            | Join                                   |
//! |-----------|--------------------|----------------------------------------|
//! | `...`     | outside a literal  | strip, no space (split name)           |
//! | `+`       | in literal, or `'` on both sides | strip, next fragment left-trimmed |
//! | `-`       | in literal, or `'` on both sides | strip, next fragment verbatim     |
//!
//! Anything else is joined with a single blank. Quote state is tracked
//! character by character with `''` read as an escaped quote.

/// Quote state at the end of `text`: `true` while a literal is open.
pub fn in_quote(text: &str) -> bool {
    let mut open = false;
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\'' {
            continue;
        }
        if open && chars.peek() == Some(&'\'') {
            chars.next();
            continue;
        }
        open = !open;
    }
    open
}

/// Incrementally joins continuation fragments.
#[derive(Debug, Default, Clone)]
pub struct Joiner {
    text: String,
    started: bool,
}

impl Joiner {
    /// Create an empty joiner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next physical fragment.
    pub fn push(&mut self, fragment: &str) {
        let fragment = fragment.trim_end();
        if !self.started {
            self.started = true;
            self.text = fragment.trim_start().to_string();
            return;
        }
        if fragment.trim().is_empty() {
            return;
        }

        let acc = self.text.trim_end();
        if let Some(head) = acc.strip_suffix("...") {
            if !in_quote(head) {
                let joined = format!("{}{}", head, fragment.trim_start());
                self.text = joined;
                return;
            }
        }
        if let Some(head) = acc.strip_suffix('+') {
            if literal_continues(head, fragment) {
                self.text = format!("{}{}", head, fragment.trim_start());
                return;
            }
        }
        if let Some(head) = acc.strip_suffix('-') {
            if literal_continues(head, fragment) {
                self.text = format!("{}{}", head, fragment);
                return;
            }
        }
        self.text = if in_quote(acc) || acc.is_empty() {
            format!("{}{}", acc, fragment.trim_start())
        } else {
            format!("{} {}", acc, fragment.trim_start())
        };
    }

    /// Text joined so far.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Finish joining.
    pub fn finish(self) -> String {
        self.text.trim_end().to_string()
    }
}

/// A `+`/`-` continues a literal when it sits inside one, or right after a
/// closed one with the next fragment opening another. Anything else is an
/// operator.
fn literal_continues(head: &str, next: &str) -> bool {
    in_quote(head) || (head.ends_with('\'') && next.trim_start().starts_with('\''))
}

/// Join a sequence of fragments.
pub fn join_fragments<I, S>(fragments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joiner = Joiner::new();
    for fragment in fragments {
        joiner.push(fragment.as_ref());
    }
    joiner.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_quote_tracking() {
        assert!(!in_quote("X = 'ABC'"));
        assert!(in_quote("X = 'ABC"));
        assert!(in_quote("X = 'IT''S"));
        assert!(!in_quote("X = 'IT''S'"));
        assert!(!in_quote("''"));
    }

    #[test]
    fn test_quoted_literal_plus_continuation() {
        let joined = join_fragments(["'AB", "CD'+", "'EF'"]);
        assert_eq!(joined, "'ABCD''EF'");
        assert!(!joined.contains(' '));
    }

    #[test]
    fn test_plus_inside_literal_trims_next() {
        let joined = join_fragments(["MSG = 'HELLO +", "      WORLD'"]);
        assert_eq!(joined, "MSG = 'HELLO WORLD'");
    }

    #[test]
    fn test_minus_inside_literal_keeps_blanks() {
        let joined = join_fragments(["MSG = 'HELLO-", "   WORLD'"]);
        assert_eq!(joined, "MSG = 'HELLO   WORLD'");
    }

    #[test]
    fn test_ellipsis_name_split() {
        let joined = join_fragments(["TOTAL = CUSTOMER_BAL...", "   ANCE_DUE + 1"]);
        assert_eq!(joined, "TOTAL = CUSTOMER_BALANCE_DUE + 1");
    }

    #[test]
    fn test_ellipsis_inside_literal_is_text() {
        let joined = join_fragments(["MSG = 'WAIT...", "DONE'"]);
        assert_eq!(joined, "MSG = 'WAIT...DONE'");
    }

    #[test]
    fn test_operator_plus_outside_literal_gets_space() {
        let joined = join_fragments(["TOTAL = A +", "B"]);
        assert_eq!(joined, "TOTAL = A + B");
        let joined = join_fragments(["TOTAL = A -", "B"]);
        assert_eq!(joined, "TOTAL = A - B");
    }

    #[test]
    fn test_operator_after_closed_literal_is_kept() {
        let joined = join_fragments(["MSG = 'Cust'+", "NAME"]);
        assert_eq!(joined, "MSG = 'Cust'+ NAME");
        let joined = join_fragments(["X = 'A'-", "   B"]);
        assert_eq!(joined, "X = 'A'- B");
    }

    #[test]
    fn test_plain_join_and_blank_fragments() {
        let joined = join_fragments(["A = B", "", "AND C = D   "]);
        assert_eq!(joined, "A = B AND C = D");
    }
}
