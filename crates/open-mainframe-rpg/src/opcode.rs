//! Opcode classification.
//!
//! Static tables answering "what kind of operation is this?" for the
//! calculation spec. The classification drives collection: extended
//! factor 2 opcodes read free-form expression text across any number of
//! lines, while every other opcode has fixed-width operands on one line.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

/// Opcode families that take a two-letter comparison suffix (`IFEQ`, ...).
const COMPARISON_FAMILIES: &[&str] = &["IF", "WHEN", "DOU", "DOW", "AND", "OR", "CAS", "CAB"];

/// Every opcode legal in a fixed-format calculation spec.
static VALID_OPCODES: LazyLock<HashSet<String>> = LazyLock::new(|| {
    let plain = [
        "ACQ", "ADD", "ADDDUR", "ALLOC", "AND", "BEGSR", "BITOFF", "BITON", "CALL", "CALLB",
        "CALLP", "CAS", "CAT", "CHAIN", "CHECK", "CHECKR", "CLEAR", "CLOSE", "COMMIT", "COMP",
        "DATA-GEN", "DATA-INTO", "DEALLOC", "DEBUG", "DEFINE", "DEFN", "DELETE", "DIV", "DO",
        "DOU", "DOW", "DSPLY", "DUMP", "ELSE", "ELSEIF", "END", "ENDCS", "ENDDO", "ENDFOR",
        "ENDIF", "ENDMON", "ENDSL", "ENDSR", "EVAL", "EVAL-CORR", "EVALR", "EXCEPT", "EXFMT",
        "EXSR", "EXTRCT", "FEOD", "FOR", "FORCE", "FREE", "GOTO", "IF", "IN", "ITER", "KFLD",
        "KLIST", "LEAVE", "LEAVESR", "LOOKUP", "MHHZO", "MHLZO", "MLHZO", "MLLZO", "MONITOR",
        "MOVE", "MOVEA", "MOVEL", "MULT", "MVR", "NEXT", "OCCUR", "ON-ERROR", "ON-EXIT", "OPEN",
        "OR", "OTHER", "OUT", "PARM", "PLIST", "POST", "READ", "READC", "READE", "READP",
        "READPE", "REALLOC", "REL", "RESET", "RETURN", "ROLBK", "SCAN", "SELECT", "SETGT",
        "SETLL", "SETOFF", "SETON", "SHTDN", "SORTA", "SQRT", "SUB", "SUBDUR", "SUBST", "TAG",
        "TEST", "TESTB", "TESTN", "TESTZ", "TIME", "UNLOCK", "UPDATE", "WHEN", "WRITE",
        "XFOOT", "XLATE", "XML-INTO", "XML-SAX", "Z-ADD", "Z-SUB",
    ];
    let mut set: HashSet<String> = plain.iter().map(|s| s.to_string()).collect();
    for family in COMPARISON_FAMILIES {
        for cmp in Comparison::ALL {
            set.insert(format!("{family}{}", cmp.suffix()));
        }
    }
    set
});

/// Opcodes whose factor 2 is free-form expression text (columns 36-80).
static EXT_OPCODES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "CALLP", "DATA-GEN", "DATA-INTO", "DOU", "DOW", "ELSEIF", "EVAL", "EVAL-CORR", "EVALR",
        "FOR", "IF", "ON-ERROR", "RETURN", "SORTA", "WHEN", "XML-INTO", "XML-SAX",
    ]
    .into_iter()
    .collect()
});

/// Opcodes with no free-form equivalent; these stay in fixed form.
static UNSUPPORTED_OPCODES: LazyLock<HashSet<String>> = LazyLock::new(|| {
    let mut set: HashSet<String> = [
        "CALL", "CALLB", "PARM", "PLIST", "GOTO", "TAG", "KLIST", "KFLD", "MHHZO", "MHLZO",
        "MLHZO", "MLLZO", "FREE", "DEBUG",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    for cmp in Comparison::ALL {
        set.insert(format!("CAB{}", cmp.suffix()));
    }
    set
});

/// A fixed-format comparison suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    /// All suffixes, in manual order.
    pub const ALL: [Comparison; 6] = [
        Comparison::Eq,
        Comparison::Ne,
        Comparison::Lt,
        Comparison::Le,
        Comparison::Gt,
        Comparison::Ge,
    ];

    /// Parse a two-letter suffix (either case).
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix.to_ascii_uppercase().as_str() {
            "EQ" => Some(Comparison::Eq),
            "NE" => Some(Comparison::Ne),
            "LT" => Some(Comparison::Lt),
            "LE" => Some(Comparison::Le),
            "GT" => Some(Comparison::Gt),
            "GE" => Some(Comparison::Ge),
            _ => None,
        }
    }

    /// The two-letter suffix.
    pub fn suffix(self) -> &'static str {
        match self {
            Comparison::Eq => "EQ",
            Comparison::Ne => "NE",
            Comparison::Lt => "LT",
            Comparison::Le => "LE",
            Comparison::Gt => "GT",
            Comparison::Ge => "GE",
        }
    }

    /// The free-form operator.
    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Ne => "<>",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
        }
    }
}

/// An opcode split into its base name and operation extenders.
///
/// `chain(ee)` parses to name `CHAIN`, extenders `['E']`; extenders are
/// upper-cased and de-duplicated, keeping first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opcode {
    /// Upper-case base opcode, `DEFN` normalized to `DEFINE`.
    pub name: String,
    /// Upper-case extenders.
    pub extenders: Vec<char>,
    /// Text as written in columns 26-35.
    pub raw: String,
}

impl Opcode {
    /// Parse the opcode field.
    pub fn parse(text: &str) -> Self {
        let raw = text.trim().to_string();
        let (base, ext) = match raw.find('(') {
            Some(open) => {
                let close = raw[open..].find(')').map(|c| open + c).unwrap_or(raw.len());
                (&raw[..open], &raw[open + 1..close])
            }
            None => (raw.as_str(), ""),
        };
        let mut name = base.trim().to_ascii_uppercase();
        if name == "DEFN" {
            name = "DEFINE".to_string();
        }
        let mut op = Opcode {
            name,
            extenders: Vec::new(),
            raw: raw.clone(),
        };
        for ch in ext.chars().filter(|c| !c.is_whitespace()) {
            op.add_extender(ch);
        }
        op
    }

    /// Add an extender unless already present.
    pub fn add_extender(&mut self, ch: char) {
        let ch = ch.to_ascii_uppercase();
        if !self.extenders.contains(&ch) {
            self.extenders.push(ch);
        }
    }

    /// The opcode carries this extender.
    pub fn has_extender(&self, ch: char) -> bool {
        self.extenders.contains(&ch.to_ascii_uppercase())
    }

    /// `(E)`-style suffix, empty when there are no extenders.
    pub fn extender_suffix(&self) -> String {
        if self.extenders.is_empty() {
            String::new()
        } else {
            format!("({})", self.extenders.iter().collect::<String>())
        }
    }

    /// The comparison suffix for `IFxx`-style opcodes.
    pub fn comparison(&self) -> Option<(&str, Comparison)> {
        split_comparison(&self.name)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.extender_suffix())
    }
}

/// Split `IFEQ` into (`IF`, `Eq`); `None` for opcodes without a suffix.
pub fn split_comparison(name: &str) -> Option<(&str, Comparison)> {
    if name.len() < 3 || !name.is_char_boundary(name.len() - 2) {
        return None;
    }
    let (base, suffix) = name.split_at(name.len() - 2);
    let cmp = Comparison::from_suffix(suffix)?;
    COMPARISON_FAMILIES
        .iter()
        .any(|f| f.eq_ignore_ascii_case(base))
        .then_some((base, cmp))
}

/// Base opcode name, extenders stripped, upper-cased.
pub fn base_name(text: &str) -> String {
    Opcode::parse(text).name
}

/// Legal fixed-format opcode.
pub fn is_valid_opcode(text: &str) -> bool {
    let name = base_name(text);
    VALID_OPCODES.contains(&name)
}

/// Opcode whose factor 2 is free-form text spanning continuation lines.
pub fn is_ext_opcode(text: &str) -> bool {
    EXT_OPCODES.contains(base_name(text).as_str())
}

/// Opcode left in fixed form.
pub fn is_unsupported_opcode(text: &str) -> bool {
    UNSUPPORTED_OPCODES.contains(&base_name(text))
}

/// `IFxx`, `WHENxx`, `DOWxx` or `DOUxx`: opens a compound condition.
pub fn is_boolean_opcode(text: &str) -> bool {
    let name = base_name(text);
    matches!(
        split_comparison(&name),
        Some(("IF" | "WHEN" | "DOW" | "DOU", _))
    )
}

/// `ANDxx` or `ORxx`: continues a compound condition.
pub fn is_and_or_opcode(text: &str) -> bool {
    let name = base_name(text);
    matches!(split_comparison(&name), Some(("AND" | "OR", _)))
}

/// `CASxx` or bare `CAS`.
pub fn is_case_opcode(text: &str) -> bool {
    let name = base_name(text);
    name == "CAS" || matches!(split_comparison(&name), Some(("CAS", _)))
}

/// Names that cannot appear bare as a subfield or parameter in free form.
pub fn is_reserved_name(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    VALID_OPCODES.contains(&upper)
}
