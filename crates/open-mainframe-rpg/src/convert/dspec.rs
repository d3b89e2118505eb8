//! Definition spec conversion.
//!
//! Fixed layout:
//!
//! | Columns | Field                                   |
//! |---------|-----------------------------------------|
//! | 7-21    | name                                    |
//! | 22      | `E` externally described                |
//! | 23      | `S` program status DS, `U` data area DS |
//! | 24-25   | `S`, `C`, `DS`, `PR`, `PI` or blank     |
//! | 26-32   | from position                           |
//! | 33-39   | to position / length                    |
//! | 40      | data type                               |
//! | 41-42   | decimal positions                       |
//! | 44-80   | keywords                                |

use tracing::debug;

use super::{ConvertContext, Converted, FreeLine};
use crate::collect::{
    name_fragment, next_declaration_line, prev_code_line, prev_declaration_line, CollectedStmt,
};
use crate::config::BinToInt;
use crate::continuation::Joiner;
use crate::error::{Result, RpgError};
use crate::opcode::is_reserved_name;
use crate::source::{col, col_char, raw_col, spec_type, SpecType, BODY_END};

/// A parsed keyword, `NAME` or `NAME(args)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub name: String,
    pub args: Option<String>,
}

impl Keyword {
    pub fn new(name: &str, args: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            args,
        }
    }

    /// Case-insensitive name test.
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Arguments split on top-level `:`.
    pub fn arg_list(&self) -> Vec<String> {
        self.args.as_deref().map(split_args).unwrap_or_default()
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.args {
            Some(args) => write!(f, "{}({})", self.name, args),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Split a keyword area into keywords, respecting parentheses and quotes.
pub fn split_keywords(text: &str) -> Vec<Keyword> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        while i < chars.len() && !chars[i].is_whitespace() && chars[i] != '(' {
            i += 1;
        }
        let name: String = chars[start..i].iter().collect();
        let mut args = None;
        if i < chars.len() && chars[i] == '(' {
            let open = i;
            let mut depth = 0;
            let mut quoted = false;
            while i < chars.len() {
                match chars[i] {
                    '\'' => quoted = !quoted,
                    '(' if !quoted => depth += 1,
                    ')' if !quoted => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
                i += 1;
            }
            let close = i.min(chars.len());
            args = Some(chars[open + 1..close].iter().collect::<String>().trim().to_string());
            i = close + 1;
        }
        out.push(Keyword { name, args });
    }
    out
}

/// Split keyword arguments on top-level `:`.
pub fn split_args(args: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut depth = 0;
    let mut quoted = false;
    for ch in args.chars() {
        match ch {
            '\'' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => depth -= 1,
            ':' if !quoted && depth == 0 => {
                out.push(current.trim().to_string());
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    out.push(current.trim().to_string());
    out
}

/// Quote and upper-case an object name unless it is a literal or a
/// special value.
pub fn quote_name(arg: &str) -> String {
    let arg = arg.trim();
    if arg.is_empty() || arg.starts_with('\'') || arg.starts_with('*') {
        arg.to_string()
    } else {
        format!("'{}'", arg.to_ascii_uppercase())
    }
}

/// Rewrite `EXTNAME`, `DTAARA`, `EXTFILE` and `EXTFLD` arguments as
/// quoted names.
pub fn quote_object_keyword(kw: &Keyword) -> Keyword {
    let args = kw.arg_list();
    if args.is_empty() || kw.args.is_none() {
        return kw.clone();
    }
    let upper = kw.name.to_ascii_uppercase();
    let new_args = match upper.as_str() {
        "EXTNAME" => args
            .iter()
            .enumerate()
            .map(|(i, a)| if i < 2 { quote_name(a) } else { a.clone() })
            .collect::<Vec<_>>(),
        "DTAARA" => {
            if args[0].eq_ignore_ascii_case("*VAR") {
                args[1..].to_vec()
            } else {
                args.iter().map(|a| quote_name(a)).collect()
            }
        }
        "EXTFILE" | "EXTFLD" => {
            let mut v = args.clone();
            v[0] = quote_name(&v[0]);
            v
        }
        _ => return kw.clone(),
    };
    Keyword::new(&kw.name, Some(new_args.join(":")))
}

/// Declaration kind from columns 24-25.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Standalone,
    Constant,
    DataStructure,
    Prototype,
    Interface,
    Subfield,
}

impl DeclKind {
    fn parse(text: &str, line: usize) -> Result<Self> {
        match text.to_ascii_uppercase().as_str() {
            "S" => Ok(DeclKind::Standalone),
            "C" => Ok(DeclKind::Constant),
            "DS" => Ok(DeclKind::DataStructure),
            "PR" => Ok(DeclKind::Prototype),
            "PI" => Ok(DeclKind::Interface),
            "" => Ok(DeclKind::Subfield),
            other => Err(RpgError::InvalidField {
                line,
                field: "definition type".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// What a subfield-position line belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Container {
    DataStructure(String),
    Prototype(String),
    Interface(String),
    Procedure,
    None,
}

/// A definition spec split into its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionSpec {
    /// Index of the declaring line.
    pub index: usize,
    pub name: String,
    pub external: bool,
    /// Column 23.
    pub ds_type: char,
    pub kind: DeclKind,
    pub from: String,
    pub to: String,
    /// Column 40, upper-cased; blank when omitted.
    pub data_type: char,
    pub decimals: String,
    pub keywords: Vec<Keyword>,
    /// The keyword area as joined text.
    pub keyword_text: String,
}

impl DefinitionSpec {
    /// Parse a collected D spec.
    pub fn parse(stmt: &CollectedStmt) -> Result<Self> {
        let pos = stmt
            .lines
            .iter()
            .position(|l| name_fragment(l).is_none())
            .unwrap_or(stmt.lines.len().saturating_sub(1));
        let line = stmt.lines.get(pos).map(String::as_str).unwrap_or("");
        let index = stmt.indexes.get(pos).copied().unwrap_or(0);

        let mut joiner = Joiner::new();
        for l in &stmt.lines[pos.min(stmt.lines.len())..] {
            joiner.push(&raw_col(l, 44, BODY_END));
        }

        let keyword_text = joiner.finish();
        Ok(Self {
            index,
            name: stmt
                .entity_name
                .clone()
                .unwrap_or_else(|| col(line, 7, 21)),
            external: col_char(line, 22).eq_ignore_ascii_case(&'E'),
            ds_type: col_char(line, 23).to_ascii_uppercase(),
            kind: DeclKind::parse(&col(line, 24, 25), index)?,
            from: col(line, 26, 32),
            to: col(line, 33, 39),
            data_type: col_char(line, 40).to_ascii_uppercase(),
            decimals: col(line, 41, 42),
            keywords: split_keywords(&keyword_text),
            keyword_text,
        })
    }

    /// Find a keyword by name.
    pub fn keyword(&self, name: &str) -> Option<&Keyword> {
        self.keywords.iter().find(|k| k.is(name))
    }

    fn take_keyword(&mut self, name: &str) -> Option<Keyword> {
        let pos = self.keywords.iter().position(|k| k.is(name))?;
        Some(self.keywords.remove(pos))
    }

    /// `DIM(n)` element count.
    pub fn dim(&self) -> Option<u32> {
        self.keyword("DIM")
            .and_then(|k| k.args.as_deref())
            .and_then(|a| a.trim().parse().ok())
    }

    /// Length in the unit of the data type (digits, characters or bytes).
    pub fn length(&self) -> Option<u32> {
        if let Some(len) = self
            .keyword("LEN")
            .and_then(|k| k.args.as_deref())
            .and_then(|a| a.trim().parse().ok())
        {
            return Some(len);
        }
        let to: u32 = self.to.parse().ok()?;
        match self.from.parse::<u32>() {
            Ok(from) if to >= from => Some(adjusted_length(
                self.effective_type(),
                to - from + 1,
                self.dim(),
            )),
            _ => Some(to),
        }
    }

    /// Data type letter with the implicit default applied.
    pub fn effective_type(&self) -> char {
        if self.data_type != ' ' {
            return self.data_type;
        }
        if self.decimals.is_empty() {
            'A'
        } else if self.kind == DeclKind::Subfield {
            'S'
        } else {
            'P'
        }
    }

    /// Decimal positions, 0 when omitted.
    pub fn decimals_value(&self) -> u32 {
        self.decimals.parse().unwrap_or(0)
    }
}

/// Convert a from/to byte span into the type's length unit, dividing by
/// the `DIM` element count first.
pub fn adjusted_length(data_type: char, bytes: u32, dim: Option<u32>) -> u32 {
    let bytes = match dim {
        Some(n) if n > 1 => bytes / n,
        _ => bytes,
    };
    match data_type.to_ascii_uppercase() {
        'P' => (bytes * 2).saturating_sub(1),
        'B' => match bytes {
            1 => 2,
            2 => 4,
            4 => 9,
            8 => 18,
            n => n * 2,
        },
        'I' | 'U' => int_digits(bytes),
        'G' | 'C' => bytes / 2,
        _ => bytes,
    }
}

/// Digits for an integer of `bytes` width.
pub fn int_digits(bytes: u32) -> u32 {
    match bytes {
        1 => 3,
        2 => 5,
        4 => 10,
        8 => 20,
        16 => 40,
        n => n,
    }
}

fn varying_arg(kw: &Keyword) -> String {
    match kw.args.as_deref().map(str::trim) {
        Some(size) if !size.is_empty() && size != "2" => format!(":{size}"),
        _ => String::new(),
    }
}

/// The free-form data type for a definition, consuming the keywords that
/// fold into it (`VARYING`, `DATFMT`, `TIMFMT`, `PROCPTR`, `CLASS`, `LEN`).
fn data_type(spec: &mut DefinitionSpec, bin_to_int: BinToInt) -> Option<String> {
    let has_like = spec.keyword("LIKE").is_some()
        || spec.keyword("LIKEDS").is_some()
        || spec.keyword("LIKEREC").is_some();
    if spec.data_type == ' ' && (spec.to.is_empty() || has_like) && spec.keyword("LEN").is_none() {
        if matches!(spec.kind, DeclKind::DataStructure) {
            return None;
        }
        // Folding keywords still apply with an implicit type.
        if spec.keyword("PROCPTR").is_none() && spec.keyword("CLASS").is_none() {
            return None;
        }
    }
    if spec.kind == DeclKind::DataStructure {
        return None;
    }

    let ty = spec.effective_type();
    let len = spec.length();
    spec.take_keyword("LEN");
    let dec = spec.decimals_value();
    let len_str = len.map(|l| l.to_string()).unwrap_or_default();

    let text = match ty {
        'A' => match spec.take_keyword("VARYING") {
            Some(kw) => format!("varchar({}{})", len_str, varying_arg(&kw)),
            None => format!("char({len_str})"),
        },
        'G' => match spec.take_keyword("VARYING") {
            Some(kw) => format!("vargraph({}{})", len_str, varying_arg(&kw)),
            None => format!("graphic({len_str})"),
        },
        'C' => match spec.take_keyword("VARYING") {
            Some(kw) => format!("varucs2({}{})", len_str, varying_arg(&kw)),
            None => format!("ucs2({len_str})"),
        },
        'P' => format!("packed({len_str}:{dec})"),
        'S' => format!("zoned({len_str}:{dec})"),
        'B' => {
            let digits = len.unwrap_or(0);
            let as_int = dec == 0
                && match bin_to_int {
                    BinToInt::Disable => false,
                    BinToInt::Always => true,
                    BinToInt::Auto => digits == 4 || digits == 9,
                };
            if as_int {
                let int_len = match digits {
                    0..=4 => 5,
                    5..=9 => 10,
                    _ => 20,
                };
                format!("int({int_len})")
            } else {
                format!("bindec({len_str}:{dec})")
            }
        }
        'I' => format!("int({len_str})"),
        'U' => format!("uns({len_str})"),
        'F' => format!("float({len_str})"),
        'D' => match spec.take_keyword("DATFMT").and_then(|k| k.args) {
            Some(fmt) => format!("date({fmt})"),
            None => "date".to_string(),
        },
        'T' => match spec.take_keyword("TIMFMT").and_then(|k| k.args) {
            Some(fmt) => format!("time({fmt})"),
            None => "time".to_string(),
        },
        'Z' => "timestamp".to_string(),
        '*' => match spec.take_keyword("PROCPTR") {
            Some(_) => "pointer(*proc)".to_string(),
            None => "pointer".to_string(),
        },
        'N' => "ind".to_string(),
        'O' => match spec.take_keyword("CLASS").and_then(|k| k.args) {
            Some(class) => format!("object({class})"),
            None => "object".to_string(),
        },
        other => {
            debug!(data_type = %other, "unknown data type");
            return None;
        }
    };
    Some(text)
}

/// Walk back from a subfield to the declaration that contains it.
pub fn find_container(lines: &[String], index: usize) -> Container {
    let mut i = index;
    while let Some(p) = prev_declaration_line(lines, i) {
        let line = &lines[p];
        match spec_type(line) {
            Some(SpecType::Definition) => match col(line, 24, 25).to_ascii_uppercase().as_str() {
                "DS" => return Container::DataStructure(container_name(lines, p)),
                "PR" => return Container::Prototype(container_name(lines, p)),
                "PI" => return Container::Interface(container_name(lines, p)),
                "S" | "C" => return Container::None,
                _ => {}
            },
            Some(SpecType::Procedure) => return Container::Procedure,
            _ => return Container::None,
        }
        i = p;
    }
    Container::None
}

fn container_name(lines: &[String], index: usize) -> String {
    let mut name = col(&lines[index], 7, 21);
    let mut i = index;
    while let Some(p) = prev_code_line(lines, i) {
        match name_fragment(&lines[p]) {
            Some(fragment) => name.insert_str(0, &fragment),
            None => break,
        }
        i = p;
    }
    name
}

/// The declaration after this one is a subfield or parameter.
fn has_members(lines: &[String], stmt: &CollectedStmt) -> bool {
    let Some(next) = next_declaration_line(lines, stmt.last_index()) else {
        return false;
    };
    let line = &lines[next];
    if spec_type(line) != Some(SpecType::Definition) {
        return false;
    }
    name_fragment(line).is_some() || col(line, 24, 25).is_empty()
}

fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "*N"
    } else {
        name
    }
}

fn push_keywords(out: &mut String, keywords: &[Keyword]) {
    for kw in keywords {
        out.push(' ');
        out.push_str(&quote_object_keyword(kw).to_string());
    }
}

/// Convert a definition statement.
pub fn convert(stmt: &CollectedStmt, ctx: &ConvertContext<'_>) -> Result<Converted> {
    let mut spec = DefinitionSpec::parse(stmt)?;
    let opts = ctx.options;
    let name = display_name(&spec.name).to_string();

    match spec.kind {
        DeclKind::Constant => {
            let value = match spec.take_keyword("CONST") {
                Some(kw) => kw.args.unwrap_or_default(),
                None => spec.keyword_text.clone(),
            };
            Ok(Converted::code(format!("dcl-c {name} {value}")))
        }
        DeclKind::Standalone => {
            let mut text = format!("dcl-s {name}");
            append_type_and_keywords(&mut text, &mut spec, opts.convert_bin_to_int);
            Ok(Converted::code(text))
        }
        DeclKind::DataStructure => {
            if spec.external && spec.keyword("EXTNAME").is_none() {
                spec.keywords
                    .insert(0, Keyword::new("EXTNAME", Some(quote_name(&spec.name))));
            }
            match spec.ds_type {
                'S' if spec.keyword("PSDS").is_none() => {
                    spec.keywords.push(Keyword::new("PSDS", None))
                }
                'U' if spec.keyword("DTAARA").is_none() => spec
                    .keywords
                    .push(Keyword::new("DTAARA", Some("*AUTO".to_string()))),
                _ => {}
            }
            if !spec.to.is_empty() && spec.keyword("LEN").is_none() && spec.keyword("LIKEDS").is_none() {
                spec.keywords.push(Keyword::new("LEN", Some(spec.to.clone())));
            }
            if opts.add_inz && spec.keyword("INZ").is_none() {
                spec.keywords.push(Keyword::new("INZ", None));
            }
            let like = spec.keyword("LIKEDS").is_some() || spec.keyword("LIKEREC").is_some();
            let mut text = format!("dcl-ds {name}");
            push_keywords(&mut text, &spec.keywords);
            if like {
                Ok(Converted::code(text))
            } else if has_members(ctx.lines, stmt) {
                Ok(Converted::code(text).with_closer("end-ds"))
            } else {
                text.push_str(" end-ds");
                Ok(Converted::code(text))
            }
        }
        DeclKind::Prototype | DeclKind::Interface => {
            let (open, close) = if spec.kind == DeclKind::Prototype {
                ("dcl-pr", "end-pr")
            } else {
                ("dcl-pi", "end-pi")
            };
            let mut text = format!("{open} {name}");
            append_type_and_keywords(&mut text, &mut spec, opts.convert_bin_to_int);
            if has_members(ctx.lines, stmt) {
                Ok(Converted::code(text).with_closer(close))
            } else {
                text.push(' ');
                text.push_str(close);
                Ok(Converted::code(text))
            }
        }
        DeclKind::Subfield => convert_subfield(stmt, spec, ctx),
    }
}

fn convert_subfield(
    stmt: &CollectedStmt,
    mut spec: DefinitionSpec,
    ctx: &ConvertContext<'_>,
) -> Result<Converted> {
    let container = find_container(ctx.lines, stmt.first_index());
    let is_parm = matches!(
        container,
        Container::Prototype(_) | Container::Interface(_) | Container::Procedure
    );
    let name = display_name(&spec.name).to_string();
    let mut text = if is_reserved_name(&name) {
        let prefix = if is_parm { "dcl-parm" } else { "dcl-subf" };
        format!("{prefix} {name}")
    } else {
        name
    };

    if let Container::DataStructure(ds) = &container {
        if let Some(pos) = spec.keywords.iter().position(|k| k.is("OVERLAY")) {
            let args = spec.keywords[pos].arg_list();
            let target_is_ds = args
                .first()
                .is_some_and(|a| a.eq_ignore_ascii_case(ds));
            let at = args.get(1).cloned().unwrap_or_else(|| "1".to_string());
            if target_is_ds && !at.starts_with('*') {
                spec.keywords[pos] = Keyword::new("POS", Some(at));
            }
        }
    }
    if spec.external && spec.keyword("EXTFLD").is_none() {
        spec.keywords.insert(0, Keyword::new("EXTFLD", None));
    }
    let pos = spec
        .from
        .parse::<u32>()
        .ok()
        .filter(|_| spec.keyword("POS").is_none());

    append_type_and_keywords(&mut text, &mut spec, ctx.options.convert_bin_to_int);
    if let Some(from) = pos {
        text.push_str(&format!(" POS({from})"));
    }
    Ok(Converted::lines(vec![FreeLine::code(text)]))
}

fn append_type_and_keywords(text: &mut String, spec: &mut DefinitionSpec, bin_to_int: BinToInt) {
    let adjust = spec
        .to
        .starts_with(['+', '-'])
        .then(|| spec.to.clone());
    if let Some(ty) = data_type(spec, bin_to_int) {
        text.push(' ');
        text.push_str(&ty);
    }
    if let Some(adjust) = adjust {
        if let Some(like) = spec.keywords.iter_mut().find(|k| k.is("LIKE")) {
            if let Some(args) = &like.args {
                like.args = Some(format!("{}:{}", args, adjust));
            }
        }
    }
    push_keywords(text, &spec.keywords);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::collect_at;
    use crate::config::ConvertOptions;
    use crate::convert::Action;
    use crate::keylist::KeyListCache;
    use crate::symbols::ResolvedSymbols;

    /// Column-exact definition line.
    fn d(name: &str, decl: &str, from: &str, to: &str, ty: &str, dec: &str, kws: &str) -> String {
        format!(
            "     D{:<15}  {:<2}{:>7}{:>7}{:1}{:>2} {}",
            name, decl, from, to, ty, dec, kws
        )
    }

    fn kw(text: &str) -> String {
        format!("     D{:37}{}", "", text)
    }

    fn convert_at(lines: &[String], index: usize, opts: &ConvertOptions) -> Converted {
        let keylists = KeyListCache::default();
        let symbols = ResolvedSymbols::unavailable();
        let ctx = ConvertContext {
            options: opts,
            keylists: &keylists,
            lines,
            symbols: &symbols,
            sql_member: false,
        };
        let stmt = collect_at(lines, index).unwrap();
        convert(&stmt, &ctx).unwrap()
    }

    fn code(c: &Converted) -> String {
        match &c.action {
            Action::Replace(lines) => lines[0].text().to_string(),
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn test_standalone_types() {
        let opts = ConvertOptions::default();
        let cases = [
            (d("NAME", "S", "", "10", "A", "", ""), "dcl-s NAME char(10)"),
            (d("AMT", "S", "", "11", "P", "2", ""), "dcl-s AMT packed(11:2)"),
            (d("QTY", "S", "", "5", "", "0", ""), "dcl-s QTY packed(5:0)"),
            (d("CNT", "S", "", "10", "I", "0", ""), "dcl-s CNT int(10)"),
            (d("FLAG", "S", "", "", "N", "", ""), "dcl-s FLAG ind"),
            (d("TODAY", "S", "", "", "D", "", ""), "dcl-s TODAY date"),
            (d("DT", "S", "", "", "D", "", "DATFMT(*USA)"), "dcl-s DT date(*USA)"),
            (d("PTR", "S", "", "", "*", "", "PROCPTR"), "dcl-s PTR pointer(*proc)"),
            (d("V", "S", "", "50", "A", "", "VARYING"), "dcl-s V varchar(50)"),
            (d("W", "S", "", "50", "A", "", "VARYING(4)"), "dcl-s W varchar(50:4)"),
            (d("B4", "S", "", "4", "B", "0", ""), "dcl-s B4 int(5)"),
            (d("B5", "S", "", "5", "B", "0", ""), "dcl-s B5 bindec(5:0)"),
            (d("CPY", "S", "", "", "", "", "LIKE(NAME)"), "dcl-s CPY LIKE(NAME)"),
        ];
        for (line, expected) in cases {
            let lines = vec![line];
            assert_eq!(code(&convert_at(&lines, 0, &opts)), expected);
        }
    }

    #[test]
    fn test_like_length_adjust() {
        let opts = ConvertOptions::default();
        let lines = vec![d("BIG", "S", "", "+5", "", "", "LIKE(NAME)")];
        assert_eq!(code(&convert_at(&lines, 0, &opts)), "dcl-s BIG LIKE(NAME:+5)");
    }

    #[test]
    fn test_bin_to_int_modes() {
        let mut opts = ConvertOptions::default();
        let lines = vec![d("B5", "S", "", "5", "B", "0", "")];
        opts.convert_bin_to_int = BinToInt::Always;
        assert_eq!(code(&convert_at(&lines, 0, &opts)), "dcl-s B5 int(10)");
        opts.convert_bin_to_int = BinToInt::Disable;
        let lines = vec![d("B4", "S", "", "4", "B", "0", "")];
        assert_eq!(code(&convert_at(&lines, 0, &opts)), "dcl-s B4 bindec(4:0)");
    }

    #[test]
    fn test_dim_divides_positions_before_int_mapping() {
        assert_eq!(adjusted_length('I', 20, Some(5)), 10);
        assert_eq!(adjusted_length('I', 5, Some(5)), 3);
        assert_eq!(adjusted_length('P', 10, Some(5)), 3);
        assert_eq!(adjusted_length('A', 50, Some(5)), 10);
        assert_eq!(adjusted_length('B', 8, Some(2)), 9);
    }

    #[test]
    fn test_data_structure_with_subfields() {
        let opts = ConvertOptions::default();
        let lines = vec![
            d("CUST", "DS", "", "", "", "", "QUALIFIED"),
            d("ID", "", "1", "4", "I", "0", ""),
            d("ARR", "", "5", "24", "I", "0", "DIM(5)"),
            d("NAME", "", "", "30", "A", "", "OVERLAY(CUST:25)"),
            d("READ", "", "", "1", "A", "", ""),
        ];
        let ds = convert_at(&lines, 0, &opts);
        assert_eq!(code(&ds), "dcl-ds CUST QUALIFIED");
        assert_eq!(ds.closer.as_deref(), Some("end-ds"));
        assert_eq!(code(&convert_at(&lines, 1, &opts)), "ID int(10) POS(1)");
        assert_eq!(code(&convert_at(&lines, 2, &opts)), "ARR int(10) DIM(5) POS(5)");
        assert_eq!(code(&convert_at(&lines, 3, &opts)), "NAME char(30) POS(25)");
        assert_eq!(code(&convert_at(&lines, 4, &opts)), "dcl-subf READ char(1)");
    }

    #[test]
    fn test_data_structure_without_subfields_closes_inline() {
        let opts = ConvertOptions::default();
        let lines = vec![
            d("CUSTREC", "DS", "", "", "", "", "EXTNAME(custmast)"),
            d("X", "S", "", "1", "A", "", ""),
        ];
        let ds = convert_at(&lines, 0, &opts);
        assert_eq!(code(&ds), "dcl-ds CUSTREC EXTNAME('CUSTMAST') end-ds");
        assert_eq!(ds.closer, None);

        let lines = vec![d("COPY", "DS", "", "", "", "", "LIKEDS(CUSTREC)")];
        let ds = convert_at(&lines, 0, &opts);
        assert_eq!(code(&ds), "dcl-ds COPY LIKEDS(CUSTREC)");
        assert_eq!(ds.closer, None);
    }

    #[test]
    fn test_external_and_special_data_structures() {
        let mut opts = ConvertOptions::default();
        opts.add_inz = true;
        let ext = format!("     D{:<15}E DS", "CUSTMAST");
        let lines = vec![ext];
        assert_eq!(
            code(&convert_at(&lines, 0, &opts)),
            "dcl-ds CUSTMAST EXTNAME('CUSTMAST') INZ end-ds"
        );

        let psds = format!("     D{:<15} SDS", "PGMSTS");
        let lines = vec![psds];
        assert_eq!(
            code(&convert_at(&lines, 0, &opts)),
            "dcl-ds PGMSTS PSDS INZ end-ds"
        );

        let dtaara = format!("     D{:<15} UDS", "LDA");
        let lines = vec![dtaara];
        assert_eq!(
            code(&convert_at(&lines, 0, &opts)),
            "dcl-ds LDA DTAARA(*AUTO) INZ end-ds"
        );
    }

    #[test]
    fn test_dtaara_var_and_quoting() {
        let kw = Keyword::new("DTAARA", Some("*VAR:AREANAME".to_string()));
        assert_eq!(quote_object_keyword(&kw).to_string(), "DTAARA(AREANAME)");
        let kw = Keyword::new("DTAARA", Some("mydta".to_string()));
        assert_eq!(quote_object_keyword(&kw).to_string(), "DTAARA('MYDTA')");
        let kw = Keyword::new("EXTNAME", Some("file:fmt:*ALL".to_string()));
        assert_eq!(
            quote_object_keyword(&kw).to_string(),
            "EXTNAME('FILE':'FMT':*ALL)"
        );
        let kw = Keyword::new("EXTNAME", Some("'MYLIB/FILE'".to_string()));
        assert_eq!(quote_object_keyword(&kw).to_string(), "EXTNAME('MYLIB/FILE')");
    }

    #[test]
    fn test_prototype_and_parameters() {
        let opts = ConvertOptions::default();
        let lines = vec![
            d("GETNAME", "PR", "", "30", "A", "", "EXTPROC('getName')"),
            d("ID", "", "", "10", "I", "0", "CONST"),
            d("LEAVE", "", "", "1", "N", "", ""),
            d("NOPARMS", "PR", "", "", "", "", "EXTPGM('NOPARMS')"),
        ];
        let pr = convert_at(&lines, 0, &opts);
        assert_eq!(code(&pr), "dcl-pr GETNAME char(30) EXTPROC('getName')");
        assert_eq!(pr.closer.as_deref(), Some("end-pr"));
        assert_eq!(code(&convert_at(&lines, 1, &opts)), "ID int(10) CONST");
        assert_eq!(code(&convert_at(&lines, 2, &opts)), "dcl-parm LEAVE ind");
        assert_eq!(
            code(&convert_at(&lines, 3, &opts)),
            "dcl-pr NOPARMS EXTPGM('NOPARMS') end-pr"
        );
    }

    #[test]
    fn test_members_after_blank_line_and_directive() {
        let opts = ConvertOptions::default();
        let lines = vec![
            d("CUST", "DS", "", "", "", "", ""),
            "     D".to_string(),
            "      /IF DEFINED(WIDE)".to_string(),
            d("ID", "", "", "5", "P", "0", ""),
            "      /ENDIF".to_string(),
            d("NAME", "", "", "20", "A", "", ""),
        ];
        let ds = convert_at(&lines, 0, &opts);
        assert_eq!(code(&ds), "dcl-ds CUST");
        assert_eq!(ds.closer.as_deref(), Some("end-ds"));

        let lines = vec![
            d("GETNAME", "PR", "", "30", "A", "", ""),
            "     D".to_string(),
            "      /IF DEFINED(TRACE)".to_string(),
            d("LEAVE", "", "", "1", "N", "", ""),
        ];
        let pr = convert_at(&lines, 0, &opts);
        assert_eq!(pr.closer.as_deref(), Some("end-pr"));
        assert_eq!(code(&convert_at(&lines, 3, &opts)), "dcl-parm LEAVE ind");
    }

    #[test]
    fn test_interface_without_name() {
        let opts = ConvertOptions::default();
        let lines = vec![d("", "PI", "", "", "", "", ""), d("PARM1", "", "", "10", "A", "", "")];
        let pi = convert_at(&lines, 0, &opts);
        assert_eq!(code(&pi), "dcl-pi *N");
        assert_eq!(pi.closer.as_deref(), Some("end-pi"));
    }

    #[test]
    fn test_constants() {
        let opts = ConvertOptions::default();
        let lines = vec![
            d("MAXROWS", "C", "", "", "", "", "CONST(100)"),
            d("TITLE", "C", "", "", "", "", "'Customer List'"),
        ];
        assert_eq!(code(&convert_at(&lines, 0, &opts)), "dcl-c MAXROWS 100");
        assert_eq!(code(&convert_at(&lines, 1, &opts)), "dcl-c TITLE 'Customer List'");
    }

    #[test]
    fn test_keyword_continuation_and_long_name() {
        let opts = ConvertOptions::default();
        let lines = vec![
            "     DCUSTOMER_BALANCE_...".to_string(),
            d("DUE", "S", "", "11", "P", "2", "INZ(0)"),
            kw("DIM(12)"),
        ];
        assert_eq!(
            code(&convert_at(&lines, 2, &opts)),
            "dcl-s CUSTOMER_BALANCE_DUE packed(11:2) INZ(0) DIM(12)"
        );
    }

    #[test]
    fn test_split_keywords_with_quotes() {
        let kws = split_keywords("INZ('A (B)') DIM(10) QUALIFIED");
        assert_eq!(kws.len(), 3);
        assert_eq!(kws[0].args.as_deref(), Some("'A (B)'"));
        assert_eq!(kws[2].name, "QUALIFIED");
        assert_eq!(split_args("'A:B':C"), vec!["'A:B'", "C"]);
    }

    #[test]
    fn test_invalid_declaration_type() {
        let lines = vec![d("X", "ZZ", "", "1", "A", "", "")];
        let keylists = KeyListCache::default();
        let symbols = ResolvedSymbols::unavailable();
        let opts = ConvertOptions::default();
        let ctx = ConvertContext {
            options: &opts,
            keylists: &keylists,
            lines: &lines,
            symbols: &symbols,
            sql_member: false,
        };
        let stmt = collect_at(&lines, 0).unwrap();
        assert!(matches!(
            convert(&stmt, &ctx),
            Err(RpgError::InvalidField { .. })
        ));
    }
}
