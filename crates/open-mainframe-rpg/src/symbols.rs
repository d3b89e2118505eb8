//! Operand type resolution.
//!
//! `MOVE`, `SUBST` and `TIME` need to know the type and length of their
//! operands to pick the right built-in function. Types come from a
//! [`SymbolResolver`]: an editor's symbol service, or [`SourceSymbols`],
//! which reads the member's own declarations.

use std::collections::HashMap;
use std::future::Future;

use crate::collect::{collect_all, cspec::CalcSpec, Detail, StmtKind};
use crate::convert::dspec::{DeclKind, DefinitionSpec};
use crate::source::SpecType;

/// Broad data type of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Char,
    Varchar,
    Graphic,
    Ucs2,
    Packed,
    Zoned,
    Binary,
    Integer,
    Unsigned,
    Float,
    Date,
    Time,
    Timestamp,
    Indicator,
    Pointer,
    DataStructure,
    Object,
}

impl DataType {
    /// Map a fixed-format data type letter.
    pub fn from_letter(letter: char) -> Option<Self> {
        Some(match letter.to_ascii_uppercase() {
            'A' => DataType::Char,
            'G' => DataType::Graphic,
            'C' => DataType::Ucs2,
            'P' => DataType::Packed,
            'S' => DataType::Zoned,
            'B' => DataType::Binary,
            'I' => DataType::Integer,
            'U' => DataType::Unsigned,
            'F' => DataType::Float,
            'D' => DataType::Date,
            'T' => DataType::Time,
            'Z' => DataType::Timestamp,
            'N' => DataType::Indicator,
            '*' => DataType::Pointer,
            'O' => DataType::Object,
            _ => return None,
        })
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            DataType::Packed
                | DataType::Zoned
                | DataType::Binary
                | DataType::Integer
                | DataType::Unsigned
                | DataType::Float
        )
    }

    pub fn is_character(self) -> bool {
        matches!(
            self,
            DataType::Char
                | DataType::Varchar
                | DataType::Graphic
                | DataType::Ucs2
                | DataType::DataStructure
        )
    }

    pub fn is_datetime(self) -> bool {
        matches!(self, DataType::Date | DataType::Time | DataType::Timestamp)
    }
}

/// What is known about one name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
    pub data_type: DataType,
    /// Characters or digits.
    pub length: Option<u32>,
    pub decimals: Option<u32>,
    /// `DATFMT`/`TIMFMT` value for date and time fields.
    pub format: Option<String>,
}

impl SymbolInfo {
    pub fn new(data_type: DataType, length: Option<u32>, decimals: Option<u32>) -> Self {
        Self {
            data_type,
            length,
            decimals,
            format: None,
        }
    }
}

/// Normalize an operand to the name a symbol table is keyed on: no array
/// index, no qualifier, upper case.
pub fn symbol_key(name: &str) -> String {
    let base = name.split('(').next().unwrap_or(name);
    let base = base.rsplit('.').next().unwrap_or(base);
    base.trim().to_ascii_uppercase()
}

/// An external type-lookup service.
pub trait SymbolResolver: Sync {
    /// Whether lookups can be answered at all.
    fn is_available(&self) -> bool;

    /// Look up one name.
    fn resolve(&self, name: &str) -> impl Future<Output = Option<SymbolInfo>> + Send;
}

/// No lookup service.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSymbols;

impl SymbolResolver for NoSymbols {
    fn is_available(&self) -> bool {
        false
    }

    fn resolve(&self, _name: &str) -> impl Future<Output = Option<SymbolInfo>> + Send {
        std::future::ready(None)
    }
}

/// Types inferred from the member's own definition specs and calculation
/// result-field definitions.
#[derive(Debug, Default, Clone)]
pub struct SourceSymbols {
    table: HashMap<String, SymbolInfo>,
}

impl SourceSymbols {
    /// Build the table from a fixed-format member.
    pub fn from_source(lines: &[String]) -> Self {
        let mut table = HashMap::new();
        for stmt in collect_all(lines) {
            match (stmt.kind, &stmt.detail) {
                (StmtKind::Spec(SpecType::Definition), _) => {
                    let Ok(spec) = DefinitionSpec::parse(&stmt) else {
                        continue;
                    };
                    if let Some(info) = definition_info(&spec) {
                        if !spec.name.is_empty() {
                            table.insert(symbol_key(&spec.name), info);
                        }
                    }
                }
                (StmtKind::Spec(SpecType::Calc), Detail::Calc(calc)) => {
                    if let Some(info) = result_field_info(calc) {
                        table.entry(symbol_key(&calc.result)).or_insert(info);
                    }
                }
                _ => {}
            }
        }
        Self { table }
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, name: &str, info: SymbolInfo) {
        self.table.insert(symbol_key(name), info);
    }

    /// Synchronous lookup.
    pub fn get(&self, name: &str) -> Option<&SymbolInfo> {
        self.table.get(&symbol_key(name))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl SymbolResolver for SourceSymbols {
    fn is_available(&self) -> bool {
        true
    }

    fn resolve(&self, name: &str) -> impl Future<Output = Option<SymbolInfo>> + Send {
        std::future::ready(self.get(name).cloned())
    }
}

fn definition_info(spec: &DefinitionSpec) -> Option<SymbolInfo> {
    match spec.kind {
        DeclKind::Prototype | DeclKind::Interface => return None,
        DeclKind::DataStructure => {
            let length = spec.to.parse().ok();
            return Some(SymbolInfo::new(DataType::DataStructure, length, None));
        }
        DeclKind::Constant => {
            let text = spec.keyword_text.trim();
            return if text.starts_with('\'') {
                let len = text.len().saturating_sub(2) as u32;
                Some(SymbolInfo::new(DataType::Char, Some(len), None))
            } else {
                None
            };
        }
        _ => {}
    }
    if spec.keyword("LIKE").is_some() || (spec.data_type == ' ' && spec.to.is_empty()) {
        return None;
    }
    let letter = spec.effective_type();
    let mut data_type = DataType::from_letter(letter)?;
    if data_type == DataType::Char && spec.keyword("VARYING").is_some() {
        data_type = DataType::Varchar;
    }
    let decimals = data_type.is_numeric().then(|| spec.decimals_value());
    let mut info = SymbolInfo::new(data_type, spec.length(), decimals);
    info.format = match data_type {
        DataType::Date => spec.keyword("DATFMT").and_then(|k| k.args.clone()),
        DataType::Time => spec.keyword("TIMFMT").and_then(|k| k.args.clone()),
        _ => None,
    };
    Some(info)
}

/// Type of a result field defined by length and decimals on its own line.
pub(crate) fn result_field_info(calc: &CalcSpec) -> Option<SymbolInfo> {
    if calc.result.is_empty() {
        return None;
    }
    let length: u32 = calc.length.parse().ok()?;
    Some(if calc.decimals.is_empty() {
        SymbolInfo::new(DataType::Char, Some(length), None)
    } else {
        SymbolInfo::new(DataType::Packed, Some(length), calc.decimals.parse().ok())
    })
}

/// Symbols resolved for the operands of one statement.
#[derive(Debug, Clone, Default)]
pub struct ResolvedSymbols {
    available: bool,
    entries: HashMap<String, SymbolInfo>,
}

impl ResolvedSymbols {
    /// No lookup service.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// An empty table backed by a working service.
    pub fn available() -> Self {
        Self {
            available: true,
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, name: &str, info: SymbolInfo) {
        self.entries.insert(symbol_key(name), info);
    }

    pub fn get(&self, name: &str) -> Option<&SymbolInfo> {
        self.entries.get(&symbol_key(name))
    }

    pub fn is_available(&self) -> bool {
        self.available
    }
}
