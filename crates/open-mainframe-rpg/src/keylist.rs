//! Key-list cache.
//!
//! Free-form file operations take their composite key inline, so every
//! `KLIST` name used as factor 1 of `CHAIN`, `SETLL`, `READE`, ... is
//! rewritten to the parenthesized list of its `KFLD` fields. The cache is
//! built once per conversion run from a forward scan of the whole member.

use std::collections::HashMap;

use tracing::debug;

use crate::opcode::base_name;
use crate::source::{col, is_skip_stmt, spec_type, SourceFormat, SpecType};

/// KLIST name to its ordered KFLD fields.
#[derive(Debug, Default, Clone)]
pub struct KeyListCache {
    lists: HashMap<String, Vec<String>>,
}

impl KeyListCache {
    /// Scan a member for `KLIST`/`KFLD` definitions.
    pub fn scan<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut cache = KeyListCache::default();
        let mut current: Option<String> = None;

        for line in lines {
            let line = line.as_ref();
            if is_skip_stmt(line, SourceFormat::Fixed) {
                continue;
            }
            if spec_type(line) != Some(SpecType::Calc) {
                current = None;
                continue;
            }
            match base_name(&col(line, 26, 35)).as_str() {
                "KLIST" => {
                    let name = col(line, 12, 25).to_ascii_uppercase();
                    cache.lists.insert(name.clone(), Vec::new());
                    current = Some(name);
                }
                "KFLD" => {
                    if let Some(name) = &current {
                        let field = col(line, 50, 63);
                        if let Some(fields) = cache.lists.get_mut(name) {
                            fields.push(field);
                        }
                    }
                }
                _ => current = None,
            }
        }

        debug!(count = cache.lists.len(), "key lists scanned");
        cache
    }

    /// Fields of a key list, if `name` is one.
    pub fn fields(&self, name: &str) -> Option<&[String]> {
        self.lists
            .get(&name.trim().to_ascii_uppercase())
            .map(Vec::as_slice)
    }

    /// `(F1 : F2 : ...)` for a key-list name.
    pub fn resolve(&self, name: &str) -> Option<String> {
        let fields = self.fields(name)?;
        if fields.is_empty() {
            return None;
        }
        Some(format!("({})", fields.join(" : ")))
    }

    /// Number of key lists.
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    /// No key lists were found.
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calc(f1: &str, op: &str, result: &str) -> String {
        format!("     C     {:<14}{:<10}{:<14}{:<14}", f1, op, "", result)
    }

    #[test]
    fn test_scan_and_resolve() {
        let lines = vec![
            calc("KEY1", "KLIST", ""),
            calc("", "KFLD", "F1"),
            calc("", "KFLD", "F2"),
            "     C* comment between".to_string(),
            calc("key2", "klist", ""),
            calc("", "kfld", "CUSNO"),
            calc("KEY1", "CHAIN", ""),
            calc("", "KFLD", "STRAY"),
        ];
        let cache = KeyListCache::scan(&lines);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.resolve("KEY1").as_deref(), Some("(F1 : F2)"));
        assert_eq!(cache.resolve("Key2").as_deref(), Some("(CUSNO)"));
        assert_eq!(cache.resolve("NOPE"), None);
    }

    #[test]
    fn test_empty_member() {
        let lines: Vec<String> = Vec::new();
        assert!(KeyListCache::scan(&lines).is_empty());
    }
}
