//! Definition spec collection.
//!
//! A definition is any number of `...` name fragments, the declaring line
//! and its keyword continuation lines. A line with a blank name but
//! attributes in columns 22-43 is an unnamed subfield and starts a new
//! statement, unless it directly follows a name fragment (then it is the
//! declaring line of the long name).

use super::{collect_named, CollectedStmt};
use crate::source::SpecType;

/// Collect the definition containing line `index`.
pub fn collect(lines: &[String], index: usize) -> CollectedStmt {
    collect_named(lines, index, SpecType::Definition)
}
