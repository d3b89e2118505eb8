//! Conversion options.
//!
//! Every flag gates one emission rule. Keys accept both the snake_case
//! spelling and the camelCase spelling used by editor settings files.

use serde::{Deserialize, Serialize};

/// Binary (`B`) field handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinToInt {
    /// Always emit `bindec(n:d)`.
    Disable,
    /// Emit `int(n)` for any binary field with zero decimals.
    Always,
    /// Emit `int(n)` only when the field has zero decimals and exactly 4 or
    /// 9 digits, where `int` holds every value `bindec` could.
    #[default]
    Auto,
}

/// How `MOVEA` into the indicator array is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MoveaStyle {
    /// A `FOR` loop assigning one indicator per iteration.
    #[serde(rename = "FOR", alias = "for")]
    For,
    /// `%SUBARR(*IN:n:len) = %LIST(...)`.
    #[default]
    #[serde(rename = "LIST", alias = "list")]
    List,
}

/// Options for one conversion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Binary field mapping.
    #[serde(alias = "convertBINTOINT")]
    pub convert_bin_to_int: BinToInt,
    /// Append `INZ` to data structures without one.
    #[serde(alias = "addINZ")]
    pub add_inz: bool,
    /// Last column a wrapped statement may use.
    #[serde(alias = "rightMargin")]
    pub right_margin: usize,
    /// Column where statements start.
    #[serde(alias = "leftMargin")]
    pub left_margin: usize,
    /// Column where wrapped continuation lines start.
    #[serde(alias = "leftMarginContinued")]
    pub left_margin_continued: usize,
    /// Emit the byte-exact `%SUBST` form of `MOVEL` as a comment.
    #[serde(alias = "altMOVEL")]
    pub alt_movel: bool,
    /// `MOVEA` rewrite style.
    #[serde(alias = "indyMOVEAStyle")]
    pub indy_movea_style: MoveaStyle,
    /// Add `*EXT` to externally described file devices.
    #[serde(alias = "addEXTDEVFLAG")]
    pub add_ext_dev_flag: bool,
    /// Delete `/FREE` and `/END-FREE`.
    #[serde(alias = "removeFREEdir")]
    pub remove_free_dir: bool,
    /// Delete `/EJECT`, `/SPACE` and `/TITLE`.
    #[serde(alias = "removeOLDdir")]
    pub remove_old_dir: bool,
    /// Rewrite `/COPY` as `/INCLUDE` in RPG members.
    #[serde(alias = "replaceCOPYinRPG")]
    pub replace_copy_in_rpg: bool,
    /// Rewrite `/COPY` as `/INCLUDE` in SQL RPG members.
    #[serde(alias = "replaceCOPYinSQLRPG")]
    pub replace_copy_in_sqlrpg: bool,
    /// Work variable used by `CAT` and `MOVEA` loops.
    #[serde(alias = "tempVar1")]
    pub temp_var1: String,
    /// Second work variable.
    #[serde(alias = "tempVar2")]
    pub temp_var2: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            convert_bin_to_int: BinToInt::Auto,
            add_inz: false,
            right_margin: 80,
            left_margin: 8,
            left_margin_continued: 10,
            alt_movel: false,
            indy_movea_style: MoveaStyle::List,
            add_ext_dev_flag: true,
            remove_free_dir: true,
            remove_old_dir: true,
            replace_copy_in_rpg: false,
            replace_copy_in_sqlrpg: false,
            temp_var1: "FREE_WORK1".to_string(),
            temp_var2: "FREE_WORK2".to_string(),
        }
    }
}
