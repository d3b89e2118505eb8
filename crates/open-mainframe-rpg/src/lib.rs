#![forbid(unsafe_code)]
//! # Fixed-format to free-format RPG IV conversion
//!
//! Converts column-positional RPG IV source to free-form RPG IV, one
//! logical statement at a time, and returns the result as plain edits for
//! the caller to apply.
//!
//! ## Pipeline
//!
//! - **Collection** (`collect`): find the physical lines of each logical
//!   statement, including continuations, conditioning lines and compound
//!   `IFxx`/`ANDxx` and `CASxx` blocks
//! - **Conversion** (`convert`, `opcodes`): per spec type, and per opcode
//!   for calculations, with resulting indicators rewritten as assignments
//! - **Layout** (`layout`): margins, `;` terminators and wrapping
//! - **Orchestration** (`converter`): edits, deferred declarations and
//!   `end-xx` closers, diagnostics
//!
//! ## Example
//!
//! ```rust,ignore
//! use open_mainframe_rpg::{apply_edits, Converter, ConvertOptions, SourceSymbols};
//!
//! let symbols = SourceSymbols::from_source(&lines);
//! let result = Converter::new(ConvertOptions::default())
//!     .convert(&lines, None, &symbols)
//!     .await;
//! let converted = apply_edits(&lines, &result);
//! ```

pub mod collect;
pub mod config;
pub mod continuation;
pub mod convert;
pub mod converter;
pub mod diagnostic;
pub mod error;
pub mod keylist;
pub mod layout;
pub mod opcode;
pub mod opcodes;
pub mod source;
pub mod symbols;

pub use collect::{collect_all, collect_at, collect_range, CollectedStmt, StmtKind};
pub use config::{BinToInt, ConvertOptions, MoveaStyle};
pub use convert::{Action, Converted, FreeLine};
pub use converter::{apply_edits, ConversionResult, Converter, Edit, Insertion};
pub use diagnostic::{Diagnostic, Severity};
pub use error::{Result, RpgError};
pub use keylist::KeyListCache;
pub use source::SourceFormat;
pub use symbols::{DataType, NoSymbols, SourceSymbols, SymbolInfo, SymbolResolver};
