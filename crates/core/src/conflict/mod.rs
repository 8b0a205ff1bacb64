//! Conflict-marker parsing and "keep ours" resolution.
//!
//! The conflict subsystem is responsible for:
//! 1. **Classification** -- walking a file line by line and tracking which
//!    region of a conflict block each line belongs to.
//! 2. **Resolution** -- keeping normal and "ours" lines, dropping "theirs"
//!    lines and every marker line.
//! 3. **Writing** -- putting the result back over the original file.

pub mod parser;
pub mod resolver;
pub mod writer;

pub use parser::{
    has_conflict_markers, LineClass, MarkerKind, MarkerParser, ParserState, SeparatorPolicy,
};
pub use resolver::{
    resolve_str, ConflictResolver, FileOutcome, Resolution, ResolveOptions, ResolveStats,
};
pub use writer::WriteMode;
