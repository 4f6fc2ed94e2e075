//! # Incremental BibTeX import
//!
//! This crate imports a BibTeX bibliography into a dictionary of [`Entry`] records keyed by
//! citation key. Parsing is performed in bounded passes, so that a host with a single-threaded
//! event loop can interleave other work with the import of a large file; see
//! [`ChunkScheduler`] and [`ParseRun`].
//!
//! ```
//! use bibtex_import::{ChunkScheduler, NoYield, ParserConfig};
//!
//! let input = r#"
//!     @string{prd = {Phys. Rev. D}}
//!     @article{key2020,
//!       author = {Doe, John},
//!       title = {{A Protected Title}},
//!       journal = prd,
//!       year = 2020,
//!     }
//! "#;
//!
//! let entries = ChunkScheduler::new(ParserConfig::default())
//!     .run(input, NoYield)
//!     .unwrap();
//! let entry = &entries["key2020"];
//! assert_eq!(entry.entry_type, "article");
//! assert_eq!(entry.field("title"), Some("A Protected Title"));
//! assert_eq!(entry.field("journal"), Some("Phys. Rev. D"));
//! ```
//!
//! A syntax error anywhere in the input fails the whole import, with a
//! [`Diagnostic`](report::Diagnostic) showing the offending lines.

/// Case-insensitive `@string` macro table.
pub mod abbrev;

/// Options for the import core.
pub mod config;

/// Bibliographic records.
pub mod entry;

/// Error types for parsing and importing.
pub mod error;

/// Author splitting and citation formatting.
pub mod format;

/// Line and column positions.
pub mod location;

/// Title normalization.
pub mod normalize;

/// The hand written grammar.
pub mod parse;

/// Rendering of syntax errors.
pub mod report;

/// Chunked, resumable parse runs.
pub mod scheduler;

/// Formal description of the grammar.
#[cfg(feature = "syntax")]
pub mod syntax;

/// Parsing on a background thread.
pub mod worker;

// re-exports
pub use config::ParserConfig;
pub use entry::{Author, Entry, EntryDict};
pub use error::{Error, Result, SyntaxErrorKind, SyntaxFailure};
pub use location::{Range, SourceLocation};
pub use normalize::normalize;
pub use parse::{ParseState, PassOutcome, parse_pass};
pub use report::render;
pub use scheduler::{
    ChunkScheduler, NoYield, ParseRun, Progress, RunStatus, Step, ThreadYield, YieldPoint, import,
};
pub use worker::{ExitStatus, ParserWorker, WorkerError, WorkerPolicy, WorkerReply};
