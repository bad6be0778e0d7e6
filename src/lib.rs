//! Directive preprocessor for the uasm Beta micro assembler.
//!
//! Each source line is stripped of its `|` comment, scanned for a `.directive`
//! token and, when one is found, decoded into a [`Directive`]. Nothing here
//! reads files, expands macros or emits code.
#[macro_use]
extern crate pest_derive;
#[macro_use]
extern crate serde_derive;

pub mod error;
pub use error::*;
pub mod comment;
pub mod directive;
pub mod expr_parser;
pub mod expr;
pub mod macros;
pub mod align;
pub mod preprocess;
pub use preprocess::{preprocess, Directive, ErrorPolicy, Options, Preprocessed, ProcessedLine, SourceLine};
pub use directive::{DirectiveKind, MatchMode};
pub use macros::MacroDefinition;
