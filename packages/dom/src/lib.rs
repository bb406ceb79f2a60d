//! Permissive HTML document model for the visual editor.
//!
//! Parses real-world markup into a mutable tree, serializes it back, and
//! assigns the stable element identifiers the rest of the engine keys on.
//! The parser is total: malformed input degrades (unclosed tags are
//! recovered, stray end tags ignored) instead of failing.

pub mod parser;
pub mod serializer;
pub mod tagger;
pub mod tokenizer;
pub mod tree;

pub use parser::parse;
pub use serializer::serialize;
pub use tagger::{tag_document, tag_html, IdIssuer, VISUAL_ID_ATTR};
pub use tree::{Document, Element, Node};
