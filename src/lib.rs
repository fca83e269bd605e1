//! Incremental, zero-copy JSON parser producing a flat node arena.
//!
//! `flatjson` ingests a byte stream in arbitrarily-sized chunks and
//! builds a contiguous array of typed nodes instead of a pointer graph.
//! Strings and numbers are never copied or converted during parsing: each
//! node records an offset and length into the source stream, and values
//! are resolved lazily through a [`Document`] view. Container nodes carry
//! their total descendant count, so next-sibling navigation is a single
//! index addition no matter how deeply a subtree nests.
//!
//! # Examples
//!
//! Parse a slice and navigate:
//!
//! ```rust
//! use flatjson::Document;
//!
//! let input = br#"{"name":"Ada","scores":[1,2,3]}"#;
//! let arena = flatjson::parse(input)?;
//! let doc = Document::new(&arena, input);
//!
//! let root = doc.root().unwrap();
//! let name = doc.object_value(root, "name").unwrap();
//! assert_eq!(doc.raw(name), b"Ada");
//!
//! let scores = doc.object_value(root, "scores").unwrap();
//! assert_eq!(doc.node(scores).children, 3);
//! assert_eq!(doc.as_int(doc.array_element(scores, 2).unwrap()), Some(3));
//! # Ok::<(), flatjson::ParseError>(())
//! ```
//!
//! Feed a stream chunk by chunk — chunk boundaries may fall anywhere,
//! including inside escape sequences and literals:
//!
//! ```rust
//! use flatjson::Parser;
//!
//! let mut parser = Parser::new();
//! let chunks: [&[u8]; 4] = [b"[tr", b"ue,\"a\\u00", b"20b\",12", b".5]"];
//! for chunk in chunks {
//!     parser.feed(chunk)?;
//! }
//! parser.finish()?;
//! assert_eq!(parser.arena().len(), 4);
//! # Ok::<(), flatjson::ParseError>(())
//! ```
//!
//! Serialize back out, byte-identical modulo whitespace:
//!
//! ```rust
//! use flatjson::{Document, Style};
//!
//! let input = br#"{ "msg" : "a\nb" }"#;
//! let arena = flatjson::parse(input)?;
//! let doc = Document::new(&arena, input);
//! assert_eq!(doc.to_vec(Style::Compact), br#"{"msg":"a\nb"}"#);
//! # Ok::<(), flatjson::ParseError>(())
//! ```
//!
//! Inspect failures with position and snippet:
//!
//! ```rust
//! use flatjson::ErrorKind;
//!
//! let input = br#"{"a": 1,, "b": 2}"#;
//! let err = flatjson::parse(input).unwrap_err();
//! assert_eq!(err.kind, ErrorKind::Unexpected);
//! assert_eq!(err.pos, 8);
//! println!("{}\n{}", err, err.snippet(input));
//! ```

pub mod arena;
pub mod builder;
pub mod constants;
pub mod document;
pub mod encode;
pub mod error;
pub mod node;
pub mod options;
pub mod parser;
pub mod sink;

pub use crate::arena::{ArenaFull, NodeArena};
pub use crate::builder::TreeBuilder;
pub use crate::document::Document;
pub use crate::encode::{escape_into, serialize};
pub use crate::error::{ErrorKind, ParseError};
pub use crate::node::{key_hash, Node, NodeId, NodeType};
pub use crate::options::{ParserOptions, Style};
pub use crate::parser::Parser;
pub use crate::sink::{ByteSink, Sink};

pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse a complete document held in one slice, with default capacities.
///
/// Returns the filled arena; pair it with the same `input` in a
/// [`Document`] to navigate. The arena holds offsets, not bytes, so the
/// input must stay alive and unchanged for as long as the result is read.
pub fn parse(input: &[u8]) -> Result<NodeArena> {
    parse_with(input, ParserOptions::default())
}

/// [`parse`] with explicit arena and depth bounds.
pub fn parse_with(input: &[u8], options: ParserOptions) -> Result<NodeArena> {
    let mut parser = Parser::with_options(options);
    parser.feed(input)?;
    parser.finish()?;
    Ok(parser.into_arena())
}
