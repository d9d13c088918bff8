//! A zero-copy, lazily materialized JSON parser and writer for
//! latency-sensitive workloads: exchange market-data feeds and RPC hot
//! paths, where most fields of most messages are never actually read.
//!
//! Parsing is two-phase (§4): [`Parser::parse`] tokenizes the input once
//! into a flat, index-based AST, and every [`views::Value`] handed back
//! from it is a cheap, `Copy` reference into that AST -- decoding a string's
//! escapes, parsing a number's digits, or indexing into an object's fields
//! only happens the first time a caller actually asks for it, and is
//! memoized from then on for the life of the parse.
//!
//! [`Writer`] is the mirror image for the output side: an immediate-mode,
//! zero-allocation streaming JSON emitter for building responses or
//! re-publishing a transformed feed without ever materializing an
//! intermediate tree.
//!
//! ```
//! use tapejson::{Config, Parser};
//!
//! let mut parser = Parser::new(Config::default());
//! let doc = parser.parse(br#"{"symbol":"BTCUSDT","price":27000.5}"#).unwrap();
//! let obj = doc.value().as_object().unwrap();
//! assert_eq!(obj.get("symbol").unwrap().unwrap().as_string().unwrap().to_string_decoded().unwrap(), "BTCUSDT");
//! ```

mod ast;
mod config;
mod context;
mod cursor;
mod error;
mod format;
mod hash;
mod number;
mod parser;
mod pool;
mod slice;
mod stream;
mod tokenizer;
pub mod views;
mod writer;

pub use config::Config;
pub use error::{ParseError, UsageError};
pub use parser::{Document, Parser};
pub use slice::ByteSlice;
pub use stream::ArrayCursor;
pub use views::{
    ArrayIter, ArrayView, BooleanView, NullView, NumberView, ObjectEntry, ObjectIter, ObjectView,
    StringView, Value,
};
pub use writer::Writer;
