//! # sheetlint_parser
//!
//! Parser abstraction layer for sheetlint.
//!
//! This crate provides:
//! - A `Parser` trait for plugging in other stylesheet syntaxes
//! - A built-in, lossless CSS parser
//!
//! ## Example
//!
//! ```rust
//! use sheetlint_parser::{CssParser, Parser};
//!
//! let source = "a { color: red; }\n";
//! let root = CssParser::new().parse(source, None).unwrap();
//!
//! assert_eq!(root.nodes.len(), 1);
//! assert_eq!(root.to_css(), source);
//! ```

mod css;
mod error;
mod traits;

pub use css::CssParser;
pub use error::{ParseError, SyntaxError};
pub use traits::Parser;
