//! # sheetlint_ast
//!
//! Stylesheet tree definitions for sheetlint.
//!
//! The tree is owned and mutable so that rules can apply fixes in place.
//! Every node keeps the raw whitespace that surrounded it in the source,
//! which lets [`Root::to_css`] reproduce unmodified input byte-for-byte.
//!
//! ## Example
//!
//! ```rust
//! use sheetlint_ast::{Declaration, Node, Root, Rule};
//!
//! let mut rule = Rule::new("a");
//! rule.nodes.push(Node::Decl(Declaration::new("color", "red")));
//!
//! let mut root = Root::default();
//! root.nodes.push(Node::Rule(rule));
//!
//! assert_eq!(root.to_css(), "a {\n    color: red;\n}");
//! ```

mod node;
mod span;
pub mod visitor;

pub use node::{
    AtRule, AtRuleRaws, Comment, CommentRaws, DeclRaws, Declaration, Node, Root, Rule, RuleRaws,
    SourceRange,
};
pub use span::{Location, Position, Span};

pub use visitor::{MutVisitor, VisitResult, Visitor};
