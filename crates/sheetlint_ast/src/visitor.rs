//! Visitor pattern for stylesheet traversal.
//!
//! - [`Visitor`] - read-only traversal with early termination
//! - [`MutVisitor`] - in-place transformation
//! - [`walk_nodes`] / [`walk_nodes_mut`] - dispatch over a node slice
//!
//! # Example
//!
//! ```rust
//! use sheetlint_ast::{Comment, Node, Root};
//! use sheetlint_ast::visitor::{VisitResult, Visitor, walk_nodes};
//! use std::ops::ControlFlow;
//!
//! struct CommentCollector(Vec<String>);
//!
//! impl Visitor for CommentCollector {
//!     fn visit_comment(&mut self, comment: &Comment) -> VisitResult {
//!         self.0.push(comment.text.clone());
//!         ControlFlow::Continue(())
//!     }
//! }
//!
//! let root = Root::new(vec![Node::Comment(Comment::new("hello"))]);
//! let mut collector = CommentCollector(Vec::new());
//! let _ = walk_nodes(&mut collector, &root.nodes);
//! assert_eq!(collector.0, vec!["hello"]);
//! ```

use std::ops::ControlFlow;

use crate::node::{AtRule, Comment, Declaration, Node, Rule};

/// `Break` stops the traversal.
pub type VisitResult = ControlFlow<()>;

/// Read-only visitor. Container hooks recurse by default.
pub trait Visitor {
    fn visit_rule(&mut self, rule: &Rule) -> VisitResult {
        walk_nodes(self, &rule.nodes)
    }

    fn visit_at_rule(&mut self, at_rule: &AtRule) -> VisitResult {
        match &at_rule.nodes {
            Some(nodes) => walk_nodes(self, nodes),
            None => ControlFlow::Continue(()),
        }
    }

    fn visit_decl(&mut self, _decl: &Declaration) -> VisitResult {
        ControlFlow::Continue(())
    }

    fn visit_comment(&mut self, _comment: &Comment) -> VisitResult {
        ControlFlow::Continue(())
    }
}

/// Transforming visitor. Container hooks recurse by default.
pub trait MutVisitor {
    fn visit_rule_mut(&mut self, rule: &mut Rule) {
        walk_nodes_mut(self, &mut rule.nodes);
    }

    fn visit_at_rule_mut(&mut self, at_rule: &mut AtRule) {
        if let Some(nodes) = at_rule.nodes.as_mut() {
            walk_nodes_mut(self, nodes);
        }
    }

    fn visit_decl_mut(&mut self, _decl: &mut Declaration) {}

    fn visit_comment_mut(&mut self, _comment: &mut Comment) {}
}

pub fn walk_nodes<V: Visitor + ?Sized>(visitor: &mut V, nodes: &[Node]) -> VisitResult {
    for node in nodes {
        match node {
            Node::Rule(rule) => visitor.visit_rule(rule)?,
            Node::AtRule(at_rule) => visitor.visit_at_rule(at_rule)?,
            Node::Decl(decl) => visitor.visit_decl(decl)?,
            Node::Comment(comment) => visitor.visit_comment(comment)?,
        }
    }
    ControlFlow::Continue(())
}

pub fn walk_nodes_mut<V: MutVisitor + ?Sized>(visitor: &mut V, nodes: &mut [Node]) {
    for node in nodes {
        match node {
            Node::Rule(rule) => visitor.visit_rule_mut(rule),
            Node::AtRule(at_rule) => visitor.visit_at_rule_mut(at_rule),
            Node::Decl(decl) => visitor.visit_decl_mut(decl),
            Node::Comment(comment) => visitor.visit_comment_mut(comment),
        }
    }
}
