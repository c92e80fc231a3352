//! Stylesheet node definitions.
//!
//! Nodes own their children. Raw whitespace is kept next to every node so that
//! serialization reproduces the source exactly when nothing was changed.

use serde::{Deserialize, Serialize};

use crate::span::{Location, Span};

/// Where a node came from in the parsed source.
///
/// Nodes created by fixes carry no source range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceRange {
    pub span: Span,
    pub loc: Location,
}

impl SourceRange {
    pub const fn new(span: Span, loc: Location) -> Self {
        Self { span, loc }
    }
}

/// The stylesheet root.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Root {
    pub nodes: Vec<Node>,
    /// Text after the last node (whitespace, stray semicolons).
    pub after: String,
}

impl Root {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            after: String::new(),
        }
    }

    /// Serializes the tree back to stylesheet text.
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.write_css(&mut out);
        }
        out.push_str(&self.after);
        out
    }

    /// Visits every node depth-first, parents before children.
    pub fn walk<F: FnMut(&Node)>(&self, mut f: F) {
        fn go<F: FnMut(&Node)>(nodes: &[Node], f: &mut F) {
            for node in nodes {
                f(node);
                if let Some(children) = node.children() {
                    go(children, f);
                }
            }
        }
        go(&self.nodes, &mut f);
    }

    /// Mutable counterpart of [`Root::walk`].
    pub fn walk_mut<F: FnMut(&mut Node)>(&mut self, mut f: F) {
        fn go<F: FnMut(&mut Node)>(nodes: &mut [Node], f: &mut F) {
            for node in nodes {
                f(node);
                if let Some(children) = node.children_mut() {
                    go(children, f);
                }
            }
        }
        go(&mut self.nodes, &mut f);
    }

    pub fn walk_decls<F: FnMut(&Declaration)>(&self, mut f: F) {
        self.walk(|node| {
            if let Node::Decl(decl) = node {
                f(decl);
            }
        });
    }

    pub fn walk_decls_mut<F: FnMut(&mut Declaration)>(&mut self, mut f: F) {
        self.walk_mut(|node| {
            if let Node::Decl(decl) = node {
                f(decl);
            }
        });
    }

    pub fn walk_rules<F: FnMut(&Rule)>(&self, mut f: F) {
        self.walk(|node| {
            if let Node::Rule(rule) = node {
                f(rule);
            }
        });
    }

    pub fn walk_comments<F: FnMut(&Comment)>(&self, mut f: F) {
        self.walk(|node| {
            if let Node::Comment(comment) = node {
                f(comment);
            }
        });
    }
}

/// A node in the stylesheet tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Rule(Rule),
    #[serde(rename = "atrule")]
    AtRule(AtRule),
    Decl(Declaration),
    Comment(Comment),
}

impl Node {
    /// Short type name, as used in messages.
    pub const fn kind(&self) -> &'static str {
        match self {
            Node::Rule(_) => "rule",
            Node::AtRule(_) => "atrule",
            Node::Decl(_) => "decl",
            Node::Comment(_) => "comment",
        }
    }

    pub const fn source(&self) -> Option<&SourceRange> {
        match self {
            Node::Rule(n) => n.source.as_ref(),
            Node::AtRule(n) => n.source.as_ref(),
            Node::Decl(n) => n.source.as_ref(),
            Node::Comment(n) => n.source.as_ref(),
        }
    }

    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Rule(rule) => Some(&rule.nodes),
            Node::AtRule(at_rule) => at_rule.nodes.as_deref(),
            Node::Decl(_) | Node::Comment(_) => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Rule(rule) => Some(&mut rule.nodes),
            Node::AtRule(at_rule) => at_rule.nodes.as_mut(),
            Node::Decl(_) | Node::Comment(_) => None,
        }
    }

    /// Serializes this node, raws included, onto `out`.
    pub fn write_css(&self, out: &mut String) {
        match self {
            Node::Rule(rule) => {
                out.push_str(&rule.raws.before);
                out.push_str(&rule.selector);
                out.push_str(&rule.raws.between);
                out.push('{');
                write_children(&rule.nodes, out);
                out.push_str(&rule.raws.after);
                out.push('}');
            }
            Node::AtRule(at_rule) => {
                out.push_str(&at_rule.raws.before);
                out.push('@');
                out.push_str(&at_rule.name);
                out.push_str(&at_rule.raws.after_name);
                out.push_str(&at_rule.params);
                out.push_str(&at_rule.raws.between);
                match &at_rule.nodes {
                    Some(nodes) => {
                        out.push('{');
                        write_children(nodes, out);
                        out.push_str(&at_rule.raws.after);
                        out.push('}');
                    }
                    None if at_rule.raws.semicolon => out.push(';'),
                    None => {}
                }
            }
            Node::Decl(decl) => {
                out.push_str(&decl.raws.before);
                out.push_str(&decl.prop);
                out.push_str(&decl.raws.between);
                out.push_str(&decl.value);
                if decl.important {
                    out.push_str(decl.raws.important.as_deref().unwrap_or(" !important"));
                }
                out.push_str(&decl.raws.after_value);
                if decl.raws.semicolon {
                    out.push(';');
                }
            }
            Node::Comment(comment) => {
                out.push_str(&comment.raws.before);
                out.push_str("/*");
                out.push_str(&comment.raws.left);
                out.push_str(&comment.text);
                out.push_str(&comment.raws.right);
                out.push_str("*/");
            }
        }
    }

    pub fn to_css(&self) -> String {
        let mut out = String::new();
        self.write_css(&mut out);
        out
    }
}

fn write_children(nodes: &[Node], out: &mut String) {
    for node in nodes {
        node.write_css(out);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuleRaws {
    pub before: String,
    /// Between the selector and `{`.
    pub between: String,
    /// Between the last child and `}`.
    pub after: String,
}

/// A qualified rule: `selector { ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub selector: String,
    pub nodes: Vec<Node>,
    pub raws: RuleRaws,
    pub source: Option<SourceRange>,
}

impl Rule {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            nodes: Vec::new(),
            raws: RuleRaws {
                before: String::new(),
                between: " ".to_string(),
                after: "\n".to_string(),
            },
            source: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AtRuleRaws {
    pub before: String,
    /// Between the name and the params.
    pub after_name: String,
    /// Between the params and `{` or `;`.
    pub between: String,
    /// Between the last child and `}`.
    pub after: String,
    /// Whether a bodiless at-rule is terminated by `;`.
    pub semicolon: bool,
}

/// An at-rule such as `@media screen { ... }` or `@import "x";`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtRule {
    pub name: String,
    pub params: String,
    /// `None` for statements without a block.
    pub nodes: Option<Vec<Node>>,
    pub raws: AtRuleRaws,
    pub source: Option<SourceRange>,
}

impl AtRule {
    pub fn new(name: impl Into<String>, params: impl Into<String>) -> Self {
        let params = params.into();
        let after_name = if params.is_empty() { "" } else { " " };
        Self {
            name: name.into(),
            params,
            nodes: None,
            raws: AtRuleRaws {
                after_name: after_name.to_string(),
                semicolon: true,
                ..AtRuleRaws::default()
            },
            source: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeclRaws {
    pub before: String,
    /// Between the property and the value, colon included.
    pub between: String,
    /// Raw `!important` text, when it differs from ` !important`.
    pub important: Option<String>,
    /// Between the value and `;` or the end of the block.
    pub after_value: String,
    pub semicolon: bool,
}

/// A declaration: `prop: value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub prop: String,
    pub value: String,
    pub important: bool,
    pub raws: DeclRaws,
    pub source: Option<SourceRange>,
}

impl Declaration {
    pub fn new(prop: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            prop: prop.into(),
            value: value.into(),
            important: false,
            raws: DeclRaws {
                before: "\n    ".to_string(),
                between: ": ".to_string(),
                semicolon: true,
                ..DeclRaws::default()
            },
            source: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommentRaws {
    pub before: String,
    /// Whitespace after `/*`.
    pub left: String,
    /// Whitespace before `*/`.
    pub right: String,
}

/// A block comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment body with surrounding whitespace removed.
    pub text: String,
    pub raws: CommentRaws,
    pub source: Option<SourceRange>,
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            raws: CommentRaws {
                before: String::new(),
                left: " ".to_string(),
                right: " ".to_string(),
            },
            source: None,
        }
    }
}
