//! Lossless CSS parser.

use std::path::Path;

use sheetlint_ast::{
    AtRule, AtRuleRaws, Comment, CommentRaws, DeclRaws, Declaration, Location, Node, Position,
    Root, Rule, RuleRaws, SourceRange, Span,
};

use crate::{ParseError, Parser, SyntaxError};

/// Parser for plain CSS.
///
/// Whitespace, comments and stray semicolons are kept in node raws so that
/// `stringify(parse(source)) == source` for any input that parses.
#[derive(Debug, Clone, Copy, Default)]
pub struct CssParser;

impl CssParser {
    pub const fn new() -> Self {
        Self
    }
}

impl Parser for CssParser {
    fn name(&self) -> &str {
        "css"
    }

    fn extensions(&self) -> &[&str] {
        &["css"]
    }

    fn parse(&self, source: &str, file: Option<&Path>) -> Result<Root, ParseError> {
        let mut reader = Reader::new(source, file);
        let (nodes, after) = reader.block(None)?;
        Ok(Root { nodes, after })
    }
}

struct Reader<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line_starts: Vec<usize>,
    file: Option<&'a Path>,
}

type Block = (Vec<Node>, String);

impl<'a> Reader<'a> {
    fn new(src: &'a str, file: Option<&'a Path>) -> Self {
        let line_starts = std::iter::once(0)
            .chain(src.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            line_starts,
            file,
        }
    }

    /// Reads nodes until EOF (root) or the `}` closing the block opened at `open`.
    fn block(&mut self, open: Option<usize>) -> Result<Block, SyntaxError> {
        let mut nodes = Vec::new();
        loop {
            let before_start = self.pos;
            while let Some(b) = self.peek() {
                if is_space(b) || b == b';' {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            let before = self.src[before_start..self.pos].to_string();

            match self.peek() {
                None => {
                    return match open {
                        Some(offset) => Err(self.error("Unclosed block", offset)),
                        None => Ok((nodes, before)),
                    };
                }
                Some(b'}') => {
                    if open.is_none() {
                        return Err(self.error("Unexpected }", self.pos));
                    }
                    self.pos += 1;
                    return Ok((nodes, before));
                }
                Some(b'/') if self.src[self.pos..].starts_with("/*") => {
                    nodes.push(self.comment(before)?);
                }
                Some(b'@') => nodes.push(self.at_rule(before)?),
                Some(_) => nodes.push(self.statement(before)?),
            }
        }
    }

    fn comment(&mut self, before: String) -> Result<Node, SyntaxError> {
        let start = self.pos;
        let body_start = start + 2;
        let Some(len) = self.src[body_start..].find("*/") else {
            return Err(self.error("Unclosed comment", start));
        };
        let inner = &self.src[body_start..body_start + len];
        self.pos = body_start + len + 2;

        let (left, rest) = split_leading_space(inner);
        let (text, right) = split_trailing_space(rest);
        Ok(Node::Comment(Comment {
            text: text.to_string(),
            raws: CommentRaws {
                before,
                left: left.to_string(),
                right: right.to_string(),
            },
            source: Some(self.range(start, self.pos)),
        }))
    }

    fn at_rule(&mut self, before: String) -> Result<Node, SyntaxError> {
        let start = self.pos;
        let name_start = start + 1;
        let mut name_end = name_start;
        while name_end < self.bytes.len() && is_name_byte(self.bytes[name_end]) {
            name_end += 1;
        }
        if name_end == name_start {
            return Err(self.error("At-rule without name", start));
        }
        let name = self.src[name_start..name_end].to_string();

        self.pos = name_end;
        let (end, terminator) = self.scan_statement()?;
        let (after_name, rest) = split_leading_space(&self.src[name_end..end]);
        let (params, between) = split_trailing_space(rest);
        let mut raws = AtRuleRaws {
            before,
            after_name: after_name.to_string(),
            between: between.to_string(),
            ..AtRuleRaws::default()
        };

        let nodes = match terminator {
            Some(b'{') => {
                self.pos = end + 1;
                let (nodes, after) = self.block(Some(end))?;
                raws.after = after;
                Some(nodes)
            }
            Some(b';') => {
                self.pos = end + 1;
                raws.semicolon = true;
                None
            }
            _ => {
                self.pos = end;
                None
            }
        };

        Ok(Node::AtRule(AtRule {
            name,
            params: params.to_string(),
            nodes,
            raws,
            source: Some(self.range(start, self.pos)),
        }))
    }

    fn statement(&mut self, before: String) -> Result<Node, SyntaxError> {
        let start = self.pos;
        let (end, terminator) = self.scan_statement()?;

        if terminator == Some(b'{') {
            let (selector, between) = split_trailing_space(&self.src[start..end]);
            let selector = selector.to_string();
            let between = between.to_string();
            self.pos = end + 1;
            let (nodes, after) = self.block(Some(end))?;
            return Ok(Node::Rule(Rule {
                selector,
                nodes,
                raws: RuleRaws {
                    before,
                    between,
                    after,
                },
                source: Some(self.range(start, self.pos)),
            }));
        }

        let semicolon = terminator == Some(b';');
        let decl = self.declaration(before, start, end, semicolon)?;
        self.pos = if semicolon { end + 1 } else { end };
        Ok(Node::Decl(decl))
    }

    fn declaration(
        &self,
        before: String,
        start: usize,
        end: usize,
        semicolon: bool,
    ) -> Result<Declaration, SyntaxError> {
        let raw = &self.src[start..end];
        let Some(colon) = self.find_colon(start, end)? else {
            return Err(self.error("Unknown word", start));
        };
        let (prop, prop_space) = split_trailing_space(&raw[..colon - start]);
        if prop.is_empty() {
            return Err(self.error("Missing property", start));
        }
        let (value_space, rest) = split_leading_space(&raw[colon - start + 1..]);
        let (value, after_value) = split_trailing_space(rest);
        let (value, important) = split_important(value);

        let value_end = start + (raw.len() - after_value.len());
        Ok(Declaration {
            prop: prop.to_string(),
            value: value.to_string(),
            important: important.is_some(),
            raws: DeclRaws {
                before,
                between: format!("{prop_space}:{value_space}"),
                important: important
                    .filter(|raw| *raw != " !important")
                    .map(str::to_string),
                after_value: after_value.to_string(),
                semicolon,
            },
            source: Some(self.range(start, value_end)),
        })
    }

    /// Scans from the current position to the next top-level `;`, `{` or `}`.
    ///
    /// Strings, comments and parenthesized groups are skipped over. Returns the
    /// offset of the terminator (or EOF) and the terminator byte.
    fn scan_statement(&self) -> Result<(usize, Option<u8>), SyntaxError> {
        let mut i = self.pos;
        let mut depth = 0usize;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'"' | b'\'' => {
                    i = self.skip_string(i)?;
                    continue;
                }
                b'/' if self.bytes.get(i + 1) == Some(&b'*') => {
                    i = self.skip_comment(i)?;
                    continue;
                }
                b'\\' => i += 1,
                b'(' => depth += 1,
                b')' => depth = depth.saturating_sub(1),
                b @ (b';' | b'{' | b'}') if depth == 0 => return Ok((i, Some(b))),
                _ => {}
            }
            i += 1;
        }
        Ok((self.bytes.len(), None))
    }

    fn find_colon(&self, start: usize, end: usize) -> Result<Option<usize>, SyntaxError> {
        let mut i = start;
        while i < end {
            match self.bytes[i] {
                b'"' | b'\'' => {
                    i = self.skip_string(i)?;
                    continue;
                }
                b'/' if self.bytes.get(i + 1) == Some(&b'*') => {
                    i = self.skip_comment(i)?;
                    continue;
                }
                b':' => return Ok(Some(i)),
                _ => {}
            }
            i += 1;
        }
        Ok(None)
    }

    fn skip_string(&self, open: usize) -> Result<usize, SyntaxError> {
        let quote = self.bytes[open];
        let mut i = open + 1;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'\\' => i += 2,
                b if b == quote => return Ok(i + 1),
                _ => i += 1,
            }
        }
        Err(self.error("Unclosed string", open))
    }

    fn skip_comment(&self, open: usize) -> Result<usize, SyntaxError> {
        match self.src[open + 2..].find("*/") {
            Some(len) => Ok(open + 2 + len + 2),
            None => Err(self.error("Unclosed comment", open)),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn position_at(&self, offset: usize) -> Position {
        let line = self.line_starts.partition_point(|&s| s <= offset) - 1;
        let line_start = self.line_starts[line];
        let column = self.src[line_start..offset].chars().count() + 1;
        Position::new(line as u32 + 1, column as u32)
    }

    fn range(&self, start: usize, end: usize) -> SourceRange {
        SourceRange::new(
            Span::new(start as u32, end as u32),
            Location::new(self.position_at(start), self.position_at(end)),
        )
    }

    fn error(&self, reason: &str, offset: usize) -> SyntaxError {
        let pos = self.position_at(offset);
        let err = SyntaxError::new(reason, pos.line, pos.column);
        match self.file {
            Some(file) => err.with_file(file),
            None => err,
        }
    }
}

const fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0c')
}

const fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b >= 0x80
}

fn split_leading_space(s: &str) -> (&str, &str) {
    let idx = s.bytes().position(|b| !is_space(b)).unwrap_or(s.len());
    s.split_at(idx)
}

fn split_trailing_space(s: &str) -> (&str, &str) {
    let idx = s.bytes().rposition(|b| !is_space(b)).map_or(0, |i| i + 1);
    s.split_at(idx)
}

/// Splits a trailing `!important` (any case, any inner spacing) off a value.
fn split_important(value: &str) -> (&str, Option<&str>) {
    let Some(bang) = value.rfind('!') else {
        return (value, None);
    };
    if !value[bang + 1..].trim().eq_ignore_ascii_case("important") {
        return (value, None);
    }
    let (kept, _) = split_trailing_space(&value[..bang]);
    (kept, Some(&value[kept.len()..]))
}
