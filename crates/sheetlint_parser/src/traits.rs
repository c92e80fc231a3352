//! Parser trait definition.

use std::path::Path;

use sheetlint_ast::Root;

use crate::ParseError;

/// Turns stylesheet source into a [`Root`] and back.
///
/// Implementations are registered by name; the linter selects one through the
/// `customSyntax` option or by file extension.
///
/// # Example
///
/// ```rust
/// use std::path::Path;
/// use sheetlint_ast::Root;
/// use sheetlint_parser::{ParseError, Parser};
///
/// struct EmptyParser;
///
/// impl Parser for EmptyParser {
///     fn name(&self) -> &str {
///         "empty"
///     }
///
///     fn extensions(&self) -> &[&str] {
///         &["empty"]
///     }
///
///     fn parse(&self, _source: &str, _file: Option<&Path>) -> Result<Root, ParseError> {
///         Ok(Root::default())
///     }
/// }
///
/// assert!(EmptyParser.can_parse("EMPTY"));
/// ```
pub trait Parser: Send + Sync {
    /// Returns the name of this parser.
    fn name(&self) -> &str;

    /// Returns the file extensions this parser handles, without the leading dot.
    fn extensions(&self) -> &[&str];

    /// Parses `source`. `file` is only used for error locations.
    fn parse(&self, source: &str, file: Option<&Path>) -> Result<Root, ParseError>;

    /// Serializes a (possibly fixed) tree.
    fn stringify(&self, root: &Root) -> String {
        root.to_css()
    }

    /// Returns true if this parser can handle the given file extension.
    fn can_parse(&self, extension: &str) -> bool {
        self.extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}
