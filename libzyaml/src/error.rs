//! Error types for YAML scanning.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Result type for scanning operations.
pub type Result<T> = std::result::Result<T, ScanError>;

/// Scan context carrying the source name for error reporting.
#[derive(Clone, Debug, Default)]
pub struct ScanContext {
    pub filename: Option<Arc<str>>,
}

impl ScanContext {
    /// Create a new scan context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(Arc::from),
        }
    }

    /// Build a location at the given 1-based line and column.
    pub fn locate(&self, line: usize, column: usize) -> Location {
        Location {
            line,
            column,
            filename: self.filename.clone(),
        }
    }
}

/// Position of an error in the source text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
    pub filename: Option<Arc<str>>,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ", line {} column {}", self.line, self.column)?;
        if let Some(name) = &self.filename {
            write!(f, " of <{}>", name)?;
        }
        Ok(())
    }
}

/// Broad classification of scan errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed lexical unit (scalar, escape, header, name).
    Lexical,
    /// Violated structural invariant of the token stream.
    Structural,
    /// Internal context stack misuse. Indicates a scanner defect.
    Context,
}

/// Error type for YAML scanning.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ScanError {
    /// Quoted scalar without a closing quote.
    #[error("Unterminated quoted scalar{0}")]
    UnterminatedString(Location),

    /// Unknown or malformed escape in a double-quoted scalar.
    #[error("Invalid escape sequence \"\\{0}\"{1}")]
    InvalidEscape(String, Location),

    /// Bad `|` / `>` header.
    #[error("Invalid block scalar header{0}")]
    InvalidBlockHeader(Location),

    /// Leading blank line more indented than the block scalar content.
    #[error("Inconsistent block scalar indentation{0}")]
    InconsistentBlockIndent(Location),

    /// Reserved indicator at the start of a plain scalar.
    #[error("Character '{0}' is reserved{1}")]
    ReservedCharacter(char, Location),

    /// `&` or `*` without a name.
    #[error("Empty {0} name{1}")]
    EmptyName(&'static str, Location),

    /// `!<` without the closing `>`.
    #[error("Unterminated verbatim tag{0}")]
    UnterminatedTag(Location),

    /// `%` line without a directive name.
    #[error("Invalid directive{0}")]
    InvalidDirective(Location),

    /// Closing bracket that does not match the innermost flow collection.
    #[error("Unexpected flow closing character '{0}'{1}")]
    UnmatchedFlowEnd(char, Location),

    /// End of input inside a flow collection.
    #[error("Expected flow collection end '{0}'{1}")]
    UnclosedFlow(char, Location),

    /// `---` or `...` inside a flow collection.
    #[error("Document marker inside flow collection{0}")]
    DocumentMarkerInFlow(Location),

    /// `:` with neither a simple key candidate nor an explicit `?`.
    #[error("Incomplete explicit mapping pair{0}")]
    ColonWithoutKey(Location),

    /// Implicit key that does not fit on one line.
    #[error("Implicit keys must be on a single line{0}")]
    MultilineKey(Location),

    /// `a: b: c` style nesting.
    #[error("Nested mappings are not allowed in compact mappings{0}")]
    NestedCompactMapping(Location),

    /// `-` or `?` where a block collection cannot start.
    #[error("Block indicator '{0}' is not allowed here{1}")]
    IndicatorNotAllowed(char, Location),

    /// Scalar at mapping key indentation with no `:` on its line.
    #[error("Expected ':' after mapping key{0}")]
    ExpectedColon(Location),

    /// Node where the enclosing block collection expects none.
    #[error("Unexpected node in block {0}{1}")]
    UnexpectedNode(&'static str, Location),

    /// Tab in the indentation of a block-mode line.
    #[error("Tab not allowed (use spaces){0}")]
    TabNotAllowed(Location),

    /// Second root node in a document.
    #[error("Document contains trailing content{0}")]
    TrailingContent(Location),

    /// `|` or `>` inside a flow collection.
    #[error("Block scalar is not allowed in flow collection{0}")]
    BlockScalarInFlow(Location),

    /// Directive once the document has started.
    #[error("Directives allowed only at document start{0}")]
    DirectiveAfterStart(Location),

    /// Second `%YAML` before the same document.
    #[error("Only one YAML directive is allowed{0}")]
    DuplicateYamlDirective(Location),

    /// `%YAML` value that is not `<major>.<minor>`.
    #[error("Invalid YAML version \"{0}\"{1}")]
    InvalidYamlVersion(String, Location),

    /// `%YAML` major version other than 1.
    #[error("Unsupported YAML version \"{0}\"{1}")]
    UnsupportedYamlVersion(String, Location),

    /// Directives followed by content without `---`.
    #[error("Expected document start '---' after directives{0}")]
    MissingDocumentStart(Location),

    /// `...` before any document was opened.
    #[error("Document end without start{0}")]
    DocumentEndWithoutStart(Location),

    /// Context stack popped while empty.
    #[error("Internal error: {0} context stack underflow{1}")]
    ContextUnderflow(&'static str, Location),
}

impl ScanError {
    /// Classify this error per the scanner's error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScanError::UnterminatedString(_)
            | ScanError::InvalidEscape(..)
            | ScanError::InvalidBlockHeader(_)
            | ScanError::InconsistentBlockIndent(_)
            | ScanError::ReservedCharacter(..)
            | ScanError::EmptyName(..)
            | ScanError::UnterminatedTag(_)
            | ScanError::InvalidDirective(_) => ErrorKind::Lexical,
            ScanError::ContextUnderflow(..) => ErrorKind::Context,
            _ => ErrorKind::Structural,
        }
    }

    /// Where in the source the error was detected.
    pub fn location(&self) -> &Location {
        match self {
            ScanError::UnterminatedString(loc)
            | ScanError::InvalidEscape(_, loc)
            | ScanError::InvalidBlockHeader(loc)
            | ScanError::InconsistentBlockIndent(loc)
            | ScanError::ReservedCharacter(_, loc)
            | ScanError::EmptyName(_, loc)
            | ScanError::UnterminatedTag(loc)
            | ScanError::InvalidDirective(loc)
            | ScanError::UnmatchedFlowEnd(_, loc)
            | ScanError::UnclosedFlow(_, loc)
            | ScanError::DocumentMarkerInFlow(loc)
            | ScanError::ColonWithoutKey(loc)
            | ScanError::MultilineKey(loc)
            | ScanError::NestedCompactMapping(loc)
            | ScanError::IndicatorNotAllowed(_, loc)
            | ScanError::ExpectedColon(loc)
            | ScanError::UnexpectedNode(_, loc)
            | ScanError::TabNotAllowed(loc)
            | ScanError::TrailingContent(loc)
            | ScanError::BlockScalarInFlow(loc)
            | ScanError::DirectiveAfterStart(loc)
            | ScanError::DuplicateYamlDirective(loc)
            | ScanError::InvalidYamlVersion(_, loc)
            | ScanError::UnsupportedYamlVersion(_, loc)
            | ScanError::MissingDocumentStart(loc)
            | ScanError::DocumentEndWithoutStart(loc)
            | ScanError::ContextUnderflow(_, loc) => loc,
        }
    }
}
