//! Token model
//!
//! Every token carries the 1-based line and column where it starts, plus a
//! kind-specific payload. `Display` renders the flat one-line form used by the
//! golden token listings: `Kind[line,column] payload`.

use std::fmt;

/// How a scalar was written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    /// `|` block scalar.
    Literal,
    /// `>` block scalar.
    Folded,
}

impl ScalarStyle {
    /// Block scalars can never be implicit keys.
    pub fn is_block(self) -> bool {
        matches!(self, ScalarStyle::Literal | ScalarStyle::Folded)
    }
}

/// Kind-specific part of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `---` when explicit, otherwise inferred from the first content token.
    DocumentStart { explicit: bool },
    /// `...` when explicit, otherwise inferred.
    DocumentEnd { explicit: bool },
    /// A `%NAME value` line.
    Directive { name: String, value: String },
    /// Start of a block mapping whose keys sit at `indent`.
    BlockMapStart { indent: usize },
    /// Start of a block sequence whose dashes sit at `indent`.
    BlockSeqStart { indent: usize },
    /// Closes the innermost block collection.
    BlockEnd,
    FlowMapStart,
    FlowSeqStart,
    /// Closes the innermost flow collection.
    FlowEnd,
    Dash,
    Comma,
    Colon,
    /// Explicit `?` key marker.
    Key,
    Scalar {
        text: String,
        style: ScalarStyle,
        /// Set once the scalar was confirmed as a mapping key.
        key: bool,
    },
    Anchor(String),
    /// Full tag text, including the leading `!`.
    Tag(String),
    Alias(String),
}

impl TokenKind {
    /// Name used in the rendered token listing.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::DocumentStart { .. } => "DocumentStart",
            TokenKind::DocumentEnd { .. } => "DocumentEnd",
            TokenKind::Directive { .. } => "Directive",
            TokenKind::BlockMapStart { .. } => "BlockMapStart",
            TokenKind::BlockSeqStart { .. } => "BlockSeqStart",
            TokenKind::BlockEnd => "BlockEnd",
            TokenKind::FlowMapStart => "FlowMapStart",
            TokenKind::FlowSeqStart => "FlowSeqStart",
            TokenKind::FlowEnd => "FlowEnd",
            TokenKind::Dash => "Dash",
            TokenKind::Comma => "Comma",
            TokenKind::Colon => "Colon",
            TokenKind::Key => "Key",
            TokenKind::Scalar { key: true, .. } => "KeyScalar",
            TokenKind::Scalar { .. } => "Scalar",
            TokenKind::Anchor(_) => "Anchor",
            TokenKind::Tag(_) => "Tag",
            TokenKind::Alias(_) => "Alias",
        }
    }
}

/// A finalized token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub line: usize,
    pub column: usize,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(line: usize, column: usize, kind: TokenKind) -> Self {
        Self { line, column, kind }
    }

    /// Scalar text, if this is a scalar token.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Scalar { text, .. } => Some(text),
            _ => None,
        }
    }

    /// True for a scalar confirmed as a mapping key.
    pub fn is_key(&self) -> bool {
        matches!(self.kind, TokenKind::Scalar { key: true, .. })
    }
}

/// Escape control characters so that a scalar renders on one line.
fn escape(text: &str, quote: Option<char>) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '\'' if quote == Some('\'') => out.push_str("''"),
            '"' if quote == Some('"') => out.push_str("\\\""),
            _ => out.push(ch),
        }
    }
    out
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{},{}]", self.kind.name(), self.line, self.column)?;
        match &self.kind {
            TokenKind::DocumentStart { explicit: true } => write!(f, " ---"),
            TokenKind::DocumentEnd { explicit: true } => write!(f, " ..."),
            TokenKind::Directive { name, value } if value.is_empty() => write!(f, " {}", name),
            TokenKind::Directive { name, value } => write!(f, " {} {}", name, value),
            TokenKind::FlowMapStart => write!(f, " {{"),
            TokenKind::FlowSeqStart => write!(f, " ["),
            TokenKind::Scalar { text, style, .. } => match style {
                ScalarStyle::Plain => write!(f, " {}", escape(text, None)),
                ScalarStyle::SingleQuoted => write!(f, " '{}'", escape(text, Some('\''))),
                ScalarStyle::DoubleQuoted => write!(f, " \"{}\"", escape(text, Some('"'))),
                ScalarStyle::Literal => write!(f, " | {}", escape(text, None)),
                ScalarStyle::Folded => write!(f, " > {}", escape(text, None)),
            },
            TokenKind::Anchor(name) => write!(f, " &{}", name),
            TokenKind::Alias(name) => write!(f, " *{}", name),
            TokenKind::Tag(tag) => write!(f, " {}", tag),
            _ => Ok(()),
        }
    }
}
