//! Pass 2: Auto-Fill Layer
//!
//! Wraps the raw token sequence and applies one rule per token kind, emitting
//! the structure the source left implicit:
//! - `DocumentStart` / `DocumentEnd` around every document
//! - `BlockMapStart` / `BlockSeqStart` when a `:`, `?` or `-` opens a block
//!   collection, and `BlockEnd` when indentation closes it
//! - Key status for scalars, decided by the simple-key tracker once the
//!   following `:` (or its absence) is known
//!
//! Every structural invariant of the final stream is checked here.

use std::collections::VecDeque;
use std::fmt;
use std::mem;

use tracing::{debug, warn};

use crate::context::{BlockKind, BlockStack};
use crate::error::{Location, Result, ScanContext, ScanError};
use crate::scanner::Lexeme;
use crate::simple_key::{SimpleKey, SimpleKeyTracker};
use crate::token::{Token, TokenKind};

/// Version declared by a `%YAML` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YamlVersion {
    pub major: u32,
    pub minor: u32,
}

impl fmt::Display for YamlVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentState {
    NoDocument,
    Open,
    Closed,
}

/// Indicator seen last, which decides whether `-` or `?` may open a nested
/// block collection in the middle of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Indicator {
    None,
    DocumentStart,
    Dash,
    Key,
    /// A `:` that was the first token on its line.
    LineColon,
    Other,
}

pub struct AutoFill {
    ctx: ScanContext,
    ready: VecDeque<Token>,
    document: DocumentState,
    blocks: BlockStack,
    keys: SimpleKeyTracker,
    /// Anchors and tags waiting for their node.
    props: Vec<Token>,
    /// Open explicit `?` keys as (flow depth, block stack height).
    explicit_keys: Vec<(usize, usize)>,
    /// The document's root node is finished; any further node is an error.
    root_complete: bool,
    directives_pending: bool,
    pending_version: Option<YamlVersion>,
    version: Option<YamlVersion>,
    /// Position of the first token on the current line.
    line_head: (usize, usize),
    last: Indicator,
}

impl AutoFill {
    pub fn new(ctx: ScanContext) -> Self {
        Self {
            ctx,
            ready: VecDeque::new(),
            document: DocumentState::NoDocument,
            blocks: BlockStack::new(),
            keys: SimpleKeyTracker::new(),
            props: Vec::new(),
            explicit_keys: Vec::new(),
            root_complete: false,
            directives_pending: false,
            pending_version: None,
            version: None,
            line_head: (0, 0),
            last: Indicator::None,
        }
    }

    /// Column of the innermost open block collection, zero when none.
    pub fn block_indent(&self) -> usize {
        self.blocks.indent()
    }

    /// `%YAML` version of the current or most recent document.
    pub fn version(&self) -> Option<YamlVersion> {
        self.version
    }

    /// Next finalized token, if one is ready.
    pub fn pop_ready(&mut self) -> Option<Token> {
        self.ready.pop_front()
    }

    /// Drop finalized tokens that were not handed out yet.
    pub fn discard_ready(&mut self) {
        self.ready.clear();
    }

    /// Apply the auto-fill rule for one primitive token.
    pub fn feed(&mut self, lexeme: Lexeme) -> Result<()> {
        let Lexeme {
            token,
            depth,
            first_on_line,
            multiline,
        } = lexeme;

        if first_on_line {
            self.line_head = (token.line, token.column);
            let structural_line = !matches!(
                token.kind,
                TokenKind::DocumentStart { .. }
                    | TokenKind::DocumentEnd { .. }
                    | TokenKind::Directive { .. }
                    | TokenKind::FlowEnd
            );
            if depth == 0 && structural_line {
                self.close_for_line(&token)?;
            }
        }

        match token.kind {
            TokenKind::DocumentStart { .. } => self.document_start(token, depth),
            TokenKind::DocumentEnd { .. } => self.document_end(token, depth),
            TokenKind::Directive { .. } => self.directive(token),
            TokenKind::Dash => self.dash(token, first_on_line),
            TokenKind::Key => self.explicit_key(token, depth, first_on_line),
            TokenKind::Colon => self.colon(token, depth, first_on_line),
            TokenKind::Scalar { .. } => self.scalar(token, depth, multiline),
            TokenKind::Anchor(_) | TokenKind::Tag(_) => self.property(token),
            TokenKind::Alias(_) => self.alias(token, depth),
            TokenKind::FlowMapStart | TokenKind::FlowSeqStart => self.flow_start(token, depth),
            TokenKind::FlowEnd => self.flow_end(token, depth),
            TokenKind::Comma => self.comma(token, depth),
            TokenKind::BlockMapStart { .. }
            | TokenKind::BlockSeqStart { .. }
            | TokenKind::BlockEnd => {
                self.auto_start_document(token.line, token.column)?;
                self.emit(token);
                Ok(())
            }
        }
    }

    /// End of input: close whatever document is still open.
    pub fn finish(&mut self, line: usize, column: usize) -> Result<()> {
        match self.document {
            DocumentState::Open => self.close_document(line, column, false),
            _ if self.directives_pending => {
                Err(ScanError::MissingDocumentStart(self.locate(line, column)))
            }
            _ => Ok(()),
        }
    }

    fn locate(&self, line: usize, column: usize) -> Location {
        self.ctx.locate(line, column)
    }

    fn emit(&mut self, token: Token) {
        self.ready.push_back(token);
    }

    fn emit_at(&mut self, line: usize, column: usize, kind: TokenKind) {
        self.ready.push_back(Token::new(line, column, kind));
    }

    fn flush_props(&mut self) {
        let props = mem::take(&mut self.props);
        self.ready.extend(props);
    }

    fn auto_start_document(&mut self, line: usize, column: usize) -> Result<()> {
        if self.document == DocumentState::Open {
            return Ok(());
        }
        if self.directives_pending {
            return Err(ScanError::MissingDocumentStart(self.locate(line, column)));
        }
        self.open_document(line, column, false);
        Ok(())
    }

    fn open_document(&mut self, line: usize, column: usize, explicit: bool) {
        self.version = self.pending_version.take();
        self.directives_pending = false;
        self.document = DocumentState::Open;
        self.blocks.clear();
        self.props.clear();
        self.explicit_keys.clear();
        self.root_complete = false;
        self.last = Indicator::None;
        debug!(line, column, explicit, "document start");
        self.emit_at(line, column, TokenKind::DocumentStart { explicit });
    }

    fn close_document(&mut self, line: usize, column: usize, explicit: bool) -> Result<()> {
        self.discard_candidate()?;
        self.flush_props();
        while !self.blocks.is_empty() {
            self.pop_block(line, column)?;
        }
        self.explicit_keys.clear();
        self.document = DocumentState::Closed;
        debug!(line, column, explicit, "document end");
        self.emit_at(line, column, TokenKind::DocumentEnd { explicit });
        Ok(())
    }

    fn pop_block(&mut self, line: usize, column: usize) -> Result<()> {
        self.blocks.pop(self.ctx.locate(line, column))?;
        let height = self.blocks.len();
        self.explicit_keys.retain(|&(depth, h)| depth > 0 || h <= height);
        if self.blocks.is_empty() {
            self.root_complete = true;
        }
        self.emit_at(line, column, TokenKind::BlockEnd);
        Ok(())
    }

    /// Mark the start of a node in the innermost block collection.
    fn begin_node(&mut self, line: usize, column: usize) -> Result<()> {
        let loc = self.locate(line, column);
        match self.blocks.top_mut() {
            None if self.root_complete => Err(ScanError::TrailingContent(loc)),
            None => Ok(()),
            Some(top) if top.awaiting_node => {
                top.awaiting_node = false;
                Ok(())
            }
            Some(top) => Err(ScanError::UnexpectedNode(top.kind.name(), loc)),
        }
    }

    /// Block-mode bookkeeping for the first token on a line: resolve the
    /// candidate left on the previous line and close every block collection
    /// the token's column falls outside of.
    fn close_for_line(&mut self, token: &Token) -> Result<()> {
        let (line, column) = (token.line, token.column);
        self.discard_candidate()?;

        let is_dash = token.kind == TokenKind::Dash;
        let indentless_entry = is_dash
            && self.blocks.top().is_some_and(|top| {
                top.kind == BlockKind::Mapping && top.indent == column && top.awaiting_node
            });
        if !self.props.is_empty() && column <= self.blocks.indent() && !indentless_entry {
            // Properties with no node below them decorate an empty node.
            let (prop_line, prop_column) = (self.props[0].line, self.props[0].column);
            self.begin_node(prop_line, prop_column)?;
            self.flush_props();
        }

        while self.blocks.top().is_some_and(|top| top.indent > column) {
            self.pop_block(line, column)?;
        }
        if !is_dash && self.blocks.top_is(BlockKind::Sequence, column) {
            self.pop_block(line, column)?;
        }
        Ok(())
    }

    /// Emit the pending candidate, if any, as a plain value.
    fn discard_candidate(&mut self) -> Result<()> {
        match self.keys.take() {
            Some(key) => self.emit_value(key),
            None => Ok(()),
        }
    }

    fn emit_value(&mut self, key: SimpleKey) -> Result<()> {
        let (line, column) = (key.token.line, key.token.column);
        if key.required {
            return Err(ScanError::ExpectedColon(self.locate(line, column)));
        }
        if key.depth == 0 {
            self.begin_node(line, column)?;
        }
        self.ready.extend(key.props);
        self.emit(key.token);
        if key.depth == 0 && self.blocks.is_empty() {
            self.root_complete = true;
        }
        Ok(())
    }

    /// `-` and `?` may follow another indicator on the same line, nothing else.
    fn check_compact(&self, indicator: char, token: &Token, first_on_line: bool) -> Result<()> {
        let allowed = first_on_line
            || matches!(
                self.last,
                Indicator::DocumentStart | Indicator::Dash | Indicator::Key | Indicator::LineColon
            );
        if allowed {
            Ok(())
        } else {
            Err(ScanError::IndicatorNotAllowed(indicator, self.locate(token.line, token.column)))
        }
    }

    fn document_start(&mut self, token: Token, depth: usize) -> Result<()> {
        if depth > 0 {
            return Err(ScanError::DocumentMarkerInFlow(self.locate(token.line, token.column)));
        }
        if self.document == DocumentState::Open {
            self.close_document(token.line, token.column, false)?;
        }
        self.open_document(token.line, token.column, true);
        self.last = Indicator::DocumentStart;
        Ok(())
    }

    fn document_end(&mut self, token: Token, depth: usize) -> Result<()> {
        let loc = self.locate(token.line, token.column);
        if depth > 0 {
            return Err(ScanError::DocumentMarkerInFlow(loc));
        }
        match self.document {
            DocumentState::NoDocument => Err(ScanError::DocumentEndWithoutStart(loc)),
            DocumentState::Closed => Ok(()),
            DocumentState::Open => self.close_document(token.line, token.column, true),
        }
    }

    fn directive(&mut self, token: Token) -> Result<()> {
        let loc = self.locate(token.line, token.column);
        if self.document == DocumentState::Open {
            return Err(ScanError::DirectiveAfterStart(loc));
        }
        if let TokenKind::Directive { name, value } = &token.kind {
            if name == "YAML" {
                if self.pending_version.is_some() {
                    return Err(ScanError::DuplicateYamlDirective(loc));
                }
                let version = parse_version(value, loc)?;
                if version.minor > 2 {
                    warn!(%version, line = token.line, "YAML version newer than 1.2");
                }
                self.pending_version = Some(version);
            }
        }
        self.directives_pending = true;
        self.emit(token);
        Ok(())
    }

    fn dash(&mut self, token: Token, first_on_line: bool) -> Result<()> {
        self.discard_candidate()?;
        self.auto_start_document(token.line, token.column)?;
        self.check_compact('-', &token, first_on_line)?;

        let column = token.column;
        if !self.blocks.top_is(BlockKind::Sequence, column) {
            self.begin_node(token.line, column)?;
            self.flush_props();
            self.emit_at(
                token.line,
                column,
                TokenKind::BlockSeqStart { indent: column },
            );
            self.blocks.push(BlockKind::Sequence, column);
        }
        if let Some(top) = self.blocks.top_mut() {
            top.awaiting_node = true;
        }
        self.emit(token);
        self.last = Indicator::Dash;
        Ok(())
    }

    fn explicit_key(&mut self, token: Token, depth: usize, first_on_line: bool) -> Result<()> {
        self.discard_candidate()?;
        self.auto_start_document(token.line, token.column)?;

        if depth == 0 {
            self.check_compact('?', &token, first_on_line)?;
            let column = token.column;
            if !self.blocks.top_is(BlockKind::Mapping, column) {
                self.begin_node(token.line, column)?;
                self.flush_props();
                self.emit_at(
                    token.line,
                    column,
                    TokenKind::BlockMapStart { indent: column },
                );
                self.blocks.push(BlockKind::Mapping, column);
            }
            if let Some(top) = self.blocks.top_mut() {
                top.awaiting_node = true;
                top.value_line = None;
            }
        } else {
            self.flush_props();
        }

        let entry = (depth, self.blocks.len());
        if self.explicit_keys.last() != Some(&entry) {
            self.explicit_keys.push(entry);
        }
        self.emit(token);
        self.last = Indicator::Key;
        Ok(())
    }

    fn colon(&mut self, token: Token, depth: usize, first_on_line: bool) -> Result<()> {
        match self.keys.confirm() {
            // In flow, `? a : b` pairs the colon with the `?`, so `a` stays a
            // plain node.
            Some(key) if depth > 0 && self.explicit_key_open(depth) => {
                self.emit_value(key)?;
                self.explicit_value(token, depth)?;
            }
            Some(key) => self.implicit_value(key, token, depth)?,
            None => self.explicit_value(token, depth)?,
        }
        self.last = if first_on_line {
            Indicator::LineColon
        } else {
            Indicator::Other
        };
        Ok(())
    }

    /// `:` confirming the pending candidate as a key.
    fn implicit_value(&mut self, mut key: SimpleKey, colon: Token, depth: usize) -> Result<()> {
        let (line, column) = (key.line(), key.token.column);
        if !key.possible {
            return Err(ScanError::MultilineKey(self.locate(line, column)));
        }

        if depth == 0 && !self.blocks.top_is(BlockKind::Mapping, key.column) {
            if self.compact_value_on(line) {
                return Err(ScanError::NestedCompactMapping(self.locate(line, column)));
            }
            self.begin_node(line, key.column)?;
            // Properties on earlier lines decorate the mapping itself.
            let (earlier, same_line): (Vec<Token>, Vec<Token>) =
                key.props.drain(..).partition(|p| p.line < line);
            self.ready.extend(earlier);
            key.props = same_line;
            self.emit_at(
                line,
                key.column,
                TokenKind::BlockMapStart { indent: key.column },
            );
            self.blocks.push(BlockKind::Mapping, key.column);
        }

        self.ready.extend(key.props);
        let mut token = key.token;
        if let TokenKind::Scalar { key: is_key, .. } = &mut token.kind {
            *is_key = true;
        }
        self.emit(token);

        if depth == 0 {
            if let Some(top) = self.blocks.top_mut() {
                top.awaiting_node = true;
                top.value_line = Some(colon.line);
            }
        }
        self.emit(colon);
        Ok(())
    }

    /// `:` without a candidate: only valid after an explicit `?`.
    fn explicit_value(&mut self, colon: Token, depth: usize) -> Result<()> {
        let loc = self.locate(colon.line, colon.column);
        if self.document == DocumentState::Open && self.explicit_key_open(depth) {
            self.explicit_keys.pop();
            self.flush_props();
            if depth == 0 {
                if let Some(top) = self.blocks.top_mut() {
                    top.awaiting_node = true;
                    top.value_line = None;
                }
            }
            self.emit(colon);
            return Ok(());
        }

        if depth == 0 && self.compact_value_on(colon.line) {
            return Err(ScanError::NestedCompactMapping(loc));
        }
        Err(ScanError::ColonWithoutKey(loc))
    }

    /// The innermost block mapping is still waiting for the value of a key
    /// whose `:` is on `line`.
    fn compact_value_on(&self, line: usize) -> bool {
        self.blocks.top().is_some_and(|top| {
            top.kind == BlockKind::Mapping && top.awaiting_node && top.value_line == Some(line)
        })
    }

    /// An explicit `?` at this flow depth and block height still waits for
    /// its `:`.
    fn explicit_key_open(&self, depth: usize) -> bool {
        self.explicit_keys.last() == Some(&(depth, self.blocks.len()))
    }

    fn scalar(&mut self, token: Token, depth: usize, multiline: bool) -> Result<()> {
        self.auto_start_document(token.line, token.column)?;

        let block_style = matches!(
            token.kind,
            TokenKind::Scalar { style, .. } if style.is_block()
        );
        let possible = !multiline && !block_style;
        let props = mem::take(&mut self.props);
        let column = props
            .iter()
            .filter(|p| p.line == token.line)
            .map(|p| p.column)
            .fold(token.column, usize::min);
        let first_on_line = self.line_head == (token.line, column);
        let required = possible
            && first_on_line
            && depth == 0
            && self.blocks.top_is(BlockKind::Mapping, column);

        let candidate = SimpleKey {
            token,
            props,
            depth,
            column,
            possible,
            required,
        };
        if let Some(previous) = self.keys.register(candidate) {
            // Two scalars in a row: the first one was a value after all.
            self.emit_value(previous)?;
        }
        self.last = Indicator::Other;
        Ok(())
    }

    fn property(&mut self, token: Token) -> Result<()> {
        self.discard_candidate()?;
        self.auto_start_document(token.line, token.column)?;
        self.props.push(token);
        Ok(())
    }

    fn alias(&mut self, token: Token, depth: usize) -> Result<()> {
        self.discard_candidate()?;
        self.auto_start_document(token.line, token.column)?;
        if depth == 0 {
            self.begin_node(token.line, token.column)?;
        }
        self.flush_props();
        self.emit(token);
        if depth == 0 && self.blocks.is_empty() {
            self.root_complete = true;
        }
        self.last = Indicator::Other;
        Ok(())
    }

    fn flow_start(&mut self, token: Token, depth: usize) -> Result<()> {
        self.discard_candidate()?;
        self.auto_start_document(token.line, token.column)?;
        if depth == 0 {
            self.begin_node(token.line, token.column)?;
        }
        self.flush_props();
        self.emit(token);
        self.last = Indicator::Other;
        Ok(())
    }

    fn flow_end(&mut self, token: Token, depth: usize) -> Result<()> {
        self.discard_candidate()?;
        self.flush_props();
        self.explicit_keys.retain(|&(d, _)| d <= depth);
        self.emit(token);
        if depth == 0 && self.blocks.is_empty() {
            self.root_complete = true;
        }
        self.last = Indicator::Other;
        Ok(())
    }

    fn comma(&mut self, token: Token, depth: usize) -> Result<()> {
        self.discard_candidate()?;
        self.flush_props();
        self.explicit_keys.retain(|&(d, _)| d < depth);
        self.emit(token);
        self.last = Indicator::Other;
        Ok(())
    }
}

/// Parse the `<major>.<minor>` value of a `%YAML` directive.
fn parse_version(value: &str, loc: Location) -> Result<YamlVersion> {
    let parsed = value.split_once('.').and_then(|(major, minor)| {
        Some(YamlVersion {
            major: major.parse().ok()?,
            minor: minor.parse().ok()?,
        })
    });
    match parsed {
        Some(version) if version.major == 1 => Ok(version),
        Some(_) => Err(ScanError::UnsupportedYamlVersion(value.to_string(), loc)),
        None => Err(ScanError::InvalidYamlVersion(value.to_string(), loc)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::RawScanner;

    fn run(source: &str) -> Result<Vec<Token>> {
        let ctx = ScanContext::default();
        let mut raw = RawScanner::new(source, ctx.clone());
        let mut fill = AutoFill::new(ctx);
        let mut out = Vec::new();
        while let Some(lexeme) = raw.next_lexeme(fill.block_indent())? {
            fill.feed(lexeme)?;
            while let Some(token) = fill.pop_ready() {
                out.push(token);
            }
        }
        let (line, column) = raw.position();
        fill.finish(line, column)?;
        while let Some(token) = fill.pop_ready() {
            out.push(token);
        }
        Ok(out)
    }

    fn rendered(source: &str) -> Vec<String> {
        run(source)
            .unwrap()
            .iter()
            .map(|t| t.to_string())
            .collect()
    }

    fn error(source: &str) -> String {
        run(source).unwrap_err().to_string()
    }

    #[test]
    fn test_block_mapping() {
        assert_eq!(
            rendered("a: 1\nb: 2\n"),
            vec![
                "DocumentStart[1,1]",
                "BlockMapStart[1,1]",
                "KeyScalar[1,1] a",
                "Colon[1,2]",
                "Scalar[1,4] 1",
                "KeyScalar[2,1] b",
                "Colon[2,2]",
                "Scalar[2,4] 2",
                "BlockEnd[3,1]",
                "DocumentEnd[3,1]",
            ]
        );
    }

    #[test]
    fn test_property_before_key() {
        assert_eq!(
            rendered("!!str a: b"),
            vec![
                "DocumentStart[1,1]",
                "BlockMapStart[1,1]",
                "Tag[1,1] !!str",
                "KeyScalar[1,7] a",
                "Colon[1,8]",
                "Scalar[1,10] b",
                "BlockEnd[1,11]",
                "DocumentEnd[1,11]",
            ]
        );
    }

    #[test]
    fn test_property_on_collection() {
        assert_eq!(
            rendered("&m\na: b"),
            vec![
                "DocumentStart[1,1]",
                "Anchor[1,1] &m",
                "BlockMapStart[2,1]",
                "KeyScalar[2,1] a",
                "Colon[2,2]",
                "Scalar[2,4] b",
                "BlockEnd[2,5]",
                "DocumentEnd[2,5]",
            ]
        );
    }

    #[test]
    fn test_dangling_property() {
        assert_eq!(
            rendered("a: &x\nb: c"),
            vec![
                "DocumentStart[1,1]",
                "BlockMapStart[1,1]",
                "KeyScalar[1,1] a",
                "Colon[1,2]",
                "Anchor[1,4] &x",
                "KeyScalar[2,1] b",
                "Colon[2,2]",
                "Scalar[2,4] c",
                "BlockEnd[2,5]",
                "DocumentEnd[2,5]",
            ]
        );
    }

    #[test]
    fn test_indentless_sequence() {
        assert_eq!(
            rendered("a:\n- b\nc: d"),
            vec![
                "DocumentStart[1,1]",
                "BlockMapStart[1,1]",
                "KeyScalar[1,1] a",
                "Colon[1,2]",
                "BlockSeqStart[2,1]",
                "Dash[2,1]",
                "Scalar[2,3] b",
                "BlockEnd[3,1]",
                "KeyScalar[3,1] c",
                "Colon[3,2]",
                "Scalar[3,4] d",
                "BlockEnd[3,5]",
                "DocumentEnd[3,5]",
            ]
        );
    }

    #[test]
    fn test_explicit_key() {
        assert_eq!(
            rendered("? a\n: b"),
            vec![
                "DocumentStart[1,1]",
                "BlockMapStart[1,1]",
                "Key[1,1]",
                "Scalar[1,3] a",
                "Colon[2,1]",
                "Scalar[2,3] b",
                "BlockEnd[2,4]",
                "DocumentEnd[2,4]",
            ]
        );
    }

    #[test]
    fn test_explicit_key_discards_candidate() {
        // A pending candidate before `?` is a plain value.
        assert_eq!(
            rendered("{\"a\" ? b: c}"),
            vec![
                "DocumentStart[1,1]",
                "FlowMapStart[1,1] {",
                "Scalar[1,2] \"a\"",
                "Key[1,6]",
                "Scalar[1,8] b",
                "Colon[1,9]",
                "Scalar[1,11] c",
                "FlowEnd[1,12]",
                "DocumentEnd[1,13]",
            ]
        );
    }

    #[test]
    fn test_explicit_key_same_in_flow_and_block() {
        let flow: Vec<String> = rendered("{? a : b}")
            .iter()
            .map(|t| t.split('[').next().unwrap_or_default().to_string())
            .collect();
        assert_eq!(
            flow,
            vec![
                "DocumentStart",
                "FlowMapStart",
                "Key",
                "Scalar",
                "Colon",
                "Scalar",
                "FlowEnd",
                "DocumentEnd",
            ]
        );
        // A comma ends the explicit entry; later pairs are implicit again.
        let tokens = rendered("{? a, b: c}");
        assert_eq!(tokens[3], "Scalar[1,4] a");
        assert_eq!(tokens[5], "KeyScalar[1,7] b");
    }

    #[test]
    fn test_flow_collection_is_not_a_key() {
        assert_eq!(
            error("[a]: b"),
            "Incomplete explicit mapping pair, line 1 column 4"
        );
        assert_eq!(
            error("{[a]: b}"),
            "Incomplete explicit mapping pair, line 1 column 5"
        );
    }

    #[test]
    fn test_compact_value_on_next_line() {
        // The value line is only remembered for the key's own line.
        assert_eq!(
            rendered("a:\n  b: c"),
            vec![
                "DocumentStart[1,1]",
                "BlockMapStart[1,1]",
                "KeyScalar[1,1] a",
                "Colon[1,2]",
                "BlockMapStart[2,3]",
                "KeyScalar[2,3] b",
                "Colon[2,4]",
                "Scalar[2,6] c",
                "BlockEnd[2,7]",
                "BlockEnd[2,7]",
                "DocumentEnd[2,7]",
            ]
        );
    }

    #[test]
    fn test_compact_nested_sequence() {
        assert_eq!(
            rendered("- - a\n  - b"),
            vec![
                "DocumentStart[1,1]",
                "BlockSeqStart[1,1]",
                "Dash[1,1]",
                "BlockSeqStart[1,3]",
                "Dash[1,3]",
                "Scalar[1,5] a",
                "Dash[2,3]",
                "Scalar[2,5] b",
                "BlockEnd[2,6]",
                "BlockEnd[2,6]",
                "DocumentEnd[2,6]",
            ]
        );
    }

    #[test]
    fn test_documents() {
        assert_eq!(
            rendered("foo\n---\nbar"),
            vec![
                "DocumentStart[1,1]",
                "Scalar[1,1] foo",
                "DocumentEnd[2,1]",
                "DocumentStart[2,1] ---",
                "Scalar[3,1] bar",
                "DocumentEnd[3,4]",
            ]
        );
        assert_eq!(
            rendered("foo\n...\n...\n"),
            vec![
                "DocumentStart[1,1]",
                "Scalar[1,1] foo",
                "DocumentEnd[2,1] ...",
            ]
        );
        assert!(rendered("").is_empty());
        assert!(rendered("# only a comment\n").is_empty());
    }

    #[test]
    fn test_directives() {
        let tokens = rendered("%YAML 1.2\n---\na");
        assert_eq!(tokens[0], "Directive[1,1] YAML 1.2");
        assert_eq!(tokens[1], "DocumentStart[2,1] ---");

        assert_eq!(
            error("---\n%YAML 1.2\n"),
            "Directives allowed only at document start, line 2 column 1"
        );
        assert_eq!(
            error("%YAML 1.2\n%YAML 1.2\n---\n"),
            "Only one YAML directive is allowed, line 2 column 1"
        );
        assert_eq!(
            error("%YAML 2.0\n---\n"),
            "Unsupported YAML version \"2.0\", line 1 column 1"
        );
        assert_eq!(
            error("%YAML x\n---\n"),
            "Invalid YAML version \"x\", line 1 column 1"
        );
        assert_eq!(
            error("%TAG ! !foo\na"),
            "Expected document start '---' after directives, line 2 column 1"
        );
    }

    #[test]
    fn test_version_tracking() {
        let ctx = ScanContext::default();
        let mut raw = RawScanner::new("%YAML 1.1\n---\na", ctx.clone());
        let mut fill = AutoFill::new(ctx);
        while let Some(lexeme) = raw.next_lexeme(fill.block_indent()).unwrap() {
            fill.feed(lexeme).unwrap();
        }
        assert_eq!(fill.version(), Some(YamlVersion { major: 1, minor: 1 }));
        assert_eq!(
            fill.version().map(|v| v.to_string()),
            Some("1.1".to_string())
        );
    }

    #[test]
    fn test_document_end_without_start() {
        assert_eq!(
            error("...\n%YAML 1.1\n---\n"),
            "Document end without start, line 1 column 1"
        );
        // With a prior document, the same lines close it and accept the directive.
        let tokens = rendered("a\n...\n%YAML 1.1\n---\nb");
        assert_eq!(tokens[2], "DocumentEnd[2,1] ...");
        assert_eq!(tokens[3], "Directive[3,1] YAML 1.1");
    }

    #[test]
    fn test_structural_errors() {
        assert_eq!(
            error(":"),
            "Incomplete explicit mapping pair, line 1 column 1"
        );
        assert_eq!(
            error(": foo"),
            "Incomplete explicit mapping pair, line 1 column 1"
        );
        assert_eq!(
            error("a: : b"),
            "Nested mappings are not allowed in compact mappings, line 1 column 4"
        );
        assert_eq!(
            error("a: b: c"),
            "Nested mappings are not allowed in compact mappings, line 1 column 4"
        );
        assert_eq!(
            error("  a: b\n c: d"),
            "Document contains trailing content, line 2 column 2"
        );
        assert_eq!(
            error("- a\nb"),
            "Document contains trailing content, line 2 column 1"
        );
        assert_eq!(
            error("a: - b"),
            "Block indicator '-' is not allowed here, line 1 column 4"
        );
        assert_eq!(
            error("a: 1\nb\n"),
            "Expected ':' after mapping key, line 2 column 1"
        );
        assert_eq!(
            error("a: b\n c: d"),
            "Implicit keys must be on a single line, line 1 column 4"
        );
        assert_eq!(
            error("-  a: x\n b: y"),
            "Unexpected node in block sequence, line 2 column 2"
        );
        assert_eq!(
            error("[a\n---\n]"),
            "Document marker inside flow collection, line 2 column 1"
        );
    }
}
