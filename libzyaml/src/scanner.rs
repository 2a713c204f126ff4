//! Pass 1: Raw Scanner
//!
//! The raw scanner turns source text into primitive tokens, exactly as they
//! appear in the input. It does not insert anything implicit. It performs:
//! - Whitespace, line break and comment skipping
//! - Flow bracket matching (it owns the flow context stack)
//! - Plain, quoted and block scalar decoding, including line folding
//! - Directive, anchor, alias and tag recognition
//!
//! Block indentation is not tracked here. The caller passes the indentation of
//! the innermost open block collection so that plain and block scalars know
//! where their continuation lines end.

use crate::context::{FlowKind, FlowStack};
use crate::cursor::{is_blank, is_blankz, is_break, is_flow_indicator, Cursor};
use crate::error::{Location, Result, ScanContext, ScanError};
use crate::token::{ScalarStyle, Token, TokenKind};

/// A primitive token plus the layout facts the auto-fill layer needs.
#[derive(Debug, Clone)]
pub struct Lexeme {
    pub token: Token,
    /// Flow depth of the context the token belongs to. A flow start belongs to
    /// its parent context, a flow end to the context it returns to.
    pub depth: usize,
    /// Only whitespace precedes the token on its line.
    pub first_on_line: bool,
    /// The token (a scalar) spans more than one line.
    pub multiline: bool,
}

/// Block scalar trailing line break handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chomp {
    Strip,
    Clip,
    Keep,
}

/// One line of block scalar content, indentation removed.
#[derive(Debug, Clone)]
struct BlockLine {
    text: String,
    /// The line was terminated by a line break rather than end of input.
    broken: bool,
}

pub struct RawScanner<'a> {
    cursor: Cursor<'a>,
    flow: FlowStack,
    ctx: ScanContext,
    /// Nothing but whitespace consumed since the last line break.
    line_start: bool,
    /// Position right after a quoted scalar in flow context, where a `:` is a
    /// value indicator even when not followed by a blank.
    adjacent_value: Option<(usize, usize)>,
}

impl<'a> RawScanner<'a> {
    pub fn new(source: &'a str, ctx: ScanContext) -> Self {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        Self {
            cursor: Cursor::new(source),
            flow: FlowStack::new(),
            ctx,
            line_start: true,
            adjacent_value: None,
        }
    }

    /// Current (line, column) of the cursor.
    pub fn position(&self) -> (usize, usize) {
        self.cursor.mark()
    }

    fn locate(&self, line: usize, column: usize) -> Location {
        self.ctx.locate(line, column)
    }

    /// Produce the next primitive token, or `None` at end of input.
    ///
    /// `block_indent` is the column of the innermost open block collection,
    /// zero when none is open.
    pub fn next_lexeme(&mut self, block_indent: usize) -> Result<Option<Lexeme>> {
        self.skip_to_token()?;

        let (line, column) = self.cursor.mark();
        let Some(ch) = self.cursor.peek() else {
            if let Some(entry) = self.flow.innermost() {
                return Err(ScanError::UnclosedFlow(
                    entry.kind.closer(),
                    self.locate(entry.line, entry.column),
                ));
            }
            return Ok(None);
        };

        let first_on_line = std::mem::replace(&mut self.line_start, false);
        let in_flow = !self.flow.is_empty();
        let next = self.cursor.peek_nth(1);
        let mut depth = self.flow.depth();
        let mut multiline = false;

        let kind = match ch {
            '%' if column == 1 && !in_flow => self.fetch_directive(line, column)?,
            '-' | '.' if self.cursor.at_document_marker() => {
                self.cursor.advance_by(3);
                if ch == '-' {
                    TokenKind::DocumentStart { explicit: true }
                } else {
                    TokenKind::DocumentEnd { explicit: true }
                }
            }
            '[' | '{' => {
                self.cursor.advance();
                let kind = if ch == '[' {
                    FlowKind::Sequence
                } else {
                    FlowKind::Mapping
                };
                self.flow.push(kind, line, column);
                match kind {
                    FlowKind::Sequence => TokenKind::FlowSeqStart,
                    FlowKind::Mapping => TokenKind::FlowMapStart,
                }
            }
            ']' | '}' => {
                self.cursor.advance();
                let loc = self.locate(line, column);
                self.flow.pop(ch, loc)?;
                depth = self.flow.depth();
                TokenKind::FlowEnd
            }
            ',' if in_flow => {
                self.cursor.advance();
                TokenKind::Comma
            }
            '-' if !in_flow && is_blankz(next) => {
                self.cursor.advance();
                TokenKind::Dash
            }
            '?' if is_blankz(next) => {
                self.cursor.advance();
                TokenKind::Key
            }
            ':' if self.is_value_indicator(in_flow, next) => {
                self.cursor.advance();
                TokenKind::Colon
            }
            '*' => TokenKind::Alias(self.fetch_name("alias", line, column)?),
            '&' => TokenKind::Anchor(self.fetch_name("anchor", line, column)?),
            '!' => TokenKind::Tag(self.fetch_tag(in_flow, line, column)?),
            '|' | '>' if in_flow => {
                return Err(ScanError::BlockScalarInFlow(self.locate(line, column)));
            }
            '|' | '>' => {
                multiline = true;
                self.fetch_block_scalar(ch, block_indent, line, column)?
            }
            '\'' | '"' => {
                let text = self.fetch_quoted(ch, line, column)?;
                multiline = self.cursor.line() != line;
                if in_flow {
                    self.adjacent_value = Some(self.cursor.mark());
                }
                let style = if ch == '\'' {
                    ScalarStyle::SingleQuoted
                } else {
                    ScalarStyle::DoubleQuoted
                };
                TokenKind::Scalar {
                    text,
                    style,
                    key: false,
                }
            }
            '@' | '`' => {
                return Err(ScanError::ReservedCharacter(ch, self.locate(line, column)));
            }
            _ => {
                let (text, folded) = self.fetch_plain(in_flow, block_indent);
                multiline = folded;
                TokenKind::Scalar {
                    text,
                    style: ScalarStyle::Plain,
                    key: false,
                }
            }
        };

        Ok(Some(Lexeme {
            token: Token::new(line, column, kind),
            depth,
            first_on_line,
            multiline,
        }))
    }

    /// Skip blanks, line breaks and comments up to the next token. A tab in
    /// the indentation of a block-mode line is an error; tabs on blank or
    /// comment lines are not.
    fn skip_to_token(&mut self) -> Result<()> {
        let mut tab = None;
        loop {
            if self.cursor.skip_break() {
                self.line_start = true;
                tab = None;
                continue;
            }
            match self.cursor.peek() {
                Some('\t') if self.line_start && tab.is_none() => {
                    tab = Some(self.cursor.mark());
                    self.cursor.advance();
                }
                Some(c) if is_blank(c) || c == '\r' => {
                    self.cursor.advance();
                }
                Some('#') if self.cursor.prev().map_or(true, |p| is_blank(p) || is_break(p)) => {
                    self.cursor.skip_to_eol();
                }
                _ => break,
            }
        }
        match tab {
            Some((line, column)) if self.flow.is_empty() && !self.cursor.is_eof() => {
                Err(ScanError::TabNotAllowed(self.locate(line, column)))
            }
            _ => Ok(()),
        }
    }

    /// A `:` separates key and value when followed by whitespace, or in flow
    /// context by a flow indicator or directly after a quoted key.
    fn is_value_indicator(&self, in_flow: bool, next: Option<char>) -> bool {
        if is_blankz(next) {
            return true;
        }
        in_flow
            && (next.is_some_and(is_flow_indicator)
                || self.adjacent_value == Some(self.cursor.mark()))
    }

    fn fetch_directive(&mut self, line: usize, column: usize) -> Result<TokenKind> {
        self.cursor.advance();
        self.cursor.skip_blanks();

        let mut name = String::new();
        while !is_blankz(self.cursor.peek()) {
            if let Some(c) = self.cursor.advance() {
                name.push(c);
            }
        }
        if name.is_empty() {
            return Err(ScanError::InvalidDirective(self.locate(line, column)));
        }

        self.cursor.skip_blanks();
        let mut value = String::new();
        while !self.cursor.at_eol() {
            if self.cursor.peek() == Some('#') && self.cursor.prev().is_some_and(is_blank) {
                self.cursor.skip_to_eol();
                break;
            }
            if let Some(c) = self.cursor.advance() {
                value.push(c);
            }
        }
        value.truncate(value.trim_end().len());

        Ok(TokenKind::Directive { name, value })
    }

    /// Anchor or alias name after the `&` / `*` sigil.
    fn fetch_name(&mut self, what: &'static str, line: usize, column: usize) -> Result<String> {
        self.cursor.advance();
        let mut name = String::new();
        while let Some(c) = self.cursor.peek() {
            if is_blankz(Some(c)) || is_flow_indicator(c) {
                break;
            }
            if c == ':' {
                let next = self.cursor.peek_nth(1);
                if is_blankz(next) || next.is_some_and(is_flow_indicator) {
                    break;
                }
            }
            name.push(c);
            self.cursor.advance();
        }
        if name.is_empty() {
            return Err(ScanError::EmptyName(what, self.locate(line, column)));
        }
        Ok(name)
    }

    fn fetch_tag(&mut self, in_flow: bool, line: usize, column: usize) -> Result<String> {
        let mut tag = String::new();
        if let Some(c) = self.cursor.advance() {
            tag.push(c);
        }

        if self.cursor.peek() == Some('<') {
            loop {
                if self.cursor.at_eol() {
                    return Err(ScanError::UnterminatedTag(self.locate(line, column)));
                }
                if let Some(c) = self.cursor.advance() {
                    tag.push(c);
                    if c == '>' {
                        return Ok(tag);
                    }
                }
            }
        }

        while let Some(c) = self.cursor.peek() {
            if is_blankz(Some(c)) || (in_flow && is_flow_indicator(c)) {
                break;
            }
            tag.push(c);
            self.cursor.advance();
        }
        Ok(tag)
    }

    /// Plain scalar, folding continuation lines. Returns the text and whether
    /// it spans several lines.
    fn fetch_plain(&mut self, in_flow: bool, block_indent: usize) -> (String, bool) {
        let mut text = String::new();
        if let Some(c) = self.cursor.advance() {
            text.push(c);
        }
        let mut at_eol = read_plain_line(&mut self.cursor, in_flow, &mut text);
        let mut multiline = false;

        while at_eol {
            let mut probe = self.cursor.clone();
            probe.skip_blanks();
            let mut breaks = 0;
            while probe.skip_break() {
                breaks += 1;
                probe.skip_blanks();
            }
            if breaks == 0
                || probe.is_eof()
                || probe.at_document_marker()
                || probe.peek() == Some('#')
                || (!in_flow && probe.column() <= block_indent)
            {
                break;
            }

            let mut line = String::new();
            let eol = read_plain_line(&mut probe, in_flow, &mut line);
            if line.is_empty() {
                break;
            }
            if breaks == 1 {
                text.push(' ');
            } else {
                for _ in 1..breaks {
                    text.push('\n');
                }
            }
            text.push_str(&line);
            self.cursor = probe;
            self.line_start = false;
            multiline = true;
            at_eol = eol;
        }

        (text, multiline)
    }

    /// Single or double quoted scalar. Line breaks inside fold like plain
    /// scalars; blanks around them are dropped.
    fn fetch_quoted(&mut self, quote: char, line: usize, column: usize) -> Result<String> {
        let start = self.locate(line, column);
        self.cursor.advance();

        let mut text = String::new();
        let mut blanks = String::new();
        loop {
            let Some(ch) = self.cursor.peek() else {
                return Err(ScanError::UnterminatedString(start));
            };
            match ch {
                '\'' if quote == '\'' => {
                    if self.cursor.peek_nth(1) == Some('\'') {
                        text.push_str(&blanks);
                        blanks.clear();
                        text.push('\'');
                        self.cursor.advance_by(2);
                    } else {
                        self.cursor.advance();
                        break;
                    }
                }
                '"' if quote == '"' => {
                    self.cursor.advance();
                    break;
                }
                '\\' if quote == '"' => {
                    text.push_str(&blanks);
                    blanks.clear();
                    let (esc_line, esc_column) = self.cursor.mark();
                    self.cursor.advance();
                    if self.cursor.at_eol() {
                        if !self.cursor.skip_break() || self.cursor.at_document_marker() {
                            return Err(ScanError::UnterminatedString(start));
                        }
                        self.cursor.skip_blanks();
                        continue;
                    }
                    let loc = self.locate(esc_line, esc_column);
                    text.push(self.read_escape(loc)?);
                }
                _ if self.cursor.at_eol() => {
                    blanks.clear();
                    let mut breaks = 0;
                    while self.cursor.skip_break() {
                        breaks += 1;
                        if self.cursor.at_document_marker() {
                            return Err(ScanError::UnterminatedString(start));
                        }
                        self.cursor.skip_blanks();
                    }
                    if breaks == 1 {
                        text.push(' ');
                    } else {
                        for _ in 1..breaks {
                            text.push('\n');
                        }
                    }
                }
                c if is_blank(c) => {
                    blanks.push(c);
                    self.cursor.advance();
                }
                c => {
                    text.push_str(&blanks);
                    blanks.clear();
                    text.push(c);
                    self.cursor.advance();
                }
            }
        }
        Ok(text)
    }

    /// Decode the escape following a backslash. The cursor is past the `\`.
    fn read_escape(&mut self, loc: Location) -> Result<char> {
        let Some(c) = self.cursor.advance() else {
            return Err(ScanError::InvalidEscape(String::new(), loc));
        };
        let decoded = match c {
            '0' => '\0',
            'a' => '\x07',
            'b' => '\x08',
            't' | '\t' => '\t',
            'n' => '\n',
            'v' => '\x0b',
            'f' => '\x0c',
            'r' => '\r',
            'e' => '\x1b',
            ' ' => ' ',
            '"' => '"',
            '/' => '/',
            '\\' => '\\',
            'N' => '\u{85}',
            '_' => '\u{a0}',
            'L' => '\u{2028}',
            'P' => '\u{2029}',
            'x' => self.read_hex(c, 2, loc)?,
            'u' => self.read_hex(c, 4, loc)?,
            'U' => self.read_hex(c, 8, loc)?,
            other => return Err(ScanError::InvalidEscape(other.to_string(), loc)),
        };
        Ok(decoded)
    }

    fn read_hex(&mut self, prefix: char, len: usize, loc: Location) -> Result<char> {
        let mut digits = String::new();
        for _ in 0..len {
            match self.cursor.peek() {
                Some(d) if d.is_ascii_hexdigit() => {
                    digits.push(d);
                    self.cursor.advance();
                }
                _ => return Err(ScanError::InvalidEscape(format!("{prefix}{digits}"), loc)),
            }
        }
        u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| ScanError::InvalidEscape(format!("{prefix}{digits}"), loc))
    }

    /// `|` or `>` block scalar, from its header to the first line indented
    /// less than the content.
    fn fetch_block_scalar(
        &mut self,
        indicator: char,
        block_indent: usize,
        line: usize,
        column: usize,
    ) -> Result<TokenKind> {
        let header = self.locate(line, column);
        self.cursor.advance();

        let mut chomp = Chomp::Clip;
        let mut increment = None;
        while let Some(c) = self.cursor.peek() {
            match c {
                '-' if chomp == Chomp::Clip => chomp = Chomp::Strip,
                '+' if chomp == Chomp::Clip => chomp = Chomp::Keep,
                '1'..='9' if increment.is_none() => increment = c.to_digit(10),
                '0' => return Err(ScanError::InvalidBlockHeader(header)),
                _ => break,
            }
            self.cursor.advance();
        }
        let blanks = self.cursor.skip_blanks();
        if blanks > 0 && self.cursor.peek() == Some('#') {
            self.cursor.skip_to_eol();
        }
        if !self.cursor.at_eol() {
            return Err(ScanError::InvalidBlockHeader(header));
        }
        self.cursor.skip_break();

        let mut indent = increment.map(|m| {
            let m = m as usize;
            if block_indent == 0 {
                m
            } else {
                block_indent - 1 + m
            }
        });
        // Deepest leading empty line seen while the indent is still unknown.
        let mut leading: Option<(usize, usize)> = None;
        let mut lines = Vec::new();

        while !self.cursor.is_eof() && !self.cursor.at_document_marker() {
            let mut probe = self.cursor.clone();
            let limit = indent.unwrap_or(usize::MAX);
            let mut spaces = 0;
            while spaces < limit && probe.peek() == Some(' ') {
                probe.advance();
                spaces += 1;
            }

            if probe.at_eol() {
                if indent.is_none() && leading.map_or(true, |(deepest, _)| spaces > deepest) {
                    leading = Some((spaces, probe.line()));
                }
                let broken = probe.skip_break();
                lines.push(BlockLine {
                    text: String::new(),
                    broken,
                });
                self.cursor = probe;
                continue;
            }

            let content_indent = match indent {
                Some(n) => n,
                None => {
                    if spaces < block_indent {
                        break;
                    }
                    if let Some((deepest, at)) = leading {
                        if deepest > spaces {
                            return Err(ScanError::InconsistentBlockIndent(self.locate(at, 1)));
                        }
                    }
                    indent = Some(spaces);
                    spaces
                }
            };
            if spaces < content_indent {
                break;
            }

            let mut text = String::new();
            while !probe.at_eol() {
                if let Some(c) = probe.advance() {
                    text.push(c);
                }
            }
            let broken = probe.skip_break();
            lines.push(BlockLine { text, broken });
            self.cursor = probe;
        }
        self.line_start = true;

        let style = if indicator == '|' {
            ScalarStyle::Literal
        } else {
            ScalarStyle::Folded
        };
        Ok(TokenKind::Scalar {
            text: fold_block(&lines, style == ScalarStyle::Folded, chomp),
            style,
            key: false,
        })
    }
}

/// Read plain scalar text up to the end of the line or the first character
/// that terminates a plain scalar. Trailing blanks are left unconsumed.
/// Returns true when the end of the line was reached.
fn read_plain_line(cursor: &mut Cursor<'_>, in_flow: bool, out: &mut String) -> bool {
    loop {
        if cursor.at_eol() {
            return true;
        }
        let Some(ch) = cursor.peek() else {
            return true;
        };
        if ends_plain(cursor, in_flow) {
            return false;
        }
        if is_blank(ch) {
            let mut probe = cursor.clone();
            let mut blanks = String::new();
            while let Some(b) = probe.peek().filter(|&b| is_blank(b)) {
                blanks.push(b);
                probe.advance();
            }
            if probe.at_eol() {
                return true;
            }
            if probe.peek() == Some('#') || ends_plain(&probe, in_flow) {
                return false;
            }
            out.push_str(&blanks);
            *cursor = probe;
            continue;
        }
        out.push(ch);
        cursor.advance();
    }
}

/// A `: ` value indicator, or in flow context any flow indicator, ends a
/// plain scalar.
fn ends_plain(cursor: &Cursor<'_>, in_flow: bool) -> bool {
    match cursor.peek() {
        Some(':') => {
            let next = cursor.peek_nth(1);
            is_blankz(next) || (in_flow && next.is_some_and(is_flow_indicator))
        }
        Some(c) => in_flow && is_flow_indicator(c),
        None => true,
    }
}

/// Join block scalar lines per the literal or folded rules, then apply
/// chomping to the trailing line breaks.
fn fold_block(lines: &[BlockLine], folded: bool, chomp: Chomp) -> String {
    let mut out = String::new();
    let last = lines.iter().rposition(|l| !l.text.is_empty());

    let Some(last) = last else {
        if chomp == Chomp::Keep {
            out.push_str(&"\n".repeat(lines.iter().filter(|l| l.broken).count()));
        }
        return out;
    };

    let mut empty = 0;
    let mut prev_more_indented: Option<bool> = None;
    for line in &lines[..=last] {
        if line.text.is_empty() {
            empty += 1;
            continue;
        }
        let more_indented = line.text.starts_with(' ') || line.text.starts_with('\t');
        match prev_more_indented {
            None => {}
            Some(prev) if folded && !prev && !more_indented && empty == 0 => out.push(' '),
            Some(prev) if folded && !prev && !more_indented => {}
            Some(_) => out.push('\n'),
        }
        for _ in 0..empty {
            out.push('\n');
        }
        out.push_str(&line.text);
        prev_more_indented = Some(more_indented);
        empty = 0;
    }

    match chomp {
        Chomp::Strip => {}
        Chomp::Clip => {
            if lines[last].broken {
                out.push('\n');
            }
        }
        Chomp::Keep => {
            if lines[last].broken {
                out.push('\n');
            }
            let trailing = lines[last + 1..].iter().filter(|l| l.broken).count();
            out.push_str(&"\n".repeat(trailing));
        }
    }
    out
}
