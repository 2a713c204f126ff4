//! Source cursor
//!
//! Tracks the byte offset, 1-based line and column, and the previously
//! consumed character. Cloning a cursor is cheap, which is how the scanner
//! looks ahead across line breaks without committing.

/// Space or tab.
pub fn is_blank(ch: char) -> bool {
    ch == ' ' || ch == '\t'
}

/// Line feed or carriage return.
pub fn is_break(ch: char) -> bool {
    ch == '\n' || ch == '\r'
}

/// Blank, line break, or end of input.
pub fn is_blankz(ch: Option<char>) -> bool {
    match ch {
        None => true,
        Some(c) => is_blank(c) || is_break(c),
    }
}

/// Flow collection indicators.
pub fn is_flow_indicator(ch: char) -> bool {
    matches!(ch, ',' | '[' | ']' | '{' | '}')
}

#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    source: &'a str,
    offset: usize,
    line: usize,
    column: usize,
    prev: Option<char>,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            column: 1,
            prev: None,
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Current (line, column).
    pub fn mark(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    /// The character consumed last, if any.
    pub fn prev(&self) -> Option<char> {
        self.prev
    }

    pub fn rest(&self) -> &'a str {
        &self.source[self.offset..]
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.source.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Look `n` characters past the current one without consuming.
    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    /// At a line break (`\n` or `\r\n`) or end of input.
    pub fn at_eol(&self) -> bool {
        let rest = self.rest();
        rest.is_empty() || rest.starts_with('\n') || rest.starts_with("\r\n")
    }

    /// At a `---` or `...` marker in column 1 followed by whitespace or the
    /// end of input.
    pub fn at_document_marker(&self) -> bool {
        self.column == 1
            && (self.starts_with("---") || self.starts_with("..."))
            && is_blankz(self.peek_nth(3))
    }

    /// Consume one character, updating line and column.
    pub fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.prev = Some(ch);
        Some(ch)
    }

    pub fn advance_by(&mut self, count: usize) {
        for _ in 0..count {
            if self.advance().is_none() {
                break;
            }
        }
    }

    /// Consume a `\n` or `\r\n` line break. Returns false when not at one.
    pub fn skip_break(&mut self) -> bool {
        if self.starts_with("\r\n") {
            self.advance_by(2);
            true
        } else if self.starts_with("\n") {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume spaces and tabs, returning how many were skipped.
    pub fn skip_blanks(&mut self) -> usize {
        let mut count = 0;
        while self.peek().is_some_and(is_blank) {
            self.advance();
            count += 1;
        }
        count
    }

    /// Consume everything up to (not including) the next line break.
    pub fn skip_to_eol(&mut self) {
        while !self.at_eol() {
            self.advance();
        }
    }
}
