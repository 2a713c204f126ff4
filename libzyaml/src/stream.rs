//! Token stream
//!
//! The public pull iterator. Each call to `next` runs the raw scanner only as
//! far as needed to finalize one more token. The stream is fused: after the
//! first error, or once the last document is closed, it yields nothing more.

use std::iter::FusedIterator;

use tracing::{debug, trace};

use crate::autofill::{AutoFill, YamlVersion};
use crate::error::{Result, ScanContext, ScanError};
use crate::scanner::RawScanner;
use crate::token::Token;

pub struct TokenStream<'a> {
    raw: RawScanner<'a>,
    fill: AutoFill,
    finished: bool,
}

impl<'a> TokenStream<'a> {
    pub(crate) fn new(source: &'a str, ctx: ScanContext) -> Self {
        Self {
            raw: RawScanner::new(source, ctx.clone()),
            fill: AutoFill::new(ctx),
            finished: false,
        }
    }

    /// The `%YAML` version declared for the current (or most recently opened)
    /// document, if it had one.
    pub fn yaml_version(&self) -> Option<YamlVersion> {
        self.fill.version()
    }

    /// Feed one primitive token through the auto-fill layer, or close the
    /// stream at end of input.
    fn advance(&mut self) -> Result<()> {
        match self.raw.next_lexeme(self.fill.block_indent())? {
            Some(lexeme) => self.fill.feed(lexeme),
            None => {
                self.finished = true;
                let (line, column) = self.raw.position();
                self.fill.finish(line, column)
            }
        }
    }

    fn fail(&mut self, err: ScanError) -> Option<Result<Token>> {
        debug!(error = %err, "scan failed");
        self.finished = true;
        self.fill.discard_ready();
        Some(Err(err))
    }
}

impl Iterator for TokenStream<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.fill.pop_ready() {
                trace!(%token, "token");
                return Some(Ok(token));
            }
            if self.finished {
                return None;
            }
            if let Err(err) = self.advance() {
                return self.fail(err);
            }
        }
    }
}

impl FusedIterator for TokenStream<'_> {}
