//! Simple-key tracker
//!
//! A scalar may turn out to be a mapping key only once a later `:` shows up.
//! The tracker holds the single pending candidate until the auto-fill layer
//! either confirms it (a `:` arrived in the same flow context) or discards it
//! (anything else arrived first). Opening or closing a flow collection always
//! discards, so one slot is enough for every nesting depth.

use crate::token::Token;

/// A scalar that might still become a mapping key.
#[derive(Debug, Clone)]
pub struct SimpleKey {
    pub token: Token,
    /// Anchors and tags seen before the scalar and not yet emitted.
    pub props: Vec<Token>,
    /// Flow depth the scalar was found at.
    pub depth: usize,
    /// Column the implied mapping would start at: the scalar's column, or the
    /// column of the first property on the same line.
    pub column: usize,
    /// A `:` may still confirm this candidate.
    pub possible: bool,
    /// The candidate sits where only a key is allowed.
    pub required: bool,
}

impl SimpleKey {
    pub fn line(&self) -> usize {
        self.token.line
    }
}

#[derive(Debug, Default)]
pub struct SimpleKeyTracker {
    slot: Option<SimpleKey>,
}

impl SimpleKeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new candidate, handing back the one it displaces.
    pub fn register(&mut self, key: SimpleKey) -> Option<SimpleKey> {
        self.slot.replace(key)
    }

    /// Remove the pending candidate so it can be emitted as a plain value.
    pub fn take(&mut self) -> Option<SimpleKey> {
        self.slot.take()
    }

    /// Resolve the pending candidate as a key for a `:`. Every flow bracket
    /// and comma discards the candidate first, so it always belongs to the
    /// same flow context as the colon.
    pub fn confirm(&mut self) -> Option<SimpleKey> {
        self.slot.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{ScalarStyle, TokenKind};

    fn candidate(text: &str, depth: usize) -> SimpleKey {
        SimpleKey {
            token: Token::new(
                1,
                1,
                TokenKind::Scalar {
                    text: text.to_string(),
                    style: ScalarStyle::Plain,
                    key: false,
                },
            ),
            props: Vec::new(),
            depth,
            column: 1,
            possible: true,
            required: false,
        }
    }

    #[test]
    fn test_register_displaces() {
        let mut tracker = SimpleKeyTracker::new();
        assert!(tracker.register(candidate("a", 0)).is_none());
        let old = tracker.register(candidate("b", 0)).unwrap();
        assert_eq!(old.token.text(), Some("a"));
        assert_eq!(tracker.take().unwrap().token.text(), Some("b"));
        assert!(tracker.take().is_none());
    }

    #[test]
    fn test_confirm() {
        let mut tracker = SimpleKeyTracker::new();
        tracker.register(candidate("a", 1));
        let key = tracker.confirm().unwrap();
        assert_eq!(key.token.text(), Some("a"));
        assert_eq!(key.depth, 1);
        assert!(tracker.confirm().is_none());
        assert!(tracker.take().is_none());
    }
}
