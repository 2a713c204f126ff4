//! Flow and block context stacks.
//!
//! The flow stack belongs to the raw scanner: an empty stack means block mode.
//! The block stack belongs to the auto-fill layer and records the column at
//! which each open block collection's entries align.

use crate::error::{Location, Result, ScanError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    /// `[ ... ]`
    Sequence,
    /// `{ ... }`
    Mapping,
}

impl FlowKind {
    pub fn closer(self) -> char {
        match self {
            FlowKind::Sequence => ']',
            FlowKind::Mapping => '}',
        }
    }
}

/// An open flow collection and the position of its opening bracket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowEntry {
    pub kind: FlowKind,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Default)]
pub struct FlowStack {
    entries: Vec<FlowEntry>,
}

impl FlowStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a flow collection; returns the new depth.
    pub fn push(&mut self, kind: FlowKind, line: usize, column: usize) -> usize {
        self.entries.push(FlowEntry { kind, line, column });
        self.entries.len()
    }

    /// Close the innermost flow collection with `closer`.
    pub fn pop(&mut self, closer: char, loc: Location) -> Result<FlowEntry> {
        match self.entries.last() {
            Some(entry) if entry.kind.closer() == closer => {}
            _ => return Err(ScanError::UnmatchedFlowEnd(closer, loc)),
        }
        self.entries
            .pop()
            .ok_or(ScanError::ContextUnderflow("flow", loc))
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn innermost(&self) -> Option<&FlowEntry> {
        self.entries.last()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Mapping,
    Sequence,
}

impl BlockKind {
    pub fn name(self) -> &'static str {
        match self {
            BlockKind::Mapping => "mapping",
            BlockKind::Sequence => "sequence",
        }
    }
}

/// An open block collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockEntry {
    pub kind: BlockKind,
    /// Column of the collection's keys or dashes.
    pub indent: usize,
    /// A `-`, `?` or `:` was seen and its node has not started yet.
    pub awaiting_node: bool,
    /// Line of the last implicit key's `:`.
    pub value_line: Option<usize>,
}

#[derive(Debug, Default)]
pub struct BlockStack {
    entries: Vec<BlockEntry>,
}

impl BlockStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: BlockKind, indent: usize) {
        self.entries.push(BlockEntry {
            kind,
            indent,
            awaiting_node: false,
            value_line: None,
        });
    }

    pub fn pop(&mut self, loc: Location) -> Result<BlockEntry> {
        self.entries
            .pop()
            .ok_or(ScanError::ContextUnderflow("block", loc))
    }

    pub fn top(&self) -> Option<&BlockEntry> {
        self.entries.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut BlockEntry> {
        self.entries.last_mut()
    }

    /// Indentation of the innermost collection, zero at the root.
    pub fn indent(&self) -> usize {
        self.entries.last().map_or(0, |e| e.indent)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// True when the innermost collection is of `kind` and aligned at `indent`.
    pub fn top_is(&self, kind: BlockKind, indent: usize) -> bool {
        self.top()
            .is_some_and(|e| e.kind == kind && e.indent == indent)
    }
}
