use crate::constants::{DEFAULT_MAX_DEPTH, DEFAULT_NODE_CAPACITY};

/// Sizing for a [`Parser`](crate::Parser).
///
/// Both bounds are hard: the parser reports
/// [`ErrorKind::Capacity`](crate::ErrorKind::Capacity) instead of growing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Maximum number of nodes the arena will hold.
    pub node_capacity: usize,
    /// Maximum container nesting depth.
    pub max_depth: usize,
}

impl ParserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node_capacity(mut self, node_capacity: usize) -> Self {
        self.node_capacity = node_capacity;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            node_capacity: DEFAULT_NODE_CAPACITY,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Serializer output shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    /// No whitespace at all.
    #[default]
    Compact,
    /// Two-space indentation, one element per line.
    Pretty,
}
