//! Programmatic tree construction.
//!
//! The builder appends nodes to the same arena the parser fills, but with
//! owned textual forms instead of source offsets. It is meant for small
//! trees assembled by hand; the caller keeps the document-prefix rule —
//! children go into the arena immediately after their parent, and a
//! nested container is fully populated before it is attached to its own
//! parent.
//!
//! ```
//! use flatjson::{Document, Style, TreeBuilder};
//!
//! let mut builder = TreeBuilder::new(16);
//! let root = builder.object()?;
//! let key = builder.string("name")?;
//! let value = builder.string("Alice")?;
//! builder.object_set(root, key, value);
//!
//! let arena = builder.into_arena();
//! let doc = Document::new(&arena, b"");
//! assert_eq!(doc.to_vec(Style::Compact), br#"{"name":"Alice"}"#);
//! # Ok::<(), flatjson::ArenaFull>(())
//! ```

use crate::arena::{ArenaFull, NodeArena};
use crate::node::{key_hash, Node, NodeId, NodeType};

#[derive(Debug)]
pub struct TreeBuilder {
    arena: NodeArena,
}

impl TreeBuilder {
    pub fn new(node_capacity: usize) -> Self {
        Self {
            arena: NodeArena::with_capacity(node_capacity),
        }
    }

    /// Build into an existing arena (for example one recycled from a
    /// previous parse).
    pub fn with_arena(arena: NodeArena) -> Self {
        Self { arena }
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn into_arena(self) -> NodeArena {
        self.arena
    }

    pub fn null(&mut self) -> Result<NodeId, ArenaFull> {
        self.arena.try_push(Node::new(NodeType::Null, 0, 4))
    }

    pub fn bool(&mut self, value: bool) -> Result<NodeId, ArenaFull> {
        let (ty, len) = if value {
            (NodeType::True, 4)
        } else {
            (NodeType::False, 5)
        };
        self.arena.try_push(Node::new(ty, 0, len))
    }

    pub fn int(&mut self, value: i64) -> Result<NodeId, ArenaFull> {
        let mut buffer = itoa::Buffer::new();
        self.push_text_node(NodeType::Int, buffer.format(value), 0)
    }

    /// Non-finite values have no JSON form and are stored as `null`.
    pub fn float(&mut self, value: f64) -> Result<NodeId, ArenaFull> {
        if !value.is_finite() {
            return self.null();
        }
        let mut buffer = ryu::Buffer::new();
        self.push_text_node(NodeType::Float, buffer.format(value), 0)
    }

    pub fn string(&mut self, value: &str) -> Result<NodeId, ArenaFull> {
        self.push_text_node(NodeType::String, value, key_hash(value.as_bytes()))
    }

    pub fn array(&mut self) -> Result<NodeId, ArenaFull> {
        self.arena.try_push(Node::new(NodeType::Array, 0, 0))
    }

    pub fn object(&mut self) -> Result<NodeId, ArenaFull> {
        self.arena.try_push(Node::new(NodeType::Object, 0, 0))
    }

    /// Attach `element` to `array`: bumps the direct-child count and the
    /// descendant count that sibling skips rely on. Returns `false` when
    /// `array` is not an array node.
    pub fn array_append(&mut self, array: NodeId, element: NodeId) -> bool {
        let size = self.subtree_size(element);
        let Some(node) = self.node_mut_of(array, NodeType::Array) else {
            return false;
        };
        node.children += 1;
        node.hash += size;
        true
    }

    /// Attach a key/value entry to `object`. The value inherits the key's
    /// hash (the lookup accelerator), matching what the parser records.
    /// Returns `false` when the node types do not line up.
    pub fn object_set(&mut self, object: NodeId, key: NodeId, value: NodeId) -> bool {
        let key_node = match self.arena.get(key) {
            Some(node) if node.ty == NodeType::String => *node,
            _ => return false,
        };
        let value_size = self.subtree_size(value);
        if self.node_mut_of(object, NodeType::Object).is_none() {
            return false;
        }
        if let Some(value_node) = self.arena.get(value) {
            if value_node.ty.is_scalar() {
                self.arena.node_mut(value).hash = key_node.hash;
            }
        }
        let node = self.arena.node_mut(object);
        node.children += 1;
        node.hash += 1 + value_size;
        true
    }

    fn push_text_node(
        &mut self,
        ty: NodeType,
        text: &str,
        hash: u32,
    ) -> Result<NodeId, ArenaFull> {
        if self.arena.len() >= self.arena.capacity() {
            return Err(ArenaFull);
        }
        let len = text.len() as u32;
        let handle = self.arena.intern_text(text.into());
        let mut node = Node::new(ty, 0, len);
        node.hash = hash;
        node.text = Some(handle);
        self.arena.try_push(node)
    }

    fn node_mut_of(&mut self, id: NodeId, ty: NodeType) -> Option<&mut Node> {
        match self.arena.get(id) {
            Some(node) if node.ty == ty => Some(self.arena.node_mut(id)),
            _ => None,
        }
    }

    /// Nodes a value occupies in the arena: itself plus, for containers,
    /// their recorded descendants.
    fn subtree_size(&self, id: NodeId) -> u32 {
        match self.arena.get(id) {
            Some(node) if node.ty.is_container() => 1 + node.hash,
            Some(_) => 1,
            None => 0,
        }
    }
}
