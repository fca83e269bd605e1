//! Navigation and value access over a parsed arena.
//!
//! A [`Document`] is nothing but an arena and the source bytes its nodes
//! point into. The borrow ties every lookup to the lifetime of both: the
//! compiler enforces the rule that the source stream must outlive any
//! access to the parse result.

use crate::arena::NodeArena;
use crate::node::{key_hash, Node, NodeId, NodeType};
use crate::options::Style;
use crate::sink::ByteSink;

/// Read-only view of a parsed (or built) document.
#[derive(Debug, Clone, Copy)]
pub struct Document<'a> {
    arena: &'a NodeArena,
    source: &'a [u8],
}

impl<'a> Document<'a> {
    /// Pair an arena with the logical source stream it was parsed from.
    ///
    /// For chunked input this is the concatenation of every chunk, in
    /// feed order.
    pub fn new(arena: &'a NodeArena, source: &'a [u8]) -> Self {
        Self { arena, source }
    }

    pub fn arena(&self) -> &'a NodeArena {
        self.arena
    }

    pub fn source(&self) -> &'a [u8] {
        self.source
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// The document root: the first node in the arena.
    pub fn root(&self) -> Option<NodeId> {
        if self.arena.is_empty() {
            None
        } else {
            Some(NodeId(0))
        }
    }

    pub fn node(&self, id: NodeId) -> &'a Node {
        self.arena.node(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&'a Node> {
        self.arena.get(id)
    }

    /// First child of a container; `None` for scalars and empty
    /// containers. Children sit immediately after their parent.
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        let node = self.arena.get(id)?;
        if node.ty.is_container() && node.children > 0 {
            Some(NodeId(id.0 + 1))
        } else {
            None
        }
    }

    /// Next sibling in document order, skipping the whole subtree of a
    /// container in one step via its descendant count.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let node = self.arena.get(id)?;
        let mut next = id.index() + 1;
        if node.ty.is_container() {
            next += node.hash as usize;
        }
        if next < self.arena.len() {
            Some(NodeId(next as u32))
        } else {
            None
        }
    }

    /// Element `index` of an array, by linear sibling walk.
    pub fn array_element(&self, array: NodeId, index: usize) -> Option<NodeId> {
        let node = self.arena.get(array)?;
        if node.ty != NodeType::Array || index >= node.children as usize {
            return None;
        }
        let mut child = self.first_child(array)?;
        for _ in 0..index {
            child = self.next_sibling(child)?;
        }
        Some(child)
    }

    /// Look up an object entry by key and return its value node.
    ///
    /// `key` is compared against the raw, still-escaped key bytes. The
    /// 28-bit hash only prefilters; a match always confirms length and
    /// full byte equality. Keys are walked pairwise (key, then the value
    /// subtree via `next_sibling`), so value nodes are never candidates.
    pub fn object_value(&self, object: NodeId, key: &str) -> Option<NodeId> {
        let node = self.arena.get(object)?;
        if node.ty != NodeType::Object {
            return None;
        }
        let query = key.as_bytes();
        let query_hash = key_hash(query);
        // One past the object's own subtree; keys of enclosing or sibling
        // containers must never be candidates.
        let end = object.index() + 1 + node.hash as usize;

        let mut key_id = self.first_child(object)?;
        while key_id.index() < end {
            let value_id = self.next_sibling(key_id)?;
            let key_node = self.arena.node(key_id);
            if key_node.hash == query_hash
                && key_node.len as usize == query.len()
                && self.raw(key_id) == query
            {
                return Some(value_id);
            }
            match self.next_sibling(value_id) {
                Some(next) => key_id = next,
                None => break,
            }
        }
        None
    }

    /// The node's raw textual form: the owned builder text when present,
    /// otherwise the source slice `offset..offset + len`.
    ///
    /// For strings this is the still-escaped payload between the quotes;
    /// for numbers the token bytes; for containers the full bracketed
    /// span.
    pub fn raw(&self, id: NodeId) -> &'a [u8] {
        let node = self.arena.node(id);
        match node.text {
            Some(handle) => self.arena.text(handle).as_bytes(),
            None => {
                let start = node.offset as usize;
                let end = start + node.len as usize;
                &self.source[start..end]
            }
        }
    }

    /// Integer value of an [`Int`](NodeType::Int) node. `None` when the
    /// node has another type or the token does not fit an `i64`.
    pub fn as_int(&self, id: NodeId) -> Option<i64> {
        let node = self.arena.get(id)?;
        if node.ty != NodeType::Int {
            return None;
        }
        let text = std::str::from_utf8(self.raw(id)).ok()?;
        text.parse().ok()
    }

    /// Float value of a [`Float`](NodeType::Float) (or `Int`) node.
    pub fn as_float(&self, id: NodeId) -> Option<f64> {
        let node = self.arena.get(id)?;
        if !matches!(node.ty, NodeType::Float | NodeType::Int) {
            return None;
        }
        let text = std::str::from_utf8(self.raw(id)).ok()?;
        text.parse().ok()
    }

    /// True only for a [`True`](NodeType::True) node.
    pub fn as_bool(&self, id: NodeId) -> bool {
        self.arena
            .get(id)
            .is_some_and(|node| node.ty == NodeType::True)
    }

    /// Copy the raw string payload into `buf`, truncating to its length.
    /// Returns the filled prefix; empty for non-string nodes.
    pub fn str_into<'b>(&self, id: NodeId, buf: &'b mut [u8]) -> &'b [u8] {
        let is_string = self
            .arena
            .get(id)
            .is_some_and(|node| node.ty == NodeType::String);
        if !is_string {
            return &buf[..0];
        }
        let raw = self.raw(id);
        let n = raw.len().min(buf.len());
        buf[..n].copy_from_slice(&raw[..n]);
        &buf[..n]
    }

    /// Serialize the root subtree into a fresh buffer.
    pub fn to_vec(&self, style: Style) -> Vec<u8> {
        let mut out = Vec::new();
        if let Some(root) = self.root() {
            crate::encode::write_node(self, root, style, &mut out);
        }
        out
    }

    /// Serialize the root subtree into `sink`, returning bytes written.
    pub fn serialize<S: ByteSink>(&self, style: Style, sink: &mut S) -> usize {
        match self.root() {
            Some(root) => crate::encode::write_node(self, root, style, sink),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parser;
    use test_log::test;

    fn parsed(input: &'static [u8]) -> (Parser, &'static [u8]) {
        let mut parser = Parser::new();
        parser.feed(input).expect("feed");
        parser.finish().expect("finish");
        (parser, input)
    }

    #[test]
    fn test_root_of_empty_arena() {
        let parser = Parser::new();
        let doc = parser.document(b"");
        assert_eq!(doc.root(), None);
    }

    #[test]
    fn test_array_elements() {
        let (parser, source) = parsed(b"[10, [20, 30], 40]");
        let doc = parser.document(source);
        let root = doc.root().unwrap();
        assert_eq!(doc.as_int(doc.array_element(root, 0).unwrap()), Some(10));
        let inner = doc.array_element(root, 1).unwrap();
        assert_eq!(doc.node(inner).ty, NodeType::Array);
        // Element 2 sits after the nested array: the descendant skip.
        assert_eq!(doc.as_int(doc.array_element(root, 2).unwrap()), Some(40));
        assert_eq!(doc.array_element(root, 3), None);
    }

    #[test]
    fn test_object_lookup() {
        let (parser, source) = parsed(br#"{"a":1,"b":true,"c":null}"#);
        let doc = parser.document(source);
        let root = doc.root().unwrap();
        let b = doc.object_value(root, "b").unwrap();
        assert_eq!(doc.node(b).ty, NodeType::True);
        assert!(doc.as_bool(b));
        assert_eq!(doc.object_value(root, "missing"), None);
        assert_eq!(doc.object_value(root, "bb"), None);
    }

    #[test]
    fn test_object_lookup_skips_nested_values() {
        let (parser, source) =
            parsed(br#"{"user":{"name":"Alice","age":30,"active":true},"tags":[]}"#);
        let doc = parser.document(source);
        let root = doc.root().unwrap();
        let user = doc.object_value(root, "user").unwrap();
        assert_eq!(doc.node(user).ty, NodeType::Object);
        let tags = doc.object_value(root, "tags").unwrap();
        assert_eq!(doc.node(tags).ty, NodeType::Array);
        assert_eq!(doc.node(tags).children, 0);
        // A key of the nested object must not leak into the outer one.
        assert_eq!(doc.object_value(root, "name"), None);
        let age = doc.object_value(user, "age").unwrap();
        assert_eq!(doc.as_int(age), Some(30));
    }

    #[test]
    fn test_raw_string_payload_is_escaped_form() {
        let (parser, source) = parsed(br#""a\nb""#);
        let doc = parser.document(source);
        let root = doc.root().unwrap();
        assert_eq!(doc.raw(root), br"a\nb");
    }

    #[test]
    fn test_str_into_truncates() {
        let (parser, source) = parsed(br#""hello world""#);
        let doc = parser.document(source);
        let root = doc.root().unwrap();
        let mut buf = [0u8; 5];
        assert_eq!(doc.str_into(root, &mut buf), b"hello");
        let mut big = [0u8; 64];
        assert_eq!(doc.str_into(root, &mut big), b"hello world");
    }

    #[test]
    fn test_str_into_non_string_is_empty() {
        let (parser, source) = parsed(b"42");
        let doc = parser.document(source);
        let mut buf = [0u8; 8];
        assert_eq!(doc.str_into(doc.root().unwrap(), &mut buf), b"");
    }

    #[test]
    fn test_numeric_accessors() {
        let (parser, source) = parsed(br#"{"score":98.6,"id":123}"#);
        let doc = parser.document(source);
        let root = doc.root().unwrap();
        let score = doc.object_value(root, "score").unwrap();
        assert_eq!(doc.as_float(score), Some(98.6));
        assert_eq!(doc.as_int(score), None);
        let id = doc.object_value(root, "id").unwrap();
        assert_eq!(doc.as_int(id), Some(123));
        assert_eq!(doc.as_float(id), Some(123.0));
    }

    #[test]
    fn test_as_int_out_of_range() {
        let (parser, source) = parsed(b"99999999999999999999999");
        let doc = parser.document(source);
        assert_eq!(doc.as_int(doc.root().unwrap()), None);
    }

    #[test]
    fn test_next_sibling_at_end() {
        let (parser, source) = parsed(b"[1, 2.5, true, false, null, \"hi\"]");
        let doc = parser.document(source);
        let root = doc.root().unwrap();
        assert_eq!(doc.node(root).children, 6);
        assert_eq!(doc.node(root).hash, 6);
        assert_eq!(doc.next_sibling(root), None);
    }
}
