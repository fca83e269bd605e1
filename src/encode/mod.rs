//! JSON serialization over a [`ByteSink`].
//!
//! Parsed strings and numbers are written back byte-for-byte from the
//! source — escapes survive verbatim, which is what makes the round trip
//! lossless. Builder-created strings own raw (unescaped) text and go
//! through [`escape_into`]. The writer drives an explicit frame stack
//! rather than recursing, so document depth is bounded by the heap, not
//! the call stack.

use crate::constants::INDENT_WIDTH;
use crate::document::Document;
use crate::node::{NodeId, NodeType};
use crate::options::Style;
use crate::sink::ByteSink;

struct Frame {
    id: NodeId,
    cursor: Option<NodeId>,
    emitted: u32,
    depth: usize,
}

/// Serialize the document root. Returns the number of bytes written.
pub fn serialize<S: ByteSink>(doc: &Document<'_>, style: Style, sink: &mut S) -> usize {
    match doc.root() {
        Some(root) => write_node(doc, root, style, sink),
        None => 0,
    }
}

/// Serialize one node and its subtree. Returns the number of bytes
/// written.
pub fn write_node<S: ByteSink>(
    doc: &Document<'_>,
    id: NodeId,
    style: Style,
    sink: &mut S,
) -> usize {
    let start = sink.len();
    let pretty = style == Style::Pretty;
    let mut frames: Vec<Frame> = Vec::new();

    emit_value(doc, id, 0, pretty, sink, &mut frames);

    while !frames.is_empty() {
        let top = frames.len() - 1;
        let frame_id = frames[top].id;
        let depth = frames[top].depth;
        let emitted = frames[top].emitted;
        let node = doc.node(frame_id);

        if emitted == node.children {
            frames.pop();
            if pretty {
                sink.push_byte(b'\n');
                indent(sink, depth);
            }
            sink.push_byte(if node.ty == NodeType::Object { b'}' } else { b']' });
            continue;
        }

        if emitted > 0 {
            sink.push_byte(b',');
            if pretty {
                sink.push_byte(b'\n');
            }
        }
        if pretty {
            indent(sink, depth + 1);
        }

        let Some(cursor) = frames[top].cursor else {
            frames.pop();
            continue;
        };
        let value_id = if node.ty == NodeType::Object {
            write_string_node(doc, cursor, sink);
            sink.push_byte(b':');
            if pretty {
                sink.push_byte(b' ');
            }
            match doc.next_sibling(cursor) {
                Some(value) => value,
                None => {
                    frames.pop();
                    continue;
                }
            }
        } else {
            cursor
        };

        frames[top].emitted += 1;
        frames[top].cursor = doc.next_sibling(value_id);
        emit_value(doc, value_id, depth + 1, pretty, sink, &mut frames);
    }

    sink.len() - start
}

fn emit_value<S: ByteSink>(
    doc: &Document<'_>,
    id: NodeId,
    depth: usize,
    pretty: bool,
    sink: &mut S,
    frames: &mut Vec<Frame>,
) {
    let node = doc.node(id);
    match node.ty {
        NodeType::Null => sink.extend_bytes(b"null"),
        NodeType::True => sink.extend_bytes(b"true"),
        NodeType::False => sink.extend_bytes(b"false"),
        NodeType::Int | NodeType::Float => sink.extend_bytes(doc.raw(id)),
        NodeType::String => write_string_node(doc, id, sink),
        NodeType::Array | NodeType::Object => {
            if node.children == 0 {
                sink.extend_bytes(if node.ty == NodeType::Array { b"[]" } else { b"{}" });
                return;
            }
            sink.push_byte(if node.ty == NodeType::Array { b'[' } else { b'{' });
            if pretty {
                sink.push_byte(b'\n');
            }
            frames.push(Frame {
                id,
                cursor: Some(NodeId(id.0 + 1)),
                emitted: 0,
                depth,
            });
        }
    }
}

fn write_string_node<S: ByteSink>(doc: &Document<'_>, id: NodeId, sink: &mut S) {
    sink.push_byte(b'"');
    let raw = doc.raw(id);
    if doc.node(id).has_owned_text() {
        escape_into(sink, raw);
    } else {
        sink.extend_bytes(raw);
    }
    sink.push_byte(b'"');
}

fn indent<S: ByteSink>(sink: &mut S, depth: usize) {
    for _ in 0..depth * INDENT_WIDTH {
        sink.push_byte(b' ');
    }
}

/// Write `bytes` with JSON string escaping applied, without surrounding
/// quotes. Meant for raw text (builder strings); parsed payloads are
/// already in escaped form and must be written verbatim instead.
pub fn escape_into<S: ByteSink>(sink: &mut S, bytes: &[u8]) {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    for &byte in bytes {
        match byte {
            b'"' => sink.extend_bytes(b"\\\""),
            b'\\' => sink.extend_bytes(b"\\\\"),
            0x08 => sink.extend_bytes(b"\\b"),
            0x0c => sink.extend_bytes(b"\\f"),
            b'\n' => sink.extend_bytes(b"\\n"),
            b'\r' => sink.extend_bytes(b"\\r"),
            b'\t' => sink.extend_bytes(b"\\t"),
            _ if byte < 0x20 => {
                sink.extend_bytes(b"\\u00");
                sink.push_byte(HEX[usize::from(byte >> 4)]);
                sink.push_byte(HEX[usize::from(byte & 0x0f)]);
            }
            _ => sink.push_byte(byte),
        }
    }
}
