/// Default node arena capacity used by the convenience entry points.
pub const DEFAULT_NODE_CAPACITY: usize = 64 * 1024;

/// Default container nesting limit used by the convenience entry points.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Key hashes are stored truncated to 28 bits.
pub const HASH_MASK: u32 = 0x0FFF_FFFF;

/// Bytes shown on each side of the error position in diagnostic snippets.
pub const SNIPPET_RADIUS: usize = 20;

/// Indent width per nesting level in pretty serialization.
pub const INDENT_WIDTH: usize = 2;

#[inline]
pub fn is_json_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}
