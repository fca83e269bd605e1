//! The incremental byte-level parse engine.
//!
//! [`Parser::feed`] consumes input one chunk at a time and may be handed
//! slices of any size, cut anywhere — in the middle of a string, a
//! `\uXXXX` escape, a number, or a literal. All lexing state lives in the
//! parser, never in the chunk, so the resulting arena is byte-for-byte
//! identical no matter how the stream was sliced.

mod number;

use memchr::memchr2;

use crate::arena::{ContainerStack, NodeArena, StackEntry};
use crate::constants::{is_json_whitespace, HASH_MASK};
use crate::document::Document;
use crate::error::{ErrorKind, ParseError};
use crate::node::{Node, NodeId, NodeType};
use crate::options::ParserOptions;

pub(crate) use number::NumberLexer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Ready for a value, or a key when the innermost object expects one.
    Normal,
    /// A value just ended; only `,` or a container close may follow.
    AfterValue,
    /// A key just ended; only `:` may follow.
    ExpectColon,
    InString,
    InNumber,
    InLiteral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Literal {
    True,
    False,
    Null,
}

impl Literal {
    fn bytes(self) -> &'static [u8] {
        match self {
            Literal::True => b"true",
            Literal::False => b"false",
            Literal::Null => b"null",
        }
    }

    fn node_type(self) -> NodeType {
        match self {
            Literal::True => NodeType::True,
            Literal::False => NodeType::False,
            Literal::Null => NodeType::Null,
        }
    }
}

/// Incremental JSON parser writing into a bounded node arena.
///
/// The parser owns its arena and container stack; the source bytes are
/// only borrowed for the duration of each [`feed`](Self::feed) call. Node
/// records store absolute offsets into the logical stream, so the caller
/// must keep the concatenated input available (unchanged) for as long as
/// it navigates the result — [`Document`] encodes that requirement as a
/// borrow.
///
/// ```
/// use flatjson::{Document, Parser};
///
/// let mut parser = Parser::new();
/// parser.feed(b"[1,")?;
/// parser.feed(b"2]")?;
/// parser.finish()?;
///
/// let doc = parser.document(b"[1,2]");
/// let root = doc.root().unwrap();
/// assert_eq!(doc.node(root).children, 2);
/// # Ok::<(), flatjson::ParseError>(())
/// ```
#[derive(Debug)]
pub struct Parser {
    arena: NodeArena,
    stack: ContainerStack,
    state: State,
    consumed: u64,
    line: u32,
    error: Option<ParseError>,

    // Value currently being lexed.
    pending_offset: u64,
    pending_len: u32,
    pending_hash: u32,
    is_key: bool,
    pending_value: bool,
    after_comma: bool,
    in_escape: bool,
    in_unicode: bool,
    unicode_digits: u8,
    number: NumberLexer,
    literal: Literal,
    literal_matched: u8,
}

impl Parser {
    pub fn new() -> Self {
        Self::with_options(ParserOptions::default())
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Self {
            arena: NodeArena::with_capacity(options.node_capacity),
            stack: ContainerStack::with_capacity(options.max_depth),
            state: State::Normal,
            consumed: 0,
            line: 0,
            error: None,
            pending_offset: 0,
            pending_len: 0,
            pending_hash: 0,
            is_key: false,
            pending_value: false,
            after_comma: false,
            in_escape: false,
            in_unicode: false,
            unicode_digits: 0,
            number: NumberLexer::default(),
            literal: Literal::Null,
            literal_matched: 0,
        }
    }

    /// Reset to the freshly-constructed state, keeping the allocations.
    pub fn reset(&mut self) {
        self.arena.clear();
        self.stack.clear();
        self.state = State::Normal;
        self.consumed = 0;
        self.line = 0;
        self.error = None;
        self.pending_offset = 0;
        self.pending_len = 0;
        self.pending_hash = 0;
        self.is_key = false;
        self.pending_value = false;
        self.after_comma = false;
        self.in_escape = false;
        self.in_unicode = false;
        self.unicode_digits = 0;
        self.number = NumberLexer::default();
        self.literal = Literal::Null;
        self.literal_matched = 0;
    }

    /// Ingest one chunk of the stream.
    ///
    /// A zero-length chunk is a no-op. Errors are sticky: once one is
    /// recorded, every further `feed` returns it unchanged.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<(), ParseError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        log::trace!(
            "feed: {} bytes at offset {} in {:?}",
            chunk.len(),
            self.consumed,
            self.state
        );

        let mut pos = 0usize;
        while pos < chunk.len() {
            if matches!(self.state, State::Normal | State::AfterValue) {
                self.skip_whitespace(chunk, &mut pos);
                if pos >= chunk.len() {
                    break;
                }
            }
            match self.state {
                State::ExpectColon => self.step_colon(chunk, &mut pos)?,
                State::InLiteral => self.step_literal(chunk, &mut pos)?,
                State::InString => self.step_string(chunk, &mut pos)?,
                State::InNumber => self.step_number(chunk, &mut pos)?,
                State::Normal | State::AfterValue => self.step_value(chunk, &mut pos)?,
            }
        }
        self.consumed += chunk.len() as u64;
        Ok(())
    }

    /// Declare the stream complete.
    ///
    /// Succeeds only when every container has closed, no string or
    /// literal is in flight, and a trailing number (numbers end only at
    /// the first non-numeric byte) validates. An empty or whitespace-only
    /// stream fails with [`ErrorKind::Incomplete`] but does not poison
    /// the parser: [`error`](Self::error) stays `None`.
    pub fn finish(&mut self) -> Result<(), ParseError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if !self.stack.is_empty() {
            return Err(self.fail(ErrorKind::Incomplete, self.consumed));
        }
        match self.state {
            State::InNumber => {
                self.finalize_number(self.consumed)?;
            }
            State::InString | State::InLiteral => {
                return Err(self.fail(ErrorKind::Incomplete, self.consumed));
            }
            _ => {}
        }
        if self.arena.is_empty() {
            return Err(ParseError::new(ErrorKind::Incomplete, self.consumed, self.line));
        }
        Ok(())
    }

    /// The sticky error, if one has been recorded.
    pub fn error(&self) -> Option<ParseError> {
        self.error
    }

    /// Total bytes consumed by completed `feed` calls.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Zero-based line counter (incremented on `\n` and `\r`).
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Current container nesting depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn into_arena(self) -> NodeArena {
        self.arena
    }

    /// View the arena against the reassembled source stream.
    pub fn document<'a>(&'a self, source: &'a [u8]) -> Document<'a> {
        Document::new(&self.arena, source)
    }

    fn fail(&mut self, kind: ErrorKind, pos: u64) -> ParseError {
        let err = ParseError::new(kind, pos, self.line);
        log::debug!("parse error: {} in {:?}", err, self.state);
        self.error = Some(err);
        err
    }

    fn skip_whitespace(&mut self, chunk: &[u8], pos: &mut usize) {
        while let Some(&byte) = chunk.get(*pos) {
            if !is_json_whitespace(byte) {
                break;
            }
            if byte == b'\n' || byte == b'\r' {
                self.line += 1;
            }
            *pos += 1;
        }
    }

    fn step_colon(&mut self, chunk: &[u8], pos: &mut usize) -> Result<(), ParseError> {
        if chunk[*pos] != b':' {
            return Err(self.fail(ErrorKind::Unexpected, self.consumed + *pos as u64));
        }
        if let Some(top) = self.stack.top_mut() {
            top.expecting_key = false;
        }
        self.state = State::Normal;
        *pos += 1;
        Ok(())
    }

    fn step_literal(&mut self, chunk: &[u8], pos: &mut usize) -> Result<(), ParseError> {
        let expected = self.literal.bytes();
        if chunk[*pos] != expected[usize::from(self.literal_matched)] {
            return Err(self.fail(ErrorKind::Unexpected, self.consumed + *pos as u64));
        }
        self.literal_matched += 1;
        *pos += 1;

        if usize::from(self.literal_matched) == expected.len() {
            let abs = self.consumed + *pos as u64;
            let node = Node {
                ty: self.literal.node_type(),
                offset: self.pending_offset as u32,
                len: expected.len() as u32,
                children: 0,
                hash: self.inherited_key_hash(),
                text: None,
            };
            self.append_value_node(node, abs)?;
            self.state = State::AfterValue;
            self.literal_matched = 0;
        }
        Ok(())
    }

    fn step_string(&mut self, chunk: &[u8], pos: &mut usize) -> Result<(), ParseError> {
        let byte = chunk[*pos];

        if self.in_unicode {
            if !byte.is_ascii_hexdigit() {
                return Err(self.fail(ErrorKind::Unexpected, self.consumed + *pos as u64));
            }
            self.unicode_digits += 1;
            if self.unicode_digits == 4 {
                self.in_unicode = false;
            }
            if self.is_key {
                self.pending_hash = self.pending_hash.wrapping_mul(33) ^ u32::from(byte);
            }
            self.pending_len += 1;
            *pos += 1;
            return Ok(());
        }

        if self.in_escape {
            self.in_escape = false;
            match byte {
                b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't' => {}
                b'u' => {
                    self.in_unicode = true;
                    self.unicode_digits = 0;
                }
                _ => {
                    return Err(self.fail(ErrorKind::Unexpected, self.consumed + *pos as u64));
                }
            }
            if self.is_key {
                self.pending_hash = self.pending_hash.wrapping_mul(33) ^ u32::from(byte);
            }
            self.pending_len += 1;
            *pos += 1;
            return Ok(());
        }

        match byte {
            b'\\' => {
                self.in_escape = true;
                if self.is_key {
                    self.pending_hash = self.pending_hash.wrapping_mul(33) ^ u32::from(byte);
                }
                self.pending_len += 1;
                *pos += 1;
            }
            b'"' => {
                self.close_string(pos)?;
            }
            _ if self.is_key => {
                self.pending_hash = self.pending_hash.wrapping_mul(33) ^ u32::from(byte);
                self.pending_len += 1;
                *pos += 1;
            }
            _ => {
                // Plain payload bytes are transparent; swallow the whole
                // run up to the next quote or backslash in one step.
                let rest = &chunk[*pos..];
                let run = memchr2(b'"', b'\\', rest).unwrap_or(rest.len());
                self.pending_len += run as u32;
                *pos += run;
            }
        }
        Ok(())
    }

    fn close_string(&mut self, pos: &mut usize) -> Result<(), ParseError> {
        let abs = self.consumed + *pos as u64;
        let hash = if self.is_key {
            self.pending_hash & HASH_MASK
        } else {
            self.inherited_key_hash()
        };
        let mut node = Node::new(NodeType::String, self.pending_offset as u32, self.pending_len);
        node.hash = hash;

        if self.is_key {
            if self.arena.try_push(node).is_err() {
                return Err(self.fail(ErrorKind::Capacity, abs));
            }
            self.state = State::ExpectColon;
            self.pending_value = true;
        } else {
            self.append_value_node(node, abs)?;
            self.state = State::AfterValue;
        }
        *pos += 1;
        self.in_escape = false;
        self.in_unicode = false;
        self.unicode_digits = 0;
        Ok(())
    }

    fn step_number(&mut self, chunk: &[u8], pos: &mut usize) -> Result<(), ParseError> {
        let byte = chunk[*pos];
        if self.number.accept(byte) {
            self.pending_len += 1;
            *pos += 1;
            Ok(())
        } else {
            // The terminating byte is not consumed; the outer loop
            // re-examines it in `AfterValue`.
            self.finalize_number(self.consumed + *pos as u64)
        }
    }

    fn finalize_number(&mut self, abs: u64) -> Result<(), ParseError> {
        if !self.number.is_valid() {
            return Err(self.fail(ErrorKind::Unexpected, abs));
        }
        let node = Node {
            ty: self.number.node_type(),
            offset: self.pending_offset as u32,
            len: self.pending_len,
            children: 0,
            hash: self.inherited_key_hash(),
            text: None,
        };
        self.append_value_node(node, abs)?;
        self.state = State::AfterValue;
        Ok(())
    }

    fn step_value(&mut self, chunk: &[u8], pos: &mut usize) -> Result<(), ParseError> {
        let byte = chunk[*pos];
        let abs = self.consumed + *pos as u64;

        // Container close is legal in both `Normal` and `AfterValue`.
        if let Some(top) = self.stack.top() {
            let top_ty = self.arena.node(top.index).ty;
            if (byte == b'}' && top_ty == NodeType::Object)
                || (byte == b']' && top_ty == NodeType::Array)
            {
                return self.close_container(pos);
            }
        }

        if self.state == State::AfterValue {
            if byte == b',' {
                self.state = State::Normal;
                self.after_comma = true;
                *pos += 1;
                let top_is_object = self
                    .stack
                    .top()
                    .is_some_and(|top| self.arena.node(top.index).ty == NodeType::Object);
                if top_is_object {
                    if let Some(top) = self.stack.top_mut() {
                        top.expecting_key = true;
                    }
                }
                return Ok(());
            }
            return Err(self.fail(ErrorKind::Unexpected, abs));
        }

        let expecting_key = self.stack.top().is_some_and(|top| top.expecting_key);
        if expecting_key {
            if byte != b'"' {
                return Err(self.fail(ErrorKind::Unexpected, abs));
            }
            self.after_comma = false;
            self.begin_string(pos, true);
            return Ok(());
        }

        self.pending_value = false;
        self.after_comma = false;
        match byte {
            b'"' => {
                self.begin_string(pos, false);
                Ok(())
            }
            b'{' => self.open_container(pos, NodeType::Object),
            b'[' => self.open_container(pos, NodeType::Array),
            b'-' | b'0'..=b'9' => {
                self.state = State::InNumber;
                self.pending_offset = abs;
                self.pending_len = 1;
                self.number = NumberLexer::begin(byte);
                *pos += 1;
                Ok(())
            }
            b't' | b'f' | b'n' => {
                self.literal = match byte {
                    b't' => Literal::True,
                    b'f' => Literal::False,
                    _ => Literal::Null,
                };
                self.literal_matched = 1;
                self.pending_offset = abs;
                self.state = State::InLiteral;
                *pos += 1;
                Ok(())
            }
            _ => Err(self.fail(ErrorKind::Unexpected, abs)),
        }
    }

    fn begin_string(&mut self, pos: &mut usize, is_key: bool) {
        self.state = State::InString;
        self.is_key = is_key;
        self.pending_offset = self.consumed + *pos as u64 + 1;
        self.pending_len = 0;
        self.pending_hash = 0;
        self.in_escape = false;
        self.in_unicode = false;
        self.unicode_digits = 0;
        *pos += 1;
    }

    fn open_container(&mut self, pos: &mut usize, ty: NodeType) -> Result<(), ParseError> {
        let abs = self.consumed + *pos as u64;
        // Both writes are checked up front so an overflow mutates nothing.
        if self.arena.len() >= self.arena.capacity() || self.stack.is_full() {
            return Err(self.fail(ErrorKind::Capacity, abs));
        }
        self.bump_enclosing_children();
        let node = Node::new(ty, abs as u32, 0);
        let index = self.arena.try_push(node).expect("capacity checked");
        self.stack
            .try_push(StackEntry {
                index,
                expecting_key: ty == NodeType::Object,
            })
            .expect("capacity checked");
        log::trace!("open {:?} at {} depth {}", ty, abs, self.stack.len());
        *pos += 1;
        Ok(())
    }

    fn close_container(&mut self, pos: &mut usize) -> Result<(), ParseError> {
        let abs = self.consumed + *pos as u64;
        if self.pending_value || self.after_comma {
            // An object key with no value, or a trailing comma.
            return Err(self.fail(ErrorKind::Unexpected, abs));
        }
        let entry = self.stack.pop().expect("close checked against stack top");
        let total_descendants = (self.arena.len() - (entry.index.index() + 1)) as u32;
        let node = self.arena.node_mut(entry.index);
        node.len = (abs - u64::from(node.offset) + 1) as u32;
        node.hash = total_descendants;
        log::trace!(
            "close {:?} at {}: {} descendants",
            node.ty,
            abs,
            total_descendants
        );
        self.state = State::AfterValue;
        *pos += 1;
        Ok(())
    }

    /// Append a completed value node: capacity check, enclosing child
    /// count, done.
    fn append_value_node(&mut self, node: Node, abs: u64) -> Result<NodeId, ParseError> {
        match self.arena.try_push(node) {
            Ok(id) => {
                self.bump_enclosing_children();
                Ok(id)
            }
            Err(_) => Err(self.fail(ErrorKind::Capacity, abs)),
        }
    }

    fn bump_enclosing_children(&mut self) {
        if let Some(top) = self.stack.top().copied() {
            self.arena.node_mut(top.index).children += 1;
        }
    }

    /// The key hash an object value inherits: the enclosing container is
    /// an object and the previous node is its key string.
    fn inherited_key_hash(&self) -> u32 {
        let top = match self.stack.top() {
            Some(top) => top,
            None => return 0,
        };
        if self.arena.node(top.index).ty != NodeType::Object {
            return 0;
        }
        match self.arena.len().checked_sub(1) {
            Some(prev) => {
                let prev = self.arena.node(NodeId(prev as u32));
                if prev.ty == NodeType::String {
                    prev.hash
                } else {
                    0
                }
            }
            None => 0,
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
