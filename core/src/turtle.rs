//! The Turtle grammar (component G) and node emission (component H): a
//! recursive-descent parser driving an [`RdfSink`] directly, with no
//! intermediate tree — every triple is handed to the sink as soon as its
//! object is read, exactly as the original reader's `emit_statement` calls
//! are threaded through the grammar productions rather than collected.

use crate::arena::{Ref, ScratchStack};
use crate::chars::{is_alpha, is_digit};
use crate::error::TurtleError;
use crate::input::{PagedReader, EOF};
use std::io::Read;
use turtlo_api::flags::{LiteralFlags, StatementFlags};
use turtlo_api::model::{BlankNode, Curie, Literal, NamedNode, NamedOrBlankNode, Term, Triple};
use turtlo_api::sink::RdfSink;

const NS_XSD: &str = "http://www.w3.org/2001/XMLSchema#";
const NS_RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
enum NodeKind {
    Uri,
    Curie,
    Blank,
    Literal,
}

/// The reader's own node representation: everything is a `Ref` into the
/// arena rather than a borrowed `&str`, so a `Node` can be held across
/// further parsing (and further arena pushes) without upsetting the borrow
/// checker. Conversion to a borrowed public term happens only immediately
/// before a sink call, in [`TurtleParser::emit_statement`].
#[derive(Clone, Copy)]
struct Node {
    kind: NodeKind,
    value: Ref,
    datatype: Option<Ref>,
    lang: Option<Ref>,
    /// Only meaningful for `NodeKind::Literal`; `LiteralFlags::NONE` for
    /// every other kind.
    literal_flags: LiteralFlags,
}

impl Node {
    fn simple(kind: NodeKind, value: Ref) -> Self {
        Self {
            kind,
            value,
            datatype: None,
            lang: None,
            literal_flags: LiteralFlags::NONE,
        }
    }
}

/// The ambient state a production reads its current subject/predicate
/// from, plus the flags every statement emitted at this level should carry
/// (see the module doc on `ANON_CONT`/`LIST_CONT` semantics below).
#[derive(Clone, Copy, Default)]
struct ReadContext {
    subject: Option<Node>,
    predicate: Option<Node>,
    /// Flags unioned onto every statement emitted while `subject` is the
    /// still-open anonymous node or collection cell this context belongs
    /// to. Set only for the `read_predicate_object_list` call launched
    /// directly from `read_blank`'s `[`-handling and from
    /// `read_collection_rec`, never inherited by a nested node's own
    /// elaboration.
    running_flags: StatementFlags,
}

/// A streaming [Turtle](https://www.w3.org/TR/turtle/) parser.
pub struct TurtleParser<R: Read> {
    input: PagedReader<R>,
    stack: ScratchStack,
    blank_prefix: String,
    next_id: u64,
    rdf_type: Ref,
    rdf_first: Ref,
    rdf_rest: Ref,
    rdf_nil: Ref,
}

impl<R: Read> TurtleParser<R> {
    pub fn new(source: R, name: impl Into<String>) -> Result<Self, TurtleError> {
        let input = PagedReader::new(source, name)?;
        let mut stack = ScratchStack::new();
        let rdf_type = push_literal_str(&mut stack, &format!("{}type", NS_RDF));
        let rdf_first = push_literal_str(&mut stack, &format!("{}first", NS_RDF));
        let rdf_rest = push_literal_str(&mut stack, &format!("{}rest", NS_RDF));
        let rdf_nil = push_literal_str(&mut stack, &format!("{}nil", NS_RDF));
        for r in [rdf_type, rdf_first, rdf_rest, rdf_nil] {
            stack.pin(r);
        }
        Ok(Self {
            input,
            stack,
            blank_prefix: "genid".to_string(),
            next_id: 1,
            rdf_type,
            rdf_first,
            rdf_rest,
            rdf_nil,
        })
    }

    /// Overrides the prefix used to mint fresh blank-node labels (default
    /// `"genid"`), useful when merging output from several parses into one
    /// document without colliding blank-node ids.
    pub fn set_blank_prefix(&mut self, prefix: impl Into<String>) {
        self.blank_prefix = prefix.into();
    }

    pub fn is_end(&self) -> bool {
        self.input.is_eof()
    }

    /// Parses the whole document, invoking `sink` for every event.
    pub fn parse_all(&mut self, sink: &mut impl RdfSink) -> Result<(), TurtleError> {
        while !self.is_end() {
            self.read_statement(sink)?;
        }
        Ok(())
    }

    // ---- component H: node emission -----------------------------------

    fn public_term(&self, node: &Node) -> Term<'_> {
        match node.kind {
            NodeKind::Uri => Term::NamedNode(NamedNode {
                iri: self.stack.as_str(node.value),
            }),
            NodeKind::Curie => {
                let s = self.stack.as_str(node.value);
                let split = s.find(':').unwrap_or(s.len());
                Term::Curie(Curie {
                    prefix: &s[..split],
                    local: &s[split + 1..],
                })
            }
            NodeKind::Blank => Term::BlankNode(BlankNode {
                id: self.stack.as_str(node.value),
            }),
            NodeKind::Literal => {
                let value = self.stack.as_str(node.value);
                let flags = node.literal_flags;
                Term::Literal(match (node.datatype, node.lang) {
                    (Some(dt), _) => Literal::Typed {
                        value,
                        datatype: NamedNode {
                            iri: self.stack.as_str(dt),
                        },
                        flags,
                    },
                    (None, Some(lang)) => Literal::LanguageTaggedString {
                        value,
                        language: self.stack.as_str(lang),
                        flags,
                    },
                    (None, None) => Literal::Simple { value, flags },
                })
            }
        }
    }

    fn public_subject(&self, node: &Node) -> NamedOrBlankNode<'_> {
        match self.public_term(node) {
            Term::NamedNode(nn) => NamedOrBlankNode::NamedNode(nn),
            Term::Curie(c) => NamedOrBlankNode::Curie(c),
            Term::BlankNode(bn) => NamedOrBlankNode::BlankNode(bn),
            Term::Literal(_) => unreachable!("subject/predicate nodes are never literals"),
        }
    }

    fn emit_statement(
        &self,
        sink: &mut impl RdfSink,
        subject: &Node,
        predicate: &Node,
        object: &Node,
        flags: StatementFlags,
    ) -> Result<(), TurtleError> {
        let triple = Triple {
            subject: self.public_subject(subject),
            predicate: match self.public_term(predicate) {
                Term::NamedNode(nn) => nn,
                _ => unreachable!("predicate is always a NamedNode in Turtle"),
            },
            object: self.public_term(object),
        };
        if !sink.statement(triple, flags) {
            return Err(TurtleError::Cancelled(self.input.position()));
        }
        Ok(())
    }

    fn blank_id(&mut self) -> Ref {
        let id = self.next_id;
        self.next_id += 1;
        let r = self.stack.push_string();
        self.stack.push_str(r, &self.blank_prefix);
        self.stack.push_str(r, &id.to_string());
        r
    }

    // ---- component F: escapes and characters ---------------------------

    fn read_hex(&mut self) -> Result<u8, TurtleError> {
        let c = self.input.current();
        if c.is_ascii_digit() || (b'A'..=b'F').contains(&c) {
            self.input.eat()
        } else {
            Err(self.input.error(format!("illegal hexadecimal digit `{}'", c as char)))
        }
    }

    fn read_hex_escape(&mut self, length: u32, dest: Ref) -> Result<(), TurtleError> {
        let mut value: u32 = 0;
        for _ in 0..length {
            let c = self.read_hex()?;
            let digit = (c as char).to_digit(16).unwrap();
            value = value * 16 + digit;
        }
        let ch = char::from_u32(value)
            .ok_or_else(|| self.input.error(format!("invalid codepoint U+{:X}", value)))?;
        let mut buf = [0u8; 4];
        self.stack.push_bytes(dest, ch.encode_utf8(&mut buf).as_bytes());
        Ok(())
    }

    /// `\\`, `\uXXXX`, `\UXXXXXXXX`. Returns `Ok(true)` if it consumed one
    /// of those, `Ok(false)` if the current byte matches none of them.
    fn read_character_escape(&mut self, dest: Ref) -> Result<bool, TurtleError> {
        match self.input.current() {
            b'\\' => {
                self.stack.push_byte(dest, self.input.eat()?);
                Ok(true)
            }
            b'u' => {
                self.input.eat()?;
                self.read_hex_escape(4, dest)?;
                Ok(true)
            }
            b'U' => {
                self.input.eat()?;
                self.read_hex_escape(8, dest)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Adds `\t`, `\n`, `\r` on top of [`read_character_escape`].
    fn read_echaracter_escape(&mut self, dest: Ref) -> Result<bool, TurtleError> {
        match self.input.current() {
            b't' => {
                self.input.eat()?;
                self.stack.push_byte(dest, b'\t');
                Ok(true)
            }
            b'n' => {
                self.input.eat()?;
                self.stack.push_byte(dest, b'\n');
                Ok(true)
            }
            b'r' => {
                self.input.eat()?;
                self.stack.push_byte(dest, b'\r');
                Ok(true)
            }
            _ => self.read_character_escape(dest),
        }
    }

    /// Adds `\"` on top of [`read_echaracter_escape`] (string contexts),
    /// tracking [`LiteralFlags::HAS_QUOTE`]/[`LiteralFlags::HAS_NEWLINE`] on
    /// the escapes that set them.
    fn read_scharacter_escape(&mut self, dest: Ref, flags: &mut LiteralFlags) -> Result<bool, TurtleError> {
        match self.input.current() {
            b'"' => {
                self.stack.push_byte(dest, self.input.eat()?);
                flags.insert(LiteralFlags::HAS_QUOTE);
                Ok(true)
            }
            b'n' => {
                self.input.eat()?;
                self.stack.push_byte(dest, b'\n');
                flags.insert(LiteralFlags::HAS_NEWLINE);
                Ok(true)
            }
            b'r' => {
                self.input.eat()?;
                self.stack.push_byte(dest, b'\r');
                flags.insert(LiteralFlags::HAS_NEWLINE);
                Ok(true)
            }
            b't' | b'\\' | b'u' | b'U' => self.read_echaracter_escape(dest),
            _ => Ok(false),
        }
    }

    /// Adds `\>` on top of [`read_echaracter_escape`] (URI-ref contexts).
    fn read_ucharacter_escape(&mut self, dest: Ref) -> Result<bool, TurtleError> {
        if self.input.current() == b'>' {
            self.stack.push_byte(dest, self.input.eat()?);
            Ok(true)
        } else {
            self.read_echaracter_escape(dest)
        }
    }

    /// `[#x20-#x5B] | [#x5D-#x10FFFF]` plus the escapes — a single
    /// character, possibly multi-byte UTF-8, always consuming something or
    /// erroring (never the terminator; callers that have a terminator
    /// check for it before calling this).
    fn read_character(&mut self, dest: Ref) -> Result<(), TurtleError> {
        let c = self.input.current();
        match c {
            EOF => Err(self.input.error("unexpected end of file")),
            c if c < 0x20 => Err(self.input.error("unexpected control character")),
            c if c <= 0x7E => {
                self.stack.push_byte(dest, self.input.eat()?);
                Ok(())
            }
            c => {
                let size = if c & 0xE0 == 0xC0 {
                    2
                } else if c & 0xF0 == 0xE0 {
                    3
                } else if c & 0xF8 == 0xF0 {
                    4
                } else {
                    return Err(self.input.error("invalid character"));
                };
                for _ in 0..size {
                    self.stack.push_byte(dest, self.input.eat()?);
                }
                Ok(())
            }
        }
    }

    /// `character | '\t' | '\n' | '\r'`.
    fn read_echaracter(&mut self, dest: Ref) -> Result<(), TurtleError> {
        if self.input.current() == b'\\' {
            self.input.eat()?;
            if self.read_echaracter_escape(dest)? {
                Ok(())
            } else {
                Err(self.input.error(format!("illegal escape `\\{}'", self.input.current() as char)))
            }
        } else {
            self.read_character(dest)
        }
    }

    /// `echaracter | '\"' | #x9 | #xA | #xD`, used inside `"""..."""`.
    /// Returns `Ok(false)` on the closing `"""` (already consumed), never
    /// consuming it itself when it's just a lone or doubled `"`.
    fn read_lcharacter(&mut self, dest: Ref, flags: &mut LiteralFlags) -> Result<bool, TurtleError> {
        match self.input.current() {
            b'"' => {
                let pre = self.input.peek(3)?;
                if pre[1] == b'"' && pre[2] == b'"' {
                    self.input.eat_expect(b'"')?;
                    self.input.eat_expect(b'"')?;
                    self.input.eat_expect(b'"')?;
                    Ok(false)
                } else {
                    self.stack.push_byte(dest, self.input.eat()?);
                    Ok(true)
                }
            }
            b'\\' => {
                self.input.eat()?;
                if self.read_scharacter_escape(dest, flags)? {
                    Ok(true)
                } else {
                    Err(self.input.error(format!("illegal escape `\\{}'", self.input.current() as char)))
                }
            }
            c @ (0x9 | 0xA | 0xD) => {
                self.stack.push_byte(dest, self.input.eat()?);
                if c == 0xA || c == 0xD {
                    flags.insert(LiteralFlags::HAS_NEWLINE);
                }
                Ok(true)
            }
            _ => {
                self.read_echaracter(dest)?;
                Ok(true)
            }
        }
    }

    /// `(echaracter - #x22) | '\"'`, used inside `"..."`.
    fn read_scharacter(&mut self, dest: Ref, flags: &mut LiteralFlags) -> Result<bool, TurtleError> {
        match self.input.current() {
            b'\\' => {
                self.input.eat()?;
                if self.read_scharacter_escape(dest, flags)? {
                    Ok(true)
                } else {
                    Err(self.input.error(format!("illegal escape `\\{}'", self.input.current() as char)))
                }
            }
            b'"' => Ok(false),
            _ => {
                self.read_character(dest)?;
                Ok(true)
            }
        }
    }

    /// `(echaracter - #x3E) | '\>'`, used inside `<...>`.
    fn read_ucharacter(&mut self, dest: Ref) -> Result<bool, TurtleError> {
        match self.input.current() {
            b'\\' => {
                self.input.eat()?;
                if self.read_ucharacter_escape(dest)? {
                    Ok(true)
                } else {
                    Err(self.input.error(format!("illegal escape `\\{}'", self.input.current() as char)))
                }
            }
            b'>' => Ok(false),
            _ => {
                self.read_character(dest)?;
                Ok(true)
            }
        }
    }

    fn read_comment(&mut self) -> Result<(), TurtleError> {
        self.input.eat_expect(b'#')?;
        loop {
            match self.input.current() {
                0xA | 0xD | EOF => return Ok(()),
                _ => {
                    self.input.eat()?;
                }
            }
        }
    }

    fn read_ws(&mut self) -> Result<bool, TurtleError> {
        match self.input.current() {
            0x9 | 0xA | 0xD | 0x20 => {
                self.input.eat()?;
                Ok(true)
            }
            b'#' => {
                self.read_comment()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn read_ws_star(&mut self) -> Result<(), TurtleError> {
        while self.read_ws()? {}
        Ok(())
    }

    fn read_ws_plus(&mut self) -> Result<(), TurtleError> {
        if !self.read_ws()? {
            return Err(self.input.unexpected());
        }
        self.read_ws_star()
    }

    // ---- strings, names, numbers ----------------------------------------

    fn read_long_string(&mut self) -> Result<(Ref, LiteralFlags), TurtleError> {
        self.input.eat_str("\"\"\"")?;
        let str_ref = self.stack.push_string();
        let mut flags = LiteralFlags::NONE;
        loop {
            match self.read_lcharacter(str_ref, &mut flags) {
                Ok(true) => continue,
                Ok(false) => return Ok((str_ref, flags)),
                Err(e) => {
                    self.stack.pop(str_ref);
                    return Err(e);
                }
            }
        }
    }

    fn read_string(&mut self) -> Result<(Ref, LiteralFlags), TurtleError> {
        self.input.eat_expect(b'"')?;
        let str_ref = self.stack.push_string();
        let mut flags = LiteralFlags::NONE;
        loop {
            match self.read_scharacter(str_ref, &mut flags) {
                Ok(true) => continue,
                Ok(false) => {
                    self.input.eat_expect(b'"')?;
                    return Ok((str_ref, flags));
                }
                Err(e) => {
                    self.stack.pop(str_ref);
                    return Err(e);
                }
            }
        }
    }

    fn read_quoted_string(&mut self) -> Result<(Ref, LiteralFlags), TurtleError> {
        let pre = self.input.peek(3)?;
        debug_assert_eq!(pre[0], b'"');
        if pre[1] == b'"' && pre[2] == b'"' {
            self.read_long_string()
        } else {
            self.read_string()
        }
    }

    fn read_relative_uri(&mut self) -> Result<Ref, TurtleError> {
        let str_ref = self.stack.push_string();
        loop {
            match self.read_ucharacter(str_ref) {
                Ok(true) => continue,
                Ok(false) => return Ok(str_ref),
                Err(e) => {
                    self.stack.pop(str_ref);
                    return Err(e);
                }
            }
        }
    }

    fn read_name_start_char(&mut self, required: bool) -> Result<Option<u8>, TurtleError> {
        let c = self.input.current();
        if c == b'_' || is_alpha(c) {
            Ok(Some(self.input.eat()?))
        } else if required {
            Err(self.input.error(format!("illegal character `{}'", c as char)))
        } else {
            Ok(None)
        }
    }

    fn read_name_char(&mut self) -> Result<Option<u8>, TurtleError> {
        if let Some(c) = self.read_name_start_char(false)? {
            return Ok(Some(c));
        }
        match self.input.current() {
            // TODO: 0x300-0x036F | 0x203F-0x2040
            c @ (b'-' | 0xB7) | c @ b'0'..=b'9' => Ok(Some(self.input.eat_expect(c)?)),
            _ => Ok(None),
        }
    }

    fn read_prefix_name(&mut self) -> Result<Option<Ref>, TurtleError> {
        if self.input.current() == b'_' {
            return Err(self.input.error("unexpected `_'"));
        }
        let first = match self.read_name_start_char(false)? {
            Some(c) => c,
            None => return Ok(None),
        };
        let str_ref = self.stack.push_string();
        self.stack.push_byte(str_ref, first);
        while let Some(c) = self.read_name_char()? {
            self.stack.push_byte(str_ref, c);
        }
        Ok(Some(str_ref))
    }

    fn read_name(&mut self, dest: Ref, required: bool) -> Result<bool, TurtleError> {
        let first = match self.read_name_start_char(required)? {
            Some(c) => c,
            None => return Ok(false),
        };
        self.stack.push_byte(dest, first);
        while let Some(c) = self.read_name_char()? {
            self.stack.push_byte(dest, c);
        }
        Ok(true)
    }

    fn read_language(&mut self) -> Result<Ref, TurtleError> {
        let start = self.input.current();
        if !(b'a'..=b'z').contains(&start) {
            return Err(self.input.error(format!("unexpected `{}'", start as char)));
        }
        let str_ref = self.stack.push_string();
        self.stack.push_byte(str_ref, self.input.eat()?);
        while (b'a'..=b'z').contains(&self.input.current()) {
            self.stack.push_byte(str_ref, self.input.eat()?);
        }
        while self.input.current() == b'-' {
            self.stack.push_byte(str_ref, self.input.eat()?);
            while is_digit(self.input.current()) || (b'a'..=b'z').contains(&self.input.current()) {
                self.stack.push_byte(str_ref, self.input.eat()?);
            }
        }
        Ok(str_ref)
    }

    fn read_uriref(&mut self) -> Result<Ref, TurtleError> {
        self.input.eat_expect(b'<')?;
        let r = self.read_relative_uri()?;
        if let Err(e) = self.input.eat_expect(b'>') {
            self.stack.pop(r);
            return Err(e);
        }
        Ok(r)
    }

    fn read_qname(&mut self) -> Result<Ref, TurtleError> {
        let prefix = match self.read_prefix_name()? {
            Some(r) => r,
            None => self.stack.push_string(),
        };
        if self.input.current() != b':' {
            self.stack.pop(prefix);
            return Err(self.input.unexpected());
        }
        self.input.eat()?;
        self.stack.push_byte(prefix, b':');
        self.read_name(prefix, false)?;
        Ok(prefix)
    }

    fn read_0_9(&mut self, dest: Ref, at_least_one: bool) -> Result<(), TurtleError> {
        if at_least_one && !is_digit(self.input.current()) {
            return Err(self.input.error("expected digit"));
        }
        while is_digit(self.input.current()) {
            self.stack.push_byte(dest, self.input.eat()?);
        }
        Ok(())
    }

    fn read_number(&mut self) -> Result<Node, TurtleError> {
        let str_ref = self.stack.push_string();
        let mut has_decimal = false;
        let c = self.input.current();
        if c == b'-' || c == b'+' {
            self.stack.push_byte(str_ref, self.input.eat()?);
        }
        if self.input.current() == b'.' {
            has_decimal = true;
            self.stack.push_byte(str_ref, self.input.eat()?);
            if let Err(e) = self.read_0_9(str_ref, true) {
                self.stack.pop(str_ref);
                return Err(e);
            }
        } else {
            if let Err(e) = self.read_0_9(str_ref, true) {
                self.stack.pop(str_ref);
                return Err(e);
            }
            if self.input.current() == b'.' {
                has_decimal = true;
                self.stack.push_byte(str_ref, self.input.eat()?);
                self.read_0_9(str_ref, false)?;
            }
        }
        let datatype_name = if matches!(self.input.current(), b'e' | b'E') {
            self.stack.push_byte(str_ref, self.input.eat()?);
            if matches!(self.input.current(), b'+' | b'-') {
                self.stack.push_byte(str_ref, self.input.eat()?);
            }
            self.read_0_9(str_ref, true)?;
            "double"
        } else if has_decimal {
            "decimal"
        } else {
            "integer"
        };
        let datatype = push_literal_str(&mut self.stack, &format!("{}{}", NS_XSD, datatype_name));
        Ok(Node {
            kind: NodeKind::Literal,
            value: str_ref,
            datatype: Some(datatype),
            lang: None,
            literal_flags: LiteralFlags::NONE,
        })
    }

    fn read_resource(&mut self) -> Result<Node, TurtleError> {
        if self.input.current() == b'<' {
            Ok(Node::simple(NodeKind::Uri, self.read_uriref()?))
        } else {
            Ok(Node::simple(NodeKind::Curie, self.read_qname()?))
        }
    }

    fn read_literal(&mut self) -> Result<Node, TurtleError> {
        let c = self.input.current();
        if c == b'-' || c == b'+' || c == b'.' || is_digit(c) {
            return self.read_number();
        }
        if c != b'"' {
            return Err(self.input.error("unknown literal type"));
        }
        let (value, literal_flags) = self.read_quoted_string()?;
        let (datatype, lang) = match self.input.current() {
            b'^' => {
                self.input.eat()?;
                if let Err(e) = self.input.eat_expect(b'^') {
                    self.stack.pop(value);
                    return Err(e);
                }
                match self.read_resource() {
                    Ok(dt) => (Some(dt.value), None),
                    Err(e) => {
                        self.stack.pop(value);
                        return Err(e);
                    }
                }
            }
            b'@' => {
                self.input.eat()?;
                match self.read_language() {
                    Ok(lang) => (None, Some(lang)),
                    Err(e) => {
                        self.stack.pop(value);
                        return Err(e);
                    }
                }
            }
            _ => (None, None),
        };
        Ok(Node {
            kind: NodeKind::Literal,
            value,
            datatype,
            lang,
            literal_flags,
        })
    }

    fn read_predicate(&mut self) -> Result<Node, TurtleError> {
        self.read_resource()
    }

    fn read_verb(&mut self) -> Result<Node, TurtleError> {
        let pre = self.input.peek(2)?;
        if pre[0] == b'a' && matches!(pre[1], 0x9 | 0xA | 0xD | 0x20 | EOF) {
            self.input.eat()?;
            Ok(Node::simple(NodeKind::Uri, self.rdf_type))
        } else {
            self.read_predicate()
        }
    }

    /// An explicitly-written `_:genid...` label is rewritten in place to
    /// `_:docid...` over its first five bytes, so a user-supplied label
    /// can never collide with one [`blank_id`](Self::blank_id) generates.
    fn read_node_id(&mut self) -> Result<Ref, TurtleError> {
        self.input.eat_expect(b'_')?;
        self.input.eat_expect(b':')?;
        let str_ref = self.stack.push_string();
        self.read_name(str_ref, true)?;
        if self.stack.as_str(str_ref).as_bytes().starts_with(b"genid") {
            self.stack.overwrite(str_ref, 0, b"docid");
        }
        Ok(str_ref)
    }

    /// `nodeID | '[]' | '[' predicateObjectList ']' | collection`.
    fn read_blank(
        &mut self,
        sink: &mut impl RdfSink,
        ctx: &ReadContext,
    ) -> Result<(Node, StatementFlags), TurtleError> {
        match self.input.current() {
            b'_' => Ok((Node::simple(NodeKind::Blank, self.read_node_id()?), StatementFlags::NONE)),
            b'[' => {
                self.input.eat()?;
                self.read_ws_star()?;
                if self.input.current() == b']' {
                    self.input.eat()?;
                    let node = Node::simple(NodeKind::Blank, self.blank_id());
                    if let Some(subject) = &ctx.subject {
                        let open_flags = StatementFlags::EMPTY_O.union(ctx.running_flags);
                        self.emit_statement(
                            sink,
                            subject,
                            &ctx.predicate.unwrap(),
                            &node,
                            open_flags,
                        )?;
                    }
                    return Ok((node, StatementFlags::EMPTY_S));
                }
                let node = Node::simple(NodeKind::Blank, self.blank_id());
                if let Some(subject) = &ctx.subject {
                    let open_flags = StatementFlags::ANON_O_BEGIN.union(ctx.running_flags);
                    self.emit_statement(
                        sink,
                        subject,
                        &ctx.predicate.unwrap(),
                        &node,
                        open_flags,
                    )?;
                }
                let inner_ctx = ReadContext {
                    subject: Some(node),
                    predicate: None,
                    running_flags: StatementFlags::ANON_CONT,
                };
                self.read_predicate_object_list(sink, &inner_ctx, StatementFlags::NONE)?;
                self.read_ws_star()?;
                self.input.eat_expect(b']')?;
                sink.end_anon(BlankNode {
                    id: self.stack.as_str(node.value),
                });
                Ok((node, StatementFlags::ANON_S_BEGIN))
            }
            b'(' => {
                let node = self.read_collection(sink)?;
                if let Some(subject) = &ctx.subject {
                    let flags = StatementFlags::LIST_O_BEGIN.union(ctx.running_flags);
                    self.emit_statement(sink, subject, &ctx.predicate.unwrap(), &node, flags)?;
                }
                Ok((node, StatementFlags::LIST_S_BEGIN))
            }
            _ => Err(self.input.error("illegal blank node")),
        }
    }

    fn is_object_end(c: u8) -> bool {
        matches!(c, 0x9 | 0xA | 0xD | 0x20 | EOF | b'#' | b'.' | b';')
    }

    /// `resource | blank | literal`. `Ok(None)` only at the degenerate
    /// `)`/EOF lookahead used defensively inside collection parsing.
    /// `extra` is unioned onto this object's own statement only (used to
    /// carry `EMPTY_S`/`ANON_S_BEGIN`/`LIST_S_BEGIN` onto the first object
    /// of a `predicateObjectList` whose subject was just opened).
    fn read_object(
        &mut self,
        sink: &mut impl RdfSink,
        ctx: &ReadContext,
        extra: StatementFlags,
    ) -> Result<Option<Node>, TurtleError> {
        let c = self.input.current();
        if c == EOF || c == b')' {
            return Ok(None);
        }

        let (node, already_emitted) = match c {
            b'[' | b'(' => {
                let (node, _) = self.read_blank(sink, ctx)?;
                (node, true)
            }
            b'_' => {
                let (node, _) = self.read_blank(sink, ctx)?;
                (node, false)
            }
            b'<' | b':' => (self.read_resource()?, false),
            b'"' | b'+' | b'-' | b'0'..=b'9' | b'.' => (self.read_literal()?, false),
            _ => {
                let pre = self.input.peek(6)?;
                if &pre[..4] == b"true" && Self::is_object_end(pre[4]) {
                    self.input.eat_str("true")?;
                    (self.boolean_node("true"), false)
                } else if &pre[..5] == b"false" && Self::is_object_end(pre[5]) {
                    self.input.eat_str("false")?;
                    (self.boolean_node("false"), false)
                } else if Self::is_object_end(c) {
                    return Err(self.input.unexpected());
                } else {
                    (Node::simple(NodeKind::Curie, self.read_qname()?), false)
                }
            }
        };

        if !already_emitted {
            if let Some(subject) = &ctx.subject {
                self.emit_statement(
                    sink,
                    subject,
                    &ctx.predicate.unwrap(),
                    &node,
                    ctx.running_flags.union(extra),
                )?;
            }
        }
        Ok(Some(node))
    }

    fn boolean_node(&mut self, lexical: &str) -> Node {
        let value = push_literal_str(&mut self.stack, lexical);
        let datatype = push_literal_str(&mut self.stack, &format!("{}boolean", NS_XSD));
        Node {
            kind: NodeKind::Literal,
            value,
            datatype: Some(datatype),
            lang: None,
            literal_flags: LiteralFlags::NONE,
        }
    }

    /// `object (ws* ',' ws* object)*`. `first_extra` is applied only to the
    /// first object; later ones in the same comma list are plain
    /// continuations of `ctx`.
    fn read_object_list(
        &mut self,
        sink: &mut impl RdfSink,
        ctx: &ReadContext,
        first_extra: StatementFlags,
    ) -> Result<(), TurtleError> {
        self.read_object(sink, ctx, first_extra)?;
        self.read_ws_star()?;
        while self.input.current() == b',' {
            self.input.eat()?;
            self.read_ws_star()?;
            self.read_object(sink, ctx, StatementFlags::NONE)?;
            self.read_ws_star()?;
        }
        Ok(())
    }

    /// `verb objectList (';' verb objectList)* (';')?`.
    fn read_predicate_object_list(
        &mut self,
        sink: &mut impl RdfSink,
        ctx: &ReadContext,
        first_extra: StatementFlags,
    ) -> Result<(), TurtleError> {
        let mut ctx = *ctx;
        let predicate = self.read_verb()?;
        self.read_ws_plus()?;
        ctx.predicate = Some(predicate);
        self.read_object_list(sink, &ctx, first_extra)?;
        self.read_ws_star()?;
        while self.input.current() == b';' {
            self.input.eat()?;
            self.read_ws_star()?;
            match self.input.current() {
                b'.' | b']' => return Ok(()),
                _ => {
                    let predicate = self.read_verb()?;
                    ctx.predicate = Some(predicate);
                    self.read_ws_plus()?;
                    self.read_object_list(sink, &ctx, StatementFlags::NONE)?;
                    self.read_ws_star()?;
                }
            }
        }
        Ok(())
    }

    /// Recursive helper for [`read_collection`]: one cell at a time.
    fn read_collection_rec(
        &mut self,
        sink: &mut impl RdfSink,
        ctx: &ReadContext,
        cell: Node,
    ) -> Result<(), TurtleError> {
        self.read_ws_star()?;
        if self.input.current() == b')' {
            self.input.eat()?;
            let nil = Node::simple(NodeKind::Uri, self.rdf_nil);
            let rest_pred = Node::simple(NodeKind::Uri, self.rdf_rest);
            self.emit_statement(sink, &cell, &rest_pred, &nil, ctx.running_flags)?;
            return Ok(());
        }
        let next_cell = Node::simple(NodeKind::Blank, self.blank_id());
        let rest_pred = Node::simple(NodeKind::Uri, self.rdf_rest);
        self.emit_statement(sink, &cell, &rest_pred, &next_cell, ctx.running_flags)?;

        let first_pred = Node::simple(NodeKind::Uri, self.rdf_first);
        let item_ctx = ReadContext {
            subject: Some(next_cell),
            predicate: Some(first_pred),
            running_flags: ctx.running_flags,
        };
        match self.read_object(sink, &item_ctx, StatementFlags::NONE)? {
            Some(_) => self.read_collection_rec(sink, ctx, next_cell),
            None => Err(self.input.error("unexpected end of collection")),
        }
    }

    /// `'(' itemList? ')'`.
    fn read_collection(&mut self, sink: &mut impl RdfSink) -> Result<Node, TurtleError> {
        self.input.eat_expect(b'(')?;
        self.read_ws_star()?;
        if self.input.current() == b')' {
            self.input.eat()?;
            return Ok(Node::simple(NodeKind::Uri, self.rdf_nil));
        }
        let cell = Node::simple(NodeKind::Blank, self.blank_id());
        let first_pred = Node::simple(NodeKind::Uri, self.rdf_first);
        let item_ctx = ReadContext {
            subject: Some(cell),
            predicate: Some(first_pred),
            running_flags: StatementFlags::LIST_CONT,
        };
        if self
            .read_object(sink, &item_ctx, StatementFlags::NONE)?
            .is_none()
        {
            return Err(self.input.error("unexpected end of collection"));
        }
        self.read_collection_rec(
            sink,
            &ReadContext {
                subject: Some(cell),
                predicate: None,
                running_flags: StatementFlags::LIST_CONT,
            },
            cell,
        )?;
        Ok(cell)
    }

    /// `resource | blank`, returning the subject node plus any flag that
    /// must be applied to the first statement of the `predicateObjectList`
    /// that follows (e.g. `EMPTY_S` for a property-less `[]` subject).
    fn read_subject(
        &mut self,
        sink: &mut impl RdfSink,
    ) -> Result<(Node, StatementFlags), TurtleError> {
        match self.input.current() {
            b'[' | b'(' | b'_' => {
                self.read_blank(sink, &ReadContext::default())
            }
            _ => Ok((self.read_resource()?, StatementFlags::NONE)),
        }
    }

    /// `subject predicateObjectList`.
    fn read_triples(&mut self, sink: &mut impl RdfSink) -> Result<(), TurtleError> {
        let (subject, subject_flags) = self.read_subject(sink)?;
        self.read_ws_plus()?;
        let ctx = ReadContext {
            subject: Some(subject),
            predicate: None,
            running_flags: StatementFlags::NONE,
        };
        self.read_predicate_object_list(sink, &ctx, subject_flags)
    }

    /// `'@base' ws+ uriref`.
    fn read_base(&mut self, sink: &mut impl RdfSink) -> Result<(), TurtleError> {
        self.input.eat_str("base")?;
        self.read_ws_plus()?;
        let uri = self.read_uriref()?;
        sink.base_uri(NamedNode {
            iri: self.stack.as_str(uri),
        });
        self.stack.pop(uri);
        Ok(())
    }

    /// `'@prefix' ws+ prefixName? ':' ws* uriref`.
    fn read_prefix_id(&mut self, sink: &mut impl RdfSink) -> Result<(), TurtleError> {
        self.input.eat_str("prefix")?;
        self.read_ws_plus()?;
        let name = match self.read_prefix_name()? {
            Some(r) => r,
            None => self.stack.push_string(),
        };
        if let Err(e) = self.input.eat_expect(b':') {
            self.stack.pop(name);
            return Err(e);
        }
        self.read_ws_star()?;
        let uri = match self.read_uriref() {
            Ok(r) => r,
            Err(e) => {
                self.stack.pop(name);
                return Err(e);
            }
        };
        let cancelled = !sink.prefix(
            self.stack.as_str(name),
            NamedNode {
                iri: self.stack.as_str(uri),
            },
        );
        self.stack.pop(uri);
        self.stack.pop(name);
        if cancelled {
            return Err(TurtleError::Cancelled(self.input.position()));
        }
        Ok(())
    }

    /// `prefixID | base`.
    fn read_directive(&mut self, sink: &mut impl RdfSink) -> Result<(), TurtleError> {
        self.input.eat_expect(b'@')?;
        match self.input.current() {
            b'b' => self.read_base(sink),
            b'p' => self.read_prefix_id(sink),
            _ => Err(self.input.error("illegal directive")),
        }
    }

    /// `directive '.' | triples '.' | ws+`.
    fn read_statement(&mut self, sink: &mut impl RdfSink) -> Result<(), TurtleError> {
        self.read_ws_star()?;
        if self.is_end() {
            return Ok(());
        }
        match self.input.current() {
            b'@' => self.read_directive(sink)?,
            _ => self.read_triples(sink)?,
        }
        self.read_ws_star()?;
        self.input.eat_expect(b'.')?;
        Ok(())
    }
}

impl<R: Read> turtlo_api::sink::TripleParser for TurtleParser<R> {
    type Error = TurtleError;

    fn parse_step(&mut self, sink: &mut impl RdfSink) -> Result<(), TurtleError> {
        self.read_statement(sink)
    }

    fn is_end(&self) -> bool {
        TurtleParser::is_end(self)
    }
}

fn push_literal_str(stack: &mut ScratchStack, s: &str) -> Ref {
    let r = stack.push_string();
    stack.push_str(r, s);
    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Collector {
        base: RefCell<Vec<String>>,
        prefixes: RefCell<Vec<(String, String)>>,
        statements: RefCell<Vec<(String, String, String, StatementFlags)>>,
    }

    impl RdfSink for Collector {
        fn base_uri(&mut self, uri: NamedNode<'_>) -> bool {
            self.base.borrow_mut().push(uri.iri.to_string());
            true
        }
        fn prefix(&mut self, name: &str, uri: NamedNode<'_>) -> bool {
            self.prefixes
                .borrow_mut()
                .push((name.to_string(), uri.iri.to_string()));
            true
        }
        fn statement(&mut self, triple: Triple<'_>, flags: StatementFlags) -> bool {
            self.statements.borrow_mut().push((
                triple.subject.to_string(),
                triple.predicate.to_string(),
                triple.object.to_string(),
                flags,
            ));
            true
        }
        fn end_anon(&mut self, _node: BlankNode<'_>) -> bool {
            true
        }
    }

    fn parse(src: &str) -> Collector {
        let mut parser = TurtleParser::new(src.as_bytes(), "(test)").unwrap();
        let mut sink = Collector::default();
        parser.parse_all(&mut sink).unwrap();
        sink
    }

    #[test]
    fn simple_triple() {
        let sink = parse("<http://example.org/s> <http://example.org/p> <http://example.org/o> .");
        let stmts = sink.statements.borrow();
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].0, "<http://example.org/s>");
        assert_eq!(stmts[0].2, "<http://example.org/o>");
    }

    #[test]
    fn a_keyword_expands_to_rdf_type() {
        let sink = parse("<http://example.org/s> a <http://example.org/T> .");
        let stmts = sink.statements.borrow();
        assert_eq!(stmts[0].1, "<http://www.w3.org/1999/02/22-rdf-syntax-ns#type>");
    }

    #[test]
    fn curie_stays_unresolved() {
        let sink = parse("ex:s ex:p ex:o .");
        let stmts = sink.statements.borrow();
        assert_eq!(stmts[0].0, "ex:s");
        assert_eq!(stmts[0].2, "ex:o");
    }

    #[test]
    fn prefix_and_base_directives() {
        let sink = parse("@prefix ex: <http://example.org/> .\n@base <http://example.org/> .\nex:s ex:p ex:o .");
        assert_eq!(sink.prefixes.borrow()[0], ("ex".to_string(), "http://example.org/".to_string()));
        assert_eq!(sink.base.borrow()[0], "http://example.org/");
    }

    #[test]
    fn empty_blank_node_object() {
        let sink = parse("ex:s ex:p [] .");
        let stmts = sink.statements.borrow();
        assert_eq!(stmts.len(), 1);
        assert!(stmts[0].2.starts_with("_:"));
        assert!(stmts[0].3.contains(StatementFlags::EMPTY_O));
    }

    #[test]
    fn anonymous_node_with_properties() {
        let sink = parse("ex:s ex:p [ ex:a ex:b ; ex:c ex:d ] .");
        let stmts = sink.statements.borrow();
        assert_eq!(stmts.len(), 3);
        assert!(stmts[0].3.contains(StatementFlags::ANON_O_BEGIN));
        assert!(stmts[1].3.contains(StatementFlags::ANON_CONT));
        assert!(stmts[2].3.contains(StatementFlags::ANON_CONT));
        assert_eq!(stmts[1].0, stmts[0].2);
    }

    #[test]
    fn collection_expands_to_rdf_list() {
        let sink = parse("ex:s ex:p ( ex:a ex:b ) .");
        let stmts = sink.statements.borrow();
        // open + (first,rest) per item + trailing rest->nil
        assert!(stmts.len() >= 4);
        assert!(stmts
            .iter()
            .any(|s| s.1 == "<http://www.w3.org/1999/02/22-rdf-syntax-ns#first>" && s.2 == "ex:a"));
        assert!(stmts
            .iter()
            .any(|s| s.2 == "<http://www.w3.org/1999/02/22-rdf-syntax-ns#nil>"));
    }

    #[test]
    fn numeric_and_boolean_literals() {
        let sink = parse("ex:s ex:p 42 . ex:s ex:q 4.2 . ex:s ex:r true .");
        let stmts = sink.statements.borrow();
        assert_eq!(stmts[0].2, "\"42\"^^<http://www.w3.org/2001/XMLSchema#integer>");
        assert_eq!(stmts[1].2, "\"4.2\"^^<http://www.w3.org/2001/XMLSchema#decimal>");
        assert_eq!(stmts[2].2, "\"true\"^^<http://www.w3.org/2001/XMLSchema#boolean>");
    }

    #[test]
    fn language_and_datatype_literals() {
        let sink = parse("ex:s ex:p \"chat\"@en . ex:s ex:q \"1\"^^ex:int .");
        let stmts = sink.statements.borrow();
        assert_eq!(stmts[0].2, "\"chat\"@en");
        assert_eq!(stmts[1].2, "\"1\"^^ex:int");
    }

    #[test]
    fn long_string_with_embedded_quotes_and_newline() {
        let sink = parse("ex:s ex:p \"\"\"a \"quoted\" word\nand a newline\"\"\" .");
        let stmts = sink.statements.borrow();
        assert!(stmts[0].2.contains("quoted"));
    }

    #[test]
    fn unicode_escape() {
        let sink = parse(r#"ex:s ex:p "é" ."#);
        let stmts = sink.statements.borrow();
        assert_eq!(stmts[0].2, "\"\u{e9}\"");
    }

    #[test]
    fn comments_are_skipped() {
        let sink = parse("# a comment\nex:s ex:p ex:o . # trailing\n");
        assert_eq!(sink.statements.borrow().len(), 1);
    }

    #[derive(Default)]
    struct LiteralFlagSink {
        flags: RefCell<Vec<LiteralFlags>>,
    }

    impl RdfSink for LiteralFlagSink {
        fn statement(&mut self, triple: Triple<'_>, _flags: StatementFlags) -> bool {
            if let Term::Literal(lit) = triple.object {
                let flags = match lit {
                    Literal::Simple { flags, .. } => flags,
                    Literal::LanguageTaggedString { flags, .. } => flags,
                    Literal::Typed { flags, .. } => flags,
                };
                self.flags.borrow_mut().push(flags);
            }
            true
        }
    }

    fn literal_flags_of(src: &str) -> LiteralFlags {
        let mut parser = TurtleParser::new(src.as_bytes(), "(test)").unwrap();
        let mut sink = LiteralFlagSink::default();
        parser.parse_all(&mut sink).unwrap();
        sink.flags.borrow()[0]
    }

    #[test]
    fn escaped_newline_sets_has_newline_flag() {
        let flags = literal_flags_of("<http://example.org/s> <http://example.org/p> \"hello\\n\" .");
        assert!(flags.contains(LiteralFlags::HAS_NEWLINE));
    }

    #[test]
    fn escaped_quote_in_short_string_sets_has_quote_flag() {
        let flags = literal_flags_of("ex:s ex:p \"a \\\"quoted\\\" word\" .");
        assert!(flags.contains(LiteralFlags::HAS_QUOTE));
    }

    #[test]
    fn raw_newline_in_long_string_sets_has_newline_flag() {
        let flags = literal_flags_of("ex:s ex:p \"\"\"line one\nline two\"\"\" .");
        assert!(flags.contains(LiteralFlags::HAS_NEWLINE));
    }

    #[test]
    fn plain_literal_has_no_flags() {
        let flags = literal_flags_of("ex:s ex:p \"plain\" .");
        assert_eq!(flags, LiteralFlags::NONE);
    }

    #[test]
    fn explicit_genid_label_is_rewritten_to_docid() {
        let sink = parse("_:genid1 ex:p ex:o .");
        let stmts = sink.statements.borrow();
        assert_eq!(stmts[0].0, "_:docid1");
    }

    #[test]
    fn explicit_non_genid_label_is_left_alone() {
        let sink = parse("_:b1 ex:p ex:o .");
        let stmts = sink.statements.borrow();
        assert_eq!(stmts[0].0, "_:b1");
    }
}
